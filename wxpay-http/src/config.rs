//! Client configuration.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use wxpay::{Identity, SignType, Signer};

use crate::error::ConfigError;

/// Where a PEM credential comes from.
#[derive(Clone, PartialEq, Eq)]
pub enum CredentialSource {
    /// A PEM file on disk.
    Path(PathBuf),
    /// PEM bytes held in memory.
    Pem(Vec<u8>),
}

impl CredentialSource {
    /// Resolves a credential given as an optional path and optional inline
    /// PEM, as found in configuration files.
    ///
    /// Returns `Ok(None)` when neither is set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ConflictingSources`] when both are set.
    pub fn from_parts(
        name: &'static str,
        path: Option<PathBuf>,
        pem: Option<String>,
    ) -> Result<Option<Self>, ConfigError> {
        match (path, pem) {
            (Some(_), Some(_)) => Err(ConfigError::ConflictingSources(name)),
            (Some(path), None) => Ok(Some(Self::Path(path))),
            (None, Some(pem)) => Ok(Some(Self::Pem(pem.into_bytes()))),
            (None, None) => Ok(None),
        }
    }

    /// Reads the PEM bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read.
    pub fn read(&self) -> Result<Vec<u8>, ConfigError> {
        match self {
            Self::Path(path) => std::fs::read(path).map_err(|source| ConfigError::Io {
                path: path.clone(),
                source,
            }),
            Self::Pem(bytes) => Ok(bytes.clone()),
        }
    }
}

impl fmt::Debug for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(path) => f.debug_tuple("Path").field(path).finish(),
            Self::Pem(bytes) => write!(f, "Pem(<{} bytes>)", bytes.len()),
        }
    }
}

/// Everything needed to build a [`WxPayClient`](crate::WxPayClient).
///
/// # Example
///
/// ```no_run
/// use wxpay_http::{ClientConfig, CredentialSource};
///
/// let config = ClientConfig::new("wx8888888888888888", "1900000109", "api-key")
///     .with_client_cert(CredentialSource::Path("apiclient_cert.pem".into()))
///     .with_client_key(CredentialSource::Path("apiclient_key.pem".into()))
///     .with_ca(CredentialSource::Path("rootca.pem".into()));
/// ```
#[derive(Clone)]
pub struct ClientConfig {
    /// Application id.
    pub app_id: String,
    /// Merchant id.
    pub mch_id: String,
    /// Shared API key used for signing.
    pub api_key: String,
    /// Signature algorithm.
    pub sign_type: SignType,
    /// Client certificate chain.
    pub client_cert: Option<CredentialSource>,
    /// Client private key.
    pub client_key: Option<CredentialSource>,
    /// Trust anchors for the certificate-authenticated endpoints.
    pub ca: Option<CredentialSource>,
    /// Route calls through the sandbox prefix.
    pub sandbox: bool,
    /// Per-request timeout. `None` leaves only the connect timeout.
    pub timeout: Option<Duration>,
    /// Base URL override. Defaults to the production host.
    pub base_url: Option<String>,
}

impl ClientConfig {
    /// Creates a configuration with identity and key set and no credentials.
    #[must_use]
    pub fn new(
        app_id: impl Into<String>,
        mch_id: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            app_id: app_id.into(),
            mch_id: mch_id.into(),
            api_key: api_key.into(),
            sign_type: SignType::default(),
            client_cert: None,
            client_key: None,
            ca: None,
            sandbox: false,
            timeout: None,
            base_url: None,
        }
    }

    /// Sets the signature algorithm.
    #[must_use]
    pub const fn with_sign_type(mut self, sign_type: SignType) -> Self {
        self.sign_type = sign_type;
        self
    }

    /// Sets the client certificate.
    #[must_use]
    pub fn with_client_cert(mut self, source: CredentialSource) -> Self {
        self.client_cert = Some(source);
        self
    }

    /// Sets the client private key.
    #[must_use]
    pub fn with_client_key(mut self, source: CredentialSource) -> Self {
        self.client_key = Some(source);
        self
    }

    /// Sets the CA bundle.
    #[must_use]
    pub fn with_ca(mut self, source: CredentialSource) -> Self {
        self.ca = Some(source);
        self
    }

    /// Enables or disables sandbox routing.
    #[must_use]
    pub const fn with_sandbox(mut self, sandbox: bool) -> Self {
        self.sandbox = sandbox;
        self
    }

    /// Sets the per-request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Overrides the base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// The merchant identity.
    #[must_use]
    pub fn identity(&self) -> Identity {
        Identity::new(self.app_id.clone(), self.mch_id.clone())
    }

    /// A signer for the configured key and algorithm.
    #[must_use]
    pub fn signer(&self) -> Signer {
        Signer::new(self.api_key.clone(), self.sign_type)
    }

    /// Checks that every identity value is present.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingCredential`] naming the first empty
    /// value.
    pub fn validate_identity(&self) -> Result<(), ConfigError> {
        if self.app_id.is_empty() {
            return Err(ConfigError::MissingCredential("app_id"));
        }
        if self.mch_id.is_empty() {
            return Err(ConfigError::MissingCredential("mch_id"));
        }
        if self.api_key.is_empty() {
            return Err(ConfigError::MissingCredential("api_key"));
        }
        Ok(())
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("app_id", &self.app_id)
            .field("mch_id", &self.mch_id)
            .field("api_key", &"<redacted>")
            .field("sign_type", &self.sign_type)
            .field("client_cert", &self.client_cert)
            .field("client_key", &self.client_key.as_ref().map(|_| "<redacted>"))
            .field("ca", &self.ca)
            .field("sandbox", &self.sandbox)
            .field("timeout", &self.timeout)
            .field("base_url", &self.base_url)
            .finish()
    }
}
