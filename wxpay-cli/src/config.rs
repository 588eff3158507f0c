//! Operator configuration file.
//!
//! Loads configuration from a TOML file with support for environment variable
//! expansion in string values. Variables use `$VAR` or `${VAR}` syntax.
//!
//! # Example Configuration
//!
//! ```toml
//! app_id = "wx8888888888888888"
//! mch_id = "1900000109"
//! api_key = "$WXPAY_API_KEY"
//! sign_type = "HMAC-SHA256"
//! sandbox = false
//! timeout_secs = 10
//!
//! client_cert_path = "/etc/wxpay/apiclient_cert.pem"
//! client_key_path = "/etc/wxpay/apiclient_key.pem"
//! ca_pem = "${WXPAY_CA_PEM}"
//! ```
//!
//! Each credential may be given either as `*_path` or as inline `*_pem`,
//! never both.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use wxpay::SignType;
use wxpay_http::{ClientConfig, ConfigError, CredentialSource};

/// Errors raised while loading the configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigFileError {
    /// The file exists but could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        /// The configuration file.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML for this schema.
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// The values do not form a valid client configuration.
    #[error(transparent)]
    Client(#[from] ConfigError),
}

/// Contents of the configuration file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    /// Application id.
    #[serde(default)]
    pub app_id: String,

    /// Merchant id.
    #[serde(default)]
    pub mch_id: String,

    /// API key used for signing.
    #[serde(default)]
    pub api_key: String,

    /// `HMAC-SHA256` (default) or `MD5`.
    #[serde(default)]
    pub sign_type: SignType,

    /// Route calls through the sandbox.
    #[serde(default)]
    pub sandbox: bool,

    /// Per-request timeout in seconds.
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    /// Base URL override.
    #[serde(default)]
    pub base_url: Option<String>,

    /// Client certificate file.
    #[serde(default)]
    pub client_cert_path: Option<PathBuf>,

    /// Client certificate PEM.
    #[serde(default)]
    pub client_cert_pem: Option<String>,

    /// Client private key file.
    #[serde(default)]
    pub client_key_path: Option<PathBuf>,

    /// Client private key PEM.
    #[serde(default)]
    pub client_key_pem: Option<String>,

    /// CA bundle file.
    #[serde(default)]
    pub ca_path: Option<PathBuf>,

    /// CA bundle PEM.
    #[serde(default)]
    pub ca_pem: Option<String>,
}

impl FileConfig {
    /// Loads configuration from `path`, expanding `$VAR` references from the
    /// process environment.
    ///
    /// A missing file yields the defaults, leaving validation to client
    /// construction.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigFileError`] if the file cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self, ConfigFileError> {
        let content = if path.exists() {
            std::fs::read_to_string(path).map_err(|source| ConfigFileError::Read {
                path: path.to_owned(),
                source,
            })?
        } else {
            String::new()
        };
        Self::parse(&content, |name| std::env::var(name).ok())
    }

    /// Parses TOML text after expanding variables through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigFileError::Parse`] if the expanded text is invalid.
    pub fn parse(
        content: &str,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigFileError> {
        Ok(toml::from_str(&expand_vars(content, lookup))?)
    }

    /// Converts into a client configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ConflictingSources`] if a credential is given
    /// both as a path and inline.
    pub fn into_client_config(self) -> Result<ClientConfig, ConfigFileError> {
        let client_cert =
            CredentialSource::from_parts("client_cert", self.client_cert_path, self.client_cert_pem)?;
        let client_key =
            CredentialSource::from_parts("client_key", self.client_key_path, self.client_key_pem)?;
        let ca = CredentialSource::from_parts("ca", self.ca_path, self.ca_pem)?;

        Ok(ClientConfig {
            app_id: self.app_id,
            mch_id: self.mch_id,
            api_key: self.api_key,
            sign_type: self.sign_type,
            client_cert,
            client_key,
            ca,
            sandbox: self.sandbox,
            timeout: self.timeout_secs.map(Duration::from_secs),
            base_url: self.base_url,
        })
    }
}

/// Expands `$VAR` and `${VAR}` patterns using `lookup`.
///
/// Unresolved variables are left as-is.
fn expand_vars(input: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '$' {
            result.push(ch);
            continue;
        }

        let braced = chars.peek() == Some(&'{');
        if braced {
            chars.next();
        }

        let mut var_name = String::new();
        while let Some(&c) = chars.peek() {
            if braced {
                if c == '}' {
                    chars.next();
                    break;
                }
            } else if !c.is_ascii_alphanumeric() && c != '_' {
                break;
            }
            var_name.push(c);
            chars.next();
        }

        if var_name.is_empty() {
            result.push('$');
            if braced {
                result.push('{');
            }
        } else if let Some(val) = lookup(&var_name) {
            result.push_str(&val);
        } else {
            result.push('$');
            if braced {
                result.push('{');
            }
            result.push_str(&var_name);
            if braced {
                result.push('}');
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(name: &str) -> Option<String> {
        match name {
            "WXPAY_API_KEY" => Some("from-env".to_owned()),
            "MCH" => Some("1900000109".to_owned()),
            _ => None,
        }
    }

    #[test]
    fn test_expand_plain_and_braced() {
        assert_eq!(expand_vars("key=$WXPAY_API_KEY;", env), "key=from-env;");
        assert_eq!(expand_vars("${MCH}00", env), "190000010900");
    }

    #[test]
    fn test_unresolved_left_as_is() {
        assert_eq!(expand_vars("$MISSING ${ALSO_MISSING}", env), "$MISSING ${ALSO_MISSING}");
        assert_eq!(expand_vars("cost: $5", env), "cost: $5");
        assert_eq!(expand_vars("trailing $", env), "trailing $");
    }

    #[test]
    fn test_parse_full_file() {
        let config = FileConfig::parse(
            r#"
            app_id = "wx8888888888888888"
            mch_id = "$MCH"
            api_key = "${WXPAY_API_KEY}"
            sign_type = "MD5"
            sandbox = true
            timeout_secs = 5
            client_cert_path = "cert.pem"
            client_key_path = "key.pem"
            ca_pem = "-----BEGIN CERTIFICATE-----"
            "#,
            env,
        )
        .unwrap();
        assert_eq!(config.mch_id, "1900000109");
        assert_eq!(config.api_key, "from-env");
        assert_eq!(config.sign_type, SignType::Md5);

        let client = config.into_client_config().unwrap();
        assert!(client.sandbox);
        assert_eq!(client.timeout, Some(Duration::from_secs(5)));
        assert_eq!(
            client.client_cert,
            Some(CredentialSource::Path("cert.pem".into()))
        );
        assert!(matches!(client.ca, Some(CredentialSource::Pem(_))));
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = FileConfig::parse("", env).unwrap();
        assert_eq!(config.sign_type, SignType::HmacSha256);
        assert!(!config.sandbox);
        assert!(config.client_cert_path.is_none());
    }

    #[test]
    fn test_unknown_sign_type_rejected() {
        let err = FileConfig::parse(r#"sign_type = "SHA1""#, env).unwrap_err();
        assert!(matches!(err, ConfigFileError::Parse(_)));
    }

    #[test]
    fn test_conflicting_credential_sources() {
        let config = FileConfig::parse(
            r#"
            ca_path = "ca.pem"
            ca_pem = "inline"
            "#,
            env,
        )
        .unwrap();
        let err = config.into_client_config().unwrap_err();
        assert!(matches!(
            err,
            ConfigFileError::Client(ConfigError::ConflictingSources("ca"))
        ));
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let config = FileConfig::load_from(Path::new("/nonexistent/wxpay.toml")).unwrap();
        assert!(config.app_id.is_empty());
    }
}
