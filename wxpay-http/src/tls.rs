//! Credential loading and the two HTTP client profiles.
//!
//! The certificate-authenticated profile presents the merchant's client
//! certificate, trusts only the configured CA bundle, negotiates TLS 1.2 or
//! 1.3 with an AES-GCM allow-list and never resumes sessions. The
//! unauthenticated profile is a plain HTTPS client using the platform trust
//! store.

use std::sync::Arc;

use rustls::client::Resumption;
use rustls::crypto::ring::{cipher_suite, default_provider};
use rustls::pki_types::pem::PemObject;
use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use rustls::{RootCertStore, SupportedCipherSuite};

use crate::config::{ClientConfig, CredentialSource};
use crate::constants::{CONNECT_TIMEOUT, POOL_IDLE_TIMEOUT, POOL_MAX_IDLE_PER_HOST, TCP_KEEPALIVE};
use crate::error::ConfigError;

/// Parsed client certificate, private key and trust anchors.
pub struct Credentials {
    /// Client certificate chain, leaf first.
    pub certs: Vec<CertificateDer<'static>>,
    /// Client private key.
    pub key: PrivateKeyDer<'static>,
    /// Trust anchors.
    pub roots: RootCertStore,
}

impl Credentials {
    /// Reads and parses the credential material named in `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if any credential is missing, unreadable or
    /// unparseable, if the certificate material holds no certificate, or if
    /// the CA material yields no trust anchor.
    pub fn load(config: &ClientConfig) -> Result<Self, ConfigError> {
        let cert_pem = required(config.client_cert.as_ref(), "client certificate")?.read()?;
        let key_pem = required(config.client_key.as_ref(), "client private key")?.read()?;
        let ca_pem = required(config.ca.as_ref(), "CA certificate")?.read()?;

        let certs = parse_certs(&cert_pem, "client certificate")?;
        if certs.is_empty() {
            return Err(ConfigError::NoCertificate);
        }
        let key = PrivateKeyDer::from_pem_slice(&key_pem).map_err(|source| ConfigError::Pem {
            context: "client private key",
            source,
        })?;

        let mut roots = RootCertStore::empty();
        let (added, _ignored) =
            roots.add_parsable_certificates(parse_certs(&ca_pem, "CA certificate")?);
        if added == 0 {
            return Err(ConfigError::NoTrustAnchor);
        }

        Ok(Self { certs, key, roots })
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("certs", &self.certs.len())
            .field("roots", &self.roots.len())
            .finish_non_exhaustive()
    }
}

fn required<'a>(
    source: Option<&'a CredentialSource>,
    name: &'static str,
) -> Result<&'a CredentialSource, ConfigError> {
    source.ok_or(ConfigError::MissingCredential(name))
}

fn parse_certs(
    pem: &[u8],
    context: &'static str,
) -> Result<Vec<CertificateDer<'static>>, ConfigError> {
    CertificateDer::pem_slice_iter(pem)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|source| ConfigError::Pem { context, source })
}

/// Cipher suites offered by the certificate-authenticated profile.
#[must_use]
pub fn cipher_suites() -> Vec<SupportedCipherSuite> {
    vec![
        cipher_suite::TLS13_AES_128_GCM_SHA256,
        cipher_suite::TLS13_AES_256_GCM_SHA384,
        cipher_suite::TLS_ECDHE_RSA_WITH_AES_128_GCM_SHA256,
        cipher_suite::TLS_ECDHE_RSA_WITH_AES_256_GCM_SHA384,
        cipher_suite::TLS_ECDHE_ECDSA_WITH_AES_128_GCM_SHA256,
        cipher_suite::TLS_ECDHE_ECDSA_WITH_AES_256_GCM_SHA384,
    ]
}

/// Builds the rustls configuration for the certificate-authenticated
/// profile.
///
/// # Errors
///
/// Returns [`ConfigError::Tls`] if rustls rejects the protocol versions or
/// the certificate/key pair.
pub fn certified_tls_config(credentials: Credentials) -> Result<rustls::ClientConfig, ConfigError> {
    let mut provider = default_provider();
    provider.cipher_suites = cipher_suites();

    let mut config = rustls::ClientConfig::builder_with_provider(Arc::new(provider))
        .with_protocol_versions(&[&rustls::version::TLS13, &rustls::version::TLS12])?
        .with_root_certificates(credentials.roots)
        .with_client_auth_cert(credentials.certs, credentials.key)?;
    config.resumption = Resumption::disabled();
    Ok(config)
}

/// Builds the HTTP client for certificate-authenticated endpoints.
///
/// # Errors
///
/// Returns [`ConfigError`] if credentials cannot be loaded or the client
/// cannot be built.
pub fn certified_client(config: &ClientConfig) -> Result<reqwest::Client, ConfigError> {
    let tls = certified_tls_config(Credentials::load(config)?)?;
    pooled_builder()
        .use_preconfigured_tls(tls)
        .build()
        .map_err(ConfigError::HttpClient)
}

/// Builds the HTTP client for unauthenticated endpoints.
///
/// # Errors
///
/// Returns [`ConfigError::HttpClient`] if the client cannot be built.
pub fn plain_client() -> Result<reqwest::Client, ConfigError> {
    pooled_builder().build().map_err(ConfigError::HttpClient)
}

fn pooled_builder() -> reqwest::ClientBuilder {
    reqwest::Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .tcp_keepalive(TCP_KEEPALIVE)
        .pool_idle_timeout(POOL_IDLE_TIMEOUT)
        .pool_max_idle_per_host(POOL_MAX_IDLE_PER_HOST)
}
