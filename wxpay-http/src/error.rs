//! Error types for client construction and API calls.

use std::path::PathBuf;

use wxpay::DecodeError;

/// Errors raised while building a [`WxPayClient`](crate::WxPayClient).
///
/// These are fatal: no client exists until the configuration is valid.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required identity value or credential was not supplied.
    #[error("missing credential: {0}")]
    MissingCredential(&'static str),

    /// Both a path and inline PEM were supplied for the same credential.
    #[error("conflicting sources for {0}: set either a path or inline PEM, not both")]
    ConflictingSources(&'static str),

    /// A credential file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// The file that could not be read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A credential is not valid PEM.
    #[error("invalid PEM in {context}: {source}")]
    Pem {
        /// Which credential was being parsed.
        context: &'static str,
        /// The underlying PEM error.
        #[source]
        source: rustls::pki_types::pem::Error,
    },

    /// The client certificate material contains no certificate.
    #[error("no certificate found in client certificate material")]
    NoCertificate,

    /// The CA bundle contains no usable trust anchor.
    #[error("no usable trust anchor found in CA material")]
    NoTrustAnchor,

    /// rustls rejected the TLS configuration (e.g. key does not match
    /// certificate).
    #[error("TLS configuration rejected: {0}")]
    Tls(#[from] rustls::Error),

    /// The HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),

    /// The base URL override is not a valid URL.
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(#[from] url::ParseError),
}

/// Errors raised by a single API call.
///
/// Provider-reported failures (`return_code` / `result_code` of `FAIL`) are
/// not errors; inspect the decoded response instead.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Connection, TLS, timeout or body-read failure.
    #[error("HTTP error: {context}: {source}")]
    Transport {
        /// Human-readable context.
        context: &'static str,
        /// The underlying reqwest error.
        #[source]
        source: reqwest::Error,
    },

    /// The response body could not be decoded.
    #[error("failed to decode response: {context}: {source}")]
    Decode {
        /// Human-readable context.
        context: &'static str,
        /// The underlying decode error.
        #[source]
        source: DecodeError,
    },
}
