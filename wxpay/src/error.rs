//! Error types for request canonicalization and response decoding.

/// Errors raised while building a canonical field map.
#[derive(Debug, thiserror::Error)]
pub enum CanonicalError {
    /// The value handed to the generic extractor is not a composite record.
    #[error("expected a record with named fields, found {found}")]
    InvalidInputKind {
        /// Kind of value that was supplied instead (e.g. `"array"`).
        found: &'static str,
    },

    /// The value could not be serialized for inspection.
    #[error("failed to inspect value: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Unknown signature type spelling.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown sign type '{0}', expected HMAC-SHA256 or MD5")]
pub struct SignTypeError(pub String);

/// Errors raised while decoding a response body.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The body is not valid UTF-8.
    #[error("response body is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// The body is not a well-formed document for the expected schema.
    #[error("malformed response document: {0}")]
    Xml(#[from] quick_xml::DeError),
}
