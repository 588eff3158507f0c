//! Provider error-code vocabulary.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Business error code reported in `err_code`.
///
/// Codes are carried verbatim: unknown codes land in [`ErrorCode::Other`]
/// and round-trip unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// The merchant is not authorised for this API.
    NoAuth,
    /// Amount below the per-transfer minimum.
    AmountLimit,
    /// A parameter is missing or malformed.
    ParamError,
    /// The openid is malformed or belongs to another app.
    OpenidError,
    /// Payment failed; retry with a new trade number.
    SendFailed,
    /// Insufficient merchant balance.
    NotEnough,
    /// Transient provider failure; retry with the same trade number.
    SystemError,
    /// Real-name check failed.
    NameMismatch,
    /// Signature did not verify.
    SignError,
    /// Request body was not well-formed XML.
    XmlError,
    /// Same trade number sent with different parameters.
    FatalError,
    /// Request rate limit exceeded.
    FreqLimit,
    /// Daily or per-user amount limit reached.
    MoneyLimit,
    /// Missing or wrong client certificate.
    CaError,
    /// Recipient account has no real-name verification.
    V2AccountSimpleBan,
    /// A parameter is not valid UTF-8.
    ParamIsNotUtf8,
    /// Recipient's daily transfer count exceeded.
    SendnumLimit,
    /// The queried record does not exist.
    NotFound,
    /// Any code not listed above.
    Other(String),
}

impl ErrorCode {
    /// Wire spelling of the code.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::NoAuth => "NO_AUTH",
            Self::AmountLimit => "AMOUNT_LIMIT",
            Self::ParamError => "PARAM_ERROR",
            Self::OpenidError => "OPENID_ERROR",
            Self::SendFailed => "SEND_FAILED",
            Self::NotEnough => "NOTENOUGH",
            Self::SystemError => "SYSTEMERROR",
            Self::NameMismatch => "NAME_MISMATCH",
            Self::SignError => "SIGN_ERROR",
            Self::XmlError => "XML_ERROR",
            Self::FatalError => "FATAL_ERROR",
            Self::FreqLimit => "FREQ_LIMIT",
            Self::MoneyLimit => "MONEY_LIMIT",
            Self::CaError => "CA_ERROR",
            Self::V2AccountSimpleBan => "V2_ACCOUNT_SIMPLE_BAN",
            Self::ParamIsNotUtf8 => "PARAM_IS_NOT_UTF8",
            Self::SendnumLimit => "SENDNUM_LIMIT",
            Self::NotFound => "NOT_FOUND",
            Self::Other(code) => code,
        }
    }

    /// Returns `true` for codes the provider documents as safe to retry
    /// with the original trade number.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::SystemError | Self::FreqLimit)
    }
}

impl From<&str> for ErrorCode {
    fn from(code: &str) -> Self {
        match code.trim() {
            "NO_AUTH" => Self::NoAuth,
            "AMOUNT_LIMIT" => Self::AmountLimit,
            "PARAM_ERROR" => Self::ParamError,
            "OPENID_ERROR" => Self::OpenidError,
            "SEND_FAILED" => Self::SendFailed,
            "NOTENOUGH" => Self::NotEnough,
            "SYSTEMERROR" => Self::SystemError,
            "NAME_MISMATCH" => Self::NameMismatch,
            "SIGN_ERROR" => Self::SignError,
            "XML_ERROR" => Self::XmlError,
            "FATAL_ERROR" => Self::FatalError,
            "FREQ_LIMIT" => Self::FreqLimit,
            "MONEY_LIMIT" => Self::MoneyLimit,
            "CA_ERROR" => Self::CaError,
            "V2_ACCOUNT_SIMPLE_BAN" => Self::V2AccountSimpleBan,
            "PARAM_IS_NOT_UTF8" => Self::ParamIsNotUtf8,
            "SENDNUM_LIMIT" => Self::SendnumLimit,
            "NOT_FOUND" => Self::NotFound,
            _ => Self::Other(code.to_owned()),
        }
    }
}

impl FromStr for ErrorCode {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ErrorCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ErrorCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::from(s.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_codes_round_trip() {
        for code in [
            "NO_AUTH",
            "NOTENOUGH",
            "SYSTEMERROR",
            "V2_ACCOUNT_SIMPLE_BAN",
            "PARAM_IS_NOT_UTF8",
            "NOT_FOUND",
        ] {
            let parsed = ErrorCode::from(code);
            assert!(!matches!(parsed, ErrorCode::Other(_)), "{code}");
            assert_eq!(parsed.as_str(), code);
        }
    }

    #[test]
    fn test_trailing_whitespace_is_tolerated() {
        assert_eq!(
            ErrorCode::from("V2_ACCOUNT_SIMPLE_BAN\t"),
            ErrorCode::V2AccountSimpleBan
        );
    }

    #[test]
    fn test_unknown_code_is_kept_verbatim() {
        let code: ErrorCode = "INVALID_REQUEST".parse().unwrap();
        assert_eq!(code, ErrorCode::Other("INVALID_REQUEST".into()));
        assert_eq!(code.to_string(), "INVALID_REQUEST");
    }

    #[test]
    fn test_retryable_codes() {
        assert!(ErrorCode::SystemError.is_retryable());
        assert!(!ErrorCode::NotEnough.is_retryable());
    }
}
