//! Request signatures.
//!
//! The provider signs a request by sorting its fields by name, joining them
//! as `name=value&`, appending `key=<api key>` and digesting the result with
//! HMAC-SHA256 (keyed by the API key) or plain MD5. The digest travels as
//! upper-case hex in the `sign` field.
//!
//! ```text
//! appid=wx1&mch_id=10000100&nonce_str=ibuaiVcKdpRxkhJA&key=<api key>
//! ```

use std::fmt;
use std::str::FromStr;

use hmac::{Hmac, Mac};
use md5::{Digest, Md5};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::Sha256;

use crate::canonical::{FieldMap, Variant, WireFields};
use crate::error::SignTypeError;

type HmacSha256 = Hmac<Sha256>;

/// Digest algorithm declared in the `sign_type` field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SignType {
    /// HMAC-SHA256 keyed with the API key.
    #[default]
    HmacSha256,
    /// Unkeyed MD5 over the base string (which already ends with the key).
    Md5,
}

impl SignType {
    /// Wire spelling of the algorithm.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::HmacSha256 => "HMAC-SHA256",
            Self::Md5 => "MD5",
        }
    }
}

impl fmt::Display for SignType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SignType {
    type Err = SignTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            s if s.eq_ignore_ascii_case("HMAC-SHA256") => Ok(Self::HmacSha256),
            s if s.eq_ignore_ascii_case("MD5") => Ok(Self::Md5),
            other => Err(SignTypeError(other.to_owned())),
        }
    }
}

impl Serialize for SignType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for SignType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Builds the base string for `fields`: sorted `name=value&` pairs followed by
/// `key=<api_key>`.
///
/// `fields` should come from a [`Variant::Signing`] extraction.
#[must_use]
pub fn base_string(fields: &FieldMap, api_key: &str) -> String {
    let mut base = String::new();
    for (name, value) in fields.iter() {
        base.push_str(name);
        base.push('=');
        base.push_str(value);
        base.push('&');
    }
    base.push_str("key=");
    base.push_str(api_key);
    base
}

/// Digests a base string with the given algorithm, as upper-case hex.
#[must_use]
pub fn digest(base: &str, api_key: &str, sign_type: SignType) -> String {
    match sign_type {
        SignType::HmacSha256 => {
            let mut mac = HmacSha256::new_from_slice(api_key.as_bytes())
                .expect("HMAC can take key of any size");
            mac.update(base.as_bytes());
            hex::encode_upper(mac.finalize().into_bytes())
        }
        SignType::Md5 => hex::encode_upper(Md5::digest(base.as_bytes())),
    }
}

/// Signs field maps and requests with a merchant API key.
#[derive(Clone)]
pub struct Signer {
    api_key: String,
    sign_type: SignType,
}

impl Signer {
    /// Creates a signer for the given API key and algorithm.
    #[must_use]
    pub fn new(api_key: impl Into<String>, sign_type: SignType) -> Self {
        Self {
            api_key: api_key.into(),
            sign_type,
        }
    }

    /// The algorithm this signer uses.
    #[must_use]
    pub const fn sign_type(&self) -> SignType {
        self.sign_type
    }

    /// Signs an already-extracted field map.
    ///
    /// Any `sign` entry in `fields` is ignored.
    #[must_use]
    pub fn sign_map(&self, fields: &FieldMap) -> String {
        let mut fields = fields.clone();
        fields.remove(crate::canonical::SIGN_FIELD);
        fields.remove("");
        digest(&base_string(&fields, &self.api_key), &self.api_key, self.sign_type)
    }

    /// Signs the declared fields of `value`.
    #[must_use]
    pub fn sign(&self, value: &dyn WireFields) -> String {
        let fields = FieldMap::extract(value, Variant::Signing);
        digest(&base_string(&fields, &self.api_key), &self.api_key, self.sign_type)
    }

    /// Returns `true` if `expected` is the signature of `value`.
    ///
    /// Hex case is not significant.
    #[must_use]
    pub fn verify(&self, value: &dyn WireFields, expected: &str) -> bool {
        self.sign(value).eq_ignore_ascii_case(expected)
    }
}

impl fmt::Debug for Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signer")
            .field("api_key", &"<redacted>")
            .field("sign_type", &self.sign_type)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canonical::Field;

    const DOC_KEY: &str = "192006250b4c09247ec02edce69f6a2d";

    fn doc_fields() -> FieldMap {
        [
            ("appid", "wxd930ea5d5a258f4f"),
            ("mch_id", "10000100"),
            ("device_info", "1000"),
            ("body", "test"),
            ("nonce_str", "ibuaiVcKdpRxkhJA"),
        ]
        .into_iter()
        .collect()
    }

    struct Pair {
        a: String,
        b: String,
        sign: String,
    }

    impl WireFields for Pair {
        fn wire_fields(&self) -> Vec<Field<'_>> {
            vec![
                Field::text("B", &self.b),
                Field::text("sign", &self.sign),
                Field::text("A", &self.a),
            ]
        }
    }

    #[test]
    fn test_base_string_sorted_with_trailing_key() {
        let fields: FieldMap = [("B", "2"), ("A", "1")].into_iter().collect();
        assert_eq!(base_string(&fields, "secret"), "A=1&B=2&key=secret");
    }

    #[test]
    fn test_base_string_of_empty_map() {
        assert_eq!(base_string(&FieldMap::new(), "k"), "key=k");
    }

    #[test]
    fn test_sign_field_never_in_base_string() {
        let pair = Pair {
            a: "1".into(),
            b: "2".into(),
            sign: "STALE".into(),
        };
        let fields = FieldMap::extract(&pair, Variant::Signing);
        assert_eq!(base_string(&fields, "secret"), "A=1&B=2&key=secret");
    }

    #[test]
    fn test_hmac_sha256_reference_digest() {
        assert_eq!(
            digest("A=1&B=2&key=secret", "secret", SignType::HmacSha256),
            "8AE40A63BFA27CD56D0B8AD61610F24D1D3333F16E27F9B9B49E25E066A8E902"
        );
    }

    #[test]
    fn test_md5_reference_digest() {
        assert_eq!(
            digest("A=1&B=2&key=secret", "secret", SignType::Md5),
            "62ACCBFAC5415ECAB539F8EE2FD92648"
        );
    }

    #[test]
    fn test_provider_documentation_example() {
        let hmac = Signer::new(DOC_KEY, SignType::HmacSha256);
        assert_eq!(
            hmac.sign_map(&doc_fields()),
            "6A9AE1657590FD6257D693A078E1C3E4BB6BA4DC30B23E0EE2496E54170DACD6"
        );
        let md5 = Signer::new(DOC_KEY, SignType::Md5);
        assert_eq!(md5.sign_map(&doc_fields()), "9A0A8659F005D6984697E2CA0A9CF3B7");
    }

    #[test]
    fn test_sign_map_ignores_existing_sign() {
        let signer = Signer::new(DOC_KEY, SignType::Md5);
        let mut fields = doc_fields();
        let clean = signer.sign_map(&fields);
        fields.insert("sign", clean.clone());
        assert_eq!(signer.sign_map(&fields), clean);
    }

    #[test]
    fn test_sign_and_verify_declared_fields() {
        let signer = Signer::new("secret", SignType::HmacSha256);
        let pair = Pair {
            a: "1".into(),
            b: "2".into(),
            sign: String::new(),
        };
        let sign = signer.sign(&pair);
        assert_eq!(
            sign,
            "8AE40A63BFA27CD56D0B8AD61610F24D1D3333F16E27F9B9B49E25E066A8E902"
        );
        assert!(signer.verify(&pair, &sign.to_lowercase()));
        assert!(!signer.verify(&pair, "62ACCBFAC5415ECAB539F8EE2FD92648"));
    }

    #[test]
    fn test_sign_type_parse_and_display() {
        assert_eq!("HMAC-SHA256".parse::<SignType>().unwrap(), SignType::HmacSha256);
        assert_eq!("md5".parse::<SignType>().unwrap(), SignType::Md5);
        assert!("SHA1".parse::<SignType>().is_err());
        assert_eq!(SignType::HmacSha256.to_string(), "HMAC-SHA256");
    }

    #[test]
    fn test_signer_debug_redacts_key() {
        let rendered = format!("{:?}", Signer::new("top-secret", SignType::Md5));
        assert!(!rendered.contains("top-secret"));
    }
}
