#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Core types for the WeChat Pay v2 merchant API.
//!
//! This crate builds and signs request documents and decodes the provider's
//! replies. It performs no I/O; the `wxpay-http` crate sends the documents.
//!
//! # Overview
//!
//! A call goes through four steps:
//!
//! 1. The caller builds an operation request such as [`RefundRequest`].
//! 2. [`enrich`] fills in the merchant [`Identity`], a fresh nonce, the sign
//!    type and the signature computed by [`Signer`].
//! 3. [`xml::encode`] renders the request as an `<xml>` document.
//! 4. [`xml::decode`] parses the reply into the matching response type.
//!
//! # Modules
//!
//! - [`canonical`] - Wire field declarations and canonical field maps
//! - [`sign`] - Base strings and HMAC-SHA256 / MD5 signatures
//! - [`nonce`] - Random `nonce_str` values
//! - [`envelope`] - Shared request envelope and request enrichment
//! - [`proto`] - Operation request and response types, error codes
//! - [`xml`] - Request encoding and response decoding
//! - [`timestamp`] - `YYYY-MM-DD HH:MM:SS` wire timestamps
//!
//! # Feature Flags
//!
//! - `telemetry` - Emits tracing events when requests are enriched

pub mod canonical;
pub mod envelope;
pub mod error;
pub mod nonce;
pub mod proto;
pub mod sign;
pub mod timestamp;
pub mod xml;

pub use canonical::{Field, FieldMap, FieldValue, Variant, WireFields};
pub use envelope::{Envelope, Identity, SignedRequest, enrich};
pub use error::{CanonicalError, DecodeError, SignTypeError};
pub use proto::{
    AddReceiverRequest, AddReceiverResponse, ErrorCode, ProfitSharingRequest,
    ProfitSharingResponse, ProviderFailure, ProviderResponse, ReceiverItem, RefundRequest,
    RefundResponse, TransferNoCheckRequest, TransferQueryRequest, TransferQueryResponse,
    TransferRequest, TransferResponse,
};
pub use sign::{SignType, Signer};
pub use timestamp::WireTimestamp;
