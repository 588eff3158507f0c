//! Wire types for the provider API.
//!
//! # Key Types
//!
//! - [`RefundRequest`] / [`RefundResponse`] - Refunds against a settled payment
//! - [`ProfitSharingRequest`] / [`ProfitSharingResponse`] - Payment splits
//! - [`AddReceiverRequest`] / [`AddReceiverResponse`] - Split receiver registration
//! - [`TransferRequest`], [`TransferNoCheckRequest`] / [`TransferResponse`] - Payouts to individuals
//! - [`TransferQueryRequest`] / [`TransferQueryResponse`] - Payout status
//! - [`ProviderResponse`] - Status accessors shared by every response
//! - [`ErrorCode`] - Business error-code vocabulary
//!
//! # Wire Format
//!
//! Requests and responses are flat XML documents rooted at `<xml>`, one
//! element per field. Amounts are integers in fen.

mod error_code;
mod request;
mod response;

pub use error_code::ErrorCode;
pub use request::{
    AddReceiverRequest, FORCE_CHECK, NO_CHECK, ProfitSharingRequest, ReceiverItem, RefundRequest,
    TransferNoCheckRequest, TransferQueryRequest, TransferRequest,
};
pub use response::{
    AddReceiverResponse, FAIL, FailureLevel, ProfitSharingResponse, ProviderFailure,
    ProviderResponse, RefundResponse, SUCCESS, TransferQueryResponse, TransferResponse,
};
