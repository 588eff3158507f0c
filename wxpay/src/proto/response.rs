//! Operation response types.
//!
//! Every response carries the two-level status the provider uses:
//! `return_code` reports whether the call was accepted at all and
//! `result_code` reports the business outcome. All values are kept as the
//! text the provider delivered; nothing is validated beyond document shape.

use serde::{Deserialize, Serialize};

use super::ErrorCode;
use crate::timestamp::WireTimestamp;

/// Status value meaning success in `return_code` and `result_code`.
pub const SUCCESS: &str = "SUCCESS";

/// Status value meaning failure in `return_code` and `result_code`.
pub const FAIL: &str = "FAIL";

/// Which status level a [`ProviderFailure`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureLevel {
    /// The request was rejected before business processing.
    Return,
    /// The request was processed but the operation failed.
    Business,
}

/// A failure reported inside an otherwise well-formed response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderFailure {
    /// Level the failure was reported at.
    pub level: FailureLevel,
    /// `return_code` or `err_code`, verbatim.
    pub code: String,
    /// `return_msg` or `err_code_des`.
    pub description: Option<String>,
}

impl ProviderFailure {
    /// The failure code as an [`ErrorCode`].
    #[must_use]
    pub fn error_code(&self) -> ErrorCode {
        ErrorCode::from(self.code.as_str())
    }
}

impl std::fmt::Display for ProviderFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.description {
            Some(description) => write!(f, "{}: {description}", self.code),
            None => f.write_str(&self.code),
        }
    }
}

/// Status accessors shared by all response types.
pub trait ProviderResponse {
    /// `return_code`, usually `SUCCESS` or `FAIL`.
    fn return_code(&self) -> &str;

    /// `return_msg`.
    fn return_msg(&self) -> Option<&str>;

    /// `result_code`, present once the request passed validation.
    fn result_code(&self) -> Option<&str>;

    /// `err_code`.
    fn err_code(&self) -> Option<&str>;

    /// `err_code_des`.
    fn err_code_des(&self) -> Option<&str>;

    /// Returns `true` when both status levels report success.
    fn is_success(&self) -> bool {
        self.return_code() == SUCCESS && self.result_code() == Some(SUCCESS)
    }

    /// Describes the failure, if the response reports one.
    fn failure(&self) -> Option<ProviderFailure> {
        if self.return_code() != SUCCESS {
            return Some(ProviderFailure {
                level: FailureLevel::Return,
                code: self.return_code().to_owned(),
                description: self.return_msg().map(str::to_owned),
            });
        }
        if self.result_code() == Some(SUCCESS) {
            return None;
        }
        Some(ProviderFailure {
            level: FailureLevel::Business,
            code: self
                .err_code()
                .or_else(|| self.result_code())
                .unwrap_or(FAIL)
                .to_owned(),
            description: self.err_code_des().map(str::to_owned),
        })
    }

    /// `err_code` as an [`ErrorCode`].
    fn error_code(&self) -> Option<ErrorCode> {
        self.err_code().map(ErrorCode::from)
    }
}

macro_rules! provider_response {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl ProviderResponse for $ty {
                fn return_code(&self) -> &str {
                    &self.return_code
                }

                fn return_msg(&self) -> Option<&str> {
                    self.return_msg.as_deref()
                }

                fn result_code(&self) -> Option<&str> {
                    self.result_code.as_deref()
                }

                fn err_code(&self) -> Option<&str> {
                    self.err_code.as_deref()
                }

                fn err_code_des(&self) -> Option<&str> {
                    self.err_code_des.as_deref()
                }
            }
        )+
    };
}

/// Reply to a profit-sharing request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfitSharingResponse {
    /// `SUCCESS` if the request was accepted.
    pub return_code: String,
    /// Reason for a return-level failure.
    #[serde(default)]
    pub return_msg: Option<String>,
    /// Business outcome, `SUCCESS` or `FAIL`.
    #[serde(default)]
    pub result_code: Option<String>,
    /// Business error code.
    #[serde(default)]
    pub err_code: Option<String>,
    /// Business error description.
    #[serde(default)]
    pub err_code_des: Option<String>,
    /// Provider transaction id of the shared payment.
    #[serde(default)]
    pub transaction_id: Option<String>,
    /// Merchant-side split order number.
    #[serde(default)]
    pub out_order_no: Option<String>,
    /// Provider-side split order id.
    #[serde(default)]
    pub order_id: Option<String>,
}

/// Reply to a receiver registration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddReceiverResponse {
    /// `SUCCESS` if the request was accepted.
    pub return_code: String,
    /// Reason for a return-level failure.
    #[serde(default)]
    pub return_msg: Option<String>,
    /// Business outcome, `SUCCESS` or `FAIL`.
    #[serde(default)]
    pub result_code: Option<String>,
    /// Business error code.
    #[serde(default)]
    pub err_code: Option<String>,
    /// Business error description.
    #[serde(default)]
    pub err_code_des: Option<String>,
    /// Echo of the registered receiver, as JSON text.
    #[serde(default)]
    pub receiver: Option<String>,
}

/// Reply to a refund request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefundResponse {
    /// `SUCCESS` if the request was accepted.
    pub return_code: String,
    /// Reason for a return-level failure.
    #[serde(default)]
    pub return_msg: Option<String>,
    /// Business outcome, `SUCCESS` or `FAIL`.
    #[serde(default)]
    pub result_code: Option<String>,
    /// Business error code.
    #[serde(default)]
    pub err_code: Option<String>,
    /// Business error description.
    #[serde(default)]
    pub err_code_des: Option<String>,
    /// Provider transaction id.
    #[serde(default)]
    pub transaction_id: Option<String>,
    /// Merchant order number.
    #[serde(default)]
    pub out_trade_no: Option<String>,
    /// Merchant refund number.
    #[serde(default)]
    pub out_refund_no: Option<String>,
    /// Provider-side refund id.
    #[serde(default)]
    pub refund_id: Option<String>,
    /// Refunded amount in fen.
    #[serde(default)]
    pub refund_fee: Option<String>,
}

/// Reply to either transfer variant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferResponse {
    /// `SUCCESS` if the request was accepted.
    pub return_code: String,
    /// Reason for a return-level failure.
    #[serde(default)]
    pub return_msg: Option<String>,
    /// Business outcome, `SUCCESS` or `FAIL`.
    #[serde(default)]
    pub result_code: Option<String>,
    /// Business error code.
    #[serde(default)]
    pub err_code: Option<String>,
    /// Business error description.
    #[serde(default)]
    pub err_code_des: Option<String>,
    /// Application id.
    #[serde(default)]
    pub mch_appid: Option<String>,
    /// Merchant id.
    #[serde(default)]
    pub mchid: Option<String>,
    /// Merchant-side transfer number.
    #[serde(default)]
    pub partner_trade_no: Option<String>,
    /// Provider-side payment number.
    #[serde(default)]
    pub payment_no: Option<String>,
    /// Completion time, `YYYY-MM-DD HH:MM:SS`.
    #[serde(default)]
    pub payment_time: Option<String>,
}

impl TransferResponse {
    /// Parses `payment_time`.
    ///
    /// Returns `None` when the field is absent and an inner error when it is
    /// not in wire format.
    #[must_use]
    pub fn payment_time(&self) -> Option<Result<WireTimestamp, chrono::ParseError>> {
        self.payment_time.as_deref().map(str::parse)
    }
}

/// Reply to a transfer status query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferQueryResponse {
    /// `SUCCESS` if the request was accepted.
    pub return_code: String,
    /// Reason for a return-level failure.
    #[serde(default)]
    pub return_msg: Option<String>,
    /// Business outcome, `SUCCESS` or `FAIL`.
    #[serde(default)]
    pub result_code: Option<String>,
    /// Business error code.
    #[serde(default)]
    pub err_code: Option<String>,
    /// Business error description.
    #[serde(default)]
    pub err_code_des: Option<String>,
    /// Merchant-side transfer number.
    #[serde(default)]
    pub partner_trade_no: Option<String>,
    /// Merchant id.
    #[serde(default)]
    pub mch_id: Option<String>,
    /// Provider-side transfer id.
    #[serde(default)]
    pub detail_id: Option<String>,
    /// `SUCCESS`, `FAILED` or `PROCESSING`.
    #[serde(default)]
    pub status: Option<String>,
    /// Failure reason.
    #[serde(default)]
    pub reason: Option<String>,
    /// Recipient openid.
    #[serde(default)]
    pub openid: Option<String>,
    /// Recipient name.
    #[serde(default)]
    pub transfer_name: Option<String>,
    /// Amount in fen.
    #[serde(default)]
    pub payment_amount: Option<String>,
    /// Transfer start time, `YYYY-MM-DD HH:MM:SS`.
    #[serde(default)]
    pub transfer_time: Option<String>,
    /// Transfer description.
    #[serde(default)]
    pub desc: Option<String>,
}

impl TransferQueryResponse {
    /// Parses `transfer_time`.
    ///
    /// Returns `None` when the field is absent.
    #[must_use]
    pub fn transfer_time(&self) -> Option<Result<WireTimestamp, chrono::ParseError>> {
        self.transfer_time.as_deref().map(str::parse)
    }

    /// Parses `payment_amount` as fen.
    #[must_use]
    pub fn payment_amount(&self) -> Option<i64> {
        self.payment_amount.as_deref()?.trim().parse().ok()
    }
}

provider_response!(
    ProfitSharingResponse,
    AddReceiverResponse,
    RefundResponse,
    TransferResponse,
    TransferQueryResponse,
);
