//! Operation request types.
//!
//! Each request embeds an [`Envelope`] and declares its wire fields through
//! [`WireFields`]. Identity fields (`appid`/`mch_id`, or `mch_appid`/`mchid`
//! for transfers) are left empty by the constructors and filled in by
//! [`enrich`](crate::enrich).

use serde::{Deserialize, Serialize};

use crate::canonical::{Field, WireFields};
use crate::envelope::{Envelope, Identity, SignedRequest};

/// `check_name` value for transfers that verify the recipient's real name.
pub const FORCE_CHECK: &str = "FORCE_CHECK";

/// `check_name` value for transfers without a real-name check.
pub const NO_CHECK: &str = "NO_CHECK";

macro_rules! signed_request {
    ($ty:ty, $app:ident, $mch:ident) => {
        impl SignedRequest for $ty {
            fn envelope(&self) -> &Envelope {
                &self.envelope
            }

            fn envelope_mut(&mut self) -> &mut Envelope {
                &mut self.envelope
            }

            fn set_identity(&mut self, identity: &Identity) {
                self.$app.clone_from(&identity.app_id);
                self.$mch.clone_from(&identity.mch_id);
            }
        }
    };
}

/// One profit-sharing receiver, sent as JSON inside `receivers` or
/// `receiver`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiverItem {
    /// Receiver kind, e.g. `MERCHANT_ID` or `PERSONAL_OPENID`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Receiver account (merchant id or openid).
    pub account: String,
    /// Receiver name, required for merchant receivers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Relationship to the sharing merchant, e.g. `SERVICE_PROVIDER`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relation_type: Option<String>,
    /// Amount to share, in fen.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<i64>,
    /// Reason shown to the receiver.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ReceiverItem {
    /// Creates a receiver with only kind and account set.
    #[must_use]
    pub fn new(kind: impl Into<String>, account: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            account: account.into(),
            name: None,
            relation_type: None,
            amount: None,
            description: None,
        }
    }

    /// Sets the receiver name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the relationship type.
    #[must_use]
    pub fn with_relation_type(mut self, relation_type: impl Into<String>) -> Self {
        self.relation_type = Some(relation_type.into());
        self
    }

    /// Sets the shared amount in fen.
    #[must_use]
    pub const fn with_amount(mut self, amount: i64) -> Self {
        self.amount = Some(amount);
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Splits a settled payment among receivers (`/secapi/pay/profitsharing`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfitSharingRequest {
    /// Shared envelope.
    pub envelope: Envelope,
    /// Application id.
    pub appid: String,
    /// Merchant id.
    pub mch_id: String,
    /// Provider transaction id of the original payment.
    pub transaction_id: String,
    /// Merchant-side order number for this split.
    pub out_order_no: String,
    /// JSON array of receivers.
    pub receivers: String,
}

impl ProfitSharingRequest {
    /// Creates a request with `receivers` JSON-encoded from `receivers`.
    ///
    /// # Errors
    ///
    /// Returns an error if the receiver list cannot be encoded.
    pub fn new(
        transaction_id: impl Into<String>,
        out_order_no: impl Into<String>,
        receivers: &[ReceiverItem],
    ) -> Result<Self, serde_json::Error> {
        Ok(Self {
            transaction_id: transaction_id.into(),
            out_order_no: out_order_no.into(),
            receivers: serde_json::to_string(receivers)?,
            ..Self::default()
        })
    }
}

impl WireFields for ProfitSharingRequest {
    fn wire_fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::embed(&self.envelope),
            Field::text("appid", &self.appid),
            Field::text("mch_id", &self.mch_id),
            Field::text("transaction_id", &self.transaction_id),
            Field::text("out_order_no", &self.out_order_no),
            Field::text("receivers", &self.receivers),
        ]
    }
}

signed_request!(ProfitSharingRequest, appid, mch_id);

/// Registers a profit-sharing receiver (`/pay/profitsharingaddreceiver`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddReceiverRequest {
    /// Shared envelope.
    pub envelope: Envelope,
    /// Application id.
    pub appid: String,
    /// Merchant id.
    pub mch_id: String,
    /// JSON object describing the receiver.
    pub receiver: String,
}

impl AddReceiverRequest {
    /// Creates a request with `receiver` JSON-encoded from `receiver`.
    ///
    /// # Errors
    ///
    /// Returns an error if the receiver cannot be encoded.
    pub fn new(receiver: &ReceiverItem) -> Result<Self, serde_json::Error> {
        Ok(Self {
            receiver: serde_json::to_string(receiver)?,
            ..Self::default()
        })
    }
}

impl WireFields for AddReceiverRequest {
    fn wire_fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::embed(&self.envelope),
            Field::text("appid", &self.appid),
            Field::text("mch_id", &self.mch_id),
            Field::text("receiver", &self.receiver),
        ]
    }
}

signed_request!(AddReceiverRequest, appid, mch_id);

/// Refunds part or all of a payment (`/secapi/pay/refund`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefundRequest {
    /// Shared envelope.
    pub envelope: Envelope,
    /// Application id.
    pub appid: String,
    /// Merchant id.
    pub mch_id: String,
    /// Merchant order number of the original payment.
    pub out_trade_no: String,
    /// Merchant-side refund number.
    pub out_refund_no: String,
    /// Total amount of the original payment, in fen.
    pub total_fee: i64,
    /// Amount to refund, in fen.
    pub refund_fee: i64,
    /// Refund reason.
    pub refund_desc: Option<String>,
}

impl RefundRequest {
    /// Creates a refund request without a description.
    #[must_use]
    pub fn new(
        out_trade_no: impl Into<String>,
        out_refund_no: impl Into<String>,
        total_fee: i64,
        refund_fee: i64,
    ) -> Self {
        Self {
            out_trade_no: out_trade_no.into(),
            out_refund_no: out_refund_no.into(),
            total_fee,
            refund_fee,
            ..Self::default()
        }
    }

    /// Sets the refund reason.
    #[must_use]
    pub fn with_refund_desc(mut self, refund_desc: impl Into<String>) -> Self {
        self.refund_desc = Some(refund_desc.into());
        self
    }
}

impl WireFields for RefundRequest {
    fn wire_fields(&self) -> Vec<Field<'_>> {
        let mut fields = vec![
            Field::embed(&self.envelope),
            Field::text("appid", &self.appid),
            Field::text("mch_id", &self.mch_id),
            Field::text("out_trade_no", &self.out_trade_no),
            Field::text("out_refund_no", &self.out_refund_no),
            Field::int("total_fee", self.total_fee),
            Field::int("refund_fee", self.refund_fee),
        ];
        fields.extend(Field::text_opt("refund_desc", self.refund_desc.as_deref()));
        fields
    }
}

signed_request!(RefundRequest, appid, mch_id);

/// Company-to-individual transfer with a real-name check
/// (`/mmpaymkttransfers/promotion/transfers`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferRequest {
    /// Shared envelope.
    pub envelope: Envelope,
    /// Application id (`mch_appid`).
    pub mch_appid: String,
    /// Merchant id (`mchid`).
    pub mchid: String,
    /// Merchant-side transfer number.
    pub partner_trade_no: String,
    /// Recipient openid.
    pub openid: String,
    /// Recipient real name, checked by the provider.
    pub re_user_name: String,
    /// Amount in fen.
    pub amount: i64,
    /// Description shown to the recipient.
    pub desc: String,
    /// IP address of the calling server.
    pub spbill_create_ip: String,
}

impl WireFields for TransferRequest {
    fn wire_fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::embed(&self.envelope),
            Field::text("mch_appid", &self.mch_appid),
            Field::text("mchid", &self.mchid),
            Field::text("partner_trade_no", &self.partner_trade_no),
            Field::text("openid", &self.openid),
            Field::text("check_name", FORCE_CHECK),
            Field::text("re_user_name", &self.re_user_name),
            Field::int("amount", self.amount),
            Field::text("desc", &self.desc),
            Field::text("spbill_create_ip", &self.spbill_create_ip),
        ]
    }
}

signed_request!(TransferRequest, mch_appid, mchid);

/// Company-to-individual transfer without a real-name check.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferNoCheckRequest {
    /// Shared envelope.
    pub envelope: Envelope,
    /// Application id (`mch_appid`).
    pub mch_appid: String,
    /// Merchant id (`mchid`).
    pub mchid: String,
    /// Merchant-side transfer number.
    pub partner_trade_no: String,
    /// Recipient openid.
    pub openid: String,
    /// Amount in fen.
    pub amount: i64,
    /// Description shown to the recipient.
    pub desc: String,
    /// IP address of the calling server.
    pub spbill_create_ip: String,
}

impl WireFields for TransferNoCheckRequest {
    fn wire_fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::embed(&self.envelope),
            Field::text("mch_appid", &self.mch_appid),
            Field::text("mchid", &self.mchid),
            Field::text("partner_trade_no", &self.partner_trade_no),
            Field::text("openid", &self.openid),
            Field::text("check_name", NO_CHECK),
            Field::int("amount", self.amount),
            Field::text("desc", &self.desc),
            Field::text("spbill_create_ip", &self.spbill_create_ip),
        ]
    }
}

signed_request!(TransferNoCheckRequest, mch_appid, mchid);

/// Looks up the status of a transfer (`/mmpaymkttransfers/gettransferinfo`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferQueryRequest {
    /// Shared envelope.
    pub envelope: Envelope,
    /// Application id.
    pub appid: String,
    /// Merchant id.
    pub mch_id: String,
    /// Merchant-side transfer number to look up.
    pub partner_trade_no: String,
}

impl TransferQueryRequest {
    /// Creates a query for `partner_trade_no`.
    #[must_use]
    pub fn new(partner_trade_no: impl Into<String>) -> Self {
        Self {
            partner_trade_no: partner_trade_no.into(),
            ..Self::default()
        }
    }
}

impl WireFields for TransferQueryRequest {
    fn wire_fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::embed(&self.envelope),
            Field::text("appid", &self.appid),
            Field::text("mch_id", &self.mch_id),
            Field::text("partner_trade_no", &self.partner_trade_no),
        ]
    }
}

signed_request!(TransferQueryRequest, appid, mch_id);
