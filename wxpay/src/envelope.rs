//! Shared request envelope and request enrichment.
//!
//! Every signed request embeds an [`Envelope`] (`nonce_str`, `sign_type`,
//! `sign`) and carries the merchant [`Identity`]. [`enrich`] fills both in
//! immediately before a request is serialized.

use crate::canonical::{Field, WireFields};
use crate::nonce::generate_nonce;
use crate::sign::{SignType, Signer};

/// Fields common to every signed request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Envelope {
    /// Single-use random token.
    pub nonce_str: String,
    /// Upper-case hex signature over all other fields.
    pub sign: String,
    /// Algorithm used for `sign`.
    pub sign_type: SignType,
}

impl WireFields for Envelope {
    fn wire_fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::text("sign", &self.sign),
            Field::text("sign_type", self.sign_type.as_str()),
            Field::text("nonce_str", &self.nonce_str),
        ]
    }
}

/// Merchant identity copied into every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Application id bound to the merchant account.
    pub app_id: String,
    /// Merchant id.
    pub mch_id: String,
}

impl Identity {
    /// Creates an identity.
    #[must_use]
    pub fn new(app_id: impl Into<String>, mch_id: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            mch_id: mch_id.into(),
        }
    }
}

/// A request that carries an [`Envelope`] and identity fields.
pub trait SignedRequest: WireFields {
    /// The embedded envelope.
    fn envelope(&self) -> &Envelope;

    /// Mutable access to the embedded envelope.
    fn envelope_mut(&mut self) -> &mut Envelope;

    /// Writes the merchant identity into the request's own id fields.
    fn set_identity(&mut self, identity: &Identity);
}

/// Fills identity, a fresh nonce, the sign type and the signature into
/// `request`.
///
/// Any previous signature is discarded before signing.
pub fn enrich<R: SignedRequest>(request: &mut R, identity: &Identity, signer: &Signer) {
    request.set_identity(identity);
    {
        let envelope = request.envelope_mut();
        envelope.nonce_str = generate_nonce();
        envelope.sign_type = signer.sign_type();
        envelope.sign.clear();
    }
    let sign = signer.sign(&*request);
    request.envelope_mut().sign = sign;

    #[cfg(feature = "telemetry")]
    tracing::debug!(
        sign_type = %signer.sign_type(),
        mch_id = %identity.mch_id,
        "request enriched"
    );
}
