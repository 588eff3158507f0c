//! The API client.
//!
//! [`WxPayClient`] owns two pooled `reqwest` clients, one per TLS profile,
//! and exposes one method per operation. Each call takes its request by
//! value, enriches and signs it, posts the XML document and decodes the
//! reply. The client holds no per-call state, so clones can be shared freely
//! across tasks.
//!
//! ## Error Handling
//!
//! - [`ConfigError`] at construction when identity or credentials are invalid
//! - [`ClientError::Transport`] when the request cannot be completed
//! - [`ClientError::Decode`] when the body is not a valid response document
//!
//! HTTP status codes are not inspected: a non-2xx reply carrying a response
//! document decodes like any other.

use std::fmt::Display;
use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;
use url::Url;
use wxpay::{
    AddReceiverRequest, AddReceiverResponse, Identity, ProfitSharingRequest,
    ProfitSharingResponse, RefundRequest, RefundResponse, SignType, SignedRequest, Signer,
    TransferNoCheckRequest, TransferQueryRequest, TransferQueryResponse, TransferRequest,
    TransferResponse, enrich,
};

#[cfg(feature = "telemetry")]
use tracing::{Span, instrument};

use crate::config::ClientConfig;
use crate::constants::{
    ADD_RECEIVER_PATH, DEFAULT_BASE_URL, PROFIT_SHARING_PATH, REFUND_PATH, SANDBOX_PREFIX,
    TRANSFER_PATH, TRANSFER_QUERY_PATH, XML_CONTENT_TYPE,
};
use crate::error::{ClientError, ConfigError};
use crate::tls::{certified_client, plain_client};

/// Which HTTP client an operation uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// Mutual TLS with the merchant client certificate.
    Certified,
    /// Plain HTTPS.
    Plain,
}

/// The operations this client supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Split a settled payment among receivers.
    ProfitSharing,
    /// Register a profit-sharing receiver.
    AddReceiver,
    /// Refund a payment.
    Refund,
    /// Transfer to an individual with a real-name check.
    Transfer,
    /// Transfer to an individual without a real-name check.
    TransferNoCheck,
    /// Query a transfer.
    TransferQuery,
}

impl Operation {
    /// Path of the operation, without the sandbox prefix.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::ProfitSharing => PROFIT_SHARING_PATH,
            Self::AddReceiver => ADD_RECEIVER_PATH,
            Self::Refund => REFUND_PATH,
            Self::Transfer | Self::TransferNoCheck => TRANSFER_PATH,
            Self::TransferQuery => TRANSFER_QUERY_PATH,
        }
    }

    /// TLS profile the operation is sent over.
    #[must_use]
    pub const fn profile(self) -> Profile {
        match self {
            Self::AddReceiver => Profile::Plain,
            _ => Profile::Certified,
        }
    }

    /// Label used in errors and traces.
    #[must_use]
    pub const fn context(self) -> &'static str {
        match self {
            Self::ProfitSharing => "POST profitsharing",
            Self::AddReceiver => "POST profitsharingaddreceiver",
            Self::Refund => "POST refund",
            Self::Transfer => "POST transfers",
            Self::TransferNoCheck => "POST transfers (no check)",
            Self::TransferQuery => "POST gettransferinfo",
        }
    }
}

/// Client for the provider's server-to-server API.
///
/// # Example
///
/// ```no_run
/// use wxpay::RefundRequest;
/// use wxpay_http::{ClientConfig, CredentialSource, WxPayClient};
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let config = ClientConfig::new("wx8888888888888888", "1900000109", "api-key")
///     .with_client_cert(CredentialSource::Path("apiclient_cert.pem".into()))
///     .with_client_key(CredentialSource::Path("apiclient_key.pem".into()))
///     .with_ca(CredentialSource::Path("rootca.pem".into()));
/// let client = WxPayClient::new(&config)?;
/// let response = client.refund(RefundRequest::new("T1", "R1", 100, 50)).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct WxPayClient {
    /// Base URL without a trailing slash.
    base_url: String,
    identity: Identity,
    signer: Signer,
    sandbox: bool,
    timeout: Option<Duration>,
    certified: reqwest::Client,
    plain: reqwest::Client,
}

impl WxPayClient {
    /// Builds a client, loading and validating all credential material.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if an identity value is empty, the base URL
    /// is invalid, or the certificate, key or CA material is missing or
    /// unusable.
    pub fn new(config: &ClientConfig) -> Result<Self, ConfigError> {
        config.validate_identity()?;
        let base = config.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
        let base_url = Url::parse(base)?.as_str().trim_end_matches('/').to_owned();

        let certified = certified_client(config)?;
        let plain = plain_client()?;

        #[cfg(feature = "telemetry")]
        tracing::debug!(
            base_url = %base_url,
            mch_id = %config.mch_id,
            sandbox = config.sandbox,
            sign_type = %config.sign_type,
            "wxpay client ready"
        );

        Ok(Self {
            base_url,
            identity: config.identity(),
            signer: config.signer(),
            sandbox: config.sandbox,
            timeout: config.timeout,
            certified,
            plain,
        })
    }

    /// Sets a timeout for all future requests.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Returns the base URL used by this client.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the merchant identity stamped into every request.
    #[must_use]
    pub const fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Returns the signature algorithm.
    #[must_use]
    pub const fn sign_type(&self) -> SignType {
        self.signer.sign_type()
    }

    /// Returns `true` if calls are routed through the sandbox.
    #[must_use]
    pub const fn is_sandbox(&self) -> bool {
        self.sandbox
    }

    /// Returns the configured timeout, if any.
    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Full URL of `operation`, including the sandbox prefix when enabled.
    #[must_use]
    pub fn endpoint(&self, operation: Operation) -> String {
        let prefix = if self.sandbox { SANDBOX_PREFIX } else { "" };
        format!("{}{prefix}{}", self.base_url, operation.path())
    }

    /// Splits a settled payment among receivers.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on transport or decode failure.
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "wxpay.profit_sharing", skip_all, err, fields(out_order_no = %request.out_order_no))
    )]
    pub async fn profit_sharing(
        &self,
        request: ProfitSharingRequest,
    ) -> Result<ProfitSharingResponse, ClientError> {
        self.call(Operation::ProfitSharing, request).await
    }

    /// Registers a profit-sharing receiver.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on transport or decode failure.
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "wxpay.add_receiver", skip_all, err)
    )]
    pub async fn add_receiver(
        &self,
        request: AddReceiverRequest,
    ) -> Result<AddReceiverResponse, ClientError> {
        self.call(Operation::AddReceiver, request).await
    }

    /// Refunds part or all of a payment.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on transport or decode failure.
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "wxpay.refund", skip_all, err, fields(out_refund_no = %request.out_refund_no))
    )]
    pub async fn refund(&self, request: RefundRequest) -> Result<RefundResponse, ClientError> {
        self.call(Operation::Refund, request).await
    }

    /// Transfers to an individual with a real-name check.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on transport or decode failure.
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "wxpay.transfer", skip_all, err, fields(partner_trade_no = %request.partner_trade_no))
    )]
    pub async fn transfer(&self, request: TransferRequest) -> Result<TransferResponse, ClientError> {
        self.call(Operation::Transfer, request).await
    }

    /// Transfers to an individual without a real-name check.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on transport or decode failure.
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "wxpay.transfer_no_check", skip_all, err, fields(partner_trade_no = %request.partner_trade_no))
    )]
    pub async fn transfer_no_check(
        &self,
        request: TransferNoCheckRequest,
    ) -> Result<TransferResponse, ClientError> {
        self.call(Operation::TransferNoCheck, request).await
    }

    /// Looks up the status of a transfer.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on transport or decode failure.
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "wxpay.transfer_query", skip_all, err, fields(partner_trade_no = %request.partner_trade_no))
    )]
    pub async fn transfer_query(
        &self,
        request: TransferQueryRequest,
    ) -> Result<TransferQueryResponse, ClientError> {
        self.call(Operation::TransferQuery, request).await
    }

    /// Enriches, signs, sends and decodes one request.
    async fn call<Req, Resp>(&self, operation: Operation, mut request: Req) -> Result<Resp, ClientError>
    where
        Req: SignedRequest + Send,
        Resp: DeserializeOwned,
    {
        let context = operation.context();
        enrich(&mut request, &self.identity, &self.signer);
        let body = wxpay::xml::encode(&request);

        let client = match operation.profile() {
            Profile::Certified => &self.certified,
            Profile::Plain => &self.plain,
        };
        let mut req = client
            .post(self.endpoint(operation))
            .header(CONTENT_TYPE, XML_CONTENT_TYPE)
            .body(body);
        if let Some(timeout) = self.timeout {
            req = req.timeout(timeout);
        }
        let http_response = req
            .send()
            .await
            .map_err(|source| ClientError::Transport { context, source })?;

        #[cfg(feature = "telemetry")]
        {
            let status = http_response.status();
            if !status.is_success() {
                tracing::warn!(%status, context, "non-success HTTP status, decoding body anyway");
            }
        }

        let bytes = http_response
            .bytes()
            .await
            .map_err(|source| ClientError::Transport { context, source })?;
        let result = wxpay::xml::decode(&bytes).map_err(|source| ClientError::Decode { context, source });

        record_result_on_span(&result);

        result
    }
}

/// Records the outcome of a call on the current span.
#[cfg(feature = "telemetry")]
fn record_result_on_span<R, E: Display>(result: &Result<R, E>) {
    let span = Span::current();
    match result {
        Ok(_) => {
            span.record("otel.status_code", "OK");
        }
        Err(err) => {
            span.record("otel.status_code", "ERROR");
            tracing::event!(tracing::Level::ERROR, error = %err, "wxpay request failed");
        }
    }
}

/// Records the outcome of a call on the current span.
/// Noop if telemetry feature is off.
#[cfg(not(feature = "telemetry"))]
fn record_result_on_span<R, E: Display>(_result: &Result<R, E>) {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CredentialSource;
    use std::collections::HashSet;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};
    use wxpay::canonical::FieldMap;
    use wxpay::xml::decode_fields;
    use wxpay::{ProviderResponse, ReceiverItem};

    const CLIENT_CERT: &[u8] = include_bytes!("../tests/fixtures/client.pem");
    const CLIENT_KEY: &[u8] = include_bytes!("../tests/fixtures/client.key");
    const CA_CERT: &[u8] = include_bytes!("../tests/fixtures/ca.pem");

    const SUCCESS_BODY: &str = "<xml>\
        <return_code><![CDATA[SUCCESS]]></return_code>\
        <return_msg><![CDATA[OK]]></return_msg>\
        <result_code><![CDATA[SUCCESS]]></result_code>\
        </xml>";

    fn config(base_url: &str) -> ClientConfig {
        ClientConfig::new("wx-app", "10000100", "secret")
            .with_client_cert(CredentialSource::Pem(CLIENT_CERT.to_vec()))
            .with_client_key(CredentialSource::Pem(CLIENT_KEY.to_vec()))
            .with_ca(CredentialSource::Pem(CA_CERT.to_vec()))
            .with_base_url(base_url)
    }

    async fn received_fields(server: &MockServer) -> Vec<FieldMap> {
        server
            .received_requests()
            .await
            .unwrap()
            .iter()
            .map(|r| decode_fields(&r.body).unwrap())
            .collect()
    }

    #[test]
    fn test_operation_profiles() {
        assert_eq!(Operation::AddReceiver.profile(), Profile::Plain);
        for operation in [
            Operation::ProfitSharing,
            Operation::Refund,
            Operation::Transfer,
            Operation::TransferNoCheck,
            Operation::TransferQuery,
        ] {
            assert_eq!(operation.profile(), Profile::Certified);
        }
        assert_eq!(
            Operation::Transfer.path(),
            Operation::TransferNoCheck.path()
        );
    }

    #[test]
    fn test_default_endpoints() {
        let client = WxPayClient::new(&ClientConfig {
            base_url: None,
            ..config("")
        })
        .unwrap();
        assert_eq!(
            client.endpoint(Operation::Refund),
            "https://api.mch.weixin.qq.com/secapi/pay/refund"
        );

        let sandbox = WxPayClient::new(&ClientConfig {
            base_url: None,
            ..config("").with_sandbox(true)
        })
        .unwrap();
        assert_eq!(
            sandbox.endpoint(Operation::TransferQuery),
            "https://api.mch.weixin.qq.com/sandbox/mmpaymkttransfers/gettransferinfo"
        );
    }

    #[test]
    fn test_missing_credentials_fail_construction() {
        let mut cfg = config("http://localhost");
        cfg.ca = None;
        let err = WxPayClient::new(&cfg).unwrap_err();
        assert!(matches!(err, ConfigError::MissingCredential(_)));

        let err = WxPayClient::new(&ClientConfig::new("wx", "100", "")).unwrap_err();
        assert!(matches!(err, ConfigError::MissingCredential("api_key")));
    }

    #[test]
    fn test_invalid_base_url_fails_construction() {
        let err = WxPayClient::new(&config("not a url")).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBaseUrl(_)));
    }

    #[tokio::test]
    async fn test_refund_sends_signed_document() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/secapi/pay/refund"))
            .and(header("content-type", "text/xml"))
            .respond_with(ResponseTemplate::new(200).set_body_string(SUCCESS_BODY))
            .expect(1)
            .mount(&server)
            .await;

        let client = WxPayClient::new(&config(&server.uri())).unwrap();
        let response = client
            .refund(RefundRequest::new("T1", "R1", 100, 50).with_refund_desc("damaged"))
            .await
            .unwrap();
        assert!(response.is_success());

        let sent = received_fields(&server).await;
        assert_eq!(sent.len(), 1);
        let fields = &sent[0];
        assert_eq!(fields.get("appid"), Some("wx-app"));
        assert_eq!(fields.get("mch_id"), Some("10000100"));
        assert_eq!(fields.get("out_trade_no"), Some("T1"));
        assert_eq!(fields.get("total_fee"), Some("100"));
        assert_eq!(fields.get("refund_desc"), Some("damaged"));
        assert_eq!(fields.get("nonce_str").map(str::len), Some(32));
        let signer = Signer::new("secret", SignType::HmacSha256);
        assert_eq!(fields.get("sign"), Some(signer.sign_map(fields).as_str()));
    }

    #[tokio::test]
    async fn test_sandbox_prefix_applied() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/sandbox/mmpaymkttransfers/gettransferinfo"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                "<xml><return_code>SUCCESS</return_code>\
                 <result_code>SUCCESS</result_code>\
                 <status>SUCCESS</status>\
                 <transfer_time>2015-04-21 20:00:00</transfer_time></xml>",
            ))
            .expect(1)
            .mount(&server)
            .await;

        let client = WxPayClient::new(&config(&server.uri()).with_sandbox(true)).unwrap();
        let response = client
            .transfer_query(TransferQueryRequest::new("PT1"))
            .await
            .unwrap();
        assert_eq!(response.status.as_deref(), Some("SUCCESS"));
        assert!(response.transfer_time().unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_add_receiver_round_trip() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/pay/profitsharingaddreceiver"))
            .respond_with(ResponseTemplate::new(200).set_body_string(SUCCESS_BODY))
            .mount(&server)
            .await;

        let client = WxPayClient::new(&config(&server.uri())).unwrap();
        let receiver = ReceiverItem::new("MERCHANT_ID", "190001001")
            .with_name("Example Ltd")
            .with_relation_type("SERVICE_PROVIDER");
        let response = client
            .add_receiver(AddReceiverRequest::new(&receiver).unwrap())
            .await
            .unwrap();
        assert!(response.is_success());

        let sent = received_fields(&server).await;
        let echoed: ReceiverItem = serde_json::from_str(sent[0].get("receiver").unwrap()).unwrap();
        assert_eq!(echoed, receiver);
    }

    #[tokio::test]
    async fn test_transfer_variants_share_path() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/mmpaymkttransfers/promotion/transfers"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                "<xml><return_code>SUCCESS</return_code>\
                 <result_code>SUCCESS</result_code>\
                 <payment_no>1000018301201505190181489473</payment_no>\
                 <payment_time>2015-05-19 15:26:59</payment_time></xml>",
            ))
            .expect(2)
            .mount(&server)
            .await;

        let client = WxPayClient::new(&config(&server.uri())).unwrap();
        let checked = client
            .transfer(TransferRequest {
                partner_trade_no: "PT1".into(),
                openid: "o-1".into(),
                re_user_name: "Alice".into(),
                amount: 100,
                desc: "bonus".into(),
                spbill_create_ip: "10.0.0.1".into(),
                ..TransferRequest::default()
            })
            .await
            .unwrap();
        assert!(checked.payment_time().unwrap().is_ok());
        client
            .transfer_no_check(TransferNoCheckRequest {
                partner_trade_no: "PT2".into(),
                amount: 100,
                ..TransferNoCheckRequest::default()
            })
            .await
            .unwrap();

        let sent = received_fields(&server).await;
        assert_eq!(sent[0].get("check_name"), Some("FORCE_CHECK"));
        assert_eq!(sent[0].get("mch_appid"), Some("wx-app"));
        assert_eq!(sent[1].get("check_name"), Some("NO_CHECK"));
        assert!(!sent[1].contains("re_user_name"));
    }

    #[tokio::test]
    async fn test_non_success_status_still_decodes() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/secapi/pay/profitsharing"))
            .respond_with(ResponseTemplate::new(500).set_body_string(
                "<xml><return_code>FAIL</return_code>\
                 <return_msg>SYSTEMERROR</return_msg></xml>",
            ))
            .mount(&server)
            .await;

        let client = WxPayClient::new(&config(&server.uri())).unwrap();
        let request = ProfitSharingRequest::new("4200000001", "P1", &[]).unwrap();
        let response = client.profit_sharing(request).await.unwrap();
        assert!(!response.is_success());
        assert_eq!(response.return_code, "FAIL");
        assert_eq!(response.failure().unwrap().code, "FAIL");
    }

    #[tokio::test]
    async fn test_malformed_body_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>bad gateway"))
            .mount(&server)
            .await;

        let client = WxPayClient::new(&config(&server.uri())).unwrap();
        let err = client
            .refund(RefundRequest::new("T1", "R1", 100, 50))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Decode { context: "POST refund", .. }));
    }

    #[tokio::test]
    async fn test_timeout_is_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(SUCCESS_BODY)
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let client = WxPayClient::new(&config(&server.uri()))
            .unwrap()
            .with_timeout(Duration::from_millis(100));
        let err = client
            .refund(RefundRequest::new("T1", "R1", 100, 50))
            .await
            .unwrap_err();
        match err {
            ClientError::Transport { source, .. } => assert!(source.is_timeout()),
            other => panic!("expected transport error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_concurrent_calls_use_distinct_nonces() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string(SUCCESS_BODY))
            .mount(&server)
            .await;

        let client = WxPayClient::new(&config(&server.uri())).unwrap();
        let handles: Vec<_> = (0..16)
            .map(|i| {
                let client = client.clone();
                tokio::spawn(async move {
                    client
                        .refund(RefundRequest::new(format!("T{i}"), format!("R{i}"), 100, 1))
                        .await
                })
            })
            .collect();
        for handle in handles {
            assert!(handle.await.unwrap().unwrap().is_success());
        }

        let nonces: HashSet<String> = received_fields(&server)
            .await
            .iter()
            .map(|f| f.get("nonce_str").unwrap().to_owned())
            .collect();
        assert_eq!(nonces.len(), 16);
    }
}
