//! Endpoints, paths and transport defaults.

use std::time::Duration;

/// Production API host.
pub const DEFAULT_BASE_URL: &str = "https://api.mch.weixin.qq.com";

/// Path prefix inserted before every operation path in sandbox mode.
pub const SANDBOX_PREFIX: &str = "/sandbox";

/// Profit sharing.
pub const PROFIT_SHARING_PATH: &str = "/secapi/pay/profitsharing";

/// Profit-sharing receiver registration.
pub const ADD_RECEIVER_PATH: &str = "/pay/profitsharingaddreceiver";

/// Refund.
pub const REFUND_PATH: &str = "/secapi/pay/refund";

/// Company-to-individual transfer, with or without a real-name check.
pub const TRANSFER_PATH: &str = "/mmpaymkttransfers/promotion/transfers";

/// Transfer status query.
pub const TRANSFER_QUERY_PATH: &str = "/mmpaymkttransfers/gettransferinfo";

/// Content type of every request body.
pub const XML_CONTENT_TYPE: &str = "text/xml";

/// Dial plus TLS handshake budget.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// TCP keep-alive interval.
pub const TCP_KEEPALIVE: Duration = Duration::from_secs(30);

/// How long an idle pooled connection is kept.
pub const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);

/// Maximum idle pooled connections per host.
pub const POOL_MAX_IDLE_PER_HOST: usize = 100;
