#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! HTTP transport for the WeChat Pay v2 API.
//!
//! Builds on the request types and signer in [`wxpay`] and sends them over
//! the right TLS profile: mutual TLS with the merchant certificate for
//! money-moving endpoints, plain HTTPS for receiver registration.
//!
//! # Modules
//!
//! - [`client`] - [`WxPayClient`] and the per-operation methods
//! - [`config`] - [`ClientConfig`] and credential sources
//! - [`tls`] - Credential parsing and the two `reqwest` client profiles
//! - [`constants`] - Base URL, operation paths and transport timeouts
//! - [`error`] - Construction and call errors
//!
//! # Feature Flags
//!
//! - `telemetry` - Tracing spans for each operation and events for failed
//!   calls

pub mod client;
pub mod config;
pub mod constants;
pub mod error;
pub mod tls;

pub use client::{Operation, Profile, WxPayClient};
pub use config::{ClientConfig, CredentialSource};
pub use error::{ClientError, ConfigError};
