//! Typed Rust client for the Azure Communication Services HTTP API.
//!
//! The crate is a thin, fully typed layer over the service's REST surface:
//! a domain layer of validated values, a transport core that assembles and
//! HMAC-SHA256-signs each request, a client layer orchestrating dispatch and
//! decoding, and per-service modules (SMS, call automation, identities)
//! sharing the one signed transport. [`events`] decodes the webhook payloads
//! the service posts back during calls.
//!
//! ```rust,no_run
//! use azcomm::{AccessKey, AzcommClient, E164Number, Endpoint};
//! use azcomm::sms::SendSmsRequest;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), azcomm::AzcommError> {
//!     let endpoint = Endpoint::new("https://contoso.communication.azure.com")?;
//!     let key = AccessKey::new("c2VjcmV0")?;
//!     let client = AzcommClient::new(endpoint, key);
//!
//!     let from = E164Number::parse(None, "+12065551000")?;
//!     let to = E164Number::parse(None, "+12065551001")?;
//!     let request = SendSmsRequest::new(&from, &[to], "hello");
//!     let _response = client.sms().send(&request).await?;
//!     Ok(())
//! }
//! ```
#![forbid(unsafe_code)]

pub mod calls;
pub mod client;
pub mod domain;
pub mod events;
pub mod identities;
pub mod sms;
pub mod transport;

pub use client::{AzcommClient, AzcommClientBuilder, AzcommError, ErrorDetail};
pub use domain::{
    AccessKey, ApiVersion, CallConnectionId, E164Number, Endpoint, ValidationError,
};
pub use transport::{
    Method, PreparedRequest, RequestBuilder, RequestError, SignError, Signer, content_hash,
};
