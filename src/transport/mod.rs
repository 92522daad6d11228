//! Transport core: request assembly and HMAC-SHA256 request signing.
//!
//! Nothing in this module performs I/O. A [`RequestBuilder`] resolves URL,
//! query, headers, and body into a [`PreparedRequest`]; a [`Signer`] then
//! binds the authentication headers to those exact bytes. Dispatch lives in
//! [`crate::client`].

mod request;
mod sign;

pub use request::{
    CONTENT_TYPE_FORM, CONTENT_TYPE_HEADER, CONTENT_TYPE_JSON, Method, PreparedRequest,
    RequestBuilder, RequestError,
};
pub use sign::{CONTENT_HASH_HEADER, DATE_HEADER, SIGNED_HEADERS, SignError, Signer, content_hash};
