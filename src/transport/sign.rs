use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::domain::AccessKey;
use crate::transport::request::PreparedRequest;

/// Header carrying the signing timestamp.
pub const DATE_HEADER: &str = "x-ms-date";
/// Header carrying the base64 SHA-256 digest of the body.
pub const CONTENT_HASH_HEADER: &str = "x-ms-content-sha256";
/// Fixed list of headers covered by the signature, as advertised in the
/// `Authorization` header.
pub const SIGNED_HEADERS: &str = "x-ms-date;host;x-ms-content-sha256";

const AUTHORIZATION_HEADER: &str = "Authorization";

// RFC 1123 as used in HTTP Date headers, e.g. "Mon, 01 Jul 2024 12:00:00 GMT".
const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, thiserror::Error)]
/// Errors raised while signing a request.
pub enum SignError {
    /// The access key is not valid base64 and no secret could be derived.
    #[error("access key is not valid base64: {0}")]
    InvalidSecret(#[from] base64::DecodeError),
}

#[derive(Debug, Clone)]
/// Computes the HMAC-SHA256 authentication headers proving possession of the
/// shared secret, bound to the exact request being sent.
///
/// Each invocation reads the clock and recomputes the signature, so a request
/// must be signed immediately before dispatch and never reused.
pub struct Signer {
    key: AccessKey,
}

impl Signer {
    pub fn new(key: AccessKey) -> Self {
        Self { key }
    }

    /// Sign `request` with the current UTC time.
    pub fn sign(&self, request: &mut PreparedRequest) -> Result<(), SignError> {
        let date = Utc::now().format(HTTP_DATE_FORMAT).to_string();
        self.sign_with_date(request, &date)
    }

    /// Sign `request` with a caller-supplied date value.
    ///
    /// The date must already be in HTTP-date form; it is written to the
    /// `x-ms-date` header verbatim and covered by the signature. Signing with
    /// the same date over identical inputs is idempotent.
    pub fn sign_with_date(
        &self,
        request: &mut PreparedRequest,
        date: &str,
    ) -> Result<(), SignError> {
        let secret = BASE64.decode(self.key.as_str())?;

        let hash = content_hash(request.body());
        let string_to_sign = format!(
            "{}\n{}\n{};{};{}",
            request.method(),
            request.resource(),
            date,
            request.host(),
            hash,
        );

        debug!(
            method = %request.method(),
            resource = %request.resource(),
            host = %request.host(),
            "signing request"
        );

        let signature = compute_signature(&string_to_sign, &secret);

        request.set_header(DATE_HEADER, date.to_owned());
        request.set_header(CONTENT_HASH_HEADER, hash);
        request.set_header(
            AUTHORIZATION_HEADER,
            format!("HMAC-SHA256 SignedHeaders={SIGNED_HEADERS}&Signature={signature}"),
        );

        Ok(())
    }
}

/// Base64-encoded SHA-256 digest of `body`.
///
/// An empty body hashes the empty byte sequence, never a null value.
pub fn content_hash(body: &[u8]) -> String {
    BASE64.encode(Sha256::digest(body))
}

fn compute_signature(string_to_sign: &str, secret: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC accepts any key length");
    mac.update(string_to_sign.as_bytes());
    BASE64.encode(mac.finalize().into_bytes())
}
