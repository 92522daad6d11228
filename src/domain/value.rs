use url::Url;

use crate::domain::validation::ValidationError;

use phonenumber::country;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Base64-encoded shared secret used to sign every outbound request.
///
/// Invariant: non-empty after trimming. The value is only base64-decoded at
/// signing time; an undecodable key surfaces as a signing error, not here.
pub struct AccessKey(String);

impl AccessKey {
    pub const FIELD: &'static str = "access key";

    /// Create a validated [`AccessKey`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the base64-encoded key.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Base URL of a Communication Services resource,
/// e.g. `https://contoso.communication.azure.com`.
///
/// Invariant: absolute `http`/`https` URL with a host.
pub struct Endpoint(Url);

impl Endpoint {
    pub const FIELD: &'static str = "endpoint";

    /// Parse and validate an endpoint URL.
    pub fn new(value: impl AsRef<str>) -> Result<Self, ValidationError> {
        let trimmed = value.as_ref().trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        let url = Url::parse(trimmed).map_err(|_| ValidationError::InvalidEndpoint {
            input: trimmed.to_owned(),
        })?;
        if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
            return Err(ValidationError::InvalidEndpoint {
                input: trimmed.to_owned(),
            });
        }
        Ok(Self(url))
    }

    /// The validated URL.
    pub fn url(&self) -> &Url {
        &self.0
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Service API version appended to every request as the `api-version`
/// query parameter.
///
/// Invariant: non-empty after trimming. This is a per-client value; there is
/// no process-wide default to mutate.
pub struct ApiVersion(String);

impl ApiVersion {
    /// Query key used on the wire (`api-version`).
    pub const QUERY_KEY: &'static str = "api-version";

    /// Version this crate was written against.
    pub const DEFAULT: &'static str = "2024-06-15-preview";

    /// Create a validated [`ApiVersion`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty {
                field: Self::QUERY_KEY,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ApiVersion {
    fn default() -> Self {
        Self(Self::DEFAULT.to_owned())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// Phone number normalized to E.164, as the service expects for SMS senders,
/// recipients, and call targets.
pub struct E164Number(String);

impl E164Number {
    pub const FIELD: &'static str = "phone number";

    /// Parse and normalize a phone number into E.164.
    ///
    /// `default_region` is used when the input does not carry an explicit
    /// country prefix.
    pub fn parse(
        default_region: Option<country::Id>,
        input: impl AsRef<str>,
    ) -> Result<Self, ValidationError> {
        let raw = input.as_ref().trim();
        if raw.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }

        let parsed = phonenumber::parse(default_region, raw).map_err(|_| {
            ValidationError::InvalidPhoneNumber {
                input: raw.to_owned(),
            }
        })?;

        let e164 = phonenumber::format(&parsed)
            .mode(phonenumber::Mode::E164)
            .to_string();

        Ok(Self(e164))
    }

    /// Normalized E.164 representation.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// Identifier of an established call connection, as returned in call events.
///
/// Invariant: non-empty after trimming, and safe to interpolate into a
/// resource path (no `/`, `?`, `#`, or whitespace).
pub struct CallConnectionId(String);

impl CallConnectionId {
    pub const FIELD: &'static str = "callConnectionId";

    /// Create a validated [`CallConnectionId`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        if trimmed
            .chars()
            .any(|c| matches!(c, '/' | '?' | '#') || c.is_whitespace())
        {
            return Err(ValidationError::InvalidResourceId {
                field: Self::FIELD,
                input: trimmed.to_owned(),
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
