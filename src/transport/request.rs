use std::error::Error as StdError;
use std::fmt;

use serde::Serialize;
use url::{Position, Url};

pub const CONTENT_TYPE_HEADER: &str = "Content-Type";
pub const CONTENT_TYPE_JSON: &str = "application/json";
pub const CONTENT_TYPE_FORM: &str = "application/x-www-form-urlencoded";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// HTTP method of an outbound request.
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    /// Uppercase wire form, as it appears in the canonical string.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
/// Errors raised while assembling a request.
pub enum RequestError {
    /// The base URL or path could not be parsed or resolved.
    #[error("malformed url: {0}")]
    MalformedUrl(#[from] url::ParseError),

    /// A JSON/form body or query source could not be encoded.
    #[error("serialization error: {0}")]
    Serialization(#[source] Box<dyn StdError + Send + Sync>),
}

#[derive(Debug, Clone)]
enum Body {
    Empty,
    Json(Vec<u8>),
    Form(Vec<u8>),
    Raw(Vec<u8>),
}

impl Body {
    fn into_bytes(self) -> Vec<u8> {
        match self {
            Self::Empty => Vec::new(),
            Self::Json(bytes) | Self::Form(bytes) | Self::Raw(bytes) => bytes,
        }
    }
}

#[derive(Debug)]
/// Declarative request assembly: base URL, path, query sources, headers, and
/// at most one body. No I/O happens until the built request is dispatched.
///
/// Encoding failures inside the fluent setters are deferred and surfaced by
/// [`RequestBuilder::build`], so chains stay infallible at each step.
pub struct RequestBuilder {
    base: Url,
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    headers: Vec<(String, String)>,
    body: Body,
    deferred: Option<RequestError>,
}

impl RequestBuilder {
    /// Start a request against `base` with the given method and path
    /// reference. The path resolves with standard reference resolution:
    /// relative paths append, absolute paths replace.
    pub fn new(base: &Url, method: Method, path: impl Into<String>) -> Self {
        Self {
            base: base.clone(),
            method,
            path: path.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body: Body::Empty,
            deferred: None,
        }
    }

    /// Append a single query parameter. Repeated keys are kept, in order.
    pub fn query_pair(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Append every pair produced by serializing `source` as a query string.
    ///
    /// Multiple sources merge first-to-last; a key defined by two sources
    /// appears twice rather than being silently overwritten.
    pub fn query_struct<T: Serialize + ?Sized>(mut self, source: &T) -> Self {
        match serde_urlencoded::to_string(source) {
            Ok(encoded) => {
                for (key, value) in url::form_urlencoded::parse(encoded.as_bytes()) {
                    self.query.push((key.into_owned(), value.into_owned()));
                }
            }
            Err(err) => self.defer(RequestError::Serialization(Box::new(err))),
        }
        self
    }

    /// Set a header, replacing any previous value under the same
    /// (case-insensitive) name.
    pub fn header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        set_header(&mut self.headers, name.as_ref(), value.into());
        self
    }

    /// Use a JSON-encoded body and set `Content-Type: application/json`.
    ///
    /// Replaces any previously selected body; at most one of
    /// json/form/raw is ever active.
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Self {
        match serde_json::to_vec(body) {
            Ok(bytes) => {
                self.body = Body::Json(bytes);
                set_header(
                    &mut self.headers,
                    CONTENT_TYPE_HEADER,
                    CONTENT_TYPE_JSON.to_owned(),
                );
            }
            Err(err) => self.defer(RequestError::Serialization(Box::new(err))),
        }
        self
    }

    /// Use a form-encoded body and set the matching content type.
    ///
    /// Replaces any previously selected body.
    pub fn form<T: Serialize + ?Sized>(mut self, body: &T) -> Self {
        match serde_urlencoded::to_string(body) {
            Ok(encoded) => {
                self.body = Body::Form(encoded.into_bytes());
                set_header(
                    &mut self.headers,
                    CONTENT_TYPE_HEADER,
                    CONTENT_TYPE_FORM.to_owned(),
                );
            }
            Err(err) => self.defer(RequestError::Serialization(Box::new(err))),
        }
        self
    }

    /// Use raw bytes as the body with an explicit content type.
    ///
    /// Replaces any previously selected body.
    pub fn raw(mut self, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.body = Body::Raw(bytes);
        set_header(&mut self.headers, CONTENT_TYPE_HEADER, content_type.into());
        self
    }

    /// Resolve URL and query and finalize the body.
    ///
    /// Fails with [`RequestError::MalformedUrl`] when the path cannot be
    /// resolved against the base, or with the first deferred
    /// [`RequestError::Serialization`] recorded by a setter.
    pub fn build(self) -> Result<PreparedRequest, RequestError> {
        if let Some(err) = self.deferred {
            return Err(err);
        }

        let mut url = self.base.join(&self.path)?;
        if !self.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &self.query {
                pairs.append_pair(key, value);
            }
        }

        Ok(PreparedRequest {
            method: self.method,
            url,
            headers: self.headers,
            body: self.body.into_bytes(),
        })
    }

    fn defer(&mut self, err: RequestError) {
        // First failure wins; later setters cannot mask it.
        if self.deferred.is_none() {
            self.deferred = Some(err);
        }
    }
}

#[derive(Debug, Clone)]
/// A fully resolved request: everything the signer and the transport need.
///
/// Constructed per call, signed exactly once immediately before dispatch,
/// and discarded once the response has been read.
pub struct PreparedRequest {
    method: Method,
    url: Url,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl PreparedRequest {
    pub fn method(&self) -> Method {
        self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Host (with an explicit port when the URL carries one), as it appears
    /// in the canonical string.
    pub fn host(&self) -> &str {
        &self.url[Position::BeforeHost..Position::AfterPort]
    }

    /// Path plus query exactly as transmitted, excluding scheme and host.
    ///
    /// This is the resource component of the canonical string; any deviation
    /// from the transmitted form fails authentication server-side.
    pub fn resource(&self) -> &str {
        &self.url[Position::BeforePath..Position::AfterQuery]
    }

    /// Look up a header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub(crate) fn set_header(&mut self, name: &str, value: String) {
        set_header(&mut self.headers, name, value);
    }
}

fn set_header(headers: &mut Vec<(String, String)>, name: &str, value: String) {
    if let Some(entry) = headers
        .iter_mut()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
    {
        entry.1 = value;
    } else {
        headers.push((name.to_owned(), value));
    }
}
