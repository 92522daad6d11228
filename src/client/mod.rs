//! Client layer: orchestrates the signed transport and maps wire ↔ typed results.

use std::error::Error as StdError;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::calls::CallsService;
use crate::domain::{AccessKey, ApiVersion, Endpoint, ValidationError};
use crate::identities::IdentityService;
use crate::sms::SmsService;
use crate::transport::{Method, PreparedRequest, RequestBuilder, RequestError, SignError, Signer};

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

#[derive(Debug, Clone)]
pub(crate) struct HttpResponse {
    pub(crate) status: u16,
    pub(crate) body: String,
}

/// Executes one prepared request and returns its status and body.
///
/// Implementations must fully drain and release the response body on every
/// exit path they complete, so the underlying connection can be reused.
/// Concurrent use must be safe; pooling is the implementation's concern.
pub(crate) trait HttpTransport: Send + Sync {
    fn execute<'a>(
        &'a self,
        request: PreparedRequest,
    ) -> BoxFuture<'a, Result<HttpResponse, Box<dyn StdError + Send + Sync>>>;
}

#[derive(Debug, Clone)]
struct ReqwestTransport {
    client: reqwest::Client,
}

impl HttpTransport for ReqwestTransport {
    fn execute<'a>(
        &'a self,
        request: PreparedRequest,
    ) -> BoxFuture<'a, Result<HttpResponse, Box<dyn StdError + Send + Sync>>> {
        Box::pin(async move {
            let method = match request.method() {
                Method::Get => reqwest::Method::GET,
                Method::Post => reqwest::Method::POST,
                Method::Put => reqwest::Method::PUT,
                Method::Patch => reqwest::Method::PATCH,
                Method::Delete => reqwest::Method::DELETE,
            };

            let mut builder = self.client.request(method, request.url().clone());
            for (name, value) in request.headers() {
                builder = builder.header(name.as_str(), value.as_str());
            }
            if !request.body().is_empty() {
                builder = builder.body(request.body().to_vec());
            }

            let response = builder.send().await?;
            let status = response.status().as_u16();
            // text() reads the body to completion, releasing the connection
            // back to the pool whatever we do with the result.
            let body = response.text().await?;
            Ok(HttpResponse { status, body })
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
/// Error payload returned by the service on non-2xx responses.
pub struct ErrorDetail {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub target: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct ApiErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, thiserror::Error)]
/// Errors returned by [`AzcommClient`].
///
/// Everything bubbles to the caller synchronously; nothing is retried
/// internally.
pub enum AzcommError {
    /// The base URL or a resource path could not be parsed or resolved.
    #[error("malformed url: {0}")]
    MalformedUrl(#[source] url::ParseError),

    /// A request body or query source could not be encoded.
    #[error("serialization error: {0}")]
    Serialization(#[source] Box<dyn StdError + Send + Sync>),

    /// The request could not be signed (undecodable access key).
    #[error("signing error: {0}")]
    Signing(#[from] SignError),

    /// HTTP client / transport failure (DNS, TLS, timeouts, etc).
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn StdError + Send + Sync>),

    /// A 2xx response body could not be decoded as the expected type.
    #[error("decode error: {0}")]
    Decode(#[source] serde_json::Error),

    /// Non-2xx status returned by the service. `error` is populated when the
    /// body matched the service error schema; `body` always carries the raw
    /// response text when one was present.
    #[error("API error: status {status}: {}", .body.as_deref().unwrap_or("<no body>"))]
    Api {
        status: u16,
        error: Option<ErrorDetail>,
        body: Option<String>,
    },

    /// One of the domain constructors rejected an invalid value.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl From<RequestError> for AzcommError {
    fn from(err: RequestError) -> Self {
        match err {
            RequestError::MalformedUrl(err) => Self::MalformedUrl(err),
            RequestError::Serialization(err) => Self::Serialization(err),
        }
    }
}

#[derive(Debug, Clone)]
/// Builder for [`AzcommClient`].
///
/// Recognized configuration values, all explicit: `api_version` (query
/// parameter added to every request), `timeout`, `user_agent`.
pub struct AzcommClientBuilder {
    endpoint: Endpoint,
    access_key: AccessKey,
    api_version: ApiVersion,
    timeout: Option<Duration>,
    user_agent: Option<String>,
}

impl AzcommClientBuilder {
    /// Create a builder with the default API version and no timeout or
    /// user-agent override.
    pub fn new(endpoint: Endpoint, access_key: AccessKey) -> Self {
        Self {
            endpoint,
            access_key,
            api_version: ApiVersion::default(),
            timeout: None,
            user_agent: None,
        }
    }

    /// Override the service API version sent with every request.
    pub fn api_version(mut self, api_version: ApiVersion) -> Self {
        self.api_version = api_version;
        self
    }

    /// Set an HTTP client timeout applied to the entire request.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Override the HTTP `User-Agent` header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Build an [`AzcommClient`].
    pub fn build(self) -> Result<AzcommClient, AzcommError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(user_agent) = self.user_agent {
            builder = builder.user_agent(user_agent);
        }

        let client = builder
            .build()
            .map_err(|err| AzcommError::Transport(Box::new(err)))?;

        Ok(AzcommClient {
            endpoint: self.endpoint,
            api_version: self.api_version,
            signer: Signer::new(self.access_key),
            http: Arc::new(ReqwestTransport { client }),
        })
    }
}

#[derive(Clone)]
/// Client for a Communication Services resource.
///
/// One signed transport shared by the [`SmsService`], [`CallsService`], and
/// [`IdentityService`] groupings. Each call builds a request, signs it
/// immediately before dispatch, and reads the response to completion; no
/// state persists between calls and nothing is retried.
pub struct AzcommClient {
    endpoint: Endpoint,
    api_version: ApiVersion,
    signer: Signer,
    http: Arc<dyn HttpTransport>,
}

impl AzcommClient {
    /// Create a client with the default API version.
    ///
    /// For more customization, use [`AzcommClient::builder`].
    pub fn new(endpoint: Endpoint, access_key: AccessKey) -> Self {
        Self {
            endpoint,
            api_version: ApiVersion::default(),
            signer: Signer::new(access_key),
            http: Arc::new(ReqwestTransport {
                client: reqwest::Client::new(),
            }),
        }
    }

    /// Start building a client with custom settings.
    pub fn builder(endpoint: Endpoint, access_key: AccessKey) -> AzcommClientBuilder {
        AzcommClientBuilder::new(endpoint, access_key)
    }

    /// SMS operations.
    pub fn sms(&self) -> SmsService<'_> {
        SmsService::new(self)
    }

    /// Call automation operations.
    pub fn calls(&self) -> CallsService<'_> {
        CallsService::new(self)
    }

    /// Identity and access-token operations.
    pub fn identities(&self) -> IdentityService<'_> {
        IdentityService::new(self)
    }

    /// The endpoint this client talks to.
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// The API version appended to every request.
    pub fn api_version(&self) -> &ApiVersion {
        &self.api_version
    }

    pub(crate) fn request(&self, method: Method, path: &str) -> RequestBuilder {
        RequestBuilder::new(self.endpoint.url(), method, path)
            .query_pair(ApiVersion::QUERY_KEY, self.api_version.as_str())
    }

    /// Dispatch and decode a JSON response.
    ///
    /// Returns `Ok(None)` for 204 or an empty body, leaving the target
    /// untouched; malformed JSON in a 2xx response is a [`AzcommError::Decode`].
    pub(crate) async fn execute<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<Option<T>, AzcommError> {
        let response = self.dispatch(builder).await?;
        if response.status == 204 || response.body.is_empty() {
            return Ok(None);
        }
        serde_json::from_str(&response.body)
            .map(Some)
            .map_err(AzcommError::Decode)
    }

    /// Dispatch a request whose response body, if any, is not decoded.
    pub(crate) async fn execute_empty(&self, builder: RequestBuilder) -> Result<(), AzcommError> {
        self.dispatch(builder).await.map(|_| ())
    }

    async fn dispatch(&self, builder: RequestBuilder) -> Result<HttpResponse, AzcommError> {
        let mut request = builder.build()?;
        self.signer.sign(&mut request)?;

        let response = self
            .http
            .execute(request)
            .await
            .map_err(AzcommError::Transport)?;

        debug!(status = response.status, "response received");

        if !(200..=299).contains(&response.status) {
            let error = serde_json::from_str::<ApiErrorBody>(&response.body)
                .ok()
                .map(|payload| payload.error);
            let body = if response.body.trim().is_empty() {
                None
            } else {
                Some(response.body)
            };
            return Err(AzcommError::Api {
                status: response.status,
                error,
                body,
            });
        }

        Ok(response)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use super::*;

    #[derive(Debug, Clone)]
    pub(crate) struct FakeTransport {
        state: Arc<Mutex<FakeTransportState>>,
    }

    #[derive(Debug)]
    struct FakeTransportState {
        last_request: Option<PreparedRequest>,
        response_status: u16,
        response_body: String,
    }

    impl FakeTransport {
        pub(crate) fn new(response_status: u16, response_body: impl Into<String>) -> Self {
            Self {
                state: Arc::new(Mutex::new(FakeTransportState {
                    last_request: None,
                    response_status,
                    response_body: response_body.into(),
                })),
            }
        }

        pub(crate) fn last_request(&self) -> PreparedRequest {
            self.state
                .lock()
                .unwrap()
                .last_request
                .clone()
                .expect("no request was dispatched")
        }
    }

    impl HttpTransport for FakeTransport {
        fn execute<'a>(
            &'a self,
            request: PreparedRequest,
        ) -> BoxFuture<'a, Result<HttpResponse, Box<dyn StdError + Send + Sync>>> {
            Box::pin(async move {
                let (status, body) = {
                    let mut state = self.state.lock().unwrap();
                    state.last_request = Some(request);
                    (state.response_status, state.response_body.clone())
                };
                Ok(HttpResponse { status, body })
            })
        }
    }

    pub(crate) fn make_client(transport: FakeTransport) -> AzcommClient {
        AzcommClient {
            endpoint: Endpoint::new("https://contoso.communication.azure.com").unwrap(),
            api_version: ApiVersion::default(),
            signer: Signer::new(AccessKey::new("c2VjcmV0").unwrap()),
            http: Arc::new(transport),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use crate::transport::{CONTENT_HASH_HEADER, DATE_HEADER};

    use super::testing::{FakeTransport, make_client};
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Greeting {
        message: String,
    }

    #[tokio::test]
    async fn execute_signs_and_decodes_success() {
        let transport = FakeTransport::new(200, r#"{"message":"hi"}"#);
        let client = make_client(transport.clone());

        let builder = client
            .request(Method::Post, "/sms")
            .json(&serde_json::json!({"message": "hello"}));
        let decoded: Option<Greeting> = client.execute(builder).await.unwrap();
        assert_eq!(decoded.unwrap().message, "hi");

        let request = transport.last_request();
        assert_eq!(request.method(), Method::Post);
        assert_eq!(
            request.resource(),
            "/sms?api-version=2024-06-15-preview"
        );
        assert!(request.header(DATE_HEADER).is_some());
        assert!(request.header(CONTENT_HASH_HEADER).is_some());
        assert!(
            request
                .header("Authorization")
                .unwrap()
                .starts_with("HMAC-SHA256 SignedHeaders=")
        );
        assert_eq!(request.header("Content-Type"), Some("application/json"));
    }

    #[tokio::test]
    async fn no_content_leaves_target_untouched() {
        let transport = FakeTransport::new(204, "");
        let client = make_client(transport);

        let decoded: Option<Greeting> = client
            .execute(client.request(Method::Delete, "/calling/callConnections/abc"))
            .await
            .unwrap();
        assert!(decoded.is_none());
    }

    #[tokio::test]
    async fn empty_body_with_200_is_not_decoded() {
        let transport = FakeTransport::new(200, "");
        let client = make_client(transport);

        let decoded: Option<Greeting> = client
            .execute(client.request(Method::Post, "/sms"))
            .await
            .unwrap();
        assert!(decoded.is_none());
    }

    #[tokio::test]
    async fn api_error_carries_decoded_payload_and_raw_body() {
        let body = r#"{"error":{"code":"Unauthorized","message":"Denied"}}"#;
        let transport = FakeTransport::new(401, body);
        let client = make_client(transport);

        let err = client
            .execute::<Greeting>(client.request(Method::Post, "/sms"))
            .await
            .unwrap_err();
        match err {
            AzcommError::Api {
                status,
                error,
                body: raw,
            } => {
                assert_eq!(status, 401);
                let error = error.unwrap();
                assert_eq!(error.code.as_deref(), Some("Unauthorized"));
                assert_eq!(error.message.as_deref(), Some("Denied"));
                assert_eq!(raw.as_deref(), Some(body));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn api_error_display_contains_raw_body_text() {
        let body = r#"{"oops": "not the error schema"}"#;
        let transport = FakeTransport::new(500, body);
        let client = make_client(transport);

        let err = client
            .execute::<Greeting>(client.request(Method::Post, "/sms"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AzcommError::Api {
                status: 500,
                error: None,
                ..
            }
        ));
        assert!(err.to_string().contains(body));
    }

    #[tokio::test]
    async fn api_error_with_blank_body_maps_to_none() {
        let transport = FakeTransport::new(503, "   ");
        let client = make_client(transport);

        let err = client
            .execute::<Greeting>(client.request(Method::Post, "/sms"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AzcommError::Api {
                status: 503,
                body: None,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn malformed_success_body_is_a_decode_error() {
        let transport = FakeTransport::new(200, "{ not json }");
        let client = make_client(transport);

        let err = client
            .execute::<Greeting>(client.request(Method::Post, "/sms"))
            .await
            .unwrap_err();
        assert!(matches!(err, AzcommError::Decode(_)));
    }

    #[tokio::test]
    async fn undecodable_access_key_fails_before_dispatch() {
        let transport = FakeTransport::new(200, "{}");
        let client = AzcommClient {
            endpoint: Endpoint::new("https://contoso.communication.azure.com").unwrap(),
            api_version: ApiVersion::default(),
            signer: Signer::new(AccessKey::new("!!not-base64!!").unwrap()),
            http: Arc::new(transport),
        };

        let err = client
            .execute::<Greeting>(client.request(Method::Post, "/sms"))
            .await
            .unwrap_err();
        assert!(matches!(err, AzcommError::Signing(_)));
    }

    #[tokio::test]
    async fn serialization_failure_surfaces_from_builder() {
        let transport = FakeTransport::new(200, "{}");
        let client = make_client(transport);

        let mut bad = std::collections::HashMap::new();
        bad.insert(vec![1u8], "value");

        let err = client
            .execute::<Greeting>(client.request(Method::Post, "/sms").json(&bad))
            .await
            .unwrap_err();
        assert!(matches!(err, AzcommError::Serialization(_)));
    }

    #[test]
    fn builder_overrides_are_applied() {
        let endpoint = Endpoint::new("https://contoso.communication.azure.com").unwrap();
        let key = AccessKey::new("c2VjcmV0").unwrap();
        let client = AzcommClient::builder(endpoint, key)
            .api_version(ApiVersion::new("2023-10-01").unwrap())
            .timeout(std::time::Duration::from_secs(5))
            .user_agent("azcomm-tests")
            .build()
            .unwrap();
        assert_eq!(client.api_version().as_str(), "2023-10-01");
    }
}
