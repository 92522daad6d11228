//! Identity service: user creation and access-token issuance.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::client::{AzcommClient, AzcommError};
use crate::transport::Method;

const IDENTITIES_PATH: &str = "/identities";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
/// Scope a user access token is issued for.
pub enum TokenScope {
    #[serde(rename = "chat")]
    Chat,
    #[serde(rename = "chat.join")]
    ChatJoin,
    #[serde(rename = "chat.join.limited")]
    ChatJoinLimited,
    #[serde(rename = "voip")]
    Voip,
    #[serde(rename = "voip.join")]
    VoipJoin,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
/// Body for creating an identity, optionally with an initial token.
pub struct CreateIdentityRequest {
    /// Scopes to issue a token for; empty creates a bare identity.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub create_token_with_scopes: Vec<TokenScope>,
    /// Token validity in minutes; the service default applies when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_in_minutes: Option<u32>,
}

impl CreateIdentityRequest {
    pub fn with_scopes(scopes: Vec<TokenScope>) -> Self {
        Self {
            create_token_with_scopes: scopes,
            expires_in_minutes: None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Result of creating an identity.
pub struct AccessTokenResult {
    pub identity: Identity,
    #[serde(default)]
    pub access_token: Option<AccessToken>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Identity {
    pub id: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessToken {
    pub token: String,
    pub expires_on: DateTime<Utc>,
}

/// Identity operations sharing the client's signed transport.
pub struct IdentityService<'a> {
    client: &'a AzcommClient,
}

impl<'a> IdentityService<'a> {
    pub(crate) fn new(client: &'a AzcommClient) -> Self {
        Self { client }
    }

    /// Create an identity, and a token when scopes were requested.
    pub async fn create(
        &self,
        request: &CreateIdentityRequest,
    ) -> Result<AccessTokenResult, AzcommError> {
        let builder = self
            .client
            .request(Method::Post, IDENTITIES_PATH)
            .json(request);
        Ok(self.client.execute(builder).await?.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use crate::client::testing::{FakeTransport, make_client};

    use super::*;

    #[test]
    fn request_serializes_scopes_by_wire_name() {
        let request = CreateIdentityRequest {
            create_token_with_scopes: vec![
                TokenScope::Voip,
                TokenScope::ChatJoinLimited,
            ],
            expires_in_minutes: Some(60),
        };
        let encoded = serde_json::to_value(&request).unwrap();
        assert_eq!(
            encoded,
            serde_json::json!({
                "createTokenWithScopes": ["voip", "chat.join.limited"],
                "expiresInMinutes": 60
            })
        );
    }

    #[test]
    fn bare_identity_request_serializes_to_empty_object() {
        let encoded = serde_json::to_value(CreateIdentityRequest::default()).unwrap();
        assert_eq!(encoded, serde_json::json!({}));
    }

    #[test]
    fn response_decodes_token_and_expiry() {
        let json = r#"
        {
          "identity": {"id": "8:acs:resource_user-1"},
          "accessToken": {
            "token": "eyJhbGciOi...",
            "expiresOn": "2024-07-01T12:00:00.000Z"
          }
        }
        "#;

        let result: AccessTokenResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.identity.id, "8:acs:resource_user-1");
        let token = result.access_token.unwrap();
        assert_eq!(token.token, "eyJhbGciOi...");
        assert_eq!(token.expires_on.to_rfc3339(), "2024-07-01T12:00:00+00:00");
    }

    #[tokio::test]
    async fn create_posts_the_request_body() {
        let transport = FakeTransport::new(
            201,
            r#"{"identity":{"id":"8:acs:user"},"accessToken":{"token":"t","expiresOn":"2024-07-01T12:00:00Z"}}"#,
        );
        let client = make_client(transport.clone());

        let request = CreateIdentityRequest::with_scopes(vec![TokenScope::Voip]);
        let result = client.identities().create(&request).await.unwrap();
        assert_eq!(result.identity.id, "8:acs:user");
        assert!(result.access_token.is_some());

        let sent = transport.last_request();
        assert_eq!(sent.method(), Method::Post);
        assert_eq!(
            sent.resource(),
            "/identities?api-version=2024-06-15-preview"
        );
        let body: serde_json::Value = serde_json::from_slice(sent.body()).unwrap();
        assert_eq!(body["createTokenWithScopes"][0], "voip");
    }
}
