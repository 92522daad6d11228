//! SMS service: typed request/response structures for `/sms`.
//!
//! The JSON schemas are owned by the remote service; this module types them
//! and leaves semantic validation to the server. Construction helpers accept
//! validated [`E164Number`] values so the common path stays well-formed.

use serde::{Deserialize, Serialize};

use crate::client::{AzcommClient, AzcommError};
use crate::domain::E164Number;
use crate::transport::Method;

const SEND_PATH: &str = "/sms";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
/// Body for sending an SMS message.
pub struct SendSmsRequest {
    /// Sender phone number in E.164 format.
    pub from: String,
    /// Recipients of the message.
    pub sms_recipients: Vec<SmsRecipient>,
    /// Message text.
    pub message: String,
    /// Delivery options.
    pub sms_send_options: SmsSendOptions,
}

impl SendSmsRequest {
    /// Build a request from validated phone numbers with default options.
    pub fn new(
        from: &E164Number,
        recipients: &[E164Number],
        message: impl Into<String>,
    ) -> Self {
        Self {
            from: from.as_str().to_owned(),
            sms_recipients: recipients.iter().map(SmsRecipient::new).collect(),
            message: message.into(),
            sms_send_options: SmsSendOptions::default(),
        }
    }

    /// Replace the delivery options.
    pub fn options(mut self, options: SmsSendOptions) -> Self {
        self.sms_send_options = options;
        self
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
/// A single recipient, optionally tagged for repeatable (deduplicated) sends.
pub struct SmsRecipient {
    /// Recipient phone number in E.164 format.
    pub to: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repeatability_request_id: Option<String>,
    /// RFC 1123 timestamp of the first send attempt for this request id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repeatability_first_sent: Option<String>,
}

impl SmsRecipient {
    pub fn new(to: &E164Number) -> Self {
        Self {
            to: to.as_str().to_owned(),
            repeatability_request_id: None,
            repeatability_first_sent: None,
        }
    }

    /// Mark this recipient for repeatable delivery.
    pub fn repeatable(mut self, request_id: impl Into<String>, first_sent: impl Into<String>) -> Self {
        self.repeatability_request_id = Some(request_id.into());
        self.repeatability_first_sent = Some(first_sent.into());
        self
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
/// Options applied to the whole send.
pub struct SmsSendOptions {
    /// Request a delivery report event for each recipient.
    pub enable_delivery_report: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
/// Response for sending an SMS: one result per recipient.
pub struct SendSmsResponse {
    #[serde(default)]
    pub value: Vec<SmsSendResult>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmsSendResult {
    /// Recipient phone number this result refers to.
    pub to: String,
    #[serde(default)]
    pub message_id: Option<String>,
    pub http_status_code: u16,
    pub successful: bool,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub repeatability_result: Option<RepeatabilityResult>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepeatabilityResult {
    Accepted,
    Rejected,
}

/// SMS operations sharing the client's signed transport.
pub struct SmsService<'a> {
    client: &'a AzcommClient,
}

impl<'a> SmsService<'a> {
    pub(crate) fn new(client: &'a AzcommClient) -> Self {
        Self { client }
    }

    /// Send an SMS message.
    pub async fn send(&self, request: &SendSmsRequest) -> Result<SendSmsResponse, AzcommError> {
        let builder = self.client.request(Method::Post, SEND_PATH).json(request);
        Ok(self.client.execute(builder).await?.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use crate::client::testing::{FakeTransport, make_client};
    use crate::transport::{CONTENT_TYPE_HEADER, CONTENT_TYPE_JSON};

    use super::*;

    fn number(value: &str) -> E164Number {
        E164Number::parse(None, value).unwrap()
    }

    #[test]
    fn request_serializes_to_service_schema() {
        let request = SendSmsRequest::new(
            &number("+12065551000"),
            &[number("+12065551001")],
            "hello",
        )
        .options(SmsSendOptions {
            enable_delivery_report: true,
            tag: Some("marketing".to_owned()),
        });

        let encoded = serde_json::to_value(&request).unwrap();
        assert_eq!(
            encoded,
            serde_json::json!({
                "from": "+12065551000",
                "smsRecipients": [{"to": "+12065551001"}],
                "message": "hello",
                "smsSendOptions": {
                    "enableDeliveryReport": true,
                    "tag": "marketing"
                }
            })
        );
    }

    #[test]
    fn repeatable_recipient_serializes_both_fields() {
        let recipient = SmsRecipient::new(&number("+12065551001"))
            .repeatable("req-1", "Mon, 01 Jul 2024 12:00:00 GMT");
        let encoded = serde_json::to_value(&recipient).unwrap();
        assert_eq!(
            encoded,
            serde_json::json!({
                "to": "+12065551001",
                "repeatabilityRequestId": "req-1",
                "repeatabilityFirstSent": "Mon, 01 Jul 2024 12:00:00 GMT"
            })
        );
    }

    #[test]
    fn response_decodes_per_recipient_results() {
        let json = r#"
        {
          "value": [
            {
              "to": "+12065551001",
              "messageId": "Outgoing_123",
              "httpStatusCode": 202,
              "successful": true,
              "repeatabilityResult": "accepted"
            },
            {
              "to": "+12065551002",
              "httpStatusCode": 400,
              "successful": false,
              "errorMessage": "Invalid To phone number format."
            }
          ]
        }
        "#;

        let response: SendSmsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.value.len(), 2);
        assert_eq!(response.value[0].message_id.as_deref(), Some("Outgoing_123"));
        assert_eq!(
            response.value[0].repeatability_result,
            Some(RepeatabilityResult::Accepted)
        );
        assert!(!response.value[1].successful);
        assert_eq!(
            response.value[1].error_message.as_deref(),
            Some("Invalid To phone number format.")
        );
    }

    #[tokio::test]
    async fn send_posts_signed_json_to_sms_path() {
        let transport = FakeTransport::new(
            200,
            r#"{"value":[{"to":"+12065551001","httpStatusCode":202,"successful":true}]}"#,
        );
        let client = make_client(transport.clone());

        let request =
            SendSmsRequest::new(&number("+12065551000"), &[number("+12065551001")], "hi");
        let response = client.sms().send(&request).await.unwrap();
        assert_eq!(response.value.len(), 1);
        assert!(response.value[0].successful);

        let sent = transport.last_request();
        assert_eq!(sent.method(), Method::Post);
        assert_eq!(sent.resource(), "/sms?api-version=2024-06-15-preview");
        assert_eq!(sent.header(CONTENT_TYPE_HEADER), Some(CONTENT_TYPE_JSON));
        assert!(sent.header("Authorization").is_some());

        let body: serde_json::Value = serde_json::from_slice(sent.body()).unwrap();
        assert_eq!(body["from"], "+12065551000");
        assert_eq!(body["smsRecipients"][0]["to"], "+12065551001");
    }

    #[tokio::test]
    async fn empty_success_body_yields_default_response() {
        let transport = FakeTransport::new(202, "");
        let client = make_client(transport);

        let request =
            SendSmsRequest::new(&number("+12065551000"), &[number("+12065551001")], "hi");
        let response = client.sms().send(&request).await.unwrap();
        assert!(response.value.is_empty());
    }
}
