//! Typed payloads for mid-call events.

use serde::Deserialize;

use crate::calls::{CommunicationIdentifier, RecognizeInputType};

/// Event type for an answered call connection.
pub const CALL_CONNECTED: &str = "Microsoft.Communication.CallConnected";
/// Event type for a torn-down call connection.
pub const CALL_DISCONNECTED: &str = "Microsoft.Communication.CallDisconnected";
/// Event type for a participant roster change.
pub const PARTICIPANTS_UPDATED: &str = "Microsoft.Communication.ParticipantsUpdated";
/// Event type for a finished recognize operation.
pub const RECOGNIZE_COMPLETED: &str = "Microsoft.Communication.RecognizeCompleted";
/// Event type for a recognize operation that gathered no usable input.
pub const RECOGNIZE_FAILED: &str = "Microsoft.Communication.RecognizeFailed";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Payload of [`CALL_CONNECTED`] and [`CALL_DISCONNECTED`].
pub struct CallConnected {
    pub call_connection_id: String,
    pub server_call_id: String,
    pub correlation_id: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub public_event_type: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Payload of [`PARTICIPANTS_UPDATED`].
pub struct ParticipantsUpdated {
    pub participants: Vec<Participant>,
    pub sequence_number: i64,
    pub call_connection_id: String,
    pub server_call_id: String,
    pub correlation_id: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub public_event_type: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub identifier: CommunicationIdentifier,
    #[serde(default)]
    pub is_muted: bool,
    #[serde(default)]
    pub is_on_hold: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Payload of [`RECOGNIZE_COMPLETED`].
pub struct RecognizeCompleted {
    pub recognition_type: RecognizeInputType,
    #[serde(default)]
    pub choice_result: Option<ChoiceResult>,
    #[serde(default)]
    pub result_information: Option<ResultInformation>,
    pub call_connection_id: String,
    pub server_call_id: String,
    pub correlation_id: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub public_event_type: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
/// The matched choice of a choices-based recognition.
pub struct ChoiceResult {
    pub label: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Outcome details the service attaches to completed operations.
pub struct ResultInformation {
    pub code: i32,
    pub sub_code: i32,
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use crate::calls::CommunicationIdentifierKind;
    use crate::events::{EventHandlerConfig, parse_events};

    use super::*;

    #[test]
    fn participants_updated_decodes_roster() {
        let body = format!(
            r#"[{{
                "id": "evt-2",
                "source": "calling/callConnections/41f",
                "type": "{PARTICIPANTS_UPDATED}",
                "data": {{
                    "participants": [
                        {{
                            "identifier": {{
                                "id": "8:acs:user-1",
                                "kind": "communicationUser",
                                "communicationUser": {{"id": "8:acs:user-1"}}
                            }},
                            "isMuted": true,
                            "isOnHold": false
                        }},
                        {{
                            "identifier": {{
                                "kind": "phoneNumber",
                                "phoneNumber": {{"value": "+12065551001"}}
                            }}
                        }}
                    ],
                    "sequenceNumber": 3,
                    "callConnectionId": "41f",
                    "serverCallId": "srv-1",
                    "correlationId": "corr-1"
                }}
            }}]"#
        );

        let events = parse_events(body.as_bytes(), &EventHandlerConfig::default()).unwrap();
        let payload: ParticipantsUpdated = events[0].data().unwrap().unwrap();

        assert_eq!(payload.sequence_number, 3);
        assert_eq!(payload.participants.len(), 2);
        assert!(payload.participants[0].is_muted);
        assert_eq!(
            payload.participants[0].identifier.kind,
            CommunicationIdentifierKind::CommunicationUser
        );
        assert_eq!(
            payload.participants[1]
                .identifier
                .phone_number
                .as_ref()
                .unwrap()
                .value,
            "+12065551001"
        );
    }

    #[test]
    fn recognize_completed_decodes_choice_result() {
        let json = r#"
        {
          "recognitionType": "choices",
          "choiceResult": {"label": "yes"},
          "resultInformation": {
            "code": 200,
            "subCode": 8531,
            "message": "Action completed successfully."
          },
          "callConnectionId": "41f",
          "serverCallId": "srv-1",
          "correlationId": "corr-1"
        }
        "#;

        let payload: RecognizeCompleted = serde_json::from_str(json).unwrap();
        assert_eq!(payload.recognition_type, RecognizeInputType::Choices);
        assert_eq!(payload.choice_result.unwrap().label, "yes");
        let info = payload.result_information.unwrap();
        assert_eq!(info.code, 200);
        assert_eq!(info.sub_code, 8531);
    }
}
