//! Call automation service: typed structures for `/calling/callConnections`.
//!
//! Schemas are owned by the remote service. Identifier types here are shared
//! with the webhook payloads in [`crate::events`].

use serde::{Deserialize, Serialize};

use crate::client::{AzcommClient, AzcommError};
use crate::domain::{CallConnectionId, E164Number};
use crate::transport::Method;

const CALL_CONNECTIONS_PATH: &str = "/calling/callConnections";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Identifier of a call participant: a service user or a phone number.
pub struct CommunicationIdentifier {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub kind: CommunicationIdentifierKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub communication_user: Option<CommunicationUser>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<PhoneNumberIdentifier>,
}

impl CommunicationIdentifier {
    /// Identify a participant by service user id.
    pub fn user(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            id: Some(id.clone()),
            kind: CommunicationIdentifierKind::CommunicationUser,
            communication_user: Some(CommunicationUser { id }),
            phone_number: None,
        }
    }

    /// Identify a participant by phone number.
    pub fn phone_number(number: &E164Number) -> Self {
        Self {
            id: Some(number.as_str().to_owned()),
            kind: CommunicationIdentifierKind::PhoneNumber,
            communication_user: None,
            phone_number: Some(PhoneNumberIdentifier {
                id: None,
                value: number.as_str().to_owned(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CommunicationIdentifierKind {
    CommunicationUser,
    PhoneNumber,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommunicationUser {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhoneNumberIdentifier {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub value: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
/// Body for creating an outbound call.
pub struct CreateCallRequest {
    /// Endpoint receiving the mid-call event callbacks for this connection.
    pub callback_uri: String,
    /// Participants to call.
    pub targets: Vec<CommunicationIdentifier>,
    /// Caller id shown to PSTN targets.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_caller_id_number: Option<PhoneNumberIdentifier>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_context: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_streaming_options: Option<MediaStreamingOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcription_options: Option<TranscriptionOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub call_intelligence_options: Option<CallIntelligenceOptions>,
}

impl CreateCallRequest {
    /// Build a call request with the required pieces only.
    pub fn new(callback_uri: impl Into<String>, targets: Vec<CommunicationIdentifier>) -> Self {
        Self {
            callback_uri: callback_uri.into(),
            targets,
            source_caller_id_number: None,
            source_display_name: None,
            operation_context: None,
            media_streaming_options: None,
            transcription_options: None,
            call_intelligence_options: None,
        }
    }

    /// Set the caller id number presented to PSTN targets.
    pub fn caller_id(mut self, number: &E164Number) -> Self {
        self.source_caller_id_number = Some(PhoneNumberIdentifier {
            id: None,
            value: number.as_str().to_owned(),
        });
        self
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallIntelligenceOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cognitive_services_endpoint: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaStreamingOptions {
    pub transport_url: String,
    pub transport_type: MediaStreamingTransportType,
    pub content_type: MediaStreamingContentType,
    pub audio_channel_type: MediaStreamingAudioChannelType,
    pub start_media_streaming: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaStreamingTransportType {
    Websocket,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaStreamingContentType {
    Audio,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaStreamingAudioChannelType {
    Mixed,
    Unmixed,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptionOptions {
    pub transport_url: String,
    pub transport_type: TranscriptionTransportType,
    pub locale: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speech_recognition_model_endpoint_id: Option<String>,
    pub start_transcription: bool,
    pub enable_intermediate_results: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TranscriptionTransportType {
    Websocket,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
/// Body for playing media into an established call.
pub struct PlayRequest {
    pub play_sources: Vec<PlaySource>,
    /// Participants to play to; empty plays to every participant.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub play_to: Vec<CommunicationIdentifier>,
    pub interrupt_call_media_operation: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_callback_uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_context: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub play_options: Option<PlayOptions>,
}

impl PlayRequest {
    pub fn new(play_sources: Vec<PlaySource>) -> Self {
        Self {
            play_sources,
            play_to: Vec::new(),
            interrupt_call_media_operation: false,
            operation_callback_uri: None,
            operation_context: None,
            play_options: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct PlayOptions {
    /// Replay the sources until the operation is cancelled.
    #[serde(rename = "loop")]
    pub looped: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
/// One media source: a file, SSML document, or text to synthesize.
pub struct PlaySource {
    pub kind: PlaySourceKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub play_source_cache_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<FileSource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssml: Option<SsmlSource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<TextSource>,
}

impl PlaySource {
    /// Play an audio file by URI.
    pub fn file(uri: impl Into<String>) -> Self {
        Self {
            kind: PlaySourceKind::File,
            play_source_cache_id: None,
            file: Some(FileSource { uri: uri.into() }),
            ssml: None,
            text: None,
        }
    }

    /// Synthesize text with the given voice.
    pub fn text(text: impl Into<String>, voice_name: impl Into<String>) -> Self {
        Self {
            kind: PlaySourceKind::Text,
            play_source_cache_id: None,
            file: None,
            ssml: None,
            text: Some(TextSource {
                text: text.into(),
                voice_kind: None,
                voice_name: Some(voice_name.into()),
                source_locale: None,
                custom_voice_endpoint_id: None,
            }),
        }
    }

    /// Synthesize an SSML document.
    pub fn ssml(ssml_text: impl Into<String>) -> Self {
        Self {
            kind: PlaySourceKind::Ssml,
            play_source_cache_id: None,
            file: None,
            ssml: Some(SsmlSource {
                ssml_text: ssml_text.into(),
                custom_voice_endpoint_id: None,
            }),
            text: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaySourceKind {
    File,
    Ssml,
    Text,
}

#[derive(Debug, Clone, Serialize)]
pub struct FileSource {
    pub uri: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SsmlSource {
    pub ssml_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_voice_endpoint_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextSource {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice_kind: Option<VoiceKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_locale: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_voice_endpoint_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VoiceKind {
    Male,
    Female,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
/// Body for collecting input (DTMF, speech, or choices) from a participant.
pub struct RecognizeRequest {
    pub recognize_input_type: RecognizeInputType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub play_prompt: Option<PlaySource>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub play_prompts: Vec<PlaySource>,
    pub interrupt_call_media_operation: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_callback_uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_context: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recognize_options: Option<RecognizeOptions>,
}

impl RecognizeRequest {
    pub fn new(recognize_input_type: RecognizeInputType) -> Self {
        Self {
            recognize_input_type,
            play_prompt: None,
            play_prompts: Vec::new(),
            interrupt_call_media_operation: false,
            operation_callback_uri: None,
            operation_context: None,
            recognize_options: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RecognizeInputType {
    Choices,
    Dtmf,
    Speech,
    SpeechOrDtmf,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecognizeOptions {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<Choice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dtmf_options: Option<DtmfOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speech_options: Option<SpeechOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_silence_timeout_in_seconds: Option<u32>,
    pub interrupt_prompt: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speech_language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speech_recognition_model_endpoint_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_participant: Option<CommunicationIdentifier>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
/// A labeled phrase set the participant can match by voice or keypad tone.
pub struct Choice {
    pub label: String,
    pub phrases: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tone: Option<Tone>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// DTMF keypad tone.
pub enum Tone {
    A,
    B,
    C,
    D,
    Zero,
    One,
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Star,
    Pound,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DtmfOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inter_digit_timeout_in_seconds: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tones_to_collect: Option<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub stop_tones: Vec<Tone>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeechOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_silence_timeout_in_ms: Option<u64>,
}

/// Call automation operations sharing the client's signed transport.
pub struct CallsService<'a> {
    client: &'a AzcommClient,
}

impl<'a> CallsService<'a> {
    pub(crate) fn new(client: &'a AzcommClient) -> Self {
        Self { client }
    }

    /// Place an outbound call.
    pub async fn create(&self, request: &CreateCallRequest) -> Result<(), AzcommError> {
        let builder = self
            .client
            .request(Method::Post, CALL_CONNECTIONS_PATH)
            .json(request);
        self.client.execute_empty(builder).await
    }

    /// Hang up an established call connection.
    pub async fn hang_up(&self, id: &CallConnectionId) -> Result<(), AzcommError> {
        let builder = self
            .client
            .request(Method::Delete, &connection_path(id, None));
        self.client.execute_empty(builder).await
    }

    /// Play media into an established call.
    pub async fn play(
        &self,
        id: &CallConnectionId,
        request: &PlayRequest,
    ) -> Result<(), AzcommError> {
        let builder = self
            .client
            .request(Method::Post, &connection_path(id, Some("play")))
            .json(request);
        self.client.execute_empty(builder).await
    }

    /// Collect input from a participant of an established call.
    pub async fn recognize(
        &self,
        id: &CallConnectionId,
        request: &RecognizeRequest,
    ) -> Result<(), AzcommError> {
        let builder = self
            .client
            .request(Method::Post, &connection_path(id, Some("recognize")))
            .json(request);
        self.client.execute_empty(builder).await
    }
}

fn connection_path(id: &CallConnectionId, action: Option<&str>) -> String {
    match action {
        Some(action) => format!("{CALL_CONNECTIONS_PATH}/{}:{action}", id.as_str()),
        None => format!("{CALL_CONNECTIONS_PATH}/{}", id.as_str()),
    }
}
