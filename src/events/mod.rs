//! Webhook event ingestion: envelope decoding and bounded delivery.
//!
//! The service delivers mid-call events as a JSON array of CloudEvents-style
//! envelopes POSTed to a callback endpoint the application hosts. This module
//! is framework-agnostic: hand [`EventHandler::handle`] the raw body bytes and
//! map the returned [`WebhookError`] to a response status via
//! [`WebhookError::status_code`].

pub mod calls;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;
use serde_json::value::RawValue;
use tokio::sync::mpsc;
use tracing::debug;

#[derive(Debug, thiserror::Error)]
/// Rejections for a webhook delivery, each with a distinct response status.
pub enum WebhookError {
    /// Body exceeds the configured size limit (413).
    #[error("request body must not be larger than {max} bytes")]
    PayloadTooLarge { max: usize },

    /// Empty or whitespace-only body (400).
    #[error("request body must not be empty")]
    EmptyBody,

    /// Syntactically invalid JSON (400).
    #[error("request body contains badly-formed JSON: {0}")]
    MalformedJson(#[source] serde_json::Error),

    /// Well-formed JSON that does not match the envelope schema; in strict
    /// mode this includes unknown fields (400).
    #[error("request body contains an invalid event envelope: {0}")]
    InvalidEnvelope(#[source] serde_json::Error),

    /// Data after the single top-level JSON value (400).
    #[error("request body must only contain a single JSON value")]
    TrailingData,

    /// The bounded queue cannot take the batch (503). The caller should
    /// answer with a retry-later response; nothing was enqueued.
    #[error("event queue is full")]
    QueueFull,

    /// The receiving side of the queue was dropped (500).
    #[error("event queue receiver was dropped")]
    QueueClosed,
}

impl WebhookError {
    /// HTTP status an ingestion endpoint should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::PayloadTooLarge { .. } => 413,
            Self::EmptyBody | Self::MalformedJson(_) | Self::InvalidEnvelope(_) => 400,
            Self::TrailingData => 400,
            Self::QueueFull => 503,
            Self::QueueClosed => 500,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// CloudEvents-style envelope carried in webhook deliveries.
///
/// The payload stays raw until [`EventEnvelope::data`] decodes it against a
/// concrete type such as the ones in [`calls`].
pub struct EventEnvelope {
    pub id: String,
    pub source: String,
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specversion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datacontenttype: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Box<RawValue>>,
}

impl EventEnvelope {
    /// Decode the embedded payload. `Ok(None)` when the envelope has none.
    pub fn data<T: DeserializeOwned>(&self) -> Result<Option<T>, serde_json::Error> {
        match &self.data {
            Some(raw) => serde_json::from_str(raw.get()).map(Some),
            None => Ok(None),
        }
    }

    pub fn is_type(&self, event_type: &str) -> bool {
        self.event_type == event_type
    }
}

// Mirror of `EventEnvelope` used in strict mode, where extension attributes
// are a rejection rather than tolerated extras.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct StrictEnvelope {
    id: String,
    source: String,
    #[serde(rename = "type")]
    event_type: String,
    #[serde(default)]
    specversion: Option<String>,
    #[serde(default)]
    time: Option<DateTime<Utc>>,
    #[serde(default)]
    datacontenttype: Option<String>,
    #[serde(default)]
    data: Option<Box<RawValue>>,
}

impl From<StrictEnvelope> for EventEnvelope {
    fn from(strict: StrictEnvelope) -> Self {
        Self {
            id: strict.id,
            source: strict.source,
            event_type: strict.event_type,
            specversion: strict.specversion,
            time: strict.time,
            datacontenttype: strict.datacontenttype,
            data: strict.data,
        }
    }
}

#[derive(Debug, Clone)]
/// Configuration for [`EventHandler`]. Every recognized field is explicit.
pub struct EventHandlerConfig {
    /// Largest accepted body, in bytes.
    pub max_body_bytes: usize,
    /// Capacity of the delivery queue.
    pub queue_capacity: usize,
    /// Reject envelopes carrying unknown fields.
    pub strict: bool,
}

impl Default for EventHandlerConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: 1_048_576,
            queue_capacity: 16,
            strict: false,
        }
    }
}

/// Decode one webhook delivery into envelopes.
///
/// The body must hold exactly one top-level JSON value, an array of
/// envelopes; see [`WebhookError`] for the rejection taxonomy.
pub fn parse_events(
    body: &[u8],
    config: &EventHandlerConfig,
) -> Result<Vec<EventEnvelope>, WebhookError> {
    if body.len() > config.max_body_bytes {
        return Err(WebhookError::PayloadTooLarge {
            max: config.max_body_bytes,
        });
    }
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(WebhookError::EmptyBody);
    }

    let mut deserializer = serde_json::Deserializer::from_slice(body);
    let events: Vec<EventEnvelope> = if config.strict {
        Vec::<StrictEnvelope>::deserialize(&mut deserializer)
            .map_err(classify)?
            .into_iter()
            .map(EventEnvelope::from)
            .collect()
    } else {
        Vec::<EventEnvelope>::deserialize(&mut deserializer).map_err(classify)?
    };
    deserializer
        .end()
        .map_err(|_| WebhookError::TrailingData)?;

    Ok(events)
}

fn classify(err: serde_json::Error) -> WebhookError {
    use serde_json::error::Category;

    match err.classify() {
        Category::Syntax | Category::Eof => WebhookError::MalformedJson(err),
        _ => WebhookError::InvalidEnvelope(err),
    }
}

/// Parses webhook deliveries and feeds accepted envelopes into a bounded
/// queue.
///
/// Backpressure policy: a batch is accepted only when the queue has room for
/// all of it; otherwise [`WebhookError::QueueFull`] is returned with nothing
/// enqueued, and the sender is expected to redeliver. The handler never
/// blocks.
pub struct EventHandler {
    config: EventHandlerConfig,
    queue: mpsc::Sender<EventEnvelope>,
}

impl EventHandler {
    /// Create a handler and the receiving end of its queue.
    pub fn new(config: EventHandlerConfig) -> (Self, mpsc::Receiver<EventEnvelope>) {
        let (queue, events) = mpsc::channel(config.queue_capacity.max(1));
        (Self { config, queue }, events)
    }

    pub fn config(&self) -> &EventHandlerConfig {
        &self.config
    }

    /// Decode a delivery and enqueue every envelope. Returns the number of
    /// envelopes accepted.
    pub fn handle(&self, body: &[u8]) -> Result<usize, WebhookError> {
        let events = parse_events(body, &self.config)?;

        if self.queue.is_closed() {
            return Err(WebhookError::QueueClosed);
        }
        if events.len() > self.queue.capacity() {
            debug!(
                batch = events.len(),
                available = self.queue.capacity(),
                "rejecting webhook batch, queue full"
            );
            return Err(WebhookError::QueueFull);
        }

        let count = events.len();
        for event in events {
            self.queue.try_send(event).map_err(|err| match err {
                mpsc::error::TrySendError::Full(_) => WebhookError::QueueFull,
                mpsc::error::TrySendError::Closed(_) => WebhookError::QueueClosed,
            })?;
        }
        Ok(count)
    }
}

/// Keep only the envelopes whose `type` discriminator is in `types`.
pub fn filter_types(events: Vec<EventEnvelope>, types: &[&str]) -> Vec<EventEnvelope> {
    events
        .into_iter()
        .filter(|event| types.contains(&event.event_type.as_str()))
        .collect()
}
