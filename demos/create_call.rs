use std::io;

use azcomm::calls::{CommunicationIdentifier, CreateCallRequest, PlaySource};
use azcomm::events::{EventHandler, EventHandlerConfig, calls as call_events};
use azcomm::{AccessKey, AzcommClient, E164Number, Endpoint};

/// Places an outbound call and drains mid-call events from a webhook queue.
///
/// A real deployment would feed `EventHandler::handle` from an HTTP endpoint
/// reachable at `AZCOMM_CALLBACK_URI`; here the handler is fed from stdin
/// lines, one JSON delivery per line, to keep the demo self-contained.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let endpoint = std::env::var("AZCOMM_ENDPOINT").map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "AZCOMM_ENDPOINT environment variable is required",
        )
    })?;
    let key = std::env::var("AZCOMM_ACCESS_KEY").map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "AZCOMM_ACCESS_KEY environment variable is required",
        )
    })?;
    let callback_uri = std::env::var("AZCOMM_CALLBACK_URI").map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "AZCOMM_CALLBACK_URI environment variable is required",
        )
    })?;
    let caller = std::env::var("AZCOMM_FROM").map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "AZCOMM_FROM environment variable is required",
        )
    })?;
    let target = std::env::var("AZCOMM_TO").map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "AZCOMM_TO environment variable is required",
        )
    })?;

    let client = AzcommClient::new(Endpoint::new(endpoint)?, AccessKey::new(key)?);
    let caller = E164Number::parse(None, caller)?;
    let target = E164Number::parse(None, target)?;

    let request = CreateCallRequest::new(
        callback_uri,
        vec![CommunicationIdentifier::phone_number(&target)],
    )
    .caller_id(&caller);
    client.calls().create(&request).await?;
    println!("call placed, waiting for events on stdin");

    let (handler, mut events) = EventHandler::new(EventHandlerConfig::default());

    let reader = tokio::task::spawn_blocking(move || {
        let mut line = String::new();
        loop {
            line.clear();
            if io::stdin().read_line(&mut line).unwrap_or(0) == 0 {
                break;
            }
            if line.trim().is_empty() {
                continue;
            }
            if let Err(err) = handler.handle(line.as_bytes()) {
                eprintln!("delivery rejected ({}): {err}", err.status_code());
            }
        }
    });

    while let Some(event) = events.recv().await {
        match event.event_type.as_str() {
            call_events::CALL_CONNECTED => {
                let payload: call_events::CallConnected = event.data()?.unwrap();
                println!("connected: {}", payload.call_connection_id);

                let id = azcomm::CallConnectionId::new(payload.call_connection_id)?;
                let play = azcomm::calls::PlayRequest::new(vec![PlaySource::text(
                    "Welcome. This call was placed by the azcomm demo.",
                    "en-US-JennyNeural",
                )]);
                client.calls().play(&id, &play).await?;
            }
            call_events::CALL_DISCONNECTED => {
                println!("call ended");
                break;
            }
            other => println!("event: {other}"),
        }
    }

    reader.await?;
    Ok(())
}
