use std::io;

use azcomm::sms::SendSmsRequest;
use azcomm::{AccessKey, AzcommClient, E164Number, Endpoint};

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
    let from = std::env::var("AZCOMM_FROM").map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "AZCOMM_FROM environment variable is required",
        )
    })?;
    let to = std::env::var("AZCOMM_TO").map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "AZCOMM_TO environment variable is required",
        )
    })?;
    let message = std::env::var("AZCOMM_MESSAGE")
        .unwrap_or_else(|_| "Thanks for using our service!".to_owned());

    let client = AzcommClient::new(Endpoint::new(endpoint)?, AccessKey::new(key)?);
    let from = E164Number::parse(None, from)?;
    let to = E164Number::parse(None, to)?;
    let request = SendSmsRequest::new(&from, &[to], message);

    let response = client.sms().send(&request).await?;
    for result in &response.value {
        println!(
            "to: {}, successful: {}, message_id: {:?}",
            result.to, result.successful, result.message_id
        );
    }

    Ok(())
}
