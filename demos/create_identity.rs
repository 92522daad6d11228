use std::io;

use azcomm::identities::{CreateIdentityRequest, TokenScope};
use azcomm::{AccessKey, AzcommClient, Endpoint};

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

    let client = AzcommClient::new(Endpoint::new(endpoint)?, AccessKey::new(key)?);
    let request = CreateIdentityRequest::with_scopes(vec![TokenScope::Voip]);

    let result = client.identities().create(&request).await?;
    println!("identity: {}", result.identity.id);
    if let Some(token) = result.access_token {
        println!("token expires on: {}", token.expires_on);
    }

    Ok(())
}
