//! Discord gateway client.

pub mod embed;
pub mod handler;

pub use handler::MikaHandler;

use std::future::Future;

use serenity::Client;
use serenity::all::GatewayIntents;
use tracing::{error, info};

/// Gateway intents Mika needs: guild and DM messages with their content.
#[must_use]
pub fn gateway_intents() -> GatewayIntents {
    GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT
}

/// Connect to the gateway and process events until `shutdown` resolves or
/// the connection ends.
///
/// # Errors
/// Returns an error if the client cannot be built or the gateway fails.
pub async fn run_gateway<F>(
    token: &str,
    handler: MikaHandler,
    shutdown: F,
) -> Result<(), serenity::Error>
where
    F: Future<Output = ()> + Send,
{
    let mut client = Client::builder(token, gateway_intents())
        .event_handler(handler)
        .await?;
    let shard_manager = client.shard_manager.clone();

    tokio::select! {
        result = client.start() => {
            if let Err(err) = &result {
                error!(%err, "Gateway client stopped");
            }
            result
        }
        () = shutdown => {
            info!("Shutting down gateway client");
            shard_manager.shutdown_all().await;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intents_cover_messages() {
        let intents = gateway_intents();
        assert!(intents.contains(GatewayIntents::MESSAGE_CONTENT));
        assert!(intents.contains(GatewayIntents::DIRECT_MESSAGES));
        assert!(intents.contains(GatewayIntents::GUILD_MESSAGES));
        assert!(intents.contains(GatewayIntents::GUILDS));
    }
}
