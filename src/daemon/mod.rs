mod polling;

use crate::api::{BskyClient, SocialClient};
use crate::core::settings::Settings;
use anyhow::Result;
use polling::FollowBackBot;
use std::sync::Arc;

pub use polling::CycleOutcome;

/// Builds a logged-in bot for the configured account.
pub async fn connect(settings: &Settings) -> Result<FollowBackBot> {
    let client: Arc<dyn SocialClient> = Arc::new(BskyClient::new(&settings.service)?);
    let bot = FollowBackBot::new(client, settings.username.clone());
    bot.login(&settings.password).await;
    Ok(bot)
}

pub async fn run(settings: Settings) -> Result<()> {
    tracing::info!(
        username = %settings.username,
        service = %settings.service,
        "Starting follow-back bot"
    );

    let mut bot = connect(&settings).await?;
    bot.run_until(settings.poll_interval(), shutdown_signal())
        .await;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for Ctrl-C, running until killed");
        std::future::pending::<()>().await;
    }
}
