use anyhow::{Context, Result};
use std::sync::Arc;
use teloxide::prelude::*;
use tracing::info;

use scam_nope::config::{config_path_from_args, Config};
use scam_nope::init::{build_moderator, setup_logging};
use scam_nope::message::UserId;
use scam_nope::transport::{self, TelegramActions};

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Load Config
    let config_path = config_path_from_args(std::env::args().skip(1))?;
    let config = Config::load(&config_path)
        .await
        .with_context(|| format!("Failed to load {}", config_path))?;

    // 2. Setup Logging
    setup_logging(&config);
    info!("Starting scam-nope...");

    // 3. Identify ourselves for the admin check
    let bot = Bot::new(config.token.clone());
    let me = bot.get_me().await.context("Failed to query bot identity")?;
    info!("Running as @{} ({})", me.username(), me.user.id.0);

    // 4. Build filters, throttle and moderator
    let actions = Arc::new(TelegramActions::new(bot.clone()));
    let moderator = build_moderator(&config, actions, UserId(me.user.id.0))?;

    // 5. Serve until Ctrl-C
    transport::run(&config, bot, Arc::new(moderator)).await
}
