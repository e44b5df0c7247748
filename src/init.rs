//! Initialization helpers for the application startup.

use crate::config::Config;
use crate::engine::FilterRegistry;
use crate::enforcement::{ChatActions, EnforcementDecider, Throttle};
use crate::handler::Moderator;
use crate::logger::VerdictLogger;
use crate::message::UserId;
use crate::stats::StatsCollector;
use anyhow::Result;
use std::sync::Arc;
use tracing::info;

/// Sets up the tracing subscriber with the configured filters.
pub fn setup_logging(config: &Config) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let mut filter = config.logging.level.clone();

        // HTTP client internals are noise unless asked for
        if !filter.contains("hyper") {
            filter.push_str(",hyper=off");
        }
        if !filter.contains("reqwest") {
            filter.push_str(",reqwest=warn");
        }

        tracing_subscriber::EnvFilter::new(filter)
    });

    tracing_subscriber::fmt().with_env_filter(env_filter).init();
}

/// Builds the filter chain, throttle, stats and verdict log around the
/// given transport.
///
/// Fails on any filter configuration problem; nothing runs half-configured.
pub fn build_moderator(
    config: &Config,
    actions: Arc<dyn ChatActions>,
    bot_id: UserId,
) -> Result<Moderator> {
    let filters = FilterRegistry::standard().build_all(&config.filters)?;
    if filters.is_empty() {
        info!("No filters configured; every message will be SAFE.");
    }

    let throttle = Arc::new(Throttle::new(
        config.enforcement.cooldown(),
        config.enforcement.throttle_scope,
    ));
    info!(
        "Warnings throttled to one per {}s ({:?} scope)",
        config.enforcement.cooldown_secs, config.enforcement.throttle_scope
    );

    let enforcer = EnforcementDecider::new(actions, bot_id, config.warning.clone(), throttle);

    let stats = if config.stats.enable {
        StatsCollector::with_dump(config.stats.log_interval_seconds)
    } else {
        StatsCollector::new()
    };
    let logger = VerdictLogger::new(config.logging.clone());

    Ok(Moderator::new(filters, enforcer, stats, logger))
}
