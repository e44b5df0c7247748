use crate::engine::{Filter, FilterResult};
use crate::enforcement::{Action, EnforcementDecider};
use crate::logger::{VerdictLogEntry, VerdictLogger};
use crate::message::Update;
use crate::stats::StatsCollector;
use anyhow::Result;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Runs every incoming update through the filters and enforces the verdict.
///
/// Shared by all concurrent handler invocations; the only mutable state it
/// reaches is the throttle inside the decider and the stats counters.
pub struct Moderator {
    filters: Vec<Box<dyn Filter>>,
    enforcer: EnforcementDecider,
    stats: Arc<StatsCollector>,
    logger: Arc<VerdictLogger>,
}

impl Moderator {
    pub fn new(
        filters: Vec<Box<dyn Filter>>,
        enforcer: EnforcementDecider,
        stats: Arc<StatsCollector>,
        logger: Arc<VerdictLogger>,
    ) -> Self {
        Self {
            filters,
            enforcer,
            stats,
            logger,
        }
    }

    /// Merged verdict of all filters.
    pub fn assess(&self, update: &Update) -> FilterResult {
        FilterResult::merge_all(self.filters.iter().map(|f| {
            let res = f.assess(update);
            debug!("Filter '{}': {}", f.name(), res);
            res
        }))
    }

    pub async fn handle(&self, update: &Update) -> Result<Action> {
        let Some(message) = update.effective_message() else {
            return Ok(Action::NoAction);
        };

        let start = Instant::now();
        self.stats.inc_messages();

        let result = self.assess(update);
        self.stats.record_verdict(result.verdict);
        info!("Verdict: {}", result);

        let outcome = if result.is_enforceable() {
            self.enforcer.enforce(message).await
        } else {
            Ok(Action::NoAction)
        };

        match &outcome {
            Ok(action) => self.stats.record_action(*action),
            Err(_) => self.stats.inc_errors(),
        }

        self.logger.log(VerdictLogEntry {
            chat_id: message.chat_id,
            message_id: message.id,
            sender: message.sender,
            edited: update.message.is_none(),
            verdict: result.verdict,
            explanation: result.explanation.unwrap_or_default(),
            action: *outcome.as_ref().unwrap_or(&Action::NoAction),
            latency_ms: start.elapsed().as_millis() as u64,
        });

        outcome
    }
}
