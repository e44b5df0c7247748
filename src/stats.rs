use crate::engine::Verdict;
use crate::enforcement::Action;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::time::{self, Duration};
use tracing::info;

#[derive(Debug, Default)]
pub struct StatsCollector {
    messages: AtomicU64,
    // Indexed like Verdict::ALL
    verdicts: [AtomicU64; 3],
    deleted: AtomicU64,
    warned: AtomicU64,
    throttled: AtomicU64,
    errors: AtomicU64,
}

/// Point-in-time copy of the counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatsSnapshot {
    pub messages: u64,
    pub safe: u64,
    pub questionable: u64,
    pub scam: u64,
    pub deleted: u64,
    pub warned: u64,
    pub throttled: u64,
    pub errors: u64,
}

impl StatsCollector {
    /// Counters only, no periodic dump.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Counters plus a background task logging them every `log_interval_sec`.
    pub fn with_dump(log_interval_sec: u64) -> Arc<Self> {
        let stats = Self::new();
        let stats_clone = stats.clone();
        let interval = Duration::from_secs(log_interval_sec.max(1));
        tokio::spawn(async move {
            stats_clone.run_logger(interval).await;
        });
        stats
    }

    pub fn inc_messages(&self) {
        self.messages.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_verdict(&self, verdict: Verdict) {
        if let Some(idx) = Verdict::ALL.iter().position(|v| *v == verdict) {
            self.verdicts[idx].fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_action(&self, action: Action) {
        let counter = match action {
            Action::NoAction => return,
            Action::Deleted => &self.deleted,
            Action::Warned => &self.warned,
            Action::Throttled => &self.throttled,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_errors(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            messages: self.messages.load(Ordering::Relaxed),
            safe: self.verdicts[0].load(Ordering::Relaxed),
            questionable: self.verdicts[1].load(Ordering::Relaxed),
            scam: self.verdicts[2].load(Ordering::Relaxed),
            deleted: self.deleted.load(Ordering::Relaxed),
            warned: self.warned.load(Ordering::Relaxed),
            throttled: self.throttled.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
        }
    }

    async fn run_logger(&self, period: Duration) {
        let mut interval = time::interval(period);
        // The first tick completes immediately
        interval.tick().await;
        loop {
            interval.tick().await;
            self.dump_stats();
        }
    }

    fn dump_stats(&self) {
        let s = self.snapshot();
        info!(
            "STATS DUMP: Messages: {}, Safe: {}, Questionable: {}, Scam: {} ({:.1}%), Deleted: {}, Warned: {}, Throttled: {}, Errors: {}",
            s.messages,
            s.safe,
            s.questionable,
            s.scam,
            if s.messages > 0 {
                (s.scam as f64 / s.messages as f64) * 100.0
            } else {
                0.0
            },
            s.deleted,
            s.warned,
            s.throttled,
            s.errors
        );
    }
}
