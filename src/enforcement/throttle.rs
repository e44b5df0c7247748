use crate::config::ThrottleScope;
use crate::message::ChatId;
use rustc_hash::FxHashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio::time::Instant;

// Per-chat clocks older than the cooldown are dropped past this size.
const PRUNE_THRESHOLD: usize = 1024;

/// Cooldown guard for warning replies.
///
/// The check and the update of the last-warning instant happen under one
/// lock, so concurrent callers inside the same window get exactly one
/// `true` between them.
#[derive(Debug)]
pub struct Throttle {
    cooldown: Duration,
    scope: ThrottleScope,
    // Key is None for the process-wide clock.
    last_warning: Mutex<FxHashMap<Option<ChatId>, Instant>>,
}

impl Throttle {
    pub fn new(cooldown: Duration, scope: ThrottleScope) -> Self {
        Self {
            cooldown,
            scope,
            last_warning: Mutex::new(FxHashMap::default()),
        }
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    pub fn scope(&self) -> ThrottleScope {
        self.scope
    }

    /// Claims the warning slot for `chat` if the cooldown has elapsed.
    pub fn try_acquire(&self, chat: ChatId) -> bool {
        self.try_acquire_at(chat, Instant::now())
    }

    pub fn try_acquire_at(&self, chat: ChatId, now: Instant) -> bool {
        let key = match self.scope {
            ThrottleScope::Global => None,
            ThrottleScope::Chat => Some(chat),
        };

        let mut last = self
            .last_warning
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(prev) = last.get(&key) {
            if now.saturating_duration_since(*prev) < self.cooldown {
                return false;
            }
        }

        if last.len() >= PRUNE_THRESHOLD {
            let cooldown = self.cooldown;
            last.retain(|_, at| now.saturating_duration_since(*at) < cooldown);
        }
        last.insert(key, now);
        true
    }

    /// Time left until `chat` may be warned again, if it is cooling down.
    pub fn remaining(&self, chat: ChatId) -> Option<Duration> {
        let key = match self.scope {
            ThrottleScope::Global => None,
            ThrottleScope::Chat => Some(chat),
        };
        let last = self
            .last_warning
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let elapsed = Instant::now().saturating_duration_since(*last.get(&key)?);
        self.cooldown.checked_sub(elapsed).filter(|d| !d.is_zero())
    }
}
