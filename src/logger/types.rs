use crate::engine::Verdict;
use crate::enforcement::Action;
use crate::message::{ChatId, MessageId, UserId};

#[derive(Debug, Clone)]
pub struct VerdictLogEntry {
    pub chat_id: ChatId,
    pub message_id: MessageId,
    pub sender: Option<UserId>,
    pub edited: bool,
    pub verdict: Verdict,
    pub explanation: Vec<String>,
    pub action: Action,
    pub latency_ms: u64,
}

pub trait VerdictLogSink: Send + Sync {
    fn log(&self, entry: &VerdictLogEntry);
}
