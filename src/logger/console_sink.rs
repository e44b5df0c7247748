use crate::config::LoggingConfig;
use crate::engine::Verdict;
use crate::logger::types::{VerdictLogEntry, VerdictLogSink};
use tracing::info;

pub struct ConsoleLogSink {
    config: LoggingConfig,
}

impl ConsoleLogSink {
    pub fn new(config: LoggingConfig) -> Self {
        Self { config }
    }
}

impl VerdictLogSink for ConsoleLogSink {
    fn log(&self, entry: &VerdictLogEntry) {
        if !self.config.enable {
            return;
        }
        if entry.verdict == Verdict::Safe && !self.config.log_safe {
            return;
        }

        let sender = entry
            .sender
            .map(|u| u.to_string())
            .unwrap_or_else(|| "unknown".to_string());

        if self.config.format == "json" {
            info!(
                target: "verdict",
                chat_id = %entry.chat_id,
                message_id = %entry.message_id,
                sender = %sender,
                edited = entry.edited,
                verdict = %entry.verdict,
                evidence = ?entry.explanation,
                action = %entry.action,
                lat = %entry.latency_ms
            );
        } else {
            let evidence = if entry.explanation.is_empty() {
                String::new()
            } else {
                format!(" based on the following evidence: {}", entry.explanation.join("; "))
            };
            info!(
                "chat {} message {}{} from {} -> {}{}, {} [{}ms]",
                entry.chat_id,
                entry.message_id,
                if entry.edited { " (edited)" } else { "" },
                sender,
                entry.verdict,
                evidence,
                entry.action,
                entry.latency_ms
            );
        }
    }
}
