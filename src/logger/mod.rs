pub mod console_sink;
pub mod memory_sink;
pub mod types;

pub use self::console_sink::ConsoleLogSink;
pub use self::memory_sink::MemoryLogSink;
pub use self::types::{VerdictLogEntry, VerdictLogSink};

use crate::config::LoggingConfig;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::warn;

const SINK_BUFFER: usize = 1000;

/// Fans verdict records out to the configured sinks.
///
/// Each sink drains its own channel on a background task; a full buffer
/// drops the record instead of stalling message handling.
pub struct VerdictLogger {
    sinks: Vec<mpsc::Sender<VerdictLogEntry>>,
    memory: Option<MemoryLogSink>,
}

impl VerdictLogger {
    pub fn new(config: LoggingConfig) -> Arc<Self> {
        Self::with_sinks(config, Vec::new())
    }

    pub fn with_sinks(config: LoggingConfig, extra: Vec<Box<dyn VerdictLogSink>>) -> Arc<Self> {
        let mut sinks = Vec::new();
        let mut memory = None;

        for sink_type in &config.verdict_log_sinks {
            match sink_type.as_str() {
                "console" => sinks.push(spawn_sink(Box::new(ConsoleLogSink::new(config.clone())))),
                "memory" => {
                    let sink = MemoryLogSink::new(config.memory_capacity);
                    memory = Some(sink.clone());
                    sinks.push(spawn_sink(Box::new(sink)));
                }
                other => warn!("Unknown verdict log sink type: {}", other),
            }
        }
        for sink in extra {
            sinks.push(spawn_sink(sink));
        }

        Arc::new(Self { sinks, memory })
    }

    pub fn log(&self, entry: VerdictLogEntry) {
        let len = self.sinks.len();
        for (i, sink) in self.sinks.iter().enumerate() {
            // Fire and forget, don't block caller if buffer full
            if i == len - 1 {
                let _ = sink.try_send(entry);
                break;
            }
            let _ = sink.try_send(entry.clone());
        }
    }

    /// Entries held by the `memory` sink, oldest first.
    pub fn recent(&self) -> Vec<VerdictLogEntry> {
        self.memory
            .as_ref()
            .map(MemoryLogSink::get_recent)
            .unwrap_or_default()
    }
}

fn spawn_sink(sink: Box<dyn VerdictLogSink>) -> mpsc::Sender<VerdictLogEntry> {
    let (tx, mut rx) = mpsc::channel::<VerdictLogEntry>(SINK_BUFFER);
    tokio::spawn(async move {
        while let Some(entry) = rx.recv().await {
            sink.log(&entry);
        }
    });
    tx
}
