use super::{VerdictLogEntry, VerdictLogSink};
use std::collections::VecDeque;
use std::sync::{Arc, PoisonError, RwLock};

/// Keeps the most recent entries for inspection.
#[derive(Clone)]
pub struct MemoryLogSink {
    buffer: Arc<RwLock<VecDeque<VerdictLogEntry>>>,
    capacity: usize,
}

impl MemoryLogSink {
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: Arc::new(RwLock::new(VecDeque::with_capacity(capacity))),
            capacity,
        }
    }

    pub fn get_recent(&self) -> Vec<VerdictLogEntry> {
        let buffer = self.buffer.read().unwrap_or_else(PoisonError::into_inner);
        buffer.iter().cloned().collect()
    }
}

impl VerdictLogSink for MemoryLogSink {
    fn log(&self, entry: &VerdictLogEntry) {
        if self.capacity == 0 {
            return;
        }
        let mut buffer = self.buffer.write().unwrap_or_else(PoisonError::into_inner);
        if buffer.len() >= self.capacity {
            buffer.pop_front();
        }
        buffer.push_back(entry.clone());
    }
}
