//! Progress / control bus (C9, §4.9).

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ProgressEvent {
    Decoding,
    Chunking { duration: f64 },
    Transcribing { current: usize, total: usize, percent: f32 },
    LlmMerging,
    LlmProgress { completed: usize, total: usize, percent: f32 },
    TranslationProgress { completed: u32, total: u32, tokens_delta: u64 },
    Completed,
    Failed { error: String },
}

/// Broadcasts lifecycle events to any number of subscribers and logs each
/// event via `tracing` so the event stream and log stream never diverge.
#[derive(Clone)]
pub struct ProgressBus {
    task_id: String,
    sender: broadcast::Sender<ProgressEvent>,
}

impl ProgressBus {
    pub fn new(task_id: impl Into<String>) -> Self {
        let (sender, _) = broadcast::channel(256);
        Self {
            task_id: task_id.into(),
            sender,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ProgressEvent> {
        self.sender.subscribe()
    }

    pub fn emit(&self, event: ProgressEvent) {
        tracing::info!(task_id = %self.task_id, event = ?event, "progress");
        // No subscribers is not an error: the caller may not be listening.
        let _ = self.sender.send(event);
    }
}
