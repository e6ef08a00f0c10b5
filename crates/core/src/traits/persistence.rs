//! `Persistence` capability (§6).
//!
//! Implementations must be atomic per call. This crate does not ship the
//! durable backend (out of scope, §1) — only the contract and the data
//! types needed to call it; see `subtitle_persistence::InMemoryTaskStore`
//! for the bundled in-process implementation.

use async_trait::async_trait;

use crate::error::Result;
use crate::subtitle::{FileType, HistoryEntry, SubtitleEntry, Task, TranslationStatus};

#[derive(Debug, Clone)]
pub struct NewTaskMeta {
    pub file_type: FileType,
    pub file_size: u64,
    pub duration: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct EntryUpdate {
    pub entry_id: u32,
    pub text: Option<String>,
    pub translated_text: Option<String>,
    pub status: Option<TranslationStatus>,
}

#[derive(Debug, Clone, Default)]
pub struct ProgressUpdate {
    pub completed: Option<u32>,
    pub total: Option<u32>,
    pub tokens: Option<u64>,
}

#[async_trait]
pub trait Persistence: Send + Sync {
    async fn create_task(
        &self,
        filename: &str,
        entries: Vec<SubtitleEntry>,
        index: usize,
        meta: NewTaskMeta,
    ) -> Result<String>;

    async fn update_entry(&self, task_id: &str, update: EntryUpdate) -> Result<()>;

    async fn batch_update_entries(&self, task_id: &str, updates: Vec<EntryUpdate>) -> Result<()>;

    async fn update_progress(&self, task_id: &str, update: ProgressUpdate) -> Result<()>;

    async fn get_task(&self, task_id: &str) -> Result<Option<Task>>;

    async fn clear_task(&self, task_id: &str) -> Result<()>;

    async fn append_history_entry(&self, entry: HistoryEntry) -> Result<()>;
}
