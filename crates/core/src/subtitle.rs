//! Subtitle entries and the persisted `Task` record (§3).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TranslationStatus {
    Idle,
    InProgress,
    Completed,
    Failed,
}

/// One subtitle cue: a time-coded sentence span, 1-based and contiguous
/// within a `Task`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubtitleEntry {
    pub id: u32,
    /// SRT-formatted `HH:MM:SS,mmm`.
    pub start_time: String,
    /// SRT-formatted `HH:MM:SS,mmm`.
    pub end_time: String,
    pub text: String,
    pub translated_text: Option<String>,
    pub translation_status: TranslationStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileType {
    Srt,
    AudioVideo,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct TranslationProgress {
    pub completed: u32,
    pub total: u32,
    pub tokens: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub task_id: String,
    pub filename: String,
    pub subtitle_entries: Vec<SubtitleEntry>,
    pub translation_progress: TranslationProgress,
    pub file_type: FileType,
    pub duration: Option<f64>,
}

/// Append-only audit record of a completed task, written once per run via
/// `append_history_entry`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub task_id: String,
    pub filename: String,
    pub completed_at: i64,
    pub entry_count: usize,
    pub duration: Option<f64>,
}
