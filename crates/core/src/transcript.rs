//! Word-level transcript types produced by the transcription driver (C4) and
//! consumed by the batch splitter (C5) and sentence aligner (C6).

use serde::{Deserialize, Serialize};

/// A single word with global (run-relative, not chunk-relative) timestamps.
///
/// Invariant: `start_time <= end_time`. Across a full word stream,
/// `words[i].start_time <= words[i + 1].start_time`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptionWord {
    pub text: String,
    pub start_time: f64,
    pub end_time: f64,
    pub confidence: f32,
}

/// Why a batch boundary was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SplitReason {
    Pause,
    Punctuation,
    Limit,
}

/// A contiguous slice of the global word stream handed to one LLM
/// segmentation call.
///
/// Invariant: batches partition the word stream in order, each non-empty.
#[derive(Debug, Clone)]
pub struct BatchInfo {
    pub words: Vec<TranscriptionWord>,
    /// Index of `words[0]` within the full word stream.
    pub start_idx: usize,
    pub split_reason: SplitReason,
    pub pause_gap: Option<f64>,
    pub skip_llm: bool,
}

impl BatchInfo {
    pub fn end_idx_exclusive(&self) -> usize {
        self.start_idx + self.words.len()
    }
}

/// A sentence boundary mapped back onto the original word stream.
///
/// `start_idx`/`end_idx` are inclusive indices into the global word stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentenceMapping {
    pub text: String,
    pub start_idx: usize,
    pub end_idx: usize,
}
