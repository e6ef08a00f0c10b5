//! Core types and traits for the subtitle transcription pipeline.
//!
//! This crate provides the foundations shared by every other crate:
//! - The data model (§3): PCM buffers, silence points, chunks, words,
//!   batches, sentence mappings, subtitle entries, tasks.
//! - The three capability traits (§6): `Transcriber`, `ChatCompleter`,
//!   `Persistence`.
//! - SRT formatting and passthrough parsing (C0, §4.0/§4.7).
//! - The error type (§7) and the progress/control bus (C9, §4.9).

pub mod audio;
pub mod error;
pub mod progress;
pub mod srt;
pub mod subtitle;
pub mod traits;
pub mod transcript;

pub use audio::{AudioChunk, PcmBuffer, SilencePoint};
pub use error::{PipelineError, Result};
pub use progress::{ProgressBus, ProgressEvent};
pub use srt::{classify_file_type, format_srt, format_srt_timestamp, parse_srt};
pub use subtitle::{
    FileType, HistoryEntry, SubtitleEntry, Task, TranslationProgress, TranslationStatus,
};
pub use traits::{
    CancellationToken, ChatCompleter, ChatOptions, CompletionResult, EntryUpdate, Message,
    NewTaskMeta, Persistence, ProgressUpdate, Role, TranscribeOptions, Transcriber,
    TranscriberOutput,
};
pub use transcript::{BatchInfo, SentenceMapping, SplitReason, TranscriptionWord};
