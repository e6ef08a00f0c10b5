//! Capability traits for the three external collaborators named in §6:
//! the acoustic model (`Transcriber`), the language model (`ChatCompleter`),
//! and durable storage (`Persistence`); plus the `CancellationToken` threaded
//! through every stage boundary (§5).

mod cancel;
mod chat;
mod persistence;
mod transcriber;

pub use cancel::CancellationToken;
pub use chat::{ChatCompleter, ChatOptions, CompletionResult, Message, Role};
pub use persistence::{EntryUpdate, NewTaskMeta, Persistence, ProgressUpdate};
pub use transcriber::{TranscribeOptions, Transcriber, TranscriberOutput};
