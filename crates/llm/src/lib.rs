//! The shipped `ChatCompleter` implementation (§6).
//!
//! The abstract contract lives in `subtitle-core`; this crate provides one
//! concrete HTTP adapter against an OpenAI-compatible endpoint so the
//! pipeline and its integration tests have something real to call.

pub mod openai;

pub use openai::{OpenAiChatCompleter, OpenAiConfig};
