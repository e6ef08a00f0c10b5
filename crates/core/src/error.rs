//! Pipeline error kinds (§7).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("decode error: {0}")]
    Decode(String),

    #[error("transcriber failed on chunk {chunk_index}: {message}")]
    Transcriber { chunk_index: usize, message: String },

    #[error("alignment failed on batch {batch_index}: {message}")]
    Alignment { batch_index: usize, message: String },

    #[error("llm error (retryable={retryable}): {message}")]
    Llm { retryable: bool, message: String },

    #[error("run was cancelled")]
    Cancelled,

    #[error("pipeline produced zero subtitle entries")]
    EmptyResult,

    #[error("persistence error: {0}")]
    Persistence(String),

    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
