//! `Transcriber` capability (§6, C4).

use async_trait::async_trait;

use crate::error::Result;
use crate::transcript::TranscriptionWord;

#[derive(Debug, Clone, Copy)]
pub struct TranscribeOptions {
    pub return_timestamps: bool,
    pub return_confidences: bool,
    pub frame_stride: usize,
}

impl Default for TranscribeOptions {
    fn default() -> Self {
        Self {
            return_timestamps: true,
            return_confidences: true,
            frame_stride: 20,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TranscriberOutput {
    pub words: Vec<TranscriptionWord>,
}

/// The acoustic model. Implementations own model loading and inference;
/// this crate only depends on the contract.
///
/// Timestamps returned by `transcribe` are chunk-relative — the transcription
/// driver (C4) is responsible for rebasing them onto the global time axis.
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(
        &self,
        pcm: &[f32],
        sample_rate: u32,
        options: TranscribeOptions,
    ) -> Result<TranscriberOutput>;
}
