//! Transcription Driver (C4, §4.4).
//!
//! Drives the acoustic model over each planned chunk, rebases its
//! chunk-relative timestamps onto the global time axis, and concatenates
//! the per-chunk word streams in chunk order.

use subtitle_core::{
    AudioChunk, CancellationToken, PcmBuffer, PipelineError, ProgressBus, ProgressEvent, Result,
    TranscribeOptions, Transcriber, TranscriptionWord,
};

/// Run `transcriber` over every chunk, rebasing timestamps and honoring
/// cancellation at each chunk boundary (§5: suspension points).
pub async fn transcribe_chunks(
    transcriber: &dyn Transcriber,
    pcm: &PcmBuffer,
    chunks: &[AudioChunk],
    options: TranscribeOptions,
    progress: &ProgressBus,
    cancel: &CancellationToken,
) -> Result<Vec<TranscriptionWord>> {
    let mut words = Vec::new();
    let total = chunks.len();

    for (index, chunk) in chunks.iter().enumerate() {
        if cancel.is_cancelled() {
            return Err(PipelineError::Cancelled);
        }

        let offset_seconds = chunk.start_sample as f64 / pcm.sample_rate as f64;
        let slice = pcm.slice(chunk.start_sample, chunk.end_sample);

        tracing::info!(chunk_index = index, chunk_len = slice.len(), "transcribing chunk");
        let output = transcriber
            .transcribe(slice, pcm.sample_rate, options)
            .await
            .map_err(|e| PipelineError::Transcriber {
                chunk_index: index,
                message: e.to_string(),
            })?;

        for mut word in output.words {
            word.start_time += offset_seconds;
            word.end_time += offset_seconds;
            words.push(word);
        }

        progress.emit(ProgressEvent::Transcribing {
            current: index + 1,
            total,
            percent: (index + 1) as f32 / total.max(1) as f32 * 100.0,
        });
    }

    Ok(words)
}
