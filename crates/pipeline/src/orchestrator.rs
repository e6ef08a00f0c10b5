//! Orchestrator (C10, expansion): composes C0-C9 behind two entry points,
//! `run` and `translate`, owning the capability handles a caller would
//! otherwise have to wire up by hand.

use std::sync::Arc;

use subtitle_config::{PipelineConfig, TranslationConfig};
use subtitle_core::{
    classify_file_type, format_srt, parse_srt, CancellationToken, ChatCompleter, FileType,
    HistoryEntry, NewTaskMeta, Persistence, PipelineError, ProgressBus, ProgressEvent, Result,
    Task, TranscribeOptions, Transcriber,
};
use subtitle_translate::{translate_task, Term};

use crate::aligner::align_batch;
use crate::batch_splitter::{split_into_batches, BatchSplitterConfig};
use crate::chunker::plan_chunks;
use crate::decoder::decode;
use crate::driver::transcribe_chunks;
use crate::entry_assembler::assemble_entries;
use crate::json_repair::parse_sentence_split;
use crate::silence::detect_silence;

/// Owns the capability handles and pipeline configuration; exposes the
/// two public entry points a caller needs.
pub struct SubtitlePipeline {
    transcriber: Arc<dyn Transcriber>,
    chat: Arc<dyn ChatCompleter>,
    persistence: Arc<dyn Persistence>,
    pipeline_config: PipelineConfig,
}

/// Concurrency used when dispatching sentence-alignment LLM calls (§5
/// "bounded fan-out" applies to both C6 and C8; C8's value lives in
/// `TranslationConfig::thread_count`, C6 has no configured knob in the
/// spec so a fixed width is used here).
const ALIGNMENT_CONCURRENCY: usize = 4;

impl SubtitlePipeline {
    pub fn new(
        transcriber: Arc<dyn Transcriber>,
        chat: Arc<dyn ChatCompleter>,
        persistence: Arc<dyn Persistence>,
        pipeline_config: PipelineConfig,
    ) -> Self {
        Self {
            transcriber,
            chat,
            persistence,
            pipeline_config,
        }
    }

    /// Run C0-C9 (or just C0 for SRT input) over `file_bytes` and persist
    /// the resulting task.
    pub async fn run(
        &self,
        file_bytes: &[u8],
        filename: &str,
        cancel: CancellationToken,
    ) -> Result<Task> {
        let run_id = uuid::Uuid::new_v4().to_string();
        let progress = ProgressBus::new(run_id.clone());
        tracing::info!(run_id, filename, "pipeline run started");

        let file_type = classify_file_type(filename);
        let (entries, duration) = if file_type == FileType::Srt {
            let text = std::str::from_utf8(file_bytes)
                .map_err(|e| PipelineError::Decode(format!("invalid UTF-8 in SRT input: {e}")))?;
            (parse_srt(text)?, None)
        } else {
            self.run_media_pipeline(file_bytes, &progress, &cancel).await?
        };

        let meta = NewTaskMeta {
            file_type,
            file_size: file_bytes.len() as u64,
            duration,
        };
        let task_id = self
            .persistence
            .create_task(filename, entries, 0, meta)
            .await?;
        let task = self
            .persistence
            .get_task(&task_id)
            .await?
            .ok_or_else(|| PipelineError::Persistence(format!("task {task_id} vanished after creation")))?;

        self.persistence
            .append_history_entry(HistoryEntry {
                task_id: task.task_id.clone(),
                filename: filename.to_string(),
                completed_at: chrono::Utc::now().timestamp(),
                entry_count: task.subtitle_entries.len(),
                duration: task.duration,
            })
            .await?;

        progress.emit(ProgressEvent::Completed);
        Ok(task)
    }

    async fn run_media_pipeline(
        &self,
        file_bytes: &[u8],
        progress: &ProgressBus,
        cancel: &CancellationToken,
    ) -> Result<(Vec<subtitle_core::SubtitleEntry>, Option<f64>)> {
        if cancel.is_cancelled() {
            return Err(PipelineError::Cancelled);
        }
        progress.emit(ProgressEvent::Decoding);
        let pcm = decode(file_bytes, self.pipeline_config.sample_rate)?;
        let duration = pcm.duration_seconds();

        let silence_points = detect_silence(
            &pcm.samples,
            pcm.sample_rate,
            self.pipeline_config.silence_threshold,
            self.pipeline_config.min_silence_seconds,
        );
        let chunks = plan_chunks(
            pcm.len(),
            pcm.sample_rate,
            &silence_points,
            self.pipeline_config.max_chunk_seconds,
        );
        progress.emit(ProgressEvent::Chunking { duration });

        if cancel.is_cancelled() {
            return Err(PipelineError::Cancelled);
        }
        let options = TranscribeOptions {
            return_timestamps: true,
            return_confidences: true,
            frame_stride: self.pipeline_config.frame_stride,
        };
        let words = transcribe_chunks(self.transcriber.as_ref(), &pcm, &chunks, options, progress, cancel).await?;

        let batch_config = BatchSplitterConfig {
            batch_size: self.pipeline_config.batch_size,
            pause_threshold: self.pipeline_config.pause_threshold,
            strong_pause_seconds: self.pipeline_config.strong_pause_seconds,
            skip_llm_word_threshold: self.pipeline_config.skip_llm_word_threshold,
        };
        let batches = split_into_batches(&words, batch_config);

        progress.emit(ProgressEvent::LlmMerging);
        let mappings = self.align_all_batches(&batches, progress, cancel).await?;

        let entries = assemble_entries(&mappings, &words)?;
        Ok((entries, Some(duration)))
    }

    async fn align_all_batches(
        &self,
        batches: &[subtitle_core::BatchInfo],
        progress: &ProgressBus,
        cancel: &CancellationToken,
    ) -> Result<Vec<subtitle_core::SentenceMapping>> {
        use futures::stream::{self, StreamExt};

        let total = batches.len();
        let outcomes = stream::iter(batches.iter().enumerate())
            .map(|(batch_index, batch)| {
                let chat = self.chat.clone();
                let cancel = cancel.clone();
                let temperature = self.pipeline_config.segmentation_temperature;
                let max_retries = self.pipeline_config.segmentation_max_retries;
                let max_words = self.pipeline_config.max_words_per_llm_sentence;
                async move {
                    align_one_batch(batch_index, batch, chat.as_ref(), &cancel, temperature, max_retries, max_words)
                        .await
                }
            })
            .buffer_unordered(ALIGNMENT_CONCURRENCY)
            .collect::<Vec<_>>()
            .await;

        let mut mappings = Vec::new();
        for (i, outcome) in outcomes.into_iter().enumerate() {
            let batch_mappings = outcome?;
            mappings.extend(batch_mappings);
            progress.emit(ProgressEvent::LlmProgress {
                completed: i + 1,
                total,
                percent: (i + 1) as f32 / total.max(1) as f32 * 100.0,
            });
        }

        // Batches are processed out of completion order under
        // `buffer_unordered`, but each future's position in `outcomes`
        // mirrors its position in `batches` (the collector is indexed by
        // batch position per §5), so sorting mappings by start index
        // restores global word-stream order.
        mappings.sort_by_key(|m| m.start_idx);
        Ok(mappings)
    }

    /// Run the translation engine (C8) over an already-transcribed task.
    pub async fn translate(
        &self,
        task_id: &str,
        translation_config: &TranslationConfig,
        terminology: &[Term],
        cancel: CancellationToken,
    ) -> Result<()> {
        let progress = ProgressBus::new(format!("{task_id}-translate"));
        translate_task(
            task_id,
            self.persistence.as_ref(),
            self.chat.as_ref(),
            translation_config,
            terminology,
            &progress,
            cancel,
        )
        .await?;
        progress.emit(ProgressEvent::Completed);
        Ok(())
    }

    /// Re-render a task's current entries as an SRT document (used by
    /// callers that want the file without going through persistence again).
    pub fn to_srt(task: &Task) -> String {
        format_srt(&task.subtitle_entries)
    }
}

async fn align_one_batch(
    batch_index: usize,
    batch: &subtitle_core::BatchInfo,
    chat: &dyn ChatCompleter,
    cancel: &CancellationToken,
    temperature: f32,
    max_retries: u32,
    max_words_per_sentence: usize,
) -> Result<Vec<subtitle_core::SentenceMapping>> {
    if batch.skip_llm {
        let text = batch.words.iter().map(|w| w.text.as_str()).collect::<Vec<_>>().join(" ");
        return Ok(vec![subtitle_core::SentenceMapping {
            text,
            start_idx: batch.start_idx,
            end_idx: batch.start_idx + batch.words.len() - 1,
        }]);
    }

    if cancel.is_cancelled() {
        return Err(PipelineError::Cancelled);
    }

    let prompt = build_segmentation_prompt(batch, max_words_per_sentence);
    let result = chat
        .complete(
            &[
                subtitle_core::Message::system(
                    "You split transcribed speech into sentences without changing any words.",
                ),
                subtitle_core::Message::user(prompt),
            ],
            subtitle_core::ChatOptions {
                temperature,
                max_retries,
                abort_signal: cancel.clone(),
            },
        )
        .await?;

    let reply = parse_sentence_split(&result.content).ok_or_else(|| PipelineError::Alignment {
        batch_index,
        message: "unparseable sentence-segmentation reply".into(),
    })?;

    align_batch(batch, &reply.sentences, batch_index)
}

fn build_segmentation_prompt(batch: &subtitle_core::BatchInfo, max_words_per_sentence: usize) -> String {
    let words = batch.words.iter().map(|w| w.text.as_str()).collect::<Vec<_>>().join(" ");
    format!(
        r#"Split the following transcribed words into sentences. Do not add, remove, or reorder words; only decide where each sentence ends. Aim for at most {max_words_per_sentence} words per sentence.

WORDS:
{words}

Output ONLY JSON of the form {{"sentences": ["...", "..."]}}.

JSON:"#
    )
}
