//! Translation Engine (C8, §4.8): batches subtitle entries, injects
//! context and terminology, dispatches direct (+ optional reflection)
//! LLM passes with bounded concurrency, and writes results back through
//! the persistence capability.

use std::collections::BTreeMap;
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use subtitle_config::TranslationConfig;
use subtitle_core::{
    CancellationToken, ChatCompleter, ChatOptions, EntryUpdate, Message, Persistence,
    PipelineError, ProgressBus, ProgressEvent, ProgressUpdate, Result, SubtitleEntry,
    TranslationStatus,
};

use crate::batching::{plan_batches, TranslationBatch};
use crate::prompt::{build_direct_prompt, build_reflection_prompt, parse_direct_reply, parse_reflection_reply, PromptContext};
use crate::rate_limiter::RateLimiter;
use crate::terminology::{select_relevant_terms, Term};

/// Translate every not-yet-completed batch of `task_id`'s entries,
/// mutating them in place via `persistence` (§4.8 contract).
pub async fn translate_task(
    task_id: &str,
    persistence: &dyn Persistence,
    chat: &dyn ChatCompleter,
    config: &TranslationConfig,
    terminology: &[Term],
    progress: &ProgressBus,
    cancel: CancellationToken,
) -> Result<()> {
    let task = persistence
        .get_task(task_id)
        .await?
        .ok_or_else(|| PipelineError::Persistence(format!("unknown task {task_id}")))?;

    let total = task.subtitle_entries.len() as u32;
    let mut completed = task
        .subtitle_entries
        .iter()
        .filter(|e| e.translation_status == TranslationStatus::Completed)
        .count() as u32;

    let batches = plan_batches(
        &task.subtitle_entries,
        config.batch_size,
        config.context_before,
        config.context_after,
    );

    if batches.is_empty() {
        tracing::info!(task_id, "translation already complete, no llm calls issued");
        return Ok(());
    }

    let limiter = Arc::new(RateLimiter::new(config.rpm));
    let entries = Arc::new(task.subtitle_entries);

    let outcomes = stream::iter(batches.into_iter().enumerate())
        .map(|(batch_index, batch)| {
            let entries = entries.clone();
            let limiter = limiter.clone();
            let cancel = cancel.clone();
            async move {
                let slice = entries[batch.start..batch.end].to_vec();
                translate_one_batch(batch_index, &batch, &slice, chat, config, terminology, &limiter, &cancel).await
            }
        })
        .buffer_unordered(config.thread_count.max(1))
        .collect::<Vec<_>>()
        .await;

    for outcome in outcomes {
        let (updates, tokens) = outcome?;
        if updates.is_empty() {
            continue;
        }
        persistence.batch_update_entries(task_id, updates.clone()).await?;
        completed += updates.len() as u32;
        persistence
            .update_progress(
                task_id,
                ProgressUpdate {
                    completed: Some(completed),
                    total: Some(total),
                    tokens: Some(tokens),
                },
            )
            .await?;
        progress.emit(ProgressEvent::TranslationProgress {
            completed,
            total,
            tokens_delta: tokens,
        });
    }

    Ok(())
}

async fn translate_one_batch(
    batch_index: usize,
    batch: &TranslationBatch,
    entries: &[SubtitleEntry],
    chat: &dyn ChatCompleter,
    config: &TranslationConfig,
    terminology: &[Term],
    limiter: &RateLimiter,
    cancel: &CancellationToken,
) -> Result<(Vec<EntryUpdate>, u64)> {
    if cancel.is_cancelled() {
        return Err(PipelineError::Cancelled);
    }

    let texts: Vec<String> = entries.iter().map(|e| e.text.clone()).collect();
    let haystack = format!("{}\n{}\n{}", batch.context_before, texts.join("\n"), batch.context_after);
    let terms = select_relevant_terms(terminology, &haystack);

    let ctx = PromptContext {
        source_language: &config.source_language,
        target_language: &config.target_language,
        context_before: &batch.context_before,
        context_after: &batch.context_after,
        terms: &terms,
    };

    limiter.acquire().await;
    let direct_prompt = build_direct_prompt(&texts, &ctx);
    let direct_result = chat
        .complete(
            &[
                Message::system("You are a professional subtitle translator."),
                Message::user(direct_prompt),
            ],
            ChatOptions {
                temperature: 0.3,
                max_retries: 5,
                abort_signal: cancel.clone(),
            },
        )
        .await?;

    let mut tokens = direct_result.tokens_used;
    let direct_map = parse_direct_reply(&direct_result.content).ok_or_else(|| PipelineError::Llm {
        retryable: false,
        message: format!("batch {batch_index}: unparseable direct-translation reply"),
    })?;

    let mut best: BTreeMap<usize, String> =
        direct_map.iter().map(|(i, d)| (*i, d.direct.clone())).collect();

    if config.enable_reflection {
        if cancel.is_cancelled() {
            return Err(PipelineError::Cancelled);
        }
        limiter.acquire().await;
        let reflection_prompt = build_reflection_prompt(&direct_map);
        let reflection_call = chat
            .complete(
                &[
                    Message::system("You are reviewing subtitle translations for fluency."),
                    Message::user(reflection_prompt),
                ],
                ChatOptions {
                    temperature: 0.3,
                    max_retries: 5,
                    abort_signal: cancel.clone(),
                },
            )
            .await;

        // Reflection failure — network or unparseable — silently falls back
        // to the direct result, but still accrues its token count (§4.8 step 4).
        if let Ok(result) = reflection_call {
            tokens += result.tokens_used;
            if let Some(reflection_map) = parse_reflection_reply(&result.content) {
                for (i, r) in reflection_map {
                    best.insert(i, r.best().to_string());
                }
            }
        }
    }

    let updates = entries
        .iter()
        .enumerate()
        .filter_map(|(i, entry)| {
            best.get(&(i + 1)).map(|translated| EntryUpdate {
                entry_id: entry.id,
                text: None,
                translated_text: Some(translated.clone()),
                status: Some(TranslationStatus::Completed),
            })
        })
        .collect::<Vec<_>>();

    Ok((updates, tokens))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use subtitle_core::{CompletionResult, FileType, NewTaskMeta};
    use subtitle_persistence::InMemoryTaskStore;

    struct StubChat {
        reply: String,
    }

    #[async_trait]
    impl ChatCompleter for StubChat {
        async fn complete(&self, _messages: &[Message], _options: ChatOptions) -> Result<CompletionResult> {
            Ok(CompletionResult {
                content: self.reply.clone(),
                tokens_used: 42,
            })
        }
    }

    fn entry(id: u32, text: &str, status: TranslationStatus) -> SubtitleEntry {
        SubtitleEntry {
            id,
            start_time: "00:00:00,000".into(),
            end_time: "00:00:01,000".into(),
            text: text.into(),
            translated_text: None,
            translation_status: status,
        }
    }

    #[tokio::test]
    async fn translates_a_single_batch() {
        let store = InMemoryTaskStore::new();
        let task_id = store
            .create_task(
                "clip.mp4",
                vec![entry(1, "hello", TranslationStatus::Idle)],
                0,
                NewTaskMeta { file_type: FileType::AudioVideo, file_size: 10, duration: None },
            )
            .await
            .unwrap();

        let chat = StubChat {
            reply: r#"{"1": {"origin": "hello", "direct": "bonjour"}}"#.to_string(),
        };
        let config = TranslationConfig { batch_size: 5, thread_count: 2, ..Default::default() };
        let progress = ProgressBus::new("run-1");

        translate_task(&task_id, store.as_ref(), &chat, &config, &[], &progress, CancellationToken::new())
            .await
            .unwrap();

        let task = store.get_task(&task_id).await.unwrap().unwrap();
        assert_eq!(task.subtitle_entries[0].translated_text.as_deref(), Some("bonjour"));
        assert_eq!(task.subtitle_entries[0].translation_status, TranslationStatus::Completed);
    }

    #[tokio::test]
    async fn resuming_a_partially_translated_task_completes_the_remainder() {
        let store = InMemoryTaskStore::new();
        let entries: Vec<SubtitleEntry> = (1..=10)
            .map(|i| entry(i, "line", if i <= 5 { TranslationStatus::Completed } else { TranslationStatus::Idle }))
            .collect();
        let task_id = store
            .create_task("clip.mp4", entries, 0, NewTaskMeta { file_type: FileType::AudioVideo, file_size: 10, duration: None })
            .await
            .unwrap();

        let chat = StubChat {
            reply: r#"{"1": {"origin": "line", "direct": "ligne"}, "2": {"origin": "line", "direct": "ligne"}, "3": {"origin": "line", "direct": "ligne"}, "4": {"origin": "line", "direct": "ligne"}, "5": {"origin": "line", "direct": "ligne"}}"#.to_string(),
        };
        let config = TranslationConfig { batch_size: 5, thread_count: 2, ..Default::default() };
        let progress = ProgressBus::new("run-2");

        translate_task(&task_id, store.as_ref(), &chat, &config, &[], &progress, CancellationToken::new())
            .await
            .unwrap();

        let task = store.get_task(&task_id).await.unwrap().unwrap();
        assert!(task.subtitle_entries[..5].iter().all(|e| e.translation_status == TranslationStatus::Completed));
        assert!(task.subtitle_entries[5..].iter().all(|e| e.translation_status == TranslationStatus::Completed));
    }

    #[tokio::test]
    async fn fully_completed_task_is_a_no_op() {
        struct PanicChat;
        #[async_trait]
        impl ChatCompleter for PanicChat {
            async fn complete(&self, _messages: &[Message], _options: ChatOptions) -> Result<CompletionResult> {
                panic!("should not be called");
            }
        }

        let store = InMemoryTaskStore::new();
        let entries: Vec<SubtitleEntry> = (1..=3).map(|i| entry(i, "line", TranslationStatus::Completed)).collect();
        let task_id = store
            .create_task("clip.mp4", entries, 0, NewTaskMeta { file_type: FileType::AudioVideo, file_size: 10, duration: None })
            .await
            .unwrap();

        let config = TranslationConfig::default();
        let progress = ProgressBus::new("run-3");

        translate_task(&task_id, store.as_ref(), &PanicChat, &config, &[], &progress, CancellationToken::new())
            .await
            .unwrap();
    }
}
