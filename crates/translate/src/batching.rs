//! Translation batch planning (§4.8 steps 1-2): partition entries into
//! contiguous batches, skip already-completed ones (resumability), and
//! compute each surviving batch's context windows.

use subtitle_core::{SubtitleEntry, TranslationStatus};

/// A contiguous, not-yet-fully-translated slice of `Task::subtitle_entries`.
#[derive(Debug, Clone)]
pub struct TranslationBatch {
    /// Index range into the full entry list, `[start, end)`.
    pub start: usize,
    pub end: usize,
    pub context_before: String,
    pub context_after: String,
}

impl TranslationBatch {
    pub fn len(&self) -> usize {
        self.end - self.start
    }
}

/// Partition `entries` into batches of `batch_size`, dropping any batch
/// whose every entry already has `translation_status = Completed`.
pub fn plan_batches(
    entries: &[SubtitleEntry],
    batch_size: usize,
    context_before: usize,
    context_after: usize,
) -> Vec<TranslationBatch> {
    let mut batches = Vec::new();
    let mut cursor = 0usize;

    while cursor < entries.len() {
        let end = (cursor + batch_size).min(entries.len());
        let slice = &entries[cursor..end];

        if !slice.iter().all(|e| e.translation_status == TranslationStatus::Completed) {
            let before_start = cursor.saturating_sub(context_before);
            let after_end = (end + context_after).min(entries.len());

            batches.push(TranslationBatch {
                start: cursor,
                end,
                context_before: join_texts(&entries[before_start..cursor]),
                context_after: join_texts(&entries[end..after_end]),
            });
        }

        cursor = end;
    }

    batches
}

fn join_texts(entries: &[SubtitleEntry]) -> String {
    entries.iter().map(|e| e.text.as_str()).collect::<Vec<_>>().join("\n")
}
