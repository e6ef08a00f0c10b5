//! Batch Splitter (C5, §4.5).
//!
//! Groups the global word stream into LLM-sized batches using a pause
//! threshold, a terminal-punctuation fallback, and a hard word-count cap,
//! with a skip-LLM short-circuit for trivial batches.

use std::sync::OnceLock;

use regex::Regex;
use subtitle_core::{BatchInfo, SplitReason, TranscriptionWord};

fn terminal_punctuation_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[.?!。？！]$").expect("valid terminal-punctuation regex"))
}

#[derive(Debug, Clone, Copy)]
pub struct BatchSplitterConfig {
    pub batch_size: usize,
    pub pause_threshold: f64,
    pub strong_pause_seconds: f64,
    pub skip_llm_word_threshold: usize,
}

/// Split `words` (assumed globally ordered) into batches per §4.5.
pub fn split_into_batches(words: &[TranscriptionWord], config: BatchSplitterConfig) -> Vec<BatchInfo> {
    let mut sorted: Vec<TranscriptionWord> = words.to_vec();
    sorted.sort_by(|a, b| a.start_time.partial_cmp(&b.start_time).unwrap());

    let mut batches = Vec::new();
    let mut cursor = 0usize;

    while cursor < sorted.len() {
        let window_end = (cursor + config.batch_size).min(sorted.len());
        let window = &sorted[cursor..window_end];

        let (cut_len, reason, pause_gap) = find_cut(window, config);
        let batch_words = window[..cut_len].to_vec();
        let skip_llm = should_skip_llm(&batch_words, reason, pause_gap, config);

        batches.push(BatchInfo {
            words: batch_words,
            start_idx: cursor,
            split_reason: reason,
            pause_gap,
            skip_llm,
        });
        cursor += cut_len;
    }

    batches
}

/// Returns `(cut_length, reason, pause_gap)` where `cut_length` is the
/// number of words (from the window's start) the batch should contain.
fn find_cut(
    window: &[TranscriptionWord],
    config: BatchSplitterConfig,
) -> (usize, SplitReason, Option<f64>) {
    // 1. Pause scan: first adjacent gap exceeding the threshold.
    for i in 0..window.len().saturating_sub(1) {
        let gap = window[i + 1].start_time - window[i].end_time;
        if gap > config.pause_threshold {
            return (i + 1, SplitReason::Pause, Some(gap));
        }
    }

    // 2. Punctuation fallback: last word in the window ending terminally.
    for i in (0..window.len()).rev() {
        if ends_with_terminal_punctuation(&window[i].text) {
            return (i + 1, SplitReason::Punctuation, None);
        }
    }

    // 3. Hard limit.
    (window.len(), SplitReason::Limit, None)
}

fn ends_with_terminal_punctuation(word: &str) -> bool {
    terminal_punctuation_regex().is_match(word)
}

fn should_skip_llm(
    batch_words: &[TranscriptionWord],
    reason: SplitReason,
    pause_gap: Option<f64>,
    config: BatchSplitterConfig,
) -> bool {
    if batch_words.len() <= config.skip_llm_word_threshold {
        return true;
    }
    if reason == SplitReason::Pause {
        if let Some(gap) = pause_gap {
            if gap > config.strong_pause_seconds {
                if let Some(last) = batch_words.last() {
                    return ends_with_terminal_punctuation(&last.text);
                }
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(text: &str, start: f64, end: f64) -> TranscriptionWord {
        TranscriptionWord {
            text: text.into(),
            start_time: start,
            end_time: end,
            confidence: 0.9,
        }
    }

    fn default_config() -> BatchSplitterConfig {
        BatchSplitterConfig {
            batch_size: 100,
            pause_threshold: 0.8,
            strong_pause_seconds: 1.5,
            skip_llm_word_threshold: 4,
        }
    }

    #[test]
    fn two_word_batch_with_terminal_punctuation_skips_llm() {
        let words = vec![word("hello", 0.0, 0.4), word("world.", 0.5, 1.0)];
        let batches = split_into_batches(&words, default_config());
        assert_eq!(batches.len(), 1);
        assert!(batches[0].skip_llm);
    }

    #[test]
    fn pause_based_split_cuts_after_index_four() {
        let mut words: Vec<TranscriptionWord> = (0..10)
            .map(|i| word(&format!("w{i}"), i as f64, i as f64 + 0.5))
            .collect();
        words[4].end_time = 2.0;
        words[5].start_time = 3.2;
        let batches = split_into_batches(&words, default_config());
        assert_eq!(batches[0].words.len(), 5);
        assert_eq!(batches[0].split_reason, SplitReason::Pause);
        assert!((batches[0].pause_gap.unwrap() - 1.2).abs() < 1e-9);
    }

    #[test]
    fn punctuation_fallback_cuts_after_word_sixty() {
        let mut words: Vec<TranscriptionWord> = (0..100)
            .map(|i| word(&format!("w{i}"), i as f64 * 0.3, i as f64 * 0.3 + 0.2))
            .collect();
        words[60].text = "w60.".into();
        let batches = split_into_batches(&words, default_config());
        assert_eq!(batches[0].words.len(), 61);
        assert_eq!(batches[0].split_reason, SplitReason::Punctuation);
    }

    #[test]
    fn batches_partition_the_stream_with_no_gaps() {
        let words: Vec<TranscriptionWord> = (0..250)
            .map(|i| word(&format!("w{i}"), i as f64 * 0.3, i as f64 * 0.3 + 0.2))
            .collect();
        let batches = split_into_batches(&words, default_config());
        let mut cursor = 0;
        for batch in &batches {
            assert_eq!(batch.start_idx, cursor);
            assert!(!batch.words.is_empty());
            cursor = batch.end_idx_exclusive();
        }
        assert_eq!(cursor, 250);
    }
}
