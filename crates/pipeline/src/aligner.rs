//! Sentence Aligner (C6, §4.6) — step C: mapping LLM sentence boundaries
//! back onto the original acoustic-model words.
//!
//! The LLM never gets to rewrite a word's spelling or timing; it only gets
//! to say where a sentence ends. This module computes that mapping via a
//! greedy longest-common-substring-block search (Ratcliff/Obershelp style),
//! as decided in the spec's open questions.

use subtitle_core::{BatchInfo, PipelineError, Result, SentenceMapping};
use unicode_segmentation::UnicodeSegmentation;

/// `(a_start, b_start, length)`: `A[a_start..a_start+length] == B[b_start..b_start+length]`.
type MatchBlock = (usize, usize, usize);

/// Lowercase and strip everything but alphanumerics (CJK/Hangul code points
/// are already classified alphanumeric by `char::is_alphanumeric`, so a
/// single filter covers both rules in §4.6 step 1).
fn normalize_word(word: &str) -> String {
    word.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(|c| c.to_lowercase())
        .collect()
}

fn longest_common_substring(a: &[String], b: &[String]) -> Option<(usize, usize, usize)> {
    if a.is_empty() || b.is_empty() {
        return None;
    }
    let mut dp = vec![vec![0usize; b.len() + 1]; a.len() + 1];
    let mut best = (0usize, 0usize, 0usize);
    for i in 1..=a.len() {
        for j in 1..=b.len() {
            if a[i - 1] == b[j - 1] {
                dp[i][j] = dp[i - 1][j - 1] + 1;
                if dp[i][j] > best.2 {
                    best = (i - dp[i][j], j - dp[i][j], dp[i][j]);
                }
            }
        }
    }
    if best.2 == 0 {
        None
    } else {
        Some(best)
    }
}

/// Greedy recursive longest-match search over the whole range, matching
/// `difflib::SequenceMatcher::get_matching_blocks`'s shape.
fn matching_blocks(a: &[String], b: &[String]) -> Vec<MatchBlock> {
    let mut result = Vec::new();
    let mut stack = vec![(0usize, a.len(), 0usize, b.len())];

    while let Some((a_lo, a_hi, b_lo, b_hi)) = stack.pop() {
        if a_lo >= a_hi || b_lo >= b_hi {
            continue;
        }
        if let Some((rel_a, rel_b, len)) = longest_common_substring(&a[a_lo..a_hi], &b[b_lo..b_hi]) {
            let a_start = a_lo + rel_a;
            let b_start = b_lo + rel_b;
            result.push((a_start, b_start, len));
            stack.push((a_lo, a_start, b_lo, b_start));
            stack.push((a_start + len, a_hi, b_start + len, b_hi));
        }
    }

    result.sort_unstable_by_key(|m| m.0);
    result
}

/// Map one LLM-side split index onto an original-word split index, tried
/// in the three-tier order from §4.6 step 4.
fn map_split(llm_split: usize, blocks: &[MatchBlock], a_len: usize) -> usize {
    for &(a_start, b_start, len) in blocks {
        if b_start < llm_split && llm_split < b_start + len {
            return a_start + (llm_split - b_start);
        }
    }
    for &(a_start, b_start, _len) in blocks {
        if b_start >= llm_split {
            return a_start;
        }
    }
    a_len
}

/// Align `llm_sentences` onto `batch`'s original words, producing
/// sentence mappings in global word-stream coordinates.
pub fn align_batch(
    batch: &BatchInfo,
    llm_sentences: &[String],
    batch_index: usize,
) -> Result<Vec<SentenceMapping>> {
    if batch.words.is_empty() {
        return Err(PipelineError::Alignment {
            batch_index,
            message: "batch has no words to align".into(),
        });
    }
    if llm_sentences.is_empty() {
        return Err(PipelineError::Alignment {
            batch_index,
            message: "llm returned no sentences".into(),
        });
    }

    let a: Vec<String> = batch.words.iter().map(|w| normalize_word(&w.text)).collect();

    let mut b: Vec<String> = Vec::new();
    let mut llm_splits: Vec<usize> = Vec::with_capacity(llm_sentences.len());
    for sentence in llm_sentences {
        for token in sentence.unicode_words() {
            b.push(normalize_word(token));
        }
        llm_splits.push(b.len());
    }

    let blocks = matching_blocks(&a, &b);

    let mut original_splits: Vec<usize> = llm_splits
        .iter()
        .map(|&split| map_split(split, &blocks, a.len()))
        .collect();

    if llm_splits.last() == Some(&b.len()) && original_splits.last() != Some(&a.len()) {
        original_splits.push(a.len());
    }

    original_splits.retain(|&s| s > 0 && s <= a.len());
    original_splits.sort_unstable();
    original_splits.dedup();

    let mut mappings = Vec::new();
    let mut prev = 0usize;
    for split in original_splits {
        if split <= prev {
            continue;
        }
        let text = batch.words[prev..split]
            .iter()
            .map(|w| w.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        mappings.push(SentenceMapping {
            text,
            start_idx: batch.start_idx + prev,
            end_idx: batch.start_idx + split - 1,
        });
        prev = split;
    }

    if mappings.is_empty() {
        return Err(PipelineError::Alignment {
            batch_index,
            message: "alignment produced zero sentence mappings".into(),
        });
    }

    Ok(mappings)
}
