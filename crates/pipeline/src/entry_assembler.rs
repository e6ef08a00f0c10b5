//! Entry Assembler (C7, §4.7).
//!
//! Converts aligned sentence spans into `SubtitleEntry` records, drawing
//! timestamps from the first/last original word in each span.

use subtitle_core::{
    format_srt_timestamp, PipelineError, Result, SentenceMapping, SubtitleEntry,
    TranscriptionWord, TranslationStatus,
};

/// Assemble entries from `mappings` in global order. Mappings whose indices
/// fall outside `words` are dropped defensively. Fails with `EmptyResult`
/// if nothing survives.
pub fn assemble_entries(
    mappings: &[SentenceMapping],
    words: &[TranscriptionWord],
) -> Result<Vec<SubtitleEntry>> {
    let mut entries = Vec::new();
    let mut next_id = 1u32;

    for mapping in mappings {
        if mapping.start_idx > mapping.end_idx || mapping.end_idx >= words.len() {
            tracing::warn!(
                start_idx = mapping.start_idx,
                end_idx = mapping.end_idx,
                "dropping out-of-range sentence mapping"
            );
            continue;
        }

        let start_time = format_srt_timestamp(words[mapping.start_idx].start_time);
        let end_time = format_srt_timestamp(words[mapping.end_idx].end_time);

        entries.push(SubtitleEntry {
            id: next_id,
            start_time,
            end_time,
            text: mapping.text.clone(),
            translated_text: None,
            translation_status: TranslationStatus::Idle,
        });
        next_id += 1;
    }

    if entries.is_empty() {
        return Err(PipelineError::EmptyResult);
    }

    Ok(entries)
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

    #[test]
    fn assembles_the_single_chunk_scenario() {
        let words = vec![word("hello", 0.0, 0.4), word("world.", 0.5, 1.0)];
        let mappings = vec![SentenceMapping {
            text: "hello world.".into(),
            start_idx: 0,
            end_idx: 1,
        }];
        let entries = assemble_entries(&mappings, &words).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, 1);
        assert_eq!(entries[0].start_time, "00:00:00,000");
        assert_eq!(entries[0].end_time, "00:00:01,000");
        assert_eq!(entries[0].text, "hello world.");
    }

    #[test]
    fn ids_are_monotonic_across_entries() {
        let words = vec![word("a", 0.0, 0.1), word("b", 0.2, 0.3), word("c", 0.4, 0.5)];
        let mappings = vec![
            SentenceMapping { text: "a".into(), start_idx: 0, end_idx: 0 },
            SentenceMapping { text: "b".into(), start_idx: 1, end_idx: 1 },
            SentenceMapping { text: "c".into(), start_idx: 2, end_idx: 2 },
        ];
        let entries = assemble_entries(&mappings, &words).unwrap();
        assert_eq!(entries.iter().map(|e| e.id).collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn out_of_range_mapping_is_dropped_not_fatal() {
        let words = vec![word("a", 0.0, 0.1)];
        let mappings = vec![
            SentenceMapping { text: "a".into(), start_idx: 0, end_idx: 0 },
            SentenceMapping { text: "ghost".into(), start_idx: 5, end_idx: 9 },
        ];
        let entries = assemble_entries(&mappings, &words).unwrap();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn zero_surviving_entries_is_empty_result() {
        let words = vec![word("a", 0.0, 0.1)];
        let mappings = vec![SentenceMapping { text: "ghost".into(), start_idx: 5, end_idx: 9 }];
        let err = assemble_entries(&mappings, &words).unwrap_err();
        assert!(matches!(err, PipelineError::EmptyResult));
    }
}
