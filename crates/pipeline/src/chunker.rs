//! Chunk Planner (C3, §4.3).
//!
//! Grounded in the `velesar-s2t` chunker's cascading-silence-split shape:
//! walk forward a window at a time, and if a silence interval falls inside
//! the window's tail, cut there instead of at the hard boundary.

use subtitle_core::{AudioChunk, SilencePoint};

/// Fraction of the window, counted from its end, in which a silence point
/// is eligible to become the cut point (§4.3: "last tail of the window").
const TAIL_FRACTION: f64 = 0.25;

/// Plan contiguous, non-overlapping chunks covering `[0, total_samples)`,
/// each at most `max_chunk_seconds` long unless a tail silence point allows
/// an earlier cut.
pub fn plan_chunks(
    total_samples: usize,
    sample_rate: u32,
    silence_points: &[SilencePoint],
    max_chunk_seconds: f64,
) -> Vec<AudioChunk> {
    if total_samples == 0 {
        return Vec::new();
    }

    let max_chunk_samples = (max_chunk_seconds * sample_rate as f64).round() as usize;
    if total_samples <= max_chunk_samples {
        return vec![AudioChunk::new(0, total_samples)];
    }

    let mut chunks = Vec::new();
    let mut cursor = 0usize;

    while cursor < total_samples {
        let window_end = (cursor + max_chunk_samples).min(total_samples);
        if window_end == total_samples {
            chunks.push(AudioChunk::new(cursor, window_end));
            break;
        }

        let tail_start = window_end - ((window_end - cursor) as f64 * TAIL_FRACTION) as usize;
        let cut = silence_points
            .iter()
            .find(|s| s.start >= tail_start && s.end <= window_end)
            .map(|s| s.midpoint())
            .unwrap_or(window_end);

        let cut = cut.max(cursor + 1).min(total_samples);
        chunks.push(AudioChunk::new(cursor, cut));
        cursor = cut;
    }

    chunks
}
