//! Silence Detector (C2, §4.2).
//!
//! A pure function of PCM plus parameters: scan for low-energy spans long
//! enough to be candidate cut points for the chunk planner (C3).

use subtitle_core::SilencePoint;

/// Mean-absolute-energy over a sliding window; emits spans whose energy
/// stays below `threshold` for at least `min_duration_seconds`.
pub fn detect_silence(
    pcm: &[f32],
    sample_rate: u32,
    threshold: f32,
    min_duration_seconds: f64,
) -> Vec<SilencePoint> {
    if pcm.is_empty() {
        return Vec::new();
    }

    let window = (sample_rate as f64 * 0.02).round().max(1.0) as usize;
    let min_samples = (min_duration_seconds * sample_rate as f64).round() as usize;

    let mut points = Vec::new();
    let mut run_start: Option<usize> = None;

    let mut i = 0;
    while i < pcm.len() {
        let end = (i + window).min(pcm.len());
        let energy = mean_abs(&pcm[i..end]);
        if energy < threshold {
            if run_start.is_none() {
                run_start = Some(i);
            }
        } else if let Some(start) = run_start.take() {
            push_if_long_enough(&mut points, start, i, min_samples);
        }
        i = end;
    }
    if let Some(start) = run_start {
        push_if_long_enough(&mut points, start, pcm.len(), min_samples);
    }

    points
}

fn push_if_long_enough(points: &mut Vec<SilencePoint>, start: usize, end: usize, min_samples: usize) {
    if end > start && end - start >= min_samples {
        points.push(SilencePoint::new(start, end));
    }
}

fn mean_abs(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    samples.iter().map(|s| s.abs()).sum::<f32>() / samples.len() as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_a_silent_gap_between_loud_regions() {
        let sample_rate = 16_000;
        let mut pcm = vec![0.5f32; sample_rate as usize / 10];
        pcm.extend(vec![0.0f32; sample_rate as usize / 2]);
        pcm.extend(vec![0.5f32; sample_rate as usize / 10]);

        let points = detect_silence(&pcm, sample_rate, 0.01, 0.3);
        assert_eq!(points.len(), 1);
        assert!(points[0].len() >= sample_rate as usize / 2 - (sample_rate as usize / 50));
    }

    #[test]
    fn ignores_silence_shorter_than_minimum() {
        let sample_rate = 16_000;
        let mut pcm = vec![0.5f32; sample_rate as usize];
        pcm.extend(vec![0.0f32; sample_rate as usize / 100]);
        pcm.extend(vec![0.5f32; sample_rate as usize]);

        let points = detect_silence(&pcm, sample_rate, 0.01, 0.3);
        assert!(points.is_empty());
    }

    #[test]
    fn empty_pcm_yields_no_points() {
        assert!(detect_silence(&[], 16_000, 0.01, 0.3).is_empty());
    }
}
