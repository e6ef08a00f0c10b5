//! `MockTranscriber`: the only `Transcriber` test double this crate ships
//! (§6 — the acoustic model itself is explicitly out of scope).

use async_trait::async_trait;
use parking_lot::Mutex;
use subtitle_core::{Result, TranscribeOptions, Transcriber, TranscriberOutput, TranscriptionWord};

/// Returns a fixed, pre-scripted word list on every call, ignoring the PCM
/// it's handed. Useful for driving the pipeline end-to-end in tests
/// without a real acoustic model.
pub struct MockTranscriber {
    words: Mutex<Vec<TranscriptionWord>>,
}

impl MockTranscriber {
    pub fn new(words: Vec<TranscriptionWord>) -> Self {
        Self {
            words: Mutex::new(words),
        }
    }
}

#[async_trait]
impl Transcriber for MockTranscriber {
    async fn transcribe(
        &self,
        _pcm: &[f32],
        _sample_rate: u32,
        _options: TranscribeOptions,
    ) -> Result<TranscriberOutput> {
        Ok(TranscriberOutput {
            words: self.words.lock().clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn returns_the_scripted_words_regardless_of_input() {
        let transcriber = MockTranscriber::new(vec![TranscriptionWord {
            text: "hi".into(),
            start_time: 0.0,
            end_time: 0.2,
            confidence: 1.0,
        }]);
        let output = transcriber
            .transcribe(&[], 16_000, TranscribeOptions::default())
            .await
            .unwrap();
        assert_eq!(output.words.len(), 1);
        assert_eq!(output.words[0].text, "hi");
    }
}
