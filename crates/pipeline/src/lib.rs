//! Audio decode, silence detection, chunking, transcription driving, batch
//! splitting, sentence alignment, and entry assembly (C1-C7), composed by
//! an orchestrator (C10) that also drives the translation engine (C8, in
//! `subtitle_translate`).

pub mod aligner;
pub mod batch_splitter;
pub mod chunker;
pub mod decoder;
pub mod driver;
pub mod entry_assembler;
pub mod json_repair;
pub mod mock_transcriber;
pub mod orchestrator;
pub mod silence;

pub use aligner::align_batch;
pub use batch_splitter::{split_into_batches, BatchSplitterConfig};
pub use chunker::plan_chunks;
pub use decoder::decode;
pub use driver::transcribe_chunks;
pub use entry_assembler::assemble_entries;
pub use mock_transcriber::MockTranscriber;
pub use orchestrator::SubtitlePipeline;
pub use silence::detect_silence;
