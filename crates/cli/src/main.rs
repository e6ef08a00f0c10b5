//! Command-line entry point.
//!
//! Wires the shipped capability implementations (`subtitle_llm`'s OpenAI
//! adapter, `subtitle_persistence`'s in-memory store, and the `MockTranscriber`
//! test double — no real acoustic model ships with this crate, see §6) into a
//! `SubtitlePipeline` and runs it end-to-end against a single input file.
//!
//! This is the only place `anyhow` appears: library code below this
//! boundary returns `subtitle_core::Result` / `PipelineError`.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use subtitle_config::load_settings;
use subtitle_core::{CancellationToken, TranscriptionWord};
use subtitle_llm::{OpenAiChatCompleter, OpenAiConfig};
use subtitle_pipeline::{MockTranscriber, SubtitlePipeline};
use subtitle_translate::Term;

struct Args {
    input: PathBuf,
    target_language: Option<String>,
    terms: Vec<Term>,
    config_path: Option<String>,
}

fn parse_args() -> anyhow::Result<Args> {
    let mut raw = std::env::args().skip(1);
    let input = raw
        .next()
        .context("usage: subtitle <input-file> [--target-lang <lang>] [--term src=tgt] [--config <path>]")?;

    let mut target_language = None;
    let mut terms = Vec::new();
    let mut config_path = None;

    while let Some(flag) = raw.next() {
        match flag.as_str() {
            "--target-lang" => {
                target_language = Some(raw.next().context("--target-lang requires a value")?);
            }
            "--term" => {
                let value = raw.next().context("--term requires a src=tgt value")?;
                let (source, target) = value
                    .split_once('=')
                    .with_context(|| format!("--term value {value:?} is not of the form src=tgt"))?;
                terms.push((source.to_string(), target.to_string()));
            }
            "--config" => {
                config_path = Some(raw.next().context("--config requires a path")?);
            }
            other => bail!("unrecognized flag: {other}"),
        }
    }

    Ok(Args {
        input: PathBuf::from(input),
        target_language,
        terms,
        config_path,
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = parse_args()?;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "subtitle=info".into());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let mut settings =
        load_settings(args.config_path.as_deref()).context("loading configuration")?;
    if let Some(target) = &args.target_language {
        settings.translation.target_language = target.clone();
    }

    let file_bytes = std::fs::read(&args.input)
        .with_context(|| format!("reading input file {}", args.input.display()))?;
    let filename = args
        .input
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("input")
        .to_string();

    let chat: Arc<dyn subtitle_core::ChatCompleter> = Arc::new(
        OpenAiChatCompleter::new(OpenAiConfig::new(
            settings.translation.base_url.clone(),
            settings.translation.api_key.clone(),
            settings.translation.model.clone(),
        ))
        .context("building chat completion client")?,
    );
    let persistence: Arc<dyn subtitle_core::Persistence> = subtitle_persistence::InMemoryTaskStore::new();
    let persistence_for_refetch = persistence.clone();
    // No real acoustic model ships with this crate (§6) — the mock
    // transcriber is a stand-in so the CLI can still exercise the pipeline
    // end-to-end against SRT passthrough input, where C1-C6 are skipped
    // entirely and this transcriber is never called.
    let transcriber: Arc<dyn subtitle_core::Transcriber> =
        Arc::new(MockTranscriber::new(Vec::<TranscriptionWord>::new()));

    let pipeline = SubtitlePipeline::new(transcriber, chat, persistence, settings.pipeline.clone());
    let cancel = CancellationToken::new();

    let task = pipeline
        .run(&file_bytes, &filename, cancel.clone())
        .await
        .context("running the transcription pipeline")?;

    let task = if args.target_language.is_some() {
        pipeline
            .translate(&task.task_id, &settings.translation, &args.terms, cancel)
            .await
            .context("running the translation engine")?;
        persistence_for_refetch
            .get_task(&task.task_id)
            .await
            .context("refetching task after translation")?
            .context("task vanished after translation")?
    } else {
        task
    };

    println!("{}", SubtitlePipeline::to_srt(&task));
    Ok(())
}
