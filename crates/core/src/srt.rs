//! SRT formatting (C7) and SRT passthrough parsing (C0, §4.0/§6).

use crate::error::{PipelineError, Result};
use crate::subtitle::{FileType, SubtitleEntry, TranslationStatus};

/// Format a seconds offset as `HH:MM:SS,mmm`. Milliseconds are truncated,
/// never rounded (§4.7, §9 open-question decision).
pub fn format_srt_timestamp(seconds: f64) -> String {
    let total_millis = (seconds * 1000.0) as u64;
    let millis = total_millis % 1000;
    let total_seconds = total_millis / 1000;
    let secs = total_seconds % 60;
    let total_minutes = total_seconds / 60;
    let mins = total_minutes % 60;
    let hours = total_minutes / 60;
    format!("{hours:02}:{mins:02}:{secs:02},{millis:03}")
}

/// Render entries as a complete SRT document (§6 output format).
pub fn format_srt(entries: &[SubtitleEntry]) -> String {
    let mut out = String::new();
    for entry in entries {
        out.push_str(&entry.id.to_string());
        out.push('\n');
        out.push_str(&entry.start_time);
        out.push_str(" --> ");
        out.push_str(&entry.end_time);
        out.push('\n');
        out.push_str(&entry.text);
        if let Some(translated) = &entry.translated_text {
            out.push('\n');
            out.push_str(translated);
        }
        out.push_str("\n\n");
    }
    out
}

/// Parse an existing `.srt` document straight into entries, bypassing C1-C7
/// (§4.0). Tolerates `\r\n`/`\n`, a leading BOM, and blank lines between
/// blocks.
pub fn parse_srt(text: &str) -> Result<Vec<SubtitleEntry>> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let normalized = text.replace("\r\n", "\n");
    let mut entries = Vec::new();

    let mut lines = normalized.lines().peekable();
    while lines.peek().is_some() {
        while matches!(lines.peek(), Some(l) if l.trim().is_empty()) {
            lines.next();
        }
        let Some(id_line) = lines.next() else {
            break;
        };
        let id: u32 = id_line
            .trim()
            .parse()
            .map_err(|_| PipelineError::Decode(format!("invalid SRT id line: {id_line:?}")))?;

        let time_line = lines
            .next()
            .ok_or_else(|| PipelineError::Decode("SRT block missing time line".into()))?;
        let (start_time, end_time) = parse_time_line(time_line)?;

        let mut text_lines = Vec::new();
        while matches!(lines.peek(), Some(l) if !l.trim().is_empty()) {
            text_lines.push(lines.next().unwrap());
        }
        if text_lines.is_empty() {
            return Err(PipelineError::Decode(format!(
                "SRT block {id} has no text lines"
            )));
        }

        let (text, translated_text, status) = if text_lines.len() >= 2 {
            (
                text_lines[0].to_string(),
                Some(text_lines[1..].join("\n")),
                TranslationStatus::Completed,
            )
        } else {
            (text_lines[0].to_string(), None, TranslationStatus::Idle)
        };

        entries.push(SubtitleEntry {
            id,
            start_time,
            end_time,
            text,
            translated_text,
            translation_status: status,
        });
    }

    Ok(entries)
}

fn parse_time_line(line: &str) -> Result<(String, String)> {
    let (start, end) = line
        .split_once("-->")
        .ok_or_else(|| PipelineError::Decode(format!("malformed SRT time line: {line:?}")))?;
    Ok((start.trim().to_string(), end.trim().to_string()))
}

/// The container type of an accepted input file (§6).
pub fn classify_file_type(filename: &str) -> FileType {
    if filename.to_ascii_lowercase().ends_with(".srt") {
        FileType::Srt
    } else {
        FileType::AudioVideo
    }
}
