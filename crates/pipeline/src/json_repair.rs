//! Tolerant JSON repair for LLM sentence-segmentation replies (C6 step B,
//! §4.6).
//!
//! LLMs routinely wrap JSON in code fences, leave a trailing comma, or drop
//! a closing bracket. This module repairs the common cases before handing
//! the text to `serde_json`.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct SentenceSplitReply {
    pub sentences: Vec<String>,
}

/// Strip code fences, drop trailing commas, and balance brackets, then
/// parse into `{ sentences: [string] }`.
pub fn parse_sentence_split(raw: &str) -> Option<SentenceSplitReply> {
    let repaired = repair(raw);
    serde_json::from_str(&repaired).ok()
}

fn repair(raw: &str) -> String {
    let stripped = strip_code_fences(raw);
    let braces_balanced = balance_braces(&stripped);
    strip_trailing_commas(&braces_balanced)
}

fn strip_code_fences(raw: &str) -> String {
    let trimmed = raw.trim();
    let without_fence = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    without_fence.strip_suffix("```").unwrap_or(without_fence).trim().to_string()
}

fn strip_trailing_commas(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let chars: Vec<char> = text.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        if chars[i] == ',' {
            let mut j = i + 1;
            while j < chars.len() && chars[j].is_whitespace() {
                j += 1;
            }
            if j < chars.len() && (chars[j] == '}' || chars[j] == ']') {
                i += 1;
                continue;
            }
        }
        out.push(chars[i]);
        i += 1;
    }
    out
}

fn balance_braces(text: &str) -> String {
    let mut depth_curly = 0i32;
    let mut depth_square = 0i32;
    let mut in_string = false;
    let mut escape = false;

    for c in text.chars() {
        if escape {
            escape = false;
            continue;
        }
        match c {
            '\\' if in_string => escape = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth_curly += 1,
            '}' if !in_string => depth_curly -= 1,
            '[' if !in_string => depth_square += 1,
            ']' if !in_string => depth_square -= 1,
            _ => {}
        }
    }

    let mut out = text.to_string();
    while depth_square > 0 {
        out.push(']');
        depth_square -= 1;
    }
    while depth_curly > 0 {
        out.push('}');
        depth_curly -= 1;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_clean_json() {
        let reply = parse_sentence_split(r#"{"sentences": ["a", "b"]}"#).unwrap();
        assert_eq!(reply.sentences, vec!["a", "b"]);
    }

    #[test]
    fn strips_code_fences() {
        let raw = "```json\n{\"sentences\": [\"a\"]}\n```";
        let reply = parse_sentence_split(raw).unwrap();
        assert_eq!(reply.sentences, vec!["a"]);
    }

    #[test]
    fn drops_trailing_comma() {
        let raw = r#"{"sentences": ["a", "b",]}"#;
        let reply = parse_sentence_split(raw).unwrap();
        assert_eq!(reply.sentences, vec!["a", "b"]);
    }

    #[test]
    fn closes_unbalanced_brackets() {
        let raw = r#"{"sentences": ["a", "b""#;
        let reply = parse_sentence_split(raw).unwrap();
        assert_eq!(reply.sentences, vec!["a", "b"]);
    }

    #[test]
    fn rejects_unrecoverable_garbage() {
        assert!(parse_sentence_split("not json at all").is_none());
    }
}
