//! Direct-translation and reflection prompt construction and reply
//! parsing (§4.8 steps 3-4).
//!
//! Grounded in the teacher's `LLMGrammarCorrector::build_prompt` shape: a
//! structured preamble (context, vocabulary/terms) followed by the input
//! and a terse instruction for what to output.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::terminology::{format_terms, Term};

pub struct PromptContext<'a> {
    pub source_language: &'a str,
    pub target_language: &'a str,
    pub context_before: &'a str,
    pub context_after: &'a str,
    pub terms: &'a [Term],
}

/// Build the direct-translation prompt for one batch of source texts.
///
/// Asks for strict JSON `{ "1": {"origin": ..., "direct": ...}, ... }`
/// keyed by 1-based batch position, per §4.8 step 3.
pub fn build_direct_prompt(texts: &[String], ctx: &PromptContext) -> String {
    let numbered = texts
        .iter()
        .enumerate()
        .map(|(i, t)| format!("{}. {}", i + 1, t))
        .collect::<Vec<_>>()
        .join("\n");

    let terms_block = if ctx.terms.is_empty() {
        "(none)".to_string()
    } else {
        format_terms(ctx.terms)
    };

    format!(
        r#"Translate the following {src} subtitle lines into {dst}.

CONTEXT BEFORE THIS BATCH:
{before}

CONTEXT AFTER THIS BATCH:
{after}

TERMINOLOGY (use these exact translations when the source term appears):
{terms}

RULES:
1. Preserve the meaning and register of each line.
2. Keep numbers, names, and terminology entries verbatim where specified.
3. Output ONLY a JSON object of the form {{"1": {{"origin": "...", "direct": "..."}}, "2": {{...}}}}, one key per input line, in order.

LINES:
{lines}

JSON:"#,
        src = ctx.source_language,
        dst = ctx.target_language,
        before = if ctx.context_before.is_empty() { "(none)" } else { ctx.context_before },
        after = if ctx.context_after.is_empty() { "(none)" } else { ctx.context_after },
        terms = terms_block,
        lines = numbered,
    )
}

/// Build the reflection prompt: ask the model to critique and refine a
/// direct translation (§4.8 step 4).
pub fn build_reflection_prompt(direct: &BTreeMap<usize, DirectTranslation>) -> String {
    let numbered = direct
        .iter()
        .map(|(i, d)| format!("{i}. origin: {}\n   direct: {}", d.origin, d.direct))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"Review the following direct translations and improve any that are awkward or inaccurate.

{numbered}

Output ONLY a JSON object of the form {{"1": {{"origin": "...", "free": "..."}}, "2": {{...}}}} with one key per line. If a line needs no change, repeat the direct translation as "free".

JSON:"#
    )
}

#[derive(Debug, Clone, Deserialize)]
pub struct DirectTranslation {
    pub origin: String,
    pub direct: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReflectionTranslation {
    pub origin: String,
    #[serde(default)]
    pub free: Option<String>,
    #[serde(default)]
    pub direct: Option<String>,
}

impl ReflectionTranslation {
    pub fn best(&self) -> &str {
        self.free.as_deref().or(self.direct.as_deref()).unwrap_or(&self.origin)
    }
}

/// Parse a direct-translation reply into batch-position -> translation,
/// tolerating the common LLM JSON mistakes via [`repair_json`].
pub fn parse_direct_reply(raw: &str) -> Option<BTreeMap<usize, DirectTranslation>> {
    let repaired = repair_json(raw);
    let map: BTreeMap<String, DirectTranslation> = serde_json::from_str(&repaired).ok()?;
    Some(
        map.into_iter()
            .filter_map(|(k, v)| k.parse::<usize>().ok().map(|i| (i, v)))
            .collect(),
    )
}

pub fn parse_reflection_reply(raw: &str) -> Option<BTreeMap<usize, ReflectionTranslation>> {
    let repaired = repair_json(raw);
    let map: BTreeMap<String, ReflectionTranslation> = serde_json::from_str(&repaired).ok()?;
    Some(
        map.into_iter()
            .filter_map(|(k, v)| k.parse::<usize>().ok().map(|i| (i, v)))
            .collect(),
    )
}

fn repair_json(raw: &str) -> String {
    let trimmed = raw.trim();
    let without_fence = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    let without_fence = without_fence.strip_suffix("```").unwrap_or(without_fence).trim();

    let mut depth_curly = 0i32;
    let mut in_string = false;
    let mut escape = false;
    for c in without_fence.chars() {
        if escape {
            escape = false;
            continue;
        }
        match c {
            '\\' if in_string => escape = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth_curly += 1,
            '}' if !in_string => depth_curly -= 1,
            _ => {}
        }
    }
    let mut out = without_fence.to_string();
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
    fn parses_clean_direct_reply() {
        let raw = r#"{"1": {"origin": "hello", "direct": "bonjour"}}"#;
        let reply = parse_direct_reply(raw).unwrap();
        assert_eq!(reply[&1].direct, "bonjour");
    }

    #[test]
    fn strips_code_fence_and_closes_braces() {
        let raw = "```json\n{\"1\": {\"origin\": \"hi\", \"direct\": \"salut\"";
        let reply = parse_direct_reply(raw).unwrap();
        assert_eq!(reply[&1].direct, "salut");
    }

    #[test]
    fn reflection_prefers_free_over_direct() {
        let t = ReflectionTranslation {
            origin: "hi".into(),
            free: Some("salut !".into()),
            direct: Some("salut".into()),
        };
        assert_eq!(t.best(), "salut !");
    }

    #[test]
    fn reflection_falls_back_to_direct() {
        let t = ReflectionTranslation {
            origin: "hi".into(),
            free: None,
            direct: Some("salut".into()),
        };
        assert_eq!(t.best(), "salut");
    }
}
