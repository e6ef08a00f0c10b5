//! Terminology injection (§4.8 step 2): select glossary entries relevant
//! to a batch's text via a case-insensitive substring filter.

/// A `(source, target)` terminology pair supplied by the caller.
pub type Term = (String, String);

/// Return every `glossary` entry whose source term appears (case-
/// insensitively) anywhere in `haystack`.
pub fn select_relevant_terms(glossary: &[Term], haystack: &str) -> Vec<Term> {
    let haystack_lower = haystack.to_lowercase();
    glossary
        .iter()
        .filter(|(source, _)| haystack_lower.contains(&source.to_lowercase()))
        .cloned()
        .collect()
}

/// Render selected terms as `source -> target` lines for prompt injection.
pub fn format_terms(terms: &[Term]) -> String {
    terms
        .iter()
        .map(|(source, target)| format!("{source} -> {target}"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selects_only_matching_terms() {
        let glossary = vec![
            ("gold loan".to_string(), "prêt sur gage".to_string()),
            ("mortgage".to_string(), "hypothèque".to_string()),
        ];
        let selected = select_relevant_terms(&glossary, "I need a Gold Loan today");
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].0, "gold loan");
    }

    #[test]
    fn empty_glossary_selects_nothing() {
        assert!(select_relevant_terms(&[], "anything").is_empty());
    }
}
