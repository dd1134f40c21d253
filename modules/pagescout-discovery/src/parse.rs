//! Line-oriented parsing of model verdict text.
//!
//! Every model call in the pipeline answers in a `LABEL: value` line format.
//! Parsing is tolerant of surrounding prose, list bullets, and casing, but a
//! missing label is a missing label; callers decide whether that aborts.

/// Find the value of the first `LABEL: value` line in `text`.
/// Case-insensitive on the label; leading bullets and whitespace ignored.
pub fn labeled_value<'a>(text: &'a str, label: &str) -> Option<&'a str> {
    for line in text.lines() {
        let line = line.trim_start_matches(['-', '*', ' ', '\t']);
        let Some((head, rest)) = line.split_once(':') else {
            continue;
        };
        if head.trim().eq_ignore_ascii_case(label) {
            return Some(rest.trim());
        }
    }
    None
}

/// Parse the first number out of a labeled line (e.g. "CONFIDENCE: 0.85
/// (high)" -> 0.85). Not clamped; callers own range policy.
pub fn labeled_f32(text: &str, label: &str) -> Option<f32> {
    let value = labeled_value(text, label)?;
    let number: String = value
        .chars()
        .skip_while(|c| !c.is_ascii_digit() && *c != '.')
        .take_while(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    number.parse().ok()
}

/// Parse a yes/no (or true/false) labeled line.
pub fn labeled_yes_no(text: &str, label: &str) -> Option<bool> {
    let value = labeled_value(text, label)?.to_lowercase();
    if value.starts_with("yes") || value.starts_with("true") {
        Some(true)
    } else if value.starts_with("no") || value.starts_with("false") {
        Some(false)
    } else {
        None
    }
}

/// Whether a labeled value is the explicit negative sentinel `NONE`.
pub fn is_none_sentinel(value: &str) -> bool {
    value
        .trim_matches(['[', ']', '.', '"', '\''])
        .eq_ignore_ascii_case("none")
}

/// Parse a comma/space-separated list of 1-based indices from a labeled
/// value (e.g. "3, 1, 2" or "[2 1]"). Returns `None` if any token is not a
/// number; a garbled list is a parse failure, not a partial success.
pub fn index_list(value: &str) -> Option<Vec<usize>> {
    let mut indices = Vec::new();
    for token in value.split([',', ' ', ';']) {
        let token = token.trim_matches(['[', ']', '.', '(', ')']);
        if token.is_empty() {
            continue;
        }
        indices.push(token.parse::<usize>().ok()?);
    }
    if indices.is_empty() {
        return None;
    }
    Some(indices)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labeled_value_is_case_insensitive_and_skips_prose() {
        let text = "Sure, here is my answer.\nranking: 2, 1\nCONFIDENCE: 0.8\n";
        assert_eq!(labeled_value(text, "RANKING"), Some("2, 1"));
        assert_eq!(labeled_value(text, "confidence"), Some("0.8"));
        assert_eq!(labeled_value(text, "REASON"), None);
    }

    #[test]
    fn labeled_value_ignores_bullets() {
        let text = "- SELECTION: 3\n* REASON: most direct";
        assert_eq!(labeled_value(text, "SELECTION"), Some("3"));
        assert_eq!(labeled_value(text, "REASON"), Some("most direct"));
    }

    #[test]
    fn labeled_f32_extracts_leading_number() {
        assert_eq!(labeled_f32("CONFIDENCE: 0.85 (high)", "CONFIDENCE"), Some(0.85));
        assert_eq!(labeled_f32("CONFIDENCE: about .7", "CONFIDENCE"), Some(0.7));
        assert_eq!(labeled_f32("CONFIDENCE: unsure", "CONFIDENCE"), None);
    }

    #[test]
    fn labeled_yes_no_variants() {
        assert_eq!(labeled_yes_no("RECOGNIZED: Yes, clearly", "RECOGNIZED"), Some(true));
        assert_eq!(labeled_yes_no("RECOGNIZED: no", "RECOGNIZED"), Some(false));
        assert_eq!(labeled_yes_no("RECOGNIZED: maybe", "RECOGNIZED"), None);
    }

    #[test]
    fn index_list_parses_separators_and_brackets() {
        assert_eq!(index_list("3, 1, 2"), Some(vec![3, 1, 2]));
        assert_eq!(index_list("[2 1]"), Some(vec![2, 1]));
        assert_eq!(index_list("1."), Some(vec![1]));
    }

    #[test]
    fn index_list_rejects_garbage() {
        assert_eq!(index_list("first, then second"), None);
        assert_eq!(index_list(""), None);
    }

    #[test]
    fn none_sentinel_detection() {
        assert!(is_none_sentinel("NONE"));
        assert!(is_none_sentinel("none."));
        assert!(!is_none_sentinel("1, 2"));
    }
}
