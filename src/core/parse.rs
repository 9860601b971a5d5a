//! Lenient parsing of model responses.
//!
//! The response is supposed to be one line per label:
//!
//! ```text
//! Label: phrase1, phrase2, ...
//! ```
//!
//! There is no guarantee the model gives well-formed output, so lines that
//! do not fit the shape are skipped and a partial (or empty) result is
//! returned rather than an error.

/// Split a raw model response into `(label, phrases)` pairs, in line order.
///
/// Labels are trimmed and case-folded. A line qualifies only if it has a
/// colon; it is split on the first one. Lines whose phrase part is empty
/// after trimming contribute nothing. Phrases are comma-separated and
/// trimmed, with empty segments (trailing commas) dropped. A label
/// appearing on multiple lines yields separate entries; merging is left to
/// callers.
pub fn parse_response(response: &str) -> Vec<(String, Vec<String>)> {
    let mut output = Vec::new();

    for line in response.trim().split('\n') {
        let (label_part, rest) = match line.split_once(':') {
            Some(parts) => parts,
            None => continue,
        };
        if rest.trim().is_empty() {
            continue;
        }
        let label = label_part.trim().to_lowercase();
        let phrases: Vec<String> = rest
            .split(',')
            .map(str::trim)
            .filter(|phrase| !phrase.is_empty())
            .map(str::to_string)
            .collect();
        if !phrases.is_empty() {
            output.push((label, phrases));
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_well_formed_lines() {
        let parsed = parse_response("PERSON: Alice, Bob\nLOC: Paris");
        assert_eq!(
            parsed,
            vec![
                ("person".to_string(), vec!["Alice".to_string(), "Bob".to_string()]),
                ("loc".to_string(), vec!["Paris".to_string()]),
            ]
        );
    }

    #[test]
    fn test_line_without_colon_contributes_nothing() {
        assert!(parse_response("garbage text").is_empty());
    }

    #[test]
    fn test_empty_phrase_part_contributes_nothing() {
        assert!(parse_response("ORG:").is_empty());
        assert!(parse_response("ORG:   ").is_empty());
    }

    #[test]
    fn test_splits_on_first_colon_only() {
        let parsed = parse_response("time: 12:30, 14:00");
        assert_eq!(
            parsed,
            vec![(
                "time".to_string(),
                vec!["12:30".to_string(), "14:00".to_string()]
            )]
        );
    }

    #[test]
    fn test_trailing_commas_and_blank_lines() {
        let parsed = parse_response("\nperson: Alice, , Bob,\n\nmalformed\n");
        assert_eq!(
            parsed,
            vec![("person".to_string(), vec!["Alice".to_string(), "Bob".to_string()])]
        );
    }

    #[test]
    fn test_repeated_label_yields_separate_entries() {
        let parsed = parse_response("loc: Paris\nloc: Berlin");
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].0, "loc");
        assert_eq!(parsed[1].0, "loc");
    }

    #[test]
    fn test_empty_response() {
        assert!(parse_response("").is_empty());
    }
}
