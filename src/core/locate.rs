//! Substring location over source text.
//!
//! Finds occurrences of candidate phrases and reports byte offsets that
//! are always valid in the original text. Case-insensitive matching folds
//! characters during the scan instead of searching a lowercased copy, so
//! offsets stay correct even where case folding changes byte lengths.
//! This is a simple sliding scan - O(n*m) worst case per phrase.

use std::collections::HashSet;

/// Find byte offsets of `phrases` inside `text`, in phrase order.
///
/// Empty phrases and duplicates (compared case-folded unless
/// `case_sensitive`) are dropped before the search, keeping first-seen
/// order. Each phrase is scanned left to right for non-overlapping
/// occurrences, resuming from the end of the previous match; with
/// `single_match` only the first occurrence per phrase is kept.
///
/// Occurrences of different phrases may overlap each other; resolving
/// those conflicts is the aligner's job. An empty text or phrase list
/// yields an empty result, never an error.
pub fn find_substrings<S: AsRef<str>>(
    text: &str,
    phrases: &[S],
    case_sensitive: bool,
    single_match: bool,
) -> Vec<(usize, usize)> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut offsets = Vec::new();

    for phrase in phrases {
        let phrase = phrase.as_ref();
        if phrase.is_empty() {
            continue;
        }
        let key = if case_sensitive {
            phrase.to_string()
        } else {
            phrase.to_lowercase()
        };
        if !seen.insert(key) {
            continue;
        }

        let mut search_from = 0;
        while let Some((start, end)) = find_one(text, phrase, search_from, case_sensitive) {
            offsets.push((start, end));
            if single_match {
                break;
            }
            search_from = end;
        }
    }

    offsets
}

/// Find the next occurrence of `phrase` at or after byte offset `from`.
fn find_one(text: &str, phrase: &str, from: usize, case_sensitive: bool) -> Option<(usize, usize)> {
    if from >= text.len() {
        return None;
    }
    let haystack = &text[from..];

    if case_sensitive {
        return haystack
            .find(phrase)
            .map(|i| (from + i, from + i + phrase.len()));
    }

    for (offset, _) in haystack.char_indices() {
        if let Some(len) = folded_prefix_len(&haystack[offset..], phrase) {
            return Some((from + offset, from + offset + len));
        }
    }
    None
}

/// Case-folded prefix match: the byte length of the haystack prefix that
/// matches `phrase` character by character, or `None`.
fn folded_prefix_len(haystack: &str, phrase: &str) -> Option<usize> {
    let mut hay = haystack.char_indices();
    for p in phrase.chars() {
        let (_, h) = hay.next()?;
        if !chars_eq_fold(h, p) {
            return None;
        }
    }
    Some(hay.next().map(|(i, _)| i).unwrap_or(haystack.len()))
}

fn chars_eq_fold(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn phrases(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_single_occurrence() {
        let offsets = find_substrings("Hello world", &phrases(&["world"]), false, false);
        assert_eq!(offsets, vec![(6, 11)]);
    }

    #[test]
    fn test_case_insensitive_offsets_point_at_source() {
        let text = "Barack Obama visited PARIS.";
        let offsets = find_substrings(text, &phrases(&["paris"]), false, false);
        assert_eq!(offsets, vec![(21, 26)]);
        assert_eq!(&text[21..26], "PARIS");
    }

    #[test]
    fn test_case_sensitive_misses_folded_match() {
        let text = "Barack Obama visited PARIS.";
        let offsets = find_substrings(text, &phrases(&["paris"]), true, false);
        assert!(offsets.is_empty());
    }

    #[test]
    fn test_non_overlapping_multi_match() {
        let offsets = find_substrings("foo bar foo baz foo", &phrases(&["foo"]), false, false);
        assert_eq!(offsets, vec![(0, 3), (8, 11), (16, 19)]);
    }

    #[test]
    fn test_single_match_stops_after_first() {
        let offsets = find_substrings("foo bar foo", &phrases(&["foo"]), false, true);
        assert_eq!(offsets, vec![(0, 3)]);
    }

    #[test]
    fn test_overlapping_occurrences_of_one_phrase_do_not_repeat() {
        // "aaaa" contains "aa" at 0, 1, 2; non-overlapping scan keeps 0 and 2
        let offsets = find_substrings("aaaa", &phrases(&["aa"]), false, false);
        assert_eq!(offsets, vec![(0, 2), (2, 4)]);
    }

    #[test]
    fn test_duplicate_and_empty_phrases_dropped() {
        let offsets = find_substrings(
            "foo bar",
            &phrases(&["foo", "", "FOO", "bar"]),
            false,
            false,
        );
        assert_eq!(offsets, vec![(0, 3), (4, 7)]);
    }

    #[test]
    fn test_phrases_may_overlap_each_other() {
        let offsets = find_substrings("New York City", &phrases(&["New York", "York City"]), false, false);
        assert_eq!(offsets, vec![(0, 8), (4, 13)]);
    }

    #[test]
    fn test_unicode_case_fold_keeps_byte_offsets_valid() {
        // 'É' is two bytes; a lowercased copy would shift offsets
        let text = "Élysée Palace";
        let offsets = find_substrings(text, &phrases(&["élysée"]), false, false);
        assert_eq!(offsets.len(), 1);
        let (start, end) = offsets[0];
        assert_eq!(&text[start..end], "Élysée");
    }

    #[test]
    fn test_empty_inputs_never_error() {
        assert!(find_substrings("", &phrases(&["x"]), false, false).is_empty());
        let none: Vec<String> = vec![];
        assert!(find_substrings("text", &none, false, false).is_empty());
    }
}
