//! Token-aligned span construction and overlap resolution.
//!
//! This is the only place spans are built. A model response goes through
//! three stages: lenient parsing, substring location, and snapping onto
//! the token grid, followed by a deterministic longest-span-wins filter so
//! no token ends up inside two spans.

use crate::core::locate::find_substrings;
use crate::core::parse::parse_response;
use crate::core::tokenize::TokenSpan;
use crate::domain::{Label, LabelSet, Span};

/// Parse a model response and align every located mention onto the token
/// grid. Labels outside `labels` are ignored entirely; phrases that match
/// nowhere, or that cover no whole token, contribute nothing. The result
/// is deduplicated, non-overlapping, and ordered by start offset.
///
/// Alignment is a pure function of its inputs: running it twice yields the
/// same spans.
pub fn align_response(
    text: &str,
    tokens: &[TokenSpan],
    response: &str,
    labels: &LabelSet,
) -> Vec<Span> {
    let mut candidates = Vec::new();

    for (label, phrases) in parse_response(response) {
        let label = Label::new(&label);
        if !labels.contains(&label) {
            continue;
        }
        for (start, end) in find_substrings(text, &phrases, false, false) {
            if let Some(span) = contract_to_tokens(tokens, &label, start, end) {
                candidates.push(span);
            }
        }
    }

    filter_overlaps(candidates)
}

/// Snap a candidate character range onto the token grid.
///
/// "Contract" policy: the span becomes the widest run of whole tokens
/// lying fully inside `[start, end)`, shrinking rather than growing. A
/// candidate that covers no whole token is dropped. This silently loses
/// occurrences that land mid-token, which is intentional: the model's
/// phrasing is unreliable and partial alignment beats a wrong span.
pub fn contract_to_tokens(
    tokens: &[TokenSpan],
    label: &Label,
    start: usize,
    end: usize,
) -> Option<Span> {
    let first = tokens
        .iter()
        .position(|t| t.start >= start && t.end <= end)?;
    let mut last = first;
    for (i, token) in tokens.iter().enumerate().skip(first + 1) {
        if token.end <= end {
            last = i;
        } else {
            break;
        }
    }

    Some(Span {
        label: label.clone(),
        start: tokens[first].start,
        end: tokens[last].end,
        token_start: first,
        token_end: last,
    })
}

/// Re-snap an existing span's character range onto a token grid, keeping
/// its label. Used when replaying stored annotations against a fresh grid.
pub fn snap_span(tokens: &[TokenSpan], span: &Span) -> Option<Span> {
    contract_to_tokens(tokens, &span.label, span.start, span.end)
}

/// Longest-span-wins conflict resolution.
///
/// Spans are processed by ascending start, ties broken longer-first, and
/// kept only if they share no byte with an already-kept span - so of two
/// overlapping candidates the longer survives, regardless of label.
/// Identical ranges collapse to whichever was processed first. The sort is
/// stable, which makes the tie-break deterministic.
pub fn filter_overlaps(mut spans: Vec<Span>) -> Vec<Span> {
    spans.sort_by(|a, b| a.start.cmp(&b.start).then(b.len().cmp(&a.len())));

    let mut kept: Vec<Span> = Vec::new();
    for span in spans {
        if !kept.iter().any(|k| k.overlaps(&span)) {
            kept.push(span);
        }
    }
    kept
}
