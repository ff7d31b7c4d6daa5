//! # Span Recovery
//!
//! Maps each predicted label back onto exact byte offsets in the original
//! text. The model predicts over normalized sentences, so its surface text
//! may not literally occur in the source; recovery first tries an exact
//! window search, then a two-anchor fallback validated by
//! whitespace-collapsed comparison, and finally degrades to a sentinel
//! span rather than dropping the prediction.

use tracing::debug;

use crate::align::floor_char_boundary;
use crate::model::PredictedLabel;
use crate::types::{EntityItem, SentenceBoundary};

/// Recovers exact spans for every predicted label, in emission order.
///
/// Token ids are a single monotonically increasing counter (`"T1"`,
/// `"T2"`, …) across the whole input text — one id per model prediction,
/// including those that end up as sentinels, so output stays in 1:1
/// correspondence with the model's raw labels.
pub fn recover_entities(
    text: &str,
    sentences: &[(SentenceBoundary, Vec<PredictedLabel>)],
) -> Vec<EntityItem> {
    let mut items = Vec::new();
    let mut counter = 0usize;

    for (boundary, labels) in sentences {
        let mut cursor = boundary.start;
        for label in labels {
            counter += 1;
            let token_id = format!("T{counter}");
            match resolve(text, label, cursor, boundary.end) {
                Some((start, end)) => {
                    cursor = end;
                    items.push(EntityItem::resolved(
                        token_id,
                        &label.value,
                        start,
                        end,
                        &text[start..end],
                    ));
                }
                None => {
                    debug!(label = %label.value, surface = %label.text, "span not recoverable, emitting sentinel");
                    items.push(EntityItem::unresolved(token_id, &label.value, &label.text));
                }
            }
        }
    }
    items
}

/// Resolves one predicted surface form within `[cursor, window_end)`.
fn resolve(
    text: &str,
    label: &PredictedLabel,
    cursor: usize,
    window_end: usize,
) -> Option<(usize, usize)> {
    // Exact match first: the common case when the tokenizer changed nothing.
    if let Some(start) = find_within(text, &label.text, cursor, window_end) {
        return Some((start, start + label.text.len()));
    }

    // Anchor fallback only applies to multi-token surfaces; a single token
    // that is missing cannot be triangulated.
    if !label.text.chars().any(char::is_whitespace) {
        return None;
    }
    let anchors: Vec<&str> = label.text.split_whitespace().collect();
    if anchors.len() < 2 {
        return None;
    }
    let first = anchors[0];
    let last = anchors[anchors.len() - 1];

    let first_pos = find_within(text, first, cursor, window_end)?;
    let last_pos = find_within(text, last, first_pos + first.len(), window_end)?;
    let end = last_pos + last.len();

    // The interior may differ in whitespace only.
    let candidate = &text[first_pos..end];
    if collapse_whitespace(candidate) == collapse_whitespace(&label.text) {
        Some((first_pos, end))
    } else {
        None
    }
}

/// First occurrence of `needle` fully inside `[start, end)`, absolute.
fn find_within(text: &str, needle: &str, start: usize, end: usize) -> Option<usize> {
    if needle.is_empty() {
        return None;
    }
    let end = floor_char_boundary(text, end.min(text.len()));
    let start = floor_char_boundary(text, start.min(end));
    text[start..end].find(needle).map(|pos| pos + start)
}

/// Collapses every whitespace run to a single space.
fn collapse_whitespace(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_run = false;
    for c in s.chars() {
        if c.is_whitespace() {
            if !in_run {
                out.push(' ');
            }
            in_run = true;
        } else {
            out.push(c);
            in_run = false;
        }
    }
    out
}
