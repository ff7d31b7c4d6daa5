//! # Boundary Reconstruction
//!
//! Rebuilds each tokenizer-emitted sentence as a normalized string and
//! locates its byte offsets in the original text. Tokenizers normalize
//! whitespace, so the re-joined sentence rarely equals the original
//! substring; location works by anchoring on the first and last token of
//! the sentence inside a bounded window instead of exact matching.

use tracing::debug;

use crate::align::floor_char_boundary;
use crate::tokenize::SentenceTokenizer;
use crate::types::SentenceBoundary;

/// Default slack, in bytes, for the anchor-search window and drift retry.
pub const DEFAULT_BUFFER: usize = 15;

/// Placeholder substituted for literal tabs before tokenization.
///
/// Tokenizers treat all whitespace identically, which merges tab-separated
/// columns (letterhead signature blocks) into one sentence. The run of
/// bangs tokenizes as its own sentence-terminal token, forcing a split; it
/// is stripped again during reconstruction.
pub(crate) const TAB_PLACEHOLDER: &str = "!!!";

/// Locates tokenizer-emitted sentences in the original text.
#[derive(Debug, Clone)]
pub struct BoundaryReconstructor {
    buffer: usize,
}

impl Default for BoundaryReconstructor {
    fn default() -> Self {
        Self::new()
    }
}

impl BoundaryReconstructor {
    /// Creates a reconstructor with the default buffer.
    pub fn new() -> Self {
        Self::with_buffer(DEFAULT_BUFFER)
    }

    /// Creates a reconstructor with an explicit anchor-search buffer.
    pub fn with_buffer(buffer: usize) -> Self {
        Self { buffer }
    }

    /// Tokenizes `text` and returns one located boundary per sentence, in
    /// order, covering the whole text.
    ///
    /// Identical input and buffer always yield identical offsets; the
    /// search is deterministic.
    pub fn reconstruct(
        &self,
        tokenizer: &dyn SentenceTokenizer,
        text: &str,
    ) -> Vec<SentenceBoundary> {
        let sentences = tokenizer.tokenize(&text.replace('\t', TAB_PLACEHOLDER));

        let mut boundaries: Vec<SentenceBoundary> = Vec::with_capacity(sentences.len());
        let mut offset = 0usize;
        let mut prev_end = 0usize;
        for tokens in sentences {
            let mut normalized = String::new();
            for token in &tokens {
                normalized.push_str(&token.text.replace(TAB_PLACEHOLDER, ""));
                if token.space_after && !token.last_in_sentence {
                    normalized.push(' ');
                }
            }

            let (mut start, mut end) = self.locate(text, &normalized, offset);
            if start > prev_end + self.buffer {
                // A prior partial match drifted the cursor too far forward;
                // retry from just before the previous sentence's end.
                let retry = floor_char_boundary(text, prev_end.saturating_sub(self.buffer));
                (start, end) = self.locate(text, &normalized, retry);
            }
            prev_end = end;

            debug!(start, end, sentence = %normalized, "located sentence boundary");
            boundaries.push(SentenceBoundary::new(normalized, start, end));
            offset = end;
        }

        if boundaries.len() > 1 {
            self.repair(text, &mut boundaries);
        }
        boundaries
    }

    /// Two-anchor bounded search for `sentence` in `text` at or after
    /// `offset`.
    ///
    /// Returns `(offset, offset)` when the sentence is empty or its first
    /// token cannot be found — a failed match for the repair pass. A
    /// missing *last* token is not a failure; the end falls back to the
    /// expected sentence length.
    fn locate(&self, text: &str, sentence: &str, offset: usize) -> (usize, usize) {
        let offset = floor_char_boundary(text, offset);
        let anchors: Vec<&str> = sentence.split(' ').filter(|t| !t.is_empty()).collect();
        let Some(&first) = anchors.first() else {
            return (offset, offset);
        };
        let last = anchors[anchors.len() - 1];

        let Some(start) = find_from(text, first, offset) else {
            return (offset, offset);
        };

        let expected_length = sentence.len();
        let search_end = (start + expected_length + self.buffer).min(text.len());

        // Greedy-latest: keep the rightmost occurrence of the last anchor
        // that still fits inside the window.
        let mut cursor = start;
        let mut last_hit = None;
        while cursor < search_end {
            match find_from(text, last, cursor) {
                Some(pos) if pos + last.len() <= search_end => {
                    last_hit = Some(pos);
                    cursor = pos + last.len();
                }
                _ => break,
            }
        }

        let end = match last_hit {
            Some(pos) => pos + last.len(),
            None => floor_char_boundary(text, (start + expected_length).min(text.len())),
        };
        (start, end)
    }

    /// Spreads a plausible shared window across each maximal run of failed
    /// (zero-width) boundaries so downstream span search still has a region
    /// to work with.
    fn repair(&self, text: &str, boundaries: &mut [SentenceBoundary]) {
        let mut idx = 0;
        while idx < boundaries.len() {
            if !boundaries[idx].is_empty() {
                idx += 1;
                continue;
            }

            let run_start = idx;
            let mut run_end = idx;
            while run_end + 1 < boundaries.len() && boundaries[run_end + 1].is_empty() {
                run_end += 1;
            }
            debug!(run_start, run_end, "repairing unmatched sentence run");

            if run_start > 0 {
                let new_start = floor_char_boundary(
                    text,
                    boundaries[run_start - 1].end.saturating_sub(self.buffer),
                );
                for boundary in &mut boundaries[run_start..=run_end] {
                    boundary.start = new_start;
                }
            }
            if run_end + 1 < boundaries.len() {
                let new_end = floor_char_boundary(
                    text,
                    boundaries[run_end + 1].start.saturating_sub(1).min(text.len()),
                );
                for boundary in &mut boundaries[run_start..=run_end] {
                    boundary.end = new_end;
                }
            }
            idx = run_end + 1;
        }
    }
}

/// First occurrence of `needle` in `text` at or after `offset` (absolute).
fn find_from(text: &str, needle: &str, offset: usize) -> Option<usize> {
    text.get(offset..)
        .and_then(|tail| tail.find(needle))
        .map(|pos| pos + offset)
}
