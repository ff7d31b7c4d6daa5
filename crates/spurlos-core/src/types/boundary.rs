use serde::{Deserialize, Serialize};

/// A reconstructed sentence together with its located byte offsets in the
/// original text.
///
/// `text` is the normalized re-joined form the model sees; `start`/`end`
/// point back into the un-normalized input. A boundary with `start == end`
/// is a failed match awaiting the repair pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentenceBoundary {
    /// The normalized sentence string handed to the sequence model.
    pub text: String,
    /// Start byte offset in the original text (inclusive).
    pub start: usize,
    /// End byte offset in the original text (exclusive).
    pub end: usize,
}

impl SentenceBoundary {
    /// Creates a new sentence boundary.
    pub fn new(text: impl Into<String>, start: usize, end: usize) -> Self {
        Self {
            text: text.into(),
            start,
            end,
        }
    }

    /// Length of the located region in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Returns `true` if the boundary search failed (zero-width region).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}
