use serde::{Deserialize, Serialize};

/// Sentinel offset for entities whose surface form could not be located in
/// the original text.
pub const UNRESOLVED: i64 = -1;

/// A detected entity with exact byte offsets into the original text.
///
/// Serializes with the wire field names consumers expect (`Token_ID`,
/// `Label`, `Start`, `End`, `Token`). Offsets are `i64` because an entity
/// that could not be aligned carries the `-1`/`-1` sentinel span instead of
/// being dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityItem {
    /// Sequential id `"T1".."TN"`; merged entities concatenate constituent ids.
    #[serde(rename = "Token_ID")]
    pub token_id: String,
    /// Entity label (fine-grained or, after consolidation, coarse).
    #[serde(rename = "Label")]
    pub label: String,
    /// Start byte offset (inclusive), or `-1` when unresolved.
    #[serde(rename = "Start")]
    pub start: i64,
    /// End byte offset (exclusive), or `-1` when unresolved.
    #[serde(rename = "End")]
    pub end: i64,
    /// The surface form: the exact original substring when resolved, the
    /// model's predicted surface otherwise.
    #[serde(rename = "Token")]
    pub token: String,
}

impl EntityItem {
    /// Creates an entity resolved to an exact span of the original text.
    pub fn resolved(
        token_id: impl Into<String>,
        label: impl Into<String>,
        start: usize,
        end: usize,
        token: impl Into<String>,
    ) -> Self {
        Self {
            token_id: token_id.into(),
            label: label.into(),
            start: start as i64,
            end: end as i64,
            token: token.into(),
        }
    }

    /// Creates a sentinel entity whose span could not be located.
    pub fn unresolved(
        token_id: impl Into<String>,
        label: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            token_id: token_id.into(),
            label: label.into(),
            start: UNRESOLVED,
            end: UNRESOLVED,
            token: token.into(),
        }
    }

    /// Returns `true` if the entity carries a real span.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.start != UNRESOLVED
    }

    /// The byte span as `usize` offsets, `None` for sentinel entities.
    #[must_use]
    pub fn span(&self) -> Option<(usize, usize)> {
        if self.is_resolved() {
            Some((self.start as usize, self.end as usize))
        } else {
            None
        }
    }
}
