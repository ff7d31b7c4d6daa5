//! # Sequence Model Seam
//!
//! The statistical model is an external collaborator: it receives the
//! normalized sentence strings produced by boundary reconstruction and
//! returns per-sentence predicted labels in document order. Loading,
//! caching and batching of real model backends live in the hosting crate;
//! this module only fixes the contract the alignment core relies on.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A single prediction emitted by a sequence-labeling model.
///
/// `text` is the surface form as the model saw it in the normalized
/// sentence. It approximates — but is not guaranteed to equal — the exact
/// substring of the original text; span recovery exists to close that gap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictedLabel {
    /// The predicted label value (e.g. `"CITY"`).
    pub value: String,
    /// The predicted surface text.
    pub text: String,
}

impl PredictedLabel {
    /// Creates a new predicted label.
    pub fn new(value: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            text: text.into(),
        }
    }
}

/// A sequence-labeling model over sentence strings.
///
/// Implementations must return exactly one label sequence per input
/// sentence, in matching order. Labels within a sentence must be emitted in
/// document order — span recovery advances a cursor through the sentence
/// window and relies on it.
pub trait SequenceModel: Send + Sync {
    /// Labels each sentence, returning per-sentence predictions in order.
    fn label(&self, sentences: &[String]) -> Result<Vec<Vec<PredictedLabel>>>;
}
