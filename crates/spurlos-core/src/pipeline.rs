//! # Detection Pipeline
//!
//! Wires tokenization, boundary reconstruction, model inference, span
//! recovery and coarse consolidation into one detector. The detector owns
//! no model state itself; the tokenizer and model arrive as shared trait
//! objects so a host can reuse them across detectors and threads.

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::align::{BoundaryReconstructor, DEFAULT_BUFFER, recover_entities};
use crate::coarse::{CoarseMapper, CoarseMapping, DEFAULT_MAX_GAP, ProvenanceMap};
use crate::error::{Result, SpurlosError};
use crate::model::SequenceModel;
use crate::tokenize::SentenceTokenizer;
use crate::types::EntityItem;

/// Tuning knobs for a detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetectorConfig {
    /// Slack in bytes for boundary anchor search and drift retry.
    pub boundary_buffer: usize,
    /// Maximum separator characters between entities that still merge.
    pub merge_max_gap: usize,
    /// Whether coarse consolidation merges adjacent same-label entities.
    pub merge_adjacent: bool,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            boundary_buffer: DEFAULT_BUFFER,
            merge_max_gap: DEFAULT_MAX_GAP,
            merge_adjacent: true,
        }
    }
}

impl DetectorConfig {
    /// Sets the boundary anchor-search buffer.
    pub fn with_boundary_buffer(mut self, buffer: usize) -> Self {
        self.boundary_buffer = buffer;
        self
    }

    /// Sets the merge adjacency gap.
    pub fn with_merge_max_gap(mut self, gap: usize) -> Self {
        self.merge_max_gap = gap;
        self
    }

    /// Enables or disables adjacent-entity merging.
    pub fn with_merge_adjacent(mut self, merge: bool) -> Self {
        self.merge_adjacent = merge;
        self
    }
}

/// End-to-end entity detector over raw text.
///
/// Immutable after construction; `&self` methods are safe to call from
/// multiple threads as long as the model implementation is.
pub struct EntityDetector {
    tokenizer: Arc<dyn SentenceTokenizer>,
    model: Arc<dyn SequenceModel>,
    config: DetectorConfig,
    reconstructor: BoundaryReconstructor,
    mapper: CoarseMapper,
}

impl std::fmt::Debug for EntityDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityDetector")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl EntityDetector {
    /// Creates a detector with default configuration.
    pub fn new(
        tokenizer: Arc<dyn SentenceTokenizer>,
        model: Arc<dyn SequenceModel>,
    ) -> Result<Self> {
        Self::with_config(tokenizer, model, DetectorConfig::default())
    }

    /// Creates a detector with explicit configuration.
    pub fn with_config(
        tokenizer: Arc<dyn SentenceTokenizer>,
        model: Arc<dyn SequenceModel>,
        config: DetectorConfig,
    ) -> Result<Self> {
        Ok(Self {
            tokenizer,
            model,
            config,
            reconstructor: BoundaryReconstructor::with_buffer(config.boundary_buffer),
            mapper: CoarseMapper::with_max_gap(config.merge_max_gap)?,
        })
    }

    /// The detector's configuration.
    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Detects fine-grained entities with exact byte offsets.
    ///
    /// Every model prediction appears in the output exactly once, in order,
    /// with ids `"T1".."TN"`; predictions whose span could not be located
    /// carry the `-1`/`-1` sentinel.
    ///
    /// # Errors
    ///
    /// [`SpurlosError::EmptyInput`] for blank text,
    /// [`SpurlosError::LabelCountMismatch`] if the model breaks its
    /// one-sequence-per-sentence contract, and any error the model itself
    /// returns.
    #[instrument(skip_all, fields(len = text.len()))]
    pub fn detect_fine(&self, text: &str) -> Result<Vec<EntityItem>> {
        if text.trim().is_empty() {
            return Err(SpurlosError::EmptyInput);
        }

        let boundaries = self.reconstructor.reconstruct(self.tokenizer.as_ref(), text);
        let sentences: Vec<String> = boundaries.iter().map(|b| b.text.clone()).collect();
        debug!(sentences = sentences.len(), "reconstructed boundaries");

        let predictions = self.model.label(&sentences)?;
        if predictions.len() != boundaries.len() {
            return Err(SpurlosError::LabelCountMismatch {
                expected: boundaries.len(),
                got: predictions.len(),
            });
        }

        let paired: Vec<_> = boundaries.into_iter().zip(predictions).collect();
        let entities = recover_entities(text, &paired);
        debug!(entities = entities.len(), "recovered entity spans");
        Ok(entities)
    }

    /// Detects entities and consolidates them into coarse categories.
    ///
    /// Returns the consolidated entities together with the provenance of
    /// every output entity. Sentinel entities never reach coarse output.
    pub fn detect_coarse(
        &self,
        text: &str,
        mapping: &CoarseMapping,
    ) -> Result<(Vec<EntityItem>, ProvenanceMap)> {
        let fine = self.detect_fine(text)?;
        Ok(self
            .mapper
            .consolidate(text, &fine, mapping, self.config.merge_adjacent))
    }

    /// Detects fine-grained entities for several texts, preserving input
    /// order. Each text fails or succeeds independently.
    pub fn detect_batch(&self, texts: &[String]) -> Vec<Result<Vec<EntityItem>>> {
        texts.iter().map(|t| self.detect_fine(t)).collect()
    }
}
