//! # Spurlos Core
//!
//! The heart of the spurlos PII detection engine. Aligns sequence-model
//! predictions with the original text they were made over and consolidates
//! fine-grained entities into coarse categories with full provenance.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use spurlos_core::{
//!     CoarseMapping, EntityDetector, PredictedLabel, Result, RuleTokenizer,
//!     SequenceModel,
//! };
//!
//! struct Gazetteer;
//! impl SequenceModel for Gazetteer {
//!     fn label(&self, sentences: &[String]) -> Result<Vec<Vec<PredictedLabel>>> {
//!         Ok(sentences
//!             .iter()
//!             .map(|s| {
//!                 s.contains("Berlin")
//!                     .then(|| PredictedLabel::new("CITY", "Berlin"))
//!                     .into_iter()
//!                     .collect()
//!             })
//!             .collect())
//!     }
//! }
//!
//! let detector = EntityDetector::new(Arc::new(RuleTokenizer::new()), Arc::new(Gazetteer)).unwrap();
//! let entities = detector.detect_fine("Hans wohnt in Berlin.").unwrap();
//!
//! assert_eq!(entities[0].span(), Some((14, 20)));
//! assert_eq!(entities[0].token, "Berlin");
//! ```
pub mod align;
pub mod coarse;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod tokenize;
pub mod types;

// Re-export primary API
pub use align::{BoundaryReconstructor, DEFAULT_BUFFER, recover_entities};
pub use coarse::{
    CoarseMapper, CoarseMapping, Constituent, DEFAULT_MAX_GAP, Provenance, ProvenanceMap,
};
pub use error::{Result, SpurlosError};
pub use model::{PredictedLabel, SequenceModel};
pub use pipeline::{DetectorConfig, EntityDetector};
pub use tokenize::{RuleTokenizer, SentenceTokenizer};
pub use types::{EntityItem, SentenceBoundary, Token, UNRESOLVED};
