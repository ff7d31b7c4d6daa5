//! # Spurlos
//!
//! Umbrella crate for the spurlos PII detection engine. Re-exports the
//! alignment core and the model registry; depend on this crate unless you
//! only need one of the pieces.
//!
//! ```rust
//! use std::sync::Arc;
//! use spurlos::{
//!     CoarseMapping, EntityDetector, PredictedLabel, RuleTokenizer, SequenceModel,
//! };
//!
//! struct Gazetteer;
//! impl SequenceModel for Gazetteer {
//!     fn label(&self, sentences: &[String]) -> spurlos::Result<Vec<Vec<PredictedLabel>>> {
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
//! let (entities, _) = detector
//!     .detect_coarse("Hans wohnt in Berlin.", &CoarseMapping::codealltag())
//!     .unwrap();
//! assert_eq!(entities[0].label, "LOCATION");
//! ```
pub use spurlos_core::*;
pub use spurlos_registry::{
    CoarseMappingConfig, EntitySetConfig, EntitySetLabel, EntitySetsConfig, FineGrainedLabel,
    LexiconTagger, LoadingStrategy, ModelConfig, ModelImplKind, ModelRegistry, ModelType,
    RegistryError,
};
