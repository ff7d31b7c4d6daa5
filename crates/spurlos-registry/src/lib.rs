//! # Spurlos Registry
//!
//! Configuration-driven model registry for the spurlos engine. A JSON
//! document describes entity sets (label taxonomies, coarse mappings,
//! supported models); the registry constructs every configured model
//! eagerly and wires [`spurlos_core::EntityDetector`]s on demand.
pub mod config;
pub mod error;
pub mod lexicon;
pub mod registry;

// Re-export primary API
pub use config::{
    CoarseMappingConfig, EntitySetConfig, EntitySetLabel, EntitySetsConfig, FineGrainedLabel,
    LoadingStrategy, ModelConfig, ModelImplKind, ModelType,
};
pub use error::{RegistryError, Result};
pub use lexicon::LexiconTagger;
pub use registry::ModelRegistry;
