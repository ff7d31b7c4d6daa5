//! # Entity Set Configuration
//!
//! JSON document describing the entity sets the registry serves: corpus
//! metadata, label taxonomy, optional coarse-mapping override, and the
//! models supported per set. The document is data only; model construction
//! happens in [`crate::registry`].

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use spurlos_core::CoarseMapping;

use crate::error::Result;

/// How a model's artifacts are obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadingStrategy {
    /// Artifacts live under the entity set's models root directory.
    LocalDiskStorage,
    /// Artifacts are pulled from the Hugging Face hub. Configurable but not
    /// implemented by this build.
    HuggingfaceHub,
}

/// What kind of task a model performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelType {
    /// Named entity recognition; the only type entity detection accepts.
    Ner,
    /// Whole-text classification.
    TextClassification,
}

/// Implementation kind of a model. Closed set; adding a backend means
/// adding a variant here and a construction arm in the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelImplKind {
    /// Gazetteer plus regex patterns loaded from a JSON lexicon file.
    LexiconTagger,
}

/// One model supported by an entity set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Stable id used in lookups.
    pub model_id: String,
    /// Human-readable name.
    pub model_name: String,
    /// Free-form description.
    #[serde(default)]
    pub model_description: String,
    /// Task type.
    pub model_type: ModelType,
    /// How artifacts are obtained.
    pub loading_strategy: LoadingStrategy,
    /// Implementation kind.
    pub model_impl: ModelImplKind,
    /// Path segments under the entity set's models root.
    #[serde(default)]
    pub directory_name: Vec<String>,
    /// Version segment appended to the model path.
    #[serde(default)]
    pub model_version: Option<String>,
}

/// A fine-grained label nested under an entity set label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FineGrainedLabel {
    /// Label id as emitted by models.
    pub id: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
}

/// A label in an entity set's taxonomy, optionally with fine-grained
/// sub-labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySetLabel {
    /// Coarse label id.
    pub id: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Fine-grained labels under this one; empty means the label itself is
    /// what models emit.
    #[serde(default)]
    pub fine_grained: Vec<FineGrainedLabel>,
}

/// Explicit fine→coarse mapping override for an entity set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoarseMappingConfig {
    /// Fine label → coarse label.
    #[serde(default)]
    pub fine_to_coarse: HashMap<String, String>,
    /// Fine labels excluded from consolidation output.
    #[serde(default)]
    pub skip_labels: Vec<String>,
}

impl From<&CoarseMappingConfig> for CoarseMapping {
    fn from(cfg: &CoarseMappingConfig) -> Self {
        CoarseMapping::new(cfg.fine_to_coarse.clone(), cfg.skip_labels.iter().cloned())
    }
}

/// Configuration of one entity set: corpus metadata, labels, and models.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySetConfig {
    /// Stable id used in lookups.
    pub entity_set_id: String,
    /// Name of the corpus the labels come from.
    pub corpus_name: String,
    /// Free-form corpus description.
    #[serde(default)]
    pub corpus_description: String,
    /// Corpus languages (BCP 47 tags).
    #[serde(default)]
    pub corpus_languages: Vec<String>,
    /// Label taxonomy.
    #[serde(default)]
    pub entity_set_labels: Vec<EntitySetLabel>,
    /// Explicit coarse-mapping override; absent means use the built-in
    /// table for this entity set id.
    #[serde(default)]
    pub coarse_mapping: Option<CoarseMappingConfig>,
    /// Example texts for demos and smoke tests.
    #[serde(default)]
    pub sample_texts: Vec<String>,
    /// Path segments of the directory holding this set's model artifacts.
    #[serde(default)]
    pub models_root_dir: Vec<String>,
    /// Models available for this set.
    #[serde(default)]
    pub supported_models: Vec<ModelConfig>,
}

impl EntitySetConfig {
    /// All label ids a model of this set may emit: fine-grained ids where
    /// present, the label's own id otherwise.
    pub fn flattened_labels(&self) -> Vec<String> {
        let mut labels = Vec::new();
        for label in &self.entity_set_labels {
            if label.fine_grained.is_empty() {
                labels.push(label.id.clone());
            }
            for fine in &label.fine_grained {
                labels.push(fine.id.clone());
            }
        }
        labels
    }

    /// Artifact directory for a model of this set.
    pub fn model_path(&self, model: &ModelConfig) -> PathBuf {
        let mut path: PathBuf = self.models_root_dir.iter().collect();
        path.extend(&model.directory_name);
        if let Some(version) = &model.model_version {
            path.push(version);
        }
        path
    }
}

/// The root configuration document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySetsConfig {
    /// All configured entity sets.
    #[serde(default)]
    pub entity_sets: Vec<EntitySetConfig>,
}

impl EntitySetsConfig {
    /// Parses the document from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Loads the document from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_json(&fs::read_to_string(path)?)
    }

    /// The entity set with the given id, if configured.
    pub fn entity_set(&self, entity_set_id: &str) -> Option<&EntitySetConfig> {
        self.entity_sets
            .iter()
            .find(|es| es.entity_set_id == entity_set_id)
    }
}
