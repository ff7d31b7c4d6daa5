//! # Model Registry
//!
//! Owns every model the configuration names. Models are built eagerly at
//! construction so a bad configuration fails fast instead of at first
//! request; lookups hand out shared `Arc` handles, and `reload` swaps in a
//! fresh configuration wholesale.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Arc;

use spurlos_core::{CoarseMapping, EntityDetector, RuleTokenizer, SequenceModel};
use tracing::{info, warn};

use crate::config::{
    EntitySetConfig, EntitySetsConfig, LoadingStrategy, ModelConfig, ModelImplKind, ModelType,
};
use crate::error::{RegistryError, Result};
use crate::lexicon::LexiconTagger;

/// Name of the lexicon file inside a model's artifact directory.
const LEXICON_FILE: &str = "lexicon.json";

/// All configured entity sets and their constructed models.
pub struct ModelRegistry {
    config: EntitySetsConfig,
    models: HashMap<(String, String), Arc<dyn SequenceModel>>,
    tokenizer: Arc<dyn spurlos_core::SentenceTokenizer>,
}

impl std::fmt::Debug for ModelRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelRegistry")
            .field("entity_sets", &self.config.entity_sets.len())
            .field("models", &self.models.len())
            .finish_non_exhaustive()
    }
}

impl ModelRegistry {
    /// Builds the registry, constructing every configured model.
    ///
    /// # Errors
    ///
    /// Fails on the first model whose loading strategy is not implemented
    /// or whose artifacts cannot be loaded.
    pub fn from_config(config: EntitySetsConfig) -> Result<Self> {
        let models = Self::build_models(&config)?;
        info!(
            entity_sets = config.entity_sets.len(),
            models = models.len(),
            "model registry built"
        );
        Ok(Self {
            config,
            models,
            tokenizer: Arc::new(RuleTokenizer::new()),
        })
    }

    /// Loads the configuration from a JSON file and builds the registry.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_config(EntitySetsConfig::from_file(path)?)
    }

    /// Rebuilds every model from a fresh configuration. On error the
    /// registry keeps its previous state.
    pub fn reload(&mut self, config: EntitySetsConfig) -> Result<()> {
        let models = Self::build_models(&config)?;
        info!(models = models.len(), "model registry reloaded");
        self.config = config;
        self.models = models;
        Ok(())
    }

    fn build_models(
        config: &EntitySetsConfig,
    ) -> Result<HashMap<(String, String), Arc<dyn SequenceModel>>> {
        let mut models: HashMap<(String, String), Arc<dyn SequenceModel>> = HashMap::new();
        for entity_set in &config.entity_sets {
            for model_cfg in &entity_set.supported_models {
                let model = Self::build_model(entity_set, model_cfg)?;
                models.insert(
                    (entity_set.entity_set_id.clone(), model_cfg.model_id.clone()),
                    model,
                );
            }
        }
        Ok(models)
    }

    fn build_model(
        entity_set: &EntitySetConfig,
        model_cfg: &ModelConfig,
    ) -> Result<Arc<dyn SequenceModel>> {
        match model_cfg.loading_strategy {
            LoadingStrategy::LocalDiskStorage => {}
            strategy @ LoadingStrategy::HuggingfaceHub => {
                warn!(
                    entity_set = %entity_set.entity_set_id,
                    model = %model_cfg.model_id,
                    ?strategy,
                    "loading strategy not implemented"
                );
                return Err(RegistryError::UnsupportedLoadingStrategy {
                    entity_set_id: entity_set.entity_set_id.clone(),
                    model_id: model_cfg.model_id.clone(),
                    strategy,
                });
            }
        }

        match model_cfg.model_impl {
            ModelImplKind::LexiconTagger => {
                let path = entity_set.model_path(model_cfg).join(LEXICON_FILE);
                info!(
                    entity_set = %entity_set.entity_set_id,
                    model = %model_cfg.model_id,
                    path = %path.display(),
                    "loading lexicon tagger"
                );
                Ok(Arc::new(LexiconTagger::from_file(path)?))
            }
        }
    }

    /// Ids of all configured entity sets, in configuration order.
    pub fn entity_set_ids(&self) -> Vec<&str> {
        self.config
            .entity_sets
            .iter()
            .map(|es| es.entity_set_id.as_str())
            .collect()
    }

    /// The entity set with the given id.
    pub fn entity_set(&self, entity_set_id: &str) -> Result<&EntitySetConfig> {
        self.config
            .entity_set(entity_set_id)
            .ok_or_else(|| RegistryError::EntitySetNotFound(entity_set_id.to_string()))
    }

    /// Model id → model type for the given entity set.
    pub fn list_models(&self, entity_set_id: &str) -> Result<BTreeMap<String, ModelType>> {
        Ok(self
            .entity_set(entity_set_id)?
            .supported_models
            .iter()
            .map(|m| (m.model_id.clone(), m.model_type))
            .collect())
    }

    /// All label ids a model of the entity set may emit.
    pub fn entity_set_labels(&self, entity_set_id: &str) -> Result<Vec<String>> {
        Ok(self.entity_set(entity_set_id)?.flattened_labels())
    }

    /// Configuration of one model.
    pub fn model_config(&self, entity_set_id: &str, model_id: &str) -> Result<&ModelConfig> {
        self.entity_set(entity_set_id)?
            .supported_models
            .iter()
            .find(|m| m.model_id == model_id)
            .ok_or_else(|| RegistryError::ModelNotFound {
                entity_set_id: entity_set_id.to_string(),
                model_id: model_id.to_string(),
            })
    }

    /// Fine→coarse mapping for the entity set: the configured override when
    /// present, else the built-in table for the id, else empty.
    pub fn coarse_mapping(&self, entity_set_id: &str) -> Result<CoarseMapping> {
        let entity_set = self.entity_set(entity_set_id)?;
        Ok(match &entity_set.coarse_mapping {
            Some(cfg) => cfg.into(),
            None => CoarseMapping::for_entity_set(entity_set_id),
        })
    }

    /// Shared handle to a constructed model.
    pub fn model(&self, entity_set_id: &str, model_id: &str) -> Result<Arc<dyn SequenceModel>> {
        // Validates the ids against the configuration first so lookups of
        // unknown sets and unknown models report distinctly.
        self.model_config(entity_set_id, model_id)?;
        self.models
            .get(&(entity_set_id.to_string(), model_id.to_string()))
            .cloned()
            .ok_or_else(|| RegistryError::ModelNotFound {
                entity_set_id: entity_set_id.to_string(),
                model_id: model_id.to_string(),
            })
    }

    /// A detector wired to the given NER model and the shared tokenizer.
    ///
    /// # Errors
    ///
    /// [`RegistryError::UnsupportedOperation`] if the model is not an NER
    /// model.
    pub fn detector(&self, entity_set_id: &str, model_id: &str) -> Result<EntityDetector> {
        let model_cfg = self.model_config(entity_set_id, model_id)?;
        if model_cfg.model_type != ModelType::Ner {
            return Err(RegistryError::UnsupportedOperation {
                model_id: model_id.to_string(),
                model_type: model_cfg.model_type,
            });
        }
        let model = self.model(entity_set_id, model_id)?;
        Ok(EntityDetector::new(Arc::clone(&self.tokenizer), model)?)
    }
}
