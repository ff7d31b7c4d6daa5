use thiserror::Error;

use crate::config::{LoadingStrategy, ModelType};

/// Errors that can occur during registry operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// No entity set with the given id is configured.
    #[error("entity set not found: {0}")]
    EntitySetNotFound(String),

    /// No model with the given id is configured for the entity set.
    #[error("model '{model_id}' not found in entity set '{entity_set_id}'")]
    ModelNotFound {
        /// The entity set that was looked up.
        entity_set_id: String,
        /// The model id that was not found.
        model_id: String,
    },

    /// A configured loading strategy this build does not implement.
    #[error(
        "unsupported loading strategy {strategy:?} for model '{model_id}' in entity set '{entity_set_id}'"
    )]
    UnsupportedLoadingStrategy {
        /// The owning entity set.
        entity_set_id: String,
        /// The model whose configuration is unsupported.
        model_id: String,
        /// The strategy that is not implemented.
        strategy: LoadingStrategy,
    },

    /// The requested operation does not apply to the model's type.
    #[error("operation not supported for model '{model_id}' of type {model_type:?}")]
    UnsupportedOperation {
        /// The model the operation was requested on.
        model_id: String,
        /// Its configured type.
        model_type: ModelType,
    },

    /// Config or lexicon file could not be read.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Config or lexicon JSON could not be parsed.
    #[error("config parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// A lexicon regex pattern failed to compile.
    #[error("invalid lexicon pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// An error from the alignment core.
    #[error(transparent)]
    Core(#[from] spurlos_core::SpurlosError),
}

/// Result type alias for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;
