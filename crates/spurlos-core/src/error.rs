use thiserror::Error;

/// Errors that can occur during spurlos core operations.
#[derive(Debug, Error)]
pub enum SpurlosError {
    /// The input text is empty or contains only whitespace.
    #[error("input is empty or whitespace-only")]
    EmptyInput,

    /// A regex pattern failed to compile (should not happen with static patterns).
    #[error("regex compilation error: {0}")]
    RegexError(#[from] regex::Error),

    /// The sequence model returned the wrong number of label sequences.
    #[error("model returned {got} label sequences for {expected} sentences")]
    LabelCountMismatch {
        /// Number of sentences handed to the model.
        expected: usize,
        /// Number of label sequences it returned.
        got: usize,
    },

    /// The sequence model failed to produce predictions.
    #[error("inference error: {0}")]
    InferenceError(String),
}

/// Result type alias for spurlos core operations.
pub type Result<T> = std::result::Result<T, SpurlosError>;
