use serde::{Deserialize, Serialize};

/// A token emitted by a sentence tokenizer, with spacing metadata.
///
/// Unlike offset-carrying tokens, these describe the *re-joined* form of a
/// sentence: `space_after` records whether the tokenizer saw whitespace
/// behind the token, which is what boundary reconstruction needs to rebuild
/// the sentence string the way the model will see it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// The token text content.
    pub text: String,
    /// Whether the token was followed by whitespace in the input.
    pub space_after: bool,
    /// Whether this is the final token of its sentence.
    pub last_in_sentence: bool,
}

impl Token {
    /// Creates a new token.
    pub fn new(text: impl Into<String>, space_after: bool, last_in_sentence: bool) -> Self {
        Self {
            text: text.into(),
            space_after,
            last_in_sentence,
        }
    }
}
