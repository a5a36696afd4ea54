//! Collaborator seams for message understanding

use async_trait::async_trait;
use thiserror::Error;

use fusion_core::{CharacterDetails, TokenType};

/// Errors from message understanding
#[derive(Debug, Error)]
pub enum UnderstandingError {
    /// The tokenizer left more than one meaning on a token
    #[error("Ambiguous token {words:?} has types {types:?}")]
    AmbiguousToken {
        words: Vec<String>,
        types: Vec<TokenType>,
    },

    #[error("Character directory error: {0}")]
    Directory(String),
}

/// Lookup of character details by id
#[async_trait]
pub trait CharacterDirectory: Send + Sync {
    /// Details for a character, or `None` if the id cannot be resolved
    async fn character_details(&self, character_id: i64) -> Option<CharacterDetails>;
}
