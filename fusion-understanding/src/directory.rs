//! In-memory character directory

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;

use fusion_core::CharacterDetails;

use crate::{CharacterDirectory, UnderstandingError};

/// Directory backed by a fixed set of known characters
#[derive(Debug, Default, Clone)]
pub struct StaticCharacterDirectory {
    characters: HashMap<i64, CharacterDetails>,
}

impl StaticCharacterDirectory {
    pub fn new(characters: impl IntoIterator<Item = CharacterDetails>) -> Self {
        Self {
            characters: characters
                .into_iter()
                .map(|details| (details.character_id, details))
                .collect(),
        }
    }

    /// Load a JSON array of character details
    pub fn load(path: impl AsRef<Path>) -> Result<Self, UnderstandingError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| UnderstandingError::Directory(e.to_string()))?;
        let characters: Vec<CharacterDetails> = serde_json::from_str(&content)
            .map_err(|e| UnderstandingError::Directory(e.to_string()))?;
        Ok(Self::new(characters))
    }

    pub fn insert(&mut self, details: CharacterDetails) {
        self.characters.insert(details.character_id, details);
    }

    pub fn len(&self) -> usize {
        self.characters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }
}

#[async_trait]
impl CharacterDirectory for StaticCharacterDirectory {
    async fn character_details(&self, character_id: i64) -> Option<CharacterDetails> {
        self.characters.get(&character_id).cloned()
    }
}
