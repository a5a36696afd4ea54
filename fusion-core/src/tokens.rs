//! Token vocabulary produced by the chat tokenizer
//!
//! A chat message arrives as a list of tokens. Each token covers one or more
//! words and carries the types the tokenizer recognized for them. After the
//! tokenizer has resolved ambiguity, a token should carry at most one type
//! besides [`TokenType::Link`].

use serde::{Deserialize, Serialize};

/// Keywords with a fixed meaning in intel channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeywordKind {
    NoVisual,
    Clear,
    Wormhole,
    Spike,
    Ess,
    GateCamp,
    CombatProbes,
    Bubbles,
    Skyhook,
}

/// Kinds of questions asked in intel channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    Location,
    ShipTypes,
    Status,
    Number,
}

/// A type recognized by the tokenizer for a run of words
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TokenType {
    System {
        name: String,
    },
    Player {
        character_id: i64,
    },
    Ship {
        name: String,
        count: u32,
    },
    Gate {
        system: String,
        is_ansiblex: bool,
    },
    Movement {
        to_system: String,
    },
    Keyword {
        kind: KeywordKind,
    },
    Kill {
        name: String,
        #[serde(default)]
        character_id: Option<i64>,
        target: String,
    },
    Question {
        kind: QuestionKind,
    },
    Url,
    /// Chat link markup around other words; carries no meaning of its own
    Link,
    Count {
        count: u32,
        #[serde(default)]
        is_plus: bool,
        #[serde(default)]
        is_equals: bool,
    },
}

/// A run of words with the types the tokenizer assigned to it
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Token {
    pub words: Vec<String>,
    #[serde(default)]
    pub types: Vec<TokenType>,
}

impl Token {
    pub fn new(words: &[&str], types: Vec<TokenType>) -> Self {
        Self {
            words: words.iter().map(|w| w.to_string()).collect(),
            types,
        }
    }

    /// Types other than [`TokenType::Link`]
    pub fn effective_types(&self) -> Vec<&TokenType> {
        self.types
            .iter()
            .filter(|t| !matches!(t, TokenType::Link))
            .collect()
    }

    pub fn text(&self) -> String {
        self.words.join(" ")
    }
}

/// Character ids of every `Player` token, in order of appearance
pub fn player_ids(tokens: &[Token]) -> Vec<i64> {
    let mut ids = Vec::new();
    for token in tokens {
        for token_type in &token.types {
            if let TokenType::Player { character_id } = token_type {
                if !ids.contains(character_id) {
                    ids.push(*character_id);
                }
            }
        }
    }
    ids
}

/// The last system named by a `System` token
pub fn last_system(tokens: &[Token]) -> Option<&str> {
    tokens
        .iter()
        .flat_map(|token| token.types.iter())
        .filter_map(|token_type| match token_type {
            TokenType::System { name } => Some(name.as_str()),
            _ => None,
        })
        .last()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn system(name: &str) -> Token {
        Token::new(&[name], vec![TokenType::System { name: name.to_string() }])
    }

    fn player(id: i64) -> Token {
        Token::new(&["pilot"], vec![TokenType::Player { character_id: id }])
    }

    #[test]
    fn test_effective_types_skip_links() {
        let token = Token::new(
            &["Bob"],
            vec![TokenType::Link, TokenType::Player { character_id: 7 }],
        );
        assert_eq!(token.effective_types().len(), 1);

        let bare = Token::new(&["<url>"], vec![TokenType::Link]);
        assert!(bare.effective_types().is_empty());
    }

    #[test]
    fn test_player_ids_are_distinct() {
        let tokens = vec![player(1), player(2), player(1)];
        assert_eq!(player_ids(&tokens), vec![1, 2]);
    }

    #[test]
    fn test_last_system() {
        let tokens = vec![system("Jita"), player(1), system("Perimeter")];
        assert_eq!(last_system(&tokens), Some("Perimeter"));
        assert_eq!(last_system(&[player(1)]), None);
    }

    #[test]
    fn test_token_deserialization() {
        let json = r#"{"words":["5"],"types":[{"type":"count","count":5,"is_plus":true}]}"#;
        let token: Token = serde_json::from_str(json).unwrap();
        assert_eq!(
            token.types,
            vec![TokenType::Count {
                count: 5,
                is_plus: true,
                is_equals: false
            }]
        );
    }
}
