//! Message understanding
//!
//! Resolves the characters and remote scans of a message concurrently, then
//! walks its tokens once to build an [`Understanding`].

use futures::future::join_all;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use fusion_core::{
    player_ids, CharacterDetails, KeywordKind, Kill, Movement, Question, SystemEntity, Token,
    TokenType, Understanding,
};
use fusion_scan::ScanExtractor;

use crate::{CharacterDirectory, UnderstandingError};

/// Builds understandings from tokenized messages
pub struct MessageUnderstanding {
    directory: Arc<dyn CharacterDirectory>,
    extractor: Arc<dyn ScanExtractor>,
}

impl MessageUnderstanding {
    pub fn new(directory: Arc<dyn CharacterDirectory>, extractor: Arc<dyn ScanExtractor>) -> Self {
        Self {
            directory,
            extractor,
        }
    }

    /// Understand one message.
    ///
    /// Fails only if a token carries more than one type besides `Link`, which
    /// means the tokenizer did not finish disambiguating.
    pub async fn understand(&self, tokens: &[Token]) -> Result<Understanding, UnderstandingError> {
        check_unambiguous(tokens)?;

        let ids = player_ids(tokens);
        let (characters, scanned) =
            futures::join!(self.resolve_characters(&ids), self.extractor.extract(tokens));

        let mut understanding = Understanding {
            entities: scanned,
            ..Default::default()
        };
        let mut headcount = None;

        for token in tokens {
            let types = token.effective_types();
            let &[token_type] = types.as_slice() else {
                continue;
            };

            match token_type {
                TokenType::Count {
                    count, is_plus, ..
                } => {
                    if *is_plus {
                        understanding
                            .entities
                            .push(SystemEntity::UnspecifiedCharacter { count: *count });
                    } else {
                        headcount = Some(*count);
                    }
                }
                TokenType::Gate {
                    system,
                    is_ansiblex,
                } => understanding.entities.push(SystemEntity::Gate {
                    system: system.clone(),
                    is_ansiblex: *is_ansiblex,
                }),
                TokenType::Movement { to_system } => {
                    understanding.movement = Some(Movement {
                        to_system: to_system.clone(),
                    });
                }
                TokenType::Keyword { kind } => match keyword_entity(*kind) {
                    Some(entity) => understanding.entities.push(entity),
                    None if *kind == KeywordKind::NoVisual => understanding.reported_no_visual = true,
                    None => understanding.reported_clear = true,
                },
                TokenType::Kill {
                    name,
                    character_id,
                    target,
                } => understanding.kills.push(Kill {
                    name: name.clone(),
                    character_id: *character_id,
                    target: target.clone(),
                }),
                TokenType::Player { character_id } => {
                    if let Some(details) = characters.get(character_id) {
                        understanding
                            .entities
                            .push(SystemEntity::character(details.clone()));
                    }
                }
                TokenType::Question { kind } => understanding.questions.push(Question {
                    kind: *kind,
                    text: token.text(),
                }),
                TokenType::Ship { name, count } => {
                    understanding.entities.push(SystemEntity::ship(name, *count));
                }
                TokenType::System { name } => understanding.systems.push(name.clone()),
                TokenType::Url | TokenType::Link => {}
            }
        }

        if let Some(total) = headcount {
            reconcile_headcount(&mut understanding.entities, total);
        }

        Ok(understanding)
    }

    /// Resolve every distinct character id concurrently, dropping misses
    async fn resolve_characters(&self, ids: &[i64]) -> HashMap<i64, CharacterDetails> {
        let lookups = ids.iter().map(|id| async move {
            let details = self.directory.character_details(*id).await;
            if details.is_none() {
                debug!("Unresolved character id {}", id);
            }
            (*id, details)
        });

        join_all(lookups)
            .await
            .into_iter()
            .filter_map(|(id, details)| details.map(|d| (id, d)))
            .collect()
    }
}

fn check_unambiguous(tokens: &[Token]) -> Result<(), UnderstandingError> {
    match tokens.iter().find(|token| token.effective_types().len() > 1) {
        Some(token) => Err(UnderstandingError::AmbiguousToken {
            words: token.words.clone(),
            types: token.types.clone(),
        }),
        None => Ok(()),
    }
}

/// Entity a keyword stands for; `None` for the report flags
fn keyword_entity(kind: KeywordKind) -> Option<SystemEntity> {
    match kind {
        KeywordKind::Wormhole => Some(SystemEntity::Wormhole),
        KeywordKind::Spike => Some(SystemEntity::Spike),
        KeywordKind::Ess => Some(SystemEntity::Ess),
        KeywordKind::GateCamp => Some(SystemEntity::GateCamp),
        KeywordKind::CombatProbes => Some(SystemEntity::CombatProbes),
        KeywordKind::Bubbles => Some(SystemEntity::Bubbles),
        KeywordKind::Skyhook => Some(SystemEntity::Skyhook),
        KeywordKind::NoVisual | KeywordKind::Clear => None,
    }
}

/// Top up unspecified characters so that named plus unspecified reach the
/// reported total.
fn reconcile_headcount(entities: &mut Vec<SystemEntity>, total: u32) {
    let known = entities
        .iter()
        .map(|entity| match entity {
            SystemEntity::Character { .. } => 1,
            SystemEntity::UnspecifiedCharacter { count } => *count,
            _ => 0,
        })
        .fold(0u32, |acc, n| acc.saturating_add(n));
    let additional = total.saturating_sub(known);
    if additional == 0 {
        return;
    }

    let existing = entities
        .iter_mut()
        .find_map(|entity| match entity {
            SystemEntity::UnspecifiedCharacter { count } => Some(count),
            _ => None,
        });
    match existing {
        Some(count) => *count = count.saturating_add(additional),
        None => entities.push(SystemEntity::UnspecifiedCharacter { count: additional }),
    }
}
