//! Structured interpretation of a single intel message

use serde::{Deserialize, Serialize};

use crate::{QuestionKind, SystemEntity};

/// A reported kill of a character
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Kill {
    pub name: String,
    pub character_id: Option<i64>,
    pub target: String,
}

/// A question asked in the message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub kind: QuestionKind,
    pub text: String,
}

/// Reported movement of the message's entities to another system
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movement {
    pub to_system: String,
}

/// Everything understood from one intel message
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Understanding {
    /// Systems mentioned, in order of appearance
    pub systems: Vec<String>,
    pub entities: Vec<SystemEntity>,
    pub kills: Vec<Kill>,
    pub questions: Vec<Question>,
    /// Last movement mentioned
    pub movement: Option<Movement>,
    pub reported_no_visual: bool,
    pub reported_clear: bool,
}

impl Understanding {
    /// Characters among the understood entities
    pub fn characters(&self) -> impl Iterator<Item = &SystemEntity> {
        self.entities
            .iter()
            .filter(|e| matches!(e, SystemEntity::Character { .. }))
    }

    pub fn is_question(&self) -> bool {
        !self.questions.is_empty()
    }
}
