//! Inputs consumed by the intel state engine
//!
//! Both arrive already normalized: chat text has been tokenized and killmails
//! have been resolved into entities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{SystemEntity, Token};

/// A tokenized chat message from an intel channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub channel: String,
    pub author: String,
    pub timestamp: DateTime<Utc>,
    pub tokens: Vec<Token>,
}

/// A killmail resolved into system entities
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessedKillmail {
    pub system: String,
    /// Attacker ship types
    #[serde(default)]
    pub ships: Vec<SystemEntity>,
    #[serde(default)]
    pub victim: Option<SystemEntity>,
    #[serde(default)]
    pub attackers: Vec<SystemEntity>,
    /// The killmail entity itself
    pub killmail: SystemEntity,
    pub timestamp: DateTime<Utc>,
}
