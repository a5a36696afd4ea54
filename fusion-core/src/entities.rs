//! Things that can be "in" a solar system
//!
//! Entities are immutable values compared structurally. Two capability markers
//! drive their lifecycle:
//! - **character bound**: goes away when the character situation in a system changes
//! - **clearable**: goes away when a system is reported clear

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Details of a character as known to the character directory
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CharacterDetails {
    pub character_id: i64,
    pub name: String,
    pub corporation_id: i64,
    pub corporation_name: String,
    pub corporation_ticker: String,
    #[serde(default)]
    pub alliance_id: Option<i64>,
    #[serde(default)]
    pub alliance_name: Option<String>,
    #[serde(default)]
    pub alliance_ticker: Option<String>,
}

/// Something observed in a solar system
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SystemEntity {
    /// A named, resolved character
    Character {
        name: String,
        character_id: i64,
        details: CharacterDetails,
    },

    /// Characters known to be present but not named
    UnspecifiedCharacter { count: u32 },

    /// A ship type with a count
    Ship {
        name: String,
        count: u32,
        #[serde(default)]
        is_friendly: Option<bool>,
    },

    /// A stargate or ansiblex leading to another system
    Gate { system: String, is_ansiblex: bool },

    /// A killmail link, with the destroyed ship type when known
    Killmail {
        url: String,
        #[serde(default)]
        ship: Option<String>,
    },

    Wormhole,
    Spike,
    Ess,
    GateCamp,
    CombatProbes,
    NoVisual,
    Bubbles,
    Skyhook,
}

/// Discriminant of a [`SystemEntity`], used where only the kind matters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Character,
    UnspecifiedCharacter,
    Ship,
    Gate,
    Killmail,
    Wormhole,
    Spike,
    Ess,
    GateCamp,
    CombatProbes,
    NoVisual,
    Bubbles,
    Skyhook,
}

impl SystemEntity {
    /// Build a character entity from directory details
    pub fn character(details: CharacterDetails) -> Self {
        SystemEntity::Character {
            name: details.name.clone(),
            character_id: details.character_id,
            details,
        }
    }

    /// Build a ship entity of unknown standing
    pub fn ship(name: &str, count: u32) -> Self {
        SystemEntity::Ship {
            name: name.to_string(),
            count,
            is_friendly: None,
        }
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            SystemEntity::Character { .. } => EntityKind::Character,
            SystemEntity::UnspecifiedCharacter { .. } => EntityKind::UnspecifiedCharacter,
            SystemEntity::Ship { .. } => EntityKind::Ship,
            SystemEntity::Gate { .. } => EntityKind::Gate,
            SystemEntity::Killmail { .. } => EntityKind::Killmail,
            SystemEntity::Wormhole => EntityKind::Wormhole,
            SystemEntity::Spike => EntityKind::Spike,
            SystemEntity::Ess => EntityKind::Ess,
            SystemEntity::GateCamp => EntityKind::GateCamp,
            SystemEntity::CombatProbes => EntityKind::CombatProbes,
            SystemEntity::NoVisual => EntityKind::NoVisual,
            SystemEntity::Bubbles => EntityKind::Bubbles,
            SystemEntity::Skyhook => EntityKind::Skyhook,
        }
    }

    /// Whether this entity disappears when the character situation changes
    pub fn is_character_bound(&self) -> bool {
        matches!(
            self,
            SystemEntity::Character { .. }
                | SystemEntity::UnspecifiedCharacter { .. }
                | SystemEntity::Ship { .. }
                | SystemEntity::Gate { .. }
                | SystemEntity::NoVisual
        )
    }

    /// Whether this entity disappears when the system is reported clear
    pub fn is_clearable(&self) -> bool {
        self.is_character_bound()
            || matches!(
                self,
                SystemEntity::Killmail { .. } | SystemEntity::Spike | SystemEntity::GateCamp
            )
    }

    /// Whether this entity counts as someone being present
    pub fn is_presence(&self) -> bool {
        matches!(
            self,
            SystemEntity::Character { .. } | SystemEntity::UnspecifiedCharacter { .. }
        )
    }

    /// Character id, for character entities
    pub fn character_id(&self) -> Option<i64> {
        match self {
            SystemEntity::Character { character_id, .. } => Some(*character_id),
            _ => None,
        }
    }

    /// Character name, for character entities
    pub fn character_name(&self) -> Option<&str> {
        match self {
            SystemEntity::Character { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Ship type name, for ship entities
    pub fn ship_name(&self) -> Option<&str> {
        match self {
            SystemEntity::Ship { name, .. } => Some(name),
            _ => None,
        }
    }
}

/// A value paired with the time it was reported
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dated<T> {
    pub timestamp: DateTime<Utc>,
    pub item: T,
}

impl<T> Dated<T> {
    pub fn new(timestamp: DateTime<Utc>, item: T) -> Self {
        Self { timestamp, item }
    }
}
