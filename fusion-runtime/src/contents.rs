//! Raw per-system intel contents
//!
//! The authoritative store behind the published snapshot. Entities are never
//! edited in place: each operation replaces or filters a system's list.
//! Nothing here looks at the clock except [`SystemContents::published`] and
//! [`SystemContents::compact`], which take their cutoff from the caller.

use chrono::{DateTime, Utc};
use std::collections::HashMap;

use fusion_core::{Dated, EntityKind, SystemEntity};

/// What observers see: every listed system has at least one live entity
pub type IntelSnapshot = HashMap<String, Vec<Dated<SystemEntity>>>;

/// Identity under which repeated reports collapse into one entity
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum DedupKey {
    Character(i64),
    Ship(String),
    Kind(EntityKind),
}

fn dedup_key(entity: &SystemEntity) -> Option<DedupKey> {
    match entity {
        SystemEntity::Character { character_id, .. } => Some(DedupKey::Character(*character_id)),
        SystemEntity::Ship { name, .. } => Some(DedupKey::Ship(name.clone())),
        SystemEntity::Killmail { .. } => None,
        other => Some(DedupKey::Kind(other.kind())),
    }
}

/// Keep the newest entity of each identity; killmails are all kept.
/// On equal timestamps the later insertion wins.
fn deduplicate(list: &mut Vec<Dated<SystemEntity>>) {
    let mut newest: HashMap<DedupKey, usize> = HashMap::new();
    for (index, dated) in list.iter().enumerate() {
        if let Some(key) = dedup_key(&dated.item) {
            match newest.get(&key) {
                Some(&kept) if list[kept].timestamp > dated.timestamp => {}
                _ => {
                    newest.insert(key, index);
                }
            }
        }
    }

    let mut index = 0;
    list.retain(|dated| {
        let keep = match dedup_key(&dated.item) {
            Some(key) => newest.get(&key) == Some(&index),
            None => true,
        };
        index += 1;
        keep
    });
}

/// Mutable map from system name to dated entities, in insertion order
#[derive(Debug, Default, Clone)]
pub struct SystemContents {
    systems: HashMap<String, Vec<Dated<SystemEntity>>>,
}

impl SystemContents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, system: &str) -> Option<&[Dated<SystemEntity>]> {
        self.systems.get(system).map(Vec::as_slice)
    }

    pub fn system_count(&self) -> usize {
        self.systems.len()
    }

    pub fn entity_count(&self) -> usize {
        self.systems.values().map(Vec::len).sum()
    }

    /// Fold new entities into a system.
    ///
    /// With `remove_existing`, a report naming characters or ships first
    /// replaces everything character bound in the system. Other entities
    /// (wormholes, ESS, ...) survive regardless.
    pub fn update_system_entities(
        &mut self,
        timestamp: DateTime<Utc>,
        system: &str,
        remove_existing: bool,
        entities: &[SystemEntity],
    ) {
        if entities.is_empty() {
            return;
        }

        let list = self.systems.entry(system.to_string()).or_default();
        let replaces = entities.iter().any(|entity| {
            matches!(
                entity,
                SystemEntity::Character { .. }
                    | SystemEntity::UnspecifiedCharacter { .. }
                    | SystemEntity::Ship { .. }
            )
        });
        if remove_existing && replaces {
            list.retain(|dated| !dated.item.is_character_bound());
        }

        list.extend(
            entities
                .iter()
                .cloned()
                .map(|entity| Dated::new(timestamp, entity)),
        );
        deduplicate(list);
    }

    /// Remove matching entities from one system
    pub fn remove_where<F>(&mut self, system: &str, predicate: F)
    where
        F: Fn(&SystemEntity) -> bool,
    {
        if let Some(list) = self.systems.get_mut(system) {
            list.retain(|dated| !predicate(&dated.item));
        }
    }

    /// Remove named characters from every system
    pub fn remove_characters_named(&mut self, names: &[&str]) {
        if names.is_empty() {
            return;
        }
        for list in self.systems.values_mut() {
            list.retain(|dated| match dated.item.character_name() {
                Some(name) => !names.contains(&name),
                None => true,
            });
        }
    }

    /// Characters seen in `to_system` leave every other system.
    ///
    /// A system that held all of them and is left with no more ship entities
    /// than departing characters is assumed to have lost those ships too:
    /// they move to `to_system` unless a ship of the same name is already
    /// there.
    pub fn remove_moved_characters(&mut self, to_system: &str, moved: &[SystemEntity]) {
        let moved_ids: Vec<i64> = moved.iter().filter_map(SystemEntity::character_id).collect();
        if moved_ids.is_empty() {
            return;
        }

        let mut followers = Vec::new();
        for (system, list) in self.systems.iter_mut() {
            if system == to_system {
                continue;
            }

            let had_all = moved_ids
                .iter()
                .all(|id| list.iter().any(|dated| dated.item.character_id() == Some(*id)));
            list.retain(|dated| match dated.item.character_id() {
                Some(id) => !moved_ids.contains(&id),
                None => true,
            });
            if !had_all {
                continue;
            }

            let ship_count = list
                .iter()
                .filter(|dated| dated.item.kind() == EntityKind::Ship)
                .count();
            if ship_count > 0 && ship_count <= moved_ids.len() {
                let (ships, rest): (Vec<_>, Vec<_>) = list
                    .drain(..)
                    .partition(|dated| dated.item.kind() == EntityKind::Ship);
                *list = rest;
                followers.extend(ships);
            }
        }

        if followers.is_empty() {
            return;
        }
        let destination = self.systems.entry(to_system.to_string()).or_default();
        for ship in followers {
            let name = ship.item.ship_name();
            let present = destination
                .iter()
                .any(|dated| name.is_some() && dated.item.ship_name() == name);
            if !present {
                destination.push(ship);
            }
        }
    }

    /// Drop entities that mean nothing on their own, then empty systems.
    ///
    /// "No visual" needs someone present to refer to, and a system holding
    /// only gate references has no presence at all.
    pub fn cleanup(&mut self) {
        for list in self.systems.values_mut() {
            if !list.iter().any(|dated| dated.item.is_presence()) {
                list.retain(|dated| dated.item != SystemEntity::NoVisual);
            }
            if list.iter().all(|dated| dated.item.kind() == EntityKind::Gate) {
                list.clear();
            }
        }
        self.systems.retain(|_, list| !list.is_empty());
    }

    /// Drop raw entries reported before `cutoff`, and systems left empty
    pub fn compact(&mut self, cutoff: DateTime<Utc>) -> usize {
        let before = self.entity_count();
        for list in self.systems.values_mut() {
            list.retain(|dated| dated.timestamp >= cutoff);
        }
        self.systems.retain(|_, list| !list.is_empty());
        before - self.entity_count()
    }

    /// Entities reported at or after `cutoff`, omitting systems with none
    pub fn published(&self, cutoff: DateTime<Utc>) -> IntelSnapshot {
        self.systems
            .iter()
            .filter_map(|(system, list)| {
                let live: Vec<_> = list
                    .iter()
                    .filter(|dated| dated.timestamp >= cutoff)
                    .cloned()
                    .collect();
                (!live.is_empty()).then(|| (system.clone(), live))
            })
            .collect()
    }
}
