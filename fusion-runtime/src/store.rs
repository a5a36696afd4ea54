//! Intel State Store
//!
//! Folds understood chat intel and killmails into per-system contents and
//! publishes an expiry-filtered snapshot after every change:
//! - One store-wide lock orders all mutations; each runs to completion
//! - Message understanding (including scan fetches) happens before the lock
//! - Readers get the last published snapshot without taking the lock

use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, error, info};

use fusion_core::{
    last_system, player_ids, ChatMessage, ProcessedKillmail, SharedConfig, SystemEntity,
    Understanding, ALERT_MAX_AGE, KILLMAIL_MAX_AGE,
};
use fusion_understanding::MessageUnderstanding;

use crate::clock::{age, cutoff};
use crate::{AlertTrigger, Clock, IntelSnapshot, SystemClock, SystemContents};

/// What a message submission did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The channel is not an intel channel
    IgnoredChannel,
    /// The message could not be understood
    Rejected(String),
    /// The message asks something instead of reporting it
    Question,
    /// No system was named and none could be inferred
    NoSystem,
    /// Intel was folded into the store
    Applied { system: String },
}

/// What a killmail submission did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KillmailOutcome {
    /// Too old to be intel
    Stale,
    Applied { system: String },
}

/// Sizes of the raw and published state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreStats {
    pub raw_systems: usize,
    pub raw_entities: usize,
    pub published_systems: usize,
    pub published_entities: usize,
    /// Snapshots published since the store was created
    pub publishes: u64,
}

/// The per-system intel state
pub struct IntelStateStore {
    config: SharedConfig,
    understanding: MessageUnderstanding,
    alerts: Arc<dyn AlertTrigger>,
    clock: Arc<dyn Clock>,
    contents: Mutex<SystemContents>,
    state: watch::Sender<Arc<IntelSnapshot>>,
    publishes: AtomicU64,
}

impl IntelStateStore {
    pub fn new(
        config: SharedConfig,
        understanding: MessageUnderstanding,
        alerts: Arc<dyn AlertTrigger>,
    ) -> Self {
        let (state, _) = watch::channel(Arc::new(IntelSnapshot::new()));
        info!(
            "Intel store created for {} channels",
            config.read().intel_channels.len()
        );
        Self {
            config,
            understanding,
            alerts,
            clock: Arc::new(SystemClock),
            contents: Mutex::new(SystemContents::new()),
            state,
            publishes: AtomicU64::new(0),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Latest published snapshot
    pub fn snapshot(&self) -> Arc<IntelSnapshot> {
        self.state.borrow().clone()
    }

    /// Receiver notified on every publish
    pub fn subscribe(&self) -> watch::Receiver<Arc<IntelSnapshot>> {
        self.state.subscribe()
    }

    /// Fold a chat message into the store.
    ///
    /// `context` holds recent messages from the same channel, newest first;
    /// it is consulted only when the message names no system.
    pub async fn submit_message(&self, message: &ChatMessage, context: &[ChatMessage]) -> SubmitOutcome {
        if !self.config.read().is_intel_channel(&message.channel) {
            return SubmitOutcome::IgnoredChannel;
        }

        let understanding = match self.understanding.understand(&message.tokens).await {
            Ok(understanding) => understanding,
            Err(e) => {
                error!("Rejected message from {} in {}: {}", message.author, message.channel, e);
                return SubmitOutcome::Rejected(e.to_string());
            }
        };

        if age(self.clock.now(), message.timestamp) < ALERT_MAX_AGE {
            self.alerts.on_new_intel(message, &understanding);
            self.alerts.on_new_intel_message(message);
        }

        if understanding.is_question() {
            debug!("Question from {}, nothing to fold", message.author);
            return SubmitOutcome::Question;
        }
        let Some((system, is_explicit)) = target_system(&understanding, context) else {
            debug!("No system for message from {}", message.author);
            return SubmitOutcome::NoSystem;
        };

        let mut contents = self.contents.lock();
        apply_understanding(&mut contents, message, &system, is_explicit, &understanding);
        contents.cleanup();
        self.publish(&contents);

        debug!(
            "Folded {} entities into {} ({})",
            understanding.entities.len(),
            system,
            if is_explicit { "named" } else { "inferred" }
        );
        SubmitOutcome::Applied { system }
    }

    /// Fold a killmail into the store. Kills only add intel; the victim is
    /// the only thing they remove.
    pub fn submit_killmail(&self, killmail: &ProcessedKillmail) -> KillmailOutcome {
        if age(self.clock.now(), killmail.timestamp) >= KILLMAIL_MAX_AGE {
            debug!("Ignoring stale killmail in {}", killmail.system);
            return KillmailOutcome::Stale;
        }

        let entities: Vec<SystemEntity> = killmail
            .attackers
            .iter()
            .chain(killmail.ships.iter())
            .chain(std::iter::once(&killmail.killmail))
            .cloned()
            .collect();

        let mut contents = self.contents.lock();
        if let Some(victim) = killmail.victim.as_ref().and_then(SystemEntity::character_name) {
            contents.remove_characters_named(&[victim]);
        }
        contents.update_system_entities(killmail.timestamp, &killmail.system, false, &entities);
        contents.cleanup();
        self.publish(&contents);

        debug!("Folded killmail into {}", killmail.system);
        KillmailOutcome::Applied {
            system: killmail.system.clone(),
        }
    }

    /// Republish so that entities past expiry leave the snapshot
    pub fn refresh(&self) {
        let contents = self.contents.lock();
        self.publish(&contents);
    }

    /// Drop raw entries too old to ever be published again, if enabled
    pub fn compact(&self) -> usize {
        let Some(max_age) = self.config.read().compaction_age() else {
            return 0;
        };
        let oldest = cutoff(self.clock.now(), max_age);

        let mut contents = self.contents.lock();
        let removed = contents.compact(oldest);
        if removed > 0 {
            debug!("Compacted {} stale entities", removed);
            self.publish(&contents);
        }
        removed
    }

    /// Compact if enabled, then republish once
    pub fn expire(&self) -> usize {
        let oldest = self
            .config
            .read()
            .compaction_age()
            .map(|max_age| cutoff(self.clock.now(), max_age));

        let mut contents = self.contents.lock();
        let removed = oldest.map_or(0, |oldest| contents.compact(oldest));
        if removed > 0 {
            debug!("Compacted {} stale entities", removed);
        }
        self.publish(&contents);
        removed
    }

    pub fn stats(&self) -> StoreStats {
        let (raw_systems, raw_entities) = {
            let contents = self.contents.lock();
            (contents.system_count(), contents.entity_count())
        };
        let snapshot = self.snapshot();
        StoreStats {
            raw_systems,
            raw_entities,
            published_systems: snapshot.len(),
            published_entities: snapshot.values().map(Vec::len).sum(),
            publishes: self.publishes.load(Ordering::Relaxed),
        }
    }

    fn publish(&self, contents: &SystemContents) {
        let expiry = self.config.read().intel_expiry();
        let oldest = cutoff(self.clock.now(), expiry);
        self.state.send_replace(Arc::new(contents.published(oldest)));
        self.publishes.fetch_add(1, Ordering::Relaxed);
    }
}

/// The system a message is about, and whether it was named outright.
///
/// A message naming no system is placed where the most recent context
/// message mentioning all of its characters last placed them.
fn target_system(understanding: &Understanding, context: &[ChatMessage]) -> Option<(String, bool)> {
    if let Some(system) = understanding.systems.first() {
        return Some((system.clone(), true));
    }

    let ids: Vec<i64> = understanding
        .characters()
        .filter_map(SystemEntity::character_id)
        .collect();
    if ids.is_empty() {
        return None;
    }

    context
        .iter()
        .find(|m| {
            let mentioned = player_ids(&m.tokens);
            ids.iter().all(|id| mentioned.contains(id))
        })
        .and_then(|m| last_system(&m.tokens))
        .map(|system| (system.to_string(), false))
}

fn apply_understanding(
    contents: &mut SystemContents,
    message: &ChatMessage,
    system: &str,
    is_explicit: bool,
    understanding: &Understanding,
) {
    let timestamp = message.timestamp;
    let mut entities = understanding.entities.clone();
    if understanding.reported_no_visual {
        entities.push(SystemEntity::NoVisual);
    }
    if understanding.reported_clear {
        contents.remove_where(system, SystemEntity::is_clearable);
        entities.retain(|entity| !entity.is_clearable());
    }
    let characters: Vec<SystemEntity> = entities
        .iter()
        .filter(|entity| entity.character_id().is_some())
        .cloned()
        .collect();

    match &understanding.movement {
        Some(movement) => {
            // Characters stay put until the move so their ships can follow
            contents.remove_where(system, |entity| {
                entity.is_character_bound()
                    && entity.character_id().is_none()
                    && entities.contains(entity)
            });
            contents.update_system_entities(timestamp, &movement.to_system, true, &entities);
            contents.remove_moved_characters(&movement.to_system, &characters);
        }
        None => {
            contents.update_system_entities(timestamp, system, is_explicit, &entities);
            contents.remove_moved_characters(system, &characters);
        }
    }

    if !understanding.kills.is_empty() {
        let names: Vec<&str> = understanding.kills.iter().map(|k| k.name.as_str()).collect();
        contents.remove_characters_named(&names);
    }
}
