//! Recent same-channel messages used to infer an unnamed system

use chrono::Duration;
use std::collections::{HashMap, VecDeque};

use fusion_core::{ChatMessage, CONTEXT_MAX_AGE, CONTEXT_MAX_MESSAGES};

/// Bounded per-channel message history
#[derive(Debug, Default, Clone)]
pub struct ChannelHistory {
    channels: HashMap<String, VecDeque<ChatMessage>>,
}

impl ChannelHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Context for `message`: earlier messages of its channel within the
    /// context window, newest first.
    pub fn context_for(&self, message: &ChatMessage) -> Vec<ChatMessage> {
        let max_age = Duration::from_std(CONTEXT_MAX_AGE).unwrap_or_else(|_| Duration::minutes(5));
        let Some(recent) = self.channels.get(&message.channel) else {
            return Vec::new();
        };

        recent
            .iter()
            .rev()
            .filter(|m| m.timestamp <= message.timestamp && message.timestamp - m.timestamp <= max_age)
            .filter(|m| *m != message)
            .take(CONTEXT_MAX_MESSAGES)
            .cloned()
            .collect()
    }

    /// Remember a message, keeping only the most recent per channel
    pub fn record(&mut self, message: ChatMessage) {
        let recent = self.channels.entry(message.channel.clone()).or_default();
        recent.push_back(message);
        while recent.len() > CONTEXT_MAX_MESSAGES {
            recent.pop_front();
        }
    }
}
