//! Alert-trigger seam
//!
//! Fresh intel is handed to the alerting side as it is understood. Calls are
//! notifications only: nothing waits on them and nothing is retried.

use tracing::info;

use fusion_core::{ChatMessage, Understanding};

pub trait AlertTrigger: Send + Sync {
    /// A fresh intel message was understood
    fn on_new_intel(&self, message: &ChatMessage, understanding: &Understanding);

    /// A fresh intel message arrived, regardless of what it says
    fn on_new_intel_message(&self, message: &ChatMessage);
}

/// Discards all alerts
#[derive(Debug, Default, Clone, Copy)]
pub struct NoAlerts;

impl AlertTrigger for NoAlerts {
    fn on_new_intel(&self, _message: &ChatMessage, _understanding: &Understanding) {}

    fn on_new_intel_message(&self, _message: &ChatMessage) {}
}

/// Logs alerts instead of delivering them
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingAlerts;

impl AlertTrigger for LoggingAlerts {
    fn on_new_intel(&self, message: &ChatMessage, understanding: &Understanding) {
        info!(
            "Intel in {}: systems {:?}, {} entities, {} kills",
            message.channel,
            understanding.systems,
            understanding.entities.len(),
            understanding.kills.len()
        );
    }

    fn on_new_intel_message(&self, message: &ChatMessage) {
        info!("Intel message from {} in {}", message.author, message.channel);
    }
}
