//! Periodic expiry
//!
//! Published snapshots only change on mutation; the ticker republishes on a
//! fixed interval so expired intel drops out of view even when channels are
//! quiet.

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};

use crate::IntelStateStore;

/// Compact and republish the store every `period` until the task is aborted
pub fn spawn_expiry_ticker(store: Arc<IntelStateStore>, period: Duration) -> JoinHandle<()> {
    info!("Expiry ticker started ({:?})", period);
    tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            let removed = store.expire();

            let stats = store.stats();
            debug!(
                "Expiry tick: {} systems published, {} raw entities, {} compacted",
                stats.published_systems, stats.raw_entities, removed
            );
        }
    })
}
