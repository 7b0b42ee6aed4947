// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Periodic article purge

use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{error, info};

use super::ArticleStore;

/// Spawn a task that wipes the store every `period`
///
/// The first sweep runs one full period after the call, not immediately.
pub fn spawn_sweeper(store: ArticleStore, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(
            "Article sweeper started for {} every {:?}",
            store.dir().display(),
            period
        );

        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            match store.sweep().await {
                Ok(removed) => info!("Scheduled sweep deleted {} articles", removed),
                Err(e) => error!("Scheduled sweep failed: {}", e),
            }
        }
    })
}
