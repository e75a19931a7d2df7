use std::sync::Arc;
use tracing::{info, warn};

use crate::hub::BroadcastHub;
use crate::persist::Journal;
use crate::sources::SourceFetcher;
use crate::state::StateStore;
use crate::types::source::{SourceId, SourceStatus, StatusScope};

/// Administrative entry point for pausing and resuming sources at runtime.
///
/// Stopping a source records the status and clears its snapshot inside the
/// store; resuming triggers a one-shot re-fetch outside any lock so
/// subscribers get data back before the next scheduled poll. Every requested
/// transition broadcasts, so status flips are visible even when no price
/// changed.
pub struct StatusController {
    store: Arc<StateStore>,
    hub: Arc<BroadcastHub>,
    fetcher: Arc<dyn SourceFetcher>,
    journal: Arc<Journal>,
}

impl StatusController {
    pub fn new(
        store: Arc<StateStore>,
        hub: Arc<BroadcastHub>,
        fetcher: Arc<dyn SourceFetcher>,
        journal: Arc<Journal>,
    ) -> Self {
        StatusController {
            store,
            hub,
            fetcher,
            journal,
        }
    }

    pub async fn set_status(&self, scope: StatusScope, status: SourceStatus) {
        for source in scope.sources() {
            let prev = self.store.set_status(*source, status);
            info!(source = %source, from = %prev, to = %status, "status transition");

            if prev == SourceStatus::Stopped && status == SourceStatus::Online {
                self.spawn_refetch(*source);
            }
        }
        self.hub.broadcast().await;
    }

    fn spawn_refetch(&self, source: SourceId) {
        let store = Arc::clone(&self.store);
        let hub = Arc::clone(&self.hub);
        let fetcher = Arc::clone(&self.fetcher);
        let journal = Arc::clone(&self.journal);

        tokio::spawn(async move {
            match fetcher.fetch(source).await {
                Ok(data) => {
                    if store.apply(data.clone()) {
                        journal.record_update(&data);
                        hub.broadcast().await;
                    }
                }
                // The source stays online with an empty snapshot until the
                // next scheduled poll succeeds.
                Err(err) => {
                    warn!(%source, error = %err, "re-fetch after resume failed")
                }
            }
        });
    }
}
