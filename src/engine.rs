use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::api::ApiState;
use crate::config::AppConfig;
use crate::control::StatusController;
use crate::error::Result;
use crate::hub::BroadcastHub;
use crate::monitor::{self, MonitorConfig};
use crate::persist::Journal;
use crate::sources::{HttpFetcher, SourceFetcher};
use crate::state::StateStore;
use crate::types::quote::SourceData;
use crate::types::source::SourceId;

/// Owns the core components and wires the polling loops to the store, the
/// journal, and the broadcast hub.
pub struct Engine {
    store: Arc<StateStore>,
    hub: Arc<BroadcastHub>,
    controller: Arc<StatusController>,
    fetcher: Arc<dyn SourceFetcher>,
    journal: Arc<Journal>,
    config: AppConfig,
}

impl Engine {
    pub fn new(config: AppConfig) -> Result<Self> {
        let fetcher = Arc::new(HttpFetcher::new(&config.sources)?);
        Ok(Self::with_fetcher(config, fetcher))
    }

    /// Build around an injected fetcher; the seam the tests use.
    pub fn with_fetcher(config: AppConfig, fetcher: Arc<dyn SourceFetcher>) -> Self {
        let store = Arc::new(StateStore::new());
        let hub = Arc::new(BroadcastHub::new(Arc::clone(&store)));
        let journal = Arc::new(Journal::new(&config.persistence));
        let controller = Arc::new(StatusController::new(
            Arc::clone(&store),
            Arc::clone(&hub),
            Arc::clone(&fetcher),
            Arc::clone(&journal),
        ));

        Engine {
            store,
            hub,
            controller,
            fetcher,
            journal,
            config,
        }
    }

    pub fn store(&self) -> Arc<StateStore> {
        Arc::clone(&self.store)
    }

    pub fn hub(&self) -> Arc<BroadcastHub> {
        Arc::clone(&self.hub)
    }

    pub fn api_state(&self) -> Arc<ApiState> {
        Arc::new(ApiState {
            store: Arc::clone(&self.store),
            hub: Arc::clone(&self.hub),
            controller: Arc::clone(&self.controller),
        })
    }

    /// Fetch both sources once before the pollers start, so the first
    /// subscribers see data instead of an empty snapshot. Failures are
    /// logged; the scheduled polls will fill the gap.
    pub async fn initial_fetch(&self) {
        for source in [SourceId::Spot, SourceId::Dealer] {
            match self.fetcher.fetch(source).await {
                Ok(data) => {
                    if self.store.apply(data.clone()) {
                        self.journal.record_update(&data);
                    }
                    info!(%source, "initial fetch succeeded");
                }
                Err(err) => warn!(%source, error = %err, "initial fetch failed"),
            }
        }
        self.hub.broadcast().await;
    }

    /// Start one polling loop per source. Each loop stops within a tick of
    /// the shutdown signal flipping to true.
    pub fn spawn_monitors(&self, shutdown: watch::Receiver<bool>) -> Vec<JoinHandle<()>> {
        vec![
            self.spawn_monitor(
                SourceId::Spot,
                MonitorConfig {
                    interval: self.config.sources.spot.interval(),
                    max_retries: self.config.sources.spot.max_retries,
                },
                shutdown.clone(),
            ),
            self.spawn_monitor(
                SourceId::Dealer,
                MonitorConfig {
                    interval: self.config.sources.dealer.interval(),
                    max_retries: self.config.sources.dealer.max_retries,
                },
                shutdown,
            ),
        ]
    }

    fn spawn_monitor(
        &self,
        source: SourceId,
        config: MonitorConfig,
        shutdown: watch::Receiver<bool>,
    ) -> JoinHandle<()> {
        let fetcher = Arc::clone(&self.fetcher);
        let store = Arc::clone(&self.store);
        let hub = Arc::clone(&self.hub);
        let journal = Arc::clone(&self.journal);

        tokio::spawn(monitor::run(
            shutdown,
            source,
            config,
            move || {
                let fetcher = Arc::clone(&fetcher);
                async move { fetcher.fetch(source).await }
            },
            |prev: &SourceData, next: &SourceData| next.changed_from(prev),
            move |data: SourceData| {
                let store = Arc::clone(&store);
                let hub = Arc::clone(&hub);
                let journal = Arc::clone(&journal);
                async move {
                    if store.apply(data.clone()) {
                        journal.record_update(&data);
                        hub.broadcast().await;
                    }
                }
            },
        ))
    }
}
