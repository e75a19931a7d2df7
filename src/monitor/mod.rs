pub mod retry;

use std::future::Future;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::monitor::retry::RetryPolicy;
use crate::types::source::SourceId;

#[derive(Clone, Copy, Debug)]
pub struct MonitorConfig {
    pub interval: Duration,
    pub max_retries: u32,
}

/// Fixed-interval polling loop for one source.
///
/// The loop owns no locks: all interaction with shared state goes through
/// `on_update`, which performs the synchronized write itself. Fetch errors
/// are absorbed here and never propagate further; only the shutdown signal
/// ends the loop. Shutdown is checked with priority over the ticker and over
/// an in-flight fetch, so cancellation always wins a race.
///
/// A source with no prior successful fetch reports its first success as
/// changed unconditionally.
pub async fn run<T, F, Fut, C, U, UFut>(
    mut shutdown: watch::Receiver<bool>,
    source: SourceId,
    config: MonitorConfig,
    mut fetch: F,
    changed: C,
    mut on_update: U,
) where
    T: Clone,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
    C: Fn(&T, &T) -> bool,
    U: FnMut(T) -> UFut,
    UFut: Future<Output = ()>,
{
    let mut ticker = tokio::time::interval(config.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // interval() fires immediately; the initial fetch is done by the caller
    // before the loop starts, so swallow the first tick.
    ticker.tick().await;

    let mut retry = RetryPolicy::new(config.max_retries);
    let mut last: Option<T> = None;

    info!(%source, interval_ms = config.interval.as_millis() as u64, "monitor started");

    loop {
        if *shutdown.borrow_and_update() {
            info!(%source, "monitor stopped");
            return;
        }

        tokio::select! {
            biased;
            _ = shutdown.changed() => {
                info!(%source, "monitor stopped");
                return;
            }
            _ = ticker.tick() => {}
        }

        let fetched = tokio::select! {
            biased;
            _ = shutdown.changed() => {
                info!(%source, "monitor stopped");
                return;
            }
            result = fetch() => result,
        };

        match fetched {
            Err(err) => {
                if retry.record_failure() {
                    warn!(%source, retries = config.max_retries, error = %err,
                        "fetch kept failing, counter reset");
                }
            }
            Ok(value) => {
                retry.record_success();
                let is_changed = match &last {
                    None => true,
                    Some(prev) => changed(prev, &value),
                };
                if is_changed {
                    on_update(value.clone()).await;
                    last = Some(value);
                } else {
                    debug!(%source, "no change this tick");
                }
            }
        }
    }
}
