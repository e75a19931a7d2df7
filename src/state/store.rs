use serde::{Deserialize, Serialize};
use std::sync::RwLock;

use crate::types::quote::{DealerQuote, SourceData, SpotQuote};
use crate::types::source::{SourceId, SourceStatus};
use crate::util::current_datetime;

/// Aggregate view of the latest known good data across all sources.
///
/// `version` increases on every mutation; subscribers key off it to detect
/// missed pushes and request a fresh snapshot on reconnect.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GlobalState {
    pub status: SourceStatus,
    pub spot_status: SourceStatus,
    pub dealer_status: SourceStatus,
    pub spot: Option<SpotQuote>,
    pub dealer: Option<DealerQuote>,
    pub last_update: String,
    pub version: u64,
}

impl GlobalState {
    fn new() -> Self {
        GlobalState {
            status: SourceStatus::Online,
            spot_status: SourceStatus::Online,
            dealer_status: SourceStatus::Online,
            spot: None,
            dealer: None,
            last_update: String::new(),
            version: 0,
        }
    }

    pub fn status_of(&self, source: SourceId) -> SourceStatus {
        match source {
            SourceId::Spot => self.spot_status,
            SourceId::Dealer => self.dealer_status,
        }
    }

    fn refresh_overall(&mut self) {
        self.status = if self.spot_status == SourceStatus::Stopped
            && self.dealer_status == SourceStatus::Stopped
        {
            SourceStatus::Stopped
        } else {
            SourceStatus::Online
        };
    }
}

/// The single authoritative, concurrency-safe snapshot of latest known state.
///
/// One read-write lock guards the whole aggregate. The lock is held only for
/// the in-memory mutation or copy; callers trigger broadcast strictly after
/// their call returns, so no I/O ever happens under the lock.
pub struct StateStore {
    inner: RwLock<GlobalState>,
}

impl StateStore {
    pub fn new() -> Self {
        StateStore {
            inner: RwLock::new(GlobalState::new()),
        }
    }

    /// Consistent point-in-time copy of the aggregate.
    pub fn snapshot(&self) -> GlobalState {
        self.inner.read().expect("state lock poisoned").clone()
    }

    /// Replace a source's snapshot with a freshly fetched value.
    ///
    /// A write for a source that is not online is silently dropped: a late
    /// monitor callback racing a disable must not resurrect cleared data.
    /// Returns whether a mutation occurred.
    pub fn apply(&self, value: SourceData) -> bool {
        let mut state = self.inner.write().expect("state lock poisoned");
        if state.status_of(value.source_id()) != SourceStatus::Online {
            return false;
        }
        match value {
            SourceData::Spot(quote) => state.spot = Some(quote),
            SourceData::Dealer(quote) => state.dealer = Some(quote),
        }
        state.last_update = current_datetime();
        state.version += 1;
        true
    }

    /// Record a source's requested status, returning the previous one so the
    /// controller can detect edge transitions. Stopping a source clears its
    /// snapshot.
    pub fn set_status(&self, source: SourceId, status: SourceStatus) -> SourceStatus {
        let mut state = self.inner.write().expect("state lock poisoned");
        let prev = state.status_of(source);
        match source {
            SourceId::Spot => {
                state.spot_status = status;
                if status == SourceStatus::Stopped {
                    state.spot = None;
                }
            }
            SourceId::Dealer => {
                state.dealer_status = status;
                if status == SourceStatus::Stopped {
                    state.dealer = None;
                }
            }
        }
        state.refresh_overall();
        state.version += 1;
        prev
    }

    pub fn version(&self) -> u64 {
        self.inner.read().expect("state lock poisoned").version
    }
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new()
    }
}
