use serde::{Deserialize, Serialize};
use std::fmt;

/// One independently polled external price origin.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceId {
    /// USD spot quote (XAU/USD).
    Spot,
    /// Domestic dealer-association buy/sell table.
    Dealer,
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceId::Spot => write!(f, "spot"),
            SourceId::Dealer => write!(f, "dealer"),
        }
    }
}

/// Operational state of a source. Drives whether monitor callbacks may write
/// into the state store and whether subscribers see live or cleared data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceStatus {
    Online,
    Stopped,
}

impl fmt::Display for SourceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceStatus::Online => write!(f, "online"),
            SourceStatus::Stopped => write!(f, "stopped"),
        }
    }
}

/// Target of an administrative status change: a single source or all of them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusScope {
    All,
    Spot,
    Dealer,
}

impl StatusScope {
    pub fn sources(&self) -> &'static [SourceId] {
        match self {
            StatusScope::All => &[SourceId::Spot, SourceId::Dealer],
            StatusScope::Spot => &[SourceId::Spot],
            StatusScope::Dealer => &[SourceId::Dealer],
        }
    }
}
