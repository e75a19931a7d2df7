use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::warn;

use crate::config::PersistenceConfig;
use crate::error::Result;
use crate::types::quote::{DealerQuote, SourceData, SpotQuote};
use crate::util::{current_date, current_datetime};

/// One recorded price observation, newest first in the journal file.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Transaction {
    pub symbol: String,
    pub price: f64,
    pub state: String,
    pub datetime: String,
}

/// On-disk mirror of the latest per-source data.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CombinedData {
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub last_update: String,
    pub spot: Option<SpotQuote>,
    pub dealer: Option<DealerQuote>,
}

/// File-backed journal for accepted updates.
///
/// Invoked after every successful state mutation, fire-and-forget: the write
/// happens on a blocking task and failures are logged, never surfaced. The
/// in-memory state is the source of truth; these files are an audit trail.
pub struct Journal {
    transactions_path: PathBuf,
    data_path: PathBuf,
    history_limit: usize,
}

impl Journal {
    pub fn new(config: &PersistenceConfig) -> Self {
        Journal {
            transactions_path: PathBuf::from(&config.transactions_file),
            data_path: PathBuf::from(&config.data_file),
            history_limit: config.history_limit,
        }
    }

    /// Record an accepted update without blocking the caller.
    pub fn record_update(self: &Arc<Self>, data: &SourceData) {
        let journal = Arc::clone(self);
        let data = data.clone();
        tokio::task::spawn_blocking(move || {
            if let Err(err) = journal.write_update(&data) {
                warn!(error = %err, "journal write failed");
            }
        });
    }

    fn write_update(&self, data: &SourceData) -> Result<()> {
        self.append_transactions(data)?;
        self.update_combined(data)
    }

    fn append_transactions(&self, data: &SourceData) -> Result<()> {
        let mut transactions = load_json::<Vec<Transaction>>(&self.transactions_path);
        let now = current_datetime();

        let mut fresh = Vec::new();
        match data {
            SourceData::Spot(quote) => fresh.push(Transaction {
                symbol: SpotQuote::KIND.to_string(),
                price: quote.price,
                state: "market".to_string(),
                datetime: now,
            }),
            SourceData::Dealer(quote) => {
                for row in &quote.rows {
                    fresh.push(Transaction {
                        symbol: format!("{} Buy", row.kind),
                        price: row.buy_price,
                        state: "buy".to_string(),
                        datetime: now.clone(),
                    });
                    fresh.push(Transaction {
                        symbol: format!("{} Sell", row.kind),
                        price: row.sell_price,
                        state: "sell".to_string(),
                        datetime: now.clone(),
                    });
                }
            }
        }

        fresh.append(&mut transactions);
        fresh.truncate(self.history_limit);
        save_json(&self.transactions_path, &fresh)
    }

    fn update_combined(&self, data: &SourceData) -> Result<()> {
        let mut combined = load_json::<CombinedData>(&self.data_path);
        match data {
            SourceData::Spot(quote) => combined.spot = Some(quote.clone()),
            SourceData::Dealer(quote) => combined.dealer = Some(quote.clone()),
        }
        combined.date = current_date();
        combined.last_update = current_datetime();
        save_json(&self.data_path, &combined)
    }
}

/// Missing or corrupt files yield the default; the journal is best-effort.
fn load_json<T: for<'de> Deserialize<'de> + Default>(path: &Path) -> T {
    File::open(path)
        .ok()
        .and_then(|file| serde_json::from_reader(BufReader::new(file)).ok())
        .unwrap_or_default()
}

fn save_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(BufWriter::new(file), value)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn journal_in(dir: &TempDir, limit: usize) -> Arc<Journal> {
        Arc::new(Journal::new(&PersistenceConfig {
            data_file: dir
                .path()
                .join("gold_prices.json")
                .to_string_lossy()
                .into_owned(),
            transactions_file: dir
                .path()
                .join("transactions.json")
                .to_string_lossy()
                .into_owned(),
            history_limit: limit,
        }))
    }

    fn spot(price: f64) -> SourceData {
        SourceData::Spot(SpotQuote {
            kind: SpotQuote::KIND.to_string(),
            price,
            change: String::new(),
            change_percent: String::new(),
            update_time: "10:00:00".to_string(),
        })
    }

    #[test]
    fn newest_transaction_comes_first() {
        let dir = TempDir::new().unwrap();
        let journal = journal_in(&dir, 1000);

        journal.write_update(&spot(2400.0)).unwrap();
        journal.write_update(&spot(2401.0)).unwrap();

        let transactions = load_json::<Vec<Transaction>>(&journal.transactions_path);
        assert_eq!(transactions.len(), 2);
        assert_eq!(transactions[0].price, 2401.0);
        assert_eq!(transactions[1].price, 2400.0);
    }

    #[test]
    fn history_is_capped() {
        let dir = TempDir::new().unwrap();
        let journal = journal_in(&dir, 3);

        for i in 0..5 {
            journal.write_update(&spot(2400.0 + i as f64)).unwrap();
        }

        let transactions = load_json::<Vec<Transaction>>(&journal.transactions_path);
        assert_eq!(transactions.len(), 3);
        assert_eq!(transactions[0].price, 2404.0);
    }

    #[test]
    fn combined_file_keeps_the_other_source() {
        let dir = TempDir::new().unwrap();
        let journal = journal_in(&dir, 1000);

        journal.write_update(&spot(2400.0)).unwrap();
        journal
            .write_update(&SourceData::Dealer(DealerQuote {
                date: "2025-01-01".to_string(),
                last_update: "10:00:00".to_string(),
                rows: vec![],
                source: "test".to_string(),
            }))
            .unwrap();

        let combined = load_json::<CombinedData>(&journal.data_path);
        assert!(combined.spot.is_some());
        assert!(combined.dealer.is_some());
    }

    #[test]
    fn corrupt_journal_file_is_replaced() {
        let dir = TempDir::new().unwrap();
        let journal = journal_in(&dir, 1000);
        std::fs::write(&journal.transactions_path, "not json").unwrap();

        journal.write_update(&spot(2400.0)).unwrap();

        let transactions = load_json::<Vec<Transaction>>(&journal.transactions_path);
        assert_eq!(transactions.len(), 1);
    }
}
