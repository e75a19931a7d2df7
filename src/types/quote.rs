use serde::{Deserialize, Serialize};

use crate::types::source::SourceId;

/// Last parsed USD spot quote. Immutable once built; the store replaces it
/// wholesale on every accepted update.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpotQuote {
    #[serde(rename = "type")]
    pub kind: String,
    pub price: f64,
    #[serde(default)]
    pub change: String,
    #[serde(default)]
    pub change_percent: String,
    pub update_time: String,
}

impl SpotQuote {
    pub const KIND: &'static str = "Gold Spot Price (XAU/USD)";
}

/// One buy/sell row from the dealer table (gold bar or jewelry gold).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DealerRow {
    #[serde(rename = "type")]
    pub kind: String,
    pub buy_price: f64,
    pub sell_price: f64,
    pub update_time: String,
}

/// Last parsed dealer-association quote table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DealerQuote {
    pub date: String,
    pub last_update: String,
    #[serde(rename = "prices")]
    pub rows: Vec<DealerRow>,
    pub source: String,
}

/// A successfully fetched value for one source, tagged with its origin.
#[derive(Clone, Debug, PartialEq)]
pub enum SourceData {
    Spot(SpotQuote),
    Dealer(DealerQuote),
}

impl SourceData {
    pub fn source_id(&self) -> SourceId {
        match self {
            SourceData::Spot(_) => SourceId::Spot,
            SourceData::Dealer(_) => SourceId::Dealer,
        }
    }

    /// Change detection between two fetches of the same source. Timestamps
    /// and other presentation fields are ignored; only quoted prices count.
    pub fn changed_from(&self, prev: &SourceData) -> bool {
        match (prev, self) {
            (SourceData::Spot(old), SourceData::Spot(new)) => old.price != new.price,
            (SourceData::Dealer(old), SourceData::Dealer(new)) => {
                if old.rows.len() != new.rows.len() {
                    return true;
                }
                old.rows.iter().zip(&new.rows).any(|(a, b)| {
                    a.buy_price != b.buy_price || a.sell_price != b.sell_price
                })
            }
            // Mismatched origins never compare equal.
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spot(price: f64, update_time: &str) -> SourceData {
        SourceData::Spot(SpotQuote {
            kind: SpotQuote::KIND.to_string(),
            price,
            change: String::new(),
            change_percent: String::new(),
            update_time: update_time.to_string(),
        })
    }

    fn dealer(buy: f64, sell: f64, last_update: &str) -> SourceData {
        SourceData::Dealer(DealerQuote {
            date: "2025-01-01".to_string(),
            last_update: last_update.to_string(),
            rows: vec![DealerRow {
                kind: "Gold Bar".to_string(),
                buy_price: buy,
                sell_price: sell,
                update_time: last_update.to_string(),
            }],
            source: "test".to_string(),
        })
    }

    #[test]
    fn spot_change_ignores_timestamp() {
        let a = spot(2400.0, "10:00:00");
        let b = spot(2400.0, "10:00:02");
        assert!(!b.changed_from(&a));
    }

    #[test]
    fn spot_change_detects_price_move() {
        let a = spot(2400.0, "10:00:00");
        let b = spot(2401.5, "10:00:02");
        assert!(b.changed_from(&a));
    }

    #[test]
    fn dealer_change_ignores_last_update() {
        let a = dealer(51000.0, 51100.0, "10:00:00");
        let b = dealer(51000.0, 51100.0, "10:05:00");
        assert!(!b.changed_from(&a));
    }

    #[test]
    fn dealer_change_detects_buy_or_sell_move() {
        let a = dealer(51000.0, 51100.0, "10:00:00");
        assert!(dealer(51050.0, 51100.0, "10:00:00").changed_from(&a));
        assert!(dealer(51000.0, 51150.0, "10:00:00").changed_from(&a));
    }

    #[test]
    fn dealer_change_detects_row_count_change() {
        let a = dealer(51000.0, 51100.0, "10:00:00");
        let mut two_rows = match dealer(51000.0, 51100.0, "10:00:00") {
            SourceData::Dealer(q) => q,
            _ => unreachable!(),
        };
        two_rows.rows.push(two_rows.rows[0].clone());
        assert!(SourceData::Dealer(two_rows).changed_from(&a));
    }
}
