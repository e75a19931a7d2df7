pub mod dealer;
pub mod spot;

use async_trait::async_trait;
use std::time::Duration;

use crate::config::SourcesConfig;
use crate::error::{Error, Result};
use crate::types::quote::SourceData;
use crate::types::source::SourceId;

/// Retrieval of a source's raw content plus parsing into typed fields.
///
/// Implementations may block on network I/O but carry their own timeout
/// budget; they return a typed value or a descriptive error, never partial
/// data.
#[async_trait]
pub trait SourceFetcher: Send + Sync {
    async fn fetch(&self, source: SourceId) -> Result<SourceData>;
}

/// Plain-HTTP fetcher with regex extraction over the returned markup.
pub struct HttpFetcher {
    client: reqwest::Client,
    spot_url: String,
    dealer_url: String,
}

impl HttpFetcher {
    pub fn new(config: &SourcesConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| Error::Config(e.to_string()))?;

        Ok(HttpFetcher {
            client,
            spot_url: config.spot.url.clone(),
            dealer_url: config.dealer.url.clone(),
        })
    }

    async fn get_page(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.text().await?)
    }
}

#[async_trait]
impl SourceFetcher for HttpFetcher {
    async fn fetch(&self, source: SourceId) -> Result<SourceData> {
        match source {
            SourceId::Spot => {
                let body = self.get_page(&self.spot_url).await?;
                Ok(SourceData::Spot(spot::parse_spot(&body)?))
            }
            SourceId::Dealer => {
                let body = self.get_page(&self.dealer_url).await?;
                Ok(SourceData::Dealer(dealer::parse_dealer(
                    &body,
                    &self.dealer_url,
                )?))
            }
        }
    }
}

/// Lenient numeric parse for quoted prices: strips thousands separators and
/// whitespace, yields 0.0 for anything unparseable. Callers treat a
/// non-positive result as missing.
pub fn parse_price(raw: &str) -> f64 {
    raw.replace(',', "").trim().parse::<f64>().unwrap_or(0.0)
}
