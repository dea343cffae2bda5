//! Instrument catalog and market quotes.
//!
//! The catalog is a static table. Quotes start from a built-in snapshot and
//! can be refreshed from an upstream feed; when the feed is unreachable the
//! last known table keeps being served.

use std::collections::HashMap;
use std::time::Duration;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Instrument {
    pub id: &'static str,
    pub name: &'static str,
    #[serde(rename = "type")]
    pub fund_type: &'static str,
    pub expense_ratio: f64,
}

/// Instruments grouped by the bucket they serve.
#[derive(Debug, Clone, Serialize)]
pub struct InstrumentCatalog {
    pub equity: Vec<Instrument>,
    pub debt: Vec<Instrument>,
    pub gold: Vec<Instrument>,
    pub elss: Vec<Instrument>,
}

pub static CATALOG: Lazy<InstrumentCatalog> = Lazy::new(|| InstrumentCatalog {
    equity: vec![
        Instrument { id: "nifty50", name: "Nifty 50 Index Fund", fund_type: "Index Fund", expense_ratio: 0.1 },
        Instrument { id: "sensex", name: "Sensex Index Fund", fund_type: "Index Fund", expense_ratio: 0.1 },
        Instrument { id: "multicap", name: "Multi-Cap Growth Fund", fund_type: "Active Fund", expense_ratio: 1.2 },
    ],
    debt: vec![
        Instrument { id: "liquid", name: "Liquid Fund", fund_type: "Liquid Fund", expense_ratio: 0.2 },
        Instrument { id: "corporate", name: "Corporate Bond Fund", fund_type: "Debt Fund", expense_ratio: 0.8 },
        Instrument { id: "gilt", name: "Gilt Fund", fund_type: "Debt Fund", expense_ratio: 0.6 },
    ],
    gold: vec![
        Instrument { id: "goldetf", name: "Gold ETF", fund_type: "ETF", expense_ratio: 0.5 },
        Instrument { id: "goldfund", name: "Gold Fund", fund_type: "Fund of Funds", expense_ratio: 1.0 },
    ],
    elss: vec![
        Instrument { id: "elss1", name: "ELSS Tax Saver Fund", fund_type: "ELSS", expense_ratio: 1.5 },
    ],
});

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub price: f64,
    pub change: f64,
    pub change_percent: f64,
}

/// Snapshot served until (and whenever) the upstream feed is unavailable.
pub fn default_quotes() -> HashMap<String, Quote> {
    HashMap::from([
        ("NIFTY50".to_string(), Quote { price: 19_500.0, change: 150.0, change_percent: 0.78 }),
        ("SENSEX".to_string(), Quote { price: 64_500.0, change: 450.0, change_percent: 0.70 }),
        ("GOLD".to_string(), Quote { price: 58_000.0, change: 200.0, change_percent: 0.35 }),
    ])
}

/// Fetch the full quote table from the upstream feed. The feed is expected
/// to return a `symbol -> quote` JSON object.
pub async fn fetch_quotes(url: &str) -> Result<HashMap<String, Quote>, reqwest::Error> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()?;
    let quotes = client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .json::<HashMap<String, Quote>>()
        .await?;
    debug!(symbols = quotes.len(), "refreshed quotes from upstream");
    Ok(quotes)
}

/// Periodically refresh the shared quote table. Failures are logged and the
/// previous table is kept.
pub async fn refresh_loop(
    url: String,
    interval: Duration,
    quotes: std::sync::Arc<tokio::sync::RwLock<HashMap<String, Quote>>>,
) {
    loop {
        match fetch_quotes(&url).await {
            Ok(fresh) if !fresh.is_empty() => {
                *quotes.write().await = fresh;
            }
            Ok(_) => warn!("upstream quote feed returned no symbols, keeping cached table"),
            Err(e) => warn!("quote refresh failed: {e}, keeping cached table"),
        }
        tokio::time::sleep(interval).await;
    }
}
