//! Market data enrichment.
//!
//! Detects which asset a message is about and turns a live quote into a short
//! line of text that can be appended to the outbound request. Failures never
//! escape this module: they degrade to a neutral sentence.

mod coingecko;
mod source;

pub use coingecko::CoinGeckoClient;
pub use source::{MarketDataError, PriceSource};

use std::sync::Arc;
use tracing::{debug, warn};

/// Insight used when the provider answered without a price.
pub const NOT_AVAILABLE: &str = "Market data not available.";

/// Insight used when the price could not be fetched at all.
pub const UNABLE_TO_RETRIEVE: &str = "Unable to retrieve market data.";

/// Assets the probe knows how to quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Asset {
    Bitcoin,
    Ethereum,
}

impl Asset {
    /// Returns all assets in match priority order.
    pub const fn all() -> &'static [Asset] {
        &[Asset::Bitcoin, Asset::Ethereum]
    }

    /// Canonical provider id.
    pub const fn id(&self) -> &'static str {
        match self {
            Asset::Bitcoin => "bitcoin",
            Asset::Ethereum => "ethereum",
        }
    }

    /// Lower-case substrings that count as a mention.
    pub const fn aliases(&self) -> &'static [&'static str] {
        match self {
            Asset::Bitcoin => &["bitcoin", "btc"],
            Asset::Ethereum => &["ethereum", "eth"],
        }
    }

    /// Find the first asset mentioned in `text`, in priority order.
    ///
    /// Matching is a plain case-insensitive substring test, so "method"
    /// counts as an ethereum mention.
    pub fn detect(text: &str) -> Option<Asset> {
        let lowered = text.to_lowercase();
        Asset::all()
            .iter()
            .copied()
            .find(|asset| asset.aliases().iter().any(|alias| lowered.contains(alias)))
    }
}

/// Format a successful quote, e.g. `Current BITCOIN price: $65000`.
pub fn format_quote(asset: Asset, price: f64) -> String {
    format!("Current {} price: ${}", asset.id().to_uppercase(), price)
}

/// Detects asset mentions and fetches at most one quote per message.
#[derive(Clone)]
pub struct MarketDataProbe {
    source: Option<Arc<dyn PriceSource>>,
}

impl MarketDataProbe {
    /// Create a probe backed by the given price source.
    pub fn new(source: Arc<dyn PriceSource>) -> Self {
        Self {
            source: Some(source),
        }
    }

    /// Create a probe that never quotes anything.
    pub fn disabled() -> Self {
        Self { source: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.source.is_some()
    }

    /// Return a market insight for `text`, or an empty string if no asset is
    /// mentioned.
    pub async fn detect_and_quote(&self, text: &str) -> String {
        let Some(source) = &self.source else {
            return String::new();
        };
        let Some(asset) = Asset::detect(text) else {
            return String::new();
        };

        debug!(asset = asset.id(), "fetching market data");

        match source.price_of(asset.id()).await {
            Ok(Some(price)) => format_quote(asset, price),
            Ok(None) => NOT_AVAILABLE.to_string(),
            Err(e) => {
                warn!(asset = asset.id(), error = %e, "market data fetch failed");
                UNABLE_TO_RETRIEVE.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Price source returning a fixed answer and recording requested ids.
    struct FixedSource {
        answer: Result<Option<f64>, MarketDataError>,
        requested: Mutex<Vec<String>>,
    }

    impl FixedSource {
        fn new(answer: Result<Option<f64>, MarketDataError>) -> Arc<Self> {
            Arc::new(Self {
                answer,
                requested: Mutex::new(Vec::new()),
            })
        }

        fn requested(&self) -> Vec<String> {
            self.requested.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PriceSource for FixedSource {
        async fn price_of(&self, asset_id: &str) -> Result<Option<f64>, MarketDataError> {
            self.requested.lock().unwrap().push(asset_id.to_string());
            self.answer.clone()
        }
    }

    #[test]
    fn test_detect_aliases() {
        assert_eq!(Asset::detect("what's BTC worth"), Some(Asset::Bitcoin));
        assert_eq!(Asset::detect("Bitcoin?"), Some(Asset::Bitcoin));
        assert_eq!(Asset::detect("eth?"), Some(Asset::Ethereum));
        assert_eq!(Asset::detect("ETHEREUM merge"), Some(Asset::Ethereum));
        assert_eq!(Asset::detect("hello"), None);
    }

    #[test]
    fn test_detect_prefers_bitcoin() {
        assert_eq!(Asset::detect("eth vs btc"), Some(Asset::Bitcoin));
    }

    #[test]
    fn test_detect_matches_inside_words() {
        assert_eq!(Asset::detect("which method"), Some(Asset::Ethereum));
    }

    #[test]
    fn test_format_quote() {
        assert_eq!(format_quote(Asset::Bitcoin, 65000.0), "Current BITCOIN price: $65000");
        assert_eq!(format_quote(Asset::Ethereum, 3120.45), "Current ETHEREUM price: $3120.45");
    }

    #[test]
    fn test_format_quote_zero_price() {
        // Zero is a price, not a missing one.
        assert_eq!(format_quote(Asset::Bitcoin, 0.0), "Current BITCOIN price: $0");
    }

    #[tokio::test]
    async fn test_zero_price_is_quoted() {
        let probe = MarketDataProbe::new(FixedSource::new(Ok(Some(0.0))));
        assert_eq!(probe.detect_and_quote("eth").await, "Current ETHEREUM price: $0");
    }

    #[tokio::test]
    async fn test_quote_success() {
        let source = FixedSource::new(Ok(Some(65000.0)));
        let probe = MarketDataProbe::new(source.clone());

        let insight = probe.detect_and_quote("what's btc worth").await;

        assert_eq!(insight, "Current BITCOIN price: $65000");
        assert_eq!(source.requested(), vec!["bitcoin".to_string()]);
    }

    #[tokio::test]
    async fn test_quote_only_one_asset() {
        let source = FixedSource::new(Ok(Some(1.0)));
        let probe = MarketDataProbe::new(source.clone());

        probe.detect_and_quote("bitcoin and ethereum").await;

        assert_eq!(source.requested(), vec!["bitcoin".to_string()]);
    }

    #[tokio::test]
    async fn test_quote_missing_price() {
        let probe = MarketDataProbe::new(FixedSource::new(Ok(None)));
        assert_eq!(probe.detect_and_quote("eth").await, NOT_AVAILABLE);
    }

    #[tokio::test]
    async fn test_quote_failure_is_swallowed() {
        let source = FixedSource::new(Err(MarketDataError::NetworkError("down".to_string())));
        let probe = MarketDataProbe::new(source);
        assert_eq!(probe.detect_and_quote("btc").await, UNABLE_TO_RETRIEVE);
    }

    #[tokio::test]
    async fn test_no_mention_skips_fetch() {
        let source = FixedSource::new(Ok(Some(1.0)));
        let probe = MarketDataProbe::new(source.clone());

        assert_eq!(probe.detect_and_quote("hello there").await, "");
        assert!(source.requested().is_empty());
    }

    #[tokio::test]
    async fn test_disabled_probe_never_quotes() {
        let probe = MarketDataProbe::disabled();
        assert!(!probe.is_enabled());
        assert_eq!(probe.detect_and_quote("btc").await, "");
    }
}
