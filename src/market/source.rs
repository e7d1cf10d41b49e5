//! Price source trait and its error type.

use async_trait::async_trait;

/// A provider of current USD prices.
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Fetch the USD price for a canonical asset id such as `"bitcoin"`.
    ///
    /// Returns `Ok(None)` when the provider answered but had no price.
    async fn price_of(&self, asset_id: &str) -> Result<Option<f64>, MarketDataError>;
}

/// Errors that can occur while fetching market data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarketDataError {
    /// Network or connection error
    NetworkError(String),

    /// Provider answered with a non-success status
    ApiError { status: u16 },

    /// Response body was not the expected JSON
    ParseError(String),
}

impl std::fmt::Display for MarketDataError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NetworkError(msg) => write!(f, "Network error: {}", msg),
            Self::ApiError { status } => write!(f, "Market data API error ({})", status),
            Self::ParseError(msg) => write!(f, "Could not parse market data: {}", msg),
        }
    }
}

impl std::error::Error for MarketDataError {}

impl From<reqwest::Error> for MarketDataError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::ParseError(err.to_string())
        } else {
            Self::NetworkError(err.to_string())
        }
    }
}

impl From<serde_json::Error> for MarketDataError {
    fn from(err: serde_json::Error) -> Self {
        Self::ParseError(err.to_string())
    }
}
