//! CoinGecko simple price endpoint.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use super::{MarketDataError, PriceSource};
use crate::config::MarketConfig;

/// Quote currency requested from the provider.
const VS_CURRENCY: &str = "usd";

/// Price source backed by `GET {api_base}/simple/price`.
pub struct CoinGeckoClient {
    client: Client,
    config: Arc<MarketConfig>,
}

impl CoinGeckoClient {
    /// Create a new client with the given configuration.
    pub fn new(config: MarketConfig) -> Self {
        Self {
            client: Client::new(),
            config: Arc::new(config),
        }
    }

    fn price_url(&self) -> String {
        format!("{}/simple/price", self.config.api_base.trim_end_matches('/'))
    }
}

#[async_trait]
impl PriceSource for CoinGeckoClient {
    async fn price_of(&self, asset_id: &str) -> Result<Option<f64>, MarketDataError> {
        let response = self
            .client
            .get(self.price_url())
            .query(&[("ids", asset_id), ("vs_currencies", VS_CURRENCY)])
            .send()
            .await?;

        let status = response.status();
        let body: Value = match response.json().await {
            Ok(body) => body,
            Err(_) if !status.is_success() => {
                return Err(MarketDataError::ApiError {
                    status: status.as_u16(),
                });
            }
            Err(e) => return Err(e.into()),
        };

        // Error statuses usually carry a JSON error body (rate limiting does);
        // it has no price, which is the same as an answer without one.
        if !status.is_success() {
            debug!(status = status.as_u16(), "price request answered with error status");
        }
        Ok(extract_price(&body, asset_id))
    }
}

/// Pull `body[asset].usd` out of a simple price response.
fn extract_price(body: &Value, asset_id: &str) -> Option<f64> {
    body.get(asset_id)?.get(VS_CURRENCY)?.as_f64()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;

    /// Answer a single HTTP request on a local port with the given status
    /// line and body. Returns the base URL to point the client at.
    fn serve_once(status_line: &'static str, content_type: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = [0u8; 4096];
            let _ = stream.read(&mut request);
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                content_type,
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).unwrap();
        });

        format!("http://{}", addr)
    }

    fn client_for(api_base: String) -> CoinGeckoClient {
        CoinGeckoClient::new(MarketConfig {
            api_base,
            enabled: true,
        })
    }

    #[tokio::test]
    async fn test_price_of_reads_usd_price() {
        let base = serve_once("200 OK", "application/json", r#"{"bitcoin":{"usd":65000}}"#);
        let price = client_for(base).price_of("bitcoin").await;
        assert_eq!(price, Ok(Some(65000.0)));
    }

    #[tokio::test]
    async fn test_rate_limited_json_body_has_no_price() {
        let base = serve_once(
            "429 Too Many Requests",
            "application/json",
            r#"{"status":{"error_code":429,"error_message":"You've exceeded the Rate Limit."}}"#,
        );
        let price = client_for(base).price_of("bitcoin").await;
        assert_eq!(price, Ok(None));
    }

    #[tokio::test]
    async fn test_rate_limited_quote_reads_not_available() {
        let base = serve_once(
            "429 Too Many Requests",
            "application/json",
            r#"{"status":{"error_code":429}}"#,
        );
        let probe = crate::market::MarketDataProbe::new(Arc::new(client_for(base)));
        assert_eq!(probe.detect_and_quote("btc").await, crate::market::NOT_AVAILABLE);
    }

    #[tokio::test]
    async fn test_error_status_without_json_is_an_error() {
        let base = serve_once("502 Bad Gateway", "text/html", "<html>bad gateway</html>");
        let price = client_for(base).price_of("bitcoin").await;
        assert_eq!(price, Err(MarketDataError::ApiError { status: 502 }));
    }

    #[tokio::test]
    async fn test_success_status_without_json_is_an_error() {
        let base = serve_once("200 OK", "text/plain", "not json");
        let price = client_for(base).price_of("bitcoin").await;
        assert!(price.is_err());
    }

    #[test]
    fn test_price_url_trims_trailing_slash() {
        let client = CoinGeckoClient::new(MarketConfig {
            api_base: "https://api.coingecko.com/api/v3/".to_string(),
            enabled: true,
        });
        assert_eq!(client.price_url(), "https://api.coingecko.com/api/v3/simple/price");
    }

    #[test]
    fn test_extract_price_integer() {
        let body = json!({"bitcoin": {"usd": 65000}});
        assert_eq!(extract_price(&body, "bitcoin"), Some(65000.0));
    }

    #[test]
    fn test_extract_price_fractional() {
        let body = json!({"ethereum": {"usd": 3120.45}});
        assert_eq!(extract_price(&body, "ethereum"), Some(3120.45));
    }

    #[test]
    fn test_extract_price_missing_asset() {
        let body = json!({});
        assert_eq!(extract_price(&body, "bitcoin"), None);
    }

    #[test]
    fn test_extract_price_missing_usd() {
        let body = json!({"bitcoin": {"eur": 60000}});
        assert_eq!(extract_price(&body, "bitcoin"), None);
    }

    #[test]
    fn test_extract_price_non_numeric() {
        let body = json!({"bitcoin": {"usd": "lots"}});
        assert_eq!(extract_price(&body, "bitcoin"), None);
    }

    #[test]
    fn test_extract_price_error_payload() {
        let body = json!({"status": {"error_code": 429, "error_message": "rate limited"}});
        assert_eq!(extract_price(&body, "bitcoin"), None);
    }
}
