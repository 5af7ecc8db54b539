use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

use super::{argument, BuiltinTool, Tool};
use crate::errors::{ToolError, ToolResult};
use crate::models::tool::ToolSpec;

pub const COINGECKO_HOST: &str = "https://api.coingecko.com";
pub const DEFAULT_PRICE_TIMEOUT: Duration = Duration::from_secs(10);

/// Names and tickers users type, mapped to CoinGecko ids. Order matters: when
/// scanning free text the first entry found wins.
pub const COIN_ALIASES: [(&str, &str); 10] = [
    ("bitcoin", "bitcoin"),
    ("btc", "bitcoin"),
    ("ethereum", "ethereum"),
    ("eth", "ethereum"),
    ("dogecoin", "dogecoin"),
    ("doge", "dogecoin"),
    ("cardano", "cardano"),
    ("ada", "cardano"),
    ("polkadot", "polkadot"),
    ("dot", "polkadot"),
];

/// First coin whose alias occurs anywhere in `text` (already lower-cased)
pub fn find_coin(text: &str) -> Option<&'static str> {
    COIN_ALIASES
        .iter()
        .find(|(alias, _)| text.contains(alias))
        .map(|(_, id)| *id)
}

/// Turn a coin name or ticker into an id; unknown names pass through lower-cased
pub fn resolve_coin(identifier: &str) -> String {
    let identifier = identifier.trim().to_lowercase();
    COIN_ALIASES
        .iter()
        .find(|(alias, _)| *alias == identifier)
        .map(|(_, id)| id.to_string())
        .unwrap_or(identifier)
}

/// Normalized market data for one coin, whatever upstream produced it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CryptoQuote {
    pub name: String,
    pub symbol: String,
    pub price: f64,
    #[serde(rename = "change24h")]
    pub change_24h: Option<f64>,
}

/// Where `getCryptoPrice` gets its numbers from
#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn quote(&self, coin_id: &str) -> ToolResult<CryptoQuote>;
}

#[derive(Debug, Deserialize)]
struct MarketEntry {
    name: String,
    symbol: String,
    current_price: Option<f64>,
    price_change_percentage_24h: Option<f64>,
}

/// CoinGecko `coins/markets` client, priced in USD
pub struct CoinGecko {
    client: Client,
    host: String,
    timeout: Duration,
}

impl CoinGecko {
    pub fn new<S: Into<String>>(host: S, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            host: host.into(),
            timeout,
        })
    }

    fn request_error(&self, err: reqwest::Error) -> ToolError {
        if err.is_timeout() {
            ToolError::Timeout(self.timeout.as_secs())
        } else {
            ToolError::ExecutionError(format!("price request failed: {err}"))
        }
    }
}

#[async_trait]
impl PriceSource for CoinGecko {
    async fn quote(&self, coin_id: &str) -> ToolResult<CryptoQuote> {
        let url = format!(
            "{}/api/v3/coins/markets",
            self.host.trim_end_matches('/')
        );
        tracing::debug!(coin = coin_id, "fetching crypto price");

        let response = self
            .client
            .get(&url)
            .query(&[("vs_currency", "usd"), ("ids", coin_id)])
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ToolError::ExecutionError(format!(
                "price API returned {status}"
            )));
        }

        let entries: Vec<MarketEntry> = response.json().await.map_err(|e| {
            if e.is_timeout() {
                ToolError::Timeout(self.timeout.as_secs())
            } else {
                ToolError::ExecutionError(format!("malformed price data: {e}"))
            }
        })?;

        let entry = entries.into_iter().next().ok_or_else(|| {
            ToolError::ExecutionError(format!("no market data for '{coin_id}'"))
        })?;
        let price = entry.current_price.ok_or_else(|| {
            ToolError::ExecutionError(format!("no current price for '{coin_id}'"))
        })?;

        Ok(CryptoQuote {
            name: entry.name,
            symbol: entry.symbol.to_uppercase(),
            price,
            change_24h: entry.price_change_percentage_24h,
        })
    }
}

pub struct GetCryptoPriceTool {
    spec: ToolSpec,
    prices: Arc<dyn PriceSource>,
}

impl GetCryptoPriceTool {
    pub fn new(prices: Arc<dyn PriceSource>) -> Self {
        Self {
            spec: ToolSpec::new(
                BuiltinTool::GetCryptoPrice.name(),
                "Get the current USD price and 24h change of a cryptocurrency like bitcoin.",
                json!({
                    "type": "object",
                    "properties": {
                        "coin": {
                            "type": "string",
                            "description": "Cryptocurrency id or ticker, e.g. bitcoin or btc"
                        }
                    },
                    "required": ["coin"]
                }),
            ),
            prices,
        }
    }
}

#[async_trait]
impl Tool for GetCryptoPriceTool {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn call(&self, arguments: Value) -> ToolResult<Value> {
        let name = &self.spec.name;
        let coin = argument(name, &arguments, "coin")?
            .as_str()
            .filter(|coin| !coin.trim().is_empty())
            .ok_or_else(|| ToolError::InvalidParameters(format!("{name} expects a coin name")))?;

        let quote = self.prices.quote(&resolve_coin(coin)).await?;
        serde_json::to_value(quote).map_err(|e| ToolError::ExecutionError(e.to_string()))
    }
}
