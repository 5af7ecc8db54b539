//! Offline fallback that answers from keywords instead of a hosted model.
//!
//! The matcher only understands the three built-in tools and runs them through
//! the same [`ToolRegistry`] as the model-driven agent.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{json, Value};

use crate::errors::ToolError;
use crate::models::message::Turn;
use crate::models::transcript::Transcript;
use crate::tools::crypto::{find_coin, CryptoQuote};
use crate::tools::{BuiltinTool, ToolRegistry};

pub const HELP_MESSAGE: &str = "Hello! I'm AgentVinod. I can help you with:\n\
    - Math calculations (e.g., 'What is 25 + 5?')\n\
    - Prime number checks (e.g., 'Is 17 prime?')\n\
    - Cryptocurrency prices (e.g., 'bitcoin price', 'ethereum price')!";

pub const CRYPTO_HELP_MESSAGE: &str = "I can help with cryptocurrency prices! Try asking about specific coins like 'bitcoin price', 'ethereum price', or 'dogecoin price'.";

const PRICE_UNAVAILABLE: &str = "Sorry, I couldn't fetch the price for that cryptocurrency.";
const PRICE_ERROR: &str = "Sorry, there was an error fetching the cryptocurrency price.";

const CRYPTO_KEYWORDS: [&str; 6] = ["bitcoin", "crypto", "price", "ethereum", "btc", "eth"];
const SUM_KEYWORDS: [&str; 5] = ["sum", "add", "+", "plus", "calculate"];

lazy_static! {
    static ref NUMBER: Regex = Regex::new(r"\d+").unwrap();
}

/// What a message is asking for, decided by keywords alone
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    /// A price question; `None` when no known coin was named
    CryptoPrice(Option<&'static str>),
    Prime(i64),
    Sum(i64, i64),
    Help,
}

/// Runs of digits in order of appearance. A run too large for `i64` ends the scan.
fn numbers(text: &str) -> Vec<i64> {
    NUMBER
        .find_iter(text)
        .map_while(|m| m.as_str().parse::<i64>().ok())
        .collect()
}

/// Crypto beats prime, prime beats sum, and anything else gets the help text.
pub fn classify(message: &str) -> Intent {
    let text = message.to_lowercase();

    if CRYPTO_KEYWORDS.iter().any(|k| text.contains(k)) {
        return Intent::CryptoPrice(find_coin(&text));
    }

    let numbers = numbers(&text);

    if text.contains("prime") {
        if let Some(&n) = numbers.first() {
            return Intent::Prime(n);
        }
    }

    let wants_sum = SUM_KEYWORDS.iter().any(|k| text.contains(k))
        || (text.contains("what is") && numbers.len() >= 2);
    if wants_sum && !text.contains("price") && !text.contains("crypto") {
        if let [a, b, ..] = numbers[..] {
            return Intent::Sum(a, b);
        }
    }

    Intent::Help
}

/// Format a USD amount the way a price ticker does: thousands separators and
/// at most three decimals, trailing zeros dropped.
pub fn format_usd(amount: f64) -> String {
    let fixed = format!("{:.3}", amount.abs());
    let (whole, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let fraction = fraction.trim_end_matches('0');

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let rounds_to_zero = fixed.chars().all(|c| c == '0' || c == '.');
    let sign = if amount < 0.0 && !rounds_to_zero { "-" } else { "" };
    if fraction.is_empty() {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped}.{fraction}")
    }
}

fn format_quote(quote: &CryptoQuote) -> String {
    let price = format_usd(quote.price);
    match quote.change_24h {
        Some(change) if change > 0.0 => format!(
            "💰 {} ({}): ${} (+{:.2}% 24h)",
            quote.name, quote.symbol, price, change
        ),
        Some(change) => format!(
            "💰 {} ({}): ${} ({:.2}% 24h)",
            quote.name, quote.symbol, price, change
        ),
        None => format!("💰 {} ({}): ${}", quote.name, quote.symbol, price),
    }
}

/// Keyword-driven agent sharing the tool registry with the model-driven one
pub struct KeywordAgent {
    registry: ToolRegistry,
}

impl KeywordAgent {
    pub fn new(registry: ToolRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Answer one message and record the exchange as a user turn and a model turn
    pub async fn reply(&self, transcript: &mut Transcript, message: &str) -> String {
        let answer = self.respond(message).await;
        transcript.push_user_text(message);
        transcript.push(Turn::model().with_text(answer.clone()));
        answer
    }

    pub async fn respond(&self, message: &str) -> String {
        let intent = classify(message);
        tracing::debug!(?intent, "classified message");

        match intent {
            Intent::CryptoPrice(None) => CRYPTO_HELP_MESSAGE.to_string(),
            Intent::CryptoPrice(Some(coin)) => self.price(coin).await,
            Intent::Prime(n) => match self.run(BuiltinTool::IsPrime, json!({ "n": n })).await {
                Ok(Value::Bool(true)) => format!("{n} is a prime number."),
                Ok(Value::Bool(false)) => format!("{n} is not a prime number."),
                _ => HELP_MESSAGE.to_string(),
            },
            Intent::Sum(a, b) => match self.run(BuiltinTool::Sum, json!({ "a": a, "b": b })).await {
                Ok(total) => format!("The sum of {a} and {b} is {total}."),
                Err(_) => HELP_MESSAGE.to_string(),
            },
            Intent::Help => HELP_MESSAGE.to_string(),
        }
    }

    async fn price(&self, coin: &str) -> String {
        let outcome = self
            .run(BuiltinTool::GetCryptoPrice, json!({ "coin": coin }))
            .await
            .and_then(|value| {
                serde_json::from_value::<CryptoQuote>(value)
                    .map_err(|e| ToolError::ExecutionError(e.to_string()))
            });

        match outcome {
            Ok(quote) => format_quote(&quote),
            Err(ToolError::Timeout(_)) => PRICE_ERROR.to_string(),
            Err(err) => {
                tracing::info!(coin, error = %err, "price lookup failed");
                PRICE_UNAVAILABLE.to_string()
            }
        }
    }

    async fn run(&self, tool: BuiltinTool, arguments: Value) -> Result<Value, ToolError> {
        self.registry.invoke(tool.name(), arguments).await
    }
}
