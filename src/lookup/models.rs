// src/lookup/models.rs
#![allow(dead_code, non_snake_case)]
use serde::Deserialize;
use std::collections::HashMap;

/// DuckDuckGo Instant Answer response, reduced to the fields we surface.
/// Example: https://api.duckduckgo.com/?q=rust&format=json
#[derive(Debug, Deserialize)]
pub struct InstantAnswer {
    #[serde(default)]
    pub Abstract: String,
    #[serde(default)]
    pub AbstractText: String,
    #[serde(default)]
    pub AbstractSource: String,
    #[serde(default)]
    pub AbstractURL: String,
    #[serde(default)]
    pub Answer: String,
    #[serde(default)]
    pub AnswerType: String,
    #[serde(default)]
    pub Heading: String,
}

impl InstantAnswer {
    /// The best displayable snippet: abstract first, short answer second.
    pub fn best_snippet(&self) -> Option<String> {
        if !self.AbstractText.is_empty() {
            return Some(format!("Поиск: {}", self.AbstractText));
        }
        if !self.Abstract.is_empty() {
            return Some(format!("Поиск: {}", self.Abstract));
        }
        if !self.Answer.is_empty() {
            return Some(format!("Ответ: {}", self.Answer));
        }
        None
    }
}

/// CoinGecko simple-price response: coin id -> currency -> price.
/// Example: https://api.coingecko.com/api/v3/simple/price?ids=bitcoin&vs_currencies=rub
pub type SimplePrice = HashMap<String, HashMap<String, f64>>;

/// exchangerate-api latest-rates response.
/// Example: https://api.exchangerate-api.com/v4/latest/USD
#[derive(Debug, Deserialize)]
pub struct ExchangeRates {
    pub base: String,
    #[serde(default)]
    pub date: String,
    pub rates: HashMap<String, f64>,
}
