// src/lookup/client.rs
//
// Live lookups for "fresh data" chat queries: a few special-cased public
// APIs (crypto price, weather, currency conversion, city time) with the
// DuckDuckGo Instant Answer API as the general fallback. Every handler is
// best-effort; a failed lookup falls through to the next one rather than
// surfacing an error to the chat flow.

// --- Imports ---
use crate::lookup::models::{ExchangeRates, InstantAnswer, SimplePrice};
use crate::utils::error::SearchError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::time::Duration;

const LOOKUP_USER_AGENT: &str = "site_extractor/0.1 lookup client";
const LOOKUP_TIMEOUT_SECS: u64 = 5;
// Public APIs, be polite between consecutive lookups in one pipeline run.
const LOOKUP_REQUEST_DELAY_MS: u64 = 150;

// --- Trigger Patterns (Lazy Static) ---
static BITCOIN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(биткоин\w*|биткойн\w*|bitcoin|btc)\b").expect("Failed to compile BITCOIN_RE")
});

static WEATHER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(погода|weather)\b.*?\b(в|in)\s+([\wа-яё\- ]+)")
        .expect("Failed to compile WEATHER_RE")
});

static CURRENCY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(курс|exchange)\b.*?\b(\d+)\s*([a-z]{3})\s*(?:в|to)\s*([a-z]{3})")
        .expect("Failed to compile CURRENCY_RE")
});

static TIME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(время|time)\b.*?\b(в|in)\s+([\wа-яё\- ]+)")
        .expect("Failed to compile TIME_RE")
});

/// Cities we can answer time queries for without a geocoder.
const CITY_TIMEZONES: &[(&str, &str)] = &[
    ("москва", "Europe/Moscow"),
    ("moscow", "Europe/Moscow"),
    ("лондон", "Europe/London"),
    ("london", "Europe/London"),
    ("нью-йорк", "America/New_York"),
    ("new york", "America/New_York"),
    ("токио", "Asia/Tokyo"),
    ("tokyo", "Asia/Tokyo"),
];

/// Creates the reqwest client shared by one lookup pipeline run.
fn build_lookup_client() -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .user_agent(LOOKUP_USER_AGENT)
        .timeout(Duration::from_secs(LOOKUP_TIMEOUT_SECS))
        .build()
}

async fn throttle() {
    tokio::time::sleep(Duration::from_millis(LOOKUP_REQUEST_DELAY_MS)).await;
}

/// Fetches the current bitcoin price in RUB from CoinGecko.
pub async fn bitcoin_price_rub(client: &reqwest::Client) -> Result<Option<f64>, SearchError> {
    throttle().await;
    let response = client
        .get("https://api.coingecko.com/api/v3/simple/price")
        .query(&[("ids", "bitcoin"), ("vs_currencies", "rub")])
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        tracing::warn!("CoinGecko returned HTTP {}", status);
        return Err(SearchError::Http(status));
    }

    let prices: SimplePrice = response.json().await?;
    Ok(prices.get("bitcoin").and_then(|p| p.get("rub")).copied())
}

/// Fetches a one-line weather summary for a city from wttr.in.
pub async fn weather_line(
    client: &reqwest::Client,
    city: &str,
) -> Result<Option<String>, SearchError> {
    throttle().await;
    let url = format!("https://wttr.in/{}", city);
    let response = client
        .get(&url)
        .query(&[("format", "%C %t %h %w")])
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        tracing::warn!("wttr.in returned HTTP {} for {}", status, city);
        return Err(SearchError::Http(status));
    }

    let line = response.text().await?.trim().to_string();
    // wttr.in reports unknown locations with a "Sorry" page, not a 404.
    if line.is_empty() || line.starts_with("Sorry") {
        return Ok(None);
    }
    Ok(Some(line))
}

/// Converts `amount` between two currency codes using exchangerate-api.
pub async fn convert_currency(
    client: &reqwest::Client,
    amount: f64,
    from: &str,
    to: &str,
) -> Result<Option<f64>, SearchError> {
    throttle().await;
    let url = format!(
        "https://api.exchangerate-api.com/v4/latest/{}",
        from.to_uppercase()
    );
    let response = client.get(&url).send().await?;

    let status = response.status();
    if !status.is_success() {
        tracing::warn!("exchangerate-api returned HTTP {} for {}", status, from);
        return Err(SearchError::Http(status));
    }

    let rates: ExchangeRates = response.json().await?;
    Ok(rates.rates.get(&to.to_uppercase()).map(|rate| amount * rate))
}

/// Current wall-clock time for a known city. Purely local, no network.
pub fn local_time_answer(city: &str) -> Option<String> {
    let key = city.trim().to_lowercase();
    let tz_name = CITY_TIMEZONES
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, tz)| *tz)?;

    let tz: chrono_tz::Tz = match tz_name.parse() {
        Ok(tz) => tz,
        Err(_) => {
            tracing::warn!("Unparseable timezone name '{}' for city '{}'", tz_name, city);
            return None;
        }
    };

    let now = chrono::Utc::now().with_timezone(&tz);
    Some(format!("Время в {}: {}", city.trim(), now.format("%H:%M:%S %Z")))
}

/// Queries the DuckDuckGo Instant Answer API and returns the best snippet.
pub async fn instant_answer(
    client: &reqwest::Client,
    query: &str,
) -> Result<Option<String>, SearchError> {
    throttle().await;
    let response = client
        .get("https://api.duckduckgo.com/")
        .query(&[
            ("q", query),
            ("format", "json"),
            ("no_html", "1"),
            ("skip_disambig", "1"),
        ])
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        tracing::warn!("DuckDuckGo returned HTTP {}", status);
        return Err(SearchError::Http(status));
    }

    let answer: InstantAnswer = response.json().await?;
    Ok(answer.best_snippet())
}

/// Runs the full lookup pipeline for a chat message: one shared client, each
/// special handler fires only when its trigger pattern matches, failures fall
/// through, and DuckDuckGo is tried last. `None` means "nothing useful
/// found", never an error.
pub async fn quick_answer(message: &str, search_query: &str) -> Option<String> {
    let client = match build_lookup_client() {
        Ok(client) => client,
        Err(e) => {
            tracing::warn!("Failed to build lookup client: {}", e);
            return None;
        }
    };

    let message_lower = message.to_lowercase();

    if BITCOIN_RE.is_match(&message_lower) {
        match bitcoin_price_rub(&client).await {
            Ok(Some(price)) => {
                return Some(format!("Текущая цена биткоина: {:.0} RUB", price));
            }
            Ok(None) => tracing::debug!("CoinGecko had no RUB price for bitcoin"),
            Err(e) => tracing::warn!("Bitcoin price lookup failed: {}", e),
        }
    }

    if let Some(caps) = WEATHER_RE.captures(&message_lower) {
        let city = caps[3].trim().to_string();
        match weather_line(&client, &city).await {
            Ok(Some(line)) => return Some(format!("Погода в {}: {}", city, line)),
            Ok(None) => tracing::debug!("No weather data for '{}'", city),
            Err(e) => tracing::warn!("Weather lookup failed for '{}': {}", city, e),
        }
    }

    if let Some(caps) = CURRENCY_RE.captures(&message_lower) {
        let from = caps[3].to_string();
        let to = caps[4].to_string();
        if let Ok(amount) = caps[2].parse::<f64>() {
            match convert_currency(&client, amount, &from, &to).await {
                Ok(Some(result)) => {
                    return Some(format!(
                        "{} {} = {:.2} {}",
                        amount,
                        from.to_uppercase(),
                        result,
                        to.to_uppercase()
                    ));
                }
                Ok(None) => tracing::debug!("No rate for {} -> {}", from, to),
                Err(e) => tracing::warn!("Currency conversion failed: {}", e),
            }
        }
    }

    if let Some(caps) = TIME_RE.captures(&message_lower) {
        if let Some(answer) = local_time_answer(&caps[3]) {
            return Some(answer);
        }
    }

    match instant_answer(&client, search_query).await {
        Ok(snippet) => snippet,
        Err(e) => {
            tracing::warn!("Instant answer lookup failed: {}", e);
            None
        }
    }
}
