// src/intent/query.rs
//
// Turns a chat utterance into an effective web-search query. Topic-specific
// rewrites come first (weather, rates, prices, news, rankings); everything
// else gets conversational filler stripped and punctuation normalized.

// --- Imports ---
use once_cell::sync::Lazy;
use regex::Regex;

// --- Regex Patterns (Lazy Static) ---
static WEATHER_CITY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)погод[аы]\s*(?:в|во)\s+([A-Za-zА-Яа-яёЁ\-\s]+)")
        .expect("Failed to compile WEATHER_CITY_RE")
});

// Cuts a captured city at the first punctuation or line break.
static CITY_CUT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\?\!\.,;:\n\r\t]").expect("Failed to compile CITY_CUT_RE")
});

static PRODUCT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:цена|стоит|купить|продажа)\s+(?:на\s+)?(.+?)(?:\?|$|\s+в|\s+на|\s+за)")
        .expect("Failed to compile PRODUCT_RE")
});

static NEWS_TOPIC_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:новости|что нового|последние|актуально)(?:\s+о|\s+про|\s+в)?\s*(.+?)(?:\?|$)")
        .expect("Failed to compile NEWS_TOPIC_RE")
});

static RANK_CATEGORY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:топ|рейтинг|лучший|популярный)\s+(.+?)(?:\?|$|\s+для|\s+на|\s+в)")
        .expect("Failed to compile RANK_CATEGORY_RE")
});

/// Conversational filler removed from generic queries before searching.
static STOP_PHRASE_RES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)найди\s*",
        r"(?i)поиск\s*",
        r"(?i)узнай\s*",
        r"(?i)проверь\s*",
        r"(?i)посмотри\s*",
        r"(?i)расскажи\s*про\s*",
        r"(?i)что\s*такое\s*",
        r"(?i)что\s*значит\s*",
        r"(?i)информация\s*о\s*",
        r"(?i)какая\s*погода\s*",
        r"(?i)сейчас\s*",
        r"(?i)сегодня\s*",
        r"(?i)последние\s*новости\s*о\s*",
        r"(?i)что\s*происходит\s*с\s*",
        r"(?i)как\s*дела\s*с\s*",
        r"(?i)статистика\s*по\s*",
        r"(?i)данные\s*о\s*",
        r"(?i)сколько\s*стоит\s*",
        r"(?i)где\s*купить\s*",
        r"(?i)мне\s*нужен\s*",
        r"(?i)я\s*хочу\s*узнать\s*",
    ]
    .iter()
    .filter_map(|pat| Regex::new(pat).ok())
    .collect()
});

static NON_WORD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\w\s]").expect("Failed to compile NON_WORD_RE"));

static MULTI_SPACE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("Failed to compile MULTI_SPACE_RE"));

// --- Query Building ---

/// Derives the query string the lookup step should search for.
pub fn build_search_query(message: &str) -> String {
    let message_lower = message.to_lowercase();

    // Weather gets a canonical form around the extracted city.
    if message_lower.contains("погод") {
        return match weather_city(message) {
            Some(city) => format!("погода {} сейчас температура прогноз на сегодня", city),
            None => "погода сейчас температура прогноз".to_string(),
        };
    }

    // Exchange rates.
    if ["курс", "валют", "доллар", "евро", "рубль", "bitcoin", "btc"]
        .iter()
        .any(|w| message_lower.contains(w))
    {
        if message_lower.contains("доллар") || message_lower.contains("usd") {
            return "курс доллара к рублю сегодня".to_string();
        } else if message_lower.contains("евро") || message_lower.contains("eur") {
            return "курс евро к рублю сегодня".to_string();
        } else if message_lower.contains("bitcoin") || message_lower.contains("btc") {
            return "курс биткоина к доллару сегодня цена".to_string();
        }
        return "курсы валют ЦБ РФ сегодня".to_string();
    }

    // Crypto beyond bitcoin.
    if ["крипто", "криптовалют", "ethereum", "eth"]
        .iter()
        .any(|w| message_lower.contains(w))
    {
        if message_lower.contains("ethereum") || message_lower.contains("eth") {
            return "курс ethereum к доллару сегодня цена".to_string();
        }
        return "курсы криптовалют сегодня биткоин ethereum".to_string();
    }

    // Prices: pull the product name out of the utterance.
    if ["цена", "стоит", "купить", "продажа"].iter().any(|w| message_lower.contains(w)) {
        if let Some(caps) = PRODUCT_RE.captures(&message_lower) {
            let product = caps[1].trim();
            return format!("{} цена стоимость купить где", product);
        }
    }

    // News: pull the topic.
    if ["новости", "что нового", "последние", "актуально"]
        .iter()
        .any(|w| message_lower.contains(w))
    {
        if let Some(caps) = NEWS_TOPIC_RE.captures(&message_lower) {
            let topic = caps[1].trim();
            return format!("{} новости последние актуально", topic);
        }
    }

    // Rankings: pull the category.
    if ["топ", "рейтинг", "лучший", "популярный"].iter().any(|w| message_lower.contains(w)) {
        if let Some(caps) = RANK_CATEGORY_RE.captures(&message_lower) {
            let category = caps[1].trim();
            return format!("{} топ рейтинг лучший популярный 2024", category);
        }
    }

    // Generic: strip filler, normalize, keep the substance.
    let mut query = message.to_string();
    for re in STOP_PHRASE_RES.iter() {
        query = re.replace_all(&query, "").into_owned();
    }
    let query = normalize(&query);

    // A one-word residue lost too much; search the cleaned original instead.
    if query.split_whitespace().count() < 2 {
        return normalize(message);
    }
    query
}

/// Extracts the city from a "погода в <город>" style utterance.
pub fn weather_city(message: &str) -> Option<String> {
    let caps = WEATHER_CITY_RE.captures(message)?;
    let raw = caps.get(1)?.as_str();
    let city = CITY_CUT_RE.split(raw).next().unwrap_or("").trim();
    if city.is_empty() {
        None
    } else {
        Some(city.to_string())
    }
}

fn normalize(text: &str) -> String {
    let depunctuated = NON_WORD_RE.replace_all(text, " ");
    MULTI_SPACE_RE.replace_all(&depunctuated, " ").trim().to_string()
}

// --- Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weather_query_includes_city() {
        assert_eq!(
            build_search_query("Какая погода в Москве"),
            "погода Москве сейчас температура прогноз на сегодня"
        );
    }

    #[test]
    fn weather_query_without_city_uses_generic_form() {
        assert_eq!(build_search_query("Какая сейчас погода?"), "погода сейчас температура прогноз");
    }

    #[test]
    fn city_is_extracted_and_cut_at_punctuation() {
        assert_eq!(weather_city("погода в Москве"), Some("Москве".to_string()));
        assert_eq!(weather_city("Погода во Владивостоке?"), Some("Владивостоке".to_string()));
        assert_eq!(weather_city("просто вопрос"), None);
    }

    #[test]
    fn dollar_rate_query_is_canonical() {
        assert_eq!(build_search_query("Курс доллара к рублю"), "курс доллара к рублю сегодня");
    }

    #[test]
    fn unspecified_currency_falls_back_to_cbr() {
        assert_eq!(build_search_query("Курс биткоина сегодня"), "курсы валют ЦБ РФ сегодня");
    }

    #[test]
    fn price_query_extracts_product() {
        assert_eq!(
            build_search_query("Сколько стоит iPhone 15?"),
            "iphone 15 цена стоимость купить где"
        );
    }

    #[test]
    fn news_query_extracts_topic() {
        assert_eq!(
            build_search_query("Новости о технологиях"),
            "технологиях новости последние актуально"
        );
    }

    #[test]
    fn ranking_query_extracts_category() {
        assert_eq!(
            build_search_query("Топ ресторанов в Москве"),
            "ресторанов топ рейтинг лучший популярный 2024"
        );
    }

    #[test]
    fn generic_query_strips_filler() {
        assert_eq!(
            build_search_query("Найди информацию про горные велосипеды"),
            "информацию про горные велосипеды"
        );
    }

    #[test]
    fn too_short_residue_falls_back_to_original() {
        // "что такое" is filler; stripping it leaves one word, so the
        // cleaned original message is searched instead.
        assert_eq!(build_search_query("Что такое полимер?"), "Что такое полимер");
    }
}
