// src/intent/classifier.rs
//
// Heuristic search-intent classification for chat utterances. The keyword
// lists were tuned empirically against real user traffic and are load-bearing
// as-is; changing them changes product behavior, not code quality.

// --- Imports ---
use once_cell::sync::Lazy;
use regex::Regex;

// --- Keyword Lists ---

/// Utterances containing any of these always trigger a search: time-sensitive
/// words, currency/crypto names, imperative lookup verbs.
const SEARCH_KEYWORDS: &[&str] = &[
    "найди", "поиск", "актуальн", "новости", "сейчас", "сегодня",
    "последние", "тренд", "курс", "погода", "цены", "события",
    "что происходит", "статистика", "данные", "информация о",
    "что нового", "какая погода", "биткоин",
    "bitcoin", "btc", "криптовалют", "крипто", "ethereum",
    "доллар", "евро", "рубль", "валюта", "обмен", "exchange",
    "котировки", "котировка", "цена", "стоимость", "курс валют",
    "узнай", "проверь", "посмотри", "сколько стоит", "где купить",
    "рейтинг", "топ", "лучший", "популярный",
];

/// Phrases that pin the utterance to the present moment.
const CURRENT_INFO_PHRASES: &[&str] = &[
    "текущий", "теперь", "на данный момент", "в настоящее время",
    "последние новости", "свежие данные", "актуальные цены",
    "сегодняшний", "завтрашний", "на этой неделе", "в этом месяце",
];

/// Interrogative words and phrases.
const QUESTION_WORDS: &[&str] = &[
    "сколько", "какой", "где", "когда", "почему", "как", "кто",
    "что такое", "что значит", "как работает", "как использовать",
];

/// Topics whose answers go stale without a fresh lookup.
const SEARCH_TOPICS: &[&str] = &[
    "курс валют", "погода", "новости", "цены", "акции", "криптовалюта",
    "спорт", "политика", "экономика", "технологии", "наука",
    "здоровье", "медицина", "образование", "работа", "вакансии",
];

/// A question this short is assumed to want a fresh lookup.
const SHORT_QUESTION_MAX_TOKENS: usize = 8;

// --- Regex Patterns (Lazy Static) ---
static YEAR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(19|20)\d{2}\b").expect("Failed to compile YEAR_RE"));

// The ranking and price stems carry a \w* suffix so Cyrillic inflections
// ("лучшие", "популярные") match; a bare \b after the stem would reject them.
static RATING_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(топ|рейтинг\w*|лучш\w*|популярн\w*|самый)\b")
        .expect("Failed to compile RATING_RE")
});

static PRICE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(цена|стоимость|стоит|купить|продажа)\b")
        .expect("Failed to compile PRICE_RE")
});

// --- Data Structures ---

/// Which rule fired for a classified utterance, for logs and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    ExplicitKeyword,
    CurrentInfoPhrase,
    QuestionWithTopic,
    ShortQuestion,
    YearPattern,
    RatingPattern,
    PricePattern,
}

/// Outcome of search-intent classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchIntentSignal {
    pub search: bool,
    pub trigger: Option<Trigger>,
}

impl SearchIntentSignal {
    fn hit(trigger: Trigger) -> Self {
        Self { search: true, trigger: Some(trigger) }
    }

    fn miss() -> Self {
        Self { search: false, trigger: None }
    }
}

// --- Classification ---

/// Decides whether `message` should trigger a web search before the model
/// answers. Rules are evaluated in a fixed order, short-circuiting on the
/// first hit. Total over any input; the empty string classifies as no-search.
pub fn classify(message: &str) -> SearchIntentSignal {
    let message_lower = message.to_lowercase();

    // 1. Explicit search keywords.
    if SEARCH_KEYWORDS.iter().any(|k| message_lower.contains(k)) {
        return SearchIntentSignal::hit(Trigger::ExplicitKeyword);
    }

    // 2. Current-info phrases.
    if CURRENT_INFO_PHRASES.iter().any(|p| message_lower.contains(p)) {
        return SearchIntentSignal::hit(Trigger::CurrentInfoPhrase);
    }

    // 3. Question word together with a fresh-data topic.
    let has_question = QUESTION_WORDS.iter().any(|q| message_lower.contains(q));
    let has_topic = SEARCH_TOPICS.iter().any(|t| message_lower.contains(t));
    if has_question && has_topic {
        return SearchIntentSignal::hit(Trigger::QuestionWithTopic);
    }

    // 4. Short questions. Token count over explicit whitespace splitting.
    let token_count = message.split_whitespace().count();
    if token_count <= SHORT_QUESTION_MAX_TOKENS && has_question {
        return SearchIntentSignal::hit(Trigger::ShortQuestion);
    }

    // 5. Year, ranking, and price patterns.
    if YEAR_RE.is_match(&message_lower) {
        return SearchIntentSignal::hit(Trigger::YearPattern);
    }
    if RATING_RE.is_match(&message_lower) {
        return SearchIntentSignal::hit(Trigger::RatingPattern);
    }
    if PRICE_RE.is_match(&message_lower) {
        return SearchIntentSignal::hit(Trigger::PricePattern);
    }

    // 6. Nothing matched.
    SearchIntentSignal::miss()
}

/// Boolean shorthand for [`classify`].
pub fn should_search(message: &str) -> bool {
    classify(message).search
}

/// Whether the user is asking for a website to be built; routes the request
/// to the site-generation flow instead of plain chat.
pub fn wants_website(message: &str) -> bool {
    const WEBSITE_KEYWORDS: &[&str] = &[
        "создай сайт", "сделай сайт", "лендинг", "веб-сайт", "страницу",
        "сайт для", "сайт о", "дизайн сайта", "сайт компании", "сайт-визитка",
        "интернет-магазин", "портал", "блог", "сайт-одностраничник",
        "сайт с нуля", "web-сайт", "сайт на заказ", "сайт под ключ",
    ];

    let message_lower = message.to_lowercase();
    WEBSITE_KEYWORDS.iter().any(|k| message_lower.contains(k))
}

// --- Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_with_today_triggers_keyword() {
        let signal = classify("Курс биткоина сегодня");
        assert!(signal.search);
        assert_eq!(signal.trigger, Some(Trigger::ExplicitKeyword));
    }

    #[test]
    fn generic_tell_me_about_does_not_search() {
        assert!(!should_search("Расскажи про искусственный интеллект"));
    }

    #[test]
    fn empty_utterance_does_not_search() {
        let signal = classify("");
        assert!(!signal.search);
        assert_eq!(signal.trigger, None);
    }

    #[test]
    fn price_question_triggers() {
        assert!(should_search("Сколько стоит iPhone 15?"));
    }

    #[test]
    fn current_info_phrase_triggers() {
        let signal = classify("Что изменилось в законах в этом месяце?");
        assert!(signal.search);
        assert_eq!(signal.trigger, Some(Trigger::CurrentInfoPhrase));
    }

    #[test]
    fn question_plus_topic_triggers() {
        let signal = classify("Кто выиграл чемпионат, интересует спорт вообще говоря и всё такое прочее");
        assert!(signal.search);
        assert_eq!(signal.trigger, Some(Trigger::QuestionWithTopic));
    }

    #[test]
    fn short_question_triggers() {
        let signal = classify("Как приготовить борщ?");
        assert!(signal.search);
        assert_eq!(signal.trigger, Some(Trigger::ShortQuestion));
    }

    #[test]
    fn long_question_without_topic_does_not_short_circuit() {
        // Eleven tokens, a question word, no topic, no patterns.
        let signal = classify(
            "Почему в этой длинной фразе совершенно нет ни одного полезного слова",
        );
        assert!(!signal.search);
    }

    #[test]
    fn year_pattern_triggers() {
        let signal = classify("Фильмы вышедшие в 2024 году по мнению критиков");
        assert!(signal.search);
        assert_eq!(signal.trigger, Some(Trigger::YearPattern));
    }

    #[test]
    fn inflected_ranking_stem_triggers() {
        let signal = classify("Лучшие рестораны в СПб");
        assert!(signal.search);
        assert_eq!(signal.trigger, Some(Trigger::RatingPattern));
    }

    #[test]
    fn classification_matches_reference_utterances() {
        let expectations = [
            ("Какая погода в Москве сегодня?", true),
            ("Курс доллара к рублю", true),
            ("Расскажи про искусственный интеллект", false),
            ("Сколько стоит iPhone 15?", true),
            ("Что происходит в мире новостей?", true),
            ("Лучшие рестораны в СПб", true),
            ("Как приготовить борщ?", true),
            ("Курс биткоина сегодня", true),
            ("Новости технологий", true),
            ("Где купить квартиру в Москве?", true),
        ];

        for (message, expected) in expectations {
            assert_eq!(should_search(message), expected, "message: {message}");
        }
    }

    #[test]
    fn website_requests_are_detected() {
        assert!(wants_website("Создай сайт для кофейни"));
        assert!(wants_website("Нужен интернет-магазин"));
        assert!(!wants_website("Какая завтра погода?"));
    }
}
