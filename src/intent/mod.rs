// src/intent/mod.rs
pub mod classifier;
pub mod query;

// Re-export key intent types for convenience
#[allow(unused_imports)]
pub use classifier::{classify, should_search, wants_website, SearchIntentSignal, Trigger};
#[allow(unused_imports)]
pub use query::{build_search_query, weather_city};
