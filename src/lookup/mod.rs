// src/lookup/mod.rs
pub mod client;
pub mod models;
