// src/utils/error.rs
#![allow(dead_code)]
use thiserror::Error;

// Specific error types for the I/O-facing parts of the application.
// The extraction and intent modules are total functions over strings and
// define no errors of their own.
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Network request failed: {0}")]
    Network(#[from] reqwest::Error), // Automatically convert reqwest errors

    #[error("HTTP error: {0}")]
    Http(reqwest::StatusCode), // e.g., 404 Not Found, 429 Too Many Requests

    #[error("Failed to parse lookup response: {0}")]
    Parse(String),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Refusing to write outside the project directory: {0}")]
    UnsafePath(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error), // Automatically convert IO errors

    #[error("Lookup failed: {0}")]
    Search(#[from] SearchError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Data processing failed: {0}")]
    Processing(String),
}
