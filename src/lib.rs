#![deny(clippy::all)]
//! Newsforge: pick passages from a video transcript or free text, configure
//! tone and persona, and have an AI model draft an article from them.

pub mod article;
pub mod clipboard;
pub mod config;
pub mod credentials;
pub mod error;
pub mod preferences;
pub mod selection;
pub mod services;
pub mod steps;
pub mod storage;
pub mod transcript;
pub mod wizard;

// Re-export error types (used by the binary)
pub use error::*;
