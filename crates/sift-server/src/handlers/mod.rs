//! HTTP request handlers

mod cache;
mod classify;
mod health;
mod insights;

pub use cache::{cache_clear, cache_stats};
pub use classify::{classify_export, classify_file};
pub use health::health;
pub use insights::{daily_digest, explore, summarize_report};
