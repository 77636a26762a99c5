//! Sift Core Library
//!
//! Shared functionality for the Sift ledger-export classifier:
//! - Header fingerprinting and content-hash cache keys
//! - Signature-rule table for known exchange export formats
//! - Pluggable local AI backends (Ollama, mock) for fallback classification
//! - Reconciliation of heuristic and fallback decisions
//! - Multi-strategy TTL response cache shared by all pipelines
//! - CSV export preview reading
//! - Insight and report-summary pipelines built on the same cache

pub mod ai;
pub mod cache;
pub mod error;
pub mod fallback;
pub mod fingerprint;
pub mod heuristics;
pub mod insights;
pub mod models;
pub mod pipeline;
pub mod preview;
pub mod reconcile;

pub use ai::{AIClient, CompletionBackend, MockBackend, OllamaBackend, RawClassification, SourceHint};
pub use cache::{CacheKey, CacheStats, ResponseCache, Strategy, StrategyConfig};
pub use error::{Error, Result};
pub use fallback::{FallbackClassifier, FallbackDecision, DEFAULT_FALLBACK_ATTEMPTS};
pub use fingerprint::{content_hash, fingerprint};
pub use heuristics::{classify_headers, HeuristicDecision, SignatureRule, SIGNATURE_RULES};
pub use insights::{ActivityDigest, DigestRequest, InsightEngine, ReportSummary};
pub use models::{
    ClassificationOutcome, ClassificationRequest, ClassificationResult, DecidedBy, LedgerType,
    SampleRow, CANONICAL_FIELDS,
};
pub use pipeline::ExportClassifier;
pub use preview::{read_export_preview, DEFAULT_PREVIEW_ROWS};
