//! AI backend request/response types
//!
//! These types are backend-agnostic and used across all implementations.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::LedgerType;

/// Advisory hint passed to the fallback classifier when the heuristic already
/// decided the exchange/type. The fallback is still asked for the full column
/// mapping; the hint only steers it.
#[derive(Debug, Clone)]
pub struct SourceHint {
    pub source_system: String,
    pub ledger_type: LedgerType,
}

/// Raw classification reply as the completion service produced it.
///
/// Every field is optional on the wire; shape validation happens in the
/// fallback classifier, which rejects rather than coerces incomplete replies.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawClassification {
    #[serde(default)]
    pub source_system: Option<String>,
    #[serde(default)]
    pub ledger_type: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub column_mapping: Option<BTreeMap<String, String>>,
}
