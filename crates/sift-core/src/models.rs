//! Domain types shared across the classification pipeline

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One sample row from an export, keyed by its source column names.
pub type SampleRow = serde_json::Map<String, serde_json::Value>;

/// Canonical trade fields the column mapping targets.
///
/// The fallback classifier is asked to map each of these (where present in
/// the export) to the source header that carries it.
pub const CANONICAL_FIELDS: &[&str] = &[
    "timestamp",
    "market",
    "side",
    "price",
    "quantity",
    "fee",
    "realized_pnl",
];

/// Whether an export is a spot trade ledger or a derivatives ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LedgerType {
    Spot,
    Derivatives,
}

impl LedgerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LedgerType::Spot => "spot",
            LedgerType::Derivatives => "derivatives",
        }
    }

    /// Parse a ledger type from fallback output (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "spot" => Some(LedgerType::Spot),
            "derivatives" => Some(LedgerType::Derivatives),
            _ => None,
        }
    }
}

/// Which path produced the final decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecidedBy {
    /// Heuristic alone (no column mapping available)
    Heuristic,
    /// Fallback alone (heuristic had no decision)
    Fallback,
    /// Heuristic source/type with fallback column mapping
    Hybrid,
}

/// Final classification of one export
///
/// Immutable once produced; this is the value stored in the response cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    /// Which exchange/broker produced the export (e.g. "binance")
    pub source_system: String,
    pub ledger_type: LedgerType,
    /// Calibrated trust in the decision, in [0, 1]
    pub confidence: f64,
    /// Canonical field name -> source header name
    pub column_mapping: BTreeMap<String, String>,
    pub decided_by: DecidedBy,
}

/// Inbound classification request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationRequest {
    /// Column headers exactly as they appear in the export
    pub headers: Vec<String>,
    /// Optional sample rows to give the fallback classifier more signal
    #[serde(default)]
    pub sample_rows: Vec<SampleRow>,
}

/// Classification result plus cache provenance
#[derive(Debug, Clone, Serialize)]
pub struct ClassificationOutcome {
    #[serde(flatten)]
    pub result: ClassificationResult,
    /// True when the result was served from the response cache
    pub cached: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ledger_type_parse() {
        assert_eq!(LedgerType::parse("spot"), Some(LedgerType::Spot));
        assert_eq!(
            LedgerType::parse(" Derivatives "),
            Some(LedgerType::Derivatives)
        );
        assert_eq!(LedgerType::parse("margin"), None);
    }

    #[test]
    fn test_ledger_type_serde_lowercase() {
        let json = serde_json::to_string(&LedgerType::Derivatives).unwrap();
        assert_eq!(json, "\"derivatives\"");
        let parsed: LedgerType = serde_json::from_str("\"spot\"").unwrap();
        assert_eq!(parsed, LedgerType::Spot);
    }

    #[test]
    fn test_outcome_flattens_result() {
        let outcome = ClassificationOutcome {
            result: ClassificationResult {
                source_system: "binance".into(),
                ledger_type: LedgerType::Spot,
                confidence: 0.85,
                column_mapping: BTreeMap::new(),
                decided_by: DecidedBy::Hybrid,
            },
            cached: true,
        };
        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value["source_system"], "binance");
        assert_eq!(value["cached"], true);
    }
}
