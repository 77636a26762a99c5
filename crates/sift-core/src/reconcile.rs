//! Merging heuristic and fallback decisions into a final classification

use std::collections::BTreeMap;

use crate::fallback::FallbackDecision;
use crate::heuristics::HeuristicDecision;
use crate::models::{ClassificationResult, DecidedBy};

/// Merge the two classification paths.
///
/// The heuristic, when it decided, wins the source_system/ledger_type call:
/// it matched on a distinctive, unambiguous signature. The column mapping
/// always comes from the fallback, and the confidence is the larger of the
/// two. Without a heuristic decision, the fallback's result is used
/// unchanged.
pub fn reconcile(
    heuristic: Option<&HeuristicDecision>,
    fallback: FallbackDecision,
) -> ClassificationResult {
    match heuristic {
        Some(h) => ClassificationResult {
            source_system: h.source_system.to_string(),
            ledger_type: h.ledger_type,
            confidence: h.confidence.max(fallback.confidence),
            column_mapping: fallback.column_mapping,
            decided_by: DecidedBy::Hybrid,
        },
        None => ClassificationResult {
            source_system: fallback.source_system,
            ledger_type: fallback.ledger_type,
            confidence: fallback.confidence,
            column_mapping: fallback.column_mapping,
            decided_by: DecidedBy::Fallback,
        },
    }
}

/// Degenerate case: exchange/type alone, no mapping available.
///
/// Not reached by the default pipeline unless the fallback backend is not
/// configured; kept as part of the contract so the heuristic path stays
/// testable on its own.
pub fn heuristic_only(heuristic: &HeuristicDecision) -> ClassificationResult {
    ClassificationResult {
        source_system: heuristic.source_system.to_string(),
        ledger_type: heuristic.ledger_type,
        confidence: heuristic.confidence,
        column_mapping: BTreeMap::new(),
        decided_by: DecidedBy::Heuristic,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LedgerType;

    fn fallback_decision() -> FallbackDecision {
        FallbackDecision {
            source_system: "coinbase".to_string(),
            ledger_type: LedgerType::Spot,
            confidence: 0.55,
            column_mapping: BTreeMap::from([("market".to_string(), "Pair".to_string())]),
        }
    }

    #[test]
    fn test_heuristic_wins_source_and_type() {
        let heuristic = HeuristicDecision {
            source_system: "binance",
            ledger_type: LedgerType::Derivatives,
            confidence: 0.95,
        };

        let result = reconcile(Some(&heuristic), fallback_decision());
        assert_eq!(result.source_system, "binance");
        assert_eq!(result.ledger_type, LedgerType::Derivatives);
        assert_eq!(result.decided_by, DecidedBy::Hybrid);
        // Mapping still comes from the fallback
        assert_eq!(
            result.column_mapping.get("market").map(String::as_str),
            Some("Pair")
        );
    }

    #[test]
    fn test_confidence_is_max_of_both() {
        let heuristic = HeuristicDecision {
            source_system: "binance",
            ledger_type: LedgerType::Spot,
            confidence: 0.85,
        };

        let mut fallback = fallback_decision();
        fallback.confidence = 0.97;
        assert_eq!(reconcile(Some(&heuristic), fallback).confidence, 0.97);

        let mut fallback = fallback_decision();
        fallback.confidence = 0.40;
        assert_eq!(reconcile(Some(&heuristic), fallback).confidence, 0.85);
    }

    #[test]
    fn test_fallback_used_unchanged_without_heuristic() {
        let result = reconcile(None, fallback_decision());
        assert_eq!(result.source_system, "coinbase");
        assert_eq!(result.ledger_type, LedgerType::Spot);
        assert_eq!(result.confidence, 0.55);
        assert_eq!(result.decided_by, DecidedBy::Fallback);
    }

    #[test]
    fn test_heuristic_only_has_empty_mapping() {
        let heuristic = HeuristicDecision {
            source_system: "kraken",
            ledger_type: LedgerType::Spot,
            confidence: 0.90,
        };

        let result = heuristic_only(&heuristic);
        assert_eq!(result.decided_by, DecidedBy::Heuristic);
        assert!(result.column_mapping.is_empty());
    }
}
