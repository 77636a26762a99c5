//! Header-signature rules for known exchange export formats
//!
//! Each rule is a pure predicate over the normalized header set plus a fixed
//! (source_system, ledger_type, confidence) triple. Rules are evaluated in
//! table order and the first match wins, so distinctive signatures must be
//! listed before generic ones — a rare column like `income_type` decides
//! before a loose pair like `pair`+`executed` gets a chance to.

use std::collections::HashSet;

use tracing::debug;

use crate::models::LedgerType;

/// A heuristic decision: exchange and ledger type, but no column mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct HeuristicDecision {
    pub source_system: &'static str,
    pub ledger_type: LedgerType,
    /// Fixed per rule, reflecting calibrated trust in the signature
    pub confidence: f64,
}

/// One signature rule: matches when every `requires` header is present in the
/// normalized set and none of the `excludes` headers are.
#[derive(Debug)]
pub struct SignatureRule {
    pub name: &'static str,
    pub requires: &'static [&'static str],
    pub excludes: &'static [&'static str],
    pub source_system: &'static str,
    pub ledger_type: LedgerType,
    pub confidence: f64,
}

/// Ordered rule table. Order is the priority: first match wins.
pub const SIGNATURE_RULES: &[SignatureRule] = &[
    // Binance futures income history: Date(UTC),income_type,Asset,Amount,Symbol
    SignatureRule {
        name: "binance_futures_income",
        requires: &["income_type"],
        excludes: &[],
        source_system: "binance",
        ledger_type: LedgerType::Derivatives,
        confidence: 0.95,
    },
    // Bybit closed P&L export: Symbol,Closed P&L,Qty,Exit Price,...
    SignatureRule {
        name: "bybit_closed_pnl",
        requires: &["closed p&l", "symbol"],
        excludes: &[],
        source_system: "bybit",
        ledger_type: LedgerType::Derivatives,
        confidence: 0.92,
    },
    // Binance futures trade history: Date(UTC),Symbol,Side,Price,Quantity,
    // Amount,Fee,Realized Profit
    SignatureRule {
        name: "binance_futures_trades",
        requires: &["realized profit", "symbol"],
        excludes: &[],
        source_system: "binance",
        ledger_type: LedgerType::Derivatives,
        confidence: 0.90,
    },
    // Kraken ledger export: txid,refid,time,type,subtype,aclass,asset,amount,
    // fee,balance
    SignatureRule {
        name: "kraken_ledger",
        requires: &["txid", "refid"],
        excludes: &[],
        source_system: "kraken",
        ledger_type: LedgerType::Spot,
        confidence: 0.90,
    },
    // Coinbase transaction report: Timestamp,Transaction Type,Asset,
    // Quantity Transacted,...
    SignatureRule {
        name: "coinbase_transactions",
        requires: &["asset", "transaction type"],
        excludes: &[],
        source_system: "coinbase",
        ledger_type: LedgerType::Spot,
        confidence: 0.88,
    },
    // Binance spot trade export: Date(UTC),Pair,Side,Price,Executed,Amount,Fee
    // "type" excluded: a Type column means a Coinbase-style ledger instead
    SignatureRule {
        name: "binance_spot_trades",
        requires: &["pair", "executed"],
        excludes: &["type"],
        source_system: "binance",
        ledger_type: LedgerType::Spot,
        confidence: 0.85,
    },
];

/// Normalized header set: trimmed, lowercased, deduplicated.
struct HeaderSet(HashSet<String>);

impl HeaderSet {
    fn new(headers: &[String]) -> Self {
        Self(
            headers
                .iter()
                .map(|h| h.trim().to_lowercase())
                .filter(|h| !h.is_empty())
                .collect(),
        )
    }

    fn has(&self, name: &str) -> bool {
        self.0.contains(name)
    }
}

impl SignatureRule {
    fn matches(&self, set: &HeaderSet) -> bool {
        self.requires.iter().all(|h| set.has(h)) && !self.excludes.iter().any(|h| set.has(h))
    }
}

/// Classify a header list against the signature table.
///
/// Returns the first matching rule's fixed decision, or `None` when no
/// signature is recognized and the pipeline must fall through to the
/// fallback classifier.
pub fn classify_headers(headers: &[String]) -> Option<HeuristicDecision> {
    let set = HeaderSet::new(headers);

    for rule in SIGNATURE_RULES {
        if rule.matches(&set) {
            debug!(
                rule = rule.name,
                source_system = rule.source_system,
                ledger_type = rule.ledger_type.as_str(),
                confidence = rule.confidence,
                "Header signature matched"
            );
            return Some(HeuristicDecision {
                source_system: rule.source_system,
                ledger_type: rule.ledger_type,
                confidence: rule.confidence,
            });
        }
    }

    None
}
