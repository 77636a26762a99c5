//! Process-wide, multi-strategy, TTL-bounded response cache
//!
//! One in-process store shared by the classification pipeline and the other
//! cacheable pipelines (daily digests, report summaries). Each class of
//! cacheable computation is a statically enumerated [`Strategy`] with its own
//! TTL, enabled flag, and key-derivation constructor; keys are tagged with
//! their strategy so strategy-scoped clears never rely on string prefixes.
//!
//! Caching is an optimization, never a requirement: no operation here returns
//! an error. A disabled strategy, a poisoned lock, or a value that fails to
//! (de)serialize all degrade to "miss" / "no-op".
//!
//! `get`-then-compute-then-`set` is not atomic. Concurrent misses for the
//! same key each run the underlying computation and the last write wins;
//! classification is idempotent, so the duplicates only cost extra fallback
//! calls.

use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::fingerprint::{content_hash, fingerprint};

/// A named class of cacheable computation.
///
/// Strategies are enumerated at compile time and their configurations are
/// read-only for the process lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Export classification, keyed by header fingerprint
    Classification,
    /// Per-day activity digests, keyed by owner + day
    DailyDigest,
    /// Report summaries, keyed by content hash of the report payload
    ReportSummary,
    /// Free-form exploration answers: inherently request-unique, so this is
    /// a declared no-cache policy and always recomputes
    ExploreAnswer,
}

/// Read-only configuration for one strategy.
#[derive(Debug, Clone, Copy)]
pub struct StrategyConfig {
    pub ttl: Duration,
    pub enabled: bool,
}

impl StrategyConfig {
    /// A strategy caches only when enabled with a nonzero TTL.
    fn active(&self) -> bool {
        self.enabled && !self.ttl.is_zero()
    }
}

impl Strategy {
    pub const ALL: &'static [Strategy] = &[
        Strategy::Classification,
        Strategy::DailyDigest,
        Strategy::ReportSummary,
        Strategy::ExploreAnswer,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Classification => "classification",
            Strategy::DailyDigest => "daily_digest",
            Strategy::ReportSummary => "report_summary",
            Strategy::ExploreAnswer => "explore_answer",
        }
    }

    /// Resolve a strategy from its wire name (admin endpoints, CLI).
    pub fn from_name(name: &str) -> Option<Strategy> {
        Strategy::ALL.iter().copied().find(|s| s.name() == name)
    }

    pub fn config(&self) -> StrategyConfig {
        match self {
            Strategy::Classification => StrategyConfig {
                ttl: Duration::from_secs(12 * 60 * 60),
                enabled: true,
            },
            Strategy::DailyDigest => StrategyConfig {
                ttl: Duration::from_secs(6 * 60 * 60),
                enabled: true,
            },
            Strategy::ReportSummary => StrategyConfig {
                ttl: Duration::from_secs(24 * 60 * 60),
                enabled: true,
            },
            Strategy::ExploreAnswer => StrategyConfig {
                ttl: Duration::ZERO,
                enabled: false,
            },
        }
    }
}

/// A cache key tagged with the strategy that derived it.
///
/// Construction goes through the strategy-specific derivations below, each a
/// pure function of its arguments.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    strategy: Strategy,
    raw: String,
}

impl CacheKey {
    /// Classification key: order-independent header fingerprint.
    ///
    /// Returns `None` for an empty fingerprint — an empty header list carries
    /// no signal and must never become a cache key.
    pub fn classification(headers: &[String]) -> Option<CacheKey> {
        let raw = fingerprint(headers);
        if raw.is_empty() {
            return None;
        }
        Some(CacheKey {
            strategy: Strategy::Classification,
            raw,
        })
    }

    /// Daily digest key: composite owner + day.
    pub fn daily_digest(owner: &str, day: NaiveDate) -> CacheKey {
        CacheKey {
            strategy: Strategy::DailyDigest,
            raw: format!("{}:{}", owner.trim().to_lowercase(), day),
        }
    }

    /// Report summary key: content hash of the structured payload.
    pub fn report_summary(payload: &serde_json::Value) -> CacheKey {
        CacheKey {
            strategy: Strategy::ReportSummary,
            raw: content_hash(payload),
        }
    }

    /// Explore answer key. The strategy is disabled, so this key never hits;
    /// it exists so the pipeline shape stays uniform.
    pub fn explore_answer(question: &str) -> CacheKey {
        CacheKey {
            strategy: Strategy::ExploreAnswer,
            raw: fingerprint([question]),
        }
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }
}

/// One stored value. Owned exclusively by the cache.
struct CacheEntry {
    json: String,
    stored_at: Instant,
}

/// Cache statistics for observability.
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub total_entries: usize,
    pub per_strategy: BTreeMap<&'static str, usize>,
    /// Sum of serialized value and key sizes; an estimate, not an accounting
    pub approx_bytes: usize,
}

/// The shared response cache.
#[derive(Default)]
pub struct ResponseCache {
    entries: RwLock<HashMap<CacheKey, CacheEntry>>,
}

impl ResponseCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a value. Returns `None` for misses, disabled strategies, and
    /// expired entries; an expired entry is deleted on the way out so a stale
    /// value is never served even before the sweep runs.
    pub fn get<T: DeserializeOwned>(&self, key: &CacheKey) -> Option<T> {
        let config = key.strategy().config();
        if !config.active() {
            return None;
        }

        {
            let entries = self.entries.read().ok()?;
            let entry = entries.get(key)?;
            if entry.stored_at.elapsed() < config.ttl {
                debug!(strategy = key.strategy().name(), "Cache hit");
                return serde_json::from_str(&entry.json).ok();
            }
        }

        // Expired: delete lazily. Re-check under the write lock in case a
        // concurrent set replaced the entry since the read.
        if let Ok(mut entries) = self.entries.write() {
            if let Some(entry) = entries.get(key) {
                if entry.stored_at.elapsed() >= config.ttl {
                    entries.remove(key);
                    debug!(strategy = key.strategy().name(), "Expired cache entry dropped");
                }
            }
        }

        None
    }

    /// Store a value, unconditionally overwriting any existing entry under
    /// the same key (last write wins). No-op for disabled strategies and on
    /// serialization failure.
    pub fn set<T: Serialize>(&self, key: CacheKey, value: &T) {
        if !key.strategy().config().active() {
            return;
        }

        let json = match serde_json::to_string(value) {
            Ok(json) => json,
            Err(err) => {
                warn!(strategy = key.strategy().name(), error = %err, "Failed to serialize cache value");
                return;
            }
        };

        if let Ok(mut entries) = self.entries.write() {
            debug!(strategy = key.strategy().name(), "Cache store");
            entries.insert(
                key,
                CacheEntry {
                    json,
                    stored_at: Instant::now(),
                },
            );
        }
    }

    /// Remove entries, optionally restricted to one strategy's namespace.
    /// Returns the number of entries removed.
    pub fn clear(&self, strategy: Option<Strategy>) -> usize {
        let Ok(mut entries) = self.entries.write() else {
            return 0;
        };

        let before = entries.len();
        match strategy {
            None => entries.clear(),
            Some(target) => entries.retain(|key, _| key.strategy != target),
        }
        before - entries.len()
    }

    /// Remove every expired entry across all strategies. Called by the
    /// periodic sweep; the lazy check in `get` already guarantees stale
    /// entries are never served, so this only bounds memory growth from
    /// entries written once and never re-read.
    pub fn purge_expired(&self) -> usize {
        let Ok(mut entries) = self.entries.write() else {
            return 0;
        };

        let before = entries.len();
        entries.retain(|key, entry| entry.stored_at.elapsed() < key.strategy().config().ttl);
        let removed = before - entries.len();
        if removed > 0 {
            debug!(removed, "Swept expired cache entries");
        }
        removed
    }

    pub fn stats(&self) -> CacheStats {
        let mut per_strategy: BTreeMap<&'static str, usize> =
            Strategy::ALL.iter().map(|s| (s.name(), 0)).collect();
        let mut approx_bytes = 0;
        let mut total_entries = 0;

        if let Ok(entries) = self.entries.read() {
            total_entries = entries.len();
            for (key, entry) in entries.iter() {
                *per_strategy.entry(key.strategy.name()).or_insert(0) += 1;
                approx_bytes += entry.json.len() + key.raw.len();
            }
        }

        CacheStats {
            total_entries,
            per_strategy,
            approx_bytes,
        }
    }

    /// Test helper: age an entry as if it had been stored `by` earlier.
    #[cfg(test)]
    fn backdate(&self, key: &CacheKey, by: Duration) {
        if let Ok(mut entries) = self.entries.write() {
            if let Some(entry) = entries.get_mut(key) {
                if let Some(earlier) = entry.stored_at.checked_sub(by) {
                    entry.stored_at = earlier;
                }
            }
        }
    }
}
