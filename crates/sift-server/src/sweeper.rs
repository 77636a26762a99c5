//! Owned background task for the periodic cache sweep
//!
//! The sweep bounds memory from entries written once and never re-read; the
//! lazy expiry check in `ResponseCache::get` already guarantees stale values
//! are never served. The task is started at server init with a shutdown
//! handle and stopped during graceful shutdown — not left as a free-running
//! interval with no owner.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::interval;
use tracing::{debug, info, warn};

use sift_core::ResponseCache;

/// Configuration for the periodic sweep
#[derive(Debug, Clone)]
pub struct SweepConfig {
    /// Interval between sweeps
    pub interval: Duration,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(3600),
        }
    }
}

impl SweepConfig {
    /// Parse configuration from `SIFT_SWEEP_INTERVAL_SECS`.
    ///
    /// Unset → hourly default. `0` → sweeping disabled (returns None); the
    /// lazy check in `get` still keeps reads correct.
    pub fn from_env() -> Option<Self> {
        Self::from_raw(std::env::var("SIFT_SWEEP_INTERVAL_SECS").ok().as_deref())
    }

    fn from_raw(raw: Option<&str>) -> Option<Self> {
        match raw {
            None => Some(Self::default()),
            Some(raw) => match raw.parse::<u64>() {
                Ok(0) => {
                    warn!("SIFT_SWEEP_INTERVAL_SECS is 0, periodic cache sweep disabled");
                    None
                }
                Ok(secs) => Some(Self {
                    interval: Duration::from_secs(secs),
                }),
                Err(_) => {
                    warn!(value = %raw, "Invalid SIFT_SWEEP_INTERVAL_SECS, using hourly default");
                    Some(Self::default())
                }
            },
        }
    }
}

/// Handle to the running sweep task
pub struct CacheSweeper {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl CacheSweeper {
    /// Spawn the sweep task against a shared cache.
    pub fn start(cache: Arc<ResponseCache>, config: SweepConfig) -> Self {
        info!(
            "Starting cache sweep: every {} seconds",
            config.interval.as_secs()
        );

        let (shutdown, mut shutdown_rx) = watch::channel(false);

        let handle = tokio::spawn(async move {
            let mut ticker = interval(config.interval);
            // Skip the immediate first tick; nothing can be expired yet.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let removed = cache.purge_expired();
                        if removed > 0 {
                            info!(removed, "Cache sweep removed expired entries");
                        } else {
                            debug!("Cache sweep found nothing expired");
                        }
                    }
                    _ = shutdown_rx.changed() => {
                        debug!("Cache sweep task stopping");
                        break;
                    }
                }
            }
        });

        Self { shutdown, handle }
    }

    /// Signal the task to stop and wait for it to finish.
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        let _ = self.handle.await;
    }
}
