use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

pub const UNSET_TS: u64 = 0;

/// Success and failure counters with the time of the latest of each.
#[derive(Debug)]
pub struct AtomicMetric {
    success: AtomicU64,
    failure: AtomicU64,
    last_success_ms: AtomicU64,
    last_failure_ms: AtomicU64,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AtomicSnapshot {
    pub successes: u64,
    pub failures: u64,
    pub last_success_ms: Option<u64>,
    pub last_failure_ms: Option<u64>,
}

impl AtomicMetric {
    pub const fn new() -> Self {
        Self {
            success: AtomicU64::new(0),
            failure: AtomicU64::new(0),
            last_success_ms: AtomicU64::new(UNSET_TS),
            last_failure_ms: AtomicU64::new(UNSET_TS),
        }
    }

    pub fn record_success(&self, count: u64) {
        if count == 0 {
            return;
        }
        self.success.fetch_add(count, Ordering::Relaxed);
        self.last_success_ms
            .store(current_unix_ms(), Ordering::Relaxed);
    }

    pub fn record_failure(&self, count: u64) {
        if count == 0 {
            return;
        }
        self.failure.fetch_add(count, Ordering::Relaxed);
        self.last_failure_ms
            .store(current_unix_ms(), Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> AtomicSnapshot {
        AtomicSnapshot {
            successes: self.success.load(Ordering::Relaxed),
            failures: self.failure.load(Ordering::Relaxed),
            last_success_ms: timestamp_to_option(self.last_success_ms.load(Ordering::Relaxed)),
            last_failure_ms: timestamp_to_option(self.last_failure_ms.load(Ordering::Relaxed)),
        }
    }
}

impl Default for AtomicMetric {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SyncMetricsSnapshot {
    pub entries: AtomicSnapshot,
    pub drains_completed: u64,
    pub drains_skipped: u64,
    /// Completed drains in a row that left at least one entry failed.
    pub consecutive_failing_drains: u64,
    pub last_duration_ms: Option<u64>,
}

/// Per-engine drain statistics.
#[derive(Debug, Default)]
pub struct SyncMetrics {
    entries: AtomicMetric,
    drains_completed: AtomicU64,
    drains_skipped: AtomicU64,
    consecutive_failing_drains: AtomicU64,
    last_duration_ms: AtomicU64,
}

impl SyncMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_drain(&self, synced: u32, failed: u32, elapsed: Duration) {
        self.entries.record_success(u64::from(synced));
        self.entries.record_failure(u64::from(failed));
        self.drains_completed.fetch_add(1, Ordering::Relaxed);
        if failed > 0 {
            self.consecutive_failing_drains
                .fetch_add(1, Ordering::Relaxed);
        } else {
            self.consecutive_failing_drains.store(0, Ordering::Relaxed);
        }
        // Stored +1 so a sub-millisecond drain is distinguishable from unset.
        self.last_duration_ms
            .store(elapsed.as_millis() as u64 + 1, Ordering::Relaxed);
    }

    pub fn record_skip(&self) {
        self.drains_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> SyncMetricsSnapshot {
        SyncMetricsSnapshot {
            entries: self.entries.snapshot(),
            drains_completed: self.drains_completed.load(Ordering::Relaxed),
            drains_skipped: self.drains_skipped.load(Ordering::Relaxed),
            consecutive_failing_drains: self.consecutive_failing_drains.load(Ordering::Relaxed),
            last_duration_ms: timestamp_to_option(self.last_duration_ms.load(Ordering::Relaxed))
                .map(|value| value - 1),
        }
    }
}

#[inline]
pub fn current_unix_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_millis() as u64)
        .unwrap_or(UNSET_TS)
}

#[inline]
pub fn timestamp_to_option(value: u64) -> Option<u64> {
    if value == UNSET_TS { None } else { Some(value) }
}
