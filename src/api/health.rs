//! Shared per-feed health for the /health endpoint.
//! Updated by the fetchers, read by the API.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use serde::Serialize;

/// Outcome counters for one upstream feed. Timestamps are nanosecond epochs, 0 = never.
#[derive(Default)]
pub struct FeedHealth {
    last_ok_ns: AtomicU64,
    last_error_ns: AtomicU64,
    failures: AtomicU64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FeedStatus {
    pub last_ok_ns: Option<u64>,
    pub last_error_ns: Option<u64>,
    pub failures: u64,
}

impl FeedHealth {
    pub fn record_ok(&self) {
        self.last_ok_ns.store(now_ns(), Ordering::Relaxed);
    }

    pub fn record_error(&self) {
        self.last_error_ns.store(now_ns(), Ordering::Relaxed);
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn status(&self) -> FeedStatus {
        let nonzero = |v: u64| (v != 0).then_some(v);
        FeedStatus {
            last_ok_ns: nonzero(self.last_ok_ns.load(Ordering::Relaxed)),
            last_error_ns: nonzero(self.last_error_ns.load(Ordering::Relaxed)),
            failures: self.failures.load(Ordering::Relaxed),
        }
    }
}

pub struct HealthState {
    pub weather: FeedHealth,
    pub space_weather: FeedHealth,
    pub astronomy: FeedHealth,
    started_at: Instant,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub uptime_secs: u64,
    pub weather: FeedStatus,
    pub space_weather: FeedStatus,
    pub astronomy: FeedStatus,
}

impl HealthState {
    pub fn new() -> Self {
        Self {
            weather: FeedHealth::default(),
            space_weather: FeedHealth::default(),
            astronomy: FeedHealth::default(),
            started_at: Instant::now(),
        }
    }

    pub fn report(&self) -> HealthResponse {
        HealthResponse {
            uptime_secs: self.started_at.elapsed().as_secs(),
            weather: self.weather.status(),
            space_weather: self.space_weather.status(),
            astronomy: self.astronomy.status(),
        }
    }
}

impl Default for HealthState {
    fn default() -> Self {
        Self::new()
    }
}

fn now_ns() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos() as u64
}
