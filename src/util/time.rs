//! Time utilities for the tick engine

use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// Get current Unix timestamp in milliseconds
pub fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::ZERO)
        .as_millis() as u64
}

/// Server start time for uptime tracking
static SERVER_START: std::sync::OnceLock<Instant> = std::sync::OnceLock::new();

/// Initialize server start time (call once at startup)
pub fn init_server_time() {
    SERVER_START.get_or_init(Instant::now);
}

/// Get server uptime in seconds
pub fn uptime_secs() -> u64 {
    SERVER_START
        .get()
        .map(|start| start.elapsed().as_secs())
        .unwrap_or(0)
}

/// Wall-clock length of one tick at real time
pub const MS_PER_TICK: u64 = 50;

/// Simulated seconds advanced by every tick, regardless of time acceleration
pub const TIME_STEP: f64 = MS_PER_TICK as f64 / 1_000.0;

/// Wall-clock budget for one tick when simulated time runs `time_acceleration` times
/// faster than real time.
pub fn tick_budget(time_acceleration: u32) -> Duration {
    Duration::from_millis(MS_PER_TICK) / time_acceleration.max(1)
}

/// A simple timer for measuring durations
#[derive(Debug, Clone)]
pub struct Timer {
    start: tokio::time::Instant,
}

impl Timer {
    pub fn new() -> Self {
        Self {
            start: tokio::time::Instant::now(),
        }
    }

    pub fn started_at(&self) -> tokio::time::Instant {
        self.start
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn budget_divides_by_acceleration() {
        assert_eq!(tick_budget(1), Duration::from_millis(50));
        assert_eq!(tick_budget(10), Duration::from_millis(5));
        assert_eq!(tick_budget(0), Duration::from_millis(50));
    }

    #[test]
    fn time_step_is_fixed() {
        assert!((TIME_STEP - 0.05).abs() < 1e-12);
    }
}
