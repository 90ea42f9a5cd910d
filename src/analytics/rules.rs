//! Analytics thresholds
//!
//! Fixed design constants. Not configurable at runtime.

/// Sliding window for the fake-spike notification
pub const FAKE_SPIKE_WINDOW: usize = 10;

/// FAKE verdicts in the window that trigger the notification
pub const FAKE_SPIKE_MIN_COUNT: usize = 3;

/// Window for the recent-confidence notification
pub const RECENT_CONFIDENCE_WINDOW: usize = 5;

/// Recent mean confidence below this triggers the notification
pub const RECENT_CONFIDENCE_MIN: f64 = 85.0;

/// Overall mean confidence at or above this is Healthy
pub const HEALTHY_MIN_CONFIDENCE: f64 = 80.0;

/// At or above this (and below Healthy) is Monitor; below is Degraded
pub const MONITOR_MIN_CONFIDENCE: f64 = 65.0;

/// Records below this confidence are on the risk worklist
pub const RISK_CONFIDENCE_MAX: f64 = 85.0;

/// Scans shown on the dashboard
pub const RECENT_SCANS_SHOWN: usize = 5;
