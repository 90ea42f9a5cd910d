//! Analytics Engine
//!
//! Pure, read-only functions over a store snapshot (newest first). Nothing
//! here is persisted; every figure is recomputed on each read.

pub mod rules;

use serde::Serialize;

use crate::models::{ScanRecord, Verdict};
use rules::*;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SummaryStats {
    pub total_scans: usize,
    pub real_count: usize,
    pub fake_count: usize,
    pub real_percent: f64,
    pub fake_percent: f64,
    pub avg_confidence: f64,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Danger,
    Warning,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notification {
    /// Too many FAKE verdicts in the recent window
    FakeSpike { count: usize, window: usize },
    /// Recent scans averaging low confidence (mean rounded to 1 dp)
    LowConfidence { mean: f64, window: usize },
}

impl Notification {
    pub fn level(&self) -> NotificationLevel {
        match self {
            Self::FakeSpike { .. } => NotificationLevel::Danger,
            Self::LowConfidence { .. } => NotificationLevel::Warning,
        }
    }

    pub fn message(&self) -> String {
        match self {
            Self::FakeSpike { count, window } => {
                format!("High Volume of Fakes Detected: {} in last {} scans.", count, window)
            }
            Self::LowConfidence { mean, .. } => {
                format!("Recent scans showing low confidence ({:.1}% avg).", mean)
            }
        }
    }
}

/// Notification as rendered for clients
#[derive(Debug, Clone, Serialize)]
pub struct NotificationView {
    pub level: NotificationLevel,
    pub message: String,
    #[serde(flatten)]
    pub notification: Notification,
}

impl From<Notification> for NotificationView {
    fn from(notification: Notification) -> Self {
        Self {
            level: notification.level(),
            message: notification.message(),
            notification,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum HealthStatus {
    Healthy,
    Monitor,
    Degraded,
}

impl HealthStatus {
    pub fn from_mean_confidence(mean: f64) -> Self {
        if mean >= HEALTHY_MIN_CONFIDENCE {
            Self::Healthy
        } else if mean >= MONITOR_MIN_CONFIDENCE {
            Self::Monitor
        } else {
            Self::Degraded
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            Self::Healthy => "success",
            Self::Monitor => "warning",
            Self::Degraded => "danger",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Self::Healthy => "fa-check-circle",
            Self::Monitor => "fa-stethoscope",
            Self::Degraded => "fa-exclamation-triangle",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthView {
    pub status: HealthStatus,
    pub color: &'static str,
    pub icon: &'static str,
}

impl From<HealthStatus> for HealthView {
    fn from(status: HealthStatus) -> Self {
        Self {
            status,
            color: status.color(),
            icon: status.icon(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PerformanceStats {
    #[serde(flatten)]
    pub summary: SummaryStats,
    pub avg_real: f64,
    pub avg_fake: f64,
    pub min_conf: f64,
    pub max_conf: f64,
    pub health: HealthView,
}

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    #[serde(flatten)]
    pub summary: SummaryStats,
    pub recent_scans: Vec<ScanRecord>,
    pub notifications: Vec<NotificationView>,
}

// ============================================================================
// COMPUTATIONS
// ============================================================================

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 {
        0.0
    } else {
        sum / n as f64
    }
}

fn count(records: &[ScanRecord], verdict: Verdict) -> usize {
    records.iter().filter(|r| r.result == verdict).count()
}

/// Mean confidence over all records, 0 when empty
pub fn mean_confidence(records: &[ScanRecord]) -> f64 {
    mean(records.iter().map(|r| r.confidence))
}

pub fn summarize(records: &[ScanRecord]) -> SummaryStats {
    let total = records.len();
    let real = count(records, Verdict::Real);
    let fake = count(records, Verdict::Fake);
    let percent = |n: usize| if total == 0 { 0.0 } else { round1(n as f64 / total as f64 * 100.0) };

    SummaryStats {
        total_scans: total,
        real_count: real,
        fake_count: fake,
        real_percent: percent(real),
        fake_percent: percent(fake),
        avg_confidence: round1(mean_confidence(records)),
    }
}

/// Sliding-window notifications over the newest records
pub fn notifications(records: &[ScanRecord]) -> Vec<Notification> {
    let mut out = Vec::new();

    let window = &records[..records.len().min(FAKE_SPIKE_WINDOW)];
    let fakes = count(window, Verdict::Fake);
    if fakes >= FAKE_SPIKE_MIN_COUNT {
        out.push(Notification::FakeSpike {
            count: fakes,
            window: FAKE_SPIKE_WINDOW,
        });
    }

    let recent = &records[..records.len().min(RECENT_CONFIDENCE_WINDOW)];
    if !recent.is_empty() {
        let recent_mean = mean_confidence(recent);
        if recent_mean < RECENT_CONFIDENCE_MIN {
            out.push(Notification::LowConfidence {
                mean: round1(recent_mean),
                window: RECENT_CONFIDENCE_WINDOW,
            });
        }
    }

    out
}

pub fn dashboard(records: &[ScanRecord]) -> Dashboard {
    Dashboard {
        summary: summarize(records),
        recent_scans: records.iter().take(RECENT_SCANS_SHOWN).cloned().collect(),
        notifications: notifications(records).into_iter().map(NotificationView::from).collect(),
    }
}

pub fn performance(records: &[ScanRecord]) -> PerformanceStats {
    let by_class = |verdict: Verdict| {
        mean(records.iter().filter(|r| r.result == verdict).map(|r| r.confidence))
    };
    let min_conf = records.iter().map(|r| r.confidence).reduce(f64::min).unwrap_or(0.0);
    let max_conf = records.iter().map(|r| r.confidence).reduce(f64::max).unwrap_or(0.0);

    PerformanceStats {
        summary: summarize(records),
        avg_real: round1(by_class(Verdict::Real)),
        avg_fake: round1(by_class(Verdict::Fake)),
        min_conf: round1(min_conf),
        max_conf: round1(max_conf),
        health: HealthStatus::from_mean_confidence(mean_confidence(records)).into(),
    }
}

/// Still suspicious and not cleared by an admin as REAL
pub fn is_at_risk(record: &ScanRecord) -> bool {
    let suspicious = record.confidence < RISK_CONFIDENCE_MAX || record.result == Verdict::Fake;
    let cleared = record.verified_by_admin && record.result == Verdict::Real;
    suspicious && !cleared
}

pub fn risk_worklist(records: &[ScanRecord]) -> Vec<ScanRecord> {
    records.iter().filter(|r| is_at_risk(r)).cloned().collect()
}
