//! Scan record model

use chrono::{Local, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Display/sort format shared by scan records and audit entries
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Scores strictly above this are REAL
pub const REAL_SCORE_THRESHOLD: f64 = 0.5;

/// Confidence pinned on human-verified records
pub const VERIFIED_CONFIDENCE: f64 = 100.0;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    Real,
    Fake,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Real => "REAL",
            Self::Fake => "FAKE",
        }
    }

    /// Parse the wire form ("REAL" / "FAKE"), case-insensitive
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "REAL" => Some(Self::Real),
            "FAKE" => Some(Self::Fake),
            _ => None,
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Verdict and confidence derived from a raw classifier score
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreVerdict {
    pub result: Verdict,
    pub confidence: f64,
    pub raw_score: f64,
}

impl ScoreVerdict {
    pub fn from_raw_score(raw_score: f64) -> Self {
        if raw_score > REAL_SCORE_THRESHOLD {
            Self { result: Verdict::Real, confidence: raw_score * 100.0, raw_score }
        } else {
            Self { result: Verdict::Fake, confidence: (1.0 - raw_score) * 100.0, raw_score }
        }
    }
}

/// Serde adapter keeping timestamps in the sortable display format
pub mod timestamp_format {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::TIMESTAMP_FORMAT;

    pub fn serialize<S: Serializer>(ts: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&ts.format(TIMESTAMP_FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, TIMESTAMP_FORMAT).map_err(serde::de::Error::custom)
    }

    pub mod option {
        use chrono::NaiveDateTime;
        use serde::{Deserialize, Deserializer, Serializer};

        use super::super::TIMESTAMP_FORMAT;

        pub fn serialize<S: Serializer>(ts: &Option<NaiveDateTime>, serializer: S) -> Result<S::Ok, S::Error> {
            match ts {
                Some(ts) => serializer.serialize_str(&ts.format(TIMESTAMP_FORMAT).to_string()),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error> {
            Option::<String>::deserialize(deserializer)?
                .map(|raw| NaiveDateTime::parse_from_str(&raw, TIMESTAMP_FORMAT).map_err(serde::de::Error::custom))
                .transpose()
        }
    }
}

/// Current local time truncated to whole seconds
pub fn now_timestamp() -> NaiveDateTime {
    let now = Local::now().naive_local();
    now.with_nanosecond(0).unwrap_or(now)
}

/// One persisted classification outcome
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScanRecord {
    /// Stable identity. Files written before ids existed load as nil and are
    /// backfilled when the store opens.
    #[serde(default = "Uuid::nil")]
    pub id: Uuid,
    #[serde(with = "timestamp_format")]
    pub timestamp: NaiveDateTime,
    pub filename: String,
    pub result: Verdict,
    pub confidence: f64,
    pub raw_score: f64,
    #[serde(default)]
    pub reasons: Vec<String>,
    #[serde(default)]
    pub verified_by_admin: bool,
    #[serde(
        default,
        with = "timestamp_format::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub admin_verified_at: Option<NaiveDateTime>,
}

/// Input to `ScanStore::record_scan`
#[derive(Debug, Clone)]
pub struct NewScan {
    pub filename: String,
    pub result: Verdict,
    pub confidence: f64,
    pub raw_score: f64,
    pub reasons: Vec<String>,
}

impl ScanRecord {
    pub fn new(scan: NewScan, timestamp: NaiveDateTime) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp,
            filename: scan.filename,
            result: scan.result,
            confidence: scan.confidence,
            raw_score: scan.raw_score,
            reasons: scan.reasons,
            verified_by_admin: false,
            admin_verified_at: None,
        }
    }

    /// Human override: verdict forced, confidence pinned, raw score untouched
    pub fn apply_verification(&mut self, verdict: Verdict, at: NaiveDateTime) -> Verdict {
        let previous = self.result;
        self.result = verdict;
        self.confidence = VERIFIED_CONFIDENCE;
        self.verified_by_admin = true;
        self.admin_verified_at = Some(at);
        previous
    }

    pub fn timestamp_display(&self) -> String {
        self.timestamp.format(TIMESTAMP_FORMAT).to_string()
    }
}

/// History filters (search is a case-insensitive filename substring)
#[derive(Debug, Clone, Default)]
pub struct HistoryFilter {
    pub search: Option<String>,
    pub result: Option<Verdict>,
}

impl HistoryFilter {
    pub fn matches(&self, record: &ScanRecord) -> bool {
        if let Some(search) = self.search.as_deref() {
            if !record.filename.to_lowercase().contains(&search.to_lowercase()) {
                return false;
            }
        }
        self.result.map_or(true, |result| record.result == result)
    }
}

/// One page of history
#[derive(Debug, Clone, Serialize)]
pub struct HistoryPage {
    pub records: Vec<ScanRecord>,
    pub page: i64,
    pub page_size: usize,
    pub total: usize,
    pub total_pages: usize,
}
