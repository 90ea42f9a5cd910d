//! History export (JSON or CSV)

use std::str::FromStr;

use crate::models::ScanRecord;

pub const CSV_HEADERS: [&str; 5] = ["Timestamp", "Filename", "Result", "Confidence", "Reasons"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Csv => "text/csv",
        }
    }

    pub fn file_name(&self) -> String {
        format!("scan_history.{}", self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            other => Err(format!("Unsupported export format '{}'", other)),
        }
    }
}

pub fn to_csv(records: &[ScanRecord]) -> Result<Vec<u8>, csv::Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CSV_HEADERS)?;

    for record in records {
        writer.write_record([
            record.timestamp_display(),
            record.filename.clone(),
            record.result.to_string(),
            format!("{:.2}", record.confidence),
            record.reasons.join("; "),
        ])?;
    }

    writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))
}

pub fn to_json(records: &[ScanRecord]) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec_pretty(records)
}
