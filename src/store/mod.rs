//! Scan Store - persisted scan history + admin audit trail
//!
//! Both collections live in JSON files and are only touched through
//! `ScanStore`. Every operation takes the same process-wide lock, so a
//! read-modify-write on one collection cannot interleave with another
//! mutator (the file format has no merge semantics).
//!
//! ## Structure
//! - `json_file`: whole-file load/save with corrupt-file recovery
//! - `history`: pagination, delete, verification over a snapshot
//! - `audit`: bounded newest-first audit trail
//!
//! The scan history has no retention policy and grows without bound.

pub mod json_file;
pub mod history;
pub mod audit;


use std::path::PathBuf;

use parking_lot::Mutex;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{
    now_timestamp, AuditAction, AuditLogEntry, HistoryFilter, HistoryPage, NewScan, ScanRecord,
};
use crate::verification::VerifyCommand;
use history::AppliedVerification;
use json_file::JsonFile;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("store file {path} is corrupt: {reason}")]
    Corrupt { path: String, reason: String },

    #[error("failed to serialize store: {0}")]
    Serialize(String),
}

struct Collections {
    history: JsonFile<ScanRecord>,
    audit: JsonFile<AuditLogEntry>,
}

pub struct ScanStore {
    inner: Mutex<Collections>,
}

impl ScanStore {
    /// Open (or lazily create) the two collections.
    /// Legacy records without an id are backfilled and persisted right away.
    pub fn open(history_path: impl Into<PathBuf>, audit_path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let collections = Collections {
            history: JsonFile::new(history_path),
            audit: JsonFile::new(audit_path),
        };

        let mut records = collections.history.load();
        let backfilled = history::backfill_ids(&mut records);
        if backfilled > 0 {
            collections.history.save(&records)?;
            tracing::info!("Assigned ids to {} legacy scan records", backfilled);
        }

        tracing::info!(
            "Scan store opened: {} records ({}), audit at {}",
            records.len(),
            collections.history.path().display(),
            collections.audit.path().display()
        );

        Ok(Self {
            inner: Mutex::new(collections),
        })
    }

    // ------------------------------------------------------------------
    // Scan history
    // ------------------------------------------------------------------

    /// Prepend a freshly classified scan (no audit entry)
    pub fn record_scan(&self, scan: NewScan) -> Result<ScanRecord, StoreError> {
        self.record_scan_as(Uuid::new_v4(), scan)
    }

    /// Same as `record_scan` with a caller-chosen id (uploads are named after it)
    pub fn record_scan_as(&self, id: Uuid, scan: NewScan) -> Result<ScanRecord, StoreError> {
        let mut record = ScanRecord::new(scan, now_timestamp());
        record.id = id;

        let inner = self.inner.lock();
        let mut records = inner.history.load();
        records.insert(0, record.clone());
        inner.history.save(&records)?;

        Ok(record)
    }

    /// Full snapshot, newest first
    pub fn snapshot(&self) -> Vec<ScanRecord> {
        self.inner.lock().history.load()
    }

    pub fn list(&self, filter: &HistoryFilter, page: i64, page_size: usize) -> HistoryPage {
        let records = self.snapshot();
        history::paginate(&records, filter, page, page_size)
    }

    /// Remove every record with `id`. Idempotent; the attempt is always audited.
    pub fn delete(&self, id: Uuid, user: &str) -> Result<usize, StoreError> {
        let inner = self.inner.lock();
        let mut records = inner.history.load();
        let removed = history::remove_by_id(&mut records, id);

        let details = match removed.first() {
            Some(record) => {
                inner.history.save(&records)?;
                format!("Deleted scan {} from {}", id, record.timestamp_display())
            }
            None => format!("Delete requested for scan {} (no matching record)", id),
        };
        Self::append_audit(&inner, AuditLogEntry::new(AuditAction::Delete).by(user).with_details(details))?;

        Ok(removed.len())
    }

    /// Drop the whole history; returns how many records were removed
    pub fn clear(&self, user: &str) -> Result<usize, StoreError> {
        let inner = self.inner.lock();
        let count = inner.history.load().len();
        inner.history.remove()?;
        Self::append_audit(
            &inner,
            AuditLogEntry::new(AuditAction::ClearHistory)
                .by(user)
                .with_details(format!("Cleared all scan history ({} records)", count)),
        )?;
        Ok(count)
    }

    /// Apply a human verdict to the first record matching the command.
    /// `None` means no record matched and nothing was written.
    pub fn update_verification(
        &self,
        command: &VerifyCommand,
        user: &str,
    ) -> Result<Option<AppliedVerification>, StoreError> {
        let inner = self.inner.lock();
        let mut records = inner.history.load();

        let Some(applied) = history::verify_first(&mut records, command.record_id, command.verdict, now_timestamp())
        else {
            return Ok(None);
        };

        inner.history.save(&records)?;
        Self::append_audit(
            &inner,
            AuditLogEntry::new(AuditAction::Verify).by(user).with_details(format!(
                "Scan {} ({}) verified as {} (was {})",
                applied.record.id,
                applied.record.timestamp_display(),
                applied.record.result,
                applied.previous
            )),
        )?;

        Ok(Some(applied))
    }

    /// Snapshot for export; the export itself is audited under the same lock
    pub fn export_snapshot(&self, format_label: &str, user: &str) -> Result<Vec<ScanRecord>, StoreError> {
        let inner = self.inner.lock();
        let records = inner.history.load();
        Self::append_audit(
            &inner,
            AuditLogEntry::new(AuditAction::Export)
                .by(user)
                .with_details(format!("History exported as {}", format_label.to_uppercase())),
        )?;
        Ok(records)
    }

    // ------------------------------------------------------------------
    // Audit trail
    // ------------------------------------------------------------------

    pub fn log_audit(&self, entry: AuditLogEntry) -> Result<(), StoreError> {
        let inner = self.inner.lock();
        Self::append_audit(&inner, entry)
    }

    /// Newest first
    pub fn audit_entries(&self) -> Vec<AuditLogEntry> {
        self.inner.lock().audit.load()
    }

    fn append_audit(inner: &Collections, entry: AuditLogEntry) -> Result<(), StoreError> {
        let mut entries = inner.audit.load();
        audit::push_bounded(&mut entries, entry);
        inner.audit.save(&entries)
    }
}
