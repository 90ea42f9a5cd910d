//! Audit trail helpers
//!
//! Newest first, capped at `MAX_AUDIT_ENTRIES`; the oldest entries fall off.

use crate::models::{AuditAction, AuditLogEntry};

pub const MAX_AUDIT_ENTRIES: usize = 1_000;

/// Prepend and trim to the cap
pub fn push_bounded(entries: &mut Vec<AuditLogEntry>, entry: AuditLogEntry) {
    entries.insert(0, entry);
    entries.truncate(MAX_AUDIT_ENTRIES);
}

/// Counts per action, for the audit page header
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct AuditStats {
    pub total_entries: usize,
    pub logins: usize,
    pub failed_logins: usize,
    pub exports: usize,
    pub deletions: usize,
    pub verifications: usize,
}

pub fn stats(entries: &[AuditLogEntry]) -> AuditStats {
    let mut stats = AuditStats {
        total_entries: entries.len(),
        ..Default::default()
    };

    for entry in entries {
        match entry.action {
            AuditAction::Login => stats.logins += 1,
            AuditAction::LoginFail => stats.failed_logins += 1,
            AuditAction::Export => stats.exports += 1,
            AuditAction::Delete | AuditAction::ClearHistory => stats.deletions += 1,
            AuditAction::Verify => stats.verifications += 1,
            AuditAction::Logout => {}
        }
    }

    stats
}
