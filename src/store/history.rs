//! Scan history operations over an in-memory snapshot

use chrono::NaiveDateTime;
use uuid::Uuid;

use crate::models::{HistoryFilter, HistoryPage, ScanRecord, Verdict};

/// Filter, then slice `[(page-1)*page_size, page*page_size)`.
/// Pages below 1 or past the end are empty, never an error.
pub fn paginate(
    records: &[ScanRecord],
    filter: &HistoryFilter,
    page: i64,
    page_size: usize,
) -> HistoryPage {
    let page_size = page_size.max(1);
    let filtered: Vec<&ScanRecord> = records.iter().filter(|r| filter.matches(r)).collect();
    let total = filtered.len();
    let total_pages = total.div_ceil(page_size);

    let slice = if page < 1 {
        Vec::new()
    } else {
        let start = (page as usize - 1).saturating_mul(page_size);
        filtered
            .into_iter()
            .skip(start)
            .take(page_size)
            .cloned()
            .collect()
    };

    HistoryPage {
        records: slice,
        page,
        page_size,
        total,
        total_pages,
    }
}

/// Remove every record carrying `id`; returns the removed records
pub fn remove_by_id(records: &mut Vec<ScanRecord>, id: Uuid) -> Vec<ScanRecord> {
    let mut removed = Vec::new();
    records.retain(|r| {
        if r.id == id {
            removed.push(r.clone());
            false
        } else {
            true
        }
    });
    removed
}

/// Outcome of applying a verification to a snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedVerification {
    pub record: ScanRecord,
    pub previous: Verdict,
}

/// First match wins
pub fn verify_first(
    records: &mut [ScanRecord],
    id: Uuid,
    verdict: Verdict,
    at: NaiveDateTime,
) -> Option<AppliedVerification> {
    let record = records.iter_mut().find(|r| r.id == id)?;
    let previous = record.apply_verification(verdict, at);
    Some(AppliedVerification {
        record: record.clone(),
        previous,
    })
}

/// Give nil ids (legacy rows) a fresh identity; returns how many changed
pub fn backfill_ids(records: &mut [ScanRecord]) -> usize {
    let mut count = 0;
    for record in records.iter_mut().filter(|r| r.id.is_nil()) {
        record.id = Uuid::new_v4();
        count += 1;
    }
    count
}
