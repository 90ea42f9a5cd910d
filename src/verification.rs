//! Verification Workflow
//!
//! `Unverified -> Verified` for a single scan record. The transition is
//! terminal but may be repeated: re-verifying overwrites the verdict again
//! and writes another VERIFY audit entry each time.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{ScanRecord, Verdict};
use crate::store::{ScanStore, StoreError};

/// Raw operator input; both fields are required
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VerifyRequest {
    pub record_id: Option<String>,
    pub status: Option<String>,
}

/// Validated input
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VerifyCommand {
    pub record_id: Uuid,
    pub verdict: Verdict,
}

#[derive(Debug, Error)]
pub enum VerificationError {
    #[error("Missing data for verification: {0}")]
    BadInput(String),

    #[error("Scan {0} not found")]
    NotFound(Uuid),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, Serialize)]
pub struct VerificationReceipt {
    pub record: ScanRecord,
    pub previous_result: Verdict,
    pub verified_as: Verdict,
}

impl VerifyRequest {
    pub fn into_command(self) -> Result<VerifyCommand, VerificationError> {
        let raw_id = non_blank(self.record_id)
            .ok_or_else(|| VerificationError::BadInput("record_id is required".to_string()))?;
        let raw_status = non_blank(self.status)
            .ok_or_else(|| VerificationError::BadInput("status is required".to_string()))?;

        let record_id = Uuid::parse_str(&raw_id)
            .map_err(|_| VerificationError::BadInput(format!("'{}' is not a valid record id", raw_id)))?;
        let verdict = Verdict::parse(&raw_status)
            .ok_or_else(|| VerificationError::BadInput(format!("status must be REAL or FAKE, got '{}'", raw_status)))?;

        Ok(VerifyCommand { record_id, verdict })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Validate, apply, audit. On any failure nothing is mutated.
pub fn verify(
    store: &ScanStore,
    request: VerifyRequest,
    user: &str,
) -> Result<VerificationReceipt, VerificationError> {
    let command = request.into_command()?;

    let applied = store
        .update_verification(&command, user)?
        .ok_or(VerificationError::NotFound(command.record_id))?;

    tracing::info!(
        "Scan {} verified as {} by {} (was {})",
        applied.record.id,
        command.verdict,
        user,
        applied.previous
    );

    Ok(VerificationReceipt {
        verified_as: command.verdict,
        previous_result: applied.previous,
        record: applied.record,
    })
}
