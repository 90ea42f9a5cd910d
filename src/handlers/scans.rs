//! Scan handlers (public)

use std::path::{Path, PathBuf};

use axum::{extract::{Multipart, Query, State}, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{handlers, AppState, AppError, AppResult};
use crate::forensics::{self, VisualReport};
use crate::models::ScanRecord;

pub const ALLOWED_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "webp"];

const UPLOAD_FIELD: &str = "file";

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    #[serde(flatten)]
    pub record: ScanRecord,
    pub image_url: String,
}

#[derive(Debug, Deserialize)]
pub struct VisualsParams {
    pub filename: Option<String>,
}

/// Keep `[A-Za-z0-9._-]`, map whitespace to `_`, drop everything else.
/// Leading dots are stripped so the result can never escape the upload dir.
pub fn sanitize_filename(raw: &str) -> String {
    // Browsers on Windows may send a full path
    let base = raw.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or(raw);

    let cleaned: String = base
        .chars()
        .filter_map(|c| match c {
            c if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') => Some(c),
            c if c.is_whitespace() => Some('_'),
            _ => None,
        })
        .collect();

    cleaned.trim_start_matches('.').to_string()
}

pub fn is_allowed_extension(filename: &str) -> bool {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ALLOWED_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

fn upload_path(state: &AppState, stored_name: &str) -> PathBuf {
    state.config.upload_dir.join(stored_name)
}

/// On-disk name of an upload: `<record id>_<sanitized name>`, so equal
/// client filenames never overwrite an earlier record's image
pub fn stored_upload_name(id: Uuid, filename: &str) -> String {
    format!("{}_{}", id, filename)
}

pub fn upload_url(record: &ScanRecord) -> String {
    format!("/uploads/{}", stored_upload_name(record.id, &record.filename))
}

async fn discard_upload(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        tracing::warn!("Failed to remove rejected upload {}: {}", path.display(), e);
    }
}

/// Accept a note image, classify it and persist the outcome
pub async fn predict(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Json<PredictResponse>> {
    let mut upload = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::ValidationError(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let raw_name = field.file_name().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::ValidationError(format!("Failed to read upload: {}", e)))?;
        upload = Some((raw_name, bytes));
        break;
    }

    let (raw_name, bytes) = upload.ok_or_else(|| AppError::ValidationError("No file part".to_string()))?;
    if raw_name.trim().is_empty() {
        return Err(AppError::ValidationError("No selected file".to_string()));
    }

    let filename = sanitize_filename(&raw_name);
    if filename.is_empty() || !is_allowed_extension(&filename) {
        return Err(AppError::ValidationError(format!(
            "File type not allowed (expected one of: {})",
            ALLOWED_EXTENSIONS.join(", ")
        )));
    }

    let id = Uuid::new_v4();
    tokio::fs::create_dir_all(&state.config.upload_dir)
        .await
        .map_err(|e| AppError::StorageError(e.to_string()))?;
    let path = upload_path(&state, &stored_upload_name(id, &filename));
    tokio::fs::write(&path, &bytes)
        .await
        .map_err(|e| AppError::StorageError(e.to_string()))?;

    tracing::debug!("Stored upload {} ({} bytes)", path.display(), bytes.len());

    let pipeline = state.pipeline.clone();
    let scan_path = path.clone();
    let outcome = handlers::blocking(move || Ok(pipeline.scan_as(id, &scan_path, &filename)?)).await;

    match outcome {
        Ok(record) => Ok(Json(PredictResponse {
            image_url: upload_url(&record),
            record,
        })),
        Err(e) => {
            // No record, so nothing may keep serving the file
            discard_upload(&path).await;
            Err(e)
        }
    }
}

/// Base64 renderings of an uploaded note; `filename` is the stored name
/// from the scan's `image_url`
pub async fn visuals(
    State(state): State<AppState>,
    Query(params): Query<VisualsParams>,
) -> AppResult<Json<VisualReport>> {
    let raw = params
        .filename
        .filter(|f| !f.trim().is_empty())
        .ok_or_else(|| AppError::ValidationError("filename is required".to_string()))?;

    let filename = sanitize_filename(&raw);
    let path = upload_path(&state, &filename);
    if filename.is_empty() || !path.is_file() {
        return Err(AppError::NotFound(format!("Upload '{}' not found", raw)));
    }

    let report = handlers::blocking(move || Ok(forensics::render_visuals(&path)?)).await?;

    Ok(Json(report))
}
