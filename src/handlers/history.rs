//! Scan history handlers (admin)

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::{handlers, AppState, AppError, AppResult};
use crate::export::{self, ExportFormat};
use crate::middleware::auth::AdminContext;
use crate::models::{HistoryFilter, HistoryPage, Verdict};

#[derive(Debug, Default, Deserialize)]
pub struct HistoryParams {
    pub search: Option<String>,
    /// REAL, FAKE, or ALL / empty for no filter
    pub result: Option<String>,
    pub page: Option<i64>,
}

impl HistoryParams {
    pub fn to_filter(&self) -> AppResult<HistoryFilter> {
        let result = match self.result.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(r) if r.eq_ignore_ascii_case("all") => None,
            Some(r) => Some(
                Verdict::parse(r)
                    .ok_or_else(|| AppError::ValidationError(format!("Unknown result filter '{}'", r)))?,
            ),
        };

        Ok(HistoryFilter {
            search: self.search.clone().filter(|s| !s.trim().is_empty()),
            result,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct ExportParams {
    pub format: Option<String>,
}

/// Filtered, paginated history
pub async fn list(
    State(state): State<AppState>,
    _admin: AdminContext,
    Query(params): Query<HistoryParams>,
) -> AppResult<Json<HistoryPage>> {
    let filter = params.to_filter()?;
    let page = params.page.unwrap_or(1);
    let page_size = state.config.history_page_size;
    let store = state.store.clone();
    let history = handlers::blocking(move || Ok(store.list(&filter, page, page_size))).await?;
    Ok(Json(history))
}

/// Download the full history as JSON or CSV
pub async fn export_history(
    State(state): State<AppState>,
    admin: AdminContext,
    Query(params): Query<ExportParams>,
) -> AppResult<Response> {
    let format: ExportFormat = params
        .format
        .as_deref()
        .unwrap_or("json")
        .parse()
        .map_err(AppError::ValidationError)?;

    let store = state.store.clone();
    let username = admin.username.clone();
    let records = handlers::blocking(move || Ok(store.export_snapshot(format.as_str(), &username)?)).await?;
    let body = match format {
        ExportFormat::Json => export::to_json(&records).map_err(|e| AppError::InternalError(e.to_string()))?,
        ExportFormat::Csv => export::to_csv(&records).map_err(|e| AppError::InternalError(e.to_string()))?,
    };

    tracing::info!("{} exported {} records as {}", admin.username, records.len(), format.as_str());

    Ok((
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", format.file_name()),
            ),
        ],
        body,
    )
        .into_response())
}

/// Delete one record by id (idempotent)
pub async fn delete(
    State(state): State<AppState>,
    admin: AdminContext,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Value>> {
    let store = state.store.clone();
    let username = admin.username.clone();
    let removed = handlers::blocking(move || Ok(store.delete(id, &username)?)).await?;
    tracing::info!("{} deleted scan {} ({} removed)", admin.username, id, removed);
    Ok(Json(json!({ "id": id, "removed": removed })))
}

/// Drop the whole history
pub async fn clear(
    State(state): State<AppState>,
    admin: AdminContext,
) -> AppResult<Json<Value>> {
    let store = state.store.clone();
    let username = admin.username.clone();
    let removed = handlers::blocking(move || Ok(store.clear(&username)?)).await?;
    tracing::info!("{} cleared scan history ({} records)", admin.username, removed);
    Ok(Json(json!({ "removed": removed })))
}
