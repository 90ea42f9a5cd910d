//! Admin views: dashboard, performance, risk worklist, audit trail

use axum::{extract::State, Json};
use serde::Serialize;
use serde_json::Value;

use crate::{handlers, AppState, AppResult};
use crate::analytics::{self, Dashboard, PerformanceStats};
use crate::classifier::{load_model_metadata, ModelInfo};
use crate::middleware::auth::AdminContext;
use crate::models::{AuditLogEntry, ScanRecord};
use crate::store::audit::{self, AuditStats};

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    #[serde(flatten)]
    pub dashboard: Dashboard,
    pub model_info: ModelInfo,
}

#[derive(Debug, Serialize)]
pub struct PerformanceResponse {
    #[serde(flatten)]
    pub performance: PerformanceStats,
    pub model_metadata: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct RiskResponse {
    pub total: usize,
    pub records: Vec<ScanRecord>,
}

#[derive(Debug, Serialize)]
pub struct AuditResponse {
    pub stats: AuditStats,
    pub entries: Vec<AuditLogEntry>,
}

pub async fn dashboard(
    State(state): State<AppState>,
    _admin: AdminContext,
) -> AppResult<Json<DashboardResponse>> {
    let response = handlers::blocking(move || {
        let records = state.store.snapshot();
        Ok(DashboardResponse {
            dashboard: analytics::dashboard(&records),
            model_info: ModelInfo::from_path(&state.config.model_path),
        })
    })
    .await?;
    Ok(Json(response))
}

pub async fn performance(
    State(state): State<AppState>,
    _admin: AdminContext,
) -> AppResult<Json<PerformanceResponse>> {
    let response = handlers::blocking(move || {
        let records = state.store.snapshot();
        Ok(PerformanceResponse {
            performance: analytics::performance(&records),
            model_metadata: load_model_metadata(&state.config.model_info_path),
        })
    })
    .await?;
    Ok(Json(response))
}

/// Suspicious scans not yet cleared as REAL
pub async fn risk(
    State(state): State<AppState>,
    _admin: AdminContext,
) -> AppResult<Json<RiskResponse>> {
    let store = state.store.clone();
    let records = handlers::blocking(move || Ok(analytics::risk_worklist(&store.snapshot()))).await?;
    Ok(Json(RiskResponse {
        total: records.len(),
        records,
    }))
}

pub async fn audit_log(
    State(state): State<AppState>,
    _admin: AdminContext,
) -> AppResult<Json<AuditResponse>> {
    let store = state.store.clone();
    let entries = handlers::blocking(move || Ok(store.audit_entries())).await?;
    Ok(Json(AuditResponse {
        stats: audit::stats(&entries),
        entries,
    }))
}
