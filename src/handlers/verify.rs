//! Verification handler (admin)

use axum::{extract::State, Json};

use crate::{handlers, AppState, AppResult};
use crate::middleware::auth::AdminContext;
use crate::verification::{self, VerificationReceipt, VerifyRequest};

/// Force a verdict on one scan
pub async fn verify(
    State(state): State<AppState>,
    admin: AdminContext,
    Json(req): Json<VerifyRequest>,
) -> AppResult<Json<VerificationReceipt>> {
    let store = state.store.clone();
    let receipt = handlers::blocking(move || Ok(verification::verify(&store, req, &admin.username)?)).await?;
    Ok(Json(receipt))
}
