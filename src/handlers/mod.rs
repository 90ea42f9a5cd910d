//! HTTP handlers
//!
//! Store access takes a process-wide lock and does synchronous file I/O, so
//! handlers run it through `blocking` instead of on the async workers.

pub mod health;
pub mod auth;
pub mod scans;
pub mod history;
pub mod verify;
pub mod admin;

use crate::{AppError, AppResult};

/// Run blocking work (store, image decoding, password hashing) off the runtime
pub async fn blocking<F, T>(work: F) -> AppResult<T>
where
    F: FnOnce() -> AppResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| AppError::InternalError(format!("Blocking task failed: {}", e)))?
}
