//! Error handling

use axum::{
    response::{IntoResponse, Response},
    http::StatusCode,
    Json,
};
use serde_json::json;

use crate::classifier::{ClassifierError, PreprocessError};
use crate::forensics::ForensicError;
use crate::pipeline::ScanError;
use crate::store::StoreError;
use crate::verification::VerificationError;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug)]
pub enum AppError {
    // Auth errors
    InvalidCredentials,
    TokenInvalid,
    Unauthorized,
    Forbidden,

    // Resource errors
    NotFound(String),

    // Validation errors
    ValidationError(String),

    // Upload could not be decoded as an image
    ImageDecode(String),

    // Model missing or inference failed
    ClassifierUnavailable(String),

    // Storage errors
    StorageError(String),

    // Generic errors
    InternalError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "Invalid username or password"),
            AppError::TokenInvalid => (StatusCode::UNAUTHORIZED, "Invalid token"),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "Authentication required"),
            AppError::Forbidden => (StatusCode::FORBIDDEN, "Access denied"),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.as_str()),
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg.as_str()),
            AppError::ImageDecode(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg.as_str()),
            AppError::ClassifierUnavailable(msg) => {
                tracing::error!("Classifier unavailable: {}", msg);
                (StatusCode::SERVICE_UNAVAILABLE, "Classifier unavailable")
            }
            AppError::StorageError(msg) => {
                tracing::error!("Storage error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Storage error occurred")
            }
            AppError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        let body = Json(json!({
            "error": error_message,
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::StorageError(err.to_string())
    }
}

impl From<PreprocessError> for AppError {
    fn from(err: PreprocessError) -> Self {
        match err {
            PreprocessError::Decode { .. } => AppError::ImageDecode(err.to_string()),
            PreprocessError::Shape(msg) => AppError::InternalError(msg),
        }
    }
}

impl From<ClassifierError> for AppError {
    fn from(err: ClassifierError) -> Self {
        AppError::ClassifierUnavailable(err.to_string())
    }
}

impl From<ScanError> for AppError {
    fn from(err: ScanError) -> Self {
        match err {
            ScanError::Preprocess(e) => e.into(),
            ScanError::Classifier(e) => e.into(),
            ScanError::Store(e) => e.into(),
        }
    }
}

impl From<ForensicError> for AppError {
    fn from(err: ForensicError) -> Self {
        match err {
            ForensicError::ImageLoad { .. } | ForensicError::EmptyImage => AppError::ImageDecode(err.to_string()),
            ForensicError::Render(msg) => AppError::InternalError(msg),
        }
    }
}

impl From<VerificationError> for AppError {
    fn from(err: VerificationError) -> Self {
        match err {
            VerificationError::BadInput(_) => AppError::ValidationError(err.to_string()),
            VerificationError::NotFound(_) => AppError::NotFound(err.to_string()),
            VerificationError::Store(e) => e.into(),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::ValidationError(err.to_string())
    }
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(_: jsonwebtoken::errors::Error) -> Self {
        AppError::TokenInvalid
    }
}
