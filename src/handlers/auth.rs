//! Authentication handlers

use axum::{extract::State, Json};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use jsonwebtoken::{encode, Header, EncodingKey};
use serde_json::{json, Value};
use chrono::{Utc, Duration};
use validator::Validate;

use crate::{handlers, AppState, AppError, AppResult};
use crate::config::Config;
use crate::middleware::auth::AdminContext;
use crate::models::{AuditAction, AuditLogEntry, Claims, LoginRequest, LoginResponse, ADMIN_ROLE};

/// The single operator account
#[derive(Debug, Clone)]
pub struct AdminCredentials {
    pub username: String,
    password_hash: String,
}

impl AdminCredentials {
    /// Use the configured PHC hash, or hash the plaintext fallback once
    pub fn from_config(config: &Config) -> AppResult<Self> {
        let password_hash = match &config.admin_password_hash {
            Some(hash) => {
                PasswordHash::new(hash)
                    .map_err(|e| AppError::InternalError(format!("Invalid ADMIN_PASSWORD_HASH: {}", e)))?;
                hash.clone()
            }
            None => {
                if config.is_production() {
                    tracing::warn!("ADMIN_PASSWORD_HASH not set, hashing ADMIN_PASSWORD at startup");
                }
                hash_password(&config.admin_password)?
            }
        };

        Ok(Self {
            username: config.admin_username.clone(),
            password_hash,
        })
    }

    pub fn verify(&self, username: &str, password: &str) -> bool {
        if username != self.username {
            return false;
        }
        match PasswordHash::new(&self.password_hash) {
            Ok(parsed) => Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        }
    }
}

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::InternalError(e.to_string()))
}

/// Login endpoint
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    req.validate()?;

    let credentials = state.credentials.clone();
    let store = state.store.clone();
    let req = handlers::blocking(move || {
        let attempt = req;
        if !credentials.verify(&attempt.username, &attempt.password) {
            tracing::warn!("Failed admin login for '{}'", attempt.username);
            store.log_audit(
                AuditLogEntry::new(AuditAction::LoginFail)
                    .by(&attempt.username)
                    .with_details("Invalid credentials"),
            )?;
            return Err(AppError::InvalidCredentials);
        }

        store.log_audit(
            AuditLogEntry::new(AuditAction::Login)
                .by(&attempt.username)
                .with_details("Admin logged in"),
        )?;
        Ok(attempt)
    })
    .await?;

    let token = generate_jwt(&req.username, &state.config.jwt_secret, state.config.jwt_expiration_hours)?;
    tracing::info!("Admin {} logged in", req.username);

    Ok(Json(LoginResponse {
        token,
        username: req.username,
        expires_in_hours: state.config.jwt_expiration_hours,
    }))
}

/// Tokens are stateless; logout only leaves a trail
pub async fn logout(
    State(state): State<AppState>,
    admin: AdminContext,
) -> AppResult<Json<Value>> {
    let store = state.store.clone();
    handlers::blocking(move || {
        Ok(store.log_audit(
            AuditLogEntry::new(AuditAction::Logout)
                .by(&admin.username)
                .with_details("Admin logged out"),
        )?)
    })
    .await?;

    Ok(Json(json!({ "message": "Logged out" })))
}

/// Generate JWT token
pub fn generate_jwt(username: &str, secret: &str, expiration_hours: u64) -> AppResult<String> {
    let now = Utc::now();
    let exp = now + Duration::hours(expiration_hours as i64);

    let claims = Claims {
        sub: username.to_string(),
        role: ADMIN_ROLE.to_string(),
        exp: exp.timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes())
    ).map_err(|e| AppError::InternalError(e.to_string()))
}
