//! Audit log model

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::scan::{now_timestamp, timestamp_format};

/// Default actor for administrative actions
pub const DEFAULT_AUDIT_USER: &str = "admin";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    Login,
    LoginFail,
    Logout,
    Export,
    Delete,
    ClearHistory,
    Verify,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Login => "LOGIN",
            Self::LoginFail => "LOGIN_FAIL",
            Self::Logout => "LOGOUT",
            Self::Export => "EXPORT",
            Self::Delete => "DELETE",
            Self::ClearHistory => "CLEAR_HISTORY",
            Self::Verify => "VERIFY",
        }
    }
}

/// Immutable once written
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuditLogEntry {
    #[serde(with = "timestamp_format")]
    pub timestamp: NaiveDateTime,
    pub user: String,
    pub action: AuditAction,
    #[serde(default)]
    pub details: String,
}

impl AuditLogEntry {
    pub fn new(action: AuditAction) -> Self {
        Self {
            timestamp: now_timestamp(),
            user: DEFAULT_AUDIT_USER.to_string(),
            action,
            details: String::new(),
        }
    }

    pub fn by(mut self, user: &str) -> Self {
        self.user = user.to_string();
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = details.into();
        self
    }
}
