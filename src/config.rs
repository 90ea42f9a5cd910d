//! Configuration module

use std::env;
use std::path::PathBuf;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,

    /// Directory holding the JSON collections
    pub data_dir: PathBuf,

    /// Scan history file name (inside `data_dir`)
    pub history_file: String,

    /// Audit log file name (inside `data_dir`)
    pub audit_file: String,

    /// Where uploaded notes are kept
    pub upload_dir: PathBuf,

    /// ONNX model
    pub model_path: PathBuf,

    /// Training metadata JSON shown on the performance view
    pub model_info_path: PathBuf,

    /// Admin username
    pub admin_username: String,

    /// Argon2 PHC hash of the admin password, if provided
    pub admin_password_hash: Option<String>,

    /// Plaintext fallback, hashed at startup when no hash is configured
    pub admin_password: String,

    /// JWT secret key
    pub jwt_secret: String,

    /// JWT expiration in hours
    pub jwt_expiration_hours: u64,

    /// Records per history page
    pub history_page_size: usize,

    /// Upload body limit
    pub max_upload_bytes: usize,

    /// Environment (development, production)
    pub environment: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 5000,
            data_dir: PathBuf::from("./data"),
            history_file: "scan_history.json".to_string(),
            audit_file: "audit_logs.json".to_string(),
            upload_dir: PathBuf::from("./uploads"),
            model_path: PathBuf::from("final_model.onnx"),
            model_info_path: PathBuf::from("model_info.json"),
            admin_username: "admin".to_string(),
            admin_password_hash: None,
            admin_password: "admin123".to_string(),
            jwt_secret: "notecheck-secret-key-change-in-production".to_string(),
            jwt_expiration_hours: 24,
            history_page_size: 20,
            max_upload_bytes: 10 * 1024 * 1024,
            environment: "development".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),

            data_dir: env::var("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),

            history_file: env::var("HISTORY_FILE").unwrap_or(defaults.history_file),

            audit_file: env::var("AUDIT_FILE").unwrap_or(defaults.audit_file),

            upload_dir: env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.upload_dir),

            model_path: env::var("MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.model_path),

            model_info_path: env::var("MODEL_INFO_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.model_info_path),

            admin_username: env::var("ADMIN_USERNAME").unwrap_or(defaults.admin_username),

            admin_password_hash: env::var("ADMIN_PASSWORD_HASH").ok().filter(|h| !h.is_empty()),

            admin_password: env::var("ADMIN_PASSWORD").unwrap_or(defaults.admin_password),

            jwt_secret: env::var("JWT_SECRET").unwrap_or(defaults.jwt_secret),

            jwt_expiration_hours: env::var("JWT_EXPIRATION_HOURS")
                .ok()
                .and_then(|h| h.parse().ok())
                .unwrap_or(defaults.jwt_expiration_hours),

            history_page_size: env::var("HISTORY_PAGE_SIZE")
                .ok()
                .and_then(|n| n.parse().ok())
                .filter(|&n: &usize| n > 0)
                .unwrap_or(defaults.history_page_size),

            max_upload_bytes: env::var("MAX_UPLOAD_BYTES")
                .ok()
                .and_then(|n| n.parse().ok())
                .unwrap_or(defaults.max_upload_bytes),

            environment: env::var("ENVIRONMENT").unwrap_or(defaults.environment),
        }
    }

    pub fn history_path(&self) -> PathBuf {
        self.data_dir.join(&self.history_file)
    }

    pub fn audit_path(&self) -> PathBuf {
        self.data_dir.join(&self.audit_file)
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}
