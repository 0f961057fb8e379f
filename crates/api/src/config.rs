use std::path::PathBuf;

use crate::auth::jwt::JwtConfig;

/// Credentials for the first admin account, created when no staff user exists.
#[derive(Debug, Clone)]
pub struct BootstrapAdmin {
    pub username: String,
    pub password: String,
}

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Root directory for uploaded files and signatures, served at `/uploads`.
    pub upload_dir: PathBuf,
    /// Largest accepted request body, in bytes.
    pub max_upload_bytes: usize,
    /// Directory holding the TrueType family used for PDF reports.
    pub report_font_dir: PathBuf,
    /// Family name: `{name}-Regular.ttf`, `{name}-Bold.ttf`, ...
    pub report_font_name: String,
    pub bootstrap_admin: Option<BootstrapAdmin>,
    /// JWT token configuration (secret, expiry durations).
    pub jwt: JwtConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                          |
    /// |------------------------|----------------------------------|
    /// | `HOST`                 | `0.0.0.0`                        |
    /// | `PORT`                 | `3000`                           |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`          |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                             |
    /// | `UPLOAD_DIR`           | `storage/uploads`                |
    /// | `MAX_UPLOAD_BYTES`     | `20971520` (20 MiB)              |
    /// | `REPORT_FONT_DIR`      | `assets/fonts`                   |
    /// | `REPORT_FONT_NAME`     | `LiberationSans`                 |
    /// | `ADMIN_USERNAME`       | unset (no bootstrap)             |
    /// | `ADMIN_PASSWORD`       | unset (no bootstrap)             |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let upload_dir = PathBuf::from(
            std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "storage/uploads".into()),
        );

        let max_upload_bytes: usize = std::env::var("MAX_UPLOAD_BYTES")
            .unwrap_or_else(|_| (20 * 1024 * 1024).to_string())
            .parse()
            .expect("MAX_UPLOAD_BYTES must be a valid usize");

        let report_font_dir = PathBuf::from(
            std::env::var("REPORT_FONT_DIR").unwrap_or_else(|_| "assets/fonts".into()),
        );
        let report_font_name =
            std::env::var("REPORT_FONT_NAME").unwrap_or_else(|_| "LiberationSans".into());

        let bootstrap_admin = match (
            std::env::var("ADMIN_USERNAME"),
            std::env::var("ADMIN_PASSWORD"),
        ) {
            (Ok(username), Ok(password)) if !username.is_empty() && !password.is_empty() => {
                Some(BootstrapAdmin { username, password })
            }
            _ => None,
        };

        let jwt = JwtConfig::from_env();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            upload_dir,
            max_upload_bytes,
            report_font_dir,
            report_font_name,
            bootstrap_admin,
            jwt,
        }
    }
}
