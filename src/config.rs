//! Environment-driven configuration.
//!
//! Everything is an explicit struct passed to the components that need it;
//! there is no process-wide settings object.

use dotenv::dotenv;
use std::env;
use std::path::{Path, PathBuf};

/// Token issuance and verification settings.
///
/// The four `validate_*` toggles control which checks run during token
/// verification; issuance always writes the full claim set.
#[derive(Debug, Clone)]
pub struct TokenValidation {
    /// Value of the `iss` claim, checked on verification when enabled.
    pub issuer: String,
    /// Value of the `aud` claim, checked on verification when enabled.
    pub audience: String,
    /// Symmetric HMAC-SHA-256 signing key.
    pub signing_key: String,
    /// Token lifetime in minutes.
    pub lifetime_minutes: i64,
    /// Leeway applied to time-based checks, in minutes.
    pub clock_skew_minutes: i64,
    pub validate_audience: bool,
    pub validate_issuer: bool,
    pub validate_signing_key: bool,
    pub validate_lifetime: bool,
}

impl Default for TokenValidation {
    fn default() -> Self {
        Self {
            issuer: String::new(),
            audience: String::new(),
            signing_key: String::new(),
            lifetime_minutes: 20,
            clock_skew_minutes: 5,
            validate_audience: true,
            validate_issuer: true,
            validate_signing_key: true,
            validate_lifetime: true,
        }
    }
}

impl TokenValidation {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            issuer: env::var("TOKEN_ISSUER").unwrap_or_default(),
            audience: env::var("TOKEN_AUDIENCE").unwrap_or_default(),
            signing_key: env::var("TOKEN_SIGNING_KEY").unwrap_or_else(|_| {
                "dev-secret-change-in-production-minimum-32-characters".to_string()
            }),
            lifetime_minutes: env_i64("TOKEN_LIFETIME_MINUTES", defaults.lifetime_minutes),
            clock_skew_minutes: env_i64("TOKEN_CLOCK_SKEW_MINUTES", defaults.clock_skew_minutes),
            validate_audience: env_bool("TOKEN_VALIDATE_AUDIENCE", defaults.validate_audience),
            validate_issuer: env_bool("TOKEN_VALIDATE_ISSUER", defaults.validate_issuer),
            validate_signing_key: env_bool(
                "TOKEN_VALIDATE_SIGNING_KEY",
                defaults.validate_signing_key,
            ),
            validate_lifetime: env_bool("TOKEN_VALIDATE_LIFETIME", defaults.validate_lifetime),
        }
    }
}

/// Top-level application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub db_path: String,
    pub token: TokenValidation,
    /// When set, 500 responses carry the underlying error message instead of
    /// a generic one. Off by default; intended for non-production use only.
    pub expose_error_detail: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            db_path: resolve_data_path(env::var("AUTH_DB_PATH").ok(), "authgate_identity.db"),
            token: TokenValidation::from_env(),
            expose_error_detail: env_bool("EXPOSE_ERROR_DETAIL", false),
        }
    }
}

fn env_bool(name: &str, default: bool) -> bool {
    env::var(name)
        .map(|v| matches!(v.as_str(), "1" | "true" | "TRUE" | "on" | "ON"))
        .unwrap_or(default)
}

fn env_i64(name: &str, default: i64) -> i64 {
    env::var(name)
        .ok()
        .and_then(|v| v.parse::<i64>().ok())
        .filter(|&v| v > 0)
        .unwrap_or(default)
}

fn default_data_path(filename: &str) -> String {
    // Anchor defaults to the crate directory so running from elsewhere doesn't
    // create a new empty DB in a different working directory.
    let base = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    base.join(filename).to_string_lossy().to_string()
}

pub fn resolve_data_path(env_value: Option<String>, default_filename: &str) -> String {
    let base = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let Some(raw) = env_value.filter(|v| !v.trim().is_empty()) else {
        return default_data_path(default_filename);
    };

    let p = PathBuf::from(raw);
    if p.is_absolute() {
        return p.to_string_lossy().to_string();
    }

    // Treat relative paths as relative to the crate directory, not the
    // caller's cwd.
    base.join(p).to_string_lossy().to_string()
}

pub fn load_env() {
    // 1) Standard dotenv search (cwd + parents)
    let _ = dotenv();

    // 2) Also try repo-root .env (common when running with --manifest-path
    // from elsewhere). CARGO_MANIFEST_DIR points at the crate at compile time.
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));

    let candidates = [manifest_dir.join(".env"), manifest_dir.join("../.env")];

    for p in candidates {
        if p.exists() {
            let _ = dotenv::from_path(&p);
        }
    }
}
