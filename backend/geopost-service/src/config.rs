/// Configuration management for Geopost Service
///
/// All settings come from environment variables (a `.env` file is loaded by
/// `main` before this runs).
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application settings
    pub app: AppConfig,
    /// CORS configuration
    pub cors: CorsConfig,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Upload storage
    pub upload: UploadConfig,
    /// Proximity query defaults
    pub geo: GeoConfig,
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment (development, staging, production)
    pub env: String,
    /// Server host to bind to
    pub host: String,
    /// Server port to bind to
    pub port: u16,
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Comma-separated list of allowed origins
    pub allowed_origins: String,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite URL
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Directory stored uploads are written to and served from
    pub dir: PathBuf,
    pub max_upload_mb: u64,
}

impl UploadConfig {
    pub fn max_upload_bytes(&self) -> u64 {
        self.max_upload_mb.saturating_mul(1024 * 1024)
    }
}

/// Defaults applied when a proximity query omits `radius` or `limit`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoConfig {
    pub default_radius_m: f64,
    pub default_limit: i64,
}

impl Default for GeoConfig {
    fn default() -> Self {
        Self {
            default_radius_m: 200.0,
            default_limit: 50,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        let app_env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());
        let is_production = app_env.eq_ignore_ascii_case("production");

        Ok(Config {
            app: AppConfig {
                env: app_env.clone(),
                host: std::env::var("GEOPOST_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: std::env::var("GEOPOST_PORT")
                    .or_else(|_| std::env::var("PORT"))
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(3000),
            },
            cors: {
                let allowed_origins = match std::env::var("CORS_ALLOWED_ORIGINS") {
                    Ok(value) => value,
                    Err(_) if is_production => {
                        return Err("CORS_ALLOWED_ORIGINS must be set in production".to_string())
                    }
                    Err(_) => "http://localhost:3000".to_string(),
                };

                if is_production && allowed_origins.trim() == "*" {
                    return Err("CORS_ALLOWED_ORIGINS cannot be '*' in production".to_string());
                }

                CorsConfig { allowed_origins }
            },
            database: DatabaseConfig {
                url: db_pool::DbConfig::from_env(crate::SERVICE_NAME).database_url,
            },
            upload: UploadConfig {
                dir: std::env::var("UPLOAD_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| PathBuf::from("uploads")),
                max_upload_mb: std::env::var("MAX_UPLOAD_MB")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(20),
            },
            geo: {
                let default_radius_m = parse_env_or_default("GEO_DEFAULT_RADIUS_M", 200.0)?;
                if !default_radius_m.is_finite() || default_radius_m <= 0.0 {
                    return Err("GEO_DEFAULT_RADIUS_M must be a positive number".to_string());
                }

                let default_limit: i64 = std::env::var("GEO_DEFAULT_LIMIT")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(50);
                if default_limit <= 0 {
                    return Err("GEO_DEFAULT_LIMIT must be a positive integer".to_string());
                }

                GeoConfig {
                    default_radius_m,
                    default_limit,
                }
            },
        })
    }

    pub fn is_production(&self) -> bool {
        self.app.env.eq_ignore_ascii_case("production")
    }
}

fn parse_env_or_default(key: &str, default: f64) -> Result<f64, String> {
    match std::env::var(key) {
        Ok(val) => val
            .parse()
            .map_err(|e| format!("Failed to parse {}='{}': {}", key, val, e)),
        Err(_) => Ok(default),
    }
}
