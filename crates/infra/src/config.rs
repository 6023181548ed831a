//! Environment-driven configuration.
//!
//! Values come from the process environment, optionally seeded from a `.env`
//! file. Everything has a development default except the secrets that must not
//! silently default in production.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use tracing::{info, warn};

const DEV_JWT_SECRET: &str = "dev-secret";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("environment variable {0} must be set in production")]
    Missing(&'static str),

    #[error("invalid {key} value `{value}`: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn is_production(self) -> bool {
        self == AppEnv::Production
    }
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub env: AppEnv,
    pub port: u16,
    /// `None` selects the in-memory store.
    pub database_url: Option<String>,
    pub jwt: JwtConfig,
    pub uploads: UploadConfig,
    pub smtp: Option<SmtpConfig>,
    pub mail_from: MailFrom,
    pub geocoder: GeocoderConfig,
}

#[derive(Clone, Debug)]
pub struct JwtConfig {
    pub secret: String,
    pub expire: Duration,
    pub cookie_expire_days: u32,
}

#[derive(Clone, Debug)]
pub struct UploadConfig {
    pub path: PathBuf,
    pub max_bytes: u64,
}

#[derive(Clone, Debug)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
}

#[derive(Clone, Debug)]
pub struct MailFrom {
    pub name: String,
    pub email: String,
}

#[derive(Clone, Debug)]
pub struct GeocoderConfig {
    pub provider: String,
    pub api_key: Option<String>,
}

impl AppConfig {
    /// Load from the process environment (after reading `.env` if present).
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            info!(path = %path.display(), "loaded .env");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup (tests pass a map).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let env = match var("APP_ENV").as_deref() {
            Some("production") => AppEnv::Production,
            Some("development") | None => AppEnv::Development,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    key: "APP_ENV",
                    value: other.to_string(),
                    reason: "expected `production` or `development`".to_string(),
                });
            }
        };

        let database_url = match env {
            AppEnv::Production => var("DATABASE_URL"),
            AppEnv::Development => var("DATABASE_LOCAL"),
        };

        let secret = match var("JWT_SECRET") {
            Some(secret) => secret,
            None if env.is_production() => return Err(ConfigError::Missing("JWT_SECRET")),
            None => {
                warn!("JWT_SECRET not set; using insecure dev default");
                DEV_JWT_SECRET.to_string()
            }
        };

        let expire = match var("JWT_EXPIRE") {
            Some(raw) => humantime::parse_duration(&raw).map_err(|e| ConfigError::Invalid {
                key: "JWT_EXPIRE",
                value: raw.clone(),
                reason: e.to_string(),
            })?,
            None => Duration::from_secs(30 * 24 * 60 * 60),
        };

        let smtp = match var("SMTP_HOST") {
            Some(host) => Some(SmtpConfig {
                host,
                port: parse_or(&var, "SMTP_PORT", 587)?,
                username: var("SMTP_EMAIL").unwrap_or_default(),
                password: var("SMTP_PASSWORD").unwrap_or_default(),
            }),
            None => {
                info!("SMTP_HOST not set; outgoing mail will only be logged");
                None
            }
        };

        let provider = var("GEOCODER_PROVIDER").unwrap_or_else(|| "mapquest".to_string());
        if provider != "mapquest" {
            return Err(ConfigError::Invalid {
                key: "GEOCODER_PROVIDER",
                value: provider,
                reason: "only `mapquest` is supported".to_string(),
            });
        }

        Ok(Self {
            env,
            port: parse_or(&var, "PORT", 5000)?,
            database_url,
            jwt: JwtConfig {
                secret,
                expire,
                cookie_expire_days: parse_or(&var, "JWT_COOKIE_EXPIRE", 30)?,
            },
            uploads: UploadConfig {
                path: var("FILE_UPLOAD_PATH")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from("./public/uploads")),
                max_bytes: parse_or(&var, "MAX_FILE_UPLOAD", 1_000_000)?,
            },
            smtp,
            mail_from: MailFrom {
                name: var("FROM_NAME").unwrap_or_else(|| "DevCamper".to_string()),
                email: var("FROM_EMAIL").unwrap_or_else(|| "noreply@devcamper.io".to_string()),
            },
            geocoder: GeocoderConfig {
                provider,
                api_key: var("GEOCODER_API_KEY"),
            },
        })
    }
}

fn parse_or<T, F>(var: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: core::str::FromStr,
    T::Err: core::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match var(key) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            value: raw.clone(),
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}
