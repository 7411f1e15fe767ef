use std::{env, str::FromStr};

use crate::errors::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Rest,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "postgres" => Ok(StoreBackend::Postgres),
            "rest" | "supabase" => Ok(StoreBackend::Rest),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(AppError::EnvError(format!("Unknown RECORD_STORE: {other}"))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub store: StoreBackend,
    pub database_url: Option<String>,
    pub supabase_url: Option<String>,
    pub supabase_anon_key: Option<String>,
    pub redis_url: Option<String>,
    pub allowed_origins: Vec<String>,
    pub max_concurrent_requests: usize,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub email_address: Option<String>,
    pub email_password: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3001,
            store: StoreBackend::Postgres,
            database_url: None,
            supabase_url: None,
            supabase_anon_key: None,
            redis_url: None,
            allowed_origins: vec!["http://localhost:3000".to_string()],
            max_concurrent_requests: 256,
            smtp_host: "smtp.gmail.com".to_string(),
            smtp_port: 587,
            email_address: None,
            email_password: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, AppError> {
        let config = Self {
            port: try_load("PORT", 3001)?,
            store: try_load("RECORD_STORE", StoreBackend::Postgres)?,
            database_url: optional("DATABASE_URL"),
            supabase_url: optional("SUPABASE_URL"),
            supabase_anon_key: optional("SUPABASE_ANON_KEY"),
            redis_url: optional("REDIS_URL"),
            allowed_origins: optional("ALLOWED_ORIGINS")
                .unwrap_or_else(|| "http://localhost:3000".to_string())
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            max_concurrent_requests: try_load("MAX_CONCURRENT_REQUESTS", 256)?,
            smtp_host: optional("SMTP_HOST").unwrap_or_else(|| "smtp.gmail.com".to_string()),
            smtp_port: try_load("SMTP_PORT", 587)?,
            email_address: optional("EMAIL_ADDRESS"),
            email_password: optional("EMAIL_PASSWORD"),
        };

        config.check()?;
        Ok(config)
    }

    fn check(&self) -> Result<(), AppError> {
        match self.store {
            StoreBackend::Postgres => {
                required(&self.database_url, "DATABASE_URL")?;
                required(&self.redis_url, "REDIS_URL")?;
            }
            StoreBackend::Rest => {
                required(&self.supabase_url, "SUPABASE_URL")?;
                required(&self.supabase_anon_key, "SUPABASE_ANON_KEY")?;
                required(&self.redis_url, "REDIS_URL")?;
            }
            StoreBackend::Memory => {}
        }
        Ok(())
    }
}

pub fn required<'a>(value: &'a Option<String>, key: &str) -> Result<&'a str, AppError> {
    value
        .as_deref()
        .ok_or_else(|| AppError::EnvError(format!("{key} must be set")))
}

fn optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn try_load<T>(key: &str, default: T) -> Result<T, AppError>
where
    T: FromStr + std::fmt::Debug,
    T::Err: std::fmt::Display,
{
    match optional(key) {
        Some(raw) => raw
            .parse()
            .map_err(|e| AppError::EnvError(format!("Invalid {key} value: {e}"))),
        None => {
            tracing::info!("{} not set, using default: {:?}", key, default);
            Ok(default)
        }
    }
}
