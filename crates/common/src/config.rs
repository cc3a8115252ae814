//! Configuration management following 12-factor app principles
//!
//! All configuration is loaded from environment variables to ensure
//! clean separation between code and config. Completion provider settings
//! live next to the provider in `nexo-llm`.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::env;

/// Default listen port
const DEFAULT_PORT: u16 = 3000;

/// Default maximum upload size (10 MiB)
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Default delay between streamed reply chunks
const DEFAULT_STREAM_CHUNK_DELAY_MS: u64 = 20;

/// Which backend holds conversations and messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreProvider {
    Postgres,
    Memory,
}

impl std::str::FromStr for StoreProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StoreProvider::Postgres),
            "memory" | "in-memory" => Ok(StoreProvider::Memory),
            other => Err(anyhow::anyhow!(
                "Unknown store provider: {}. Supported providers: postgres, memory",
                other
            )),
        }
    }
}

/// Log output format for the tracing subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Allowed cross-origin callers.
///
/// A wildcard never allows credentials; an explicit list does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CorsOrigins {
    Any,
    List(Vec<String>),
}

impl CorsOrigins {
    /// Parse `*` or a comma-separated origin list. A `*` anywhere in the
    /// list wins over explicit entries.
    pub fn parse(raw: &str) -> Self {
        let origins: Vec<String> = raw
            .split(',')
            .map(|s| s.trim().trim_end_matches('/').to_string())
            .filter(|s| !s.is_empty())
            .collect();

        if origins.is_empty() || origins.iter().any(|o| o == "*") {
            CorsOrigins::Any
        } else {
            CorsOrigins::List(origins)
        }
    }

    /// Whether credentialed requests are allowed for this origin set
    pub fn allows_credentials(&self) -> bool {
        matches!(self, CorsOrigins::List(_))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Store backend
    pub store_provider: StoreProvider,

    /// Database connection URL (required for the Postgres store)
    pub database_url: Option<String>,

    /// Database name, overriding the one in `database_url`
    pub database_name: Option<String>,

    /// Cross-origin allow-list
    pub cors_origins: CorsOrigins,

    /// Upload size limit in bytes
    pub max_upload_bytes: usize,

    /// Delay between streamed reply chunks, in milliseconds
    pub stream_chunk_delay_ms: u64,

    /// Runtime configuration
    pub log_format: LogFormat,
    pub rust_log: String,
    pub port: u16,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if it exists

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let store_provider: StoreProvider = lookup("STORE_PROVIDER")
            .unwrap_or_else(|| "postgres".to_string())
            .parse()?;

        let database_url = lookup("DATABASE_URL").filter(|v| !v.trim().is_empty());
        if store_provider == StoreProvider::Postgres && database_url.is_none() {
            return Err(anyhow::anyhow!(
                "DATABASE_URL is required when STORE_PROVIDER is postgres"
            ));
        }

        let log_format = match lookup("LOG_FORMAT").as_deref().map(str::trim) {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        let config = Self {
            store_provider,
            database_url,
            database_name: lookup("DATABASE_NAME").filter(|v| !v.trim().is_empty()),
            cors_origins: CorsOrigins::parse(
                &lookup("CORS_ALLOWED_ORIGINS").unwrap_or_else(|| "*".to_string()),
            ),
            max_upload_bytes: parse_or(&lookup, "MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES),
            stream_chunk_delay_ms: parse_or(
                &lookup,
                "STREAM_CHUNK_DELAY_MS",
                DEFAULT_STREAM_CHUNK_DELAY_MS,
            ),
            log_format,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            port: parse_or(&lookup, "PORT", DEFAULT_PORT),
        };

        Ok(config)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
