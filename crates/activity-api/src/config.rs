//! Server configuration from environment variables.

use activity_log::{LogConfig, RetentionPolicy, DEFAULT_CAPACITY};
use activity_store::{
    ActivityBackend, InMemoryBackend, JsonFileBackend, JsonlBackend, SqliteBackend, StoreError,
};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_LISTEN: &str = "0.0.0.0:8002";
const DEFAULT_STORE_PATH: &str = "activity_log.json";
const DEFAULT_RETENTION_INTERVAL_SECS: u64 = 3600;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid {var}: {value}")]
    Invalid { var: &'static str, value: String },
}

/// Which backend holds the persisted collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Memory,
    Json,
    Jsonl,
    Sqlite,
}

impl StoreKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" | "mem" => Some(StoreKind::Memory),
            "json" | "file" => Some(StoreKind::Json),
            "jsonl" => Some(StoreKind::Jsonl),
            "sqlite" => Some(StoreKind::Sqlite),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub listen: SocketAddr,
    pub store: StoreKind,
    pub store_path: PathBuf,
    pub capacity: usize,
    pub fresh_start: bool,
    pub retention: Option<RetentionPolicy>,
}

impl ServerConfig {
    /// Read `ACTIVITY_*` variables; unset ones take their defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let listen_raw = lookup("ACTIVITY_LISTEN").unwrap_or_else(|| DEFAULT_LISTEN.to_string());
        let listen = listen_raw.parse().map_err(|_| ConfigError::Invalid {
            var: "ACTIVITY_LISTEN",
            value: listen_raw.clone(),
        })?;

        let store = match lookup("ACTIVITY_STORE") {
            None => StoreKind::Json,
            Some(v) => StoreKind::parse(&v).ok_or(ConfigError::Invalid {
                var: "ACTIVITY_STORE",
                value: v,
            })?,
        };
        let store_path = lookup("ACTIVITY_STORE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_PATH));
        let capacity = parse_number("ACTIVITY_CAPACITY", &lookup)?
            .map(|n| n as usize)
            .unwrap_or(DEFAULT_CAPACITY);
        let fresh_start = match lookup("ACTIVITY_FRESH_START") {
            None => false,
            Some(v) => parse_bool(&v).ok_or(ConfigError::Invalid {
                var: "ACTIVITY_FRESH_START",
                value: v,
            })?,
        };
        let retention = match parse_number("ACTIVITY_RETENTION_DAYS", &lookup)? {
            None => None,
            Some(days) => {
                let secs = parse_number("ACTIVITY_RETENTION_INTERVAL_SECS", &lookup)?
                    .unwrap_or(DEFAULT_RETENTION_INTERVAL_SECS);
                Some(RetentionPolicy {
                    max_age_days: u32::try_from(days).map_err(|_| ConfigError::Invalid {
                        var: "ACTIVITY_RETENTION_DAYS",
                        value: days.to_string(),
                    })?,
                    interval: Duration::from_secs(secs),
                })
            }
        };

        Ok(Self {
            listen,
            store,
            store_path,
            capacity,
            fresh_start,
            retention,
        })
    }

    pub fn log_config(&self) -> LogConfig {
        LogConfig {
            capacity: self.capacity,
            restore_on_start: !self.fresh_start,
            session_id: None,
        }
    }

    pub fn build_backend(&self) -> Result<Arc<dyn ActivityBackend>, StoreError> {
        Ok(match self.store {
            StoreKind::Memory => Arc::new(InMemoryBackend::new()),
            StoreKind::Json => Arc::new(JsonFileBackend::new(&self.store_path)),
            StoreKind::Jsonl => Arc::new(JsonlBackend::new(&self.store_path, self.capacity)),
            StoreKind::Sqlite => Arc::new(SqliteBackend::new(&self.store_path)?),
        })
    }
}

fn parse_number<F>(var: &'static str, lookup: &F) -> Result<Option<u64>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        None => Ok(None),
        Some(v) => v
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { var, value: v }),
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
