//! Process configuration loaded via OrthoConfig.
//!
//! Values come from `--flags`, `PETSFLOW_*` environment variables and
//! configuration files, in that order of precedence.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_KEY_FILE: &str = "/var/run/secrets/supabase_key";

/// Raised when a configured value cannot be used.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid bind address {value}: {source}")]
    BindAddr {
        value: String,
        source: std::net::AddrParseError,
    },
    #[error("invalid Supabase URL {value}: {source}")]
    SupabaseUrl {
        value: String,
        source: url::ParseError,
    },
    #[error("request timeout must be positive")]
    ZeroTimeout,
}

/// Server settings.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "PETSFLOW")]
pub struct AppSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// Supabase project URL. Without it the server runs on fixtures.
    pub supabase_url: Option<String>,
    /// File holding the Supabase service key.
    pub supabase_key_file: Option<PathBuf>,
    /// Per-request timeout for backend calls, in milliseconds.
    #[ortho_config(default = 10_000)]
    pub request_timeout_ms: u64,
}

impl AppSettings {
    /// Listen address, defaulting to all interfaces on port 8080.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let value = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        value.parse().map_err(|source| SettingsError::BindAddr {
            value: value.to_owned(),
            source,
        })
    }

    /// Parsed Supabase project URL, if configured.
    pub fn supabase_url(&self) -> Result<Option<Url>, SettingsError> {
        self.supabase_url
            .as_deref()
            .filter(|value| !value.trim().is_empty())
            .map(|value| {
                Url::parse(value).map_err(|source| SettingsError::SupabaseUrl {
                    value: value.to_owned(),
                    source,
                })
            })
            .transpose()
    }

    pub fn supabase_key_file(&self) -> PathBuf {
        self.supabase_key_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_KEY_FILE))
    }

    pub fn request_timeout(&self) -> Result<Duration, SettingsError> {
        match self.request_timeout_ms {
            0 => Err(SettingsError::ZeroTimeout),
            millis => Ok(Duration::from_millis(millis)),
        }
    }
}
