//! HTTP server configuration object and helpers.

use std::fs;
use std::io;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

#[cfg(feature = "metrics")]
use actix_web_prom::PrometheusMetrics;
use petsflow::outbound::supabase::{SupabaseClient, SupabaseClientError};
use tracing::info;
use zeroize::Zeroizing;

use super::settings::{AppSettings, SettingsError};

/// Raised when the server configuration cannot be assembled.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error("failed to read Supabase key at {path}: {source}")]
    KeyFile { path: PathBuf, source: io::Error },
    #[error("Supabase key file {0} is empty")]
    EmptyKey(PathBuf),
    #[error(transparent)]
    Client(#[from] SupabaseClientError),
}

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) supabase: Option<SupabaseClient>,
    #[cfg(feature = "metrics")]
    pub(crate) prometheus: Option<PrometheusMetrics>,
}

impl ServerConfig {
    /// Configuration serving fixtures on `bind_addr`.
    #[must_use]
    pub fn new(bind_addr: SocketAddr) -> Self {
        Self {
            bind_addr,
            supabase: None,
            #[cfg(feature = "metrics")]
            prometheus: None,
        }
    }

    /// Resolve settings into a configuration, reading the service key when
    /// a Supabase project is configured.
    pub fn from_settings(settings: &AppSettings) -> Result<Self, ConfigError> {
        let config = Self::new(settings.bind_addr()?);
        let Some(url) = settings.supabase_url()? else {
            info!("no Supabase URL configured; serving fixture limits");
            return Ok(config);
        };
        let key = read_service_key(&settings.supabase_key_file())?;
        let client = SupabaseClient::new(&url, key, settings.request_timeout()?)?;
        info!(project = %url, "using Supabase limits backend");
        Ok(config.with_supabase(client))
    }

    /// Attach a Supabase client; limit checks and inserts go through it.
    #[must_use]
    pub fn with_supabase(mut self, client: SupabaseClient) -> Self {
        self.supabase = Some(client);
        self
    }

    #[cfg(feature = "metrics")]
    /// Attach Prometheus middleware to the configuration.
    #[must_use]
    pub fn with_metrics(mut self, prometheus: Option<PrometheusMetrics>) -> Self {
        self.prometheus = prometheus;
        self
    }
}

fn read_service_key(path: &Path) -> Result<Zeroizing<String>, ConfigError> {
    let raw = Zeroizing::new(fs::read_to_string(path).map_err(|source| ConfigError::KeyFile {
        path: path.to_path_buf(),
        source,
    })?);
    let key = raw.trim();
    if key.is_empty() {
        return Err(ConfigError::EmptyKey(path.to_path_buf()));
    }
    Ok(Zeroizing::new(key.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::Write;

    fn settings(url: Option<&str>, key_file: Option<PathBuf>) -> AppSettings {
        AppSettings {
            bind_addr: Some("127.0.0.1:0".to_owned()),
            supabase_url: url.map(str::to_owned),
            supabase_key_file: key_file,
            request_timeout_ms: 500,
        }
    }

    #[rstest]
    fn fixtures_are_used_without_a_project_url() {
        let config = ServerConfig::from_settings(&settings(None, None)).expect("config");
        assert!(config.supabase.is_none());
        assert_eq!(config.bind_addr.ip().to_string(), "127.0.0.1");
    }

    #[rstest]
    fn key_file_is_trimmed_and_used() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "  service-key  ").expect("write key");

        let config = ServerConfig::from_settings(&settings(
            Some("https://abc.supabase.co"),
            Some(file.path().to_path_buf()),
        ))
        .expect("config");
        assert!(config.supabase.is_some());
        assert_eq!(
            read_service_key(file.path()).expect("key").as_str(),
            "service-key"
        );
    }

    #[rstest]
    fn missing_key_file_is_reported() {
        let err = ServerConfig::from_settings(&settings(
            Some("https://abc.supabase.co"),
            Some(PathBuf::from("/nonexistent/petsflow/key")),
        ))
        .err()
        .expect("missing key");
        assert!(matches!(err, ConfigError::KeyFile { .. }));
    }

    #[rstest]
    fn blank_key_file_is_rejected() {
        let file = tempfile::NamedTempFile::new().expect("temp file");
        let err = read_service_key(file.path()).expect_err("blank key");
        assert!(matches!(err, ConfigError::EmptyKey(_)));
    }
}
