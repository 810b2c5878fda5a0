use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use config::{Config, Environment, File};
use deferral_core::domain::{CanonicalZone, DEFAULT_ZONE_NAME};
use deferral_core::impls::HttpSinkConfig;
use serde::Deserialize;

/// Runtime settings.
///
/// Precedence: CLI flags (applied in main) > `DEFERRAL_*` env / `.env` >
/// config file > defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Listen address for the intake server.
    pub bind: String,
    /// Single path segment the intake form is posted to.
    pub route: String,
    pub poll_interval_ms: u64,
    pub time_zone: String,
    pub log_level: String,
    pub log_json: bool,
    /// Record payloads instead of sending them downstream.
    pub dry_run: bool,
    pub sink: HttpSinkConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".to_string(),
            route: "schedule-request".to_string(),
            poll_interval_ms: 1_000,
            time_zone: DEFAULT_ZONE_NAME.to_string(),
            log_level: "info".to_string(),
            log_json: false,
            dry_run: false,
            sink: HttpSinkConfig::default(),
        }
    }
}

impl Settings {
    pub fn load_with_path(path: Option<&str>) -> Result<Self> {
        dotenvy::dotenv().ok();

        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(Path::new(path)).required(true));
        } else {
            builder = builder.add_source(File::with_name("deferral").required(false));
        }
        builder = builder.add_source(
            Environment::with_prefix("DEFERRAL")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings: Settings = builder
            .build()
            .context("failed to read configuration")?
            .try_deserialize()
            .context("invalid configuration")?;
        Ok(settings)
    }

    /// Startup checks. Anything wrong here is fatal.
    pub fn validate(&self) -> Result<()> {
        self.bind_addr()?;
        self.zone()?;
        if self.poll_interval_ms == 0 {
            bail!("poll_interval_ms must be greater than zero");
        }
        if self.sink.timeout_ms == 0 {
            bail!("sink.timeout_ms must be greater than zero");
        }
        if self.route.is_empty() || self.route.contains('/') {
            bail!("route must be a single path segment, got {:?}", self.route);
        }
        if self.sink.endpoint.trim().is_empty() {
            bail!("sink.endpoint is missing");
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> Result<SocketAddr> {
        self.bind
            .parse()
            .with_context(|| format!("invalid bind address {:?}", self.bind))
    }

    pub fn zone(&self) -> Result<CanonicalZone> {
        Ok(CanonicalZone::from_name(&self.time_zone)?)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}
