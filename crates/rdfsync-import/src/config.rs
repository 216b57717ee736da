//! Configuration for the rdfsync importer.

use std::path::PathBuf;
use std::time::Duration;

use rdfsync_core::RdfFormat;
use serde::Deserialize;

use crate::error::{Result, SyncError};

/// Importer configuration.
///
/// Loaded from the `rdfsync.toml` `[sync]` section or
/// `RDFSYNC_IMPORT__` environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct SyncConfig {
    /// Root of the watched tree (default: ".").
    #[serde(default = "default_input_dir")]
    pub input_dir: PathBuf,

    /// Prefix of every context IRI this importer owns.
    #[serde(default = "default_context_prefix")]
    pub context_prefix: String,

    /// Seconds between reconciliation cycles.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: f64,

    /// Run cycles on a timer. Embedders that want to drive cycles
    /// themselves turn this off.
    #[serde(default = "default_true")]
    pub polling: bool,

    /// Also import `.rdf` files as RDF/XML.
    #[serde(default)]
    pub allow_rdfxml: bool,
}

impl SyncConfig {
    /// Extensions this importer recognizes.
    pub fn formats(&self) -> &'static [RdfFormat] {
        if self.allow_rdfxml {
            RdfFormat::WITH_RDFXML
        } else {
            RdfFormat::DEFAULT
        }
    }

    pub fn poll_interval(&self) -> Result<Duration> {
        if self.poll_interval_secs <= 0.0 {
            return Err(SyncError::Config(format!(
                "poll_interval_secs must be positive, got {}",
                self.poll_interval_secs
            )));
        }
        Duration::try_from_secs_f64(self.poll_interval_secs)
            .map_err(|e| SyncError::Config(format!("poll_interval_secs: {e}")))
    }

    /// Read the `[sync]` section of a loaded configuration.
    ///
    /// A missing section yields the defaults. A section that does not
    /// deserialize is logged and also yields the defaults.
    pub fn from_config(cfg: &config::Config) -> Self {
        match cfg.get::<SyncConfig>("sync") {
            Ok(c) => c,
            Err(config::ConfigError::NotFound(_)) => Self::default(),
            Err(e) => {
                tracing::warn!(error = %e, "Invalid [sync] configuration, using defaults");
                Self::default()
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.poll_interval()?;
        if self.context_prefix.trim_end_matches('/').is_empty() {
            return Err(SyncError::Config("context_prefix must not be empty".into()));
        }
        Ok(())
    }
}

fn default_input_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_context_prefix() -> String {
    "http://example.org".to_string()
}

fn default_poll_interval() -> f64 {
    2.0
}

fn default_true() -> bool {
    true
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            input_dir: default_input_dir(),
            context_prefix: default_context_prefix(),
            poll_interval_secs: default_poll_interval(),
            polling: true,
            allow_rdfxml: false,
        }
    }
}
