//! Configuration file
//!
//! ```json
//! {
//!   "data_dir": "/var/lib/mirrordb",
//!   "remote_uri": "mongodb://db.internal:27017/yt",
//!   "connect_timeout_ms": 4000,
//!   "unsupported_operators": "ignore",
//!   "seed_on_empty": true,
//!   "log_level": "info"
//! }
//! ```
//!
//! Only `data_dir` is required. `MIRRORDB_REMOTE_URI` overrides `remote_uri`.

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::errors::{CliError, CliResult};
use crate::filter::OperatorPolicy;
use crate::observability::Severity;
use crate::selector::{RemoteConnector, SelectorOptions, StoreSelector, UnconfiguredRemote};
use crate::storage::default_seed;

/// Environment variable that replaces `remote_uri`
pub const REMOTE_URI_ENV: &str = "MIRRORDB_REMOTE_URI";

/// Configuration file structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Data directory (required)
    pub data_dir: String,

    /// Remote backend address (optional; absent means local only)
    #[serde(default)]
    pub remote_uri: Option<String>,

    /// Bound on the remote connection attempt (default 4000)
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,

    /// Policy for unrecognized filter operators and pipeline stages
    #[serde(default)]
    pub unsupported_operators: OperatorPolicy,

    /// Bootstrap an empty table with the built-in seed set (default true)
    #[serde(default = "default_seed_on_empty")]
    pub seed_on_empty: bool,

    /// Minimum log severity (default "info")
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_connect_timeout_ms() -> u64 {
    4000
}
fn default_seed_on_empty() -> bool {
    true
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from file, apply the environment override and
    /// validate.
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        let mut config = Self::parse(&content)?;
        config.apply_remote_override(std::env::var(REMOTE_URI_ENV).ok());
        config.validate()?;

        Ok(config)
    }

    /// Parse without validating
    pub fn parse(content: &str) -> CliResult<Self> {
        serde_json::from_str(content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))
    }

    /// A non-empty override replaces `remote_uri`
    pub fn apply_remote_override(&mut self, uri: Option<String>) {
        if let Some(uri) = uri.filter(|u| !u.trim().is_empty()) {
            self.remote_uri = Some(uri);
        }
    }

    pub fn validate(&self) -> CliResult<()> {
        if self.data_dir.trim().is_empty() {
            return Err(CliError::config_error("data_dir must not be empty"));
        }

        if self.connect_timeout_ms == 0 {
            return Err(CliError::config_error("connect_timeout_ms must be > 0"));
        }

        self.min_severity()?;

        Ok(())
    }

    /// Get data directory as Path
    pub fn data_path(&self) -> &Path {
        Path::new(&self.data_dir)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn min_severity(&self) -> CliResult<Severity> {
        Severity::parse(&self.log_level).ok_or_else(|| {
            CliError::config_error(format!(
                "Invalid log_level: '{}'. Expected trace, info, warn, error or fatal.",
                self.log_level
            ))
        })
    }

    /// Connector for `remote_uri`.
    ///
    /// This binary links no remote client, so a configured URI still ends
    /// in fallback; embedders pass their own connector to the selector.
    pub fn connector(&self) -> Arc<dyn RemoteConnector> {
        match &self.remote_uri {
            Some(uri) => Arc::new(UnconfiguredRemote::for_uri(uri.clone())),
            None => Arc::new(UnconfiguredRemote::new()),
        }
    }

    pub fn selector_options(&self) -> CliResult<SelectorOptions> {
        let seed = if self.seed_on_empty {
            default_seed()?
        } else {
            Vec::new()
        };

        Ok(SelectorOptions::new(self.data_path())
            .with_timeout(self.connect_timeout())
            .with_seed(seed)
            .with_policy(self.unsupported_operators))
    }

    pub fn build_selector(&self) -> CliResult<StoreSelector> {
        Ok(StoreSelector::new(self.connector(), self.selector_options()?))
    }
}
