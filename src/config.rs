//! Session configuration
//!
//! Loaded from YAML; every key is optional.
//!
//! ```yaml
//! app_name: ACMetricsDump
//! output_dir: ./dumps
//! speed_unit: kmh        # kmh | ms | mph (SpeedKMH / SpeedMS / SpeedMPH accepted)
//! car_index: 0
//! columns: standard      # standard | extended
//! logging:
//!   filter: metricdump=debug
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use crate::types::{ColumnSet, SpeedUnit};
use crate::{DumpError, Result};

/// Session configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Title of the host app window
    pub app_name: String,
    /// Directory session files are written to.
    ///
    /// Relative paths resolve against the process working directory, which is
    /// the default. That is the host's working directory, not the app's own
    /// folder; set an absolute path to keep session files next to the app.
    pub output_dir: PathBuf,
    /// Unit the speed column is recorded in
    pub speed_unit: SpeedUnit,
    /// Car to sample; 0 is the player car
    pub car_index: u32,
    /// Persisted column set
    pub columns: ColumnSet,
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_name: "ACMetricsDump".to_string(),
            output_dir: PathBuf::from("."),
            speed_unit: SpeedUnit::default(),
            car_index: 0,
            columns: ColumnSet::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is not set
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { filter: "info".to_string() }
    }
}

impl Config {
    /// Parse and validate a YAML document
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml_ng::from_str(yaml)
            .map_err(|e| DumpError::parse_error("configuration YAML", e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|e| DumpError::file_error(path, e))?;
        Self::from_yaml(&yaml)
    }

    pub fn validate(&self) -> Result<()> {
        if self.app_name.trim().is_empty() {
            return Err(DumpError::Config { reason: "app_name must not be empty".to_string() });
        }
        if self.output_dir.as_os_str().is_empty() {
            return Err(DumpError::Config { reason: "output_dir must not be empty".to_string() });
        }
        EnvFilter::try_new(&self.logging.filter).map_err(|e| DumpError::Config {
            reason: format!("invalid logging filter '{}': {}", self.logging.filter, e),
        })?;
        Ok(())
    }

    /// Install a global fmt subscriber.
    ///
    /// `RUST_LOG` takes precedence over the configured filter. Returns `false`
    /// when a subscriber was already installed.
    pub fn init_logging(&self) -> bool {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&self.logging.filter));
        tracing_subscriber::fmt().with_env_filter(filter).try_init().is_ok()
    }
}
