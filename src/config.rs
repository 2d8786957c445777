// Settings for price retrieval and indicator calculation.
//
// Loaded from a JSON file. Every field carries `#[serde(default)]`, so a
// partial file (or no file at all) falls back to the defaults below.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::indicators::{MAVG_DAYS, RSI_PERIOD};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_workbook() -> String {
    "VIR Research Prices".to_string()
}

fn default_sheet() -> String {
    "Prices".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_lookback_weeks() -> i64 {
    104
}

fn default_bdh_lookback_weeks() -> i64 {
    52
}

fn default_mavg_days() -> usize {
    MAVG_DAYS
}

fn default_rsi_period() -> usize {
    RSI_PERIOD
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Config {
    /// Directory holding price workbooks.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Workbook name (without extension) read for workbook-backed prices.
    #[serde(default = "default_workbook")]
    pub workbook: String,

    /// Sheet of the workbook holding closing prices.
    #[serde(default = "default_sheet")]
    pub sheet: String,

    /// Base URL of the market-data bridge. Without it the vendor integration
    /// is unavailable and only workbook/in-memory prices can be used.
    #[serde(default)]
    pub vendor_url: Option<String>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Default history length for price requests.
    #[serde(default = "default_lookback_weeks")]
    pub lookback_weeks: i64,

    /// Default history length for arbitrary-field requests.
    #[serde(default = "default_bdh_lookback_weeks")]
    pub bdh_lookback_weeks: i64,

    #[serde(default = "default_mavg_days")]
    pub mavg_days: usize,

    #[serde(default = "default_rsi_period")]
    pub rsi_period: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            workbook: default_workbook(),
            sheet: default_sheet(),
            vendor_url: None,
            timeout_secs: default_timeout_secs(),
            lookback_weeks: default_lookback_weeks(),
            bdh_lookback_weeks: default_bdh_lookback_weeks(),
            mavg_days: default_mavg_days(),
            rsi_period: default_rsi_period(),
        }
    }
}

impl Config {
    /// Load from a JSON file. A missing file yields the defaults; an
    /// unreadable or malformed one is an error.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            warn!("Config {} not found, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let config: Config = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Path of the configured workbook inside the data directory.
    pub fn workbook_path(&self) -> PathBuf {
        self.data_dir.join(&self.workbook)
    }
}
