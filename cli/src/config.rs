//! spvctl configuration with TOML file support.

use std::path::{Path, PathBuf};

use payd_spv::VerifyOptions;
use payd_transactions::{FeeQuote, FeeUnit};
use payd_utils::LogFormat;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(String),

    #[error("config cannot be written as TOML: {0}")]
    Serialize(String),
}

/// Which checks `spvctl verify` runs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyConfig {
    #[serde(default = "default_true")]
    pub proofs: bool,

    #[serde(default = "default_true")]
    pub script: bool,

    /// Requires a `[fee_quote]` section.
    #[serde(default)]
    pub fees: bool,
}

/// Miner fee rates, in satoshis per `bytes` bytes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeQuoteConfig {
    pub standard_satoshis: u64,
    pub standard_bytes: u64,

    /// Data (OP_RETURN) rate. Defaults to the standard rate.
    #[serde(default)]
    pub data_satoshis: Option<u64>,
    #[serde(default)]
    pub data_bytes: Option<u64>,
}

impl FeeQuoteConfig {
    pub fn to_quote(&self) -> FeeQuote {
        let standard = FeeUnit::new(self.standard_satoshis, self.standard_bytes);
        let data = FeeUnit::new(
            self.data_satoshis.unwrap_or(self.standard_satoshis),
            self.data_bytes.unwrap_or(self.standard_bytes),
        );
        FeeQuote::new(standard, data)
    }
}

/// Configuration for `spvctl`.
///
/// Loaded from a TOML file via [`SpvConfig::from_toml_file`]; command line
/// flags and `PAYD_*` environment variables override individual fields.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SpvConfig {
    /// JSON file holding a list of raw block header hex strings.
    #[serde(default)]
    pub headers: Option<PathBuf>,

    /// Log format: "human" or "json".
    #[serde(default)]
    pub log_format: LogFormat,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub verify: VerifyConfig,

    #[serde(default)]
    pub fee_quote: Option<FeeQuoteConfig>,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            proofs: default_true(),
            script: default_true(),
            fees: false,
        }
    }
}

impl Default for SpvConfig {
    fn default() -> Self {
        Self {
            headers: None,
            log_format: LogFormat::default(),
            log_level: default_log_level(),
            verify: VerifyConfig::default(),
            fee_quote: None,
        }
    }
}

impl SpvConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))
    }

    /// The verifier policy this config describes. A missing fee quote is
    /// left for the verifier to reject.
    pub fn verify_options(&self) -> VerifyOptions {
        VerifyOptions {
            proofs: self.verify.proofs,
            script: self.verify.script,
            fees: self.verify.fees,
            fee_quote: self.fee_quote.as_ref().map(FeeQuoteConfig::to_quote),
        }
    }
}
