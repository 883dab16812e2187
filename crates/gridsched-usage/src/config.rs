//! Usage plugin configuration.
//!
//! Decodes raw [`Arguments`] into a [`UsageConfig`]. Decoding never fails:
//! malformed values leave the default in place and are reported as
//! [`ConfigWarning`]s.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use gridsched_api::Arguments;

use crate::PLUGIN_NAME;

pub const WEIGHT_KEY: &str = "usage.weight";
pub const TYPE_KEY: &str = "type";
pub const PERIOD_KEY: &str = "period";
pub const THRESHOLDS_KEY: &str = "thresholds";

pub const DEFAULT_WEIGHT: u32 = 1;
pub const DEFAULT_SAMPLE_PERIOD: &str = "10m";
pub const DEFAULT_THRESHOLD_PCT: f64 = 80.0;

/// How utilization samples are aggregated. Informational only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UsageMode {
    #[default]
    Average,
    Common,
    Max,
}

impl UsageMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "average" => Some(Self::Average),
            "common" => Some(Self::Common),
            "max" => Some(Self::Max),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Average => "average",
            Self::Common => "common",
            Self::Max => "max",
        }
    }
}

impl fmt::Display for UsageMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolved configuration, immutable for the session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsageConfig {
    /// Multiplier applied to the node score.
    pub weight: u32,
    pub usage_mode: UsageMode,
    /// Sampling-window label used for snapshot lookups. Empty disables
    /// both filtering and scoring.
    pub sample_period: String,
    pub cpu_threshold_pct: f64,
    pub mem_threshold_pct: f64,
    /// Whether the arguments carried a `thresholds` section.
    pub thresholds_configured: bool,
}

impl Default for UsageConfig {
    fn default() -> Self {
        Self {
            weight: DEFAULT_WEIGHT,
            usage_mode: UsageMode::default(),
            sample_period: DEFAULT_SAMPLE_PERIOD.to_string(),
            cpu_threshold_pct: DEFAULT_THRESHOLD_PCT,
            mem_threshold_pct: DEFAULT_THRESHOLD_PCT,
            thresholds_configured: false,
        }
    }
}

/// A non-fatal configuration anomaly.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigWarning {
    #[error("argument `{key}` must be {expected}, got {found}")]
    WrongType {
        key: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("argument `{key}` is out of range: {value}")]
    OutOfRange { key: String, value: String },

    #[error("unknown usage type `{0}`, expected one of: average, common, max")]
    UnknownMode(String),
}

/// Outcome of [`resolve`].
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved {
    pub config: UsageConfig,
    pub warnings: Vec<ConfigWarning>,
}

/// Decode `args` on top of the defaults.
pub fn resolve(args: &Arguments) -> Resolved {
    let mut config = UsageConfig::default();
    let mut warnings = Vec::new();

    if let Some(value) = args.lookup(WEIGHT_KEY) {
        match decode_weight(value) {
            Ok(weight) => config.weight = weight,
            Err(warning) => warnings.push(warning),
        }
    }

    if let Some(value) = args.get(TYPE_KEY) {
        match value.as_str() {
            Some(s) => match UsageMode::parse(s) {
                Some(mode) => config.usage_mode = mode,
                None => warnings.push(ConfigWarning::UnknownMode(s.to_string())),
            },
            None => warnings.push(wrong_type(TYPE_KEY, "a string", value)),
        }
    }

    if let Some(value) = args.get(PERIOD_KEY) {
        match value.as_str() {
            Some(s) => config.sample_period = s.to_string(),
            None => warnings.push(wrong_type(PERIOD_KEY, "a string", value)),
        }
    }

    if let Some(value) = args.get(THRESHOLDS_KEY) {
        config.thresholds_configured = true;
        match value.as_object() {
            Some(section) => {
                for (key, value) in section {
                    let target = match key.as_str() {
                        "cpu" => &mut config.cpu_threshold_pct,
                        "mem" => &mut config.mem_threshold_pct,
                        _ => continue,
                    };
                    // Non-integer thresholds are skipped without a warning.
                    let Some(pct) = value.as_i64() else {
                        debug!(plugin = PLUGIN_NAME, %key, %value, "skipping non-integer threshold");
                        continue;
                    };
                    *target = pct as f64;
                    if !(0..=100).contains(&pct) {
                        warnings.push(ConfigWarning::OutOfRange {
                            key: format!("{THRESHOLDS_KEY}.{key}"),
                            value: pct.to_string(),
                        });
                    }
                }
            }
            None => warnings.push(wrong_type(THRESHOLDS_KEY, "a table", value)),
        }
    }

    for warning in &warnings {
        warn!(plugin = PLUGIN_NAME, %warning, "usage parameter is wrong, keeping default");
    }

    Resolved { config, warnings }
}

fn decode_weight(value: &Value) -> Result<u32, ConfigWarning> {
    if let Some(n) = value.as_u64() {
        return u32::try_from(n).map_err(|_| ConfigWarning::OutOfRange {
            key: WEIGHT_KEY.to_string(),
            value: n.to_string(),
        });
    }
    if let Some(n) = value.as_i64() {
        return Err(ConfigWarning::OutOfRange {
            key: WEIGHT_KEY.to_string(),
            value: n.to_string(),
        });
    }
    Err(wrong_type(WEIGHT_KEY, "an integer", value))
}

fn wrong_type(key: &str, expected: &'static str, value: &Value) -> ConfigWarning {
    ConfigWarning::WrongType {
        key: key.to_string(),
        expected,
        found: value_kind(value),
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(n) if n.is_f64() => "a float",
        Value::Number(_) => "an integer",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "a table",
    }
}
