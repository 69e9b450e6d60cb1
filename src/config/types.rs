//! Configuration type definitions.

use crate::constants::DEFAULT_JITTER_THRESHOLD;
use serde::{Deserialize, Serialize};

/// Complete application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Extraction defaults.
    #[serde(default)]
    pub extract: ExtractConfig,
}

/// Default extraction settings, overridden by command-line flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    /// Write Sony Wave64 segments instead of RIFF WAV.
    pub wav64: bool,

    /// Timing tolerance in seconds.
    pub jitter_threshold: f64,

    /// Lower segment size cap in bytes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_segment_size: Option<u64>,

    /// Write the JSON summary next to the output.
    pub write_summary: bool,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            wav64: false,
            jitter_threshold: DEFAULT_JITTER_THRESHOLD,
            max_segment_size: None,
            write_summary: true,
        }
    }
}
