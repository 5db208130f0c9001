// Detection configuration
// Timing and scoring thresholds shared by the buffer, detector and validator

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Quiet time after the last pluck before a strum counts as finished
pub const GAP_THRESHOLD_MS: f64 = 100.0;

/// Confidence a strum must exceed to be accepted
pub const CONFIDENCE_FLOOR: f64 = 0.6;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid config value: {0}")]
    InvalidValue(String),
}

/// How to resolve a strum whose up and down votes are equal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// Compare the first and last strings of the collapsed run
    FirstVersusLast,

    /// Report a tie as unclear
    Unclear,
}

/// Thresholds for strum segmentation and scoring
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Silence (ms) that ends a strum; the comparison is strict
    pub gap_threshold_ms: f64,

    /// Confidence a strum must exceed to be valid; the comparison is strict
    pub confidence_floor: f64,

    pub tie_break: TieBreak,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        DetectionConfig {
            gap_threshold_ms: GAP_THRESHOLD_MS,
            confidence_floor: CONFIDENCE_FLOOR,
            tie_break: TieBreak::FirstVersusLast,
        }
    }
}

impl DetectionConfig {
    /// Parse a config from JSON; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: DetectionConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.gap_threshold_ms.is_finite() || self.gap_threshold_ms < 0.0 {
            return Err(ConfigError::InvalidValue(format!(
                "gap_threshold_ms must be a non-negative number, got {}",
                self.gap_threshold_ms
            )));
        }

        if !(0.0..=1.0).contains(&self.confidence_floor) {
            return Err(ConfigError::InvalidValue(format!(
                "confidence_floor must be within [0, 1], got {}",
                self.confidence_floor
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DetectionConfig::default();
        assert_eq!(config.gap_threshold_ms, 100.0);
        assert_eq!(config.confidence_floor, 0.6);
        assert_eq!(config.tie_break, TieBreak::FirstVersusLast);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = DetectionConfig::from_json(r#"{"gap_threshold_ms": 80}"#).unwrap();
        assert_eq!(config.gap_threshold_ms, 80.0);
        assert_eq!(config.confidence_floor, 0.6);

        let config = DetectionConfig::from_json(r#"{"tie_break": "unclear"}"#).unwrap();
        assert_eq!(config.tie_break, TieBreak::Unclear);
    }

    #[test]
    fn test_rejects_out_of_range_values() {
        assert!(DetectionConfig::from_json(r#"{"confidence_floor": 1.5}"#).is_err());
        assert!(DetectionConfig::from_json(r#"{"gap_threshold_ms": -1}"#).is_err());
        assert!(DetectionConfig::from_json("not json").is_err());
    }
}
