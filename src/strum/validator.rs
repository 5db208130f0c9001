// Strum validator
// Scores a detected strum against the instruction the pattern expected

use std::collections::BTreeSet;

use super::config::DetectionConfig;
use super::detector::DirectionDetector;
use super::types::{DetectedDirection, StrumEvent, StrumInstruction, StrumValidationResult};

/// Pass/fail scoring of strums against pattern instructions
#[derive(Debug, Clone, Copy)]
pub struct StrumValidator {
    detector: DirectionDetector,
    confidence_floor: f64,
}

impl StrumValidator {
    /// Create a validator with the default thresholds
    pub fn new() -> Self {
        Self::with_config(&DetectionConfig::default())
    }

    pub fn with_config(config: &DetectionConfig) -> Self {
        StrumValidator {
            detector: DirectionDetector::with_tie_break(config.tie_break),
            confidence_floor: config.confidence_floor,
        }
    }

    pub fn detector(&self) -> &DirectionDetector {
        &self.detector
    }

    pub fn confidence_floor(&self) -> f64 {
        self.confidence_floor
    }

    /// Validate one strum
    ///
    /// A strum is valid only when the direction matches, every required string
    /// sounded, no other string sounded, and confidence exceeds the floor.
    pub fn validate(
        &self,
        events: &[StrumEvent],
        instruction: &StrumInstruction,
    ) -> StrumValidationResult {
        if events.is_empty() {
            return StrumValidationResult::nothing_played(instruction);
        }

        let direction = self.detector.detect(events);
        let confidence = if direction != DetectedDirection::Unclear {
            self.detector.confidence(events, direction)
        } else {
            0.0
        };

        let strings_played: BTreeSet<u8> = events.iter().map(|e| e.string).collect();

        let wrong_strings: Vec<u8> = strings_played
            .iter()
            .copied()
            .filter(|s| !instruction.strings.contains(s))
            .collect();

        let missed_strings: Vec<u8> = instruction
            .strings
            .iter()
            .copied()
            .filter(|s| !strings_played.contains(s))
            .collect();

        let valid = direction.matches(instruction.direction)
            && wrong_strings.is_empty()
            && missed_strings.is_empty()
            && confidence > self.confidence_floor;

        StrumValidationResult {
            direction,
            confidence,
            strings_played,
            wrong_strings,
            missed_strings,
            valid,
        }
    }
}

impl Default for StrumValidator {
    fn default() -> Self {
        Self::new()
    }
}

/// Validate a strum with the default thresholds
pub fn validate_strum(events: &[StrumEvent], instruction: &StrumInstruction) -> StrumValidationResult {
    StrumValidator::new().validate(events, instruction)
}
