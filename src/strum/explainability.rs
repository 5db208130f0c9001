// Explainability module
// Turns a validation result into a practice attempt the player can read

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::types::{DetectedDirection, StrumEvent, StrumInstruction, StrumValidationResult};

/// Timing offsets within this many ms count as on time
const ON_TIME_MS: f64 = 1.0;

/// One scored strum, as shown to the player and kept in practice history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrumAttempt {
    pub id: Uuid,

    pub expected_strum: StrumInstruction,

    /// Distinct strings that sounded, ascending
    pub actual_strings: Vec<u8>,

    pub detected_direction: DetectedDirection,

    pub confidence: f64,

    /// Offset from the expected time in ms (negative = early, positive = late)
    pub timing: f64,

    pub success: bool,

    /// What went wrong, empty on success
    pub errors: Vec<String>,
}

fn join_strings(strings: &[u8]) -> String {
    strings
        .iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl StrumAttempt {
    /// Build an attempt from a validated strum
    ///
    /// Timing is measured from the earliest pluck. An empty strum has no
    /// onset and reports a timing of zero.
    pub fn from_validation(
        instruction: &StrumInstruction,
        events: &[StrumEvent],
        result: &StrumValidationResult,
        expected_time_ms: f64,
        confidence_floor: f64,
    ) -> Self {
        let onset = events
            .iter()
            .map(|e| e.timestamp_ms)
            .min_by(|a, b| a.total_cmp(b));
        let timing = onset.map(|t| t - expected_time_ms).unwrap_or(0.0);

        let mut errors = Vec::new();

        if events.is_empty() {
            errors.push("No strum detected".to_string());
        } else if !result.direction.matches(instruction.direction) {
            errors.push(format!(
                "Expected {} strum, detected {}",
                instruction.direction.as_str(),
                result.direction.as_str()
            ));
        }

        if !result.wrong_strings.is_empty() {
            errors.push(format!("Wrong strings: {}", join_strings(&result.wrong_strings)));
        }

        if !result.missed_strings.is_empty() {
            errors.push(format!("Missed strings: {}", join_strings(&result.missed_strings)));
        }

        if result.direction != DetectedDirection::Unclear && result.confidence <= confidence_floor {
            errors.push(format!(
                "Low confidence ({}%)",
                (result.confidence * 100.0).round() as u32
            ));
        }

        StrumAttempt {
            id: Uuid::new_v4(),
            expected_strum: instruction.clone(),
            actual_strings: result.strings_played.iter().copied().collect(),
            detected_direction: result.direction,
            confidence: result.confidence,
            timing,
            success: result.valid,
            errors,
        }
    }

    /// One-line explanation of the attempt
    pub fn summary(&self) -> String {
        let timing_desc = if self.timing.abs() < ON_TIME_MS {
            "on time".to_string()
        } else if self.timing > 0.0 {
            format!("late by {:.1}ms", self.timing)
        } else {
            format!("early by {:.1}ms", self.timing.abs())
        };

        let verdict = if self.success {
            format!(
                "Clean {} strum ({}% confidence)",
                self.expected_strum.direction.as_str(),
                (self.confidence * 100.0).round() as u32
            )
        } else {
            self.errors.join("; ")
        };

        format!(
            "Beat {} +{}: {}, {}.",
            self.expected_strum.beat + 1,
            self.expected_strum.subdivision,
            verdict,
            timing_desc
        )
    }
}
