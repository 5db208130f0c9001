// Pattern schedule
// Places each instruction of a looping pattern on the session timeline

use serde::{Deserialize, Serialize};

use super::metronome::clamp_bpm;
use crate::strum::types::{StrumInstruction, StrumPattern};

/// An instruction pinned to a point in time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledStrum {
    /// Pattern repetition (0-indexed)
    pub cycle: u32,

    /// Index into the pattern's strums
    pub index: usize,

    pub instruction: StrumInstruction,
    pub expected_time_ms: f64,
}

/// A pattern looped at a fixed tempo, starting at time zero
#[derive(Debug, Clone)]
pub struct PatternSchedule {
    pattern: StrumPattern,
    bpm: f64,
}

impl PatternSchedule {
    pub fn new(pattern: StrumPattern, bpm: f64) -> Self {
        PatternSchedule {
            pattern,
            bpm: clamp_bpm(bpm),
        }
    }

    pub fn pattern(&self) -> &StrumPattern {
        &self.pattern
    }

    pub fn bpm(&self) -> f64 {
        self.bpm
    }

    pub fn beat_duration_ms(&self) -> f64 {
        60000.0 / self.bpm
    }

    /// Length of one pass through the pattern
    pub fn cycle_duration_ms(&self) -> f64 {
        let beats = f64::from(self.pattern.time_signature.beats.max(1))
            * f64::from(self.pattern.bars.max(1));
        beats * self.beat_duration_ms()
    }

    /// When strum `index` of repetition `cycle` is due
    pub fn expected_time_ms(&self, cycle: u32, index: usize) -> Option<f64> {
        let instruction = self.pattern.strums.get(index)?;
        Some(cycle as f64 * self.cycle_duration_ms() + instruction.beat_offset() * self.beat_duration_ms())
    }

    /// The scheduled strum closest to `time_ms`
    pub fn nearest(&self, time_ms: f64) -> Option<ScheduledStrum> {
        if self.pattern.strums.is_empty() {
            return None;
        }

        let cycle_ms = self.cycle_duration_ms();
        let center = (time_ms.max(0.0) / cycle_ms).floor() as u32;
        let first_cycle = center.saturating_sub(1);

        let mut best: Option<ScheduledStrum> = None;
        let mut best_distance = f64::MAX;

        for cycle in first_cycle..=center + 1 {
            for (index, instruction) in self.pattern.strums.iter().enumerate() {
                let expected = cycle as f64 * cycle_ms + instruction.beat_offset() * self.beat_duration_ms();
                let distance = (expected - time_ms).abs();
                if distance < best_distance {
                    best_distance = distance;
                    best = Some(ScheduledStrum {
                        cycle,
                        index,
                        instruction: instruction.clone(),
                        expected_time_ms: expected,
                    });
                }
            }
        }

        best
    }

    /// The nearest scheduled strum, if it lies within `tolerance_ms`
    pub fn within(&self, time_ms: f64, tolerance_ms: f64) -> Option<ScheduledStrum> {
        self.nearest(time_ms)
            .filter(|scheduled| (scheduled.expected_time_ms - time_ms).abs() <= tolerance_ms)
    }
}
