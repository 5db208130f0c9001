// Strum detection types
// Pluck events, pattern instructions, and validation results

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Lowest string number (high E)
pub const MIN_STRING: u8 = 1;

/// Highest string number (low E)
pub const MAX_STRING: u8 = 6;

/// A single plucked string observed by the input source
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrumEvent {
    /// String number, 1 = highest pitch, 6 = lowest
    pub string: u8,

    /// Monotonic timestamp in milliseconds
    #[serde(rename = "timestamp")]
    pub timestamp_ms: f64,

    /// MIDI note number, when the source reports one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<u8>,
}

impl StrumEvent {
    /// Create an event without a note number
    pub fn new(string: u8, timestamp_ms: f64) -> Self {
        StrumEvent {
            string,
            timestamp_ms,
            note: None,
        }
    }

    /// Create an event carrying the MIDI note that sounded
    pub fn with_note(string: u8, timestamp_ms: f64, note: u8) -> Self {
        StrumEvent {
            string,
            timestamp_ms,
            note: Some(note),
        }
    }

    /// Whether the string number is a real guitar string
    pub fn has_valid_string(&self) -> bool {
        (MIN_STRING..=MAX_STRING).contains(&self.string)
    }
}

/// Direction a pattern asks the player to strum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrumDirection {
    /// Bass to treble (string 6 towards string 1)
    Down,

    /// Treble to bass (string 1 towards string 6)
    Up,
}

impl StrumDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrumDirection::Down => "down",
            StrumDirection::Up => "up",
        }
    }
}

/// Direction verdict produced by the detector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectedDirection {
    Down,
    Up,
    Unclear,
}

impl DetectedDirection {
    /// The matching instruction direction, if the verdict is not unclear
    pub fn as_strum(&self) -> Option<StrumDirection> {
        match self {
            DetectedDirection::Down => Some(StrumDirection::Down),
            DetectedDirection::Up => Some(StrumDirection::Up),
            DetectedDirection::Unclear => None,
        }
    }

    pub fn matches(&self, expected: StrumDirection) -> bool {
        self.as_strum() == Some(expected)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DetectedDirection::Down => "down",
            DetectedDirection::Up => "up",
            DetectedDirection::Unclear => "unclear",
        }
    }
}

impl From<StrumDirection> for DetectedDirection {
    fn from(direction: StrumDirection) -> Self {
        match direction {
            StrumDirection::Down => DetectedDirection::Down,
            StrumDirection::Up => DetectedDirection::Up,
        }
    }
}

/// One expected strum within a pattern
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrumInstruction {
    /// Beat within the bar (0-indexed)
    pub beat: u32,

    /// Fractional position within the beat [0.0, 1.0)
    /// 0 = on the beat, 0.5 = eighth note, 0.25 = sixteenth note
    pub subdivision: f64,

    pub direction: StrumDirection,

    /// Strings that must sound, in pattern order
    pub strings: Vec<u8>,

    /// Accent this strum
    #[serde(default)]
    pub emphasis: bool,
}

impl StrumInstruction {
    pub fn new(beat: u32, subdivision: f64, direction: StrumDirection, strings: &[u8]) -> Self {
        StrumInstruction {
            beat,
            subdivision,
            direction,
            strings: strings.to_vec(),
            emphasis: false,
        }
    }

    /// Mark this instruction as accented
    pub fn accented(mut self) -> Self {
        self.emphasis = true;
        self
    }

    /// Position in beats from the start of the bar
    pub fn beat_offset(&self) -> f64 {
        self.beat as f64 + self.subdivision
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

/// Pattern time signature, e.g. 4/4
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternTimeSignature {
    pub beats: u32,
    pub note_value: u32,
}

/// Inclusive tempo range suggested for a pattern
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BpmRange {
    pub min: f64,
    pub max: f64,
}

impl BpmRange {
    pub fn contains(&self, bpm: f64) -> bool {
        bpm >= self.min && bpm <= self.max
    }
}

/// A named strumming pattern
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrumPattern {
    pub id: String,
    pub name: String,
    pub description: String,
    pub difficulty: Difficulty,
    pub time_signature: PatternTimeSignature,

    /// How many bars the pattern spans
    pub bars: u32,

    pub strums: Vec<StrumInstruction>,

    #[serde(rename = "recommendedBPM")]
    pub recommended_bpm: BpmRange,
}

/// Outcome of checking one strum against an instruction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrumValidationResult {
    pub direction: DetectedDirection,

    /// Fraction of transitions agreeing with the detected direction [0.0, 1.0]
    pub confidence: f64,

    pub strings_played: BTreeSet<u8>,

    /// Played but not asked for
    pub wrong_strings: Vec<u8>,

    /// Asked for but not played, in instruction order
    pub missed_strings: Vec<u8>,

    pub valid: bool,
}

impl StrumValidationResult {
    /// Result for a strum slot where nothing was played
    pub fn nothing_played(instruction: &StrumInstruction) -> Self {
        StrumValidationResult {
            direction: DetectedDirection::Unclear,
            confidence: 0.0,
            strings_played: BTreeSet::new(),
            wrong_strings: Vec::new(),
            missed_strings: instruction.strings.clone(),
            valid: false,
        }
    }
}
