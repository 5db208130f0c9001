// Strum detection module
// Pluck buffering, direction detection and strum validation

pub mod buffer;
pub mod config;
pub mod detector;
pub mod explainability;
pub mod runner;
pub mod session;
pub mod types;
pub mod validator;

pub use buffer::{EventBuffer, StrumPhase};
pub use config::{ConfigError, DetectionConfig, TieBreak, CONFIDENCE_FLOOR, GAP_THRESHOLD_MS};
pub use detector::{
    calculate_confidence, collapse_repeats, detect_direction, Decision, DirectionDetector,
    DirectionTrace, Transition, Vote,
};
pub use explainability::StrumAttempt;
pub use runner::{RunnerConfig, RunnerError, SessionInput, StrumReport, StrumRunner};
pub use session::{SharedSession, StrumSession};
pub use types::{
    BpmRange, DetectedDirection, Difficulty, PatternTimeSignature, StrumDirection, StrumEvent,
    StrumInstruction, StrumPattern, StrumValidationResult, MAX_STRING, MIN_STRING,
};
pub use validator::{validate_strum, StrumValidator};
