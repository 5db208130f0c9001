// Strumcoach - Guitar strum detection and practice tracking
// Module declarations

pub mod groove;
pub mod midi;
pub mod patterns;
pub mod state;
pub mod strum;

pub use groove::{Clock, ManualClock, Metronome, MetronomeConfig, PatternSchedule};
pub use midi::{GuitarInput, GuitarMidiDecoder};
pub use patterns::{all_patterns, get_pattern};
pub use state::{init_db, ProgressStore, SqliteProgressStore};
pub use strum::{
    calculate_confidence, detect_direction, validate_strum, DetectedDirection, DetectionConfig,
    EventBuffer, SharedSession, StrumAttempt, StrumDirection, StrumEvent, StrumInstruction,
    StrumPattern, StrumRunner, StrumSession, StrumValidationResult,
};
