// Groove module
// Metronome timing and pattern scheduling

pub mod clock;
pub mod metronome;
pub mod schedule;

pub use clock::{Clock, ManualClock};
pub use metronome::{
    clamp_bpm, Metronome, MetronomeConfig, MetronomePosition, DEFAULT_TOLERANCE_MS, MAX_BPM,
    MIN_BPM,
};
pub use schedule::{PatternSchedule, ScheduledStrum};
