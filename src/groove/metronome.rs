// Metronome - beat grid and elapsed time for a practice session
// Provides the expected time of each strum and the current grid position

use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::clock::Clock;

pub const MIN_BPM: f64 = 40.0;
pub const MAX_BPM: f64 = 240.0;

/// Default half-width of the "on time" window in ms
pub const DEFAULT_TOLERANCE_MS: f64 = 150.0;

/// Keep a tempo inside the range the trainer supports
pub fn clamp_bpm(bpm: f64) -> f64 {
    if bpm.is_nan() {
        return MIN_BPM;
    }
    bpm.clamp(MIN_BPM, MAX_BPM)
}

/// Metronome settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetronomeConfig {
    pub bpm: f64,
    pub beats_per_bar: u32,

    /// Clicks per beat: 1 = quarter notes, 2 = eighths, 4 = sixteenths
    pub subdivision: u32,
}

impl Default for MetronomeConfig {
    fn default() -> Self {
        MetronomeConfig {
            bpm: 80.0,
            beats_per_bar: 4,
            subdivision: 1,
        }
    }
}

/// Position on the click grid (all 0-indexed)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetronomePosition {
    pub bar: u32,
    pub beat: u32,
    pub subdivision: u32,
}

impl MetronomePosition {
    /// First click of a bar, which gets the accent
    pub fn is_downbeat(&self) -> bool {
        self.beat == 0 && self.subdivision == 0
    }
}

/// Wall-clock metronome
#[derive(Debug, Clone)]
pub struct Metronome {
    bpm: f64,
    beats_per_bar: u32,
    subdivision: u32,
    started_at: Option<Instant>,

    /// Elapsed time frozen by the last stop
    stopped_elapsed_ms: f64,
}

impl Metronome {
    pub fn new(config: MetronomeConfig) -> Self {
        Metronome {
            bpm: clamp_bpm(config.bpm),
            beats_per_bar: config.beats_per_bar.max(1),
            subdivision: config.subdivision.max(1),
            started_at: None,
            stopped_elapsed_ms: 0.0,
        }
    }

    pub fn bpm(&self) -> f64 {
        self.bpm
    }

    pub fn beats_per_bar(&self) -> u32 {
        self.beats_per_bar
    }

    pub fn subdivision(&self) -> u32 {
        self.subdivision
    }

    /// Milliseconds per beat
    pub fn beat_duration_ms(&self) -> f64 {
        60000.0 / self.bpm
    }

    /// Milliseconds per click
    pub fn subdivision_duration_ms(&self) -> f64 {
        self.beat_duration_ms() / self.subdivision as f64
    }

    pub fn is_playing(&self) -> bool {
        self.started_at.is_some()
    }

    /// Start counting from zero; no-op while already playing
    pub fn start(&mut self) {
        if self.is_playing() {
            return;
        }
        self.started_at = Some(Instant::now());
        self.stopped_elapsed_ms = 0.0;
        log::info!("Metronome started at {} BPM", self.bpm);
    }

    /// Stop and keep the elapsed time
    pub fn stop(&mut self) {
        if let Some(started) = self.started_at.take() {
            self.stopped_elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
        }
    }

    pub fn reset(&mut self) {
        self.started_at = None;
        self.stopped_elapsed_ms = 0.0;
    }

    pub fn elapsed_ms(&self) -> f64 {
        match self.started_at {
            Some(started) => started.elapsed().as_secs_f64() * 1000.0,
            None => self.stopped_elapsed_ms,
        }
    }

    /// Change tempo (clamped to 40-240); a running metronome restarts
    pub fn set_bpm(&mut self, bpm: f64) {
        let was_playing = self.is_playing();
        if was_playing {
            self.stop();
        }
        self.bpm = clamp_bpm(bpm);
        if was_playing {
            self.start();
        }
    }

    /// When a strum at `beat` + `subdivision` is due, from the start of the bar
    pub fn strum_time_ms(&self, beat: u32, subdivision: f64) -> f64 {
        (beat as f64 + subdivision) * self.beat_duration_ms()
    }

    /// Whether `now_ms` lies within `tolerance_ms` of `expected_ms` (inclusive)
    pub fn is_in_window(&self, now_ms: f64, expected_ms: f64, tolerance_ms: f64) -> bool {
        (now_ms - expected_ms).abs() <= tolerance_ms
    }

    /// Grid position of a point in time
    pub fn position_at(&self, elapsed_ms: f64) -> MetronomePosition {
        let clicks = (elapsed_ms.max(0.0) / self.subdivision_duration_ms()).floor() as u64;
        let subdivision = u64::from(self.subdivision);
        let beats_per_bar = u64::from(self.beats_per_bar);

        MetronomePosition {
            bar: (clicks / (beats_per_bar * subdivision)) as u32,
            beat: ((clicks / subdivision) % beats_per_bar) as u32,
            subdivision: (clicks % subdivision) as u32,
        }
    }

    pub fn current_position(&self) -> MetronomePosition {
        self.position_at(self.elapsed_ms())
    }
}

impl Default for Metronome {
    fn default() -> Self {
        Self::new(MetronomeConfig::default())
    }
}

impl Clock for Metronome {
    fn now_ms(&self) -> f64 {
        self.elapsed_ms()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metronome(bpm: f64, beats_per_bar: u32, subdivision: u32) -> Metronome {
        Metronome::new(MetronomeConfig {
            bpm,
            beats_per_bar,
            subdivision,
        })
    }

    #[test]
    fn test_durations_at_120_bpm() {
        let m = metronome(120.0, 4, 2);
        assert!((m.beat_duration_ms() - 500.0).abs() < 1e-9);
        assert!((m.subdivision_duration_ms() - 250.0).abs() < 1e-9);
    }

    #[test]
    fn test_bpm_is_clamped() {
        assert_eq!(metronome(10.0, 4, 1).bpm(), 40.0);
        assert_eq!(metronome(400.0, 4, 1).bpm(), 240.0);

        let mut m = metronome(100.0, 4, 1);
        m.set_bpm(300.0);
        assert_eq!(m.bpm(), 240.0);
        m.set_bpm(f64::NAN);
        assert_eq!(m.bpm(), 40.0);
    }

    #[test]
    fn test_strum_time() {
        let m = metronome(120.0, 4, 1);
        assert!((m.strum_time_ms(0, 0.0) - 0.0).abs() < 1e-9);
        assert!((m.strum_time_ms(1, 0.5) - 750.0).abs() < 1e-9);
        assert!((m.strum_time_ms(3, 0.25) - 1625.0).abs() < 1e-9);
    }

    #[test]
    fn test_window_is_inclusive() {
        let m = Metronome::default();
        assert!(m.is_in_window(1150.0, 1000.0, DEFAULT_TOLERANCE_MS));
        assert!(m.is_in_window(850.0, 1000.0, DEFAULT_TOLERANCE_MS));
        assert!(!m.is_in_window(1150.1, 1000.0, DEFAULT_TOLERANCE_MS));
    }

    #[test]
    fn test_position_at() {
        // 120 BPM eighths: 250 ms per click, 8 clicks per bar
        let m = metronome(120.0, 4, 2);

        let start = m.position_at(0.0);
        assert_eq!(start, MetronomePosition { bar: 0, beat: 0, subdivision: 0 });
        assert!(start.is_downbeat());

        assert_eq!(m.position_at(760.0), MetronomePosition { bar: 0, beat: 1, subdivision: 1 });
        assert_eq!(m.position_at(2010.0), MetronomePosition { bar: 1, beat: 0, subdivision: 0 });
        assert!(!m.position_at(260.0).is_downbeat());
    }

    #[test]
    fn test_position_with_huge_grid() {
        let config: MetronomeConfig = serde_json::from_str(
            r#"{"bpm": 120, "beats_per_bar": 4294967295, "subdivision": 4294967295}"#,
        )
        .unwrap();
        let m = Metronome::new(config);

        let position = m.position_at(1250.0);
        assert_eq!(position.bar, 0);
        assert_eq!(position.beat, 2);
    }

    #[test]
    fn test_start_stop_reset() {
        let mut m = Metronome::default();
        assert!(!m.is_playing());
        assert_eq!(m.elapsed_ms(), 0.0);

        m.start();
        assert!(m.is_playing());
        m.stop();
        assert!(!m.is_playing());
        assert!(m.elapsed_ms() >= 0.0);

        m.reset();
        assert_eq!(m.elapsed_ms(), 0.0);
        assert_eq!(m.current_position(), MetronomePosition { bar: 0, beat: 0, subdivision: 0 });
    }
}
