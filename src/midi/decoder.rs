// Guitar MIDI decoder
// Turns raw messages from a MIDI guitar into plucks and fret changes

use midly::live::LiveEvent;
use midly::MidiMessage;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

use crate::strum::types::{StrumEvent, MAX_STRING, MIN_STRING};

/// Controller sent when a finger presses a fret (value = fret, 0 = open)
pub const CC_FRET_PRESS: u8 = 49;

/// Controller sent when a finger lifts off the fretboard
pub const CC_FRET_RELEASE: u8 = 50;

/// Quiet time after which the plucked-string display is cleared
pub const PLUCK_CLEAR_MS: f64 = 1000.0;

#[derive(Debug, Error)]
pub enum MidiError {
    #[error("Malformed MIDI message: {0}")]
    Parse(#[from] midly::Error),

    #[error("Empty MIDI message")]
    Empty,
}

/// What a single MIDI message meant for the guitar
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuitarInput {
    /// A string was plucked
    Pluck(StrumEvent),

    /// A note stopped sounding (channel is 1-indexed)
    NoteOff { channel: u8, note: u8 },

    FretPressed { string: u8, fret: u8 },

    /// Finger lifted, or pressed at fret 0
    FretReleased { string: u8 },

    /// Anything the trainer does not use
    Other,
}

/// Map a 1-indexed note channel to a string: channel 1 is string 6
pub fn channel_to_string(channel: u8) -> Option<u8> {
    if (MIN_STRING..=MAX_STRING).contains(&channel) {
        Some(MAX_STRING + 1 - channel)
    } else {
        None
    }
}

/// Stateful decoder that also tracks held frets and recent plucks
#[derive(Debug, Default, Clone)]
pub struct GuitarMidiDecoder {
    fret_positions: BTreeMap<u8, u8>,

    /// Strings in the order they were plucked, repeats included
    pluck_order: Vec<u8>,

    /// Last note heard per string
    plucked_notes: BTreeMap<u8, u8>,

    last_pluck_ms: Option<f64>,
}

impl GuitarMidiDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Currently held fret per string
    pub fn fret_positions(&self) -> &BTreeMap<u8, u8> {
        &self.fret_positions
    }

    /// Strings plucked since the last clear
    pub fn strings_plucked(&self) -> BTreeSet<u8> {
        self.plucked_notes.keys().copied().collect()
    }

    pub fn pluck_order(&self) -> &[u8] {
        &self.pluck_order
    }

    pub fn plucked_notes(&self) -> &BTreeMap<u8, u8> {
        &self.plucked_notes
    }

    /// Forget recent plucks once `PLUCK_CLEAR_MS` has passed without one.
    /// Returns true if anything was cleared.
    pub fn expire_plucks(&mut self, now_ms: f64) -> bool {
        match self.last_pluck_ms {
            Some(last) if now_ms - last >= PLUCK_CLEAR_MS => {
                log::debug!("Clearing {} plucked strings after inactivity", self.plucked_notes.len());
                self.clear_plucks();
                true
            }
            _ => false,
        }
    }

    pub fn clear_plucks(&mut self) {
        self.pluck_order.clear();
        self.plucked_notes.clear();
        self.last_pluck_ms = None;
    }

    pub fn clear(&mut self) {
        self.fret_positions.clear();
        self.clear_plucks();
    }

    fn record_pluck(&mut self, string: u8, note: u8, timestamp_ms: f64) {
        self.expire_plucks(timestamp_ms);
        self.pluck_order.push(string);
        self.plucked_notes.insert(string, note);
        self.last_pluck_ms = Some(timestamp_ms);
    }

    /// Decode one raw message received at `timestamp_ms`
    pub fn decode(&mut self, bytes: &[u8], timestamp_ms: f64) -> Result<GuitarInput, MidiError> {
        if bytes.is_empty() {
            return Err(MidiError::Empty);
        }

        let (channel, message) = match LiveEvent::parse(bytes)? {
            LiveEvent::Midi { channel, message } => (channel.as_int() + 1, message),
            _ => return Ok(GuitarInput::Other),
        };

        let input = match message {
            MidiMessage::NoteOn { key, vel } if vel.as_int() > 0 => {
                match channel_to_string(channel) {
                    Some(string) => {
                        self.record_pluck(string, key.as_int(), timestamp_ms);
                        GuitarInput::Pluck(StrumEvent::with_note(string, timestamp_ms, key.as_int()))
                    }
                    None => {
                        log::warn!("Ignoring note on channel {} (not a guitar string)", channel);
                        GuitarInput::Other
                    }
                }
            }
            MidiMessage::NoteOn { key, .. } | MidiMessage::NoteOff { key, .. } => {
                GuitarInput::NoteOff {
                    channel,
                    note: key.as_int(),
                }
            }
            MidiMessage::Controller { controller, value }
                if (MIN_STRING..=MAX_STRING).contains(&channel) =>
            {
                self.apply_controller(channel, controller.as_int(), value.as_int())
            }
            _ => GuitarInput::Other,
        };

        Ok(input)
    }

    // Fret controllers address strings by channel directly, without the
    // inversion note messages use.
    fn apply_controller(&mut self, string: u8, controller: u8, value: u8) -> GuitarInput {
        match controller {
            CC_FRET_PRESS if value > 0 => {
                self.fret_positions.insert(string, value);
                GuitarInput::FretPressed {
                    string,
                    fret: value,
                }
            }
            CC_FRET_PRESS | CC_FRET_RELEASE => {
                self.fret_positions.remove(&string);
                GuitarInput::FretReleased { string }
            }
            _ => GuitarInput::Other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_to_string() {
        assert_eq!(channel_to_string(1), Some(6));
        assert_eq!(channel_to_string(6), Some(1));
        assert_eq!(channel_to_string(0), None);
        assert_eq!(channel_to_string(7), None);
    }

    #[test]
    fn test_note_on_is_pluck() {
        let mut decoder = GuitarMidiDecoder::new();

        // Note on, channel 1, E2, velocity 100
        let input = decoder.decode(&[0x90, 40, 100], 12.0).unwrap();
        assert_eq!(input, GuitarInput::Pluck(StrumEvent::with_note(6, 12.0, 40)));

        // Channel 6 -> string 1
        let input = decoder.decode(&[0x95, 64, 90], 13.0).unwrap();
        assert_eq!(input, GuitarInput::Pluck(StrumEvent::with_note(1, 13.0, 64)));
    }

    #[test]
    fn test_zero_velocity_note_on_is_note_off() {
        let mut decoder = GuitarMidiDecoder::new();
        let input = decoder.decode(&[0x92, 50, 0], 0.0).unwrap();
        assert_eq!(input, GuitarInput::NoteOff { channel: 3, note: 50 });

        let input = decoder.decode(&[0x82, 50, 64], 0.0).unwrap();
        assert_eq!(input, GuitarInput::NoteOff { channel: 3, note: 50 });
    }

    #[test]
    fn test_note_on_other_channels_ignored() {
        let mut decoder = GuitarMidiDecoder::new();
        let input = decoder.decode(&[0x99, 36, 100], 0.0).unwrap();
        assert_eq!(input, GuitarInput::Other);
    }

    #[test]
    fn test_fret_tracking() {
        let mut decoder = GuitarMidiDecoder::new();

        let input = decoder.decode(&[0xB1, CC_FRET_PRESS, 3], 0.0).unwrap();
        assert_eq!(input, GuitarInput::FretPressed { string: 2, fret: 3 });
        assert_eq!(decoder.fret_positions().get(&2), Some(&3));

        let input = decoder.decode(&[0xB1, CC_FRET_RELEASE, 0], 0.0).unwrap();
        assert_eq!(input, GuitarInput::FretReleased { string: 2 });
        assert!(decoder.fret_positions().is_empty());

        decoder.decode(&[0xB4, CC_FRET_PRESS, 7], 0.0).unwrap();
        let input = decoder.decode(&[0xB4, CC_FRET_PRESS, 0], 0.0).unwrap();
        assert_eq!(input, GuitarInput::FretReleased { string: 5 });
        assert!(decoder.fret_positions().is_empty());
    }

    #[test]
    fn test_pluck_tracking() {
        let mut decoder = GuitarMidiDecoder::new();
        decoder.decode(&[0x90, 40, 100], 0.0).unwrap();
        decoder.decode(&[0x91, 45, 100], 10.0).unwrap();
        decoder.decode(&[0x90, 41, 100], 20.0).unwrap();

        // Note off does not count as a pluck
        decoder.decode(&[0x80, 40, 0], 30.0).unwrap();

        assert_eq!(decoder.pluck_order(), &[6, 5, 6]);
        assert_eq!(decoder.strings_plucked(), BTreeSet::from([5, 6]));
        assert_eq!(decoder.plucked_notes().get(&6), Some(&41));
        assert_eq!(decoder.plucked_notes().get(&5), Some(&45));
    }

    #[test]
    fn test_plucks_expire_after_inactivity() {
        let mut decoder = GuitarMidiDecoder::new();
        decoder.decode(&[0x90, 40, 100], 0.0).unwrap();

        assert!(!decoder.expire_plucks(999.0));
        assert_eq!(decoder.pluck_order(), &[6]);

        assert!(decoder.expire_plucks(1000.0));
        assert!(decoder.pluck_order().is_empty());
        assert!(decoder.strings_plucked().is_empty());
        assert!(!decoder.expire_plucks(5000.0));
    }

    #[test]
    fn test_late_pluck_starts_fresh() {
        let mut decoder = GuitarMidiDecoder::new();
        decoder.decode(&[0x90, 40, 100], 0.0).unwrap();
        decoder.decode(&[0xB2, CC_FRET_PRESS, 2], 100.0).unwrap();

        decoder.decode(&[0x95, 64, 100], 2500.0).unwrap();
        assert_eq!(decoder.pluck_order(), &[1]);
        assert_eq!(decoder.strings_plucked(), BTreeSet::from([1]));

        // Frets are unaffected by pluck expiry
        assert_eq!(decoder.fret_positions().get(&3), Some(&2));

        decoder.clear();
        assert!(decoder.pluck_order().is_empty());
        assert!(decoder.fret_positions().is_empty());
    }

    #[test]
    fn test_other_messages() {
        let mut decoder = GuitarMidiDecoder::new();

        // Program change
        assert_eq!(decoder.decode(&[0xC0, 5], 0.0).unwrap(), GuitarInput::Other);
        // Pitch bend
        assert_eq!(decoder.decode(&[0xE0, 0, 64], 0.0).unwrap(), GuitarInput::Other);
        // Timing clock
        assert_eq!(decoder.decode(&[0xF8], 0.0).unwrap(), GuitarInput::Other);
    }

    #[test]
    fn test_malformed_messages() {
        let mut decoder = GuitarMidiDecoder::new();
        assert!(matches!(decoder.decode(&[], 0.0), Err(MidiError::Empty)));
        assert!(matches!(decoder.decode(&[0x90, 40], 0.0), Err(MidiError::Parse(_))));
    }
}
