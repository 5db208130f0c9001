// MIDI input module
// Decodes guitar controller messages into pluck events

pub mod decoder;

pub use decoder::{channel_to_string, GuitarInput, GuitarMidiDecoder, MidiError};
