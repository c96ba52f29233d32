//! MIDI serialization of a rendered event stream.
//!
//! Only available with the `midi` feature (enabled by default).

mod sequence_to_midi;

pub use sequence_to_midi::sequence_to_midi;
