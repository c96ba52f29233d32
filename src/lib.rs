//! Canto - Immutable Music Composition Values
//!
//! This library models musical compositions as immutable algebraic values
//! that can be transposed and rendered into a tick-indexed event stream
//! for a playback backend.

pub mod music;
pub mod parser;
pub mod player;
pub mod types;

#[cfg(feature = "midi")]
pub mod midi;

// Re-export commonly used types
pub use music::Music;
pub use music::MusicError;
pub use parser::parse_score;
pub use player::ScheduledNote;
pub use player::SequencePlayer;
pub use player::TickSequencer;
pub use types::instrument::Instrument;
pub use types::note::Note;
pub use types::pitch::Pitch;
pub use types::pitch::PitchClass;
