use crate::music::MusicError;
use crate::player::SequencePlayer;
use crate::types::pitch::{MIDDLE_C_MIDI, Pitch};
use crate::types::instrument::Instrument;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A single pitched, timed event played by one instrument.
///
/// A `Note` is immutable once constructed: `transpose` returns a new
/// value and no operation mutates the receiver. Equality compares the
/// duration by exact bit pattern, with no tolerance; two notes that
/// differ by any floating-point drift are unequal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Note {
    duration: f64,
    pitch: Pitch,
    instrument: Instrument,
}

impl Note {
    /// Make a note played by `instrument` for `duration` beats.
    ///
    /// The duration must be finite and non-negative; anything else is a
    /// construction error, reported immediately rather than deferred to
    /// playback.
    pub fn new(duration: f64, pitch: Pitch, instrument: Instrument) -> Result<Self, MusicError> {
        if !duration.is_finite() {
            return Err(MusicError::NonFiniteDuration(duration));
        }
        if duration < 0.0 {
            return Err(MusicError::NegativeDuration(duration));
        }
        // Normalize -0.0: it compares equal to 0.0 but has a different
        // bit pattern, which would break hash consistency.
        Ok(Self {
            duration: duration + 0.0,
            pitch,
            instrument,
        })
    }

    /// Length in beats.
    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn pitch(&self) -> Pitch {
        self.pitch
    }

    pub fn instrument(&self) -> Instrument {
        self.instrument
    }

    /// A new note with the pitch shifted by `semitones_up`, same
    /// duration and instrument.
    pub fn transpose(&self, semitones_up: i32) -> Note {
        Note {
            duration: self.duration,
            pitch: self.pitch.transpose(semitones_up),
            instrument: self.instrument,
        }
    }

    /// Schedule this note into `player` starting at `at_tick`.
    ///
    /// The beat duration is converted to ticks by truncation; fractional
    /// tick remainders are dropped, not rounded. Issues exactly one
    /// scheduling call and returns the number of ticks consumed.
    pub fn play(&self, player: &mut dyn SequencePlayer, at_tick: u64) -> u64 {
        let ticks = (self.duration * player.ticks_per_beat() as f64) as u64;
        player.add_note(
            self.instrument,
            self.pitch.difference(Pitch::MIDDLE_C) + MIDDLE_C_MIDI,
            at_tick,
            ticks,
        );
        ticks
    }
}

// PartialEq on the raw f64 cannot observe NaN: the constructor rejects
// non-finite durations, so equality is reflexive for every reachable note.
impl Eq for Note {}

impl Hash for Note {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.duration.to_bits().hash(state);
        self.pitch.hash(state);
        self.instrument.hash(state);
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.pitch, self.duration)
    }
}
