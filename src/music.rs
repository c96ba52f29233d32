use crate::player::SequencePlayer;
use crate::types::instrument::Instrument;
use crate::types::note::Note;
use crate::types::pitch::Pitch;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;
use thiserror::Error;

/// Rejected construction arguments. These are programming errors and are
/// surfaced at construction time, never deferred to playback.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum MusicError {
    #[error("duration must be non-negative, got {0} beats")]
    NegativeDuration(f64),
    #[error("duration must be finite, got {0}")]
    NonFiniteDuration(f64),
}

/// An immutable composition value.
///
/// The variant set is closed: a composition is a note, a rest, or a
/// sequential/parallel combination of two compositions. Children are
/// shared through `Rc`, so the same subtree may appear under several
/// parents without copying; nothing mutates a value after construction.
#[derive(Debug, Clone, PartialEq)]
pub enum Music {
    Note(Note),
    Rest { beats: f64 },
    Seq(Rc<Music>, Rc<Music>),
    Par(Rc<Music>, Rc<Music>),
}

impl Music {
    /// A single note, validated like [`Note::new`].
    pub fn note(
        duration: f64,
        pitch: Pitch,
        instrument: Instrument,
    ) -> Result<Self, MusicError> {
        Ok(Music::Note(Note::new(duration, pitch, instrument)?))
    }

    /// A silence of the given length, subject to the same duration rule
    /// as notes.
    pub fn rest(beats: f64) -> Result<Self, MusicError> {
        if !beats.is_finite() {
            return Err(MusicError::NonFiniteDuration(beats));
        }
        if beats < 0.0 {
            return Err(MusicError::NegativeDuration(beats));
        }
        // Normalize -0.0 so equal rests hash equally.
        Ok(Music::Rest { beats: beats + 0.0 })
    }

    /// `first` followed by `second`.
    pub fn seq(first: Music, second: Music) -> Self {
        Music::Seq(Rc::new(first), Rc::new(second))
    }

    /// `a` and `b` starting together.
    pub fn par(a: Music, b: Music) -> Self {
        Music::Par(Rc::new(a), Rc::new(b))
    }

    /// Sequential composition of any number of pieces. An empty line is
    /// a zero-beat rest.
    pub fn line<I: IntoIterator<Item = Music>>(pieces: I) -> Self {
        let mut iter = pieces.into_iter();
        let Some(first) = iter.next() else {
            return Music::Rest { beats: 0.0 };
        };
        iter.fold(first, Music::seq)
    }

    /// Total length in beats. Sequential parts add; parallel parts
    /// overlap, so the longer one decides.
    pub fn duration(&self) -> f64 {
        match self {
            Music::Note(note) => note.duration(),
            Music::Rest { beats } => *beats,
            Music::Seq(first, second) => first.duration() + second.duration(),
            Music::Par(a, b) => a.duration().max(b.duration()),
        }
    }

    /// A structurally new composition with every pitch shifted by
    /// `semitones_up`. Timing is unaffected.
    pub fn transpose(&self, semitones_up: i32) -> Music {
        match self {
            Music::Note(note) => Music::Note(note.transpose(semitones_up)),
            Music::Rest { beats } => Music::Rest { beats: *beats },
            Music::Seq(first, second) => Music::Seq(
                Rc::new(first.transpose(semitones_up)),
                Rc::new(second.transpose(semitones_up)),
            ),
            Music::Par(a, b) => Music::Par(
                Rc::new(a.transpose(semitones_up)),
                Rc::new(b.transpose(semitones_up)),
            ),
        }
    }

    /// Schedule this composition into `player` starting at the absolute
    /// tick `at_tick`; returns the number of ticks it occupies. The
    /// second element of a `Seq` starts where the first one ends.
    pub fn play(&self, player: &mut dyn SequencePlayer, at_tick: u64) -> u64 {
        match self {
            Music::Note(note) => note.play(player, at_tick),
            Music::Rest { beats } => (beats * player.ticks_per_beat() as f64) as u64,
            Music::Seq(first, second) => {
                let first_ticks = first.play(player, at_tick);
                let second_ticks = second.play(player, at_tick + first_ticks);
                first_ticks + second_ticks
            }
            Music::Par(a, b) => {
                let a_ticks = a.play(player, at_tick);
                let b_ticks = b.play(player, at_tick);
                a_ticks.max(b_ticks)
            }
        }
    }
}

// Construction rejects non-finite durations, so the f64 fields never
// hold NaN and equality is reflexive.
impl Eq for Music {}

impl Hash for Music {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Music::Note(note) => {
                0u8.hash(state);
                note.hash(state);
            }
            Music::Rest { beats } => {
                1u8.hash(state);
                beats.to_bits().hash(state);
            }
            Music::Seq(first, second) => {
                2u8.hash(state);
                first.hash(state);
                second.hash(state);
            }
            Music::Par(a, b) => {
                3u8.hash(state);
                a.hash(state);
                b.hash(state);
            }
        }
    }
}

impl fmt::Display for Music {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Music::Note(note) => write!(f, "{}", note),
            Music::Rest { beats } => write!(f, "rest:{}", beats),
            Music::Seq(first, second) => write!(f, "({} {})", first, second),
            Music::Par(a, b) => write!(f, "({} | {})", a, b),
        }
    }
}

impl From<Note> for Music {
    fn from(note: Note) -> Self {
        Music::Note(note)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::TickSequencer;
    use crate::types::pitch::PitchClass;
    use pretty_assertions::assert_eq;
    use std::collections::hash_map::DefaultHasher;

    fn note(duration: f64, pitch: Pitch) -> Music {
        Music::note(duration, pitch, Instrument::Piano).unwrap()
    }

    fn hash_of(music: &Music) -> u64 {
        let mut hasher = DefaultHasher::new();
        music.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn test_invalid_construction() {
        assert_eq!(Music::rest(-0.5), Err(MusicError::NegativeDuration(-0.5)));
        assert!(matches!(
            Music::rest(f64::NAN),
            Err(MusicError::NonFiniteDuration(_))
        ));
        assert!(Music::note(-1.0, Pitch::MIDDLE_C, Instrument::Piano).is_err());
    }

    #[test]
    fn test_duration() {
        let c = note(1.0, Pitch::MIDDLE_C);
        let e = note(0.5, Pitch::new(PitchClass::E, 4));
        assert_eq!(Music::seq(c.clone(), e.clone()).duration(), 1.5);
        assert_eq!(Music::par(c.clone(), e.clone()).duration(), 1.0);
        assert_eq!(Music::rest(2.0).unwrap().duration(), 2.0);
        assert_eq!(
            Music::line([c, Music::rest(1.0).unwrap(), e]).duration(),
            2.5
        );
        assert_eq!(Music::line([]).duration(), 0.0);
    }

    #[test]
    fn test_transpose_laws() {
        let piece = Music::seq(
            note(1.0, Pitch::MIDDLE_C),
            Music::par(
                note(0.5, Pitch::new(PitchClass::E, 4)),
                Music::rest(0.5).unwrap(),
            ),
        );
        assert_eq!(piece.transpose(0), piece);
        assert_eq!(piece.transpose(3).transpose(4), piece.transpose(7));
        assert_eq!(piece.transpose(12).duration(), piece.duration());
        assert_ne!(piece.transpose(12), piece);
    }

    #[test]
    fn test_equality_and_hash() {
        let a = Music::seq(note(1.0, Pitch::MIDDLE_C), Music::rest(1.0).unwrap());
        let b = Music::seq(note(1.0, Pitch::MIDDLE_C), Music::rest(1.0).unwrap());
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
        assert_ne!(a, Music::par(note(1.0, Pitch::MIDDLE_C), Music::rest(1.0).unwrap()));
    }

    #[test]
    fn test_negative_zero_rest_hashes_like_zero() {
        let pos = Music::rest(0.0).unwrap();
        let neg = Music::rest(-0.0).unwrap();
        assert_eq!(pos, neg);
        assert_eq!(hash_of(&pos), hash_of(&neg));
    }

    #[test]
    fn test_shared_subtree() {
        let motif = Rc::new(note(1.0, Pitch::MIDDLE_C));
        let piece = Music::Seq(motif.clone(), motif.clone());
        assert_eq!(piece.duration(), 2.0);

        let mut player = TickSequencer::new(4);
        assert_eq!(piece.play(&mut player, 0), 8);
        let starts: Vec<u64> = player.notes().iter().map(|n| n.start_tick).collect();
        assert_eq!(starts, vec![0, 4]);
    }

    #[test]
    fn test_play_sequential_offsets() {
        let piece = Music::line([
            note(1.0, Pitch::MIDDLE_C),
            Music::rest(0.5).unwrap(),
            note(0.5, Pitch::new(PitchClass::G, 4)),
        ]);
        let mut player = TickSequencer::new(4);
        let ticks = piece.play(&mut player, 2);
        assert_eq!(ticks, 8);

        let notes = player.notes();
        assert_eq!(notes.len(), 2);
        assert_eq!((notes[0].start_tick, notes[0].duration_ticks), (2, 4));
        // second note starts after the note and the rest: 2 + 4 + 2
        assert_eq!((notes[1].start_tick, notes[1].duration_ticks), (8, 2));
        assert_eq!(notes[1].pitch_number, 67);
    }

    #[test]
    fn test_play_parallel() {
        let piece = Music::par(note(1.0, Pitch::MIDDLE_C), note(2.0, Pitch::new(PitchClass::E, 4)));
        let mut player = TickSequencer::new(4);
        let ticks = piece.play(&mut player, 0);
        assert_eq!(ticks, 8);

        let notes = player.notes();
        assert_eq!(notes.len(), 2);
        assert_eq!(notes[0].start_tick, 0);
        assert_eq!(notes[1].start_tick, 0);
    }

    #[test]
    fn test_rest_schedules_nothing() {
        let mut player = TickSequencer::new(7);
        assert_eq!(Music::rest(1.5).unwrap().play(&mut player, 0), 10);
        assert!(player.notes().is_empty());
    }

    #[test]
    fn test_display() {
        let piece = Music::seq(
            note(1.0, Pitch::MIDDLE_C),
            Music::par(note(0.5, Pitch::new(PitchClass::E, 4)), Music::rest(0.5).unwrap()),
        );
        assert_eq!(piece.to_string(), "(C4:1 (E4:0.5 | rest:0.5))");
    }
}
