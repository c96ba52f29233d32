use crate::types::instrument::Instrument;
use std::fmt;

/// The playback boundary a composition renders into.
///
/// Implementations accumulate scheduled events keyed by absolute tick
/// offsets; `ticks_per_beat` is the beats-to-ticks conversion factor the
/// composition uses when translating durations.
pub trait SequencePlayer {
    fn ticks_per_beat(&self) -> u32;

    /// Schedule one note event. `pitch_number` is the device pitch
    /// (middle C = 60); it may leave the MIDI range 0..=127 after large
    /// transpositions, and range enforcement is left to the backend.
    fn add_note(
        &mut self,
        instrument: Instrument,
        pitch_number: i32,
        start_tick: u64,
        duration_ticks: u64,
    );
}

/// One scheduled note event, as handed to [`SequencePlayer::add_note`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledNote {
    pub instrument: Instrument,
    pub pitch_number: i32,
    pub start_tick: u64,
    pub duration_ticks: u64,
}

impl fmt::Display for ScheduledNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{:>8}] {} key={} dur={}",
            self.start_tick, self.instrument, self.pitch_number, self.duration_ticks
        )
    }
}

/// A [`SequencePlayer`] that records events in call order.
///
/// This is the crate's in-memory event stream: backends (the MIDI
/// serializer, the CLI listing) consume its notes, and tests inspect
/// them directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickSequencer {
    ticks_per_beat: u32,
    notes: Vec<ScheduledNote>,
}

impl TickSequencer {
    pub fn new(ticks_per_beat: u32) -> Self {
        Self {
            ticks_per_beat,
            notes: Vec::new(),
        }
    }

    /// Events in the order they were scheduled.
    pub fn notes(&self) -> &[ScheduledNote] {
        &self.notes
    }

    pub fn into_notes(self) -> Vec<ScheduledNote> {
        self.notes
    }

    /// Events ordered by start tick, then pitch, for stable listings.
    pub fn sorted_notes(&self) -> Vec<ScheduledNote> {
        let mut sorted = self.notes.clone();
        sorted.sort_by_key(|n| (n.start_tick, n.pitch_number, n.duration_ticks));
        sorted
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }
}

impl SequencePlayer for TickSequencer {
    fn ticks_per_beat(&self) -> u32 {
        self.ticks_per_beat
    }

    fn add_note(
        &mut self,
        instrument: Instrument,
        pitch_number: i32,
        start_tick: u64,
        duration_ticks: u64,
    ) {
        self.notes.push(ScheduledNote {
            instrument,
            pitch_number,
            start_tick,
            duration_ticks,
        });
    }
}

impl fmt::Display for TickSequencer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for note in self.sorted_notes() {
            writeln!(f, "{}", note)?;
        }
        Ok(())
    }
}
