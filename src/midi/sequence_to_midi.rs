use crate::player::{SequencePlayer, TickSequencer};
use crate::types::instrument::Instrument;
use anyhow::{Result, bail};
use midly::{MetaMessage, MidiMessage, Smf, Timing, TrackEvent, TrackEventKind};
use std::collections::HashMap;

const NOTE_VELOCITY: u8 = 90;
const NOTE_OFF_VELOCITY: u8 = 64;

/// The GM percussion channel; program changes there select drum kits,
/// so melodic voices must not be assigned to it.
const PERCUSSION_CHANNEL: u8 = 9;

/// Serialize the sequencer's scheduled notes as a single-track
/// Standard MIDI File.
///
/// Each distinct instrument gets its own channel with one program
/// change; notes become NoteOn/NoteOff pairs at their scheduled ticks.
/// The file's metrical timing equals the sequencer's ticks-per-beat, so
/// tick values carry over unchanged.
pub fn sequence_to_midi(sequencer: &TickSequencer) -> Result<Vec<u8>> {
    let ticks_per_beat = sequencer.ticks_per_beat();
    if ticks_per_beat == 0 || ticks_per_beat > midly::num::u15::max_value().as_int() as u32 {
        bail!("Ticks per beat {} out of range for MIDI timing", ticks_per_beat);
    }

    let channels = assign_channels(sequencer)?;

    // (tick, order, kind): note-offs sort before note-ons at the same
    // tick so adjacent equal pitches do not merge. A zero-length note
    // is the exception: its off must follow its own on, or the on is
    // left hanging.
    let mut events: Vec<(u64, u8, TrackEventKind<'static>)> = Vec::new();

    let mut by_channel: Vec<(&Instrument, &u8)> = channels.iter().collect();
    by_channel.sort_by_key(|(_, channel)| **channel);

    for (instrument, channel) in by_channel {
        events.push((
            0,
            0,
            TrackEventKind::Midi {
                channel: midly::num::u4::new(*channel),
                message: MidiMessage::ProgramChange {
                    program: midly::num::u7::new(instrument.program()),
                },
            },
        ));
    }

    for note in sequencer.notes() {
        if !(0..=127).contains(&note.pitch_number) {
            bail!("Pitch number {} out of range for MIDI", note.pitch_number);
        }
        let key = midly::num::u7::new(note.pitch_number as u8);
        let channel = midly::num::u4::new(channels[&note.instrument]);

        events.push((
            note.start_tick,
            2,
            TrackEventKind::Midi {
                channel,
                message: MidiMessage::NoteOn {
                    key,
                    vel: midly::num::u7::new(NOTE_VELOCITY),
                },
            },
        ));
        let off_order = if note.duration_ticks == 0 { 3 } else { 1 };
        events.push((
            note.start_tick + note.duration_ticks,
            off_order,
            TrackEventKind::Midi {
                channel,
                message: MidiMessage::NoteOff {
                    key,
                    vel: midly::num::u7::new(NOTE_OFF_VELOCITY),
                },
            },
        ));
    }

    events.sort_by_key(|(tick, order, _)| (*tick, *order));

    let mut track_events = Vec::new();
    let mut last_tick = 0u64;

    for (tick, _order, kind) in events {
        let mut delta = tick - last_tick;
        last_tick = tick;

        while delta > midly::num::u28::max_value().as_int() as u64 {
            track_events.push(TrackEvent {
                delta: midly::num::u28::max_value(),
                kind: TrackEventKind::Meta(MetaMessage::Text(b"long delta")),
            });
            delta -= midly::num::u28::max_value().as_int() as u64;
        }

        track_events.push(TrackEvent {
            delta: midly::num::u28::new(delta as u32),
            kind,
        });
    }

    track_events.push(TrackEvent {
        delta: midly::num::u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
    });

    let smf = Smf {
        header: midly::Header {
            format: midly::Format::SingleTrack,
            timing: Timing::Metrical(midly::num::u15::new(ticks_per_beat as u16)),
        },
        tracks: vec![track_events],
    };

    let mut buffer = Vec::new();
    smf.write(&mut buffer)
        .map_err(|e| anyhow::anyhow!("Failed to write MIDI: {}", e))?;

    Ok(buffer)
}

/// One channel per distinct instrument, in first-appearance order,
/// skipping the percussion channel.
fn assign_channels(sequencer: &TickSequencer) -> Result<HashMap<Instrument, u8>> {
    let mut channels = HashMap::new();
    let mut next_channel = 0u8;

    for note in sequencer.notes() {
        if channels.contains_key(&note.instrument) {
            continue;
        }
        if next_channel == PERCUSSION_CHANNEL {
            next_channel += 1;
        }
        if next_channel > 15 {
            bail!("More than 15 distinct instruments; out of MIDI channels");
        }
        channels.insert(note.instrument, next_channel);
        next_channel += 1;
    }

    Ok(channels)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_timing() {
        let mut sequencer = TickSequencer::new(480);
        sequencer.add_note(Instrument::Piano, 60, 0, 480);
        let bytes = sequence_to_midi(&sequencer).unwrap();
        let smf = Smf::parse(&bytes).unwrap();
        assert_eq!(smf.header.format, midly::Format::SingleTrack);
        assert_eq!(
            smf.header.timing,
            Timing::Metrical(midly::num::u15::new(480))
        );
        assert_eq!(smf.tracks.len(), 1);
    }

    #[test]
    fn test_note_on_off_pairs() {
        let mut sequencer = TickSequencer::new(4);
        sequencer.add_note(Instrument::Piano, 60, 10, 4);
        let bytes = sequence_to_midi(&sequencer).unwrap();
        let smf = Smf::parse(&bytes).unwrap();
        let track = &smf.tracks[0];

        let ons: Vec<_> = track
            .iter()
            .filter(|e| matches!(e.kind, TrackEventKind::Midi { message: MidiMessage::NoteOn { .. }, .. }))
            .collect();
        let offs: Vec<_> = track
            .iter()
            .filter(|e| matches!(e.kind, TrackEventKind::Midi { message: MidiMessage::NoteOff { .. }, .. }))
            .collect();
        assert_eq!(ons.len(), 1);
        assert_eq!(offs.len(), 1);
        // program change at 0, note on 10 ticks later, note off 4 after that
        assert_eq!(ons[0].delta.as_int(), 10);
        assert_eq!(offs[0].delta.as_int(), 4);
    }

    #[test]
    fn test_channel_per_instrument() {
        let mut sequencer = TickSequencer::new(4);
        sequencer.add_note(Instrument::Piano, 60, 0, 4);
        sequencer.add_note(Instrument::Guitar, 64, 0, 4);
        sequencer.add_note(Instrument::Piano, 67, 4, 4);

        let channels = assign_channels(&sequencer).unwrap();
        assert_eq!(channels.len(), 2);
        assert_eq!(channels[&Instrument::Piano], 0);
        assert_eq!(channels[&Instrument::Guitar], 1);

        let bytes = sequence_to_midi(&sequencer).unwrap();
        let smf = Smf::parse(&bytes).unwrap();
        let programs: Vec<_> = smf.tracks[0]
            .iter()
            .filter_map(|e| match e.kind {
                TrackEventKind::Midi {
                    message: MidiMessage::ProgramChange { program },
                    ..
                } => Some(program.as_int()),
                _ => None,
            })
            .collect();
        assert_eq!(programs, vec![0, 24]);
    }

    #[test]
    fn test_percussion_channel_skipped() {
        let voices = [
            Instrument::Piano,
            Instrument::ElectricPiano,
            Instrument::Harpsichord,
            Instrument::Celesta,
            Instrument::Glockenspiel,
            Instrument::MusicBox,
            Instrument::Vibraphone,
            Instrument::Marimba,
            Instrument::Xylophone,
            Instrument::ChurchOrgan,
        ];
        let mut sequencer = TickSequencer::new(4);
        for (i, voice) in voices.iter().enumerate() {
            sequencer.add_note(*voice, 60, i as u64 * 4, 4);
        }
        let channels = assign_channels(&sequencer).unwrap();
        assert_eq!(channels[&Instrument::ChurchOrgan], 10);
        assert!(!channels.values().any(|c| *c == PERCUSSION_CHANNEL));
    }

    #[test]
    fn test_zero_length_note_on_before_off() {
        // Reachable from valid input: 0.1 beats at 4 ticks/beat
        // truncates to 0 ticks.
        let mut sequencer = TickSequencer::new(4);
        sequencer.add_note(Instrument::Piano, 60, 10, 0);
        let bytes = sequence_to_midi(&sequencer).unwrap();
        let smf = Smf::parse(&bytes).unwrap();

        let order: Vec<&str> = smf.tracks[0]
            .iter()
            .filter_map(|e| match e.kind {
                TrackEventKind::Midi {
                    message: MidiMessage::NoteOn { .. },
                    ..
                } => Some("on"),
                TrackEventKind::Midi {
                    message: MidiMessage::NoteOff { .. },
                    ..
                } => Some("off"),
                _ => None,
            })
            .collect();
        assert_eq!(order, vec!["on", "off"]);
    }

    #[test]
    fn test_adjacent_equal_pitches_do_not_merge() {
        // The note ending at tick 4 releases before the next one starts.
        let mut sequencer = TickSequencer::new(4);
        sequencer.add_note(Instrument::Piano, 60, 0, 4);
        sequencer.add_note(Instrument::Piano, 60, 4, 4);
        let bytes = sequence_to_midi(&sequencer).unwrap();
        let smf = Smf::parse(&bytes).unwrap();

        let order: Vec<&str> = smf.tracks[0]
            .iter()
            .filter_map(|e| match e.kind {
                TrackEventKind::Midi {
                    message: MidiMessage::NoteOn { .. },
                    ..
                } => Some("on"),
                TrackEventKind::Midi {
                    message: MidiMessage::NoteOff { .. },
                    ..
                } => Some("off"),
                _ => None,
            })
            .collect();
        assert_eq!(order, vec!["on", "off", "on", "off"]);
    }

    #[test]
    fn test_out_of_range_pitch() {
        let mut sequencer = TickSequencer::new(4);
        sequencer.add_note(Instrument::Piano, 128, 0, 4);
        assert!(sequence_to_midi(&sequencer).is_err());

        let mut sequencer = TickSequencer::new(4);
        sequencer.add_note(Instrument::Piano, -1, 0, 4);
        assert!(sequence_to_midi(&sequencer).is_err());
    }

    #[test]
    fn test_zero_ticks_per_beat_rejected() {
        let sequencer = TickSequencer::new(0);
        assert!(sequence_to_midi(&sequencer).is_err());
    }
}
