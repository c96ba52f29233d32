use anyhow::Result;
use anyhow::anyhow;
use std::fmt;
use std::str::FromStr;

const SEMITONES_PER_OCTAVE: i32 = 12;

/// MIDI note number of middle C (C4).
pub const MIDDLE_C_MIDI: i32 = 60;

/// One of the twelve chromatic pitch classes. The discriminant is the
/// semitone index within the octave (C=0, B=11).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PitchClass {
    C,
    CSharp,
    D,
    DSharp,
    E,
    F,
    FSharp,
    G,
    GSharp,
    A,
    ASharp,
    B,
}

impl PitchClass {
    const ALL: [PitchClass; 12] = [
        PitchClass::C,
        PitchClass::CSharp,
        PitchClass::D,
        PitchClass::DSharp,
        PitchClass::E,
        PitchClass::F,
        PitchClass::FSharp,
        PitchClass::G,
        PitchClass::GSharp,
        PitchClass::A,
        PitchClass::ASharp,
        PitchClass::B,
    ];

    /// Semitone index within the octave (C=0, B=11).
    pub fn semitone(self) -> i32 {
        self as i32
    }

    fn from_semitone(semitone: i32) -> Self {
        Self::ALL[semitone.rem_euclid(SEMITONES_PER_OCTAVE) as usize]
    }

    /// Sharp-spelled name ("C", "C#", ...).
    pub fn name(self) -> &'static str {
        match self {
            PitchClass::C => "C",
            PitchClass::CSharp => "C#",
            PitchClass::D => "D",
            PitchClass::DSharp => "D#",
            PitchClass::E => "E",
            PitchClass::F => "F",
            PitchClass::FSharp => "F#",
            PitchClass::G => "G",
            PitchClass::GSharp => "G#",
            PitchClass::A => "A",
            PitchClass::ASharp => "A#",
            PitchClass::B => "B",
        }
    }
}

impl fmt::Display for PitchClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

/// A pitch on the chromatic scale, stored as a signed semitone offset
/// from middle C. C4 is middle C, MIDI note 60.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pitch {
    semitones_from_middle_c: i32,
}

impl Pitch {
    /// The reference pitch, C4.
    pub const MIDDLE_C: Pitch = Pitch {
        semitones_from_middle_c: 0,
    };

    pub fn new(class: PitchClass, octave: i32) -> Self {
        Self {
            semitones_from_middle_c: (octave - 4) * SEMITONES_PER_OCTAVE + class.semitone(),
        }
    }

    /// A new pitch shifted by the given number of semitones. The offset
    /// wraps on `i32` overflow, so shifting is total; playable range is
    /// enforced at the MIDI boundary, not here.
    pub fn transpose(self, semitones: i32) -> Self {
        Self {
            semitones_from_middle_c: self.semitones_from_middle_c.wrapping_add(semitones),
        }
    }

    /// Signed semitone distance from `other` up to `self`.
    pub fn difference(self, other: Pitch) -> i32 {
        self.semitones_from_middle_c - other.semitones_from_middle_c
    }

    /// The MIDI note number, middle C = 60. May leave 0..=127 after
    /// large transpositions; range is enforced at the MIDI boundary.
    pub fn midi_number(self) -> i32 {
        self.difference(Self::MIDDLE_C) + MIDDLE_C_MIDI
    }

    pub fn class(self) -> PitchClass {
        PitchClass::from_semitone(self.midi_number())
    }

    pub fn octave(self) -> i32 {
        self.midi_number().div_euclid(SEMITONES_PER_OCTAVE) - 1
    }
}

impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&format!("{}{}", self.class().name(), self.octave()))
    }
}

impl FromStr for Pitch {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let mut chars = s.chars();

        let letter = chars
            .next()
            .ok_or_else(|| anyhow!("Invalid pitch: {}", s))?;
        let class = match letter.to_ascii_uppercase() {
            'C' => PitchClass::C,
            'D' => PitchClass::D,
            'E' => PitchClass::E,
            'F' => PitchClass::F,
            'G' => PitchClass::G,
            'A' => PitchClass::A,
            'B' => PitchClass::B,
            _ => return Err(anyhow!("Invalid pitch letter: {}", s)),
        };

        let rest = chars.as_str();
        let (accidental, octave_str) = match rest.chars().next() {
            Some('#') => (1, &rest[1..]),
            Some('b') => (-1, &rest[1..]),
            _ => (0, rest),
        };

        let octave: i32 = octave_str
            .parse()
            .map_err(|_e| anyhow!("Invalid pitch octave: {}", s))?;

        Ok(Pitch::new(class, octave).transpose(accidental))
    }
}
