use anyhow::Result;
use anyhow::anyhow;
use std::fmt;
use std::str::FromStr;

/// A General MIDI voice. Opaque to the composition algebra; only the
/// playback backend interprets the program number, which doubles as the
/// enum discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Instrument {
    Piano = 0,
    ElectricPiano = 4,
    Harpsichord = 6,
    Celesta = 8,
    Glockenspiel = 9,
    MusicBox = 10,
    Vibraphone = 11,
    Marimba = 12,
    Xylophone = 13,
    ChurchOrgan = 19,
    Accordion = 21,
    Guitar = 24,
    ElectricGuitar = 27,
    AcousticBass = 32,
    ElectricBass = 33,
    Violin = 40,
    Viola = 41,
    Cello = 42,
    Harp = 46,
    Timpani = 47,
    Trumpet = 56,
    Trombone = 57,
    Tuba = 58,
    FrenchHorn = 60,
    SopranoSax = 64,
    AltoSax = 65,
    TenorSax = 66,
    Oboe = 68,
    Bassoon = 70,
    Clarinet = 71,
    Piccolo = 72,
    Flute = 73,
}

impl Instrument {
    const NAMES: [(Instrument, &'static str); 32] = [
        (Instrument::Piano, "piano"),
        (Instrument::ElectricPiano, "electric_piano"),
        (Instrument::Harpsichord, "harpsichord"),
        (Instrument::Celesta, "celesta"),
        (Instrument::Glockenspiel, "glockenspiel"),
        (Instrument::MusicBox, "music_box"),
        (Instrument::Vibraphone, "vibraphone"),
        (Instrument::Marimba, "marimba"),
        (Instrument::Xylophone, "xylophone"),
        (Instrument::ChurchOrgan, "church_organ"),
        (Instrument::Accordion, "accordion"),
        (Instrument::Guitar, "guitar"),
        (Instrument::ElectricGuitar, "electric_guitar"),
        (Instrument::AcousticBass, "acoustic_bass"),
        (Instrument::ElectricBass, "electric_bass"),
        (Instrument::Violin, "violin"),
        (Instrument::Viola, "viola"),
        (Instrument::Cello, "cello"),
        (Instrument::Harp, "harp"),
        (Instrument::Timpani, "timpani"),
        (Instrument::Trumpet, "trumpet"),
        (Instrument::Trombone, "trombone"),
        (Instrument::Tuba, "tuba"),
        (Instrument::FrenchHorn, "french_horn"),
        (Instrument::SopranoSax, "soprano_sax"),
        (Instrument::AltoSax, "alto_sax"),
        (Instrument::TenorSax, "tenor_sax"),
        (Instrument::Oboe, "oboe"),
        (Instrument::Bassoon, "bassoon"),
        (Instrument::Clarinet, "clarinet"),
        (Instrument::Piccolo, "piccolo"),
        (Instrument::Flute, "flute"),
    ];

    /// General MIDI program number.
    pub fn program(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            Instrument::Piano => "piano",
            Instrument::ElectricPiano => "electric_piano",
            Instrument::Harpsichord => "harpsichord",
            Instrument::Celesta => "celesta",
            Instrument::Glockenspiel => "glockenspiel",
            Instrument::MusicBox => "music_box",
            Instrument::Vibraphone => "vibraphone",
            Instrument::Marimba => "marimba",
            Instrument::Xylophone => "xylophone",
            Instrument::ChurchOrgan => "church_organ",
            Instrument::Accordion => "accordion",
            Instrument::Guitar => "guitar",
            Instrument::ElectricGuitar => "electric_guitar",
            Instrument::AcousticBass => "acoustic_bass",
            Instrument::ElectricBass => "electric_bass",
            Instrument::Violin => "violin",
            Instrument::Viola => "viola",
            Instrument::Cello => "cello",
            Instrument::Harp => "harp",
            Instrument::Timpani => "timpani",
            Instrument::Trumpet => "trumpet",
            Instrument::Trombone => "trombone",
            Instrument::Tuba => "tuba",
            Instrument::FrenchHorn => "french_horn",
            Instrument::SopranoSax => "soprano_sax",
            Instrument::AltoSax => "alto_sax",
            Instrument::TenorSax => "tenor_sax",
            Instrument::Oboe => "oboe",
            Instrument::Bassoon => "bassoon",
            Instrument::Clarinet => "clarinet",
            Instrument::Piccolo => "piccolo",
            Instrument::Flute => "flute",
        }
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

impl FromStr for Instrument {
    type Err = anyhow::Error;

    /// Accepts either a voice name ("piano") or a GM program number ("0").
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let lower = s.to_lowercase();

        if let Some((instrument, _)) = Self::NAMES.iter().find(|(_, name)| *name == lower) {
            return Ok(*instrument);
        }

        if let Ok(num) = s.parse::<u8>() {
            if let Some((instrument, _)) = Self::NAMES.iter().find(|(i, _)| i.program() == num) {
                return Ok(*instrument);
            }
            return Err(anyhow!("No voice with GM program number {}", num));
        }

        Err(anyhow!("Unknown instrument: {}", s))
    }
}
