use crate::music::Music;
use crate::types::instrument::Instrument;
use crate::types::pitch::Pitch;
use anyhow::{Result, bail};

/// Parse a score in the line-based text format.
///
/// Each non-empty line holds one sequential element:
///
/// ```text
/// // a comment
/// piano C4 1
/// piano E4 0.5
/// rest 0.5
/// guitar G4 2
/// ```
///
/// `rest <beats>` is a silence; `<instrument> <pitch> <beats>` is a note.
/// Lines play one after another.
pub fn parse_score(content: &str) -> Result<Music> {
    let mut pieces = Vec::new();

    for (line_idx, line) in content.lines().enumerate() {
        match parse_score_line(line) {
            Ok(Some(piece)) => pieces.push(piece),
            Ok(None) => {}
            Err(e) => bail!("Line #{}: {}", line_idx + 1, e),
        }
    }

    if pieces.is_empty() {
        bail!("Score contains no notes or rests");
    }

    Ok(Music::line(pieces))
}

fn parse_score_line(line: &str) -> Result<Option<Music>> {
    let line = match line.split_once("//") {
        Some((before, _comment)) => before,
        None => line,
    };

    let parts: Vec<&str> = line.split_whitespace().collect();
    match parts.as_slice() {
        [] => Ok(None),
        ["rest", beats] => {
            let beats: f64 = beats
                .parse()
                .map_err(|_e| anyhow::anyhow!("Invalid rest duration: {}", beats))?;
            Ok(Some(Music::rest(beats)?))
        }
        [instrument, pitch, beats] => {
            let instrument: Instrument = instrument.parse()?;
            let pitch: Pitch = pitch.parse()?;
            let beats: f64 = beats
                .parse()
                .map_err(|_e| anyhow::anyhow!("Invalid note duration: {}", beats))?;
            Ok(Some(Music::note(beats, pitch, instrument)?))
        }
        _ => bail!("Expected 'rest <beats>' or '<instrument> <pitch> <beats>'"),
    }
}
