use anyhow::{Context, Result};
use canto::{SequencePlayer, TickSequencer, parse_score};
use clap::{Arg, Command};
use std::path::Path;

fn main() -> Result<()> {
    let matches = Command::new("canto")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Render a canto score to MIDI or a tick listing")
        .arg(
            Arg::new("input")
                .help("Input score file (.canto)")
                .required(true)
                .value_name("INPUT_FILE")
                .index(1),
        )
        .arg(
            Arg::new("output")
                .help("Output MIDI file (.mid); omit to print the event listing")
                .value_name("OUTPUT_FILE")
                .index(2),
        )
        .arg(
            Arg::new("transpose")
                .help("Transpose by semitones (e.g. +1, -12)")
                .long("transpose")
                .allow_hyphen_values(true)
                .value_name("SEMITONES")
                .value_parser(clap::value_parser!(i32)),
        )
        .arg(
            Arg::new("ticks-per-beat")
                .help("Ticks per beat for rendering")
                .long("ticks-per-beat")
                .value_name("TICKS")
                .default_value("480")
                .value_parser(clap::value_parser!(u32)),
        )
        .arg(
            Arg::new("verbose")
                .help("Enable verbose output")
                .short('v')
                .long("verbose")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    let input = matches.get_one::<String>("input").unwrap();
    let output = matches.get_one::<String>("output");
    let transpose = matches.get_one::<i32>("transpose").copied().unwrap_or(0);
    let ticks_per_beat = *matches.get_one::<u32>("ticks-per-beat").unwrap();
    let verbose = matches.get_flag("verbose");

    let content = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read score file: {}", input))?;

    let mut music = parse_score(&content)?;
    if verbose {
        println!("Parsed score, {} beats", music.duration());
    }

    if transpose != 0 {
        music = music.transpose(transpose);
        if verbose {
            println!("Transposed by {} semitones", transpose);
        }
    }

    let mut sequencer = TickSequencer::new(ticks_per_beat);
    let total_ticks = music.play(&mut sequencer, 0);
    if verbose {
        println!(
            "Rendered {} events over {} ticks at {} ticks/beat",
            sequencer.notes().len(),
            total_ticks,
            sequencer.ticks_per_beat()
        );
    }

    match output {
        Some(output) => {
            if Path::new(output)
                .extension()
                .and_then(|ext| ext.to_str())
                .is_none_or(|ext| !ext.eq_ignore_ascii_case("mid"))
            {
                println!("Warning: output file does not end in .mid");
            }
            write_midi(&sequencer, output, verbose)?;
        }
        None => {
            print!("{}", sequencer);
        }
    }

    Ok(())
}

#[cfg(feature = "midi")]
fn write_midi(sequencer: &TickSequencer, output: &str, verbose: bool) -> Result<()> {
    let bytes = canto::midi::sequence_to_midi(sequencer)?;
    std::fs::write(output, &bytes)
        .with_context(|| format!("Failed to write MIDI file: {}", output))?;
    if verbose {
        println!("Wrote {} bytes to {}", bytes.len(), output);
    }
    Ok(())
}

#[cfg(not(feature = "midi"))]
fn write_midi(_sequencer: &TickSequencer, _output: &str, _verbose: bool) -> Result<()> {
    anyhow::bail!("MIDI output requires the 'midi' feature")
}
