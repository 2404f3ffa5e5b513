//! klattspeak CLI — turn IPA phoneme text into timed formant frames.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;

use klattspeak_core::table::PhonemeTable;
use klattspeak_core::{generate_frames_and_timing, AcousticFrame};

// ─── Top-level CLI ───────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "klattspeak",
    about = "IPA-to-formant-frame pipeline for Klatt-style speech synthesis",
    version,
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the full pipeline over a phoneme string and print its frames
    Speak(SpeakArgs),
    /// Inspect the phoneme table
    Table(TableArgs),
}

// ─── Shared arguments ─────────────────────────────────────────────

#[derive(Parser, Debug)]
struct SharedArgs {
    /// Path to a phoneme table JSON asset; defaults to the embedded fixture
    #[arg(long)]
    table: Option<PathBuf>,

    /// Show verbose (debug-level) logging
    #[arg(short, long, default_value_t = false)]
    verbose: bool,

    /// Emit JSON instead of a human-readable table
    #[arg(long, default_value_t = false)]
    json: bool,
}

// ─── Speak ────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(about = "Synthesize a timed frame sequence from raw IPA text")]
struct SpeakArgs {
    #[command(flatten)]
    shared: SharedArgs,

    /// Raw IPA phoneme text, e.g. "hɛˈloʊ"
    text: String,

    /// BCP-47-ish language tag (e.g. en-us, hu, pl); defaults to English
    #[arg(long)]
    language: Option<String>,

    /// Speed multiplier
    #[arg(long, default_value_t = 1.0)]
    speed: f64,

    /// Base pitch, in Hz
    #[arg(long, default_value_t = 100.0)]
    base_pitch: f64,

    /// Inflection, 0..1 octave scaling
    #[arg(long, default_value_t = 0.5)]
    inflection: f64,

    /// Clause type: one of `.`, `,`, `?`, `!`; defaults to `.`
    #[arg(long)]
    clause: Option<char>,

    /// Include silence (pre-stop gap) records in the output
    #[arg(long, default_value_t = true)]
    include_silence: bool,

    /// Omit silence records from the output
    #[arg(long, overrides_with = "include_silence")]
    no_include_silence: bool,
}

#[derive(Serialize)]
struct FrameOutput {
    frame: Option<AcousticFrame>,
    duration_ms: f64,
    fade_ms: f64,
}

fn run_speak(args: SpeakArgs) -> Result<()> {
    let table = load_table(args.shared.table.as_deref())?;

    let frames = generate_frames_and_timing(
        &args.text,
        args.speed,
        args.base_pitch,
        args.inflection,
        args.clause,
        args.language.as_deref(),
        &table,
    );

    let include_silence = args.include_silence && !args.no_include_silence;
    let output: Vec<FrameOutput> = frames
        .into_iter()
        .filter(|(frame, _, _)| include_silence || frame.is_some())
        .map(|(frame, duration_ms, fade_ms)| FrameOutput {
            frame,
            duration_ms,
            fade_ms,
        })
        .collect();

    log::info!("{} frames emitted for {:?}", output.len(), args.text);

    if args.shared.json {
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        for (index, entry) in output.iter().enumerate() {
            match &entry.frame {
                None => println!(
                    "{index:>3}  silence        duration={:>7.2}ms fade={:>6.2}ms",
                    entry.duration_ms, entry.fade_ms
                ),
                Some(frame) => println!(
                    "{index:>3}  cf1={:>6.1} cf2={:>6.1} pitch={:>6.1}  duration={:>7.2}ms fade={:>6.2}ms",
                    frame.cf1, frame.cf2, frame.voice_pitch, entry.duration_ms, entry.fade_ms
                ),
            }
        }
    }

    Ok(())
}

// ─── Table ────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(about = "List phoneme table entries, optionally filtered by class")]
struct TableArgs {
    #[command(flatten)]
    shared: SharedArgs,

    /// List only vowels
    #[arg(long, default_value_t = false)]
    vowels: bool,
    /// List only voiced segments
    #[arg(long, default_value_t = false)]
    voiced: bool,
    /// List only stops
    #[arg(long, default_value_t = false)]
    stops: bool,
    /// List only affricates
    #[arg(long, default_value_t = false)]
    affricates: bool,
    /// List only liquids
    #[arg(long, default_value_t = false)]
    liquids: bool,
    /// List only nasals
    #[arg(long, default_value_t = false)]
    nasals: bool,
    /// List only semivowels
    #[arg(long, default_value_t = false)]
    semivowels: bool,
}

#[derive(Serialize)]
struct TableEntryOutput<'a> {
    symbol: &'a str,
    frame: AcousticFrame,
}

fn run_table(args: TableArgs) -> Result<()> {
    let table = load_table(args.shared.table.as_deref())?;

    let any_filter = args.vowels
        || args.voiced
        || args.stops
        || args.affricates
        || args.liquids
        || args.nasals
        || args.semivowels;

    let mut symbols: Vec<(&str, &klattspeak_core::table::PhonemeEntry)> = table
        .filter(|class| {
            !any_filter
                || (args.vowels && class.is_vowel)
                || (args.voiced && class.is_voiced)
                || (args.stops && class.is_stop)
                || (args.affricates && class.is_affricate)
                || (args.liquids && class.is_liquid)
                || (args.nasals && class.is_nasal)
                || (args.semivowels && class.is_semivowel)
        })
        .collect();
    symbols.sort_by_key(|(symbol, _)| *symbol);

    log::info!("{} of {} table entries matched", symbols.len(), table.len());

    if args.shared.json {
        let output: Vec<TableEntryOutput> = symbols
            .iter()
            .map(|(symbol, entry)| TableEntryOutput {
                symbol,
                frame: entry.frame,
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        for (symbol, entry) in &symbols {
            println!("{symbol:<6} cf1={:>6.1} cf2={:>6.1}", entry.frame.cf1, entry.frame.cf2);
        }
    }

    Ok(())
}

// ─── Helpers ──────────────────────────────────────────────────────

fn load_table(path: Option<&std::path::Path>) -> Result<&'static PhonemeTable> {
    match path {
        Some(path) => {
            let table = PhonemeTable::from_path(path)
                .with_context(|| format!("failed to load phoneme table from {}", path.display()))?;
            Ok(Box::leak(Box::new(table)))
        }
        None => Ok(PhonemeTable::embedded()),
    }
}

// ─── Main ─────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();

    let verbose = match &cli.command {
        Command::Speak(a) => a.shared.verbose,
        Command::Table(a) => a.shared.verbose,
    };
    let log_level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    let result = match cli.command {
        Command::Speak(args) => run_speak(args),
        Command::Table(args) => run_table(args),
    };

    if let Err(e) = result {
        log::error!("{:#}", e);
        std::process::exit(1);
    }
}
