use std::path::PathBuf;
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::Parser;
use serde::Serialize;
use tracing::{info, warn, Level};

use degree_drill::audio::{CpalTonePlayer, TonePlayer};
use degree_drill::config::{RawConfig, TokenList};
use degree_drill::playback::SystemClock;
use degree_drill::speech::{CommandSpeaker, Speaker};
use degree_drill::{dry_run, practice_rng, PracticeConfig, PracticeError, PracticeReport, Scheduler};

/// Speaks random scale degrees, plays their tones in each key, and names the notes
#[derive(Parser, Debug)]
#[command(name = "degree-drill")]
#[command(version)]
#[command(allow_negative_numbers = true)]
struct Cli {
    /// Comma-separated scale degrees (e.g. "1,flat 3,5,b7,#4")
    elements_string: Option<String>,

    /// Comma-separated keys, practiced in order (e.g. "C,Db,F#m")
    #[arg(long = "key", visible_alias = "root_notes")]
    key: Option<String>,

    /// Times each unique degree is played per key before switching (min 1) [default: 1]
    #[arg(long = "plays_per_key", visible_alias = "plays_per_root")]
    plays_per_key: Option<i64>,

    /// Approximate seconds per degree cycle [default: 3.0]
    #[arg(long)]
    delay: Option<f64>,

    /// Octave of the key's root (4 puts C at middle C) [default: 4]
    #[arg(long)]
    octave: Option<i32>,

    /// Seconds between the tone and its spoken note name [default: 1.0]
    #[arg(long = "tone_name_delay")]
    tone_name_delay: Option<f64>,

    /// Start over at the first key after the last one, until interrupted
    #[arg(long = "loop")]
    repeat_keys: bool,

    /// Seed for reproducible degree order
    #[arg(long)]
    seed: Option<u64>,

    /// YAML settings file; command-line flags override it
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Speech program and arguments (default: first of espeak-ng, espeak, say)
    #[arg(long = "speech-command", value_name = "COMMAND")]
    speech_command: Option<String>,

    /// Print what would be played and spoken, without sound or waiting
    #[arg(long = "dry-run")]
    dry_run: bool,

    /// Debug logging
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Warnings only
    #[arg(short, long)]
    quiet: bool,
}

impl Cli {
    fn overrides(&self) -> RawConfig {
        RawConfig {
            elements: self.elements_string.clone().map(TokenList::Csv),
            keys: self.key.clone().map(TokenList::Csv),
            plays_per_key: self.plays_per_key,
            delay: self.delay,
            octave: self.octave,
            tone_name_delay: self.tone_name_delay,
            repeat_keys: self.repeat_keys.then_some(true),
            seed: self.seed,
            ..Default::default()
        }
    }

    fn settings(&self) -> Result<PracticeConfig, PracticeError> {
        let mut config = match &self.config {
            Some(path) => PracticeConfig::load(path)?,
            None => PracticeConfig::default(),
        };
        config.apply(self.overrides());
        Ok(config)
    }
}

#[derive(Serialize)]
struct DryRunOutput<'a> {
    transcript: &'a [String],
    #[serde(flatten)]
    report: &'a PracticeReport,
}

fn init_tracing(cli: &Cli) {
    let level = if cli.verbose {
        Level::DEBUG
    } else if cli.quiet {
        Level::WARN
    } else {
        Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn print_dry_run(config: &PracticeConfig) -> Result<(), PracticeError> {
    let (report, transcript) = dry_run(config)?;
    let output = DryRunOutput {
        transcript: &transcript,
        report: &report,
    };
    let yaml = serde_yaml::to_string(&output)
        .map_err(|e| PracticeError::ConfigError(format!("Cannot render report: {}", e)))?;
    print!("{}", yaml);
    Ok(())
}

fn practice(cli: &Cli, config: &PracticeConfig) -> Result<(), PracticeError> {
    // Every degree and key is validated before any engine starts
    let mut scheduler = Scheduler::from_config(config, practice_rng(config))?;

    let degrees: Vec<String> = scheduler.degrees().iter().map(|d| d.to_string()).collect();
    let keys: Vec<&str> = scheduler.keys().iter().map(|k| k.name.as_str()).collect();
    info!("Unique scale degrees: {}", degrees.join(", "));
    info!("Key sequence: {}", keys.join(", "));
    info!(
        "Plays per degree per key: {}, octave: {}, cycle delay: {}s, tone: {}s, note name delay: {}s",
        config.plays_per_key, config.octave, config.delay, config.tone_duration, config.tone_name_delay
    );

    let mut speaker = CommandSpeaker::detect(cli.speech_command.as_deref())?;
    info!("Speech program: {}", speaker.program().display());
    let mut player = CpalTonePlayer::open()?;

    let stop = Arc::new(AtomicBool::new(false));
    let handler_stop = Arc::clone(&stop);
    if let Err(e) = ctrlc::set_handler(move || handler_stop.store(true, Ordering::SeqCst)) {
        warn!("Could not install interrupt handler: {}", e);
    }

    info!("Starting practice. Press Ctrl+C to stop.");
    let result = scheduler.run(&mut speaker, &mut player, &mut SystemClock, &stop);
    player.shutdown();
    speaker.shutdown();

    let report = match result {
        // The interrupt also reaches a running speech program
        Err(PracticeError::PlaybackError { .. }) if stop.load(Ordering::SeqCst) => {
            info!("Practice stopped by user");
            return Ok(());
        }
        other => other?,
    };
    info!(
        "Exiting: {} tones played, {} key sessions completed",
        report.tones.len(),
        report.sessions_completed
    );
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_tracing(&cli);

    let config = match cli.settings() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    let result = if cli.dry_run {
        print_dry_run(&config)
    } else {
        practice(&cli, &config)
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
