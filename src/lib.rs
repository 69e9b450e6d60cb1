//! Trackwav - audio track extraction into WAV and Wave64 segments.
//!
//! This crate reads the audio stream of a recording container and writes it
//! as a series of PCM segment files, together with a JSON summary of the
//! stream's timing.

#![warn(missing_docs)]

pub mod audio;
pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod extract;
pub mod progress;
pub mod source;
pub mod summary;

use clap::Parser;
use cli::{Cli, Command, ConfigAction, ExtractArgs};
use config::{
    Config, ExtractConfig, config_file_path, load_default_config, save_default_config,
    validate_max_segment_size,
};
use extract::{ExtractOptions, extract_audio_track};
use source::ContainerSource;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use summary::{summary_path, write_summary};
use tracing::{info, warn};

pub use audio::WavVariant;
pub use error::{Error, Result};

/// Raised by the Ctrl+C handler; the extraction stops after the current
/// record and finalizes the open segment.
static STOP: AtomicBool = AtomicBool::new(false);

/// Main entry point for trackwav CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.extract.verbose, cli.extract.quiet);

    // Handle subcommands
    if let Some(command) = cli.command {
        return handle_command(command);
    }

    // Load configuration
    let config = load_default_config()?;

    let Some(input) = cli.input else {
        return Err(Error::Internal {
            message: "no input file given".to_string(),
        });
    };

    // A second Ctrl+C exits immediately
    if let Err(e) = ctrlc::set_handler(|| {
        if STOP.swap(true, Ordering::SeqCst) {
            std::process::exit(130); // 128 + SIGINT(2)
        }
    }) {
        warn!("Failed to install Ctrl+C handler: {e}");
    }

    extract_file(&input, &cli.extract, &config)
}

/// Merge command-line flags over the configured defaults.
///
/// # Errors
///
/// Returns an error if the resulting segment size cap is too small to hold
/// a header and audio.
pub fn resolve_options(args: &ExtractArgs, config: &ExtractConfig) -> Result<ExtractOptions> {
    let max_segment_size = args.max_segment_size.or(config.max_segment_size);
    if let Some(cap) = max_segment_size {
        validate_max_segment_size(cap)?;
    }

    Ok(ExtractOptions {
        variant: if args.wav64 || config.wav64 {
            WavVariant::Wav64
        } else {
            WavVariant::Wav
        },
        jitter_threshold: args.jitter_threshold.unwrap_or(config.jitter_threshold),
        max_segment_size,
        show_progress: !args.quiet && !args.no_progress,
    })
}

/// Output path used when none is given: the input path without extension.
#[must_use]
pub fn default_output(input: &Path) -> PathBuf {
    input.with_extension("")
}

/// Extract one input file and write its summary.
fn extract_file(input: &Path, args: &ExtractArgs, config: &Config) -> Result<()> {
    let start = Instant::now();
    let options = resolve_options(args, &config.extract)?;
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_output(input));

    let mut source = ContainerSource::open(input)?;
    let report = extract_audio_track(&mut source, &output, &options, &STOP)?;

    if !args.no_summary && config.extract.write_summary {
        let path = summary_path(&report.output);
        write_summary(&path, &report)?;
        info!("Summary written to {}", path.display());
    }

    if !report.is_success() {
        return Err(Error::ExtractionFailed {
            status: report.status,
        });
    }

    info!(
        "Extracted {:.1}s of audio into {} file(s) in {:.1}s",
        report.total_audio_duration.unwrap_or_default(),
        report.output_file_count,
        start.elapsed().as_secs_f64()
    );
    Ok(())
}

fn init_logging(verbose: u8, quiet: bool) {
    use tracing_subscriber::{EnvFilter, fmt};

    // Symphonia logs every probe attempt at info, keep it quiet unless asked.
    let filter_str = if quiet {
        "warn"
    } else {
        match verbose {
            0 => "info,symphonia=warn",
            1 => "debug,symphonia=info",
            _ => "trace",
        }
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter_str));

    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn handle_command(command: Command) -> Result<()> {
    match command {
        Command::Config { action } => handle_config_command(action),
    }
}

#[allow(clippy::print_stdout)]
fn handle_config_command(action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Init => {
            let path = config_file_path()?;
            if path.exists() {
                println!("Configuration file already exists: {}", path.display());
            } else {
                let saved_path = save_default_config(&Config::default())?;
                println!("Created configuration file: {}", saved_path.display());
            }
            Ok(())
        }
        ConfigAction::Show => {
            let config = load_default_config()?;
            let text = toml::to_string_pretty(&config)
                .map_err(|e| Error::ConfigSerialize { source: e })?;
            print!("{text}");
            Ok(())
        }
        ConfigAction::Path => {
            let path = config_file_path()?;
            println!("{}", path.display());
            Ok(())
        }
    }
}
