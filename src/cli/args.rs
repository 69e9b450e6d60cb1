//! CLI argument definitions.

use super::validators::{parse_jitter_threshold, parse_size};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Extract the audio track of a recording into WAV or Wave64 segments.
#[derive(Debug, Parser)]
#[command(name = "trackwav")]
#[command(author, version, about, long_about = None)]
#[command(subcommand_negates_reqs = true)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Input container file.
    #[arg(required = true)]
    pub input: Option<PathBuf>,

    /// Extraction options.
    #[command(flatten)]
    pub extract: ExtractArgs,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage configuration.
    Config {
        /// Configuration action to perform.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommand actions.
#[derive(Debug, Clone, Copy, Subcommand)]
pub enum ConfigAction {
    /// Create default configuration file.
    Init,
    /// Display current configuration.
    Show,
    /// Print configuration file path.
    Path,
}

/// Arguments for an extraction run.
#[derive(Debug, Args)]
#[allow(clippy::struct_excessive_bools)]
pub struct ExtractArgs {
    /// Output path; segments are written to its folder (default: input
    /// path without extension).
    #[arg(short, long, env = "TRACKWAV_OUTPUT")]
    pub output: Option<PathBuf>,

    /// Write Sony Wave64 (.w64) segments instead of RIFF WAV.
    #[arg(long, env = "TRACKWAV_WAV64")]
    pub wav64: bool,

    /// Timing tolerance in seconds before blocks are flagged early or late.
    #[arg(long, value_parser = parse_jitter_threshold, env = "TRACKWAV_JITTER_THRESHOLD")]
    pub jitter_threshold: Option<f64>,

    /// Start a new segment before a file reaches this size (e.g. 512M, 2G).
    #[arg(long, value_parser = parse_size, env = "TRACKWAV_MAX_SEGMENT_SIZE")]
    pub max_segment_size: Option<u64>,

    /// Do not write the JSON summary.
    #[arg(long, env = "TRACKWAV_NO_SUMMARY")]
    pub no_summary: bool,

    /// Hide the progress spinner.
    #[arg(long)]
    pub no_progress: bool,

    /// Only log warnings and errors.
    #[arg(short, long)]
    pub quiet: bool,

    /// Increase verbosity (-v: debug, -vv: trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_simple() {
        let cli = Cli::try_parse_from(["trackwav", "recording.mkv"]);
        assert!(cli.is_ok());
        let cli = cli.unwrap();
        assert_eq!(cli.input, Some(PathBuf::from("recording.mkv")));
        assert!(cli.command.is_none());
        assert!(!cli.extract.wav64);
    }

    #[test]
    fn test_cli_parse_with_options() {
        let cli = Cli::try_parse_from([
            "trackwav",
            "recording.mkv",
            "-o",
            "out/track",
            "--wav64",
            "--jitter-threshold",
            "0.02",
            "--max-segment-size",
            "1G",
            "-q",
        ]);
        assert!(cli.is_ok());
        let cli = cli.unwrap();
        assert_eq!(cli.extract.output, Some(PathBuf::from("out/track")));
        assert!(cli.extract.wav64);
        assert_eq!(cli.extract.jitter_threshold, Some(0.02));
        assert_eq!(cli.extract.max_segment_size, Some(1 << 30));
        assert!(cli.extract.quiet);
    }

    #[test]
    fn test_cli_parse_verbosity() {
        let cli = Cli::try_parse_from(["trackwav", "in.wav", "-vv"]).unwrap();
        assert_eq!(cli.extract.verbose, 2);
    }

    #[test]
    fn test_cli_rejects_bad_threshold() {
        let cli = Cli::try_parse_from(["trackwav", "in.wav", "--jitter-threshold", "-1"]);
        assert!(cli.is_err());
    }

    #[test]
    fn test_cli_requires_input() {
        let cli = Cli::try_parse_from(["trackwav"]);
        assert!(cli.is_err());
    }

    #[test]
    fn test_cli_parse_config_subcommand() {
        let cli = Cli::try_parse_from(["trackwav", "config", "show"]);
        assert!(cli.is_ok());
        let cli = cli.unwrap();
        assert!(matches!(
            cli.command,
            Some(Command::Config {
                action: ConfigAction::Show
            })
        ));
    }
}
