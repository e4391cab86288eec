//! CLI argument parsing.

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand, ValueEnum};

/// Inspect, translate and compose persisted macro expansion range maps.
#[derive(Debug, Parser)]
#[command(name = "range-map")]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Output format
    #[arg(long, value_enum, default_value = "human", global = true)]
    pub output: OutputFormat,

    /// Print debug logs to stderr
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the ranges stored in an encoded range map
    Decode {
        /// Encoded range map
        file: Utf8PathBuf,
    },

    /// Encode a JSON list of `{"src", "dst", "len"}` ranges
    Encode {
        /// JSON input
        file: Utf8PathBuf,

        /// Where to write the encoded map
        #[arg(long, short)]
        out: Utf8PathBuf,

        /// Keep touching ranges as separate entries
        #[arg(long = "no-merge")]
        no_merge: bool,
    },

    /// Translate a single offset
    Map {
        /// Encoded range map
        file: Utf8PathBuf,

        /// Offset to translate
        #[arg(long)]
        offset: u32,

        /// Space to translate into
        #[arg(long, value_enum, default_value = "source")]
        to: Direction,

        /// Only match offsets strictly inside a range
        #[arg(long, conflicts_with = "stick_to_left")]
        strict: bool,

        /// Only match, allowing the offset to sit on a range's end
        #[arg(long = "stick-to-left")]
        stick_to_left: bool,
    },

    /// Translate an expansion range back to the call body
    MapRange {
        /// Encoded range map
        file: Utf8PathBuf,

        /// Range start (inclusive)
        #[arg(long)]
        start: u32,

        /// Range end (exclusive)
        #[arg(long)]
        end: u32,
    },

    /// Compose two stages: FIRST maps A to B, SECOND maps B to C
    Compose {
        /// Encoded range map of the earlier stage
        first: Utf8PathBuf,

        /// Encoded range map of the later stage
        second: Utf8PathBuf,

        /// Where to write the composed map
        #[arg(long, short)]
        out: Utf8PathBuf,
    },
}

/// Output format options.
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    #[default]
    Human,
    /// JSON output
    Json,
}

/// Which coordinate space an offset is translated into.
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum Direction {
    /// From the expansion back to the macro call body (default)
    #[default]
    Source,
    /// From the macro call body into the expansion
    Destination,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_args_are_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_strict_conflicts_with_stick_to_left() {
        let result = Args::try_parse_from([
            "range-map",
            "map",
            "a.bin",
            "--offset",
            "3",
            "--strict",
            "--stick-to-left",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_global_output_after_subcommand() {
        let args = Args::try_parse_from(["range-map", "decode", "a.bin", "--output", "json"])
            .unwrap();
        assert_eq!(args.output, OutputFormat::Json);
        assert!(matches!(args.command, Command::Decode { .. }));
    }
}
