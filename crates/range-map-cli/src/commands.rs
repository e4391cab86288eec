//! Subcommand execution.

use crate::cli::{Args, Command, Direction};
use crate::output::Formatter;
use camino::{Utf8Path, Utf8PathBuf};
use range_map::{DecodeError, MappedRange, RangeMap, RangeMapError, TextRange, TextSize};
use std::fs;
use thiserror::Error;

/// Command errors.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Failed to read an input file.
    #[error("failed to read {path}")]
    Read {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write an output file.
    #[error("failed to write {path}")]
    Write {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An input file is not an encoded range map.
    #[error("{path} is not a valid range map")]
    Decode {
        path: Utf8PathBuf,
        #[source]
        source: DecodeError,
    },

    /// A JSON input is not a list of valid ranges.
    #[error("{path} is not a valid JSON range list")]
    Json {
        path: Utf8PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The query range is reversed.
    #[error("invalid range: start {start} is after end {end}")]
    InvalidQuery { start: u32, end: u32 },

    /// The map holds overlapping ranges.
    #[error(transparent)]
    Lookup(#[from] RangeMapError),
}

/// Runs the selected subcommand and returns what should be printed.
pub fn run(args: &Args) -> Result<String, CommandError> {
    let formatter = Formatter::new(args.output);

    match &args.command {
        Command::Decode { file } => {
            let map = load(file)?;
            Ok(formatter.format_ranges(map.ranges()))
        }
        Command::Encode {
            file,
            out,
            no_merge,
        } => {
            let ranges = load_json(file)?;
            let map = if *no_merge {
                RangeMap::from_vec_unmerged(ranges)
            } else {
                RangeMap::from_ranges(ranges)
            };
            store(out, &map)?;
            Ok(formatter.format_written(out, map.len()))
        }
        Command::Map {
            file,
            offset,
            to,
            strict,
            stick_to_left,
        } => {
            let map = load(file)?;
            let offset = TextSize::from(*offset);
            let offsets: Vec<TextSize> = match to {
                Direction::Source => {
                    let mapped = if *strict {
                        map.checked_map_offset_to_source_with(offset, false)?
                    } else if *stick_to_left {
                        map.checked_map_offset_to_source_with(offset, true)?
                    } else {
                        map.checked_map_offset_to_source(offset)?
                    };
                    mapped.into_iter().collect()
                }
                Direction::Destination => map.map_offset_to_destination(offset),
            };
            Ok(formatter.format_offsets(&offsets))
        }
        Command::MapRange { file, start, end } => {
            if start > end {
                return Err(CommandError::InvalidQuery {
                    start: *start,
                    end: *end,
                });
            }
            let map = load(file)?;
            let query = TextRange::new(TextSize::from(*start), TextSize::from(*end));
            Ok(formatter.format_ranges(&map.map_range_to_source(query)))
        }
        Command::Compose { first, second, out } => {
            let first_map = load(first)?;
            let second_map = load(second)?;
            let composed = first_map.compose(&second_map);
            store(out, &composed)?;
            Ok(formatter.format_written(out, composed.len()))
        }
    }
}

fn load(path: &Utf8Path) -> Result<RangeMap, CommandError> {
    let bytes = fs::read(path).map_err(|source| CommandError::Read {
        path: path.to_owned(),
        source,
    })?;
    tracing::debug!(%path, bytes = bytes.len(), "loading range map");
    RangeMap::from_bytes(&bytes).map_err(|source| CommandError::Decode {
        path: path.to_owned(),
        source,
    })
}

fn load_json(path: &Utf8Path) -> Result<Vec<MappedRange>, CommandError> {
    let content = fs::read_to_string(path).map_err(|source| CommandError::Read {
        path: path.to_owned(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| CommandError::Json {
        path: path.to_owned(),
        source,
    })
}

fn store(path: &Utf8Path, map: &RangeMap) -> Result<(), CommandError> {
    tracing::debug!(%path, ranges = map.len(), "writing range map");
    fs::write(path, map.to_bytes()).map_err(|source| CommandError::Write {
        path: path.to_owned(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::OutputFormat;
    use pretty_assertions::assert_eq;

    fn args(command: Command) -> Args {
        Args {
            output: OutputFormat::Human,
            verbose: false,
            command,
        }
    }

    fn write_map(dir: &Utf8Path, name: &str, map: &RangeMap) -> Utf8PathBuf {
        let path = dir.join(name);
        fs::write(&path, map.to_bytes()).unwrap();
        path
    }

    fn range(src: u32, dst: u32, len: u32) -> MappedRange {
        MappedRange::new(src, dst, len).unwrap()
    }

    fn temp_dir() -> (tempfile::TempDir, Utf8PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = Utf8PathBuf::try_from(dir.path().to_path_buf()).unwrap();
        (dir, path)
    }

    #[test]
    fn test_map_reports_ambiguous_offsets() {
        let (_guard, dir) = temp_dir();
        let overlapping = RangeMap::from_vec_unmerged(vec![range(0, 0, 5), range(10, 2, 5)]);
        let file = write_map(&dir, "overlap.bin", &overlapping);

        let result = run(&args(Command::Map {
            file,
            offset: 3,
            to: Direction::Source,
            strict: false,
            stick_to_left: false,
        }));
        assert!(matches!(
            result,
            Err(CommandError::Lookup(RangeMapError::AmbiguousOffset { matches: 2, .. }))
        ));
    }

    #[test]
    fn test_map_range_rejects_reversed_query() {
        let (_guard, dir) = temp_dir();
        let file = write_map(&dir, "map.bin", &RangeMap::EMPTY);
        let result = run(&args(Command::MapRange {
            file,
            start: 5,
            end: 2,
        }));
        assert!(matches!(
            result,
            Err(CommandError::InvalidQuery { start: 5, end: 2 })
        ));
    }

    #[test]
    fn test_decode_reports_bad_file() {
        let (_guard, dir) = temp_dir();
        let file = dir.join("bad.bin");
        fs::write(&file, [0u8, 0, 0, 1, 1]).unwrap();
        let result = run(&args(Command::Decode { file }));
        assert!(matches!(
            result,
            Err(CommandError::Decode {
                source: DecodeError::Truncated,
                ..
            })
        ));
    }

    #[test]
    fn test_encode_merges_unless_asked_not_to() {
        let (_guard, dir) = temp_dir();
        let json = dir.join("ranges.json");
        fs::write(
            &json,
            r#"[{"src":0,"dst":0,"len":3},{"src":3,"dst":3,"len":2}]"#,
        )
        .unwrap();

        let merged = dir.join("merged.bin");
        run(&args(Command::Encode {
            file: json.clone(),
            out: merged.clone(),
            no_merge: false,
        }))
        .unwrap();
        assert_eq!(load(&merged).unwrap().ranges(), &[range(0, 0, 5)]);

        let unmerged = dir.join("unmerged.bin");
        let output = run(&args(Command::Encode {
            file: json,
            out: unmerged.clone(),
            no_merge: true,
        }))
        .unwrap();
        assert_eq!(load(&unmerged).unwrap().len(), 2);
        assert_eq!(output, format!("wrote 2 ranges to {}\n", unmerged));
    }
}
