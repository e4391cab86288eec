//! Output formatting.

use crate::cli::OutputFormat;
use camino::Utf8Path;
use range_map::{MappedRange, TextSize};
use serde::Serialize;

/// Summary of a written file, for JSON output.
#[derive(Debug, Serialize)]
struct WrittenFile<'a> {
    path: &'a str,
    ranges: usize,
}

/// Formats command results for output.
pub struct Formatter {
    format: OutputFormat,
}

impl Formatter {
    /// Creates a new formatter.
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats a list of mapped ranges.
    pub fn format_ranges(&self, ranges: &[MappedRange]) -> String {
        match self.format {
            OutputFormat::Human => {
                let mut output = format!("ranges: {}\n", ranges.len());
                for range in ranges {
                    output.push_str(&format!(
                        "src {}..{} -> dst {}..{}\n",
                        u32::from(range.src()),
                        u32::from(range.src_end()),
                        u32::from(range.dst()),
                        u32::from(range.dst_end()),
                    ));
                }
                output
            }
            OutputFormat::Json => to_json(&ranges),
        }
    }

    /// Formats translated offsets.
    pub fn format_offsets(&self, offsets: &[TextSize]) -> String {
        match self.format {
            OutputFormat::Human if offsets.is_empty() => "unmapped\n".to_string(),
            OutputFormat::Human => offsets
                .iter()
                .map(|offset| format!("{}\n", u32::from(*offset)))
                .collect(),
            OutputFormat::Json => {
                let offsets: Vec<u32> = offsets.iter().copied().map(u32::from).collect();
                to_json(&offsets)
            }
        }
    }

    /// Formats the summary of an encoded map written to `path`.
    pub fn format_written(&self, path: &Utf8Path, ranges: usize) -> String {
        match self.format {
            OutputFormat::Human => format!("wrote {} ranges to {}\n", ranges, path),
            OutputFormat::Json => to_json(&WrittenFile {
                path: path.as_str(),
                ranges,
            }),
        }
    }
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> String {
    // Plain data with string keys always serializes.
    let mut json = serde_json::to_string_pretty(value).unwrap_or_default();
    json.push('\n');
    json
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn range(src: u32, dst: u32, len: u32) -> MappedRange {
        MappedRange::new(src, dst, len).unwrap()
    }

    #[test]
    fn test_human_ranges() {
        let formatter = Formatter::new(OutputFormat::Human);
        let output = formatter.format_ranges(&[range(0, 10, 5), range(7, 20, 1)]);
        assert_eq!(
            output,
            "ranges: 2\nsrc 0..5 -> dst 10..15\nsrc 7..8 -> dst 20..21\n"
        );
    }

    #[test]
    fn test_human_offsets() {
        let formatter = Formatter::new(OutputFormat::Human);
        assert_eq!(formatter.format_offsets(&[]), "unmapped\n");
        assert_eq!(
            formatter.format_offsets(&[TextSize::from(3), TextSize::from(9)]),
            "3\n9\n"
        );
    }

    #[test]
    fn test_json_offsets() {
        let formatter = Formatter::new(OutputFormat::Json);
        assert_eq!(formatter.format_offsets(&[]), "[]\n");
        assert_eq!(formatter.format_offsets(&[TextSize::from(4)]), "[\n  4\n]\n");
    }

    #[test]
    fn test_json_written() {
        let formatter = Formatter::new(OutputFormat::Json);
        let output = formatter.format_written(Utf8Path::new("out.bin"), 2);
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["path"], "out.bin");
        assert_eq!(value["ranges"], 2);
    }
}
