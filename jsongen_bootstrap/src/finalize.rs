//! Moves the captured generator output onto the output path.

use thiserror::Error;
use tracing::debug;

use crate::config::GeneratorConfig;
use crate::error::BootstrapError;
use crate::fs_helpers::OutputDir;

/// Generated source that could not be parsed.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct FormatError {
    message: String,
}

impl FormatError {
    /// Creates a formatting error with the given diagnostic.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<syn::Error> for FormatError {
    fn from(err: syn::Error) -> Self {
        Self::new(err.to_string())
    }
}

/// Rewrites Rust source into its canonical textual form.
pub trait SourceFormatter {
    /// Formats `source`.
    ///
    /// # Errors
    ///
    /// Returns a [`FormatError`] when `source` is not valid Rust.
    fn format(&self, source: &str) -> Result<String, FormatError>;
}

/// Formatter backed by `syn` and `prettyplease`.
///
/// `syn` discards ordinary comments, so they are carried over verbatim. The
/// leading block of comments and inner attributes (the generated-file banner
/// and any `#![cfg(..)]` header) is kept as written, and runs of `//` lines
/// starting in the first column split the rest into separately formatted
/// chunks. Comments that sit inside an item are lost. Formatting output that
/// is already canonical returns it unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct PrettyFormatter;

impl SourceFormatter for PrettyFormatter {
    fn format(&self, source: &str) -> Result<String, FormatError> {
        let (header, body) = split_header(source);
        let mut formatted = String::from(header);
        let mut pending = String::new();
        for segment in segments(body) {
            match segment {
                Segment::Code(code) => pending.push_str(&code),
                Segment::Comments(comments) if pending.is_empty() => formatted.push_str(&comments),
                Segment::Comments(comments) => match syn::parse_file(&pending) {
                    Ok(file) => {
                        formatted.push_str(&prettyplease::unparse(&file));
                        formatted.push_str(&comments);
                        pending.clear();
                    }
                    // The comments split an item; format them together with it.
                    Err(_) => pending.push_str(&comments),
                },
            }
        }
        if !pending.is_empty() {
            formatted.push_str(&prettyplease::unparse(&syn::parse_file(&pending)?));
        }
        Ok(formatted)
    }
}

fn is_plain_comment(line: &str) -> bool {
    line.starts_with("//") && !line.starts_with("///") && !line.starts_with("//!")
}

fn is_inner_attribute(line: &str) -> bool {
    line.starts_with("#![") && line.trim_end().ends_with(']')
}

/// Splits off leading blank lines, plain line comments and single-line inner
/// attributes.
///
/// Doc comments (`///`, `//!`) stay in the body since `syn` keeps them.
fn split_header(source: &str) -> (&str, &str) {
    let mut end = 0;
    for line in source.split_inclusive('\n') {
        let trimmed = line.trim_start();
        if !(trimmed.is_empty() || is_plain_comment(trimmed) || is_inner_attribute(trimmed)) {
            break;
        }
        end += line.len();
    }
    source.split_at(end)
}

#[derive(Debug, PartialEq, Eq)]
enum Segment {
    Code(String),
    /// Plain comment lines starting in the first column, with the blank lines
    /// around them.
    Comments(String),
}

fn segments(body: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut code = String::new();
    let mut gap = String::new();
    let mut gap_has_comment = false;

    for line in body.split_inclusive('\n') {
        if line.trim().is_empty() || is_plain_comment(line) {
            gap_has_comment |= !line.trim().is_empty();
            gap.push_str(line);
            continue;
        }
        close_gap(&mut segments, &mut code, &mut gap, gap_has_comment);
        gap_has_comment = false;
        code.push_str(line);
    }
    close_gap(&mut segments, &mut code, &mut gap, gap_has_comment);
    if !code.is_empty() {
        segments.push(Segment::Code(code));
    }
    segments
}

/// Ends a run of blank and comment lines. A run without comments stays part
/// of the surrounding code.
fn close_gap(
    segments: &mut Vec<Segment>,
    code: &mut String,
    gap: &mut String,
    has_comment: bool,
) {
    if has_comment {
        if !code.is_empty() {
            segments.push(Segment::Code(std::mem::take(code)));
        }
        segments.push(Segment::Comments(std::mem::take(gap)));
    } else {
        code.push_str(gap);
        gap.clear();
    }
}

/// Replaces the output file with the captured output.
///
/// With formatting disabled the captured file is renamed into place.
/// Otherwise it is formatted first and the result written to the output
/// path; a formatting error leaves the output file untouched.
pub(crate) fn finalize_output<F>(
    config: &GeneratorConfig,
    dir: &OutputDir,
    captured: &str,
    formatter: &F,
) -> Result<(), BootstrapError>
where
    F: SourceFormatter + ?Sized,
{
    let output = config.output_file_name()?;
    if config.mode.no_format {
        debug!(from = %dir.join(captured), to = %config.output_path, "moving unformatted output");
        return dir.rename(captured, output);
    }

    let raw = dir.read_to_string(captured)?;
    let formatted = formatter
        .format(&raw)
        .map_err(|source| BootstrapError::Format {
            path: config.output_path.clone(),
            source,
        })?;
    debug!(path = %config.output_path, "writing formatted output");
    dir.write(output, formatted.as_bytes())
}

#[cfg(test)]
mod tests {
    //! Unit tests for output formatting.

    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::none("fn a() {}\n", "", "fn a() {}\n")]
    #[case::banner("// generated\n\nfn a() {}\n", "// generated\n\n", "fn a() {}\n")]
    #[case::doc_comment("//! crate docs\nfn a() {}\n", "", "//! crate docs\nfn a() {}\n")]
    #[case::only_comments("// a\n// b\n", "// a\n// b\n", "")]
    #[case::inner_attribute(
        "#![cfg(feature = \"fast\")]\n\n// generated\nfn a() {}\n",
        "#![cfg(feature = \"fast\")]\n\n// generated\n",
        "fn a() {}\n"
    )]
    fn splits_leading_header(#[case] source: &str, #[case] header: &str, #[case] body: &str) {
        assert_eq!(split_header(source), (header, body));
    }

    #[test]
    fn segments_body_at_column_zero_comments() {
        let body = "fn a() {}\n\n// between\n\nfn b() {\n    // nested\n}\n// trailing\n";
        assert_eq!(
            segments(body),
            [
                Segment::Code("fn a() {}\n".to_owned()),
                Segment::Comments("\n// between\n\n".to_owned()),
                Segment::Code("fn b() {\n    // nested\n}\n".to_owned()),
                Segment::Comments("// trailing\n".to_owned()),
            ]
        );
    }

    #[test]
    fn keeps_comments_between_items() {
        let formatted = PrettyFormatter
            .format(
                "// Code generated by jsongen. DO NOT EDIT.\n\nfn a() {}\n\n\
                 // suppress unused import warning\nfn   b()->u32{2}\n",
            )
            .expect("format source");
        assert_eq!(
            formatted,
            "// Code generated by jsongen. DO NOT EDIT.\n\nfn a() {}\n\n\
             // suppress unused import warning\nfn b() -> u32 {\n    2\n}\n"
        );
    }

    #[test]
    fn keeps_banner_after_inner_attributes() {
        let formatted = PrettyFormatter
            .format(
                "#![cfg(any(feature = \"fast\"))]\n\n\
                 // Code generated by jsongen. DO NOT EDIT.\n\nfn   a()->u32{1}",
            )
            .expect("format source");
        assert_eq!(
            formatted,
            "#![cfg(any(feature = \"fast\"))]\n\n\
             // Code generated by jsongen. DO NOT EDIT.\n\nfn a() -> u32 {\n    1\n}\n"
        );
    }

    #[test]
    fn comments_inside_items_do_not_split_them() {
        let formatted = PrettyFormatter
            .format("fn a() -> u32 {\n// inner\n    1\n}\n")
            .expect("format source");
        assert_eq!(formatted, "fn a() -> u32 {\n    1\n}\n");
    }

    #[test]
    fn formats_source_and_keeps_banner() {
        let formatted = PrettyFormatter
            .format("// Code generated by jsongen. DO NOT EDIT.\n\nfn   answer()->u32{42}")
            .expect("format source");
        assert_eq!(
            formatted,
            "// Code generated by jsongen. DO NOT EDIT.\n\nfn answer() -> u32 {\n    42\n}\n"
        );
    }

    #[test]
    fn formatting_is_idempotent() {
        let once = PrettyFormatter
            .format(
                "// banner\nimpl super::Order { pub fn id(&self)->u64{ self.id } }\n\n\
                 // second\nfn f(){}",
            )
            .expect("format source");
        let twice = PrettyFormatter.format(&once).expect("format again");
        assert_eq!(once, twice);
    }

    #[test]
    fn rejects_invalid_source() {
        let err = PrettyFormatter
            .format("fn broken( {")
            .expect_err("invalid source");
        assert!(!err.to_string().is_empty());
    }
}
