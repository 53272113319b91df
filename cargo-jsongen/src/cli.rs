//! Command-line interface definitions for `cargo-jsongen`.

use std::ffi::OsString;

use camino::Utf8PathBuf;
use clap::{Args as ClapArgs, Parser};

const SUBCOMMAND: &str = "jsongen";

/// Parsed CLI arguments for `cargo-jsongen`.
#[derive(Debug, Parser)]
#[command(name = "cargo-jsongen", bin_name = "cargo jsongen")]
#[command(about = "Bootstrap jsongen serialization code for the types of a module")]
#[command(version)]
#[expect(
    clippy::struct_excessive_bools,
    reason = "each switch is an independent command-line flag"
)]
pub struct Args {
    /// Types that need serialization support.
    #[arg(value_name = "TYPE")]
    pub types: Vec<String>,
    /// File receiving the generated code.
    #[arg(long, short, value_name = "path")]
    pub output: Utf8PathBuf,
    /// Cargo package declaring the module.
    #[arg(long, short)]
    pub package: Option<String>,
    /// Path to the `Cargo.toml` used for metadata discovery.
    #[arg(long, value_name = "path")]
    pub manifest_path: Option<Utf8PathBuf>,
    /// Module holding the types (for example, `crate::model`).
    #[arg(long, value_name = "path")]
    pub module: Option<String>,
    /// Settings file used instead of `jsongen.toml` in the package root; it
    /// must exist.
    #[arg(long, value_name = "path")]
    pub config: Option<Utf8PathBuf>,
    /// Generator options.
    #[command(flatten)]
    pub features: FeatureArgs,
    /// Conditional-compilation tags guarding the generated file.
    #[arg(long, value_name = "tags")]
    pub build_tags: Option<String>,
    /// Extra arguments for the compile-and-run step.
    #[arg(long, value_name = "flags", allow_hyphen_values = true)]
    pub gen_build_flags: Option<String>,
    /// Only write the stub file.
    #[arg(long = "stubs")]
    pub is_stubs_only: bool,
    /// Keep the launcher and captured output.
    #[arg(long = "leave-temps")]
    pub should_leave_temps: bool,
    /// Move the generator output into place without formatting it.
    #[arg(long = "noformat")]
    pub should_skip_format: bool,
    /// Log each bootstrap stage.
    #[arg(long, short)]
    pub verbose: bool,
}

/// Generator option flags, each enabling one generator setter.
#[derive(Debug, ClapArgs, Clone, Copy, Default)]
#[expect(
    clippy::struct_excessive_bools,
    reason = "each flag maps to an independent generator setter"
)]
pub struct FeatureArgs {
    /// Use `snake_case` names for fields.
    #[arg(long)]
    pub snake_case: bool,
    /// Use `lowerCamelCase` names for fields.
    #[arg(long)]
    pub lower_camel_case: bool,
    /// Omit empty fields by default.
    #[arg(long)]
    pub omit_empty: bool,
    /// Do not generate the serde trait impls.
    #[arg(long)]
    pub no_std_marshalers: bool,
    /// Reject unknown fields when decoding.
    #[arg(long)]
    pub disallow_unknown_fields: bool,
    /// Encode byte slices as plain arrays instead of base64.
    #[arg(long)]
    pub simple_bytes: bool,
    /// Match member names without unescaping them first.
    #[arg(long)]
    pub disable_members_unescape: bool,
}

/// Drops the `jsongen` argument cargo inserts when running a subcommand.
#[must_use]
pub fn strip_subcommand<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    let mut iter = args.into_iter();
    let mut stripped: Vec<OsString> = iter.next().into_iter().collect();
    let mut rest = iter.peekable();
    if rest.peek().is_some_and(|arg| arg == SUBCOMMAND) {
        rest.next();
    }
    stripped.extend(rest);
    stripped
}
