//! Compile-and-run invocation of the launcher.

use std::process::{Command, Stdio};
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::cleanup::TempArtifacts;
use crate::config::GeneratorConfig;
use crate::error::BootstrapError;
use crate::fs_helpers::OutputDir;

#[expect(
    clippy::expect_used,
    reason = "the pattern is a literal and is covered by the tokenizer tests"
)]
static TOOLCHAIN_ARG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"'[^']*'|"[^"]*"|\S+"#).expect("valid toolchain argument pattern")
});

/// Splits a raw argument string, keeping quoted spans as single tokens.
///
/// Quotes are preserved in the returned tokens.
///
/// ```
/// use jsongen_bootstrap::split_toolchain_args;
///
/// assert_eq!(
///     split_toolchain_args(r#"a "b c" 'd e'"#),
///     ["a", r#""b c""#, "'d e'"]
/// );
/// ```
#[must_use]
pub fn split_toolchain_args(raw: &str) -> Vec<String> {
    TOOLCHAIN_ARG
        .find_iter(raw)
        .map(|token| token.as_str().to_owned())
        .collect()
}

/// Full argument list for running the launcher named `launcher`.
pub(crate) fn toolchain_command_args(config: &GeneratorConfig, launcher: &str) -> Vec<String> {
    let toolchain = &config.toolchain;
    let mut args = toolchain.run_verb.clone();
    args.extend(split_toolchain_args(&config.toolchain_args));
    args.push(toolchain.tags_flag.clone());
    args.push(config.build_tags.feature_list());
    if let Some(flag) = &toolchain.manifest_flag {
        args.push(flag.clone());
    }
    args.push(launcher.to_owned());
    args
}

/// Compiles and runs the launcher, streaming its stdout into a new file.
///
/// Returns the name of the captured output file inside `dir`. Stderr is
/// inherited so generator diagnostics reach the user unchanged.
pub(crate) fn run_launcher(
    config: &GeneratorConfig,
    dir: &OutputDir,
    launcher: &str,
    artifacts: &mut TempArtifacts<'_>,
) -> Result<String, BootstrapError> {
    let prefix = format!("{}.", config.output_file_name()?);
    let (capture, captured) = dir.create_unique(&prefix, ".tmp")?;
    artifacts.track(captured.clone());

    let program = &config.toolchain.program;
    let args = toolchain_command_args(config, launcher);
    debug!(program = %program, args = ?args, cwd = %dir.path(), "running launcher");

    let status = Command::new(program)
        .args(&args)
        .current_dir(dir.path())
        .stdin(Stdio::null())
        .stdout(Stdio::from(capture))
        .stderr(Stdio::inherit())
        .status()
        .map_err(|source| BootstrapError::Spawn {
            program: program.clone(),
            source,
        })?;

    if !status.success() {
        return Err(BootstrapError::ToolchainFailure {
            program: program.clone(),
            status: status.code().unwrap_or(-1),
        });
    }
    Ok(captured)
}

#[cfg(test)]
mod tests {
    //! Unit tests for toolchain argument handling.

    use super::*;
    use crate::config::{TargetCrate, Toolchain};
    use crate::tags::BuildTags;
    use rstest::rstest;

    #[rstest]
    #[case::empty("", &[])]
    #[case::plain("--release  --offline", &["--release", "--offline"])]
    #[case::quoted(r#"a "b c" 'd e'"#, &["a", r#""b c""#, "'d e'"])]
    #[case::adjacent_quotes(r#""a" "b""#, &[r#""a""#, r#""b""#])]
    #[case::mixed(r#"--config 'build.rustflags="-C x"' -q"#, &["--config", r#"'build.rustflags="-C x"'"#, "-q"])]
    fn splits_arguments(#[case] raw: &str, #[case] expected: &[&str]) {
        assert_eq!(split_toolchain_args(raw), expected);
    }

    fn config() -> GeneratorConfig {
        GeneratorConfig::new(
            TargetCrate::new("shop", "/work/shop"),
            "shop::model",
            "src/model/out.rs",
        )
    }

    #[test]
    fn default_arguments_follow_fixed_order() {
        let mut cfg = config();
        cfg.toolchain_args = "--offline 'x y'".to_owned();
        cfg.build_tags = BuildTags::parse("fast nightly");
        assert_eq!(
            toolchain_command_args(&cfg, "jsongen-bootstrapAb12.rs"),
            [
                "+nightly",
                "-Zscript",
                "run",
                "--offline",
                "'x y'",
                "--features",
                "fast,nightly",
                "--manifest-path",
                "jsongen-bootstrapAb12.rs",
            ]
        );
    }

    #[test]
    fn tags_flag_is_passed_even_without_tags() {
        let mut cfg = config();
        cfg.toolchain = Toolchain {
            program: "sh".to_owned(),
            run_verb: vec!["fake.sh".to_owned()],
            tags_flag: "-tags".to_owned(),
            manifest_flag: None,
        };
        assert_eq!(
            toolchain_command_args(&cfg, "launcher.rs"),
            ["fake.sh", "-tags", "", "launcher.rs"]
        );
    }
}
