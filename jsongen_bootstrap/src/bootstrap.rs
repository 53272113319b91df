//! Sequencing of the bootstrap stages.

use std::fmt;

use tracing::{debug, info};

use crate::cleanup::TempArtifacts;
use crate::config::GeneratorConfig;
use crate::error::BootstrapError;
use crate::finalize::{self, PrettyFormatter, SourceFormatter};
use crate::fs_helpers::OutputDir;
use crate::{launcher, stub, toolchain};

/// Stage a run has reached. Stages only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    /// The stub has been written over the output file.
    Stub,
    /// The launcher has been written next to the output file.
    LauncherWritten,
    /// The toolchain ran the launcher and its output was captured.
    Invoked,
    /// The output file holds the generated code.
    Finalized,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Stub => "stub",
            Self::LauncherWritten => "launcher-written",
            Self::Invoked => "invoked",
            Self::Finalized => "finalized",
        };
        f.write_str(name)
    }
}

/// Runs the bootstrap pipeline for one configuration.
///
/// ```no_run
/// use jsongen_bootstrap::{Bootstrap, GeneratorConfig, Stage, TargetCrate};
///
/// let config = GeneratorConfig::new(
///     TargetCrate::new("shop", "/work/shop"),
///     "shop::model",
///     "/work/shop/src/model/model_jsongen.rs",
/// )
/// .with_types(["Order", "Customer"]);
///
/// let stage = Bootstrap::new(config).run()?;
/// assert_eq!(stage, Stage::Finalized);
/// # Ok::<(), jsongen_bootstrap::BootstrapError>(())
/// ```
#[derive(Debug)]
pub struct Bootstrap<F = PrettyFormatter> {
    config: GeneratorConfig,
    formatter: F,
}

impl Bootstrap {
    /// Creates a bootstrap using the default formatter.
    #[must_use]
    pub const fn new(config: GeneratorConfig) -> Self {
        Self {
            config,
            formatter: PrettyFormatter,
        }
    }
}

impl<F: SourceFormatter> Bootstrap<F> {
    /// Replaces the formatter applied to the captured output.
    #[must_use]
    pub fn with_formatter<G: SourceFormatter>(self, formatter: G) -> Bootstrap<G> {
        Bootstrap {
            config: self.config,
            formatter,
        }
    }

    /// Configuration this bootstrap runs with.
    #[must_use]
    pub const fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Runs every stage and returns the last one reached.
    ///
    /// Stubs-only mode stops at [`Stage::Stub`]. Temporary files are
    /// removed on every exit path unless the configuration retains them.
    ///
    /// # Errors
    ///
    /// Returns the first [`BootstrapError`] raised by any stage. Errors
    /// raised before finalization leave the output file as the stub.
    pub fn run(&self) -> Result<Stage, BootstrapError> {
        let config = &self.config;
        let dir = OutputDir::open(config.output_dir())?;

        stub::write_stub(config, &dir)?;
        trace_stage(Stage::Stub, config);
        if config.mode.stubs_only {
            return Ok(Stage::Stub);
        }

        let mut artifacts = TempArtifacts::new(&dir, config.mode.leave_temps);

        let launcher = launcher::write_launcher(config, &dir, &mut artifacts)?;
        trace_stage(Stage::LauncherWritten, config);

        let captured = toolchain::run_launcher(config, &dir, &launcher, &mut artifacts)?;
        trace_stage(Stage::Invoked, config);

        finalize::finalize_output(config, &dir, &captured, &self.formatter)?;
        trace_stage(Stage::Finalized, config);
        info!(
            path = %config.output_path,
            types = config.type_names.len(),
            "generated serialization code"
        );

        Ok(Stage::Finalized)
    }
}

fn trace_stage(stage: Stage, config: &GeneratorConfig) {
    debug!(stage = %stage, output = %config.output_path, "bootstrap stage complete");
}

#[cfg(test)]
mod tests {
    //! Unit tests for stage bookkeeping.

    use super::*;

    #[test]
    fn stages_are_ordered() {
        assert!(Stage::Stub < Stage::LauncherWritten);
        assert!(Stage::LauncherWritten < Stage::Invoked);
        assert!(Stage::Invoked < Stage::Finalized);
    }

    #[test]
    fn stages_display_in_kebab_case() {
        assert_eq!(Stage::LauncherWritten.to_string(), "launcher-written");
        assert_eq!(Stage::Finalized.to_string(), "finalized");
    }
}
