//! CLI entrypoint for `cargo-jsongen`.

mod cli;
mod error;
mod metadata;
mod settings;

use std::process::ExitCode;

use cargo_metadata::Package;
use clap::Parser;
use jsongen_bootstrap::{Bootstrap, BuildTags, GeneratorConfig, RunMode, Stage};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cli::Args;
use crate::error::CliError;
use crate::settings::{Settings, SettingsFile};

fn main() -> ExitCode {
    let args = Args::parse_from(cli::strip_subcommand(std::env::args_os()));
    init_tracing(args.verbose);
    match run(&args) {
        Ok(stage) => {
            info!(stage = %stage, "bootstrap finished");
            ExitCode::SUCCESS
        }
        Err(err) => {
            report(&err);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[expect(
    clippy::print_stderr,
    reason = "the error is the command's final diagnostic"
)]
fn report(err: &CliError) {
    eprintln!("error: {err}");
}

fn run(args: &Args) -> Result<Stage, CliError> {
    if args.types.is_empty() && !args.is_stubs_only {
        return Err(CliError::NoTypes);
    }

    let output = metadata::absolute_path(&args.output)?;
    let cargo = metadata::load_metadata(args.manifest_path.as_deref())?;
    let package = metadata::select_package(&cargo, args.package.as_deref(), &output)?;
    let target = metadata::target_crate(package)?;

    let explicit = args
        .config
        .as_deref()
        .map(metadata::absolute_path)
        .transpose()?;
    let settings_file = settings::settings_file(explicit, &target.root);
    let settings = settings::load_settings(&settings_file, args)?;

    let crate_ident = target.ident();
    let module_path = args.module.as_deref().map_or_else(
        || metadata::derive_module_path(&target.root, &output, &crate_ident),
        |raw| Ok(metadata::normalize_module_path(raw, &crate_ident)),
    )?;

    let config = build_config(
        GeneratorConfig::new(target, module_path, output),
        args,
        settings,
        &settings_file,
        package,
    );
    Ok(Bootstrap::new(config).run()?)
}

fn build_config(
    base: GeneratorConfig,
    args: &Args,
    settings: Settings,
    settings_file: &SettingsFile,
    package: &Package,
) -> GeneratorConfig {
    let library = settings
        .generator
        .library(settings_file.base_dir(), |crate_name| {
            metadata::generator_dependency(package, crate_name)
        });
    GeneratorConfig {
        features: settings.features.into(),
        build_tags: BuildTags::parse(&settings.build_tags),
        toolchain_args: settings.gen_build_flags,
        mode: RunMode {
            stubs_only: args.is_stubs_only,
            leave_temps: settings.leave_temps,
            no_format: settings.no_format,
        },
        library,
        toolchain: settings.toolchain.into(),
        ..base.with_types(args.types.iter().cloned())
    }
}
