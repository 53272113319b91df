//! Throwaway program that drives the real generator.
//!
//! The launcher is a single-file cargo package: a frontmatter manifest that
//! depends on the target crate and the generator library, followed by a
//! `main` that registers every target type and streams the generated code to
//! standard output. No `mod` item ever names it, so ordinary builds of the
//! target crate never compile it.

use std::fmt::Write as _;
use std::io::Write as _;

use tracing::debug;

use crate::cleanup::TempArtifacts;
use crate::config::GeneratorConfig;
use crate::error::BootstrapError;
use crate::fs_helpers::OutputDir;
use crate::stub::EXPORTER_PREFIX;

const LAUNCHER_PREFIX: &str = "jsongen-bootstrap";
const LAUNCHER_SUFFIX: &str = ".rs";

/// Writes the launcher next to the output file and returns its final name.
///
/// The file is registered with `artifacts` as soon as it exists, and again
/// under its final name once renamed.
pub(crate) fn write_launcher(
    config: &GeneratorConfig,
    dir: &OutputDir,
    artifacts: &mut TempArtifacts<'_>,
) -> Result<String, BootstrapError> {
    let content = render_launcher(config)?;

    let (mut file, name) = dir.create_unique(LAUNCHER_PREFIX, "")?;
    artifacts.track(name.clone());
    file.write_all(content.as_bytes())
        .and_then(|()| file.sync_all())
        .map_err(|io_err| BootstrapError::io(dir.join(&name), io_err))?;
    drop(file);

    let dest = format!("{name}{LAUNCHER_SUFFIX}");
    dir.rename(&name, &dest)?;
    artifacts.renamed(&name, dest.clone());
    debug!(path = %dir.join(&dest), "wrote launcher");
    Ok(dest)
}

/// Renders the launcher source for `config`.
pub(crate) fn render_launcher(config: &GeneratorConfig) -> Result<String, BootstrapError> {
    let mut out = String::new();
    render_manifest(config, &mut out)?;
    writeln!(out)?;
    writeln!(out, "// TEMPORARY AUTOGENERATED FILE: jsongen bootstrapping code to launch")?;
    writeln!(out, "// the actual generator.")?;
    writeln!(out)?;

    let has_types = !config.type_names.is_empty();
    if has_types {
        writeln!(out, "use std::marker::PhantomData;")?;
    }
    writeln!(out, "use std::process::ExitCode;")?;
    writeln!(out)?;
    writeln!(out, "use {};", config.library.generator)?;
    if has_types {
        writeln!(
            out,
            "use {}::{} as pkg;",
            config.module_path,
            config.output_module()?
        )?;
    }
    writeln!(out)?;

    let generator = config
        .library
        .generator
        .rsplit("::")
        .next()
        .unwrap_or(&config.library.generator);
    writeln!(out, "fn main() -> ExitCode {{")?;
    writeln!(
        out,
        "    let mut g = {generator}::new({:?});",
        config.output_file_name()?
    )?;
    writeln!(
        out,
        "    g.set_module({:?}, {:?});",
        config.module_name, config.module_path
    )?;
    if !config.build_tags.is_empty() {
        writeln!(out, "    g.set_build_tags({:?});", config.build_tags.raw())?;
    }
    for setter in config.features.enabled_setters() {
        writeln!(out, "    g.{setter}();")?;
    }
    for ty in &config.type_names {
        writeln!(out, "    g.add(PhantomData::<pkg::{EXPORTER_PREFIX}{ty}>);")?;
    }
    writeln!(out, "    if let Err(err) = g.run(&mut std::io::stdout().lock()) {{")?;
    writeln!(out, "        eprintln!(\"{{err}}\");")?;
    writeln!(out, "        return ExitCode::FAILURE;")?;
    writeln!(out, "    }}")?;
    writeln!(out, "    ExitCode::SUCCESS")?;
    writeln!(out, "}}")?;

    Ok(out)
}

fn render_manifest(config: &GeneratorConfig, out: &mut String) -> Result<(), BootstrapError> {
    let target = &config.target;
    let target_ident = target.ident();
    let library = &config.library;

    writeln!(out, "---cargo")?;
    writeln!(out, "[package]")?;
    writeln!(out, "edition = \"2024\"")?;
    writeln!(out, "publish = false")?;
    writeln!(out)?;
    writeln!(out, "[dependencies]")?;
    if target_ident == target.package_name {
        writeln!(out, "{target_ident} = {{ path = {:?} }}", target.root.as_str())?;
    } else {
        writeln!(
            out,
            "{target_ident} = {{ package = {:?}, path = {:?} }}",
            target.package_name,
            target.root.as_str()
        )?;
    }
    match &library.dependency.path {
        Some(path) => writeln!(
            out,
            "{} = {{ path = {:?}, version = {:?} }}",
            library.crate_name,
            path.as_str(),
            library.dependency.requirement
        )?,
        None => writeln!(
            out,
            "{} = {:?}",
            library.crate_name, library.dependency.requirement
        )?,
    }
    if !config.build_tags.is_empty() {
        writeln!(out)?;
        writeln!(out, "[features]")?;
        for tag in config.build_tags.iter() {
            writeln!(out, "{tag:?} = [\"{target_ident}/{tag}\"]")?;
        }
    }
    writeln!(out, "---")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    //! Unit tests for launcher rendering.

    use super::*;
    use crate::config::{FeatureFlags, TargetCrate};
    use crate::tags::BuildTags;
    use rstest::rstest;

    fn config() -> GeneratorConfig {
        GeneratorConfig::new(
            TargetCrate::new("shop", "/work/shop"),
            "shop::model",
            "src/model/model_jsongen.rs",
        )
    }

    fn body(source: &str) -> &str {
        source
            .split_once("\n---\n")
            .map_or(source, |(_, rest)| rest)
    }

    #[test]
    fn tracks_only_the_renamed_launcher() {
        let tmp = tempfile::tempdir().expect("create temp dir");
        let path = camino::Utf8PathBuf::from_path_buf(tmp.path().to_path_buf())
            .expect("utf-8 temp dir");
        let dir = OutputDir::open(&path).expect("open output dir");
        let mut artifacts = TempArtifacts::new(&dir, true);

        let name = write_launcher(&config(), &dir, &mut artifacts).expect("write launcher");

        assert!(name.starts_with(LAUNCHER_PREFIX) && name.ends_with(LAUNCHER_SUFFIX));
        assert_eq!(artifacts.names(), [name.clone()]);
        assert!(dir.exists(&name));
    }

    #[test]
    fn seeds_generator_with_output_and_module() {
        let launcher = render_launcher(&config()).expect("render launcher");
        assert!(launcher.contains("use jsongen::codegen::Generator;"));
        assert!(launcher.contains("let mut g = Generator::new(\"model_jsongen.rs\");"));
        assert!(launcher.contains("g.set_module(\"model\", \"shop::model\");"));
        assert!(launcher.contains("if let Err(err) = g.run(&mut std::io::stdout().lock()) {"));
        assert!(launcher.contains("return ExitCode::FAILURE;"));
    }

    #[test]
    fn omits_module_import_without_types() {
        let launcher = render_launcher(&config()).expect("render launcher");
        assert!(!launcher.contains(" as pkg;"));
        assert!(!launcher.contains("PhantomData"));
    }

    #[test]
    fn registers_types_in_order_through_exporters() {
        let launcher =
            render_launcher(&config().with_types(["Order", "Basket"])).expect("render launcher");
        assert!(launcher.contains("use shop::model::model_jsongen as pkg;"));
        let registrations: Vec<_> = launcher
            .lines()
            .filter(|line| line.trim_start().starts_with("g.add("))
            .map(str::trim)
            .collect();
        assert_eq!(
            registrations,
            [
                "g.add(PhantomData::<pkg::JsongenExporter_Basket>);",
                "g.add(PhantomData::<pkg::JsongenExporter_Order>);",
            ]
        );
    }

    #[rstest]
    #[case::none(FeatureFlags::default(), &[])]
    #[case::snake(FeatureFlags { snake_case: true, ..FeatureFlags::default() }, &["use_snake_case"])]
    #[case::mixed(
        FeatureFlags { omit_empty: true, no_std_marshalers: true, skip_member_name_unescaping: true, ..FeatureFlags::default() },
        &["omit_empty", "no_std_marshalers", "skip_member_name_unescaping"]
    )]
    #[case::all(
        FeatureFlags {
            snake_case: true,
            lower_camel_case: true,
            omit_empty: true,
            no_std_marshalers: true,
            disallow_unknown_fields: true,
            simple_bytes: true,
            skip_member_name_unescaping: true,
        },
        &[
            "use_snake_case",
            "use_lower_camel_case",
            "omit_empty",
            "no_std_marshalers",
            "disallow_unknown_fields",
            "simple_bytes",
            "skip_member_name_unescaping",
        ]
    )]
    fn emits_only_enabled_setters(#[case] features: FeatureFlags, #[case] expected: &[&str]) {
        let mut cfg = config();
        cfg.features = features;
        let launcher = render_launcher(&cfg).expect("render launcher");
        let setters: Vec<_> = launcher
            .lines()
            .map(str::trim)
            .filter(|line| line.starts_with("g.") && line.ends_with("();"))
            .map(|line| line.trim_start_matches("g.").trim_end_matches("();"))
            .collect();
        assert_eq!(setters, expected);
    }

    #[test]
    fn build_tags_reach_generator_and_manifest() {
        let mut cfg = config();
        cfg.build_tags = BuildTags::parse("fast nightly");
        let launcher = render_launcher(&cfg).expect("render launcher");
        assert!(launcher.contains("g.set_build_tags(\"fast nightly\");"));
        assert!(launcher.contains(
            "[features]\n\"fast\" = [\"shop/fast\"]\n\"nightly\" = [\"shop/nightly\"]\n"
        ));
    }

    #[test]
    fn manifest_depends_on_target_and_library() {
        let launcher = render_launcher(&config()).expect("render launcher");
        assert!(launcher.starts_with("---cargo\n[package]\nedition = \"2024\"\n"));
        assert!(launcher.contains("shop = { path = \"/work/shop\" }"));
        assert!(launcher.contains("jsongen = \"0.1\""));
        assert!(!launcher.contains("[features]"));
    }

    #[test]
    fn manifest_renames_hyphenated_packages() {
        let mut cfg = config();
        cfg.target = TargetCrate::new("shop-core", "/work/shop");
        cfg.library.dependency.path = Some("/work/jsongen".into());
        let launcher = render_launcher(&cfg).expect("render launcher");
        assert!(
            launcher.contains("shop_core = { package = \"shop-core\", path = \"/work/shop\" }")
        );
        assert!(launcher.contains("jsongen = { path = \"/work/jsongen\", version = \"0.1\" }"));
    }

    #[test]
    fn launcher_body_parses_as_rust() {
        let mut cfg = config().with_types(["Order", "Customer"]);
        cfg.build_tags = BuildTags::parse("fast");
        cfg.features.snake_case = true;
        let launcher = render_launcher(&cfg).expect("render launcher");
        syn::parse_file(body(&launcher)).expect("launcher body should be valid Rust");
    }
}
