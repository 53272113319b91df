//! Run configuration consumed by the bootstrap pipeline.

use std::collections::BTreeSet;

use camino::{Utf8Path, Utf8PathBuf};

use crate::error::BootstrapError;
use crate::tags::BuildTags;

/// Cargo package that declares the target module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetCrate {
    /// Cargo package name, possibly containing `-`.
    pub package_name: String,
    /// Directory containing the package manifest.
    pub root: Utf8PathBuf,
}

impl TargetCrate {
    /// Creates a target crate description.
    #[must_use]
    pub fn new(package_name: impl Into<String>, root: impl Into<Utf8PathBuf>) -> Self {
        Self {
            package_name: package_name.into(),
            root: root.into(),
        }
    }

    /// Identifier the crate is imported under.
    #[must_use]
    pub fn ident(&self) -> String {
        self.package_name.replace('-', "_")
    }
}

/// Generator options, each forwarded as one setter call on the generator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[expect(
    clippy::struct_excessive_bools,
    reason = "each flag maps to an independent generator setter"
)]
pub struct FeatureFlags {
    /// Rename fields to `snake_case`.
    pub snake_case: bool,
    /// Rename fields to `lowerCamelCase`.
    pub lower_camel_case: bool,
    /// Omit empty fields by default.
    pub omit_empty: bool,
    /// Do not emit the serde serialize/deserialize pair.
    pub no_std_marshalers: bool,
    /// Reject unknown fields when decoding.
    pub disallow_unknown_fields: bool,
    /// Encode byte slices as plain arrays instead of base64.
    pub simple_bytes: bool,
    /// Match member names without unescaping them first.
    pub skip_member_name_unescaping: bool,
}

impl FeatureFlags {
    /// Generator setters for the enabled flags, in a fixed order.
    pub(crate) fn enabled_setters(self) -> impl Iterator<Item = &'static str> {
        [
            (self.snake_case, "use_snake_case"),
            (self.lower_camel_case, "use_lower_camel_case"),
            (self.omit_empty, "omit_empty"),
            (self.no_std_marshalers, "no_std_marshalers"),
            (self.disallow_unknown_fields, "disallow_unknown_fields"),
            (self.simple_bytes, "simple_bytes"),
            (self.skip_member_name_unescaping, "skip_member_name_unescaping"),
        ]
        .into_iter()
        .filter_map(|(enabled, setter)| enabled.then_some(setter))
    }
}

/// How far the run goes and what it leaves behind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunMode {
    /// Stop after writing the stub.
    pub stubs_only: bool,
    /// Keep the launcher and captured output for inspection.
    pub leave_temps: bool,
    /// Move the captured output into place without formatting it.
    pub no_format: bool,
}

/// Where the launcher pulls the generator library from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencySpec {
    /// Cargo version requirement.
    pub requirement: String,
    /// Optional local path, used instead of the registry.
    pub path: Option<Utf8PathBuf>,
}

/// Identifiers of the external generator library.
///
/// Defaults name the published `jsongen` crate; tests point them at fakes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorLibrary {
    /// Crate name used as the launcher's dependency key.
    pub crate_name: String,
    /// Dependency source for the launcher manifest.
    pub dependency: DependencySpec,
    /// Path of the generator type driven by the launcher.
    pub generator: String,
    /// Path of the streaming writer type.
    pub writer: String,
    /// Path of the streaming lexer type.
    pub lexer: String,
    /// Path of the fast serialization trait.
    pub marshaler: String,
    /// Path of the fast deserialization trait.
    pub unmarshaler: String,
}

impl GeneratorLibrary {
    /// Identifiers for a generator crate published as `crate_name`.
    ///
    /// Item paths follow the layout of the `jsongen` crate under the
    /// crate's import identifier.
    #[must_use]
    pub fn named(crate_name: &str) -> Self {
        let ident = crate_name.replace('-', "_");
        Self {
            crate_name: crate_name.to_owned(),
            dependency: DependencySpec {
                requirement: "0.1".to_owned(),
                path: None,
            },
            generator: format!("{ident}::codegen::Generator"),
            writer: format!("{ident}::writer::Writer"),
            lexer: format!("{ident}::lexer::Lexer"),
            marshaler: format!("{ident}::Marshaler"),
            unmarshaler: format!("{ident}::Unmarshaler"),
        }
    }
}

impl Default for GeneratorLibrary {
    fn default() -> Self {
        Self::named("jsongen")
    }
}

/// Host toolchain command used to compile and run the launcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolchain {
    /// Program to execute.
    pub program: String,
    /// Leading arguments selecting the compile-and-run verb.
    pub run_verb: Vec<String>,
    /// Flag introducing the feature list.
    pub tags_flag: String,
    /// Flag placed before the launcher name, if the toolchain needs one.
    pub manifest_flag: Option<String>,
}

impl Default for Toolchain {
    fn default() -> Self {
        Self {
            program: "cargo".to_owned(),
            run_verb: vec!["+nightly".to_owned(), "-Zscript".to_owned(), "run".to_owned()],
            tags_flag: "--features".to_owned(),
            manifest_flag: Some("--manifest-path".to_owned()),
        }
    }
}

/// Everything a bootstrap run needs, fixed for the duration of the run.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Package declaring the target module.
    pub target: TargetCrate,
    /// Fully qualified path of the target module, e.g. `shop::model`.
    pub module_path: String,
    /// Name of the target module.
    pub module_name: String,
    /// Types that need serialization support, kept in lexicographic order.
    pub type_names: BTreeSet<String>,
    /// File receiving the generated code.
    pub output_path: Utf8PathBuf,
    /// Generator options.
    pub features: FeatureFlags,
    /// Conditional-compilation tags.
    pub build_tags: BuildTags,
    /// Extra arguments for the compile-and-run step, unsplit.
    pub toolchain_args: String,
    /// Stub-only, retention and formatting switches.
    pub mode: RunMode,
    /// Generator library identifiers.
    pub library: GeneratorLibrary,
    /// Host toolchain command.
    pub toolchain: Toolchain,
}

impl GeneratorConfig {
    /// Creates a configuration with default options and no types.
    ///
    /// The module name defaults to the last segment of `module_path`.
    #[must_use]
    pub fn new(
        target: TargetCrate,
        module_path: impl Into<String>,
        output_path: impl Into<Utf8PathBuf>,
    ) -> Self {
        let module_path = module_path.into();
        let module_name = module_path
            .rsplit("::")
            .next()
            .unwrap_or_default()
            .to_owned();
        Self {
            target,
            module_path,
            module_name,
            type_names: BTreeSet::new(),
            output_path: output_path.into(),
            features: FeatureFlags::default(),
            build_tags: BuildTags::default(),
            toolchain_args: String::new(),
            mode: RunMode::default(),
            library: GeneratorLibrary::default(),
            toolchain: Toolchain::default(),
        }
    }

    /// Adds type names to the set.
    #[must_use]
    pub fn with_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.type_names.extend(types.into_iter().map(Into::into));
        self
    }

    /// Directory holding the output file and every temporary artifact.
    #[must_use]
    pub fn output_dir(&self) -> &Utf8Path {
        match self.output_path.parent() {
            Some(parent) if !parent.as_str().is_empty() => parent,
            _ => Utf8Path::new("."),
        }
    }

    /// Base name of the output file.
    ///
    /// # Errors
    ///
    /// Returns [`BootstrapError::InvalidOutputPath`] when the path ends in
    /// `..` or a root.
    pub fn output_file_name(&self) -> Result<&str, BootstrapError> {
        self.output_path
            .file_name()
            .ok_or_else(|| BootstrapError::InvalidOutputPath(self.output_path.clone()))
    }

    /// Module name of the output file, as mounted inside the target module.
    pub(crate) fn output_module(&self) -> Result<&str, BootstrapError> {
        let name = self.output_file_name()?;
        Ok(name.strip_suffix(".rs").unwrap_or(name))
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for configuration helpers.

    use super::*;
    use rstest::rstest;

    fn config(output: &str) -> GeneratorConfig {
        GeneratorConfig::new(
            TargetCrate::new("shop-core", "/work/shop"),
            "shop_core::model",
            output,
        )
    }

    #[test]
    fn crate_ident_replaces_hyphens() {
        assert_eq!(TargetCrate::new("shop-core", "/x").ident(), "shop_core");
    }

    #[test]
    fn module_name_defaults_to_last_segment() {
        assert_eq!(config("src/model/out.rs").module_name, "model");
    }

    #[test]
    fn type_names_are_sorted_and_deduplicated() {
        let cfg = config("out.rs").with_types(["Order", "Customer", "Order", "Basket"]);
        let names: Vec<_> = cfg.type_names.iter().map(String::as_str).collect();
        assert_eq!(names, ["Basket", "Customer", "Order"]);
    }

    #[rstest]
    #[case::bare("model_jsongen.rs", ".")]
    #[case::nested("src/model/model_jsongen.rs", "src/model")]
    #[case::absolute("/work/shop/src/out.rs", "/work/shop/src")]
    fn output_dir_defaults_to_current_directory(#[case] output: &str, #[case] expected: &str) {
        assert_eq!(config(output).output_dir(), Utf8Path::new(expected));
    }

    #[test]
    fn output_module_strips_extension() {
        let cfg = config("src/model/model_jsongen.rs");
        assert_eq!(cfg.output_module().expect("module name"), "model_jsongen");
    }

    #[test]
    fn output_file_name_rejects_parent_reference() {
        let err = config("src/..").output_file_name().expect_err("no file name");
        assert!(matches!(err, BootstrapError::InvalidOutputPath(_)));
    }

    #[test]
    fn library_paths_use_crate_ident() {
        let library = GeneratorLibrary::named("json-gen");
        assert_eq!(library.crate_name, "json-gen");
        assert_eq!(library.generator, "json_gen::codegen::Generator");
        assert_eq!(GeneratorLibrary::default().marshaler, "jsongen::Marshaler");
    }

    #[test]
    fn enabled_setters_skip_disabled_flags() {
        let flags = FeatureFlags {
            omit_empty: true,
            simple_bytes: true,
            ..FeatureFlags::default()
        };
        assert_eq!(
            flags.enabled_setters().collect::<Vec<_>>(),
            ["omit_empty", "simple_bytes"]
        );
        assert_eq!(FeatureFlags::default().enabled_setters().count(), 0);
    }
}
