//! Layered settings for a bootstrap run.
//!
//! Precedence, lowest first: built-in defaults, the settings file, `JSONGEN_`
//! environment variables, then command-line flags that were given.

use camino::{Utf8Path, Utf8PathBuf};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use jsongen_bootstrap::{DependencySpec, FeatureFlags, GeneratorLibrary, Toolchain};
use serde::{Deserialize, Serialize};

use crate::cli::{Args, FeatureArgs};
use crate::error::CliError;

/// Settings file looked up in the package root.
pub const SETTINGS_FILE: &str = "jsongen.toml";

const ENV_PREFIX: &str = "JSONGEN_";

/// Resolved settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Conditional-compilation tags.
    pub build_tags: String,
    /// Extra arguments for the compile-and-run step.
    pub gen_build_flags: String,
    /// Keep temporaries after the run.
    pub leave_temps: bool,
    /// Skip formatting the generated code.
    pub no_format: bool,
    /// Generator options.
    pub features: FeatureSettings,
    /// Host toolchain command.
    pub toolchain: ToolchainSettings,
    /// Generator library overrides.
    pub generator: GeneratorSettings,
}

/// Generator options as stored in settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[expect(
    clippy::struct_excessive_bools,
    reason = "each flag maps to an independent generator setter"
)]
pub struct FeatureSettings {
    pub snake_case: bool,
    pub lower_camel_case: bool,
    pub omit_empty: bool,
    pub no_std_marshalers: bool,
    pub disallow_unknown_fields: bool,
    pub simple_bytes: bool,
    pub disable_members_unescape: bool,
}

impl From<FeatureSettings> for FeatureFlags {
    fn from(features: FeatureSettings) -> Self {
        Self {
            snake_case: features.snake_case,
            lower_camel_case: features.lower_camel_case,
            omit_empty: features.omit_empty,
            no_std_marshalers: features.no_std_marshalers,
            disallow_unknown_fields: features.disallow_unknown_fields,
            simple_bytes: features.simple_bytes,
            skip_member_name_unescaping: features.disable_members_unescape,
        }
    }
}

/// Host toolchain command as stored in settings.
///
/// An empty `manifest_flag` passes the launcher name on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolchainSettings {
    pub program: String,
    pub run_verb: Vec<String>,
    pub tags_flag: String,
    pub manifest_flag: String,
}

impl Default for ToolchainSettings {
    fn default() -> Self {
        let toolchain = Toolchain::default();
        Self {
            program: toolchain.program,
            run_verb: toolchain.run_verb,
            tags_flag: toolchain.tags_flag,
            manifest_flag: toolchain.manifest_flag.unwrap_or_default(),
        }
    }
}

impl From<ToolchainSettings> for Toolchain {
    fn from(settings: ToolchainSettings) -> Self {
        Self {
            program: settings.program,
            run_verb: settings.run_verb,
            tags_flag: settings.tags_flag,
            manifest_flag: Some(settings.manifest_flag).filter(|flag| !flag.is_empty()),
        }
    }
}

/// Generator library overrides. Unset fields fall back to the target
/// package's own dependency on the generator.
///
/// A relative `path` is resolved against the settings file's directory, not
/// against the directory the launcher is compiled from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorSettings {
    pub crate_name: Option<String>,
    pub requirement: Option<String>,
    pub path: Option<Utf8PathBuf>,
}

impl GeneratorSettings {
    /// Builds the library description, filling gaps from `declared`.
    ///
    /// `declared` looks up the target package's dependency on a crate name.
    /// A relative `path` override is joined onto `base_dir`.
    #[must_use]
    pub fn library<F>(&self, base_dir: &Utf8Path, declared: F) -> GeneratorLibrary
    where
        F: FnOnce(&str) -> Option<DependencySpec>,
    {
        let mut library = self
            .crate_name
            .as_deref()
            .map_or_else(GeneratorLibrary::default, GeneratorLibrary::named);
        if let Some(found) = declared(&library.crate_name) {
            library.dependency = found;
        }
        if let Some(requirement) = &self.requirement {
            library.dependency.requirement.clone_from(requirement);
        }
        if let Some(path) = &self.path {
            library.dependency.path = Some(base_dir.join(path));
        }
        library
    }
}

/// Flags given on the command line. Absent flags are not serialized so they
/// never mask lower layers.
#[derive(Debug, Default, Serialize)]
struct CliOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    build_tags: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    gen_build_flags: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    leave_temps: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    no_format: Option<bool>,
    features: FeatureOverrides,
}

#[derive(Debug, Default, Serialize)]
struct FeatureOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    snake_case: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    lower_camel_case: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    omit_empty: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    no_std_marshalers: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    disallow_unknown_fields: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    simple_bytes: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    disable_members_unescape: Option<bool>,
}

impl From<&Args> for CliOverrides {
    fn from(args: &Args) -> Self {
        Self {
            build_tags: args.build_tags.clone(),
            gen_build_flags: args.gen_build_flags.clone(),
            leave_temps: args.should_leave_temps.then_some(true),
            no_format: args.should_skip_format.then_some(true),
            features: FeatureOverrides::from(args.features),
        }
    }
}

impl From<FeatureArgs> for FeatureOverrides {
    fn from(flags: FeatureArgs) -> Self {
        Self {
            snake_case: flags.snake_case.then_some(true),
            lower_camel_case: flags.lower_camel_case.then_some(true),
            omit_empty: flags.omit_empty.then_some(true),
            no_std_marshalers: flags.no_std_marshalers.then_some(true),
            disallow_unknown_fields: flags.disallow_unknown_fields.then_some(true),
            simple_bytes: flags.simple_bytes.then_some(true),
            disable_members_unescape: flags.disable_members_unescape.then_some(true),
        }
    }
}

/// Settings file read for a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsFile {
    /// Location of the file.
    pub path: Utf8PathBuf,
    /// Set when the file was named explicitly and so must exist.
    pub required: bool,
}

impl SettingsFile {
    /// Directory that relative paths in the settings resolve against.
    #[must_use]
    pub fn base_dir(&self) -> &Utf8Path {
        self.path.parent().unwrap_or_else(|| Utf8Path::new(""))
    }
}

/// Settings file for a run: `explicit` (from `--config`) if given, else the
/// package's own.
#[must_use]
pub fn settings_file(explicit: Option<Utf8PathBuf>, package_root: &Utf8Path) -> SettingsFile {
    explicit.map_or_else(
        || SettingsFile {
            path: package_root.join(SETTINGS_FILE),
            required: false,
        },
        |path| SettingsFile {
            path,
            required: true,
        },
    )
}

/// Merges every settings layer for `args`.
///
/// The package's own settings file is skipped when missing; an explicitly
/// named one is an error.
pub fn load_settings(file: &SettingsFile, args: &Args) -> Result<Settings, CliError> {
    let path = file.path.as_std_path();
    let toml = if file.required {
        Toml::file_exact(path)
    } else {
        Toml::file(path)
    };
    Ok(Figment::from(Serialized::defaults(Settings::default()))
        .merge(toml)
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
        .merge(Serialized::defaults(CliOverrides::from(args)))
        .extract()?)
}
