//! Error types for `cargo-jsongen`.

use camino::Utf8PathBuf;
use jsongen_bootstrap::BootstrapError;
use thiserror::Error;

/// Errors surfaced by the `cargo-jsongen` pipeline.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("cargo metadata failed: {0}")]
    Metadata(#[from] cargo_metadata::Error),

    #[error("invalid settings: {0}")]
    Settings(#[from] Box<figment::Error>),

    #[error(transparent)]
    Bootstrap(#[from] BootstrapError),

    #[error("package '{0}' not found in workspace")]
    PackageNotFound(String),

    #[error(
        "package '{0}' does not define a library target; the generated module must live in a library crate"
    )]
    MissingLibraryTarget(String),

    #[error("workspace root package was not available; pass --package")]
    WorkspaceRootMissing,

    #[error("no types given; name at least one type or pass --stubs")]
    NoTypes,

    #[error("cannot derive the module of {0}; it is not under the package's src directory, pass --module")]
    ModuleNotDerivable(Utf8PathBuf),

    #[error("path is not valid UTF-8: {0}")]
    NonUtf8Path(String),

    #[error("I/O error at {path}: {source}")]
    Io {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<figment::Error> for CliError {
    fn from(err: figment::Error) -> Self {
        Self::Settings(Box::new(err))
    }
}
