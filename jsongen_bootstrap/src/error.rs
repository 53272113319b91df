//! Error types for the bootstrap pipeline.

use camino::Utf8PathBuf;
use thiserror::Error;

use crate::finalize::FormatError;

/// Errors surfaced by a bootstrap run.
///
/// Every failure aborts the run; nothing is retried. Failures raised before
/// the output is finalized leave the previous output file in place.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// A file could not be created, written, read or renamed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path the operation was acting on.
        path: Utf8PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The host toolchain could not be started.
    #[error("failed to launch '{program}': {source}")]
    Spawn {
        /// Program that failed to start.
        program: String,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The host toolchain ran but exited unsuccessfully.
    #[error("'{program}' exited with status {status}")]
    ToolchainFailure {
        /// Program that was run.
        program: String,
        /// Exit code, or -1 when the process was terminated by a signal.
        status: i32,
    },

    /// The captured generator output is not valid Rust source. The capture is
    /// discarded and the output file keeps its previous contents.
    #[error("generated source for {path} could not be formatted and was discarded: {source}")]
    Format {
        /// Output file the generated source was meant for.
        path: Utf8PathBuf,
        /// Parser diagnostic.
        #[source]
        source: FormatError,
    },

    /// The output path does not name a file.
    #[error("output path '{0}' does not name a file")]
    InvalidOutputPath(Utf8PathBuf),

    /// Rendering an emitted source template failed.
    #[error("failed to render generated source")]
    Render(#[from] std::fmt::Error),
}

impl BootstrapError {
    pub(crate) fn io(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
