//! Scope guard for temporary artifacts.

use std::io::ErrorKind;

use tracing::{debug, info};

use crate::fs_helpers::OutputDir;

/// Temporary files created during a run, removed when the guard drops.
///
/// Names are registered at the point each file is created, so every exit
/// path, including early returns on error, attempts the removal. A file that
/// is already gone counts as removed: the captured output disappears from its
/// temporary name once it has been renamed onto the output path.
pub(crate) struct TempArtifacts<'dir> {
    dir: &'dir OutputDir,
    names: Vec<String>,
    retain: bool,
}

impl<'dir> TempArtifacts<'dir> {
    pub(crate) const fn new(dir: &'dir OutputDir, retain: bool) -> Self {
        Self {
            dir,
            names: Vec::new(),
            retain,
        }
    }

    pub(crate) fn track(&mut self, name: impl Into<String>) {
        self.names.push(name.into());
    }

    /// Replaces a tracked name after the file has been renamed.
    pub(crate) fn renamed(&mut self, from: &str, to: impl Into<String>) {
        self.names.retain(|name| name != from);
        self.track(to);
    }

    #[cfg(test)]
    pub(crate) fn names(&self) -> &[String] {
        &self.names
    }
}

impl Drop for TempArtifacts<'_> {
    fn drop(&mut self) {
        if self.retain {
            for name in self.names.iter().filter(|name| self.dir.exists(name)) {
                info!(path = %self.dir.join(name), "leaving temporary file in place");
            }
            return;
        }
        for name in self.names.drain(..).rev() {
            match self.dir.remove_file(&name) {
                Ok(()) => debug!(path = %self.dir.join(&name), "removed temporary file"),
                Err(err) if err.kind() == ErrorKind::NotFound => {}
                Err(err) => {
                    debug!(
                        path = %self.dir.join(&name),
                        error = %err,
                        "could not remove temporary file"
                    );
                }
            }
        }
    }
}
