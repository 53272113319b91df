//! Filesystem access confined to the output directory.

use std::fs::File;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;

use crate::error::BootstrapError;

/// Handle on the directory holding the output file and its temporaries.
///
/// All names passed to the methods are relative to this directory.
pub(crate) struct OutputDir {
    path: Utf8PathBuf,
    dir: Dir,
}

impl OutputDir {
    pub(crate) fn open(path: &Utf8Path) -> Result<Self, BootstrapError> {
        let dir = Dir::open_ambient_dir(path, ambient_authority())
            .map_err(|io_err| BootstrapError::io(path, io_err))?;
        Ok(Self {
            path: path.to_path_buf(),
            dir,
        })
    }

    pub(crate) fn path(&self) -> &Utf8Path {
        &self.path
    }

    pub(crate) fn join(&self, name: &str) -> Utf8PathBuf {
        self.path.join(name)
    }

    /// Creates or truncates `name` and writes `contents` to it.
    pub(crate) fn write(&self, name: &str, contents: &[u8]) -> Result<(), BootstrapError> {
        self.dir
            .write(name, contents)
            .map_err(|io_err| BootstrapError::io(self.join(name), io_err))
    }

    pub(crate) fn read_to_string(&self, name: &str) -> Result<String, BootstrapError> {
        self.dir
            .read_to_string(name)
            .map_err(|io_err| BootstrapError::io(self.join(name), io_err))
    }

    pub(crate) fn rename(&self, from: &str, to: &str) -> Result<(), BootstrapError> {
        self.dir
            .rename(from, &self.dir, to)
            .map_err(|io_err| BootstrapError::io(self.join(from), io_err))
    }

    pub(crate) fn exists(&self, name: &str) -> bool {
        self.dir.exists(name)
    }

    pub(crate) fn remove_file(&self, name: &str) -> std::io::Result<()> {
        self.dir.remove_file(name)
    }

    /// Creates a new file with a unique name built from `prefix` and `suffix`.
    ///
    /// The file is not deleted when the handle is dropped; ownership of the
    /// name passes to the caller.
    pub(crate) fn create_unique(
        &self,
        prefix: &str,
        suffix: &str,
    ) -> Result<(File, String), BootstrapError> {
        let named = tempfile::Builder::new()
            .prefix(prefix)
            .suffix(suffix)
            .tempfile_in(&self.path)
            .map_err(|io_err| BootstrapError::io(self.path.clone(), io_err))?;
        let (file, path) = named
            .keep()
            .map_err(|persist_err| BootstrapError::io(self.path.clone(), persist_err.error))?;
        let name = path
            .file_name()
            .and_then(|name| name.to_str())
            .map(str::to_owned)
            .ok_or_else(|| {
                BootstrapError::io(
                    self.path.clone(),
                    std::io::Error::new(
                        std::io::ErrorKind::InvalidData,
                        format!("temporary file name is not UTF-8: {}", path.display()),
                    ),
                )
            })?;
        Ok((file, name))
    }
}
