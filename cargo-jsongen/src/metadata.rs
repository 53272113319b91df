//! Cargo metadata discovery for `cargo-jsongen`.

use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use cargo_metadata::{Metadata, MetadataCommand, Package};
use jsongen_bootstrap::{DependencySpec, TargetCrate};

use crate::error::CliError;

/// Loads Cargo metadata for the workspace owning `manifest_path`, or the
/// current directory.
pub fn load_metadata(manifest_path: Option<&Utf8Path>) -> Result<Metadata, CliError> {
    let mut command = MetadataCommand::new();
    command.no_deps();
    if let Some(path) = manifest_path {
        command.manifest_path(path.as_std_path());
    }
    Ok(command.exec()?)
}

/// Selects the package declaring the module that receives `output`.
///
/// An explicit `name` wins. Otherwise the workspace member with the deepest
/// root containing `output` is chosen, falling back to the root package.
pub fn select_package<'a>(
    metadata: &'a Metadata,
    name: Option<&str>,
    output: &Utf8Path,
) -> Result<&'a Package, CliError> {
    if let Some(package_name) = name {
        return find_package(metadata, package_name);
    }

    metadata
        .workspace_packages()
        .into_iter()
        .filter_map(|package| Some((package, package.manifest_path.parent()?)))
        .filter(|(_, root)| output.starts_with(root))
        .max_by_key(|(_, root)| root.components().count())
        .map(|(package, _)| package)
        .map_or_else(
            || metadata.root_package().ok_or(CliError::WorkspaceRootMissing),
            Ok,
        )
}

fn find_package<'a>(metadata: &'a Metadata, name: &str) -> Result<&'a Package, CliError> {
    metadata
        .packages
        .iter()
        .find(|package| package.name == name)
        .ok_or_else(|| CliError::PackageNotFound(name.to_owned()))
}

/// Name and root directory of `package`.
///
/// The launcher depends on the package as a library, so it must have one.
pub fn target_crate(package: &Package) -> Result<TargetCrate, CliError> {
    ensure_library_target(package)?;
    let root = package
        .manifest_path
        .parent()
        .ok_or_else(|| CliError::PackageNotFound(package.name.clone()))?;
    Ok(TargetCrate::new(package.name.clone(), root))
}

fn ensure_library_target(package: &Package) -> Result<(), CliError> {
    let has_lib = package
        .targets
        .iter()
        .any(|target| target.kind.iter().any(|kind| is_library_kind(kind)));
    if has_lib {
        Ok(())
    } else {
        Err(CliError::MissingLibraryTarget(package.name.clone()))
    }
}

/// Target kinds another package can depend on as a Rust library.
fn is_library_kind(kind: &str) -> bool {
    matches!(kind, "lib" | "rlib")
}

/// Requirement and path of the package's dependency on `crate_name`.
#[must_use]
pub fn generator_dependency(package: &Package, crate_name: &str) -> Option<DependencySpec> {
    package
        .dependencies
        .iter()
        .find(|dep| dep.name == crate_name)
        .map(|dep| DependencySpec {
            requirement: dep.req.to_string(),
            path: dep.path.clone(),
        })
}

/// Qualifies a user-supplied module path with the crate identifier.
#[must_use]
pub fn normalize_module_path(raw: &str, crate_ident: &str) -> String {
    if raw == "crate" {
        return crate_ident.to_owned();
    }

    if let Some(stripped) = raw.strip_prefix("crate::") {
        return format!("{crate_ident}::{stripped}");
    }

    if raw == crate_ident || raw.starts_with(&format!("{crate_ident}::")) {
        return raw.to_owned();
    }

    format!("{crate_ident}::{raw}")
}

/// Derives the module holding the output file from its directory.
///
/// The output file is mounted inside the module whose children live in its
/// directory: `src/model/x.rs` belongs to `<crate>::model` and `src/x.rs` to
/// the crate root.
pub fn derive_module_path(
    root: &Utf8Path,
    output: &Utf8Path,
    crate_ident: &str,
) -> Result<String, CliError> {
    let not_derivable = || CliError::ModuleNotDerivable(output.to_path_buf());
    let dir = output.parent().ok_or_else(not_derivable)?;
    let relative = dir.strip_prefix(root.join("src")).map_err(|_| not_derivable())?;

    let mut segments = vec![crate_ident.to_owned()];
    for component in relative.components() {
        match component {
            Utf8Component::Normal(segment) => segments.push(segment.replace('-', "_")),
            Utf8Component::CurDir => {}
            _ => return Err(not_derivable()),
        }
    }
    Ok(segments.join("::"))
}

/// Makes `path` absolute against the current directory.
pub fn absolute_path(path: &Utf8Path) -> Result<Utf8PathBuf, CliError> {
    let absolute = std::path::absolute(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Utf8PathBuf::from_path_buf(absolute)
        .map_err(|non_utf8| CliError::NonUtf8Path(non_utf8.display().to_string()))
}
