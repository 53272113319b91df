//! Bootstrapping for the `jsongen` serialization generator.
//!
//! Generating serialization code for a module requires compiling the module,
//! which in turn requires the generated code. This crate breaks the cycle:
//!
//! 1. write a stub with empty impls so the module compiles;
//! 2. write a throwaway single-file cargo package that drives the generator;
//! 3. compile and run it with the host toolchain, capturing stdout;
//! 4. format the captured code and move it over the stub.
//!
//! Temporary files are removed whatever the outcome, unless the run asks to
//! keep them. The output file is expected to be mounted as a public child
//! module of the target module (`pub mod model_jsongen;`).

mod bootstrap;
mod cleanup;
mod config;
mod error;
mod finalize;
mod fs_helpers;
mod launcher;
mod stub;
mod tags;
mod toolchain;

pub use bootstrap::{Bootstrap, Stage};
pub use config::{
    DependencySpec, FeatureFlags, GeneratorConfig, GeneratorLibrary, RunMode, TargetCrate,
    Toolchain,
};
pub use error::BootstrapError;
pub use finalize::{FormatError, PrettyFormatter, SourceFormatter};
pub use tags::BuildTags;
pub use toolchain::split_toolchain_args;
