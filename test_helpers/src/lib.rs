//! Test helpers shared across crates.
//!
//! This crate provides a scriptable stand-in for the host toolchain and a
//! wrapper around `figment::Jail` for configuration tests.

pub mod fake_toolchain;
pub mod figment;
