//! Shared helpers for working with `figment::Jail` in tests.
//!
//! A jail gives each test its own working directory and environment, which
//! the settings loader reads from. These helpers run a closure inside a jail
//! and propagate its return value as an `anyhow::Result`.

use anyhow::{Result, anyhow};

/// Executes `f` inside a [`figment::Jail`], returning the closure's output.
///
/// The jail is torn down automatically once the closure completes, even when
/// the closure returns an error. Failures are converted into `anyhow::Error`
/// values so callers can use the `?` operator without extra boilerplate.
///
/// # Errors
///
/// Returns an error if the jail initialisation fails or the closure returns a
/// [`figment::error::Error`].
pub fn with_jail<F, T>(f: F) -> Result<T>
where
    F: FnOnce(&mut figment::Jail) -> figment::error::Result<T>,
{
    let mut output = None;
    figment::Jail::try_with(|j| {
        output = Some(f(j)?);
        Ok(())
    })
    .map_err(|err| anyhow!(err.to_string()))?;
    output.ok_or_else(|| anyhow!("jail closure did not return a value"))
}

/// Runs `f` in a jail whose working directory holds the settings file `name`
/// with `contents`.
///
/// # Errors
///
/// Returns an error if the file cannot be created or the closure fails.
pub fn with_settings_file<F, T>(name: &str, contents: &str, f: F) -> Result<T>
where
    F: FnOnce(&mut figment::Jail) -> figment::error::Result<T>,
{
    with_jail(|j| {
        j.create_file(name, contents)?;
        f(j)
    })
}

/// Converts any error implementing [`ToString`] into a [`figment::Error`].
///
/// Lets jail closures use `?` on errors from the code under test.
#[expect(
    clippy::needless_pass_by_value,
    reason = "callers often own the error and passing by value avoids extra clones"
)]
pub fn figment_error<E: ToString>(err: E) -> figment::Error {
    figment::Error::from(err.to_string())
}
