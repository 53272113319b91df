//! A scriptable stand-in for the host toolchain.
//!
//! The fake is a POSIX shell script run through `sh`, so tests never execute
//! a file they have just written. Each invocation appends its working
//! directory and arguments to a log, copies the last argument (the launcher)
//! aside for inspection, prints a canned payload to stdout and exits with a
//! chosen status.
//!
//! # Examples
//!
//! ```no_run
//! use test_helpers::fake_toolchain::FakeToolchain;
//!
//! let fake = FakeToolchain::emitting("fn generated() {}\n").expect("fake toolchain");
//! assert_eq!(fake.program(), "sh");
//! assert!(fake.invocations().expect("read log").is_empty());
//! ```

use std::fs;

use anyhow::{Context, Result, anyhow};
use camino::{Utf8Path, Utf8PathBuf};
use tempfile::TempDir;

const SCRIPT: &str = "toolchain.sh";
const PAYLOAD: &str = "stdout.txt";
const LOG: &str = "invocations.log";
const LAUNCHER_COPY: &str = "launcher.rs";

/// One recorded run of the fake toolchain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Working directory the toolchain was started in.
    pub cwd: Utf8PathBuf,
    /// Arguments after the script path.
    pub args: Vec<String>,
}

/// Fake toolchain living in its own temporary directory.
#[derive(Debug)]
pub struct FakeToolchain {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl FakeToolchain {
    /// Creates a fake that prints `stdout` and succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if the script or payload cannot be written.
    pub fn emitting(stdout: &str) -> Result<Self> {
        Self::build(stdout, 0)
    }

    /// Creates a fake that prints nothing and exits with `status`.
    ///
    /// # Errors
    ///
    /// Returns an error if the script cannot be written.
    pub fn failing(status: i32) -> Result<Self> {
        Self::build("", status)
    }

    fn build(stdout: &str, status: i32) -> Result<Self> {
        let dir = tempfile::tempdir().context("create fake toolchain dir")?;
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf())
            .map_err(|path| anyhow!("fake toolchain dir is not UTF-8: {}", path.display()))?;
        fs::write(root.join(PAYLOAD), stdout).context("write fake toolchain payload")?;
        fs::write(root.join(SCRIPT), script(&root, status)).context("write fake toolchain")?;
        Ok(Self { _dir: dir, root })
    }

    /// Program to configure as the toolchain.
    #[must_use]
    pub const fn program(&self) -> &'static str {
        "sh"
    }

    /// Run verb to configure: the script path followed by `run`.
    #[must_use]
    pub fn run_verb(&self) -> Vec<String> {
        vec![self.root.join(SCRIPT).into_string(), "run".to_owned()]
    }

    /// Directory holding the script, its log and the launcher copy.
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Invocations recorded so far, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the log exists but cannot be read.
    pub fn invocations(&self) -> Result<Vec<Invocation>> {
        let path = self.root.join(LOG);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let log = fs::read_to_string(&path).with_context(|| format!("read {path}"))?;
        Ok(parse_log(&log))
    }

    /// Contents of the launcher passed to the most recent invocation.
    ///
    /// # Errors
    ///
    /// Returns an error if the fake has not run or the copy is unreadable.
    pub fn last_launcher(&self) -> Result<String> {
        let path = self.root.join(LAUNCHER_COPY);
        fs::read_to_string(&path).with_context(|| format!("read {path}"))
    }
}

fn script(root: &Utf8Path, status: i32) -> String {
    format!(
        concat!(
            "#!/bin/sh\n",
            "root='{root}'\n",
            "{{\n",
            "  printf 'cwd=%s\\n' \"$(pwd)\"\n",
            "  for arg in \"$@\"; do printf 'arg=%s\\n' \"$arg\"; done\n",
            "  printf 'end\\n'\n",
            "}} >> \"$root/{log}\"\n",
            "last=''\n",
            "for last in \"$@\"; do :; done\n",
            "[ -f \"$last\" ] && cp \"$last\" \"$root/{launcher}\"\n",
            "cat \"$root/{payload}\"\n",
            "exit {status}\n",
        ),
        root = root,
        log = LOG,
        launcher = LAUNCHER_COPY,
        payload = PAYLOAD,
        status = status,
    )
}

fn parse_log(log: &str) -> Vec<Invocation> {
    let mut invocations = Vec::new();
    let mut cwd = Utf8PathBuf::new();
    let mut args = Vec::new();
    for line in log.lines() {
        if let Some(dir) = line.strip_prefix("cwd=") {
            cwd = Utf8PathBuf::from(dir);
        } else if let Some(arg) = line.strip_prefix("arg=") {
            args.push(arg.to_owned());
        } else if line == "end" {
            invocations.push(Invocation {
                cwd: std::mem::take(&mut cwd),
                args: std::mem::take(&mut args),
            });
        }
    }
    invocations
}
