//! Subprocess execution utilities.

use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::io::{BufRead, BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use std::thread;

use anyhow::{bail, Context, Result};

use crate::util::shell::INDENT;

/// Builder for subprocess execution.
#[derive(Debug, Clone)]
pub struct ProcessBuilder {
    program: PathBuf,
    args: Vec<String>,
    env: BTreeMap<String, String>,
    cwd: Option<PathBuf>,
}

impl ProcessBuilder {
    /// Create a new process builder for the given program.
    pub fn new(program: impl AsRef<Path>) -> Self {
        ProcessBuilder {
            program: program.as_ref().to_path_buf(),
            args: Vec::new(),
            env: BTreeMap::new(),
            cwd: None,
        }
    }

    /// Add a single argument.
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_string_lossy().into_owned());
        self
    }

    /// Add multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args.extend(
            args.into_iter()
                .map(|s| s.as_ref().to_string_lossy().into_owned()),
        );
        self
    }

    /// Set an environment variable on top of the inherited environment.
    pub fn env(mut self, key: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        self.env
            .insert(key.as_ref().to_string(), value.as_ref().to_string());
        self
    }

    /// Set the working directory.
    pub fn cwd(mut self, cwd: impl AsRef<Path>) -> Self {
        self.cwd = Some(cwd.as_ref().to_path_buf());
        self
    }

    /// Get the program path.
    pub fn get_program(&self) -> &Path {
        &self.program
    }

    /// Get the arguments.
    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    /// Get an environment override, if set.
    pub fn get_env(&self, key: &str) -> Option<&str> {
        self.env.get(key).map(String::as_str)
    }

    /// Get the working directory, if set.
    pub fn get_cwd(&self) -> Option<&Path> {
        self.cwd.as_deref()
    }

    fn build_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);

        for (key, value) in &self.env {
            cmd.env(key, value);
        }

        if let Some(ref cwd) = self.cwd {
            cmd.current_dir(cwd);
        }

        cmd
    }

    /// Execute, echoing every output line indented under the current step,
    /// and require success.
    pub fn exec_indented(&self) -> Result<ExitStatus> {
        let mut cmd = self.build_command();
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        let mut child = cmd
            .spawn()
            .with_context(|| format!("failed to spawn `{}`", self.program.display()))?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        let out_thread = stdout.map(|out| thread::spawn(move || relay(out, std::io::stdout())));
        let err_thread = stderr.map(|err| thread::spawn(move || relay(err, std::io::stderr())));

        let status = child
            .wait()
            .with_context(|| format!("failed to wait for `{}`", self.program.display()))?;

        for handle in [out_thread, err_thread].into_iter().flatten() {
            if handle.join().is_err() {
                tracing::warn!("output relay for `{}` panicked", self.display_command());
            }
        }

        if !status.success() {
            bail!(
                "`{}` failed with exit code {:?}",
                self.display_command(),
                status.code()
            );
        }
        Ok(status)
    }

    /// Display the command for error messages.
    pub fn display_command(&self) -> String {
        let mut parts = vec![self.program.display().to_string()];
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }
}

fn relay(source: impl Read, mut sink: impl Write) {
    let reader = BufReader::new(source);
    for line in reader.lines().map_while(|l| l.ok()) {
        let _ = writeln!(sink, "{}{}", INDENT, line);
    }
}

/// Runs external build commands.
///
/// The finalize pipeline only talks to this trait so tests can record
/// commands instead of invoking the SDK.
pub trait CommandRunner {
    fn run(&self, cmd: &ProcessBuilder) -> Result<()>;
}

/// Runs commands for real, relaying their output into the build log.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl CommandRunner for ProcessRunner {
    fn run(&self, cmd: &ProcessBuilder) -> Result<()> {
        tracing::debug!("running command: {}", cmd.display_command());
        let program = cmd.get_program();
        if program.components().count() == 1 {
            let name = program.to_string_lossy();
            if find_executable(&name).is_none() {
                bail!("`{}` not found on PATH", name);
            }
        }
        cmd.exec_indented()?;
        Ok(())
    }
}

/// Find an executable in PATH.
pub fn find_executable(name: &str) -> Option<PathBuf> {
    which::which(name).ok()
}
