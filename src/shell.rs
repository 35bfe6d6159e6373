//! External command execution with dry-run support
use crate::error::AliasError;
use anyhow::{Context, Result};
use log::{debug, trace};
use std::process::Command;

/// Command fragments which never change any state
const READ_ONLY_PATTERNS: &[&str] = &[
    "kubectl get",
    "kubectl describe",
    "hostname -I",
    "ip -j addr show",
    "which ",
];

/// Characters chaining or redirecting commands, making any line unsafe to run
/// in dry-run mode
const SHELL_OPERATORS: &[char] = &[';', '&', '|', '`', '$', '<', '>', '\n'];

/// How mutations are carried out
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    /// Execute everything
    #[default]
    Live,

    /// Execute only read-only commands and print everything else
    DryRun,
}

impl Mode {
    /// Returns true if running in dry-run mode
    pub fn is_dry(self) -> bool {
        self == Mode::DryRun
    }
}

/// The captured result of a command
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Output {
    /// The exit code, `-1` if terminated by a signal
    pub code: i32,
    /// Captured standard output
    pub stdout: String,
    /// Captured standard error
    pub stderr: String,
}

impl Output {
    /// Returns true if the command exited with status zero
    pub fn success(&self) -> bool {
        self.code == 0
    }
}

/// The substrate which actually spawns processes
pub trait Runner {
    /// Execute a shell command line and capture its output
    fn execute(&self, command: &str) -> Result<Output>;
}

/// Runs commands through `sh -c`
pub struct SystemRunner;

impl Runner for SystemRunner {
    fn execute(&self, command: &str) -> Result<Output> {
        let output = Command::new("sh")
            .arg("-c")
            .arg(command)
            .output()
            .with_context(|| format!("Unable to spawn command '{}'", command))?;
        Ok(Output {
            code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// The execution shim every component issues its commands through
pub struct Shell {
    mode: Mode,
    runner: Box<dyn Runner>,
}

impl Shell {
    /// Create a new shell spawning real processes
    pub fn new(mode: Mode) -> Self {
        Self::with_runner(mode, Box::new(SystemRunner))
    }

    /// Create a new shell on top of the provided runner
    pub fn with_runner(mode: Mode, runner: Box<dyn Runner>) -> Self {
        Self { mode, runner }
    }

    /// The execution mode of this shell
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Returns true if the command cannot change any state
    pub fn is_read_only(command: &str) -> bool {
        !command.contains(SHELL_OPERATORS)
            && READ_ONLY_PATTERNS.iter().any(|p| command.contains(p))
    }

    /// Run a command and return its output regardless of the exit status.
    ///
    /// In dry-run mode mutating commands are only printed and a successful
    /// empty output is returned, while a failing read-only command aborts the
    /// whole run.
    pub fn run(&self, command: &str) -> Result<Output> {
        let read_only = Self::is_read_only(command);

        if self.mode.is_dry() {
            if !read_only {
                println!("[DRY RUN] Would execute command:\n  {}\n", command);
                return Ok(Output::default());
            }
            println!("[DRY RUN] Executing read-only command:\n  {}\n", command);
        }

        trace!("Running command: {}", command);
        let output = self.runner.execute(command)?;
        if !output.success() {
            debug!("Command '{}' exited with {}", command, output.code);
            debug!("stderr: {}", output.stderr.trim());
            if self.mode.is_dry() && read_only {
                return Err(AliasError::DryRunRead {
                    command: command.into(),
                    stderr: output.stderr.trim().into(),
                }
                .into());
            }
        }
        Ok(output)
    }

    /// Run a command and fail if it exits non-zero
    pub fn run_checked(&self, command: &str) -> Result<Output> {
        let output = self.run(command)?;
        if !output.success() {
            return Err(AliasError::Mutation {
                command: command.into(),
                stderr: output.stderr.trim().into(),
            }
            .into());
        }
        Ok(output)
    }
}
