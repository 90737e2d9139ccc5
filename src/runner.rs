//! Running external optimizer binaries.

use async_trait::async_trait;
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

/// A program plus its ordered argument list. Never passed through a shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    program: PathBuf,
    args: Vec<OsString>,
}

impl Invocation {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn get_args(&self) -> &[OsString] {
        &self.args
    }

    /// Lossy string view of the arguments, mostly for logs and assertions.
    pub fn args_lossy(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    pub fn has_arg(&self, arg: &str) -> bool {
        self.args.iter().any(|a| a == arg)
    }

    fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args).stdin(Stdio::null());
        cmd
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum InvocationError {
    #[error("failed to launch {program}: {source}", program = .program.display())]
    Launch {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {status}: {diagnostics}", program = .program.display(), status = display_code(.code))]
    Exit {
        program: PathBuf,
        code: Option<i32>,
        diagnostics: String,
    },
}

fn display_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {code}"),
        None => "no status (killed by signal)".to_string(),
    }
}

/// Executes invocations. Implementations resolve on a zero exit status.
#[async_trait]
pub trait ToolRunner: Send + Sync {
    async fn run(&self, invocation: &Invocation) -> Result<(), InvocationError>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputMode {
    /// Collect stdout and stderr; they become the diagnostics of a failure.
    #[default]
    Captured,
    /// Let the tool write straight to this process's stdout/stderr.
    Inherit,
}

/// Runs invocations as child processes via `tokio::process`.
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner {
    output: OutputMode,
}

impl ProcessRunner {
    pub fn new(output: OutputMode) -> Self {
        Self { output }
    }
}

#[async_trait]
impl ToolRunner for ProcessRunner {
    async fn run(&self, invocation: &Invocation) -> Result<(), InvocationError> {
        let mut cmd = invocation.to_command();
        debug!("Running: {}", invocation);

        let launch_error = |source| InvocationError::Launch {
            program: invocation.program.clone(),
            source,
        };

        let (status, diagnostics) = match self.output {
            OutputMode::Captured => {
                let output = cmd
                    .stdout(Stdio::piped())
                    .stderr(Stdio::piped())
                    .output()
                    .await
                    .map_err(launch_error)?;
                let mut diagnostics = String::from_utf8_lossy(&output.stdout).into_owned();
                diagnostics.push_str(&String::from_utf8_lossy(&output.stderr));
                (output.status, diagnostics.trim().to_string())
            }
            OutputMode::Inherit => {
                let status = cmd.status().await.map_err(launch_error)?;
                (status, String::new())
            }
        };

        if !status.success() {
            return Err(InvocationError::Exit {
                program: invocation.program.clone(),
                code: status.code(),
                diagnostics,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invocation_display() {
        let invocation = Invocation::new("/opt/tools/optipng")
            .args(["-force", "-o6"])
            .arg("in.png");
        assert_eq!(invocation.to_string(), "/opt/tools/optipng -force -o6 in.png");
        assert!(invocation.has_arg("-o6"));
        assert!(!invocation.has_arg("-o7"));
    }

    #[tokio::test]
    async fn test_launch_failure() {
        let runner = ProcessRunner::default();
        let invocation = Invocation::new("/nonexistent/png-squeeze-tool");
        let err = runner.run(&invocation).await.unwrap_err();
        assert!(matches!(err, InvocationError::Launch { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_exit_status_carries_diagnostics() {
        let runner = ProcessRunner::default();
        let invocation = Invocation::new("/bin/sh").args(["-c", "echo broken chunk >&2; exit 4"]);
        match runner.run(&invocation).await.unwrap_err() {
            InvocationError::Exit {
                code, diagnostics, ..
            } => {
                assert_eq!(code, Some(4));
                assert_eq!(diagnostics, "broken chunk");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_zero_exit_succeeds() {
        let runner = ProcessRunner::new(OutputMode::Inherit);
        let invocation = Invocation::new("/bin/sh").args(["-c", "exit 0"]);
        assert!(runner.run(&invocation).await.is_ok());
    }
}
