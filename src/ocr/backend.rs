//! Subprocess plumbing shared by the rasterizer, the image converter, and the
//! OCR engine.
//!
//! Every external tool is reached through a [`ToolRunner`], so the page
//! pipeline can be driven against real binaries or a scripted fake.

use std::ffi::{OsStr, OsString};
use std::fmt;

use async_trait::async_trait;
use thiserror::Error;

/// Errors from external tools.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("{0} not found on PATH")]
    NotAvailable(String),

    #[error("{tool} failed: {stderr}")]
    Failed { tool: String, stderr: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A single command line to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<OsString>,
}

impl Invocation {
    pub fn new(program: impl Into<String>) -> Self {
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
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

/// Captured result of a finished tool.
#[derive(Debug, Clone, Default)]
pub struct ToolOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    /// Reject the output if the tool exited badly or wrote anything to its
    /// error stream other than lines starting with one of `informational`.
    pub fn into_checked(self, tool: &str, informational: &[String]) -> Result<Self, ToolError> {
        let unexpected: Vec<&str> = self
            .stderr
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter(|line| !informational.iter().any(|p| line.starts_with(p.as_str())))
            .collect();

        if !unexpected.is_empty() {
            return Err(ToolError::Failed {
                tool: tool.to_string(),
                stderr: unexpected.join("\n"),
            });
        }
        if !self.success {
            return Err(ToolError::Failed {
                tool: tool.to_string(),
                stderr: "exited with a failure status".to_string(),
            });
        }
        Ok(self)
    }
}

/// Executes external tools.
#[async_trait]
pub trait ToolRunner: Send + Sync {
    async fn run(&self, invocation: &Invocation) -> Result<ToolOutput, ToolError>;
}

/// Runs tools as child processes and waits for each to finish.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandRunner;

#[async_trait]
impl ToolRunner for CommandRunner {
    async fn run(&self, invocation: &Invocation) -> Result<ToolOutput, ToolError> {
        tracing::debug!("Running {}", invocation);

        let mut command = tokio::process::Command::new(&invocation.program);
        command.args(&invocation.args);
        // Own process group: a terminal Ctrl-C reaches scanshelf only, which
        // stops between publications instead of killing the tool mid-page.
        #[cfg(unix)]
        command.process_group(0);

        let output = command.output().await;

        match output {
            Ok(output) => Ok(ToolOutput {
                success: output.status.success(),
                stdout: String::from_utf8_lossy(&output.stdout).to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(ToolError::NotAvailable(invocation.program.clone()))
            }
            Err(e) => Err(ToolError::Io(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(success: bool, stderr: &str) -> ToolOutput {
        ToolOutput {
            success,
            stdout: String::new(),
            stderr: stderr.to_string(),
        }
    }

    #[test]
    fn test_clean_output_passes() {
        assert!(output(true, "").into_checked("convert", &[]).is_ok());
    }

    #[test]
    fn test_any_stderr_is_fatal() {
        let err = output(true, "convert: unable to open image\n")
            .into_checked("convert", &[])
            .unwrap_err();
        match err {
            ToolError::Failed { tool, stderr } => {
                assert_eq!(tool, "convert");
                assert!(stderr.contains("unable to open image"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_informational_lines_are_ignored() {
        let informational = vec!["Detected".to_string()];
        let checked = output(true, "Detected 12 diacritics\n")
            .into_checked("tesseract", &informational);
        assert!(checked.is_ok());

        let mixed = output(true, "Detected 12 diacritics\nError opening data file\n")
            .into_checked("tesseract", &informational);
        assert!(mixed.is_err());
    }

    #[test]
    fn test_failure_status_is_fatal() {
        assert!(output(false, "").into_checked("pdftoppm", &[]).is_err());
    }

    #[test]
    fn test_invocation_display() {
        let inv = Invocation::new("tesseract").arg("in.png").args(["out"]);
        assert_eq!(inv.to_string(), "tesseract in.png out");
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn test_tools_run_in_their_own_process_group() {
        let inv = Invocation::new("sh").args(["-c", "cat /proc/$$/stat"]);
        let output = CommandRunner.run(&inv).await.unwrap();
        assert!(output.success);

        // Fields 1 and 5 of /proc/<pid>/stat are the pid and the process group.
        let fields: Vec<&str> = output.stdout.split_whitespace().collect();
        assert_eq!(fields[0], fields[4]);
    }

    #[tokio::test]
    async fn test_missing_binary_is_not_available() {
        let inv = Invocation::new("scanshelf-no-such-binary-xyz");
        let err = CommandRunner.run(&inv).await.unwrap_err();
        assert!(matches!(err, ToolError::NotAvailable(_)));
    }
}
