//! Command execution primitives with consistent error handling.

use serde::Serialize;
use std::path::Path;
use std::process::{Command, Output};

use crate::error::{Error, Result};

/// Captured output from command execution.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CapturedOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    pub success: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub stdout: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub stderr: String,
}

impl CapturedOutput {
    /// True when the process exited cleanly and wrote nothing to stderr.
    pub fn is_clean(&self) -> bool {
        self.success && self.stderr.trim().is_empty()
    }
}

impl From<Output> for CapturedOutput {
    fn from(output: Output) -> Self {
        Self {
            exit_code: output.status.code(),
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        }
    }
}

/// Run a command to completion in `dir`, capturing stdout and stderr.
///
/// Only a failure to spawn is an error; exit status is left to the caller.
pub fn run_captured(program: &str, args: &[String], dir: &Path, context: &str) -> Result<CapturedOutput> {
    let output = Command::new(program)
        .args(args)
        .current_dir(dir)
        .output()
        .map_err(|e| {
            Error::internal_io(
                format!("Failed to run {}: {}", context, e),
                Some(context.to_string()),
            )
        })?;

    Ok(output.into())
}

/// Render a command line for logs and error details.
pub fn display_command(program: &str, args: &[String]) -> String {
    std::iter::once(program.to_string())
        .chain(args.iter().cloned())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Extract error text from captured output.
///
/// Prefers stderr, falls back to stdout if stderr is empty.
pub fn error_text(output: &CapturedOutput) -> String {
    if !output.stderr.trim().is_empty() {
        output.stderr.trim().to_string()
    } else {
        output.stdout.trim().to_string()
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str) -> Vec<String> {
        vec!["-c".to_string(), script.to_string()]
    }

    #[test]
    fn run_captured_collects_stdout() {
        let out = run_captured("sh", &sh("echo hello"), Path::new("/tmp"), "echo test").unwrap();
        assert!(out.is_clean());
        assert_eq!(out.stdout.trim(), "hello");
    }

    #[test]
    fn stderr_output_is_not_clean_even_on_success() {
        let out = run_captured("sh", &sh("echo warn >&2"), Path::new("/tmp"), "stderr test").unwrap();
        assert!(out.success);
        assert!(!out.is_clean());
        assert_eq!(error_text(&out), "warn");
    }

    #[test]
    fn non_zero_exit_is_captured() {
        let out = run_captured("sh", &sh("exit 3"), Path::new("/tmp"), "exit test").unwrap();
        assert_eq!(out.exit_code, Some(3));
        assert!(!out.is_clean());
    }

    #[test]
    fn missing_program_is_an_error() {
        let result = run_captured("nonexistent_command_xyz", &[], Path::new("/tmp"), "test");
        assert!(result.is_err());
    }

    #[test]
    fn display_command_joins_arguments() {
        let args = vec!["-jar".to_string(), "1.21.jar".to_string()];
        assert_eq!(display_command("java", &args), "java -jar 1.21.jar");
    }
}
