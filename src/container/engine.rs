//! Invocation of the external container engine CLI

use std::process::{Command, ExitStatus, Stdio};
use tracing::debug;

use crate::error::{Result, SandboxError};

/// Engine program used when none is configured
pub const DEFAULT_ENGINE: &str = "podman";

/// Captured result of a non-interactive engine call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineOutput {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl EngineOutput {
    /// Best description of why the call failed
    pub fn failure_message(&self) -> String {
        let stderr = self.stderr.trim();
        if !stderr.is_empty() {
            return stderr.to_string();
        }
        let stdout = self.stdout.trim();
        if !stdout.is_empty() {
            return stdout.to_string();
        }
        match self.code {
            Some(code) => format!("exited with status {}", code),
            None => "terminated by signal".to_string(),
        }
    }
}

/// A program implementing the podman-style container CLI contract
/// (`ps`, `inspect`, `run`, `exec`, `stop`, `rm`, `rmi`, `commit`, `pull`,
/// `image exists`).
pub trait ContainerEngine {
    /// Run the engine with captured output
    fn output(&self, args: &[&str]) -> Result<EngineOutput>;

    /// Run the engine attached to this process's stdio and return its exit code
    fn run_attached(&self, args: &[&str]) -> Result<i32>;
}

/// Engine backed by an executable on `PATH`
#[derive(Debug, Clone)]
pub struct CliEngine {
    program: String,
}

impl CliEngine {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn unavailable(&self, source: std::io::Error) -> SandboxError {
        SandboxError::EngineUnavailable {
            program: self.program.clone(),
            source,
        }
    }
}

impl Default for CliEngine {
    fn default() -> Self {
        Self::new(DEFAULT_ENGINE)
    }
}

impl ContainerEngine for CliEngine {
    fn output(&self, args: &[&str]) -> Result<EngineOutput> {
        debug!(program = %self.program, ?args, "engine call");
        let output = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| self.unavailable(e))?;

        let result = EngineOutput {
            success: output.status.success(),
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        if !result.success {
            debug!(code = ?result.code, stderr = %result.stderr.trim(), "engine call failed");
        }
        Ok(result)
    }

    fn run_attached(&self, args: &[&str]) -> Result<i32> {
        debug!(program = %self.program, ?args, "attached engine call");
        let status = Command::new(&self.program)
            .args(args)
            .status()
            .map_err(|e| self.unavailable(e))?;
        Ok(exit_code(status))
    }
}

/// Exit code of a finished process; signal terminations map to 128 + signal
pub fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_message_prefers_stderr() {
        let output = EngineOutput {
            success: false,
            code: Some(125),
            stdout: "ignored".to_string(),
            stderr: "Error: no such container\n".to_string(),
        };
        assert_eq!(output.failure_message(), "Error: no such container");
    }

    #[test]
    fn test_failure_message_falls_back_to_status() {
        let output = EngineOutput {
            success: false,
            code: Some(2),
            ..Default::default()
        };
        assert_eq!(output.failure_message(), "exited with status 2");
    }

    #[test]
    fn test_missing_program_is_unavailable() {
        let engine = CliEngine::new("podman-sandbox-test-no-such-engine");
        let result = engine.output(&["ps"]);
        assert!(matches!(
            result,
            Err(SandboxError::EngineUnavailable { ref program, .. })
                if program == "podman-sandbox-test-no-such-engine"
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_attached_exit_code_is_forwarded() {
        let engine = CliEngine::new("sh");
        assert_eq!(engine.run_attached(&["-c", "exit 42"]).unwrap(), 42);
        assert_eq!(engine.run_attached(&["-c", "true"]).unwrap(), 0);
    }

    #[cfg(unix)]
    #[test]
    fn test_signal_exit_code() {
        let engine = CliEngine::new("sh");
        assert_eq!(engine.run_attached(&["-c", "kill -9 $$"]).unwrap(), 137);
    }

    #[cfg(unix)]
    #[test]
    fn test_output_captures_stdout() {
        let engine = CliEngine::new("sh");
        let output = engine.output(&["-c", "echo podman-sandbox"]).unwrap();
        assert!(output.success);
        assert_eq!(output.stdout.trim(), "podman-sandbox");
    }
}
