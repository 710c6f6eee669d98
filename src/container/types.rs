//! Records observed from the container engine

use bytesize::ByteSize;
use serde::Serialize;

/// Status of the sandbox container
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SandboxStatus {
    /// `not_created`, `stopped`, `error`, or the engine-reported state
    pub status: String,
    pub running: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<String>,
    /// Memory limit as enforced by the engine
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory_limit: Option<String>,
}

impl SandboxStatus {
    pub fn not_created() -> Self {
        Self::inactive("not_created")
    }

    pub fn stopped() -> Self {
        Self::inactive("stopped")
    }

    pub fn error() -> Self {
        Self::inactive("error")
    }

    fn inactive(status: &str) -> Self {
        Self {
            status: status.to_string(),
            running: false,
            started_at: None,
            memory_limit: None,
        }
    }
}

/// One row of the engine's container listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContainerSummary {
    pub name: String,
    pub image: String,
    pub status: String,
    pub created: String,
    pub is_sandbox: bool,
}

impl ContainerSummary {
    pub fn is_running(&self) -> bool {
        let status = self.status.to_lowercase();
        status.contains("running") || status.starts_with("up")
    }
}

/// Render an engine-reported memory limit in bytes; `0` means no limit
pub fn format_memory_limit(raw: &str) -> String {
    let raw = raw.trim();
    match raw.parse::<u64>() {
        Ok(0) => "unlimited".to_string(),
        Ok(bytes) => ByteSize(bytes).to_string_as(true),
        Err(_) if raw.is_empty() => "unlimited".to_string(),
        Err(_) => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_memory_limit() {
        assert_eq!(format_memory_limit("0"), "unlimited");
        assert_eq!(format_memory_limit(""), "unlimited");
        assert_eq!(format_memory_limit("536870912"), "512.0 MiB");
        assert_eq!(format_memory_limit("512m"), "512m");
    }

    #[test]
    fn test_summary_running() {
        let summary = ContainerSummary {
            name: "web".to_string(),
            image: "nginx".to_string(),
            status: "Up 3 minutes".to_string(),
            created: "1 hour ago".to_string(),
            is_sandbox: false,
        };
        assert!(summary.is_running());

        let exited = ContainerSummary {
            status: "Exited (0) 2 minutes ago".to_string(),
            ..summary
        };
        assert!(!exited.is_running());
    }
}
