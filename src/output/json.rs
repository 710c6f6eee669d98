//! JSON output formatting

use crate::output::formatter::Report;
use serde_json::{json, Value};

pub fn format_json(report: &Report<'_>) -> String {
    let data: Value = match report {
        Report::Status {
            status,
            config,
            committed_image,
        } => json!({
            "container": status,
            "config": config,
            "committed_image": committed_image,
        }),
        Report::Containers(containers) => json!({ "containers": containers }),
        Report::Config(config) => serde_json::to_value(config).unwrap_or(json!(null)),
        Report::ConfigChange(change) => serde_json::to_value(change).unwrap_or(json!(null)),
        Report::Committed(image) => json!({ "committed_image": image }),
        Report::Reset { removed } => json!({ "removed": removed }),
    };

    serde_json::to_string_pretty(&data).unwrap_or_else(|_| "{}".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SandboxConfig;
    use crate::container::SandboxStatus;

    #[test]
    fn test_status_json() {
        let status = SandboxStatus::stopped();
        let config = SandboxConfig::default();
        let output = format_json(&Report::Status {
            status: &status,
            config: &config,
            committed_image: Some("localhost/podman-sandbox:committed"),
        });

        let value: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["container"]["status"], "stopped");
        assert_eq!(value["container"]["running"], false);
        assert!(value["container"].get("started_at").is_none());
        assert_eq!(value["config"]["image"], "alpine:latest");
        assert_eq!(value["config"]["memory_limit"], Value::Null);
        assert_eq!(value["committed_image"], "localhost/podman-sandbox:committed");
    }

    #[test]
    fn test_reset_json() {
        let output = format_json(&Report::Reset { removed: false });
        let value: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value, json!({ "removed": false }));
    }
}
