//! Engine format strings and parsers for their output
//!
//! The engine is asked for pipe-delimited Go templates; everything that
//! interprets that text lives here so the controller only sees records.

use std::path::PathBuf;

use super::types::{format_memory_limit, ContainerSummary, SandboxStatus};

/// `ps` format listing container names only
pub const NAMES_FORMAT: &str = "{{.Names}}";

/// `inspect` format for state, start time and memory limit
pub const STATE_FORMAT: &str = "{{.State.Status}}|{{.State.StartedAt}}|{{.HostConfig.Memory}}";

/// `ps -a` format for the full container listing
pub const LIST_FORMAT: &str = "{{.Names}}|{{.Image}}|{{.Status}}|{{.CreatedAt}}";

/// `inspect` format for the ID of the image a container runs from
pub const IMAGE_ID_FORMAT: &str = "{{.Image}}";

/// `image inspect` format listing an image's tags
pub const REPO_TAGS_FORMAT: &str = "{{.RepoTags}}";

/// `inspect` format printing the host source of the mount at `destination`
pub fn mount_source_format(destination: &str) -> String {
    format!(
        "{{{{range .Mounts}}}}{{{{if eq .Destination \"{}\"}}}}{{{{.Source}}}}{{{{end}}}}{{{{end}}}}",
        destination
    )
}

/// Whether `name` appears as a whole line in `ps --format {{.Names}}` output.
/// The engine's name filter is a pattern match, so prefixes must not count.
pub fn has_name(stdout: &str, name: &str) -> bool {
    stdout.lines().any(|line| line.trim() == name)
}

/// Non-empty names from `ps --format {{.Names}}` output
pub fn parse_names(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Mounted host directory from the mount-source template
pub fn parse_mount_source(stdout: &str) -> Option<PathBuf> {
    let source = stdout.trim();
    if source.is_empty() {
        None
    } else {
        Some(PathBuf::from(source))
    }
}

/// Image ID from `IMAGE_ID_FORMAT` output
pub fn parse_image_id(stdout: &str) -> Option<String> {
    let id = stdout.trim();
    if id.is_empty() {
        None
    } else {
        Some(id.to_string())
    }
}

/// Whether `REPO_TAGS_FORMAT` output lists no tags at all
pub fn is_untagged(stdout: &str) -> bool {
    stdout.trim() == "[]"
}

/// Parse a `STATE_FORMAT` line
pub fn parse_state_line(stdout: &str) -> Option<SandboxStatus> {
    let mut parts = stdout.trim().splitn(3, '|');
    let status = parts.next()?.trim();
    let started_at = parts.next()?.trim();
    let memory = parts.next()?.trim();
    if status.is_empty() {
        return None;
    }

    Some(SandboxStatus {
        status: status.to_string(),
        running: true,
        started_at: Some(started_at.to_string()).filter(|s| !s.is_empty()),
        memory_limit: Some(format_memory_limit(memory)),
    })
}

/// Parse `LIST_FORMAT` output; rows with missing fields are skipped
pub fn parse_container_list(stdout: &str, sandbox_name: &str) -> Vec<ContainerSummary> {
    stdout
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| {
            let parts: Vec<&str> = line.split('|').collect();
            if parts.len() < 4 {
                return None;
            }
            let name = parts[0].trim().to_string();
            Some(ContainerSummary {
                is_sandbox: name == sandbox_name,
                name,
                image: parts[1].trim().to_string(),
                status: parts[2].trim().to_string(),
                created: parts[3].trim().to_string(),
            })
        })
        .collect()
}
