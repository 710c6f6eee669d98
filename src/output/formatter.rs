//! Output formatting

use crate::config::{ConfigChange, SandboxConfig};
use crate::container::{ContainerSummary, SandboxStatus};
use crate::output::human::format_human;
use crate::output::json::format_json;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Human,
    Json,
}

/// Something a subcommand reports back to the user
#[derive(Debug, Clone, Copy)]
pub enum Report<'a> {
    Status {
        status: &'a SandboxStatus,
        config: &'a SandboxConfig,
        committed_image: Option<&'a str>,
    },
    Containers(&'a [ContainerSummary]),
    Config(&'a SandboxConfig),
    ConfigChange(&'a ConfigChange),
    Committed(&'a str),
    /// Outcome of `reset`; `removed` is false when there was no saved state
    Reset { removed: bool },
}

pub fn format_output(report: &Report<'_>, format: &OutputFormat) -> String {
    match format {
        OutputFormat::Human => format_human(report),
        OutputFormat::Json => format_json(report),
    }
}
