//! Human-readable output formatting

use console::style;

use crate::config::{ConfigChange, SandboxConfig};
use crate::container::{ContainerSummary, SandboxStatus};
use crate::output::formatter::Report;

pub fn format_human(report: &Report<'_>) -> String {
    match report {
        Report::Status {
            status,
            config,
            committed_image,
        } => format_status(status, config, *committed_image),
        Report::Containers(containers) => format_containers(containers),
        Report::Config(config) => {
            format!("{}\n{}", style("Current configuration:").bold(), config_lines(config))
        }
        Report::ConfigChange(change) => format_change(change),
        Report::Committed(image) => format!(
            "{}\n\n\
             The container will now use this saved state when restarted.\n\
             To revert to the base image, run: {}",
            style(format!("✓ Container state saved to: {}", image))
                .green()
                .bold(),
            style("podman-sandbox reset").cyan()
        ),
        Report::Reset { removed: false } => style("No saved state found").yellow().to_string(),
        Report::Reset { removed: true } => format!(
            "{}\n\nThe container will use the base image on next start.",
            style("✓ Saved state removed").green().bold()
        ),
    }
}

fn enabled(flag: bool) -> String {
    if flag {
        style("enabled").green().to_string()
    } else {
        style("disabled").yellow().to_string()
    }
}

fn config_lines(config: &SandboxConfig) -> String {
    format!(
        "  Image: {}\n  Memory limit: {}\n  Auto-commit: {}",
        style(&config.image).blue(),
        style(config.memory_limit_display()).blue(),
        enabled(config.auto_commit)
    )
}

fn format_status(
    status: &SandboxStatus,
    config: &SandboxConfig,
    committed_image: Option<&str>,
) -> String {
    let (status_color, running) = if status.running {
        (style(&status.status).green(), style("yes").green())
    } else {
        (style(&status.status).yellow(), style("no").red())
    };

    let mut output = format!(
        "{}\n  Status: {}\n  Running: {}\n",
        style("Sandbox container status:").bold(),
        status_color,
        running
    );
    if let Some(ref started_at) = status.started_at {
        output.push_str(&format!("  Started at: {}\n", style(started_at).cyan()));
    }
    if let Some(ref memory_limit) = status.memory_limit {
        output.push_str(&format!("  Memory limit: {}\n", style(memory_limit).cyan()));
    }

    output.push_str(&format!(
        "\n{}\n{}\n",
        style("Configuration:").bold(),
        config_lines(config)
    ));
    match committed_image {
        Some(image) => output.push_str(&format!("  Saved state: {}", style(image).green())),
        None => output.push_str(&format!("  Saved state: {}", style("none").dim())),
    }
    output
}

fn format_containers(containers: &[ContainerSummary]) -> String {
    if containers.is_empty() {
        return style("No containers found.").yellow().to_string();
    }

    let mut output = format!("{}\n", style("All Podman containers:").bold());
    for container in containers {
        let marker = if container.is_sandbox {
            format!(" {}", style("[SANDBOX]").green().bold())
        } else {
            String::new()
        };
        let status = if container.is_running() {
            style(&container.status).green()
        } else {
            style(&container.status).yellow()
        };
        output.push_str(&format!(
            "\n  {}{}\n    Image:   {}\n    Status:  {}\n    Created: {}\n",
            style(&container.name).cyan().bold(),
            marker,
            style(&container.image).blue(),
            status,
            container.created
        ));
    }
    output
}

fn diff_line(label: &str, old: &str, new: &str) -> String {
    if old == new {
        format!(
            "  {} {} {}\n",
            label,
            style(new).blue(),
            style("(unchanged)").dim()
        )
    } else {
        format!(
            "  {}\n    {} {}\n    {} {}\n",
            style(label).bold(),
            style("-").red(),
            style(old).red(),
            style("+").green(),
            style(new).green()
        )
    }
}

fn format_change(change: &ConfigChange) -> String {
    let status = |flag: bool| if flag { "enabled" } else { "disabled" };

    let mut output = format!("{}\n\n", style("Configuration changes:").bold());
    output.push_str(&diff_line("Image:", &change.old.image, &change.new.image));
    output.push_str(&diff_line(
        "Memory limit:",
        change.old.memory_limit_display(),
        change.new.memory_limit_display(),
    ));
    output.push_str(&diff_line(
        "Auto-commit:",
        status(change.old.auto_commit),
        status(change.new.auto_commit),
    ));
    output
}
