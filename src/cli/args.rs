//! CLI argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{non_blank, CONFIG_DIR_ENV};
use crate::container::DEFAULT_ENGINE;

#[derive(Parser, Debug)]
#[command(name = "podman-sandbox")]
#[command(author, version, about = "Easily sandbox code execution in Podman containers", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: SubCommand,

    /// Output format as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Directory holding config.json (default: ~/.config/podman-sandbox)
    #[arg(long, global = true, env = CONFIG_DIR_ENV, value_name = "DIR")]
    pub config_dir: Option<PathBuf>,

    /// Container engine executable
    #[arg(long, global = true, env = "PODMAN_SANDBOX_ENGINE", default_value = DEFAULT_ENGINE)]
    pub engine: String,
}

#[derive(Subcommand, Debug)]
pub enum SubCommand {
    /// Start the sandbox container
    Start {
        /// Container image to use (default: alpine:latest)
        #[arg(long)]
        image: Option<String>,
    },

    /// Stop the sandbox container, saving its state first if auto-commit is enabled
    Stop,

    /// Execute a command in the sandbox container
    ///
    /// The container is remounted automatically if you have changed directories.
    Execute {
        /// Shell command to run inside the container
        command: String,

        /// Run in interactive mode
        #[arg(short, long)]
        interactive: bool,
    },

    /// Configure sandbox container settings
    Configure(ConfigureArgs),

    /// Show sandbox container status
    Status,

    /// List all containers and identify the sandbox container
    List,

    /// Save the current container state to preserve installed packages
    Commit,

    /// Remove saved container state and revert to the base image
    Reset,
}

#[derive(clap::Args, Debug)]
pub struct ConfigureArgs {
    /// Set memory limit (e.g. '512m', '1g')
    #[arg(short, long)]
    pub memory: Option<String>,

    /// Set container image (e.g. 'python:3.11-alpine')
    #[arg(long)]
    pub image: Option<String>,

    /// Enable auto-commit on stop
    #[arg(long, conflicts_with = "no_auto_commit")]
    pub auto_commit: bool,

    /// Disable auto-commit on stop
    #[arg(long)]
    pub no_auto_commit: bool,

    /// Show current configuration
    #[arg(long)]
    pub show: bool,

    /// Don't restart the container automatically
    #[arg(long)]
    pub no_restart: bool,
}

impl ConfigureArgs {
    /// Requested auto-commit setting; `None` leaves it unchanged
    pub fn auto_commit_setting(&self) -> Option<bool> {
        if self.auto_commit {
            Some(true)
        } else if self.no_auto_commit {
            Some(false)
        } else {
            None
        }
    }

    pub fn has_changes(&self) -> bool {
        non_blank(self.memory.clone()).is_some()
            || non_blank(self.image.clone()).is_some()
            || self.auto_commit_setting().is_some()
    }
}
