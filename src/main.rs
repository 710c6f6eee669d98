//! podman-sandbox CLI - sandbox shell commands in a Podman container

use anyhow::{bail, Context};
use clap::Parser;
use console::style;
use std::path::PathBuf;

use podman_sandbox::cli::{Args, ConfigureArgs, SubCommand};
use podman_sandbox::{
    format_output, logging, CliEngine, ConfigStore, OutputFormat, Report, Sandbox, SandboxError,
    COMMITTED_IMAGE, WORKSPACE_DIR,
};

fn main() {
    let args = Args::parse();
    logging::init(args.verbose);

    match run(args) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Wrap engine and I/O failures in `context`; state conflicts already
/// explain themselves and are reported as-is
fn failed(context: &'static str) -> impl FnOnce(SandboxError) -> anyhow::Error {
    move |e| {
        if e.is_user_state() {
            anyhow::Error::new(e)
        } else {
            anyhow::Error::new(e).context(context)
        }
    }
}

fn current_dir() -> anyhow::Result<PathBuf> {
    std::env::current_dir().context("Could not determine the current directory")
}

/// Runs the subcommand and returns the process exit code
fn run(args: Args) -> anyhow::Result<i32> {
    let format = if args.json {
        OutputFormat::Json
    } else {
        OutputFormat::Human
    };
    let store = match args.config_dir {
        Some(dir) => ConfigStore::new(dir),
        None => ConfigStore::user_default()?,
    };
    let mut sandbox = Sandbox::new(CliEngine::new(args.engine), store)
        .context("Failed to load configuration")?;

    match args.command {
        SubCommand::Start { image } => {
            if image.is_some() {
                sandbox
                    .configure(None, image, None)
                    .map_err(failed("Failed to update configuration"))?;
            }
            let cwd = current_dir()?;
            sandbox
                .start(&cwd, false)
                .map_err(failed("Failed to start container"))?;

            println!(
                "{}",
                style("✓ Sandbox container started successfully").green().bold()
            );
            println!("  Image: {}", style(sandbox.effective_image()).blue());
            println!(
                "  Working directory: {} (mounted from {})",
                style(WORKSPACE_DIR).cyan(),
                cwd.display()
            );
            if let Some(ref limit) = sandbox.config().memory_limit {
                println!("  Memory limit: {}", style(limit).cyan());
            }
            Ok(0)
        }

        SubCommand::Stop => {
            let outcome = sandbox
                .stop(false)
                .map_err(failed("Failed to stop container"))?;

            if let Some(err) = outcome.commit_error {
                eprintln!(
                    "{} auto-commit failed, container state was not saved: {}",
                    style("Warning:").yellow().bold(),
                    err
                );
            }
            if outcome.committed {
                println!("{}", style("✓ Container state saved automatically").green());
            }
            println!(
                "{}",
                style("✓ Sandbox container stopped successfully").green().bold()
            );
            Ok(0)
        }

        SubCommand::Execute {
            command,
            interactive,
        } => {
            let cwd = current_dir()?;
            let workspace = sandbox
                .workspace()
                .map_err(failed("Failed to execute command"))?;
            if let Some(mounted) = workspace.stale_for(&cwd) {
                eprintln!(
                    "{}",
                    style("Directory changed, restarting container...").yellow()
                );
                eprintln!("  Old: {}", style(mounted.display()).red());
                eprintln!("  New: {}", style(cwd.display()).green());
            }

            // Ctrl-C belongs to the sandboxed command; keep running so its
            // exit status can be forwarded
            if let Err(e) = ctrlc::set_handler(|| {}) {
                tracing::warn!(error = %e, "could not install interrupt handler");
            }

            let code = sandbox
                .execute_in(&workspace, &cwd, &command, interactive, true)
                .map_err(failed("Failed to execute command"))?;
            Ok(code)
        }

        SubCommand::Configure(configure) => run_configure(&mut sandbox, configure, format),

        SubCommand::Status => {
            let status = sandbox.status();
            let committed_image = sandbox.has_committed_image().then_some(COMMITTED_IMAGE);
            let report = Report::Status {
                status: &status,
                config: sandbox.config(),
                committed_image,
            };
            println!("{}", format_output(&report, &format));
            Ok(0)
        }

        SubCommand::List => {
            let containers = sandbox.list_all_containers();
            println!("{}", format_output(&Report::Containers(&containers), &format));
            Ok(0)
        }

        SubCommand::Commit => {
            if format == OutputFormat::Human {
                println!("{}", style("Committing container state...").yellow());
            }
            let image = sandbox
                .commit()
                .map_err(failed("Failed to commit container"))?;
            println!("{}", format_output(&Report::Committed(&image), &format));
            Ok(0)
        }

        SubCommand::Reset => {
            let removed = sandbox.reset().map_err(failed("Failed to reset"))?;
            println!("{}", format_output(&Report::Reset { removed }, &format));
            Ok(0)
        }
    }
}

fn run_configure(
    sandbox: &mut Sandbox<CliEngine>,
    configure: ConfigureArgs,
    format: OutputFormat,
) -> anyhow::Result<i32> {
    if configure.show {
        println!("{}", format_output(&Report::Config(sandbox.config()), &format));
        return Ok(0);
    }

    if !configure.has_changes() {
        bail!(
            "No configuration options provided\n\
             Use --memory, --image, --auto-commit, or --show to view current config"
        );
    }

    let auto_commit = configure.auto_commit_setting();
    let change = sandbox
        .configure(configure.memory, configure.image, auto_commit)
        .context("Failed to update configuration")?;
    println!("{}", format_output(&Report::ConfigChange(&change), &format));

    let human = format == OutputFormat::Human;
    let was_running = sandbox.is_running();

    if was_running && !configure.no_restart {
        if human {
            println!(
                "{}",
                style("Restarting container to apply changes...").yellow()
            );
        }
        let cwd = current_dir()?;
        sandbox.restart(&cwd).context(
            "Failed to restart container; run 'podman-sandbox stop && podman-sandbox start' manually",
        )?;
        if human {
            println!("  {} Container restarted with new configuration", style("✓").green());
            println!();
            println!(
                "{}",
                style("Configuration applied successfully!").green().bold()
            );
        }
    } else if human && was_running {
        println!(
            "{}",
            style("Container is running but --no-restart was specified.").yellow()
        );
        println!("Restart manually to apply changes:");
        println!(
            "  {}",
            style("podman-sandbox stop && podman-sandbox start").cyan()
        );
    } else if human {
        println!(
            "{} Start it to use the new configuration:",
            style("Container is not running.").yellow()
        );
        println!("  {}", style("podman-sandbox start").cyan());
    }

    Ok(0)
}
