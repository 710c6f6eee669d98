//! Sandbox controller
//!
//! Owns the single well-known container and combines the stored
//! configuration with engine calls to implement the lifecycle operations.
//! Every call is blocking and strictly sequential.

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::config::{ConfigChange, ConfigStore, SandboxConfig};
use crate::container::format::{
    self, IMAGE_ID_FORMAT, LIST_FORMAT, NAMES_FORMAT, REPO_TAGS_FORMAT, STATE_FORMAT,
};
use crate::container::{ContainerEngine, ContainerSummary, EngineOutput, SandboxStatus};
use crate::error::{Result, SandboxError};

/// Name of the sandbox container
pub const CONTAINER_NAME: &str = "podman-sandbox";

/// Image holding the committed container state
pub const COMMITTED_IMAGE: &str = "localhost/podman-sandbox:committed";

/// Mount point of the host directory inside the container
pub const WORKSPACE_DIR: &str = "/workspace";

/// Process that keeps the container alive between `execute` calls
const KEEPALIVE: [&str; 2] = ["sleep", "infinity"];

/// Result of [`Sandbox::stop`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StopOutcome {
    /// State was committed before stopping
    pub committed: bool,
    /// Auto-commit was attempted and failed; the container was stopped anyway
    pub commit_error: Option<String>,
}

/// Workspace mount of the running container, read once per `execute`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Workspace {
    mounted: Option<PathBuf>,
}

impl Workspace {
    pub fn mounted(&self) -> Option<&Path> {
        self.mounted.as_deref()
    }

    /// Mounted directory if it is not `cwd`
    pub fn stale_for(&self, cwd: &Path) -> Option<&Path> {
        self.mounted().filter(|mounted| *mounted != cwd)
    }
}

/// Controller for the sandbox container
pub struct Sandbox<E> {
    engine: E,
    store: ConfigStore,
    config: SandboxConfig,
}

impl<E: ContainerEngine> Sandbox<E> {
    /// Create a controller, loading the configuration from `store`
    pub fn new(engine: E, store: ConfigStore) -> Result<Self> {
        let config = store.load()?;
        Ok(Self {
            engine,
            store,
            config,
        })
    }

    pub fn config(&self) -> &SandboxConfig {
        &self.config
    }

    /// Update and persist the configuration
    pub fn configure(
        &mut self,
        memory_limit: Option<String>,
        image: Option<String>,
        auto_commit: Option<bool>,
    ) -> Result<ConfigChange> {
        let change = self.store.configure(memory_limit, image, auto_commit)?;
        self.config = change.new.clone();
        info!(config = ?self.config, "configuration updated");
        Ok(change)
    }

    // --- Queries (best-effort) ---

    /// Run an engine query, treating any failure as "no answer"
    fn query(&self, args: &[&str]) -> Option<String> {
        match self.engine.output(args) {
            Ok(output) if output.success => Some(output.stdout),
            Ok(output) => {
                debug!(?args, error = %output.failure_message(), "engine query failed");
                None
            }
            Err(e) => {
                warn!(?args, error = %e, "engine query failed");
                None
            }
        }
    }

    /// Whether the sandbox container is running
    pub fn is_running(&self) -> bool {
        let filter = format!("name={}", CONTAINER_NAME);
        self.query(&["ps", "--filter", filter.as_str(), "--format", NAMES_FORMAT])
            .is_some_and(|stdout| format::has_name(&stdout, CONTAINER_NAME))
    }

    /// Whether the sandbox container exists, running or stopped
    pub fn exists(&self) -> bool {
        let filter = format!("name={}", CONTAINER_NAME);
        self.query(&["ps", "-a", "--filter", filter.as_str(), "--format", NAMES_FORMAT])
            .is_some_and(|stdout| format::has_name(&stdout, CONTAINER_NAME))
    }

    /// Host directory mounted at the workspace path of the running container
    pub fn mounted_directory(&self) -> Option<PathBuf> {
        if !self.is_running() {
            return None;
        }
        self.inspect_mount()
    }

    fn inspect_mount(&self) -> Option<PathBuf> {
        let template = format::mount_source_format(WORKSPACE_DIR);
        self.query(&["inspect", CONTAINER_NAME, "--format", template.as_str()])
            .and_then(|stdout| format::parse_mount_source(&stdout))
    }

    /// Read the running container's workspace mount.
    /// Fails with [`SandboxError::NotRunning`] if it is not running.
    pub fn workspace(&self) -> Result<Workspace> {
        if !self.is_running() {
            return Err(SandboxError::NotRunning);
        }
        Ok(Workspace {
            mounted: self.inspect_mount(),
        })
    }

    /// Whether an image is present in local storage
    pub fn image_exists(&self, image: &str) -> bool {
        self.engine
            .output(&["image", "exists", image])
            .map(|output| output.success)
            .unwrap_or(false)
    }

    pub fn has_committed_image(&self) -> bool {
        self.image_exists(COMMITTED_IMAGE)
    }

    /// Image the container is (re)created from: the committed image if one
    /// exists, else the configured base image
    pub fn effective_image(&self) -> String {
        if self.has_committed_image() {
            COMMITTED_IMAGE.to_string()
        } else {
            self.config.image.clone()
        }
    }

    /// Status of the sandbox container
    pub fn status(&self) -> SandboxStatus {
        if !self.exists() {
            return SandboxStatus::not_created();
        }
        if !self.is_running() {
            return SandboxStatus::stopped();
        }
        self.query(&["inspect", CONTAINER_NAME, "--format", STATE_FORMAT])
            .and_then(|stdout| format::parse_state_line(&stdout))
            .unwrap_or_else(SandboxStatus::error)
    }

    /// Every container known to the engine
    pub fn list_all_containers(&self) -> Vec<ContainerSummary> {
        self.query(&["ps", "-a", "--format", LIST_FORMAT])
            .map(|stdout| format::parse_container_list(&stdout, CONTAINER_NAME))
            .unwrap_or_default()
    }

    // --- Mutations ---

    /// Run an engine command that must succeed
    fn check(&self, action: &str, args: &[&str]) -> Result<EngineOutput> {
        let output = self.engine.output(args)?;
        if output.success {
            Ok(output)
        } else {
            Err(SandboxError::engine(action, output.failure_message()))
        }
    }

    /// Make sure `image` is in local storage, pulling only on a miss
    fn ensure_image(&self, image: &str) -> Result<()> {
        if self.image_exists(image) {
            debug!(image, "image present locally");
            return Ok(());
        }
        info!(image, "pulling image");
        self.check(&format!("Pulling image '{}'", image), &["pull", image])?;
        Ok(())
    }

    /// Kill and remove the sandbox container in one call, then drop the
    /// image it ran from if a later commit left that image untagged
    fn force_remove(&self) -> Result<()> {
        let image_id = self
            .query(&["inspect", CONTAINER_NAME, "--format", IMAGE_ID_FORMAT])
            .and_then(|stdout| format::parse_image_id(&stdout));

        self.check("Removing container", &["rm", "-f", CONTAINER_NAME])?;

        if let Some(image_id) = image_id {
            self.prune_untagged(&image_id);
        }
        Ok(())
    }

    fn prune_untagged(&self, image_id: &str) {
        let untagged = self
            .query(&["image", "inspect", image_id, "--format", REPO_TAGS_FORMAT])
            .is_some_and(|stdout| format::is_untagged(&stdout));
        if !untagged {
            return;
        }
        match self.check("Removing stale image", &["rmi", image_id]) {
            Ok(_) => debug!(image = image_id, "removed stale committed image"),
            Err(e) => debug!(image = image_id, error = %e, "stale image kept"),
        }
    }

    /// Replace any existing sandbox container with a fresh one mounting `cwd`
    fn recreate(&self, cwd: &Path) -> Result<()> {
        let image = self.effective_image();
        self.ensure_image(&image)?;

        if self.exists() {
            self.force_remove()?;
        }

        let volume = format!("{}:{}:Z", cwd.display(), WORKSPACE_DIR);
        let mut args = vec![
            "run",
            "-d",
            "--name",
            CONTAINER_NAME,
            "-v",
            volume.as_str(),
            "-w",
            WORKSPACE_DIR,
        ];
        if let Some(ref limit) = self.config.memory_limit {
            args.extend(["-m", limit.as_str()]);
        }
        args.push(image.as_str());
        args.extend(KEEPALIVE);

        self.check("Creating container", &args)?;
        info!(image = %image, mount = %cwd.display(), "sandbox container started");
        Ok(())
    }

    /// Start the sandbox container with `cwd` mounted as the workspace.
    ///
    /// Fails if it is already running on `cwd`. If it is running on a
    /// different directory it is only replaced when `force_restart` is set.
    pub fn start(&self, cwd: &Path, force_restart: bool) -> Result<()> {
        if self.is_running() {
            match self.inspect_mount() {
                Some(mounted) if mounted.as_path() == cwd => {
                    return Err(SandboxError::AlreadyRunning)
                }
                Some(mounted) if !force_restart => {
                    return Err(SandboxError::MountConflict {
                        mounted,
                        current: cwd.to_path_buf(),
                    })
                }
                Some(mounted) => {
                    info!(old = %mounted.display(), new = %cwd.display(), "remounting sandbox")
                }
                None => warn!("running sandbox has no workspace mount, recreating it"),
            }
        }

        self.recreate(cwd)
    }

    /// Stop the sandbox container, committing its state first when
    /// auto-commit is enabled and `skip_commit` is not set.
    pub fn stop(&self, skip_commit: bool) -> Result<StopOutcome> {
        if !self.is_running() {
            return Err(SandboxError::NotRunning);
        }

        let mut outcome = StopOutcome::default();
        if self.config.auto_commit && !skip_commit {
            match self.commit() {
                Ok(image) => {
                    info!(image = %image, "auto-committed container state");
                    outcome.committed = true;
                }
                Err(e) => {
                    warn!(error = %e, "auto-commit failed, stopping anyway");
                    outcome.commit_error = Some(e.to_string());
                }
            }
        }

        self.check("Stopping container", &["stop", CONTAINER_NAME])?;
        info!("sandbox container stopped");
        Ok(outcome)
    }

    /// Stop the container without committing and start it again on `cwd`,
    /// picking up configuration changes
    pub fn restart(&self, cwd: &Path) -> Result<()> {
        self.stop(true)?;
        self.start(cwd, false)
    }

    /// Run `command` with `sh -c` inside the container and return its exit code.
    ///
    /// If a different directory is mounted and `auto_restart` is set, the
    /// container is transparently recreated on `cwd` first.
    pub fn execute(
        &self,
        cwd: &Path,
        command: &str,
        interactive: bool,
        auto_restart: bool,
    ) -> Result<i32> {
        let workspace = self.workspace()?;
        self.execute_in(&workspace, cwd, command, interactive, auto_restart)
    }

    /// [`Sandbox::execute`] against a [`Workspace`] read earlier
    pub fn execute_in(
        &self,
        workspace: &Workspace,
        cwd: &Path,
        command: &str,
        interactive: bool,
        auto_restart: bool,
    ) -> Result<i32> {
        if auto_restart {
            if let Some(mounted) = workspace.stale_for(cwd) {
                info!(
                    old = %mounted.display(),
                    new = %cwd.display(),
                    "directory changed, remounting"
                );
                self.recreate(cwd)?;
            }
        }

        let mut args = vec!["exec"];
        if interactive {
            args.push("-it");
        }
        args.extend([CONTAINER_NAME, "sh", "-c", command]);

        let code = self.engine.run_attached(&args)?;
        debug!(code, "command finished");
        Ok(code)
    }

    /// Commit the running container to the committed image and return its
    /// reference. A previous committed image is replaced.
    pub fn commit(&self) -> Result<String> {
        if !self.is_running() {
            return Err(SandboxError::NotRunning);
        }

        if self.has_committed_image() {
            self.release_committed_image();
        }

        self.check(
            "Committing container",
            &["commit", CONTAINER_NAME, COMMITTED_IMAGE],
        )?;
        info!(image = COMMITTED_IMAGE, "committed container state");
        Ok(COMMITTED_IMAGE.to_string())
    }

    /// Drop other containers using the committed image, then the image itself.
    /// Failures are logged only; the commit re-tags the reference regardless.
    /// While the sandbox still runs from it the image survives untagged and is
    /// pruned the next time the container is removed.
    fn release_committed_image(&self) {
        let filter = format!("ancestor={}", COMMITTED_IMAGE);
        let users = self
            .query(&["ps", "-a", "--filter", filter.as_str(), "--format", NAMES_FORMAT])
            .map(|stdout| format::parse_names(&stdout))
            .unwrap_or_default();

        for name in users.iter().filter(|name| name.as_str() != CONTAINER_NAME) {
            debug!(container = %name, "removing container using committed image");
            if let Err(e) = self.check("Removing container", &["rm", "-f", name.as_str()]) {
                warn!(container = %name, error = %e, "could not remove container");
            }
        }

        if let Err(e) = self.check("Removing image", &["rmi", COMMITTED_IMAGE]) {
            debug!(error = %e, "stale committed image kept");
        }
    }

    /// Delete the committed image so the next start uses the base image.
    /// Returns `false` when there is nothing to delete.
    pub fn reset(&self) -> Result<bool> {
        if !self.has_committed_image() {
            return Ok(false);
        }

        if self.exists() {
            self.force_remove()?;
        }

        self.check("Removing committed image", &["rmi", "-f", COMMITTED_IMAGE])?;
        info!(image = COMMITTED_IMAGE, "committed image removed");
        Ok(true)
    }
}
