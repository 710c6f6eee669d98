//! Persistent sandbox configuration
//!
//! The configuration is a small JSON document stored under the user's config
//! directory. It records which image to run, an optional memory limit and
//! whether `stop` should snapshot the container first.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::debug;

use crate::error::{Result, SandboxError};

/// Image used when nothing else has been configured
pub const DEFAULT_IMAGE: &str = "alpine:latest";

/// Environment variable overriding the config directory
pub const CONFIG_DIR_ENV: &str = "PODMAN_SANDBOX_CONFIG_DIR";

const CONFIG_FILE: &str = "config.json";

/// Desired state of the sandbox container
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SandboxConfig {
    /// Base image the container is created from
    #[serde(default = "default_image")]
    pub image: String,
    /// Memory limit passed verbatim to the engine (e.g. "512m")
    #[serde(default)]
    pub memory_limit: Option<String>,
    /// Commit the container state before stopping it
    #[serde(default)]
    pub auto_commit: bool,
}

fn default_image() -> String {
    DEFAULT_IMAGE.to_string()
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            image: default_image(),
            memory_limit: None,
            auto_commit: false,
        }
    }
}

impl SandboxConfig {
    /// Memory limit for display, "unlimited" when unset
    pub fn memory_limit_display(&self) -> &str {
        self.memory_limit.as_deref().unwrap_or("unlimited")
    }
}

/// Before/after snapshot of a `configure` call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigChange {
    pub old: SandboxConfig,
    pub new: SandboxConfig,
}

impl ConfigChange {
    pub fn image_changed(&self) -> bool {
        self.old.image != self.new.image
    }

    pub fn memory_limit_changed(&self) -> bool {
        self.old.memory_limit_display() != self.new.memory_limit_display()
    }

    pub fn auto_commit_changed(&self) -> bool {
        self.old.auto_commit != self.new.auto_commit
    }
}

/// Loads and saves the configuration file
#[derive(Debug, Clone)]
pub struct ConfigStore {
    dir: PathBuf,
}

impl ConfigStore {
    /// Create a store rooted at the given directory
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Create a store at the per-user default location (`~/.config/podman-sandbox`)
    pub fn user_default() -> Result<Self> {
        let home = dirs::home_dir()
            .ok_or_else(|| SandboxError::Config("could not determine home directory".to_string()))?;
        Ok(Self::new(home.join(".config").join("podman-sandbox")))
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(CONFIG_FILE)
    }

    /// Read the config file, or return defaults if it does not exist.
    /// Defaults are not written back.
    pub fn load(&self) -> Result<SandboxConfig> {
        let path = self.path();
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(SandboxConfig::default());
        }
        let content = fs::read_to_string(&path)?;
        let config = serde_json::from_str(&content)?;
        debug!(path = %path.display(), ?config, "loaded config");
        Ok(config)
    }

    /// Write the config file, creating the directory if needed
    pub fn save(&self, config: &SandboxConfig) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let content = serde_json::to_string_pretty(config)?;
        fs::write(self.path(), content)?;
        debug!(path = %self.path().display(), "saved config");
        Ok(())
    }

    /// Apply the provided settings on top of the stored config and save it.
    /// `None` or a blank string leaves a field untouched.
    pub fn configure(
        &self,
        memory_limit: Option<String>,
        image: Option<String>,
        auto_commit: Option<bool>,
    ) -> Result<ConfigChange> {
        let old = self.load()?;
        let mut new = old.clone();

        if let Some(memory_limit) = non_blank(memory_limit) {
            new.memory_limit = Some(memory_limit);
        }
        if let Some(image) = non_blank(image) {
            new.image = image;
        }
        if let Some(auto_commit) = auto_commit {
            new.auto_commit = auto_commit;
        }

        self.save(&new)?;
        Ok(ConfigChange { old, new })
    }
}

/// `value` unless it is empty or whitespace only
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
