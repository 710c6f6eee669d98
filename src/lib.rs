//! podman-sandbox - run shell commands in a disposable Podman container
//!
//! A single, well-known container is kept alive with the current working
//! directory bind-mounted at `/workspace`. Commands are executed inside it
//! with `podman exec`; changing directories transparently remounts it, and
//! the container filesystem can be committed to an image so installed
//! packages survive restarts.
//!
//! # Example
//!
//! ```no_run
//! use podman_sandbox::{CliEngine, ConfigStore, Sandbox};
//!
//! let sandbox = Sandbox::new(CliEngine::default(), ConfigStore::user_default()?)?;
//! let cwd = std::env::current_dir()?;
//! sandbox.start(&cwd, false)?;
//! let code = sandbox.execute(&cwd, "uname -a", false, true)?;
//! println!("exited with {}", code);
//! # Ok::<(), podman_sandbox::SandboxError>(())
//! ```

pub mod cli;
pub mod config;
pub mod container;
pub mod error;
pub mod logging;
pub mod output;
pub mod sandbox;

pub use config::{ConfigChange, ConfigStore, SandboxConfig};
pub use container::{CliEngine, ContainerEngine, ContainerSummary, SandboxStatus};
pub use error::{Result, SandboxError};
pub use output::{format_output, OutputFormat, Report};
pub use sandbox::{Sandbox, StopOutcome, Workspace, COMMITTED_IMAGE, CONTAINER_NAME, WORKSPACE_DIR};
