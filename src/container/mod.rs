//! Container engine adapter
//!
//! Every substantive operation is delegated to an external program that
//! speaks the podman CLI. This module owns:
//! - the [`ContainerEngine`] seam and its process-backed implementation
//! - the format strings sent to the engine and the parsers for their output
//! - the records the controller reports (status, listing)

pub mod format;
mod engine;
mod types;

pub use engine::{exit_code, CliEngine, ContainerEngine, EngineOutput, DEFAULT_ENGINE};
pub use types::{format_memory_limit, ContainerSummary, SandboxStatus};
