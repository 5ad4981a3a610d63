//! Execution context shared by every task.
use std::path::Path;
use std::sync::Arc;

use crate::config::{Config, Settings};
use crate::logging::Log;

/// Shared context for task execution.
#[derive(Clone)]
pub struct Context {
    /// Configuration loaded from `conf/sslcert.toml`.
    pub config: Arc<Config>,
    /// Logger for output and task recording.
    pub log: Arc<dyn Log>,
    /// Whether to perform a dry run (preview changes without applying).
    pub dry_run: bool,
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("config", &"<Config>")
            .field("log", &"<dyn Log>")
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl Context {
    /// Creates a new context for task execution.
    #[must_use]
    pub const fn new(config: Arc<Config>, log: Arc<dyn Log>, dry_run: bool) -> Self {
        Self {
            config,
            log,
            dry_run,
        }
    }

    /// Root directory of the certificate repository.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.config.root
    }

    /// Placement settings.
    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.config.settings
    }
}
