//! Resource whose desired state is "no file at this path".
use anyhow::Result;
use std::path::{Path, PathBuf};

use super::{Applicable, Resource, ResourceChange, ResourceState};
use crate::config::Settings;
use crate::resolver::Artifact;

/// A managed file that must not exist.
#[derive(Debug, Clone)]
pub struct AbsentFileResource {
    /// Artifact identifier, for log messages.
    pub id: String,
    /// Path that must be absent.
    pub target: PathBuf,
}

impl AbsentFileResource {
    /// Create a new absent-file resource.
    #[must_use]
    pub const fn new(id: String, target: PathBuf) -> Self {
        Self { id, target }
    }

    /// Create from an artifact, locating it according to `settings`.
    #[must_use]
    pub fn from_artifact(artifact: &Artifact, settings: &Settings, root: &Path) -> Self {
        Self::new(
            artifact.id().to_string(),
            settings
                .target_dir(artifact.kind(), root)
                .join(artifact.file_name()),
        )
    }
}

impl Applicable for AbsentFileResource {
    fn description(&self) -> String {
        format!("{} ({})", self.target.display(), self.id)
    }

    fn apply(&self) -> Result<ResourceChange> {
        if self.target.symlink_metadata().is_err() {
            return Ok(ResourceChange::AlreadyCorrect);
        }
        super::helpers::fs::remove_existing(&self.target)?;
        Ok(ResourceChange::Applied)
    }
}

impl Resource for AbsentFileResource {
    fn current_state(&self) -> Result<ResourceState> {
        match self.target.symlink_metadata() {
            Err(_) => Ok(ResourceState::Correct),
            Ok(meta) if meta.is_dir() => Ok(ResourceState::Invalid {
                reason: format!("target is a directory: {}", self.target.display()),
            }),
            Ok(_) => Ok(ResourceState::Incorrect {
                current: "present".to_string(),
            }),
        }
    }
}
