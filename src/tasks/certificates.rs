//! Per-certificate tasks: place, or remove, every file a certificate owns.
use anyhow::Result;

use super::{Context, Task, TaskResult, process_resources, process_resources_remove};
use crate::config::CertEntry;
use crate::resolver::{self, Artifact, CertRequest, Ensure};
use crate::resources::absent_file::AbsentFileResource;
use crate::resources::cert_file::CertFileResource;

fn cert_files(ctx: &Context, artifacts: &[Artifact]) -> Vec<CertFileResource> {
    artifacts
        .iter()
        .map(|a| CertFileResource::from_artifact(a, ctx.settings(), ctx.root()))
        .collect()
}

/// Converge one declared certificate to its `ensure` state.
///
/// `present` writes the key, certificate and bundle (or combined) files;
/// `absent` deletes every file the certificate would own.
#[derive(Debug)]
pub struct PlaceCertificate {
    label: String,
    name: String,
    request: CertRequest,
}

impl PlaceCertificate {
    /// Create the task for a declared certificate.
    #[must_use]
    pub fn new(entry: &CertEntry) -> Self {
        let action = match entry.request.ensure {
            Ensure::Present => "Place",
            Ensure::Absent => "Remove",
        };
        Self {
            label: format!("{action} {}", entry.name),
            name: entry.name.clone(),
            request: entry.request.clone(),
        }
    }
}

impl Task for PlaceCertificate {
    fn name(&self) -> &str {
        &self.label
    }

    fn should_run(&self, _ctx: &Context) -> bool {
        true
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        match self.request.ensure {
            Ensure::Present => {
                let artifacts = resolver::resolve(&self.name, &self.request)?;
                process_resources(ctx, cert_files(ctx, &artifacts), "place")
            }
            Ensure::Absent => {
                let artifacts = resolver::managed_artifacts(&self.name, &self.request)?;
                let resources = artifacts
                    .iter()
                    .map(|a| AbsentFileResource::from_artifact(a, ctx.settings(), ctx.root()));
                process_resources(ctx, resources, "remove")
            }
        }
    }
}

/// Delete the files a certificate owns, whatever its declared `ensure`.
///
/// Only files whose content still matches what would be placed are removed.
#[derive(Debug)]
pub struct RemoveCertificate {
    label: String,
    name: String,
    request: CertRequest,
}

impl RemoveCertificate {
    /// Create the removal task for a declared certificate.
    #[must_use]
    pub fn new(entry: &CertEntry) -> Self {
        Self {
            label: format!("Remove {}", entry.name),
            name: entry.name.clone(),
            request: entry.request.clone(),
        }
    }
}

impl Task for RemoveCertificate {
    fn name(&self) -> &str {
        &self.label
    }

    /// Not applicable when none of the managed files exist on disk.
    ///
    /// Invalid requests still run so the error is reported.
    fn should_run(&self, ctx: &Context) -> bool {
        let Ok(artifacts) = resolver::managed_artifacts(&self.name, &self.request) else {
            return true;
        };
        cert_files(ctx, &artifacts)
            .iter()
            .any(|r| r.target.symlink_metadata().is_ok())
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let artifacts = resolver::managed_artifacts(&self.name, &self.request)?;
        process_resources_remove(ctx, cert_files(ctx, &artifacts), "remove")
    }
}
