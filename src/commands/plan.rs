//! Plan command: show what each certificate resolves to without touching disk.
use anyhow::Result;
use serde::Serialize;
use std::fmt::Write as _;
use std::io::Write as _;
use std::path::PathBuf;

use crate::cli::{GlobalOpts, PlanFormat, PlanOpts};
use crate::config::Config;
use crate::logging::Logger;
use crate::resolver::{self, Artifact, Ensure};

/// An artifact together with where it lands on the host.
#[derive(Debug, Serialize)]
pub struct PlannedArtifact {
    /// Absolute target path.
    pub target: PathBuf,
    /// The resolved artifact.
    pub artifact: Artifact,
}

/// A file that `apply` deletes for an absent certificate.
#[derive(Debug, Serialize)]
pub struct PlannedRemoval {
    /// Artifact identifier.
    pub id: String,
    /// Absolute target path.
    pub target: PathBuf,
}

/// The resolution of one declared certificate.
#[derive(Debug, Serialize)]
pub struct PlanEntry {
    /// Certificate title.
    pub name: String,
    /// Requested state.
    pub ensure: Ensure,
    /// Files to place, in order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub artifacts: Vec<PlannedArtifact>,
    /// Files to delete.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub removes: Vec<PlannedRemoval>,
    /// Why the request could not be resolved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Resolve every declared certificate.
#[must_use]
pub fn build_plan(config: &Config) -> Vec<PlanEntry> {
    config
        .certs
        .iter()
        .map(|cert| {
            let mut entry = PlanEntry {
                name: cert.name.clone(),
                ensure: cert.request.ensure,
                artifacts: Vec::new(),
                removes: Vec::new(),
                error: None,
            };
            let target = |a: &Artifact| {
                config
                    .settings
                    .target_dir(a.kind(), &config.root)
                    .join(a.file_name())
            };
            match resolver::managed_artifacts(&cert.name, &cert.request) {
                Err(e) => entry.error = Some(e.to_string()),
                Ok(managed) if cert.request.ensure == Ensure::Absent => {
                    entry.removes = managed
                        .iter()
                        .map(|a| PlannedRemoval {
                            id: a.id().to_string(),
                            target: target(a),
                        })
                        .collect();
                }
                Ok(managed) => {
                    entry.artifacts = managed
                        .into_iter()
                        .map(|a| PlannedArtifact {
                            target: target(&a),
                            artifact: a,
                        })
                        .collect();
                }
            }
            entry
        })
        .collect()
}

/// Render the plan as indented text, one line per file.
#[must_use]
pub fn render_text(entries: &[PlanEntry]) -> String {
    let mut out = String::new();
    for entry in entries {
        if let Some(error) = &entry.error {
            let _ = writeln!(out, "{}: error: {error}", entry.name);
            continue;
        }
        let ensure = match entry.ensure {
            Ensure::Present => "present",
            Ensure::Absent => "absent",
        };
        let _ = writeln!(out, "{} ({ensure})", entry.name);
        for planned in &entry.artifacts {
            let payloads: Vec<String> = planned
                .artifact
                .payloads()
                .iter()
                .map(ToString::to_string)
                .collect();
            let _ = writeln!(
                out,
                "  + {} [{}] <- {}",
                planned.target.display(),
                planned.artifact.id(),
                payloads.join(" + ")
            );
        }
        for removal in &entry.removes {
            let _ = writeln!(out, "  - {} [{}]", removal.target.display(), removal.id);
        }
    }
    out
}

/// Render the plan as pretty-printed JSON.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn render_json(entries: &[PlanEntry]) -> Result<String> {
    let mut out = serde_json::to_string_pretty(entries)?;
    out.push('\n');
    Ok(out)
}

/// Run the plan command.
///
/// # Errors
///
/// Returns an error if configuration loading fails, output cannot be written,
/// or any certificate has invalid parameters.
pub fn run(global: &GlobalOpts, opts: &PlanOpts, log: &Logger) -> Result<()> {
    let setup = super::CommandSetup::init(global, &opts.only, log)?;
    let entries = build_plan(&setup.config);

    let rendered = match opts.format {
        PlanFormat::Text => render_text(&entries),
        PlanFormat::Json => render_json(&entries)?,
    };
    std::io::stdout().lock().write_all(rendered.as_bytes())?;

    let invalid: Vec<&str> = entries
        .iter()
        .filter(|e| e.error.is_some())
        .map(|e| e.name.as_str())
        .collect();
    if !invalid.is_empty() {
        anyhow::bail!(
            "{} certificate(s) have invalid parameters: {}",
            invalid.len(),
            invalid.join(", ")
        );
    }
    Ok(())
}
