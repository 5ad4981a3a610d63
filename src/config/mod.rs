//! Configuration loading: settings and certificate declarations.
//!
//! Everything lives in a single TOML file, `conf/sslcert.toml` by default:
//!
//! ```toml
//! [settings]
//! cert_dir = "/etc/ssl/certs"
//! key_dir = "/etc/ssl/private"
//!
//! [certs."example.org"]
//! bundlefile = "ca.pem"
//! embed_bundle = true
//! ```
pub mod toml_loader;
pub mod validation;

use anyhow::{Context as _, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::resolver::{self, Artifact, ArtifactKind, CertRequest};

/// Config file location relative to the repository root.
pub const DEFAULT_CONFIG_PATH: &str = "conf/sslcert.toml";

/// Where placed files land on the host.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Directory for certificates, bundles and combined files.
    pub cert_dir: PathBuf,
    /// Directory for private keys.
    pub key_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            cert_dir: PathBuf::from("/etc/ssl/certs"),
            key_dir: PathBuf::from("/etc/ssl/private"),
        }
    }
}

impl Settings {
    /// Directory an artifact of `kind` is written to.
    ///
    /// Relative directories are resolved against `root`.
    #[must_use]
    pub fn target_dir(&self, kind: ArtifactKind, root: &Path) -> PathBuf {
        match kind {
            ArtifactKind::Key => root.join(&self.key_dir),
            ArtifactKind::Cert | ArtifactKind::Bundle | ArtifactKind::CertAndBundle => {
                root.join(&self.cert_dir)
            }
        }
    }
}

/// A declared certificate: its title and parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertEntry {
    /// Certificate title (domain name).
    pub name: String,
    /// Requested parameters.
    pub request: CertRequest,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    settings: Settings,
    certs: BTreeMap<String, CertRequest>,
}

/// All loaded configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Repository root; source files live under `<root>/files`.
    pub root: PathBuf,
    /// Placement settings.
    pub settings: Settings,
    /// Declared certificates, sorted by name.
    pub certs: Vec<CertEntry>,
}

impl Config {
    /// Load configuration from `path`, or from [`DEFAULT_CONFIG_PATH`] under
    /// `root` when `path` is `None`. A missing file yields no certificates.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(root: &Path, path: Option<&Path>) -> Result<Self> {
        let path = path.map_or_else(|| root.join(DEFAULT_CONFIG_PATH), Path::to_path_buf);
        let file: ConfigFile = toml_loader::load_config(&path)
            .with_context(|| format!("loading {}", path.display()))?;

        Ok(Self {
            root: root.to_path_buf(),
            settings: file.settings,
            certs: file
                .certs
                .into_iter()
                .map(|(name, request)| CertEntry { name, request })
                .collect(),
        })
    }

    /// Restrict the declared certificates to `names`; an empty slice keeps all.
    ///
    /// # Errors
    ///
    /// Returns an error naming any requested certificate that is not declared.
    pub fn select(&mut self, names: &[String]) -> Result<()> {
        if names.is_empty() {
            return Ok(());
        }
        let unknown: Vec<&str> = names
            .iter()
            .filter(|n| !self.certs.iter().any(|c| &c.name == *n))
            .map(String::as_str)
            .collect();
        if !unknown.is_empty() {
            anyhow::bail!("unknown certificate(s): {}", unknown.join(", "));
        }
        self.certs.retain(|c| names.contains(&c.name));
        Ok(())
    }

    /// Reject certificates that would manage the same file.
    ///
    /// Two certificates may not declare the same artifact id, nor send
    /// different content to the same target path. `absent` certificates take
    /// part too. Certificates with invalid parameters are skipped; their own
    /// tasks report them.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Conflict`] for the first collision found.
    pub fn check_conflicts(&self) -> Result<(), ConfigError> {
        let mut ids: BTreeMap<String, &str> = BTreeMap::new();
        let mut targets: BTreeMap<PathBuf, (&str, Artifact)> = BTreeMap::new();

        for cert in &self.certs {
            let Ok(artifacts) = resolver::managed_artifacts(&cert.name, &cert.request) else {
                continue;
            };
            for artifact in artifacts {
                let conflict = |first: &str, detail: String| ConfigError::Conflict {
                    first: first.to_string(),
                    second: cert.name.clone(),
                    detail,
                };

                match ids.entry(artifact.id().to_string()) {
                    Entry::Occupied(owner) if *owner.get() != cert.name => {
                        return Err(conflict(
                            *owner.get(),
                            format!("both declare {}", artifact.id()),
                        ));
                    }
                    Entry::Occupied(_) => {}
                    Entry::Vacant(slot) => {
                        slot.insert(cert.name.as_str());
                    }
                }

                let target = self
                    .settings
                    .target_dir(artifact.kind(), &self.root)
                    .join(artifact.file_name());
                match targets.entry(target) {
                    Entry::Occupied(owner) => {
                        let (first, existing) = owner.get();
                        if *first != cert.name && existing.payloads() != artifact.payloads() {
                            return Err(conflict(
                                *first,
                                format!("both write {}", owner.key().display()),
                            ));
                        }
                    }
                    Entry::Vacant(slot) => {
                        slot.insert((cert.name.as_str(), artifact));
                    }
                }
            }
        }

        Ok(())
    }

    /// Validate configuration and return any warnings found.
    #[must_use]
    pub fn validate(&self) -> Vec<validation::ValidationWarning> {
        use validation::ConfigValidator as _;
        validation::CertValidator::new(&self.certs).validate(&self.root)
    }
}
