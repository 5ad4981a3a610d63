//! Certificate, key, bundle and combined file resource.
use anyhow::{Context as _, Result};
use sha2::{Digest as _, Sha256};
use std::path::{Path, PathBuf};

use super::{Applicable, Resource, ResourceChange, ResourceState};
use crate::config::Settings;
use crate::error::ResourceError;
use crate::resolver::{Artifact, ArtifactKind, Payload};

/// A file whose content is the in-order concatenation of its fragments.
///
/// A plain key or certificate has a single fragment; a combined
/// certificate-and-bundle file has two.
#[derive(Debug, Clone)]
pub struct CertFileResource {
    /// Artifact identifier, for log messages.
    pub id: String,
    /// Absolute path of the file on the host.
    pub target: PathBuf,
    /// Ordered payloads.
    pub fragments: Vec<Payload>,
    /// Directory that `RemoteSource` paths are relative to.
    pub source_root: PathBuf,
    /// Written owner-only (private keys).
    pub private: bool,
}

impl CertFileResource {
    /// Create a new file resource.
    #[must_use]
    pub const fn new(
        id: String,
        target: PathBuf,
        fragments: Vec<Payload>,
        source_root: PathBuf,
    ) -> Self {
        Self {
            id,
            target,
            fragments,
            source_root,
            private: false,
        }
    }

    /// Mark the file as owner-only.
    #[must_use]
    pub const fn private(mut self) -> Self {
        self.private = true;
        self
    }

    /// Create from a resolved artifact, placing it according to `settings`.
    #[must_use]
    pub fn from_artifact(artifact: &Artifact, settings: &Settings, root: &Path) -> Self {
        let target = settings
            .target_dir(artifact.kind(), root)
            .join(artifact.file_name());
        let resource = Self::new(
            artifact.id().to_string(),
            target,
            artifact.payloads().into_iter().cloned().collect(),
            root.to_path_buf(),
        );
        if artifact.kind() == ArtifactKind::Key {
            resource.private()
        } else {
            resource
        }
    }

    /// Remote sources that do not exist under `source_root`.
    fn missing_sources(&self) -> Vec<PathBuf> {
        self.fragments
            .iter()
            .filter_map(|p| match p {
                Payload::RemoteSource(path) => Some(self.source_root.join(path)),
                Payload::Content(_) => None,
            })
            .filter(|p| !p.is_file())
            .collect()
    }

    /// Assemble the bytes this file should contain.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::SourceMissing`] if a source file does not
    /// exist, or an I/O error if one cannot be read.
    pub fn desired_content(&self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        for payload in &self.fragments {
            match payload {
                Payload::Content(content) => out.extend_from_slice(content.as_bytes()),
                Payload::RemoteSource(path) => {
                    let source = self.source_root.join(path);
                    if !source.is_file() {
                        return Err(ResourceError::SourceMissing {
                            path: source.display().to_string(),
                        }
                        .into());
                    }
                    let bytes = std::fs::read(&source)
                        .with_context(|| format!("read source: {}", source.display()))?;
                    out.extend_from_slice(&bytes);
                }
            }
        }
        Ok(out)
    }
}

impl Applicable for CertFileResource {
    fn description(&self) -> String {
        format!("{} ({})", self.target.display(), self.id)
    }

    fn apply(&self) -> Result<ResourceChange> {
        if self.target.is_dir() {
            return Err(ResourceError::NotAFile {
                path: self.target.display().to_string(),
            }
            .into());
        }
        let content = self.desired_content()?;
        super::helpers::fs::ensure_parent_dir(&self.target)?;
        super::helpers::fs::write_atomic(&self.target, &content, self.private)?;
        Ok(ResourceChange::Applied)
    }

    fn remove(&self) -> Result<ResourceChange> {
        if self.target.symlink_metadata().is_err() {
            return Ok(ResourceChange::AlreadyCorrect);
        }
        super::helpers::fs::remove_existing(&self.target)?;
        Ok(ResourceChange::Applied)
    }
}

impl Resource for CertFileResource {
    fn current_state(&self) -> Result<ResourceState> {
        if self.target.is_dir() {
            return Ok(ResourceState::Invalid {
                reason: format!("target is a directory: {}", self.target.display()),
            });
        }

        if let Some(missing) = self.missing_sources().first() {
            return Ok(ResourceState::Invalid {
                reason: format!("source does not exist: {}", missing.display()),
            });
        }

        if !self.target.exists() {
            return Ok(ResourceState::Missing);
        }

        let desired = self.desired_content()?;
        let current = std::fs::read(&self.target)
            .with_context(|| format!("read target: {}", self.target.display()))?;
        if current == desired {
            Ok(ResourceState::Correct)
        } else {
            Ok(ResourceState::Incorrect {
                current: short_digest(&current),
            })
        }
    }
}

/// `sha256:` followed by the first 12 hex digits of the digest.
fn short_digest(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    let hex: String = digest
        .iter()
        .take(6)
        .map(|b| format!("{b:02x}"))
        .collect();
    format!("sha256:{hex}")
}

#[cfg(test)]
#[allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::panic
)]
mod tests {
    use super::*;
    use crate::resolver::{self, CertRequest};

    fn content(s: &str) -> Payload {
        Payload::Content(s.to_string())
    }

    fn resource(dir: &Path, fragments: Vec<Payload>) -> CertFileResource {
        CertFileResource::new(
            "sslcert-example.org.crt".to_string(),
            dir.join("certs").join("example.org.crt"),
            fragments,
            dir.to_path_buf(),
        )
    }

    #[test]
    fn description_names_target_and_id() {
        let r = resource(Path::new("/repo"), vec![content("CERT")]);
        assert!(r.description().contains("example.org.crt"));
        assert!(r.description().contains("sslcert-example.org.crt"));
    }

    #[test]
    fn missing_when_target_absent() {
        let dir = tempfile::tempdir().unwrap();
        let r = resource(dir.path(), vec![content("CERT")]);
        assert_eq!(r.current_state().unwrap(), ResourceState::Missing);
    }

    #[test]
    fn invalid_when_source_missing() {
        let dir = tempfile::tempdir().unwrap();
        let r = resource(
            dir.path(),
            vec![Payload::RemoteSource("files/sslcert-example.org.crt".to_string())],
        );
        let state = r.current_state().unwrap();
        assert!(matches!(state, ResourceState::Invalid { .. }), "{state:?}");
    }

    #[test]
    fn invalid_when_target_is_directory() {
        let dir = tempfile::tempdir().unwrap();
        let r = resource(dir.path(), vec![content("CERT")]);
        std::fs::create_dir_all(&r.target).unwrap();
        assert!(matches!(
            r.current_state().unwrap(),
            ResourceState::Invalid { .. }
        ));
        assert!(r.apply().is_err());
    }

    #[test]
    fn apply_writes_content_then_reports_correct() {
        let dir = tempfile::tempdir().unwrap();
        let r = resource(dir.path(), vec![content("CERT")]);
        assert_eq!(r.apply().unwrap(), ResourceChange::Applied);
        assert_eq!(std::fs::read_to_string(&r.target).unwrap(), "CERT");
        assert_eq!(r.current_state().unwrap(), ResourceState::Correct);
    }

    #[test]
    fn incorrect_when_content_differs() {
        let dir = tempfile::tempdir().unwrap();
        let r = resource(dir.path(), vec![content("CERT")]);
        std::fs::create_dir_all(r.target.parent().unwrap()).unwrap();
        std::fs::write(&r.target, "STALE").unwrap();
        match r.current_state().unwrap() {
            ResourceState::Incorrect { current } => {
                assert!(current.starts_with("sha256:"), "{current}");
                assert_eq!(current.len(), "sha256:".len() + 12);
            }
            other => panic!("expected Incorrect, got {other:?}"),
        }
    }

    #[test]
    fn fragments_are_concatenated_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let files = dir.path().join("files");
        std::fs::create_dir_all(&files).unwrap();
        std::fs::write(files.join("sslcert-ca.pem"), "BUNDLE\n").unwrap();

        let r = resource(
            dir.path(),
            vec![
                content("CERT\n"),
                Payload::RemoteSource("files/sslcert-ca.pem".to_string()),
            ],
        );
        r.apply().unwrap();
        assert_eq!(
            std::fs::read_to_string(&r.target).unwrap(),
            "CERT\nBUNDLE\n"
        );
    }

    #[test]
    fn remove_deletes_file_once() {
        let dir = tempfile::tempdir().unwrap();
        let r = resource(dir.path(), vec![content("CERT")]);
        r.apply().unwrap();
        assert_eq!(r.remove().unwrap(), ResourceChange::Applied);
        assert!(!r.target.exists());
        assert_eq!(r.remove().unwrap(), ResourceChange::AlreadyCorrect);
    }

    #[test]
    fn from_artifact_places_key_in_key_dir() {
        let settings = Settings {
            cert_dir: PathBuf::from("certs"),
            key_dir: PathBuf::from("private"),
        };
        let artifacts = resolver::resolve("example.org", &CertRequest::default()).unwrap();
        let root = Path::new("/repo");

        let key = CertFileResource::from_artifact(&artifacts[0], &settings, root);
        assert_eq!(key.target, PathBuf::from("/repo/private/example.org.key"));
        assert_eq!(key.id, "sslcert-example.org.key");
        assert!(key.private);

        let cert = CertFileResource::from_artifact(&artifacts[1], &settings, root);
        assert_eq!(cert.target, PathBuf::from("/repo/certs/example.org.crt"));
        assert_eq!(cert.source_root, PathBuf::from("/repo"));
        assert!(!cert.private);
    }

    #[cfg(unix)]
    #[test]
    fn private_key_is_written_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let key = CertFileResource::new(
            "sslcert-example.org.key".to_string(),
            dir.path().join("private").join("example.org.key"),
            vec![content("KEY")],
            dir.path().to_path_buf(),
        )
        .private();

        key.apply().unwrap();

        let mode = std::fs::metadata(&key.target).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600, "mode was {mode:o}");
    }

    #[test]
    fn short_digest_is_stable() {
        assert_eq!(short_digest(b""), "sha256:e3b0c44298fc");
    }
}
