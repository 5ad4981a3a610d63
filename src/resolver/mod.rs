//! Certificate placement resolver.
//!
//! Turns a named [`CertRequest`] into the ordered list of [`Artifact`]s the
//! host must materialize. Resolution is pure: the same inputs always yield
//! the same artifacts, and nothing here touches the filesystem.
//!
//! | request                               | artifacts                         |
//! |---------------------------------------|-----------------------------------|
//! | no `bundlefile`                       | key, cert                         |
//! | `bundlefile`, `embed_bundle = false`  | key, cert, bundle                 |
//! | `bundlefile`, `embed_bundle = true`   | key, cert-and-bundle (combined)   |
//! | `ensure = "absent"`                   | none                              |
mod artifact;
mod request;

pub use artifact::{Artifact, ArtifactKind, CombinedArtifact, FileArtifact, Fragment, Payload};
pub use request::{CertRequest, Ensure};

use crate::error::ResolveError;

/// Directory, relative to the repository root, holding source files.
pub const SOURCE_DIR: &str = "files";

/// Prefix shared by every artifact identifier.
pub const ID_PREFIX: &str = "sslcert-";

/// Resolve the artifacts to create for `name`.
///
/// Returns an empty list when `request.ensure` is [`Ensure::Absent`]; use
/// [`managed_artifacts`] to learn what should be removed instead.
///
/// # Examples
///
/// ```
/// use sslcert_cli::resolver::{self, CertRequest};
///
/// let artifacts = resolver::resolve("example.org", &CertRequest::default()).unwrap();
/// let ids: Vec<&str> = artifacts.iter().map(|a| a.id()).collect();
/// assert_eq!(ids, ["sslcert-example.org.key", "sslcert-example.org.crt"]);
/// ```
///
/// # Errors
///
/// Returns [`ResolveError::InvalidInput`] when the request fails
/// [`CertRequest::validate`]. No artifacts are produced in that case.
pub fn resolve(name: &str, request: &CertRequest) -> Result<Vec<Artifact>, ResolveError> {
    request.validate(name)?;
    if request.ensure == Ensure::Absent {
        return Ok(Vec::new());
    }
    Ok(plan(name, request))
}

/// Every artifact `name` would own if it were present, regardless of `ensure`.
///
/// This is the set a host removes when a certificate is declared absent or
/// uninstalled.
///
/// # Errors
///
/// Returns [`ResolveError::InvalidInput`] when the request is invalid.
pub fn managed_artifacts(name: &str, request: &CertRequest) -> Result<Vec<Artifact>, ResolveError> {
    request.validate(name)?;
    Ok(plan(name, request))
}

/// Identifiers of [`managed_artifacts`].
///
/// # Errors
///
/// Returns [`ResolveError::InvalidInput`] when the request is invalid.
pub fn removal_ids(name: &str, request: &CertRequest) -> Result<Vec<String>, ResolveError> {
    Ok(managed_artifacts(name, request)?
        .iter()
        .map(|a| a.id().to_string())
        .collect())
}

fn plan(name: &str, request: &CertRequest) -> Vec<Artifact> {
    let key_name = format!("{name}.key");
    let cert_name = format!("{name}.crt");

    let mut artifacts = vec![Artifact::File(file_artifact(
        ArtifactKind::Key,
        &key_name,
        request.keyfile_content.as_deref(),
    ))];

    match &request.bundlefile {
        None => artifacts.push(Artifact::File(file_artifact(
            ArtifactKind::Cert,
            &cert_name,
            request.certfile_content.as_deref(),
        ))),
        Some(bundlefile) if !request.embed_bundle => {
            artifacts.push(Artifact::File(file_artifact(
                ArtifactKind::Cert,
                &cert_name,
                request.certfile_content.as_deref(),
            )));
            artifacts.push(Artifact::File(file_artifact(
                ArtifactKind::Bundle,
                bundlefile,
                request.bundlefile_content.as_deref(),
            )));
        }
        Some(bundlefile) => {
            artifacts.push(Artifact::Combined(CombinedArtifact {
                id: format!("{ID_PREFIX}{name}-cert-and-bundle"),
                file_name: cert_name.clone(),
                fragments: vec![
                    Fragment {
                        id: format!("{ID_PREFIX}{name}-cert"),
                        payload: payload_for(&cert_name, request.certfile_content.as_deref()),
                    },
                    Fragment {
                        id: format!("{ID_PREFIX}{name}-bundle"),
                        payload: payload_for(bundlefile, request.bundlefile_content.as_deref()),
                    },
                ],
            }));
        }
    }

    artifacts
}

fn file_artifact(kind: ArtifactKind, file_name: &str, content: Option<&str>) -> FileArtifact {
    FileArtifact {
        id: format!("{ID_PREFIX}{file_name}"),
        kind,
        file_name: file_name.to_string(),
        payload: payload_for(file_name, content),
    }
}

/// Source paths mirror the standalone artifact id: `files/sslcert-<file_name>`.
fn payload_for(file_name: &str, content: Option<&str>) -> Payload {
    Payload::from_parts(content, &format!("{SOURCE_DIR}/{ID_PREFIX}{file_name}"))
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn files(artifacts: &[Artifact]) -> Vec<&FileArtifact> {
        artifacts
            .iter()
            .filter_map(|a| match a {
                Artifact::File(f) => Some(f),
                Artifact::Combined(_) => None,
            })
            .collect()
    }

    fn combined(artifacts: &[Artifact]) -> Vec<&CombinedArtifact> {
        artifacts
            .iter()
            .filter_map(|a| match a {
                Artifact::Combined(c) => Some(c),
                Artifact::File(_) => None,
            })
            .collect()
    }

    fn with_bundle(embed: bool) -> CertRequest {
        CertRequest {
            bundlefile: Some("ca.pem".to_string()),
            embed_bundle: embed,
            ..CertRequest::default()
        }
    }

    #[test]
    fn absent_yields_no_artifacts() {
        let request = CertRequest {
            ensure: Ensure::Absent,
            ..with_bundle(true)
        };
        assert!(resolve("example.org", &request).unwrap().is_empty());
    }

    #[test]
    fn absent_still_reports_removal_ids() {
        let request = CertRequest {
            ensure: Ensure::Absent,
            ..with_bundle(false)
        };
        assert_eq!(
            removal_ids("example.org", &request).unwrap(),
            [
                "sslcert-example.org.key",
                "sslcert-example.org.crt",
                "sslcert-ca.pem"
            ]
        );
    }

    #[test]
    fn removal_ids_match_created_ids() {
        for request in [CertRequest::default(), with_bundle(false), with_bundle(true)] {
            let created: Vec<String> = resolve("example.org", &request)
                .unwrap()
                .iter()
                .map(|a| a.id().to_string())
                .collect();
            assert_eq!(created, removal_ids("example.org", &request).unwrap());
        }
    }

    #[test]
    fn no_bundle_yields_key_and_cert_from_sources() {
        let artifacts = resolve("example.org", &CertRequest::default()).unwrap();
        assert_eq!(artifacts.len(), 2);
        assert!(combined(&artifacts).is_empty());

        let files = files(&artifacts);
        assert_eq!(files[0].id, "sslcert-example.org.key");
        assert_eq!(files[0].kind, ArtifactKind::Key);
        assert_eq!(
            files[0].payload,
            Payload::RemoteSource("files/sslcert-example.org.key".to_string())
        );
        assert_eq!(files[1].id, "sslcert-example.org.crt");
        assert_eq!(files[1].file_name, "example.org.crt");
        assert_eq!(
            files[1].payload,
            Payload::RemoteSource("files/sslcert-example.org.crt".to_string())
        );
    }

    #[test]
    fn embed_without_bundlefile_is_ignored() {
        let request = CertRequest {
            embed_bundle: true,
            ..CertRequest::default()
        };
        let artifacts = resolve("example.org", &request).unwrap();
        assert_eq!(files(&artifacts).len(), 2);
        assert!(combined(&artifacts).is_empty());
    }

    #[test]
    fn separate_bundle_yields_three_files() {
        let artifacts = resolve("example.org", &with_bundle(false)).unwrap();
        let files = files(&artifacts);
        assert_eq!(files.len(), 3);
        assert!(combined(&artifacts).is_empty());
        assert_eq!(files[2].id, "sslcert-ca.pem");
        assert_eq!(files[2].kind, ArtifactKind::Bundle);
        assert_eq!(files[2].file_name, "ca.pem");
        assert_eq!(
            files[2].payload,
            Payload::RemoteSource("files/sslcert-ca.pem".to_string())
        );
    }

    #[test]
    fn embedded_bundle_yields_key_and_combined() {
        let artifacts = resolve("example.org", &with_bundle(true)).unwrap();
        assert_eq!(artifacts.len(), 2);

        let files = files(&artifacts);
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].kind, ArtifactKind::Key);
        assert!(files.iter().all(|f| f.kind != ArtifactKind::Cert));

        let combined = combined(&artifacts);
        assert_eq!(combined.len(), 1);
        let c = combined[0];
        assert_eq!(c.id, "sslcert-example.org-cert-and-bundle");
        assert_eq!(c.file_name, "example.org.crt");
        let ids: Vec<&str> = c.fragments.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, ["sslcert-example.org-cert", "sslcert-example.org-bundle"]);
        assert_eq!(
            c.fragments[0].payload,
            Payload::RemoteSource("files/sslcert-example.org.crt".to_string())
        );
        assert_eq!(
            c.fragments[1].payload,
            Payload::RemoteSource("files/sslcert-ca.pem".to_string())
        );
    }

    #[test]
    fn inline_content_takes_precedence_everywhere() {
        let request = CertRequest {
            keyfile_content: Some("KEYFILE".to_string()),
            certfile_content: Some("CERTFILE".to_string()),
            bundlefile_content: Some("BUNDLEFILE".to_string()),
            ..with_bundle(false)
        };
        let artifacts = resolve("example.org", &request).unwrap();
        let payloads: Vec<&Payload> = artifacts.iter().flat_map(Artifact::payloads).collect();
        assert_eq!(
            payloads,
            [
                &Payload::Content("KEYFILE".to_string()),
                &Payload::Content("CERTFILE".to_string()),
                &Payload::Content("BUNDLEFILE".to_string()),
            ]
        );
    }

    #[test]
    fn mixed_content_and_sources() {
        let request = CertRequest {
            certfile_content: Some("CERTFILE".to_string()),
            ..with_bundle(true)
        };
        let artifacts = resolve("example.org", &request).unwrap();
        let c = combined(&artifacts)[0];
        assert_eq!(
            c.fragments[0].payload,
            Payload::Content("CERTFILE".to_string())
        );
        assert_eq!(
            c.fragments[1].payload,
            Payload::RemoteSource("files/sslcert-ca.pem".to_string())
        );
    }

    #[test]
    fn invalid_request_produces_no_artifacts() {
        let request = CertRequest {
            bundlefile_content: Some("BUNDLEFILE".to_string()),
            ..CertRequest::default()
        };
        assert!(resolve("example.org", &request).is_err());
        assert!(managed_artifacts("example.org", &request).is_err());
    }

    #[test]
    fn resolution_is_deterministic() {
        let request = with_bundle(true);
        assert_eq!(
            resolve("example.org", &request).unwrap(),
            resolve("example.org", &request).unwrap()
        );
    }
}
