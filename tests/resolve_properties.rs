#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::wildcard_imports,
    clippy::indexing_slicing,
    clippy::panic
)]
//! Resolution properties checked through the public resolver API.

use sslcert_cli::resolver::{self, Artifact, CertRequest, Ensure, Payload};

fn ids(artifacts: &[Artifact]) -> Vec<&str> {
    artifacts.iter().map(Artifact::id).collect()
}

fn content(s: &str) -> Option<String> {
    Some(s.to_string())
}

#[test]
fn absent_resolves_to_nothing_but_reports_removals() {
    let request = CertRequest {
        ensure: Ensure::Absent,
        bundlefile: content("ca.pem"),
        ..CertRequest::default()
    };
    assert!(resolver::resolve("example.org", &request).unwrap().is_empty());
    assert_eq!(
        resolver::removal_ids("example.org", &request).unwrap(),
        [
            "sslcert-example.org.key",
            "sslcert-example.org.crt",
            "sslcert-ca.pem"
        ]
    );
}

#[test]
fn no_bundle_yields_key_and_cert_from_sources() {
    let artifacts = resolver::resolve("example.org", &CertRequest::default()).unwrap();
    assert_eq!(
        ids(&artifacts),
        ["sslcert-example.org.key", "sslcert-example.org.crt"]
    );
    assert!(artifacts.iter().all(|a| matches!(a, Artifact::File(_))));
    assert_eq!(
        artifacts[0].payloads(),
        [&Payload::RemoteSource(
            "files/sslcert-example.org.key".to_string()
        )]
    );
    assert_eq!(
        artifacts[1].payloads(),
        [&Payload::RemoteSource(
            "files/sslcert-example.org.crt".to_string()
        )]
    );
}

#[test]
fn standalone_bundle_yields_three_files() {
    let request = CertRequest {
        bundlefile: content("ca.pem"),
        ..CertRequest::default()
    };
    let artifacts = resolver::resolve("example.org", &request).unwrap();
    assert_eq!(artifacts.len(), 3);
    assert!(artifacts.iter().all(|a| matches!(a, Artifact::File(_))));
}

#[test]
fn embedded_bundle_with_inline_content() {
    let request = CertRequest {
        keyfile_content: content("KEYFILE"),
        certfile_content: content("CERTFILE"),
        bundlefile: content("ca.pem"),
        bundlefile_content: content("BUNDLEFILE"),
        embed_bundle: true,
        ..CertRequest::default()
    };
    let artifacts = resolver::resolve("example.org", &request).unwrap();

    assert_eq!(
        ids(&artifacts),
        [
            "sslcert-example.org.key",
            "sslcert-example.org-cert-and-bundle"
        ]
    );
    assert_eq!(
        artifacts[0].payloads(),
        [&Payload::Content("KEYFILE".to_string())]
    );

    let Artifact::Combined(combined) = &artifacts[1] else {
        panic!("second artifact is not combined")
    };
    let fragments: Vec<(&str, &Payload)> = combined
        .fragments
        .iter()
        .map(|f| (f.id.as_str(), &f.payload))
        .collect();
    assert_eq!(
        fragments,
        [
            (
                "sslcert-example.org-cert",
                &Payload::Content("CERTFILE".to_string())
            ),
            (
                "sslcert-example.org-bundle",
                &Payload::Content("BUNDLEFILE".to_string())
            ),
        ]
    );
}

#[test]
fn resolution_is_deterministic() {
    let request = CertRequest {
        bundlefile: content("chain.pem"),
        embed_bundle: true,
        ..CertRequest::default()
    };
    assert_eq!(
        resolver::resolve("example.org", &request).unwrap(),
        resolver::resolve("example.org", &request).unwrap()
    );
}

#[test]
fn invalid_input_emits_no_artifacts() {
    let request = CertRequest {
        bundlefile_content: content("BUNDLEFILE"),
        ..CertRequest::default()
    };
    let err = resolver::resolve("example.org", &request).unwrap_err();
    assert!(err.to_string().contains("example.org"));
}
