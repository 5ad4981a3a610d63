//! Soft configuration checks reported as warnings before any task runs.
//!
//! Hard contradictions (e.g. bundle content without a bundle file) are
//! rejected by [`CertRequest::validate`](crate::resolver::CertRequest::validate);
//! the checks here only flag things that are likely mistakes.
use std::path::Path;

use super::CertEntry;
use crate::resolver::{self, Artifact, Ensure, Payload};

/// Config file name used as the warning source.
const SOURCE: &str = "sslcert.toml";

/// A validation warning detected during configuration loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationWarning {
    /// The configuration source (e.g., "sslcert.toml").
    pub source: String,
    /// The certificate that triggered the warning.
    pub item: String,
    /// Human-readable warning message.
    pub message: String,
}

impl ValidationWarning {
    /// Create a new warning.
    #[must_use]
    pub fn new(
        source: impl Into<String>,
        item: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            item: item.into(),
            message: message.into(),
        }
    }
}

/// Trait for configuration validators.
pub trait ConfigValidator {
    /// Validate the configuration and return any warnings found.
    fn validate(&self, root: &Path) -> Vec<ValidationWarning>;
}

/// Validator for certificate declarations.
#[derive(Debug)]
pub struct CertValidator<'a> {
    certs: &'a [CertEntry],
}

impl<'a> CertValidator<'a> {
    /// Create a validator over `certs`.
    #[must_use]
    pub const fn new(certs: &'a [CertEntry]) -> Self {
        Self { certs }
    }
}

impl ConfigValidator for CertValidator<'_> {
    fn validate(&self, root: &Path) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();

        for cert in self.certs {
            let request = &cert.request;

            if request.embed_bundle && request.bundlefile.is_none() {
                warnings.push(ValidationWarning::new(
                    SOURCE,
                    &cert.name,
                    "embed_bundle has no effect without bundlefile",
                ));
            }

            // Invalid requests fail loudly when their task runs.
            if request.ensure == Ensure::Absent {
                continue;
            }
            let Ok(artifacts) = resolver::resolve(&cert.name, request) else {
                continue;
            };

            for path in artifacts.iter().flat_map(Artifact::payloads).filter_map(|p| match p {
                Payload::RemoteSource(path) => Some(path),
                Payload::Content(_) => None,
            }) {
                if !root.join(path).is_file() {
                    warnings.push(ValidationWarning::new(
                        SOURCE,
                        &cert.name,
                        format!("source file does not exist: {path}"),
                    ));
                }
            }
        }

        warnings
    }
}
