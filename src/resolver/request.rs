//! Certificate request parameters and their validation.
use serde::{Deserialize, Serialize};

use crate::error::ResolveError;

/// Desired state of a certificate's managed files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Ensure {
    /// Files are placed on the host.
    #[default]
    Present,
    /// Files are removed from the host.
    Absent,
}

/// Parameters for one named certificate.
///
/// Every field is optional in the configuration file; omitted fields take
/// their [`Default`] value (`ensure = "present"`, no inline content, no
/// bundle, `embed_bundle = false`).
///
/// # Examples
///
/// ```
/// use sslcert_cli::resolver::{CertRequest, Ensure};
///
/// let request = CertRequest {
///     bundlefile: Some("ca.pem".into()),
///     embed_bundle: true,
///     ..CertRequest::default()
/// };
/// assert_eq!(request.ensure, Ensure::Present);
/// assert!(request.validate("example.org").is_ok());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CertRequest {
    /// Desired state.
    pub ensure: Ensure,
    /// Literal private key; fetched from the source tree when `None`.
    pub keyfile_content: Option<String>,
    /// Literal certificate; fetched from the source tree when `None`.
    pub certfile_content: Option<String>,
    /// File name of the CA bundle; no bundle is managed when `None`.
    pub bundlefile: Option<String>,
    /// Literal bundle; fetched from the source tree when `None`.
    pub bundlefile_content: Option<String>,
    /// Concatenate certificate and bundle into a single file.
    pub embed_bundle: bool,
}

impl CertRequest {
    /// Whether any `*_content` field carries literal content.
    #[must_use]
    pub const fn has_inline_content(&self) -> bool {
        self.keyfile_content.is_some()
            || self.certfile_content.is_some()
            || self.bundlefile_content.is_some()
    }

    /// Whether a bundle is embedded into the certificate file.
    ///
    /// `embed_bundle` only takes effect when a bundle file is declared.
    #[must_use]
    pub const fn embeds_bundle(&self) -> bool {
        self.embed_bundle && self.bundlefile.is_some()
    }

    /// Reject contradictory or unsafe parameter combinations.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::InvalidInput`] when:
    /// - `name` or `bundlefile` is empty or not a single path component
    /// - `bundlefile_content` is set without `bundlefile`
    /// - `ensure` is `absent` while inline content is given
    /// - a separate bundle would overwrite the certificate or key file
    pub fn validate(&self, name: &str) -> Result<(), ResolveError> {
        let invalid = |reason: String| ResolveError::InvalidInput {
            name: name.to_string(),
            reason,
        };

        if let Some(reason) = file_component_problem(name) {
            return Err(invalid(format!("certificate name {reason}")));
        }

        if let Some(bundlefile) = &self.bundlefile {
            if let Some(reason) = file_component_problem(bundlefile) {
                return Err(invalid(format!("bundlefile {reason}")));
            }
            if !self.embed_bundle
                && (*bundlefile == format!("{name}.crt") || *bundlefile == format!("{name}.key"))
            {
                return Err(invalid(format!(
                    "bundlefile '{bundlefile}' collides with a managed certificate file"
                )));
            }
        } else if self.bundlefile_content.is_some() {
            return Err(invalid(
                "bundlefile_content is set but bundlefile is not".to_string(),
            ));
        }

        if self.ensure == Ensure::Absent && self.has_inline_content() {
            return Err(invalid(
                "inline content cannot be combined with ensure = \"absent\"".to_string(),
            ));
        }

        Ok(())
    }
}

/// Describe why `value` cannot be used as a bare file name, if it cannot.
fn file_component_problem(value: &str) -> Option<&'static str> {
    if value.trim().is_empty() {
        Some("must not be empty")
    } else if value.contains('/') || value.contains('\\') {
        Some("must not contain path separators")
    } else if value == "." || value == ".." {
        Some("must not be a relative directory reference")
    } else {
        None
    }
}
