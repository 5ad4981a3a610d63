//! Artifact descriptors produced by the resolver.
use serde::Serialize;

/// Where an artifact's bytes come from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Payload {
    /// Literal content supplied in the request.
    Content(String),
    /// Path of a file in the source tree, relative to the repository root.
    RemoteSource(String),
}

impl Payload {
    /// Pick literal content when present, otherwise the conventional source path.
    #[must_use]
    pub fn from_parts(content: Option<&str>, source: &str) -> Self {
        content.map_or_else(
            || Self::RemoteSource(source.to_string()),
            |c| Self::Content(c.to_string()),
        )
    }
}

impl std::fmt::Display for Payload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Content(c) => write!(f, "content ({} bytes)", c.len()),
            Self::RemoteSource(path) => write!(f, "source {path}"),
        }
    }
}

/// Role of an artifact on the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    /// Private key, placed in the key directory.
    Key,
    /// Certificate on its own.
    Cert,
    /// CA bundle on its own.
    Bundle,
    /// Certificate followed by the CA bundle in one file.
    CertAndBundle,
}

/// A single file written from one payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileArtifact {
    /// Stable identifier, e.g. `sslcert-example.org.key`.
    pub id: String,
    /// Role of the file.
    pub kind: ArtifactKind,
    /// File name on the host.
    pub file_name: String,
    /// Content or source of the file.
    pub payload: Payload,
}

/// One ordered piece of a [`CombinedArtifact`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Fragment {
    /// Stable identifier, e.g. `sslcert-example.org-cert`.
    pub id: String,
    /// Content or source of the fragment.
    pub payload: Payload,
}

/// A file produced by concatenating fragments in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CombinedArtifact {
    /// Stable identifier, e.g. `sslcert-example.org-cert-and-bundle`.
    pub id: String,
    /// File name on the host.
    pub file_name: String,
    /// Fragments, certificate first.
    pub fragments: Vec<Fragment>,
}

/// Anything the materialization layer must place on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "artifact", rename_all = "snake_case")]
pub enum Artifact {
    /// A standalone file.
    File(FileArtifact),
    /// A concatenation of fragments.
    Combined(CombinedArtifact),
}

impl Artifact {
    /// Stable identifier of the artifact.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::File(f) => &f.id,
            Self::Combined(c) => &c.id,
        }
    }

    /// File name on the host.
    #[must_use]
    pub fn file_name(&self) -> &str {
        match self {
            Self::File(f) => &f.file_name,
            Self::Combined(c) => &c.file_name,
        }
    }

    /// Role of the artifact.
    #[must_use]
    pub const fn kind(&self) -> ArtifactKind {
        match self {
            Self::File(f) => f.kind,
            Self::Combined(_) => ArtifactKind::CertAndBundle,
        }
    }

    /// Payloads in the order they are written.
    #[must_use]
    pub fn payloads(&self) -> Vec<&Payload> {
        match self {
            Self::File(f) => vec![&f.payload],
            Self::Combined(c) => c.fragments.iter().map(|frag| &frag.payload).collect(),
        }
    }
}
