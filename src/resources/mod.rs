//! Idempotent resource primitives (check + apply pattern).
//!
//! Resources are the materialization side of the resolver: each one owns a
//! single path on the host and knows how to compare it with the desired
//! state and converge it.
pub mod absent_file;
pub mod cert_file;
pub mod helpers;

use anyhow::Result;

/// Minimal interface for resources that can be described, applied, and removed.
pub trait Applicable {
    /// Human-readable description of this resource.
    fn description(&self) -> String;

    /// Apply the resource change.
    ///
    /// This method should:
    /// - Create parent directories if needed
    /// - Update the resource to match the desired state
    /// - Return the appropriate `ResourceChange` result
    ///
    /// # Errors
    ///
    /// Returns an error if the resource cannot be applied due to I/O failures,
    /// missing sources, invalid paths, or other system errors.
    fn apply(&self) -> Result<ResourceChange>;

    /// Remove the resource, undoing a previous `apply()`.
    ///
    /// Default implementation returns an error; override in resources
    /// that support removal.
    ///
    /// # Errors
    ///
    /// Returns an error if the resource cannot be removed, or if removal is not supported
    /// for this resource type.
    fn remove(&self) -> Result<ResourceChange> {
        anyhow::bail!(
            "operation 'remove' is not supported for resource '{}'",
            self.description()
        )
    }
}

/// State of a resource on the host.
///
/// # Examples
///
/// ```
/// use sslcert_cli::resources::ResourceState;
///
/// let missing = ResourceState::Missing;
/// let correct = ResourceState::Correct;
/// let wrong = ResourceState::Incorrect { current: "sha256:0123456789ab".into() };
/// let skip = ResourceState::Invalid { reason: "target is a directory".into() };
///
/// assert_ne!(missing, correct);
/// assert_eq!(correct, ResourceState::Correct);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceState {
    /// Resource does not exist or is not present.
    Missing,
    /// Resource exists and matches the desired state.
    Correct,
    /// Resource exists but does not match the desired state.
    Incorrect {
        /// The current value of the resource.
        current: String,
    },
    /// Resource cannot be applied (e.g., target is a directory, source missing).
    Invalid {
        /// Reason why the resource cannot be applied.
        reason: String,
    },
}

/// Result of applying a resource change.
///
/// # Examples
///
/// ```
/// use sslcert_cli::resources::ResourceChange;
///
/// let applied = ResourceChange::Applied;
/// let noop = ResourceChange::AlreadyCorrect;
///
/// assert_eq!(applied, ResourceChange::Applied);
/// assert_ne!(applied, noop);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceChange {
    /// Resource was created, updated or deleted.
    Applied,
    /// Resource was already correct (no change needed).
    AlreadyCorrect,
}

/// Resources that can determine their own state before applying.
pub trait Resource: Applicable {
    /// Check the current state of the resource.
    ///
    /// # Errors
    ///
    /// Returns an error if the resource state cannot be determined due to I/O failures,
    /// permission issues, or other system errors.
    fn current_state(&self) -> Result<ResourceState>;
}
