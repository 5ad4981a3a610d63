//! Generic resource processing loop: check state, apply or remove, collect stats.
//!
//! - [`apply`] handles a single resource (`process_single`, `apply_resource`, `remove_single`)
//! - [`context`] holds the shared execution context for tasks

mod apply;
pub mod context;

pub use context::Context;

use anyhow::Result;

use crate::resources::Resource;

/// Result of a single task execution.
///
/// # Examples
///
/// ```
/// use sslcert_cli::tasks::TaskResult;
///
/// let ok = TaskResult::Ok;
/// let skipped = TaskResult::Skipped("2 file(s) skipped".into());
/// let dry = TaskResult::DryRun;
///
/// assert!(matches!(ok, TaskResult::Ok));
/// assert!(matches!(skipped, TaskResult::Skipped(_)));
/// assert!(matches!(dry, TaskResult::DryRun));
/// ```
#[derive(Debug, Clone)]
pub enum TaskResult {
    /// Task completed successfully.
    Ok,
    /// Task was skipped.
    Skipped(String),
    /// Task ran in dry-run mode.
    DryRun,
}

/// Counters for tasks that converge several files.
///
/// # Examples
///
/// ```
/// use sslcert_cli::tasks::TaskStats;
///
/// let mut stats = TaskStats::new();
/// stats.changed = 2;
/// stats.already_ok = 1;
///
/// assert_eq!(stats.summary(false), "2 changed, 1 already ok");
/// assert_eq!(stats.summary(true), "2 would change, 1 already ok");
/// ```
///
/// When files are skipped, the summary includes the count:
///
/// ```
/// use sslcert_cli::tasks::TaskStats;
///
/// let stats = TaskStats { changed: 1, already_ok: 0, skipped: 1 };
/// assert_eq!(stats.summary(false), "1 changed, 0 already ok, 1 skipped");
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TaskStats {
    /// Number of files written or deleted.
    pub changed: u32,
    /// Number of files already in the desired state.
    pub already_ok: u32,
    /// Number of files skipped due to errors or invalid state.
    pub skipped: u32,
}

impl TaskStats {
    /// Create a new empty stats counter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Format the summary string (e.g. "2 changed, 1 already ok, 1 skipped").
    #[must_use]
    pub fn summary(&self, dry_run: bool) -> String {
        let verb = if dry_run { "would change" } else { "changed" };
        if self.skipped > 0 {
            format!(
                "{} {verb}, {} already ok, {} skipped",
                self.changed, self.already_ok, self.skipped
            )
        } else {
            format!("{} {verb}, {} already ok", self.changed, self.already_ok)
        }
    }

    /// Log the summary and return the appropriate `TaskResult`.
    ///
    /// A task whose every file was skipped reports [`TaskResult::Skipped`].
    #[must_use]
    pub fn finish(self, ctx: &Context) -> TaskResult {
        ctx.log.info(&self.summary(ctx.dry_run));
        if self.skipped > 0 && self.changed == 0 && self.already_ok == 0 {
            TaskResult::Skipped(format!("{} file(s) skipped", self.skipped))
        } else if ctx.dry_run {
            TaskResult::DryRun
        } else {
            TaskResult::Ok
        }
    }
}

impl std::ops::AddAssign for TaskStats {
    fn add_assign(&mut self, other: Self) {
        self.changed += other.changed;
        self.already_ok += other.already_ok;
        self.skipped += other.skipped;
    }
}

/// Converge each resource and accumulate the per-resource stats.
///
/// # Errors
///
/// Returns an error if a resource fails to report its state or to apply.
pub fn converge_resources<R: Resource>(
    ctx: &Context,
    resources: impl IntoIterator<Item = R>,
    verb: &str,
) -> Result<TaskStats> {
    let mut stats = TaskStats::new();
    for resource in resources {
        let current = resource.current_state()?;
        stats += apply::process_single(ctx, &resource, current, verb)?;
    }
    Ok(stats)
}

/// Process resources by checking each one's current state and applying as needed.
///
/// # Errors
///
/// Returns an error if any resource fails to check its state or apply changes.
pub fn process_resources<R: Resource>(
    ctx: &Context,
    resources: impl IntoIterator<Item = R>,
    verb: &str,
) -> Result<TaskResult> {
    Ok(converge_resources(ctx, resources, verb)?.finish(ctx))
}

/// Process resources for removal.
///
/// Only resources in [`ResourceState::Correct`](crate::resources::ResourceState::Correct)
/// are removed (they are "ours"). Resources that are `Missing`, `Incorrect`,
/// or `Invalid` are left in place.
///
/// # Errors
///
/// Returns an error if a resource fails to check its current state or fails
/// during the removal process.
pub fn process_resources_remove<R: Resource>(
    ctx: &Context,
    resources: impl IntoIterator<Item = R>,
    verb: &str,
) -> Result<TaskResult> {
    let mut stats = TaskStats::new();
    for resource in resources {
        let current = resource.current_state()?;
        stats += apply::remove_single(ctx, &resource, &current, verb)?;
    }
    Ok(stats.finish(ctx))
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
    use crate::resources::{Applicable, ResourceChange, ResourceState};
    use crate::tasks::test_helpers::{empty_config, make_context};
    use std::path::PathBuf;

    /// A configurable resource for exercising the processing pipeline.
    struct MockResource {
        state_result: Result<ResourceState, String>,
        apply_result: Result<ResourceChange, String>,
        remove_result: Result<ResourceChange, String>,
    }

    impl MockResource {
        fn new(state: ResourceState) -> Self {
            Self {
                state_result: Ok(state),
                apply_result: Ok(ResourceChange::Applied),
                remove_result: Ok(ResourceChange::Applied),
            }
        }

        fn with_state_error(mut self, err: impl Into<String>) -> Self {
            self.state_result = Err(err.into());
            self
        }

        fn with_apply(mut self, result: Result<ResourceChange, String>) -> Self {
            self.apply_result = result;
            self
        }

        fn with_remove(mut self, result: Result<ResourceChange, String>) -> Self {
            self.remove_result = result;
            self
        }
    }

    impl Applicable for MockResource {
        fn description(&self) -> String {
            "mock resource".to_string()
        }

        fn apply(&self) -> Result<ResourceChange> {
            self.apply_result
                .clone()
                .map_err(|s| anyhow::anyhow!("{s}"))
        }

        fn remove(&self) -> Result<ResourceChange> {
            self.remove_result
                .clone()
                .map_err(|s| anyhow::anyhow!("{s}"))
        }
    }

    impl Resource for MockResource {
        fn current_state(&self) -> Result<ResourceState> {
            self.state_result
                .clone()
                .map_err(|s| anyhow::anyhow!("{s}"))
        }
    }

    fn test_context() -> Context {
        make_context(empty_config(PathBuf::from("/tmp")))
    }

    fn dry_run_context() -> Context {
        let mut ctx = test_context();
        ctx.dry_run = true;
        ctx
    }

    fn invalid() -> ResourceState {
        ResourceState::Invalid {
            reason: "source does not exist".to_string(),
        }
    }

    fn incorrect() -> ResourceState {
        ResourceState::Incorrect {
            current: "sha256:0123456789ab".to_string(),
        }
    }

    // -----------------------------------------------------------------------
    // TaskStats
    // -----------------------------------------------------------------------

    #[test]
    fn stats_summary_with_skipped() {
        let stats = TaskStats {
            changed: 1,
            already_ok: 2,
            skipped: 3,
        };
        assert_eq!(stats.summary(false), "1 changed, 2 already ok, 3 skipped");
        assert_eq!(stats.summary(true), "1 would change, 2 already ok, 3 skipped");
    }

    #[test]
    fn stats_finish_matches_dry_run_flag() {
        assert!(matches!(
            TaskStats::new().finish(&dry_run_context()),
            TaskResult::DryRun
        ));
        assert!(matches!(
            TaskStats::new().finish(&test_context()),
            TaskResult::Ok
        ));
    }

    #[test]
    fn stats_finish_all_skipped_reports_skipped() {
        let stats = TaskStats {
            changed: 0,
            already_ok: 0,
            skipped: 2,
        };
        for ctx in [test_context(), dry_run_context()] {
            match stats.finish(&ctx) {
                TaskResult::Skipped(reason) => assert_eq!(reason, "2 file(s) skipped"),
                other => panic!("expected Skipped, got {other:?}"),
            }
        }
        let partial = TaskStats {
            changed: 1,
            already_ok: 0,
            skipped: 1,
        };
        assert!(matches!(partial.finish(&test_context()), TaskResult::Ok));
    }

    #[test]
    fn stats_add_assign_sums_fields() {
        let mut a = TaskStats {
            changed: 1,
            already_ok: 1,
            skipped: 0,
        };
        a += TaskStats {
            changed: 2,
            already_ok: 0,
            skipped: 1,
        };
        assert_eq!(
            a,
            TaskStats {
                changed: 3,
                already_ok: 1,
                skipped: 1
            }
        );
    }

    // -----------------------------------------------------------------------
    // process_single / apply_resource
    // -----------------------------------------------------------------------

    #[test]
    fn process_single_correct_increments_already_ok() {
        let ctx = test_context();
        let resource = MockResource::new(ResourceState::Correct);
        let stats = apply::process_single(&ctx, &resource, ResourceState::Correct, "place").unwrap();
        assert_eq!(stats.already_ok, 1);
        assert_eq!(stats.changed, 0);
    }

    #[test]
    fn process_single_invalid_increments_skipped() {
        let ctx = test_context();
        let resource = MockResource::new(invalid());
        let stats = apply::process_single(&ctx, &resource, invalid(), "place").unwrap();
        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.changed, 0);
    }

    #[test]
    fn process_single_missing_applies() {
        let ctx = test_context();
        let resource = MockResource::new(ResourceState::Missing);
        let stats = apply::process_single(&ctx, &resource, ResourceState::Missing, "place").unwrap();
        assert_eq!(stats.changed, 1);
    }

    #[test]
    fn process_single_dry_run_does_not_apply() {
        let ctx = dry_run_context();
        let resource = MockResource::new(incorrect()).with_apply(Err("should not call".into()));
        let stats = apply::process_single(&ctx, &resource, incorrect(), "place").unwrap();
        assert_eq!(stats.changed, 1);
    }

    #[test]
    fn apply_resource_already_correct_increments_already_ok() {
        let ctx = test_context();
        let resource = MockResource::new(ResourceState::Missing)
            .with_apply(Ok(ResourceChange::AlreadyCorrect));
        let stats = apply::apply_resource(&ctx, &resource, "place").unwrap();
        assert_eq!(stats.already_ok, 1);
    }

    // -----------------------------------------------------------------------
    // converge_resources / process_resources
    // -----------------------------------------------------------------------

    #[test]
    fn converge_resources_accumulates_mixed_states() {
        let ctx = test_context();
        let resources = vec![
            MockResource::new(ResourceState::Correct),
            MockResource::new(ResourceState::Missing),
            MockResource::new(incorrect()),
            MockResource::new(invalid()),
        ];
        let stats = converge_resources(&ctx, resources, "place").unwrap();
        assert_eq!(
            stats,
            TaskStats {
                changed: 2,
                already_ok: 1,
                skipped: 1
            }
        );
    }

    #[test]
    fn process_resources_empty_list() {
        let ctx = test_context();
        let result = process_resources(&ctx, Vec::<MockResource>::new(), "place").unwrap();
        assert!(matches!(result, TaskResult::Ok));
    }

    #[test]
    fn process_resources_bail_on_apply_error_propagates() {
        let ctx = test_context();
        let resources =
            vec![MockResource::new(ResourceState::Missing).with_apply(Err("fatal".into()))];
        let err = process_resources(&ctx, resources, "place").unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("failed to place mock resource"), "{msg}");
        assert!(msg.contains("fatal"), "{msg}");
    }

    #[test]
    fn process_resources_current_state_error_propagates() {
        let ctx = test_context();
        let resources =
            vec![MockResource::new(ResourceState::Missing).with_state_error("state failed")];
        let err = process_resources(&ctx, resources, "place").unwrap_err();
        assert!(err.to_string().contains("state failed"));
    }

    // -----------------------------------------------------------------------
    // process_resources_remove
    // -----------------------------------------------------------------------

    #[test]
    fn remove_only_touches_correct_resources() {
        let ctx = test_context();
        let resources = vec![
            MockResource::new(ResourceState::Correct),
            MockResource::new(ResourceState::Missing).with_remove(Err("not ours".into())),
            MockResource::new(incorrect()).with_remove(Err("not ours".into())),
        ];
        let result = process_resources_remove(&ctx, resources, "remove").unwrap();
        assert!(matches!(result, TaskResult::Ok));
    }

    #[test]
    fn remove_dry_run_does_not_remove() {
        let ctx = dry_run_context();
        let resources =
            vec![MockResource::new(ResourceState::Correct).with_remove(Err("should not call".into()))];
        let result = process_resources_remove(&ctx, resources, "remove").unwrap();
        assert!(matches!(result, TaskResult::DryRun));
    }

    #[test]
    fn remove_error_propagates() {
        let ctx = test_context();
        let resources =
            vec![MockResource::new(ResourceState::Correct).with_remove(Err("busy".into()))];
        let err = process_resources_remove(&ctx, resources, "remove").unwrap_err();
        assert!(err.to_string().contains("busy"));
    }
}
