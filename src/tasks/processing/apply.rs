//! Single-resource processing: check state, apply or remove one resource.

use anyhow::Result;

use super::TaskStats;
use super::context::Context;
use crate::resources::{Resource, ResourceChange, ResourceState};

/// Process a single resource given its current state, returning a stats delta.
pub(super) fn process_single<R: Resource>(
    ctx: &Context,
    resource: &R,
    resource_state: ResourceState,
    verb: &str,
) -> Result<TaskStats> {
    let desc = resource.description();
    let mut delta = TaskStats::new();
    match resource_state {
        ResourceState::Correct => {
            ctx.log.debug(&format!("ok: {desc}"));
            delta.already_ok += 1;
        }
        ResourceState::Invalid { reason } => {
            ctx.log.warn(&format!("skipping {desc}: {reason}"));
            delta.skipped += 1;
        }
        resource_state @ (ResourceState::Missing | ResourceState::Incorrect { .. }) => {
            if ctx.dry_run {
                let msg = if let ResourceState::Incorrect { ref current } = resource_state {
                    format!("would {verb} {desc} (currently {current})")
                } else {
                    format!("would {verb}: {desc}")
                };
                ctx.log.dry_run(&msg);
                delta.changed += 1;
                return Ok(delta);
            }
            delta += apply_resource(ctx, resource, verb)?;
        }
    }
    Ok(delta)
}

/// Apply a single resource change, returning a stats delta.
pub(super) fn apply_resource<R: Resource>(
    ctx: &Context,
    resource: &R,
    verb: &str,
) -> Result<TaskStats> {
    let desc = resource.description();
    let mut delta = TaskStats::new();
    let change = resource
        .apply()
        .map_err(|e| e.context(format!("failed to {verb} {desc}")))?;

    match change {
        ResourceChange::Applied => {
            ctx.log.debug(&format!("{verb}: {desc}"));
            delta.changed += 1;
        }
        ResourceChange::AlreadyCorrect => {
            delta.already_ok += 1;
        }
    }
    Ok(delta)
}

/// Remove a single resource, returning a stats delta.
pub(super) fn remove_single<R: Resource>(
    ctx: &Context,
    resource: &R,
    current: &ResourceState,
    verb: &str,
) -> Result<TaskStats> {
    let desc = resource.description();
    let mut delta = TaskStats::new();
    match current {
        ResourceState::Correct => {
            if ctx.dry_run {
                ctx.log.dry_run(&format!("would {verb}: {desc}"));
                delta.changed += 1;
                return Ok(delta);
            }
            resource.remove()?;
            ctx.log.debug(&format!("{verb}: {desc}"));
            delta.changed += 1;
        }
        ResourceState::Incorrect { current } => {
            ctx.log
                .debug(&format!("leaving {desc} (currently {current}, not ours)"));
            delta.skipped += 1;
        }
        ResourceState::Missing | ResourceState::Invalid { .. } => {
            delta.already_ok += 1;
        }
    }
    Ok(delta)
}
