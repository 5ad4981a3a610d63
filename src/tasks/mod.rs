//! Named tasks that orchestrate resource changes.
pub mod certificates;
mod processing;

pub use processing::Context;
pub use processing::{
    TaskResult, TaskStats, converge_resources, process_resources,
    process_resources_remove,
};

use anyhow::Result;

use crate::config::Config;
use crate::logging::TaskStatus;

/// A named, executable task.
pub trait Task: Send + Sync {
    /// Human-readable task name.
    fn name(&self) -> &str;

    /// Whether this task has anything to do.
    fn should_run(&self, ctx: &Context) -> bool;

    /// Execute the task.
    ///
    /// # Errors
    ///
    /// Returns an error if the certificate parameters are invalid or a file
    /// cannot be written or removed.
    fn run(&self, ctx: &Context) -> Result<TaskResult>;
}

/// The tasks run by the apply command, one per declared certificate.
#[must_use]
pub fn all_place_tasks(config: &Config) -> Vec<Box<dyn Task>> {
    config
        .certs
        .iter()
        .map(|c| Box::new(certificates::PlaceCertificate::new(c)) as Box<dyn Task>)
        .collect()
}

/// The tasks run by the remove command, one per declared certificate.
#[must_use]
pub fn all_remove_tasks(config: &Config) -> Vec<Box<dyn Task>> {
    config
        .certs
        .iter()
        .map(|c| Box::new(certificates::RemoveCertificate::new(c)) as Box<dyn Task>)
        .collect()
}

/// Execute a task, recording the result in the logger.
pub fn execute(task: &dyn Task, ctx: &Context) {
    if !task.should_run(ctx) {
        ctx.log
            .debug(&format!("skipping task: {} (not applicable)", task.name()));
        ctx.log
            .record_task(task.name(), TaskStatus::NotApplicable, None);
        return;
    }

    ctx.log.stage(task.name());

    match task.run(ctx) {
        Ok(TaskResult::Ok) => {
            ctx.log.record_task(task.name(), TaskStatus::Ok, None);
        }
        Ok(TaskResult::Skipped(reason)) => {
            ctx.log.info(&format!("skipped: {reason}"));
            ctx.log
                .record_task(task.name(), TaskStatus::Skipped, Some(&reason));
        }
        Ok(TaskResult::DryRun) => {
            ctx.log.record_task(task.name(), TaskStatus::DryRun, None);
        }
        Err(e) => {
            ctx.log.error(&format!("{}: {e:#}", task.name()));
            ctx.log
                .record_task(task.name(), TaskStatus::Failed, Some(&format!("{e:#}")));
        }
    }
}
