//! Apply command implementation.
use anyhow::Result;
use std::sync::Arc;

use crate::cli::{ApplyOpts, GlobalOpts};
use crate::logging::Logger;
use crate::tasks;

/// Run the apply command.
///
/// # Errors
///
/// Returns an error if configuration loading fails or any certificate task fails.
pub fn run(global: &GlobalOpts, opts: &ApplyOpts, log: &Arc<Logger>) -> Result<()> {
    let setup = super::CommandSetup::init(global, &opts.only, log)?;
    let tasks = tasks::all_place_tasks(&setup.config);
    let ctx = setup.into_context(global, log);
    super::run_tasks_to_completion(tasks.iter().map(Box::as_ref), &ctx, log)
}
