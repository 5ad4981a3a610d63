//! Subcommand orchestration.
pub mod apply;
pub mod plan;
pub mod remove;
pub mod version;

use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::cli::GlobalOpts;
use crate::config::{Config, DEFAULT_CONFIG_PATH};
use crate::logging::{Log, Logger};
use crate::tasks::{self, Context, Task};

/// Environment variable naming the repository root.
pub const ROOT_ENV: &str = "SSLCERT_ROOT";

/// Configuration loaded and filtered by the common command setup sequence.
#[derive(Debug)]
pub struct CommandSetup {
    /// Loaded configuration, restricted to `--only` when given.
    pub config: Config,
}

impl CommandSetup {
    /// Resolve the root, load the configuration, reject conflicting
    /// certificates, apply `only`, and report validation warnings.
    ///
    /// # Errors
    ///
    /// Returns an error if the root directory cannot be determined, the
    /// config file fails to parse, two certificates manage the same file, or
    /// `only` names an undeclared certificate.
    pub fn init(global: &GlobalOpts, only: &[String], log: &Logger) -> Result<Self> {
        let root = resolve_root(global)?;

        log.stage("Loading configuration");
        let mut config = Config::load(&root, global.config.as_deref())?;
        config.check_conflicts()?;
        config.select(only)?;

        log.debug(&format!("root: {}", root.display()));
        log.debug(&format!(
            "cert_dir: {}",
            config.settings.cert_dir.display()
        ));
        log.debug(&format!("key_dir: {}", config.settings.key_dir.display()));
        log.info(&format!("loaded {} certificate(s)", config.certs.len()));

        let warnings = config.validate();
        if !warnings.is_empty() {
            log.warn(&format!(
                "found {} configuration warning(s):",
                warnings.len()
            ));
            for warning in &warnings {
                log.warn(&format!(
                    "  {} [{}]: {}",
                    warning.source, warning.item, warning.message
                ));
            }
        }

        Ok(Self { config })
    }

    /// Build the task execution context.
    #[must_use]
    pub fn into_context(self, global: &GlobalOpts, log: &Arc<Logger>) -> Context {
        Context::new(
            Arc::new(self.config),
            Arc::clone(log) as Arc<dyn Log>,
            global.dry_run,
        )
    }
}

/// Execute every task in order, print the summary, and bail if any task failed.
///
/// # Errors
///
/// Returns an error if one or more tasks recorded a failure.
pub fn run_tasks_to_completion<'a>(
    tasks: impl IntoIterator<Item = &'a dyn Task>,
    ctx: &Context,
    log: &Logger,
) -> Result<()> {
    for task in tasks {
        tasks::execute(task, ctx);
    }

    log.print_summary();

    let count = log.failure_count();
    if count > 0 {
        anyhow::bail!("{count} task(s) failed");
    }
    Ok(())
}

/// Resolve the repository root from `--root`, `SSLCERT_ROOT`, or the
/// current directory.
///
/// # Errors
///
/// Returns an error if none of the candidates applies.
pub fn resolve_root(global: &GlobalOpts) -> Result<PathBuf> {
    resolve_root_from(
        global,
        std::env::var(ROOT_ENV).ok(),
        &std::env::current_dir()?,
    )
}

/// [`resolve_root`] with the environment and working directory supplied.
///
/// The working directory qualifies when it holds `conf/sslcert.toml`, or
/// whenever `--config` names the file explicitly.
fn resolve_root_from(global: &GlobalOpts, env: Option<String>, cwd: &Path) -> Result<PathBuf> {
    if let Some(root) = &global.root {
        return Ok(root.clone());
    }
    if let Some(root) = env.filter(|r| !r.is_empty()) {
        return Ok(PathBuf::from(root));
    }
    if global.config.is_some() || cwd.join(DEFAULT_CONFIG_PATH).is_file() {
        return Ok(cwd.to_path_buf());
    }
    anyhow::bail!(
        "cannot determine repository root ({DEFAULT_CONFIG_PATH} not found). Use --root or set {ROOT_ENV}"
    );
}
