//! Command-line interface definitions.
use clap::{Parser, Subcommand, ValueEnum};

/// Top-level CLI entry point for the certificate placement tool.
#[derive(Parser, Debug)]
#[command(
    name = "sslcert",
    about = "Place SSL keys, certificates and CA bundles from declarative config",
    version
)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Options shared by every subcommand.
    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Options shared across all subcommands.
#[derive(Parser, Debug, Clone)]
pub struct GlobalOpts {
    /// Preview changes without applying
    #[arg(short = 'd', long, global = true)]
    pub dry_run: bool,

    /// Override the repository root directory
    #[arg(long, global = true)]
    pub root: Option<std::path::PathBuf>,

    /// Config file to load instead of <root>/conf/sslcert.toml
    #[arg(long, global = true)]
    pub config: Option<std::path::PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show the files each certificate resolves to
    Plan(PlanOpts),
    /// Place or remove files so the host matches the config
    Apply(ApplyOpts),
    /// Remove every file placed for the declared certificates
    Remove(RemoveOpts),
    /// Print version information
    Version,
}

impl Command {
    /// Name used for the log file of this command.
    #[must_use]
    pub const fn log_name(&self) -> &'static str {
        match self {
            Self::Plan(_) => "plan",
            Self::Apply(_) => "apply",
            Self::Remove(_) => "remove",
            Self::Version => "version",
        }
    }
}

/// Output format for `plan`.
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PlanFormat {
    /// One line per artifact
    #[default]
    Text,
    /// Pretty-printed JSON
    Json,
}

/// Options for the `plan` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct PlanOpts {
    /// Output format
    #[arg(long, value_enum, default_value_t)]
    pub format: PlanFormat,

    /// Only these certificates
    #[arg(long, value_delimiter = ',')]
    pub only: Vec<String>,
}

/// Options for the `apply` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct ApplyOpts {
    /// Only these certificates
    #[arg(long, value_delimiter = ',')]
    pub only: Vec<String>,
}

/// Options for the `remove` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct RemoveOpts {
    /// Only these certificates
    #[arg(long, value_delimiter = ',')]
    pub only: Vec<String>,
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_apply_dry_run_short() {
        let cli = Cli::parse_from(["sslcert", "-d", "apply"]);
        assert!(cli.global.dry_run);
        assert!(matches!(cli.command, Command::Apply(_)));
    }

    #[test]
    fn parse_apply_only_certificates() {
        let cli = Cli::parse_from(["sslcert", "apply", "--only", "example.org,www.example.org"]);
        assert!(
            matches!(&cli.command, Command::Apply(_)),
            "Expected Apply command"
        );
        if let Command::Apply(opts) = cli.command {
            assert_eq!(opts.only, vec!["example.org", "www.example.org"]);
        }
    }

    #[test]
    fn parse_plan_defaults_to_text() {
        let cli = Cli::parse_from(["sslcert", "plan"]);
        assert!(
            matches!(&cli.command, Command::Plan(_)),
            "Expected Plan command"
        );
        if let Command::Plan(opts) = cli.command {
            assert_eq!(opts.format, PlanFormat::Text);
            assert!(opts.only.is_empty());
        }
    }

    #[test]
    fn parse_plan_json() {
        let cli = Cli::parse_from(["sslcert", "plan", "--format", "json"]);
        if let Command::Plan(opts) = cli.command {
            assert_eq!(opts.format, PlanFormat::Json);
        }
    }

    #[test]
    fn parse_remove() {
        let cli = Cli::parse_from(["sslcert", "remove"]);
        assert!(matches!(cli.command, Command::Remove(_)));
        assert_eq!(cli.command.log_name(), "remove");
    }

    #[test]
    fn parse_version() {
        let cli = Cli::parse_from(["sslcert", "version"]);
        assert!(matches!(cli.command, Command::Version));
    }

    #[test]
    fn parse_verbose() {
        let cli = Cli::parse_from(["sslcert", "-v", "apply"]);
        assert!(cli.verbose);
    }

    #[test]
    fn parse_root_and_config_override() {
        let cli = Cli::parse_from([
            "sslcert",
            "--root",
            "/srv/certs",
            "--config",
            "/srv/certs/staging.toml",
            "plan",
        ]);
        assert_eq!(
            cli.global.root,
            Some(std::path::PathBuf::from("/srv/certs"))
        );
        assert_eq!(
            cli.global.config,
            Some(std::path::PathBuf::from("/srv/certs/staging.toml"))
        );
    }
}
