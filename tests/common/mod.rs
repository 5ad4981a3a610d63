// Shared helpers for integration tests.
//
// Provides a temporary-directory-backed certificate repository and a fluent
// builder so each integration test can set up an isolated environment without
// repeating filesystem boilerplate. Keys and certificates are placed inside
// the same temporary directory (`private/` and `certs/`).
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code, clippy::expect_used, clippy::panic)]

use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use sslcert_cli::cli::GlobalOpts;
use sslcert_cli::config::Config;
use sslcert_cli::logging::Logger;

/// Settings block pointing both output directories into the repository.
const SETTINGS: &str = "[settings]\ncert_dir = \"certs\"\nkey_dir = \"private\"\n";

/// An isolated certificate repository backed by a [`tempfile::TempDir`].
pub struct TestRepo {
    /// Temporary directory containing `conf/`, `files/` and the output dirs.
    pub root: tempfile::TempDir,
}

impl TestRepo {
    /// Path to the repository root.
    pub fn root_path(&self) -> &Path {
        self.root.path()
    }

    /// Global options targeting this repository.
    pub fn global(&self, dry_run: bool) -> GlobalOpts {
        GlobalOpts {
            dry_run,
            root: Some(self.root.path().to_path_buf()),
            config: None,
        }
    }

    /// A logger that records task results without writing a log file.
    pub fn logger() -> Arc<Logger> {
        Arc::new(Logger::with_log_file(None))
    }

    /// Load `conf/sslcert.toml`.
    pub fn load_config(&self) -> Config {
        Config::load(self.root.path(), None).expect("load config")
    }

    /// Placed private key for `name`.
    pub fn key_path(&self, name: &str) -> PathBuf {
        self.root.path().join("private").join(format!("{name}.key"))
    }

    /// Placed file `file_name` in the cert directory.
    pub fn cert_dir_path(&self, file_name: &str) -> PathBuf {
        self.root.path().join("certs").join(file_name)
    }

    /// Read a placed file as UTF-8.
    pub fn read(path: &Path) -> String {
        std::fs::read_to_string(path)
            .unwrap_or_else(|e| panic!("read {}: {e}", path.display()))
    }

    /// Replace `conf/sslcert.toml` with `settings` followed by `certs`.
    pub fn rewrite_config(&self, certs: &str) {
        std::fs::write(
            self.root.path().join("conf/sslcert.toml"),
            format!("{SETTINGS}\n{certs}"),
        )
        .expect("rewrite config");
    }
}

/// Fluent builder for [`TestRepo`].
pub struct TestRepoBuilder {
    certs: String,
    sources: Vec<(String, String)>,
}

impl TestRepoBuilder {
    /// Begin building a repository with no certificates.
    pub fn new() -> Self {
        Self {
            certs: String::new(),
            sources: Vec::new(),
        }
    }

    /// Declare certificate `name` with the given TOML table body.
    pub fn with_cert(mut self, name: &str, body: &str) -> Self {
        let _ = write!(self.certs, "[certs.\"{name}\"]\n{body}\n\n");
        self
    }

    /// Write `content` to `files/<file_name>`.
    pub fn with_source(mut self, file_name: &str, content: &str) -> Self {
        self.sources
            .push((file_name.to_string(), content.to_string()));
        self
    }

    /// Create the repository on disk.
    pub fn build(self) -> TestRepo {
        let root = tempfile::tempdir().expect("create temp dir");
        let conf = root.path().join("conf");
        std::fs::create_dir_all(&conf).expect("create conf dir");
        std::fs::write(
            conf.join("sslcert.toml"),
            format!("{SETTINGS}\n{}", self.certs),
        )
        .expect("write sslcert.toml");

        let files = root.path().join("files");
        std::fs::create_dir_all(&files).expect("create files dir");
        for (name, content) in &self.sources {
            std::fs::write(files.join(name), content).expect("write source file");
        }

        TestRepo { root }
    }
}
