//! Declarative SSL certificate placement.
//!
//! Each certificate declared in `conf/sslcert.toml` resolves to a private key,
//! a certificate, and optionally a CA bundle, either as its own file or
//! appended to the certificate. The tool writes those files into the
//! configured directories, or removes them, idempotently.
//!
//! The public API is organised into layers:
//!
//! - **[`resolver`]** pure mapping from certificate parameters to artifacts
//! - **[`config`]** load and validate the TOML configuration
//! - **[`resources`]** idempotent `check + apply` file primitives
//! - **[`tasks`]** per-certificate units of work wired to resources
//! - **[`commands`]** subcommand orchestration (`plan`, `apply`, `remove`)
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod resolver;
pub mod resources;
pub mod tasks;
