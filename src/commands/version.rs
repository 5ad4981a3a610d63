//! Command: print version information.

/// Version string stamped by the build script, or the crate version.
pub const VERSION: &str = match option_env!("SSLCERT_VERSION") {
    Some(v) => v,
    None => env!("CARGO_PKG_VERSION"),
};

/// Print the sslcert version to stdout.
#[allow(clippy::print_stdout)]
pub fn run() {
    println!("sslcert {VERSION}");
}
