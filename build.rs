//! Build script: embeds the version string into the binary.

use std::process::Command;

fn main() {
    // Prefer SSLCERT_VERSION if set (release builds), otherwise git describe.
    if let Ok(version) = std::env::var("SSLCERT_VERSION") {
        println!("cargo:rustc-env=SSLCERT_VERSION={version}");
    } else if let Ok(output) = Command::new("git")
        .args(["describe", "--tags", "--always", "--dirty"])
        .output()
        && output.status.success()
    {
        let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
        println!("cargo:rustc-env=SSLCERT_VERSION={version}");
    }

    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/");
    println!("cargo:rerun-if-env-changed=SSLCERT_VERSION");
}
