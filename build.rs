//! Build script: embeds the short git commit hash as GIT_HASH
//!
//! Falls back to "unknown" outside a git checkout (e.g. a crate tarball).

use std::process::Command;

fn main() {
    // Short hash of HEAD, logged at startup next to the package version
    let output = Command::new("git").args(["rev-parse", "--short", "HEAD"]).output();

    let git_hash = match output {
        Ok(output) if output.status.success() => {
            String::from_utf8_lossy(&output.stdout).trim().to_string()
        }
        _ => String::from("unknown"),
    };

    println!("cargo:rustc-env=GIT_HASH={}", git_hash);

    // New commits and branch switches move HEAD
    println!("cargo:rerun-if-changed=.git/HEAD");
}
