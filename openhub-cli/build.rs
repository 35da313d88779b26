use std::process::Command;

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=OPENHUB_GIT_COMMIT");

    // Packagers building from a tarball can pass the commit explicitly.
    let commit = std::env::var("OPENHUB_GIT_COMMIT")
        .ok()
        .filter(|commit| !commit.trim().is_empty())
        .or_else(git_commit);

    let version = std::env::var("CARGO_PKG_VERSION").unwrap_or_default();
    let long_version = match commit {
        Some(commit) => format!("{version} with commit '{}'", commit.trim()),
        None => version,
    };
    println!("cargo:rustc-env=OPENHUB_LONG_VERSION={long_version}");
}

fn git_commit() -> Option<String> {
    let output = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let commit = String::from_utf8(output.stdout).ok()?;
    let commit = commit.trim();
    (!commit.is_empty()).then(|| commit.to_string())
}
