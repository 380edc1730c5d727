//! Thin wrapper over the `git` executable.

use std::path::Path;
use std::process::{Command, Output};

use tracing::{debug, info};

use crate::config::PublishConfig;
use crate::error::PrepError;

/// Run `program` with `args` in `dir`, failing on spawn errors and non-zero exits.
pub fn run_command(dir: &Path, program: &str, args: &[&str]) -> Result<Output, PrepError> {
    let command_line = std::iter::once(program)
        .chain(args.iter().copied())
        .collect::<Vec<_>>()
        .join(" ");
    debug!(command = %command_line, dir = %dir.display(), "running");

    let output = Command::new(program)
        .args(args)
        .current_dir(dir)
        .output()
        .map_err(|err| PrepError::Command {
            command: command_line.clone(),
            reason: err.to_string(),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.trim().is_empty() {
            debug!(command = %command_line, stderr = %stderr.trim(), "command stderr");
        }
        return Err(PrepError::command_status(command_line, output.status));
    }
    Ok(output)
}

/// Run `git` with `args` in `dir`.
pub fn git(dir: &Path, args: &[&str]) -> Result<Output, PrepError> {
    run_command(dir, "git", args)
}

/// Stage everything, commit and push. Any failing step aborts the rest.
pub fn commit_and_push(dir: &Path, publish: &PublishConfig) -> Result<(), PrepError> {
    let status = git(dir, &["status", "--porcelain"])?;
    let pending = String::from_utf8_lossy(&status.stdout).lines().count();
    info!(pending, "git status checked");

    git(dir, &["add", "."])?;
    info!("changes staged");

    git(dir, &["commit", "-m", &publish.commit_message])?;
    info!(message = %publish.commit_message, "changes committed");

    git(dir, &["push", &publish.remote, &publish.branch])?;
    info!(remote = %publish.remote, branch = %publish.branch, "pushed");
    Ok(())
}
