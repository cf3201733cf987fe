//! Shell driver: spawns one command string through the platform shell and
//! surfaces its exit code.
//!
//! Policy (per the Design Notes' "portable reimplementation" guidance):
//! `/bin/sh -c <command>` on Unix, `cmd /c <command>` on Windows, waited
//! on synchronously. Neither variant does any quoting/splitting of its
//! own — the whole string is handed to the host shell, which is exactly
//! what a build-file `created using { ... }` entry expects.

use std::process::Command;

use crate::world::CommandOutcome;

pub fn spawn(command: &str) -> std::io::Result<CommandOutcome> {
    let mut cmd = platform_command(command);
    let status = cmd.status()?;
    Ok(match status.code() {
        Some(0) => CommandOutcome::Success,
        Some(code) => CommandOutcome::NonZero(code),
        // Terminated by signal: report a conventional nonzero code since
        // there is no portable exit code to recover.
        None => CommandOutcome::NonZero(-1),
    })
}

#[cfg(unix)]
fn platform_command(command: &str) -> Command {
    let mut cmd = Command::new("/bin/sh");
    cmd.arg("-c").arg(command);
    cmd
}

#[cfg(windows)]
fn platform_command(command: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.arg("/c").arg(command);
    cmd
}

#[cfg(not(any(unix, windows)))]
fn platform_command(command: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(command);
    cmd
}
