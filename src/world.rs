//! Abstraction over the outside world the build engine consults: file
//! existence/mtime and shell execution. All filesystem and process
//! interaction in the engine goes through this trait so that tests can
//! swap in an in-memory mock instead of touching the real disk.

use std::path::Path;
use std::time::SystemTime;

/// The outcome of running one command through the shell driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    Success,
    NonZero(i32),
}

pub trait World: Send + Sync {
    /// Test whether a file exists.
    fn exists(&self, path: &Path) -> bool;

    /// Get the modification time of a file.
    fn mtime(&self, path: &Path) -> std::io::Result<SystemTime>;

    /// Spawn `command` through the platform shell and wait for it to
    /// finish.
    fn run(&self, command: &str) -> std::io::Result<CommandOutcome>;
}

/// The default implementation of [`World`]: the real filesystem and the
/// real platform shell.
pub struct LocalWorld;

pub static LOCAL_WORLD: LocalWorld = LocalWorld;

impl World for LocalWorld {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn mtime(&self, path: &Path) -> std::io::Result<SystemTime> {
        path.metadata()?.modified()
    }

    fn run(&self, command: &str) -> std::io::Result<CommandOutcome> {
        crate::shell::spawn(command)
    }
}
