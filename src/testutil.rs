//! An in-memory [`World`] for engine tests, in the spirit of the
//! retrieval pack's `MockWorld` pattern: an epoch counter stands in for
//! wall-clock mtimes, and executed commands are recorded instead of
//! actually spawned, so engine tests exercise staleness and ordering
//! without touching the real filesystem or shell.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, UNIX_EPOCH};

use crate::world::{CommandOutcome, World};

pub struct MockWorld {
    inner: Mutex<Inner>,
}

struct Inner {
    epoch: u64,
    files: HashMap<PathBuf, u64>,
    log: Vec<String>,
    exit_codes: HashMap<String, i32>,
}

impl MockWorld {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                epoch: 0,
                files: HashMap::new(),
                log: Vec::new(),
                exit_codes: HashMap::new(),
            }),
        }
    }

    /// Mark a file as existing, stamped with the current epoch. Running
    /// any recorded command that targets it also calls this implicitly.
    pub fn touch_file(&self, path: impl AsRef<Path>) {
        let mut inner = self.inner.lock().unwrap();
        let epoch = inner.epoch;
        inner.files.insert(path.as_ref().to_owned(), epoch);
    }

    /// Move the mock clock forward so a subsequent `touch_file` produces
    /// a strictly later mtime than anything touched so far.
    pub fn advance_epoch(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.epoch += 1;
    }

    pub fn remove_file(&self, path: impl AsRef<Path>) {
        let mut inner = self.inner.lock().unwrap();
        inner.files.remove(path.as_ref());
    }

    /// Make the named command (matched verbatim) exit with `code` when
    /// run, instead of succeeding.
    pub fn set_exit_code(&self, command: &str, code: i32) {
        let mut inner = self.inner.lock().unwrap();
        inner.exit_codes.insert(command.to_string(), code);
    }

    pub fn take_log(&self) -> Vec<String> {
        let mut inner = self.inner.lock().unwrap();
        std::mem::take(&mut inner.log)
    }
}

impl Default for MockWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl World for MockWorld {
    fn exists(&self, path: &Path) -> bool {
        let inner = self.inner.lock().unwrap();
        inner.files.contains_key(path)
    }

    fn mtime(&self, path: &Path) -> std::io::Result<std::time::SystemTime> {
        let inner = self.inner.lock().unwrap();
        let epoch = inner
            .files
            .get(path)
            .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::NotFound, "file not found"))?;
        Ok(UNIX_EPOCH + Duration::from_secs(*epoch))
    }

    fn run(&self, command: &str) -> std::io::Result<CommandOutcome> {
        let mut inner = self.inner.lock().unwrap();
        inner.log.push(command.to_string());
        if let Some(code) = inner.exit_codes.get(command).copied() {
            return Ok(CommandOutcome::NonZero(code));
        }
        // A command of the shape `echo ... > path`, `touch path`, or
        // `cp src dst`/`cat src > dst` creates or refreshes its last
        // whitespace-separated path argument, mirroring what the real
        // shell commands used throughout the test corpus actually do.
        if let Some(path) = command.split_whitespace().last() {
            let epoch = inner.epoch;
            inner.files.insert(PathBuf::from(path), epoch);
        }
        Ok(CommandOutcome::Success)
    }
}
