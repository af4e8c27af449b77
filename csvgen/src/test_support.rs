//! Test-only fakes for the clock and the swept directory.

use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, SystemTime};

use crate::io::artifact_dir::ArtifactDir;
use crate::io::clock::Clock;

/// Manually driven clock.
#[derive(Debug)]
pub struct FakeClock {
    now: Mutex<SystemTime>,
}

impl FakeClock {
    pub fn new(now: SystemTime) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().expect("clock lock");
        *now += by;
    }
}

impl Clock for FakeClock {
    fn now(&self) -> SystemTime {
        *self.now.lock().expect("clock lock")
    }
}

#[derive(Debug, Default)]
struct ScriptedState {
    entries: BTreeMap<String, SystemTime>,
    fail_created: BTreeSet<String>,
    fail_remove: BTreeSet<String>,
    fail_list: Option<io::ErrorKind>,
}

/// In-memory [`ArtifactDir`] with scripted failures.
///
/// Entries are addressed by bare file name; `list` returns them as relative
/// paths in name order.
#[derive(Debug)]
pub struct ScriptedDir {
    location: PathBuf,
    state: Mutex<ScriptedState>,
}

impl Default for ScriptedDir {
    fn default() -> Self {
        Self {
            location: PathBuf::from("scripted"),
            state: Mutex::default(),
        }
    }
}

impl ScriptedDir {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, name: &str, created: SystemTime) {
        self.lock().entries.insert(name.to_string(), created);
    }

    /// Make `created` fail for `name`.
    pub fn fail_created(&self, name: &str) {
        self.lock().fail_created.insert(name.to_string());
    }

    /// Make `remove` fail for `name`.
    pub fn fail_remove(&self, name: &str) {
        self.lock().fail_remove.insert(name.to_string());
    }

    /// Make every `list` call fail with `kind`.
    pub fn fail_list(&self, kind: io::ErrorKind) {
        self.lock().fail_list = Some(kind);
    }

    /// Remaining entry names, sorted.
    pub fn names(&self) -> Vec<String> {
        self.lock().entries.keys().cloned().collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ScriptedState> {
        self.state.lock().expect("scripted dir lock")
    }
}

fn key(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

impl ArtifactDir for ScriptedDir {
    fn location(&self) -> &Path {
        &self.location
    }

    fn list(&self) -> io::Result<Vec<PathBuf>> {
        let state = self.lock();
        if let Some(kind) = state.fail_list {
            return Err(io::Error::new(kind, "scripted list failure"));
        }
        Ok(state.entries.keys().map(PathBuf::from).collect())
    }

    fn created(&self, path: &Path) -> io::Result<SystemTime> {
        let state = self.lock();
        let name = key(path);
        if state.fail_created.contains(&name) {
            return Err(io::Error::other("scripted stat failure"));
        }
        state
            .entries
            .get(&name)
            .copied()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, name))
    }

    fn remove(&self, path: &Path) -> io::Result<()> {
        let mut state = self.lock();
        let name = key(path);
        if state.fail_remove.contains(&name) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "scripted remove failure",
            ));
        }
        state.entries.remove(&name);
        Ok(())
    }
}
