#![allow(dead_code)]

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use skyquery::replay::FixtureStore;

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Directory of the checked-in response fixtures.
pub fn fixture_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("data")
}

/// Store over the checked-in fixtures. Only use it with generation off.
pub fn checked_in_store() -> FixtureStore {
    FixtureStore::new(fixture_dir())
}

/// Copy the checked-in fixtures into `dir`, so a test can append to them.
pub fn copy_fixtures(dir: &Path) -> FixtureStore {
    for entry in std::fs::read_dir(fixture_dir()).expect("read fixture dir") {
        let entry = entry.expect("fixture dir entry");
        std::fs::copy(entry.path(), dir.join(entry.file_name())).expect("copy fixture");
    }
    FixtureStore::new(dir)
}

/// Runs `f` with environment variables temporarily modified.
///
/// `changes` is a list of `(key, value)` pairs:
/// - `Some(v)` sets the variable to `v`
/// - `None` removes the variable
pub fn with_scoped_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _guard = scoped_env(changes);
    f()
}

/// Guard form of [`with_scoped_env`] for async tests: the variables stay
/// modified, and other env-touching tests stay blocked, until it is dropped.
pub fn scoped_env(changes: &[(&str, Option<&str>)]) -> EnvGuard {
    let lock = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let env = ScopedEnv::new(changes);
    EnvGuard { _env: env, _lock: lock }
}

pub struct EnvGuard {
    // Restore the variables before releasing the lock.
    _env: ScopedEnv,
    _lock: MutexGuard<'static, ()>,
}

struct ScopedEnv {
    snapshot: Vec<(String, Option<String>)>,
}

impl ScopedEnv {
    fn new(changes: &[(&str, Option<&str>)]) -> Self {
        let keys: HashSet<&str> = changes.iter().map(|(k, _)| *k).collect();
        let snapshot = keys
            .into_iter()
            .map(|k| (k.to_string(), std::env::var(k).ok()))
            .collect::<Vec<_>>();

        for (k, v) in changes {
            match v {
                Some(val) => std::env::set_var(k, val),
                None => std::env::remove_var(k),
            }
        }

        Self { snapshot }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (k, v) in self.snapshot.drain(..) {
            match v {
                Some(val) => std::env::set_var(&k, val),
                None => std::env::remove_var(&k),
            }
        }
    }
}
