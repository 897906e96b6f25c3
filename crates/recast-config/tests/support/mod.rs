//! Environment guards shared by the configuration tests.

use std::ffi::{OsStr, OsString};
use std::sync::{Mutex, MutexGuard};

use once_cell::sync::Lazy;

static ENV_MUTEX: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

/// Serialises environment access and restores overridden variables on drop.
pub struct EnvGuard {
    previous: Vec<(&'static str, Option<OsString>)>,
    _lock: MutexGuard<'static, ()>,
}

impl EnvGuard {
    /// Takes the process-wide environment lock and clears `RECAST_*`
    /// variables the tests care about.
    pub fn acquire() -> Self {
        let lock = ENV_MUTEX
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let mut guard = Self {
            previous: Vec::new(),
            _lock: lock,
        };
        for key in [
            "RECAST_CONFIG_PATH",
            "RECAST_MAX_CYCLES",
            "RECAST_JOBS",
            "RECAST_LOG_FORMAT",
        ] {
            guard.remove(key);
        }
        guard
    }

    /// Sets `key` for the lifetime of the guard.
    pub fn set(&mut self, key: &'static str, value: impl AsRef<OsStr>) {
        self.previous.push((key, std::env::var_os(key)));
        // Environment mutation is `unsafe` in edition 2024; the mutex keeps
        // tests from racing each other.
        unsafe { std::env::set_var(key, value) };
    }

    fn remove(&mut self, key: &'static str) {
        self.previous.push((key, std::env::var_os(key)));
        unsafe { std::env::remove_var(key) };
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        while let Some((key, previous)) = self.previous.pop() {
            match previous {
                Some(value) => unsafe { std::env::set_var(key, value) },
                None => unsafe { std::env::remove_var(key) },
            }
        }
    }
}
