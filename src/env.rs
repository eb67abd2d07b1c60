//! Access to the process environment.
//!
//! Loading goes through [`Environment`] so callers can hand in a fixed map
//! instead of touching the real process state.

use std::collections::HashMap;

use anyhow::Context;

pub trait Environment {
    fn var(&self, key: &str) -> Option<String>;
}

/// Reads from the real process environment.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessEnv;

impl Environment for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        match std::env::var(key) {
            Ok(value) => Some(value),
            Err(std::env::VarError::NotPresent) => None,
            Err(std::env::VarError::NotUnicode(_)) => {
                log::warn!("{} is set but is not valid UTF-8, ignoring it", key);
                None
            }
        }
    }
}

impl Environment for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

/// Loads variables from a dotenv file into the process environment.
///
/// An explicit path must exist. Without one, `./.env` is used if present.
/// Variables already set in the process are left alone.
pub fn load_env_file(path: Option<&str>) -> anyhow::Result<()> {
    match path {
        Some(path) => {
            dotenvy::from_path(path).with_context(|| format!("Failed to load env file {}", path))?;
            log::info!("Loaded environment from {}", path);
        }
        None => match dotenvy::dotenv() {
            Ok(path) => log::info!("Loaded environment from {}", path.display()),
            Err(e) => log::debug!("No .env file loaded: {}", e),
        },
    }
    Ok(())
}

// Tests that read or write the real process environment take this first.
#[cfg(test)]
static PROCESS_ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

#[cfg(test)]
pub(crate) fn lock_process_env() -> std::sync::MutexGuard<'static, ()> {
    PROCESS_ENV_LOCK
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}
