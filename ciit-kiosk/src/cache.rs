//! Crash-recovery cache: the in-progress session mirrored to one local file
//!
//! Writes are synchronous on purpose. The mirror must be on disk before the
//! mutation returns, otherwise a crash in the gap loses the participant's
//! last answer. Failures are logged and swallowed; a broken mirror must
//! never take the interview down.

use std::fs;
use std::path::{Path, PathBuf};

use ciit_common::model::Session;
use tracing::{error, warn};

/// Well-known cache filename inside the kiosk state folder.
pub const CACHE_FILE_NAME: &str = "current_session.json";

pub struct RecoveryCache {
    path: PathBuf,
}

impl RecoveryCache {
    pub fn new(state_dir: impl Into<PathBuf>) -> Self {
        Self {
            path: state_dir.into().join(CACHE_FILE_NAME),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the cached session, if any. An absent file is the normal
    /// no-interview-in-progress state; an unparsable file is logged and
    /// treated the same way.
    pub fn load(&self) -> Option<Session> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return None,
            Err(err) => {
                error!("Error reading {}: {err}", self.path.display());
                return None;
            }
        };
        match serde_json::from_str(&content) {
            Ok(session) => Some(session),
            Err(err) => {
                error!("Error parsing cached session: {err}");
                None
            }
        }
    }

    /// Mirror the session to disk, best-effort.
    pub fn store(&self, session: &Session) {
        let json = match serde_json::to_string_pretty(session) {
            Ok(json) => json,
            Err(err) => {
                warn!("Failed to serialize session for the cache: {err}");
                return;
            }
        };
        let result = self
            .path
            .parent()
            .map_or(Ok(()), |dir| fs::create_dir_all(dir))
            .and_then(|()| fs::write(&self.path, json));
        if let Err(err) = result {
            warn!("Failed to mirror session to {}: {err}", self.path.display());
        }
    }

    /// Remove the cache file, best-effort.
    pub fn clear(&self) {
        match fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => warn!("Failed to clear {}: {err}", self.path.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_store_clear_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let cache = RecoveryCache::new(dir.path());
        assert!(cache.load().is_none());

        let session = Session {
            id: "session-9".into(),
            notes: "halfway through".into(),
            ..Default::default()
        };
        cache.store(&session);
        assert_eq!(cache.load(), Some(session));

        cache.clear();
        assert!(cache.load().is_none());
        // Clearing an absent cache is not an error
        cache.clear();
    }

    #[test]
    fn corrupt_cache_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let cache = RecoveryCache::new(dir.path());
        fs::write(cache.path(), "{not json").unwrap();
        assert!(cache.load().is_none());
    }
}
