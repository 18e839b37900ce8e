//! Session store: one JSON file per session record
//!
//! Sessions are small and written whole on every save, so there is no cache
//! layer here. Every read goes to disk; the file is the record.

use std::path::{Path, PathBuf};

use chrono::Utc;
use ciit_common::ids;
use ciit_common::model::Session;
use ciit_common::{Error, Result};
use tokio::fs;
use tracing::{error, warn};

/// Flat-file session store rooted at the sessions directory.
#[derive(Clone)]
pub struct SessionStore {
    dir: PathBuf,
}

impl SessionStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Every session on disk, newest start time first.
    ///
    /// Unparsable files are logged and skipped so one corrupt record never
    /// hides the rest of the list.
    pub async fn list(&self) -> Result<Vec<Session>> {
        let mut entries = fs::read_dir(&self.dir).await?;
        let mut paths = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some("json") {
                paths.push(path);
            }
        }
        paths.sort();

        let mut sessions = Vec::new();
        for path in paths {
            match fs::read_to_string(&path).await {
                Ok(content) => match serde_json::from_str::<Session>(&content) {
                    Ok(session) => sessions.push(session),
                    Err(err) => error!("Error loading session {}: {err}", path.display()),
                },
                Err(err) => error!("Error reading {}: {err}", path.display()),
            }
        }

        // Descending by start time; sessions without one sort last. The sort
        // is stable, so ties keep the filename order established above.
        sessions.sort_by(|a, b| b.start_time.cmp(&a.start_time));
        Ok(sessions)
    }

    /// Fetch one session by id.
    pub async fn get(&self, session_id: &str) -> Result<Session> {
        let path = self.session_path(session_id)?;
        if !path_exists(&path).await {
            return Err(Error::NotFound(format!("Session not found: {session_id}")));
        }
        let content = fs::read_to_string(&path).await?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Persist a new session. An id and start time are assigned when the
    /// payload carries none, so a bare `{}` create is valid.
    pub async fn create(&self, mut session: Session) -> Result<Session> {
        if session.id.is_empty() {
            session.id = ids::session_id();
        }
        if session.start_time.is_none() {
            session.start_time = Some(Utc::now());
        }
        let path = self.session_path(&session.id)?;
        self.write_session(&path, &session).await?;
        Ok(session)
    }

    /// Replace a session record wholesale. The stored id is forced to match
    /// `session_id` even when the payload disagrees.
    ///
    /// Saving to an id with no backing file is allowed (the client may hold a
    /// record whose file was removed out from under it) but logged, since it
    /// usually means an external cleanup raced a live session.
    pub async fn put(&self, session_id: &str, mut session: Session) -> Result<Session> {
        let path = self.session_path(session_id)?;
        if !path_exists(&path).await {
            warn!("Saving session {session_id} with no existing file; creating it");
        }
        session.id = session_id.to_string();
        self.write_session(&path, &session).await?;
        Ok(session)
    }

    /// Remove a session file.
    pub async fn delete(&self, session_id: &str) -> Result<()> {
        let path = self.session_path(session_id)?;
        if !path_exists(&path).await {
            return Err(Error::NotFound(format!("Session not found: {session_id}")));
        }
        fs::remove_file(&path).await?;
        Ok(())
    }

    fn session_path(&self, session_id: &str) -> Result<PathBuf> {
        if !ids::is_safe_id(session_id) {
            return Err(Error::InvalidInput(format!(
                "Invalid session id: {session_id}"
            )));
        }
        Ok(self.dir.join(format!("{session_id}.json")))
    }

    async fn write_session(&self, path: &Path, session: &Session) -> Result<()> {
        let json = serde_json::to_string_pretty(session)?;
        fs::write(path, json).await?;
        Ok(())
    }
}

async fn path_exists(path: &Path) -> bool {
    fs::try_exists(path).await.unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, SessionStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path());
        (dir, store)
    }

    #[tokio::test]
    async fn create_assigns_id_and_start_time() {
        let (_dir, store) = store();
        let session = store.create(Session::default()).await.unwrap();
        assert!(session.id.starts_with("session-"));
        assert!(session.start_time.is_some());

        let loaded = store.get(&session.id).await.unwrap();
        assert_eq!(loaded, session);
    }

    #[tokio::test]
    async fn create_keeps_caller_supplied_fields() {
        let (_dir, store) = store();
        let session = store
            .create(Session {
                id: "session-77".into(),
                start_time: Some("2025-02-01T09:00:00Z".parse().unwrap()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(session.id, "session-77");
        assert_eq!(
            session.start_time,
            Some("2025-02-01T09:00:00Z".parse().unwrap())
        );
    }

    #[tokio::test]
    async fn put_forces_id_from_path_parameter() {
        let (_dir, store) = store();
        let created = store.create(Session::default()).await.unwrap();

        let mut payload = created.clone();
        payload.id = "something-else".into();
        payload.notes = "updated".into();
        let saved = store.put(&created.id, payload).await.unwrap();
        assert_eq!(saved.id, created.id);

        let loaded = store.get(&created.id).await.unwrap();
        assert_eq!(loaded.notes, "updated");
    }

    #[tokio::test]
    async fn list_sorts_newest_first() {
        let (_dir, store) = store();
        for (id, time) in [
            ("session-1", "2025-01-01T08:00:00Z"),
            ("session-3", "2025-03-01T08:00:00Z"),
            ("session-2", "2025-02-01T08:00:00Z"),
        ] {
            store
                .create(Session {
                    id: id.into(),
                    start_time: Some(time.parse().unwrap()),
                    ..Default::default()
                })
                .await
                .unwrap();
        }

        let ids: Vec<String> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(ids, ["session-3", "session-2", "session-1"]);
    }

    #[tokio::test]
    async fn list_skips_corrupt_files() {
        let (dir, store) = store();
        store
            .create(Session {
                id: "session-ok".into(),
                ..Default::default()
            })
            .await
            .unwrap();
        std::fs::write(dir.path().join("broken.json"), "{not json").unwrap();

        let sessions = store.list().await.unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].id, "session-ok");
    }

    #[tokio::test]
    async fn delete_removes_file() {
        let (_dir, store) = store();
        let session = store.create(Session::default()).await.unwrap();
        store.delete(&session.id).await.unwrap();
        assert!(matches!(
            store.get(&session.id).await,
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            store.delete(&session.id).await,
            Err(Error::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn traversal_ids_are_rejected() {
        let (_dir, store) = store();
        assert!(matches!(
            store.get("../escape").await,
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            store.delete("a/b").await,
            Err(Error::InvalidInput(_))
        ));
    }
}
