//! Session state manager: the client-held mutable session
//!
//! Durability is two-tier. Every mutation mirrors the session to the local
//! recovery cache synchronously before returning, so a crash never loses
//! more than nothing. The server copy is refreshed lazily: `sync_now`
//! pushes only when the serialized session differs from the last snapshot
//! the server acknowledged, and `spawn_autosave` calls it on an interval.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use ciit_common::ids;
use ciit_common::model::{ConceptFeedback, Idea, Session};
use ciit_common::{Error, Result};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::api::ApiClient;
use crate::cache::RecoveryCache;

/// Interval between server pushes of dirty session state.
pub const AUTOSAVE_INTERVAL: Duration = Duration::from_secs(30);

/// Fields collected on the intake screen before a session starts.
#[derive(Debug, Clone, Default)]
pub struct SessionDraft {
    pub participant_id: String,
    pub participant_name: Option<String>,
    pub participant_role: String,
    pub organization_type: String,
    pub referral_source: Option<String>,
    pub consent_given: bool,
}

/// Partial update applied to the current session. `Some` overwrites the
/// field, `None` leaves it alone.
#[derive(Debug, Clone, Default)]
pub struct SessionPatch {
    pub has_invested_in_climate: Option<bool>,
    pub selected_topics: Option<Vec<String>>,
    pub custom_topics: Option<Vec<String>>,
    pub selected_barriers: Option<Vec<String>>,
    pub custom_barriers: Option<Vec<String>>,
    pub notes: Option<String>,
}

/// A new idea before the manager assigns its id and timestamp.
#[derive(Debug, Clone, Default)]
pub struct IdeaDraft {
    pub title: String,
    pub description: String,
    pub related_concept_id: Option<String>,
}

pub struct SessionManager {
    api: ApiClient,
    cache: RecoveryCache,
    current: Option<Session>,
    /// Serialized form of the session as last acknowledged by the server.
    last_synced: Option<String>,
}

impl SessionManager {
    /// Build a manager, restoring any session left in the recovery cache by
    /// a previous run. A restored session counts as dirty: the first sync
    /// pushes it even if the server already has an identical copy.
    pub fn restore(api: ApiClient, cache: RecoveryCache) -> Self {
        let current = cache.load();
        if let Some(session) = &current {
            info!("Recovered in-progress session {} from cache", session.id);
        }
        Self {
            api,
            cache,
            current,
            last_synced: None,
        }
    }

    pub fn current(&self) -> Option<&Session> {
        self.current.as_ref()
    }

    /// Start a new session: assign id and start time, persist to the server,
    /// and adopt the stored record as current.
    pub async fn create(&mut self, draft: SessionDraft) -> Result<Session> {
        let session = Session {
            id: ids::session_id(),
            participant_id: draft.participant_id,
            participant_name: draft.participant_name,
            participant_role: draft.participant_role,
            organization_type: draft.organization_type,
            referral_source: draft.referral_source,
            consent_given: draft.consent_given,
            start_time: Some(Utc::now()),
            ..Default::default()
        };

        let stored = self.api.create_session(&session).await?;
        self.last_synced = serde_json::to_string(&stored).ok();
        self.cache.store(&stored);
        self.current = Some(stored.clone());
        Ok(stored)
    }

    /// Shallow-merge a patch into the current session. No-op without one.
    pub fn update(&mut self, patch: SessionPatch) {
        let Some(session) = self.current.as_mut() else {
            return;
        };
        if let Some(value) = patch.has_invested_in_climate {
            session.has_invested_in_climate = Some(value);
        }
        if let Some(topics) = patch.selected_topics {
            session.selected_topics = topics;
        }
        if let Some(topics) = patch.custom_topics {
            session.custom_topics = topics;
        }
        if let Some(barriers) = patch.selected_barriers {
            session.selected_barriers = Some(barriers);
        }
        if let Some(barriers) = patch.custom_barriers {
            session.custom_barriers = Some(barriers);
        }
        if let Some(notes) = patch.notes {
            session.notes = notes;
        }
        self.cache.store(session);
    }

    /// Record feedback for one concept, replacing any earlier entry.
    pub fn set_concept_feedback(&mut self, concept_id: &str, feedback: ConceptFeedback) {
        let Some(session) = self.current.as_mut() else {
            return;
        };
        session
            .concept_feedback
            .insert(concept_id.to_string(), feedback);
        self.cache.store(session);
    }

    /// Append a captured idea. Ideas are never edited or removed.
    pub fn add_idea(&mut self, draft: IdeaDraft) {
        let Some(session) = self.current.as_mut() else {
            return;
        };
        session.new_ideas.push(Idea {
            id: ids::idea_id(),
            title: draft.title,
            description: draft.description,
            related_concept_id: draft.related_concept_id,
            timestamp: Utc::now(),
        });
        self.cache.store(session);
    }

    /// Complete the session: stamp the end time (an existing stamp is kept,
    /// so calling twice persists the same instant), push to the server, and
    /// drop the recovery cache. The session stays loaded for the summary
    /// screen until `clear()`.
    pub async fn end(&mut self) -> Result<()> {
        let Some(session) = self.current.as_mut() else {
            return Err(Error::InvalidInput("No active session to end".to_string()));
        };
        if session.end_time.is_none() {
            session.end_time = Some(Utc::now());
        }

        let snapshot = session.clone();
        let stored = self.api.put_session(&snapshot).await?;
        self.last_synced = serde_json::to_string(&stored).ok();
        self.cache.clear();
        Ok(())
    }

    /// Drop the current session and its cache without persisting anything.
    pub fn clear(&mut self) {
        self.current = None;
        self.last_synced = None;
        self.cache.clear();
    }

    /// Push the current session to the server if it changed since the last
    /// acknowledged push. Returns whether a write happened.
    pub async fn sync_now(&mut self) -> Result<bool> {
        let Some(session) = &self.current else {
            return Ok(false);
        };
        let serialized = serde_json::to_string(session)?;
        if self.last_synced.as_deref() == Some(serialized.as_str()) {
            return Ok(false);
        }

        self.api.put_session(session).await?;
        debug!("Autosaved session {}", session.id);
        self.last_synced = Some(serialized);
        Ok(true)
    }
}

/// Run `sync_now` on an interval in a background task. Failures are logged;
/// the next tick is the retry.
pub fn spawn_autosave(manager: Arc<Mutex<SessionManager>>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick fires immediately; skip it so a freshly created
        // session is not pushed back before anything changed.
        interval.tick().await;

        loop {
            interval.tick().await;
            let mut manager = manager.lock().await;
            if let Err(err) = manager.sync_now().await {
                warn!("Autosave failed: {err}");
            }
        }
    })
}
