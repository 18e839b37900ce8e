//! Feedback summary projection and session export
//!
//! Pure functions over a session snapshot; nothing here mutates state or
//! touches the network.

use chrono::{DateTime, Utc};
use ciit_common::model::{Concept, ConceptFeedback, Session};
use ciit_common::Result;
use serde::Serialize;

/// One concept the participant reviewed, joined with their feedback.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewedConcept {
    pub concept: Concept,
    pub feedback: ConceptFeedback,
}

/// Figures for the closing summary screen.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub session_id: String,
    pub participant_id: String,
    pub completed: bool,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    /// Catalog topics plus free-text custom topics.
    pub topics_selected: usize,
    /// Catalog barriers plus free-text custom barriers.
    pub barriers_selected: usize,
    /// Raw feedback map size. Entries whose concept has left the catalog
    /// still count here even though they are absent from `reviewed`.
    pub feedback_entries: usize,
    pub ideas_captured: usize,
    pub reviewed: Vec<ReviewedConcept>,
}

/// Project a session against the current catalog.
///
/// `reviewed` follows the feedback map's key order. Feedback for concepts
/// no longer in the catalog is dropped from `reviewed` without complaint;
/// the catalog is hand-edited and entries do disappear mid-session.
pub fn summarize(session: &Session, concepts: &[Concept]) -> SessionSummary {
    let reviewed = session
        .concept_feedback
        .iter()
        .filter_map(|(concept_id, feedback)| {
            concepts
                .iter()
                .find(|c| &c.id == concept_id)
                .map(|concept| ReviewedConcept {
                    concept: concept.clone(),
                    feedback: feedback.clone(),
                })
        })
        .collect();

    SessionSummary {
        session_id: session.id.clone(),
        participant_id: session.participant_id.clone(),
        completed: session.is_completed(),
        start_time: session.start_time,
        end_time: session.end_time,
        topics_selected: session.selected_topics.len() + session.custom_topics.len(),
        barriers_selected: session.selected_barriers.as_ref().map_or(0, Vec::len)
            + session.custom_barriers.as_ref().map_or(0, Vec::len),
        feedback_entries: session.concept_feedback.len(),
        ideas_captured: session.new_ideas.len(),
        reviewed,
    }
}

/// Pretty JSON snapshot of the full session, as offered for download.
pub fn export_json(session: &Session) -> Result<String> {
    Ok(serde_json::to_string_pretty(session)?)
}

/// Download filename for an exported session.
pub fn export_file_name(session: &Session) -> String {
    format!("session-{}.json", session.participant_id)
}
