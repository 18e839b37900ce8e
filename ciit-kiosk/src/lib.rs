//! ciit-kiosk library - Interviewer-facing client for the interview service
//!
//! Wraps the ciit-server HTTP API and keeps the in-progress session safe
//! across crashes: every mutation is mirrored synchronously to a local
//! recovery file, and a background autosave pushes dirty state to the server
//! on an interval. The summary module projects a finished session into the
//! figures shown on the closing screen.

pub mod api;
pub mod cache;
pub mod manager;
pub mod summary;

pub use api::ApiClient;
pub use cache::RecoveryCache;
pub use manager::{
    spawn_autosave, IdeaDraft, SessionDraft, SessionManager, SessionPatch, AUTOSAVE_INTERVAL,
};
pub use summary::{export_file_name, export_json, summarize, ReviewedConcept, SessionSummary};
