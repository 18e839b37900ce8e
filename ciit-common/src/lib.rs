//! # CIIT Common Library
//!
//! Shared code for the CIIT interview tool including:
//! - Catalog and session data model
//! - Identifier and slug helpers
//! - Error types
//! - Configuration and data-folder resolution

pub mod config;
pub mod error;
pub mod ids;
pub mod model;

pub use error::{Error, Result};
