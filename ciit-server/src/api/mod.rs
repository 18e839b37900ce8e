//! HTTP API handlers for ciit-server

pub mod catalog;
pub mod health;
pub mod images;
pub mod sessions;

pub use catalog::catalog_routes;
pub use health::health_routes;
pub use images::upload_concept_image;
pub use sessions::session_routes;
