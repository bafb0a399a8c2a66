//! Admin-panel state stores for a blog REST API.
//!
//! Each entity kind (blogs, entries) gets an [`store::EntityStore`] that
//! turns CRUD intents into HTTP requests and reduces the request lifecycle
//! into a consistent [`store::StoreState`]: loading and updating flags, the
//! last error, the paginated collection, and the current record.

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod store;

pub use error::StoreError;
