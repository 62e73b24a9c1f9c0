//! Backend contract, result rendering, and preference storage for critique.
//!
//! Nothing in this crate touches the terminal. The `critique` binary owns the
//! event loop and calls into these modules from spawned tasks.

pub mod api;
pub mod error;
pub mod models;
pub mod prefs;
pub mod render;
pub mod schema;
pub mod types;

pub use api::{ApiFlavor, ClientOptions, ReviewClient};
pub use error::{ApiError, StoreError};
pub use models::ModelSelector;
pub use prefs::PreferenceStore;
pub use render::{Block, RenderedResult, ResultRenderer};
pub use types::{ReviewPayload, ReviewRequest, SourceLanguage};
