//! Core domain library for Formatki (config, selection state, wire models).

/// Remote catalog contract consumed by the session and implemented by clients.
pub mod catalog;
/// Configuration loading and defaults.
pub mod config;
/// Shared constants.
pub mod constants;
/// Email-list parsing.
pub mod email;
/// Error types for remote calls, validation, and local storage.
pub mod error;
/// Single transient status message with auto-expiry.
pub mod message;
/// Request/response payloads exchanged with the generation service.
pub mod models;
/// Remembered-email persistence.
pub mod store;
/// Ordered, case-insensitive tag sets and candidate filtering.
pub mod tags;

pub use catalog::RemoteCatalog;
pub use config::Config;
pub use constants::{
    is_lighting, DEFAULT_SERVER_URL, DEFAULT_TIMEOUT_SECS, LIGHTING_CATEGORY, MESSAGE_TTL,
};
pub use error::{CatalogError, StoreError, ValidationError};
pub use message::{Message, MessageCenter};
pub use models::{GenerateOutcome, GenerateRequest};
pub use store::{EmailStore, FileEmailStore, MemoryEmailStore};
pub use tags::{candidates, split_tokens, TagSet};
