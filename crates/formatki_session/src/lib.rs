//! Session controller for the Formatki selection form.
//!
//! [`FormSession`] owns the category -> GT -> KW cascade, bulk paste
//! resolution, and submission. Remote calls run on a backend worker thread
//! ([`backend::spawn_backend`]); the session consumes UI events and emits
//! render commands, so any presentation layer can drive it.

pub mod backend;
pub mod session;

pub use backend::{spawn_backend, BackendHandle, CoreCmd, CoreErrorSource, CoreEvent, Epoch};
pub use session::{
    DownloadLink, FormSession, FormState, Input, PasteOutcome, RenderCmd, Stage, UiEvent,
};
