//! Backend worker wiring for the form session.
//!
//! This module exposes the command/event protocol plus the worker spawn helper
//! used by the thread that owns the [`crate::FormSession`].

mod protocol;
mod worker;

pub use protocol::{CoreCmd, CoreErrorSource, CoreEvent, Epoch};
pub use worker::{spawn_backend, BackendHandle};
