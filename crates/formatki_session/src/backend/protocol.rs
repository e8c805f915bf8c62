//! Protocol types for the session's backend worker.

use formatki_core::{CatalogError, GenerateOutcome, GenerateRequest};

/// Upstream-state tag attached to read requests.
///
/// The session bumps its epoch whenever the state a request depends on
/// changes; a response whose epoch no longer matches is stale and dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Epoch(pub u64);

/// Commands issued by the session for the backend worker to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreCmd {
    /// Fetch the category names.
    LoadCategories,
    /// Fetch the GT candidates for a category.
    FetchGtList { epoch: Epoch, category: String },
    /// Fetch the KW candidates for the current GT selection.
    FetchKwList { epoch: Epoch, gt_list: Vec<String> },
    /// Expand pasted text into canonical GT names.
    ResolveGt {
        epoch: Epoch,
        category: String,
        raw: String,
    },
    /// Generate and mail the file for a validated selection.
    Generate { request: GenerateRequest },
}

/// Which request a backend failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreErrorSource {
    Categories,
    GtList { epoch: Epoch },
    KwList { epoch: Epoch },
    ResolveGt { epoch: Epoch },
    Generate,
}

/// Events produced by the backend worker and consumed by the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreEvent {
    CategoriesLoaded {
        items: Vec<String>,
    },
    GtListLoaded {
        epoch: Epoch,
        category: String,
        items: Vec<String>,
    },
    KwListLoaded {
        epoch: Epoch,
        items: Vec<String>,
    },
    GtResolved {
        epoch: Epoch,
        items: Vec<String>,
    },
    /// The service answered the generation request.
    Generated {
        outcome: GenerateOutcome,
    },
    /// A remote call failed.
    Error {
        source: CoreErrorSource,
        error: CatalogError,
    },
}
