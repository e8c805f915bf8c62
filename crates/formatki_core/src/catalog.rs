//! Contract of the remote data source behind the selection form.

use crate::error::CatalogError;
use crate::models::{GenerateOutcome, GenerateRequest};

/// Read and generate operations offered by the remote service.
///
/// Calls block until the service answers; callers run them off the thread
/// that owns the form state. Implementations keep no local state.
pub trait RemoteCatalog: Send {
    /// Names of the selectable categories, in the service's order.
    fn categories(&mut self) -> Result<Vec<String>, CatalogError>;

    /// GT tokens valid for `category`.
    fn gt_list(&mut self, category: &str) -> Result<Vec<String>, CatalogError>;

    /// KW tokens valid for the union of `gt_list`.
    fn kw_list(&mut self, gt_list: &[String]) -> Result<Vec<String>, CatalogError>;

    /// Canonical GT names matched by arbitrary pasted text within `category`.
    fn resolve_gt(&mut self, category: &str, raw: &str) -> Result<Vec<String>, CatalogError>;

    /// Ask the service to build and mail the file for a selection.
    fn generate(&mut self, request: &GenerateRequest) -> Result<GenerateOutcome, CatalogError>;
}
