//! Request and response payloads exchanged with the generation service.
//!
//! Field names on the wire follow the service (`pion`, `gtList`, ...); the
//! Rust side uses domain names.

use crate::constants::DEFAULT_GENERATED_FILENAME;
use crate::error::CatalogError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Body of the generation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateRequest {
    #[serde(rename = "pion")]
    pub category: String,
    #[serde(rename = "gtList")]
    pub gt_list: Vec<String>,
    #[serde(rename = "kwList")]
    pub kw_list: Vec<String>,
    pub email: String,
}

/// Body of the KW lookup for a GT selection.
#[derive(Debug, Serialize)]
pub struct KwListRequest<'a> {
    #[serde(rename = "gtList")]
    pub gt_list: &'a [String],
}

/// Body of the pasted-GT resolution request.
#[derive(Debug, Serialize)]
pub struct ResolveGtRequest<'a> {
    #[serde(rename = "pion")]
    pub category: &'a str,
    pub raw: &'a str,
}

/// Raw generation response as sent by the service.
///
/// The download reference has been published under several keys over time;
/// all of them are accepted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub file_url: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default, rename = "fileUrl")]
    pub file_url_camel: Option<String>,
    #[serde(default)]
    pub download_url: Option<String>,
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

impl GenerateResponse {
    /// First non-blank download reference, in the service's precedence order.
    pub fn download_reference(&self) -> Option<&str> {
        non_blank(&self.file_url)
            .or_else(|| non_blank(&self.url))
            .or_else(|| non_blank(&self.file_url_camel))
            .or_else(|| non_blank(&self.download_url))
    }

    /// Interpret the response.
    ///
    /// `accepted` is whether the HTTP status was a success; a `success: true`
    /// body under an error status is still a rejection.
    pub fn into_outcome(self, accepted: bool) -> GenerateOutcome {
        if accepted && self.success {
            let download_url = self.download_reference().map(str::to_string);
            let filename = non_blank(&self.filename)
                .unwrap_or(DEFAULT_GENERATED_FILENAME)
                .to_string();
            return GenerateOutcome::Generated {
                filename,
                download_url,
                note: non_blank(&self.message).map(str::to_string),
            };
        }
        let reason = non_blank(&self.error)
            .unwrap_or("Unknown error")
            .to_string();
        GenerateOutcome::Rejected { reason }
    }
}

/// Result of a well-formed generation exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerateOutcome {
    /// The file was produced and mailed.
    Generated {
        filename: String,
        download_url: Option<String>,
        note: Option<String>,
    },
    /// The service refused the request and said why.
    Rejected { reason: String },
}

/// Category names from the data-structure document.
///
/// Only the keys of the top-level object matter; their order is preserved.
pub fn parse_categories(body: &str) -> Result<Vec<String>, CatalogError> {
    let map: Map<String, Value> =
        serde_json::from_str(body).map_err(|err| CatalogError::Decode(err.to_string()))?;
    Ok(map
        .keys()
        .map(|key| key.trim().to_string())
        .filter(|key| !key.is_empty())
        .collect())
}

/// A JSON array of strings, as returned by the GT/KW/resolve endpoints.
pub fn parse_token_list(body: &str) -> Result<Vec<String>, CatalogError> {
    serde_json::from_str::<Vec<String>>(body).map_err(|err| CatalogError::Decode(err.to_string()))
}

/// Names resolved from pasted GT text.
///
/// Valid JSON that is not an array resolves to nothing, so a paste the
/// service cannot interpret adds no tags instead of failing.
pub fn parse_resolved_gt(body: &str) -> Result<Vec<String>, CatalogError> {
    let value: Value =
        serde_json::from_str(body).map_err(|err| CatalogError::Decode(err.to_string()))?;
    if !value.is_array() {
        return Ok(Vec::new());
    }
    serde_json::from_value(value).map_err(|err| CatalogError::Decode(err.to_string()))
}
