//! Blocking HTTP client for the Formatki generation service.
//!
//! [`HttpCatalog`] implements [`RemoteCatalog`] over the service's JSON API.
//! It runs on the session's backend worker thread, so no async runtime is
//! needed by callers.

use formatki_core::models::{
    parse_categories, parse_resolved_gt, parse_token_list, GenerateResponse, KwListRequest,
    ResolveGtRequest,
};
use formatki_core::{CatalogError, Config, GenerateOutcome, GenerateRequest, RemoteCatalog};
use reqwest::blocking::{Client, Response};
use reqwest::{StatusCode, Url};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// [`RemoteCatalog`] backed by the service's HTTP endpoints.
#[derive(Debug, Clone)]
pub struct HttpCatalog {
    http: Client,
    base: Url,
}

/// Pick a human-readable reason from an error response.
///
/// Prefers the JSON `error` field, then the raw body, then the canonical
/// reason phrase of `status`.
pub fn error_message_for_response(status: StatusCode, body: &str) -> String {
    if body.trim().is_empty() {
        return status
            .canonical_reason()
            .unwrap_or("Request failed")
            .to_string();
    }

    if let Ok(value) = serde_json::from_str::<Value>(body) {
        return value
            .get("error")
            .and_then(|v| v.as_str())
            .unwrap_or(body)
            .to_string();
    }

    body.to_string()
}

/// Append path `segments` to the `server` base URL, percent-encoding each one.
pub fn api_url(server: &Url, segments: &[&str]) -> Result<Url, CatalogError> {
    let mut url = server.clone();
    let mut path = url.path_segments_mut().map_err(|_| {
        CatalogError::InvalidUrl(format!("'{}' cannot be used as an API base", server))
    })?;
    path.pop_if_empty();
    for segment in segments {
        path.push(segment);
    }
    drop(path);
    Ok(url)
}

/// Parse and tidy a server base URL.
///
/// `http://localhost` is rewritten to `127.0.0.1` to skip IPv6 resolution
/// delays, and trailing slashes are dropped.
pub fn normalize_server(server: &str) -> Result<Url, CatalogError> {
    let trimmed = server.trim();
    let mut url = Url::parse(trimmed)
        .map_err(|err| CatalogError::InvalidUrl(format!("'{}': {}", trimmed, err)))?;
    let is_plain_localhost =
        url.scheme().eq_ignore_ascii_case("http") && url.host_str() == Some("localhost");
    if is_plain_localhost && url.set_host(Some("127.0.0.1")).is_err() {
        return Err(CatalogError::InvalidUrl(trimmed.to_string()));
    }
    while url.path().len() > 1 && url.path().ends_with('/') {
        let path = url.path().trim_end_matches('/').to_string();
        url.set_path(&path);
    }
    Ok(url)
}

fn transport(err: reqwest::Error) -> CatalogError {
    CatalogError::Transport(err.to_string())
}

fn read_body(response: Response) -> Result<(StatusCode, String), CatalogError> {
    let status = response.status();
    let body = response.text().map_err(transport)?;
    Ok((status, body))
}

fn success_body(response: Response) -> Result<String, CatalogError> {
    let (status, body) = read_body(response)?;
    if status.is_success() {
        return Ok(body);
    }
    Err(CatalogError::Status {
        status: status.as_u16(),
        message: error_message_for_response(status, &body),
    })
}

impl HttpCatalog {
    /// Build a client for `server` with a per-request `timeout`.
    pub fn new(server: &str, timeout: Duration) -> Result<Self, CatalogError> {
        let base = normalize_server(server)?;
        let http = Client::builder().timeout(timeout).build().map_err(transport)?;
        Ok(Self { http, base })
    }

    pub fn from_config(config: &Config) -> Result<Self, CatalogError> {
        Self::new(&config.server_url, Duration::from_secs(config.timeout_secs))
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, CatalogError> {
        api_url(&self.base, segments)
    }

    /// Turn a download reference from the service into an absolute URL.
    ///
    /// Relative references are resolved against the server base.
    pub fn download_url(&self, reference: &str) -> Result<Url, CatalogError> {
        let reference = reference.trim();
        match Url::parse(reference) {
            Ok(url) => Ok(url),
            Err(_) => self
                .base
                .join(reference)
                .map_err(|err| CatalogError::InvalidUrl(format!("'{}': {}", reference, err))),
        }
    }

    /// Fetch the generated file behind a download reference.
    pub fn download(&self, reference: &str) -> Result<Vec<u8>, CatalogError> {
        let url = self.download_url(reference)?;
        debug!(url = %url, "downloading generated file");
        let response = self.http.get(url).send().map_err(transport)?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(CatalogError::Status {
                status: status.as_u16(),
                message: error_message_for_response(status, &body),
            });
        }
        let bytes = response.bytes().map_err(transport)?;
        Ok(bytes.to_vec())
    }
}

impl RemoteCatalog for HttpCatalog {
    fn categories(&mut self) -> Result<Vec<String>, CatalogError> {
        let url = self.endpoint(&["api", "get_data_structure"])?;
        let response = self.http.get(url).send().map_err(transport)?;
        parse_categories(&success_body(response)?)
    }

    fn gt_list(&mut self, category: &str) -> Result<Vec<String>, CatalogError> {
        let url = self.endpoint(&["api", "get_gt"])?;
        let response = self
            .http
            .get(url)
            .query(&[("pion", category)])
            .send()
            .map_err(transport)?;
        parse_token_list(&success_body(response)?)
    }

    fn kw_list(&mut self, gt_list: &[String]) -> Result<Vec<String>, CatalogError> {
        let url = self.endpoint(&["api", "get_kw_for_gt_list"])?;
        let response = self
            .http
            .post(url)
            .json(&KwListRequest { gt_list })
            .send()
            .map_err(transport)?;
        parse_token_list(&success_body(response)?)
    }

    fn resolve_gt(&mut self, category: &str, raw: &str) -> Result<Vec<String>, CatalogError> {
        let url = self.endpoint(&["api", "resolve_gt_codes"])?;
        let response = self
            .http
            .post(url)
            .json(&ResolveGtRequest { category, raw })
            .send()
            .map_err(transport)?;
        parse_resolved_gt(&success_body(response)?)
    }

    fn generate(&mut self, request: &GenerateRequest) -> Result<GenerateOutcome, CatalogError> {
        let url = self.endpoint(&["api", "generate"])?;
        let response = self.http.post(url).json(request).send().map_err(transport)?;
        let (status, body) = read_body(response)?;

        match serde_json::from_str::<GenerateResponse>(&body) {
            Ok(parsed) if status.is_success() || parsed.error.is_some() => {
                Ok(parsed.into_outcome(status.is_success()))
            }
            Ok(_) => Err(CatalogError::Status {
                status: status.as_u16(),
                message: error_message_for_response(status, &body),
            }),
            Err(err) if status.is_success() => {
                warn!(error = %err, "generation response was not valid JSON");
                Err(CatalogError::Decode(err.to_string()))
            }
            Err(_) => Err(CatalogError::Status {
                status: status.as_u16(),
                message: error_message_for_response(status, &body),
            }),
        }
    }
}
