//! Notion REST client
//!
//! [`NotionApi`] is the narrow surface the upload driver and diagnostics use.
//! [`NotionClient`] implements it over blocking HTTP; tests substitute fakes.

use miette::Diagnostic;
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::debug;

use crate::core::config::{Config, Credentials};
use crate::notion::payload::PageRequest;

/// Longest response body kept in an error message
const MAX_ERROR_BODY: usize = 400;

#[derive(Debug, Error, Diagnostic)]
pub enum ApiError {
    #[error("Request to {url} failed: {source}")]
    #[diagnostic(code(huntr_notion::api::transport))]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}: {body}")]
    #[diagnostic(code(huntr_notion::api::status))]
    Status {
        url: String,
        status: u16,
        body: String,
    },

    #[error("Failed to decode response from {url}: {message}")]
    #[diagnostic(code(huntr_notion::api::decode))]
    Decode { url: String, message: String },

    #[error("Invalid value for the {name} header")]
    #[diagnostic(code(huntr_notion::api::header))]
    InvalidHeader { name: &'static str },

    #[error("Failed to build HTTP client: {0}")]
    #[diagnostic(code(huntr_notion::api::client))]
    Client(#[source] reqwest::Error),
}

/// One page of `POST /v1/databases/{id}/query`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryPage {
    #[serde(default)]
    pub results: Vec<serde_json::Value>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub next_cursor: Option<String>,
}

/// Response of `GET /v1/databases/{id}`, reduced to the property schema
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DatabaseInfo {
    #[serde(default)]
    pub properties: BTreeMap<String, PropertyInfo>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PropertyInfo {
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Serialize)]
struct QueryRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    start_cursor: Option<&'a str>,
}

/// Operations needed from the Notion API
pub trait NotionApi {
    /// Create one page
    fn create_page(&self, page: &PageRequest) -> Result<(), ApiError>;

    /// Fetch one page of database entries, starting at `start_cursor`
    fn query_database(&self, start_cursor: Option<&str>) -> Result<QueryPage, ApiError>;

    /// Fetch the database schema
    fn retrieve_database(&self) -> Result<DatabaseInfo, ApiError>;
}

/// Blocking HTTP implementation of [`NotionApi`]
#[derive(Debug)]
pub struct NotionClient {
    http: Client,
    api_base: String,
    database_id: String,
}

impl NotionClient {
    /// Build a client for the configured API base and database
    pub fn new(credentials: &Credentials, config: &Config) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", credentials.api_key))
            .map_err(|_| ApiError::InvalidHeader {
                name: "Authorization",
            })?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            "Notion-Version",
            HeaderValue::from_str(config.notion_version()).map_err(|_| ApiError::InvalidHeader {
                name: "Notion-Version",
            })?,
        );

        let http = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout())
            .build()
            .map_err(ApiError::Client)?;

        Ok(Self {
            http,
            api_base: config.api_base().to_string(),
            database_id: credentials.database_id.clone(),
        })
    }

    pub fn database_id(&self) -> &str {
        &self.database_id
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }

    fn send(&self, request: RequestBuilder, url: &str) -> Result<Response, ApiError> {
        let response = request.send().map_err(|source| ApiError::Transport {
            url: url.to_string(),
            source,
        })?;

        let status = response.status();
        debug!(url, status = status.as_u16(), "notion response");
        if status.is_success() {
            Ok(response)
        } else {
            let body = response.text().unwrap_or_default();
            Err(ApiError::Status {
                url: url.to_string(),
                status: status.as_u16(),
                body: truncate_body(&body),
            })
        }
    }

    fn decode<T: DeserializeOwned>(response: Response, url: &str) -> Result<T, ApiError> {
        response.json::<T>().map_err(|e| ApiError::Decode {
            url: url.to_string(),
            message: e.to_string(),
        })
    }
}

impl NotionApi for NotionClient {
    fn create_page(&self, page: &PageRequest) -> Result<(), ApiError> {
        let url = self.url("/v1/pages");
        self.send(self.http.post(&url).json(page), &url)?;
        Ok(())
    }

    fn query_database(&self, start_cursor: Option<&str>) -> Result<QueryPage, ApiError> {
        let url = self.url(&format!("/v1/databases/{}/query", self.database_id));
        let body = QueryRequest { start_cursor };
        let response = self.send(self.http.post(&url).json(&body), &url)?;
        Self::decode(response, &url)
    }

    fn retrieve_database(&self) -> Result<DatabaseInfo, ApiError> {
        let url = self.url(&format!("/v1/databases/{}", self.database_id));
        let response = self.send(self.http.get(&url), &url)?;
        Self::decode(response, &url)
    }
}

/// Keep error bodies readable; Notion error pages can be large
fn truncate_body(body: &str) -> String {
    let trimmed = body.trim();
    match trimmed.char_indices().nth(MAX_ERROR_BODY) {
        Some((idx, _)) => format!("{}…", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}
