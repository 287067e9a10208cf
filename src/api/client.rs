// src/api/client.rs
//! HTTP client for the Notion API.
//!
//! A thin wrapper around reqwest that handles authentication and the
//! request/response plumbing for each endpoint the relay uses.

use super::parser::parse_api_response;
use super::responses::{BlockList, CreatedObject, DatabaseSchema, PaginatedResponse, QueryPage};
use crate::constants::{NOTION_API_BASE_URL, NOTION_VERSION};
use crate::error::AppError;
use crate::model::{Block, DatabaseSummary, PageRecord};
use crate::types::{ApiKey, BlockId, DatabaseId, NotionId, PageId};
use indexmap::IndexMap;
use reqwest::{header, Client, Response};
use serde::Serialize;
use serde_json::{json, Value};
use url::Url;

/// A thin wrapper around reqwest Client for Notion API requests.
#[derive(Clone)]
pub struct NotionHttpClient {
    client: Client,
    base_url: String,
}

impl NotionHttpClient {
    /// Creates a new HTTP client with Notion API authentication.
    pub fn new(api_key: &ApiKey) -> Result<Self, AppError> {
        Self::with_base_url(api_key, NOTION_API_BASE_URL)
    }

    /// Creates a client against a different API root (used to point at a mock server).
    pub fn with_base_url(api_key: &ApiKey, base_url: &str) -> Result<Self, AppError> {
        let parsed = Url::parse(base_url).map_err(|e| {
            AppError::MissingConfiguration(format!("Invalid API base URL '{}': {}", base_url, e))
        })?;
        let client = Client::builder()
            .default_headers(Self::create_headers(api_key)?)
            .build()?;
        Ok(Self {
            client,
            base_url: parsed.as_str().trim_end_matches('/').to_string(),
        })
    }

    /// Creates the default headers for Notion API requests.
    fn create_headers(api_key: &ApiKey) -> Result<header::HeaderMap, AppError> {
        let mut headers = header::HeaderMap::new();

        let auth_header = format!("Bearer {}", api_key.as_str());
        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_str(&auth_header).map_err(|e| {
                AppError::MissingConfiguration(format!("Invalid API token format: {}", e))
            })?,
        );

        headers.insert(
            "Notion-Version",
            header::HeaderValue::from_static(NOTION_VERSION),
        );

        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        Ok(headers)
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint)
    }

    /// Makes a GET request to the specified endpoint (path without base URL).
    pub async fn get(&self, endpoint: &str) -> Result<Response, AppError> {
        let url = self.url(endpoint);
        log::debug!("GET {}", url);
        Ok(self.client.get(url).send().await?)
    }

    /// Makes a POST request with JSON body to the specified endpoint.
    pub async fn post<T: Serialize>(&self, endpoint: &str, body: &T) -> Result<Response, AppError> {
        let url = self.url(endpoint);
        log::debug!("POST {}", url);
        Ok(self.client.post(url).json(body).send().await?)
    }

    /// Makes a PATCH request with JSON body to the specified endpoint.
    pub async fn patch<T: Serialize>(
        &self,
        endpoint: &str,
        body: &T,
    ) -> Result<Response, AppError> {
        let url = self.url(endpoint);
        log::debug!("PATCH {}", url);
        Ok(self.client.patch(url).json(body).send().await?)
    }
}

#[async_trait::async_trait]
impl super::NotionRepository for NotionHttpClient {
    async fn query_database(&self, database: &DatabaseId) -> Result<QueryPage, AppError> {
        let endpoint = format!("databases/{}/query", database.to_dashed());
        let response = self.post(&endpoint, &json!({})).await?;
        parse_api_response(extract_response_text(response).await?)
    }

    async fn retrieve_database_schema(
        &self,
        database: &DatabaseId,
    ) -> Result<Vec<String>, AppError> {
        let endpoint = format!("databases/{}", database.to_dashed());
        let response = self.get(&endpoint).await?;
        let schema: DatabaseSchema = parse_api_response(extract_response_text(response).await?)?;
        Ok(schema.property_names())
    }

    async fn retrieve_page(&self, page: &PageId) -> Result<PageRecord, AppError> {
        let endpoint = format!("pages/{}", page.to_dashed());
        let response = self.get(&endpoint).await?;
        parse_api_response(extract_response_text(response).await?)
    }

    async fn create_page(
        &self,
        database: &DatabaseId,
        properties: &IndexMap<String, Value>,
    ) -> Result<PageId, AppError> {
        let body = json!({
            "parent": { "database_id": database.to_dashed() },
            "properties": properties,
        });
        let response = self.post("pages", &body).await?;
        let created: CreatedObject = parse_api_response(extract_response_text(response).await?)?;
        Ok(PageId::from_normalized(created.id))
    }

    async fn retrieve_children(&self, parent: &NotionId) -> Result<Vec<Block>, AppError> {
        let endpoint = format!("blocks/{}/children", parent.to_hyphenated());
        let response = self.get(&endpoint).await?;
        let list: BlockList = parse_api_response(extract_response_text(response).await?)?;
        if list.has_more {
            log::warn!(
                "{} has more than one page of children; only the first {} are used",
                parent,
                list.results.len()
            );
        }
        Ok(list.results)
    }

    async fn append_children(
        &self,
        parent: &NotionId,
        children: Vec<Value>,
    ) -> Result<Vec<Block>, AppError> {
        let endpoint = format!("blocks/{}/children", parent.to_hyphenated());
        let response = self
            .patch(&endpoint, &json!({ "children": children }))
            .await?;
        let list: BlockList = parse_api_response(extract_response_text(response).await?)?;
        Ok(list.results)
    }

    async fn retrieve_block(&self, block: &BlockId) -> Result<Block, AppError> {
        let endpoint = format!("blocks/{}", block.to_dashed());
        let response = self.get(&endpoint).await?;
        parse_api_response(extract_response_text(response).await?)
    }

    async fn search_databases(&self) -> Result<Vec<DatabaseSummary>, AppError> {
        let body = json!({
            "query": "",
            "filter": { "value": "database", "property": "object" },
            "sort": { "direction": "descending", "timestamp": "last_edited_time" }
        });
        let response = self.post("search", &body).await?;
        let list: PaginatedResponse<DatabaseSummary> =
            parse_api_response(extract_response_text(response).await?)?;
        Ok(list.results)
    }
}

/// Result of an HTTP operation with response metadata.
#[derive(Debug)]
pub struct ApiResponse<T> {
    pub data: T,
    pub status: reqwest::StatusCode,
    pub url: String,
}

/// Extracts the response body as text with metadata.
pub async fn extract_response_text(response: Response) -> Result<ApiResponse<String>, AppError> {
    let status = response.status();
    let url = response.url().to_string();
    let text = response.text().await?;

    Ok(ApiResponse {
        data: text,
        status,
        url,
    })
}
