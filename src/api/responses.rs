// src/api/responses.rs
//! Wire shapes of the Notion responses the relay reads.

use crate::model::{Block, PageRecord};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Generic paginated response wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    #[serde(default)]
    pub object: String,
    pub results: Vec<T>,
    #[serde(default)]
    pub next_cursor: Option<String>,
    #[serde(default)]
    pub has_more: bool,
}

/// Database query response; only the first page is ever requested.
pub type QueryPage = PaginatedResponse<PageRecord>;

/// Block children / append response.
pub type BlockList = PaginatedResponse<Block>;

/// `GET /databases/{id}`; only the schema keys are used.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSchema {
    #[serde(default)]
    pub properties: Map<String, Value>,
}

impl DatabaseSchema {
    pub fn property_names(self) -> Vec<String> {
        self.properties.into_iter().map(|(name, _)| name).collect()
    }
}

/// Any object response where only the id matters (e.g. create page).
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedObject {
    pub id: String,
}

/// Notion's error body: `{"object": "error", "status": 404, "code": ..., "message": ...}`.
#[derive(Debug, Clone, Deserialize)]
pub struct NotionErrorBody {
    pub status: u16,
    pub code: String,
    pub message: String,
    #[serde(default)]
    pub request_id: Option<String>,
}
