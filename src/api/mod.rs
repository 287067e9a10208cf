// src/api/mod.rs
//! Notion API interaction: the reads and writes both flows are built from.
//!
//! Business logic depends on [`NotionRepository`], never on HTTP details;
//! [`NotionHttpClient`] is the production implementation.

pub mod client;
pub mod parser;
pub mod responses;

use crate::error::AppError;
use crate::model::{Block, DatabaseSummary, PageRecord};
use crate::types::{BlockId, DatabaseId, NotionId, PageId};
use indexmap::IndexMap;
use serde_json::Value;

pub use client::NotionHttpClient;
pub use responses::QueryPage;

/// The operations the relay needs from a Notion workspace.
///
/// List operations make a single request and do not follow `next_cursor`.
#[async_trait::async_trait]
pub trait NotionRepository: Send + Sync {
    /// First page of rows of a database.
    async fn query_database(&self, database: &DatabaseId) -> Result<QueryPage, AppError>;

    /// Property names declared by a database's schema.
    async fn retrieve_database_schema(&self, database: &DatabaseId)
        -> Result<Vec<String>, AppError>;

    async fn retrieve_page(&self, page: &PageId) -> Result<PageRecord, AppError>;

    /// Creates a page in `database` and returns its id.
    async fn create_page(
        &self,
        database: &DatabaseId,
        properties: &IndexMap<String, Value>,
    ) -> Result<PageId, AppError>;

    /// Immediate children of a page or block.
    async fn retrieve_children(&self, parent: &NotionId) -> Result<Vec<Block>, AppError>;

    /// Appends `children` to the end of `parent`; returns the created blocks.
    async fn append_children(
        &self,
        parent: &NotionId,
        children: Vec<Value>,
    ) -> Result<Vec<Block>, AppError>;

    async fn retrieve_block(&self, block: &BlockId) -> Result<Block, AppError>;

    /// Databases shared with the integration, most recently edited first.
    async fn search_databases(&self) -> Result<Vec<DatabaseSummary>, AppError>;
}
