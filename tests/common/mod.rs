// tests/common/mod.rs
//! In-memory Notion workspace shared by the integration tests.
#![allow(dead_code)]

use indexmap::IndexMap;
use notion_relay::api::responses::PaginatedResponse;
use notion_relay::error::NotionErrorCode;
use notion_relay::{
    AppError, Block, BlockId, DatabaseId, DatabaseSummary, NotionId, NotionRepository, PageId,
    PageRecord, QueryPage,
};
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

/// Every repository call the fake served, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    QueryDatabase(String),
    RetrieveSchema(String),
    RetrievePage(String),
    CreatePage {
        database: String,
        properties: IndexMap<String, Value>,
    },
    RetrieveChildren(String),
    AppendChildren {
        parent: String,
        children: Vec<Value>,
    },
    RetrieveBlock(String),
    SearchDatabases,
}

#[derive(Default)]
pub struct FakeNotion {
    databases: HashMap<String, (Vec<PageRecord>, bool)>,
    schemas: HashMap<String, Vec<String>>,
    pages: HashMap<String, PageRecord>,
    blocks: Mutex<HashMap<String, Block>>,
    children: Mutex<HashMap<String, Vec<Block>>>,
    missing_children: Mutex<HashMap<String, u32>>,
    failing_appends: HashSet<String>,
    calls: Mutex<Vec<Call>>,
    created: Mutex<usize>,
}

impl FakeNotion {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_database(mut self, id: &str, rows: Vec<PageRecord>, has_more: bool) -> Self {
        self.databases.insert(id.to_string(), (rows, has_more));
        self
    }

    pub fn with_schema(mut self, id: &str, properties: &[&str]) -> Self {
        self.schemas.insert(
            id.to_string(),
            properties.iter().map(|name| name.to_string()).collect(),
        );
        self
    }

    pub fn with_page(mut self, page: PageRecord) -> Self {
        self.pages.insert(page.id.to_string(), page);
        self
    }

    /// Top-level blocks of a page; each block is also retrievable by id.
    pub fn with_children(mut self, parent: &str, blocks: Vec<Block>) -> Self {
        for block in &blocks {
            self.blocks
                .get_mut()
                .unwrap()
                .insert(block.id.to_string(), block.clone());
        }
        self.children
            .get_mut()
            .unwrap()
            .insert(parent.to_string(), blocks);
        self
    }

    /// The first `times` reads of `parent`'s children answer 404.
    pub fn with_missing_children(mut self, parent: &str, times: u32) -> Self {
        self.missing_children
            .get_mut()
            .unwrap()
            .insert(parent.to_string(), times);
        self
    }

    pub fn with_failing_append(mut self, parent: &str) -> Self {
        self.failing_appends.insert(parent.to_string());
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Children appended to `parent` across all calls, flattened.
    pub fn appended_to(&self, parent: &str) -> Vec<Value> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::AppendChildren {
                    parent: p,
                    children,
                } if p == parent => Some(children),
                _ => None,
            })
            .flatten()
            .collect()
    }

    pub fn created_pages(&self) -> Vec<IndexMap<String, Value>> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::CreatePage { properties, .. } => Some(properties),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, matches: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|call| matches(call)).count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn next_id(&self, prefix: &str) -> String {
        let mut created = self.created.lock().unwrap();
        *created += 1;
        format!("{}-{}", prefix, created)
    }
}

pub fn not_found(what: &str) -> AppError {
    AppError::NotionService {
        code: NotionErrorCode::ObjectNotFound,
        message: format!("Could not find {}", what),
        status: reqwest::StatusCode::NOT_FOUND,
    }
}

#[async_trait::async_trait]
impl NotionRepository for FakeNotion {
    async fn query_database(&self, database: &DatabaseId) -> Result<QueryPage, AppError> {
        self.record(Call::QueryDatabase(database.to_string()));
        let (rows, has_more) = self
            .databases
            .get(database.as_str())
            .cloned()
            .ok_or_else(|| not_found(database.as_str()))?;
        Ok(PaginatedResponse {
            object: "list".to_string(),
            results: rows,
            next_cursor: has_more.then(|| "cursor".to_string()),
            has_more,
        })
    }

    async fn retrieve_database_schema(
        &self,
        database: &DatabaseId,
    ) -> Result<Vec<String>, AppError> {
        self.record(Call::RetrieveSchema(database.to_string()));
        self.schemas
            .get(database.as_str())
            .cloned()
            .ok_or_else(|| not_found(database.as_str()))
    }

    async fn retrieve_page(&self, page: &PageId) -> Result<PageRecord, AppError> {
        self.record(Call::RetrievePage(page.to_string()));
        self.pages
            .get(page.as_str())
            .cloned()
            .ok_or_else(|| not_found(page.as_str()))
    }

    async fn create_page(
        &self,
        database: &DatabaseId,
        properties: &IndexMap<String, Value>,
    ) -> Result<PageId, AppError> {
        self.record(Call::CreatePage {
            database: database.to_string(),
            properties: properties.clone(),
        });
        Ok(page_id(&self.next_id("new-page")))
    }

    async fn retrieve_children(&self, parent: &NotionId) -> Result<Vec<Block>, AppError> {
        self.record(Call::RetrieveChildren(parent.to_string()));
        if let Some(remaining) = self.missing_children.lock().unwrap().get_mut(parent.as_str()) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(not_found(parent.as_str()));
            }
        }
        Ok(self
            .children
            .lock()
            .unwrap()
            .get(parent.as_str())
            .cloned()
            .unwrap_or_default())
    }

    async fn append_children(
        &self,
        parent: &NotionId,
        children: Vec<Value>,
    ) -> Result<Vec<Block>, AppError> {
        self.record(Call::AppendChildren {
            parent: parent.to_string(),
            children: children.clone(),
        });
        if self.failing_appends.contains(parent.as_str()) {
            return Err(AppError::NotionService {
                code: NotionErrorCode::ValidationFailed,
                message: "body failed validation".to_string(),
                status: reqwest::StatusCode::BAD_REQUEST,
            });
        }

        let mut created = Vec::new();
        for mut child in children {
            child["id"] = json!(self.next_id("new-block"));
            let block: Block = serde_json::from_value(child)
                .map_err(|e| AppError::MalformedResponse(e.to_string()))?;
            self.blocks
                .lock()
                .unwrap()
                .insert(block.id.to_string(), block.clone());
            created.push(block);
        }
        self.children
            .lock()
            .unwrap()
            .entry(parent.to_string())
            .or_default()
            .extend(created.iter().cloned());
        Ok(created)
    }

    async fn retrieve_block(&self, block: &BlockId) -> Result<Block, AppError> {
        self.record(Call::RetrieveBlock(block.to_string()));
        self.blocks
            .lock()
            .unwrap()
            .get(block.as_str())
            .cloned()
            .ok_or_else(|| not_found(block.as_str()))
    }

    async fn search_databases(&self) -> Result<Vec<DatabaseSummary>, AppError> {
        self.record(Call::SearchDatabases);
        Ok(Vec::new())
    }
}

// --- Builders ---

pub fn page_id(id: &str) -> PageId {
    serde_json::from_value(json!(id)).unwrap()
}

pub fn block_id(id: &str) -> BlockId {
    serde_json::from_value(json!(id)).unwrap()
}

pub fn database_id(id: &str) -> DatabaseId {
    serde_json::from_value(json!(id)).unwrap()
}

pub fn page(id: &str, properties: Value) -> PageRecord {
    serde_json::from_value(json!({ "id": id, "object": "page", "properties": properties }))
        .unwrap()
}

pub fn paragraph(id: &str, text: &str) -> Block {
    serde_json::from_value(json!({
        "object": "block",
        "id": id,
        "type": "paragraph",
        "paragraph": {
            "rich_text": [{"type": "text", "text": {"content": text}, "plain_text": text}]
        }
    }))
    .unwrap()
}

/// An origin synced block.
pub fn synced(id: &str) -> Block {
    serde_json::from_value(json!({
        "object": "block",
        "id": id,
        "type": "synced_block",
        "has_children": true,
        "synced_block": {"synced_from": null}
    }))
    .unwrap()
}

/// A synced block mirroring `origin`.
pub fn synced_copy(id: &str, origin: &str) -> Block {
    serde_json::from_value(json!({
        "object": "block",
        "id": id,
        "type": "synced_block",
        "synced_block": {"synced_from": {"type": "block_id", "block_id": origin}}
    }))
    .unwrap()
}

/// A relation property value as Notion sends it.
pub fn relation(ids: &[&str]) -> Value {
    json!({
        "id": "rel",
        "type": "relation",
        "relation": ids.iter().map(|id| json!({"id": id})).collect::<Vec<_>>(),
        "has_more": false
    })
}

pub fn title(text: &str) -> Value {
    json!({
        "id": "title",
        "type": "title",
        "title": [{"type": "text", "text": {"content": text}, "plain_text": text}]
    })
}

pub fn rich_text(text: &str) -> Value {
    json!({
        "id": "rt",
        "type": "rich_text",
        "rich_text": [{"type": "text", "text": {"content": text}, "plain_text": text}]
    })
}
