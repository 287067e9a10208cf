// src/lib.rs
//! notion-relay library: keeps Notion pages in step with each other.
//!
//! Two flows are provided:
//! - **Database copy**: replays the rows of one database into another,
//!   renaming properties through a [`PropertyMapping`] and copying each row's
//!   top-level blocks.
//! - **Synced-block relay**: on a webhook event, finds the synced block that
//!   follows a text marker in the triggering page and appends a reference to
//!   it on every page listed under a relation property.
//!
//! # Public API
//!
//! - **Error handling**: `AppError`, `WebhookError`, `ValidationError`
//! - **Configuration**: `AppConfig`, `CopyConfig`, `RelayConfig`, `ServeConfig`
//! - **Domain model**: `PropertyValue`, `Block`, `PageRecord`, mappings
//! - **API client**: `NotionRepository`, `NotionHttpClient`
//! - **Flows**: `DatabaseCopier`, `WebhookDispatcher`, relay primitives

pub mod api;
pub mod config;
pub mod constants;
pub mod copier;
pub mod error;
pub mod error_recovery;
pub mod model;
pub mod relay;
pub mod search;
pub mod types;
pub mod webhook;

// --- Error Handling ---
pub use crate::error::{AppError, NotionErrorCode, WebhookError};
pub use crate::types::ValidationError;

// --- Configuration ---
pub use crate::config::{
    AppConfig, Command, CopyConfig, MappingSource, RelationSource, RelayConfig, ServeConfig,
};

// --- Domain Model ---
pub use crate::model::{
    Block, DatabaseSummary, PageRecord, PropertyBag, PropertyMapping, PropertyValue, RelayMapping,
};
pub use crate::types::{ApiKey, BlockId, DatabaseId, Marker, NotionId, PageId};

// --- API Client ---
pub use crate::api::{NotionHttpClient, NotionRepository, QueryPage};

// --- Flows ---
pub use crate::copier::{CopyReport, DatabaseCopier, PageCopyOutcome};
pub use crate::error_recovery::RetryPolicy;
pub use crate::relay::{MarkerLookup, RelayReport, SyncedBlockScan};
pub use crate::webhook::{DispatchReport, MappingOutcome, WebhookDispatcher, WebhookPayload};
