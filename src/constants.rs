// src/constants.rs
//! Domain constants that define the operational boundaries of the system.
//!
//! Reading these constants should tell you how the relay talks to Notion:
//! which API it targets, how long it waits between writes, and how patient
//! it is with pages that are not yet visible.

use std::time::Duration;

// ---------------------------------------------------------------------------
// Notion API
// ---------------------------------------------------------------------------

/// Base URL of the Notion REST API.
pub const NOTION_API_BASE_URL: &str = "https://api.notion.com/v1";

/// API version sent with every request as the `Notion-Version` header.
pub const NOTION_VERSION: &str = "2022-06-28";

// ---------------------------------------------------------------------------
// Database copy
// ---------------------------------------------------------------------------

/// Pause after each copied page.
///
/// Notion allows an average of three requests per second per integration;
/// one page copy issues several, so a one-second pause keeps a long copy
/// under the limit.
pub const DEFAULT_COPY_PAUSE: Duration = Duration::from_secs(1);

// ---------------------------------------------------------------------------
// Synced-block relay
// ---------------------------------------------------------------------------

/// Attempts made to read a page's children while Notion still reports 404.
pub const DEFAULT_FETCH_ATTEMPTS: u32 = 3;

/// Fixed delay between those attempts.
pub const DEFAULT_FETCH_RETRY_DELAY: Duration = Duration::from_secs(2);

// ---------------------------------------------------------------------------
// Webhook server
// ---------------------------------------------------------------------------

pub const DEFAULT_WEBHOOK_HOST: &str = "0.0.0.0";
pub const DEFAULT_WEBHOOK_PORT: u16 = 5000;
pub const DEFAULT_WEBHOOK_ROUTE: &str = "/notion-webhook";

// ---------------------------------------------------------------------------
// Error display
// ---------------------------------------------------------------------------

/// Maximum characters shown when previewing error response bodies.
pub const ERROR_BODY_PREVIEW_LENGTH: usize = 200;
