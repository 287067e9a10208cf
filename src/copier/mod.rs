//! Database copy: replays every row of a source database into a target database.
//!
//! For each source row: remap its properties, create the new page, then copy
//! the row's top-level blocks one by one. Failures are contained to the page
//! or block they happen in; the run itself only fails when the source rows or
//! the target schema cannot be read.

pub mod remap;

use crate::api::NotionRepository;
use crate::config::CopyConfig;
use crate::error::AppError;
use crate::model::{Block, PageRecord};
use crate::types::{NotionId, PageId};
use remap::remap_properties;
use std::collections::HashSet;
use std::sync::Arc;

/// What happened to one source page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageCopyOutcome {
    Created {
        new_page: PageId,
        blocks_copied: usize,
        blocks_skipped: usize,
    },
    /// Nothing in the page survived remapping; no page was created.
    Skipped,
}

/// What happened to one block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockCopyOutcome {
    Copied,
    /// The block has no payload under its own type key.
    Skipped,
}

/// Totals for a whole database copy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CopyReport {
    pub pages_seen: usize,
    pub created: Vec<PageId>,
    pub skipped: Vec<PageId>,
    pub failed: Vec<(PageId, String)>,
    pub blocks_copied: usize,
    pub blocks_skipped: usize,
    /// The source query reported more rows than the single page that was read.
    pub truncated: bool,
}

impl CopyReport {
    fn record(&mut self, source: &PageId, outcome: Result<PageCopyOutcome, AppError>) {
        match outcome {
            Ok(PageCopyOutcome::Created {
                new_page,
                blocks_copied,
                blocks_skipped,
            }) => {
                self.created.push(new_page);
                self.blocks_copied += blocks_copied;
                self.blocks_skipped += blocks_skipped;
            }
            Ok(PageCopyOutcome::Skipped) => self.skipped.push(source.clone()),
            Err(e) => {
                log::error!("❌ Failed to copy page {}: {}", source, e);
                self.failed.push((source.clone(), e.to_string()));
            }
        }
    }
}

/// Copies pages from `config.source` into `config.target`.
pub struct DatabaseCopier {
    repo: Arc<dyn NotionRepository>,
    config: CopyConfig,
}

impl DatabaseCopier {
    pub fn new(repo: Arc<dyn NotionRepository>, config: CopyConfig) -> Self {
        Self { repo, config }
    }

    /// Copies every row returned by a single query of the source database.
    pub async fn copy_database(&self) -> Result<CopyReport, AppError> {
        let query = self.repo.query_database(&self.config.source).await?;
        let mut report = CopyReport {
            truncated: query.has_more,
            ..CopyReport::default()
        };
        if query.has_more {
            log::warn!(
                "⚠️ Source database {} has more rows than one query returns; only the first {} are copied",
                self.config.source,
                query.results.len()
            );
        }
        if query.results.is_empty() {
            log::info!("Source database {} has no pages to copy", self.config.source);
            return Ok(report);
        }

        let target_schema: HashSet<String> = self
            .repo
            .retrieve_database_schema(&self.config.target)
            .await?
            .into_iter()
            .collect();

        for page in &query.results {
            log::info!("Copying page {}", page.id);
            report.pages_seen += 1;
            let outcome = self.copy_page(page, &target_schema).await;
            report.record(&page.id, outcome);

            tokio::time::sleep(self.config.pause).await;
        }

        log::info!(
            "Copy finished: {} created, {} skipped, {} failed, {} blocks copied",
            report.created.len(),
            report.skipped.len(),
            report.failed.len(),
            report.blocks_copied
        );
        Ok(report)
    }

    /// Creates the remapped copy of one page and replays its top-level blocks.
    pub async fn copy_page(
        &self,
        page: &PageRecord,
        target_schema: &HashSet<String>,
    ) -> Result<PageCopyOutcome, AppError> {
        if page.properties.is_empty() {
            log::warn!("⚠️ Page {} has no properties, skipping", page.id);
            return Ok(PageCopyOutcome::Skipped);
        }

        let properties = remap_properties(&page.properties, &self.config.mapping, target_schema);
        if properties.is_empty() {
            log::warn!("⚠️ Page {} has no copyable properties, skipping", page.id);
            return Ok(PageCopyOutcome::Skipped);
        }

        let new_page = self
            .repo
            .create_page(&self.config.target, &properties)
            .await?;
        log::info!("✅ Page copied: {} -> {}", page.id, new_page);

        let (blocks_copied, blocks_skipped) = self.copy_blocks(&page.id, &new_page).await;
        Ok(PageCopyOutcome::Created {
            new_page,
            blocks_copied,
            blocks_skipped,
        })
    }

    /// Copies the immediate children of `source` onto `destination`.
    ///
    /// Returns `(copied, skipped)`; failed blocks count as skipped.
    async fn copy_blocks(&self, source: &PageId, destination: &PageId) -> (usize, usize) {
        let blocks = match self.repo.retrieve_children(&NotionId::from(source)).await {
            Ok(blocks) => blocks,
            Err(e) => {
                log::error!("❌ Failed to read content of page {}: {}", source, e);
                return (0, 0);
            }
        };

        let parent = NotionId::from(destination);
        let mut copied = 0;
        let mut skipped = 0;
        for block in &blocks {
            match self.copy_block(&parent, block).await {
                Ok(BlockCopyOutcome::Copied) => copied += 1,
                Ok(BlockCopyOutcome::Skipped) => skipped += 1,
                Err(e) => {
                    log::error!("❌ Failed to copy block {}: {}", block.id, e);
                    skipped += 1;
                }
            }
        }
        (copied, skipped)
    }

    /// Appends a one-level copy of `block` to `parent`.
    pub async fn copy_block(
        &self,
        parent: &NotionId,
        block: &Block,
    ) -> Result<BlockCopyOutcome, AppError> {
        let Some(child) = block.to_copy_request() else {
            log::warn!(
                "⚠️ Cannot copy block {} of type '{}', skipping",
                block.id,
                block.block_type
            );
            return Ok(BlockCopyOutcome::Skipped);
        };

        self.repo.append_children(parent, vec![child]).await?;
        log::debug!("✅ Block {} copied", block.id);
        Ok(BlockCopyOutcome::Copied)
    }
}
