//! Webhook dispatch: turning one page-changed event into synced-block relays.
//!
//! For every relay mapping whose relation property lists related pages, the
//! dispatcher finds the synced block anchored by the mapping's marker in the
//! triggering page (creating one if allowed) and appends a reference to it on
//! each related page. Mappings are processed one after another; a failure in
//! one mapping never stops the others.

pub mod payload;
pub mod server;

use crate::api::NotionRepository;
use crate::config::{MappingSource, RelationSource, RelayConfig};
use crate::error::{AppError, WebhookError};
use crate::model::{PropertyBag, RelayMapping};
use crate::relay::{
    create_synced_block_at_bottom, locate_marker, relay_synced_block, MarkerLookup, RelayReport,
};
use crate::types::{BlockId, PageId};
use std::sync::Arc;

pub use payload::WebhookPayload;

/// How one mapping was handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MappingOutcome {
    /// The relation property listed no pages; nothing was called.
    NoRelatedPages,
    /// The marker does not occur in the triggering page.
    MarkerAbsent,
    /// The marker has no synced block and creating one is disabled.
    NoSyncedBlock,
    /// Reading blocks, creating the synced block, or resolving its origin failed.
    Failed(String),
    Relayed(RelayReport),
}

/// Outcomes of every mapping for one webhook call, in mapping order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub outcomes: Vec<(RelayMapping, MappingOutcome)>,
}

impl DispatchReport {
    /// Number of target pages that received a synced-block reference.
    pub fn delivered(&self) -> usize {
        self.outcomes
            .iter()
            .map(|(_, outcome)| match outcome {
                MappingOutcome::Relayed(report) => report.delivered.len(),
                _ => 0,
            })
            .sum()
    }
}

/// Handles webhook events against a Notion workspace.
pub struct WebhookDispatcher {
    repo: Arc<dyn NotionRepository>,
    config: RelayConfig,
}

impl WebhookDispatcher {
    pub fn new(repo: Arc<dyn NotionRepository>, config: RelayConfig) -> Self {
        Self { repo, config }
    }

    /// The relay mappings in force for this call.
    ///
    /// Mapping-database rows missing a marker or relation name are dropped.
    pub async fn load_mappings(&self) -> Result<Vec<RelayMapping>, AppError> {
        match &self.config.mappings {
            MappingSource::Static(mappings) => Ok(mappings.clone()),
            MappingSource::Database(database) => {
                let query = self.repo.query_database(database).await?;
                let mappings: Vec<RelayMapping> =
                    query.results.iter().filter_map(RelayMapping::from_row).collect();
                log::info!(
                    "✅ Read {} relay mapping(s) from database {}",
                    mappings.len(),
                    database
                );
                Ok(mappings)
            }
        }
    }

    /// Processes every mapping for one webhook event.
    ///
    /// Fails only when no mappings can be loaded; per-mapping failures are
    /// logged and reported in the returned [`DispatchReport`].
    pub async fn dispatch(&self, payload: &WebhookPayload) -> Result<DispatchReport, AppError> {
        let mappings = self.load_mappings().await?;
        if mappings.is_empty() {
            return Err(WebhookError::NoMappings.into());
        }

        let properties = self.relation_properties(payload).await;
        let mut report = DispatchReport::default();
        for mapping in mappings {
            log::info!("=== Processing mapping {} ===", mapping);
            let outcome = self
                .process_mapping(&payload.page_id, &properties, &mapping)
                .await;
            report.outcomes.push((mapping, outcome));
        }

        log::info!(
            "Webhook for page {} done: {} synced-block reference(s) delivered",
            payload.page_id,
            report.delivered()
        );
        Ok(report)
    }

    /// The property bag relation lookups read from.
    async fn relation_properties(&self, payload: &WebhookPayload) -> PropertyBag {
        match self.config.relation_source {
            RelationSource::Payload => payload.properties.clone(),
            RelationSource::Api => match self.repo.retrieve_page(&payload.page_id).await {
                Ok(page) => page.properties,
                Err(e) => {
                    log::error!(
                        "❌ Failed to read page {}, falling back to payload properties: {}",
                        payload.page_id,
                        e
                    );
                    payload.properties.clone()
                }
            },
        }
    }

    async fn process_mapping(
        &self,
        source_page: &PageId,
        properties: &PropertyBag,
        mapping: &RelayMapping,
    ) -> MappingOutcome {
        let targets = payload::related_page_ids(properties, &mapping.relation_property);
        if targets.is_empty() {
            log::warn!(
                "⚠️ No related pages under '{}', skipping",
                mapping.relation_property
            );
            return MappingOutcome::NoRelatedPages;
        }

        let synced_block = match self.find_or_create_synced_block(source_page, mapping).await {
            Ok(Some(block)) => block,
            Ok(None) => return MappingOutcome::NoSyncedBlock,
            Err(outcome) => return outcome,
        };

        match relay_synced_block(self.repo.as_ref(), &synced_block, &targets).await {
            Ok(report) => MappingOutcome::Relayed(report),
            Err(e) => {
                log::error!("❌ Could not read synced block {}: {}", synced_block, e);
                MappingOutcome::Failed(e.to_string())
            }
        }
    }

    /// The synced block anchored by the mapping's marker.
    ///
    /// `Ok(None)` when there is none and creation is disabled; `Err` carries
    /// the outcome that ends this mapping.
    async fn find_or_create_synced_block(
        &self,
        source_page: &PageId,
        mapping: &RelayMapping,
    ) -> Result<Option<BlockId>, MappingOutcome> {
        let lookup = locate_marker(
            self.repo.as_ref(),
            source_page,
            &mapping.marker,
            self.config.scan,
            self.config.fetch_retry,
        )
        .await
        .map_err(|e| {
            log::error!("❌ Failed to read blocks of page {}: {}", source_page, e);
            MappingOutcome::Failed(e.to_string())
        })?;

        match lookup {
            MarkerLookup::MarkerAbsent => Err(MappingOutcome::MarkerAbsent),
            MarkerLookup::MarkerFoundBlock(block) => {
                log::info!("✅ Synced block after marker {}: {}", mapping.marker, block);
                Ok(Some(block))
            }
            MarkerLookup::MarkerFoundNoBlock if !self.config.create_missing_synced_block => {
                log::warn!(
                    "⚠️ Marker {} has no synced block after it, skipping",
                    mapping.marker
                );
                Ok(None)
            }
            MarkerLookup::MarkerFoundNoBlock => {
                log::warn!(
                    "⚠️ Marker {} has no synced block after it, creating one at the bottom of the page",
                    mapping.marker
                );
                create_synced_block_at_bottom(self.repo.as_ref(), source_page)
                    .await
                    .map(Some)
                    .map_err(|e| {
                        log::error!("❌ Failed to create synced block: {}", e);
                        MappingOutcome::Failed(e.to_string())
                    })
            }
        }
    }
}
