//! Marker lookup: finding the synced block that a text marker anchors.

use crate::api::NotionRepository;
use crate::error::AppError;
use crate::error_recovery::{retry_fixed_delay, RetryPolicy};
use crate::model::Block;
use crate::types::{BlockId, Marker, NotionId, PageId};

/// Result of scanning a page for a marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkerLookup {
    /// No block's leading text equals the marker. The mapping does not apply.
    MarkerAbsent,
    /// The marker exists but no synced block is where it should be.
    MarkerFoundNoBlock,
    /// The synced block anchored by the marker.
    MarkerFoundBlock(BlockId),
}

/// Where a synced block may sit relative to its marker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SyncedBlockScan {
    /// Only the block immediately after the marker counts.
    #[default]
    Adjacent,
    /// The first synced block anywhere after the marker counts.
    FirstAfterMarker,
}

/// Scans `blocks` in order; the first block whose leading text equals the marker wins.
pub fn scan_for_marker(blocks: &[Block], marker: &Marker, scan: SyncedBlockScan) -> MarkerLookup {
    let Some(position) = blocks
        .iter()
        .position(|block| block.leading_text().is_some_and(|text| marker.matches(text)))
    else {
        return MarkerLookup::MarkerAbsent;
    };
    log::info!(
        "✅ Found marker {} in {} at position {}",
        marker,
        blocks[position].block_type,
        position
    );

    let after = &blocks[position + 1..];
    let synced = match scan {
        SyncedBlockScan::Adjacent => after.first().filter(|block| block.is_synced_block()),
        SyncedBlockScan::FirstAfterMarker => after.iter().find(|block| block.is_synced_block()),
    };

    match synced {
        Some(block) => MarkerLookup::MarkerFoundBlock(block.id.clone()),
        None => MarkerLookup::MarkerFoundNoBlock,
    }
}

/// Fetches the children of `page` and scans them for `marker`.
///
/// The fetch is retried on not-found: Notion can briefly 404 a page that was
/// just shared with the integration.
pub async fn locate_marker(
    repo: &dyn NotionRepository,
    page: &PageId,
    marker: &Marker,
    scan: SyncedBlockScan,
    retry: RetryPolicy,
) -> Result<MarkerLookup, AppError> {
    log::info!("🔍 Reading blocks of page {}", page);
    let parent = NotionId::from(page);
    let blocks = retry_fixed_delay(
        || repo.retrieve_children(&parent),
        retry,
        AppError::is_not_found,
    )
    .await?;
    log::debug!("Page {} has {} top-level blocks", page, blocks.len());

    let lookup = scan_for_marker(&blocks, marker, scan);
    if lookup == MarkerLookup::MarkerAbsent {
        log::warn!("⚠️ Marker {} not found in page {}", marker, page);
    }
    Ok(lookup)
}
