//! Synced-block relay: mirroring a source page's synced block onto related pages.

use crate::api::NotionRepository;
use crate::error::AppError;
use crate::model::{synced_origin, synced_reference};
use crate::types::{BlockId, NotionId, PageId};

/// Per-target outcome of one relay.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelayReport {
    pub origin: Option<BlockId>,
    pub delivered: Vec<PageId>,
    pub failed: Vec<(PageId, String)>,
}

/// Resolves the content-bearing block behind `block`.
///
/// A reference block resolves to the block it is synced from; an origin
/// resolves to itself. Only one level is followed.
pub async fn resolve_origin(
    repo: &dyn NotionRepository,
    block: &BlockId,
) -> Result<BlockId, AppError> {
    let detail = repo.retrieve_block(block).await?;
    match detail.synced_from() {
        Some(origin) => {
            log::info!("✅ Synced block {} is synced from {}", block, origin);
            Ok(origin)
        }
        None => Ok(block.clone()),
    }
}

/// Appends a reference to `block`'s origin at the end of every target page.
///
/// Fails only if the block itself cannot be read; a failed append is
/// recorded against its target and the remaining targets are still served.
/// Nothing checks for an existing reference, so relaying twice appends twice.
pub async fn relay_synced_block(
    repo: &dyn NotionRepository,
    block: &BlockId,
    targets: &[PageId],
) -> Result<RelayReport, AppError> {
    let origin = resolve_origin(repo, block).await?;
    let mut report = RelayReport {
        origin: Some(origin.clone()),
        ..RelayReport::default()
    };

    for target in targets {
        log::info!("🚀 Relaying synced block {} to page {}", origin, target);
        match repo
            .append_children(&NotionId::from(target), vec![synced_reference(&origin)])
            .await
        {
            Ok(_) => {
                log::info!("✅ Synced block relayed to page {}", target);
                report.delivered.push(target.clone());
            }
            Err(e) => {
                log::error!("❌ Failed to relay synced block to page {}: {}", target, e);
                report.failed.push((target.clone(), e.to_string()));
            }
        }
    }

    Ok(report)
}

/// Appends a new, empty origin synced block at the bottom of `page`.
pub async fn create_synced_block_at_bottom(
    repo: &dyn NotionRepository,
    page: &PageId,
) -> Result<BlockId, AppError> {
    let created = repo
        .append_children(&NotionId::from(page), vec![synced_origin()])
        .await?;
    let block = created
        .into_iter()
        .find(|block| block.is_synced_block())
        .ok_or_else(|| {
            AppError::MalformedResponse(
                "append response did not include the new synced block".to_string(),
            )
        })?;
    log::info!("✅ Created synced block {} at the bottom of page {}", block.id, page);
    Ok(block.id)
}
