//! Synced-block relay building blocks: locate the anchored block, then mirror it.

pub mod marker;
pub mod synced;

pub use marker::{locate_marker, scan_for_marker, MarkerLookup, SyncedBlockScan};
pub use synced::{create_synced_block_at_bottom, relay_synced_block, resolve_origin, RelayReport};
