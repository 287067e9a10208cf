//! Domain model: the slices of Notion objects the relay reads and writes.

mod block;
pub mod mapping;
mod page;
mod property_value;

pub use block::{synced_origin, synced_reference, Block, SYNCED_BLOCK_TYPE};
pub use mapping::{PropertyMapping, RelayMapping};
pub use page::{DatabaseSummary, PageRecord, PropertyBag};
pub use property_value::PropertyValue;
