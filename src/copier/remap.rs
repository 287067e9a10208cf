//! Property remapping: which source properties survive a copy, and under what name.

use crate::model::{PropertyBag, PropertyMapping, PropertyValue};
use indexmap::IndexMap;
use serde_json::Value;
use std::collections::HashSet;

/// Renamed, write-ready properties for a create-page request.
pub type RemappedProperties = IndexMap<String, Value>;

/// Builds the target property bag for one source page.
///
/// A property is kept only when the mapping names it and the mapped name
/// exists in the target schema. Kept values are re-wrapped as
/// `{"<type>": <source value>}`; types that cannot be written (relation,
/// formula, rollup, ...) are dropped with a warning. Never fails: an empty
/// result means there is nothing to copy.
pub fn remap_properties(
    source: &PropertyBag,
    mapping: &PropertyMapping,
    target_schema: &HashSet<String>,
) -> RemappedProperties {
    let mut remapped = RemappedProperties::new();

    for (name, raw) in source {
        let Some(target_name) = mapping
            .target_for(name)
            .filter(|target| target_schema.contains(*target))
        else {
            log::warn!(
                "⚠️ Ignoring property '{}': no mapping or no matching target field",
                name
            );
            continue;
        };

        let value = match PropertyValue::from_json(raw) {
            Ok(value) => value,
            Err(e) => {
                log::warn!("⚠️ Skipping property '{}': {}", name, e);
                continue;
            }
        };

        match value.to_write_payload() {
            Some(payload) => {
                log::debug!("Mapping '{}' -> '{}' ({})", name, target_name, value.type_name());
                remapped.insert(target_name.to_string(), payload);
            }
            None => log::warn!(
                "⚠️ Cannot copy property '{}' of type '{}', skipping",
                name,
                value.type_name()
            ),
        }
    }

    remapped
}
