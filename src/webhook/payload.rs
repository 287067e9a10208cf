//! Inbound webhook body: `{"data": {"id": "<page>", "properties": {...}}}`.

use crate::error::WebhookError;
use crate::model::{PropertyBag, PropertyValue};
use crate::types::PageId;
use serde_json::Value;

/// The validated part of a webhook body.
#[derive(Debug, Clone, PartialEq)]
pub struct WebhookPayload {
    pub page_id: PageId,
    pub properties: PropertyBag,
}

impl WebhookPayload {
    pub fn from_slice(body: &[u8]) -> Result<Self, WebhookError> {
        let value: Value =
            serde_json::from_slice(body).map_err(|e| WebhookError::InvalidJson(e.to_string()))?;
        Self::from_json(&value)
    }

    /// Validates the fields the relay relies on. `data.properties` may be
    /// absent (treated as empty) but must be an object when present.
    pub fn from_json(body: &Value) -> Result<Self, WebhookError> {
        let data = match body.get("data") {
            Some(Value::Object(data)) => data,
            Some(_) => {
                return Err(WebhookError::MalformedField {
                    field: "data",
                    reason: "expected an object".to_string(),
                })
            }
            None => return Err(WebhookError::MissingPageId),
        };

        let page_id = match data.get("id") {
            Some(Value::String(id)) if !id.trim().is_empty() => {
                PageId::from_wire(id).map_err(|e| WebhookError::MalformedField {
                    field: "data.id",
                    reason: e.to_string(),
                })?
            }
            Some(Value::String(_)) | None | Some(Value::Null) => {
                return Err(WebhookError::MissingPageId)
            }
            Some(_) => {
                return Err(WebhookError::MalformedField {
                    field: "data.id",
                    reason: "expected a string".to_string(),
                })
            }
        };

        let properties = match data.get("properties") {
            Some(Value::Object(properties)) => properties.clone(),
            None | Some(Value::Null) => PropertyBag::new(),
            Some(_) => {
                return Err(WebhookError::MalformedField {
                    field: "data.properties",
                    reason: "expected an object".to_string(),
                })
            }
        };

        Ok(Self {
            page_id,
            properties,
        })
    }

    /// Page ids listed under a relation property of the triggering page.
    ///
    /// Empty when the property is missing, is not a relation, or lists nothing.
    pub fn related_page_ids(&self, relation_property: &str) -> Vec<PageId> {
        related_page_ids(&self.properties, relation_property)
    }
}

/// Page ids under `relation_property` in a property bag, logging why none were found.
pub fn related_page_ids(properties: &PropertyBag, relation_property: &str) -> Vec<PageId> {
    let Some(raw) = properties.get(relation_property) else {
        log::warn!("⚠️ Property '{}' is not present", relation_property);
        return Vec::new();
    };

    let ids = match PropertyValue::from_json(raw) {
        Ok(PropertyValue::Relation(ids)) => ids,
        Ok(other) => {
            log::warn!(
                "⚠️ Property '{}' is a {} property, not a relation",
                relation_property,
                other.type_name()
            );
            return Vec::new();
        }
        Err(e) => {
            log::warn!("⚠️ Property '{}' is malformed: {}", relation_property, e);
            return Vec::new();
        }
    };

    if ids.is_empty() {
        log::warn!("⚠️ Relation '{}' is empty", relation_property);
    } else {
        log::info!(
            "✅ Relation '{}' -> {} related page(s)",
            relation_property,
            ids.len()
        );
    }
    ids
}
