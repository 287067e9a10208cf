use crate::types::{PageId, ValidationError};
use serde::Deserialize;
use serde_json::Value;

/// A page property as Notion reports it, keyed by its `type` tag.
///
/// Every writable variant keeps the vendor's JSON for that type untouched so
/// it can be sent back verbatim under a new property name.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Title(Value),
    RichText(Value),
    Number(Value),
    Select(Value),
    MultiSelect(Value),
    Date(Value),
    Checkbox(Value),
    Email(Value),
    PhoneNumber(Value),
    Url(Value),
    Relation(Vec<PageId>),
    /// Any other type (formula, rollup, people, ...). Not copied.
    Unsupported {
        type_name: String,
    },
}

#[derive(Deserialize)]
struct RelationEntry {
    id: PageId,
}

impl PropertyValue {
    /// Reads a property object of the shape `{"type": "<t>", "<t>": ...}`.
    pub fn from_json(raw: &Value) -> Result<Self, ValidationError> {
        let type_name = raw
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| ValidationError::MalformedProperty("missing 'type' tag".to_string()))?;

        let inner = || {
            raw.get(type_name).cloned().ok_or_else(|| {
                ValidationError::MalformedProperty(format!(
                    "'{}' property has no '{}' field",
                    type_name, type_name
                ))
            })
        };

        let value = match type_name {
            "title" => Self::Title(inner()?),
            "rich_text" => Self::RichText(inner()?),
            "number" => Self::Number(inner()?),
            "select" => Self::Select(inner()?),
            "multi_select" => Self::MultiSelect(inner()?),
            "date" => Self::Date(inner()?),
            "checkbox" => Self::Checkbox(inner()?),
            "email" => Self::Email(inner()?),
            "phone_number" => Self::PhoneNumber(inner()?),
            "url" => Self::Url(inner()?),
            "relation" => {
                let entries: Vec<RelationEntry> = serde_json::from_value(inner()?)
                    .map_err(|e| ValidationError::MalformedProperty(format!("relation: {}", e)))?;
                Self::Relation(entries.into_iter().map(|entry| entry.id).collect())
            }
            other => Self::Unsupported {
                type_name: other.to_string(),
            },
        };
        Ok(value)
    }

    /// Returns the Notion API type name for this property value.
    pub fn type_name(&self) -> &str {
        match self {
            Self::Title(_) => "title",
            Self::RichText(_) => "rich_text",
            Self::Number(_) => "number",
            Self::Select(_) => "select",
            Self::MultiSelect(_) => "multi_select",
            Self::Date(_) => "date",
            Self::Checkbox(_) => "checkbox",
            Self::Email(_) => "email",
            Self::PhoneNumber(_) => "phone_number",
            Self::Url(_) => "url",
            Self::Relation(_) => "relation",
            Self::Unsupported { type_name } => type_name.as_str(),
        }
    }

    /// The body for a create-page request, `{"<t>": <original value>}`.
    ///
    /// `None` for relations and unsupported types, which are never copied.
    pub fn to_write_payload(&self) -> Option<Value> {
        let inner = match self {
            Self::Title(v)
            | Self::RichText(v)
            | Self::Number(v)
            | Self::Select(v)
            | Self::MultiSelect(v)
            | Self::Date(v)
            | Self::Checkbox(v)
            | Self::Email(v)
            | Self::PhoneNumber(v)
            | Self::Url(v) => v,
            Self::Relation(_) | Self::Unsupported { .. } => return None,
        };
        let mut payload = serde_json::Map::new();
        payload.insert(self.type_name().to_string(), inner.clone());
        Some(Value::Object(payload))
    }

    /// Concatenated `plain_text` of a title or rich-text property.
    pub fn plain_text(&self) -> Option<String> {
        match self {
            Self::Title(runs) | Self::RichText(runs) => Some(
                runs.as_array()
                    .map(|runs| {
                        runs.iter()
                            .filter_map(|run| run.get("plain_text").and_then(Value::as_str))
                            .collect()
                    })
                    .unwrap_or_default(),
            ),
            _ => None,
        }
    }

    /// Related page ids when this is a relation property.
    pub fn relation_ids(&self) -> Option<&[PageId]> {
        match self {
            Self::Relation(ids) => Some(ids),
            _ => None,
        }
    }
}
