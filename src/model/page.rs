use super::PropertyValue;
use crate::types::{DatabaseId, PageId};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Property name → raw property object, in the order Notion returned them.
pub type PropertyBag = Map<String, Value>;

/// A page as returned by a database query or page retrieval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageRecord {
    pub id: PageId,
    #[serde(default)]
    pub properties: PropertyBag,
}

impl PageRecord {
    /// Typed view of a single property; `None` if absent or malformed.
    pub fn property(&self, name: &str) -> Option<PropertyValue> {
        PropertyValue::from_json(self.properties.get(name)?).ok()
    }
}

/// A database found through the search endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseSummary {
    pub id: DatabaseId,
    pub title: String,
}

impl DatabaseSummary {
    /// Title text for display, "Untitled" when the database has none.
    pub fn display_title(&self) -> &str {
        if self.title.trim().is_empty() {
            "Untitled"
        } else {
            &self.title
        }
    }
}

impl<'de> Deserialize<'de> for DatabaseSummary {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct RawDatabase {
            id: DatabaseId,
            #[serde(default)]
            title: Vec<Value>,
        }

        let raw = RawDatabase::deserialize(deserializer)?;
        let title = raw
            .title
            .iter()
            .filter_map(|run| {
                run.get("plain_text")
                    .or_else(|| run.get("text").and_then(|text| text.get("content")))
                    .and_then(Value::as_str)
            })
            .collect();
        Ok(Self { id: raw.id, title })
    }
}
