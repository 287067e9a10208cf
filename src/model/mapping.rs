//! Configuration tables that drive both flows.

use super::PageRecord;
use crate::types::{Marker, ValidationError};
use indexmap::IndexMap;
use std::fmt;

/// Source property name → target property name.
///
/// Only properties named here are copied; everything else on a source page
/// is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyMapping(IndexMap<String, String>);

impl PropertyMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces one rename.
    pub fn insert(&mut self, source: impl Into<String>, target: impl Into<String>) {
        self.0.insert(source.into(), target.into());
    }

    pub fn with(mut self, source: impl Into<String>, target: impl Into<String>) -> Self {
        self.insert(source, target);
        self
    }

    /// Parses a `Source=Target` entry as given on the command line.
    ///
    /// Splits on the first `=`, so target names may contain `=` but source
    /// names may not. Surrounding whitespace is trimmed.
    pub fn parse_entry(entry: &str) -> Result<(String, String), ValidationError> {
        let (source, target) = entry.split_once('=').ok_or_else(|| {
            ValidationError::InvalidMapping {
                entry: entry.to_string(),
                reason: "expected SOURCE=TARGET".to_string(),
            }
        })?;
        let (source, target) = (source.trim(), target.trim());
        if source.is_empty() || target.is_empty() {
            return Err(ValidationError::InvalidMapping {
                entry: entry.to_string(),
                reason: "both sides must be non-empty".to_string(),
            });
        }
        Ok((source.to_string(), target.to_string()))
    }

    /// The target name for a source property, if it is mapped at all.
    pub fn target_for(&self, source: &str) -> Option<&str> {
        self.0.get(source).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>, T: Into<String>> FromIterator<(S, T)> for PropertyMapping {
    fn from_iter<I: IntoIterator<Item = (S, T)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(s, t)| (s.into(), t.into()))
                .collect(),
        )
    }
}

/// A marker paired with the relation property whose targets receive its synced block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayMapping {
    pub marker: Marker,
    pub relation_property: String,
}

impl RelayMapping {
    pub fn new(marker: Marker, relation_property: impl Into<String>) -> Self {
        Self {
            marker,
            relation_property: relation_property.into(),
        }
    }

    /// Parses a `MARKER=RELATION` entry as given on the command line.
    pub fn parse(entry: &str) -> Result<Self, ValidationError> {
        let (marker, relation) = PropertyMapping::parse_entry(entry)?;
        Ok(Self::new(Marker::new(marker)?, relation))
    }

    /// Reads a row of the mapping database: `Name` holds the marker, `Relation`
    /// the relation property name. Rows missing either are `None`.
    pub fn from_row(row: &PageRecord) -> Option<Self> {
        let marker = row.property("Name")?.plain_text()?;
        let relation = row.property("Relation")?.plain_text()?;
        if relation.is_empty() {
            return None;
        }
        Some(Self::new(Marker::new(marker).ok()?, relation))
    }
}

impl fmt::Display for RelayMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.marker, self.relation_property)
    }
}
