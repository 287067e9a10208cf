//! Database discovery, for finding the ids the other commands need.

use crate::api::NotionRepository;
use crate::error::AppError;
use crate::model::DatabaseSummary;

/// Databases shared with the integration, most recently edited first.
pub async fn list_databases(
    repo: &dyn NotionRepository,
) -> Result<Vec<DatabaseSummary>, AppError> {
    let databases = repo.search_databases().await?;
    log::info!("Found {} database(s)", databases.len());
    Ok(databases)
}

/// One display line per database: `title | id`.
pub fn format_listing(databases: &[DatabaseSummary]) -> String {
    databases
        .iter()
        .map(|db| format!("📁 {} | 🆔 {}", db.display_title(), db.id))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn listing_uses_display_titles() {
        let databases: Vec<DatabaseSummary> = serde_json::from_value(json!([
            {"id": "db-1", "title": [{"plain_text": "Button Mapping"}]},
            {"id": "db-2", "title": []}
        ]))
        .unwrap();
        assert_eq!(
            format_listing(&databases),
            "📁 Button Mapping | 🆔 db-1\n📁 Untitled | 🆔 db-2"
        );
    }
}
