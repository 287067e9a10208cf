// tests/webhook_dispatch.rs
//! Synced-block relay driven through the webhook dispatcher.

mod common;

use common::*;
use notion_relay::{
    AppError, Marker, MappingOutcome, MappingSource, RelationSource, RelayConfig, RelayMapping,
    RetryPolicy, SyncedBlockScan, WebhookDispatcher, WebhookError, WebhookPayload,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

const SOURCE_PAGE: &str = "source-page";

fn fiary() -> RelayMapping {
    RelayMapping::new(Marker::new("%Fiary").unwrap(), "Fiarybase")
}

fn relay_config(mappings: Vec<RelayMapping>) -> RelayConfig {
    RelayConfig {
        fetch_retry: RetryPolicy::new(3, Duration::ZERO),
        ..RelayConfig::with_static_mappings(mappings)
    }
}

fn payload(properties: serde_json::Value) -> WebhookPayload {
    WebhookPayload::from_json(&json!({
        "data": { "id": SOURCE_PAGE, "properties": properties }
    }))
    .unwrap()
}

fn synced_reference_to(origin: &str) -> serde_json::Value {
    json!({
        "object": "block",
        "type": "synced_block",
        "synced_block": { "synced_from": { "block_id": origin } }
    })
}

#[tokio::test]
async fn relays_adjacent_synced_block_to_every_related_page() {
    let repo = Arc::new(FakeNotion::new().with_children(
        SOURCE_PAGE,
        vec![paragraph("p1", "%Fiary"), synced("sync-1")],
    ));
    let dispatcher = WebhookDispatcher::new(repo.clone(), relay_config(vec![fiary()]));

    let report = dispatcher
        .dispatch(&payload(json!({ "Fiarybase": relation(&["t1", "t2"]) })))
        .await
        .unwrap();

    assert_eq!(report.delivered(), 2);
    assert_eq!(repo.appended_to("t1"), vec![synced_reference_to("sync-1")]);
    assert_eq!(repo.appended_to("t2"), vec![synced_reference_to("sync-1")]);
}

#[tokio::test]
async fn reference_block_resolves_to_its_origin() {
    let repo = Arc::new(FakeNotion::new().with_children(
        SOURCE_PAGE,
        vec![paragraph("p1", "%Fiary"), synced_copy("ref-1", "origin-9")],
    ));
    let dispatcher = WebhookDispatcher::new(repo.clone(), relay_config(vec![fiary()]));

    let report = dispatcher
        .dispatch(&payload(json!({ "Fiarybase": relation(&["t1"]) })))
        .await
        .unwrap();

    match &report.outcomes[0].1 {
        MappingOutcome::Relayed(relay) => {
            assert_eq!(relay.origin.as_ref().map(|id| id.to_string()).as_deref(), Some("origin-9"));
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert_eq!(repo.appended_to("t1"), vec![synced_reference_to("origin-9")]);
}

#[tokio::test]
async fn empty_relation_makes_no_calls() {
    let repo = Arc::new(FakeNotion::new());
    let dispatcher = WebhookDispatcher::new(repo.clone(), relay_config(vec![fiary()]));

    let report = dispatcher
        .dispatch(&payload(json!({ "Fiarybase": relation(&[]) })))
        .await
        .unwrap();

    assert_eq!(report.outcomes[0].1, MappingOutcome::NoRelatedPages);
    assert!(repo.calls().is_empty());
}

#[tokio::test]
async fn missing_marker_skips_the_mapping() {
    let repo = Arc::new(FakeNotion::new().with_children(
        SOURCE_PAGE,
        vec![paragraph("p1", "something else"), synced("sync-1")],
    ));
    let dispatcher = WebhookDispatcher::new(repo.clone(), relay_config(vec![fiary()]));

    let report = dispatcher
        .dispatch(&payload(json!({ "Fiarybase": relation(&["t1"]) })))
        .await
        .unwrap();

    assert_eq!(report.outcomes[0].1, MappingOutcome::MarkerAbsent);
    assert_eq!(
        repo.count(|call| matches!(call, Call::AppendChildren { .. })),
        0
    );
}

#[tokio::test]
async fn missing_synced_block_is_created_at_the_bottom() {
    let repo = Arc::new(FakeNotion::new().with_children(
        SOURCE_PAGE,
        vec![paragraph("p1", "%Fiary"), paragraph("p2", "not synced")],
    ));
    let dispatcher = WebhookDispatcher::new(repo.clone(), relay_config(vec![fiary()]));

    let report = dispatcher
        .dispatch(&payload(json!({ "Fiarybase": relation(&["t1"]) })))
        .await
        .unwrap();

    assert_eq!(
        repo.appended_to(SOURCE_PAGE),
        vec![json!({
            "object": "block",
            "type": "synced_block",
            "synced_block": { "synced_from": null, "children": [] }
        })]
    );
    // The fake names the first appended block "new-block-1".
    assert_eq!(repo.appended_to("t1"), vec![synced_reference_to("new-block-1")]);
    assert_eq!(report.delivered(), 1);
}

#[tokio::test]
async fn creation_can_be_disabled() {
    let repo = Arc::new(
        FakeNotion::new().with_children(SOURCE_PAGE, vec![paragraph("p1", "%Fiary")]),
    );
    let config = RelayConfig {
        create_missing_synced_block: false,
        ..relay_config(vec![fiary()])
    };
    let dispatcher = WebhookDispatcher::new(repo.clone(), config);

    let report = dispatcher
        .dispatch(&payload(json!({ "Fiarybase": relation(&["t1"]) })))
        .await
        .unwrap();

    assert_eq!(report.outcomes[0].1, MappingOutcome::NoSyncedBlock);
    assert!(repo.appended_to(SOURCE_PAGE).is_empty());
    assert!(repo.appended_to("t1").is_empty());
}

#[tokio::test]
async fn first_after_scan_skips_intervening_blocks() {
    let repo = Arc::new(FakeNotion::new().with_children(
        SOURCE_PAGE,
        vec![
            paragraph("p1", "%Fiary"),
            paragraph("p2", "intro"),
            synced("sync-2"),
        ],
    ));
    let config = RelayConfig {
        scan: SyncedBlockScan::FirstAfterMarker,
        create_missing_synced_block: false,
        ..relay_config(vec![fiary()])
    };
    let dispatcher = WebhookDispatcher::new(repo.clone(), config);

    dispatcher
        .dispatch(&payload(json!({ "Fiarybase": relation(&["t1"]) })))
        .await
        .unwrap();

    assert_eq!(repo.appended_to("t1"), vec![synced_reference_to("sync-2")]);
}

#[tokio::test]
async fn failed_target_does_not_stop_the_others() {
    let repo = Arc::new(
        FakeNotion::new()
            .with_children(SOURCE_PAGE, vec![paragraph("p1", "%Fiary"), synced("sync-1")])
            .with_failing_append("t1"),
    );
    let dispatcher = WebhookDispatcher::new(repo.clone(), relay_config(vec![fiary()]));

    let report = dispatcher
        .dispatch(&payload(json!({ "Fiarybase": relation(&["t1", "t2"]) })))
        .await
        .unwrap();

    let MappingOutcome::Relayed(relay) = &report.outcomes[0].1 else {
        panic!("expected a relay");
    };
    assert_eq!(relay.failed.len(), 1);
    assert_eq!(relay.delivered, vec![page_id("t2")]);
}

#[tokio::test]
async fn mappings_are_independent() {
    let repo = Arc::new(FakeNotion::new().with_children(
        SOURCE_PAGE,
        vec![
            paragraph("p1", "%Fiary"),
            synced("sync-1"),
            paragraph("p2", "%Collection"),
            synced("sync-2"),
        ],
    ));
    let collection = RelayMapping::new(Marker::new("%Collection").unwrap(), "Collection Home");
    let absent = RelayMapping::new(Marker::new("%Missing").unwrap(), "Fiarybase");
    let dispatcher = WebhookDispatcher::new(
        repo.clone(),
        relay_config(vec![fiary(), absent, collection]),
    );

    let report = dispatcher
        .dispatch(&payload(json!({
            "Fiarybase": relation(&["t1"]),
            "Collection Home": relation(&["t3"])
        })))
        .await
        .unwrap();

    assert_eq!(report.outcomes.len(), 3);
    assert_eq!(report.outcomes[1].1, MappingOutcome::MarkerAbsent);
    assert_eq!(repo.appended_to("t1"), vec![synced_reference_to("sync-1")]);
    assert_eq!(repo.appended_to("t3"), vec![synced_reference_to("sync-2")]);
}

#[tokio::test]
async fn not_found_block_reads_are_retried() {
    let repo = Arc::new(
        FakeNotion::new()
            .with_children(SOURCE_PAGE, vec![paragraph("p1", "%Fiary"), synced("sync-1")])
            .with_missing_children(SOURCE_PAGE, 2),
    );
    let dispatcher = WebhookDispatcher::new(repo.clone(), relay_config(vec![fiary()]));

    let report = dispatcher
        .dispatch(&payload(json!({ "Fiarybase": relation(&["t1"]) })))
        .await
        .unwrap();

    assert_eq!(report.delivered(), 1);
    assert_eq!(
        repo.count(|call| matches!(call, Call::RetrieveChildren(_))),
        3
    );
}

#[tokio::test]
async fn exhausted_retries_fail_only_that_mapping() {
    let repo = Arc::new(
        FakeNotion::new()
            .with_children(SOURCE_PAGE, vec![paragraph("p1", "%Fiary"), synced("sync-1")])
            .with_missing_children(SOURCE_PAGE, 5),
    );
    let dispatcher = WebhookDispatcher::new(repo.clone(), relay_config(vec![fiary()]));

    let report = dispatcher
        .dispatch(&payload(json!({ "Fiarybase": relation(&["t1"]) })))
        .await
        .unwrap();

    assert!(matches!(report.outcomes[0].1, MappingOutcome::Failed(_)));
    assert!(repo.appended_to("t1").is_empty());
}

#[tokio::test]
async fn mappings_can_come_from_a_database() {
    let rows = vec![
        page(
            "row-1",
            json!({ "Name": title("%Fiary"), "Relation": rich_text("Fiarybase") }),
        ),
        page("row-2", json!({ "Name": title("%Incomplete") })),
    ];
    let repo = Arc::new(
        FakeNotion::new()
            .with_database("mapping-db", rows, false)
            .with_children(SOURCE_PAGE, vec![paragraph("p1", "%Fiary"), synced("sync-1")]),
    );
    let config = RelayConfig {
        mappings: MappingSource::Database(database_id("mapping-db")),
        ..relay_config(vec![])
    };
    let dispatcher = WebhookDispatcher::new(repo.clone(), config);

    assert_eq!(dispatcher.load_mappings().await.unwrap(), vec![fiary()]);

    let report = dispatcher
        .dispatch(&payload(json!({ "Fiarybase": relation(&["t1"]) })))
        .await
        .unwrap();
    assert_eq!(report.delivered(), 1);
}

#[tokio::test]
async fn no_mappings_is_an_error() {
    let repo = Arc::new(FakeNotion::new().with_database("mapping-db", vec![], false));
    let config = RelayConfig {
        mappings: MappingSource::Database(database_id("mapping-db")),
        ..relay_config(vec![])
    };
    let dispatcher = WebhookDispatcher::new(repo, config);

    let err = dispatcher.dispatch(&payload(json!({}))).await.unwrap_err();
    assert!(matches!(err, AppError::Webhook(WebhookError::NoMappings)));
}

#[tokio::test]
async fn relations_can_be_read_from_the_api() {
    let repo = Arc::new(
        FakeNotion::new()
            .with_page(page(
                SOURCE_PAGE,
                json!({ "Fiarybase": relation(&["fresh"]) }),
            ))
            .with_children(SOURCE_PAGE, vec![paragraph("p1", "%Fiary"), synced("sync-1")]),
    );
    let config = RelayConfig {
        relation_source: RelationSource::Api,
        ..relay_config(vec![fiary()])
    };
    let dispatcher = WebhookDispatcher::new(repo.clone(), config);

    // The payload's stale relation is ignored in favour of the fetched page.
    dispatcher
        .dispatch(&payload(json!({ "Fiarybase": relation(&["stale"]) })))
        .await
        .unwrap();

    assert_eq!(repo.appended_to("fresh"), vec![synced_reference_to("sync-1")]);
    assert!(repo.appended_to("stale").is_empty());
}
