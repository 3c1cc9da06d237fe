//! S2 and S3 (spec §8): a read-only token sees only read-only tools, and a
//! call outside its permission is rejected as a tool-level error rather
//! than a protocol failure.

mod common;

use std::collections::HashMap;
use std::sync::Arc;

use imcp_core::{Permission, ServiceId};
use imcp_services::catalog::CalendarService;

fn calendar_enabled() -> HashMap<ServiceId, bool> {
    let mut map = HashMap::new();
    map.insert(ServiceId::new("CalendarService"), true);
    map
}

fn calendar_permission(level: Permission) -> HashMap<ServiceId, Permission> {
    let mut map = HashMap::new();
    map.insert(ServiceId::new("CalendarService"), level);
    map
}

#[tokio::test]
async fn read_only_token_lists_only_the_read_only_tool() {
    let harness = common::Harness::start(vec![Arc::new(CalendarService::new())], calendar_enabled()).await;

    let token = common::fixture_token("reader", calendar_permission(Permission::ReadOnly));
    harness.publish_token(token);

    let mut client = harness.connect().await;
    client.send_preamble(&common::fixture_secret_hex()).await;
    client.handshake().await;

    let tools = client.list_tools(1).await;
    let names: Vec<&str> = tools.iter().filter_map(|t| t["name"].as_str()).collect();

    assert_eq!(names, vec!["calendar_read"]);
}

#[tokio::test]
async fn calling_a_tool_outside_permission_is_denied() {
    let harness = common::Harness::start(vec![Arc::new(CalendarService::new())], calendar_enabled()).await;

    let token = common::fixture_token("reader", calendar_permission(Permission::ReadOnly));
    harness.publish_token(token);

    let mut client = harness.connect().await;
    client.send_preamble(&common::fixture_secret_hex()).await;
    client.handshake().await;

    let resp = client
        .call_tool(1, "calendar_create", serde_json::json!({ "title": "Standup", "start": "2026-08-01T09:00:00Z" }))
        .await;

    assert_eq!(resp["result"]["isError"], true);
    let text = resp["result"]["content"][0]["text"].as_str().unwrap_or_default();
    assert!(text.contains("permission denied"), "unexpected error text: {text}");
}
