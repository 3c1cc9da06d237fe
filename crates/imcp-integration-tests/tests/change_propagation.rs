//! S4 (spec §8): enabling a previously-disabled service mid-session
//! delivers exactly one `notifications/tools/list_changed`, after which a
//! fresh `tools/list` reflects the new binding.
//!
//! A session's [`imcp_core::Token`] is fixed for its whole lifetime once
//! the Auth Gate admits it (§4.C: "in-flight sessions continue using the
//! token they were admitted with") — only the live service-enabled
//! bindings are re-read on every `tools/list`/`tools/call` (§4.F), so this
//! exercises the binding toggle rather than a permission edit on the same
//! token.

mod common;

use std::collections::HashMap;
use std::sync::Arc;

use imcp_core::{Permission, ServiceId};
use imcp_services::catalog::{CalendarService, ContactsService};

fn enabled(services: &[&str]) -> HashMap<ServiceId, bool> {
    services.iter().map(|s| (ServiceId::new(*s), true)).collect()
}

fn full_permissions(services: &[&str]) -> HashMap<ServiceId, Permission> {
    services.iter().map(|s| (ServiceId::new(*s), Permission::Full)).collect()
}

#[tokio::test]
async fn enabling_a_service_notifies_the_live_session() {
    let harness = start_harness().await;

    let token = common::fixture_token("full-access", full_permissions(&["CalendarService", "ContactsService"]));
    harness.publish_token(token);

    let mut client = harness.connect().await;
    client.send_preamble(&common::fixture_secret_hex()).await;
    client.handshake().await;

    let before = client.list_tools(1).await;
    let before_names: std::collections::HashSet<&str> = before.iter().filter_map(|t| t["name"].as_str()).collect();
    assert_eq!(before_names, ["calendar_read", "calendar_create"].into_iter().collect());

    // Enable the previously-disabled ContactsService and fan out the
    // change notification — the same two steps the external trust
    // boundary that owns service bindings takes together (§4.F, §4.G).
    harness.publish_bindings(enabled(&["CalendarService", "ContactsService"]));
    harness.state.broadcaster.notify_changed();

    client.recv_notification("notifications/tools/list_changed").await;

    let after = client.list_tools(2).await;
    let after_names: std::collections::HashSet<&str> = after.iter().filter_map(|t| t["name"].as_str()).collect();
    assert!(after_names.contains("calendar_read"));
    assert!(after_names.contains("calendar_create"));
    assert!(after_names.contains("contacts_search"));
}

async fn start_harness() -> common::Harness {
    common::Harness::start(
        vec![Arc::new(CalendarService::new()), Arc::new(ContactsService::new())],
        enabled(&["CalendarService"]),
    )
    .await
}
