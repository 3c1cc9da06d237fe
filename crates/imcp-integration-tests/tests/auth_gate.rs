//! S1 (spec §8): a connection against an empty token store is rejected
//! without ever reaching the MCP session.

mod common;

use imcp_services::catalog::CalendarService;
use std::sync::Arc;

#[tokio::test]
async fn empty_token_store_rejects_every_preamble() {
    let harness = common::Harness::start(vec![Arc::new(CalendarService::new())], Default::default()).await;

    let mut client = harness.connect().await;
    client.send_preamble(&"00".repeat(32)).await;
    client.assert_closed().await;
}
