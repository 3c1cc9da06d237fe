//! In-memory messages service (§3 Service; §10.6).
//!
//! Distinct from the Message Watcher (`imcp-watcher`, §4.I), which observes
//! an external message store for *incoming* messages. This service models
//! the assistant-facing capability to list and send messages through the
//! dispatcher, independent of the watcher's polling loop.

use async_trait::async_trait;
use imcp_core::{ServiceId, ServiceOutcome, Tool};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::Mutex;

use crate::error::{ServicesError, ServicesResult};
use crate::service::Service;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Message {
    recipient: String,
    body: String,
}

#[derive(Debug, Deserialize)]
struct SendArgs {
    recipient: String,
    body: String,
}

/// A message outbox backed by an in-memory vector.
pub struct MessagesService {
    sent: Mutex<Vec<Message>>,
    tools: Vec<Tool>,
}

impl MessagesService {
    /// Construct an empty outbox.
    #[must_use]
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            tools: vec![
                Tool::no_args("messages_list", "List sent messages.", true),
                Tool {
                    name: "messages_send".into(),
                    description: "Send a message to a recipient.".to_string(),
                    input_schema: serde_json::json!({
                        "type": "object",
                        "properties": {
                            "recipient": { "type": "string" },
                            "body": { "type": "string" },
                        },
                        "required": ["recipient", "body"],
                        "additionalProperties": false,
                    }),
                    annotations: imcp_core::ToolAnnotations {
                        read_only_hint: false,
                    },
                },
            ],
        }
    }
}

impl Default for MessagesService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Service for MessagesService {
    fn id(&self) -> ServiceId {
        ServiceId::new("MessagesService")
    }

    async fn is_activated(&self) -> bool {
        true
    }

    async fn activate(&self) -> ServicesResult<()> {
        Ok(())
    }

    fn tools(&self) -> &[Tool] {
        &self.tools
    }

    async fn call(&self, tool_name: &str, args: Value) -> ServicesResult<ServiceOutcome> {
        match tool_name {
            "messages_list" => {
                let sent = self.sent.lock().await;
                Ok(ServiceOutcome::Value(serde_json::to_value(&*sent).map_err(
                    |e| ServicesError::ServiceFailure(format!("encode messages: {e}")),
                )?))
            },
            "messages_send" => {
                let args: SendArgs = serde_json::from_value(args).map_err(|e| {
                    ServicesError::ServiceFailure(format!("invalid arguments: {e}"))
                })?;
                // Recipient addresses and message bodies are sensitive:
                // never logged, only retained in the in-memory outbox.
                let mut sent = self.sent.lock().await;
                sent.push(Message {
                    recipient: args.recipient,
                    body: args.body,
                });
                Ok(ServiceOutcome::Value(serde_json::json!({ "sent": true })))
            },
            _ => Ok(ServiceOutcome::NotHandled),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sent_messages_appear_in_list() {
        let service = MessagesService::new();
        service
            .call(
                "messages_send",
                serde_json::json!({ "recipient": "ada@example.com", "body": "hi" }),
            )
            .await
            .unwrap();

        let ServiceOutcome::Value(value) =
            service.call("messages_list", Value::Null).await.unwrap()
        else {
            panic!("expected a value outcome");
        };
        assert_eq!(value[0]["recipient"], "ada@example.com");
    }
}
