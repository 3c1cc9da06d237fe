//! In-memory calendar service (§3 Service; §10.6).

use async_trait::async_trait;
use imcp_core::{ServiceId, ServiceOutcome, Tool};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::Mutex;

use crate::error::{ServicesError, ServicesResult};
use crate::service::Service;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Event {
    title: String,
    start: String,
}

#[derive(Debug, Deserialize)]
struct CreateEventArgs {
    title: String,
    start: String,
}

/// A calendar backed by an in-memory event list.
pub struct CalendarService {
    events: Mutex<Vec<Event>>,
    tools: Vec<Tool>,
}

impl CalendarService {
    /// Construct an empty calendar with no events.
    #[must_use]
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            tools: vec![
                Tool::no_args(
                    "calendar_read",
                    "List upcoming calendar events.",
                    true,
                ),
                Tool {
                    name: "calendar_create".into(),
                    description: "Create a new calendar event.".to_string(),
                    input_schema: serde_json::json!({
                        "type": "object",
                        "properties": {
                            "title": { "type": "string" },
                            "start": { "type": "string", "description": "ISO 8601 timestamp" },
                        },
                        "required": ["title", "start"],
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

impl Default for CalendarService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Service for CalendarService {
    fn id(&self) -> ServiceId {
        ServiceId::new("CalendarService")
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
            "calendar_read" => {
                let events = self.events.lock().await;
                Ok(ServiceOutcome::Value(
                    serde_json::to_value(&*events).map_err(|e| {
                        ServicesError::ServiceFailure(format!("encode events: {e}"))
                    })?,
                ))
            },
            "calendar_create" => {
                let args: CreateEventArgs = serde_json::from_value(args).map_err(|e| {
                    ServicesError::ServiceFailure(format!("invalid arguments: {e}"))
                })?;
                let mut events = self.events.lock().await;
                events.push(Event {
                    title: args.title,
                    start: args.start,
                });
                Ok(ServiceOutcome::Value(serde_json::json!({ "created": true })))
            },
            _ => Ok(ServiceOutcome::NotHandled),
        }
    }
}
