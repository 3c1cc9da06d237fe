//! In-memory reminders service (§3 Service; §10.6).

use async_trait::async_trait;
use imcp_core::{ServiceId, ServiceOutcome, Tool};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::Mutex;

use crate::error::{ServicesError, ServicesResult};
use crate::service::Service;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Reminder {
    text: String,
    completed: bool,
}

#[derive(Debug, Deserialize)]
struct CreateReminderArgs {
    text: String,
}

/// A reminders list backed by an in-memory vector.
pub struct RemindersService {
    reminders: Mutex<Vec<Reminder>>,
    tools: Vec<Tool>,
}

impl RemindersService {
    /// Construct an empty reminders list.
    #[must_use]
    pub fn new() -> Self {
        Self {
            reminders: Mutex::new(Vec::new()),
            tools: vec![
                Tool::no_args("reminders_list", "List all reminders.", true),
                Tool {
                    name: "reminders_create".into(),
                    description: "Create a new reminder.".to_string(),
                    input_schema: serde_json::json!({
                        "type": "object",
                        "properties": {
                            "text": { "type": "string" },
                        },
                        "required": ["text"],
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

impl Default for RemindersService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Service for RemindersService {
    fn id(&self) -> ServiceId {
        ServiceId::new("RemindersService")
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
            "reminders_list" => {
                let reminders = self.reminders.lock().await;
                Ok(ServiceOutcome::Value(
                    serde_json::to_value(&*reminders).map_err(|e| {
                        ServicesError::ServiceFailure(format!("encode reminders: {e}"))
                    })?,
                ))
            },
            "reminders_create" => {
                let args: CreateReminderArgs = serde_json::from_value(args).map_err(|e| {
                    ServicesError::ServiceFailure(format!("invalid arguments: {e}"))
                })?;
                let mut reminders = self.reminders.lock().await;
                reminders.push(Reminder {
                    text: args.text,
                    completed: false,
                });
                Ok(ServiceOutcome::Value(serde_json::json!({ "created": true })))
            },
            _ => Ok(ServiceOutcome::NotHandled),
        }
    }
}
