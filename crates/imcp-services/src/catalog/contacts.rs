//! In-memory contacts service (§3 Service; §10.6).
//!
//! Read-only by design — every tool this service exposes has
//! `readOnlyHint = true`, reflecting that the sample catalog does not model
//! contact mutation at all.

use async_trait::async_trait;
use imcp_core::{ServiceId, ServiceOutcome, Tool};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ServicesError, ServicesResult};
use crate::service::Service;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Contact {
    name: String,
    email: String,
}

#[derive(Debug, Deserialize)]
struct SearchArgs {
    #[serde(default)]
    query: String,
}

/// A contacts directory backed by a small fixed in-memory list.
pub struct ContactsService {
    contacts: Vec<Contact>,
    tools: Vec<Tool>,
}

impl ContactsService {
    /// Construct a contacts service seeded with a couple of sample entries.
    #[must_use]
    pub fn new() -> Self {
        Self {
            contacts: vec![
                Contact {
                    name: "Ada Lovelace".to_string(),
                    email: "ada@example.com".to_string(),
                },
                Contact {
                    name: "Grace Hopper".to_string(),
                    email: "grace@example.com".to_string(),
                },
            ],
            tools: vec![Tool {
                name: "contacts_search".into(),
                description: "Search contacts by name.".to_string(),
                input_schema: serde_json::json!({
                    "type": "object",
                    "properties": {
                        "query": { "type": "string" },
                    },
                    "additionalProperties": false,
                }),
                annotations: imcp_core::ToolAnnotations {
                    read_only_hint: true,
                },
            }],
        }
    }
}

impl Default for ContactsService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Service for ContactsService {
    fn id(&self) -> ServiceId {
        ServiceId::new("ContactsService")
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
            "contacts_search" => {
                let args: SearchArgs = serde_json::from_value(args).map_err(|e| {
                    ServicesError::ServiceFailure(format!("invalid arguments: {e}"))
                })?;
                let query = args.query.to_lowercase();
                let matches: Vec<&Contact> = self
                    .contacts
                    .iter()
                    .filter(|c| query.is_empty() || c.name.to_lowercase().contains(&query))
                    .collect();
                Ok(ServiceOutcome::Value(serde_json::to_value(matches).map_err(
                    |e| ServicesError::ServiceFailure(format!("encode contacts: {e}")),
                )?))
            },
            _ => Ok(ServiceOutcome::NotHandled),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn search_filters_by_name_substring() {
        let service = ContactsService::new();
        let ServiceOutcome::Value(value) = service
            .call("contacts_search", serde_json::json!({ "query": "ada" }))
            .await
            .unwrap()
        else {
            panic!("expected a value outcome");
        };
        assert_eq!(value.as_array().unwrap().len(), 1);
        assert_eq!(value[0]["name"], "Ada Lovelace");
    }

    #[tokio::test]
    async fn empty_query_returns_every_contact() {
        let service = ContactsService::new();
        let ServiceOutcome::Value(value) =
            service.call("contacts_search", serde_json::json!({})).await.unwrap()
        else {
            panic!("expected a value outcome");
        };
        assert_eq!(value.as_array().unwrap().len(), 2);
    }
}
