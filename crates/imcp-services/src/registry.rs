//! Fixed, build-time ordered catalog of [`Service`]s.
//!
//! Mirrors `McpRegistry`'s job of giving callers a single `list_tools()` /
//! `call_tool()` surface over several underlying layers, but here the
//! layers are host-capability services rather than global/workspace MCP
//! clients, and the routing key is a precomputed `ToolName -> ServiceId`
//! map instead of a server name passed in by the caller.

use std::collections::HashMap;
use std::sync::Arc;

use imcp_core::{ServiceId, Tool, ToolName};

use crate::service::Service;

/// The ordered set of [`Service`]s known at build time, plus the derived
/// `ToolName -> ServiceId` lookup the dispatcher uses to route `CallTool`.
pub struct ServiceRegistry {
    services: Vec<Arc<dyn Service>>,
    tool_owner: HashMap<ToolName, usize>,
}

impl ServiceRegistry {
    /// Build a registry from an ordered list of services, precomputing the
    /// tool-name routing table.
    #[must_use]
    pub fn new(services: Vec<Arc<dyn Service>>) -> Self {
        let mut tool_owner = HashMap::new();
        for (index, service) in services.iter().enumerate() {
            for tool in service.tools() {
                tool_owner.insert(tool.name.clone(), index);
            }
        }
        Self {
            services,
            tool_owner,
        }
    }

    /// Iterate the registry's services in build order.
    pub fn services(&self) -> impl Iterator<Item = &Arc<dyn Service>> {
        self.services.iter()
    }

    /// Every tool across every service, in registry order, tagged with its
    /// owning service id.
    #[must_use]
    pub fn all_tools(&self) -> Vec<(ServiceId, &Tool)> {
        self.services
            .iter()
            .flat_map(|s| s.tools().iter().map(move |t| (s.id(), t)))
            .collect()
    }

    /// Resolve a tool name to its owning service, per the precomputed map.
    #[must_use]
    pub fn resolve(&self, name: &ToolName) -> Option<&Arc<dyn Service>> {
        self.tool_owner.get(name).map(|&i| &self.services[i])
    }
}

impl std::fmt::Debug for ServiceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceRegistry")
            .field("service_count", &self.services.len())
            .field("tool_count", &self.tool_owner.len())
            .finish()
    }
}
