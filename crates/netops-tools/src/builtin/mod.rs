//! Built-in Tools
//!
//! The network operations toolset exposed to the agent.
//!
//! ## Tools
//!
//! - **ping_tool**: ICMP reachability of an IPv4 address
//! - **cmdb_tool**: device name to management IP
//! - **show_vlan_port_tool** / **show_vlan_ports_all_tool**: read switch port VLANs
//! - **change_vlan_tool**: bind a VLAN to a switch port
//! - **lookup_docs**: search the indexed internal documentation
//!
//! Every IP-taking tool declares its `ip` argument as [`ArgType::Ipv4`], so a
//! malformed address is rejected by the schema before any store or probe is
//! touched.
//!
//! [`ArgType::Ipv4`]: crate::schema::ArgType::Ipv4

mod cmdb;
mod docs;
mod ping;
mod vlan;

pub use cmdb::CmdbTool;
pub use docs::LookupDocsTool;
pub use ping::PingTool;
pub use vlan::{ChangeVlanTool, ShowVlanPortTool, ShowVlanPortsAllTool};

use netops_network::{Inventory, Prober};
use netops_rag::KnowledgeBase;
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::ToolError;
use crate::registry::ToolRegistry;

/// Shared resources the built-in tools operate on
#[derive(Clone)]
pub struct NetworkToolContext {
    pub inventory: Arc<Inventory>,
    pub prober: Arc<dyn Prober>,
    pub knowledge: Arc<KnowledgeBase>,
    /// Passages returned by `lookup_docs`
    pub top_k: usize,
}

impl NetworkToolContext {
    pub fn new(
        inventory: Arc<Inventory>,
        prober: Arc<dyn Prober>,
        knowledge: Arc<KnowledgeBase>,
    ) -> Self {
        Self {
            inventory,
            prober,
            knowledge,
            top_k: 1,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k.max(1);
        self
    }
}

/// Register the network toolset with the registry
pub fn register_network_tools(
    registry: &mut ToolRegistry,
    ctx: &NetworkToolContext,
) -> Result<(), ToolError> {
    registry.register(Arc::new(PingTool::new(ctx.prober.clone())))?;
    registry.register(Arc::new(CmdbTool::new(ctx.inventory.clone())))?;
    debug!("Registered reachability and CMDB tools");

    registry.register(Arc::new(ShowVlanPortTool::new(ctx.inventory.clone())))?;
    registry.register(Arc::new(ShowVlanPortsAllTool::new(ctx.inventory.clone())))?;
    registry.register(Arc::new(ChangeVlanTool::new(ctx.inventory.clone())))?;
    debug!("Registered VLAN tools");

    registry.register(Arc::new(LookupDocsTool::new(
        ctx.knowledge.clone(),
        ctx.top_k,
    )))?;

    info!(tools = registry.len(), "Built-in tool registration complete");
    Ok(())
}

/// Registry holding only the network toolset
pub fn build_network_registry(ctx: &NetworkToolContext) -> Result<ToolRegistry, ToolError> {
    let mut registry = ToolRegistry::new();
    register_network_tools(&mut registry, ctx)?;
    Ok(registry)
}
