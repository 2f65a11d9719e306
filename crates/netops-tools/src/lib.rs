//! netops-tools: Tool contract layer
//!
//! Every capability the agent may call is a [`Tool`]: a name, a
//! natural-language description, an ordered argument schema and an async
//! `invoke`. Tools are collected once at startup into a [`ToolRegistry`]
//! that the dispatcher and the HTTP router share by reference.

pub mod builtin;
pub mod error;
pub mod registry;
pub mod router;
pub mod schema;
pub mod tool;

// Re-export main types
pub use builtin::{build_network_registry, register_network_tools, NetworkToolContext};
pub use error::ToolError;
pub use registry::{RegistryStats, ToolInfo, ToolRegistry};
pub use router::{create_router, ToolsState};
pub use schema::{ArgField, ArgSchema, ArgType, ToolArgs};
pub use tool::{BoxedTool, SecurityLevel, SimpleTool, Tool};
