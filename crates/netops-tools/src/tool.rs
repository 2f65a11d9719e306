//! Core Tool trait and types
//!
//! Defines the interface every capability exposed to the model implements.

use async_trait::async_trait;
use netops_core::ToolDeclaration;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::ToolError;
use crate::schema::{ArgSchema, ToolArgs};

/// Security level for tool operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SecurityLevel {
    /// Safe read-only operations
    #[default]
    ReadOnly,
    /// Operations that change device state
    Modify,
}

/// Core trait for all tools
#[async_trait]
pub trait Tool: Send + Sync {
    /// Unique name the model calls the tool by
    fn name(&self) -> &str;

    /// Description shown to the model
    fn description(&self) -> &str;

    /// Ordered argument schema
    fn schema(&self) -> &ArgSchema;

    /// Run the tool with already validated arguments.
    ///
    /// `Ok` carries the observation text; domain-negative results such as an
    /// unreachable host are `Ok` too.
    async fn invoke(&self, args: ToolArgs) -> Result<String, ToolError>;

    fn security_level(&self) -> SecurityLevel {
        SecurityLevel::ReadOnly
    }

    fn category(&self) -> &str {
        "general"
    }

    /// Declaration sent to the model
    fn declaration(&self) -> ToolDeclaration {
        ToolDeclaration {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.schema().to_json_schema(),
        }
    }
}

/// Type alias for shared tools
pub type BoxedTool = Arc<dyn Tool>;

type Handler = dyn Fn(ToolArgs) -> Result<String, ToolError> + Send + Sync;

/// Closure-backed tool, handy for tests and one-off capabilities
#[derive(Clone)]
pub struct SimpleTool {
    name: String,
    description: String,
    schema: ArgSchema,
    handler: Arc<Handler>,
}

impl SimpleTool {
    pub fn new<F>(name: &str, description: &str, schema: ArgSchema, handler: F) -> Self
    where
        F: Fn(ToolArgs) -> Result<String, ToolError> + Send + Sync + 'static,
    {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            schema,
            handler: Arc::new(handler),
        }
    }
}

#[async_trait]
impl Tool for SimpleTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn schema(&self) -> &ArgSchema {
        &self.schema
    }

    async fn invoke(&self, args: ToolArgs) -> Result<String, ToolError> {
        (self.handler)(args)
    }
}
