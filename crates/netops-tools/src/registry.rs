//! Tool Registry with usage statistics
//!
//! Tools are registered once at startup; afterwards the registry is shared
//! read-only between sessions. Lookup is by exact name, declarations are
//! produced in registration order.

use netops_core::ToolDeclaration;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::error::ToolError;
use crate::tool::{BoxedTool, SecurityLevel};

/// A registered tool with usage tracking
struct RegisteredTool {
    tool: BoxedTool,
    calls: AtomicU64,
    failures: AtomicU64,
}

/// Tool metadata for listings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
    pub category: String,
    pub security_level: SecurityLevel,
    pub calls: u64,
    pub failures: u64,
}

/// Statistics about the registry
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistryStats {
    pub total_registered: usize,
    pub total_calls: u64,
    pub total_failures: u64,
}

/// Name-indexed tool registry
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<RegisteredTool>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool; names must be unique
    pub fn register(&mut self, tool: BoxedTool) -> Result<(), ToolError> {
        let name = tool.name().to_string();
        if self.index.contains_key(&name) {
            return Err(ToolError::invalid_argument(format!(
                "tool '{}' is already registered",
                name
            )));
        }
        debug!("Registered tool: {}", name);
        self.index.insert(name, self.tools.len());
        self.tools.push(RegisteredTool {
            tool,
            calls: AtomicU64::new(0),
            failures: AtomicU64::new(0),
        });
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<BoxedTool> {
        self.index.get(name).map(|idx| self.tools[*idx].tool.clone())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Declarations advertised to the model, in registration order
    pub fn declarations(&self) -> Vec<ToolDeclaration> {
        self.tools.iter().map(|t| t.tool.declaration()).collect()
    }

    pub fn list(&self) -> Vec<ToolInfo> {
        self.tools.iter().map(info_of).collect()
    }

    pub fn info(&self, name: &str) -> Option<ToolInfo> {
        self.index.get(name).map(|idx| info_of(&self.tools[*idx]))
    }

    pub fn stats(&self) -> RegistryStats {
        RegistryStats {
            total_registered: self.tools.len(),
            total_calls: self
                .tools
                .iter()
                .map(|t| t.calls.load(Ordering::Relaxed))
                .sum(),
            total_failures: self
                .tools
                .iter()
                .map(|t| t.failures.load(Ordering::Relaxed))
                .sum(),
        }
    }

    /// Validate `arguments` against the tool's schema and invoke it
    pub async fn execute(&self, name: &str, arguments: &Value) -> Result<String, ToolError> {
        let registered = self
            .index
            .get(name)
            .map(|idx| &self.tools[*idx])
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;

        registered.calls.fetch_add(1, Ordering::Relaxed);
        let start = Instant::now();

        let result = match registered.tool.schema().validate(arguments) {
            Ok(args) => registered.tool.invoke(args).await,
            Err(e) => Err(e),
        };

        let elapsed_ms = start.elapsed().as_millis() as u64;
        match &result {
            Ok(_) => info!(tool = name, elapsed_ms, "Tool executed"),
            Err(e) => {
                registered.failures.fetch_add(1, Ordering::Relaxed);
                warn!(tool = name, kind = %e.kind(), error = %e, elapsed_ms, "Tool failed");
            }
        }
        result
    }
}

fn info_of(registered: &RegisteredTool) -> ToolInfo {
    let tool = &registered.tool;
    ToolInfo {
        name: tool.name().to_string(),
        description: tool.description().to_string(),
        input_schema: tool.schema().to_json_schema(),
        category: tool.category().to_string(),
        security_level: tool.security_level(),
        calls: registered.calls.load(Ordering::Relaxed),
        failures: registered.failures.load(Ordering::Relaxed),
    }
}
