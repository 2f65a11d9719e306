//! CMDB lookup tool

use async_trait::async_trait;
use netops_network::Inventory;
use std::sync::Arc;

use crate::error::ToolError;
use crate::schema::{ArgSchema, ArgType, ToolArgs};
use crate::tool::Tool;

pub struct CmdbTool {
    inventory: Arc<Inventory>,
    schema: ArgSchema,
}

impl CmdbTool {
    pub fn new(inventory: Arc<Inventory>) -> Self {
        Self {
            inventory,
            schema: ArgSchema::new().required("name", ArgType::String, "Device name (hostname)"),
        }
    }
}

#[async_trait]
impl Tool for CmdbTool {
    fn name(&self) -> &str {
        "cmdb_tool"
    }

    fn description(&self) -> &str {
        "Retrieves the IP address of a device by name from the CMDB. \
         If the IP is not found, use lookup_docs()."
    }

    fn schema(&self) -> &ArgSchema {
        &self.schema
    }

    fn category(&self) -> &str {
        "inventory"
    }

    async fn invoke(&self, args: ToolArgs) -> Result<String, ToolError> {
        let name = args.get_str("name")?;
        let ip = self.inventory.directory.lookup(name)?;
        Ok(ip.to_string())
    }
}
