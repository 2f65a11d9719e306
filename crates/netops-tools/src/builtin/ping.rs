//! Reachability tool

use async_trait::async_trait;
use netops_network::Prober;
use std::sync::Arc;

use crate::error::ToolError;
use crate::schema::{ArgSchema, ArgType, ToolArgs};
use crate::tool::Tool;

pub struct PingTool {
    prober: Arc<dyn Prober>,
    schema: ArgSchema,
}

impl PingTool {
    pub fn new(prober: Arc<dyn Prober>) -> Self {
        Self {
            prober,
            schema: ArgSchema::new().required("ip", ArgType::Ipv4, "IPv4 address of the device"),
        }
    }
}

#[async_trait]
impl Tool for PingTool {
    fn name(&self) -> &str {
        "ping_tool"
    }

    fn description(&self) -> &str {
        "Checks the availability of an IP address via ping. \
         Used only when a valid IP address is provided."
    }

    fn schema(&self) -> &ArgSchema {
        &self.schema
    }

    fn category(&self) -> &str {
        "network"
    }

    async fn invoke(&self, args: ToolArgs) -> Result<String, ToolError> {
        let ip = args.get_ipv4("ip")?;
        let reachable = self.prober.probe(ip).await;
        Ok(if reachable {
            format!("Host {} is reachable.", ip)
        } else {
            format!("Host {} is not reachable.", ip)
        })
    }
}
