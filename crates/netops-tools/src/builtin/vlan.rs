//! Switch port VLAN tools

use async_trait::async_trait;
use netops_network::Inventory;
use std::sync::Arc;

use crate::error::ToolError;
use crate::schema::{ArgSchema, ArgType, ToolArgs, VLAN_RANGE};
use crate::tool::{SecurityLevel, Tool};

const IP_HELP: &str = "Device IP address";
const PORT_HELP: &str = "Port name (for example, Gi0/1)";

/// Read the VLAN of one port
pub struct ShowVlanPortTool {
    inventory: Arc<Inventory>,
    schema: ArgSchema,
}

impl ShowVlanPortTool {
    pub fn new(inventory: Arc<Inventory>) -> Self {
        Self {
            inventory,
            schema: ArgSchema::new()
                .required("ip", ArgType::Ipv4, IP_HELP)
                .required("port", ArgType::String, PORT_HELP),
        }
    }
}

#[async_trait]
impl Tool for ShowVlanPortTool {
    fn name(&self) -> &str {
        "show_vlan_port_tool"
    }

    fn description(&self) -> &str {
        "Shows the VLAN configured on a specific port of the network device. \
         Requires IP address and port name."
    }

    fn schema(&self) -> &ArgSchema {
        &self.schema
    }

    fn category(&self) -> &str {
        "vlan"
    }

    async fn invoke(&self, args: ToolArgs) -> Result<String, ToolError> {
        let ip = args.get_ipv4("ip")?;
        let port = args.get_str("port")?;
        let vlan = self.inventory.vlans.read(ip, port).await?;
        Ok(format!(
            "Port {} on device {} is configured in VLAN {}.",
            port, ip, vlan
        ))
    }
}

/// Read the whole VLAN table of a device
pub struct ShowVlanPortsAllTool {
    inventory: Arc<Inventory>,
    schema: ArgSchema,
}

impl ShowVlanPortsAllTool {
    pub fn new(inventory: Arc<Inventory>) -> Self {
        Self {
            inventory,
            schema: ArgSchema::new().required("ip", ArgType::Ipv4, IP_HELP),
        }
    }
}

#[async_trait]
impl Tool for ShowVlanPortsAllTool {
    fn name(&self) -> &str {
        "show_vlan_ports_all_tool"
    }

    fn description(&self) -> &str {
        "Displays a list of all ports on the device with their corresponding VLANs. \
         Requires the IP address of the device."
    }

    fn schema(&self) -> &ArgSchema {
        &self.schema
    }

    fn category(&self) -> &str {
        "vlan"
    }

    async fn invoke(&self, args: ToolArgs) -> Result<String, ToolError> {
        let ip = args.get_ipv4("ip")?;
        let table = self.inventory.vlans.read_all(ip).await?;

        let mut lines = Vec::with_capacity(table.len() + 1);
        lines.push(format!("VLAN table of device {}:", ip));
        for (port, vlan) in table {
            lines.push(format!(" - Port {} → VLAN {}", port, vlan));
        }
        Ok(lines.join("\n"))
    }
}

/// Bind a VLAN to a port
pub struct ChangeVlanTool {
    inventory: Arc<Inventory>,
    schema: ArgSchema,
}

impl ChangeVlanTool {
    pub fn new(inventory: Arc<Inventory>) -> Self {
        Self {
            inventory,
            schema: ArgSchema::new()
                .required("ip", ArgType::Ipv4, IP_HELP)
                .required("port", ArgType::String, PORT_HELP)
                .required("vlan", ArgType::Integer, "VLAN number (for example, 10)")
                .with_range(VLAN_RANGE),
        }
    }
}

#[async_trait]
impl Tool for ChangeVlanTool {
    fn name(&self) -> &str {
        "change_vlan_tool"
    }

    fn description(&self) -> &str {
        "Changes the VLAN on the specified port of the device. \
         Requires IP address, port name, and VLAN number."
    }

    fn schema(&self) -> &ArgSchema {
        &self.schema
    }

    fn security_level(&self) -> SecurityLevel {
        SecurityLevel::Modify
    }

    fn category(&self) -> &str {
        "vlan"
    }

    async fn invoke(&self, args: ToolArgs) -> Result<String, ToolError> {
        let ip = args.get_ipv4("ip")?;
        let port = args.get_str("port")?;
        // Range-checked by the schema
        let vlan = u16::try_from(args.get_int("vlan")?)
            .map_err(|_| ToolError::invalid_argument("VLAN id out of range"))?;

        let change = self.inventory.vlans.write(ip, port, vlan).await?;
        Ok(change.confirmation())
    }
}
