//! netops-network: Network inventory and reachability
//!
//! This crate provides:
//! - IPv4 argument validation shared by every IP-taking tool
//! - The device directory (CMDB): device name to management IP
//! - Port/VLAN state per switch with serialized writes
//! - Inventory loading from the built-in table or a TOML file
//! - ICMP reachability probing through the system `ping`

pub mod directory;
pub mod inventory;
pub mod ipv4;
pub mod probe;
pub mod vlan;

pub use directory::{DeviceDirectory, DeviceRecord};
pub use inventory::{Inventory, InventoryFile};
pub use ipv4::parse_ipv4;
pub use probe::{PingProber, Prober};
pub use vlan::{SwitchPorts, VlanChange, VlanStore};

/// Prelude for convenient imports
pub mod prelude {
    pub use super::directory::DeviceDirectory;
    pub use super::inventory::Inventory;
    pub use super::ipv4::parse_ipv4;
    pub use super::probe::{PingProber, Prober};
    pub use super::vlan::VlanStore;
}
