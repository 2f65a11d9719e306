//! Inventory loading
//!
//! The inventory is built once at startup, either from the built-in lab table
//! or from a TOML file, and shared by reference with the tool layer.
//!
//! ```toml
//! [[device]]
//! name = "asw1"
//! ip = "192.168.1.10"
//!
//! [[switch]]
//! ip = "192.168.1.10"
//! allowed_vlans = [10, 20, 30, 40, 50]
//! [switch.ports]
//! "Gi0/1" = 10
//! ```

use netops_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::net::Ipv4Addr;
use std::path::Path;
use tracing::info;

use crate::directory::{DeviceDirectory, DeviceRecord};
use crate::vlan::{SwitchPorts, VlanStore};

/// Directory entry of an inventory file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceEntry {
    pub name: String,
    pub ip: Ipv4Addr,
}

/// Switch entry of an inventory file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwitchEntry {
    pub ip: Ipv4Addr,
    #[serde(default)]
    pub allowed_vlans: Vec<u16>,
    #[serde(default)]
    pub ports: BTreeMap<String, u16>,
}

/// On-disk inventory layout
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InventoryFile {
    #[serde(default, rename = "device")]
    pub devices: Vec<DeviceEntry>,
    #[serde(default, rename = "switch")]
    pub switches: Vec<SwitchEntry>,
}

impl InventoryFile {
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        toml::from_str(raw).map_err(|e| Error::config(format!("invalid inventory: {}", e)))
    }

    /// The lab network used by the assistant when no file is configured
    pub fn builtin() -> Self {
        let devices = [
            ("asw1", [192, 168, 1, 10]),
            ("asw2", [192, 168, 1, 11]),
            ("asw3", [192, 168, 1, 12]),
            ("dsw1", [192, 168, 2, 1]),
            ("dsw2", [192, 168, 2, 2]),
            ("core1", [192, 168, 3, 1]),
            ("fw1", [192, 168, 254, 1]),
            ("vpn-gw", [192, 168, 100, 1]),
            ("rtr-edge", [10, 0, 0, 1]),
            ("wlc1", [192, 168, 200, 10]),
        ]
        .into_iter()
        .map(|(name, ip)| DeviceEntry {
            name: name.to_string(),
            ip: Ipv4Addr::from(ip),
        })
        .collect();

        let access = [10, 20, 30, 40, 50];
        let distribution = [10, 20, 30, 100, 200];
        let core = [10, 20, 30, 100, 200, 300];

        let switches = vec![
            switch([192, 168, 1, 10], &access, "Gi0/", 1..=24, |i| match i {
                1..=8 => 10,
                9..=16 => 20,
                _ => 30,
            }),
            switch([192, 168, 1, 11], &access, "Gi0/", 1..=24, |i| {
                if i % 2 == 0 {
                    1
                } else {
                    40
                }
            }),
            switch([192, 168, 1, 12], &access, "Gi0/", 1..=24, |i| {
                if i <= 12 {
                    50
                } else {
                    60
                }
            }),
            switch([192, 168, 2, 1], &distribution, "Gi1/0/", 1..=24, |i| {
                if i <= 2 {
                    99
                } else {
                    10
                }
            }),
            switch([192, 168, 2, 2], &distribution, "Gi1/0/", 1..=24, |i| {
                if i <= 12 {
                    20
                } else {
                    30
                }
            }),
            switch([192, 168, 3, 1], &core, "Ten0/", 1..=8, |i| {
                if i == 1 || i == 4 {
                    1
                } else {
                    99
                }
            }),
        ];

        Self { devices, switches }
    }

    /// Validate and build the runtime inventory
    pub fn into_inventory(self) -> Result<Inventory> {
        let directory = DeviceDirectory::new(
            self.devices
                .into_iter()
                .map(|d| DeviceRecord::new(d.name, d.ip))
                .collect(),
        )?;

        let mut switches = HashMap::with_capacity(self.switches.len());
        for entry in self.switches {
            let name = directory
                .name_of(entry.ip)
                .map(str::to_string)
                .unwrap_or_else(|| entry.ip.to_string());
            let ports = SwitchPorts {
                name,
                ports: entry.ports.into_iter().collect(),
                allowed_vlans: entry.allowed_vlans.into_iter().collect(),
            };
            if switches.insert(entry.ip, ports).is_some() {
                return Err(Error::config(format!(
                    "duplicate switch entry for {}",
                    entry.ip
                )));
            }
        }

        Ok(Inventory {
            directory,
            vlans: VlanStore::new(switches),
        })
    }
}

fn switch<F>(
    ip: [u8; 4],
    allowed: &[u16],
    prefix: &str,
    range: std::ops::RangeInclusive<u16>,
    vlan_for: F,
) -> SwitchEntry
where
    F: Fn(u16) -> u16,
{
    SwitchEntry {
        ip: Ipv4Addr::from(ip),
        allowed_vlans: allowed.to_vec(),
        ports: range.map(|i| (format!("{}{}", prefix, i), vlan_for(i))).collect(),
    }
}

/// Device directory plus switch port state
#[derive(Debug)]
pub struct Inventory {
    pub directory: DeviceDirectory,
    pub vlans: VlanStore,
}

impl Inventory {
    /// Inventory of the built-in lab network
    pub fn builtin() -> Result<Self> {
        InventoryFile::builtin().into_inventory()
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        InventoryFile::from_toml_str(raw)?.into_inventory()
    }

    /// Load an inventory TOML file
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path).await?;
        let inventory = Self::from_toml_str(&raw)?;
        info!(
            path = %path.display(),
            devices = inventory.directory.len(),
            switches = inventory.vlans.device_count().await,
            "Loaded inventory"
        );
        Ok(inventory)
    }
}
