//! Switch port VLAN state
//!
//! The store owns the port → VLAN table of every switch plus the set of VLANs
//! each switch accepts. Writes hold the write guard across the
//! check-then-set, so writes to the same port serialize and readers never
//! observe a partially applied change.

use netops_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};
use std::net::Ipv4Addr;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Port table of one switch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchPorts {
    /// Display name; the IP when the device is not in the directory
    pub name: String,
    pub ports: HashMap<String, u16>,
    /// VLANs the switch accepts on a change; empty means no change is allowed
    pub allowed_vlans: BTreeSet<u16>,
}

impl SwitchPorts {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ports: HashMap::new(),
            allowed_vlans: BTreeSet::new(),
        }
    }

    pub fn with_port(mut self, port: impl Into<String>, vlan: u16) -> Self {
        self.ports.insert(port.into(), vlan);
        self
    }

    pub fn with_allowed<I: IntoIterator<Item = u16>>(mut self, vlans: I) -> Self {
        self.allowed_vlans.extend(vlans);
        self
    }
}

/// Outcome of a successful VLAN change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VlanChange {
    pub device: String,
    pub ip: Ipv4Addr,
    pub port: String,
    pub previous_vlan: u16,
    pub vlan: u16,
}

impl VlanChange {
    /// Human-readable confirmation; identical whether or not the VLAN changed
    pub fn confirmation(&self) -> String {
        format!(
            "VLAN on port {} of device {} ({}) successfully changed to VLAN {}.",
            self.port, self.device, self.ip, self.vlan
        )
    }
}

/// Port/VLAN state of all switches
#[derive(Debug, Default)]
pub struct VlanStore {
    switches: RwLock<HashMap<Ipv4Addr, SwitchPorts>>,
}

impl VlanStore {
    pub fn new(switches: HashMap<Ipv4Addr, SwitchPorts>) -> Self {
        Self {
            switches: RwLock::new(switches),
        }
    }

    /// VLAN currently bound to `(ip, port)`
    pub async fn read(&self, ip: Ipv4Addr, port: &str) -> Result<u16> {
        let switches = self.switches.read().await;
        let switch = switches.get(&ip).ok_or_else(|| device_not_found(ip))?;
        switch
            .ports
            .get(port)
            .copied()
            .ok_or_else(|| port_not_found(port, switch, ip))
    }

    /// Every `(port, vlan)` of a device in natural port order
    pub async fn read_all(&self, ip: Ipv4Addr) -> Result<Vec<(String, u16)>> {
        let switches = self.switches.read().await;
        let switch = switches.get(&ip).ok_or_else(|| device_not_found(ip))?;
        let mut table: Vec<(String, u16)> = switch
            .ports
            .iter()
            .map(|(port, vlan)| (port.clone(), *vlan))
            .collect();
        table.sort_by(|a, b| natural_cmp(&a.0, &b.0));
        Ok(table)
    }

    /// Bind `vlan` to `(ip, port)`.
    ///
    /// Never creates ports. Fails `NotSupported` when the VLAN is outside the
    /// device's allowed set, leaving the stored value untouched.
    pub async fn write(&self, ip: Ipv4Addr, port: &str, vlan: u16) -> Result<VlanChange> {
        let mut switches = self.switches.write().await;
        let switch = switches.get_mut(&ip).ok_or_else(|| device_not_found(ip))?;

        if !switch.ports.contains_key(port) {
            return Err(port_not_found(port, switch, ip));
        }
        if !switch.allowed_vlans.contains(&vlan) {
            debug!(%ip, port, vlan, "Rejected VLAN outside allowed set");
            return Err(Error::not_supported(format!(
                "VLAN {} is not configured on device {} ({}).",
                vlan, switch.name, ip
            )));
        }

        let slot = switch
            .ports
            .get_mut(port)
            .ok_or_else(|| Error::internal("port vanished under write lock"))?;
        let previous_vlan = std::mem::replace(slot, vlan);

        info!(%ip, port, previous_vlan, vlan, "VLAN changed");

        Ok(VlanChange {
            device: switch.name.clone(),
            ip,
            port: port.to_string(),
            previous_vlan,
            vlan,
        })
    }

    /// Display name of a device held by the store
    pub async fn device_name(&self, ip: Ipv4Addr) -> Option<String> {
        self.switches.read().await.get(&ip).map(|s| s.name.clone())
    }

    pub async fn device_count(&self) -> usize {
        self.switches.read().await.len()
    }
}

fn device_not_found(ip: Ipv4Addr) -> Error {
    Error::not_found(format!("Device with IP {} not found in the database.", ip))
}

fn port_not_found(port: &str, switch: &SwitchPorts, ip: Ipv4Addr) -> Error {
    Error::not_found(format!(
        "Port {} not found on device {} ({}).",
        port, switch.name, ip
    ))
}

/// Compare port names so that numeric components order numerically
/// (`Gi0/2` < `Gi0/10`).
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut left = a.chars().peekable();
    let mut right = b.chars().peekable();

    loop {
        match (left.peek().copied(), right.peek().copied()) {
            (None, None) => return a.cmp(b),
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(l), Some(r)) if l.is_ascii_digit() && r.is_ascii_digit() => {
                let ln = take_number(&mut left);
                let rn = take_number(&mut right);
                match ln.cmp(&rn) {
                    Ordering::Equal => continue,
                    other => return other,
                }
            }
            (Some(l), Some(r)) => {
                left.next();
                right.next();
                match l.cmp(&r) {
                    Ordering::Equal => continue,
                    other => return other,
                }
            }
        }
    }
}

fn take_number<I: Iterator<Item = char>>(chars: &mut std::iter::Peekable<I>) -> u64 {
    let mut value: u64 = 0;
    while let Some(c) = chars.peek().copied() {
        match c.to_digit(10) {
            Some(d) => {
                value = value.saturating_mul(10).saturating_add(d as u64);
                chars.next();
            }
            None => break,
        }
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use netops_core::ErrorKind;
    use std::sync::Arc;

    const ASW1: Ipv4Addr = Ipv4Addr::new(192, 168, 1, 10);

    fn store() -> VlanStore {
        let mut switches = HashMap::new();
        switches.insert(
            ASW1,
            SwitchPorts::new("asw1")
                .with_port("Gi0/1", 10)
                .with_port("Gi0/2", 10)
                .with_port("Gi0/10", 20)
                .with_allowed([10, 20, 30, 40, 50]),
        );
        switches.insert(
            Ipv4Addr::new(10, 0, 0, 2),
            SwitchPorts::new("10.0.0.2").with_port("Gi0/0", 100),
        );
        VlanStore::new(switches)
    }

    #[tokio::test]
    async fn test_read_known_port() {
        assert_eq!(store().read(ASW1, "Gi0/1").await.unwrap(), 10);
    }

    #[tokio::test]
    async fn test_read_unknown_device_and_port() {
        let store = store();
        let err = store.read(Ipv4Addr::new(1, 1, 1, 1), "Gi0/1").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        let err = store.read(ASW1, "Gi9/9").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(err.to_string().contains("asw1"));
    }

    #[tokio::test]
    async fn test_read_all_natural_order() {
        let table = store().read_all(ASW1).await.unwrap();
        let ports: Vec<&str> = table.iter().map(|(p, _)| p.as_str()).collect();
        assert_eq!(ports, vec!["Gi0/1", "Gi0/2", "Gi0/10"]);
    }

    #[tokio::test]
    async fn test_write_disallowed_leaves_state() {
        let store = store();
        let err = store.write(ASW1, "Gi0/1", 999).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotSupported);
        assert_eq!(store.read(ASW1, "Gi0/1").await.unwrap(), 10);
    }

    #[tokio::test]
    async fn test_write_without_allowed_set_is_rejected() {
        let store = store();
        let ip = Ipv4Addr::new(10, 0, 0, 2);
        let err = store.write(ip, "Gi0/0", 100).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotSupported);
    }

    #[tokio::test]
    async fn test_write_is_idempotent() {
        let store = store();
        let first = store.write(ASW1, "Gi0/1", 20).await.unwrap();
        let second = store.write(ASW1, "Gi0/1", 20).await.unwrap();
        assert_eq!(first.confirmation(), second.confirmation());
        assert_eq!(first.previous_vlan, 10);
        assert_eq!(second.previous_vlan, 20);
        assert_eq!(store.read(ASW1, "Gi0/1").await.unwrap(), 20);
    }

    #[tokio::test]
    async fn test_concurrent_writes_end_in_a_written_value() {
        let store = Arc::new(store());
        let mut handles = Vec::new();
        for vlan in [10u16, 20, 30, 40, 50] {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.write(ASW1, "Gi0/2", vlan).await.unwrap()
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        let vlan = store.read(ASW1, "Gi0/2").await.unwrap();
        assert!([10, 20, 30, 40, 50].contains(&vlan));
    }

    #[test]
    fn test_natural_cmp() {
        assert_eq!(natural_cmp("Gi0/2", "Gi0/10"), Ordering::Less);
        assert_eq!(natural_cmp("Gi1/0/1", "Gi0/24"), Ordering::Greater);
        assert_eq!(natural_cmp("Ten0/1", "Ten0/1"), Ordering::Equal);
        assert_eq!(natural_cmp("Gi0", "Gi0/1"), Ordering::Less);
    }
}
