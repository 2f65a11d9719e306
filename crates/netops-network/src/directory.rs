//! Device directory (CMDB): device name to management IP

use netops_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::Ipv4Addr;

/// A device known to the CMDB
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceRecord {
    pub name: String,
    pub ip: Ipv4Addr,
}

impl DeviceRecord {
    pub fn new(name: impl Into<String>, ip: Ipv4Addr) -> Self {
        Self {
            name: name.into(),
            ip,
        }
    }
}

/// Immutable name/IP directory, unique by name and by IP
#[derive(Debug, Clone, Default)]
pub struct DeviceDirectory {
    records: Vec<DeviceRecord>,
    by_name: HashMap<String, usize>,
    by_ip: HashMap<Ipv4Addr, usize>,
}

impl DeviceDirectory {
    /// Build the directory, rejecting duplicate names or addresses
    pub fn new(records: Vec<DeviceRecord>) -> Result<Self> {
        let mut by_name = HashMap::with_capacity(records.len());
        let mut by_ip = HashMap::with_capacity(records.len());

        for (idx, record) in records.iter().enumerate() {
            if record.name.trim().is_empty() {
                return Err(Error::config("device name must not be empty"));
            }
            if by_name.insert(record.name.clone(), idx).is_some() {
                return Err(Error::config(format!(
                    "duplicate device name in directory: {}",
                    record.name
                )));
            }
            if by_ip.insert(record.ip, idx).is_some() {
                return Err(Error::config(format!(
                    "duplicate device address in directory: {}",
                    record.ip
                )));
            }
        }

        Ok(Self {
            records,
            by_name,
            by_ip,
        })
    }

    /// Exact-match lookup of a device address by name
    pub fn lookup(&self, name: &str) -> Result<Ipv4Addr> {
        self.by_name
            .get(name)
            .map(|idx| self.records[*idx].ip)
            .ok_or_else(|| Error::not_found(format!("Device with name {} not found.", name)))
    }

    /// Reverse lookup used to name devices in messages
    pub fn name_of(&self, ip: Ipv4Addr) -> Option<&str> {
        self.by_ip.get(&ip).map(|idx| self.records[*idx].name.as_str())
    }

    pub fn records(&self) -> &[DeviceRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use netops_core::ErrorKind;

    fn directory() -> DeviceDirectory {
        DeviceDirectory::new(vec![
            DeviceRecord::new("asw1", Ipv4Addr::new(192, 168, 1, 10)),
            DeviceRecord::new("core1", Ipv4Addr::new(192, 168, 3, 1)),
        ])
        .unwrap()
    }

    #[test]
    fn test_lookup_exact_match() {
        let dir = directory();
        assert_eq!(dir.lookup("asw1").unwrap(), Ipv4Addr::new(192, 168, 1, 10));
        assert_eq!(dir.lookup("ASW1").unwrap_err().kind(), ErrorKind::NotFound);
        assert_eq!(dir.lookup("asw").unwrap_err().kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_reverse_lookup() {
        let dir = directory();
        assert_eq!(dir.name_of(Ipv4Addr::new(192, 168, 3, 1)), Some("core1"));
        assert_eq!(dir.name_of(Ipv4Addr::new(10, 0, 0, 2)), None);
    }

    #[test]
    fn test_rejects_duplicates() {
        let ip = Ipv4Addr::new(10, 0, 0, 1);
        let dup_name = DeviceDirectory::new(vec![
            DeviceRecord::new("a", ip),
            DeviceRecord::new("a", Ipv4Addr::new(10, 0, 0, 2)),
        ]);
        assert_eq!(dup_name.unwrap_err().kind(), ErrorKind::Config);

        let dup_ip = DeviceDirectory::new(vec![DeviceRecord::new("a", ip), DeviceRecord::new("b", ip)]);
        assert_eq!(dup_ip.unwrap_err().kind(), ErrorKind::Config);
    }
}
