//! Adapter discovery and presence probing
//!
//! Adapters are listed from sysfs so they come with their driver-supplied
//! names. When sysfs is unavailable the `/dev/i2c-*` nodes are listed instead.

use std::fs;
use std::path::Path;

use wmreg_core::probe::{self, ProbeResult};

use crate::device::{device_path, LinuxI2c, LinuxI2cConfig};

const SYSFS_I2C_DEV: &str = "/sys/class/i2c-dev";

/// An I2C adapter known to the kernel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct I2cAdapter {
    /// Bus number (N in `/dev/i2c-N`)
    pub bus: u32,
    /// Adapter name, empty when unknown
    pub name: String,
}

impl I2cAdapter {
    /// Character device path
    pub fn path(&self) -> String {
        device_path(self.bus)
    }
}

/// Bus number from an entry name such as `i2c-3`
pub fn parse_bus_number(entry: &str) -> Option<u32> {
    entry.strip_prefix("i2c-")?.parse().ok()
}

/// List adapters, sorted by bus number
pub fn list_adapters() -> Vec<I2cAdapter> {
    let mut adapters = match fs::read_dir(SYSFS_I2C_DEV) {
        Ok(entries) => entries
            .filter_map(|e| e.ok())
            .filter_map(|e| {
                let bus = parse_bus_number(&e.file_name().to_string_lossy())?;
                let name = fs::read_to_string(e.path().join("name"))
                    .map(|s| s.trim().to_string())
                    .unwrap_or_default();
                Some(I2cAdapter { bus, name })
            })
            .collect(),
        Err(e) => {
            log::debug!("linux_i2c: Cannot read {}: {}, scanning /dev", SYSFS_I2C_DEV, e);
            list_dev_nodes(Path::new("/dev"))
        }
    };
    adapters.sort_by_key(|a| a.bus);
    adapters.dedup_by_key(|a| a.bus);
    adapters
}

fn list_dev_nodes(dir: &Path) -> Vec<I2cAdapter> {
    fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(|e| e.ok())
                .filter_map(|e| parse_bus_number(&e.file_name().to_string_lossy()))
                .map(|bus| I2cAdapter {
                    bus,
                    name: String::new(),
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Check a bus for a device at any of `candidates`
///
/// The bus is opened only for the duration of the probe.
pub fn probe_bus(bus: u32, candidates: &[u8]) -> ProbeResult {
    match LinuxI2c::open(&LinuxI2cConfig::for_bus(bus)) {
        Ok(mut dev) => probe::probe_device(&mut dev, candidates),
        Err(e) => {
            log::debug!("linux_i2c: {}", e);
            ProbeResult::from_open_fault(e.fault())
        }
    }
}
