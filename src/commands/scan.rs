//! Scan and probe commands implementation

use wmreg_bus::{open_bus, BusHandle};
use wmreg_core::probe::{self, ProbeResult, CANDIDATE_ADDRESSES};
use wmreg_core::BusFault;

/// Print an `i2cdetect`-style map of the responding addresses
pub fn print_scan(bus: &mut BusHandle) {
    println!();
    println!("Scanning {} for devices (ACK test)...", bus.description());
    match probe::scan(bus) {
        Ok(map) => print!("{}", map.to_grid()),
        Err(BusFault::PermissionDenied) => {
            println!("Permission denied opening the bus; try sudo or add user to i2c group.")
        }
        Err(BusFault::NotPresent) => println!("{} not found.", bus.description()),
        Err(fault) => println!("Scan failed: {}", fault),
    }
}

/// Scan a bus and print the address map
pub fn cmd_scan(spec: &str) -> Result<(), Box<dyn std::error::Error>> {
    let mut bus = open_bus(spec)?;
    print_scan(&mut bus);
    bus.close();
    Ok(())
}

/// Check for a WM8960 at one address or at both candidates
pub fn cmd_probe(spec: &str, address: Option<u8>) -> Result<(), Box<dyn std::error::Error>> {
    let mut bus = open_bus(spec)?;
    let result = match address {
        Some(addr) => probe::probe_device(&mut bus, &[addr]),
        None => probe::probe_device(&mut bus, &CANDIDATE_ADDRESSES),
    };
    let description = bus.description().to_string();
    bus.close();

    match result {
        ProbeResult::Responded(addr) => {
            println!("{}: WM8960 candidate at 0x{:02x}", description, addr);
            Ok(())
        }
        ProbeResult::Silent => Err(format!("{}: no WM8960 response", description).into()),
        other => Err(format!("{}: {}", description, other).into()),
    }
}

#[cfg(all(test, feature = "dummy"))]
mod tests {
    use super::*;

    #[test]
    fn test_probe_dummy() {
        assert!(cmd_probe("dummy", None).is_ok());
        assert!(cmd_probe("dummy:address=0x1b", None).is_ok());
        assert!(cmd_probe("dummy:address=0x1b", Some(0x1A)).is_err());
        assert!(cmd_probe("dummy:absent=1", None).is_err());
    }

    #[test]
    fn test_scan_unknown_bus() {
        assert!(cmd_scan("nonexistent").is_err());
        assert!(cmd_scan("dummy").is_ok());
    }
}
