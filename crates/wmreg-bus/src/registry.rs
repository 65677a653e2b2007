//! Bus registry and initialization
//!
//! This module opens buses by name and wraps them in a [`BusHandle`].

use crate::handle::BusHandle;
use std::collections::HashMap;

/// Parsed bus parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusParams {
    /// Bus name as given
    pub name: String,
    /// Key-value parameters
    pub params: HashMap<String, String>,
}

impl BusParams {
    #[allow(dead_code)] // Used in feature-gated code
    fn options(&self) -> Vec<(&str, &str)> {
        self.params
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect()
    }
}

/// Parse a bus string into name and parameters
///
/// Format: "name" or "name:key1=value1,key2=value2"
///
/// # Example
/// ```ignore
/// let params = parse_bus_params("linux_i2c:bus=1")?;
/// assert_eq!(params.name, "linux_i2c");
/// assert_eq!(params.params.get("bus"), Some(&"1".to_string()));
/// ```
pub fn parse_bus_params(s: &str) -> Result<BusParams, Box<dyn std::error::Error>> {
    let (name, opts_str) = s.split_once(':').unwrap_or((s, ""));
    if name.is_empty() {
        return Err("Empty bus name".into());
    }

    let mut params = HashMap::new();
    if !opts_str.is_empty() {
        for opt in opts_str.split(',') {
            if let Some((key, value)) = opt.split_once('=') {
                params.insert(key.to_string(), value.to_string());
            } else {
                return Err(
                    format!("Invalid parameter format: '{}' (expected key=value)", opt).into(),
                );
            }
        }
    }

    Ok(BusParams {
        name: name.to_string(),
        params,
    })
}

/// Bus string for a numbered Linux adapter
pub fn linux_bus_spec(bus: u32) -> String {
    format!("linux_i2c:bus={}", bus)
}

/// Open a bus and return a handle to it
///
/// # Arguments
/// * `spec` - Bus specification (e.g., "dummy" or "linux_i2c:bus=1")
pub fn open_bus(spec: &str) -> Result<BusHandle, Box<dyn std::error::Error>> {
    let params = parse_bus_params(spec)?;

    match params.name.as_str() {
        #[cfg(feature = "dummy")]
        "dummy" => open_dummy(&params),

        #[cfg(feature = "linux-i2c")]
        "linux_i2c" | "linux-i2c" | "i2c-dev" => open_linux_i2c(&params),

        _ => Err(format!(
            "Unknown bus: {} (available: {})",
            params.name,
            bus_names_short()
        )
        .into()),
    }
}

// Bus-specific open functions

#[cfg(feature = "dummy")]
fn open_dummy(params: &BusParams) -> Result<BusHandle, Box<dyn std::error::Error>> {
    use wmreg_core::number::parse_int;
    use wmreg_core::BusFault;
    use wmreg_dummy::{DummyCodec, DummyConfig};

    let flag = |key: &str| -> Result<bool, String> {
        match params.params.get(key).map(String::as_str) {
            None | Some("0") | Some("no") | Some("false") => Ok(false),
            Some("1") | Some("yes") | Some("true") => Ok(true),
            Some(other) => Err(format!("Invalid {} value: {}", key, other)),
        }
    };

    let mut config = DummyConfig::default();
    if let Some(addr) = params.params.get("address") {
        match parse_int(addr) {
            Ok(a @ 0..=0x7F) => config.address = Some(a as u8),
            _ => return Err(format!("Invalid address value: {}", addr).into()),
        }
    }
    if flag("absent")? {
        config.address = None;
    }
    if flag("writeonly")? {
        config.readable = false;
    }
    if flag("denied")? {
        config.bus_fault = Some(BusFault::PermissionDenied);
    }

    log::info!("Opening dummy bus...");
    let description = match config.address {
        Some(a) => format!("dummy (WM8960 at 0x{:02x})", a),
        None => "dummy (empty)".to_string(),
    };
    Ok(BusHandle::new(
        Box::new(DummyCodec::new(config)),
        description,
    ))
}

#[cfg(feature = "linux-i2c")]
fn open_linux_i2c(params: &BusParams) -> Result<BusHandle, Box<dyn std::error::Error>> {
    use wmreg_linux_i2c::{parse_options, LinuxI2c};

    let config = parse_options(&params.options())
        .map_err(|e| format!("Invalid linux_i2c parameters: {}", e))?;

    let master = LinuxI2c::open(&config).map_err(|e| {
        format!(
            "Failed to open Linux I2C device: {}\n\
             Make sure the device exists and you have read/write permissions.\n\
             You may need to: sudo modprobe i2c-dev && sudo usermod -aG i2c $USER",
            e
        )
    })?;

    let description = master.path().to_string();
    Ok(BusHandle::new(Box::new(master), description))
}

// Bus information and listing
/// Information about a bus backend
pub struct BusInfo {
    /// Primary name (used for matching)
    pub name: &'static str,
    /// Alternative names/aliases
    pub aliases: &'static [&'static str],
    /// Short description
    pub description: &'static str,
}

/// Get information about all available bus backends (enabled at compile time)
#[allow(unused_mut, clippy::vec_init_then_push)]
pub fn available_buses() -> Vec<BusInfo> {
    let mut buses = Vec::new();

    #[cfg(feature = "dummy")]
    buses.push(BusInfo {
        name: "dummy",
        aliases: &[],
        description: "In-memory WM8960 emulator (address=<a>,absent=1,writeonly=1,denied=1)",
    });

    #[cfg(feature = "linux-i2c")]
    buses.push(BusInfo {
        name: "linux_i2c",
        aliases: &["linux-i2c", "i2c-dev"],
        description: "Linux I2C adapter via i2c-dev (bus=<N> or dev=/dev/i2c-N,force=1)",
    });

    buses
}

/// Generate a short list of bus names for CLI help
pub fn bus_names_short() -> String {
    let buses = available_buses();
    if buses.is_empty() {
        return "none (recompile with features)".to_string();
    }
    let names: Vec<&str> = buses.iter().map(|b| b.name).collect();
    names.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bus_params() {
        let p = parse_bus_params("linux_i2c:bus=1,force=1").unwrap();
        assert_eq!(p.name, "linux_i2c");
        assert_eq!(p.params.get("bus").map(String::as_str), Some("1"));
        assert_eq!(p.params.get("force").map(String::as_str), Some("1"));

        let p = parse_bus_params("dummy").unwrap();
        assert_eq!(p.name, "dummy");
        assert!(p.params.is_empty());
    }

    #[test]
    fn test_parse_bus_params_errors() {
        assert!(parse_bus_params("linux_i2c:bus").is_err());
        assert!(parse_bus_params(":bus=1").is_err());
    }

    #[test]
    fn test_unknown_bus() {
        let err = open_bus("carrier_pigeon").unwrap_err();
        assert!(err.to_string().starts_with("Unknown bus: carrier_pigeon"));
    }

    #[test]
    fn test_linux_bus_spec() {
        assert_eq!(linux_bus_spec(7), "linux_i2c:bus=7");
    }

    #[cfg(feature = "dummy")]
    mod dummy {
        use super::super::*;
        use wmreg_core::probe::{self, ProbeResult};
        use wmreg_core::{codec, I2cMaster};

        #[test]
        fn test_open_dummy_default() {
            let mut bus = open_bus("dummy").unwrap();
            assert_eq!(
                probe::probe_device(&mut bus, &probe::CANDIDATE_ADDRESSES),
                ProbeResult::Responded(0x1A)
            );
            codec::write_register(&mut bus, 0x1A, 0x02, 0x179).unwrap();
            assert_eq!(codec::read_register(&mut bus, 0x1A, 0x02).unwrap(), 0x179);
            bus.close();
        }

        #[test]
        fn test_open_dummy_options() {
            let mut bus = open_bus("dummy:address=0x1b").unwrap();
            assert_eq!(bus.description(), "dummy (WM8960 at 0x1b)");
            assert!(bus.quick_check(0x1A).is_err());
            assert!(bus.quick_check(0x1B).is_ok());

            let mut bus = open_bus("dummy:absent=1").unwrap();
            assert_eq!(
                probe::probe_device(&mut bus, &probe::CANDIDATE_ADDRESSES),
                ProbeResult::Silent
            );

            let mut bus = open_bus("dummy:denied=1").unwrap();
            assert_eq!(
                probe::probe_device(&mut bus, &probe::CANDIDATE_ADDRESSES),
                ProbeResult::NoAccess
            );

            assert!(open_bus("dummy:absent=maybe").is_err());
            assert!(open_bus("dummy:address=0x80").is_err());
        }
    }
}
