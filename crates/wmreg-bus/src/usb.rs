//! USB device listing
//!
//! USB-I2C bridges show up as ordinary i2c-dev adapters once their kernel
//! driver is bound, so this listing only helps the operator tell which
//! adapter belongs to which dongle.

use nusb::MaybeFuture;

/// Known USB-I2C bridges (VID, PID, name)
const KNOWN_BRIDGES: &[(u16, u16, &str)] = &[
    (0x1a86, 0x5512, "CH341A (i2c-ch341)"),
    (0x0403, 0xc631, "i2c-tiny-usb"),
    (0x0403, 0x6014, "FT232H"),
    (0x04d8, 0x00dd, "MCP2221"),
    (0x10c4, 0xea90, "CP2112"),
];

/// A connected USB device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsbDeviceInfo {
    /// USB bus identifier
    pub bus: String,
    /// USB device address
    pub address: u8,
    /// Vendor ID
    pub vendor_id: u16,
    /// Product ID
    pub product_id: u16,
    /// Manufacturer and product strings, if the device reports them
    pub label: String,
}

impl UsbDeviceInfo {
    /// Name of the bridge chip, if this is a known USB-I2C adapter
    pub fn bridge(&self) -> Option<&'static str> {
        KNOWN_BRIDGES
            .iter()
            .find(|(vid, pid, _)| *vid == self.vendor_id && *pid == self.product_id)
            .map(|(_, _, name)| *name)
    }
}

/// Formats like one line of `lsusb`
impl std::fmt::Display for UsbDeviceInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Bus {} Device {:03}: ID {:04x}:{:04x} {}",
            self.bus, self.address, self.vendor_id, self.product_id, self.label
        )?;
        if let Some(bridge) = self.bridge() {
            write!(f, " [USB-I2C: {}]", bridge)?;
        }
        Ok(())
    }
}

/// List all connected USB devices
pub fn list_devices() -> Result<Vec<UsbDeviceInfo>, Box<dyn std::error::Error>> {
    let mut devices: Vec<UsbDeviceInfo> = nusb::list_devices()
        .wait()
        .map_err(|e| format!("Could not list USB devices: {}", e))?
        .map(|d| {
            let label = [d.manufacturer_string(), d.product_string()]
                .into_iter()
                .flatten()
                .collect::<Vec<_>>()
                .join(" ");
            UsbDeviceInfo {
                bus: d.bus_id().to_string(),
                address: d.device_address(),
                vendor_id: d.vendor_id(),
                product_id: d.product_id(),
                label,
            }
        })
        .collect();

    devices.sort_by(|a, b| (&a.bus, a.address).cmp(&(&b.bus, b.address)));
    log::debug!("Found {} USB devices", devices.len());
    Ok(devices)
}
