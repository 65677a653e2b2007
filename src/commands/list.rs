//! List commands implementation

use wmreg_core::macros;

/// List all bus drivers compiled into this build
pub fn list_drivers() {
    println!("Available bus drivers:");
    println!();

    let buses = wmreg_bus::available_buses();
    if buses.is_empty() {
        println!("  (none - recompile with bus features enabled)");
        return;
    }

    for bus in buses {
        let aliases = if bus.aliases.is_empty() {
            String::new()
        } else {
            format!(" (aliases: {})", bus.aliases.join(", "))
        };
        println!("  {:<10} - {}{}", bus.name, bus.description, aliases);
    }
}

/// List I2C adapters with a WM8960 presence hint for each
#[cfg(feature = "linux-i2c")]
pub fn list_buses() -> Result<(), Box<dyn std::error::Error>> {
    use wmreg_bus::adapters::{list_adapters, probe_bus};
    use wmreg_core::probe::CANDIDATE_ADDRESSES;

    let adapters = list_adapters();
    if adapters.is_empty() {
        return Err("No /dev/i2c-* adapters found (is i2c-dev loaded?)".into());
    }

    println!("Available I2C adapters:");
    for (idx, adapter) in adapters.iter().enumerate() {
        let hint = probe_bus(adapter.bus, &CANDIDATE_ADDRESSES);
        println!(
            "  [{}] {}  {} {}",
            idx,
            adapter.path(),
            adapter.name,
            hint
        );
    }
    Ok(())
}

#[cfg(not(feature = "linux-i2c"))]
pub fn list_buses() -> Result<(), Box<dyn std::error::Error>> {
    Err("Adapter discovery needs the linux-i2c feature".into())
}

/// List connected USB devices
#[cfg(feature = "usb")]
pub fn list_usb() -> Result<(), Box<dyn std::error::Error>> {
    let devices = wmreg_bus::usb::list_devices()?;
    if devices.is_empty() {
        println!("No USB devices found.");
        return Ok(());
    }

    println!("USB devices:");
    for (idx, dev) in devices.iter().enumerate() {
        println!("  [{}] {}", idx, dev);
    }
    Ok(())
}

#[cfg(not(feature = "usb"))]
pub fn list_usb() -> Result<(), Box<dyn std::error::Error>> {
    Err("USB listing needs the usb feature".into())
}

/// List the built-in write sequences
pub fn list_macros() {
    println!("Built-in macros:");
    println!();
    println!("{:<22} {:>5}  Description", "Name", "Steps");
    println!("{}", "-".repeat(60));

    for def in macros::CATALOG {
        let name = if def.aliases.is_empty() {
            def.name.to_string()
        } else {
            format!("{} ({})", def.name, def.aliases.join(", "))
        };
        println!("{:<22} {:>5}  {}", name, def.steps.len(), def.summary);
    }
}
