//! Session start-up
//!
//! Picks the bus, the device address and the register file before the shell
//! starts. Every choice can be pre-answered on the command line; whatever is
//! left is asked for interactively.

use std::path::{Path, PathBuf};

use thiserror::Error;
use wmreg_bus::{open_bus, BusHandle};
use wmreg_core::probe::{self, ProbeResult, CANDIDATE_ADDRESSES};
use wmreg_core::regs::DEVICE_ADDR;
use wmreg_core::table::RegisterTable;
use wmreg_core::I2cMaster;
use wmreg_repl::{parse_device_address, Prompter};

use crate::cli::SessionArgs;
use crate::commands::scan::print_scan;

/// Reasons a session never starts
#[derive(Error, Debug)]
pub enum SetupError {
    /// No adapter nodes exist
    #[error("No /dev/i2c-* adapters found.")]
    NoAdapters,

    /// Selection answer was neither an index nor a number
    #[error("Invalid selection: {0}")]
    InvalidSelection(String),

    /// Operator declined to continue without a response
    #[error("No WM8960 response on {0}; aborting")]
    Declined(String),

    /// No way to find an adapter in this build
    #[error("No adapter discovery in this build; pass --bus (available: {0})")]
    NoDiscovery(String),
}

/// Everything a session needs
pub struct SessionSetup {
    pub bus: BusHandle,
    pub device: u8,
    pub table: RegisterTable,
}

/// Pick one of `choices` from an answer that is either a list index or a
/// bus number
///
/// An empty answer picks `default`. Digits below the list length are taken
/// as an index; any other number is used as a bus number directly.
pub fn resolve_selection(answer: &str, choices: &[u32], default: u32) -> Result<u32, SetupError> {
    let answer = answer.trim();
    if answer.is_empty() {
        return Ok(default);
    }
    let number: u32 = answer
        .parse()
        .map_err(|_| SetupError::InvalidSelection(answer.to_string()))?;
    Ok(choices.get(number as usize).copied().unwrap_or(number))
}

/// Device address from the address prompt; `None` means the answer was
/// unusable and the default applies
pub fn resolve_address(answer: &str) -> Option<u8> {
    if answer.trim().is_empty() {
        Some(DEVICE_ADDR)
    } else {
        parse_device_address(answer)
    }
}

/// Places a register file is looked for: as given, then next to the binary
pub fn register_file_candidates(path: &Path, exe_dir: Option<&Path>) -> Vec<PathBuf> {
    let mut candidates = vec![path.to_path_buf()];
    if path.is_relative() {
        if let Some(dir) = exe_dir {
            candidates.push(dir.join(path));
        }
    }
    candidates
}

/// Load a register file from the first candidate location that exists
fn load_register_file(path: &Path) -> RegisterTable {
    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(Path::to_path_buf));

    for candidate in register_file_candidates(path, exe_dir.as_deref()) {
        if !candidate.is_file() {
            continue;
        }
        match RegisterTable::load_file(&candidate) {
            Ok(table) => {
                log::info!("Loaded register file: {}", candidate.display());
                return table;
            }
            Err(e) => {
                eprintln!("Could not read {}: {}", candidate.display(), e);
                return RegisterTable::new();
            }
        }
    }

    eprintln!("Register file not found: {}", path.display());
    RegisterTable::new()
}

/// Let the operator point at their USB-I2C dongle
#[cfg(feature = "usb")]
fn choose_usb_device(prompter: &mut Prompter) -> Result<(), Box<dyn std::error::Error>> {
    let devices = match wmreg_bus::usb::list_devices() {
        Ok(devices) => devices,
        Err(e) => {
            log::debug!("{}", e);
            Vec::new()
        }
    };
    if devices.is_empty() {
        println!("No USB devices found (or USB listing unavailable).");
        return Ok(());
    }

    println!("USB devices (pick your USB-I2C adapter):");
    for (idx, dev) in devices.iter().enumerate() {
        println!("  [{}] {}", idx, dev);
    }
    let answer = prompter.ask(&format!(
        "Select USB device [0-{}] (default 0)",
        devices.len() - 1
    ))?;
    let idx = if answer.is_empty() {
        0
    } else {
        answer
            .parse::<usize>()
            .ok()
            .filter(|&i| i < devices.len())
            .ok_or(SetupError::InvalidSelection(answer))?
    };
    println!("Selected USB device: {}", devices[idx]);
    Ok(())
}

/// Find the bus to use by probing every adapter for a WM8960
#[cfg(feature = "linux-i2c")]
fn choose_bus(prompter: &mut Prompter) -> Result<String, Box<dyn std::error::Error>> {
    use wmreg_bus::adapters::{device_path, list_adapters, probe_bus};
    use wmreg_bus::linux_bus_spec;

    #[cfg(feature = "usb")]
    choose_usb_device(prompter)?;

    let adapters = list_adapters();
    if adapters.is_empty() {
        return Err(SetupError::NoAdapters.into());
    }

    println!("Available I2C adapters:");
    for (idx, adapter) in adapters.iter().enumerate() {
        println!("  [{}] {}  {}", idx, adapter.path(), adapter.name);
    }

    println!("Scanning I2C buses for WM8960 (0x1a/0x1b)...");
    let mut responding = Vec::new();
    for adapter in &adapters {
        let hint = probe_bus(adapter.bus, &CANDIDATE_ADDRESSES);
        if hint.is_present() {
            responding.push(adapter.bus);
        }
        if hint != ProbeResult::Silent {
            println!("  {} {}", adapter.path(), hint);
        }
    }

    let bus = match responding.as_slice() {
        [only] => {
            println!("Using {}.", device_path(*only));
            *only
        }
        [first, ..] => {
            println!("Multiple buses responded; pick one:");
            for (idx, bus) in responding.iter().enumerate() {
                println!("  [{}] {}", idx, device_path(*bus));
            }
            let answer = prompter.ask(&format!(
                "Select bus by index or number [0-{}] (default 0)",
                responding.len() - 1
            ))?;
            resolve_selection(&answer, &responding, *first)?
        }
        [] => {
            let buses: Vec<u32> = adapters.iter().map(|a| a.bus).collect();
            let default = buses[0];
            let answer = prompter.ask(&format!(
                "No WM8960 detected. Enter I2C bus index or number to try (default {})",
                default
            ))?;
            resolve_selection(&answer, &buses, default)?
        }
    };

    Ok(linux_bus_spec(bus))
}

#[cfg(not(feature = "linux-i2c"))]
fn choose_bus(_prompter: &mut Prompter) -> Result<String, Box<dyn std::error::Error>> {
    Err(SetupError::NoDiscovery(wmreg_bus::bus_names_short()).into())
}

/// The other WM8960 candidate address, if it answers while `device` does not
pub fn alternate_responder<M: I2cMaster + ?Sized>(bus: &mut M, device: u8) -> Option<u8> {
    let others: Vec<u8> = CANDIDATE_ADDRESSES
        .iter()
        .copied()
        .filter(|&a| a != device)
        .collect();
    probe::probe_device(bus, &others).address()
}

/// Address, pre-flight probe and register file on an open bus
fn configure(
    bus: &mut BusHandle,
    args: &SessionArgs,
    prompter: &mut Prompter,
) -> Result<(u8, RegisterTable), Box<dyn std::error::Error>> {
    let device = match args.address {
        Some(addr) => addr,
        None => {
            let answer = prompter.ask("Enter WM8960 I2C address (default 0x1a, alt 0x1b)")?;
            resolve_address(&answer).unwrap_or_else(|| {
                println!("Invalid address; using default 0x1a.");
                DEVICE_ADDR
            })
        }
    };

    // Final probe before any register traffic
    match probe::probe_device(bus, &[device]) {
        ProbeResult::Responded(_) => log::debug!("WM8960 answered at {:#04x}", device),
        result => {
            if result != ProbeResult::Silent {
                println!("{} {}", bus.description(), result);
            }
            if let Some(alt) = alternate_responder(bus, device) {
                println!(
                    "A device answers at 0x{:02x} instead; rerun with --address 0x{:02x} if that is the codec.",
                    alt, alt
                );
            }
            if args.force {
                log::warn!("No WM8960 response on {}; continuing", bus.description());
            } else if !prompter.confirm(&format!(
                "No WM8960 response on {}. Continue anyway?",
                bus.description()
            ))? {
                return Err(SetupError::Declined(bus.description().to_string()).into());
            }
        }
    }

    let path = match &args.regs {
        Some(path) => Some(path.clone()),
        None => {
            let answer = prompter.ask("Path to register file (txt, optional)")?;
            (!answer.is_empty()).then(|| PathBuf::from(answer))
        }
    };

    let table = path
        .as_deref()
        .map(load_register_file)
        .unwrap_or_default();
    match &path {
        Some(path) if !table.is_empty() => {
            println!("Loaded {} registers from {}", table.len(), path.display())
        }
        _ => println!("No register file loaded; you can still write manually."),
    }

    Ok((device, table))
}

/// Run the start-up sequence
///
/// The bus is closed again on every failure after it was opened.
pub fn prepare(
    args: &SessionArgs,
    prompter: &mut Prompter,
) -> Result<SessionSetup, Box<dyn std::error::Error>> {
    let spec = match &args.bus {
        Some(spec) => spec.clone(),
        None => choose_bus(prompter)?,
    };

    let mut bus = open_bus(&spec)?;
    log::info!("Using bus {}", bus.description());
    print_scan(&mut bus);

    match configure(&mut bus, args, prompter) {
        Ok((device, table)) => Ok(SessionSetup { bus, device, table }),
        Err(e) => {
            bus.close();
            Err(e)
        }
    }
}
