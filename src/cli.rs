//! CLI argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Parse a 7-bit I2C device address (hex or decimal)
fn parse_device_addr(s: &str) -> Result<u8, String> {
    match wmreg_core::number::parse_int(s) {
        Ok(a @ 0..=0x7F) => Ok(a as u8),
        Ok(a) => Err(format!("Address out of range (0x00-0x7f): {:#x}", a)),
        Err(_) => Err(format!("Invalid address: {}", s)),
    }
}

/// Generate dynamic help text for the bus argument
fn bus_help() -> String {
    format!(
        "Bus to use, e.g. linux_i2c:bus=1 [available: {}]",
        wmreg_bus::bus_names_short()
    )
}

#[derive(Parser)]
#[command(name = "wmreg")]
#[command(author, version, about = "Interactive WM8960 register tool over I2C", long_about = None)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Subcommand (defaults to an interactive session)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Options that pre-answer the start-up prompts of a session
#[derive(clap::Args, Debug, Clone, Default)]
pub struct SessionArgs {
    /// Bus to use instead of choosing an adapter interactively
    #[arg(short, long, help = bus_help())]
    pub bus: Option<String>,

    /// WM8960 I2C address (default 0x1a, alt 0x1b)
    #[arg(short, long, value_parser = parse_device_addr)]
    pub address: Option<u8>,

    /// Register definition file (txt)
    #[arg(short, long)]
    pub regs: Option<PathBuf>,

    /// Continue even if the device does not answer the pre-flight probe
    #[arg(long)]
    pub force: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start an interactive register session (default)
    Session(SessionArgs),

    /// List I2C adapters and probe each one for a WM8960
    ListBuses,

    /// List bus drivers compiled into this build
    ListDrivers,

    /// List connected USB devices, marking known USB-I2C bridges
    ListUsb,

    /// Scan a bus for responding addresses (like i2cdetect)
    Scan {
        /// Bus to scan
        #[arg(short, long, help = bus_help())]
        bus: String,
    },

    /// Check whether a WM8960 answers on a bus
    Probe {
        /// Bus to probe
        #[arg(short, long, help = bus_help())]
        bus: String,

        /// Only probe this address instead of 0x1a and 0x1b
        #[arg(short, long, value_parser = parse_device_addr)]
        address: Option<u8>,
    },

    /// List built-in write sequences
    Macros,
}
