//! wmreg - interactive WM8960 register tool
//!
//! Drives a WM8960 audio codec over I2C from the command line. The codec's
//! registers are write-mostly 9-bit values packed into two-byte transfers;
//! wmreg keeps a table of the registers the operator cares about, loaded
//! from a plain text file, and pushes them to the device one at a time, all
//! at once or through built-in bring-up sequences.
//!
//! # Architecture
//!
//! - `wmreg-core` - register codec, register table, macros, presence probe
//! - `wmreg-bus` - opens a bus from a spec string (`linux_i2c:bus=1`, `dummy`)
//! - `wmreg-repl` - the command shell
//!
//! This binary only chooses the bus, device and register file and then hands
//! over to the shell.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands, SessionArgs};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    // Set log level based on verbosity
    match cli.verbose {
        0 => {} // default (info)
        1 => log::set_max_level(log::LevelFilter::Debug),
        _ => log::set_max_level(log::LevelFilter::Trace),
    }

    match cli.command {
        None => commands::cmd_session(&SessionArgs::default()),
        Some(Commands::Session(args)) => commands::cmd_session(&args),
        Some(Commands::ListBuses) => commands::list_buses(),
        Some(Commands::ListDrivers) => {
            commands::list_drivers();
            Ok(())
        }
        Some(Commands::ListUsb) => commands::list_usb(),
        Some(Commands::Scan { bus }) => commands::cmd_scan(&bus),
        Some(Commands::Probe { bus, address }) => commands::cmd_probe(&bus, address),
        Some(Commands::Macros) => {
            commands::list_macros();
            Ok(())
        }
    }
}
