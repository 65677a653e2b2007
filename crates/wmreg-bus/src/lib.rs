//! Bus selection for wmreg
//!
//! This crate opens I2C buses from short specification strings and hands
//! out a [`BusHandle`], so the CLI and the session never depend on a
//! particular backend crate.
//!
//! ```text
//! dummy                     in-memory WM8960 at 0x1a
//! dummy:address=0x1b        ... at the alternate address
//! linux_i2c:bus=1           /dev/i2c-1
//! linux_i2c:dev=/dev/i2c-3  explicit device node
//! ```
//!
//! # Example
//!
//! ```ignore
//! use wmreg_bus::open_bus;
//! use wmreg_core::codec;
//!
//! let mut bus = open_bus("linux_i2c:bus=1")?;
//! codec::write_register(&mut bus, 0x1A, 0x0F, 0)?;
//! bus.close();
//! ```

mod handle;
mod registry;
#[cfg(feature = "usb")]
pub mod usb;

pub use handle::BusHandle;

pub use registry::{
    available_buses, bus_names_short, linux_bus_spec, open_bus, parse_bus_params, BusInfo,
    BusParams,
};

/// Kernel I2C adapter discovery
#[cfg(feature = "linux-i2c")]
pub mod adapters {
    pub use wmreg_linux_i2c::{device_path, list_adapters, probe_bus, I2cAdapter};
}
