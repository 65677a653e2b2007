//! wmreg-linux-i2c - Linux i2c-dev support
//!
//! This crate talks to I2C adapters through the `/dev/i2c-N` character
//! devices, which covers both on-board controllers and USB-I2C bridges
//! bound to a kernel driver.
//!
//! # Example
//!
//! ```no_run
//! use wmreg_linux_i2c::LinuxI2c;
//! use wmreg_core::codec;
//!
//! let mut bus = LinuxI2c::open_bus(1)?;
//! codec::write_register(&mut bus, 0x1A, 0x0F, 0)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Usage with wmreg CLI
//!
//! ```bash
//! wmreg --bus linux_i2c:bus=1
//! wmreg scan --bus linux_i2c:dev=/dev/i2c-3
//! ```
//!
//! # System Requirements
//!
//! - Linux kernel with `CONFIG_I2C_CHARDEV` (load `i2c-dev`)
//! - Read/write access to `/dev/i2c-N`; usually membership in the `i2c` group

pub mod device;
pub mod discovery;
pub mod error;

pub use device::{device_path, parse_options, LinuxI2c, LinuxI2cConfig};
pub use discovery::{list_adapters, probe_bus, I2cAdapter};
pub use error::{LinuxI2cError, Result};
