//! Bus transport trait
//!
//! The core never touches bus timing or electrical details. Backends
//! (Linux i2c-dev, the in-memory dummy codec) implement [`I2cMaster`] and the
//! codec, probe and batch modules are written against it.

use crate::error::BusFault;

/// Result of a single bus transaction
pub type BusResult<T> = core::result::Result<T, BusFault>;

/// Byte-oriented control bus master (I2C-style, 7-bit device addresses)
///
/// All calls block until the transaction completes or fails.
pub trait I2cMaster {
    /// Issue a zero-length presence check ("quick" transaction)
    ///
    /// Returns `Ok(())` when a device acknowledges `address`. No register
    /// state is transferred, so this is safe to run against unknown devices.
    fn quick_check(&mut self, address: u8) -> BusResult<()>;

    /// Write `bytes` to the device at `address` in one transaction
    fn write(&mut self, address: u8, bytes: &[u8]) -> BusResult<()>;

    /// Write `bytes`, then read `buf.len()` bytes back from the same device
    ///
    /// Used to set a register pointer and read the register contents.
    fn write_read(&mut self, address: u8, bytes: &[u8], buf: &mut [u8]) -> BusResult<()>;
}

// Blanket impl for boxed masters so backends can be chosen at runtime
impl I2cMaster for alloc::boxed::Box<dyn I2cMaster + Send> {
    fn quick_check(&mut self, address: u8) -> BusResult<()> {
        (**self).quick_check(address)
    }

    fn write(&mut self, address: u8, bytes: &[u8]) -> BusResult<()> {
        (**self).write(address, bytes)
    }

    fn write_read(&mut self, address: u8, bytes: &[u8], buf: &mut [u8]) -> BusResult<()> {
        (**self).write_read(address, bytes, buf)
    }
}

impl<M: I2cMaster + ?Sized> I2cMaster for &mut M {
    fn quick_check(&mut self, address: u8) -> BusResult<()> {
        (**self).quick_check(address)
    }

    fn write(&mut self, address: u8, bytes: &[u8]) -> BusResult<()> {
        (**self).write(address, bytes)
    }

    fn write_read(&mut self, address: u8, bytes: &[u8], buf: &mut [u8]) -> BusResult<()> {
        (**self).write_read(address, bytes, buf)
    }
}
