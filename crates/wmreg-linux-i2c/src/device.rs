//! Linux I2C device implementation
//!
//! This module provides the `LinuxI2c` struct that implements the `I2cMaster`
//! trait using Linux's i2c-dev interface.

use crate::error::{LinuxI2cError, Result};

use nix::errno::Errno;
use wmreg_core::{BusFault, BusResult, I2cMaster};

use std::fs::{File, OpenOptions};
use std::os::unix::io::AsRawFd;

/// Adapter functionality bits (linux/i2c.h)
mod funcs {
    pub const I2C: libc::c_ulong = 0x0000_0001;
    pub const SMBUS_QUICK: libc::c_ulong = 0x0001_0000;
}

/// Message flag for a read segment
const I2C_M_RD: u16 = 0x0001;

/// Linux i2c-dev ioctl constants
mod ioctl {
    use nix::{ioctl_read_bad, ioctl_write_int_bad, ioctl_write_ptr_bad};

    const I2C_SLAVE: u16 = 0x0703;
    const I2C_SLAVE_FORCE: u16 = 0x0706;
    const I2C_FUNCS: u16 = 0x0705;
    const I2C_RDWR: u16 = 0x0707;
    const I2C_SMBUS: u16 = 0x0720;

    ioctl_write_int_bad!(i2c_slave, I2C_SLAVE);
    ioctl_write_int_bad!(i2c_slave_force, I2C_SLAVE_FORCE);
    ioctl_read_bad!(i2c_funcs, I2C_FUNCS, libc::c_ulong);
    ioctl_write_ptr_bad!(i2c_rdwr, I2C_RDWR, super::I2cRdwrIoctlData);
    ioctl_write_ptr_bad!(i2c_smbus, I2C_SMBUS, super::I2cSmbusIoctlData);
}

/// One segment of a combined transfer
/// This must match the kernel's struct i2c_msg layout
#[repr(C)]
pub(crate) struct I2cMsg {
    addr: u16,
    flags: u16,
    len: u16,
    buf: *mut u8,
}

/// Argument of I2C_RDWR (struct i2c_rdwr_ioctl_data)
#[repr(C)]
pub(crate) struct I2cRdwrIoctlData {
    msgs: *mut I2cMsg,
    nmsgs: u32,
}

/// Argument of I2C_SMBUS (struct i2c_smbus_ioctl_data)
#[repr(C)]
pub(crate) struct I2cSmbusIoctlData {
    read_write: u8,
    command: u8,
    size: u32,
    data: *mut libc::c_void,
}

/// SMBus transaction kind for a zero-length write
const I2C_SMBUS_QUICK: u32 = 0;
const I2C_SMBUS_WRITE: u8 = 0;

/// Configuration for opening a Linux I2C device
#[derive(Debug, Clone, Default)]
pub struct LinuxI2cConfig {
    /// Device path (e.g., "/dev/i2c-1")
    pub device: String,
    /// Bind the address even when a kernel driver already claims it
    pub force: bool,
}

impl LinuxI2cConfig {
    /// Create a new configuration with the given device path
    pub fn new(device: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            ..Default::default()
        }
    }

    /// Create a configuration for `/dev/i2c-<bus>`
    pub fn for_bus(bus: u32) -> Self {
        Self::new(device_path(bus))
    }
}

/// Character device path of a numbered adapter
pub fn device_path(bus: u32) -> String {
    format!("/dev/i2c-{}", bus)
}

/// Linux I2C master using the i2c-dev interface
pub struct LinuxI2c {
    /// File handle for the i2c-dev node
    file: File,
    /// Device path, for log messages
    path: String,
    /// Adapter functionality mask
    funcs: libc::c_ulong,
    /// Address currently bound with I2C_SLAVE
    bound: Option<u8>,
    force: bool,
}

impl LinuxI2c {
    /// Open a Linux I2C device with the given configuration
    pub fn open(config: &LinuxI2cConfig) -> Result<Self> {
        if config.device.is_empty() {
            return Err(LinuxI2cError::NoDevice);
        }

        log::debug!("linux_i2c: Opening device {}", config.device);

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&config.device)
            .map_err(|e| LinuxI2cError::OpenFailed {
                path: config.device.clone(),
                source: e,
            })?;

        let mut funcs: libc::c_ulong = 0;
        unsafe {
            ioctl::i2c_funcs(file.as_raw_fd(), &mut funcs).map_err(|e| {
                LinuxI2cError::FuncsFailed {
                    path: config.device.clone(),
                    source: std::io::Error::from_raw_os_error(e as i32),
                }
            })?;
        }

        log::debug!(
            "linux_i2c: Opened {} (funcs={:#010x}, i2c={}, quick={})",
            config.device,
            funcs,
            funcs & funcs::I2C != 0,
            funcs & funcs::SMBUS_QUICK != 0
        );

        Ok(Self {
            file,
            path: config.device.clone(),
            funcs,
            bound: None,
            force: config.force,
        })
    }

    /// Open `/dev/i2c-<bus>` with default settings
    pub fn open_bus(bus: u32) -> Result<Self> {
        Self::open(&LinuxI2cConfig::for_bus(bus))
    }

    /// Device path this handle was opened from
    pub fn path(&self) -> &str {
        &self.path
    }

    fn supports(&self, mask: libc::c_ulong) -> bool {
        self.funcs & mask != 0
    }

    /// Bind `address` for SMBus transfers
    fn bind(&mut self, address: u8) -> BusResult<()> {
        if self.bound == Some(address) {
            return Ok(());
        }
        let fd = self.file.as_raw_fd();
        let res = unsafe {
            if self.force {
                ioctl::i2c_slave_force(fd, address as libc::c_int)
            } else {
                ioctl::i2c_slave(fd, address as libc::c_int)
            }
        };
        res.map_err(fault_from_errno)?;
        self.bound = Some(address);
        Ok(())
    }

    /// Issue one combined transfer with I2C_RDWR (repeated start between segments)
    fn transfer(&mut self, msgs: &mut [I2cMsg]) -> BusResult<()> {
        let data = I2cRdwrIoctlData {
            msgs: msgs.as_mut_ptr(),
            nmsgs: msgs.len() as u32,
        };
        unsafe { ioctl::i2c_rdwr(self.file.as_raw_fd(), &data) }
            .map(|_| ())
            .map_err(fault_from_errno)
    }
}

impl I2cMaster for LinuxI2c {
    fn quick_check(&mut self, address: u8) -> BusResult<()> {
        if !self.supports(funcs::SMBUS_QUICK) {
            // Zero-length plain write does the same on full I2C adapters
            if !self.supports(funcs::I2C) {
                return Err(BusFault::Unsupported);
            }
            let mut msgs = [I2cMsg {
                addr: address as u16,
                flags: 0,
                len: 0,
                buf: std::ptr::null_mut(),
            }];
            return self.transfer(&mut msgs);
        }

        self.bind(address)?;
        let args = I2cSmbusIoctlData {
            read_write: I2C_SMBUS_WRITE,
            command: 0,
            size: I2C_SMBUS_QUICK,
            data: std::ptr::null_mut(),
        };
        unsafe { ioctl::i2c_smbus(self.file.as_raw_fd(), &args) }
            .map(|_| ())
            .map_err(fault_from_errno)
    }

    fn write(&mut self, address: u8, bytes: &[u8]) -> BusResult<()> {
        if !self.supports(funcs::I2C) {
            return Err(BusFault::Unsupported);
        }
        // The kernel only reads from this buffer for a write segment
        let mut buf = bytes.to_vec();
        let mut msgs = [I2cMsg {
            addr: address as u16,
            flags: 0,
            len: buf.len() as u16,
            buf: buf.as_mut_ptr(),
        }];
        self.transfer(&mut msgs)
    }

    fn write_read(&mut self, address: u8, bytes: &[u8], buf: &mut [u8]) -> BusResult<()> {
        if !self.supports(funcs::I2C) {
            return Err(BusFault::Unsupported);
        }
        let mut out = bytes.to_vec();
        let mut msgs = [
            I2cMsg {
                addr: address as u16,
                flags: 0,
                len: out.len() as u16,
                buf: out.as_mut_ptr(),
            },
            I2cMsg {
                addr: address as u16,
                flags: I2C_M_RD,
                len: buf.len() as u16,
                buf: buf.as_mut_ptr(),
            },
        ];
        self.transfer(&mut msgs)
    }
}

impl Drop for LinuxI2c {
    fn drop(&mut self) {
        log::debug!("linux_i2c: Closing {}", self.path);
    }
}

/// Classify a kernel error code
pub fn fault_from_errno(errno: Errno) -> BusFault {
    match errno {
        Errno::ENXIO | Errno::EREMOTEIO => BusFault::Nack,
        Errno::EACCES | Errno::EPERM => BusFault::PermissionDenied,
        Errno::ENOENT | Errno::ENODEV => BusFault::NotPresent,
        Errno::EOPNOTSUPP => BusFault::Unsupported,
        Errno::ETIMEDOUT => BusFault::Timeout,
        other => BusFault::Os(other as i32),
    }
}

/// Classify an I/O error raised while opening or using the bus
pub fn fault_from_io(err: &std::io::Error) -> BusFault {
    match err.raw_os_error() {
        Some(code) => fault_from_errno(Errno::from_raw(code)),
        None => match err.kind() {
            std::io::ErrorKind::PermissionDenied => BusFault::PermissionDenied,
            std::io::ErrorKind::NotFound => BusFault::NotPresent,
            _ => BusFault::Os(libc::EIO),
        },
    }
}

/// Parse bus options from a list of key-value pairs
///
/// - `bus=1` - adapter number, opens `/dev/i2c-1`
/// - `dev=/dev/i2c-1` - explicit device path
/// - `force=1` - bind even if a kernel driver owns the address
pub fn parse_options(options: &[(&str, &str)]) -> Result<LinuxI2cConfig> {
    let mut config = LinuxI2cConfig::default();

    for (key, value) in options {
        match *key {
            "dev" => {
                config.device = value.to_string();
            }
            "bus" => {
                let bus: u32 = value
                    .parse()
                    .map_err(|_| LinuxI2cError::InvalidParameter(format!("bus={}", value)))?;
                config.device = device_path(bus);
            }
            "force" => {
                config.force = match *value {
                    "1" | "yes" | "true" => true,
                    "0" | "no" | "false" => false,
                    _ => {
                        return Err(LinuxI2cError::InvalidParameter(format!(
                            "force={}",
                            value
                        )))
                    }
                };
            }
            _ => {
                log::warn!("linux_i2c: Unknown option: {}={}", key, value);
            }
        }
    }

    if config.device.is_empty() {
        return Err(LinuxI2cError::NoDevice);
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bus_number() {
        let config = parse_options(&[("bus", "3")]).unwrap();
        assert_eq!(config.device, "/dev/i2c-3");
        assert!(!config.force);
    }

    #[test]
    fn test_parse_dev_and_force() {
        let config = parse_options(&[("dev", "/dev/i2c-10"), ("force", "1")]).unwrap();
        assert_eq!(config.device, "/dev/i2c-10");
        assert!(config.force);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(parse_options(&[]), Err(LinuxI2cError::NoDevice)));
        assert!(matches!(
            parse_options(&[("bus", "one")]),
            Err(LinuxI2cError::InvalidParameter(p)) if p == "bus=one"
        ));
        let err = parse_options(&[("bus", "1"), ("force", "maybe")]).unwrap_err();
        assert_eq!(err.to_string(), "Invalid parameter: force=maybe");
        // unknown keys are only warned about
        assert!(parse_options(&[("bus", "1"), ("speed", "100")]).is_ok());
    }

    #[test]
    fn test_errno_mapping() {
        assert_eq!(fault_from_errno(Errno::ENXIO), BusFault::Nack);
        assert_eq!(fault_from_errno(Errno::EREMOTEIO), BusFault::Nack);
        assert_eq!(fault_from_errno(Errno::EACCES), BusFault::PermissionDenied);
        assert_eq!(fault_from_errno(Errno::ENOENT), BusFault::NotPresent);
        assert_eq!(fault_from_errno(Errno::ETIMEDOUT), BusFault::Timeout);
        assert_eq!(
            fault_from_errno(Errno::EBUSY),
            BusFault::Os(Errno::EBUSY as i32)
        );
    }

    #[test]
    fn test_io_error_mapping() {
        let denied = std::io::Error::from_raw_os_error(libc::EACCES);
        assert_eq!(fault_from_io(&denied), BusFault::PermissionDenied);
        let missing = std::io::Error::from(std::io::ErrorKind::NotFound);
        assert_eq!(fault_from_io(&missing), BusFault::NotPresent);
    }

    #[test]
    fn test_open_missing_device() {
        let err = LinuxI2c::open(&LinuxI2cConfig::new("/nonexistent/i2c-99"))
            .err()
            .unwrap();
        assert_eq!(err.fault(), BusFault::NotPresent);
        assert!(matches!(
            LinuxI2c::open(&LinuxI2cConfig::default()),
            Err(LinuxI2cError::NoDevice)
        ));
    }
}
