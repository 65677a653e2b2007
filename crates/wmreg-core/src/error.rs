//! Error types for wmreg-core
//!
//! Both types are `no_std` compatible and `Copy`, so they can be carried
//! through batch outcomes and re-reported without allocation.

use core::fmt;

use crate::macros;

/// Why a single bus transaction failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusFault {
    /// Nothing acknowledged the transaction
    Nack,
    /// The bus node exists but the caller may not use it
    PermissionDenied,
    /// The bus node or adapter does not exist
    NotPresent,
    /// The adapter or device does not support this kind of transfer
    Unsupported,
    /// The adapter gave up waiting for the bus
    Timeout,
    /// Any other operating system error, by errno
    Os(i32),
}

/// Core error type - no_std compatible, Copy for efficiency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A numeric argument is neither decimal nor `0x` hexadecimal
    InvalidNumber,
    /// A table index is outside `0..len`
    IndexOutOfRange {
        /// Requested index (as parsed, may be negative)
        index: i64,
        /// Table length at the time of the request
        len: usize,
    },
    /// No table entry carries this register address
    AddressNotFound {
        /// Register address that was looked up, as given
        address: i64,
    },
    /// The macro catalog has no entry with the requested name
    UnknownMacro,
    /// A bus transaction failed
    Transport {
        /// Device address on the bus
        device: u8,
        /// Register the transaction was aimed at
        register: u8,
        /// Underlying cause reported by the transport
        fault: BusFault,
    },
}

impl fmt::Display for BusFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nack => write!(f, "no acknowledge from device"),
            Self::PermissionDenied => write!(f, "permission denied"),
            Self::NotPresent => write!(f, "bus not present"),
            Self::Unsupported => write!(f, "operation not supported by adapter or device"),
            Self::Timeout => write!(f, "bus timed out"),
            Self::Os(errno) => write!(f, "OS error {}", errno),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidNumber => write!(f, "invalid number (use decimal or 0x hex)"),
            Self::IndexOutOfRange { index, len } => {
                write!(f, "index {} out of range (0..{})", index, len)
            }
            Self::AddressNotFound { address } => {
                if *address < 0 {
                    write!(f, "address {} not in loaded register list", address)
                } else {
                    write!(f, "address 0x{:02X} not in loaded register list", address)
                }
            }
            Self::UnknownMacro => {
                write!(f, "unknown macro; available: ")?;
                for (i, name) in macros::names().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", name)?;
                }
                Ok(())
            }
            Self::Transport {
                device,
                register,
                fault,
            } => write!(
                f,
                "transfer to device 0x{:02x} register 0x{:02X} failed: {}",
                device, register, fault
            ),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for BusFault {}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Result type alias using the core Error type
pub type Result<T> = core::result::Result<T, Error>;
