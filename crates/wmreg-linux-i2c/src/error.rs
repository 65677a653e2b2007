//! Error types for Linux I2C operations

use thiserror::Error;
use wmreg_core::BusFault;

use crate::device::fault_from_io;

/// Linux I2C specific errors
#[derive(Debug, Error)]
pub enum LinuxI2cError {
    /// Failed to open device
    #[error("Failed to open {path}: {source}")]
    OpenFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to query adapter functionality
    #[error("Failed to query adapter functionality on {path}: {source}")]
    FuncsFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Invalid parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Neither a bus number nor a device path was given
    #[error("No device specified. Use bus=N or dev=/dev/i2c-N")]
    NoDevice,
}

impl LinuxI2cError {
    /// Bus-level classification of the failure, for probe hints
    pub fn fault(&self) -> BusFault {
        match self {
            Self::OpenFailed { source, .. } | Self::FuncsFailed { source, .. } => {
                fault_from_io(source)
            }
            Self::InvalidParameter(_) | Self::NoDevice => BusFault::NotPresent,
        }
    }
}

/// Result type for Linux I2C operations
pub type Result<T> = std::result::Result<T, LinuxI2cError>;
