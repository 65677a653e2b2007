//! Error types for the register shell

use thiserror::Error;

/// Errors that can occur in the register shell
#[derive(Error, Debug)]
pub enum ReplError {
    /// Verb not recognised
    #[error("Unknown command. Type 'help' for options.")]
    UnknownCommand(String),

    /// Wrong number of arguments
    #[error("Usage: {0}")]
    Usage(&'static str),

    /// An argument is not a number
    #[error("invalid number '{token}'. Usage: {usage}")]
    BadArgument {
        token: String,
        usage: &'static str,
    },

    /// Device address outside the 7-bit range
    #[error("Device address {0:#x} out of range (0x00-0x7f)")]
    InvalidDeviceAddress(i64),

    /// Macro not in the catalog
    #[error("Unknown macro '{name}'. Available: {available}")]
    UnknownMacro { name: String, available: String },

    /// A multi-write command stopped at a failing write
    #[error("{what} stopped after {completed} of {total} writes")]
    Aborted {
        what: String,
        completed: usize,
        total: usize,
    },

    /// Table lookup or bus transfer failed
    #[error(transparent)]
    Core(#[from] wmreg_core::Error),

    /// Input was closed while a prompt was waiting
    #[error("Input closed")]
    Cancelled,

    /// Line editor failure
    #[error("Line editor error: {0}")]
    Readline(String),

    /// I/O error (reading/writing stdin/stdout)
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ReplError {
    /// Whether the session can carry on after reporting this error
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            Self::Cancelled | Self::Readline(_) | Self::IoError(_)
        )
    }
}
