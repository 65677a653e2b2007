//! BusHandle - owned, type-erased I2C bus

use wmreg_core::{BusResult, I2cMaster};

/// An open I2C bus
///
/// The handle owns the backend. Dropping it releases the bus; [`close`]
/// does the same but leaves a log line behind.
///
/// [`close`]: BusHandle::close
pub struct BusHandle {
    master: Box<dyn I2cMaster + Send>,
    description: String,
}

impl BusHandle {
    pub(crate) fn new(master: Box<dyn I2cMaster + Send>, description: impl Into<String>) -> Self {
        Self {
            master,
            description: description.into(),
        }
    }

    /// Human readable name of the bus (e.g. `/dev/i2c-1`)
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Release the bus
    pub fn close(self) {
        log::debug!("Closing bus {}", self.description);
    }
}

impl I2cMaster for BusHandle {
    fn quick_check(&mut self, address: u8) -> BusResult<()> {
        self.master.quick_check(address)
    }

    fn write(&mut self, address: u8, bytes: &[u8]) -> BusResult<()> {
        self.master.write(address, bytes)
    }

    fn write_read(&mut self, address: u8, bytes: &[u8], buf: &mut [u8]) -> BusResult<()> {
        self.master.write_read(address, bytes, buf)
    }
}

impl std::fmt::Debug for BusHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BusHandle")
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}
