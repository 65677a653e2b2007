//! wmreg-dummy - In-memory WM8960 emulator for testing
//!
//! This crate provides a dummy bus with a single emulated WM8960 on it.
//! Every transaction is recorded so tests can check exactly what went over
//! the wire, and faults can be injected to exercise the fail-fast paths.

#![no_std]

extern crate alloc;

use alloc::vec::Vec;

use wmreg_core::codec;
use wmreg_core::regs::{addr, DEVICE_ADDR};
use wmreg_core::{BusFault, BusResult, I2cMaster};

/// Number of register slots (R0..R55)
pub const REGISTER_COUNT: usize = 0x38;

/// Power-on values for R0..R55
const RESET_VALUES: [u16; REGISTER_COUNT] = [
    0x097, 0x097, 0x000, 0x000, 0x000, 0x008, 0x000, 0x00A, // R0-R7
    0x1C0, 0x000, 0x0FF, 0x0FF, 0x000, 0x000, 0x000, 0x000, // R8-R15
    0x000, 0x07B, 0x100, 0x032, 0x000, 0x0C3, 0x0C3, 0x1C0, // R16-R23
    0x000, 0x000, 0x000, 0x000, 0x000, 0x000, 0x000, 0x000, // R24-R31
    0x100, 0x100, 0x050, 0x000, 0x000, 0x050, 0x000, 0x000, // R32-R39
    0x000, 0x000, 0x040, 0x000, 0x000, 0x050, 0x050, 0x000, // R40-R47
    0x002, 0x037, 0x000, 0x080, 0x000, 0x031, 0x026, 0x0E9, // R48-R55
];

/// A recorded bus transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transaction {
    /// Zero-length presence check
    Quick {
        /// Target address
        address: u8,
    },
    /// Plain write
    Write {
        /// Target address
        address: u8,
        /// Bytes written
        bytes: Vec<u8>,
    },
    /// Write followed by a read
    WriteRead {
        /// Target address
        address: u8,
        /// Bytes written before the read
        bytes: Vec<u8>,
        /// Number of bytes requested
        len: usize,
    },
}

/// Configuration for the dummy codec
#[derive(Debug, Clone)]
pub struct DummyConfig {
    /// Address the emulated codec answers on; `None` for an empty bus
    pub address: Option<u8>,
    /// Whether register reads are answered (real WM8960s are write-only)
    pub readable: bool,
    /// Fault returned by every transaction (e.g. permission denied)
    pub bus_fault: Option<BusFault>,
}

impl Default for DummyConfig {
    fn default() -> Self {
        Self {
            address: Some(DEVICE_ADDR),
            readable: true,
            bus_fault: None,
        }
    }
}

/// Emulated WM8960 on an otherwise empty bus
pub struct DummyCodec {
    config: DummyConfig,
    registers: [u16; REGISTER_COUNT],
    transactions: Vec<Transaction>,
    applied: Vec<(u8, u16)>,
    writes: usize,
    fail_writes_from: Option<usize>,
}

impl DummyCodec {
    /// Create a dummy codec with the given configuration
    pub fn new(config: DummyConfig) -> Self {
        Self {
            config,
            registers: RESET_VALUES,
            transactions: Vec::new(),
            applied: Vec::new(),
            writes: 0,
            fail_writes_from: None,
        }
    }

    /// Create a dummy codec answering on the default address
    pub fn new_default() -> Self {
        Self::new(DummyConfig::default())
    }

    /// Make the `n`th write (zero-based, counted from creation) and every
    /// later write fail with a NACK
    pub fn fail_writes_from(mut self, n: usize) -> Self {
        self.fail_writes_from = Some(n);
        self
    }

    /// Current value of a register
    pub fn register(&self, register: u8) -> u16 {
        self.registers
            .get(register as usize)
            .copied()
            .unwrap_or(0)
    }

    /// Every transaction seen so far, in order
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// `(register, value)` pairs of every register write the codec accepted
    pub fn register_writes(&self) -> &[(u8, u16)] {
        &self.applied
    }

    /// Forget recorded transactions (register contents are kept)
    pub fn clear_transactions(&mut self) {
        self.transactions.clear();
        self.applied.clear();
    }

    fn check_target(&self, address: u8) -> BusResult<()> {
        if let Some(fault) = self.config.bus_fault {
            return Err(fault);
        }
        match self.config.address {
            Some(a) if a == address => Ok(()),
            _ => Err(BusFault::Nack),
        }
    }

    fn store(&mut self, register: u8, value: u16) {
        if register == addr::RESET {
            log::debug!("dummy: software reset");
            self.registers = RESET_VALUES;
        } else if let Some(slot) = self.registers.get_mut(register as usize) {
            *slot = value;
        }
    }
}

impl I2cMaster for DummyCodec {
    fn quick_check(&mut self, address: u8) -> BusResult<()> {
        self.transactions.push(Transaction::Quick { address });
        self.check_target(address)
    }

    fn write(&mut self, address: u8, bytes: &[u8]) -> BusResult<()> {
        self.transactions.push(Transaction::Write {
            address,
            bytes: bytes.to_vec(),
        });
        self.check_target(address)?;

        let index = self.writes;
        self.writes += 1;
        if self.fail_writes_from.is_some_and(|n| index >= n) {
            log::debug!("dummy: injected failure on write #{}", index);
            return Err(BusFault::Nack);
        }

        match bytes {
            [control, data] => {
                let register = control >> 1;
                let value = codec::decode([*control, *data]);
                self.applied.push((register, value));
                self.store(register, value);
                Ok(())
            }
            // The control port only accepts whole register words
            _ => Err(BusFault::Unsupported),
        }
    }

    fn write_read(&mut self, address: u8, bytes: &[u8], buf: &mut [u8]) -> BusResult<()> {
        self.transactions.push(Transaction::WriteRead {
            address,
            bytes: bytes.to_vec(),
            len: buf.len(),
        });
        self.check_target(address)?;
        if !self.config.readable {
            return Err(BusFault::Nack);
        }

        let register = bytes.first().map(|b| b >> 1).unwrap_or(0);
        let value = self.register(register);
        let word = codec::encode(register, value);
        for (dst, src) in buf.iter_mut().zip(word) {
            *dst = src;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use wmreg_core::macros;

    #[test]
    fn test_write_then_read_back() {
        let mut bus = DummyCodec::new_default();
        codec::write_register(&mut bus, DEVICE_ADDR, addr::LOUT1_VOL, 0x179).unwrap();
        assert_eq!(bus.register(addr::LOUT1_VOL), 0x179);
        assert_eq!(
            codec::read_register(&mut bus, DEVICE_ADDR, addr::LOUT1_VOL).unwrap(),
            0x179
        );
        assert_eq!(
            bus.transactions()[0],
            Transaction::Write {
                address: DEVICE_ADDR,
                bytes: vec![0x05, 0x79],
            }
        );
    }

    #[test]
    fn test_reset_restores_defaults() {
        let mut bus = DummyCodec::new_default();
        codec::write_register(&mut bus, DEVICE_ADDR, addr::POWER_MGMT1, 0x0C0).unwrap();
        codec::write_register(&mut bus, DEVICE_ADDR, addr::RESET, 0).unwrap();
        assert_eq!(bus.register(addr::POWER_MGMT1), 0x000);
        assert_eq!(bus.register(addr::LEFT_IN_VOL), 0x097);
    }

    #[test]
    fn test_wrong_address_nacks() {
        let mut bus = DummyCodec::new_default();
        assert_eq!(bus.quick_check(0x1B), Err(BusFault::Nack));
        assert!(codec::write_register(&mut bus, 0x1B, 0x02, 1).is_err());
        assert_eq!(bus.register(0x02), 0x000);
    }

    #[test]
    fn test_write_only_device() {
        let mut bus = DummyCodec::new(DummyConfig {
            readable: false,
            ..Default::default()
        });
        assert!(codec::read_register(&mut bus, DEVICE_ADDR, 0x02).is_err());
    }

    #[test]
    fn test_injected_failure_and_bringup() {
        let m = macros::find("hp_i2s_init").unwrap();
        let mut bus = DummyCodec::new_default().fail_writes_from(3);
        let outcome = macros::run(&mut bus, DEVICE_ADDR, m, |_, _, _| {});
        assert_eq!(outcome.completed, 3);
        assert_eq!(bus.transactions().len(), 4);
        assert_eq!(bus.register_writes().len(), 3);
        assert_eq!(bus.register(addr::POWER_MGMT2), 0x1E0);
        assert_eq!(bus.register(addr::POWER_MGMT3), 0x000);
    }
}
