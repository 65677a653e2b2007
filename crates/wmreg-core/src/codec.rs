//! Register word packing for the WM8960 control interface
//!
//! The device has 7-bit register addresses and 9-bit register values but
//! the bus only moves bytes. Every write is therefore two bytes:
//!
//! ```text
//!   control byte             data byte
//! ┌───────────────┬────┐   ┌─────────────┐
//! │ B15 .. B9     │ B8 │   │ B7 .. B0    │
//! │ register addr │ D8 │   │ D7 .. D0    │
//! └───────────────┴────┘   └─────────────┘
//! ```
//!
//! Out-of-range inputs are masked, not rejected: register addresses to
//! 7 bits and values to 9 bits.

use crate::error::{Error, Result};
use crate::transport::I2cMaster;

/// Mask for a register address (7 bits)
pub const REGISTER_MASK: u8 = 0x7F;

/// Mask for a register value (9 bits)
pub const VALUE_MASK: u16 = 0x1FF;

/// Mask an arbitrary integer to a 9-bit register value
///
/// Negative inputs wrap the same way two's complement does, so `-1`
/// becomes `0x1FF`.
pub const fn mask_value(value: i64) -> u16 {
    (value & VALUE_MASK as i64) as u16
}

/// Mask an arbitrary integer to a 7-bit register address
pub const fn mask_register(register: i64) -> u8 {
    (register & REGISTER_MASK as i64) as u8
}

/// Pack a register address and value into `[control, data]`
pub const fn encode(register: u8, value: u16) -> [u8; 2] {
    let control = ((register & REGISTER_MASK) << 1) | ((value >> 8) & 0x1) as u8;
    let data = (value & 0xFF) as u8;
    [control, data]
}

/// Register pointer byte used to select a register before reading it
pub const fn pointer(register: u8) -> u8 {
    (register & REGISTER_MASK) << 1
}

/// Recover the 9-bit value from a read-back byte pair
///
/// Bit 0 of the first byte carries D8, the second byte carries D7..D0.
pub const fn decode(bytes: [u8; 2]) -> u16 {
    (((bytes[0] & 0x1) as u16) << 8) | bytes[1] as u16
}

/// Write `value` to `register` on the device at `device`
pub fn write_register<M: I2cMaster + ?Sized>(
    bus: &mut M,
    device: u8,
    register: u8,
    value: u16,
) -> Result<()> {
    let register = register & REGISTER_MASK;
    let value = value & VALUE_MASK;
    let word = encode(register, value);

    log::trace!(
        "codec: R{:#04x} <- {:#05x} (bytes {:02X} {:02X}) @ {:#04x}",
        register,
        value,
        word[0],
        word[1],
        device
    );

    bus.write(device, &word).map_err(|fault| Error::Transport {
        device,
        register,
        fault,
    })
}

/// Read `register` back from the device at `device`
///
/// Many WM8960 parts are write-only; those NACK or reject the read and the
/// failure is returned as-is instead of being replaced by a default value.
pub fn read_register<M: I2cMaster + ?Sized>(bus: &mut M, device: u8, register: u8) -> Result<u16> {
    let register = register & REGISTER_MASK;
    let mut buf = [0u8; 2];

    bus.write_read(device, &[pointer(register)], &mut buf)
        .map_err(|fault| Error::Transport {
            device,
            register,
            fault,
        })?;

    let value = decode(buf);
    log::trace!(
        "codec: R{:#04x} -> {:#05x} (bytes {:02X} {:02X}) @ {:#04x}",
        register,
        value,
        buf[0],
        buf[1],
        device
    );
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BusFault;
    use crate::transport::BusResult;
    use alloc::vec::Vec;

    /// Records writes and answers reads with a fixed byte pair
    #[derive(Default)]
    struct Recorder {
        writes: Vec<(u8, Vec<u8>)>,
        reply: Option<[u8; 2]>,
    }

    impl I2cMaster for Recorder {
        fn quick_check(&mut self, _address: u8) -> BusResult<()> {
            Ok(())
        }

        fn write(&mut self, address: u8, bytes: &[u8]) -> BusResult<()> {
            self.writes.push((address, bytes.to_vec()));
            Ok(())
        }

        fn write_read(&mut self, address: u8, bytes: &[u8], buf: &mut [u8]) -> BusResult<()> {
            self.writes.push((address, bytes.to_vec()));
            let reply = self.reply.ok_or(BusFault::Nack)?;
            buf.copy_from_slice(&reply);
            Ok(())
        }
    }

    #[test]
    fn test_encode_packs_ninth_bit_into_control_byte() {
        assert_eq!(encode(0x02, 0x179), [0x05, 0x79]);
        assert_eq!(encode(0x0F, 0x000), [0x1E, 0x00]);
        assert_eq!(encode(0x7F, 0x1FF), [0xFF, 0xFF]);
        assert_eq!(encode(0x19, 0x0C0), [0x32, 0xC0]);
    }

    #[test]
    fn test_encode_masks_register_and_value() {
        assert_eq!(encode(0x80, 0x000), encode(0x00, 0x000));
        assert_eq!(encode(0x05, 0x3FF), encode(0x05, 0x1FF));
    }

    #[test]
    fn test_decode_recovers_every_value() {
        for register in 0..=0x7Fu8 {
            for value in 0..=0x1FFu16 {
                let [control, data] = encode(register, value);
                assert_eq!(control >> 1, register);
                assert_eq!(decode([control & 0x1, data]), value);
            }
        }
    }

    #[test]
    fn test_mask_value_wraps_negative_and_large() {
        assert_eq!(mask_value(-1), 0x1FF);
        assert_eq!(mask_value(0x200), 0);
        assert_eq!(mask_value(0x3AB), 0x1AB);
        assert_eq!(mask_register(0x85), 0x05);
    }

    #[test]
    fn test_write_register_sends_control_then_data() {
        let mut bus = Recorder::default();
        write_register(&mut bus, 0x1A, 0x1A, 0x1E0).unwrap();
        assert_eq!(bus.writes, alloc::vec![(0x1Au8, alloc::vec![0x35u8, 0xE0])]);
    }

    #[test]
    fn test_read_register_sets_pointer_and_decodes() {
        let mut bus = Recorder {
            reply: Some([0x01, 0x79]),
            ..Default::default()
        };
        assert_eq!(read_register(&mut bus, 0x1A, 0x02).unwrap(), 0x179);
        assert_eq!(bus.writes, alloc::vec![(0x1Au8, alloc::vec![0x04u8])]);
    }

    #[test]
    fn test_read_register_surfaces_failure() {
        let mut bus = Recorder::default();
        assert_eq!(
            read_register(&mut bus, 0x1A, 0x02),
            Err(Error::Transport {
                device: 0x1A,
                register: 0x02,
                fault: BusFault::Nack,
            })
        );
    }
}
