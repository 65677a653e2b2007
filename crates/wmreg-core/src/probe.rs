//! Device presence probing and bus scanning
//!
//! Presence is tested with zero-length "quick" transactions only, the same
//! way `i2cdetect` does, so probing never touches register contents.

use alloc::format;
use alloc::string::String;
use core::fmt;

use crate::error::BusFault;
use crate::regs;
use crate::transport::I2cMaster;

/// Addresses a WM8960 can answer on, in probe order
pub const CANDIDATE_ADDRESSES: [u8; 2] = [regs::DEVICE_ADDR, regs::DEVICE_ADDR_ALT];

/// First address covered by a scan (reserved ranges excluded)
pub const SCAN_FIRST: u8 = 0x03;
/// Last address covered by a scan
pub const SCAN_LAST: u8 = 0x77;

/// What a presence probe found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeResult {
    /// A device acknowledged at this address
    Responded(u8),
    /// The bus is usable but no candidate acknowledged
    Silent,
    /// The bus exists but cannot be used by this user
    NoAccess,
    /// The bus itself does not exist
    Missing,
}

impl ProbeResult {
    /// Address that responded, if any
    pub fn address(&self) -> Option<u8> {
        match self {
            Self::Responded(addr) => Some(*addr),
            _ => None,
        }
    }

    /// Whether a device answered
    pub fn is_present(&self) -> bool {
        matches!(self, Self::Responded(_))
    }

    /// Classify a failure to open the bus itself
    pub fn from_open_fault(fault: BusFault) -> Self {
        match fault {
            BusFault::PermissionDenied => Self::NoAccess,
            _ => Self::Missing,
        }
    }
}

/// Operator hint, e.g. `(device responded at 0x1a)`
impl fmt::Display for ProbeResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Responded(addr) => write!(f, "(device responded at 0x{:02x})", addr),
            Self::Silent => Ok(()),
            Self::NoAccess => write!(f, "(no access; try sudo or add user to i2c group)"),
            Self::Missing => write!(f, "(not present)"),
        }
    }
}

/// Probe `candidates` in order and report the first that acknowledges
///
/// A permission failure on any candidate means the bus is unusable, so it
/// is reported as [`ProbeResult::NoAccess`] rather than as silence.
pub fn probe_device<M: I2cMaster + ?Sized>(bus: &mut M, candidates: &[u8]) -> ProbeResult {
    for &addr in candidates {
        match bus.quick_check(addr) {
            Ok(()) => {
                log::debug!("probe: device acknowledged at {:#04x}", addr);
                return ProbeResult::Responded(addr);
            }
            Err(BusFault::PermissionDenied) => return ProbeResult::NoAccess,
            Err(BusFault::NotPresent) => return ProbeResult::Missing,
            Err(fault) => log::trace!("probe: {:#04x}: {}", addr, fault),
        }
    }
    ProbeResult::Silent
}

/// Result of scanning every non-reserved 7-bit address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanMap {
    present: [bool; 128],
}

impl ScanMap {
    /// Whether `address` acknowledged
    pub fn is_present(&self, address: u8) -> bool {
        self.present.get(address as usize).copied().unwrap_or(false)
    }

    /// All responding addresses in ascending order
    pub fn responders(&self) -> impl Iterator<Item = u8> + '_ {
        (SCAN_FIRST..=SCAN_LAST).filter(|&a| self.present[a as usize])
    }

    /// Render as an `i2cdetect`-style grid
    ///
    /// ```text
    ///      0  1  2  3  4  5  6  7  8  9  a  b  c  d  e  f
    /// 00:          -- -- -- -- -- -- -- -- -- -- -- -- --
    /// 10: -- -- 1a -- ...
    /// ```
    pub fn to_grid(&self) -> String {
        let mut out = String::from("   ");
        for col in 0..16 {
            out.push_str(&format!("  {:x}", col));
        }
        out.push('\n');

        for row in 0..8u8 {
            let base = row * 16;
            let mut line = format!("{:02x}:", base);
            for col in 0..16u8 {
                let addr = base + col;
                if !(SCAN_FIRST..=SCAN_LAST).contains(&addr) {
                    line.push_str("   ");
                } else if self.present[addr as usize] {
                    line.push_str(&format!(" {:02x}", addr));
                } else {
                    line.push_str(" --");
                }
            }
            out.push_str(line.trim_end());
            out.push('\n');
        }
        out
    }
}

/// Quick-check every address in `SCAN_FIRST..=SCAN_LAST`
///
/// Stops early with the fault if the bus refuses access altogether.
pub fn scan<M: I2cMaster + ?Sized>(bus: &mut M) -> Result<ScanMap, BusFault> {
    let mut present = [false; 128];
    for addr in SCAN_FIRST..=SCAN_LAST {
        match bus.quick_check(addr) {
            Ok(()) => present[addr as usize] = true,
            Err(fault @ (BusFault::PermissionDenied | BusFault::NotPresent)) => return Err(fault),
            Err(_) => {}
        }
    }
    Ok(ScanMap { present })
}
