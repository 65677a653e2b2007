//! Register table loaded from a definition file
//!
//! # Definition format
//!
//! One register per line:
//!
//! ```text
//! # comment
//! <address> [NAME] [default]
//! 0x00 LEFT_IN_VOL 0x017
//! 0x02 LOUT1_VOL 0x079
//! 0x05
//! ```
//!
//! Numbers are decimal or `0x` hex. A line whose address does not parse (or
//! does not fit in 7 bits) is skipped with a warning; the rest of the file
//! still loads. A missing name becomes `REG_<HEX>`, a missing or malformed
//! default leaves the cached value at 0.
//!
//! Table order is file order. Index-based commands address entries by
//! position; address-based lookups take the first entry in table order.
//! Duplicate addresses are kept as-is.

use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use crate::codec::{self, REGISTER_MASK};
use crate::error::{Error, Result};
use crate::number::{parse_int, parse_wrapping};

/// A single register definition plus its cached value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterEntry {
    /// Register address (7 bits)
    pub address: u8,
    /// Display name
    pub name: String,
    /// Default value from the definition source (9 bits)
    pub default: Option<u16>,
    /// Value the operator intends to write (9 bits)
    pub value: u16,
}

impl RegisterEntry {
    /// Create an entry, synthesizing a name when none is given
    pub fn new(address: u8, name: Option<&str>, default: Option<u16>) -> Self {
        let address = address & REGISTER_MASK;
        let default = default.map(|v| v & codec::VALUE_MASK);
        let name = match name {
            Some(name) => name.to_string(),
            None => format!("REG_{:02X}", address),
        };
        Self {
            address,
            name,
            default,
            value: default.unwrap_or(0),
        }
    }
}

/// Result of parsing one definition line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefinitionLine {
    /// Blank line or `#` comment
    Ignored,
    /// A register definition
    Entry(RegisterEntry),
    /// The address field is not a valid 7-bit register address
    BadAddress,
}

/// Parse a single line of a definition file
pub fn parse_line(line: &str) -> DefinitionLine {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return DefinitionLine::Ignored;
    }

    let mut fields = line.split_whitespace();
    let address = match fields.next().map(parse_int) {
        Some(Ok(address)) if (0..=REGISTER_MASK as i64).contains(&address) => address as u8,
        _ => return DefinitionLine::BadAddress,
    };
    let name = fields.next();
    let default = fields
        .next()
        .and_then(|field| parse_wrapping(field).ok())
        .map(codec::mask_value);

    DefinitionLine::Entry(RegisterEntry::new(address, name, default))
}

/// Ordered collection of register entries
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisterTable {
    entries: Vec<RegisterEntry>,
}

impl RegisterTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a whole definition source
    ///
    /// Returns the table and the 1-based line numbers that were skipped.
    pub fn parse(source: &str) -> (Self, Vec<usize>) {
        let mut table = Self::new();
        let mut skipped = Vec::new();

        for (lineno, line) in source.lines().enumerate() {
            match parse_line(line) {
                DefinitionLine::Ignored => {}
                DefinitionLine::Entry(entry) => table.push(entry),
                DefinitionLine::BadAddress => {
                    log::warn!("Skipping line {} (bad addr): {}", lineno + 1, line.trim());
                    skipped.push(lineno + 1);
                }
            }
        }

        (table, skipped)
    }

    /// Read and parse a definition file
    #[cfg(feature = "std")]
    pub fn load_file(path: &std::path::Path) -> std::io::Result<Self> {
        let source = std::fs::read_to_string(path)?;
        let (table, skipped) = Self::parse(&source);
        log::debug!(
            "Parsed {}: {} registers, {} lines skipped",
            path.display(),
            table.len(),
            skipped.len()
        );
        Ok(table)
    }

    /// Append an entry
    pub fn push(&mut self, entry: RegisterEntry) {
        self.entries.push(entry);
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in table order
    pub fn entries(&self) -> &[RegisterEntry] {
        &self.entries
    }

    /// `(index, entry)` pairs in table order
    pub fn list(&self) -> impl Iterator<Item = (usize, &RegisterEntry)> {
        self.entries.iter().enumerate()
    }

    /// Resolve a possibly negative or oversized index
    fn slot(&self, index: i64) -> Result<usize> {
        usize::try_from(index)
            .ok()
            .filter(|&i| i < self.entries.len())
            .ok_or(Error::IndexOutOfRange {
                index,
                len: self.entries.len(),
            })
    }

    /// Entry at `index`
    pub fn get(&self, index: i64) -> Result<&RegisterEntry> {
        let slot = self.slot(index)?;
        Ok(&self.entries[slot])
    }

    /// Set the cached value of the entry at `index`, masked to 9 bits
    ///
    /// On error the table is left untouched.
    pub fn set_value(&mut self, index: i64, value: i64) -> Result<&RegisterEntry> {
        let slot = self.slot(index)?;
        let entry = &mut self.entries[slot];
        entry.value = codec::mask_value(value);
        Ok(entry)
    }

    /// Overwrite the cached value at `index` with a value read from hardware
    pub fn refresh(&mut self, index: i64, value: u16) -> Result<&RegisterEntry> {
        self.set_value(index, value as i64)
    }

    /// First entry (in table order) with the given register address
    pub fn find_by_address(&self, address: u8) -> Option<(usize, &RegisterEntry)> {
        self.entries
            .iter()
            .enumerate()
            .find(|(_, entry)| entry.address == address)
    }

    /// Set the cached value of the first entry with `address`
    ///
    /// Later entries with the same address are never touched. The address is
    /// matched as given: anything outside the 7-bit range matches nothing.
    pub fn set_by_address(&mut self, address: i64, value: i64) -> Result<&RegisterEntry> {
        let slot = u8::try_from(address)
            .ok()
            .and_then(|a| self.find_by_address(a))
            .map(|(slot, _)| slot)
            .ok_or(Error::AddressNotFound { address })?;
        self.set_value(slot as i64, value)
    }
}
