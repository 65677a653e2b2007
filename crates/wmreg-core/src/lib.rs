//! wmreg-core - Core library for poking WM8960 codec registers
//!
//! This crate holds everything that has a real contract: the 7-bit
//! register / 9-bit value packing used on the control bus, the register
//! table loaded from a definition file, the compiled-in macro catalog and
//! the presence probe. It is `no_std` (with `alloc`) so the same codec and
//! macros can be reused on a microcontroller that drives the codec itself.
//!
//! # Features
//!
//! - `std` - `std::error::Error` impls and file loading helpers
//!
//! # Example
//!
//! ```ignore
//! use wmreg_core::{codec, macros, I2cMaster};
//!
//! fn bring_up<M: I2cMaster>(bus: &mut M) {
//!     let bringup = macros::find("hp_i2s_init").unwrap();
//!     let outcome = macros::run(bus, 0x1A, bringup, |_, _, _| {});
//!     println!("{} of {} writes applied", outcome.completed, outcome.total);
//! }
//! ```

#![no_std]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod batch;
pub mod codec;
pub mod error;
pub mod macros;
pub mod number;
pub mod probe;
pub mod regs;
pub mod table;
mod transport;

pub use error::{BusFault, Error, Result};
pub use transport::{BusResult, I2cMaster};
