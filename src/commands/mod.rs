//! CLI command implementations
//!
//! `session` is the interactive tool itself; `setup` holds its start-up
//! sequence. The remaining commands are one-shot helpers for finding the
//! codec before starting a session.

mod list;
mod scan;
mod session;
mod setup;

pub use list::{list_buses, list_drivers, list_macros, list_usb};
pub use scan::{cmd_probe, cmd_scan};
pub use session::cmd_session;
