//! Session state and command dispatch
//!
//! A [`Session`] owns the bus, the device address and the register table.
//! Commands write their results as plain text to the given output; failures
//! come back as [`ReplError`] so the caller decides how to show them. No
//! command leaves a table entry half-updated.

use std::io::Write;

use crate::command::{help_text, Command};
use crate::error::ReplError;

use wmreg_core::batch::{self, BatchOutcome};
use wmreg_core::codec;
use wmreg_core::macros;
use wmreg_core::table::RegisterTable;
use wmreg_core::I2cMaster;

/// What the shell loop should do after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Read the next command
    Continue,
    /// Leave the loop
    Quit,
}

/// One interactive session against a single device
pub struct Session<M: I2cMaster> {
    bus: M,
    device: u8,
    table: RegisterTable,
}

impl<M: I2cMaster> Session<M> {
    /// Start a session on `bus` talking to `device`
    pub fn new(bus: M, device: u8, table: RegisterTable) -> Self {
        Self { bus, device, table }
    }

    /// Device address commands are sent to
    pub fn device(&self) -> u8 {
        self.device
    }

    /// Change the device address
    pub fn set_device(&mut self, device: u8) {
        self.device = device & 0x7F;
    }

    /// Loaded register table
    pub fn table(&self) -> &RegisterTable {
        &self.table
    }

    /// Underlying bus
    pub fn bus(&self) -> &M {
        &self.bus
    }

    /// End the session and hand the bus back for closing
    pub fn into_bus(self) -> M {
        self.bus
    }

    /// Parse and run one input line
    pub fn execute_line(&mut self, line: &str, out: &mut dyn Write) -> Result<Flow, ReplError> {
        match Command::parse(line)? {
            Some(cmd) => self.execute(&cmd, out),
            None => Ok(Flow::Continue),
        }
    }

    /// Run one command
    pub fn execute(&mut self, cmd: &Command, out: &mut dyn Write) -> Result<Flow, ReplError> {
        log::debug!("execute: {:?}", cmd);
        match cmd {
            Command::List => self.list(out)?,
            Command::Set { index, value } => {
                let entry = self.table.set_value(*index, *value)?;
                writeln!(out, "Set {} to 0x{:03X}", entry.name, entry.value)?;
            }
            Command::Write { index } => self.write(*index, out)?,
            Command::WriteAll => {
                let outcome = self.write_all(out)?;
                check_outcome("writeall", &outcome)?;
            }
            Command::WriteAddr { register, value } => {
                let register = codec::mask_register(*register);
                let value = codec::mask_value(*value);
                codec::write_register(&mut self.bus, self.device, register, value)?;
                writeln!(out, "Wrote 0x{:03X} to 0x{:02X}", value, register)?;
            }
            Command::SetAddr { register, value } => {
                // Table lookups compare the address as typed
                let entry = self.table.set_by_address(*register, *value)?;
                writeln!(
                    out,
                    "Set {} (0x{:02X}) to 0x{:03X}",
                    entry.name, entry.address, entry.value
                )?;
            }
            Command::Read { index } => self.read(*index, out)?,
            Command::ReadAddr { register } => {
                let register = codec::mask_register(*register);
                let value = codec::read_register(&mut self.bus, self.device, register)?;
                writeln!(out, "Read 0x{:03X} from 0x{:02X}", value, register)?;
            }
            Command::Macro { name } => {
                let outcome = self.run_macro(name, out)?;
                check_outcome(&format!("macro '{}'", name), &outcome)?;
            }
            Command::Macros => self.list_macros(out)?,
            Command::Addr { address } => match address {
                None => writeln!(out, "Device address: 0x{:02x}", self.device)?,
                Some(a @ 0..=0x7F) => {
                    self.set_device(*a as u8);
                    writeln!(out, "Device address set to 0x{:02x}", self.device)?;
                }
                Some(a) => return Err(ReplError::InvalidDeviceAddress(*a)),
            },
            Command::Help => writeln!(out, "{}", help_text())?,
            Command::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    fn list(&self, out: &mut dyn Write) -> std::io::Result<()> {
        if self.table.is_empty() {
            return writeln!(out, "No registers loaded.");
        }
        writeln!(out, "Idx  Addr  Value  Name")?;
        for (idx, entry) in self.table.list() {
            writeln!(
                out,
                "[{:02}] 0x{:02X} 0x{:03X} {}",
                idx, entry.address, entry.value, entry.name
            )?;
        }
        Ok(())
    }

    fn write(&mut self, index: i64, out: &mut dyn Write) -> Result<(), ReplError> {
        // Bounds are checked before any bus traffic
        let entry = self.table.get(index)?;
        codec::write_register(&mut self.bus, self.device, entry.address, entry.value)?;
        writeln!(
            out,
            "Wrote 0x{:03X} to 0x{:02X} ({})",
            entry.value, entry.address, entry.name
        )?;
        Ok(())
    }

    fn read(&mut self, index: i64, out: &mut dyn Write) -> Result<(), ReplError> {
        let address = self.table.get(index)?.address;
        let value = codec::read_register(&mut self.bus, self.device, address)?;
        let entry = self.table.refresh(index, value)?;
        writeln!(
            out,
            "Read 0x{:03X} from 0x{:02X} ({})",
            entry.value, entry.address, entry.name
        )?;
        Ok(())
    }

    /// Write every table entry in order, stopping at the first failure
    pub fn write_all(&mut self, out: &mut dyn Write) -> Result<BatchOutcome, ReplError> {
        if self.table.is_empty() {
            writeln!(out, "No registers loaded.")?;
        }

        let entries = self.table.entries();
        let mut io_result = Ok(());
        let outcome = batch::write_sequence(
            &mut self.bus,
            self.device,
            entries.iter().map(|e| (e.address, e.value)),
            |i, register, value, result| {
                let line = match result {
                    Ok(()) => writeln!(
                        out,
                        "Wrote 0x{:03X} to 0x{:02X} ({})",
                        value, register, entries[i].name
                    ),
                    Err(e) => writeln!(out, "Write failed for 0x{:02X}: {}", register, e),
                };
                if io_result.is_ok() {
                    io_result = line;
                }
            },
        );
        io_result?;
        Ok(outcome)
    }

    /// Run a macro by name or alias, stopping at the first failure
    pub fn run_macro(&mut self, name: &str, out: &mut dyn Write) -> Result<BatchOutcome, ReplError> {
        let definition = macros::find(name).map_err(|_| ReplError::UnknownMacro {
            name: name.to_string(),
            available: macros::names().collect::<Vec<_>>().join(", "),
        })?;

        writeln!(
            out,
            "Running macro '{}' ({} writes)",
            definition.name,
            definition.steps.len()
        )?;

        let mut io_result = Ok(());
        let outcome = macros::run(&mut self.bus, self.device, definition, |_, step, result| {
            let line = match result {
                Ok(()) => writeln!(
                    out,
                    "  0x{:02X} <- 0x{:03X} ({})",
                    step.register, step.value, step.description
                ),
                Err(e) => writeln!(out, "  Write failed at 0x{:02X}: {}", step.register, e),
            };
            if io_result.is_ok() {
                io_result = line;
            }
        });
        io_result?;
        Ok(outcome)
    }

    fn list_macros(&self, out: &mut dyn Write) -> std::io::Result<()> {
        for m in macros::CATALOG {
            let aliases = if m.aliases.is_empty() {
                String::new()
            } else {
                format!(" (alias: {})", m.aliases.join(", "))
            };
            writeln!(
                out,
                "  {:<12} {:>2} writes  {}{}",
                m.name,
                m.steps.len(),
                m.summary,
                aliases
            )?;
        }
        Ok(())
    }
}

/// Turn an incomplete batch into an error for the shell loop
fn check_outcome(what: &str, outcome: &BatchOutcome) -> Result<(), ReplError> {
    match outcome.failure {
        None => Ok(()),
        Some(failure) => {
            log::debug!(
                "{} failed at step {} ({} skipped): {}",
                what,
                failure.step,
                outcome.skipped(),
                failure.error
            );
            Err(ReplError::Aborted {
                what: what.to_string(),
                completed: outcome.completed,
                total: outcome.total,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wmreg_core::table::RegisterEntry;
    use wmreg_core::{BusFault, Error};
    use wmreg_dummy::{DummyCodec, DummyConfig, Transaction};

    const REGS: &str = "\
0x02 LOUT1_VOL 0x079
0x03 ROUT1_VOL 0x079
0x19 POWER1 0x0C0
";

    fn session(bus: DummyCodec) -> Session<DummyCodec> {
        let (table, _) = RegisterTable::parse(REGS);
        Session::new(bus, 0x1A, table)
    }

    fn run(s: &mut Session<DummyCodec>, line: &str) -> (Result<Flow, ReplError>, String) {
        let mut out = Vec::new();
        let result = s.execute_line(line, &mut out);
        (result, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_list() {
        let mut s = session(DummyCodec::new_default());
        let (r, out) = run(&mut s, "list");
        assert_eq!(r.unwrap(), Flow::Continue);
        assert_eq!(
            out,
            "Idx  Addr  Value  Name\n\
             [00] 0x02 0x079 LOUT1_VOL\n\
             [01] 0x03 0x079 ROUT1_VOL\n\
             [02] 0x19 0x0C0 POWER1\n"
        );

        let mut empty = Session::new(DummyCodec::new_default(), 0x1A, RegisterTable::new());
        let (_, out) = run(&mut empty, "list");
        assert_eq!(out, "No registers loaded.\n");
    }

    #[test]
    fn test_set_masks_and_reports() {
        let mut s = session(DummyCodec::new_default());
        let (r, out) = run(&mut s, "set 1 0x3AB");
        r.unwrap();
        assert_eq!(out, "Set ROUT1_VOL to 0x1AB\n");
        assert_eq!(s.table().get(1).unwrap().value, 0x1AB);

        run(&mut s, "set 1 -1").0.unwrap();
        assert_eq!(s.table().get(1).unwrap().value, 0x1FF);
        // set only touches the cache
        assert!(s.bus().transactions().is_empty());
    }

    #[test]
    fn test_set_out_of_range_leaves_table() {
        let mut s = session(DummyCodec::new_default());
        let before = s.table().clone();
        let (r, out) = run(&mut s, "set 3 1");
        assert!(matches!(
            r,
            Err(ReplError::Core(Error::IndexOutOfRange { index: 3, len: 3 }))
        ));
        assert!(out.is_empty());
        assert_eq!(s.table(), &before);
    }

    #[test]
    fn test_write_entry() {
        let mut s = session(DummyCodec::new_default());
        run(&mut s, "set 2 0x1C0").0.unwrap();
        let (r, out) = run(&mut s, "write 2");
        r.unwrap();
        assert_eq!(out, "Wrote 0x1C0 to 0x19 (POWER1)\n");
        assert_eq!(
            s.bus().transactions(),
            [Transaction::Write {
                address: 0x1A,
                bytes: vec![0x33, 0xC0],
            }]
        );
    }

    #[test]
    fn test_write_one_past_end_no_bus_traffic() {
        let mut s = session(DummyCodec::new_default());
        let (r, _) = run(&mut s, "write 3");
        assert!(matches!(
            r,
            Err(ReplError::Core(Error::IndexOutOfRange { .. }))
        ));
        assert!(s.bus().transactions().is_empty());
    }

    #[test]
    fn test_write_transport_error_is_not_fatal() {
        let mut s = session(DummyCodec::new_default().fail_writes_from(0));
        let (r, _) = run(&mut s, "write 0");
        let err = r.unwrap_err();
        assert!(err.is_recoverable());
        assert!(matches!(
            err,
            ReplError::Core(Error::Transport {
                device: 0x1A,
                register: 0x02,
                fault: BusFault::Nack
            })
        ));
        // session keeps working afterwards
        assert_eq!(run(&mut s, "list").0.unwrap(), Flow::Continue);
    }

    #[test]
    fn test_writeall_stops_at_first_failure() {
        let mut s = session(DummyCodec::new_default().fail_writes_from(1));
        let mut out = Vec::new();
        let outcome = s.write_all(&mut out).unwrap();
        assert_eq!(outcome.completed, 1);
        assert_eq!(outcome.total, 3);
        assert_eq!(outcome.skipped(), 1);

        // write 1 done, write 2 attempted, write 3 never attempted
        let writes: Vec<_> = s
            .bus()
            .transactions()
            .iter()
            .filter(|t| matches!(t, Transaction::Write { .. }))
            .collect();
        assert_eq!(writes.len(), 2);
        assert_eq!(s.bus().register_writes(), [(0x02, 0x079)]);

        let out = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "Wrote 0x079 to 0x02 (LOUT1_VOL)");
        assert!(lines[1].starts_with("Write failed for 0x03: "));
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn test_writeall_command_reports_abort() {
        let mut s = session(DummyCodec::new_default().fail_writes_from(2));
        let (r, out) = run(&mut s, "writeall");
        assert_eq!(
            r.unwrap_err().to_string(),
            "writeall stopped after 2 of 3 writes"
        );
        assert_eq!(out.lines().count(), 3);

        let mut s = session(DummyCodec::new_default());
        let (r, out) = run(&mut s, "writeall");
        r.unwrap();
        assert_eq!(out.lines().count(), 3);
        assert_eq!(s.bus().register(0x19), 0x0C0);
    }

    #[test]
    fn test_writeall_empty_table() {
        let mut s = Session::new(DummyCodec::new_default(), 0x1A, RegisterTable::new());
        let (r, out) = run(&mut s, "writeall");
        r.unwrap();
        assert_eq!(out, "No registers loaded.\n");
        assert!(s.bus().transactions().is_empty());
    }

    #[test]
    fn test_writeaddr_masks() {
        let mut s = session(DummyCodec::new_default());
        let (r, out) = run(&mut s, "wa 0x82 0x3FF");
        r.unwrap();
        assert_eq!(out, "Wrote 0x1FF to 0x02\n");
        assert_eq!(s.bus().register_writes(), [(0x02, 0x1FF)]);
        // table is bypassed
        assert_eq!(s.table().get(0).unwrap().value, 0x079);
    }

    #[test]
    fn test_setaddr_first_match_only() {
        let mut table = RegisterTable::new();
        table.push(RegisterEntry::new(0x05, Some("FIRST"), Some(0)));
        table.push(RegisterEntry::new(0x05, Some("SECOND"), Some(0)));
        let mut s = Session::new(DummyCodec::new_default(), 0x1A, table);

        let (r, out) = run(&mut s, "setaddr 0x05 0x1ff");
        r.unwrap();
        assert_eq!(out, "Set FIRST (0x05) to 0x1FF\n");
        assert_eq!(s.table().get(0).unwrap().value, 0x1FF);
        assert_eq!(s.table().get(1).unwrap().value, 0);
    }

    #[test]
    fn test_setaddr_no_match_unchanged() {
        let mut s = session(DummyCodec::new_default());
        let before = s.table().clone();
        let (r, _) = run(&mut s, "sa 0x33 1");
        let err = r.unwrap_err();
        assert!(err.is_recoverable());
        assert_eq!(err.to_string(), "address 0x33 not in loaded register list");
        assert_eq!(s.table(), &before);
    }

    #[test]
    fn test_setaddr_above_seven_bits_unchanged() {
        let mut s = session(DummyCodec::new_default());
        let before = s.table().clone();
        // 0x82 is not 0x02 for table matching
        let (r, out) = run(&mut s, "setaddr 0x82 0x155");
        assert!(matches!(
            r,
            Err(ReplError::Core(Error::AddressNotFound { address: 0x82 }))
        ));
        assert!(out.is_empty());
        assert_eq!(s.table(), &before);
        assert!(s.bus().transactions().is_empty());
    }

    #[test]
    fn test_set_over_range_literal() {
        let mut s = session(DummyCodec::new_default());
        let (r, out) = run(&mut s, "set 0 0x10000000000000001");
        r.unwrap();
        assert_eq!(out, "Set LOUT1_VOL to 0x001\n");
        assert_eq!(s.table().get(0).unwrap().value, 0x001);

        let before = s.table().clone();
        let (r, _) = run(&mut s, "set 0x10000000000000000 1");
        assert!(matches!(
            r,
            Err(ReplError::Core(Error::IndexOutOfRange { .. }))
        ));
        assert_eq!(s.table(), &before);
    }

    #[test]
    fn test_read_refreshes_cache() {
        let mut bus = DummyCodec::new_default();
        codec::write_register(&mut bus, 0x1A, 0x03, 0x155).unwrap();
        let mut s = session(bus);

        let (r, out) = run(&mut s, "read 1");
        r.unwrap();
        assert_eq!(out, "Read 0x155 from 0x03 (ROUT1_VOL)\n");
        assert_eq!(s.table().get(1).unwrap().value, 0x155);

        let (r, out) = run(&mut s, "readaddr 3");
        r.unwrap();
        assert_eq!(out, "Read 0x155 from 0x03\n");
    }

    #[test]
    fn test_read_unsupported_surfaces_error() {
        let bus = DummyCodec::new(DummyConfig {
            readable: false,
            ..Default::default()
        });
        let mut s = session(bus);
        let before = s.table().clone();
        let (r, _) = run(&mut s, "read 0");
        assert!(matches!(r, Err(ReplError::Core(Error::Transport { .. }))));
        assert_eq!(s.table(), &before);
    }

    #[test]
    fn test_macro_runs_in_order() {
        let mut s = session(DummyCodec::new_default());
        let mut out = Vec::new();
        let outcome = s.run_macro("bringup", &mut out).unwrap();
        assert!(outcome.is_complete());
        assert_eq!(outcome.completed, 13);

        let expected: Vec<(u8, u16)> = macros::find("hp_i2s_init")
            .unwrap()
            .steps
            .iter()
            .map(|st| (st.register, st.value))
            .collect();
        assert_eq!(s.bus().register_writes(), expected.as_slice());

        let out = String::from_utf8(out).unwrap();
        assert!(out.starts_with("Running macro 'hp_i2s_init' (13 writes)\n  0x0F <- 0x000 (Reset)\n"));
    }

    #[test]
    fn test_macro_stops_at_failing_step() {
        let mut s = session(DummyCodec::new_default().fail_writes_from(5));
        let (r, out) = run(&mut s, "macro hp_i2s_init");
        assert!(matches!(
            r,
            Err(ReplError::Aborted {
                completed: 5,
                total: 13,
                ..
            })
        ));
        assert_eq!(s.bus().register_writes().len(), 5);
        // 5 successful writes + 1 failed attempt
        assert_eq!(s.bus().transactions().len(), 6);
        assert!(out.lines().last().unwrap().starts_with("  Write failed at 0x25: "));
    }

    #[test]
    fn test_unknown_macro() {
        let mut s = session(DummyCodec::new_default());
        let (r, out) = run(&mut s, "macro warp_drive");
        let msg = r.unwrap_err().to_string();
        assert!(msg.starts_with("Unknown macro 'warp_drive'. Available: hp_i2s_init"));
        assert!(msg.contains("dac_mute"));
        assert!(out.is_empty());
        assert!(s.bus().transactions().is_empty());
    }

    #[test]
    fn test_addr_override() {
        let mut s = session(DummyCodec::new(DummyConfig {
            address: Some(0x1B),
            ..Default::default()
        }));
        assert!(run(&mut s, "write 0").0.is_err());

        let (r, out) = run(&mut s, "addr 0x1b");
        r.unwrap();
        assert_eq!(out, "Device address set to 0x1b\n");
        assert_eq!(s.device(), 0x1B);
        run(&mut s, "write 0").0.unwrap();

        let (_, out) = run(&mut s, "addr");
        assert_eq!(out, "Device address: 0x1b\n");
        assert!(matches!(
            run(&mut s, "addr 0x80").0,
            Err(ReplError::InvalidDeviceAddress(0x80))
        ));
        assert_eq!(s.device(), 0x1B);
    }

    #[test]
    fn test_quit_help_and_unknown() {
        let mut s = session(DummyCodec::new_default());
        assert_eq!(run(&mut s, "exit").0.unwrap(), Flow::Quit);
        assert_eq!(run(&mut s, "QUIT").0.unwrap(), Flow::Quit);
        assert_eq!(run(&mut s, "").0.unwrap(), Flow::Continue);

        let (r, out) = run(&mut s, "help");
        r.unwrap();
        assert!(out.starts_with("Commands:\n"));

        let (r, _) = run(&mut s, "dance");
        assert_eq!(
            r.unwrap_err().to_string(),
            "Unknown command. Type 'help' for options."
        );
        let (r, _) = run(&mut s, "macros");
        r.unwrap();
    }
}
