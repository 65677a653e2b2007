//! Command line parsing
//!
//! One command per line, whitespace separated. Verbs are case-insensitive;
//! every numeric argument accepts decimal or `0x` hex.

use crate::error::ReplError;
use wmreg_core::number::{parse_int, parse_wrapping};

/// A parsed shell command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show the register table
    List,
    /// Set the cached value of a table entry
    Set { index: i64, value: i64 },
    /// Write a table entry to the device
    Write { index: i64 },
    /// Write every table entry in order
    WriteAll,
    /// Write a register directly, bypassing the table
    WriteAddr { register: i64, value: i64 },
    /// Set the cached value of the first entry with a register address
    SetAddr { register: i64, value: i64 },
    /// Read a table entry back from the device into the cache
    Read { index: i64 },
    /// Read a register directly
    ReadAddr { register: i64 },
    /// Run a macro
    Macro { name: String },
    /// List macros
    Macros,
    /// Show or change the device address
    Addr { address: Option<i64> },
    /// Show the command summary
    Help,
    /// Leave the shell
    Quit,
}

/// Verb, aliases, usage line and summary for every command
pub const VERBS: &[(&str, &[&str], &str, &str)] = &[
    ("list", &[], "list", "list loaded registers with current values"),
    ("set", &[], "set <idx> <value>", "set register at list index to value"),
    ("write", &[], "write <idx>", "write the current value of register at index"),
    ("writeall", &[], "writeall", "write all registers in the list (stops at first failure)"),
    ("writeaddr", &["wa"], "writeaddr <addr> <val>", "direct write by register address"),
    ("setaddr", &["sa"], "setaddr <addr> <val>", "update cached value by register address"),
    ("read", &[], "read <idx>", "read register at index back into the list"),
    ("readaddr", &[], "readaddr <addr>", "direct read by register address"),
    ("macro", &[], "macro <name>", "run a predefined write sequence"),
    ("macros", &[], "macros", "list predefined write sequences"),
    ("addr", &[], "addr [<addr>]", "show or change the device I2C address"),
    ("help", &[], "help", "show this help"),
    ("quit", &["exit"], "quit", "leave the tool"),
];

/// Canonical verb for a name or alias (already lowercased)
pub fn canonical_verb(word: &str) -> Option<&'static str> {
    VERBS
        .iter()
        .find(|(verb, aliases, _, _)| *verb == word || aliases.iter().any(|a| *a == word))
        .map(|(verb, _, _, _)| *verb)
}

/// Usage line of a canonical verb
pub fn usage(verb: &str) -> &'static str {
    VERBS
        .iter()
        .find(|(v, _, _, _)| *v == verb)
        .map(|(_, _, usage, _)| *usage)
        .unwrap_or("")
}

/// Arguments part of a verb's usage line, e.g. `<idx> <value>`
pub fn synopsis(verb: &str) -> &'static str {
    usage(verb)
        .split_once(' ')
        .map(|(_, args)| args)
        .unwrap_or("")
}

/// Multi-line command summary
pub fn help_text() -> String {
    let mut out = String::from("Commands:\n");
    for (_, aliases, usage, summary) in VERBS {
        let mut name = usage.to_string();
        for alias in *aliases {
            name.push_str(" / ");
            name.push_str(alias);
        }
        out.push_str(&format!("  {:<28} - {}\n", name, summary));
    }
    out.push_str(
        "\nNumbers are decimal or 0x hex. Register file format (txt):\n  \
         Each non-comment line: <addr> [NAME] [default]\n  Examples:\n    \
         0x00 LEFT_IN_VOL 0x017\n    0x02 LOUT1_VOL 0x079\n  \
         Comments (#) and blank lines are ignored.",
    );
    out
}

fn bad_argument(token: &str, usage: &'static str) -> ReplError {
    ReplError::BadArgument {
        token: token.to_string(),
        usage,
    }
}

/// Index or table address; over-range literals stay out of range
fn number(token: &str, usage: &'static str) -> Result<i64, ReplError> {
    parse_int(token).map_err(|_| bad_argument(token, usage))
}

/// Value or bus register that gets masked; only the low bits matter
fn masked(token: &str, usage: &'static str) -> Result<i64, ReplError> {
    parse_wrapping(token).map_err(|_| bad_argument(token, usage))
}

impl Command {
    /// Parse one input line; blank lines give `None`
    pub fn parse(line: &str) -> Result<Option<Self>, ReplError> {
        let mut words = line.split_whitespace();
        let Some(first) = words.next() else {
            return Ok(None);
        };
        let args: Vec<&str> = words.collect();

        let word = first.to_lowercase();
        let verb = canonical_verb(&word).ok_or_else(|| ReplError::UnknownCommand(word.clone()))?;
        let usage = usage(verb);

        let cmd = match (verb, args.as_slice()) {
            ("list", []) => Self::List,
            ("set", [idx, val]) => Self::Set {
                index: number(idx, usage)?,
                value: masked(val, usage)?,
            },
            ("write", [idx]) => Self::Write {
                index: number(idx, usage)?,
            },
            ("writeall", []) => Self::WriteAll,
            ("writeaddr", [reg, val]) => Self::WriteAddr {
                register: masked(reg, usage)?,
                value: masked(val, usage)?,
            },
            ("setaddr", [reg, val]) => Self::SetAddr {
                register: number(reg, usage)?,
                value: masked(val, usage)?,
            },
            ("read", [idx]) => Self::Read {
                index: number(idx, usage)?,
            },
            ("readaddr", [reg]) => Self::ReadAddr {
                register: masked(reg, usage)?,
            },
            ("macro", [name]) => Self::Macro {
                name: name.to_string(),
            },
            ("macros", []) => Self::Macros,
            ("addr", []) => Self::Addr { address: None },
            ("addr", [a]) => Self::Addr {
                address: Some(number(a, usage)?),
            },
            ("help", []) => Self::Help,
            ("quit", []) => Self::Quit,
            _ => return Err(ReplError::Usage(usage)),
        };
        Ok(Some(cmd))
    }
}

/// Parse a device address answer; `None` when it is not a 7-bit number
pub fn parse_device_address(token: &str) -> Option<u8> {
    match parse_int(token.trim()) {
        Ok(a @ 0..=0x7F) => Some(a as u8),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Command {
        Command::parse(line).unwrap().unwrap()
    }

    #[test]
    fn test_parse_verbs() {
        assert_eq!(parse("list"), Command::List);
        assert_eq!(parse("set 2 0x1ff"), Command::Set { index: 2, value: 0x1FF });
        assert_eq!(parse("write 0x3"), Command::Write { index: 3 });
        assert_eq!(parse("writeall"), Command::WriteAll);
        assert_eq!(parse("read 1"), Command::Read { index: 1 });
        assert_eq!(parse("readaddr 0x19"), Command::ReadAddr { register: 0x19 });
        assert_eq!(parse("macros"), Command::Macros);
        assert_eq!(parse("addr"), Command::Addr { address: None });
        assert_eq!(parse("addr 0x1b"), Command::Addr { address: Some(0x1B) });
        assert_eq!(parse("help"), Command::Help);
    }

    #[test]
    fn test_aliases_and_case() {
        assert_eq!(
            parse("wa 0x0f 0"),
            Command::WriteAddr { register: 0x0F, value: 0 }
        );
        assert_eq!(
            parse("SA 2 -1"),
            Command::SetAddr { register: 2, value: -1 }
        );
        assert_eq!(parse("EXIT"), Command::Quit);
        assert_eq!(parse("  Quit  "), Command::Quit);
        // macro names keep their case
        assert_eq!(
            parse("MACRO Bringup"),
            Command::Macro { name: "Bringup".into() }
        );
    }

    #[test]
    fn test_blank_line() {
        assert_eq!(Command::parse("").unwrap(), None);
        assert_eq!(Command::parse("   \t ").unwrap(), None);
    }

    #[test]
    fn test_unknown_and_arity() {
        assert!(matches!(
            Command::parse("frobnicate 1"),
            Err(ReplError::UnknownCommand(w)) if w == "frobnicate"
        ));
        assert!(matches!(
            Command::parse("set 1"),
            Err(ReplError::Usage("set <idx> <value>"))
        ));
        assert!(matches!(Command::parse("list extra"), Err(ReplError::Usage("list"))));
        assert!(matches!(Command::parse("macro"), Err(ReplError::Usage(_))));
    }

    #[test]
    fn test_bad_number() {
        let err = Command::parse("set x 1").unwrap_err();
        assert_eq!(err.to_string(), "invalid number 'x'. Usage: set <idx> <value>");
        assert!(matches!(
            Command::parse("writeaddr 0x02 0xZZ"),
            Err(ReplError::BadArgument { .. })
        ));
    }

    #[test]
    fn test_over_range_literals() {
        // values keep their low bits
        assert_eq!(
            parse("set 0 0x10000000000000001"),
            Command::Set { index: 0, value: 1 }
        );
        assert_eq!(
            parse("wa 0x10000000000000002 0x10000000000000179"),
            Command::WriteAddr { register: 2, value: 0x179 }
        );
        // indices and table addresses stay out of range
        assert_eq!(
            parse("write 0x10000000000000001"),
            Command::Write { index: i64::MAX }
        );
        assert_eq!(
            parse("sa 0x10000000000000002 1"),
            Command::SetAddr { register: i64::MAX, value: 1 }
        );
    }

    #[test]
    fn test_device_address() {
        assert_eq!(parse_device_address("0x1b"), Some(0x1B));
        assert_eq!(parse_device_address("26"), Some(0x1A));
        assert_eq!(parse_device_address("0x80"), None);
        assert_eq!(parse_device_address("nope"), None);
    }

    #[test]
    fn test_help_mentions_every_verb() {
        let help = help_text();
        for (verb, aliases, _, _) in VERBS {
            assert!(help.contains(verb));
            for alias in *aliases {
                assert!(help.contains(alias));
            }
        }
        assert_eq!(synopsis("setaddr"), "<addr> <val>");
        assert_eq!(canonical_verb("wa"), Some("writeaddr"));
        assert_eq!(canonical_verb("bogus"), None);
    }
}
