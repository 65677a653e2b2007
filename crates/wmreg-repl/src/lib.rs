//! Interactive register shell for the WM8960
//!
//! This crate provides the line-oriented command shell used once a bus and
//! device address have been chosen. Commands edit a register table loaded
//! from a definition file and push values to the codec.
//!
//! # Features
//!
//! - Index and address based register writes, table edits and read-back
//! - Fail-fast `writeall` and built-in bring-up macros
//! - Verb and macro-name completion, argument hints, colouring
//! - Command history with arrow key navigation, kept across runs
//!
//! # Example Session
//!
//! ```text
//! i2c> list
//! Idx  Addr  Value  Name
//! [00] 0x02 0x079 LOUT1_VOL
//! i2c> set 0 0x179
//! Set LOUT1_VOL to 0x179
//! i2c> write 0
//! Wrote 0x179 to 0x02 (LOUT1_VOL)
//! i2c> macro bringup
//! Running macro 'hp_i2s_init' (13 writes)
//!   0x0F <- 0x000 (Reset)
//!   ...
//! ```

pub mod command;
mod error;
pub mod highlight;
mod session;

pub use command::{help_text, parse_device_address, Command};
pub use error::ReplError;
pub use session::{Flow, Session};

use crate::highlight::{PromptHelper, ReplHelper};
use colored::Colorize;
use directories::ProjectDirs;
use rustyline::config::Configurer;
use rustyline::error::ReadlineError;
use rustyline::history::{DefaultHistory, FileHistory};
use rustyline::Editor;
use std::io::Write;
use std::path::PathBuf;
use wmreg_core::I2cMaster;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get the banner
fn get_banner(device: u8) -> String {
    format!(
        "wmreg {} - WM8960 register shell (device 0x{:02x})",
        VERSION, device
    )
    .bright_yellow()
    .bold()
    .to_string()
}

/// Get the history file path
fn get_history_path() -> PathBuf {
    if let Some(proj_dirs) = ProjectDirs::from("", "", "wmreg") {
        let mut path = proj_dirs.data_dir().to_path_buf();
        std::fs::create_dir_all(&path).ok();
        path.push("history");
        path
    } else {
        PathBuf::from(".wmreg_history")
    }
}

/// Run the command shell until `quit`, end of input or an I/O failure
///
/// Command failures are printed and the loop carries on; the session is
/// returned to the caller untouched apart from the commands it ran, so the
/// bus can be closed on every exit path.
pub fn run_repl<M: I2cMaster>(session: &mut Session<M>) -> Result<(), ReplError> {
    let mut rl = Editor::<ReplHelper, FileHistory>::new()
        .map_err(|e| ReplError::Readline(e.to_string()))?;
    rl.set_helper(Some(ReplHelper::new()));
    rl.set_auto_add_history(false);

    // Load history
    let history_path = get_history_path();
    if rl.load_history(&history_path).is_err() {
        log::debug!("No history at {}", history_path.display());
    }

    println!("{}", get_banner(session.device()));
    println!("{}", help_text());

    let prompt = format!("{} ", "i2c>".bright_green().bold());
    let mut stdout = std::io::stdout();
    let mut result = Ok(());

    loop {
        match rl.readline(&prompt) {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(line.as_str());

                match session.execute_line(&line, &mut stdout) {
                    Ok(Flow::Continue) => {}
                    Ok(Flow::Quit) => break,
                    Err(e) if e.is_recoverable() => {
                        eprintln!("{}: {}", "Error".bright_red().bold(), e);
                    }
                    Err(e) => {
                        result = Err(e);
                        break;
                    }
                }

                let _ = stdout.flush();
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                result = Err(ReplError::Readline(err.to_string()));
                break;
            }
        }
    }

    // Save history
    if let Err(e) = rl.save_history(&history_path) {
        eprintln!(
            "{}: Failed to save history: {}",
            "Warning".bright_yellow(),
            e
        );
    }

    result
}

/// Line prompts for the questions asked before the shell starts
pub struct Prompter {
    editor: Editor<PromptHelper, DefaultHistory>,
}

impl Prompter {
    /// Create a prompter on the terminal
    pub fn new() -> Result<Self, ReplError> {
        let mut editor = Editor::<PromptHelper, DefaultHistory>::new()
            .map_err(|e| ReplError::Readline(e.to_string()))?;
        editor.set_helper(Some(PromptHelper::new()));
        Ok(Self { editor })
    }

    /// Ask a question and return the trimmed answer
    pub fn ask(&mut self, question: &str) -> Result<String, ReplError> {
        match self.editor.readline(&format!("{}: ", question)) {
            Ok(line) => Ok(line.trim().to_string()),
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Err(ReplError::Cancelled),
            Err(e) => Err(ReplError::Readline(e.to_string())),
        }
    }

    /// Ask a yes/no question; anything but `y`/`yes` is no
    pub fn confirm(&mut self, question: &str) -> Result<bool, ReplError> {
        let answer = self.ask(&format!("{} [y/N]", question))?;
        Ok(is_yes(&answer))
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.to_lowercase().as_str(), "y" | "yes")
}
