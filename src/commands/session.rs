//! Interactive session command implementation

use wmreg_repl::{run_repl, Prompter, Session};

use crate::cli::SessionArgs;
use crate::commands::setup;

/// Set up the bus and device, then run the register shell
///
/// The bus is closed when the shell ends, whether it ended normally or on
/// an error.
pub fn cmd_session(args: &SessionArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut prompter = Prompter::new()?;
    let setup = setup::prepare(args, &mut prompter)?;
    drop(prompter);

    let mut session = Session::new(setup.bus, setup.device, setup.table);
    let result = run_repl(&mut session);
    session.into_bus().close();

    result?;
    println!("Goodbye!");
    Ok(())
}
