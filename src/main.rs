#[macro_use] extern crate prettytable;
#[macro_use] extern crate lazy_static;

mod address;
mod error;
mod machine;
mod merge;
mod program;
mod registers;
mod session;

use std::io::{self, Write};

use crate::error::UrmError;
use crate::session::Session;

/// Loaded and run before the prompt appears.
const DEFAULT_PROGRAM_PATH: &str = "test1.urm";

/// Loads and runs the default program.
fn boot(session: &mut Session, out: &mut dyn Write) -> Result<(), UrmError> {
  session.load_file(DEFAULT_PROGRAM_PATH)?;
  session.run(out)
}

fn main() -> Result<(), UrmError> {

  #[cfg(feature = "trace_computation")]
  println!("Computation Tracing ENABLED");

  let stdin  = io::stdin();
  let stdout = io::stdout();
  let stderr = io::stderr();
  let mut out         = stdout.lock();
  let mut diagnostics = stderr.lock();

  let mut session = Session::new();

  // A missing or broken default program is not fatal; the prompt starts with an empty machine.
  if let Err(e) = boot(&mut session, &mut out) {
    writeln!(diagnostics, "Error: {}", e)?;
  }

  session.interact(stdin.lock(), &mut out, &mut diagnostics)?;
  writeln!(out)?;
  Ok(())
}
