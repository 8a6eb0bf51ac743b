/*!
  The interactive side of the interpreter. A `Session` owns one machine and dispatches lines of
  input to it: program entries are executed or stored according to the caller's `LoadMode`,
  and the session commands `/load`, `/add`, `/quote`, `/comment` and `/exit` are handled here.

  Program files are parsed in full before the machine is touched. A file with a bad line is
  rejected as a whole and leaves the machine, including its index counter, as it was.
*/

use std::fs;
use std::io::{BufRead, Write};

use crate::error::UrmError;
use crate::machine::{LoadMode, Machine};
use crate::merge::merge;
use crate::program::{parse_line, parse_program, tokenize, Entry, IndexCounter, Line};

pub const PROMPT: &str = "$ ";

/// Whether the session should keep reading input.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Status {
  Continue,
  Exit
}

#[derive(Debug, Default)]
pub struct Session {
  machine: Machine
}

impl Session {

  pub fn new() -> Session {
    Session { machine: Machine::new() }
  }

  #[cfg(test)]
  pub fn machine(&self) -> &Machine {
    &self.machine
  }

  #[cfg(test)]
  pub fn machine_mut(&mut self) -> &mut Machine {
    &mut self.machine
  }

  /// Parses and dispatches one line of input.
  pub fn execute_line(&mut self, line: &str, mode: LoadMode, out: &mut dyn Write)
    -> Result<Status, UrmError>
  {
    let tokens = tokenize(line);

    match parse_line(&tokens, self.machine.counter_mut())? {
      Line::Blank          => {}
      Line::Entry(entry)   => self.machine.load_entry(entry, mode, out)?,
      Line::Quoted(entry)  => self.machine.load_entry(entry, LoadMode::Defer, out)?,
      Line::Load(path)     => self.load_file(path)?,
      Line::Add(path)      => self.add_file(path)?,
      Line::Exit           => return Ok(Status::Exit),
    }
    Ok(Status::Continue)
  }

  /**
    Reads lines from `input` and executes each immediately, until `/exit` or the end of input.
    A line that fails is reported on `diagnostics` and does not end the session.
  */
  pub fn interact<R: BufRead>(
    &mut self,
    input       : R,
    out         : &mut dyn Write,
    diagnostics : &mut dyn Write
  ) -> Result<(), UrmError>
  {
    write!(out, "{}", PROMPT)?;
    out.flush()?;

    for line in input.lines() {
      let line = line?;
      match self.execute_line(&line, LoadMode::Immediate, out) {
        Ok(Status::Exit)     => return Ok(()),
        Ok(Status::Continue) => {}
        Err(e)               => writeln!(diagnostics, "Error: {}", e)?
      }
      write!(out, "{}", PROMPT)?;
      out.flush()?;
    }
    Ok(())
  }

  /// Runs the machine's program.
  pub fn run(&mut self, out: &mut dyn Write) -> Result<(), UrmError> {
    self.machine.run(out)
  }

  // region Program files

  /// Replaces the machine's program with the program in the file at `path`.
  pub fn load_file(&mut self, path: &str) -> Result<(), UrmError> {
    let text = read_source(path)?;
    self.load_source(path, &text)
  }

  /// Replaces the machine's program with `text`. `name` identifies the source in errors.
  pub fn load_source(&mut self, name: &str, text: &str) -> Result<(), UrmError> {
    let (entries, counter) = self.parse_source(name, text)?;

    self.machine.erase();
    *self.machine.counter_mut() = counter;
    self.machine.load_program(entries);
    Ok(())
  }

  /// Merges the program in the file at `path` in front of the machine's program.
  pub fn add_file(&mut self, path: &str) -> Result<(), UrmError> {
    let text = read_source(path)?;
    self.add_source(path, &text)
  }

  /// Merges `text` in front of the machine's program. `name` identifies the source in errors.
  pub fn add_source(&mut self, name: &str, text: &str) -> Result<(), UrmError> {
    let (entries, counter) = self.parse_source(name, text)?;

    let mut incoming = Machine::with_counter(counter);
    incoming.load_program(entries);
    merge(&mut self.machine, incoming)
  }

  /// Parses with a copy of the machine's counter, which is only committed on success.
  fn parse_source(&self, name: &str, text: &str) -> Result<(Vec<Entry>, IndexCounter), UrmError> {
    let mut counter = self.machine.counter().clone();
    let entries = parse_program(text, &mut counter).map_err(|e| load_error(name, e))?;
    Ok((entries, counter))
  }

  // endregion

}

fn read_source(path: &str) -> Result<String, UrmError> {
  fs::read_to_string(path).map_err(|e| load_error(path, e.into()))
}

fn load_error(path: &str, source: UrmError) -> UrmError {
  UrmError::Load{ path: path.to_string(), source: Box::new(source) }
}
