//! The Unlimited Register Machine: a program of entries, a register store, and a program
//! counter that walks the program by position.

use std::fmt::{Display, Formatter};
use std::io::Write;

use prettytable::Table;

use crate::address::Address;
use crate::error::UrmError;
use crate::program::{Command, Entry, IndexCounter, Instruction, InstructionIndex};
use crate::registers::{RegisterStore, TABLE_DISPLAY_FORMAT};

/// What `Machine::load_entry` does with an entry.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum LoadMode {
  /// Append the entry to the program.
  Defer,
  /// Execute the entry now and discard it.
  Immediate
}

/// Where control goes after an entry executes.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum Flow {
  Next,
  /// Continue at the given program position.
  Jump(usize)
}

#[derive(Debug, Default)]
pub struct Machine {
  pub(crate) program   : Vec<Entry>,
  pub(crate) registers : RegisterStore,
  pub(crate) counter   : IndexCounter,

  pc      : usize, // A program position, not an instruction index
  running : bool,
}

impl Machine {

  // region Construction and accessors

  pub fn new() -> Machine {
    Machine::with_counter(IndexCounter::new())
  }

  /// A machine whose instructions will be numbered by `counter`.
  pub fn with_counter(counter: IndexCounter) -> Machine {
    Machine {
      program   : Vec::new(),
      registers : RegisterStore::new(),
      counter,
      pc        : 0,
      running   : false,
    }
  }

  #[cfg(test)]
  pub fn program(&self) -> &[Entry] {
    &self.program
  }

  #[cfg(test)]
  pub fn registers(&self) -> &RegisterStore {
    &self.registers
  }

  #[cfg(test)]
  pub fn registers_mut(&mut self) -> &mut RegisterStore {
    &mut self.registers
  }

  pub fn counter(&self) -> &IndexCounter {
    &self.counter
  }

  pub fn counter_mut(&mut self) -> &mut IndexCounter {
    &mut self.counter
  }

  #[cfg(test)]
  pub fn pc(&self) -> usize {
    self.pc
  }

  pub fn instruction_count(&self) -> usize {
    self.program.iter().filter(|entry| entry.is_instruction()).count()
  }

  // endregion

  // region Loading

  /// Appends `entry` to the program, or executes it right away, according to `mode`.
  pub fn load_entry(&mut self, entry: Entry, mode: LoadMode, out: &mut dyn Write)
    -> Result<(), UrmError>
  {
    match mode {
      LoadMode::Defer     => {
        self.program.push(entry);
        Ok(())
      }
      LoadMode::Immediate => {
        self.execute(entry, None, out).map(|_flow| ())
      }
    }
  }

  /// Appends every entry to the program.
  pub fn load_program(&mut self, entries: Vec<Entry>) {
    self.program.extend(entries);
  }

  /// Drops the program and clears the registers. The index counter keeps counting.
  pub fn erase(&mut self) {
    self.program.clear();
    self.registers.clear();
    self.pc = 0;
  }

  // endregion

  // region Running

  /// Moves the program counter back to the first entry.
  pub fn start(&mut self) {
    self.pc = 0;
  }

  pub fn is_finished(&self) -> bool {
    self.pc >= self.program.len()
  }

  /**
    Executes the entry at the program counter and moves the counter on, either to the next
    position or to the destination of a jump. Returns `false` without doing anything once the
    program is exhausted.
  */
  pub fn step(&mut self, out: &mut dyn Write) -> Result<bool, UrmError> {
    if self.is_finished() {
      return Ok(false);
    }

    #[cfg(feature = "trace_computation")] println!("{}", self);

    let position = self.pc;
    let entry = self.program[position];
    self.pc = match self.execute(entry, Some(position), out)? {
      Flow::Next           => position + 1,
      Flow::Jump(position) => position
    };
    Ok(true)
  }

  /**
    Runs the program from its first entry until the program counter walks off the end.
    There is no iteration limit: a program that jumps around forever runs forever.
  */
  pub fn run(&mut self, out: &mut dyn Write) -> Result<(), UrmError> {
    if self.running {
      return Err(UrmError::ReentrantRun);
    }

    self.running = true;
    self.start();
    let result = loop {
      match self.step(out) {
        Ok(true)  => continue,
        Ok(false) => break Ok(()),
        Err(e)    => break Err(e)
      }
    };
    self.running = false;

    #[cfg(feature = "trace_computation")] println!("{}", self);
    result
  }

  /// Executes one entry. `position` is where the entry sits in the program, if it is there.
  fn execute(&mut self, entry: Entry, position: Option<usize>, out: &mut dyn Write)
    -> Result<Flow, UrmError>
  {
    match entry {

      Entry::Instruction{index, instruction} => {
        match instruction {

          Instruction::Inc(address) => {
            self.registers.increment(address);
          }

          Instruction::Zero(address) => {
            self.registers.set(address, 0);
          }

          Instruction::Move{from, to} => {
            let value = self.registers.get(from);
            self.registers.set(to, value);
          }

          Instruction::Jump{x, y, target} => {
            if self.registers.get(x) == self.registers.get(y) {
              let origin = position.map(|position| (position, index));
              let destination = self.resolve_jump(target, origin)?;
              return Ok(Flow::Jump(destination));
            }
          }

        }
      }

      Entry::Command(command) => self.execute_command(command, out)?

    }
    Ok(Flow::Next)
  }

  fn execute_command(&mut self, command: Command, out: &mut dyn Write) -> Result<(), UrmError> {
    match command {
      Command::RangeZero{lo, hi}        => self.registers.range_zero(lo, hi),
      Command::RangeSet{address, value} => self.registers.set(address, value),
      Command::BlockCopy{from, to, len} => self.registers.block_copy(from, to, len)?,
      Command::Dump{lo, hi}             => self.write_registers(lo, hi, out)?,
      Command::ListProgram              => self.write_program(out)?,
      Command::RunProgram               => self.run(out)?,
    }
    Ok(())
  }

  /**
    Finds the program position of the instruction whose index is `target`.

    The target must have been issued by the index counter. When the jump is part of the
    program, `origin` holds its position and its own index, and the program is scanned from
    the jump's position towards the target: backwards if the target index is smaller than the
    jump's own, forwards otherwise. Commands are passed over. Reaching either end of the
    program without a match is an `InvalidTarget`, as is a target that is never found when
    there is no origin and the whole program is searched.
  */
  fn resolve_jump(&self, target: InstructionIndex, origin: Option<(usize, InstructionIndex)>)
    -> Result<usize, UrmError>
  {
    if !self.counter.is_issued(target) {
      return Err(UrmError::InvalidTarget(target));
    }

    let is_target = |entry: &Entry| entry.index() == Some(target);
    let found = match origin {

      Some((position, own_index)) if target < own_index => {
        self.program[..=position].iter().enumerate().rev().find(|(_, entry)| is_target(entry))
      }

      Some((position, _own_index)) => {
        self.program.iter().enumerate().skip(position).find(|(_, entry)| is_target(entry))
      }

      None => self.program.iter().enumerate().find(|(_, entry)| is_target(entry))

    };

    found.map(|(position, _entry)| position)
         .ok_or(UrmError::InvalidTarget(target))
  }

  // endregion

  // region Output commands

  /// One line per register in `[lo, hi]`, ascending.
  fn write_registers(&self, lo: Address, hi: Address, out: &mut dyn Write) -> Result<(), UrmError> {
    for idx in lo.idx()..=hi.idx() {
      writeln!(out, "R{}: {}", idx, self.registers.get(Address(idx)))?;
    }
    Ok(())
  }

  /// One line per entry, in program order.
  fn write_program(&self, out: &mut dyn Write) -> Result<(), UrmError> {
    for entry in &self.program {
      writeln!(out, "{}", entry)?;
    }
    Ok(())
  }

  // endregion

  // region Display methods

  fn make_program_table(&self) -> Table {
    let mut table = Table::new();

    table.set_format(*TABLE_DISPLAY_FORMAT);
    table.set_titles(row![ubr->"Position", ubr->"Index", ubl->"Entry"]);

    for (position, entry) in self.program.iter().enumerate() {
      let marker = match position == self.pc {
        true  => format!("* --> {}", position),
        false => position.to_string()
      };
      let index = entry.index().map_or_else(String::new, |index| index.to_string());
      table.add_row(row![r->marker, r->index, entry.to_string()]);
    }
    table
  }

  // endregion

}

impl Display for Machine {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    let program_table  = self.make_program_table();
    let register_table = self.registers.make_register_table();

    let mut combined_table = table!([program_table, register_table]);

    combined_table.set_titles(row![ub->"Program", ub->"Registers"]);
    combined_table.set_format(*TABLE_DISPLAY_FORMAT);

    write!(
      f,
      "PC: {}\tInstructions: {}\tNext index: {}\n{}",
      self.pc, self.instruction_count(), self.counter.issued(), combined_table
    )
  }
}
