/*!
  The entries of a program. An `Entry` is either an `Instruction`, which carries an instruction
  index and can be the target of a `JUMP`, or a `Command`, which carries no index and is
  invisible to jump targeting. The position of an entry in a program and its instruction index
  are two different numbering schemes; they only coincide when no commands are interleaved
  among the instructions.
*/

use std::collections::HashMap;
use std::fmt::{Display, Formatter};

use crate::address::{Address, AddressNumberType};
use crate::error::UrmError;
use crate::registers::Value;
use super::operation::Operation;

/// Logical identifier of an instruction, issued by an `IndexCounter`.
pub type InstructionIndex = usize;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Instruction {
  Inc(Address),
  Zero(Address),
  Move {
    from : Address,
    to   : Address
  },
  /// Jumps to the instruction with index `target` if registers `x` and `y` are equal.
  Jump {
    x      : Address,
    y      : Address,
    target : InstructionIndex
  },
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Command {
  RangeZero {
    lo : Address,
    hi : Address
  },
  RangeSet {
    address : Address,
    value   : Value
  },
  BlockCopy {
    from : Address,
    to   : Address,
    len  : AddressNumberType
  },
  Dump {
    lo : Address,
    hi : Address
  },
  ListProgram,
  RunProgram,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Entry {
  Instruction {
    index       : InstructionIndex,
    instruction : Instruction
  },
  Command(Command),
}

impl Instruction {
  pub fn operation(&self) -> Operation {
    match self {
      Instruction::Inc(_)      => Operation::Inc,
      Instruction::Zero(_)     => Operation::Zero,
      Instruction::Move{..}    => Operation::Move,
      Instruction::Jump{..}    => Operation::Jump,
    }
  }

  fn relocated(self, shift: AddressNumberType) -> Result<Instruction, UrmError> {
    let relocated = match self {
      Instruction::Inc(address)  => Instruction::Inc(address.offset(shift)?),
      Instruction::Zero(address) => Instruction::Zero(address.offset(shift)?),
      Instruction::Move{from, to} => {
        Instruction::Move{ from: from.offset(shift)?, to: to.offset(shift)? }
      }
      Instruction::Jump{x, y, target} => {
        Instruction::Jump{ x: x.offset(shift)?, y: y.offset(shift)?, target }
      }
    };
    Ok(relocated)
  }
}

impl Command {
  pub fn operation(&self) -> Operation {
    match self {
      Command::RangeZero{..} => Operation::RangeZero,
      Command::RangeSet{..}  => Operation::RangeSet,
      Command::BlockCopy{..} => Operation::BlockCopy,
      Command::Dump{..}      => Operation::Dump,
      Command::ListProgram   => Operation::ListProgram,
      Command::RunProgram    => Operation::RunProgram,
    }
  }

  fn relocated(self, shift: AddressNumberType) -> Result<Command, UrmError> {
    let relocated = match self {
      Command::RangeZero{lo, hi} => {
        Command::RangeZero{ lo: lo.offset(shift)?, hi: hi.offset(shift)? }
      }
      Command::RangeSet{address, value} => {
        Command::RangeSet{ address: address.offset(shift)?, value }
      }
      Command::BlockCopy{from, to, len} => {
        Command::BlockCopy{ from: from.offset(shift)?, to: to.offset(shift)?, len }
      }
      Command::Dump{lo, hi} => Command::Dump{ lo: lo.offset(shift)?, hi: hi.offset(shift)? },
      Command::ListProgram | Command::RunProgram => self,
    };
    Ok(relocated)
  }
}

impl Entry {

  /// The instruction index, if this entry is an instruction.
  pub fn index(&self) -> Option<InstructionIndex> {
    match self {
      Entry::Instruction{index, ..} => Some(*index),
      Entry::Command(_)             => None
    }
  }

  pub fn is_instruction(&self) -> bool {
    self.index().is_some()
  }

  pub fn operation(&self) -> Operation {
    match self {
      Entry::Instruction{instruction, ..} => instruction.operation(),
      Entry::Command(command)             => command.operation()
    }
  }

  /**
    Rewrites the entry for its new place in a merged program: every register operand moves up
    by `shift`, and the instruction index and any jump target are looked up in `renumbering`.
    A jump target missing from `renumbering` is left as it is. An operand that would move out
    of the address space is an `AddressOverflow`.
  */
  pub fn renumbered(
    self,
    shift       : AddressNumberType,
    renumbering : &HashMap<InstructionIndex, InstructionIndex>
  ) -> Result<Entry, UrmError>
  {
    let renumber = |index: InstructionIndex| {
      renumbering.get(&index).copied().unwrap_or(index)
    };

    let renumbered = match self {

      Entry::Instruction{index, instruction} => {
        let instruction = match instruction.relocated(shift)? {
          Instruction::Jump{x, y, target} => Instruction::Jump{ x, y, target: renumber(target) },
          other                           => other
        };
        Entry::Instruction{ index: renumber(index), instruction }
      }

      Entry::Command(command) => Entry::Command(command.relocated(shift)?)

    };
    Ok(renumbered)
  }
}

// region Canonical text forms

impl Display for Instruction {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    let operation = self.operation();
    match self{
      Instruction::Inc(address) | Instruction::Zero(address) => {
        write!(f, "{} {}", operation, address)
      }
      Instruction::Move{from, to} => {
        write!(f, "{} {} {}", operation, from, to)
      }
      Instruction::Jump{x, y, target} => {
        write!(f, "{} {} {} {}", operation, x, y, target)
      }
    }
  }
}

impl Display for Command {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    let operation = self.operation();
    match self{
      Command::RangeZero{lo, hi} | Command::Dump{lo, hi} => {
        write!(f, "{} {} {}", operation, lo, hi)
      }
      Command::RangeSet{address, value} => {
        write!(f, "{} {} {}", operation, address, value)
      }
      Command::BlockCopy{from, to, len} => {
        write!(f, "{} {} {} {}", operation, from, to, len)
      }
      Command::ListProgram | Command::RunProgram => {
        write!(f, "{}", operation)
      }
    }
  }
}

impl Display for Entry {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self{
      Entry::Instruction{instruction, ..} => write!(f, "{}", instruction),
      Entry::Command(command)             => write!(f, "{}", command)
    }
  }
}

// endregion
