use thiserror::Error;

use crate::address::{Address, AddressNumberType};
use crate::program::{InstructionIndex, Operation};

/// Errors that can occur while parsing, loading or executing a program.
#[derive(Debug, Error)]
pub enum UrmError {
  /// The first token of a line is not a recognized operation.
  #[error("unknown command `{0}`")]
  UnknownCommand(String),
  /// Wrong number of operands for an operation.
  #[error("{operation} requires {} operands but was given {given}", .operation.arity_text())]
  ArityMismatch {
    operation : Operation,
    given     : usize
  },
  /// A jump target that names no instruction of the program.
  #[error("invalid jump target {0}")]
  InvalidTarget(InstructionIndex),
  /// An operand that does not parse as the expected kind of integer.
  #[error("malformed operand `{0}`")]
  MalformedOperand(String),
  /// A register address moved past the last representable address.
  #[error("register {address} + {offset} is out of range")]
  AddressOverflow {
    address : Address,
    offset  : AddressNumberType
  },
  /// `/run` was executed by the program that is already running.
  #[error("/run cannot be executed while the program is running")]
  ReentrantRun,
  /// A session command where a program entry is required.
  #[error("{0} cannot be part of a program")]
  NotAllowedInProgram(Operation),
  /// Failure on a specific line of program text.
  #[error("line {line}: {source}")]
  OnLine {
    line   : usize,
    source : Box<UrmError>
  },
  /// Failure loading a program file.
  #[error("cannot load `{path}`: {source}")]
  Load {
    path   : String,
    source : Box<UrmError>
  },
  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
}
