/*!
  The human readable form of a program is one entry per line, whitespace delimited:
  ```
  INC 0
  JUMP 0 1 4
  /set 3 10
  ```
  This module tokenizes lines, parses operands, and turns a line into an `Entry` or a session
  command. Instructions take their index from the `IndexCounter` only once the whole line has
  parsed, so a rejected line never consumes an index.
*/

use std::str::FromStr;

use nom::{
  IResult,
  bytes::complete::is_not,
  character::complete::{
    char as one_char,
    digit1,
    multispace0,
    multispace1
  },
  combinator::{all_consuming, map_res, opt, recognize},
  multi::separated_list,
  sequence::{delimited, pair}
};

use crate::address::{Address, AddressNumberType};
use crate::error::UrmError;
use crate::registers::Value;
use super::counter::IndexCounter;
use super::entry::{Command, Entry, Instruction};
use super::operation::Operation;

/// A classified line of input.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Line<'a> {
  /// Nothing to do: an empty line or a `/comment`.
  Blank,
  Entry(Entry),
  /// An entry that must be appended to the program whatever the caller's mode.
  Quoted(Entry),
  Load(&'a str),
  Add(&'a str),
  Exit,
}

// region Tokens and operands

fn token(input: &str) -> IResult<&str, &str> {
  is_not(" \t\r\n")(input)
}

fn natural(input: &str) -> IResult<&str, AddressNumberType> {
  map_res(digit1, |digits: &str| digits.parse::<AddressNumberType>())(input)
}

fn integer(input: &str) -> IResult<&str, Value> {
  map_res(
    recognize(pair(opt(one_char('-')), digit1)),
    |digits: &str| digits.parse::<Value>()
  )(input)
}

/// Splits a line into its whitespace delimited tokens.
pub fn tokenize(line: &str) -> Vec<&str> {
  let line_p = all_consuming(
    delimited(multispace0, separated_list(multispace1, token), multispace0)
  );
  // Every character is either whitespace or part of a token, so this cannot fail.
  match line_p(line) {
    Ok((_rest, tokens)) => tokens,
    Err(_e)             => Vec::new()
  }
}

/// Parses a non-negative integer operand.
pub fn parse_natural(text: &str) -> Result<AddressNumberType, UrmError> {
  all_consuming(natural)(text)
    .map(|(_rest, number)| number)
    .map_err(|_e| UrmError::MalformedOperand(text.to_string()))
}

/// Parses a signed integer operand, used for register values.
pub fn parse_value(text: &str) -> Result<Value, UrmError> {
  all_consuming(integer)(text)
    .map(|(_rest, number)| number)
    .map_err(|_e| UrmError::MalformedOperand(text.to_string()))
}

fn parse_address(text: &str) -> Result<Address, UrmError> {
  parse_natural(text).map(Address)
}

// endregion

/// Looks up the operation named by the first token.
pub fn parse_operation(name: &str) -> Result<Operation, UrmError> {
  Operation::from_str(name).map_err(|_e| UrmError::UnknownCommand(name.to_string()))
}

/**
  Builds the program entry for `operation` from its operands. Instructions are assigned the
  next index of `counter`. `operation` must be a program entry operation.
*/
pub fn parse_entry(
  operation : Operation,
  operands  : &[&str],
  counter   : &mut IndexCounter
) -> Result<Entry, UrmError>
{
  if !operation.is_program_entry() {
    return Err(UrmError::NotAllowedInProgram(operation));
  }
  if !operation.accepts(operands.len()) {
    return Err(UrmError::ArityMismatch{ operation, given: operands.len() });
  }
  if !operation.is_instruction() {
    return parse_command(operation, operands).map(Entry::Command);
  }

  let instruction = match (operation, operands) {

    (Operation::Inc, [r])  => Instruction::Inc(parse_address(r)?),
    (Operation::Zero, [r]) => Instruction::Zero(parse_address(r)?),
    (Operation::Move, [from, to]) => {
      Instruction::Move{ from: parse_address(from)?, to: parse_address(to)? }
    }
    // The one operand form compares register 0 with itself, so it always jumps.
    (Operation::Jump, [target]) => {
      Instruction::Jump{ x: Address(0), y: Address(0), target: parse_natural(target)? }
    }
    (Operation::Jump, [x, y, target]) => {
      Instruction::Jump{
        x      : parse_address(x)?,
        y      : parse_address(y)?,
        target : parse_natural(target)?
      }
    }
    (operation, operands) => {
      return Err(UrmError::ArityMismatch{ operation, given: operands.len() });
    }

  };

  Ok(Entry::Instruction{ index: counter.issue(), instruction })
}

fn parse_command(operation: Operation, operands: &[&str]) -> Result<Command, UrmError> {
  let command = match (operation, operands) {
    (Operation::RangeZero, [lo, hi]) => {
      Command::RangeZero{ lo: parse_address(lo)?, hi: parse_address(hi)? }
    }
    (Operation::RangeSet, [address, value]) => {
      Command::RangeSet{ address: parse_address(address)?, value: parse_value(value)? }
    }
    (Operation::BlockCopy, [from, to, len]) => {
      Command::BlockCopy{
        from : parse_address(from)?,
        to   : parse_address(to)?,
        len  : parse_natural(len)?
      }
    }
    (Operation::Dump, [lo, hi]) => {
      Command::Dump{ lo: parse_address(lo)?, hi: parse_address(hi)? }
    }
    (Operation::ListProgram, []) => Command::ListProgram,
    (Operation::RunProgram, [])  => Command::RunProgram,
    (operation, operands) => {
      return Err(UrmError::ArityMismatch{ operation, given: operands.len() });
    }
  };
  Ok(command)
}

/// Classifies a tokenized line, building its entry if it has one.
pub fn parse_line<'a>(tokens: &[&'a str], counter: &mut IndexCounter) -> Result<Line<'a>, UrmError> {
  let (name, operands) = match tokens.split_first() {
    Some((name, operands)) => (*name, operands),
    None                   => return Ok(Line::Blank)
  };
  let operation = parse_operation(name)?;

  match operation {

    Operation::Comment => Ok(Line::Blank),

    Operation::Quote => {
      match parse_line(operands, counter)? {
        Line::Blank                              => Ok(Line::Blank),
        Line::Entry(entry) | Line::Quoted(entry) => Ok(Line::Quoted(entry)),
        Line::Load(_)                            => Err(UrmError::NotAllowedInProgram(Operation::Load)),
        Line::Add(_)                             => Err(UrmError::NotAllowedInProgram(Operation::Add)),
        Line::Exit                               => Err(UrmError::NotAllowedInProgram(Operation::Exit)),
      }
    }

    Operation::Load | Operation::Add | Operation::Exit => {
      if !operation.accepts(operands.len()) {
        return Err(UrmError::ArityMismatch{ operation, given: operands.len() });
      }
      match (operation, operands) {
        (Operation::Load, [path]) => Ok(Line::Load(*path)),
        (Operation::Add, [path])  => Ok(Line::Add(*path)),
        _                         => Ok(Line::Exit)
      }
    }

    _ => parse_entry(operation, operands, counter).map(Line::Entry)

  }
}

/**
  Parses program text, one entry per line. Blank lines and comments are skipped, and quoted
  lines are stored like any other. Session commands are rejected.

  Parsing stops at the first bad line, and the error carries its 1-based line number.
*/
pub fn parse_program(text: &str, counter: &mut IndexCounter) -> Result<Vec<Entry>, UrmError> {
  let mut entries = Vec::new();

  for (number, line) in text.lines().enumerate() {
    #[cfg(feature = "trace_computation")] println!("{}", line);

    let tokens = tokenize(line);
    let parsed = parse_line(&tokens, counter).and_then(|parsed| {
      match parsed {
        Line::Blank                              => Ok(None),
        Line::Entry(entry) | Line::Quoted(entry) => Ok(Some(entry)),
        Line::Load(_)                            => Err(UrmError::NotAllowedInProgram(Operation::Load)),
        Line::Add(_)                             => Err(UrmError::NotAllowedInProgram(Operation::Add)),
        Line::Exit                               => Err(UrmError::NotAllowedInProgram(Operation::Exit)),
      }
    });

    match parsed {
      Ok(Some(entry)) => entries.push(entry),
      Ok(None)        => {}
      Err(e)          => {
        return Err(UrmError::OnLine{ line: number + 1, source: Box::new(e) });
      }
    }
  }

  Ok(entries)
}


#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn tokenize_whitespace(){
    assert_eq!(tokenize("INC 3"), vec!["INC", "3"]);
    assert_eq!(tokenize("  JUMP\t0  1 2 \r"), vec!["JUMP", "0", "1", "2"]);
    assert!(tokenize("").is_empty());
    assert!(tokenize("   \t ").is_empty());
  }

  #[test]
  fn operands(){
    assert_eq!(parse_natural("42").unwrap(), 42);
    assert!(matches!(parse_natural("-1"), Err(UrmError::MalformedOperand(_))));
    assert!(matches!(parse_natural("4a"), Err(UrmError::MalformedOperand(_))));
    assert!(matches!(parse_natural("99999999999999999999999999"), Err(UrmError::MalformedOperand(_))));
    assert_eq!(parse_value("-17").unwrap(), -17);
    assert_eq!(parse_value("8").unwrap(), 8);
    assert!(matches!(parse_value("--8"), Err(UrmError::MalformedOperand(_))));
  }

  #[test]
  fn instructions_take_indices_in_order(){
    let mut counter = IndexCounter::new();
    let inc = parse_line(&["INC", "3"], &mut counter).unwrap();
    let jump = parse_line(&["JUMP", "1", "2", "0"], &mut counter).unwrap();
    let zero = parse_line(&["/zero", "0", "5"], &mut counter).unwrap();

    assert_eq!(inc, Line::Entry(Entry::Instruction{ index: 0, instruction: Instruction::Inc(Address(3)) }));
    assert_eq!(
      jump,
      Line::Entry(Entry::Instruction{
        index: 1,
        instruction: Instruction::Jump{ x: Address(1), y: Address(2), target: 0 }
      })
    );
    assert_eq!(zero, Line::Entry(Entry::Command(Command::RangeZero{ lo: Address(0), hi: Address(5) })));
    assert_eq!(counter.issued(), 2);
  }

  #[test]
  fn short_jump_compares_register_zero(){
    let mut counter = IndexCounter::new();
    let line = parse_line(&["JUMP", "7"], &mut counter).unwrap();
    assert_eq!(
      line,
      Line::Entry(Entry::Instruction{
        index: 0,
        instruction: Instruction::Jump{ x: Address(0), y: Address(0), target: 7 }
      })
    );
  }

  #[test]
  fn rejected_lines_take_no_index(){
    let mut counter = IndexCounter::new();
    assert!(matches!(
      parse_line(&["INC", "x"], &mut counter),
      Err(UrmError::MalformedOperand(_))
    ));
    assert!(matches!(
      parse_line(&["MOVE", "1"], &mut counter),
      Err(UrmError::ArityMismatch{ operation: Operation::Move, given: 1 })
    ));
    assert!(matches!(
      parse_line(&["JUMP", "1", "2"], &mut counter),
      Err(UrmError::ArityMismatch{ operation: Operation::Jump, given: 2 })
    ));
    assert!(matches!(
      parse_line(&["FROB", "1"], &mut counter),
      Err(UrmError::UnknownCommand(_))
    ));
    assert!(matches!(
      parse_line(&["/code", "1"], &mut counter),
      Err(UrmError::ArityMismatch{ .. })
    ));
    assert_eq!(counter.issued(), 0);
  }

  #[test]
  fn session_lines(){
    let mut counter = IndexCounter::new();
    assert_eq!(parse_line(&["/load", "a.urm"], &mut counter).unwrap(), Line::Load("a.urm"));
    assert_eq!(parse_line(&["/add", "b.urm"], &mut counter).unwrap(), Line::Add("b.urm"));
    assert_eq!(parse_line(&["/exit"], &mut counter).unwrap(), Line::Exit);
    assert_eq!(parse_line(&["/comment", "anything", "at", "all"], &mut counter).unwrap(), Line::Blank);
    assert_eq!(parse_line(&[], &mut counter).unwrap(), Line::Blank);
    assert!(matches!(
      parse_line(&["/load"], &mut counter),
      Err(UrmError::ArityMismatch{ operation: Operation::Load, given: 0 })
    ));
  }

  #[test]
  fn quote(){
    let mut counter = IndexCounter::new();
    assert_eq!(
      parse_line(&["/quote", "/quote", "INC", "0"], &mut counter).unwrap(),
      Line::Quoted(Entry::Instruction{ index: 0, instruction: Instruction::Inc(Address(0)) })
    );
    assert_eq!(
      parse_line(&["/quote", "/run"], &mut counter).unwrap(),
      Line::Quoted(Entry::Command(Command::RunProgram))
    );
    assert_eq!(parse_line(&["/quote"], &mut counter).unwrap(), Line::Blank);
    assert!(matches!(
      parse_line(&["/quote", "/load", "x"], &mut counter),
      Err(UrmError::NotAllowedInProgram(Operation::Load))
    ));
  }

  #[test]
  fn program_text(){
    let mut counter = IndexCounter::new();
    let text = "/set 0 5\n\nINC 0\n/comment adds one\n  /quote ZERO 1\nJUMP 0 0 0\n";
    let entries = parse_program(text, &mut counter).unwrap();
    let listing: Vec<String> = entries.iter().map(Entry::to_string).collect();
    assert_eq!(listing, vec!["/set 0 5", "INC 0", "ZERO 1", "JUMP 0 0 0"]);
    assert_eq!(entries[1].index(), Some(0));
    assert_eq!(entries[3].index(), Some(2));
  }

  #[test]
  fn program_text_reports_bad_line(){
    let mut counter = IndexCounter::new();
    let result = parse_program("INC 0\nINC zero\nINC 1\n", &mut counter);
    match result {
      Err(UrmError::OnLine{ line, source }) => {
        assert_eq!(line, 2);
        assert!(matches!(*source, UrmError::MalformedOperand(_)));
      }
      other => panic!("unexpected result: {:?}", other)
    }

    let result = parse_program("INC 0\n/exit\n", &mut counter);
    assert!(matches!(result, Err(UrmError::OnLine{ line: 2, .. })));
  }
}
