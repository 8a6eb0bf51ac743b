use strum_macros::{Display as StrumDisplay, EnumString};
use num_enum::IntoPrimitive;

/**
  Every operation name the interpreter recognizes, with its textual form.

  The operations fall into three families, and the order they are listed below is
  significant: a given operation's family is determined with a trivial comparison of its code.
    1. Instructions, which consume an instruction index and may be jumped to.
    2. Program commands, which may be stored in a program but carry no instruction index.
    3. Session commands, which only make sense at the interactive prompt.
  Order-dependencies:
      ```
      Operation::is_instruction()
      Operation::is_program_entry()
      ```
*/
#[derive(
  StrumDisplay, EnumString, IntoPrimitive,
  Clone,        Copy,       Eq, PartialEq, Debug, Hash
)]
#[repr(u8)]
pub enum Operation {
  // Instructions //
  #[strum(to_string = "INC")]      Inc,          // INC r
  #[strum(to_string = "ZERO")]     Zero,         // ZERO r
  #[strum(to_string = "MOVE")]     Move,         // MOVE from to
  #[strum(to_string = "JUMP")]     Jump,         // JUMP target | JUMP x y target
  // Opcode 4

  // Program commands //
  #[strum(to_string = "/zero")]    RangeZero,    // /zero lo hi
  #[strum(to_string = "/set")]     RangeSet,     // /set address value
  #[strum(to_string = "/copy")]    BlockCopy,    // /copy from to len
  #[strum(to_string = "/mem")]     Dump,         // /mem lo hi
  #[strum(to_string = "/code")]    ListProgram,  // /code
  #[strum(to_string = "/run")]     RunProgram,   // /run
  // Opcode 10

  // Session commands //
  #[strum(to_string = "/load")]    Load,         // /load path
  #[strum(to_string = "/add")]     Add,          // /add path
  #[strum(to_string = "/quote")]   Quote,        // /quote <line>
  #[strum(to_string = "/comment")] Comment,      // /comment ...
  #[strum(to_string = "/exit")]    Exit,         // /exit
}

pub const MAX_INSTRUCTION_OPCODE: u8 = 4u8;
pub const MAX_PROGRAM_OPCODE: u8 = 10u8;

impl Operation {
  pub fn code(&self) -> u8 {
    Into::<u8>::into(*self)
  }

  pub fn is_instruction(&self) -> bool {
    self.code() < MAX_INSTRUCTION_OPCODE
  }

  /// Whether the operation can be stored in a program, as either an instruction or a command.
  pub fn is_program_entry(&self) -> bool {
    self.code() < MAX_PROGRAM_OPCODE
  }

  /// The accepted operand counts. An empty slice means any number of operands is accepted.
  pub fn arities(&self) -> &'static [usize] {
    match self {
      Operation::Inc
      | Operation::Zero
      | Operation::Load
      | Operation::Add           => &[1],

      Operation::Move
      | Operation::RangeZero
      | Operation::RangeSet
      | Operation::Dump          => &[2],

      Operation::BlockCopy       => &[3],

      Operation::Jump            => &[1, 3],

      Operation::ListProgram
      | Operation::RunProgram
      | Operation::Exit          => &[0],

      Operation::Quote
      | Operation::Comment       => &[],
    }
  }

  pub fn accepts(&self, operand_count: usize) -> bool {
    let arities = self.arities();
    arities.is_empty() || arities.contains(&operand_count)
  }

  /// Human readable list of accepted operand counts, e.g. `1 or 3`.
  pub fn arity_text(&self) -> String {
    match self.arities() {
      [] => "any number of".to_string(),
      arities => {
        arities.iter()
               .map(usize::to_string)
               .collect::<Vec<String>>()
               .join(" or ")
      }
    }
  }
}
