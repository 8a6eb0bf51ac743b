/*!

  A program is an ordered sequence of entries. Entries come in two families:

    Instructions: INC, ZERO, MOVE, JUMP
    Commands:     /zero, /set, /copy, /mem, /code, /run

  Instructions are numbered by an instruction index drawn from an `IndexCounter` at the
  moment they are constructed, and a `JUMP` names its destination by that index. Commands
  are not numbered and cannot be jumped to. Session commands (`/load`, `/add`, `/quote`,
  `/comment`, `/exit`) are recognized by the parser but never become entries.

  Rather than a class per entry kind, an entry is a plain `Copy` enum, and the machine
  dispatches on it with a single `match`. Nothing in an entry points back at the machine
  executing it.

*/

mod counter;
mod entry;
mod operation;
mod parser;

pub use counter::IndexCounter;
pub use entry::{Command, Entry, Instruction, InstructionIndex};
pub use operation::Operation;
pub use parser::{parse_entry, parse_line, parse_program, tokenize, Line};
