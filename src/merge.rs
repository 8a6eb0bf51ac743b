/*!
  Splices one machine's program in front of another's.

  Given a `base` machine and an `incoming` machine, the merged machine runs `incoming`'s
  program followed by `base`'s, and the two register spaces sit side by side:

    * Registers. `shift` is one past the highest register address in `incoming`'s store
      (zero if that store is empty). `incoming`'s registers keep their addresses in
      `[0, shift)`, and every register of `base` moves from `a` to `a + shift`. Register
      operands of `base`'s entries move with them.
    * Instruction indices. With `n` instructions in `incoming`, `incoming`'s instructions are
      numbered from where `base`'s numbering used to start, and every instruction of `base` has
      its index raised by `n`. Jump targets are rewritten through the renumbering of the
      program they belong to.

  When `incoming`'s store is empty, `shift` is zero and `base`'s registers stay where they are.
  That is accepted even though `incoming`'s register operands then name the same registers as
  `base`'s: a program added with `/add` has an empty store, and its `INC 0` increments the
  register `base` calls 0. The two programs share those registers.

  A shift that would move a register or an operand past the last address fails the merge with
  `AddressOverflow`, and `base` is left as it was.
*/

use std::collections::HashMap;

use crate::address::AddressNumberType;
use crate::error::UrmError;
use crate::machine::Machine;
use crate::program::{Entry, InstructionIndex};

/// Merges `incoming` into `base`, in place. `incoming`'s program ends up first.
pub fn merge(base: &mut Machine, incoming: Machine) -> Result<(), UrmError> {
  let Machine{ program: incoming_program, registers: incoming_registers, counter: incoming_counter, .. }
    = incoming;

  let shift: AddressNumberType = match incoming_registers.max_address() {
    Some(highest) => highest.offset(1)?.idx(),
    None          => 0
  };

  // Old index -> new index, separately for each program, as the two may have been numbered
  // by different counters.
  let incoming_indices: Vec<InstructionIndex> = incoming_program.iter()
                                                                .filter_map(Entry::index)
                                                                .collect();
  let base_indices: Vec<InstructionIndex> = base.program.iter()
                                                        .filter_map(Entry::index)
                                                        .collect();
  let n = incoming_indices.len();
  let first = base_indices.first()
                          .or_else(|| incoming_indices.first())
                          .copied()
                          .unwrap_or(0);

  let incoming_renumbering: HashMap<InstructionIndex, InstructionIndex> =
    incoming_indices.iter()
                    .enumerate()
                    .map(|(k, old)| (*old, first + k))
                    .collect();
  let base_renumbering: HashMap<InstructionIndex, InstructionIndex> =
    base_indices.iter()
                .map(|old| (*old, old + n))
                .collect();

  // Everything that can fail happens before `base` is touched.
  let mut program: Vec<Entry> = incoming_program.into_iter()
                                                .map(|entry| entry.renumbered(0, &incoming_renumbering))
                                                .collect::<Result<_, _>>()?;
  for entry in &base.program {
    program.push(entry.renumbered(shift, &base_renumbering)?);
  }
  base.registers.relocate(shift)?;

  base.registers.absorb(incoming_registers);

  base.counter.absorb(&incoming_counter);
  if let Some(last) = program.iter().filter_map(Entry::index).max() {
    base.counter.advance_past(last);
  }

  #[cfg(feature = "trace_computation")]
  println!("Merged {} instructions in front, registers shifted by {}", n, shift);

  base.program = program;
  Ok(())
}
