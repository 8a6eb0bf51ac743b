//! The instruction index sequence. Every instruction constructed takes the next index, and the
//! sequence is not restarted when a machine is erased, so indices keep increasing across loads
//! and merges.

use super::entry::InstructionIndex;

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct IndexCounter {
  next: InstructionIndex
}

impl IndexCounter {

  pub fn new() -> IndexCounter {
    IndexCounter { next: 0 }
  }

  #[cfg(test)]
  pub fn starting_at(next: InstructionIndex) -> IndexCounter {
    IndexCounter { next }
  }

  /// Takes the next index.
  pub fn issue(&mut self) -> InstructionIndex {
    let index = self.next;
    self.next += 1;
    index
  }

  /// The number of indices issued so far, which is also the next index to be issued.
  pub fn issued(&self) -> InstructionIndex {
    self.next
  }

  pub fn is_issued(&self, index: InstructionIndex) -> bool {
    index < self.next
  }

  /// Makes sure `index` counts as issued.
  pub fn advance_past(&mut self, index: InstructionIndex) {
    self.next = self.next.max(index + 1);
  }

  /// Takes over every index `other` has issued.
  pub fn absorb(&mut self, other: &IndexCounter) {
    self.next = self.next.max(other.next);
  }
}


#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn issues_in_order(){
    let mut counter = IndexCounter::new();
    assert_eq!(counter.issue(), 0);
    assert_eq!(counter.issue(), 1);
    assert_eq!(counter.issued(), 2);
    assert!(counter.is_issued(1));
    assert!(!counter.is_issued(2));
  }

  #[test]
  fn advance_never_goes_back(){
    let mut counter = IndexCounter::starting_at(5);
    counter.advance_past(2);
    assert_eq!(counter.issued(), 5);
    counter.advance_past(9);
    assert_eq!(counter.issued(), 10);
    counter.absorb(&IndexCounter::starting_at(7));
    assert_eq!(counter.issued(), 10);
    assert_eq!(counter.issue(), 10);
  }
}
