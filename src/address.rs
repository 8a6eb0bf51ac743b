//! Register addresses. The machine has an unbounded number of registers, so an address is any
//! natural number. Merging two programs relocates addresses by adding an offset, and an offset
//! that would leave the address space is an error rather than a wrap.

use std::fmt::{Display, Formatter};

use crate::error::UrmError;

// `AddressNumberType` is `usize`, as it is naturally an index into the register space.
pub type AddressNumberType = usize;

#[derive(Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug, Default)]
pub struct Address(pub AddressNumberType);

impl Address {
  /// Converts the address to a plain index.
  pub fn idx(&self) -> AddressNumberType {
    self.0
  }

  /// The address `offset` registers after this one.
  pub fn offset(&self, offset: AddressNumberType) -> Result<Address, UrmError> {
    self.0
        .checked_add(offset)
        .map(Address)
        .ok_or(UrmError::AddressOverflow{ address: *self, offset })
  }
}

// The canonical text form of an address is the bare number, as in `INC 3`.
impl Display for Address{
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.0)
  }
}
