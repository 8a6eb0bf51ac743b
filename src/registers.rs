/*!
  The register store of the machine: a sparse map from register address to value. Registers
  that have never been written read as zero, so the store only holds the registers a program
  has actually touched.
*/

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use prettytable::{format as TableFormat, Table};

use crate::address::{Address, AddressNumberType};
use crate::error::UrmError;

/// The contents of a single register.
pub type Value = i64;

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RegisterStore {
  cells: BTreeMap<Address, Value>
}

impl RegisterStore {

  pub fn new() -> RegisterStore {
    RegisterStore {
      cells: BTreeMap::new()
    }
  }

  /// Reads a register. Absent registers read as zero.
  pub fn get(&self, address: Address) -> Value {
    self.cells.get(&address).copied().unwrap_or(0)
  }

  pub fn set(&mut self, address: Address, value: Value) {
    self.cells.insert(address, value);
  }

  /// Adds one to the register, creating it at zero first if it is absent. Wraps at `Value::MAX`.
  pub fn increment(&mut self, address: Address) {
    let cell = self.cells.entry(address).or_insert(0);
    *cell = cell.wrapping_add(1);
  }

  /// Sets every register in `[lo, hi]` to zero. An empty range (`lo > hi`) does nothing.
  pub fn range_zero(&mut self, lo: Address, hi: Address) {
    for idx in lo.idx()..=hi.idx() {
      self.set(Address(idx), 0);
    }
  }

  /**
    Copies `len` consecutive registers starting at `from` into the registers starting at `to`.

    The copy is a forward scalar copy: register `from + i` is read only after registers
    `to..to + i` have been written. When the ranges overlap with `to > from`, later reads see
    earlier writes, so `[1, 2, 3]` copied from 0 to 1 becomes `[1, 1, 1, 1]`.

    Both ranges must lie inside the address space; otherwise nothing is copied.
  */
  pub fn block_copy(&mut self, from: Address, to: Address, len: AddressNumberType)
    -> Result<(), UrmError>
  {
    if len == 0 {
      return Ok(());
    }
    from.offset(len - 1)?;
    to.offset(len - 1)?;

    for i in 0..len {
      let value = self.get(from.offset(i)?);
      self.set(to.offset(i)?, value);
    }
    Ok(())
  }

  pub fn clear(&mut self) {
    self.cells.clear();
  }

  #[cfg(test)]
  pub fn is_empty(&self) -> bool {
    self.cells.is_empty()
  }

  #[cfg(test)]
  pub fn len(&self) -> usize {
    self.cells.len()
  }

  /// The highest address present in the store, if any.
  pub fn max_address(&self) -> Option<Address> {
    self.cells.keys().next_back().copied()
  }

  /// Moves every register `a` to `a + shift`. Fails, leaving the store as it was, if the
  /// highest register would move out of the address space.
  pub fn relocate(&mut self, shift: AddressNumberType) -> Result<(), UrmError> {
    if shift == 0 {
      return Ok(());
    }
    if let Some(highest) = self.max_address() {
      highest.offset(shift)?;
    }

    let cells = std::mem::take(&mut self.cells);
    self.cells = cells.into_iter()
                      .map(|(address, value)| (Address(address.idx() + shift), value))
                      .collect();
    Ok(())
  }

  /// Inserts every register of `other`, overwriting registers present in both.
  pub fn absorb(&mut self, other: RegisterStore) {
    self.cells.extend(other.cells);
  }

  /// Present registers in ascending address order.
  pub fn iter(&self) -> impl Iterator<Item = (Address, Value)> + '_ {
    self.cells.iter().map(|(address, value)| (*address, *value))
  }

  // region Display methods

  pub fn make_register_table(&self) -> Table {
    let mut table = Table::new();

    table.set_format(*TABLE_DISPLAY_FORMAT);
    table.set_titles(row![ubr->"Address", ubl->"Contents"]);

    for (address, value) in self.iter() {
      table.add_row(row![r->format!("R[{}] =", address), value.to_string()]);
    }
    table
  }

  // endregion

}


lazy_static! {
  pub static ref TABLE_DISPLAY_FORMAT: TableFormat::TableFormat =
    TableFormat::FormatBuilder::new()
      .column_separator('│')
      .borders(' ')
      .separator(
        TableFormat::LinePosition::Title,
        TableFormat::LineSeparator::new('─', '┼', ' ', ' ')
      )
      .separator(
        TableFormat::LinePosition::Bottom,
        TableFormat::LineSeparator::new('─', '┴', ' ', ' ')
      )
      .padding(1, 1)
      .build();
}

impl Display for RegisterStore {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.make_register_table())
  }
}


#[cfg(test)]
mod tests {
  use super::*;

  fn store_of(values: &[Value]) -> RegisterStore {
    let mut store = RegisterStore::new();
    for (i, value) in values.iter().enumerate() {
      store.set(Address(i), *value);
    }
    store
  }

  fn read(store: &RegisterStore, len: usize) -> Vec<Value> {
    (0..len).map(|i| store.get(Address(i))).collect()
  }

  #[test]
  fn unset_reads_zero(){
    let store = RegisterStore::new();
    assert_eq!(store.get(Address(0)), 0);
    assert_eq!(store.get(Address(123456789)), 0);
    assert!(store.is_empty());
  }

  #[test]
  fn increment_twice_then_zero(){
    let mut store = RegisterStore::new();
    store.increment(Address(4));
    store.increment(Address(4));
    assert_eq!(store.get(Address(4)), 2);
    store.set(Address(4), 0);
    assert_eq!(store.get(Address(4)), 0);
  }

  #[test]
  fn range_zero_is_inclusive_and_exact(){
    let mut store = store_of(&[1, 2, 3, 4, 5]);
    store.range_zero(Address(1), Address(3));
    assert_eq!(read(&store, 5), vec![1, 0, 0, 0, 5]);
  }

  #[test]
  fn range_zero_empty_range(){
    let mut store = store_of(&[1, 2, 3]);
    store.range_zero(Address(2), Address(1));
    assert_eq!(read(&store, 3), vec![1, 2, 3]);
  }

  #[test]
  fn block_copy_forward_overlap(){
    // Each write is visible to the next read.
    let mut store = store_of(&[1, 2, 3]);
    store.block_copy(Address(0), Address(1), 3).unwrap();
    assert_eq!(read(&store, 4), vec![1, 1, 1, 1]);
  }

  #[test]
  fn block_copy_backward_overlap(){
    let mut store = store_of(&[1, 2, 3, 4]);
    store.block_copy(Address(1), Address(0), 3).unwrap();
    assert_eq!(read(&store, 4), vec![2, 3, 4, 4]);
  }

  #[test]
  fn block_copy_disjoint(){
    let mut store = store_of(&[7, 8]);
    store.block_copy(Address(0), Address(10), 2).unwrap();
    assert_eq!(store.get(Address(10)), 7);
    assert_eq!(store.get(Address(11)), 8);
    assert_eq!(read(&store, 2), vec![7, 8]);
  }

  #[test]
  fn block_copy_out_of_range_copies_nothing(){
    let mut store = store_of(&[1, 2]);
    assert!(matches!(
      store.block_copy(Address(usize::MAX), Address(0), 2),
      Err(UrmError::AddressOverflow{ .. })
    ));
    assert!(matches!(
      store.block_copy(Address(0), Address(usize::MAX - 1), 3),
      Err(UrmError::AddressOverflow{ .. })
    ));
    assert_eq!(read(&store, 2), vec![1, 2]);
    assert_eq!(store.len(), 2);

    // The last register itself is reachable.
    store.block_copy(Address(1), Address(usize::MAX), 1).unwrap();
    assert_eq!(store.get(Address(usize::MAX)), 2);
  }

  #[test]
  fn relocate_out_of_range_keeps_store(){
    let mut store = store_of(&[4]);
    store.set(Address(usize::MAX - 1), 8);
    assert!(matches!(store.relocate(2), Err(UrmError::AddressOverflow{ .. })));
    assert_eq!(store.get(Address(0)), 4);
    assert_eq!(store.get(Address(usize::MAX - 1)), 8);
    store.relocate(1).unwrap();
    assert_eq!(store.get(Address(usize::MAX)), 8);
  }

  #[test]
  fn relocate_and_absorb(){
    let mut base = store_of(&[5, 6]);
    base.relocate(3).unwrap();
    assert_eq!(base.get(Address(0)), 0);
    assert_eq!(base.get(Address(3)), 5);
    assert_eq!(base.get(Address(4)), 6);

    let mut incoming = RegisterStore::new();
    incoming.set(Address(2), 9);
    base.absorb(incoming);
    assert_eq!(base.get(Address(2)), 9);
    assert_eq!(base.max_address(), Some(Address(4)));
    assert_eq!(base.len(), 3);
  }

  #[test]
  fn table_lists_registers(){
    let store = store_of(&[11, 22]);
    let text = format!("{}", store);
    assert!(text.contains("R[0] ="));
    assert!(text.contains("22"));
  }
}
