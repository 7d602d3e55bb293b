//! Flat global symbol table.
//!
//! Entries are only ever appended, so a slot index handed out by
//! [`SymbolTable::add_global`] stays valid for the whole compilation.

use snafu::ensure;

use crate::error::{CompileResult, SymbolTableFullSnafu};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
  pub name: String,
}

#[derive(Debug, Clone)]
pub struct SymbolTable {
  entries: Vec<Symbol>,
  capacity: usize,
}

impl SymbolTable {
  pub fn new(capacity: usize) -> Self {
    Self {
      entries: Vec::new(),
      capacity,
    }
  }

  /// Append `name` and return its slot. Re-declaring a name adds a second
  /// entry; lookups keep resolving to the first one.
  pub fn add_global(&mut self, name: &str, line: usize) -> CompileResult<usize> {
    ensure!(
      self.entries.len() < self.capacity,
      SymbolTableFullSnafu {
        line,
        capacity: self.capacity,
      }
    );
    self.entries.push(Symbol {
      name: name.to_string(),
    });
    Ok(self.entries.len() - 1)
  }

  /// Slot of the first entry called `name`.
  pub fn find_global(&self, name: &str) -> Option<usize> {
    self.entries.iter().position(|symbol| symbol.name == name)
  }

  pub fn name(&self, slot: usize) -> Option<&str> {
    self.entries.get(slot).map(|symbol| symbol.name.as_str())
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::error::CompileError;

  #[test]
  fn test_slots_are_insertion_ordered() {
    let mut table = SymbolTable::new(8);
    assert_eq!(table.add_global("a", 1).unwrap(), 0);
    assert_eq!(table.add_global("b", 1).unwrap(), 1);
    assert_eq!(table.find_global("b"), Some(1));
    assert_eq!(table.name(0), Some("a"));
    assert_eq!(table.len(), 2);
  }

  #[test]
  fn test_lookup_is_stable() {
    let mut table = SymbolTable::new(8);
    let slot = table.add_global("x", 1).unwrap();
    assert_eq!(table.find_global("x"), Some(slot));
    assert_eq!(table.find_global("x"), Some(slot));
  }

  #[test]
  fn test_missing_name() {
    let table = SymbolTable::new(8);
    assert!(table.is_empty());
    assert_eq!(table.find_global("nope"), None);
  }

  #[test]
  fn test_redeclaration_appends_and_first_wins() {
    let mut table = SymbolTable::new(8);
    let first = table.add_global("x", 1).unwrap();
    let second = table.add_global("x", 2).unwrap();
    assert_ne!(first, second);
    assert_eq!(table.find_global("x"), Some(first));
  }

  #[test]
  fn test_capacity() {
    let mut table = SymbolTable::new(1);
    table.add_global("a", 1).unwrap();
    let err = table.add_global("b", 4).unwrap_err();
    assert!(matches!(
      err,
      CompileError::SymbolTableFull {
        line: 4,
        capacity: 1
      }
    ));
  }
}
