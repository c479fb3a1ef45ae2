// Copyright 2017 Pierre Talbot (IRCAM)

// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at

//     http://www.apache.org/licenses/LICENSE-2.0

// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Nested transactions over the host state and the memoization table.

use std::collections::HashMap;

/// Nested-commit protocol implemented by the host state mutated by semantic actions.
///
/// `begin` opens a scope, `commit` folds the changes of the innermost scope into its parent and
/// `rollback` discards them. Scopes are opened and closed in a strict stack discipline by the
/// recognizer.
///
/// `save` and `load` support memoization: `save` returns what changed in the current scope
/// (`None` when nothing changed) and `load` reapplies such a snapshot in the current scope. A
/// transaction must declare itself memoable, otherwise memoized references are evaluated like
/// plain references.
pub trait Transaction
{
  type Snapshot;

  fn begin(&mut self);
  fn commit(&mut self);
  fn rollback(&mut self);

  fn save(&mut self) -> Option<Self::Snapshot> {
    None
  }

  fn load(&mut self, _snapshot: &Self::Snapshot) {}

  fn is_memoable(&self) -> bool {
    false
  }
}

/// Transaction of a host without state. Memoization only needs the consumed lengths.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Stateless;

impl Transaction for Stateless
{
  type Snapshot = ();
  fn begin(&mut self) {}
  fn commit(&mut self) {}
  fn rollback(&mut self) {}
  fn is_memoable(&self) -> bool { true }
}

impl Transaction for ()
{
  type Snapshot = ();
  fn begin(&mut self) {}
  fn commit(&mut self) {}
  fn rollback(&mut self) {}
  fn is_memoable(&self) -> bool { true }
}

/// Key of a memoized result: the production ordinal in the high half, the start offset in the
/// low half.
pub fn memo_key(production: usize, offset: usize) -> u64 {
  ((production as u64) << 32) | (offset as u64 & 0xFFFF_FFFF)
}

/// Successful reduction of a production at some offset.
#[derive(Clone, Debug, PartialEq)]
pub struct Memo<S>
{
  pub length: usize,
  pub snapshot: Option<S>
}

/// Cache of successful reductions keyed by `memo_key`. It lives as long as one recognition.
#[derive(Debug)]
pub struct MemoTable<S>
{
  entries: HashMap<u64, Memo<S>>
}

impl<S> MemoTable<S>
{
  pub fn new() -> Self {
    MemoTable {
      entries: HashMap::new()
    }
  }

  pub fn get(&self, production: usize, offset: usize) -> Option<&Memo<S>> {
    self.entries.get(&memo_key(production, offset))
  }

  pub fn store(&mut self, production: usize, offset: usize, length: usize, snapshot: Option<S>) {
    self.entries.insert(memo_key(production, offset), Memo {
      length: length,
      snapshot: snapshot
    });
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  pub fn clear(&mut self) {
    self.entries.clear();
  }
}

impl<S> Default for MemoTable<S>
{
  fn default() -> Self {
    MemoTable::new()
  }
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn test_memo_key_layout() {
    assert_eq!(memo_key(0, 7), 7);
    assert_eq!(memo_key(1, 0), 1 << 32);
    assert!(memo_key(1, 5) != memo_key(5, 1));
  }

  #[test]
  fn test_memo_table() {
    let mut table: MemoTable<Vec<i32>> = MemoTable::new();
    assert!(table.get(2, 10).is_none());
    table.store(2, 10, 3, Some(vec![1]));
    table.store(2, 11, 0, None);
    assert_eq!(table.len(), 2);
    let memo = table.get(2, 10).cloned();
    assert_eq!(memo, Some(Memo { length: 3, snapshot: Some(vec![1]) }));
    assert!(table.get(3, 10).is_none());
  }

  #[test]
  fn test_stateless_is_memoable() {
    let mut tx = Stateless;
    tx.begin();
    assert!(tx.save().is_none());
    tx.commit();
    assert!(tx.is_memoable());
  }
}
