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

use crate::transaction::Transaction;

/// Stack divided in segments by marks. Only the top segment (the items pushed since the
/// innermost mark) can be popped; `reset` discards it and `release` merges it into the segment
/// below. It maps directly onto a nested transaction: `begin` is `mark`, `commit` is `release`
/// and `rollback` is `reset`.
#[derive(Clone, Debug, PartialEq)]
pub struct LocalStack<T>
{
  items: Vec<T>,
  marks: Vec<usize>
}

impl<T> LocalStack<T>
{
  pub fn new() -> LocalStack<T> {
    LocalStack {
      items: vec![],
      marks: vec![]
    }
  }

  fn floor(&self) -> usize {
    self.marks.last().cloned().unwrap_or(0)
  }

  pub fn push(&mut self, item: T) {
    self.items.push(item);
  }

  pub fn push_all<I>(&mut self, items: I) where
   I: IntoIterator<Item=T>
  {
    self.items.extend(items);
  }

  /// Pops the last item of the top segment.
  pub fn pop(&mut self) -> Option<T> {
    if self.items.len() > self.floor() {
      self.items.pop()
    }
    else {
      None
    }
  }

  /// Removes the whole top segment, in push order.
  pub fn pop_all(&mut self) -> Vec<T> {
    let floor = self.floor();
    self.items.split_off(floor)
  }

  pub fn peek(&self) -> Option<&T> {
    self.segment().last()
  }

  pub fn peek_mut(&mut self) -> Option<&mut T> {
    let floor = self.floor();
    self.items[floor..].last_mut()
  }

  /// Items pushed since the innermost mark.
  pub fn segment(&self) -> &[T] {
    &self.items[self.floor()..]
  }

  /// Number of items in the top segment.
  pub fn len(&self) -> usize {
    self.items.len() - self.floor()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// All items of all segments, bottom first.
  pub fn all(&self) -> &[T] {
    &self.items
  }

  pub fn depth(&self) -> usize {
    self.marks.len()
  }

  pub fn mark(&mut self) {
    self.marks.push(self.items.len());
  }

  /// Merges the top segment into the one below. Returns `false` without a mark.
  pub fn release(&mut self) -> bool {
    self.marks.pop().is_some()
  }

  /// Discards the top segment. Returns `false` without a mark.
  pub fn reset(&mut self) -> bool {
    match self.marks.pop() {
      Some(floor) => {
        self.items.truncate(floor);
        true
      }
      None => false
    }
  }

  pub fn clear(&mut self) {
    self.items.clear();
    self.marks.clear();
  }
}

impl<T: Clone> LocalStack<T>
{
  /// Copy of the top segment.
  pub fn snapshot(&self) -> Vec<T> {
    self.segment().to_vec()
  }
}

impl<T> Default for LocalStack<T>
{
  fn default() -> Self {
    LocalStack::new()
  }
}

/// Every committed item stays on the stack, a rolled back transaction pops its items.
impl<T: Clone> Transaction for LocalStack<T>
{
  type Snapshot = Vec<T>;

  fn begin(&mut self) {
    self.mark();
  }

  fn commit(&mut self) {
    self.release();
  }

  fn rollback(&mut self) {
    self.reset();
  }

  fn save(&mut self) -> Option<Vec<T>> {
    Some(self.snapshot())
  }

  fn load(&mut self, snapshot: &Vec<T>) {
    self.push_all(snapshot.iter().cloned());
  }

  fn is_memoable(&self) -> bool {
    true
  }
}
