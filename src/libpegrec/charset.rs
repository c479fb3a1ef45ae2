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

//! Sets of characters as sorted lists of disjoint intervals.

use crate::display::escape_char;
use std::fmt::{Formatter, Display, Error};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CharacterInterval
{
  pub lo: char,
  pub hi: char
}

impl CharacterInterval
{
  /// Bounds given in the wrong order are swapped.
  pub fn new(lo: char, hi: char) -> CharacterInterval {
    if lo <= hi {
      CharacterInterval { lo: lo, hi: hi }
    }
    else {
      CharacterInterval { lo: hi, hi: lo }
    }
  }

  pub fn single(c: char) -> CharacterInterval {
    CharacterInterval::new(c, c)
  }

  pub fn contains(&self, c: char) -> bool {
    self.lo <= c && c <= self.hi
  }
}

impl Display for CharacterInterval
{
  fn fmt(&self, formatter: &mut Formatter) -> Result<(), Error> {
    if self.lo == self.hi {
      write!(formatter, "'{}'", escape_char(self.lo, '\''))
    }
    else {
      write!(formatter, "'{}'-'{}'", escape_char(self.lo, '\''), escape_char(self.hi, '\''))
    }
  }
}

/// Successor in the scalar value space, jumping over the surrogate block.
fn succ(c: char) -> Option<char> {
  match c as u32 {
    0xD7FF => Some('\u{E000}'),
    n => char::from_u32(n + 1)
  }
}

fn pred(c: char) -> Option<char> {
  match c as u32 {
    0 => None,
    0xE000 => Some('\u{D7FF}'),
    n => char::from_u32(n - 1)
  }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct CharSet
{
  intervals: Vec<CharacterInterval>
}

impl CharSet
{
  pub fn new() -> CharSet {
    CharSet::default()
  }

  pub fn whole() -> CharSet {
    CharSet {
      intervals: vec![CharacterInterval::new('\0', char::MAX)]
    }
  }

  pub fn from_intervals<I>(intervals: I) -> CharSet where
   I: IntoIterator<Item=CharacterInterval>
  {
    let mut set = CharSet {
      intervals: intervals.into_iter().collect()
    };
    set.normalize();
    set
  }

  pub fn add(&mut self, interval: CharacterInterval) {
    self.intervals.push(interval);
    self.normalize();
  }

  pub fn add_char(&mut self, c: char) {
    self.add(CharacterInterval::single(c));
  }

  pub fn union(&self, other: &CharSet) -> CharSet {
    CharSet::from_intervals(self.intervals.iter().chain(other.intervals.iter()).cloned())
  }

  /// Complement over all Unicode scalar values.
  pub fn inverse(&self) -> CharSet {
    let mut intervals = vec![];
    let mut next = Some('\0');
    for interval in &self.intervals {
      if let Some(lo) = next {
        if lo < interval.lo {
          if let Some(hi) = pred(interval.lo) {
            intervals.push(CharacterInterval::new(lo, hi));
          }
        }
      }
      next = succ(interval.hi);
    }
    if let Some(lo) = next {
      intervals.push(CharacterInterval::new(lo, char::MAX));
    }
    CharSet {
      intervals: intervals
    }
  }

  pub fn contains(&self, c: char) -> bool {
    self.intervals
      .binary_search_by(|interval| {
        if interval.hi < c { std::cmp::Ordering::Less }
        else if interval.lo > c { std::cmp::Ordering::Greater }
        else { std::cmp::Ordering::Equal }
      })
      .is_ok()
  }

  pub fn intervals(&self) -> &[CharacterInterval] {
    &self.intervals
  }

  pub fn interval_count(&self) -> usize {
    self.intervals.len()
  }

  pub fn is_empty(&self) -> bool {
    self.intervals.is_empty()
  }

  pub fn is_whole(&self) -> bool {
    *self == CharSet::whole()
  }

  /// The only character of the set if it has exactly one.
  pub fn single_char(&self) -> Option<char> {
    match self.intervals.as_slice() {
      [interval] if interval.lo == interval.hi => Some(interval.lo),
      _ => None
    }
  }

  fn normalize(&mut self) {
    self.intervals.sort();
    let mut merged: Vec<CharacterInterval> = Vec::with_capacity(self.intervals.len());
    for interval in self.intervals.drain(..) {
      match merged.last_mut() {
        Some(last) if succ(last.hi).map_or(true, |next| interval.lo <= next) => {
          if interval.hi > last.hi {
            last.hi = interval.hi;
          }
        }
        _ => merged.push(interval)
      }
    }
    self.intervals = merged;
  }
}

impl CharSet
{
  fn fmt_intervals(&self, formatter: &mut Formatter) -> Result<(), Error> {
    formatter.write_str("[")?;
    for (i, interval) in self.intervals.iter().enumerate() {
      if i > 0 {
        formatter.write_str(", ")?;
      }
      interval.fmt(formatter)?;
    }
    formatter.write_str("]")
  }
}

/// A set reaching the last scalar value is displayed as the inverse of its complement.
impl Display for CharSet
{
  fn fmt(&self, formatter: &mut Formatter) -> Result<(), Error> {
    match self.intervals.last() {
      Some(interval) if interval.hi == char::MAX => {
        formatter.write_str("[~")?;
        self.inverse().fmt_intervals(formatter)?;
        formatter.write_str("]")
      }
      _ => self.fmt_intervals(formatter)
    }
  }
}
