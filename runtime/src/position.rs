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

use std::fmt::{Formatter, Display, Error};

/// A point in the logical character sequence of a stream. `offset` counts characters
/// (after newline normalization) from the beginning of the input, `line` and `column` start at 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position
{
  pub offset: usize,
  pub line: usize,
  pub column: usize
}

impl Position
{
  pub fn new(offset: usize, line: usize, column: usize) -> Position {
    Position {
      offset: offset,
      line: line,
      column: column
    }
  }

  pub fn origin() -> Position {
    Position::new(0, 1, 1)
  }

  /// Position reached after reading `c` from `self`.
  pub fn next(self, c: char) -> Position {
    if c == '\n' {
      Position::new(self.offset + 1, self.line + 1, 1)
    }
    else {
      Position::new(self.offset + 1, self.line, self.column + 1)
    }
  }
}

impl Default for Position
{
  fn default() -> Position {
    Position::origin()
  }
}

impl Display for Position
{
  fn fmt(&self, formatter: &mut Formatter) -> Result<(), Error> {
    write!(formatter, "{}:{}", self.line, self.column)
  }
}

/// Half-open range `[start, end)` of the input.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Span
{
  pub start: Position,
  pub end: Position
}

impl Span
{
  pub fn new(start: Position, end: Position) -> Span {
    Span {
      start: start,
      end: end
    }
  }

  pub fn len(&self) -> usize {
    self.end.offset.saturating_sub(self.start.offset)
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

impl Display for Span
{
  fn fmt(&self, formatter: &mut Formatter) -> Result<(), Error> {
    write!(formatter, "{}-{}", self.start, self.end)
  }
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn test_next_position() {
    let pos = Position::origin().next('a').next('b');
    assert_eq!(pos, Position::new(2, 1, 3));
    let pos = pos.next('\n');
    assert_eq!(pos, Position::new(3, 2, 1));
    assert_eq!(format!("{}", pos), "2:1");
  }

  #[test]
  fn test_span_len() {
    let span = Span::new(Position::new(2, 1, 3), Position::new(5, 2, 1));
    assert_eq!(span.len(), 3);
    assert!(!span.is_empty());
    assert_eq!(format!("{}", span), "1:3-2:1");
  }
}
