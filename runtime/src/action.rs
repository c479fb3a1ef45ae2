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

use crate::position::*;
use crate::stream::BacktrackingStream;

/// Text matched by the child of the semantic action being executed.
#[derive(Clone, Copy, Debug)]
pub struct ActionContext<'a>
{
  chars: &'a [char],
  span: Span
}

impl<'a> ActionContext<'a>
{
  /// Context covering the innermost mark of `stream` up to its current position.
  pub fn new(stream: &'a BacktrackingStream<'_>) -> ActionContext<'a> {
    ActionContext {
      chars: stream.chars(),
      span: stream.span()
    }
  }

  pub fn length(&self) -> usize {
    self.chars.len()
  }

  pub fn chars(&self) -> &'a [char] {
    self.chars
  }

  pub fn text(&self) -> String {
    self.chars.iter().collect()
  }

  pub fn start(&self) -> Position {
    self.span.start
  }

  pub fn end(&self) -> Position {
    self.span.end
  }

  pub fn span(&self) -> Span {
    self.span
  }
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn test_context_of_marked_text() {
    let mut stream = BacktrackingStream::from_str("let x");
    stream.skip(4);
    stream.mark();
    stream.skip(1);
    let cx = ActionContext::new(&stream);
    assert_eq!(cx.text(), "x");
    assert_eq!(cx.length(), 1);
    assert_eq!(cx.start(), Position::new(4, 1, 5));
    assert_eq!(cx.end(), Position::new(5, 1, 6));
  }
}
