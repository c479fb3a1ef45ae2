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

//! Character stream with unlimited backtracking.
//!
//! The stream pulls characters lazily from its source and retains them in a buffer as long as a
//! mark can still lead back to them. Any of `\n`, `\r` and `\r\n` is read as a single `\n`, so
//! offsets, lines and columns always refer to the normalized text.

use crate::position::*;
use std::io;
use std::io::BufRead;
use std::cmp::min;

type CharSource<'a> = Box<dyn Iterator<Item=io::Result<char>> + 'a>;

pub struct BacktrackingStream<'a>
{
  source: CharSource<'a>,
  /// Characters from the absolute offset `base` onward.
  buffer: Vec<char>,
  base: usize,
  position: Position,
  /// Start of the matched text when no mark is outstanding.
  origin: Position,
  marks: Vec<Position>,
  pending_cr: bool,
  exhausted: bool,
  error: Option<io::Error>
}

impl<'a> BacktrackingStream<'a>
{
  pub fn new<I>(source: I) -> BacktrackingStream<'a> where
   I: Iterator<Item=io::Result<char>> + 'a
  {
    BacktrackingStream {
      source: Box::new(source),
      buffer: vec![],
      base: 0,
      position: Position::origin(),
      origin: Position::origin(),
      marks: vec![],
      pending_cr: false,
      exhausted: false,
      error: None
    }
  }

  pub fn from_str(text: &'a str) -> BacktrackingStream<'a> {
    BacktrackingStream::new(text.chars().map(Ok))
  }

  /// Reads the characters of `reader` line by line; invalid UTF-8 ends the stream and is
  /// reported by `take_error`.
  pub fn from_reader<R>(reader: R) -> BacktrackingStream<'a> where
   R: BufRead + 'a
  {
    BacktrackingStream::new(ReaderChars::new(reader))
  }

  fn fetch(&mut self) -> bool {
    while !self.exhausted {
      match self.source.next() {
        None => self.exhausted = true,
        Some(Err(err)) => {
          self.error = Some(err);
          self.exhausted = true;
        }
        Some(Ok(c)) => {
          let swallowed = self.pending_cr && c == '\n';
          self.pending_cr = c == '\r';
          if !swallowed {
            self.buffer.push(if c == '\r' { '\n' } else { c });
            return true;
          }
        }
      }
    }
    false
  }

  fn index(&self) -> usize {
    self.position.offset - self.base
  }

  /// Next character without moving, `None` at the end of input.
  pub fn peek(&mut self) -> Option<char> {
    self.peek_nth(0)
  }

  pub fn peek_nth(&mut self, n: usize) -> Option<char> {
    let index = self.index() + n;
    while index >= self.buffer.len() {
      if !self.fetch() {
        return None;
      }
    }
    Some(self.buffer[index])
  }

  pub fn read(&mut self) -> Option<char> {
    let c = self.peek()?;
    self.position = self.position.next(c);
    Some(c)
  }

  /// Fills `buf` as far as the input allows and returns the number of characters read.
  pub fn read_into(&mut self, buf: &mut [char]) -> usize {
    let mut count = 0;
    while count < buf.len() {
      match self.read() {
        Some(c) => {
          buf[count] = c;
          count += 1;
        }
        None => break
      }
    }
    count
  }

  /// Reads up to and including the next newline, which is not part of the result.
  pub fn read_line(&mut self) -> Option<String> {
    let mut line = String::new();
    let mut read_any = false;
    while let Some(c) = self.read() {
      read_any = true;
      if c == '\n' {
        break;
      }
      line.push(c);
    }
    if read_any { Some(line) } else { None }
  }

  /// Advances over `count` characters without looking at them, stopping early at the end of
  /// input. Returns the number of characters skipped.
  pub fn skip(&mut self, count: usize) -> usize {
    let mut skipped = 0;
    while skipped < count && self.read().is_some() {
      skipped += 1;
    }
    skipped
  }

  /// Consumes `prefix` if the input continues with it, otherwise the position is unchanged.
  pub fn consume_prefix(&mut self, prefix: &str, case_sensitive: bool) -> bool {
    let start = self.position;
    for expected in prefix.chars() {
      let matched = match self.read() {
        Some(c) if case_sensitive => c == expected,
        Some(c) => fold_case(c) == fold_case(expected),
        None => false
      };
      if !matched {
        self.position = start;
        return false;
      }
    }
    true
  }

  pub fn at_end(&mut self) -> bool {
    self.peek().is_none()
  }

  pub fn mark(&mut self) {
    self.marks.push(self.position);
  }

  /// Drops the innermost mark and keeps the current position.
  pub fn release(&mut self) {
    if self.marks.pop().is_none() {
      panic!("`release` called on a stream without outstanding mark.");
    }
  }

  /// Drops the innermost mark and moves back to it.
  pub fn reset(&mut self) {
    match self.marks.pop() {
      Some(mark) => self.position = mark,
      None => panic!("`reset` called on a stream without outstanding mark.")
    }
  }

  /// Number of outstanding marks.
  pub fn depth(&self) -> usize {
    self.marks.len()
  }

  pub fn start(&self) -> Position {
    *self.marks.last().unwrap_or(&self.origin)
  }

  pub fn end(&self) -> Position {
    self.position
  }

  pub fn position(&self) -> Position {
    self.position
  }

  pub fn span(&self) -> Span {
    Span::new(self.start(), self.end())
  }

  /// Length of the text between the innermost mark and the current position.
  pub fn length(&self) -> usize {
    self.position.offset - self.start().offset
  }

  pub fn chars(&self) -> &[char] {
    let from = self.start().offset - self.base;
    &self.buffer[from..self.index()]
  }

  pub fn text(&self) -> String {
    self.chars().iter().collect()
  }

  /// Upcoming characters for diagnostics, at most `len_hint` of them.
  pub fn code_snippet(&mut self, len_hint: usize) -> String {
    let mut snippet = String::new();
    for n in 0..len_hint {
      match self.peek_nth(n) {
        Some('\n') | None => break,
        Some(c) => snippet.push(c)
      }
    }
    snippet
  }

  /// Discards the buffered characters that no mark can lead back to anymore. Everything before
  /// the outermost mark (or the current position without marks) becomes unreachable, including
  /// for `text` once all marks are released.
  pub fn consume(&mut self) {
    let floor = self.marks.first().cloned().unwrap_or(self.position);
    let dropped = min(floor.offset - self.base, self.buffer.len());
    self.buffer.drain(..dropped);
    self.base += dropped;
    self.origin = floor;
  }

  /// `consume` and give the unused capacity back.
  pub fn flush(&mut self) {
    self.consume();
    self.buffer.shrink_to_fit();
  }

  /// Number of characters currently retained.
  pub fn buffered(&self) -> usize {
    self.buffer.len()
  }

  /// The error that ended the character source prematurely, if any.
  pub fn take_error(&mut self) -> Option<io::Error> {
    self.error.take()
  }
}

/// Simple case folding used by case-insensitive comparisons: characters with a one-to-one
/// uppercase mapping are compared through it, the others are compared as is.
pub fn fold_case(c: char) -> char {
  let mut upper = c.to_uppercase();
  match (upper.next(), upper.next()) {
    (Some(u), None) => u,
    _ => c
  }
}

struct ReaderChars<R>
{
  reader: R,
  pending: std::vec::IntoIter<char>
}

impl<R> ReaderChars<R>
{
  fn new(reader: R) -> Self {
    ReaderChars {
      reader: reader,
      pending: vec![].into_iter()
    }
  }
}

impl<R: BufRead> Iterator for ReaderChars<R>
{
  type Item = io::Result<char>;

  fn next(&mut self) -> Option<io::Result<char>> {
    loop {
      if let Some(c) = self.pending.next() {
        return Some(Ok(c));
      }
      let mut line = String::new();
      match self.reader.read_line(&mut line) {
        Ok(0) => return None,
        Ok(_) => self.pending = line.chars().collect::<Vec<_>>().into_iter(),
        Err(err) => return Some(Err(err))
      }
    }
  }
}
