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

use crate::ast::*;
use crate::display::escape_str;
use crate::trace::{RuleTracer, TraceLevel, StatisticsTracer};
use runtime::BacktrackingStream;
use std::io::{self, Write};
use std::time::Instant;

/// Writes an indented trace of the recognition into `out`:
///
/// ```text
///   -> 1:1 Sum
///     -> 1:1 Product
///     <- 1:2 Product
///        "3"
/// ! <- 1:1 Sum
/// ```
///
/// A failed rule is prefixed by `!`. Write errors stop the output, the first one is kept.
pub struct DebugTracer<W: Write>
{
  out: W,
  level: TraceLevel,
  max_depth: usize,
  max_text: usize,
  indent_size: usize,
  indent: usize,
  depth: usize,
  starts: Vec<Position>,
  statistics: StatisticsTracer,
  started: Option<Instant>,
  error: Option<io::Error>
}

impl<W: Write> DebugTracer<W>
{
  pub fn new(out: W) -> DebugTracer<W> {
    DebugTracer {
      out: out,
      level: TraceLevel::default(),
      max_depth: 0,
      max_text: 80,
      indent_size: 2,
      indent: 0,
      depth: 0,
      starts: vec![],
      statistics: StatisticsTracer::new(),
      started: None,
      error: None
    }
  }

  pub fn level(mut self, level: TraceLevel) -> Self {
    self.level = level;
    self
  }

  /// Rules nested deeper than `max_depth` are not written, 0 means no limit.
  pub fn max_depth(mut self, max_depth: usize) -> Self {
    self.max_depth = max_depth;
    self
  }

  /// Only the end of matched texts longer than `max_text` is written, 0 disables the texts.
  pub fn max_text(mut self, max_text: usize) -> Self {
    self.max_text = max_text;
    self
  }

  pub fn indent_size(mut self, size: usize) -> Self {
    self.indent_size = size.min(8);
    self
  }

  pub fn statistics(&self) -> &StatisticsTracer {
    &self.statistics
  }

  pub fn take_error(&mut self) -> Option<io::Error> {
    self.error.take()
  }

  pub fn into_inner(self) -> W {
    self.out
  }

  fn write(&mut self, text: &str) {
    if self.error.is_none() {
      if let Err(err) = self.out.write_all(text.as_bytes()) {
        self.error = Some(err);
      }
    }
  }

  fn margin(&self) -> String {
    " ".repeat(self.indent * self.indent_size)
  }

  fn is_shown(&self, grammar: &Grammar, rule: RuleId) -> bool {
    self.level >= TraceLevel::of_rule(grammar, rule)
      && (self.max_depth == 0 || self.depth < self.max_depth)
  }

  /// The text matched by the rule that started at `start`.
  fn matched_text(stream: &BacktrackingStream, start: Position) -> String {
    let chars = stream.chars();
    let len = stream.position().offset.saturating_sub(start.offset);
    chars[chars.len().saturating_sub(len)..].iter().collect()
  }
}

impl<W: Write> RuleTracer for DebugTracer<W>
{
  fn open(&mut self, stream: &BacktrackingStream) {
    self.statistics.open(stream);
    self.indent = 0;
    self.depth = 0;
    self.starts.clear();
    self.started = Some(Instant::now());
    let header = format!("SOURCE: {}\n\nOPTIONS:\nTraceLevel: {}\nMaxDepthLevel: {}\n\
      MaxTextSize: {}\n\nTRACE:\n", stream.position(), self.level.name(), self.max_depth, self.max_text);
    self.write(&header);
  }

  fn trace(&mut self, grammar: &Grammar, rule: RuleId, stream: &BacktrackingStream) {
    self.statistics.trace(grammar, rule, stream);
    if self.is_shown(grammar, rule) {
      let line = format!("  {}-> {} {}\n", self.margin(), stream.position(), grammar.describe(rule));
      self.write(&line);
      self.indent += 1;
    }
    self.starts.push(stream.position());
    self.depth += 1;
  }

  fn backtrace(&mut self, grammar: &Grammar, rule: RuleId, stream: &BacktrackingStream,
    success: bool)
  {
    self.statistics.backtrace(grammar, rule, stream, success);
    self.depth = self.depth.saturating_sub(1);
    let start = self.starts.pop().unwrap_or_else(|| stream.position());
    if self.is_shown(grammar, rule) {
      self.indent = self.indent.saturating_sub(1);
      let mark = if success { "  " } else { "! " };
      let line = format!("{}{}<- {} {}\n", mark, self.margin(), stream.position(), grammar.describe(rule));
      self.write(&line);
      if success && self.max_text > 0 {
        let text: Vec<char> = DebugTracer::<W>::matched_text(stream, start).chars().collect();
        if !text.is_empty() {
          let (ellipsis, shown) =
            if text.len() > self.max_text { ("...", &text[text.len() - self.max_text..]) }
            else { ("", &text[..]) };
          let shown: String = shown.iter().collect();
          let line = format!("  {}   \"{}{}\"\n", self.margin(), ellipsis, escape_str(&shown, '"'));
          self.write(&line);
        }
      }
    }
  }

  fn lookup(&mut self, grammar: &Grammar, reference: usize, stream: &BacktrackingStream, hit: bool) {
    self.statistics.lookup(grammar, reference, stream, hit);
  }

  fn cache(&mut self, grammar: &Grammar, reference: usize, stream: &BacktrackingStream) {
    self.statistics.cache(grammar, reference, stream);
  }

  fn close(&mut self, stream: &BacktrackingStream, success: bool) {
    self.statistics.close(stream, success);
    let elapsed = self.started.map(|s| s.elapsed().as_millis()).unwrap_or(0);
    let footer = format!("\n\nTRACE RESULTS:\nTracing time: {}ms\n{}\n\n{}\n",
      elapsed, self.statistics.summary(), if success { "SUCCESS!" } else { "FAILURE!" });
    self.write(&footer);
  }
}
