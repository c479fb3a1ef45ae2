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
use crate::error::SyntaxError;
use crate::trace::RuleTracer;
use runtime::BacktrackingStream;

/// Tracks the farthest position where a terminal failed and the terminals that failed there.
/// A failure further in the input replaces the expected terminals, a failure at the same
/// position adds to them. Failures inside predicates are ignored.
#[derive(Clone, Debug, Default)]
pub struct ErrorTracer
{
  farthest_read: Option<Position>,
  expected: Vec<Terminal>,
  predicate_level: usize
}

impl ErrorTracer
{
  pub fn new() -> ErrorTracer {
    ErrorTracer::default()
  }

  pub fn farthest_read(&self) -> Option<Position> {
    self.farthest_read
  }

  /// Expected terminals in the order they failed first.
  pub fn expected(&self) -> &[Terminal] {
    &self.expected
  }

  pub fn to_syntax_error(&self, found: String) -> SyntaxError {
    SyntaxError::new(self.farthest_read.unwrap_or_default(), self.expected.clone(), found)
  }

  fn is_exclusion(grammar: &Grammar, rule: RuleId) -> bool {
    match rule {
      RuleId::Expression(expr) => match grammar[expr].expr {
        Expression::Exclusion { .. } => true,
        _ => false
      },
      RuleId::Production(_) => false
    }
  }

  fn failed(&mut self, position: Position, terminal: &Terminal) {
    match self.farthest_read {
      Some(farthest) if position.offset < farthest.offset => return,
      Some(farthest) if position.offset == farthest.offset => (),
      _ => {
        self.farthest_read = Some(position);
        self.expected.clear();
      }
    }
    if !self.expected.contains(terminal) {
      self.expected.push(terminal.clone());
    }
  }
}

impl RuleTracer for ErrorTracer
{
  fn open(&mut self, _stream: &BacktrackingStream) {
    self.farthest_read = None;
    self.expected.clear();
    self.predicate_level = 0;
  }

  fn trace(&mut self, grammar: &Grammar, rule: RuleId, _stream: &BacktrackingStream) {
    if ErrorTracer::is_exclusion(grammar, rule) {
      self.predicate_level += 1;
    }
  }

  fn backtrace(&mut self, grammar: &Grammar, rule: RuleId, stream: &BacktrackingStream,
    success: bool)
  {
    if ErrorTracer::is_exclusion(grammar, rule) {
      self.predicate_level -= 1;
    }
    else if let RuleId::Expression(expr) = rule {
      if let Expression::Terminal(ref terminal) = grammar[expr].expr {
        if self.predicate_level == 0 && !success {
          self.failed(stream.position(), terminal);
        }
      }
    }
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::builder::GrammarBuilder;

  // A : 'x' 'y' / !'z' 'w' ;
  fn grammar() -> Grammar {
    let mut builder = GrammarBuilder::new();
    builder.start_production("A").unwrap()
      .mark()
        .push_token("x", true).unwrap()
        .push_token("y", true).unwrap()
        .concat().unwrap()
      .release().unwrap()
      .mark()
        .push_token("z", true).unwrap()
        .not().unwrap()
        .push_token("w", true).unwrap()
        .concat().unwrap()
      .release().unwrap()
      .choice().unwrap()
      .end_production().unwrap();
    builder.build().unwrap()
  }

  fn find_terminal(grammar: &Grammar, image: &str) -> usize {
    grammar.exprs().iter().position(|node| node.expr == Expression::Terminal(Terminal::token(image, true)))
      .unwrap()
  }

  #[test]
  fn test_farthest_failure_wins() {
    let grammar = grammar();
    let (x, y, w) = (find_terminal(&grammar, "x"), find_terminal(&grammar, "y"), find_terminal(&grammar, "w"));
    let mut stream = BacktrackingStream::from_str("xz");
    let mut tracer = ErrorTracer::new();
    tracer.open(&stream);
    tracer.backtrace(&grammar, RuleId::Expression(w), &stream, false);
    assert_eq!(tracer.expected(), &[Terminal::token("w", true)]);
    tracer.backtrace(&grammar, RuleId::Expression(x), &stream, false);
    assert_eq!(tracer.expected().len(), 2);
    stream.read();
    tracer.backtrace(&grammar, RuleId::Expression(y), &stream, false);
    tracer.backtrace(&grammar, RuleId::Expression(y), &stream, false);
    assert_eq!(tracer.expected(), &[Terminal::token("y", true)]);
    assert_eq!(tracer.farthest_read().map(|p| p.column), Some(2));
    assert_eq!(tracer.to_syntax_error(String::from("z")).to_string(),
      "1:2: unexpected `z`, expecting 'y'.");
  }

  #[test]
  fn test_predicates_are_ignored() {
    let grammar = grammar();
    let z = find_terminal(&grammar, "z");
    let not = grammar[z].parent.unwrap();
    let stream = BacktrackingStream::from_str("a");
    let mut tracer = ErrorTracer::new();
    tracer.open(&stream);
    tracer.trace(&grammar, RuleId::Expression(not), &stream);
    tracer.backtrace(&grammar, RuleId::Expression(z), &stream, false);
    tracer.backtrace(&grammar, RuleId::Expression(not), &stream, true);
    assert!(tracer.expected().is_empty());
    assert_eq!(tracer.farthest_read(), None);
  }
}
