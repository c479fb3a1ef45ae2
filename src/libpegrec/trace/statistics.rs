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
use crate::trace::RuleTracer;
use runtime::BacktrackingStream;
use std::collections::BTreeMap;

/// Counts the rule invocations of a recognition.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StatisticsTracer
{
  /// Invocations per kind of rule (`production`, `terminal`, `action`, ...).
  pub invocations: BTreeMap<&'static str, usize>,
  pub successes: usize,
  pub failures: usize,
  pub memo_hits: usize,
  pub memo_misses: usize,
  pub memo_stores: usize,
  pub max_depth: usize,
  depth: usize
}

impl StatisticsTracer
{
  pub fn new() -> StatisticsTracer {
    StatisticsTracer::default()
  }

  pub fn invocations_of(&self, kind: &str) -> usize {
    self.invocations.get(kind).cloned().unwrap_or(0)
  }

  pub fn total_invocations(&self) -> usize {
    self.invocations.values().sum()
  }

  pub fn summary(&self) -> String {
    format!("Rule invocations: {}\nTerminal invocations: {}\nProduction invocations: {}\n\
      Action invocations: {}\nMemo cache size: {}\nMemo cache hits: {}\nMemo cache misses: {}\n\
      Max depth: {}",
      self.total_invocations(), self.invocations_of("terminal"), self.invocations_of("production"),
      self.invocations_of("action"), self.memo_stores, self.memo_hits, self.memo_misses,
      self.max_depth)
  }

  fn kind(grammar: &Grammar, rule: RuleId) -> &'static str {
    match rule {
      RuleId::Production(_) => "production",
      RuleId::Expression(expr) => grammar[expr].expr.kind()
    }
  }
}

impl RuleTracer for StatisticsTracer
{
  fn open(&mut self, _stream: &BacktrackingStream) {
    *self = StatisticsTracer::default();
  }

  fn trace(&mut self, grammar: &Grammar, rule: RuleId, _stream: &BacktrackingStream) {
    *self.invocations.entry(StatisticsTracer::kind(grammar, rule)).or_insert(0) += 1;
    self.depth += 1;
    self.max_depth = self.max_depth.max(self.depth);
  }

  fn backtrace(&mut self, _grammar: &Grammar, _rule: RuleId, _stream: &BacktrackingStream,
    success: bool)
  {
    self.depth = self.depth.saturating_sub(1);
    if success {
      self.successes += 1;
    }
    else {
      self.failures += 1;
    }
  }

  fn lookup(&mut self, _grammar: &Grammar, _reference: usize, _stream: &BacktrackingStream, hit: bool) {
    if hit {
      self.memo_hits += 1;
    }
    else {
      self.memo_misses += 1;
    }
  }

  fn cache(&mut self, _grammar: &Grammar, _reference: usize, _stream: &BacktrackingStream) {
    self.memo_stores += 1;
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::builder::GrammarBuilder;

  #[test]
  fn test_counts() {
    let mut builder = GrammarBuilder::new();
    builder.start_production("S").unwrap().push_any().unwrap().end_production().unwrap();
    let grammar = builder.build().unwrap();
    let any = grammar.production(0).expr;
    let stream = BacktrackingStream::from_str("");
    let mut stats = StatisticsTracer::new();
    stats.open(&stream);
    stats.trace(&grammar, RuleId::Production(0), &stream);
    stats.trace(&grammar, RuleId::Expression(any), &stream);
    stats.backtrace(&grammar, RuleId::Expression(any), &stream, false);
    stats.backtrace(&grammar, RuleId::Production(0), &stream, false);
    stats.lookup(&grammar, any, &stream, false);
    assert_eq!(stats.invocations_of("production"), 1);
    assert_eq!(stats.invocations_of("terminal"), 1);
    assert_eq!(stats.failures, 2);
    assert_eq!(stats.max_depth, 2);
    assert_eq!(stats.memo_misses, 1);
    assert!(stats.summary().starts_with("Rule invocations: 2\n"));
  }
}
