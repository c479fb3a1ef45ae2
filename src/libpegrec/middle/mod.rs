// Copyright 2014 Pierre Talbot (IRCAM)

// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at

//     http://www.apache.org/licenses/LICENSE-2.0

// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Static passes over a finished grammar.
//!
//! The `analysis` module reports problems without changing the shape of the rule tree, the
//! `injection` module rewrites the tree (undo actions when the grammar is built, memo
//! references on demand).

use crate::ast::*;

pub use self::injection::{inject_undo, inject_memo};

pub mod analysis;
pub mod injection;

pub const SUPPRESS_WARNINGS: u32 = 0x01;
pub const SUPPRESS_HINTS: u32 = 0x02;
pub const MAKE_SUGGESTIONS: u32 = 0x04;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CompilerOptions
{
  pub suppress_warnings: bool,
  pub suppress_hints: bool,
  /// Appends the usual remedy to the message of problems.
  pub make_suggestions: bool,
  pub local_analysis: bool,
  pub left_recursion: bool
}

impl Default for CompilerOptions
{
  fn default() -> Self {
    CompilerOptions {
      suppress_warnings: false,
      suppress_hints: false,
      make_suggestions: false,
      local_analysis: true,
      left_recursion: true
    }
  }
}

impl CompilerOptions
{
  /// Options from the `SUPPRESS_WARNINGS | SUPPRESS_HINTS | MAKE_SUGGESTIONS` flags, every
  /// pass enabled.
  pub fn from_bits(bits: u32) -> CompilerOptions {
    CompilerOptions {
      suppress_warnings: bits & SUPPRESS_WARNINGS != 0,
      suppress_hints: bits & SUPPRESS_HINTS != 0,
      make_suggestions: bits & MAKE_SUGGESTIONS != 0,
      .. CompilerOptions::default()
    }
  }

  pub fn bits(&self) -> u32 {
    let mut bits = 0;
    if self.suppress_warnings { bits |= SUPPRESS_WARNINGS; }
    if self.suppress_hints { bits |= SUPPRESS_HINTS; }
    if self.make_suggestions { bits |= MAKE_SUGGESTIONS; }
    bits
  }

  pub fn reports(&self, severity: Severity) -> bool {
    match severity {
      Severity::Warning => !self.suppress_warnings,
      Severity::Hint => !self.suppress_hints,
      _ => true
    }
  }
}

/// Runs the analyses on `grammar`. The result is `Fake` when an error or a fatal problem has
/// been found: the grammar can be inspected but must not be used for recognition.
///
/// Problems attached to a rule are recomputed, the others (raised while reading the grammar
/// text) are kept.
pub fn compile(grammar: Grammar, options: &CompilerOptions) -> Partial<Grammar> {
  Partial::Value(grammar)
    .and_then(|grammar| clear_rule_problems(grammar))
    .and_then(|grammar| at_least_one_production(grammar))
    .and_then(|grammar| analysis::local_analysis(grammar, options))
    .and_then(|grammar| analysis::left_recursion(grammar, options))
    .and_then(|grammar| sort_problems(grammar))
}

fn clear_rule_problems(mut grammar: Grammar) -> Partial<Grammar> {
  grammar.problems_mut().retain_unbound();
  outcome(grammar)
}

fn at_least_one_production(mut grammar: Grammar) -> Partial<Grammar> {
  if grammar.is_empty() && !grammar.problems().has_kind(ProblemKind::EmptyGrammar) {
    grammar.problems_mut().push(Problem::new(ProblemKind::EmptyGrammar, None, None,
      String::from("at least one production must be declared")));
  }
  outcome(grammar)
}

fn sort_problems(mut grammar: Grammar) -> Partial<Grammar> {
  grammar.problems_mut().sort();
  log::debug!("grammar compiled: {}", grammar.problems().summary());
  outcome(grammar)
}

pub fn outcome(grammar: Grammar) -> Partial<Grammar> {
  if grammar.has_errors() {
    Partial::Fake(grammar)
  }
  else {
    Partial::Value(grammar)
  }
}

/// Problem bound to `rule`, unless the options filter its severity out.
pub fn make_problem(grammar: &Grammar, options: &CompilerOptions, kind: ProblemKind,
  rule: RuleId, message: String) -> Option<Problem>
{
  if !options.reports(kind.severity()) {
    return None;
  }
  let message = match kind.suggestion() {
    Some(suggestion) if options.make_suggestions => format!("{}; {}", message, suggestion),
    _ => message
  };
  Some(Problem::new(kind, Some(rule), grammar.rule_span(rule), message))
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::builder::GrammarBuilder;

  fn two_rules() -> Grammar {
    let mut builder = GrammarBuilder::new();
    builder.start_production("S").unwrap().push_token("a", true).unwrap().end_production().unwrap();
    builder.start_production("Unused").unwrap().push_any().unwrap().end_production().unwrap();
    builder.build().unwrap()
  }

  #[test]
  fn test_bits() {
    let options = CompilerOptions::from_bits(SUPPRESS_HINTS | MAKE_SUGGESTIONS);
    assert!(!options.suppress_warnings);
    assert!(options.suppress_hints);
    assert!(options.make_suggestions);
    assert!(options.local_analysis && options.left_recursion);
    assert_eq!(options.bits(), 6);
  }

  #[test]
  fn test_empty_grammar() {
    match compile(Grammar::default(), &CompilerOptions::default()) {
      Partial::Fake(grammar) => {
        assert!(grammar.problems().has_kind(ProblemKind::EmptyGrammar));
        assert_eq!(grammar.problems().len(), 1);
      }
      _ => panic!("an empty grammar must not compile")
    }
  }

  #[test]
  fn test_warnings_keep_value() {
    let grammar = compile(two_rules(), &CompilerOptions::default()).unwrap();
    assert!(grammar.problems().has_kind(ProblemKind::UnusedProduction));
    let options = CompilerOptions { suppress_warnings: true, .. CompilerOptions::default() };
    let grammar = compile(grammar, &options).unwrap();
    assert!(grammar.problems().is_empty());
  }

  #[test]
  fn test_suggestions() {
    let options = CompilerOptions::from_bits(MAKE_SUGGESTIONS);
    let grammar = compile(two_rules(), &options).unwrap();
    let problem = grammar.problems().iter().next().unwrap();
    assert_eq!(problem.kind, ProblemKind::UnusedProduction);
    assert!(problem.message.ends_with("remove the production or reference it"));
  }

  #[test]
  fn test_unbound_problems_survive() {
    let mut grammar = two_rules();
    grammar.problems_mut().push(Problem::new(ProblemKind::MissingSemi, None, None,
      String::from("missing `;`")));
    let grammar = compile(grammar, &CompilerOptions::default());
    match grammar {
      Partial::Fake(grammar) => {
        assert!(grammar.problems().has_kind(ProblemKind::MissingSemi));
        assert!(grammar.problems().has_kind(ProblemKind::UnusedProduction));
      }
      _ => panic!("a grammar with a syntax problem must stay fake")
    }
  }
}
