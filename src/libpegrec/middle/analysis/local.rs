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

//! Problems visible on a single rule: duplicated, unused or undefined productions, undefined
//! actions, terminals that cannot match, and shapes that a simpler expression would express.
//!
//! The inefficiency hints only look for the first offending pair of children:
//! `'a' 'b' 'c'` is reported once.

use crate::ast::*;
use crate::visitor::*;
use crate::middle::{CompilerOptions, make_problem};

pub struct LocalAnalyzer<'a>
{
  grammar: &'a Grammar,
  options: &'a CompilerOptions,
  problems: Vec<Problem>
}

impl<'a> LocalAnalyzer<'a>
{
  pub fn analyse(grammar: &'a Grammar, options: &'a CompilerOptions) -> Vec<Problem> {
    let mut analyser = LocalAnalyzer {
      grammar: grammar,
      options: options,
      problems: vec![]
    };
    for production in grammar.productions() {
      analyser.visit_production(production.index);
    }
    analyser.problems
  }

  fn report(&mut self, kind: ProblemKind, rule: RuleId, message: String) {
    if let Some(problem) = make_problem(self.grammar, self.options, kind, rule, message) {
      self.problems.push(problem);
    }
  }

  fn terminal(&self, expr: usize) -> Option<&'a Terminal> {
    match &self.grammar[expr].expr {
      Expression::Terminal(terminal) => Some(terminal),
      _ => None
    }
  }

  /// First pair of adjacent children both satisfying `pair`.
  fn first_pair<F>(&self, children: &[usize], pair: F) -> bool where
   F: Fn(&Terminal, &Terminal) -> bool
  {
    children.windows(2).any(|w| {
      match (self.terminal(w[0]), self.terminal(w[1])) {
        (Some(t1), Some(t2)) => pair(t1, t2),
        _ => false
      }
    })
  }
}

impl<'a> ExprByIndex for LocalAnalyzer<'a>
{
  fn expr_by_index(&self, index: usize) -> Expression {
    self.grammar.expr_by_index(index)
  }

  fn production_expr(&self, index: usize) -> usize {
    self.grammar.production_expr(index)
  }
}

impl<'a> Visitor<()> for LocalAnalyzer<'a>
{
  fn visit_production(&mut self, index: usize) {
    let production = self.grammar.production(index);
    let rule = RuleId::Production(index);
    if production.duplicated {
      self.report(ProblemKind::DuplicateProduction, rule,
        format!("production `{}` is defined more than once", production.name));
    }
    let is_start = index == 0;
    if production.defined && production.is_standalone() && !is_start {
      self.report(ProblemKind::UnusedProduction, rule,
        format!("production `{}` is never used", production.name));
    }
    self.visit_expr(production.expr);
  }

  fn visit_terminal(&mut self, this: usize, terminal: Terminal) {
    let rule = RuleId::Expression(this);
    match terminal {
      Terminal::Nil => (),
      ref t if t.is_empty() => {
        self.report(ProblemKind::EmptyTerminal, rule,
          format!("terminal {} cannot match anything", t));
      }
      Terminal::Class(class) => {
        if class.is_undefined() {
          self.report(ProblemKind::UnsupportedClass, rule,
            format!("character class `<{}>` is not supported", class.name()));
        }
      }
      ref t if t.is_inefficient() => {
        self.report(ProblemKind::InefficientTerminal, rule,
          format!("terminal {} can be simplified", t));
      }
      _ => ()
    }
  }

  fn visit_reference(&mut self, this: usize, target: usize, _memo: bool) {
    let target = self.grammar.production(target);
    if target.is_undefined() {
      self.report(ProblemKind::UndefinedProduction, RuleId::Expression(this),
        format!("production `{}` is not defined", target.name));
    }
  }

  fn visit_action(&mut self, this: usize, child: usize, name: String, _injected: bool) {
    if self.grammar[this].expr.is_undefined_action() {
      self.report(ProblemKind::UndefinedAction, RuleId::Expression(this),
        format!("no handler is registered for action `{}`", name));
    }
    self.visit_expr(child);
  }

  fn visit_concatenation(&mut self, this: usize, children: Vec<usize>) {
    walk_exprs(self, children.clone());
    let same_case = self.first_pair(&children, |t1, t2| {
      match (t1, t2) {
        (Terminal::Token(_, cs1), Terminal::Token(_, cs2)) => cs1 == cs2,
        _ => false
      }
    });
    if same_case {
      self.report(ProblemKind::InefficientConcatenation, RuleId::Expression(this),
        String::from("adjacent tokens with the same case sensitivity form a single token"));
    }
  }

  fn visit_alternation(&mut self, this: usize, children: Vec<usize>) {
    walk_exprs(self, children.clone());
    if self.first_pair(&children, |t1, t2| t1.is_determined() && t2.is_determined()) {
      self.report(ProblemKind::InefficientAlternation, RuleId::Expression(this),
        String::from("a choice between single characters is a character set"));
    }
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::builder::GrammarBuilder;

  fn kinds(builder: &mut GrammarBuilder, options: &CompilerOptions) -> Vec<ProblemKind> {
    let grammar = builder.build().unwrap();
    LocalAnalyzer::analyse(&grammar, options).into_iter().map(|p| p.kind).collect()
  }

  #[test]
  fn test_production_problems() {
    let mut builder = GrammarBuilder::new();
    builder.start_production("S").unwrap().push_reference("Missing", false).unwrap().end_production().unwrap();
    builder.start_production("Lonely").unwrap().push_any().unwrap().end_production().unwrap();
    builder.start_production("Lonely").unwrap().push_any().unwrap().end_production().unwrap();
    let found = kinds(&mut builder, &CompilerOptions::default());
    assert_eq!(found, vec![
      ProblemKind::UndefinedProduction,
      ProblemKind::DuplicateProduction,
      ProblemKind::UnusedProduction,
      ProblemKind::DuplicateProduction,
      ProblemKind::UnusedProduction
    ]);
  }

  #[test]
  fn test_self_reference_is_unused() {
    let mut builder = GrammarBuilder::new();
    builder.start_production("S").unwrap().push_any().unwrap().end_production().unwrap();
    builder.start_production("Loop").unwrap()
      .push_token("x", true).unwrap()
      .push_reference("Loop", false).unwrap()
      .optional().unwrap()
      .end_production().unwrap();
    assert_eq!(kinds(&mut builder, &CompilerOptions::default()), vec![ProblemKind::UnusedProduction]);
  }

  #[test]
  fn test_terminal_problems() {
    let mut builder = GrammarBuilder::new();
    builder.start_production("S").unwrap()
      .push_token("", true).unwrap()
      .push_class("Greek").unwrap()
      .push_interval('a', 'a').unwrap()
      .push_token("-", false).unwrap()
      .push_set(CharSet::new()).unwrap()
      .end_production().unwrap();
    let found = kinds(&mut builder, &CompilerOptions::default());
    assert_eq!(found, vec![
      ProblemKind::EmptyTerminal,
      ProblemKind::UnsupportedClass,
      ProblemKind::InefficientTerminal,
      ProblemKind::InefficientTerminal,
      ProblemKind::EmptyTerminal
    ]);
  }

  #[test]
  fn test_inefficient_shapes() {
    let mut builder = GrammarBuilder::new();
    builder.start_production("S").unwrap()
      .mark()
      .push_tokens(&["a", "b", "c"], true).unwrap()
      .concat().unwrap()
      .release().unwrap()
      .mark()
      .push_token("x", true).unwrap()
      .push_interval('0', '9').unwrap()
      .choice().unwrap()
      .release().unwrap()
      .end_production().unwrap();
    let found = kinds(&mut builder, &CompilerOptions::default());
    assert_eq!(found, vec![ProblemKind::InefficientConcatenation, ProblemKind::InefficientAlternation]);
    let options = CompilerOptions { suppress_hints: true, .. CompilerOptions::default() };
    assert!(kinds(&mut rebuild_shapes(), &options).is_empty());
  }

  fn rebuild_shapes() -> GrammarBuilder {
    let mut builder = GrammarBuilder::new();
    builder.start_production("S").unwrap()
      .push_token("a", true).unwrap()
      .push_token("b", true).unwrap()
      .end_production().unwrap();
    builder
  }

  #[test]
  fn test_mixed_case_tokens_are_fine() {
    let mut builder = GrammarBuilder::new();
    builder.start_production("S").unwrap()
      .push_token("a", true).unwrap()
      .push_token("b", false).unwrap()
      .end_production().unwrap();
    assert!(kinds(&mut builder, &CompilerOptions::default()).is_empty());
  }

  #[test]
  fn test_undefined_action() {
    let mut builder = GrammarBuilder::new().with_actions(vec!["known"]);
    builder.start_production("S").unwrap()
      .push_any().unwrap().action("known").unwrap()
      .push_any().unwrap().action("unknown").unwrap()
      .end_production().unwrap();
    assert_eq!(kinds(&mut builder, &CompilerOptions::default()), vec![ProblemKind::UndefinedAction]);
    let options = CompilerOptions { suppress_warnings: true, .. CompilerOptions::default() };
    let mut builder = GrammarBuilder::new();
    builder.start_production("S").unwrap().action("unknown").unwrap().end_production().unwrap();
    assert!(kinds(&mut builder, &options).is_empty());
  }
}
