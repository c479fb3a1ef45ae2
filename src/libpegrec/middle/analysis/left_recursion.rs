// Copyright 2016 Pierre Talbot (IRCAM)

// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at

//     http://www.apache.org/licenses/LICENSE-2.0

// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Detects the productions calling themselves before consuming any input, which would loop
//! forever in a recursive descent recognizer.
//!
//! Whether a production is guaranteed to consume a character is computed first, as a fixpoint
//! over all productions, and cached by index. Each production is then walked depth-first from
//! its own start, following the references reachable before something consumes. Reaching a
//! reference to the starting production this way is a left recursion. A cycle is reported once,
//! from the first of its productions.

use crate::ast::*;
use crate::visitor::*;
use crate::middle::{CompilerOptions, make_problem};

/// Consuming bit of expressions, given the bits of the productions.
struct ConsumingFlags<'a>
{
  grammar: &'a Grammar,
  productions: Vec<bool>
}

impl<'a> ConsumingFlags<'a>
{
  /// Starts from "every production consumes" and lowers the bits until nothing changes.
  fn compute(grammar: &'a Grammar) -> ConsumingFlags<'a> {
    let mut flags = ConsumingFlags {
      grammar: grammar,
      productions: vec![true; grammar.len()]
    };
    let mut changed = true;
    while changed {
      changed = false;
      for index in 0..grammar.len() {
        if flags.productions[index] && !flags.visit_production(index) {
          flags.productions[index] = false;
          changed = true;
        }
      }
    }
    flags
  }
}

impl<'a> ExprByIndex for ConsumingFlags<'a>
{
  fn expr_by_index(&self, index: usize) -> Expression {
    self.grammar.expr_by_index(index)
  }

  fn production_expr(&self, index: usize) -> usize {
    self.grammar.production_expr(index)
  }
}

impl<'a> Visitor<bool> for ConsumingFlags<'a>
{
  fn visit_terminal(&mut self, _this: usize, terminal: Terminal) -> bool {
    match terminal {
      Terminal::Nil => false,
      Terminal::Token(image, _) => !image.is_empty(),
      _ => true
    }
  }

  fn visit_reference(&mut self, _this: usize, target: usize, _memo: bool) -> bool {
    self.productions[target]
  }

  /// Consumes as soon as one of the elements consumes.
  fn visit_concatenation(&mut self, _this: usize, children: Vec<usize>) -> bool {
    children.into_iter().any(|child| self.visit_expr(child))
  }

  /// Consumes only if every alternative consumes.
  fn visit_alternation(&mut self, _this: usize, children: Vec<usize>) -> bool {
    children.into_iter().all(|child| self.visit_expr(child))
  }

  fn visit_repetition(&mut self, _this: usize, child: usize, min: u32, _max: u32) -> bool {
    min > 0 && self.visit_expr(child)
  }

  /// Predicates never consume, even when their body does.
  fn visit_exclusion(&mut self, _this: usize, _child: usize, _predicate: Predicate) -> bool {
    false
  }
}

pub struct RecursionFinder<'a>
{
  grammar: &'a Grammar,
  options: &'a CompilerOptions,
  consuming: ConsumingFlags<'a>,
  reference_path: Vec<usize>,
  /// Productions entered from the current source.
  visited: Vec<bool>,
  /// Productions belonging to a cycle already reported.
  reported: Vec<bool>,
  source: usize,
  recursion: bool,
  problems: Vec<Problem>
}

impl<'a> RecursionFinder<'a>
{
  pub fn analyse(grammar: &'a Grammar, options: &'a CompilerOptions) -> Vec<Problem> {
    let mut finder = RecursionFinder {
      grammar: grammar,
      options: options,
      consuming: ConsumingFlags::compute(grammar),
      reference_path: vec![],
      visited: vec![false; grammar.len()],
      reported: vec![false; grammar.len()],
      source: 0,
      recursion: false,
      problems: vec![]
    };
    for production in grammar.productions() {
      if !finder.reported[production.index] {
        finder.reset(production.index);
        finder.visit_production(production.index);
      }
    }
    finder.problems
  }

  fn reset(&mut self, source: usize) {
    self.source = source;
    self.recursion = false;
    self.reference_path.clear();
    for visited in &mut self.visited {
      *visited = false;
    }
  }

  fn error_left_recursion(&mut self, reference: usize, target: usize) {
    let mut path = vec![];
    for &index in &self.reference_path {
      self.reported[index] = true;
      path.push(self.grammar.production(index).name.clone());
    }
    let name = &self.grammar.production(target).name;
    let message = format!("production `{}` is left recursive, the rule cycle {} does not consume \
      any input", name, display_path_cycle(&path));
    if let Some(problem) = make_problem(self.grammar, self.options, ProblemKind::LeftRecursion,
      RuleId::Expression(reference), message)
    {
      self.problems.push(problem);
    }
  }
}

impl<'a> ExprByIndex for RecursionFinder<'a>
{
  fn expr_by_index(&self, index: usize) -> Expression {
    self.grammar.expr_by_index(index)
  }

  fn production_expr(&self, index: usize) -> usize {
    self.grammar.production_expr(index)
  }
}

impl<'a> Visitor<()> for RecursionFinder<'a>
{
  fn visit_production(&mut self, index: usize) {
    self.visited[index] = true;
    self.reference_path.push(index);
    let expr = self.production_expr(index);
    self.visit_expr(expr);
    self.reference_path.pop();
  }

  fn visit_reference(&mut self, this: usize, target: usize, _memo: bool) {
    if target == self.source {
      self.error_left_recursion(this, target);
      self.recursion = true;
    }
    else if !self.visited[target] {
      self.visit_production(target);
    }
  }

  fn visit_action(&mut self, _this: usize, child: usize, _name: String, _injected: bool) {
    if !self.recursion {
      self.visit_expr(child);
    }
  }

  /// Elements after one that consumes are never reached at the start position.
  fn visit_concatenation(&mut self, _this: usize, children: Vec<usize>) {
    for child in children {
      if self.recursion {
        break;
      }
      self.visit_expr(child);
      if self.consuming.visit_expr(child) {
        break;
      }
    }
  }

  fn visit_alternation(&mut self, _this: usize, children: Vec<usize>) {
    for child in children {
      if self.recursion {
        break;
      }
      self.visit_expr(child);
    }
  }

  fn visit_repetition(&mut self, _this: usize, child: usize, _min: u32, _max: u32) {
    if !self.recursion {
      self.visit_expr(child);
    }
  }

  fn visit_exclusion(&mut self, _this: usize, child: usize, _predicate: Predicate) {
    if !self.recursion {
      self.visit_expr(child);
    }
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::builder::GrammarBuilder;

  fn recursions(builder: &mut GrammarBuilder) -> Vec<String> {
    let grammar = builder.build().unwrap();
    RecursionFinder::analyse(&grammar, &CompilerOptions::default()).into_iter()
      .map(|p| {
        assert_eq!(p.kind, ProblemKind::LeftRecursion);
        p.message
      })
      .collect()
  }

  // Expr : Expr '+' Term / Term ; Term : '0'-'9' ;
  #[test]
  fn test_direct_left_recursion() {
    let mut builder = GrammarBuilder::new();
    builder.start_production("Expr").unwrap()
      .mark()
        .mark()
          .push_reference("Expr", false).unwrap()
          .push_token("+", true).unwrap()
          .push_reference("Term", false).unwrap()
          .concat().unwrap()
        .release().unwrap()
        .push_reference("Term", false).unwrap()
        .choice().unwrap()
      .release().unwrap()
      .end_production().unwrap();
    builder.start_production("Term").unwrap().push_interval('0', '9').unwrap().end_production().unwrap();
    let found = recursions(&mut builder);
    assert_eq!(found.len(), 1);
    assert!(found[0].contains("Expr -> Expr"));
  }

  // Expr : Term ('+' Term)* ; Term : '0'-'9' ;
  #[test]
  fn test_repetition_is_not_left_recursive() {
    let mut builder = GrammarBuilder::new();
    builder.start_production("Expr").unwrap()
      .push_reference("Term", false).unwrap()
      .mark()
        .push_token("+", true).unwrap()
        .push_reference("Term", false).unwrap()
        .concat().unwrap()
      .release().unwrap()
      .zero_or_more().unwrap()
      .end_production().unwrap();
    builder.start_production("Term").unwrap().push_interval('0', '9').unwrap().end_production().unwrap();
    assert!(recursions(&mut builder).is_empty());
  }

  // A : B 'x' ; B : 'y'? A ;
  #[test]
  fn test_indirect_left_recursion() {
    let mut builder = GrammarBuilder::new();
    builder.start_production("A").unwrap()
      .push_reference("B", false).unwrap()
      .push_token("x", true).unwrap()
      .end_production().unwrap();
    builder.start_production("B").unwrap()
      .push_token("y", true).unwrap()
      .optional().unwrap()
      .push_reference("A", false).unwrap()
      .end_production().unwrap();
    let found = recursions(&mut builder);
    assert_eq!(found.len(), 1);
    assert!(found[0].contains("A -> B -> A"));
  }

  // A : !'a' A / 'b' ;
  #[test]
  fn test_predicate_does_not_consume() {
    let mut builder = GrammarBuilder::new();
    builder.start_production("A").unwrap()
      .mark()
        .push_token("a", true).unwrap()
        .not().unwrap()
        .push_reference("A", false).unwrap()
        .concat().unwrap()
      .release().unwrap()
      .push_token("b", true).unwrap()
      .choice().unwrap()
      .end_production().unwrap();
    assert_eq!(recursions(&mut builder).len(), 1);
  }

  // A : 'a' A / 'b' ;
  #[test]
  fn test_right_recursion() {
    let mut builder = GrammarBuilder::new();
    builder.start_production("A").unwrap()
      .mark()
        .push_token("a", true).unwrap()
        .push_reference("A", false).unwrap()
        .concat().unwrap()
      .release().unwrap()
      .push_token("b", true).unwrap()
      .choice().unwrap()
      .end_production().unwrap();
    assert!(recursions(&mut builder).is_empty());
  }

  // S : A ; A : B ; B : B 'x' ;
  #[test]
  fn test_cycle_away_from_source() {
    let mut builder = GrammarBuilder::new();
    builder.start_production("S").unwrap().push_reference("A", false).unwrap().end_production().unwrap();
    builder.start_production("A").unwrap().push_reference("B", false).unwrap().end_production().unwrap();
    builder.start_production("B").unwrap()
      .push_reference("B", false).unwrap()
      .push_token("x", true).unwrap()
      .end_production().unwrap();
    let found = recursions(&mut builder);
    assert_eq!(found.len(), 1);
    assert!(found[0].contains("B -> B"));
  }

  // T : B ; S : B 's' ; B : S? 'z' ;
  #[test]
  fn test_cycle_through_shared_production() {
    let mut builder = GrammarBuilder::new();
    builder.start_production("T").unwrap().push_reference("B", false).unwrap().end_production().unwrap();
    builder.start_production("S").unwrap()
      .push_reference("B", false).unwrap()
      .push_token("s", true).unwrap()
      .end_production().unwrap();
    builder.start_production("B").unwrap()
      .push_reference("S", false).unwrap()
      .optional().unwrap()
      .push_token("z", true).unwrap()
      .end_production().unwrap();
    let found = recursions(&mut builder);
    assert_eq!(found.len(), 1);
    assert!(found[0].contains("S -> B -> S"));
  }
}
