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

//! Gives a transaction scope to the expressions that can execute an action and still fail.
//!
//! An action commits its changes into the enclosing transaction. If the action is followed by
//! an expression that fails, the enclosing expression fails too but nothing rolls the changes
//! back unless an action encloses the whole expression. This pass wraps these expressions in
//! an injected action without handler, the undo action.
//!
//! It works in two steps:
//!
//! * Every production is marked as modifying (it can execute an action) or not. A production
//!   depending on the mark of a production not yet resolved stays unresolved and the marking is
//!   repeated until no production gets resolved. The remaining productions are cycles without
//!   actions and are marked as non-modifying.
//! * The productions are walked again and the following expressions are wrapped: the
//!   concatenations having a modifying element before their last one, and the predicates whose
//!   body is modifying. An expression already the child of an action is not wrapped.

use crate::ast::*;
use crate::visitor::*;

/// `Some(true)` when an action can be executed, `None` when unknown yet.
type Mark = Option<bool>;

fn merge(x: Mark, y: Mark) -> Mark {
  match (x, y) {
    (Some(true), _)
  | (_, Some(true)) => Some(true),
    (None, _)
  | (_, None) => None,
    _ => Some(false)
  }
}

/// Wraps the expressions of `grammar` that need an undo action. Returns the number of
/// injected actions.
pub fn inject_undo(grammar: &mut Grammar) -> usize {
  let wraps = UndoInjector::collect(grammar);
  for &expr in &wraps {
    grammar.splice_parent(expr, Expression::undo);
  }
  wraps.len()
}

struct UndoInjector<'a>
{
  grammar: &'a Grammar,
  untested: Vec<bool>,
  marks: Vec<Mark>,
  injection: bool,
  wraps: Vec<usize>
}

impl<'a> UndoInjector<'a>
{
  fn collect(grammar: &'a Grammar) -> Vec<usize> {
    let mut injector = UndoInjector {
      grammar: grammar,
      untested: vec![true; grammar.len()],
      marks: vec![None; grammar.len()],
      injection: false,
      wraps: vec![]
    };
    injector.resolve_marks();
    injector.injection = true;
    for index in 0..grammar.len() {
      injector.visit_production(index);
    }
    injector.wraps
  }

  fn resolve_marks(&mut self) {
    let mut unresolved: Vec<usize> = (0..self.grammar.len()).collect();
    while !unresolved.is_empty() {
      for untested in self.untested.iter_mut() {
        *untested = true;
      }
      let before = unresolved.len();
      unresolved.retain(|&index| {
        self.visit_production(index);
        self.marks[index].is_none()
      });
      if unresolved.len() == before {
        break;
      }
    }
    for index in unresolved {
      self.marks[index] = Some(false);
    }
  }

  fn inject(&mut self, expr: usize) {
    let under_action = self.grammar[expr].parent
      .map_or(false, |parent| self.grammar[parent].expr.is_action());
    if !under_action && !self.wraps.contains(&expr) {
      self.wraps.push(expr);
    }
  }
}

impl<'a> ExprByIndex for UndoInjector<'a>
{
  fn expr_by_index(&self, index: usize) -> Expression {
    self.grammar.expr_by_index(index)
  }

  fn production_expr(&self, index: usize) -> usize {
    self.grammar.production_expr(index)
  }
}

impl<'a> Visitor<Mark> for UndoInjector<'a>
{
  fn visit_production(&mut self, index: usize) -> Mark {
    let expr = self.production_expr(index);
    if self.injection {
      return self.visit_expr(expr);
    }
    if self.marks[index].is_none() && self.untested[index] {
      self.untested[index] = false;
      let mark = self.visit_expr(expr);
      self.marks[index] = mark;
    }
    self.marks[index]
  }

  fn visit_terminal(&mut self, _this: usize, _terminal: Terminal) -> Mark {
    Some(false)
  }

  fn visit_reference(&mut self, _this: usize, target: usize, _memo: bool) -> Mark {
    if self.injection {
      self.marks[target]
    }
    else {
      self.visit_production(target)
    }
  }

  fn visit_action(&mut self, _this: usize, child: usize, _name: String, _injected: bool) -> Mark {
    self.visit_expr(child);
    Some(true)
  }

  fn visit_concatenation(&mut self, this: usize, children: Vec<usize>) -> Mark {
    let (last, init) = match children.split_last() {
      Some(split) => split,
      None => return Some(false)
    };
    let mut modify = Some(false);
    for &child in init {
      let mark = self.visit_expr(child);
      modify = merge(modify, mark);
    }
    if self.injection && modify == Some(true) {
      self.inject(this);
    }
    let mark = self.visit_expr(*last);
    merge(modify, mark)
  }

  fn visit_alternation(&mut self, _this: usize, children: Vec<usize>) -> Mark {
    let mut modify = Some(false);
    for child in children {
      let mark = self.visit_expr(child);
      modify = merge(modify, mark);
    }
    modify
  }

  fn visit_exclusion(&mut self, this: usize, child: usize, _predicate: Predicate) -> Mark {
    let mark = self.visit_expr(child);
    if self.injection && mark == Some(true) {
      self.inject(this);
    }
    Some(false)
  }
}
