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

#![macro_use]

use std::default::Default;
use crate::ast::*;

pub trait ExprByIndex
{
  fn expr_by_index(&self, index: usize) -> Expression;

  /// Root expression of the production `index`.
  fn production_expr(&self, index: usize) -> usize;
}

impl ExprByIndex for Grammar
{
  fn expr_by_index(&self, index: usize) -> Expression {
    self[index].expr.clone()
  }

  fn production_expr(&self, index: usize) -> usize {
    self.production(index).expr
  }
}

/// Double dispatch over the closed set of expressions. The default of every method visits the
/// children, a reference is a leaf unless `visit_reference` follows it.
pub trait Visitor<R: Default> : ExprByIndex
{
  fn visit_production(&mut self, index: usize) -> R {
    let expr = self.production_expr(index);
    self.visit_expr(expr)
  }

  fn visit_expr(&mut self, this: usize) -> R {
    walk_expr(self, this)
  }

  fn visit_terminal(&mut self, _this: usize, _terminal: Terminal) -> R { R::default() }
  fn visit_reference(&mut self, _this: usize, _target: usize, _memo: bool) -> R { R::default() }

  fn visit_action(&mut self, _this: usize, child: usize, _name: String, _injected: bool) -> R {
    self.visit_expr(child)
  }

  fn visit_concatenation(&mut self, _this: usize, children: Vec<usize>) -> R;
  fn visit_alternation(&mut self, _this: usize, children: Vec<usize>) -> R;

  fn visit_repetition(&mut self, _this: usize, child: usize, _min: u32, _max: u32) -> R {
    self.visit_expr(child)
  }

  fn visit_exclusion(&mut self, _this: usize, child: usize, _predicate: Predicate) -> R {
    self.visit_expr(child)
  }
}

/// We need this macro for factorizing the code since we can not specialize a trait on specific type parameter (we would need to specialize on `()` here).
macro_rules! unit_visitor_impl {
  (concatenation) => (
    fn visit_concatenation(&mut self, _this: usize, children: Vec<usize>) -> () {
      walk_exprs(self, children);
    }
  );
  (alternation) => (
    fn visit_alternation(&mut self, _this: usize, children: Vec<usize>) -> () {
      walk_exprs(self, children);
    }
  );
}

pub fn walk_expr<R: Default, V: ?Sized>(visitor: &mut V, this: usize) -> R where
  V: Visitor<R>
{
  match visitor.expr_by_index(this) {
    Expression::Terminal(terminal) => {
      visitor.visit_terminal(this, terminal)
    }
    Expression::Reference { target, memo } => {
      visitor.visit_reference(this, target, memo)
    }
    Expression::Action { child, name, injected, .. } => {
      visitor.visit_action(this, child, name, injected)
    }
    Expression::Concatenation(children) => {
      visitor.visit_concatenation(this, children)
    }
    Expression::Alternation(children) => {
      visitor.visit_alternation(this, children)
    }
    Expression::Repetition { child, min, max } => {
      visitor.visit_repetition(this, child, min, max)
    }
    Expression::Exclusion { child, predicate } => {
      visitor.visit_exclusion(this, child, predicate)
    }
  }
}

pub fn walk_exprs<R: Default, V: ?Sized>(visitor: &mut V, exprs: Vec<usize>) -> Vec<R> where
  V: Visitor<R>
{
  exprs.into_iter().map(|expr| visitor.visit_expr(expr)).collect()
}
