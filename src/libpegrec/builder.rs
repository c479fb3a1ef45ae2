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

//! Stack machine assembling the rule tree of a grammar.
//!
//! The right-hand side of a production is built between `start_production` and
//! `end_production`. Leaves are pushed on a stack and combinators replace the top of the stack
//! by a new node. `mark` opens a segment of the stack: `concat` and `choice` combine the whole
//! segment, `release` merges it into the enclosing one and `reset` discards it.
//!
//! ```
//! use pegrec::GrammarBuilder;
//!
//! let mut builder = GrammarBuilder::new();
//! builder.start_production("Digits").unwrap()
//!   .push_interval('0', '9').unwrap()
//!   .one_or_more().unwrap()
//!   .end_production().unwrap();
//! let grammar = builder.build().unwrap();
//! assert_eq!(grammar.to_string(), "Digits : '0'-'9'+ ;\n");
//! ```

use crate::ast::*;
use crate::error::BuildError;
use crate::middle::inject_undo;
use runtime::LocalStack;
use std::collections::{HashMap, HashSet};

pub type BuildResult<'a> = Result<&'a mut GrammarBuilder, BuildError>;

#[derive(Default)]
pub struct GrammarBuilder
{
  /// Productions in creation order. `Production::index` is the creation order until `build`.
  productions: Vec<Production>,
  registry: HashMap<String, usize>,
  /// Definition order of each production, `None` for placeholders.
  definition_order: Vec<Option<usize>>,
  defined: usize,
  exprs: Vec<ExprNode>,
  stack: LocalStack<usize>,
  /// Arena length at each stack mark.
  arena_marks: Vec<usize>,
  current: Option<usize>,
  known_actions: HashSet<String>,
  source: Option<String>
}

impl GrammarBuilder
{
  pub fn new() -> GrammarBuilder {
    GrammarBuilder::default()
  }

  /// Names of the actions having a handler. Other action names are reported as undefined.
  pub fn with_actions<I, S>(mut self, names: I) -> GrammarBuilder where
   I: IntoIterator<Item=S>,
   S: Into<String>
  {
    self.known_actions.extend(names.into_iter().map(Into::into));
    self
  }

  /// Text the grammar is read from, kept for diagnostic snippets.
  pub fn set_source(&mut self, source: String) {
    self.source = Some(source);
  }

  fn create_production(&mut self, name: &str) -> usize {
    let id = self.productions.len();
    self.productions.push(Production::new(String::from(name), id, 0));
    self.definition_order.push(None);
    id
  }

  /// Existing or placeholder production for `name`.
  fn lookup_production(&mut self, name: &str) -> usize {
    match self.registry.get(name) {
      Some(&id) => id,
      None => {
        let id = self.create_production(name);
        self.registry.insert(String::from(name), id);
        id
      }
    }
  }

  fn define_production(&mut self, name: &str) -> usize {
    let mut id = self.lookup_production(name);
    if self.productions[id].defined {
      self.productions[id].duplicated = true;
      id = self.create_production(name);
      self.productions[id].duplicated = true;
    }
    self.productions[id].defined = true;
    self.definition_order[id] = Some(self.defined);
    self.defined += 1;
    id
  }

  fn owner(&self) -> Result<usize, BuildError> {
    self.current.ok_or(BuildError::NoProduction)
  }

  fn alloc(&mut self, expr: Expression) -> Result<usize, BuildError> {
    let owner = self.owner()?;
    let idx = self.exprs.len();
    self.exprs.push(ExprNode::new(expr, owner));
    Ok(idx)
  }

  /// Allocates `expr` as the parent of its children, with a span covering them.
  fn alloc_parent(&mut self, expr: Expression) -> Result<usize, BuildError> {
    let children = expr.children().to_vec();
    let idx = self.alloc(expr)?;
    for &child in &children {
      self.exprs[child].parent = Some(idx);
    }
    let first = children.first().and_then(|&c| self.exprs[c].span);
    let last = children.last().and_then(|&c| self.exprs[c].span);
    if let (Some(first), Some(last)) = (first, last) {
      self.exprs[idx].span = Some(Span::new(first.start, last.end));
    }
    Ok(idx)
  }

  fn push_expr(&mut self, expr: Expression) -> BuildResult {
    let idx = self.alloc(expr)?;
    self.stack.push(idx);
    Ok(self)
  }

  fn pop(&mut self, operation: &'static str) -> Result<usize, BuildError> {
    self.owner()?;
    self.stack.pop().ok_or(BuildError::EmptyStack(operation))
  }

  pub fn start_production(&mut self, name: &str) -> BuildResult {
    if let Some(current) = self.current {
      return Err(BuildError::UnfinishedProduction(self.productions[current].name.clone()));
    }
    let id = self.define_production(name);
    self.current = Some(id);
    self.mark();
    Ok(self)
  }

  /// The right-hand side is the concatenation of the expressions left on the stack, `Nil`
  /// when there is none.
  pub fn end_production(&mut self) -> BuildResult {
    let id = self.owner()?;
    let items = self.stack.pop_all();
    let root = match items.len() {
      0 => self.alloc(Expression::Terminal(Terminal::Nil))?,
      1 => items[0],
      _ => self.alloc_parent(Expression::Concatenation(items))?
    };
    self.productions[id].expr = root;
    self.stack.release();
    self.arena_marks.pop();
    self.current = None;
    Ok(self)
  }

  pub fn push_terminal(&mut self, terminal: Terminal) -> BuildResult {
    self.push_expr(Expression::Terminal(terminal))
  }

  pub fn push_nil(&mut self) -> BuildResult {
    self.push_terminal(Terminal::Nil)
  }

  pub fn push_any(&mut self) -> BuildResult {
    self.push_terminal(Terminal::Any)
  }

  pub fn push_token(&mut self, image: &str, case_sensitive: bool) -> BuildResult {
    self.push_terminal(Terminal::token(image, case_sensitive))
  }

  /// One token per image.
  pub fn push_tokens(&mut self, images: &[&str], case_sensitive: bool) -> BuildResult {
    for image in images {
      self.push_token(image, case_sensitive)?;
    }
    Ok(self)
  }

  pub fn push_interval(&mut self, lo: char, hi: char) -> BuildResult {
    self.push_terminal(Terminal::interval(lo, hi))
  }

  pub fn push_set(&mut self, set: CharSet) -> BuildResult {
    self.push_terminal(Terminal::Set(set))
  }

  pub fn push_class(&mut self, name: &str) -> BuildResult {
    self.push_terminal(Terminal::Class(CharClass::named(name)))
  }

  /// Reference to the production `name`, created as a placeholder if not yet declared.
  pub fn push_reference(&mut self, name: &str, memo: bool) -> BuildResult {
    self.owner()?;
    let target = self.lookup_production(name);
    self.push_expr(Expression::Reference { target: target, memo: memo })
  }

  fn combine<F>(&mut self, make: F) -> BuildResult where
   F: FnOnce(Vec<usize>) -> Expression
  {
    self.owner()?;
    if self.stack.len() > 1 {
      let items = self.stack.pop_all();
      let idx = self.alloc_parent(make(items))?;
      self.stack.push(idx);
    }
    Ok(self)
  }

  /// Sequence of the expressions of the current segment.
  pub fn concat(&mut self) -> BuildResult {
    self.combine(Expression::Concatenation)
  }

  /// Ordered choice between the expressions of the current segment.
  pub fn choice(&mut self) -> BuildResult {
    self.combine(Expression::Alternation)
  }

  pub fn repeat(&mut self, min: u32, max: u32) -> BuildResult {
    if max < min || max == 0 {
      return Err(BuildError::InvalidRepetition { min: min, max: max });
    }
    let child = self.pop("repeat")?;
    let idx = self.alloc_parent(Expression::Repetition { child: child, min: min, max: max })?;
    self.stack.push(idx);
    Ok(self)
  }

  pub fn quantify(&mut self, quantifier: Quantifier) -> BuildResult {
    let (min, max) = quantifier.bounds();
    self.repeat(min, max)
  }

  pub fn optional(&mut self) -> BuildResult {
    self.quantify(Quantifier::Optional)
  }

  pub fn zero_or_more(&mut self) -> BuildResult {
    self.quantify(Quantifier::ZeroOrMore)
  }

  pub fn one_or_more(&mut self) -> BuildResult {
    self.quantify(Quantifier::OneOrMore)
  }

  pub fn except(&mut self, predicate: Predicate) -> BuildResult {
    let child = self.pop("except")?;
    let idx = self.alloc_parent(Expression::Exclusion { child: child, predicate: predicate })?;
    self.stack.push(idx);
    Ok(self)
  }

  pub fn not(&mut self) -> BuildResult {
    self.except(Predicate::Not)
  }

  pub fn and(&mut self) -> BuildResult {
    self.except(Predicate::And)
  }

  /// Wraps the top expression, or `Nil` on an empty segment, in the action `name`.
  pub fn action(&mut self, name: &str) -> BuildResult {
    self.owner()?;
    let child = match self.stack.pop() {
      Some(child) => child,
      None => self.alloc(Expression::Terminal(Terminal::Nil))?
    };
    let bound = self.known_actions.contains(name);
    let action = Expression::Action {
      child: child,
      name: String::from(name),
      injected: false,
      bound: bound
    };
    let idx = self.alloc_parent(action)?;
    self.stack.push(idx);
    Ok(self)
  }

  pub fn mark(&mut self) -> &mut GrammarBuilder {
    self.stack.mark();
    self.arena_marks.push(self.exprs.len());
    self
  }

  pub fn release(&mut self) -> BuildResult {
    if self.arena_marks.len() <= self.production_marks() || !self.stack.release() {
      return Err(BuildError::UnbalancedMark("release"));
    }
    self.arena_marks.pop();
    Ok(self)
  }

  /// Discards the current segment with every expression built since the matching `mark`.
  pub fn reset(&mut self) -> BuildResult {
    if self.arena_marks.len() <= self.production_marks() || !self.stack.reset() {
      return Err(BuildError::UnbalancedMark("reset"));
    }
    if let Some(len) = self.arena_marks.pop() {
      self.exprs.truncate(len);
    }
    Ok(self)
  }

  /// The mark opened by `start_production` cannot be closed by `release` or `reset`.
  fn production_marks(&self) -> usize {
    if self.current.is_some() { 1 } else { 0 }
  }

  /// Sets the start of the top expression, or of the production if the stack is empty.
  pub fn set_start(&mut self, start: Position) -> BuildResult {
    let id = self.owner()?;
    let span = match self.stack.peek() {
      Some(&top) => &mut self.exprs[top].span,
      None => &mut self.productions[id].span
    };
    let end = span.map_or(start, |s| s.end);
    *span = Some(Span::new(start, end));
    Ok(self)
  }

  pub fn set_end(&mut self, end: Position) -> BuildResult {
    let id = self.owner()?;
    let span = match self.stack.peek() {
      Some(&top) => &mut self.exprs[top].span,
      None => &mut self.productions[id].span
    };
    let start = span.map_or(end, |s| s.start);
    *span = Some(Span::new(start, end));
    Ok(self)
  }

  pub fn set_production_span(&mut self, span: Span) -> BuildResult {
    let id = self.owner()?;
    self.productions[id].span = Some(span);
    Ok(self)
  }

  /// Number of expressions on the current segment.
  pub fn stack_len(&self) -> usize {
    self.stack.len()
  }

  pub fn clear(&mut self) {
    let known_actions = std::mem::take(&mut self.known_actions);
    *self = GrammarBuilder::default();
    self.known_actions = known_actions;
  }

  /// Assembles the grammar and injects the undo actions. Productions are numbered in
  /// definition order, the first defined one is the start rule and never defined placeholders
  /// come last.
  pub fn build(&mut self) -> Result<Grammar, BuildError> {
    if let Some(current) = self.current {
      return Err(BuildError::UnfinishedProduction(self.productions[current].name.clone()));
    }
    let GrammarBuilder { mut productions, definition_order, mut exprs, source, .. } =
      std::mem::take(self);
    let defined = definition_order.iter().filter(|o| o.is_some()).count();
    let mut remap = vec![0; productions.len()];
    let mut next_undefined = defined;
    for (id, order) in definition_order.iter().enumerate() {
      remap[id] = match order {
        Some(order) => *order,
        None => {
          next_undefined += 1;
          next_undefined - 1
        }
      };
    }
    for (id, production) in productions.iter_mut().enumerate() {
      production.index = remap[id];
      if production.is_undefined() {
        production.expr = exprs.len();
        exprs.push(ExprNode::new(Expression::Terminal(Terminal::Nil), id));
      }
    }
    for node in exprs.iter_mut() {
      node.owner = remap[node.owner];
      if let Expression::Reference { ref mut target, .. } = node.expr {
        *target = remap[*target];
      }
    }
    productions.sort_by_key(|p| p.index);
    let mut grammar = Grammar::new(productions, exprs);
    if let Some(source) = source {
      grammar.set_source(source);
    }
    let injected = inject_undo(&mut grammar);
    log::debug!("grammar built: {} productions ({} undefined), {} undo actions injected",
      grammar.len(), grammar.len() - defined, injected);
    Ok(grammar)
  }
}
