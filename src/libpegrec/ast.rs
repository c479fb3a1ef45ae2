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

//! Rule tree of a grammar shared by the builder, the compiling passes and the recognizer.
//!
//! Expressions live in a single arena owned by the grammar and refer to each other by index.
//! A reference to a production is the index of that production, never a second owner.

pub use crate::terminal::*;
pub use crate::problem::*;
pub use runtime::{Position, Span};
pub use partial::Partial;

use std::collections::BTreeSet;
use std::ops::{Index, IndexMut};
use std::slice;

/// Upper bound of an unbounded repetition.
pub const UNBOUNDED: u32 = u32::MAX;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Predicate
{
  Not, // !e
  And, // &e
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Quantifier
{
  Optional, // e?
  ZeroOrMore, // e*
  OneOrMore, // e+
}

impl Quantifier
{
  pub fn of(min: u32, max: u32) -> Option<Quantifier> {
    match (min, max) {
      (0, 1) => Some(Quantifier::Optional),
      (0, UNBOUNDED) => Some(Quantifier::ZeroOrMore),
      (1, UNBOUNDED) => Some(Quantifier::OneOrMore),
      _ => None
    }
  }

  pub fn bounds(self) -> (u32, u32) {
    match self {
      Quantifier::Optional => (0, 1),
      Quantifier::ZeroOrMore => (0, UNBOUNDED),
      Quantifier::OneOrMore => (1, UNBOUNDED)
    }
  }

  pub fn symbol(self) -> char {
    match self {
      Quantifier::Optional => '?',
      Quantifier::ZeroOrMore => '*',
      Quantifier::OneOrMore => '+'
    }
  }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Expression
{
  Terminal(Terminal),
  Reference { target: usize, memo: bool }, // Name or @Name
  /// `$name(e)`. The compiler injects undo actions: they have an empty name and no handler.
  Action { child: usize, name: String, injected: bool, bound: bool },
  Concatenation(Vec<usize>), // e1 e2
  Alternation(Vec<usize>), // e1 / e2
  Repetition { child: usize, min: u32, max: u32 }, // e{min,max}
  Exclusion { child: usize, predicate: Predicate }, // !e or &e
}

impl Expression
{
  pub fn undo(child: usize) -> Expression {
    Expression::Action {
      child: child,
      name: String::new(),
      injected: true,
      bound: false
    }
  }

  pub fn children(&self) -> &[usize] {
    match self {
      Expression::Terminal(_)
    | Expression::Reference { .. } => &[],
      Expression::Action { child, .. }
    | Expression::Repetition { child, .. }
    | Expression::Exclusion { child, .. } => slice::from_ref(child),
      Expression::Concatenation(children)
    | Expression::Alternation(children) => children
    }
  }

  pub fn children_mut(&mut self) -> &mut [usize] {
    match self {
      Expression::Terminal(_)
    | Expression::Reference { .. } => &mut [],
      Expression::Action { child, .. }
    | Expression::Repetition { child, .. }
    | Expression::Exclusion { child, .. } => slice::from_mut(child),
      Expression::Concatenation(children)
    | Expression::Alternation(children) => children
    }
  }

  pub fn is_action(&self) -> bool {
    match self {
      Expression::Action { .. } => true,
      _ => false
    }
  }

  /// A user action whose name matched no handler when the grammar was built.
  pub fn is_undefined_action(&self) -> bool {
    match self {
      Expression::Action { injected: false, bound: false, .. } => true,
      _ => false
    }
  }

  pub fn kind(&self) -> &'static str {
    match self {
      Expression::Terminal(_) => "terminal",
      Expression::Reference { .. } => "reference",
      Expression::Action { .. } => "action",
      Expression::Concatenation(_) => "concatenation",
      Expression::Alternation(_) => "alternation",
      Expression::Repetition { .. } => "repetition",
      Expression::Exclusion { .. } => "exclusion"
    }
  }
}

/// An expression in the arena, with its owning production and its parent (`None` at the root
/// of a right-hand side).
#[derive(Clone, Debug)]
pub struct ExprNode
{
  pub expr: Expression,
  pub owner: usize,
  pub parent: Option<usize>,
  pub span: Option<Span>
}

impl ExprNode
{
  pub fn new(expr: Expression, owner: usize) -> ExprNode {
    ExprNode {
      expr: expr,
      owner: owner,
      parent: None,
      span: None
    }
  }
}

#[derive(Clone, Debug)]
pub struct Production
{
  pub name: String,
  pub index: usize,
  /// Root of the right-hand side. Undefined productions have a `Nil` terminal here.
  pub expr: usize,
  pub defined: bool,
  pub duplicated: bool,
  pub span: Option<Span>,
  /// References targeting this production.
  pub references: Vec<usize>,
  /// Productions containing a reference to this production.
  pub referenced_by: BTreeSet<usize>
}

impl Production
{
  pub fn new(name: String, index: usize, expr: usize) -> Production {
    Production {
      name: name,
      index: index,
      expr: expr,
      defined: false,
      duplicated: false,
      span: None,
      references: vec![],
      referenced_by: BTreeSet::new()
    }
  }

  pub fn is_undefined(&self) -> bool {
    !self.defined
  }

  /// Not referenced by any other production.
  pub fn is_standalone(&self) -> bool {
    self.referenced_by.iter().all(|&by| by == self.index)
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RuleId
{
  Production(usize),
  Expression(usize)
}

#[derive(Clone, Debug, Default)]
pub struct Grammar
{
  productions: Vec<Production>,
  exprs: Vec<ExprNode>,
  problems: GrammarProblems,
  source: Option<String>
}

impl Grammar
{
  pub fn new(productions: Vec<Production>, exprs: Vec<ExprNode>) -> Grammar {
    let mut grammar = Grammar {
      productions: productions,
      exprs: exprs,
      problems: GrammarProblems::new(),
      source: None
    };
    grammar.link_references();
    grammar
  }

  /// Rebuilds the back-links of productions from the references of the arena.
  fn link_references(&mut self) {
    for production in &mut self.productions {
      production.references.clear();
      production.referenced_by.clear();
    }
    for (idx, node) in self.exprs.iter().enumerate() {
      if let Expression::Reference { target, .. } = node.expr {
        let production = &mut self.productions[target];
        production.references.push(idx);
        production.referenced_by.insert(node.owner);
      }
    }
  }

  pub fn start(&self) -> Option<&Production> {
    self.productions.first()
  }

  pub fn productions(&self) -> &[Production] {
    &self.productions
  }

  pub fn production(&self, index: usize) -> &Production {
    &self.productions[index]
  }

  /// The production registered under `name`, duplicates excluded.
  pub fn find_production(&self, name: &str) -> Option<&Production> {
    self.productions.iter().find(|p| p.name == name && !p.duplicated)
      .or_else(|| self.productions.iter().find(|p| p.name == name))
  }

  pub fn exprs(&self) -> &[ExprNode] {
    &self.exprs
  }

  pub fn len(&self) -> usize {
    self.productions.len()
  }

  pub fn is_empty(&self) -> bool {
    self.productions.is_empty()
  }

  pub fn problems(&self) -> &GrammarProblems {
    &self.problems
  }

  pub fn problems_mut(&mut self) -> &mut GrammarProblems {
    &mut self.problems
  }

  pub fn problems_of(&self, rule: RuleId) -> impl Iterator<Item=&Problem> {
    self.problems.iter().filter(move |p| p.rule == Some(rule))
  }

  pub fn has_errors(&self) -> bool {
    self.problems.has_errors()
  }

  /// Appends a problem bound to `rule` and located at its span.
  pub fn report(&mut self, kind: ProblemKind, rule: RuleId, message: String) {
    let span = self.rule_span(rule);
    self.problems.push(Problem::new(kind, Some(rule), span, message));
  }

  pub fn rule_span(&self, rule: RuleId) -> Option<Span> {
    match rule {
      RuleId::Production(index) => self.productions[index].span,
      RuleId::Expression(expr) => self.exprs[expr].span
    }
  }

  /// Name of the production owning `expr`.
  pub fn owner_name(&self, expr: usize) -> &str {
    &self.productions[self.exprs[expr].owner].name
  }

  pub fn source(&self) -> Option<&str> {
    self.source.as_ref().map(|s| s.as_str())
  }

  pub fn set_source(&mut self, source: String) {
    self.source = Some(source);
  }

  /// Line `line` (starting at 1) of the source text, without its terminator.
  pub fn source_line(&self, line: usize) -> Option<&str> {
    let source = self.source.as_ref()?;
    if line == 0 {
      return None;
    }
    let mut current = 1;
    let mut start = 0;
    let bytes = source.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
      if bytes[i] == b'\n' || bytes[i] == b'\r' {
        if current == line {
          return Some(&source[start..i]);
        }
        if bytes[i] == b'\r' && i + 1 < bytes.len() && bytes[i + 1] == b'\n' {
          i += 1;
        }
        current += 1;
        start = i + 1;
      }
      i += 1;
    }
    if current == line { Some(&source[start..]) } else { None }
  }

  /// Source text covered by `span`, lines joined with `\n`.
  pub fn snippet(&self, span: &Span) -> Option<String> {
    let mut lines = vec![];
    for line in span.start.line..(span.end.line + 1) {
      let text: Vec<char> = self.source_line(line)?.chars().collect();
      let from = if line == span.start.line { span.start.column - 1 } else { 0 };
      let to = if line == span.end.line { span.end.column - 1 } else { text.len() };
      let to = to.min(text.len());
      let from = from.min(to);
      lines.push(text[from..to].iter().collect::<String>());
    }
    Some(lines.join("\n"))
  }

  /// Wraps `expr` into a new node built by `wrap` from the index of `expr`. The new node takes
  /// the place of `expr` in its parent or as root of its production. Returns the new index.
  pub fn splice_parent<F>(&mut self, expr: usize, wrap: F) -> usize where
   F: FnOnce(usize) -> Expression
  {
    let wrapper = self.exprs.len();
    let owner = self.exprs[expr].owner;
    let parent = self.exprs[expr].parent;
    let span = self.exprs[expr].span;
    self.exprs.push(ExprNode {
      expr: wrap(expr),
      owner: owner,
      parent: parent,
      span: span
    });
    match parent {
      Some(parent) => {
        for child in self.exprs[parent].expr.children_mut() {
          if *child == expr {
            *child = wrapper;
          }
        }
      }
      None => {
        let production = &mut self.productions[owner];
        if production.expr == expr {
          production.expr = wrapper;
        }
      }
    }
    self.exprs[expr].parent = Some(wrapper);
    wrapper
  }

  /// Turns a plain reference into a memoized one or the converse.
  pub fn set_memo(&mut self, reference: usize, memoized: bool) {
    if let Expression::Reference { ref mut memo, .. } = self.exprs[reference].expr {
      *memo = memoized;
    }
  }
}

impl Index<usize> for Grammar
{
  type Output = ExprNode;

  fn index<'a>(&'a self, index: usize) -> &'a Self::Output {
    &self.exprs[index]
  }
}

impl IndexMut<usize> for Grammar
{
  fn index_mut<'a>(&'a mut self, index: usize) -> &'a mut Self::Output {
    &mut self.exprs[index]
  }
}

/// `A -> B -> A` for the path `[A, B]`.
pub fn display_path_cycle(path: &[String]) -> String {
  let mut path_desc = String::new();
  for rule in path {
    path_desc.push_str(&format!("{} -> ", rule));
  }
  if let Some(first) = path.first() {
    path_desc.push_str(first);
  }
  path_desc
}
