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

//! Renders rules back into the grammar text syntax. Injected undo actions are transparent.

use crate::ast::*;
use std::fmt::{Formatter, Display, Error};

pub fn escape_char(c: char, quote: char) -> String {
  match c {
    '\\' => String::from("\\\\"),
    '\n' => String::from("\\n"),
    '\r' => String::from("\\r"),
    '\t' => String::from("\\t"),
    '\u{c}' => String::from("\\f"),
    '\u{8}' => String::from("\\b"),
    c if c == quote => format!("\\{}", c),
    c if c.is_control() && (c as u32) <= 0xFFFF => format!("\\u{:04X}", c as u32),
    c => c.to_string()
  }
}

pub fn escape_str(text: &str, quote: char) -> String {
  text.chars().map(|c| escape_char(c, quote)).collect()
}

/// Displays the expression `expr` of `grammar`.
pub struct ExprDisplay<'a>
{
  grammar: &'a Grammar,
  expr: usize
}

impl<'a> ExprDisplay<'a>
{
  pub fn new(grammar: &'a Grammar, expr: usize) -> Self {
    ExprDisplay {
      grammar: grammar,
      expr: expr
    }
  }

  fn child(&self, expr: usize) -> ExprDisplay<'a> {
    ExprDisplay::new(self.grammar, expr)
  }

  /// Skips the injected undo actions.
  fn visible(&self, mut expr: usize) -> usize {
    while let Expression::Action { child, injected: true, .. } = self.grammar[expr].expr {
      expr = child;
    }
    expr
  }

  fn is_atom(&self, expr: usize) -> bool {
    match self.grammar[self.visible(expr)].expr {
      Expression::Terminal(_)
    | Expression::Reference { .. }
    | Expression::Action { .. } => true,
      _ => false
    }
  }

  fn fmt_grouped(&self, formatter: &mut Formatter, expr: usize, grouped: bool) -> Result<(), Error> {
    if grouped {
      write!(formatter, "({})", self.child(expr))
    }
    else {
      write!(formatter, "{}", self.child(expr))
    }
  }

  fn fmt_bounds(&self, formatter: &mut Formatter, min: u32, max: u32) -> Result<(), Error> {
    match Quantifier::of(min, max) {
      Some(quantifier) => write!(formatter, "{}", quantifier.symbol()),
      None if min == max => write!(formatter, "{{{}}}", min),
      None if max == UNBOUNDED => write!(formatter, "{{{},}}", min),
      None => write!(formatter, "{{{},{}}}", min, max)
    }
  }
}

impl<'a> Display for ExprDisplay<'a>
{
  fn fmt(&self, formatter: &mut Formatter) -> Result<(), Error> {
    let expr = self.visible(self.expr);
    match &self.grammar[expr].expr {
      Expression::Terminal(terminal) => terminal.fmt(formatter),
      Expression::Reference { target, memo } => {
        let at = if *memo { "@" } else { "" };
        write!(formatter, "{}{}", at, self.grammar.production(*target).name)
      }
      Expression::Action { child, name, .. } => {
        match self.grammar[*child].expr {
          Expression::Terminal(Terminal::Nil) => write!(formatter, "${}()", name),
          _ => write!(formatter, "${}({})", name, self.child(*child))
        }
      }
      Expression::Concatenation(children) => {
        for (i, &child) in children.iter().enumerate() {
          if i > 0 {
            formatter.write_str(" ")?;
          }
          let grouped = match self.grammar[self.visible(child)].expr {
            Expression::Concatenation(_)
          | Expression::Alternation(_) => true,
            _ => false
          };
          self.fmt_grouped(formatter, child, grouped)?;
        }
        Ok(())
      }
      Expression::Alternation(children) => {
        for (i, &child) in children.iter().enumerate() {
          if i > 0 {
            formatter.write_str(" / ")?;
          }
          let grouped = match self.grammar[self.visible(child)].expr {
            Expression::Alternation(_) => true,
            _ => false
          };
          self.fmt_grouped(formatter, child, grouped)?;
        }
        Ok(())
      }
      Expression::Repetition { child, min, max } => {
        // `!e*` reads `(!e)*`.
        let grouped = match self.grammar[self.visible(*child)].expr {
          Expression::Exclusion { .. } => false,
          _ => !self.is_atom(*child)
        };
        self.fmt_grouped(formatter, *child, grouped)?;
        self.fmt_bounds(formatter, *min, *max)
      }
      Expression::Exclusion { child, predicate } => {
        let symbol = match predicate {
          Predicate::Not => "!",
          Predicate::And => "&"
        };
        formatter.write_str(symbol)?;
        self.fmt_grouped(formatter, *child, !self.is_atom(*child))
      }
    }
  }
}

/// Displays `name : expr ;`.
pub struct ProductionDisplay<'a>
{
  grammar: &'a Grammar,
  index: usize
}

impl<'a> ProductionDisplay<'a>
{
  pub fn new(grammar: &'a Grammar, index: usize) -> Self {
    ProductionDisplay {
      grammar: grammar,
      index: index
    }
  }
}

impl<'a> Display for ProductionDisplay<'a>
{
  fn fmt(&self, formatter: &mut Formatter) -> Result<(), Error> {
    let production = self.grammar.production(self.index);
    write!(formatter, "{} : {} ;", production.name, ExprDisplay::new(self.grammar, production.expr))
  }
}

impl Grammar
{
  pub fn display_expr(&self, expr: usize) -> ExprDisplay {
    ExprDisplay::new(self, expr)
  }

  pub fn display_production(&self, index: usize) -> ProductionDisplay {
    ProductionDisplay::new(self, index)
  }

  /// Short description of a rule for traces and messages.
  pub fn describe(&self, rule: RuleId) -> String {
    match rule {
      RuleId::Production(index) => self.production(index).name.clone(),
      RuleId::Expression(expr) => self.display_expr(expr).to_string()
    }
  }
}

/// Undefined productions are left out.
impl Display for Grammar
{
  fn fmt(&self, formatter: &mut Formatter) -> Result<(), Error> {
    for production in self.productions() {
      if production.defined {
        writeln!(formatter, "{}", self.display_production(production.index))?;
      }
    }
    Ok(())
  }
}
