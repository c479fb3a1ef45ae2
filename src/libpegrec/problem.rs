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

//! Diagnostics collected while reading and compiling a grammar.

use crate::ast::RuleId;
use runtime::Span;
use std::fmt::{Formatter, Display, Error};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity
{
  Fatal,
  Error,
  Warning,
  Hint
}

impl Severity
{
  pub fn name(self) -> &'static str {
    match self {
      Severity::Fatal => "fatal",
      Severity::Error => "error",
      Severity::Warning => "warning",
      Severity::Hint => "hint"
    }
  }
}

impl Display for Severity
{
  fn fmt(&self, formatter: &mut Formatter) -> Result<(), Error> {
    formatter.write_str(self.name())
  }
}

/// Problem codes. Their declaration order is the order of problems reported at the same
/// location.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ProblemKind
{
  EmptyGrammar,
  SyntaxError,
  InvalidExpression,
  MissingSemi,
  MissingClosingParenthesis,
  UnterminatedString,
  InvalidEscapeSequence,
  InvalidUnicodeCharacter,
  UnterminatedBlockComment,
  LeftRecursion,
  EmptyTerminal,
  UnsupportedClass,
  DuplicateProduction,
  UndefinedProduction,
  UnusedProduction,
  UndefinedAction,
  InefficientTerminal,
  InefficientConcatenation,
  InefficientAlternation
}

impl ProblemKind
{
  pub fn severity(self) -> Severity {
    use self::ProblemKind::*;
    match self {
      EmptyGrammar => Severity::Fatal,
      UnusedProduction
    | UndefinedAction => Severity::Warning,
      InefficientTerminal
    | InefficientConcatenation
    | InefficientAlternation => Severity::Hint,
      _ => Severity::Error
    }
  }

  pub fn code(self) -> &'static str {
    use self::ProblemKind::*;
    match self {
      EmptyGrammar => "EMPTY_GRAMMAR",
      SyntaxError => "SYNTAX_ERROR",
      InvalidExpression => "INVALID_EXPRESSION",
      MissingSemi => "MISSING_SEMI",
      MissingClosingParenthesis => "MISSING_CLOSING_PARENTHESIZE",
      UnterminatedString => "UNTERMINATED_STRING",
      InvalidEscapeSequence => "INVALID_ESCAPE_SEQUENCE",
      InvalidUnicodeCharacter => "INVALID_UNICODE_CHARACTER",
      UnterminatedBlockComment => "UNTERMINATED_BLOCK_COMMENT",
      LeftRecursion => "LEFT_RECURSION",
      EmptyTerminal => "EMPTY_TERMINAL",
      UnsupportedClass => "UNSUPPORTED_CLASS",
      DuplicateProduction => "DUPLICATE_PRODUCTION",
      UndefinedProduction => "UNDEFINED_PRODUCTION",
      UnusedProduction => "UNUSED_PRODUCTION",
      UndefinedAction => "UNDEFINED_ACTION",
      InefficientTerminal => "INEFFICIENT_TERMINAL",
      InefficientConcatenation => "INEFFICIENT_CONCATENATION",
      InefficientAlternation => "INEFFICIENT_ALTERNATION"
    }
  }

  /// Usual way out of the problem.
  pub fn suggestion(self) -> Option<&'static str> {
    use self::ProblemKind::*;
    match self {
      LeftRecursion => Some("rewrite the rule cycle so that one of its rules consumes input before \
        the next one is called, usually with a repetition (`e*` or `e+`)"),
      MissingSemi => Some("terminate the production with `;`"),
      MissingClosingParenthesis => Some("close the group with `)`"),
      DuplicateProduction => Some("rename or remove one of the productions"),
      UndefinedProduction => Some("define the production or fix the reference name"),
      UnusedProduction => Some("remove the production or reference it"),
      UndefinedAction => Some("register a handler under this name"),
      UnsupportedClass => Some("use one of <Lower>, <Upper>, <Title>, <Alpha>, <Digit>, <Alnum>, <Space>"),
      InefficientTerminal => Some("use the simpler terminal"),
      InefficientConcatenation => Some("merge the adjacent tokens into one token"),
      InefficientAlternation => Some("merge the alternatives into one character set"),
      _ => None
    }
  }
}

impl Display for ProblemKind
{
  fn fmt(&self, formatter: &mut Formatter) -> Result<(), Error> {
    formatter.write_str(self.code())
  }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Problem
{
  pub kind: ProblemKind,
  pub rule: Option<RuleId>,
  pub span: Option<Span>,
  pub message: String
}

impl Problem
{
  pub fn new(kind: ProblemKind, rule: Option<RuleId>, span: Option<Span>, message: String) -> Problem {
    Problem {
      kind: kind,
      rule: rule,
      span: span,
      message: message
    }
  }

  pub fn severity(&self) -> Severity {
    self.kind.severity()
  }
}

impl Display for Problem
{
  fn fmt(&self, formatter: &mut Formatter) -> Result<(), Error> {
    if let Some(span) = self.span {
      write!(formatter, "{}: ", span.start)?;
    }
    write!(formatter, "{} [{}]: {}", self.severity(), self.kind, self.message)
  }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct GrammarProblems
{
  problems: Vec<Problem>
}

impl GrammarProblems
{
  pub fn new() -> Self {
    GrammarProblems::default()
  }

  pub fn push(&mut self, problem: Problem) {
    self.problems.push(problem);
  }

  pub fn iter(&self) -> std::slice::Iter<Problem> {
    self.problems.iter()
  }

  pub fn len(&self) -> usize {
    self.problems.len()
  }

  pub fn is_empty(&self) -> bool {
    self.problems.is_empty()
  }

  /// Orders problems by location (unlocated first), then by code.
  pub fn sort(&mut self) {
    self.problems.sort_by_key(|p| (p.span.map(|s| s.start), p.kind));
  }

  /// Drops the problems attached to a rule, the compiler passes raise them again.
  pub fn retain_unbound(&mut self) {
    self.problems.retain(|p| p.rule.is_none());
  }

  pub fn retain<F>(&mut self, f: F) where
   F: FnMut(&Problem) -> bool
  {
    self.problems.retain(f);
  }

  pub fn count(&self, severity: Severity) -> usize {
    self.problems.iter().filter(|p| p.severity() == severity).count()
  }

  pub fn has_kind(&self, kind: ProblemKind) -> bool {
    self.problems.iter().any(|p| p.kind == kind)
  }

  pub fn has_errors(&self) -> bool {
    self.problems.iter().any(|p| p.severity() <= Severity::Error)
  }

  /// `"1 error, 2 warnings"`, or `"no problems"`.
  pub fn summary(&self) -> String {
    let mut parts = vec![];
    for severity in [Severity::Fatal, Severity::Error, Severity::Warning, Severity::Hint] {
      let count = self.count(severity);
      if count > 0 {
        let plural = if count > 1 { "s" } else { "" };
        parts.push(format!("{} {}{}", count, severity, plural));
      }
    }
    if parts.is_empty() {
      String::from("no problems")
    }
    else {
      parts.join(", ")
    }
  }
}

impl Display for GrammarProblems
{
  fn fmt(&self, formatter: &mut Formatter) -> Result<(), Error> {
    for problem in &self.problems {
      writeln!(formatter, "{}", problem)?;
    }
    write!(formatter, "{}", self.summary())
  }
}

impl<'a> IntoIterator for &'a GrammarProblems
{
  type Item = &'a Problem;
  type IntoIter = std::slice::Iter<'a, Problem>;

  fn into_iter(self) -> Self::IntoIter {
    self.problems.iter()
  }
}
