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

//! Reader of the grammar text.
//!
//! ```text
//! Production ::= Identifier (':' / '=' / '<-' / '::=') Expression ';'
//! Expression ::= Sequence (('/' / '|') Sequence)*
//! Sequence   ::= Unary+
//! Unary      ::= ('!' / '&')? Operand ('?' / '*' / '+' / '{' n (',' m?)? '}')?
//! Operand    ::= 'text' / "text" / 'a'-'z' / [set] / <Class> / . / @?Name / (Expression)
//!              / $name(Expression?)
//! ```
//!
//! A quantifier applies to the predicate before it: `!e*` reads `(!e)*`. A problem inside a
//! production is reported and the reader skips to the next `;`, text between productions is
//! skipped up to the next production head. Every problem of the text is thus reported in a
//! single run.

use crate::ast::*;
use crate::builder::GrammarBuilder;
use crate::error::BuildError;
use crate::middle::{compile, CompilerOptions};
use runtime::BacktrackingStream;

type Parse = Result<bool, BuildError>;

pub struct GrammarParser<'a>
{
  text: &'a str,
  stream: BacktrackingStream<'a>,
  builder: GrammarBuilder,
  problems: Vec<Problem>,
  /// End of the last token, before the spacing following it.
  token_end: Position
}

impl<'a> GrammarParser<'a>
{
  pub fn new(text: &'a str) -> GrammarParser<'a> {
    GrammarParser {
      text: text,
      stream: BacktrackingStream::from_str(text),
      builder: GrammarBuilder::new(),
      problems: vec![],
      token_end: Position::origin()
    }
  }

  /// Names of the actions having a handler, the other ones are reported as undefined.
  pub fn with_actions<I, S>(mut self, names: I) -> GrammarParser<'a> where
   I: IntoIterator<Item=S>,
   S: Into<String>
  {
    self.builder = self.builder.with_actions(names);
    self
  }

  /// Reads and compiles `text` with the default options.
  pub fn parse(text: &str) -> Partial<Grammar> {
    GrammarParser::new(text).compile(&CompilerOptions::default())
  }

  pub fn compile(self, options: &CompilerOptions) -> Partial<Grammar> {
    match self.read() {
      Ok(grammar) => compile(grammar, options),
      Err(err) => {
        log::error!("the grammar reader misused the builder: {}", err);
        Partial::Nothing
      }
    }
  }

  /// Builds the grammar without analysing it, it only carries the problems of the text.
  pub fn read(mut self) -> Result<Grammar, BuildError> {
    self.builder.set_source(String::from(self.text));
    let count = self.grammar()?;
    let mut grammar = self.builder.build()?;
    for problem in self.problems.drain(..) {
      grammar.problems_mut().push(problem);
    }
    grammar.problems_mut().sort();
    log::debug!("grammar read: {} productions, {}", count, grammar.problems().summary());
    Ok(grammar)
  }

  fn report(&mut self, kind: ProblemKind, start: Position, end: Position, message: &str) {
    log::trace!("{}: {} [{}], recovering", start, message, kind);
    self.problems.push(Problem::new(kind, None, Some(Span::new(start, end)), String::from(message)));
  }

  /// Spans the top expression of the builder from `start` to `end`.
  fn locate(&mut self, start: Position, end: Position) -> Result<(), BuildError> {
    self.builder.set_start(start)?.set_end(end)?;
    Ok(())
  }

  fn here(&self) -> Position {
    self.stream.position()
  }

  fn eat(&mut self, text: &str) -> bool {
    self.stream.consume_prefix(text, true)
  }

  fn grammar(&mut self) -> Result<usize, BuildError> {
    let mut count = 0;
    self.spacing();
    while !self.stream.at_end() {
      if self.at_production_head() {
        self.production()?;
        count += 1;
      }
      else {
        self.garbage();
      }
      self.spacing();
    }
    if count == 0 {
      let eof = self.here();
      self.report(ProblemKind::EmptyGrammar, eof, eof, "at least one production must be declared");
    }
    Ok(count)
  }

  /// Skips the text up to the next production head, strings as a whole.
  fn garbage(&mut self) {
    let start = self.here();
    let mut end = start;
    while !self.stream.at_end() && !self.at_production_head() {
      self.skip_item();
      end = self.here();
      self.skip_spacing(true);
    }
    self.report(ProblemKind::SyntaxError, start, end, "expecting a production `Name : expression ;`");
  }

  fn skip_item(&mut self) {
    match self.stream.peek() {
      Some(quote @ '\'') | Some(quote @ '"') => { self.skip_string(quote); }
      _ => { self.stream.read(); }
    }
  }

  fn skip_string(&mut self, quote: char) {
    self.stream.read();
    while let Some(c) = self.stream.peek() {
      if c == '\n' {
        break;
      }
      self.stream.read();
      if c == quote {
        break;
      }
      if c == '\\' && self.stream.peek() != Some('\n') {
        self.stream.read();
      }
    }
  }

  fn at_production_head(&mut self) -> bool {
    self.stream.mark();
    let head = self.identifier().is_some() && {
      self.skip_spacing(false);
      self.assignment()
    };
    self.stream.reset();
    head
  }

  fn assignment(&mut self) -> bool {
    self.eat("::=") || self.eat(":") || self.eat("=") || self.eat("<-")
  }

  fn identifier(&mut self) -> Option<String> {
    match self.stream.peek() {
      Some(c) if c.is_alphabetic() || c == '_' => (),
      _ => return None
    }
    let mut name = String::new();
    while let Some(c) = self.stream.peek() {
      if !(c.is_alphanumeric() || c == '_') {
        break;
      }
      name.push(c);
      self.stream.read();
    }
    Some(name)
  }

  fn production(&mut self) -> Result<(), BuildError> {
    let start = self.here();
    let name = self.identifier().unwrap_or_default();
    self.spacing();
    self.assignment();
    self.spacing();
    self.builder.start_production(&name)?;
    if !self.expression()? && self.stream.peek() == Some(';') {
      let here = self.here();
      self.report(ProblemKind::SyntaxError, here, here, "expecting an expression before `;`");
    }
    self.terminate();
    let end = self.here();
    self.builder.set_production_span(Span::new(start, end))?;
    self.builder.end_production()?;
    Ok(())
  }

  /// Reads the `;` closing a production. Unreadable text in front of it is an invalid
  /// expression.
  fn terminate(&mut self) {
    if self.eat(";") {
      return;
    }
    if !self.stream.at_end() && !self.at_production_head() {
      let start = self.here();
      let mut end = start;
      while !self.stream.at_end() && self.stream.peek() != Some(';') && !self.at_production_head() {
        self.skip_item();
        end = self.here();
        self.skip_spacing(false);
      }
      self.report(ProblemKind::InvalidExpression, start, end, "invalid expression");
      if self.eat(";") {
        return;
      }
    }
    let here = self.token_end;
    self.report(ProblemKind::MissingSemi, here, here, "missing `;` at the end of the production");
  }

  fn expression(&mut self) -> Parse {
    let start = self.here();
    self.builder.mark();
    if !self.sequence()? {
      self.builder.reset()?;
      return Ok(false);
    }
    while self.eat("/") || self.eat("|") {
      self.spacing();
      if !self.sequence()? {
        let here = self.here();
        self.report(ProblemKind::SyntaxError, here, here, "expecting an alternative after `/`");
        break;
      }
    }
    self.builder.choice()?;
    let end = self.token_end;
    self.locate(start, end)?;
    self.builder.release()?;
    Ok(true)
  }

  fn sequence(&mut self) -> Parse {
    let start = self.here();
    self.builder.mark();
    let mut count = 0;
    while self.unary()? {
      count += 1;
    }
    if count == 0 {
      self.builder.reset()?;
      return Ok(false);
    }
    self.builder.concat()?;
    let end = self.token_end;
    self.locate(start, end)?;
    self.builder.release()?;
    Ok(true)
  }

  /// A quantifier applies to the predicate: `!e*` reads `(!e)*`.
  fn unary(&mut self) -> Parse {
    let start = self.here();
    self.stream.mark();
    let predicate =
      if self.eat("!") { Some(Predicate::Not) }
      else if self.eat("&") { Some(Predicate::And) }
      else { None };
    if predicate.is_some() {
      self.spacing();
    }
    if !self.operand()? {
      self.stream.reset();
      return Ok(false);
    }
    self.stream.release();
    if let Some(predicate) = predicate {
      self.builder.except(predicate)?;
      let end = self.token_end;
      self.locate(start, end)?;
    }
    self.suffix(start)?;
    Ok(true)
  }

  fn suffix(&mut self, start: Position) -> Result<(), BuildError> {
    let quantifier = match self.stream.peek() {
      Some('?') => Some(Quantifier::Optional),
      Some('*') => Some(Quantifier::ZeroOrMore),
      Some('+') => Some(Quantifier::OneOrMore),
      _ => None
    };
    if let Some(quantifier) = quantifier {
      self.stream.read();
      let end = self.here();
      self.builder.quantify(quantifier)?;
      self.locate(start, end)?;
      self.spacing();
    }
    else if self.stream.peek() == Some('{') {
      self.bounds(start)?;
    }
    Ok(())
  }

  /// `{n}`, `{n,}` or `{n,m}`.
  fn bounds(&mut self, start: Position) -> Result<(), BuildError> {
    let open = self.here();
    self.stream.read();
    self.spacing();
    let bounds = match self.integer() {
      Some(min) if self.eat(",") => {
        self.spacing();
        match self.stream.peek() {
          Some(c) if c.is_ascii_digit() => self.integer().map(|max| (min, max)),
          _ => Some((min, UNBOUNDED))
        }
      }
      Some(min) => Some((min, min)),
      None => None
    };
    let closed = bounds.is_some() && self.eat("}");
    if !closed {
      while let Some(c) = self.stream.peek() {
        if c == '}' || c == ';' || c == '\n' {
          break;
        }
        self.stream.read();
      }
      self.eat("}");
      let end = self.here();
      self.report(ProblemKind::InvalidExpression, open, end, "malformed repetition bounds");
    }
    else {
      let end = self.here();
      match bounds {
        Some((min, max)) if min <= max && max > 0 => {
          self.builder.repeat(min, max)?;
          self.locate(start, end)?;
        }
        _ => self.report(ProblemKind::InvalidExpression, open, end,
          "invalid repetition bounds, expecting 0 < max and min <= max")
      }
    }
    self.spacing();
    Ok(())
  }

  /// Decimal integer followed by spacing. Digits are consumed even when the value overflows.
  fn integer(&mut self) -> Option<u32> {
    let mut digits = String::new();
    while let Some(c) = self.stream.peek() {
      if !c.is_ascii_digit() {
        break;
      }
      digits.push(c);
      self.stream.read();
    }
    if digits.is_empty() {
      return None;
    }
    self.spacing();
    digits.parse().ok()
  }

  fn operand(&mut self) -> Parse {
    let start = self.here();
    match self.stream.peek() {
      Some('\'') => self.token(start, '\''),
      Some('"') => self.token(start, '"'),
      Some('[') => {
        let set = self.nested_set();
        self.builder.push_set(set)?;
        let end = self.here();
        self.locate(start, end)?;
        self.spacing();
        Ok(true)
      }
      Some('<') => self.class(start),
      Some('.') => {
        self.stream.read();
        self.builder.push_any()?;
        let end = self.here();
        self.locate(start, end)?;
        self.spacing();
        Ok(true)
      }
      Some('(') => self.grouping(),
      Some('$') => self.action(start),
      Some('@') => self.reference(start),
      Some(c) if c.is_alphabetic() || c == '_' => self.reference(start),
      _ => Ok(false)
    }
  }

  /// `Name` or `@Name`. A name starting the next production is not a reference.
  fn reference(&mut self, start: Position) -> Parse {
    if self.at_production_head() {
      return Ok(false);
    }
    self.stream.mark();
    let memo = self.eat("@");
    match self.identifier() {
      Some(name) => {
        self.stream.release();
        self.builder.push_reference(&name, memo)?;
        let end = self.here();
        self.locate(start, end)?;
        self.spacing();
        Ok(true)
      }
      None => {
        self.stream.reset();
        Ok(false)
      }
    }
  }

  fn grouping(&mut self) -> Parse {
    self.stream.mark();
    self.stream.read();
    self.spacing();
    if !self.expression()? {
      self.stream.reset();
      return Ok(false);
    }
    self.stream.release();
    if !self.eat(")") {
      let here = self.token_end;
      self.report(ProblemKind::MissingClosingParenthesis, here, here, "missing `)`");
    }
    self.spacing();
    Ok(true)
  }

  /// `$name(e)`, or `$name()` acting on the empty text.
  fn action(&mut self, start: Position) -> Parse {
    self.stream.mark();
    self.stream.read();
    let name = match self.identifier() {
      Some(name) => name,
      None => {
        self.stream.reset();
        return Ok(false);
      }
    };
    self.skip_spacing(false);
    if !self.eat("(") {
      self.stream.reset();
      return Ok(false);
    }
    self.stream.release();
    self.spacing();
    self.builder.mark();
    self.expression()?;
    if !self.eat(")") {
      let here = self.token_end;
      self.report(ProblemKind::MissingClosingParenthesis, here, here, "missing `)`");
    }
    let end = self.here();
    self.builder.action(&name)?;
    self.locate(start, end)?;
    self.builder.release()?;
    self.spacing();
    Ok(true)
  }

  fn class(&mut self, start: Position) -> Parse {
    self.stream.mark();
    self.stream.read();
    self.skip_spacing(false);
    let name = self.identifier();
    self.skip_spacing(false);
    match name {
      Some(name) if self.eat(">") => {
        self.stream.release();
        self.builder.push_class(&name)?;
        let end = self.here();
        self.locate(start, end)?;
        self.spacing();
        Ok(true)
      }
      _ => {
        self.stream.reset();
        Ok(false)
      }
    }
  }

  /// `'text'` (case sensitive), `"text"` (case insensitive) or the interval `'a'-'z'`.
  fn token(&mut self, start: Position, quote: char) -> Parse {
    if quote == '\'' {
      if let Some((lo, hi)) = self.interval() {
        self.builder.push_interval(lo, hi)?;
        let end = self.here();
        self.locate(start, end)?;
        self.spacing();
        return Ok(true);
      }
    }
    let image = self.string(quote);
    self.builder.push_token(&image, quote == '\'')?;
    let end = self.here();
    self.locate(start, end)?;
    self.spacing();
    Ok(true)
  }

  /// Looks for `'a' - 'z'` without reporting anything, the stream is unchanged on failure.
  fn interval(&mut self) -> Option<(char, char)> {
    self.stream.mark();
    let lo = self.quiet_char();
    self.skip_spacing(false);
    let bounds = match lo {
      Some(lo) if self.eat("-") => {
        self.skip_spacing(false);
        self.quiet_char().map(|hi| (lo, hi))
      }
      _ => None
    };
    if bounds.is_some() {
      self.stream.release();
    }
    else {
      self.stream.reset();
    }
    bounds
  }

  /// A single quoted character, `None` if the text is anything else.
  fn quiet_char(&mut self) -> Option<char> {
    if !self.eat("'") {
      return None;
    }
    let c = match self.stream.peek() {
      Some('\\') => self.escape(false)?,
      Some('\'') | Some('\n') | None => return None,
      Some(c) => {
        self.stream.read();
        c
      }
    };
    if self.eat("'") { Some(c) } else { None }
  }

  /// Decoded content of a string delimited by `quote`. A string is terminated on its line.
  fn string(&mut self, quote: char) -> String {
    let start = self.here();
    self.stream.read();
    let mut text = String::new();
    loop {
      match self.stream.peek() {
        None | Some('\n') => {
          let end = self.here();
          self.report(ProblemKind::UnterminatedString, start, end, "unterminated string");
          break;
        }
        Some(c) if c == quote => {
          self.stream.read();
          break;
        }
        Some('\\') => {
          if let Some(c) = self.escape(true) {
            text.push(c);
          }
        }
        Some(c) => {
          self.stream.read();
          text.push(c);
        }
      }
    }
    text
  }

  /// `\n \r \t \f \b \\ \' \"` or `\uXXXX`.
  fn escape(&mut self, report: bool) -> Option<char> {
    let start = self.here();
    self.stream.read();
    let c = match self.stream.peek() {
      Some('n') => '\n',
      Some('r') => '\r',
      Some('t') => '\t',
      Some('f') => '\u{c}',
      Some('b') => '\u{8}',
      Some(c @ '\\') | Some(c @ '\'') | Some(c @ '"') => c,
      Some('u') => {
        self.stream.read();
        return self.unicode(start, report);
      }
      next => {
        if next.map_or(false, |c| c != '\n') {
          self.stream.read();
        }
        if report {
          let end = self.here();
          self.report(ProblemKind::InvalidEscapeSequence, start, end, "invalid escape sequence");
        }
        return None;
      }
    };
    self.stream.read();
    Some(c)
  }

  fn unicode(&mut self, start: Position, report: bool) -> Option<char> {
    let mut digits = String::new();
    while digits.len() < 4 {
      match self.stream.peek() {
        Some(c) if c.is_ascii_hexdigit() => {
          digits.push(c);
          self.stream.read();
        }
        _ => break
      }
    }
    let decoded =
      if digits.len() == 4 { u32::from_str_radix(&digits, 16).ok().and_then(char::from_u32) }
      else { None };
    if decoded.is_none() && report {
      let end = self.here();
      self.report(ProblemKind::InvalidUnicodeCharacter, start, end, "invalid unicode character");
    }
    decoded
  }

  /// `[e1, e2, ...]`. The stream is past `]`, or at the end of the line on a malformed set.
  fn nested_set(&mut self) -> CharSet {
    self.stream.read();
    self.spacing();
    let mut set = CharSet::new();
    if self.stream.peek() != Some(']') {
      loop {
        match self.set_element() {
          Some(element) => set = set.union(&element),
          None => {
            self.skip_set();
            return set;
          }
        }
        if !self.eat(",") {
          break;
        }
        self.spacing();
      }
    }
    if !self.eat("]") {
      let here = self.here();
      self.report(ProblemKind::SyntaxError, here, here, "expecting `,` or `]` in the set");
      self.skip_set();
    }
    set
  }

  fn skip_set(&mut self) {
    while let Some(c) = self.stream.peek() {
      if c == ';' || c == '\n' {
        break;
      }
      self.stream.read();
      if c == ']' {
        break;
      }
    }
  }

  /// `'c'`, `'a'-'z'`, `~element` or a nested set.
  fn set_element(&mut self) -> Option<CharSet> {
    match self.stream.peek() {
      Some('~') => {
        self.stream.read();
        self.spacing();
        self.set_element().map(|set| set.inverse())
      }
      Some('[') => {
        let set = self.nested_set();
        self.spacing();
        Some(set)
      }
      Some('\'') => {
        let lo = self.set_char()?;
        let hi = if self.eat("-") {
          self.spacing();
          self.set_char()?
        }
        else {
          lo
        };
        Some(CharSet::from_intervals(vec![CharacterInterval::new(lo, hi)]))
      }
      _ => {
        let here = self.here();
        self.report(ProblemKind::SyntaxError, here, here, "expecting a set element");
        None
      }
    }
  }

  fn set_char(&mut self) -> Option<char> {
    let start = self.here();
    let text = self.string('\'');
    let end = self.here();
    self.spacing();
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
      (Some(c), None) => Some(c),
      _ => {
        self.report(ProblemKind::SyntaxError, start, end, "a set element is a single character");
        None
      }
    }
  }

  fn spacing(&mut self) {
    self.token_end = self.here();
    self.skip_spacing(true);
  }

  /// White spaces, `// line` and `/* block */` comments.
  fn skip_spacing(&mut self, report: bool) {
    loop {
      match self.stream.peek() {
        Some(c) if c.is_whitespace() => { self.stream.read(); }
        Some('/') => match self.stream.peek_nth(1) {
          Some('/') => { self.stream.read_line(); }
          Some('*') => self.block_comment(report),
          _ => return
        },
        _ => return
      }
    }
  }

  fn block_comment(&mut self, report: bool) {
    let start = self.here();
    self.stream.skip(2);
    while !self.eat("*/") {
      if self.stream.read().is_none() {
        if report {
          let end = self.here();
          self.report(ProblemKind::UnterminatedBlockComment, start, end, "unterminated block comment");
        }
        return;
      }
    }
  }
}
