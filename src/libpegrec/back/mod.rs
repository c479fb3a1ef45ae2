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

//! Recognition of a text with a compiled grammar.
//!
//! A `Parser` is immutable once built and can be shared between threads; every call to
//! `parse` works on its own stream, memoization table and tracers. The host state `H`
//! receives the effects of the semantic actions inside transactions, so that the effects of
//! an alternative that finally fails are rolled back.

pub use self::handlers::{ActionHandlers, Handler};
pub use self::recognizer::{Recognizer, Reduce};

use crate::ast::*;
use crate::error::{GrammarError, RecognitionError, SyntaxError};
use crate::trace::{ErrorTracer, NoTracer, RuleTracer, TracerChain};
use runtime::{BacktrackingStream, Transaction};
use std::collections::HashMap;
use std::sync::Arc;

mod handlers;
mod recognizer;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParserOptions
{
  /// Memoized references (`@Name`) use the cache. When false, or when the host transaction is
  /// not memoable, they behave as plain references.
  pub memoize: bool
}

impl Default for ParserOptions
{
  fn default() -> Self {
    ParserOptions {
      memoize: true
    }
  }
}

/// Successful recognition of a prefix of the input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Recognition
{
  /// Number of characters matched by the start production.
  pub consumed: usize,
  /// Position following the matched prefix.
  pub end: Position
}

pub struct Parser<H>
{
  grammar: Arc<Grammar>,
  handlers: ActionHandlers<H>,
  /// Handler slot of each action expression having a registered handler.
  bindings: HashMap<usize, usize>,
  options: ParserOptions
}

impl<H: Transaction> Parser<H>
{
  /// Binds the actions of `grammar` to `handlers` by name. A grammar carrying errors or
  /// without production is refused.
  pub fn new(grammar: Arc<Grammar>, handlers: ActionHandlers<H>, options: ParserOptions)
    -> Result<Parser<H>, GrammarError>
  {
    if grammar.has_errors() || grammar.is_empty() {
      return Err(GrammarError { problems: grammar.problems().clone() });
    }
    let bindings: HashMap<usize, usize> = grammar.exprs().iter().enumerate()
      .filter_map(|(idx, node)| match &node.expr {
        Expression::Action { name, injected: false, .. } => handlers.slot(name).map(|slot| (idx, slot)),
        _ => None
      })
      .collect();
    log::debug!("parser ready: {} productions, {} bound actions", grammar.len(), bindings.len());
    Ok(Parser {
      grammar: grammar,
      handlers: handlers,
      bindings: bindings,
      options: options
    })
  }

  pub fn grammar(&self) -> &Arc<Grammar> {
    &self.grammar
  }

  pub fn options(&self) -> &ParserOptions {
    &self.options
  }

  pub fn handlers(&self) -> &ActionHandlers<H> {
    &self.handlers
  }

  /// Recognizes a prefix of `text` with the first production of the grammar.
  pub fn parse(&self, host: &mut H, text: &str) -> Result<Recognition, RecognitionError> {
    let mut stream = BacktrackingStream::from_str(text);
    self.parse_stream(host, &mut stream)
  }

  pub fn parse_stream(&self, host: &mut H, stream: &mut BacktrackingStream)
    -> Result<Recognition, RecognitionError>
  {
    self.parse_traced(host, stream, &mut NoTracer)
  }

  /// Same as `parse_stream`, reporting the recognition events to `tracer`.
  pub fn parse_traced(&self, host: &mut H, stream: &mut BacktrackingStream,
    tracer: &mut dyn RuleTracer) -> Result<Recognition, RecognitionError>
  {
    let start = stream.position();
    let memoize = self.options.memoize && host.is_memoable();
    log::debug!("parse started at {} (memoization {})", start, if memoize { "on" } else { "off" });
    let mut errors = ErrorTracer::new();
    let matched = {
      let mut chain = TracerChain::new().with(&mut errors).with(tracer);
      chain.open(stream);
      let matched = {
        let mut recognizer = Recognizer::new(&self.grammar, &self.handlers, &self.bindings,
          host, stream, &mut chain, memoize);
        recognizer.reduce_production(0)
      };
      chain.close(stream, *matched.as_ref().unwrap_or(&false));
      matched
    };
    if let Some(err) = stream.take_error() {
      return Err(RecognitionError::Io(err));
    }
    if matched? {
      let end = stream.position();
      let consumed = end.offset - start.offset;
      log::debug!("parse succeeded: {} characters consumed", consumed);
      Ok(Recognition { consumed: consumed, end: end })
    }
    else {
      let farthest = errors.farthest_read().unwrap_or(start);
      let found = recognizer::found_at(stream, farthest);
      let error = SyntaxError::new(farthest, errors.expected().to_vec(), found);
      log::debug!("parse failed: {}", error);
      Err(RecognitionError::Syntax(error))
    }
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::builder::GrammarBuilder;
  use runtime::Stateless;

  fn parser(builder: &mut GrammarBuilder) -> Parser<Stateless> {
    let grammar = builder.build().unwrap();
    Parser::new(Arc::new(grammar), ActionHandlers::new(), ParserOptions::default()).unwrap()
  }

  #[test]
  fn test_prefix_recognition() {
    let mut builder = GrammarBuilder::new();
    builder.start_production("S").unwrap()
      .push_token("ab", true).unwrap()
      .zero_or_more().unwrap()
      .end_production().unwrap();
    let parser = parser(&mut builder);
    let recognition = parser.parse(&mut Stateless, "ababa").unwrap();
    assert_eq!(recognition.consumed, 4);
    assert_eq!(recognition.end.column, 5);
    assert_eq!(parser.parse(&mut Stateless, "").unwrap().consumed, 0);
  }

  #[test]
  fn test_syntax_error() {
    let mut builder = GrammarBuilder::new();
    builder.start_production("A").unwrap()
      .push_token("x", true).unwrap()
      .push_token("y", true).unwrap()
      .end_production().unwrap();
    let parser = parser(&mut builder);
    let err = parser.parse(&mut Stateless, "xz").unwrap_err();
    let syntax = err.syntax().unwrap();
    assert_eq!(syntax.farthest_read.column, 2);
    assert_eq!(syntax.expected, vec![Terminal::token("y", true)]);
    assert_eq!(syntax.found, "z");
    let err = parser.parse(&mut Stateless, "x").unwrap_err();
    assert_eq!(err.syntax().unwrap().found, "");
  }

  #[test]
  fn test_refuses_broken_grammar() {
    let mut builder = GrammarBuilder::new();
    builder.start_production("A").unwrap()
      .push_reference("A", false).unwrap()
      .end_production().unwrap();
    let grammar = match crate::middle::compile(builder.build().unwrap(), &Default::default()) {
      Partial::Fake(grammar) => grammar,
      _ => panic!("left recursion must be an error")
    };
    let result = Parser::<Stateless>::new(Arc::new(grammar), ActionHandlers::new(), ParserOptions::default());
    let err = result.err().unwrap();
    assert!(err.problems.has_kind(ProblemKind::LeftRecursion));
  }

  #[test]
  fn test_action_error_aborts() {
    let mut builder = GrammarBuilder::new().with_actions(vec!["fail"]);
    builder.start_production("S").unwrap()
      .mark()
        .push_token("a", true).unwrap()
        .action("fail").unwrap()
      .release().unwrap()
      .push_any().unwrap()
      .choice().unwrap()
      .end_production().unwrap();
    let grammar = builder.build().unwrap();
    let handlers = ActionHandlers::new()
      .with("fail", |_: &mut Stateless, _| Err("boom".into()));
    let parser = Parser::new(Arc::new(grammar), handlers, ParserOptions::default()).unwrap();
    match parser.parse(&mut Stateless, "a") {
      Err(RecognitionError::Action(err)) => {
        assert_eq!(err.name, "fail");
        assert_eq!(err.location.column, 1);
        assert_eq!(err.source.to_string(), "boom");
      }
      other => panic!("unexpected result {:?}", other)
    }
  }
}
