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

pub use self::parser::GrammarParser;

use crate::ast::*;
use crate::back::{ActionHandlers, Parser, ParserOptions};
use crate::error::GrammarError;
use crate::middle::CompilerOptions;
use runtime::Transaction;
use std::sync::Arc;

pub mod parser;

/// Reads, compiles and binds the grammar `text` to `handlers`. Actions without handler are
/// reported as undefined. The problems are returned when the grammar carries an error.
///
/// ```
/// use pegrec::{load_grammar, ActionHandlers, CompilerOptions, Stateless};
///
/// let parser = load_grammar("Digits : '0'-'9'+ ;", ActionHandlers::new(),
///   &CompilerOptions::default()).unwrap();
/// assert_eq!(parser.parse(&mut Stateless, "42a").unwrap().consumed, 2);
/// ```
pub fn load_grammar<H: Transaction>(text: &str, handlers: ActionHandlers<H>,
  options: &CompilerOptions) -> Result<Parser<H>, GrammarError>
{
  let grammar = GrammarParser::new(text)
    .with_actions(handlers.names().map(String::from).collect::<Vec<_>>())
    .compile(options);
  match grammar {
    Partial::Value(grammar) => Parser::new(Arc::new(grammar), handlers, ParserOptions::default()),
    Partial::Fake(grammar) => Err(GrammarError { problems: grammar.problems().clone() }),
    Partial::Nothing => Err(GrammarError { problems: GrammarProblems::new() })
  }
}
