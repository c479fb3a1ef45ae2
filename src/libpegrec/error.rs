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

use crate::ast::{Terminal, GrammarProblems};
use runtime::Position;
use std::fmt::{Formatter, Display};
use thiserror::Error;

/// Error raised by a semantic action handler; it aborts the recognition.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Furthest position reached by the recognizer with the terminals that would have let it go
/// further.
#[derive(Clone, Debug, PartialEq)]
pub struct SyntaxError
{
  pub farthest_read: Position,
  pub expected: Vec<Terminal>,
  /// Text found at `farthest_read`.
  pub found: String
}

impl SyntaxError
{
  pub fn new(farthest_read: Position, expected: Vec<Terminal>, found: String) -> SyntaxError {
    SyntaxError {
      farthest_read: farthest_read,
      expected: expected,
      found: found
    }
  }

  fn expected_desc(&self) -> String {
    let expected: Vec<String> = self.expected.iter().map(|t| t.to_string()).collect();
    expected.join(" or ")
  }
}

impl Display for SyntaxError
{
  fn fmt(&self, formatter: &mut Formatter) -> std::fmt::Result {
    let found = if self.found.is_empty() {
      String::from("end of input")
    }
    else {
      format!("`{}`", self.found)
    };
    if self.expected.is_empty() {
      write!(formatter, "{}: unexpected {}.", self.farthest_read, found)
    }
    else {
      write!(formatter, "{}: unexpected {}, expecting {}.",
        self.farthest_read, found, self.expected_desc())
    }
  }
}

impl std::error::Error for SyntaxError {}

#[derive(Debug, Error)]
#[error("{location}: action `{name}` failed: {source}")]
pub struct ActionError
{
  pub name: String,
  pub location: Position,
  #[source]
  pub source: HandlerError
}

#[derive(Debug, Error)]
pub enum RecognitionError
{
  #[error("syntax error at {0}")]
  Syntax(#[from] SyntaxError),
  #[error(transparent)]
  Action(#[from] ActionError),
  #[error("cannot read the input: {0}")]
  Io(#[from] std::io::Error)
}

impl RecognitionError
{
  pub fn syntax(&self) -> Option<&SyntaxError> {
    match self {
      RecognitionError::Syntax(err) => Some(err),
      _ => None
    }
  }
}

/// Misuse of the grammar builder.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BuildError
{
  #[error("no production is under construction")]
  NoProduction,
  #[error("production `{0}` is still under construction")]
  UnfinishedProduction(String),
  #[error("`{0}` needs an expression on the stack")]
  EmptyStack(&'static str),
  #[error("`{0}` called without a matching mark")]
  UnbalancedMark(&'static str),
  #[error("invalid repetition bounds {{{min},{max}}}")]
  InvalidRepetition { min: u32, max: u32 }
}

/// A grammar carrying errors cannot be used for recognition.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("the grammar is not usable ({})", .problems.summary())]
pub struct GrammarError
{
  pub problems: GrammarProblems
}
