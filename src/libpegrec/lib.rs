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

//! This is the developer documentation of pegrec, a recognition engine for [Parsing Expression Grammar (PEG)](https://en.wikipedia.org/wiki/Parsing_expression_grammar). A grammar is read from its text (or assembled with the `GrammarBuilder`), compiled into a list of problems and interpreted against a character stream. Semantic actions are plain Rust closures registered by name; their effects on the host state are transactional, so that the effects of a failed alternative are rolled back.
//!
//! The library is divided in:
//!
//! * `front`: reader of the grammar text.
//! * `middle`: analyses reporting problems (undefined productions, left recursion, lints) and rewritings of the rule tree (undo and memo injection).
//! * `back`: the recognizer interpreting the rule tree with backtracking and memoization.
//! * `trace`: observers of a recognition (farthest failure, debug trace, statistics).

extern crate pegrec_runtime as runtime;
extern crate partial;
extern crate unicode_general_category;

#[macro_use]
pub mod visitor;
pub mod ast;
pub mod terminal;
pub mod charset;
pub mod problem;
pub mod display;
pub mod error;
pub mod builder;
pub mod middle;
pub mod back;
pub mod trace;
pub mod front;

pub use ast::{Grammar, Production, Expression, ExprNode, RuleId, Predicate, Quantifier, UNBOUNDED};
pub use terminal::{Terminal, CharClass};
pub use charset::{CharSet, CharacterInterval};
pub use problem::{Problem, ProblemKind, Severity, GrammarProblems};
pub use error::{SyntaxError, ActionError, RecognitionError, BuildError, GrammarError, HandlerError};
pub use builder::GrammarBuilder;
pub use middle::{compile, CompilerOptions, inject_memo, SUPPRESS_WARNINGS, SUPPRESS_HINTS, MAKE_SUGGESTIONS};
pub use back::{ActionHandlers, Parser, ParserOptions, Recognition};
pub use trace::{RuleTracer, NoTracer, TracerChain, TraceLevel, ErrorTracer, DebugTracer, StatisticsTracer};
pub use front::{GrammarParser, load_grammar};
pub use runtime::{BacktrackingStream, Position, Span, Transaction, Stateless, LocalStack, ActionContext};
pub use partial::Partial;
