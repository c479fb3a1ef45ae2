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

//! Reduction of the rule tree against a stream.
//!
//! `reduce` returns `Ok(true)` when the rule matched and the stream moved past the matched
//! text, `Ok(false)` when it failed and the stream is exactly where it was before the call,
//! and an error when an action aborted the recognition. Each rule marks the stream before
//! reducing its children and releases (success) or resets (failure) the mark afterwards.

use crate::ast::*;
use crate::back::handlers::ActionHandlers;
use crate::display::escape_str;
use crate::error::{ActionError, RecognitionError};
use crate::trace::RuleTracer;
use runtime::{ActionContext, BacktrackingStream, MemoTable, Transaction};
use std::collections::HashMap;

pub type Reduce = Result<bool, RecognitionError>;

pub struct Recognizer<'a, 's, H: Transaction>
{
  grammar: &'a Grammar,
  handlers: &'a ActionHandlers<H>,
  /// Handler slot of each bound action.
  bindings: &'a HashMap<usize, usize>,
  host: &'a mut H,
  stream: &'a mut BacktrackingStream<'s>,
  tracer: &'a mut dyn RuleTracer,
  memo: MemoTable<H::Snapshot>,
  memoize: bool
}

impl<'a, 's, H: Transaction> Recognizer<'a, 's, H>
{
  pub fn new(grammar: &'a Grammar, handlers: &'a ActionHandlers<H>,
    bindings: &'a HashMap<usize, usize>, host: &'a mut H,
    stream: &'a mut BacktrackingStream<'s>, tracer: &'a mut dyn RuleTracer, memoize: bool) -> Self
  {
    Recognizer {
      grammar: grammar,
      handlers: handlers,
      bindings: bindings,
      host: host,
      stream: stream,
      tracer: tracer,
      memo: MemoTable::new(),
      memoize: memoize
    }
  }

  pub fn memo_size(&self) -> usize {
    self.memo.len()
  }

  fn traced<F>(&mut self, rule: RuleId, reduce: F) -> Reduce where
   F: FnOnce(&mut Self) -> Reduce
  {
    self.tracer.trace(self.grammar, rule, self.stream);
    let matched = reduce(self);
    let success = matched.as_ref().map_or(false, |m| *m);
    self.tracer.backtrace(self.grammar, rule, self.stream, success);
    matched
  }

  /// Releases the innermost mark on success, resets it otherwise.
  fn settle(&mut self, matched: Reduce) -> Reduce {
    match matched {
      Ok(true) => self.stream.release(),
      _ => self.stream.reset()
    }
    matched
  }

  /// Closes the transaction and the mark opened together.
  fn transact(&mut self, matched: Reduce) -> Reduce {
    match matched {
      Ok(true) => self.host.commit(),
      _ => self.host.rollback()
    }
    self.settle(matched)
  }

  pub fn reduce_production(&mut self, index: usize) -> Reduce {
    self.traced(RuleId::Production(index), |this| {
      let expr = this.grammar.production(index).expr;
      this.stream.mark();
      let matched = this.reduce(expr);
      this.settle(matched)
    })
  }

  pub fn reduce(&mut self, expr: usize) -> Reduce {
    let grammar = self.grammar;
    self.traced(RuleId::Expression(expr), |this| {
      match &grammar[expr].expr {
        Expression::Terminal(terminal) => Ok(terminal.recognize(this.stream)),
        &Expression::Reference { target, memo } => {
          if memo && this.memoize {
            this.reduce_memo_reference(expr, target)
          }
          else {
            this.reduce_reference(target)
          }
        }
        &Expression::Action { child, .. } => this.reduce_action(expr, child),
        Expression::Concatenation(children) => this.reduce_concatenation(children),
        Expression::Alternation(children) => this.reduce_alternation(children),
        &Expression::Repetition { child, min, max } => this.reduce_repetition(child, min, max),
        &Expression::Exclusion { child, predicate } => this.reduce_exclusion(child, predicate)
      }
    })
  }

  fn reduce_reference(&mut self, target: usize) -> Reduce {
    self.stream.mark();
    let matched = self.reduce_production(target);
    self.settle(matched)
  }

  /// A cached result is replayed without reducing the production: the saved changes are loaded
  /// in the host and the stream skips the cached length.
  fn reduce_memo_reference(&mut self, reference: usize, target: usize) -> Reduce {
    let offset = self.stream.position().offset;
    if let Some(memo) = self.memo.get(target, offset) {
      if let Some(snapshot) = &memo.snapshot {
        self.host.load(snapshot);
      }
      self.stream.skip(memo.length);
      self.tracer.lookup(self.grammar, reference, self.stream, true);
      log::trace!("memo hit: `{}` at {}", self.grammar.production(target).name, offset);
      return Ok(true);
    }
    self.tracer.lookup(self.grammar, reference, self.stream, false);
    self.stream.mark();
    self.host.begin();
    match self.reduce_production(target) {
      Ok(true) => {
        let length = self.stream.length();
        let snapshot = self.host.save();
        self.host.commit();
        self.stream.release();
        self.memo.store(target, offset, length, snapshot);
        self.tracer.cache(self.grammar, reference, self.stream);
        log::trace!("memo store: `{}` at {} ({} chars)",
          self.grammar.production(target).name, offset, length);
        Ok(true)
      }
      failed => self.transact(failed)
    }
  }

  fn reduce_action(&mut self, action: usize, child: usize) -> Reduce {
    self.stream.mark();
    self.host.begin();
    let matched = match self.reduce(child) {
      Ok(true) => self.handle(action),
      failed => failed
    };
    self.transact(matched)
  }

  /// Calls the handler bound to `action`. Injected undo actions and actions without handler
  /// accept the match.
  fn handle(&mut self, action: usize) -> Reduce {
    let slot = match self.bindings.get(&action) {
      Some(&slot) => slot,
      None => return Ok(true)
    };
    let handler = self.handlers.handler(slot);
    let context = ActionContext::new(self.stream);
    handler(&mut *self.host, &context).map_err(|source| {
      let name = match &self.grammar[action].expr {
        Expression::Action { name, .. } => name.clone(),
        _ => String::new()
      };
      RecognitionError::from(ActionError {
        name: name,
        location: context.start(),
        source: source
      })
    })
  }

  fn reduce_concatenation(&mut self, children: &[usize]) -> Reduce {
    self.stream.mark();
    let matched = self.reduce_all(children);
    self.settle(matched)
  }

  /// Stops at the first failing child.
  fn reduce_all(&mut self, children: &[usize]) -> Reduce {
    for &child in children {
      if !self.reduce(child)? {
        return Ok(false);
      }
    }
    Ok(true)
  }

  /// Ordered choice: the first matching alternative wins, each one starts at the same position.
  fn reduce_alternation(&mut self, children: &[usize]) -> Reduce {
    for &child in children {
      self.stream.mark();
      let matched = self.reduce(child);
      if self.settle(matched)? {
        return Ok(true);
      }
    }
    Ok(false)
  }

  fn reduce_repetition(&mut self, child: usize, min: u32, max: u32) -> Reduce {
    self.stream.mark();
    let matched = self.repeat(child, min, max);
    self.settle(matched)
  }

  /// Greedy: matches `child` as many times as possible up to `max`. An unbounded repetition
  /// also stops on an iteration that consumed nothing.
  fn repeat(&mut self, child: usize, min: u32, max: u32) -> Reduce {
    let mut count = 0;
    while count < min {
      if !self.reduce(child)? {
        return Ok(false);
      }
      count += 1;
    }
    while count < max {
      let before = self.stream.position().offset;
      if !self.reduce(child)? {
        break;
      }
      count += 1;
      if max == UNBOUNDED && self.stream.position().offset == before {
        break;
      }
    }
    Ok(true)
  }

  /// Predicates never consume: the stream is reset whatever the outcome.
  fn reduce_exclusion(&mut self, child: usize, predicate: Predicate) -> Reduce {
    self.stream.mark();
    let matched = self.reduce(child);
    self.stream.reset();
    match predicate {
      Predicate::And => matched,
      Predicate::Not => matched.map(|m| !m)
    }
  }
}

/// Character found at `position`, ahead of the current position of `stream`. Empty at the end
/// of the input.
pub fn found_at(stream: &mut BacktrackingStream, position: Position) -> String {
  stream.mark();
  stream.skip(position.offset.saturating_sub(stream.position().offset));
  let found = stream.peek()
    .map(|c| escape_str(&c.to_string(), '`'))
    .unwrap_or_default();
  stream.reset();
  found
}
