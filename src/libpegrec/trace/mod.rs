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

//! Observation hooks of the recognizer.
//!
//! A tracer is told when a rule is entered (`trace`) and left (`backtrace`), when a memoized
//! reference looks up the cache and when it stores a result. Every `trace` is matched by
//! exactly one `backtrace`, even when the recognition is aborted by an action error.

pub use self::error::ErrorTracer;
pub use self::debug::DebugTracer;
pub use self::statistics::StatisticsTracer;

use crate::ast::*;
use runtime::BacktrackingStream;

mod error;
mod debug;
mod statistics;

pub trait RuleTracer
{
  fn open(&mut self, _stream: &BacktrackingStream) {}

  fn trace(&mut self, _grammar: &Grammar, _rule: RuleId, _stream: &BacktrackingStream) {}

  fn backtrace(&mut self, _grammar: &Grammar, _rule: RuleId, _stream: &BacktrackingStream,
    _success: bool) {}

  /// A memoized `reference` asked the cache, `hit` is true when a result was found.
  fn lookup(&mut self, _grammar: &Grammar, _reference: usize, _stream: &BacktrackingStream,
    _hit: bool) {}

  /// A memoized `reference` stored its result.
  fn cache(&mut self, _grammar: &Grammar, _reference: usize, _stream: &BacktrackingStream) {}

  fn close(&mut self, _stream: &BacktrackingStream, _success: bool) {}
}

/// Tracer ignoring every event.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoTracer;

impl RuleTracer for NoTracer {}

/// Forwards the events to several tracers, in the order they were added.
#[derive(Default)]
pub struct TracerChain<'a>
{
  tracers: Vec<&'a mut dyn RuleTracer>
}

impl<'a> TracerChain<'a>
{
  pub fn new() -> Self {
    TracerChain {
      tracers: vec![]
    }
  }

  pub fn with(mut self, tracer: &'a mut dyn RuleTracer) -> Self {
    self.push(tracer);
    self
  }

  pub fn push(&mut self, tracer: &'a mut dyn RuleTracer) {
    self.tracers.push(tracer);
  }

  pub fn len(&self) -> usize {
    self.tracers.len()
  }

  pub fn is_empty(&self) -> bool {
    self.tracers.is_empty()
  }
}

impl<'a> RuleTracer for TracerChain<'a>
{
  fn open(&mut self, stream: &BacktrackingStream) {
    for tracer in self.tracers.iter_mut() {
      tracer.open(stream);
    }
  }

  fn trace(&mut self, grammar: &Grammar, rule: RuleId, stream: &BacktrackingStream) {
    for tracer in self.tracers.iter_mut() {
      tracer.trace(grammar, rule, stream);
    }
  }

  fn backtrace(&mut self, grammar: &Grammar, rule: RuleId, stream: &BacktrackingStream,
    success: bool)
  {
    for tracer in self.tracers.iter_mut() {
      tracer.backtrace(grammar, rule, stream, success);
    }
  }

  fn lookup(&mut self, grammar: &Grammar, reference: usize, stream: &BacktrackingStream,
    hit: bool)
  {
    for tracer in self.tracers.iter_mut() {
      tracer.lookup(grammar, reference, stream, hit);
    }
  }

  fn cache(&mut self, grammar: &Grammar, reference: usize, stream: &BacktrackingStream) {
    for tracer in self.tracers.iter_mut() {
      tracer.cache(grammar, reference, stream);
    }
  }

  fn close(&mut self, stream: &BacktrackingStream, success: bool) {
    for tracer in self.tracers.iter_mut() {
      tracer.close(stream, success);
    }
  }
}

/// Verbosity of the `DebugTracer`. A rule is traced when its own level is lower or equal to
/// the tracer level: `High` only traces productions, `Medium` adds references and actions,
/// `Low` traces everything.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TraceLevel
{
  High,
  Medium,
  Low
}

impl TraceLevel
{
  pub fn of_rule(grammar: &Grammar, rule: RuleId) -> TraceLevel {
    match rule {
      RuleId::Production(_) => TraceLevel::High,
      RuleId::Expression(expr) => match grammar[expr].expr {
        Expression::Reference { .. }
      | Expression::Action { .. } => TraceLevel::Medium,
        _ => TraceLevel::Low
      }
    }
  }

  pub fn name(self) -> &'static str {
    match self {
      TraceLevel::High => "high",
      TraceLevel::Medium => "medium",
      TraceLevel::Low => "low"
    }
  }
}

impl Default for TraceLevel
{
  fn default() -> Self {
    TraceLevel::Medium
  }
}
