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

use crate::error::HandlerError;
use runtime::ActionContext;
use std::collections::HashMap;
use std::fmt;

/// Semantic action on the host state `H`. `Ok(false)` rejects the match like an ordinary
/// failure, an error aborts the recognition.
pub type Handler<H> = Box<dyn Fn(&mut H, &ActionContext) -> Result<bool, HandlerError> + Send + Sync>;

/// Handlers registered by action name.
pub struct ActionHandlers<H>
{
  handlers: Vec<(String, Handler<H>)>,
  slots: HashMap<String, usize>
}

impl<H> ActionHandlers<H>
{
  pub fn new() -> Self {
    ActionHandlers {
      handlers: vec![],
      slots: HashMap::new()
    }
  }

  /// Registers `handler` under `name`, replacing the previous one.
  pub fn register<F>(&mut self, name: &str, handler: F) -> &mut Self where
   F: Fn(&mut H, &ActionContext) -> Result<bool, HandlerError> + Send + Sync + 'static
  {
    let handler: Handler<H> = Box::new(handler);
    match self.slots.get(name) {
      Some(&slot) => self.handlers[slot].1 = handler,
      None => {
        self.slots.insert(String::from(name), self.handlers.len());
        self.handlers.push((String::from(name), handler));
      }
    }
    self
  }

  pub fn with<F>(mut self, name: &str, handler: F) -> Self where
   F: Fn(&mut H, &ActionContext) -> Result<bool, HandlerError> + Send + Sync + 'static
  {
    self.register(name, handler);
    self
  }

  /// Registers a handler that always accepts the match.
  pub fn with_effect<F>(self, name: &str, effect: F) -> Self where
   F: Fn(&mut H, &ActionContext) + Send + Sync + 'static
  {
    self.with(name, move |host, context| {
      effect(host, context);
      Ok(true)
    })
  }

  pub fn names(&self) -> impl Iterator<Item=&str> {
    self.handlers.iter().map(|(name, _)| name.as_str())
  }

  pub fn contains(&self, name: &str) -> bool {
    self.slots.contains_key(name)
  }

  pub fn slot(&self, name: &str) -> Option<usize> {
    self.slots.get(name).cloned()
  }

  pub fn handler(&self, slot: usize) -> &Handler<H> {
    &self.handlers[slot].1
  }

  pub fn len(&self) -> usize {
    self.handlers.len()
  }

  pub fn is_empty(&self) -> bool {
    self.handlers.is_empty()
  }
}

impl<H> Default for ActionHandlers<H>
{
  fn default() -> Self {
    ActionHandlers::new()
  }
}

impl<H> fmt::Debug for ActionHandlers<H>
{
  fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
    formatter.debug_list().entries(self.names()).finish()
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use runtime::BacktrackingStream;

  #[test]
  fn test_register_and_replace() {
    let mut handlers = ActionHandlers::<Vec<String>>::new()
      .with_effect("push", |host, context| host.push(context.text()));
    handlers.register("check", |_, context| Ok(context.length() > 1));
    handlers.register("push", |host, _| { host.clear(); Ok(true) });
    assert_eq!(handlers.len(), 2);
    assert_eq!(handlers.names().collect::<Vec<_>>(), vec!["push", "check"]);
    let stream = BacktrackingStream::from_str("x");
    let context = ActionContext::new(&stream);
    let mut host = vec![String::from("old")];
    let push = handlers.slot("push").unwrap();
    assert!(handlers.handler(push)(&mut host, &context).unwrap());
    assert!(host.is_empty());
    let check = handlers.slot("check").unwrap();
    assert!(!handlers.handler(check)(&mut host, &context).unwrap());
    assert!(!handlers.contains("missing"));
  }
}
