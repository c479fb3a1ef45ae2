// Copyright 2016 Pierre Talbot (IRCAM)

// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at

//     http://www.apache.org/licenses/LICENSE-2.0

// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::ast::*;

/// Turns every plain reference of `grammar` into a memoized one. Returns the number of
/// references changed.
pub fn inject_memo(grammar: &mut Grammar) -> usize {
  let plain: Vec<usize> = grammar.exprs().iter().enumerate()
    .filter(|(_, node)| match node.expr {
      Expression::Reference { memo: false, .. } => true,
      _ => false
    })
    .map(|(idx, _)| idx)
    .collect();
  for &reference in &plain {
    grammar.set_memo(reference, true);
  }
  log::debug!("{} references memoized", plain.len());
  plain.len()
}
