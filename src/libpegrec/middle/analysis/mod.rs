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

use crate::ast::*;
use crate::middle::{CompilerOptions, outcome};
use self::local::LocalAnalyzer;
use self::left_recursion::RecursionFinder;

mod local;
mod left_recursion;

pub fn local_analysis(mut grammar: Grammar, options: &CompilerOptions) -> Partial<Grammar> {
  if options.local_analysis {
    let problems = LocalAnalyzer::analyse(&grammar, options);
    log::debug!("local analysis: {} problems", problems.len());
    extend_problems(&mut grammar, problems);
  }
  outcome(grammar)
}

pub fn left_recursion(mut grammar: Grammar, options: &CompilerOptions) -> Partial<Grammar> {
  if options.left_recursion {
    let problems = RecursionFinder::analyse(&grammar, options);
    log::debug!("left recursion: {} cycles", problems.len());
    extend_problems(&mut grammar, problems);
  }
  outcome(grammar)
}

fn extend_problems(grammar: &mut Grammar, problems: Vec<Problem>) {
  for problem in problems {
    grammar.problems_mut().push(problem);
  }
}
