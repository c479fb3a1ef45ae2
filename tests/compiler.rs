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

//! Problems reported on grammar texts, compiler options and tracers observing a recognition.

extern crate pegrec;

use pegrec::*;
use std::sync::Arc;

fn compiled(text: &str, options: &CompilerOptions) -> Grammar {
  match GrammarParser::new(text).compile(options) {
    Partial::Value(grammar) | Partial::Fake(grammar) => grammar,
    Partial::Nothing => panic!("the grammar `{}` could not be read", text)
  }
}

fn kinds(grammar: &Grammar) -> Vec<ProblemKind> {
  grammar.problems().iter().map(|p| p.kind).collect()
}

#[test]
fn test_clean_grammar() {
  let grammar = compiled("S : A+ ;\nA : 'a' / B ;\nB : 'b' 'c'? ;", &CompilerOptions::default());
  assert!(grammar.problems().is_empty(), "{}", grammar.problems());
  assert_eq!(grammar.problems().summary(), "no problems");
}

#[test]
fn test_production_problems() {
  let text = "S : A Missing ;\nA : 'a' ;\nA : 'b' ;\nLonely : 'c' ;";
  let grammar = compiled(text, &CompilerOptions::default());
  assert!(grammar.has_errors());
  let found = kinds(&grammar);
  assert!(found.contains(&ProblemKind::UndefinedProduction));
  assert!(found.contains(&ProblemKind::DuplicateProduction));
  assert!(found.contains(&ProblemKind::UnusedProduction));
  let undefined = grammar.problems().iter()
    .find(|p| p.kind == ProblemKind::UndefinedProduction)
    .unwrap();
  assert_eq!(undefined.span.map(|s| (s.start.line, s.start.column)), Some((1, 7)));
  assert!(undefined.message.contains("Missing"));
}

#[test]
fn test_problems_are_sorted_by_location() {
  let text = "S : 'a' B ;\nLonely : 'x' ;\nT : 'b' ;";
  let grammar = compiled(text, &CompilerOptions::default());
  let lines: Vec<usize> = grammar.problems().iter()
    .filter_map(|p| p.span.map(|s| s.start.line))
    .collect();
  let mut sorted = lines.clone();
  sorted.sort();
  assert_eq!(lines, sorted);
  assert!(lines.len() >= 3);
}

#[test]
fn test_severity_filters() {
  let text = "S : 'a' 'b' / 'c' ;\nLonely : 'x' ;";
  let all = compiled(text, &CompilerOptions::default());
  assert!(all.problems().has_kind(ProblemKind::UnusedProduction));
  assert!(all.problems().has_kind(ProblemKind::InefficientConcatenation));
  assert!(!all.has_errors());

  let no_hints = compiled(text, &CompilerOptions::from_bits(SUPPRESS_HINTS));
  assert_eq!(kinds(&no_hints), vec![ProblemKind::UnusedProduction]);

  let quiet = compiled(text, &CompilerOptions::from_bits(SUPPRESS_WARNINGS | SUPPRESS_HINTS));
  assert!(quiet.problems().is_empty());
}

#[test]
fn test_errors_are_never_filtered() {
  let options = CompilerOptions::from_bits(SUPPRESS_WARNINGS | SUPPRESS_HINTS);
  let grammar = compiled("S : S 'a' ;", &options);
  assert_eq!(kinds(&grammar), vec![ProblemKind::LeftRecursion]);
}

#[test]
fn test_suggestions() {
  let plain = compiled("S : 'a' ;\nLonely : 'x' ;", &CompilerOptions::default());
  let suggested = compiled("S : 'a' ;\nLonely : 'x' ;", &CompilerOptions::from_bits(MAKE_SUGGESTIONS));
  let plain = &plain.problems().iter().next().unwrap().message;
  let suggested = &suggested.problems().iter().next().unwrap().message;
  assert!(suggested.starts_with(plain.as_str()));
  assert!(suggested.ends_with(ProblemKind::UnusedProduction.suggestion().unwrap()));
}

#[test]
fn test_left_recursion_message() {
  let grammar = compiled("A : B 'a' ;\nB : C 'b' ;\nC : A 'c' / 'c' ;", &CompilerOptions::default());
  let problem = grammar.problems().iter()
    .find(|p| p.kind == ProblemKind::LeftRecursion)
    .unwrap();
  assert!(problem.message.contains("A"));
  assert!(problem.message.contains("B"));
  assert!(problem.message.contains("C"));
}

#[test]
fn test_undefined_actions() {
  let text = "S : $known('a') $unknown('b') ;";
  let grammar = match GrammarParser::new(text).with_actions(vec!["known"]).compile(&CompilerOptions::default()) {
    Partial::Value(grammar) => grammar,
    _ => panic!("an undefined action is only a warning")
  };
  let problems: Vec<&Problem> = grammar.problems().iter().collect();
  assert_eq!(problems.len(), 1);
  assert_eq!(problems[0].kind, ProblemKind::UndefinedAction);
  assert!(problems[0].message.contains("unknown"));
}

#[test]
fn test_problem_display() {
  let grammar = compiled("S : 'a' ;\nLonely : 'x' ;", &CompilerOptions::default());
  let problem = grammar.problems().iter().next().unwrap();
  assert!(problem.to_string().starts_with("2:1: warning [UNUSED_PRODUCTION]: "));
  assert!(grammar.problems().to_string().ends_with("1 warning"));
}

#[test]
fn test_load_grammar_reports_problems() {
  let err = load_grammar("S : 'a' ( 'b' ;", ActionHandlers::<Stateless>::new(),
    &CompilerOptions::default()).err().unwrap();
  assert!(err.problems.has_kind(ProblemKind::MissingClosingParenthesis));
}

#[test]
fn test_inject_memo() {
  let mut grammar = compiled("S : A A / A ;\nA : B 'a' ;\nB : 'b'? ;", &CompilerOptions::default());
  assert_eq!(inject_memo(&mut grammar), 4);
  assert_eq!(grammar.to_string(), "S : @A @A / @A ;\nA : @B 'a' ;\nB : 'b'? ;\n");
  let parser = Parser::new(Arc::new(grammar), ActionHandlers::new(), ParserOptions::default())
    .unwrap();
  let mut stats = StatisticsTracer::new();
  let mut stream = BacktrackingStream::from_str("ba");
  assert_eq!(parser.parse_traced(&mut Stateless, &mut stream, &mut stats).unwrap().consumed, 2);
  assert_eq!(stats.memo_hits, 1);
  assert!(stats.memo_stores >= 2);
}

#[test]
fn test_debug_tracer() {
  let parser = load_grammar("Sum : Digit ('+' Digit)* ;\nDigit : '0'-'9' ;", ActionHandlers::<Stateless>::new(),
    &CompilerOptions::default()).unwrap();
  let mut tracer = DebugTracer::new(Vec::new()).level(TraceLevel::High);
  let mut stream = BacktrackingStream::from_str("1+2");
  parser.parse_traced(&mut Stateless, &mut stream, &mut tracer).unwrap();
  assert!(tracer.take_error().is_none());
  assert_eq!(tracer.statistics().invocations_of("production"), 3);
  let output = String::from_utf8(tracer.into_inner()).unwrap();
  assert!(output.starts_with("SOURCE: 1:1\n"));
  assert!(output.contains("-> 1:1 Sum\n"));
  assert!(output.contains("<- 1:2 Digit\n"));
  assert!(output.contains("\"1+2\""));
  assert!(output.trim_end().ends_with("SUCCESS!"));
}

#[test]
fn test_debug_tracer_failure() {
  let parser = load_grammar("S : 'a' 'b' ;", ActionHandlers::<Stateless>::new(),
    &CompilerOptions::default()).unwrap();
  let mut tracer = DebugTracer::new(Vec::new());
  let mut stream = BacktrackingStream::from_str("ac");
  assert!(parser.parse_traced(&mut Stateless, &mut stream, &mut tracer).is_err());
  let output = String::from_utf8(tracer.into_inner()).unwrap();
  assert!(output.contains("! <- 1:1 S\n"));
  assert!(output.trim_end().ends_with("FAILURE!"));
}

#[test]
fn test_grammar_round_trip() {
  let text = "Sum : Product (('+' / '-') Product)* ;\n\
              Product : Value (('*' / '/') Value)* ;\n\
              Value : '0'-'9'+ / '(' Sum ')' ;\n";
  let grammar = compiled(text, &CompilerOptions::default());
  let rendered = grammar.to_string();
  let again = compiled(&rendered, &CompilerOptions::default());
  assert_eq!(again.to_string(), rendered);
  assert_eq!(again.len(), 3);
}
