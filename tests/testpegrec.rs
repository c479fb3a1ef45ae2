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

//! Grammar suite over `data/test/`. Every directory there is a grammar, its text is in
//! `grammar.peg` and its inputs come in two layouts:
//! * `run-pass/`, `run-partial/` and `run-fail/` directories, one input per file;
//! * `<name>.bulk.pass`, `<name>.bulk.partial` and `<name>.bulk.fail` files, one input per line.
//!
//! `pass` inputs must be consumed entirely, `partial` inputs must match a strict prefix and
//! `fail` inputs must be rejected.

extern crate pegrec;
extern crate term;

use pegrec::*;

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

#[test]
fn test_data_directory() {
  let suite = Path::new("data/test");
  assert!(suite.is_dir(), "`{}` is not a valid grammar directory.", suite.display());
  let mut report = Report::new();
  report.title("pegrec grammar suite");
  for grammar_dir in sorted_entries(suite, &mut report) {
    if grammar_dir.is_dir() {
      run_grammar(&grammar_dir, &mut report);
    }
  }
  report.stats();
  report.panic_if_failure();
}

#[derive(Clone, Copy, Debug)]
enum Outcome {
  Full,
  Partial,
  Rejected
}

impl Outcome {
  fn from_suffix(suffix: &str) -> Option<Outcome> {
    match suffix {
      "pass" => Some(Outcome::Full),
      "partial" => Some(Outcome::Partial),
      "fail" => Some(Outcome::Rejected),
      _ => None
    }
  }

  fn accepts(self, result: &Result<Recognition, RecognitionError>, length: usize) -> bool {
    match (self, result) {
      (Outcome::Full, Ok(recognition)) => recognition.consumed == length,
      (Outcome::Partial, Ok(recognition)) => recognition.consumed < length,
      (Outcome::Rejected, Err(_)) => true,
      _ => false
    }
  }
}

/// One input of a grammar with the outcome it must produce.
struct Case
{
  name: String,
  origin: PathBuf,
  input: String,
  outcome: Outcome
}

fn run_grammar(dir: &Path, report: &mut Report) {
  let name = file_name(dir);
  report.info(format!("grammar `{}`", name));
  let parser = match load(dir, report) {
    Some(parser) => parser,
    None => return
  };
  for case in cases(dir, report) {
    let length = case.input.replace("\r\n", "\n").chars().count();
    let result = parser.parse(&mut Stateless, &case.input);
    if case.outcome.accepts(&result, length) {
      report.success(&case.name);
    }
    else {
      report.failure(&case, &result, length);
    }
  }
}

/// A grammar carrying errors is a system failure, its inputs are not run.
fn load(dir: &Path, report: &mut Report) -> Option<Parser<Stateless>> {
  let path = dir.join("grammar.peg");
  let text = match fs::read_to_string(&path) {
    Ok(text) => text,
    Err(err) => {
      report.fs_error("cannot read the grammar", &path, &err);
      return None;
    }
  };
  match load_grammar(&text, ActionHandlers::new(), &CompilerOptions::from_bits(SUPPRESS_HINTS)) {
    Ok(parser) => Some(parser),
    Err(err) => {
      report.system_failure(format!("`{}` does not compile\n{}", path.display(), err.problems));
      None
    }
  }
}

fn cases(dir: &Path, report: &mut Report) -> Vec<Case> {
  let mut cases = vec![];
  for entry in sorted_entries(dir, report) {
    let name = file_name(&entry);
    if entry.is_dir() {
      let outcome = name.strip_prefix("run-").and_then(Outcome::from_suffix);
      if let Some(outcome) = outcome {
        for file in sorted_entries(&entry, report) {
          if let Some(input) = read_input(&file, report) {
            cases.push(Case { name: file_name(&file), origin: file, input: input, outcome: outcome });
          }
        }
      }
    }
    else if let Some((stem, suffix)) = name.rsplit_once(".bulk.") {
      let outcome = match Outcome::from_suffix(suffix) {
        Some(outcome) => outcome,
        None => continue
      };
      if let Some(lines) = read_input(&entry, report) {
        for (i, line) in lines.lines().enumerate() {
          cases.push(Case {
            name: format!("{}.{} (line {})", stem, suffix, i + 1),
            origin: entry.clone(),
            input: String::from(line),
            outcome: outcome
          });
        }
      }
    }
  }
  cases
}

fn read_input(path: &Path, report: &mut Report) -> Option<String> {
  match fs::read_to_string(path) {
    Ok(input) => Some(input),
    Err(err) => {
      report.fs_error("cannot read the input", path, &err);
      None
    }
  }
}

fn sorted_entries(dir: &Path, report: &mut Report) -> Vec<PathBuf> {
  match fs::read_dir(dir) {
    Ok(entries) => {
      let mut paths: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .collect();
      paths.sort();
      paths
    }
    Err(err) => {
      report.fs_error("cannot read the directory", dir, &err);
      vec![]
    }
  }
}

fn file_name(path: &Path) -> String {
  path.file_name()
    .map(|name| name.to_string_lossy().into_owned())
    .unwrap_or_default()
}

/// Colored when stdout is a terminal, plain otherwise.
struct Report
{
  terminal: Option<Box<term::StdoutTerminal>>,
  passed: u32,
  failed: u32,
  system_failures: u32
}

impl Report
{
  fn new() -> Report {
    Report {
      terminal: term::stdout(),
      passed: 0,
      failed: 0,
      system_failures: 0
    }
  }

  fn title(&mut self, msg: &str) {
    self.line(term::color::CYAN, "    ", msg);
  }

  fn info(&mut self, msg: String) {
    self.line(term::color::CYAN, "\n[ info ] ", &msg);
  }

  fn success(&mut self, name: &str) {
    self.passed += 1;
    self.line(term::color::GREEN, "[ passed ] ", name);
  }

  fn failure(&mut self, case: &Case, result: &Result<Recognition, RecognitionError>, length: usize) {
    self.failed += 1;
    self.line(term::color::RED, "[ failed ] ", &case.name);
    self.line(term::color::CYAN, "  [ path ] ", &case.origin.display().to_string());
    self.line(term::color::CYAN, "  [ expected ] ", &format!("{:?}", case.outcome));
    let found = match result {
      Ok(recognition) if recognition.consumed == length => String::from("fully matched"),
      Ok(recognition) => format!("partial match, stopped at {}", recognition.end),
      Err(err) => err.to_string()
    };
    self.line(term::color::RED, "  [ found ] ", &found);
  }

  fn fs_error(&mut self, msg: &str, path: &Path, err: &io::Error) {
    self.system_failure(format!("{} `{}`: {}", msg, path.display(), err));
  }

  fn system_failure(&mut self, msg: String) {
    self.system_failures += 1;
    self.line(term::color::RED, "[ system error ] ", &msg);
  }

  fn stats(&mut self) {
    let msg = format!("{} passed, {} failed, {} system failure(s).",
      self.passed, self.failed, self.system_failures);
    self.line(term::color::BLUE, "\n[ stats ] ", &msg);
  }

  fn panic_if_failure(&self) {
    if self.failed > 0 || self.system_failures > 0 {
      panic!("{} failed, {} system failures", self.failed, self.system_failures);
    }
  }

  fn line(&mut self, color: term::color::Color, header: &str, msg: &str) {
    match self.terminal {
      Some(ref mut terminal) => {
        let _ = terminal.fg(color);
        let _ = write!(terminal, "{}", header);
        let _ = terminal.reset();
        let _ = writeln!(terminal, "{}", msg);
      }
      None => println!("{}{}", header, msg)
    }
  }
}
