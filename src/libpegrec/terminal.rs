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

//! Terminals are the leaves of the rule tree, each of them matches a fixed piece of text.

pub use crate::charset::*;
use crate::display::escape_str;
use runtime::BacktrackingStream;
use unicode_general_category::{get_general_category, GeneralCategory};
use std::fmt::{Formatter, Display, Error};

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Terminal
{
  Nil, // empty text
  Any, // .
  Token(String, bool), // 'case sensitive' or "case insensitive"
  Interval(CharacterInterval), // 'a'-'z'
  Set(CharSet), // ['a', '0'-'9', ~['x']]
  Class(CharClass), // <Alpha>
}

impl Terminal
{
  pub fn token(image: &str, case_sensitive: bool) -> Terminal {
    Terminal::Token(String::from(image), case_sensitive)
  }

  pub fn interval(lo: char, hi: char) -> Terminal {
    Terminal::Interval(CharacterInterval::new(lo, hi))
  }

  /// A terminal that cannot match anything. `Nil` is empty as well but it is the deliberate
  /// placeholder of empty right-hand sides.
  pub fn is_empty(&self) -> bool {
    match self {
      Terminal::Nil => true,
      Terminal::Token(image, _) => image.is_empty(),
      Terminal::Set(set) => set.is_empty(),
      _ => false
    }
  }

  /// Terminals matching a fixed set of single characters, hence mergeable into one set.
  pub fn is_determined(&self) -> bool {
    match self {
      Terminal::Token(image, true) => image.chars().count() == 1,
      Terminal::Interval(_)
    | Terminal::Set(_) => true,
      _ => false
    }
  }

  /// Terminals that a simpler terminal expresses as well.
  pub fn is_inefficient(&self) -> bool {
    match self {
      Terminal::Token(image, false) => image.to_uppercase() == image.to_lowercase(),
      Terminal::Interval(interval) => interval.lo == interval.hi,
      Terminal::Set(set) => set.interval_count() == 1,
      _ => false
    }
  }

  /// Matches the terminal once at the current position. On failure the position is unchanged.
  pub fn recognize(&self, stream: &mut BacktrackingStream) -> bool {
    match self {
      Terminal::Nil => true,
      Terminal::Any => stream.read().is_some(),
      Terminal::Token(image, case_sensitive) => stream.consume_prefix(image, *case_sensitive),
      Terminal::Interval(interval) => read_if(stream, |c| interval.contains(c)),
      Terminal::Set(set) => read_if(stream, |c| set.contains(c)),
      Terminal::Class(class) => read_if(stream, |c| class.contains(c))
    }
  }
}

fn read_if<F>(stream: &mut BacktrackingStream, pred: F) -> bool where
 F: FnOnce(char) -> bool
{
  match stream.peek() {
    Some(c) if pred(c) => {
      stream.read();
      true
    }
    _ => false
  }
}

impl Display for Terminal
{
  fn fmt(&self, formatter: &mut Formatter) -> Result<(), Error> {
    match self {
      Terminal::Nil => formatter.write_str("''"),
      Terminal::Any => formatter.write_str("."),
      Terminal::Token(image, true) => write!(formatter, "'{}'", escape_str(image, '\'')),
      Terminal::Token(image, false) => write!(formatter, "\"{}\"", escape_str(image, '"')),
      Terminal::Interval(interval) => interval.fmt(formatter),
      Terminal::Set(set) => set.fmt(formatter),
      Terminal::Class(class) => write!(formatter, "<{}>", class.name())
    }
  }
}

/// Named character predicates. Names are recognized without regard to case; an unknown name
/// builds an undefined class matching nothing.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum CharClass
{
  Lower,
  Upper,
  Title,
  Alpha,
  Digit,
  Alnum,
  Space,
  Undefined(String)
}

impl CharClass
{
  pub fn named(name: &str) -> CharClass {
    match name.to_ascii_lowercase().as_str() {
      "lower" => CharClass::Lower,
      "upper" => CharClass::Upper,
      "title" => CharClass::Title,
      "alpha" => CharClass::Alpha,
      "digit" => CharClass::Digit,
      "alnum" => CharClass::Alnum,
      "space" => CharClass::Space,
      _ => CharClass::Undefined(String::from(name))
    }
  }

  pub fn name(&self) -> &str {
    match self {
      CharClass::Lower => "Lower",
      CharClass::Upper => "Upper",
      CharClass::Title => "Title",
      CharClass::Alpha => "Alpha",
      CharClass::Digit => "Digit",
      CharClass::Alnum => "Alnum",
      CharClass::Space => "Space",
      CharClass::Undefined(name) => name
    }
  }

  pub fn is_undefined(&self) -> bool {
    match self {
      CharClass::Undefined(_) => true,
      _ => false
    }
  }

  pub fn contains(&self, c: char) -> bool {
    match self {
      CharClass::Lower => c.is_lowercase(),
      CharClass::Upper => c.is_uppercase(),
      CharClass::Title => get_general_category(c) == GeneralCategory::TitlecaseLetter,
      CharClass::Alpha => is_letter(c),
      CharClass::Digit => get_general_category(c) == GeneralCategory::DecimalNumber,
      CharClass::Alnum => is_letter(c) || get_general_category(c) == GeneralCategory::DecimalNumber,
      CharClass::Space => is_space(c),
      CharClass::Undefined(_) => false
    }
  }
}

// Categories Lu, Ll, Lt, Lm and Lo. Letter numbers such as roman numerals are not letters.
fn is_letter(c: char) -> bool {
  match get_general_category(c) {
    GeneralCategory::UppercaseLetter
  | GeneralCategory::LowercaseLetter
  | GeneralCategory::TitlecaseLetter
  | GeneralCategory::ModifierLetter
  | GeneralCategory::OtherLetter => true,
    _ => false
  }
}

// Separators except the no-break spaces, plus the ASCII controls used as separators.
fn is_space(c: char) -> bool {
  match c {
    '\u{00A0}' | '\u{2007}' | '\u{202F}' => false,
    '\t'..='\r' | '\u{1C}'..='\u{1F}' => true,
    c => match get_general_category(c) {
      GeneralCategory::SpaceSeparator
    | GeneralCategory::LineSeparator
    | GeneralCategory::ParagraphSeparator => true,
      _ => false
    }
  }
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn test_token_recognition() {
    let mut stream = BacktrackingStream::from_str("IfX");
    assert!(!Terminal::token("if", true).recognize(&mut stream));
    assert_eq!(stream.end().offset, 0);
    assert!(Terminal::token("if", false).recognize(&mut stream));
    assert_eq!(stream.end().offset, 2);
    assert!(Terminal::Class(CharClass::Upper).recognize(&mut stream));
    assert!(!Terminal::Any.recognize(&mut stream));
    assert!(Terminal::Nil.recognize(&mut stream));
  }

  #[test]
  fn test_interval_and_set() {
    let mut stream = BacktrackingStream::from_str("m5");
    assert!(!Terminal::interval('0', '9').recognize(&mut stream));
    assert!(Terminal::interval('z', 'a').recognize(&mut stream));
    let digits = CharSet::from_intervals(vec![CharacterInterval::new('0', '9')]);
    assert!(Terminal::Set(digits.inverse()).recognize(&mut BacktrackingStream::from_str("x")));
    assert!(Terminal::Set(digits).recognize(&mut stream));
  }

  #[test]
  fn test_classes() {
    assert!(CharClass::named("ALPHA").contains('é'));
    assert!(CharClass::named("digit").contains('7'));
    assert!(!CharClass::named("Digit").contains('x'));
    assert!(CharClass::named("space").contains('\t'));
    assert!(CharClass::named("Title").contains('\u{01C5}'));
    assert!(!CharClass::named("Title").contains('D'));
    let unknown = CharClass::named("Emoji");
    assert!(unknown.is_undefined());
    assert!(!unknown.contains('a'));
    assert_eq!(unknown.name(), "Emoji");
  }

  #[test]
  fn test_classes_follow_general_category() {
    let digit = CharClass::Digit;
    assert!(digit.contains('\u{09E6}')); // Bengali zero
    assert!(digit.contains('\u{0E50}')); // Thai zero
    assert!(!digit.contains('\u{00B2}'));
    assert!(!CharClass::Alnum.contains('\u{00B2}'));
    assert!(!CharClass::Alnum.contains('\u{00BD}'));
    assert!(CharClass::Alnum.contains('\u{0E50}'));
    assert!(!CharClass::Alpha.contains('\u{2167}')); // roman numeral eight
    assert!(CharClass::Alpha.contains('\u{05D0}'));
    assert!(CharClass::Space.contains('\u{2003}'));
    assert!(!CharClass::Space.contains('\u{00A0}'));
    assert!(CharClass::Space.contains('\u{1F}'));
  }

  #[test]
  fn test_lint_predicates() {
    assert!(Terminal::token("x", true).is_determined());
    assert!(!Terminal::token("xy", true).is_determined());
    assert!(!Terminal::token("x", false).is_determined());
    assert!(Terminal::token("+-", false).is_inefficient());
    assert!(!Terminal::token("select", false).is_inefficient());
    assert!(Terminal::interval('a', 'a').is_inefficient());
    assert!(Terminal::token("", true).is_empty());
    assert!(Terminal::Set(CharSet::new()).is_empty());
    assert!(!Terminal::Any.is_empty());
  }

  #[test]
  fn test_display() {
    assert_eq!(format!("{}", Terminal::token("it's", true)), "'it\\'s'");
    assert_eq!(format!("{}", Terminal::token("a\n", false)), "\"a\\n\"");
    assert_eq!(format!("{}", Terminal::interval('0', '9')), "'0'-'9'");
    assert_eq!(format!("{}", Terminal::Class(CharClass::Space)), "<Space>");
  }
}
