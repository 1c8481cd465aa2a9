//! Lex errors.

use jot_ast::Pos;
use std::fmt;

/// A lex error.
#[derive(Debug)]
pub struct Error {
  pub pos: Pos,
  pub(crate) kind: Kind,
}

#[derive(Debug)]
pub(crate) enum Kind {
  UnclosedString,
  UnclosedComment,
  UnclosedTextBlock,
  InvalidEscape(char),
  NotHexDigit,
  LoneSurrogate,
  LeadingZero,
  NeedDigits,
  InvalidVerbatimDelim,
  NoNewLineForTextBlockStart,
  InvalidBytes,
}

impl fmt::Display for Error {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match &self.kind {
      Kind::UnclosedString => f.write_str("unclosed string"),
      Kind::UnclosedComment => f.write_str("unclosed comment"),
      Kind::UnclosedTextBlock => f.write_str("unclosed text block"),
      Kind::InvalidEscape(c) => write!(f, "invalid escape: `\\{c}`"),
      Kind::NotHexDigit => f.write_str("not a hex digit"),
      Kind::LoneSurrogate => f.write_str("unpaired surrogate in `\\u` escape"),
      Kind::LeadingZero => f.write_str("leading `0` before other digits"),
      Kind::NeedDigits => f.write_str("need at least one digit"),
      Kind::InvalidVerbatimDelim => f.write_str("invalid verbatim string delimiter"),
      Kind::NoNewLineForTextBlockStart => {
        f.write_str("must have a newline after `|||` to start text block")
      }
      Kind::InvalidBytes => f.write_str("invalid bytes"),
    }
  }
}
