//! Parse errors.

use jot_lex::TokenKind;
use jot_ast::Pos;
use std::fmt;

/// A parse error: what was expected, what was found, and where.
#[derive(Debug)]
pub struct Error {
  pub pos: Pos,
  pub(crate) expected: Expected,
  pub(crate) found: TokenKind,
}

#[derive(Debug)]
pub(crate) enum Expected {
  Expr,
  Kind(TokenKind),
  FieldName,
  Visibility,
  SuperSuffix,
  CommaOrEnd(TokenKind),
  NumberNotFinite,
}

impl fmt::Display for Error {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match &self.expected {
      Expected::Expr => write!(f, "expected expression, found {}", self.found.describe()),
      Expected::Kind(k) => {
        write!(f, "expected {}, found {}", k.describe(), self.found.describe())
      }
      Expected::FieldName => {
        write!(f, "expected field name, found {}", self.found.describe())
      }
      Expected::Visibility => {
        write!(f, "expected `:`, `::`, or `:::`, found {}", self.found.describe())
      }
      Expected::SuperSuffix => {
        write!(f, "expected `.` or `[` after `super`, found {}", self.found.describe())
      }
      Expected::CommaOrEnd(k) => {
        write!(f, "expected `,` or {}, found {}", k.describe(), self.found.describe())
      }
      Expected::NumberNotFinite => f.write_str("number literal is not finite"),
    }
  }
}
