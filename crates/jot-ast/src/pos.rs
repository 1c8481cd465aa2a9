//! Source positions.

use std::fmt;

/// A position in a source file: 1-based line and column, plus the byte
/// offset. Attached to every token and every syntax node, and carried into
/// runtime errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pos {
  pub line: u32,
  pub col: u32,
  pub offset: u32,
}

impl Pos {
  /// The start of a file.
  #[must_use]
  pub fn start() -> Self {
    Self { line: 1, col: 1, offset: 0 }
  }
}

impl Default for Pos {
  fn default() -> Self {
    Self::start()
  }
}

impl fmt::Display for Pos {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}:{}", self.line, self.col)
  }
}
