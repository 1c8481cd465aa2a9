//! Lexing a string into a sequence of tokens.
//!
//! String escapes are interpreted here: a string token carries its decoded
//! text. Whitespace and comments are consumed and not reported.

#![deny(clippy::pedantic, missing_debug_implementations, rust_2018_idioms)]

mod error;
mod internal;
mod token;

pub use error::Error;
pub use token::{Token, TokenKind};

/// The result of lexing.
#[derive(Debug, Default)]
pub struct Lex {
  /// The tokens. Always ends with an [`TokenKind::Eof`] token.
  pub tokens: Vec<Token>,
  /// Errors when lexing.
  pub errors: Vec<Error>,
}

/// Transforms a string into tokens.
#[must_use]
pub fn get(s: &str) -> Lex {
  let mut st = internal::St::new(s);
  loop {
    let Some(token) = st.token() else { continue };
    let done = token.kind == TokenKind::Eof;
    st.tokens.push(token);
    if done {
      break;
    }
  }
  st.finish()
}

#[cfg(test)]
mod tests {
  use crate::TokenKind as TK;

  fn kinds(s: &str) -> Vec<TK> {
    let lex = crate::get(s);
    assert!(lex.errors.is_empty(), "lex errors: {:?}", lex.errors);
    lex.tokens.iter().map(|t| t.kind).collect()
  }

  #[test]
  fn smoke() {
    assert_eq!(
      kinds("local x = 3; x"),
      [TK::LocalKw, TK::Id, TK::Eq, TK::Number, TK::Semicolon, TK::Id, TK::Eof]
    );
  }

  #[test]
  fn colons() {
    assert_eq!(
      kinds("a: b:: c::: d"),
      [TK::Id, TK::Colon, TK::Id, TK::ColonColon, TK::Id, TK::ColonColonColon, TK::Id, TK::Eof]
    );
  }

  #[test]
  fn comments() {
    assert_eq!(kinds("1 // yes\n# also\n/* and\nthis */ 2"), [TK::Number, TK::Number, TK::Eof]);
  }

  #[test]
  fn string_escapes() {
    let lex = crate::get(r#""a\nbA""#);
    assert!(lex.errors.is_empty());
    assert_eq!(lex.tokens[0].kind, TK::String);
    assert_eq!(&*lex.tokens[0].text, "a\nbA");
  }

  #[test]
  fn verbatim_string() {
    let lex = crate::get(r"@'it''s'");
    assert!(lex.errors.is_empty());
    assert_eq!(&*lex.tokens[0].text, "it's");
  }

  #[test]
  fn text_block() {
    let lex = crate::get("|||\n  a\n    b\n  c\n|||");
    assert!(lex.errors.is_empty(), "lex errors: {:?}", lex.errors);
    assert_eq!(&*lex.tokens[0].text, "a\n  b\nc\n");
  }

  #[test]
  fn unclosed_string() {
    let lex = crate::get("'nope");
    assert!(!lex.errors.is_empty());
  }

  #[test]
  fn leading_zero() {
    let lex = crate::get("007");
    assert!(!lex.errors.is_empty());
  }

  #[test]
  fn positions() {
    let lex = crate::get("a\n  b");
    assert_eq!(lex.tokens[0].pos.line, 1);
    assert_eq!(lex.tokens[0].pos.col, 1);
    assert_eq!(lex.tokens[1].pos.line, 2);
    assert_eq!(lex.tokens[1].pos.col, 3);
  }
}
