//! Tokens.

use jot_ast::Pos;
use std::rc::Rc;

/// A token: its kind, its text, and where it started.
///
/// For string tokens the text is the decoded value; for everything else it
/// is the lexeme.
#[derive(Debug, Clone)]
pub struct Token {
  pub kind: TokenKind,
  pub text: Rc<str>,
  pub pos: Pos,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
  // keywords
  AssertKw,
  ElseKw,
  ErrorKw,
  FalseKw,
  ForKw,
  FunctionKw,
  IfKw,
  ImportKw,
  ImportbinKw,
  ImportstrKw,
  InKw,
  LocalKw,
  NullKw,
  SelfKw,
  SuperKw,
  TailstrictKw,
  ThenKw,
  TrueKw,
  // atoms
  Id,
  Number,
  String,
  // punctuation
  LCurly,
  RCurly,
  LSquare,
  RSquare,
  LRound,
  RRound,
  Comma,
  Semicolon,
  Dot,
  Colon,
  ColonColon,
  ColonColonColon,
  Eq,
  Plus,
  Minus,
  Star,
  Slash,
  Percent,
  Bang,
  AndAnd,
  OrOr,
  EqEq,
  BangEq,
  Lt,
  LtEq,
  Gt,
  GtEq,
  Amp,
  Bar,
  Caret,
  LtLt,
  GtGt,
  Tilde,
  Dollar,
  /// End of input.
  Eof,
}

impl TokenKind {
  /// The kind for a reserved word, if the text is one.
  #[must_use]
  pub fn keyword(text: &str) -> Option<Self> {
    let ret = match text {
      "assert" => Self::AssertKw,
      "else" => Self::ElseKw,
      "error" => Self::ErrorKw,
      "false" => Self::FalseKw,
      "for" => Self::ForKw,
      "function" => Self::FunctionKw,
      "if" => Self::IfKw,
      "import" => Self::ImportKw,
      "importbin" => Self::ImportbinKw,
      "importstr" => Self::ImportstrKw,
      "in" => Self::InKw,
      "local" => Self::LocalKw,
      "null" => Self::NullKw,
      "self" => Self::SelfKw,
      "super" => Self::SuperKw,
      "tailstrict" => Self::TailstrictKw,
      "then" => Self::ThenKw,
      "true" => Self::TrueKw,
      _ => return None,
    };
    Some(ret)
  }

  /// A human description, for parse errors.
  #[must_use]
  pub fn describe(self) -> &'static str {
    match self {
      Self::AssertKw => "`assert`",
      Self::ElseKw => "`else`",
      Self::ErrorKw => "`error`",
      Self::FalseKw => "`false`",
      Self::ForKw => "`for`",
      Self::FunctionKw => "`function`",
      Self::IfKw => "`if`",
      Self::ImportKw => "`import`",
      Self::ImportbinKw => "`importbin`",
      Self::ImportstrKw => "`importstr`",
      Self::InKw => "`in`",
      Self::LocalKw => "`local`",
      Self::NullKw => "`null`",
      Self::SelfKw => "`self`",
      Self::SuperKw => "`super`",
      Self::TailstrictKw => "`tailstrict`",
      Self::ThenKw => "`then`",
      Self::TrueKw => "`true`",
      Self::Id => "identifier",
      Self::Number => "number",
      Self::String => "string",
      Self::LCurly => "`{`",
      Self::RCurly => "`}`",
      Self::LSquare => "`[`",
      Self::RSquare => "`]`",
      Self::LRound => "`(`",
      Self::RRound => "`)`",
      Self::Comma => "`,`",
      Self::Semicolon => "`;`",
      Self::Dot => "`.`",
      Self::Colon => "`:`",
      Self::ColonColon => "`::`",
      Self::ColonColonColon => "`:::`",
      Self::Eq => "`=`",
      Self::Plus => "`+`",
      Self::Minus => "`-`",
      Self::Star => "`*`",
      Self::Slash => "`/`",
      Self::Percent => "`%`",
      Self::Bang => "`!`",
      Self::AndAnd => "`&&`",
      Self::OrOr => "`||`",
      Self::EqEq => "`==`",
      Self::BangEq => "`!=`",
      Self::Lt => "`<`",
      Self::LtEq => "`<=`",
      Self::Gt => "`>`",
      Self::GtEq => "`>=`",
      Self::Amp => "`&`",
      Self::Bar => "`|`",
      Self::Caret => "`^`",
      Self::LtLt => "`<<`",
      Self::GtGt => "`>>`",
      Self::Tilde => "`~`",
      Self::Dollar => "`$`",
      Self::Eof => "end of input",
    }
  }
}
