//! The internal impl.

use crate::error::{Error, Kind};
use crate::token::{Token, TokenKind as TK};
use crate::Lex;
use jot_ast::Pos;
use std::rc::Rc;

const PUNCTUATION: [(&[u8], TK); 33] = [
  (b":::", TK::ColonColonColon),
  (b"::", TK::ColonColon),
  (b"&&", TK::AndAnd),
  (b"||", TK::OrOr),
  (b"==", TK::EqEq),
  (b"!=", TK::BangEq),
  (b"<=", TK::LtEq),
  (b">=", TK::GtEq),
  (b"<<", TK::LtLt),
  (b">>", TK::GtGt),
  (b"{", TK::LCurly),
  (b"}", TK::RCurly),
  (b"[", TK::LSquare),
  (b"]", TK::RSquare),
  (b"(", TK::LRound),
  (b")", TK::RRound),
  (b",", TK::Comma),
  (b";", TK::Semicolon),
  (b".", TK::Dot),
  (b":", TK::Colon),
  (b"=", TK::Eq),
  (b"+", TK::Plus),
  (b"-", TK::Minus),
  (b"*", TK::Star),
  (b"%", TK::Percent),
  (b"!", TK::Bang),
  (b"<", TK::Lt),
  (b">", TK::Gt),
  (b"&", TK::Amp),
  (b"|", TK::Bar),
  (b"^", TK::Caret),
  (b"~", TK::Tilde),
  (b"$", TK::Dollar),
];

pub(crate) struct St<'a> {
  bytes: &'a [u8],
  idx: usize,
  line: u32,
  col: u32,
  pub(crate) tokens: Vec<Token>,
  errors: Vec<Error>,
}

impl<'a> St<'a> {
  pub(crate) fn new(s: &'a str) -> St<'a> {
    St { bytes: s.as_bytes(), idx: 0, line: 1, col: 1, tokens: Vec::new(), errors: Vec::new() }
  }

  pub(crate) fn finish(self) -> Lex {
    Lex { tokens: self.tokens, errors: self.errors }
  }

  fn cur(&self) -> Option<u8> {
    self.bytes.get(self.idx).copied()
  }

  fn peek(&self) -> Option<u8> {
    self.bytes.get(self.idx + 1).copied()
  }

  fn bump(&mut self) {
    let Some(&b) = self.bytes.get(self.idx) else { return };
    self.idx += 1;
    if b == b'\n' {
      self.line += 1;
      self.col = 1;
    } else if b & 0xc0 != 0x80 {
      // only count the first byte of a UTF-8 sequence
      self.col += 1;
    }
  }

  fn pos(&self) -> Pos {
    #[allow(clippy::cast_possible_truncation)]
    Pos { line: self.line, col: self.col, offset: self.idx as u32 }
  }

  fn err(&mut self, pos: Pos, kind: Kind) {
    self.errors.push(Error { pos, kind });
  }

  fn advance_while<F>(&mut self, f: F)
  where
    F: Fn(u8) -> bool,
  {
    while self.cur().is_some_and(&f) {
      self.bump();
    }
  }

  fn eat_prefix(&mut self, prefix: &[u8]) -> bool {
    if self.bytes[self.idx..].starts_with(prefix) {
      for _ in 0..prefix.len() {
        self.bump();
      }
      true
    } else {
      false
    }
  }

  fn lexeme_from(&self, start: usize) -> Rc<str> {
    let bs = &self.bytes[start..self.idx];
    Rc::from(std::str::from_utf8(bs).expect("each token should be a str"))
  }

  /// The next token, or `None` if trivia (whitespace, a comment) was
  /// consumed instead.
  #[allow(clippy::too_many_lines)]
  pub(crate) fn token(&mut self) -> Option<Token> {
    let pos = self.pos();
    let start = self.idx;
    let Some(b) = self.cur() else {
      return Some(Token { kind: TK::Eof, text: Rc::from(""), pos });
    };
    if is_ws(b) {
      self.advance_while(is_ws);
      return None;
    }
    if b == b'#' {
      self.advance_while(|b| b != b'\n');
      return None;
    }
    if b == b'/' {
      match self.peek() {
        Some(b'/') => {
          self.advance_while(|b| b != b'\n');
          return None;
        }
        Some(b'*') => {
          self.bump();
          self.bump();
          let mut prev = None::<u8>;
          loop {
            let Some(cur) = self.cur() else {
              self.err(pos, Kind::UnclosedComment);
              return None;
            };
            self.bump();
            if prev == Some(b'*') && cur == b'/' {
              return None;
            }
            prev = Some(cur);
          }
        }
        Some(_) | None => {
          self.bump();
          return Some(Token { kind: TK::Slash, text: self.lexeme_from(start), pos });
        }
      }
    }
    // before PUNCTUATION since that contains || and |
    if self.bytes[self.idx..].starts_with(b"|||") {
      let text = self.text_block(pos);
      return Some(Token { kind: TK::String, text, pos });
    }
    if let Some(&(_, kind)) = PUNCTUATION.iter().find(|&&(bs, _)| self.eat_prefix(bs)) {
      return Some(Token { kind, text: self.lexeme_from(start), pos });
    }
    if b.is_ascii_alphabetic() || b == b'_' {
      self.bump();
      self.advance_while(|b| b.is_ascii_alphanumeric() || b == b'_');
      let text = self.lexeme_from(start);
      let kind = TK::keyword(&text).unwrap_or(TK::Id);
      return Some(Token { kind, text, pos });
    }
    if b.is_ascii_digit() {
      self.bump();
      let m = self.idx;
      self.advance_while(|b| b.is_ascii_digit());
      if self.idx != m && b == b'0' {
        self.err(pos, Kind::LeadingZero);
      }
      if self.cur() == Some(b'.') {
        self.bump();
        self.digits();
      }
      if let Some(b'e' | b'E') = self.cur() {
        self.bump();
        if let Some(b'-' | b'+') = self.cur() {
          self.bump();
        }
        self.digits();
      }
      return Some(Token { kind: TK::Number, text: self.lexeme_from(start), pos });
    }
    if b == b'"' || b == b'\'' {
      self.bump();
      let text = self.slash_string(pos, b);
      return Some(Token { kind: TK::String, text, pos });
    }
    if b == b'@' {
      self.bump();
      let delim = match self.cur() {
        Some(d @ (b'"' | b'\'')) => d,
        _ => {
          self.err(pos, Kind::InvalidVerbatimDelim);
          return None;
        }
      };
      self.bump();
      let text = self.verbatim_string(pos, delim);
      return Some(Token { kind: TK::String, text, pos });
    }
    self.err(pos, Kind::InvalidBytes);
    self.bump();
    None
  }

  fn digits(&mut self) {
    let m = self.idx;
    self.advance_while(|b| b.is_ascii_digit());
    if self.idx == m {
      let pos = self.pos();
      self.err(pos, Kind::NeedDigits);
    }
  }

  /// A `'`- or `"`-quoted string with slash escapes. The opening quote has
  /// been eaten.
  fn slash_string(&mut self, start: Pos, terminator: u8) -> Rc<str> {
    let mut buf = Vec::<u8>::new();
    loop {
      let Some(cur) = self.cur() else {
        self.err(start, Kind::UnclosedString);
        break;
      };
      self.bump();
      if cur == terminator {
        break;
      }
      if cur != b'\\' {
        buf.push(cur);
        continue;
      }
      let Some(esc) = self.cur() else {
        self.err(start, Kind::UnclosedString);
        break;
      };
      self.bump();
      match esc {
        b'"' => buf.push(b'"'),
        b'\'' => buf.push(b'\''),
        b'\\' => buf.push(b'\\'),
        b'/' => buf.push(b'/'),
        b'b' => buf.push(8),
        b'f' => buf.push(12),
        b'n' => buf.push(b'\n'),
        b'r' => buf.push(b'\r'),
        b't' => buf.push(b'\t'),
        b'u' => {
          if let Some(c) = self.unicode_escape() {
            let mut tmp = [0u8; 4];
            buf.extend_from_slice(c.encode_utf8(&mut tmp).as_bytes());
          }
        }
        _ => {
          let pos = self.pos();
          self.err(pos, Kind::InvalidEscape(char::from(esc)));
        }
      }
    }
    Rc::from(String::from_utf8(buf).expect("string contents should be UTF-8"))
  }

  /// The `DDDD` of a `\uDDDD` escape, combining surrogate pairs.
  fn unicode_escape(&mut self) -> Option<char> {
    let pos = self.pos();
    let hi = self.hex4()?;
    let code = match hi {
      0xd800..=0xdbff => {
        if !(self.eat_prefix(b"\\u")) {
          self.err(pos, Kind::LoneSurrogate);
          return None;
        }
        let lo = self.hex4()?;
        if !(0xdc00..=0xdfff).contains(&lo) {
          self.err(pos, Kind::LoneSurrogate);
          return None;
        }
        0x10000 + ((hi - 0xd800) << 10) + (lo - 0xdc00)
      }
      0xdc00..=0xdfff => {
        self.err(pos, Kind::LoneSurrogate);
        return None;
      }
      _ => hi,
    };
    char::from_u32(code)
  }

  fn hex4(&mut self) -> Option<u32> {
    let mut n = 0u32;
    for _ in 0..4 {
      let pos = self.pos();
      let Some(d) = self.cur().and_then(|b| char::from(b).to_digit(16)) else {
        self.err(pos, Kind::NotHexDigit);
        return None;
      };
      self.bump();
      n = n * 16 + d;
    }
    Some(n)
  }

  /// An `@`-string. Doubling the delimiter is the only escape.
  fn verbatim_string(&mut self, start: Pos, terminator: u8) -> Rc<str> {
    let mut buf = Vec::<u8>::new();
    loop {
      let Some(cur) = self.cur() else {
        self.err(start, Kind::UnclosedString);
        break;
      };
      self.bump();
      if cur == terminator {
        if self.cur() == Some(terminator) {
          self.bump();
        } else {
          break;
        }
      }
      buf.push(cur);
    }
    Rc::from(String::from_utf8(buf).expect("string contents should be UTF-8"))
  }

  /// A `|||` text block. The opening `|||` has NOT been eaten yet.
  fn text_block(&mut self, start: Pos) -> Rc<str> {
    assert!(self.eat_prefix(b"|||"));
    self.advance_while(is_non_nl_ws);
    if self.cur() == Some(b'\n') {
      self.bump();
    } else {
      self.err(start, Kind::NoNewLineForTextBlockStart);
    }
    let mut lines = Vec::<String>::new();
    loop {
      if self.cur().is_none() {
        self.err(start, Kind::UnclosedTextBlock);
        break;
      }
      // find the extent of this line without consuming it
      let mut j = self.idx;
      while j < self.bytes.len() && self.bytes[j] != b'\n' {
        j += 1;
      }
      let line = &self.bytes[self.idx..j];
      let indent = line.iter().take_while(|&&b| b == b' ' || b == b'\t').count();
      if line[indent..].starts_with(b"|||") {
        // the close; anything after it on the line is part of the program
        for _ in 0..indent + 3 {
          self.bump();
        }
        break;
      }
      let line = std::str::from_utf8(line).expect("each line should be a str").to_owned();
      lines.push(line);
      while self.idx < j {
        self.bump();
      }
      if self.cur() == Some(b'\n') {
        self.bump();
      }
    }
    let min_indent = lines
      .iter()
      .filter(|line| !line.trim().is_empty())
      .map(|line| line.len() - line.trim_start_matches([' ', '\t']).len())
      .min()
      .unwrap_or(0);
    let mut buf = String::new();
    for line in &lines {
      if line.trim().is_empty() {
        buf.push('\n');
      } else {
        buf.push_str(&line[min_indent..]);
        buf.push('\n');
      }
    }
    Rc::from(buf)
  }
}

fn is_ws(b: u8) -> bool {
  matches!(b, b' ' | b'\t' | b'\n' | b'\r')
}

fn is_non_nl_ws(b: u8) -> bool {
  matches!(b, b' ' | b'\t' | b'\r')
}
