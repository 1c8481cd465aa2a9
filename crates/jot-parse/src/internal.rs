//! The internal impl.

use crate::error::{Error, Expected};
use jot_ast::raw::{
  Arg, Assert, Bind, CompSpec, Expr, ExprKind, Field, FieldName, Member, ObjectBody, Param,
  RawBinOp, RawVis,
};
use jot_ast::{Id, ImportKind, Number, Pos, UnOp};
use jot_lex::{Token, TokenKind as TK};

type Result<T> = std::result::Result<T, Error>;

pub(crate) struct Parser<'a> {
  tokens: &'a [Token],
  idx: usize,
}

impl<'a> Parser<'a> {
  pub(crate) fn new(tokens: &'a [Token]) -> Parser<'a> {
    assert!(
      tokens.last().is_some_and(|t| t.kind == TK::Eof),
      "token stream should end with Eof"
    );
    Parser { tokens, idx: 0 }
  }

  pub(crate) fn root(&mut self) -> Result<Expr> {
    let ret = self.expr(0)?;
    self.eat(TK::Eof)?;
    Ok(ret)
  }

  fn peek(&self) -> &Token {
    self.tokens.get(self.idx).unwrap_or_else(|| self.tokens.last().expect("tokens is non-empty"))
  }

  fn peek2(&self) -> &Token {
    self
      .tokens
      .get(self.idx + 1)
      .unwrap_or_else(|| self.tokens.last().expect("tokens is non-empty"))
  }

  fn bump(&mut self) -> Token {
    let ret = self.peek().clone();
    if ret.kind != TK::Eof {
      self.idx += 1;
    }
    ret
  }

  fn at(&self, kind: TK) -> bool {
    self.peek().kind == kind
  }

  fn eat(&mut self, kind: TK) -> Result<Token> {
    if self.at(kind) {
      Ok(self.bump())
    } else {
      Err(self.expected(Expected::Kind(kind)))
    }
  }

  fn expected(&self, expected: Expected) -> Error {
    let tok = self.peek();
    Error { pos: tok.pos, expected, found: tok.kind }
  }

  /// Precedence climbing; `min` is the loosest binding power allowed here.
  fn expr(&mut self, min: u8) -> Result<Expr> {
    let mut lhs = self.unary()?;
    loop {
      let Some((op, bp)) = bin_op(self.peek().kind) else { break };
      if bp < min {
        break;
      }
      let op_pos = self.bump().pos;
      // `x in super` has no right operand; `x in super.f` is an ordinary
      // binary `in`
      if op == RawBinOp::In
        && self.at(TK::SuperKw)
        && !matches!(self.peek2().kind, TK::Dot | TK::LSquare)
      {
        self.bump();
        lhs = Expr { pos: op_pos, kind: ExprKind::InSuper(Box::new(lhs)) };
        continue;
      }
      // all binary operators are left-associative
      let rhs = self.expr(bp + 1)?;
      lhs =
        Expr { pos: op_pos, kind: ExprKind::Binary { lhs: Box::new(lhs), op, rhs: Box::new(rhs) } };
    }
    Ok(lhs)
  }

  fn unary(&mut self) -> Result<Expr> {
    let op = match self.peek().kind {
      TK::Minus => UnOp::Neg,
      TK::Plus => UnOp::Pos,
      TK::Bang => UnOp::LogicalNot,
      TK::Tilde => UnOp::BitNot,
      _ => {
        let primary = self.primary()?;
        return self.suffixes(primary);
      }
    };
    let pos = self.bump().pos;
    let inner = self.unary()?;
    Ok(Expr { pos, kind: ExprKind::Unary { op, inner: Box::new(inner) } })
  }

  /// `e.f`, `e[k]`, `e[a:b:c]`, `e(args)`, `e { ... }`.
  fn suffixes(&mut self, mut target: Expr) -> Result<Expr> {
    loop {
      match self.peek().kind {
        TK::Dot => {
          self.bump();
          let id = self.eat(TK::Id)?;
          let idx = Expr { pos: id.pos, kind: ExprKind::String(id.text.clone()) };
          target = Expr {
            pos: id.pos,
            kind: ExprKind::Index { target: Box::new(target), idx: Box::new(idx) },
          };
        }
        TK::LSquare => {
          let pos = self.bump().pos;
          target = self.index_or_slice(target, pos)?;
        }
        TK::LRound => {
          let pos = self.bump().pos;
          let args = self.call_args()?;
          let tailstrict = if self.at(TK::TailstrictKw) {
            self.bump();
            true
          } else {
            false
          };
          target = Expr {
            pos,
            kind: ExprKind::Call { target: Box::new(target), args, tailstrict },
          };
        }
        TK::LCurly => {
          let pos = self.peek().pos;
          let obj = self.object()?;
          target = Expr {
            pos,
            kind: ExprKind::ObjectApply { target: Box::new(target), obj: Box::new(obj) },
          };
        }
        _ => return Ok(target),
      }
    }
  }

  /// After the `[` of an index or slice.
  fn index_or_slice(&mut self, target: Expr, pos: Pos) -> Result<Expr> {
    let mut start = None::<Expr>;
    let mut end = None::<Expr>;
    let mut step = None::<Expr>;
    let mut colons = 0usize;
    if !matches!(self.peek().kind, TK::Colon | TK::ColonColon | TK::RSquare) {
      start = Some(self.expr(0)?);
    }
    loop {
      match self.peek().kind {
        TK::RSquare => {
          self.bump();
          break;
        }
        TK::Colon if colons < 2 => {
          colons += 1;
          self.bump();
        }
        TK::ColonColon if colons == 0 => {
          colons += 2;
          self.bump();
        }
        _ => {
          if colons == 0 {
            return Err(self.expected(Expected::Kind(TK::RSquare)));
          }
          let e = self.expr(0)?;
          match colons {
            1 if end.is_none() => end = Some(e),
            2 if step.is_none() => step = Some(e),
            _ => return Err(self.expected(Expected::Kind(TK::RSquare))),
          }
        }
      }
    }
    if colons == 0 {
      let Some(idx) = start else { return Err(self.expected(Expected::Expr)) };
      return Ok(Expr {
        pos,
        kind: ExprKind::Index { target: Box::new(target), idx: Box::new(idx) },
      });
    }
    Ok(Expr {
      pos,
      kind: ExprKind::Slice {
        target: Box::new(target),
        start: start.map(Box::new),
        end: end.map(Box::new),
        step: step.map(Box::new),
      },
    })
  }

  /// After the `(` of a call. Eats the `)`.
  fn call_args(&mut self) -> Result<Vec<Arg>> {
    let mut args = Vec::<Arg>::new();
    while !self.at(TK::RRound) {
      let pos = self.peek().pos;
      let arg = if self.at(TK::Id) && self.peek2().kind == TK::Eq {
        let name = Id::new(&self.bump().text);
        self.bump();
        Arg { pos, name: Some(name), value: self.expr(0)? }
      } else {
        Arg { pos, name: None, value: self.expr(0)? }
      };
      args.push(arg);
      if self.at(TK::Comma) {
        self.bump();
      } else if !self.at(TK::RRound) {
        return Err(self.expected(Expected::CommaOrEnd(TK::RRound)));
      }
    }
    self.bump();
    Ok(args)
  }

  #[allow(clippy::too_many_lines)]
  fn primary(&mut self) -> Result<Expr> {
    let tok = self.peek().clone();
    let pos = tok.pos;
    let kind = match tok.kind {
      TK::NullKw => {
        self.bump();
        ExprKind::Null
      }
      TK::TrueKw => {
        self.bump();
        ExprKind::True
      }
      TK::FalseKw => {
        self.bump();
        ExprKind::False
      }
      TK::Number => {
        self.bump();
        let n: f64 = tok.text.parse().map_err(|_| Error {
          pos,
          expected: Expected::NumberNotFinite,
          found: TK::Number,
        })?;
        let n = Number::new(n).map_err(|_| Error {
          pos,
          expected: Expected::NumberNotFinite,
          found: TK::Number,
        })?;
        ExprKind::Number(n)
      }
      TK::String => {
        self.bump();
        ExprKind::String(tok.text.clone())
      }
      TK::Id => {
        self.bump();
        ExprKind::Id(Id::new(&tok.text))
      }
      TK::SelfKw => {
        self.bump();
        ExprKind::SelfKw
      }
      TK::Dollar => {
        self.bump();
        ExprKind::Dollar
      }
      TK::SuperKw => {
        self.bump();
        match self.peek().kind {
          TK::Dot => {
            self.bump();
            let id = self.eat(TK::Id)?;
            let idx = Expr { pos: id.pos, kind: ExprKind::String(id.text.clone()) };
            ExprKind::SuperIndex(Box::new(idx))
          }
          TK::LSquare => {
            self.bump();
            let idx = self.expr(0)?;
            self.eat(TK::RSquare)?;
            ExprKind::SuperIndex(Box::new(idx))
          }
          _ => return Err(self.expected(Expected::SuperSuffix)),
        }
      }
      TK::LRound => {
        self.bump();
        let inner = self.expr(0)?;
        self.eat(TK::RRound)?;
        return Ok(inner);
      }
      TK::LCurly => return self.object(),
      TK::LSquare => return self.array(),
      TK::LocalKw => {
        self.bump();
        let mut binds = vec![self.bind()?];
        while self.at(TK::Comma) {
          self.bump();
          binds.push(self.bind()?);
        }
        self.eat(TK::Semicolon)?;
        let body = self.expr(0)?;
        ExprKind::Local { binds, body: Box::new(body) }
      }
      TK::IfKw => {
        self.bump();
        let cond = self.expr(0)?;
        self.eat(TK::ThenKw)?;
        let then = self.expr(0)?;
        let els = if self.at(TK::ElseKw) {
          self.bump();
          Some(Box::new(self.expr(0)?))
        } else {
          None
        };
        ExprKind::If { cond: Box::new(cond), then: Box::new(then), els }
      }
      TK::FunctionKw => {
        self.bump();
        self.eat(TK::LRound)?;
        let params = self.params()?;
        let body = self.expr(0)?;
        ExprKind::Function { params, body: Box::new(body) }
      }
      TK::AssertKw => {
        let assert = self.assert_stmt()?;
        self.eat(TK::Semicolon)?;
        let rest = self.expr(0)?;
        ExprKind::Assert { assert, rest: Box::new(rest) }
      }
      TK::ErrorKw => {
        self.bump();
        let inner = self.expr(0)?;
        ExprKind::Error(Box::new(inner))
      }
      TK::ImportKw | TK::ImportstrKw | TK::ImportbinKw => {
        self.bump();
        let path = self.eat(TK::String)?;
        let kind = match tok.kind {
          TK::ImportKw => ImportKind::Code,
          TK::ImportstrKw => ImportKind::String,
          _ => ImportKind::Binary,
        };
        ExprKind::Import { kind, path: path.text.clone() }
      }
      _ => return Err(self.expected(Expected::Expr)),
    };
    Ok(Expr { pos, kind })
  }

  /// After seeing (not eating) the `{` of an object literal.
  fn object(&mut self) -> Result<Expr> {
    let pos = self.eat(TK::LCurly)?.pos;
    let mut members = Vec::<Member>::new();
    loop {
      if self.at(TK::RCurly) {
        self.bump();
        let kind = ExprKind::Object { body: ObjectBody { members }, comp: None };
        return Ok(Expr { pos, kind });
      }
      if self.at(TK::ForKw) {
        let specs = self.comp_specs()?;
        self.eat(TK::RCurly)?;
        let kind = ExprKind::Object { body: ObjectBody { members }, comp: Some(specs) };
        return Ok(Expr { pos, kind });
      }
      members.push(self.member()?);
      if self.at(TK::Comma) {
        self.bump();
      } else if !self.at(TK::RCurly) && !self.at(TK::ForKw) {
        return Err(self.expected(Expected::CommaOrEnd(TK::RCurly)));
      }
    }
  }

  fn member(&mut self) -> Result<Member> {
    match self.peek().kind {
      TK::LocalKw => {
        self.bump();
        Ok(Member::Local(self.bind()?))
      }
      TK::AssertKw => Ok(Member::Assert(self.assert_stmt()?)),
      _ => Ok(Member::Field(self.field()?)),
    }
  }

  fn field(&mut self) -> Result<Field> {
    let pos = self.peek().pos;
    let name = match self.peek().kind {
      TK::Id => FieldName::Id(Id::new(&self.bump().text)),
      TK::String => FieldName::String(self.bump().text.clone()),
      TK::LSquare => {
        self.bump();
        let e = self.expr(0)?;
        self.eat(TK::RSquare)?;
        FieldName::Computed(Box::new(e))
      }
      _ => return Err(self.expected(Expected::FieldName)),
    };
    let params = if self.at(TK::LRound) {
      self.bump();
      Some(self.params()?)
    } else {
      None
    };
    let plus = if self.at(TK::Plus) {
      self.bump();
      true
    } else {
      false
    };
    let vis = match self.peek().kind {
      TK::Colon => RawVis::Colon,
      TK::ColonColon => RawVis::ColonColon,
      TK::ColonColonColon => RawVis::ColonColonColon,
      _ => return Err(self.expected(Expected::Visibility)),
    };
    self.bump();
    let value = self.expr(0)?;
    Ok(Field { pos, name, params, plus, vis, value })
  }

  /// A `local` bind: `x = e` or `f(params) = e`.
  fn bind(&mut self) -> Result<Bind> {
    let id = self.eat(TK::Id)?;
    let params = if self.at(TK::LRound) {
      self.bump();
      Some(self.params()?)
    } else {
      None
    };
    self.eat(TK::Eq)?;
    let value = self.expr(0)?;
    Ok(Bind { pos: id.pos, name: Id::new(&id.text), params, value })
  }

  /// Parameters, after the `(`. Eats the `)`.
  fn params(&mut self) -> Result<Vec<Param>> {
    let mut params = Vec::<Param>::new();
    while !self.at(TK::RRound) {
      let id = self.eat(TK::Id)?;
      let default = if self.at(TK::Eq) {
        self.bump();
        Some(self.expr(0)?)
      } else {
        None
      };
      params.push(Param { pos: id.pos, name: Id::new(&id.text), default });
      if self.at(TK::Comma) {
        self.bump();
      } else if !self.at(TK::RRound) {
        return Err(self.expected(Expected::CommaOrEnd(TK::RRound)));
      }
    }
    self.bump();
    Ok(params)
  }

  /// `assert cond` or `assert cond : msg`, without the trailing `;`.
  fn assert_stmt(&mut self) -> Result<Assert> {
    let pos = self.eat(TK::AssertKw)?.pos;
    let cond = self.expr(0)?;
    let msg = if self.at(TK::Colon) {
      self.bump();
      Some(Box::new(self.expr(0)?))
    } else {
      None
    };
    Ok(Assert { pos, cond: Box::new(cond), msg })
  }

  /// `for x in e` and `if e` clauses. The first is always a `for`.
  fn comp_specs(&mut self) -> Result<Vec<CompSpec>> {
    let mut specs = Vec::<CompSpec>::new();
    let pos = self.peek().pos;
    self.eat(TK::ForKw)?;
    let var = self.eat(TK::Id)?;
    self.eat(TK::InKw)?;
    let iter = self.expr(0)?;
    specs.push(CompSpec::For { pos, var: Id::new(&var.text), iter });
    loop {
      match self.peek().kind {
        TK::ForKw => {
          let pos = self.bump().pos;
          let var = self.eat(TK::Id)?;
          self.eat(TK::InKw)?;
          let iter = self.expr(0)?;
          specs.push(CompSpec::For { pos, var: Id::new(&var.text), iter });
        }
        TK::IfKw => {
          let pos = self.bump().pos;
          let cond = self.expr(0)?;
          specs.push(CompSpec::If { pos, cond });
        }
        _ => return Ok(specs),
      }
    }
  }

  fn array(&mut self) -> Result<Expr> {
    let pos = self.eat(TK::LSquare)?.pos;
    if self.at(TK::RSquare) {
      self.bump();
      return Ok(Expr { pos, kind: ExprKind::Array(Vec::new()) });
    }
    let first = self.expr(0)?;
    if self.at(TK::Comma) && self.peek2().kind == TK::ForKw {
      self.bump();
    }
    if self.at(TK::ForKw) {
      let specs = self.comp_specs()?;
      self.eat(TK::RSquare)?;
      let kind = ExprKind::ArrayComp { elem: Box::new(first), specs };
      return Ok(Expr { pos, kind });
    }
    let mut elems = vec![first];
    loop {
      if self.at(TK::RSquare) {
        self.bump();
        return Ok(Expr { pos, kind: ExprKind::Array(elems) });
      }
      self.eat(TK::Comma)?;
      if self.at(TK::RSquare) {
        self.bump();
        return Ok(Expr { pos, kind: ExprKind::Array(elems) });
      }
      elems.push(self.expr(0)?);
    }
  }
}

/// Binding powers; tighter binds are higher. Unary operators sit above all
/// of these.
fn bin_op(kind: TK) -> Option<(RawBinOp, u8)> {
  let ret = match kind {
    TK::OrOr => (RawBinOp::Or, 1),
    TK::AndAnd => (RawBinOp::And, 2),
    TK::Bar => (RawBinOp::BitOr, 3),
    TK::Caret => (RawBinOp::BitXor, 4),
    TK::Amp => (RawBinOp::BitAnd, 5),
    TK::EqEq => (RawBinOp::Eq, 6),
    TK::BangEq => (RawBinOp::NotEq, 6),
    TK::Lt => (RawBinOp::Lt, 7),
    TK::LtEq => (RawBinOp::LtEq, 7),
    TK::Gt => (RawBinOp::Gt, 7),
    TK::GtEq => (RawBinOp::GtEq, 7),
    TK::InKw => (RawBinOp::In, 7),
    TK::LtLt => (RawBinOp::Shl, 8),
    TK::GtGt => (RawBinOp::Shr, 8),
    TK::Plus => (RawBinOp::Add, 9),
    TK::Minus => (RawBinOp::Sub, 9),
    TK::Star => (RawBinOp::Mul, 10),
    TK::Slash => (RawBinOp::Div, 10),
    TK::Percent => (RawBinOp::Mod, 10),
    _ => return None,
  };
  Some(ret)
}
