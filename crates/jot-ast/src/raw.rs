//! The raw tree: parser output, sugar intact.

use crate::{Id, ImportKind, Number, Pos, UnOp};
use std::rc::Rc;

/// An expression with its position.
#[derive(Debug, Clone)]
pub struct Expr {
  pub pos: Pos,
  pub kind: ExprKind,
}

#[derive(Debug, Clone)]
pub enum ExprKind {
  Null,
  True,
  False,
  Number(Number),
  String(Rc<str>),
  Id(Id),
  SelfKw,
  /// `$`.
  Dollar,
  /// `super.f` or `super[e]`; the field name is already an expression.
  SuperIndex(Box<Expr>),
  /// `e in super`.
  InSuper(Box<Expr>),
  Array(Vec<Expr>),
  /// `[ elem for x in xs if c ... ]`. The first spec is always a `for`.
  ArrayComp { elem: Box<Expr>, specs: Vec<CompSpec> },
  /// An object literal, or with `comp` present an object comprehension.
  /// Which members a comprehension may have is checked by the desugarer.
  Object { body: ObjectBody, comp: Option<Vec<CompSpec>> },
  /// `e { ... }`, sugar for `e + { ... }`. The right side is an `Object`.
  ObjectApply { target: Box<Expr>, obj: Box<Expr> },
  Local { binds: Vec<Bind>, body: Box<Expr> },
  If { cond: Box<Expr>, then: Box<Expr>, els: Option<Box<Expr>> },
  Function { params: Vec<Param>, body: Box<Expr> },
  Call { target: Box<Expr>, args: Vec<Arg>, tailstrict: bool },
  Unary { op: UnOp, inner: Box<Expr> },
  Binary { lhs: Box<Expr>, op: RawBinOp, rhs: Box<Expr> },
  /// `e.f` and `e[k]`; the index is already an expression.
  Index { target: Box<Expr>, idx: Box<Expr> },
  /// `e[a:b:c]`; absent parts are `None`.
  Slice {
    target: Box<Expr>,
    start: Option<Box<Expr>>,
    end: Option<Box<Expr>>,
    step: Option<Box<Expr>>,
  },
  Error(Box<Expr>),
  /// `assert cond [: msg]; rest`.
  Assert { assert: Assert, rest: Box<Expr> },
  Import { kind: ImportKind, path: Rc<str> },
}

/// A binary operator as parsed. `in` and `!=` exist here but not in the core
/// tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawBinOp {
  Mul,
  Div,
  Mod,
  Add,
  Sub,
  Shl,
  Shr,
  Lt,
  LtEq,
  Gt,
  GtEq,
  In,
  Eq,
  NotEq,
  BitAnd,
  BitXor,
  BitOr,
  And,
  Or,
}

/// The members of an object literal, in source order.
#[derive(Debug, Clone)]
pub struct ObjectBody {
  pub members: Vec<Member>,
}

#[derive(Debug, Clone)]
pub enum Member {
  Local(Bind),
  Assert(Assert),
  Field(Field),
}

#[derive(Debug, Clone)]
pub struct Field {
  pub pos: Pos,
  pub name: FieldName,
  /// `f(x): body` sugar.
  pub params: Option<Vec<Param>>,
  /// The `+` in `f+:`.
  pub plus: bool,
  pub vis: RawVis,
  pub value: Expr,
}

#[derive(Debug, Clone)]
pub enum FieldName {
  Id(Id),
  String(Rc<str>),
  /// `[e]`.
  Computed(Box<Expr>),
}

/// `:`, `::`, or `:::`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawVis {
  Colon,
  ColonColon,
  ColonColonColon,
}

/// A `local` bind, possibly with function sugar: `local f(x) = body`.
#[derive(Debug, Clone)]
pub struct Bind {
  pub pos: Pos,
  pub name: Id,
  pub params: Option<Vec<Param>>,
  pub value: Expr,
}

#[derive(Debug, Clone)]
pub struct Param {
  pub pos: Pos,
  pub name: Id,
  pub default: Option<Expr>,
}

#[derive(Debug, Clone)]
pub struct Assert {
  pub pos: Pos,
  pub cond: Box<Expr>,
  pub msg: Option<Box<Expr>>,
}

/// One `for` or `if` clause of a comprehension.
#[derive(Debug, Clone)]
pub enum CompSpec {
  For { pos: Pos, var: Id, iter: Expr },
  If { pos: Pos, cond: Expr },
}

/// An argument at a call site.
#[derive(Debug, Clone)]
pub struct Arg {
  pub pos: Pos,
  pub name: Option<Id>,
  pub value: Expr,
}
