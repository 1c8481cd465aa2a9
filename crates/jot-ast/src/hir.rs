//! The core tree: desugarer output, evaluator input.
//!
//! Nodes live in an arena; an [`Expr`] is a cheap copyable index into it.
//! Positions are kept in a side table inside the arena rather than on the
//! nodes themselves.

use crate::{BinOp, Id, ImportKind, Pos, Prim, UnOp, Vis};
use std::rc::Rc;

/// An expression: an index into an [`ExprArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Expr(la_arena::Idx<ExprData>);

/// The arena of expressions for one file, with their positions.
#[derive(Debug, Default)]
pub struct ExprArena {
  exprs: la_arena::Arena<ExprData>,
  pos: la_arena::ArenaMap<la_arena::Idx<ExprData>, Pos>,
}

impl ExprArena {
  pub fn alloc(&mut self, data: ExprData, pos: Pos) -> Expr {
    let idx = self.exprs.alloc(data);
    self.pos.insert(idx, pos);
    Expr(idx)
  }

  /// The position of the node. Every allocated node has one.
  #[must_use]
  pub fn pos(&self, expr: Expr) -> Pos {
    self.pos.get(expr.0).copied().unwrap_or_default()
  }
}

impl std::ops::Index<Expr> for ExprArena {
  type Output = ExprData;

  fn index(&self, index: Expr) -> &Self::Output {
    &self.exprs[index.0]
  }
}

#[derive(Debug, Clone)]
pub enum ExprData {
  Prim(Prim),
  Id(Id),
  /// `self`.
  SelfObj,
  /// `super[idx]`.
  SuperIndex { idx: Expr },
  /// `key in super`.
  InSuper { key: Expr },
  Array(Vec<Expr>),
  Object {
    /// Object locals, including the injected `$` bind. Visible to every
    /// field, mutually recursive.
    binds: Vec<(Id, Expr)>,
    /// Each assert already lowered to `if cond then true else error msg`.
    asserts: Vec<Expr>,
    fields: Vec<ObjField>,
  },
  /// An object comprehension. `iter` evaluates to an array of tuples, one
  /// tuple per produced field; `vars` name the tuple's components. The key
  /// is evaluated outside the object scope, the value inside it; object
  /// locals are already folded into the value by the desugarer.
  ObjectComp {
    key: Expr,
    value: Expr,
    vars: Vec<Id>,
    iter: Expr,
  },
  Function {
    params: Vec<(Id, Option<Expr>)>,
    body: Expr,
  },
  Call {
    target: Expr,
    positional: Vec<Expr>,
    named: Vec<(Id, Expr)>,
    tailstrict: bool,
  },
  Local {
    binds: Vec<(Id, Expr)>,
    body: Expr,
  },
  If {
    cond: Expr,
    yes: Expr,
    no: Expr,
  },
  BinOp {
    lhs: Expr,
    op: BinOp,
    rhs: Expr,
  },
  UnOp {
    op: UnOp,
    inner: Expr,
  },
  Subscript {
    on: Expr,
    idx: Expr,
  },
  Error(Expr),
  /// Kept as a node: resolution and evaluation of the imported file happen
  /// at run time, and the result is cached per canonical path.
  Import {
    kind: ImportKind,
    path: Rc<str>,
  },
}

/// A field of an object literal in the core tree.
#[derive(Debug, Clone)]
pub struct ObjField {
  pub key: Expr,
  /// The syntactic `+` of `f+:`. Only affects visibility resolution; the
  /// value-level addition is already encoded in `value` by the desugarer.
  pub plus: bool,
  pub vis: Vis,
  pub value: Expr,
}
