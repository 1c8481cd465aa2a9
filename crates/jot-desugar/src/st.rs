//! The desugaring state.

use crate::error::{Error, Kind};
use jot_ast::hir::{Expr, ExprArena, ExprData};
use jot_ast::{Id, Pos, Prim};
use std::rc::Rc;

#[derive(Debug, Default)]
pub(crate) struct St {
  arena: ExprArena,
  errors: Vec<Error>,
}

impl St {
  pub(crate) fn expr(&mut self, data: ExprData, pos: Pos) -> Expr {
    self.arena.alloc(data, pos)
  }

  pub(crate) fn err(&mut self, pos: Pos, kind: Kind) {
    self.errors.push(Error { pos, kind });
  }

  pub(crate) fn finish(self) -> (ExprArena, Vec<Error>) {
    (self.arena, self.errors)
  }

  /// A string literal node.
  pub(crate) fn str(&mut self, s: &str, pos: Pos) -> Expr {
    self.expr(ExprData::Prim(Prim::String(Rc::from(s))), pos)
  }

  /// A reference to a field of the unshadowable `$std`.
  pub(crate) fn std_field(&mut self, name: &str, pos: Pos) -> Expr {
    let on = self.expr(ExprData::Id(Id::std_unutterable()), pos);
    let idx = self.str(name, pos);
    self.expr(ExprData::Subscript { on, idx }, pos)
  }

  /// A call to a field of the unshadowable `$std`.
  pub(crate) fn std_call(&mut self, name: &str, positional: Vec<Expr>, pos: Pos) -> Expr {
    let target = self.std_field(name, pos);
    self.expr(ExprData::Call { target, positional, named: Vec::new(), tailstrict: false }, pos)
  }
}
