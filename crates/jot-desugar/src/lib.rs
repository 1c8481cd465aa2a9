//! Desugaring the raw tree into the core tree.
//!
//! Also performs the static checks: duplicate parameters, binds, and
//! fields, `self`/`super`/`$` outside an object, and comprehension misuse.

#![deny(clippy::pedantic, missing_debug_implementations, rust_2018_idioms)]

mod error;
mod internal;
mod st;

pub use error::Error;

use jot_ast::{hir, raw};

/// The result of desugaring.
#[derive(Debug)]
pub struct Desugar {
  pub arena: hir::ExprArena,
  pub top: hir::Expr,
  /// Static errors. The tree is still produced when non-empty, but should
  /// not be evaluated.
  pub errors: Vec<Error>,
}

/// Transforms the raw tree into the core tree.
#[must_use]
pub fn get(root: &raw::Expr) -> Desugar {
  let mut st = st::St::default();
  let top = internal::root(&mut st, root);
  let (arena, errors) = st.finish();
  Desugar { arena, top, errors }
}

#[cfg(test)]
mod tests {
  use jot_ast::hir::ExprData;

  fn desugar(s: &str) -> crate::Desugar {
    let lex = jot_lex::get(s);
    assert!(lex.errors.is_empty(), "lex errors: {:?}", lex.errors);
    let root = jot_parse::get(&lex.tokens).expect("parse should succeed");
    crate::get(&root)
  }

  fn desugar_ok(s: &str) -> crate::Desugar {
    let ret = desugar(s);
    assert!(ret.errors.is_empty(), "static errors: {:?}", ret.errors);
    ret
  }

  fn static_err(s: &str, want: &str) {
    let ret = desugar(s);
    let got: Vec<_> = ret.errors.iter().map(ToString::to_string).collect();
    assert!(
      got.iter().any(|msg| msg.contains(want)),
      "wanted a static error containing {want:?}, got {got:?}"
    );
  }

  #[test]
  fn slice_becomes_std_slice() {
    let d = desugar_ok("[1, 2, 3][::2]");
    assert!(matches!(d.arena[d.top], ExprData::Call { .. }));
  }

  #[test]
  fn not_eq_becomes_not_of_eq() {
    let d = desugar_ok("1 != 2");
    let ExprData::UnOp { inner, .. } = d.arena[d.top] else { panic!("wanted UnOp") };
    assert!(matches!(d.arena[inner], ExprData::BinOp { op: jot_ast::BinOp::Eq, .. }));
  }

  #[test]
  fn dollar_injected_at_outermost_object() {
    let d = desugar_ok("{ a: { b: $.a } }");
    let ExprData::Object { ref binds, .. } = d.arena[d.top] else { panic!("wanted Object") };
    assert!(binds.iter().any(|(id, _)| id.as_str() == "$"));
  }

  #[test]
  fn array_comp_becomes_flat_map() {
    let d = desugar_ok("[x for x in [1, 2]]");
    assert!(matches!(d.arena[d.top], ExprData::Call { .. }));
  }

  #[test]
  fn duplicate_param() {
    static_err("function(x, x) x", "duplicate parameter: `x`");
  }

  #[test]
  fn duplicate_field() {
    static_err("{ a: 1, a: 2 }", "duplicate field: `a`");
  }

  #[test]
  fn self_outside_object() {
    static_err("self.x", "`self` outside of an object");
  }

  #[test]
  fn super_outside_object() {
    static_err("super.x", "`super` outside of an object");
  }

  #[test]
  fn positional_after_named() {
    static_err("local f(a, b) = a; f(a=1, 2)", "positional argument after a named argument");
  }

  #[test]
  fn object_comp_misuse() {
    static_err("{ a: 1, [b]: 2 for b in [] }", "exactly one field");
    static_err("{ assert true, [b]: 2 for b in [] }", "cannot have an `assert`");
  }
}
