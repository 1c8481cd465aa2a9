//! Parsing a sequence of tokens into the raw tree.
//!
//! Recursive descent, with precedence climbing for the binary operators.
//! The first error aborts the parse.

#![deny(clippy::pedantic, missing_debug_implementations, rust_2018_idioms)]

mod error;
mod internal;

pub use error::Error;

use jot_ast::raw;
use jot_lex::Token;

/// Transforms tokens into an expression.
///
/// # Errors
///
/// If the tokens do not form exactly one expression.
pub fn get(tokens: &[Token]) -> Result<raw::Expr, Error> {
  internal::Parser::new(tokens).root()
}

#[cfg(test)]
mod tests {
  use jot_ast::raw::{ExprKind, Member, RawBinOp};

  fn parse(s: &str) -> jot_ast::raw::Expr {
    let lex = jot_lex::get(s);
    assert!(lex.errors.is_empty(), "lex errors: {:?}", lex.errors);
    crate::get(&lex.tokens).expect("parse should succeed")
  }

  fn parse_err(s: &str) -> crate::Error {
    let lex = jot_lex::get(s);
    assert!(lex.errors.is_empty(), "lex errors: {:?}", lex.errors);
    crate::get(&lex.tokens).expect_err("parse should fail")
  }

  #[test]
  fn precedence() {
    // 1 + 2 * 3 parses as 1 + (2 * 3)
    let e = parse("1 + 2 * 3");
    let ExprKind::Binary { op: RawBinOp::Add, rhs, .. } = e.kind else {
      panic!("wanted Add at the root")
    };
    assert!(matches!(rhs.kind, ExprKind::Binary { op: RawBinOp::Mul, .. }));
  }

  #[test]
  fn left_assoc() {
    // 1 - 2 - 3 parses as (1 - 2) - 3
    let e = parse("1 - 2 - 3");
    let ExprKind::Binary { op: RawBinOp::Sub, lhs, .. } = e.kind else {
      panic!("wanted Sub at the root")
    };
    assert!(matches!(lhs.kind, ExprKind::Binary { op: RawBinOp::Sub, .. }));
  }

  #[test]
  fn suffix_binds_tighter() {
    // -a.b parses as -(a.b)
    let e = parse("-a.b");
    let ExprKind::Unary { inner, .. } = e.kind else { panic!("wanted Unary at the root") };
    assert!(matches!(inner.kind, ExprKind::Index { .. }));
  }

  #[test]
  fn object_members() {
    let e = parse("{ local n = 3, assert true, a: n, b:: 2, c+::: [] }");
    let ExprKind::Object { body, comp: None } = e.kind else { panic!("wanted an object") };
    assert_eq!(body.members.len(), 5);
    assert!(matches!(body.members[0], Member::Local(_)));
    assert!(matches!(body.members[1], Member::Assert(_)));
    let Member::Field(f) = &body.members[4] else { panic!("wanted a field") };
    assert!(f.plus);
  }

  #[test]
  fn object_comp() {
    let e = parse("{ [k]: 1 for k in ks if k != null }");
    let ExprKind::Object { comp: Some(specs), .. } = e.kind else {
      panic!("wanted a comprehension")
    };
    assert_eq!(specs.len(), 2);
  }

  #[test]
  fn array_comp() {
    let e = parse("[x * x for x in xs for y in ys if y]");
    let ExprKind::ArrayComp { specs, .. } = e.kind else { panic!("wanted a comprehension") };
    assert_eq!(specs.len(), 3);
  }

  #[test]
  fn slice() {
    let e = parse("xs[1:2:3]");
    assert!(matches!(e.kind, ExprKind::Slice { .. }));
    let e = parse("xs[::2]");
    let ExprKind::Slice { start, end, step, .. } = e.kind else { panic!("wanted a slice") };
    assert!(start.is_none() && end.is_none() && step.is_some());
  }

  #[test]
  fn in_super() {
    let e = parse("'f' in super");
    assert!(matches!(e.kind, ExprKind::InSuper(_)));
  }

  #[test]
  fn implicit_object_plus() {
    let e = parse("a { b: 1 }");
    assert!(matches!(e.kind, ExprKind::ObjectApply { .. }));
  }

  #[test]
  fn call_args() {
    let e = parse("f(1, x=2) tailstrict");
    let ExprKind::Call { args, tailstrict, .. } = e.kind else { panic!("wanted a call") };
    assert_eq!(args.len(), 2);
    assert!(tailstrict);
    assert!(args[1].name.is_some());
  }

  #[test]
  fn super_alone_is_an_error() {
    let e = parse_err("super");
    assert!(e.to_string().contains("after `super`"));
  }

  #[test]
  fn unexpected_token() {
    let e = parse_err("if else");
    assert!(e.to_string().contains("expected expression"));
  }
}
