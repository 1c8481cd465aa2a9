//! The basics, including the end-to-end scenarios everything else builds
//! on.

use crate::check::{eval_err, manifest, manifest_exact};

#[test]
fn plain_object() {
  manifest_exact("{ a: 1, b: 2 }", r#"{"a":1,"b":2}"#);
}

#[test]
fn default_params() {
  manifest("local f(x=10) = x * x; [f(), f(3)]", "[100, 9]");
}

#[test]
fn additive_field() {
  manifest("{ a: 1 } + { a+: 2 }", r#"{ "a": 3 }"#);
}

#[test]
fn self_reference() {
  manifest("{ x: self.y, y: 1 }", r#"{ "x": 1, "y": 1 }"#);
}

#[test]
fn late_bound_self() {
  manifest("local A = { f: 1, g: self.f }; local B = A + { f: 2 }; B.g", "2");
}

#[test]
fn extend_via_super() {
  manifest("local A = { f: 1 }; local B = A + { f+: super.f + 10 }; B.f", "11");
}

#[test]
fn json_round_trip() {
  let j = r#"{ "a": [1, 2.5, null], "b": { "c": "x", "d": [true, false] }, "e": "" }"#;
  manifest(j, j);
}

#[test]
fn if_else() {
  manifest("if 1 < 2 then 3 else 4", "3");
  manifest("if 1 > 2 then 3 else 4", "4");
}

#[test]
fn if_without_else_is_null() {
  manifest("if 1 > 2 then 3", "null");
}

#[test]
fn local_chain() {
  manifest("local x = 3; local y = x + 1; [x, y]", "[3, 4]");
}

#[test]
fn local_function_sugar() {
  manifest("local inc(x) = x + 1; inc(3)", "4");
}

#[test]
fn named_args() {
  manifest("local f(a, b) = a - b; f(b=1, a=10)", "9");
}

#[test]
fn defaults_may_reference_params() {
  manifest("local f(a, b=a+1) = [a, b]; f(1)", "[1, 2]");
}

#[test]
fn bool_ops() {
  manifest("[false || true, true && false, !true]", "[true, false, false]");
}

#[test]
fn short_circuit() {
  manifest(r#"false && (error "nope")"#, "false");
  manifest(r#"true || (error "nope")"#, "true");
}

#[test]
fn arithmetic() {
  manifest("[1 + 2 * 3, 7 % 3, 10 / 4, 5 - 8]", "[7, 1, 2.5, -3]");
}

#[test]
fn bitwise() {
  manifest("[5 & 3, 5 | 3, 5 ^ 3, 1 << 4, 256 >> 4, ~0]", "[1, 7, 6, 16, 16, -1]");
}

#[test]
fn comparisons() {
  manifest(r#"[1 < 2, "a" < "b", [1, 2] < [1, 3], 2 <= 2, 3 > 4, 3 >= 4]"#, "[true, true, true, true, false, false]");
}

#[test]
fn structural_equality() {
  manifest("[1, [2, {a: 3}]] == [1, [2, {a: 3}]]", "true");
  manifest(r#"1 == "1""#, "false");
  manifest("{ a: 1, b:: 2 } == { a: 1 }", "true");
}

#[test]
fn comparing_functions_fails() {
  eval_err("(function(x) x) == (function(x) x)", "cannot compare functions");
}

#[test]
fn explicit_error() {
  eval_err(r#"error "oh no!""#, "explicit `error`: oh no!");
}

#[test]
fn error_manifests_non_strings() {
  eval_err("error { code: 3 }", r#"explicit `error`: {"code":3}"#);
}

#[test]
fn assert_expr() {
  manifest(r#"assert 2 + 2 < 5 : "math makes sense"; 0"#, "0");
  eval_err("assert 1 > 2; 0", "Assertion failed");
  eval_err(r#"assert 1 > 2 : "one is small"; 0"#, "one is small");
}

#[test]
fn division_by_zero() {
  eval_err("1 / 0", "division by zero");
}

#[test]
fn unbound_identifier() {
  eval_err("nope", "unbound identifier: `nope`");
}

#[test]
fn missing_required_param() {
  eval_err(
    "local f(b, x) = if b then x else 1; f(false)",
    "parameter `x` was not defined at the function call site",
  );
}

#[test]
fn too_many_args() {
  eval_err("local f(x) = x; f(1, 2)", "too many arguments");
}

#[test]
fn calling_a_non_function() {
  eval_err("local x = 3; x(1)", "cannot call number");
}

#[test]
fn determinism() {
  let src = "{ b: 2, a: [1, { c: 1.5 }], z:: 9 }";
  let one = jot::evaluate(src, &jot::Origin::synthetic("<test>"), &jot::Options::default())
    .expect("should evaluate");
  let two = jot::evaluate(src, &jot::Origin::synthetic("<test>"), &jot::Options::default())
    .expect("should evaluate");
  assert_eq!(one, two);
}

#[test]
fn number_rendering() {
  manifest_exact("[1, 1.5, -3, 0.25, 1e2]", "[1,1.5,-3,0.25,100]");
}

#[test]
fn tailstrict_forces_args() {
  eval_err(r#"local f(x) = 0; f(error "boom") tailstrict"#, "boom");
  manifest(r#"local f(x) = 0; f(error "boom")"#, "0");
}

#[test]
fn string_index() {
  manifest(r#""abc"[1]"#, r#""b""#);
  eval_err(r#""abc"[5]"#, "out of range");
}

#[test]
fn array_index_errors() {
  eval_err("[1, 2][5]", "out of range");
  eval_err("[1, 2][1.5]", "index must be a non-negative integer");
}

#[test]
fn no_such_field() {
  eval_err("{ a: 1 }.b", "no such field: `b`");
}
