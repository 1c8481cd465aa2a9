//! Objects: inheritance, visibility, `self`/`super`/`$`, asserts.

use crate::check::{eval_err, manifest, manifest_exact};

#[test]
fn merge_right_wins() {
  manifest("{ a: 1, b: 2 } + { a: 3, c: 4 }", r#"{ "a": 3, "b": 2, "c": 4 }"#);
}

#[test]
fn implicit_plus() {
  manifest("{ a: 1 } { b: 2 }", r#"{ "a": 1, "b": 2 }"#);
}

#[test]
fn field_order_is_leftmost_first() {
  manifest_exact("{ b: 1, a: 2 } + { c: 3, a: 4 }", r#"{"b":1,"a":4,"c":3}"#);
}

#[test]
fn override_replaces_nested_object() {
  manifest(
    "{ a: { x: 2, y: 3 } } + { a: { x: 5 } }",
    r#"{ "a": { "x": 5 } }"#,
  );
}

#[test]
fn additive_merges_nested_object() {
  manifest(
    "{ a: { x: 2, y: 3 } } + { a+: { x: 5 } }",
    r#"{ "a": { "x": 5, "y": 3 } }"#,
  );
}

#[test]
fn additive_concatenates_strings_and_arrays() {
  manifest(r#"{ a: "x" } + { a+: "y" }"#, r#"{ "a": "xy" }"#);
  manifest("{ a: [1] } + { a+: [2] }", r#"{ "a": [1, 2] }"#);
}

#[test]
fn additive_without_a_prior_layer() {
  manifest("{ a+: 2 }", r#"{ "a": 2 }"#);
}

#[test]
fn hidden_fields_do_not_manifest() {
  manifest_exact("{ a: 1, b:: 2 }", r#"{"a":1}"#);
}

#[test]
fn hidden_fields_are_reachable() {
  manifest("{ a:: 41, b: self.a + 1 }.b", "42");
}

#[test]
fn additive_default_keeps_hidden() {
  manifest_exact("{ a:: 1 } + { a+: 2 }", "{}");
}

#[test]
fn plain_default_shows_the_field() {
  manifest_exact("{ a:: 1 } + { a: 2 }", r#"{"a":2}"#);
}

#[test]
fn force_visible_wins() {
  manifest_exact("{ a:: 1 } + { a+::: 2 }", r#"{"a":3}"#);
}

#[test]
fn hidden_wins_late() {
  manifest_exact("{ a: 1 } + { a:: 2 }", "{}");
}

#[test]
fn super_chains_one_level_per_plus() {
  manifest("{ a: 1 } + { a+: 1 } + { a+: 1 }", r#"{ "a": 3 }"#);
}

#[test]
fn super_sees_the_left_layer_only() {
  manifest(
    "{ a: 1, b: 2 } + { a: 10 } + { c: super.a }",
    r#"{ "a": 10, "b": 2, "c": 10 }"#,
  );
}

#[test]
fn in_super() {
  manifest(
    r#"{ a: 1 } + { has_a: "a" in super, has_b: "b" in super }"#,
    r#"{ "a": 1, "has_a": true, "has_b": false }"#,
  );
}

#[test]
fn in_operator_sees_hidden() {
  manifest(r#"["a" in { a:: 1 }, "b" in { a:: 1 }]"#, "[true, false]");
}

#[test]
fn inheritance_is_associative() {
  let a = "{ x: 1 }";
  let b = "{ y: 2 }";
  let c = "{ z: self.x + self.y }";
  manifest(
    &format!("(({a}) + ({b})) + ({c})"),
    r#"{ "x": 1, "y": 2, "z": 3 }"#,
  );
  manifest(
    &format!("({a}) + (({b}) + ({c}))"),
    r#"{ "x": 1, "y": 2, "z": 3 }"#,
  );
}

#[test]
fn dollar_is_the_outermost_object() {
  manifest(
    "{ a: 1, b: { c: $.a, d: { e: $.a } } }",
    r#"{ "a": 1, "b": { "c": 1, "d": { "e": 1 } } }"#,
  );
}

#[test]
fn object_locals() {
  manifest("{ local n = 3, a: n, b: n + 1 }", r#"{ "a": 3, "b": 4 }"#);
}

#[test]
fn object_locals_see_self() {
  manifest("{ local me = self, a: 1, b: me.a }", r#"{ "a": 1, "b": 1 }"#);
}

#[test]
fn object_locals_are_mutually_recursive() {
  manifest(
    "{ local even(n) = n == 0 || odd(n - 1), local odd(n) = n != 0 && even(n - 1), a: even(10) }",
    r#"{ "a": true }"#,
  );
}

#[test]
fn field_name_from_expression() {
  manifest(r#"{ ["a" + "b"]: 1 }"#, r#"{ "ab": 1 }"#);
}

#[test]
fn null_field_name_skips_the_field() {
  manifest("{ [null]: 1, a: 2 }", r#"{ "a": 2 }"#);
}

#[test]
fn computed_name_uses_enclosing_self() {
  manifest(
    r#"{ foo: "a", inner: { [self.foo]: 1 } + { [self.foo]: 2 } }.inner"#,
    r#"{ "a": 2 }"#,
  );
}

#[test]
fn method_sugar() {
  manifest("{ f(x, y): x + y }.f(1, 2)", "3");
}

#[test]
fn duplicate_computed_field() {
  eval_err(r#"local k = "a"; { [k]: 1, [k]: 2 }"#, "duplicate field: `a`");
}

#[test]
fn asserts_run_on_manifest() {
  eval_err(r#"{ assert false : "broken invariant", a: 1 }"#, "broken invariant");
}

#[test]
fn asserts_run_on_field_access() {
  eval_err(r#"{ assert false : "broken invariant", a: 1 }.a"#, "broken invariant");
}

#[test]
fn asserts_may_read_self() {
  manifest("{ assert self.a > 0, a: 1 }", r#"{ "a": 1 }"#);
}

#[test]
fn asserts_concatenate_across_plus() {
  eval_err(
    r#"({ assert self.n > 0 : "too small" } + { n: 0 }).n"#,
    "too small",
  );
  manifest("{ assert self.n > 0 } + { n: 1 }", r#"{ "n": 1 }"#);
}

#[test]
fn assert_against_combined_self() {
  // the assert is written in the left layer but sees the final self
  manifest("{ assert self.n > 0, n: 0 } + { n: 5 }", r#"{ "n": 5 }"#);
}

#[test]
fn super_outside_field_of_merge() {
  eval_err("{ a: 1 }.a + super.b", "`super` outside of an object");
}

#[test]
fn equality_ignores_hidden_both_ways() {
  manifest("{ a: 1 } == { a: 1, b:: 2 }", "true");
  manifest("{ a: 1, b: 2 } == { a: 1, b:: 2 }", "false");
}

#[test]
fn object_plus_string_coerces() {
  manifest(r#"{ a: 1 } + "!""#, r#""{\"a\":1}!""#);
}
