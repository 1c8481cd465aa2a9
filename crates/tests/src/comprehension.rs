//! Array and object comprehensions.

use crate::check::{eval_err, manifest, manifest_exact};

#[test]
fn array_simple() {
  manifest("[x * x for x in [1, 2, 3]]", "[1, 4, 9]");
}

#[test]
fn array_with_if() {
  manifest("[x for x in [1, 2, 3, 4] if x % 2 == 0]", "[2, 4]");
}

#[test]
fn array_nested_fors() {
  manifest(
    "[[x, y] for x in [1, 2] for y in [3, 4]]",
    "[[1, 3], [1, 4], [2, 3], [2, 4]]",
  );
}

#[test]
fn later_fors_see_earlier_vars() {
  manifest("[y for x in [[1, 2], [3]] for y in x]", "[1, 2, 3]");
}

#[test]
fn if_between_fors() {
  manifest(
    "[[x, y] for x in [1, 2, 3] if x != 2 for y in [0]]",
    "[[1, 0], [3, 0]]",
  );
}

#[test]
fn over_std_range() {
  manifest("[n for n in std.range(1, 4)]", "[1, 2, 3, 4]");
}

#[test]
fn object_simple() {
  manifest(
    r#"{ [k]: std.length(k) for k in ["a", "bb"] }"#,
    r#"{ "a": 1, "bb": 2 }"#,
  );
}

#[test]
fn object_field_order_follows_the_array() {
  manifest_exact(
    r#"{ [k]: 0 for k in ["b", "a", "c"] }"#,
    r#"{"b":0,"a":0,"c":0}"#,
  );
}

#[test]
fn object_with_if_and_nested_for() {
  manifest(
    r#"{ [x + y]: x for x in ["a", "b"] for y in ["1", "2"] if x + y != "b2" }"#,
    r#"{ "a1": "a", "a2": "a", "b1": "b" }"#,
  );
}

#[test]
fn object_null_key_skips() {
  manifest(
    r#"{ [if k == "skip" then null else k]: k for k in ["a", "skip", "b"] }"#,
    r#"{ "a": "a", "b": "b" }"#,
  );
}

#[test]
fn object_duplicate_key_errors() {
  eval_err(r#"{ [k]: k for k in ["a", "a"] }"#, "duplicate field: `a`");
}

#[test]
fn object_locals_see_the_loop_variable() {
  manifest(
    r#"{ local twice = k + k, [k]: twice for k in ["a", "b"] }"#,
    r#"{ "a": "aa", "b": "bb" }"#,
  );
}

#[test]
fn object_values_are_lazy() {
  manifest(r#"{ [k]: error "boom" for k in ["a"] } == { a:: 1 }"#, "false");
}

#[test]
fn comprehension_over_non_array_errors() {
  eval_err(r#"[x for x in 3]"#, "expected an array");
}
