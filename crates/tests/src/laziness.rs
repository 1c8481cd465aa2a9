//! Laziness, memoization, and the recursion guards.

use crate::check::{eval_err, manifest, manifest_with};

#[test]
fn unused_field_errors_are_not_reached() {
  manifest(r#"{ a: 1, b: error "x" }.a"#, "1");
}

#[test]
fn unused_local_errors_are_not_reached() {
  manifest(r#"local bad = error "x"; 2"#, "2");
}

#[test]
fn unused_array_elements_are_not_reached() {
  manifest(r#"[1, error "x", 3][0]"#, "1");
}

#[test]
fn unused_argument_errors_are_not_reached() {
  manifest(r#"local f(x) = 7; f(error "x")"#, "7");
}

#[test]
fn shared_bindings_are_computed_once() {
  // without memoization this is ~2^24 evaluations and effectively hangs;
  // with it, each level's thunk is forced once
  manifest(
    "local pow2(n) = if n == 0 then 1 else (local h = pow2(n - 1); h + h); pow2(24)",
    "16777216",
  );
}

#[test]
fn std_make_array_is_lazy() {
  manifest(
    r#"std.makeArray(3, function(i) if i == 2 then error "x" else i)[1]"#,
    "1",
  );
}

#[test]
fn self_referential_binding_is_detected() {
  eval_err("local x = x; x", "infinite recursion");
}

#[test]
fn self_referential_field_is_detected() {
  eval_err("{ a: self.a }.a", "infinite recursion");
}

#[test]
fn runaway_recursion_hits_the_stack_budget() {
  eval_err("local f(n) = f(n + 1); f(0)", "max stack frames exceeded");
}

#[test]
fn stack_budget_is_configurable() {
  let options = jot::Options { max_stack: 10_000, ..jot::Options::default() };
  manifest_with(
    &options,
    "local sum(n) = if n == 0 then 0 else n + sum(n - 1); sum(200)",
    "20100",
  );
}

#[test]
fn failed_thunks_stay_failed() {
  // the same failing thunk forced twice reports the same error
  eval_err(r#"local x = error "once"; [x, x]"#, "once");
}
