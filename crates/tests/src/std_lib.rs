//! The native `std` functions.

use crate::check::{eval_err, manifest, manifest_exact, manifest_with};

#[test]
fn type_of() {
  manifest(
    r#"[std.type(null), std.type(true), std.type(1), std.type("s"), std.type([]), std.type({}), std.type(std.length)]"#,
    r#"["null", "boolean", "number", "string", "array", "object", "function"]"#,
  );
}

#[test]
fn type_predicates() {
  manifest(
    r#"[std.isString(""), std.isNumber(0), std.isBoolean(true), std.isArray([]), std.isObject({}), std.isFunction(function() 0)]"#,
    "[true, true, true, true, true, true]",
  );
}

#[test]
fn length() {
  manifest(
    r#"[std.length("héllo"), std.length([1, 2]), std.length({ a: 1, b:: 2 }), std.length(function(x, y=1) x)]"#,
    "[5, 2, 1, 1]",
  );
  eval_err("std.length(3)", "`std.length`");
}

#[test]
fn make_array() {
  manifest("std.makeArray(4, function(i) i * 2)", "[0, 2, 4, 6]");
  manifest("std.makeArray(0, function(i) i)", "[]");
}

#[test]
fn map_filter_flat_map() {
  manifest("std.map(function(x) x + 1, [1, 2])", "[2, 3]");
  manifest("std.filter(function(x) x > 1, [1, 2, 3])", "[2, 3]");
  manifest("std.flatMap(function(x) [x, x], [1, 2])", "[1, 1, 2, 2]");
  manifest(r#"std.flatMap(function(c) c + c, "ab")"#, r#""aabb""#);
}

#[test]
fn folds() {
  manifest(r#"std.foldl(function(acc, x) acc + x, ["b", "c"], "a")"#, r#""abc""#);
  manifest(r#"std.foldr(function(x, acc) acc + x, ["b", "c"], "a")"#, r#""acb""#);
  manifest("std.foldl(function(acc, x) acc + x, [], 0)", "0");
}

#[test]
fn range() {
  manifest("std.range(2, 5)", "[2, 3, 4, 5]");
  manifest("std.range(2, 1)", "[]");
}

#[test]
fn join() {
  manifest(r#"std.join(", ", ["a", "b"])"#, r#""a, b""#);
  manifest(r#"std.join(", ", ["a", null, "b"])"#, r#""a, b""#);
  manifest("std.join([0], [[1], [2, 3]])", "[1, 0, 2, 3]");
}

#[test]
fn slice() {
  manifest("std.slice([1, 2, 3, 4, 5], 1, 4, null)", "[2, 3, 4]");
  manifest("std.slice([1, 2, 3, 4, 5], null, null, 2)", "[1, 3, 5]");
  manifest(r#"std.slice("jsonnet", 0, 4, null)"#, r#""json""#);
  manifest("[1, 2, 3, 4][1:3]", "[2, 3]");
  manifest(r#""abcdef"[1::2]"#, r#""bdf""#);
}

#[test]
fn to_string() {
  manifest_exact(r#"std.toString({ a: [1, true, null] })"#, r#""{\"a\":[1,true,null]}""#);
  manifest_exact(r#"std.toString("x")"#, r#""x""#);
}

#[test]
fn codepoint_char() {
  manifest(r#"std.codepoint("A")"#, "65");
  manifest("std.char(97)", r#""a""#);
}

#[test]
fn substr() {
  manifest(r#"std.substr("jsonnet", 1, 3)"#, r#""son""#);
  manifest(r#"std.substr("héllo", 1, 2)"#, r#""él""#);
}

#[test]
fn starts_ends_with() {
  manifest(r#"[std.startsWith("jsonnet", "json"), std.endsWith("jsonnet", "net")]"#, "[true, true]");
}

#[test]
fn str_replace_and_case() {
  manifest(r#"std.strReplace("a-b-c", "-", "_")"#, r#""a_b_c""#);
  manifest(r#"[std.asciiUpper("aB"), std.asciiLower("aB")]"#, r#"["AB", "ab"]"#);
}

#[test]
fn strip_chars() {
  manifest(r#"std.stripChars(" hello ", " ")"#, r#""hello""#);
  manifest(r#"std.lstripChars("xxhixx", "x")"#, r#""hixx""#);
  manifest(r#"std.rstripChars("xxhixx", "x")"#, r#""xxhi""#);
}

#[test]
fn parse_int() {
  manifest(r#"std.parseInt("-42")"#, "-42");
  eval_err(r#"std.parseInt("4x")"#, "cannot parse `4x` as an integer");
}

#[test]
fn split() {
  manifest(r#"std.split("a,b,c", ",")"#, r#"["a", "b", "c"]"#);
  manifest(r#"std.splitLimit("a,b,c", ",", 1)"#, r#"["a", "b,c"]"#);
}

#[test]
fn object_has() {
  manifest(
    r#"[std.objectHas({ a: 1, b:: 2 }, "a"), std.objectHas({ a: 1, b:: 2 }, "b"), std.objectHas({ a: 1 }, "c")]"#,
    "[true, false, false]",
  );
  manifest(r#"std.objectHasAll({ b:: 2 }, "b")"#, "true");
  manifest(
    r#"[std.objectHasEx({ b:: 2 }, "b", true), std.objectHasEx({ b:: 2 }, "b", false)]"#,
    "[true, false]",
  );
}

#[test]
fn object_fields() {
  manifest_exact(r#"std.objectFields({ b: 1, a: 2, h:: 3 })"#, r#"["b","a"]"#);
  manifest_exact(r#"std.objectFieldsAll({ b: 1, h:: 3 })"#, r#"["b","h"]"#);
  manifest_exact(r#"std.objectFieldsEx({ b: 1, h:: 3 }, true)"#, r#"["b","h"]"#);
}

#[test]
fn equals_cmp() {
  manifest(r#"std.equals({ a: 1 }, { a: 1, b:: 9 })"#, "true");
  manifest(r#"[std.cmp(1, 2), std.cmp("b", "b"), std.cmp([2], [1, 9])]"#, "[-1, 0, 1]");
}

#[test]
fn numeric_helpers() {
  manifest(
    "[std.abs(-3), std.sign(-3), std.max(1, 2), std.min(1, 2), std.clamp(9, 0, 5)]",
    "[3, -1, 2, 1, 5]",
  );
  manifest("[std.floor(1.9), std.ceil(1.1), std.round(1.5)]", "[1, 2, 2]");
  manifest("[std.sqrt(9), std.pow(2, 10), std.exp(0), std.log(1)]", "[3, 1024, 1, 0]");
  manifest("std.mod(7, 3)", "1");
  eval_err("std.sqrt(-1)", "not a finite number");
}

#[test]
fn sort_uniq() {
  manifest("std.sort([3, 1, 2])", "[1, 2, 3]");
  manifest(r#"std.sort(["b", "a"])"#, r#"["a", "b"]"#);
  manifest(
    r#"std.sort([{ n: 2 }, { n: 1 }], function(x) x.n)"#,
    r#"[{ "n": 1 }, { "n": 2 }]"#,
  );
  manifest("std.uniq([1, 1, 2, 2, 2, 3, 1])", "[1, 2, 3, 1]");
  eval_err("std.sort([true])", "`std.sort`");
}

#[test]
fn count_member_repeat() {
  manifest("std.count([1, 2, 1, 1], 1)", "3");
  manifest("[std.member([1, 2], 2), std.member([1, 2], 3)]", "[true, false]");
  manifest(r#"std.repeat("ab", 3)"#, r#""ababab""#);
  manifest("std.repeat([1], 2)", "[1, 1]");
}

#[test]
fn manifest_json_ex() {
  manifest_exact(
    r#"std.manifestJsonEx({ a: [1] }, "  ")"#,
    r#""{\n  \"a\": [\n    1\n  ]\n}""#,
  );
}

#[test]
fn ext_vars() {
  let options = jot::Options {
    ext_vars: vec![("who".to_owned(), "world".to_owned())],
    ext_codes: vec![("nums".to_owned(), "[1, 2] + [3]".to_owned())],
    ..jot::Options::default()
  };
  manifest_with(
    &options,
    r#"{ greeting: "hello " + std.extVar("who"), nums: std.extVar("nums") }"#,
    r#"{ "greeting": "hello world", "nums": [1, 2, 3] }"#,
  );
  eval_err(r#"std.extVar("missing")"#, "undefined external variable");
}

#[test]
fn this_file_and_pi() {
  manifest(r#"std.thisFile"#, r#""<test>""#);
  manifest("std.pi > 3.14 && std.pi < 3.15", "true");
}

#[test]
fn std_functions_pass_as_values() {
  manifest("std.map(std.abs, [-1, 2, -3])", "[1, 2, 3]");
}

#[test]
fn std_named_args() {
  manifest("std.map(func=function(x) x + 1, arr=[1])", "[2]");
}

#[test]
fn manifesting_a_function_fails() {
  eval_err("{ f: function(x) x }", "cannot manifest a function");
}
