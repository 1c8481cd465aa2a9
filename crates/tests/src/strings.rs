//! Strings: literals, escapes, text blocks, concatenation, formatting.

use crate::check::{eval_err, manifest, manifest_exact, manifest_string};

#[test]
fn quoting_styles_agree() {
  manifest(r#"'it\'s' == "it's""#, "true");
  manifest(r#"@'C:\temp' == "C:\\temp""#, "true");
  manifest(r#"@'two ''quotes''' == "two 'quotes'""#, "true");
}

#[test]
fn escapes() {
  manifest_exact(r#""a\nb\t\"c\"""#, r#""a\nb\t\"c\"""#);
  manifest(r#""\u0041""#, r#""A""#);
}

#[test]
fn surrogate_pair_escape() {
  manifest(r#"std.codepoint("\uD83D\uDE00")"#, "128512");
}

#[test]
fn text_block() {
  manifest(
    "{ text: |||\n  line one\n    indented\n  line two\n||| }",
    r#"{ "text": "line one\n  indented\nline two\n" }"#,
  );
}

#[test]
fn concat_coerces_non_strings() {
  manifest_exact(r#""n = " + 1"#, r#""n = 1""#);
  manifest_exact(r#"1 + " = n""#, r#""1 = n""#);
  manifest_exact(r#""v: " + [1, 2]"#, r#""v: [1,2]""#);
}

#[test]
fn string_output_mode() {
  manifest_string(r#""plain text, no quotes""#, "plain text, no quotes");
}

#[test]
fn string_output_requires_a_string() {
  let options = jot::Options { string_output: true, ..jot::Options::default() };
  let got = jot::evaluate("3", &jot::Origin::synthetic("<test>"), &options);
  assert!(got.is_err(), "string output of a number should fail");
}

#[test]
fn format_ints() {
  manifest_exact(r#""%d apples" % 3"#, r#""3 apples""#);
  manifest_exact(r#""%04d" % 42"#, r#""0042""#);
  manifest_exact(r#""%x/%X/%o" % [255, 255, 8]"#, r#""ff/FF/10""#);
  manifest_exact(r#""%#x" % 255"#, r#""0xff""#);
  manifest_exact(r#""%+d % d" % [3, 4]"#, r#""+3  4""#);
}

#[test]
fn format_floats() {
  manifest_exact(r#""%f" % 1.5"#, r#""1.500000""#);
  manifest_exact(r#""%.2f" % 3.14159"#, r#""3.14""#);
  manifest_exact(r#""%05.2f" % 3.14159"#, r#""03.14""#);
  manifest_exact(r#""%e" % 1234.0"#, r#""1.234000e+03""#);
  manifest_exact(r#""%g" % 0.00001"#, r#""1e-05""#);
  manifest_exact(r#""%g" % 123.25"#, r#""123.25""#);
}

#[test]
fn format_strings_and_percent() {
  manifest_exact(r#""%s and %s" % ["a", 1]"#, r#""a and 1""#);
  manifest_exact(r#""100%%" % []"#, r#""100%""#);
  manifest_exact(r#""%5s|%-5s|" % ["ab", "cd"]"#, r#""   ab|cd   |""#);
  manifest_exact(r#""%c%c" % [65, "b"]"#, r#""Ab""#);
}

#[test]
fn format_mapping_keys() {
  manifest_exact(r#""%(a)s=%(n)03d" % { a: "x", n: 7 }"#, r#""x=007""#);
}

#[test]
fn format_star_width() {
  manifest_exact(r#""%*d" % [4, 7]"#, r#""   7""#);
}

#[test]
fn format_errors() {
  eval_err(r#""%d" % []"#, "not enough values");
  eval_err(r#""%d" % [1, 2]"#, "too many values");
  eval_err(r#""%q" % 1"#, "unrecognized conversion type");
  eval_err(r#""%d" % "x""#, "expects a number");
}

#[test]
fn format_via_std() {
  manifest_exact(r#"std.format("%s=%d", ["k", 3])"#, r#""k=3""#);
}

#[test]
fn lexicographic_order_is_by_code_point() {
  manifest(r#"["A" < "a", "a" < "b", "ab" < "b"]"#, "[true, true, true]");
}
