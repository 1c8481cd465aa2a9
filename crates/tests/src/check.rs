//! Helpers to evaluate snippets and check the result.

use jot::{MemResolver, Options, Origin};

fn eval(src: &str, options: &Options) -> Result<String, String> {
  jot::evaluate(src, &Origin::synthetic("<test>"), options).map_err(|d| d.to_string())
}

/// Evaluates and compares against the wanted JSON, ignoring whitespace and
/// object field order.
#[track_caller]
pub(crate) fn manifest(src: &str, want: &str) {
  let got = eval(src, &Options::default()).unwrap_or_else(|e| panic!("evaluation failed: {e}"));
  let got_v: serde_json::Value =
    serde_json::from_str(&got).unwrap_or_else(|e| panic!("output is not JSON: {e}: {got}"));
  let want_v: serde_json::Value =
    serde_json::from_str(want).unwrap_or_else(|e| panic!("wanted value is not JSON: {e}"));
  assert_eq!(want_v, got_v, "wanted {want_v}, got {got}");
}

/// Evaluates and compares the output text byte for byte, for tests where
/// field order or number rendering matters.
#[track_caller]
pub(crate) fn manifest_exact(src: &str, want: &str) {
  let got = eval(src, &Options::default()).unwrap_or_else(|e| panic!("evaluation failed: {e}"));
  assert_eq!(want, got);
}

/// Evaluates under `string_output`.
#[track_caller]
pub(crate) fn manifest_string(src: &str, want: &str) {
  let options = Options { string_output: true, ..Options::default() };
  let got = eval(src, &options).unwrap_or_else(|e| panic!("evaluation failed: {e}"));
  assert_eq!(want, got);
}

/// Evaluates with the given options.
#[track_caller]
pub(crate) fn manifest_with(options: &Options, src: &str, want: &str) {
  let got = eval(src, options).unwrap_or_else(|e| panic!("evaluation failed: {e}"));
  let got_v: serde_json::Value =
    serde_json::from_str(&got).unwrap_or_else(|e| panic!("output is not JSON: {e}: {got}"));
  let want_v: serde_json::Value =
    serde_json::from_str(want).unwrap_or_else(|e| panic!("wanted value is not JSON: {e}"));
  assert_eq!(want_v, got_v, "wanted {want_v}, got {got}");
}

/// Evaluates with in-memory importable files.
#[track_caller]
pub(crate) fn manifest_many(files: &[(&str, &str)], src: &str, want: &str) {
  let mut resolver = MemResolver::new(files.iter().copied());
  let got = jot::evaluate_with_resolver(
    src,
    &Origin::synthetic("<test>"),
    &Options::default(),
    &mut resolver,
  )
  .unwrap_or_else(|e| panic!("evaluation failed: {e}"));
  let got_v: serde_json::Value =
    serde_json::from_str(&got).unwrap_or_else(|e| panic!("output is not JSON: {e}: {got}"));
  let want_v: serde_json::Value =
    serde_json::from_str(want).unwrap_or_else(|e| panic!("wanted value is not JSON: {e}"));
  assert_eq!(want_v, got_v, "wanted {want_v}, got {got}");
}

/// Expects failure, with the diagnostic containing the given text.
#[track_caller]
pub(crate) fn eval_err(src: &str, want: &str) {
  eval_err_many(&[], src, want);
}

/// Like [`eval_err`], with in-memory importable files.
#[track_caller]
pub(crate) fn eval_err_many(files: &[(&str, &str)], src: &str, want: &str) {
  let mut resolver = MemResolver::new(files.iter().copied());
  let got = jot::evaluate_with_resolver(
    src,
    &Origin::synthetic("<test>"),
    &Options::default(),
    &mut resolver,
  );
  match got {
    Ok(got) => panic!("evaluation should fail, got: {got}"),
    Err(d) => {
      let msg = d.to_string();
      assert!(msg.contains(want), "wanted a diagnostic containing {want:?}, got: {msg}");
    }
  }
}
