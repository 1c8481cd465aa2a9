//! Imports, through an in-memory resolver.

use crate::check::{eval_err, eval_err_many, manifest_many};

#[test]
fn import_code() {
  manifest_many(
    &[("lib.jsonnet", "{ inc(x): x + 1 }")],
    "(import 'lib.jsonnet').inc(41)",
    "42",
  );
}

#[test]
fn import_chain() {
  manifest_many(
    &[
      ("a.jsonnet", "1 + 2"),
      ("b.jsonnet", "(import 'a.jsonnet') + 4"),
    ],
    "import 'b.jsonnet'",
    "7",
  );
}

#[test]
fn import_str() {
  manifest_many(
    &[("motd.txt", "hello")],
    "importstr 'motd.txt'",
    r#""hello""#,
  );
}

#[test]
fn import_bin() {
  manifest_many(&[("raw.bin", "AB")], "importbin 'raw.bin'", "[65, 66]");
}

#[test]
fn imports_are_cached_per_path() {
  // both sides resolve to the same file, so the values are equal
  manifest_many(
    &[("x.jsonnet", "{ n: 1 }")],
    "(import 'x.jsonnet') == (import 'x.jsonnet')",
    "true",
  );
}

#[test]
fn import_not_found() {
  eval_err("import 'nope.jsonnet'", "import of `nope.jsonnet` failed");
}

#[test]
fn import_cycle_reports_the_chain() {
  eval_err_many(
    &[
      ("a.jsonnet", "import 'b.jsonnet'"),
      ("b.jsonnet", "import 'a.jsonnet'"),
    ],
    "import 'a.jsonnet'",
    "import cycle: a.jsonnet -> b.jsonnet -> a.jsonnet",
  );
}

#[test]
fn self_import_cycle() {
  eval_err_many(
    &[("loop.jsonnet", "import 'loop.jsonnet'")],
    "import 'loop.jsonnet'",
    "import cycle: loop.jsonnet -> loop.jsonnet",
  );
}

#[test]
fn imported_file_errors_point_at_the_import() {
  eval_err_many(
    &[("bad.jsonnet", "1 +")],
    "import 'bad.jsonnet'",
    "failed",
  );
}

#[test]
fn imported_std_works() {
  manifest_many(
    &[("lib.jsonnet", "std.map(function(x) x * 2, [1, 2])")],
    "import 'lib.jsonnet'",
    "[2, 4]",
  );
}
