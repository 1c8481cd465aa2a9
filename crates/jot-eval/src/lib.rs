//! The dynamic semantics of Jsonnet.
//!
//! There are two main operations:
//!
//! - Execution: from core expressions to Jsonnet values.
//! - Manifestation: from Jsonnet values to JSON values.
//!
//! These are mutually recursive: Jsonnet values are lazy and can contain
//! unexecuted expressions, and execution may need to manifest a value to
//! turn it into a string.

#![deny(clippy::pedantic, missing_debug_implementations, rust_2018_idioms)]
#![allow(missing_docs)]

pub mod error;

mod cycle;
mod exec;
mod format;
mod manifest;
mod std_lib;
mod val;

pub use exec::Interp;
pub use manifest::{escape_json_string, Json};
pub use std_lib::Native;
pub use val::{Array, Env, Fn, Object, RegularFn, Thunk, Val};

use jot_ast::hir;
use std::path::PathBuf;
use std::rc::Rc;

/// One desugared Jsonnet file, ready to execute.
#[derive(Debug)]
pub struct File {
  /// The display name, used in positions and `std.thisFile`.
  pub path: Rc<str>,
  /// The directory relative imports resolve against.
  pub dir: PathBuf,
  pub arena: hir::ExprArena,
  pub top: hir::Expr,
}

/// Loads the targets of `import`, `importstr`, and `importbin`.
///
/// Implementations resolve the path relative to the importer, cache by
/// canonical path (so the same file is the same [`File`] on repeated
/// import), and run the front end on imported code. Errors are messages;
/// the evaluator wraps them with the import position.
pub trait Loader: std::fmt::Debug {
  /// # Errors
  ///
  /// If the path does not resolve or the file does not compile.
  fn load_code(&mut self, importer: &File, path: &str) -> Result<Rc<File>, String>;

  /// # Errors
  ///
  /// If the path does not resolve or is not text.
  fn load_str(&mut self, importer: &File, path: &str) -> Result<Rc<str>, String>;

  /// # Errors
  ///
  /// If the path does not resolve.
  fn load_bin(&mut self, importer: &File, path: &str) -> Result<Rc<[u8]>, String>;
}

/// A loader for programs that import nothing.
#[derive(Debug, Default)]
pub struct NoImports;

impl Loader for NoImports {
  fn load_code(&mut self, _: &File, _: &str) -> Result<Rc<File>, String> {
    Err("imports are not available here".to_owned())
  }

  fn load_str(&mut self, _: &File, _: &str) -> Result<Rc<str>, String> {
    Err("imports are not available here".to_owned())
  }

  fn load_bin(&mut self, _: &File, _: &str) -> Result<Rc<[u8]>, String> {
    Err("imports are not available here".to_owned())
  }
}
