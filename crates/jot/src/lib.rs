//! Embedding Jsonnet: source text in, JSON text out.
//!
//! The pipeline is lex → parse → desugar → execute → manifest. This crate
//! wires the stages together, resolves imports, injects external variables
//! and top-level arguments, and flattens every stage's errors into one
//! [`Diagnostic`].

#![deny(clippy::pedantic, missing_debug_implementations, rust_2018_idioms)]

mod diagnostic;
mod loader;
mod resolve;

pub use diagnostic::{Diagnostic, Kind};
pub use resolve::{Contents, FsResolver, ImportResolver, MemResolver};

use jot_ast::{Id, Prim};
use jot_eval::error::Loc;
use jot_eval::{File, Interp, Json, Thunk, Val};
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Where a piece of source text came from, for positions and imports.
#[derive(Debug, Clone)]
pub struct Origin {
  /// The display name, e.g. `config.jsonnet` or `<cmdline>`.
  pub path: String,
  /// The directory this source's relative imports resolve against.
  pub dir: PathBuf,
}

impl Origin {
  /// An origin for a file on disk.
  #[must_use]
  pub fn file(path: &Path) -> Self {
    let dir = path.parent().map_or_else(|| PathBuf::from("."), Path::to_path_buf);
    Self { path: path.display().to_string(), dir }
  }

  /// An origin for source that came from no file, like a command-line
  /// expression. Relative imports resolve against the working directory.
  #[must_use]
  pub fn synthetic(name: &str) -> Self {
    Self { path: name.to_owned(), dir: PathBuf::from(".") }
  }

  pub(crate) fn for_import(canonical: &Path) -> Self {
    Self::file(canonical)
  }
}

/// Evaluation options.
#[derive(Debug)]
pub struct Options {
  /// `std.extVar` strings.
  pub ext_vars: Vec<(String, String)>,
  /// `std.extVar` Jsonnet sources, evaluated lazily.
  pub ext_codes: Vec<(String, String)>,
  /// Top-level argument strings, applied when the program is a function.
  pub tla_vars: Vec<(String, String)>,
  /// Top-level argument Jsonnet sources.
  pub tla_codes: Vec<(String, String)>,
  /// The recursion budget for the evaluator.
  pub max_stack: usize,
  /// If true the program must produce a string, emitted without JSON
  /// quoting.
  pub string_output: bool,
  /// Directories the default filesystem resolver searches after the
  /// importer's own directory.
  pub search_paths: Vec<PathBuf>,
}

impl Default for Options {
  fn default() -> Self {
    Self {
      ext_vars: Vec::new(),
      ext_codes: Vec::new(),
      tla_vars: Vec::new(),
      tla_codes: Vec::new(),
      max_stack: 500,
      string_output: false,
      search_paths: Vec::new(),
    }
  }
}

/// Runs the front end: source text to an executable [`File`].
///
/// # Errors
///
/// If the source does not lex, parse, or pass the static checks.
pub fn compile(source: &str, origin: &Origin) -> Result<Rc<File>, Diagnostic> {
  let lex = jot_lex::get(source);
  log::debug!("{}: lexed {} tokens", origin.path, lex.tokens.len());
  if let Some(e) = lex.errors.first() {
    return Err(Diagnostic::lex(origin, e));
  }
  let root = jot_parse::get(&lex.tokens).map_err(|e| Diagnostic::parse(origin, &e))?;
  let desugar = jot_desugar::get(&root);
  if let Some(e) = desugar.errors.first() {
    return Err(Diagnostic::static_(origin, e));
  }
  Ok(Rc::new(File {
    path: Rc::from(origin.path.as_str()),
    dir: origin.dir.clone(),
    arena: desugar.arena,
    top: desugar.top,
  }))
}

/// Evaluates the source to its JSON text (or, under `string_output`, the
/// raw top-level string). Imports come from the filesystem.
///
/// # Errors
///
/// If any stage fails.
pub fn evaluate(source: &str, origin: &Origin, options: &Options) -> Result<String, Diagnostic> {
  let mut resolver = FsResolver::new(options.search_paths.clone());
  evaluate_with_resolver(source, origin, options, &mut resolver)
}

/// Like [`evaluate`], with a caller-supplied import resolver.
///
/// # Errors
///
/// If any stage fails.
pub fn evaluate_with_resolver(
  source: &str,
  origin: &Origin,
  options: &Options,
  resolver: &mut dyn ImportResolver,
) -> Result<String, Diagnostic> {
  let mut loader = loader::FrontLoader::new(resolver);
  let mut interp = Interp::new(&mut loader, options.max_stack);
  let val = run(&mut interp, source, origin, options)?;
  if options.string_output {
    match val {
      Val::Prim(Prim::String(s)) => Ok(s.to_string()),
      other => Err(Diagnostic::other(format!(
        "string output requires the top-level value to be a string, got {}",
        other.type_name()
      ))),
    }
  } else {
    let json = interp.manifest(&val).map_err(|e| Diagnostic::runtime(&e))?;
    Ok(json.to_string())
  }
}

/// Evaluates to a host value tree instead of JSON text. Field order is not
/// preserved; use [`evaluate`] when it matters.
///
/// # Errors
///
/// If any stage fails.
pub fn evaluate_to_value(
  source: &str,
  origin: &Origin,
  options: &Options,
) -> Result<serde_json::Value, Diagnostic> {
  let mut resolver = FsResolver::new(options.search_paths.clone());
  let mut loader = loader::FrontLoader::new(&mut resolver);
  let mut interp = Interp::new(&mut loader, options.max_stack);
  let val = run(&mut interp, source, origin, options)?;
  let json = interp.manifest(&val).map_err(|e| Diagnostic::runtime(&e))?;
  Ok(json.to_serde())
}

/// Reads and evaluates a file.
///
/// # Errors
///
/// If the file cannot be read, or any stage fails.
pub fn evaluate_file(path: &Path, options: &Options) -> Result<String, Diagnostic> {
  let source = std::fs::read_to_string(path)
    .map_err(|e| Diagnostic::other(format!("cannot read {}: {e}", path.display())))?;
  evaluate(&source, &Origin::file(path), options)
}

/// Compile, inject ext vars, execute, apply top-level arguments.
fn run(
  interp: &mut Interp<'_>,
  source: &str,
  origin: &Origin,
  options: &Options,
) -> Result<Val, Diagnostic> {
  let file = compile(source, origin)?;
  for (name, value) in &options.ext_vars {
    let val = Val::Prim(Prim::String(Rc::from(value.as_str())));
    interp.set_ext_var(Rc::from(name.as_str()), Thunk::forced(val));
  }
  for (name, code) in &options.ext_codes {
    let ext = compile(code, &Origin::synthetic(&format!("<extvar:{name}>")))?;
    let env = interp.root_env(&ext);
    let top = ext.top;
    interp.set_ext_var(Rc::from(name.as_str()), Thunk::new(ext, env, top));
  }
  let val = interp.exec_file(&file).map_err(|e| Diagnostic::runtime(&e))?;
  apply_tla(interp, val, &file, options)
}

/// When top-level arguments are given, the program must be a function; it
/// is called with them by name.
fn apply_tla(
  interp: &mut Interp<'_>,
  val: Val,
  file: &Rc<File>,
  options: &Options,
) -> Result<Val, Diagnostic> {
  if options.tla_vars.is_empty() && options.tla_codes.is_empty() {
    return Ok(val);
  }
  let func = match val {
    Val::Fn(f) => f,
    other => {
      return Err(Diagnostic::other(format!(
        "top-level arguments provided, but the program is {}, not a function",
        other.type_name()
      )))
    }
  };
  let mut named = Vec::<(Id, Thunk)>::new();
  for (name, value) in &options.tla_vars {
    let val = Val::Prim(Prim::String(Rc::from(value.as_str())));
    named.push((Id::new(name), Thunk::forced(val)));
  }
  for (name, code) in &options.tla_codes {
    let tla = compile(code, &Origin::synthetic(&format!("<tla:{name}>")))?;
    let env = interp.root_env(&tla);
    let top = tla.top;
    named.push((Id::new(name), Thunk::new(tla, env, top)));
  }
  let at = Loc { path: file.path.clone(), pos: jot_ast::Pos::start() };
  interp.call(at, &func, Vec::new(), named, false).map_err(|e| Diagnostic::runtime(&e))
}

/// Re-exported for embedders that work with manifested values directly.
#[must_use]
pub fn json_from_serde(v: &serde_json::Value) -> Json {
  Json::from_serde(v)
}
