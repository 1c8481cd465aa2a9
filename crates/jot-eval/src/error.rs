//! Runtime errors.

use jot_ast::{Id, NotFinite, Pos};
use std::fmt;
use std::rc::Rc;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// A place in a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Loc {
  pub path: Rc<str>,
  pub pos: Pos,
}

impl fmt::Display for Loc {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}:{}", self.path, self.pos)
  }
}

/// A runtime error: what went wrong, where, and the call trace leading
/// there (most recent call last).
#[derive(Debug, Clone)]
pub struct Error {
  pub kind: Kind,
  pub at: Loc,
  pub trace: Vec<Loc>,
}

impl fmt::Display for Error {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    self.kind.fmt(f)
  }
}

#[derive(Debug, Clone)]
pub enum Kind {
  /// `error e` was evaluated.
  User(Rc<str>),
  UnboundId(Id),
  SelfOutsideObject,
  SuperOutsideObject,
  NoSuchField(Rc<str>),
  DuplicateField(Rc<str>),
  FieldNameNotString(&'static str),
  IncompatibleTypes { op: &'static str, lhs: &'static str, rhs: &'static str },
  UnaryIncompatible { op: &'static str, got: &'static str },
  Unexpected { want: &'static str, got: &'static str },
  NotFinite(NotFinite),
  DivideByZero,
  NotAnInteger,
  NegativeShift,
  IdxNotInteger,
  ArrayIdxOutOfRange { idx: usize, len: usize },
  StringIdxOutOfRange { idx: usize, len: usize },
  CmpFn,
  CmpIncompatible { lhs: &'static str, rhs: &'static str },
  CallNonFn(&'static str),
  TooManyArgs { params: usize, got: usize },
  DuplicateArg(Id),
  NoSuchParam(Id),
  ParamNotBound(Id),
  StdArg { func: &'static str, want: &'static str, got: &'static str },
  StdArity { func: &'static str, want: usize, got: usize },
  ManifestFn,
  StackOverflow { limit: usize },
  InfiniteRecursion,
  Import { path: Rc<str>, msg: String },
  ImportCycle { chain: Vec<Rc<str>> },
  Format(String),
  ParseInt(Rc<str>),
  NoExtVar(Rc<str>),
}

impl fmt::Display for Kind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Kind::User(msg) => write!(f, "explicit `error`: {msg}"),
      Kind::UnboundId(id) => write!(f, "unbound identifier: `{id}`"),
      Kind::SelfOutsideObject => f.write_str("`self` outside of an object"),
      Kind::SuperOutsideObject => f.write_str("`super` outside of an object"),
      Kind::NoSuchField(name) => write!(f, "no such field: `{name}`"),
      Kind::DuplicateField(name) => write!(f, "duplicate field: `{name}`"),
      Kind::FieldNameNotString(got) => {
        write!(f, "field name must be a string, got {got}")
      }
      Kind::IncompatibleTypes { op, lhs, rhs } => {
        write!(f, "invalid operand types for `{op}`: {lhs} and {rhs}")
      }
      Kind::UnaryIncompatible { op, got } => {
        write!(f, "invalid operand type for unary `{op}`: {got}")
      }
      Kind::Unexpected { want, got } => write!(f, "expected {want}, got {got}"),
      Kind::NotFinite(inf) => write!(f, "not a finite number: {inf}"),
      Kind::DivideByZero => f.write_str("division by zero"),
      Kind::NotAnInteger => f.write_str("number is not an integer"),
      Kind::NegativeShift => f.write_str("shift by a negative number"),
      Kind::IdxNotInteger => f.write_str("index must be a non-negative integer"),
      Kind::ArrayIdxOutOfRange { idx, len } => {
        write!(f, "array index {idx} out of range, array has {len} elements")
      }
      Kind::StringIdxOutOfRange { idx, len } => {
        write!(f, "string index {idx} out of range, string has {len} code points")
      }
      Kind::CmpFn => f.write_str("cannot compare functions"),
      Kind::CmpIncompatible { lhs, rhs } => {
        write!(f, "cannot compare {lhs} and {rhs}")
      }
      Kind::CallNonFn(got) => write!(f, "cannot call {got}"),
      Kind::TooManyArgs { params, got } => {
        write!(f, "too many arguments: the function has {params} parameters, got {got}")
      }
      Kind::DuplicateArg(id) => {
        write!(f, "the argument `{id}` was bound both positionally and by name")
      }
      Kind::NoSuchParam(id) => write!(f, "the function has no parameter `{id}`"),
      Kind::ParamNotBound(id) => {
        write!(f, "parameter `{id}` was not defined at the function call site")
      }
      Kind::StdArg { func, want, got } => {
        write!(f, "`std.{func}`: expected {want}, got {got}")
      }
      Kind::StdArity { func, want, got } => {
        write!(f, "`std.{func}`: expected {want} arguments, got {got}")
      }
      Kind::ManifestFn => f.write_str("cannot manifest a function"),
      Kind::StackOverflow { limit } => write!(f, "max stack frames exceeded: {limit}"),
      Kind::InfiniteRecursion => f.write_str("infinite recursion detected"),
      Kind::Import { path, msg } => write!(f, "import of `{path}` failed: {msg}"),
      Kind::ImportCycle { chain } => {
        f.write_str("import cycle: ")?;
        for (i, path) in chain.iter().enumerate() {
          if i != 0 {
            f.write_str(" -> ")?;
          }
          f.write_str(path)?;
        }
        Ok(())
      }
      Kind::Format(msg) => write!(f, "format: {msg}"),
      Kind::ParseInt(s) => write!(f, "cannot parse `{s}` as an integer"),
      Kind::NoExtVar(name) => write!(f, "undefined external variable: `{name}`"),
    }
  }
}
