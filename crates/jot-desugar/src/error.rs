//! Static errors.

use jot_ast::{Id, Pos};
use std::fmt;
use std::rc::Rc;

/// A static error: misuse detectable before evaluation.
#[derive(Debug)]
pub struct Error {
  pub pos: Pos,
  pub(crate) kind: Kind,
}

#[derive(Debug)]
pub(crate) enum Kind {
  SelfOutsideObject,
  SuperOutsideObject,
  DollarOutsideObject,
  DuplicateParam(Id),
  DuplicateBind(Id),
  DuplicateNamedArg(Id),
  PositionalAfterNamed,
  DuplicateField(Rc<str>),
  CompFieldCount,
  CompFieldNotComputed,
  CompAssert,
  CompFieldPlus,
  CompFieldParams,
  CompFieldHidden,
}

impl fmt::Display for Error {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match &self.kind {
      Kind::SelfOutsideObject => f.write_str("`self` outside of an object"),
      Kind::SuperOutsideObject => f.write_str("`super` outside of an object"),
      Kind::DollarOutsideObject => f.write_str("`$` outside of an object"),
      Kind::DuplicateParam(id) => write!(f, "duplicate parameter: `{id}`"),
      Kind::DuplicateBind(id) => write!(f, "duplicate binding: `{id}`"),
      Kind::DuplicateNamedArg(id) => write!(f, "duplicate named argument: `{id}`"),
      Kind::PositionalAfterNamed => {
        f.write_str("positional argument after a named argument")
      }
      Kind::DuplicateField(name) => write!(f, "duplicate field: `{name}`"),
      Kind::CompFieldCount => {
        f.write_str("object comprehension must have exactly one field")
      }
      Kind::CompFieldNotComputed => {
        f.write_str("object comprehension field name must be computed, i.e. `[e]`")
      }
      Kind::CompAssert => f.write_str("object comprehension cannot have an `assert`"),
      Kind::CompFieldPlus => f.write_str("object comprehension field cannot use `+:`"),
      Kind::CompFieldParams => {
        f.write_str("object comprehension field cannot have parameters")
      }
      Kind::CompFieldHidden => {
        f.write_str("object comprehension field must use `:` visibility")
      }
    }
  }
}
