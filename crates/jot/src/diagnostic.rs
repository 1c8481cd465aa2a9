//! The one error type embedders see.

use crate::Origin;
use std::fmt;

/// A diagnostic: which stage failed, a message, and for runtime errors the
/// stack of positions, most recent call first.
#[derive(Debug)]
pub struct Diagnostic {
  pub kind: Kind,
  pub message: String,
  pub trace: Vec<String>,
}

/// Which stage produced the diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
  Lex,
  Parse,
  Static,
  Runtime,
}

impl Kind {
  fn as_str(self) -> &'static str {
    match self {
      Kind::Lex => "LEX ERROR",
      Kind::Parse => "PARSE ERROR",
      Kind::Static => "STATIC ERROR",
      Kind::Runtime => "RUNTIME ERROR",
    }
  }
}

impl Diagnostic {
  pub(crate) fn lex(origin: &Origin, e: &jot_lex::Error) -> Self {
    Self {
      kind: Kind::Lex,
      message: format!("{}:{}: {e}", origin.path, e.pos),
      trace: Vec::new(),
    }
  }

  pub(crate) fn parse(origin: &Origin, e: &jot_parse::Error) -> Self {
    Self {
      kind: Kind::Parse,
      message: format!("{}:{}: {e}", origin.path, e.pos),
      trace: Vec::new(),
    }
  }

  pub(crate) fn static_(origin: &Origin, e: &jot_desugar::Error) -> Self {
    Self {
      kind: Kind::Static,
      message: format!("{}:{}: {e}", origin.path, e.pos),
      trace: Vec::new(),
    }
  }

  pub(crate) fn runtime(e: &jot_eval::error::Error) -> Self {
    let mut trace = vec![e.at.to_string()];
    trace.extend(e.trace.iter().rev().map(ToString::to_string));
    Self { kind: Kind::Runtime, message: e.to_string(), trace }
  }

  pub(crate) fn other(message: String) -> Self {
    Self { kind: Kind::Runtime, message, trace: Vec::new() }
  }
}

impl fmt::Display for Diagnostic {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}: {}", self.kind.as_str(), self.message)?;
    for loc in &self.trace {
      write!(f, "\n  at {loc}")?;
    }
    Ok(())
  }
}

impl std::error::Error for Diagnostic {}
