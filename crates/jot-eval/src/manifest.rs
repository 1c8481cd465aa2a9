//! Manifesting Jsonnet values into JSON values.
//!
//! Jsonnet values are lazy, so manifestation is mutually recursive with
//! execution: array elements and visible object fields are forced as they
//! are written out.

use crate::error::{Kind, Result};
use crate::exec::Interp;
use crate::val::Val;
use jot_ast::{Number, Prim};
use std::fmt;
use std::rc::Rc;

/// A JSON value. Object fields keep their insertion order.
#[derive(Debug, Clone, PartialEq)]
pub enum Json {
  Null,
  Bool(bool),
  Num(Number),
  Str(Rc<str>),
  Arr(Vec<Json>),
  Obj(Vec<(Rc<str>, Json)>),
}

impl Json {
  /// Renders with the given indent per level, the way
  /// `std.manifestJsonEx` does.
  #[must_use]
  pub fn display_indented(&self, indent: &str) -> String {
    let mut buf = String::new();
    self.write_indented(&mut buf, indent, 0);
    buf
  }

  fn write_indented(&self, buf: &mut String, indent: &str, level: usize) {
    match self {
      Json::Null | Json::Bool(_) | Json::Num(_) | Json::Str(_) => {
        buf.push_str(&self.to_string());
      }
      Json::Arr(elems) => {
        if elems.is_empty() {
          buf.push_str("[ ]");
          return;
        }
        buf.push('[');
        for (i, elem) in elems.iter().enumerate() {
          if i != 0 {
            buf.push(',');
          }
          buf.push('\n');
          push_indent(buf, indent, level + 1);
          elem.write_indented(buf, indent, level + 1);
        }
        buf.push('\n');
        push_indent(buf, indent, level);
        buf.push(']');
      }
      Json::Obj(fields) => {
        if fields.is_empty() {
          buf.push_str("{ }");
          return;
        }
        buf.push('{');
        for (i, (name, val)) in fields.iter().enumerate() {
          if i != 0 {
            buf.push(',');
          }
          buf.push('\n');
          push_indent(buf, indent, level + 1);
          escape_json_string(name, buf);
          buf.push_str(": ");
          val.write_indented(buf, indent, level + 1);
        }
        buf.push('\n');
        push_indent(buf, indent, level);
        buf.push('}');
      }
    }
  }

  /// Converts to a `serde_json` value. Field order is whatever the serde
  /// map does with it; use [`fmt::Display`] when order matters.
  #[must_use]
  pub fn to_serde(&self) -> serde_json::Value {
    match self {
      Json::Null => serde_json::Value::Null,
      Json::Bool(b) => serde_json::Value::Bool(*b),
      Json::Num(n) => serde_json::Number::from_f64(n.to_f64())
        .map_or(serde_json::Value::Null, serde_json::Value::Number),
      Json::Str(s) => serde_json::Value::String(s.to_string()),
      Json::Arr(elems) => serde_json::Value::Array(elems.iter().map(Json::to_serde).collect()),
      Json::Obj(fields) => {
        let map = fields.iter().map(|(k, v)| (k.to_string(), v.to_serde())).collect();
        serde_json::Value::Object(map)
      }
    }
  }

  /// Converts from a `serde_json` value.
  #[must_use]
  pub fn from_serde(v: &serde_json::Value) -> Self {
    match v {
      serde_json::Value::Null => Json::Null,
      serde_json::Value::Bool(b) => Json::Bool(*b),
      serde_json::Value::Number(n) => {
        Json::Num(Number::finite_or_zero(n.as_f64().unwrap_or(0.0)))
      }
      serde_json::Value::String(s) => Json::Str(Rc::from(s.as_str())),
      serde_json::Value::Array(elems) => {
        Json::Arr(elems.iter().map(Json::from_serde).collect())
      }
      serde_json::Value::Object(map) => {
        Json::Obj(map.iter().map(|(k, v)| (Rc::from(k.as_str()), Json::from_serde(v))).collect())
      }
    }
  }
}

fn push_indent(buf: &mut String, indent: &str, level: usize) {
  for _ in 0..level {
    buf.push_str(indent);
  }
}

/// Compact rendering: `,` and `:` separators, no whitespace.
impl fmt::Display for Json {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Json::Null => f.write_str("null"),
      Json::Bool(b) => write!(f, "{b}"),
      Json::Num(n) => write!(f, "{n}"),
      Json::Str(s) => {
        let mut buf = String::new();
        escape_json_string(s, &mut buf);
        f.write_str(&buf)
      }
      Json::Arr(elems) => {
        f.write_str("[")?;
        for (i, elem) in elems.iter().enumerate() {
          if i != 0 {
            f.write_str(",")?;
          }
          elem.fmt(f)?;
        }
        f.write_str("]")
      }
      Json::Obj(fields) => {
        f.write_str("{")?;
        for (i, (name, val)) in fields.iter().enumerate() {
          if i != 0 {
            f.write_str(",")?;
          }
          let mut buf = String::new();
          escape_json_string(name, &mut buf);
          f.write_str(&buf)?;
          f.write_str(":")?;
          val.fmt(f)?;
        }
        f.write_str("}")
      }
    }
  }
}

/// Appends the string as a JSON string literal, quotes included.
pub fn escape_json_string(s: &str, buf: &mut String) {
  buf.push('"');
  for c in s.chars() {
    match c {
      '"' => buf.push_str("\\\""),
      '\\' => buf.push_str("\\\\"),
      '\n' => buf.push_str("\\n"),
      '\r' => buf.push_str("\\r"),
      '\t' => buf.push_str("\\t"),
      '\u{8}' => buf.push_str("\\b"),
      '\u{c}' => buf.push_str("\\f"),
      c if (c as u32) < 0x20 => {
        buf.push_str(&format!("\\u{:04x}", c as u32));
      }
      c => buf.push(c),
    }
  }
  buf.push('"');
}

impl Interp<'_> {
  /// Manifests the value into a JSON value. Asserts run before any field;
  /// hidden fields are skipped; functions cannot be manifested.
  ///
  /// # Errors
  ///
  /// If manifestation failed.
  pub fn manifest(&mut self, val: &Val) -> Result<Json> {
    match val {
      Val::Prim(prim) => Ok(match prim {
        Prim::Null => Json::Null,
        Prim::Bool(b) => Json::Bool(*b),
        Prim::Number(n) => Json::Num(*n),
        Prim::String(s) => Json::Str(s.clone()),
      }),
      Val::Fn(_) => Err(self.error(Kind::ManifestFn)),
      Val::Array(arr) => {
        let mut elems = Vec::<Json>::with_capacity(arr.len());
        for thunk in arr.iter() {
          let thunk = thunk.clone();
          let v = self.force(&thunk)?;
          elems.push(self.manifest(&v)?);
        }
        Ok(Json::Arr(elems))
      }
      Val::Object(obj) => {
        self.check_asserts(obj)?;
        let mut fields = Vec::<(Rc<str>, Json)>::new();
        for name in obj.visible_field_names() {
          let v = self.object_index(obj, &name)?;
          fields.push((name, self.manifest(&v)?));
        }
        Ok(Json::Obj(fields))
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::Json;
  use jot_ast::Number;
  use std::rc::Rc;

  #[test]
  fn compact() {
    let json = Json::Obj(vec![
      (Rc::from("a"), Json::Num(Number::ONE)),
      (Rc::from("b"), Json::Arr(vec![Json::Null, Json::Bool(true)])),
    ]);
    assert_eq!(json.to_string(), r#"{"a":1,"b":[null,true]}"#);
  }

  #[test]
  fn escapes() {
    let json = Json::Str(Rc::from("a\"b\\c\nd\u{1}"));
    assert_eq!(json.to_string(), "\"a\\\"b\\\\c\\nd\\u0001\"");
  }

  #[test]
  fn indented() {
    let json = Json::Obj(vec![(Rc::from("a"), Json::Arr(vec![Json::Num(Number::ONE)]))]);
    assert_eq!(json.display_indented("  "), "{\n  \"a\": [\n    1\n  ]\n}");
  }
}
