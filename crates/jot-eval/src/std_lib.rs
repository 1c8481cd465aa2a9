//! The native standard library functions.
//!
//! These are the `std` functions the evaluator implements in Rust: the ones
//! the desugarer calls directly, plus the primitives everything else in the
//! ecosystem builds on.

#![allow(non_snake_case)]

use crate::error::{Kind, Result};
use crate::exec::Interp;
use crate::val::{Array, FieldDef, FieldVal, Fn, Layer, LayerData, Object, Thunk, Val};
use crate::File;
use jot_ast::{Number, Prim, Vis};
use rustc_hash::FxHashSet;
use std::rc::Rc;

/// A native standard-library function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Native {
  Type,
  Length,
  MakeArray,
  Filter,
  Map,
  FlatMap,
  Foldl,
  Foldr,
  Range,
  Join,
  Slice,
  Format,
  ToString,
  Codepoint,
  Char,
  Substr,
  StartsWith,
  EndsWith,
  StrReplace,
  AsciiUpper,
  AsciiLower,
  StripChars,
  LstripChars,
  RstripChars,
  ParseInt,
  Split,
  SplitLimit,
  ObjectHas,
  ObjectHasAll,
  ObjectHasEx,
  ObjectFields,
  ObjectFieldsAll,
  ObjectFieldsEx,
  Equals,
  Cmp,
  Mod,
  Abs,
  Sign,
  Max,
  Min,
  Clamp,
  Floor,
  Ceil,
  Round,
  Sqrt,
  Pow,
  Exp,
  Log,
  IsString,
  IsNumber,
  IsBoolean,
  IsArray,
  IsObject,
  IsFunction,
  Sort,
  Uniq,
  Count,
  Member,
  Repeat,
  ManifestJsonEx,
  ExtVar,
}

impl Native {
  pub const ALL: [(&'static str, Native); 61] = [
    ("type", Native::Type),
    ("length", Native::Length),
    ("makeArray", Native::MakeArray),
    ("filter", Native::Filter),
    ("map", Native::Map),
    ("flatMap", Native::FlatMap),
    ("foldl", Native::Foldl),
    ("foldr", Native::Foldr),
    ("range", Native::Range),
    ("join", Native::Join),
    ("slice", Native::Slice),
    ("format", Native::Format),
    ("toString", Native::ToString),
    ("codepoint", Native::Codepoint),
    ("char", Native::Char),
    ("substr", Native::Substr),
    ("startsWith", Native::StartsWith),
    ("endsWith", Native::EndsWith),
    ("strReplace", Native::StrReplace),
    ("asciiUpper", Native::AsciiUpper),
    ("asciiLower", Native::AsciiLower),
    ("stripChars", Native::StripChars),
    ("lstripChars", Native::LstripChars),
    ("rstripChars", Native::RstripChars),
    ("parseInt", Native::ParseInt),
    ("split", Native::Split),
    ("splitLimit", Native::SplitLimit),
    ("objectHas", Native::ObjectHas),
    ("objectHasAll", Native::ObjectHasAll),
    ("objectHasEx", Native::ObjectHasEx),
    ("objectFields", Native::ObjectFields),
    ("objectFieldsAll", Native::ObjectFieldsAll),
    ("objectFieldsEx", Native::ObjectFieldsEx),
    ("equals", Native::Equals),
    ("cmp", Native::Cmp),
    ("mod", Native::Mod),
    ("abs", Native::Abs),
    ("sign", Native::Sign),
    ("max", Native::Max),
    ("min", Native::Min),
    ("clamp", Native::Clamp),
    ("floor", Native::Floor),
    ("ceil", Native::Ceil),
    ("round", Native::Round),
    ("sqrt", Native::Sqrt),
    ("pow", Native::Pow),
    ("exp", Native::Exp),
    ("log", Native::Log),
    ("isString", Native::IsString),
    ("isNumber", Native::IsNumber),
    ("isBoolean", Native::IsBoolean),
    ("isArray", Native::IsArray),
    ("isObject", Native::IsObject),
    ("isFunction", Native::IsFunction),
    ("sort", Native::Sort),
    ("uniq", Native::Uniq),
    ("count", Native::Count),
    ("member", Native::Member),
    ("repeat", Native::Repeat),
    ("manifestJsonEx", Native::ManifestJsonEx),
    ("extVar", Native::ExtVar),
  ];

  #[must_use]
  pub fn name(self) -> &'static str {
    Native::ALL
      .iter()
      .find_map(|&(name, n)| (n == self).then_some(name))
      .expect("every native is in ALL")
  }

  /// Parameter names, for named-argument binding.
  #[must_use]
  pub fn params(self) -> &'static [&'static str] {
    match self {
      Native::Type
      | Native::Length
      | Native::ToString
      | Native::Abs
      | Native::Sign
      | Native::Floor
      | Native::Ceil
      | Native::Round
      | Native::Sqrt
      | Native::Exp
      | Native::Log
      | Native::IsString
      | Native::IsNumber
      | Native::IsBoolean
      | Native::IsArray
      | Native::IsObject
      | Native::IsFunction => &["x"],
      Native::Codepoint | Native::AsciiUpper | Native::AsciiLower => &["str"],
      Native::Char => &["n"],
      Native::ExtVar => &["x"],
      Native::ParseInt => &["str"],
      Native::MakeArray => &["sz", "func"],
      Native::Filter | Native::Map | Native::FlatMap => &["func", "arr"],
      Native::Foldl | Native::Foldr => &["func", "arr", "init"],
      Native::Range => &["from", "to"],
      Native::Join => &["sep", "arr"],
      Native::Slice => &["indexable", "index", "end", "step"],
      Native::Format => &["str", "vals"],
      Native::Substr => &["str", "from", "len"],
      Native::StartsWith | Native::EndsWith => &["a", "b"],
      Native::StrReplace => &["str", "from", "to"],
      Native::StripChars | Native::LstripChars | Native::RstripChars => &["str", "chars"],
      Native::Split => &["str", "c"],
      Native::SplitLimit => &["str", "c", "maxsplits"],
      Native::ObjectHas | Native::ObjectHasAll => &["o", "f"],
      Native::ObjectHasEx => &["o", "f", "inc_hidden"],
      Native::ObjectFields | Native::ObjectFieldsAll => &["o"],
      Native::ObjectFieldsEx => &["o", "inc_hidden"],
      Native::Equals | Native::Cmp => &["a", "b"],
      Native::Mod => &["a", "b"],
      Native::Max | Native::Min => &["a", "b"],
      Native::Clamp => &["x", "minVal", "maxVal"],
      Native::Pow => &["x", "n"],
      Native::Sort | Native::Uniq => &["arr", "keyF"],
      Native::Count | Native::Member => &["arr", "x"],
      Native::Repeat => &["what", "count"],
      Native::ManifestJsonEx => &["value", "indent"],
    }
  }

  /// How many leading parameters are required.
  #[must_use]
  pub fn required(self) -> usize {
    match self {
      Native::Sort | Native::Uniq => 1,
      _ => self.params().len(),
    }
  }
}

/// The `std` object for one file: every native, plus `thisFile` and `pi`,
/// all hidden.
pub(crate) fn std_obj(file: &Rc<File>) -> Object {
  let mut fields = Vec::<(Rc<str>, FieldDef)>::new();
  let mut field = |name: &str, val: Val| {
    let def =
      FieldDef { vis: Vis::Hidden, plus: false, value: FieldVal::Ready(Thunk::forced(val)) };
    fields.push((Rc::from(name), def));
  };
  for &(name, n) in &Native::ALL {
    field(name, Val::Fn(Fn::Native(n)));
  }
  field("thisFile", Val::from(file.path.clone()));
  field("pi", Val::from(Number::finite_or_zero(std::f64::consts::PI)));
  let layer = Layer(Rc::new(LayerData {
    file: Rc::clone(file),
    env: crate::val::Env::empty(),
    binds: Vec::new(),
    asserts: Vec::new(),
    fields,
  }));
  Object::new(vec![layer])
}

/// Sort keys: the types `std.sort` can order.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum SortKey {
  Num(Number),
  Str(Rc<str>),
  Arr(Vec<SortKey>),
}

impl Interp<'_> {
  #[allow(clippy::too_many_lines)]
  pub(crate) fn call_native(&mut self, n: Native, args: &[Option<Thunk>]) -> Result<Val> {
    let func = n.name();
    match n {
      Native::Type => {
        let v = self.force_arg(args, 0)?;
        Ok(str_val(v.type_name()))
      }
      Native::Length => {
        let v = self.force_arg(args, 0)?;
        let len = match &v {
          Val::Prim(Prim::String(s)) => s.chars().count(),
          Val::Array(arr) => arr.len(),
          Val::Object(obj) => obj.visible_field_names().len(),
          Val::Fn(Fn::Regular(f)) => f.params.iter().filter(|(_, d)| d.is_none()).count(),
          Val::Fn(Fn::Native(n)) => n.required(),
          Val::Prim(_) => {
            return Err(self.std_arg_err(func, "a string, array, object, or function", &v))
          }
        };
        Ok(Val::from(Number::from(len)))
      }
      Native::MakeArray => {
        let sz = self.index_arg(func, args, 0)?;
        let f = self.fn_arg(func, args, 1)?;
        let thunks = (0..sz)
          .map(|i| Thunk::apply(f.clone(), vec![Thunk::forced(Number::from(i))]))
          .collect();
        Ok(Val::Array(Array::new(thunks)))
      }
      Native::Filter => {
        let f = self.fn_arg(func, args, 0)?;
        let arr = self.arr_arg(func, args, 1)?;
        let mut kept = Vec::<Thunk>::new();
        for thunk in arr.iter() {
          let keep = self.call_fn1(&f, thunk.clone())?;
          match keep {
            Val::Prim(Prim::Bool(true)) => kept.push(thunk.clone()),
            Val::Prim(Prim::Bool(false)) => {}
            other => return Err(self.std_arg_err(func, "a boolean from `func`", &other)),
          }
        }
        Ok(Val::Array(Array::new(kept)))
      }
      Native::Map => {
        let f = self.fn_arg(func, args, 0)?;
        let arr = self.arr_arg(func, args, 1)?;
        let thunks = arr.iter().map(|t| Thunk::apply(f.clone(), vec![t.clone()])).collect();
        Ok(Val::Array(Array::new(thunks)))
      }
      Native::FlatMap => {
        let f = self.fn_arg(func, args, 0)?;
        match self.force_arg(args, 1)? {
          Val::Array(arr) => {
            let mut out = Vec::<Thunk>::new();
            for thunk in arr.iter() {
              match self.call_fn1(&f, thunk.clone())? {
                Val::Array(part) => out.extend(part.iter().cloned()),
                other => {
                  return Err(self.std_arg_err(func, "an array from `func`", &other))
                }
              }
            }
            Ok(Val::Array(Array::new(out)))
          }
          Val::Prim(Prim::String(s)) => {
            let mut out = String::new();
            for c in s.chars() {
              let arg = Thunk::forced(str_val_owned(c.to_string()));
              match self.call_fn1(&f, arg)? {
                Val::Prim(Prim::String(part)) => out.push_str(&part),
                other => {
                  return Err(self.std_arg_err(func, "a string from `func`", &other))
                }
              }
            }
            Ok(str_val_owned(out))
          }
          other => Err(self.std_arg_err(func, "an array or string", &other)),
        }
      }
      Native::Foldl => {
        let f = self.fn_arg(func, args, 0)?;
        let arr = self.arr_arg(func, args, 1)?;
        let mut acc = self.arg(args, 2);
        for thunk in arr.iter() {
          let v = self.call_fn2(&f, acc, thunk.clone())?;
          acc = Thunk::forced(v);
        }
        self.force(&acc)
      }
      Native::Foldr => {
        let f = self.fn_arg(func, args, 0)?;
        let arr = self.arr_arg(func, args, 1)?;
        let mut acc = self.arg(args, 2);
        for thunk in arr.iter().rev() {
          let v = self.call_fn2(&f, thunk.clone(), acc)?;
          acc = Thunk::forced(v);
        }
        self.force(&acc)
      }
      Native::Range => {
        let from = self.int_arg(func, args, 0)?;
        let to = self.int_arg(func, args, 1)?;
        let mut thunks = Vec::<Thunk>::new();
        let mut i = from;
        while i <= to {
          #[allow(clippy::cast_precision_loss)]
          thunks.push(Thunk::forced(Number::finite_or_zero(i as f64)));
          i += 1;
        }
        Ok(Val::Array(Array::new(thunks)))
      }
      Native::Join => {
        let sep = self.force_arg(args, 0)?;
        let arr = self.arr_arg(func, args, 1)?;
        match sep {
          Val::Prim(Prim::String(sep)) => {
            let mut ret = String::new();
            let mut first = true;
            for thunk in arr.iter() {
              let thunk = thunk.clone();
              let elem = self.force(&thunk)?;
              match elem {
                Val::Prim(Prim::Null) => {}
                Val::Prim(Prim::String(elem)) => {
                  if !first {
                    ret.push_str(&sep);
                  }
                  first = false;
                  ret.push_str(&elem);
                }
                other => return Err(self.std_arg_err(func, "an array of strings", &other)),
              }
            }
            Ok(str_val_owned(ret))
          }
          Val::Array(sep) => {
            let mut ret = Vec::<Thunk>::new();
            let mut first = true;
            for thunk in arr.iter() {
              let thunk = thunk.clone();
              let elem = self.force(&thunk)?;
              match elem {
                Val::Prim(Prim::Null) => {}
                Val::Array(elem) => {
                  if !first {
                    ret.extend(sep.iter().cloned());
                  }
                  first = false;
                  ret.extend(elem.iter().cloned());
                }
                other => return Err(self.std_arg_err(func, "an array of arrays", &other)),
              }
            }
            Ok(Val::Array(Array::new(ret)))
          }
          other => Err(self.std_arg_err(func, "a string or array separator", &other)),
        }
      }
      Native::Slice => {
        let indexable = self.force_arg(args, 0)?;
        let start = self.opt_index_arg(func, args, 1)?.unwrap_or(0);
        let end = self.opt_index_arg(func, args, 2)?;
        let step = self.opt_index_arg(func, args, 3)?.unwrap_or(1);
        if step == 0 {
          return Err(self.error(Kind::StdArg {
            func,
            want: "a positive step",
            got: "zero",
          }));
        }
        match indexable {
          Val::Array(arr) => {
            let end = end.unwrap_or(arr.len()).min(arr.len());
            let mut out = Vec::<Thunk>::new();
            let mut i = start;
            while i < end {
              if let Some(t) = arr.get(i) {
                out.push(t.clone());
              }
              i += step;
            }
            Ok(Val::Array(Array::new(out)))
          }
          Val::Prim(Prim::String(s)) => {
            let chars: Vec<char> = s.chars().collect();
            let end = end.unwrap_or(chars.len()).min(chars.len());
            let mut out = String::new();
            let mut i = start;
            while i < end {
              out.push(chars[i]);
              i += step;
            }
            Ok(str_val_owned(out))
          }
          other => Err(self.std_arg_err(func, "an array or string", &other)),
        }
      }
      Native::Format => {
        let fmt = self.str_arg(func, args, 0)?;
        let vals = self.force_arg(args, 1)?;
        let ret = self.format(&fmt, &vals)?;
        Ok(Val::from(ret))
      }
      Native::ToString => {
        let v = self.force_arg(args, 0)?;
        let ret = self.to_display_string(&v)?;
        Ok(Val::from(ret))
      }
      Native::Codepoint => {
        let s = self.str_arg(func, args, 0)?;
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
          (Some(c), None) => Ok(Val::from(Number::from(c as usize))),
          _ => Err(self.error(Kind::StdArg {
            func,
            want: "a 1-character string",
            got: "something else",
          })),
        }
      }
      Native::Char => {
        let n = self.index_arg(func, args, 0)?;
        let c = u32::try_from(n).ok().and_then(char::from_u32).ok_or_else(|| {
          self.error(Kind::StdArg { func, want: "a code point", got: "an invalid number" })
        })?;
        Ok(str_val_owned(c.to_string()))
      }
      Native::Substr => {
        let s = self.str_arg(func, args, 0)?;
        let from = self.index_arg(func, args, 1)?;
        let len = self.index_arg(func, args, 2)?;
        let ret: String = s.chars().skip(from).take(len).collect();
        Ok(str_val_owned(ret))
      }
      Native::StartsWith => {
        let a = self.str_arg(func, args, 0)?;
        let b = self.str_arg(func, args, 1)?;
        Ok(Val::from(a.starts_with(&*b)))
      }
      Native::EndsWith => {
        let a = self.str_arg(func, args, 0)?;
        let b = self.str_arg(func, args, 1)?;
        Ok(Val::from(a.ends_with(&*b)))
      }
      Native::StrReplace => {
        let s = self.str_arg(func, args, 0)?;
        let from = self.str_arg(func, args, 1)?;
        let to = self.str_arg(func, args, 2)?;
        if from.is_empty() {
          return Err(self.error(Kind::StdArg {
            func,
            want: "a non-empty `from` string",
            got: "an empty one",
          }));
        }
        Ok(str_val_owned(s.replace(&*from, &to)))
      }
      Native::AsciiUpper => {
        let s = self.str_arg(func, args, 0)?;
        Ok(str_val_owned(s.to_ascii_uppercase()))
      }
      Native::AsciiLower => {
        let s = self.str_arg(func, args, 0)?;
        Ok(str_val_owned(s.to_ascii_lowercase()))
      }
      Native::StripChars => {
        let s = self.str_arg(func, args, 0)?;
        let cs: FxHashSet<char> = self.str_arg(func, args, 1)?.chars().collect();
        Ok(str_val_owned(s.trim_matches(|c| cs.contains(&c)).to_owned()))
      }
      Native::LstripChars => {
        let s = self.str_arg(func, args, 0)?;
        let cs: FxHashSet<char> = self.str_arg(func, args, 1)?.chars().collect();
        Ok(str_val_owned(s.trim_start_matches(|c| cs.contains(&c)).to_owned()))
      }
      Native::RstripChars => {
        let s = self.str_arg(func, args, 0)?;
        let cs: FxHashSet<char> = self.str_arg(func, args, 1)?.chars().collect();
        Ok(str_val_owned(s.trim_end_matches(|c| cs.contains(&c)).to_owned()))
      }
      Native::ParseInt => {
        let s = self.str_arg(func, args, 0)?;
        match s.parse::<i64>() {
          #[allow(clippy::cast_precision_loss)]
          Ok(n) => Ok(Val::from(Number::finite_or_zero(n as f64))),
          Err(_) => Err(self.error(Kind::ParseInt(s))),
        }
      }
      Native::Split => {
        let s = self.str_arg(func, args, 0)?;
        let c = self.str_arg(func, args, 1)?;
        self.split_limit(func, &s, &c, None)
      }
      Native::SplitLimit => {
        let s = self.str_arg(func, args, 0)?;
        let c = self.str_arg(func, args, 1)?;
        let max = self.int_arg(func, args, 2)?;
        let max = usize::try_from(max).ok();
        self.split_limit(func, &s, &c, max)
      }
      Native::ObjectHas => {
        let o = self.obj_arg(func, args, 0)?;
        let f = self.str_arg(func, args, 1)?;
        Ok(Val::from(o.has_field(&f, false)))
      }
      Native::ObjectHasAll => {
        let o = self.obj_arg(func, args, 0)?;
        let f = self.str_arg(func, args, 1)?;
        Ok(Val::from(o.has_field(&f, true)))
      }
      Native::ObjectHasEx => {
        let o = self.obj_arg(func, args, 0)?;
        let f = self.str_arg(func, args, 1)?;
        let inc = self.bool_arg(func, args, 2)?;
        Ok(Val::from(o.has_field(&f, inc)))
      }
      Native::ObjectFields => {
        let o = self.obj_arg(func, args, 0)?;
        Ok(names_val(o.visible_field_names()))
      }
      Native::ObjectFieldsAll => {
        let o = self.obj_arg(func, args, 0)?;
        Ok(names_val(o.field_names()))
      }
      Native::ObjectFieldsEx => {
        let o = self.obj_arg(func, args, 0)?;
        let inc = self.bool_arg(func, args, 1)?;
        Ok(names_val(if inc { o.field_names() } else { o.visible_field_names() }))
      }
      Native::Equals => {
        let a = self.force_arg(args, 0)?;
        let b = self.force_arg(args, 1)?;
        let eq = self.eq_val(&a, &b)?;
        Ok(Val::from(eq))
      }
      Native::Cmp => {
        let a = self.force_arg(args, 0)?;
        let b = self.force_arg(args, 1)?;
        let ord = self.cmp_val(&a, &b)?;
        let n = match ord {
          std::cmp::Ordering::Less => -Number::ONE,
          std::cmp::Ordering::Equal => Number::ZERO,
          std::cmp::Ordering::Greater => Number::ONE,
        };
        Ok(Val::from(n))
      }
      Native::Mod => {
        let a = self.force_arg(args, 0)?;
        let b = self.force_arg(args, 1)?;
        self.mod_vals(&a, &b)
      }
      Native::Abs => self.float1(func, args, f64::abs),
      Native::Sign => self.float1(func, args, |n| {
        if n == 0.0 {
          0.0
        } else if n.is_sign_positive() {
          1.0
        } else {
          -1.0
        }
      }),
      Native::Max => self.float2(func, args, f64::max),
      Native::Min => self.float2(func, args, f64::min),
      Native::Clamp => {
        let x = self.num_arg(func, args, 0)?;
        let min = self.num_arg(func, args, 1)?;
        let max = self.num_arg(func, args, 2)?;
        self.finite(x.clamp(min, max))
      }
      Native::Floor => self.float1(func, args, f64::floor),
      Native::Ceil => self.float1(func, args, f64::ceil),
      Native::Round => self.float1(func, args, f64::round),
      Native::Sqrt => self.float1(func, args, f64::sqrt),
      Native::Pow => self.float2(func, args, f64::powf),
      Native::Exp => self.float1(func, args, f64::exp),
      Native::Log => self.float1(func, args, f64::ln),
      Native::IsString => {
        let v = self.force_arg(args, 0)?;
        Ok(Val::from(matches!(v, Val::Prim(Prim::String(_)))))
      }
      Native::IsNumber => {
        let v = self.force_arg(args, 0)?;
        Ok(Val::from(matches!(v, Val::Prim(Prim::Number(_)))))
      }
      Native::IsBoolean => {
        let v = self.force_arg(args, 0)?;
        Ok(Val::from(matches!(v, Val::Prim(Prim::Bool(_)))))
      }
      Native::IsArray => {
        let v = self.force_arg(args, 0)?;
        Ok(Val::from(matches!(v, Val::Array(_))))
      }
      Native::IsObject => {
        let v = self.force_arg(args, 0)?;
        Ok(Val::from(matches!(v, Val::Object(_))))
      }
      Native::IsFunction => {
        let v = self.force_arg(args, 0)?;
        Ok(Val::from(matches!(v, Val::Fn(_))))
      }
      Native::Sort => {
        let arr = self.arr_arg(func, args, 0)?;
        let key_f = self.opt_fn_arg(func, args, 1)?;
        let mut keyed = self.keyed_elems(func, &arr, key_f.as_ref())?;
        keyed.sort_by(|(_, a), (_, b)| a.cmp(b));
        Ok(Val::Array(Array::new(keyed.into_iter().map(|(t, _)| t).collect())))
      }
      Native::Uniq => {
        let arr = self.arr_arg(func, args, 0)?;
        let key_f = self.opt_fn_arg(func, args, 1)?;
        let keyed = self.keyed_elems(func, &arr, key_f.as_ref())?;
        let mut out = Vec::<Thunk>::new();
        let mut prev = None::<SortKey>;
        for (thunk, key) in keyed {
          if prev.as_ref() != Some(&key) {
            out.push(thunk);
          }
          prev = Some(key);
        }
        Ok(Val::Array(Array::new(out)))
      }
      Native::Count => {
        let arr = self.arr_arg(func, args, 0)?;
        let x = self.force_arg(args, 1)?;
        let mut count = 0usize;
        for thunk in arr.iter() {
          let thunk = thunk.clone();
          let elem = self.force(&thunk)?;
          if self.eq_val(&elem, &x)? {
            count += 1;
          }
        }
        Ok(Val::from(Number::from(count)))
      }
      Native::Member => {
        let arr = self.arr_arg(func, args, 0)?;
        let x = self.force_arg(args, 1)?;
        for thunk in arr.iter() {
          let thunk = thunk.clone();
          let elem = self.force(&thunk)?;
          if self.eq_val(&elem, &x)? {
            return Ok(Val::from(true));
          }
        }
        Ok(Val::from(false))
      }
      Native::Repeat => {
        let what = self.force_arg(args, 0)?;
        let count = self.index_arg(func, args, 1)?;
        match what {
          Val::Prim(Prim::String(s)) => Ok(str_val_owned(s.repeat(count))),
          Val::Array(arr) => {
            let mut out = Vec::<Thunk>::with_capacity(arr.len() * count);
            for _ in 0..count {
              out.extend(arr.iter().cloned());
            }
            Ok(Val::Array(Array::new(out)))
          }
          other => Err(self.std_arg_err(func, "a string or array", &other)),
        }
      }
      Native::ManifestJsonEx => {
        let v = self.force_arg(args, 0)?;
        let indent = self.str_arg(func, args, 1)?;
        let json = self.manifest(&v)?;
        Ok(str_val_owned(json.display_indented(&indent)))
      }
      Native::ExtVar => {
        let name = self.str_arg(func, args, 0)?;
        match self.ext_var(&name) {
          Some(thunk) => self.force(&thunk),
          None => Err(self.error(Kind::NoExtVar(name))),
        }
      }
    }
  }

  fn split_limit(
    &mut self,
    func: &'static str,
    s: &str,
    c: &str,
    max: Option<usize>,
  ) -> Result<Val> {
    if c.is_empty() {
      return Err(self.error(Kind::StdArg {
        func,
        want: "a non-empty delimiter",
        got: "an empty string",
      }));
    }
    let parts: Vec<&str> = match max {
      None => s.split(c).collect(),
      Some(max) => s.splitn(max + 1, c).collect(),
    };
    let thunks = parts.into_iter().map(|p| Thunk::forced(str_val_owned(p.to_owned()))).collect();
    Ok(Val::Array(Array::new(thunks)))
  }

  /// Forces every element (and its key, if a key function is given) for
  /// `std.sort` and `std.uniq`.
  fn keyed_elems(
    &mut self,
    func: &'static str,
    arr: &Array,
    key_f: Option<&Fn>,
  ) -> Result<Vec<(Thunk, SortKey)>> {
    let mut ret = Vec::<(Thunk, SortKey)>::with_capacity(arr.len());
    for thunk in arr.iter() {
      let key_val = match key_f {
        Some(f) => self.call_fn1(f, thunk.clone())?,
        None => {
          let thunk = thunk.clone();
          self.force(&thunk)?
        }
      };
      let key = self.sort_key(func, &key_val)?;
      ret.push((thunk.clone(), key));
    }
    Ok(ret)
  }

  fn sort_key(&mut self, func: &'static str, v: &Val) -> Result<SortKey> {
    match v {
      Val::Prim(Prim::Number(n)) => Ok(SortKey::Num(*n)),
      Val::Prim(Prim::String(s)) => Ok(SortKey::Str(s.clone())),
      Val::Array(arr) => {
        let mut keys = Vec::<SortKey>::with_capacity(arr.len());
        for thunk in arr.iter() {
          let thunk = thunk.clone();
          let elem = self.force(&thunk)?;
          keys.push(self.sort_key(func, &elem)?);
        }
        Ok(SortKey::Arr(keys))
      }
      other => Err(self.std_arg_err(func, "a number, string, or array key", other)),
    }
  }

  fn call_fn1(&mut self, f: &Fn, arg: Thunk) -> Result<Val> {
    let at = self.cur_loc();
    self.call(at, f, vec![arg], Vec::new(), false)
  }

  fn call_fn2(&mut self, f: &Fn, a: Thunk, b: Thunk) -> Result<Val> {
    let at = self.cur_loc();
    self.call(at, f, vec![a, b], Vec::new(), false)
  }

  fn arg(&self, args: &[Option<Thunk>], idx: usize) -> Thunk {
    args[idx].clone().expect("required arg should be bound")
  }

  fn force_arg(&mut self, args: &[Option<Thunk>], idx: usize) -> Result<Val> {
    let thunk = self.arg(args, idx);
    self.force(&thunk)
  }

  fn std_arg_err(&self, func: &'static str, want: &'static str, got: &Val) -> crate::error::Error {
    self.error(Kind::StdArg { func, want, got: got.type_name() })
  }

  fn str_arg(&mut self, func: &'static str, args: &[Option<Thunk>], idx: usize) -> Result<Rc<str>> {
    match self.force_arg(args, idx)? {
      Val::Prim(Prim::String(s)) => Ok(s),
      other => Err(self.std_arg_err(func, "a string", &other)),
    }
  }

  fn num_arg(&mut self, func: &'static str, args: &[Option<Thunk>], idx: usize) -> Result<f64> {
    match self.force_arg(args, idx)? {
      Val::Prim(Prim::Number(n)) => Ok(n.to_f64()),
      other => Err(self.std_arg_err(func, "a number", &other)),
    }
  }

  fn int_arg(&mut self, func: &'static str, args: &[Option<Thunk>], idx: usize) -> Result<i64> {
    match self.force_arg(args, idx)? {
      Val::Prim(Prim::Number(n)) => match n.to_i64() {
        Some(n) => Ok(n),
        None => Err(self.error(Kind::StdArg {
          func,
          want: "an integer",
          got: "a fractional number",
        })),
      },
      other => Err(self.std_arg_err(func, "an integer", &other)),
    }
  }

  fn index_arg(&mut self, func: &'static str, args: &[Option<Thunk>], idx: usize) -> Result<usize> {
    match self.force_arg(args, idx)? {
      Val::Prim(Prim::Number(n)) => match n.to_index() {
        Some(n) => Ok(n),
        None => Err(self.error(Kind::StdArg {
          func,
          want: "a non-negative integer",
          got: "some other number",
        })),
      },
      other => Err(self.std_arg_err(func, "a non-negative integer", &other)),
    }
  }

  /// An optional index argument where `null` also means absent.
  fn opt_index_arg(
    &mut self,
    func: &'static str,
    args: &[Option<Thunk>],
    idx: usize,
  ) -> Result<Option<usize>> {
    match args.get(idx).and_then(Clone::clone) {
      None => Ok(None),
      Some(thunk) => match self.force(&thunk)? {
        Val::Prim(Prim::Null) => Ok(None),
        Val::Prim(Prim::Number(n)) => match n.to_index() {
          Some(n) => Ok(Some(n)),
          None => Err(self.error(Kind::StdArg {
            func,
            want: "a non-negative integer",
            got: "some other number",
          })),
        },
        other => Err(self.std_arg_err(func, "a non-negative integer or null", &other)),
      },
    }
  }

  fn bool_arg(&mut self, func: &'static str, args: &[Option<Thunk>], idx: usize) -> Result<bool> {
    match self.force_arg(args, idx)? {
      Val::Prim(Prim::Bool(b)) => Ok(b),
      other => Err(self.std_arg_err(func, "a boolean", &other)),
    }
  }

  fn arr_arg(&mut self, func: &'static str, args: &[Option<Thunk>], idx: usize) -> Result<Array> {
    match self.force_arg(args, idx)? {
      Val::Array(arr) => Ok(arr),
      other => Err(self.std_arg_err(func, "an array", &other)),
    }
  }

  fn obj_arg(&mut self, func: &'static str, args: &[Option<Thunk>], idx: usize) -> Result<Object> {
    match self.force_arg(args, idx)? {
      Val::Object(obj) => Ok(obj),
      other => Err(self.std_arg_err(func, "an object", &other)),
    }
  }

  fn fn_arg(&mut self, func: &'static str, args: &[Option<Thunk>], idx: usize) -> Result<Fn> {
    match self.force_arg(args, idx)? {
      Val::Fn(f) => Ok(f),
      other => Err(self.std_arg_err(func, "a function", &other)),
    }
  }

  fn opt_fn_arg(
    &mut self,
    func: &'static str,
    args: &[Option<Thunk>],
    idx: usize,
  ) -> Result<Option<Fn>> {
    match args.get(idx).and_then(Clone::clone) {
      None => Ok(None),
      Some(thunk) => match self.force(&thunk)? {
        Val::Prim(Prim::Null) => Ok(None),
        Val::Fn(f) => Ok(Some(f)),
        other => Err(self.std_arg_err(func, "a function or null", &other)),
      },
    }
  }

  fn float1<F>(&mut self, func: &'static str, args: &[Option<Thunk>], f: F) -> Result<Val>
  where
    F: FnOnce(f64) -> f64,
  {
    let n = self.num_arg(func, args, 0)?;
    self.finite(f(n))
  }

  fn float2<F>(&mut self, func: &'static str, args: &[Option<Thunk>], f: F) -> Result<Val>
  where
    F: FnOnce(f64, f64) -> f64,
  {
    let a = self.num_arg(func, args, 0)?;
    let b = self.num_arg(func, args, 1)?;
    self.finite(f(a, b))
  }
}

fn str_val(s: &str) -> Val {
  Val::Prim(Prim::String(Rc::from(s)))
}

fn str_val_owned(s: String) -> Val {
  Val::Prim(Prim::String(Rc::from(s)))
}

fn names_val(names: Vec<Rc<str>>) -> Val {
  let thunks = names.into_iter().map(|n| Thunk::forced(Val::Prim(Prim::String(n)))).collect();
  Val::Array(Array::new(thunks))
}
