//! Rendering values into strings with `%` format codes.
//!
//! Supports the printf-style codes `diouxXeEfFgGcs%`, with `(key)` mapping
//! lookup, the `# 0 - +` and blank flags, and `*` or numeric width and
//! precision.

use crate::error::{Kind, Result};
use crate::exec::Interp;
use crate::val::Val;
use jot_ast::Prim;
use std::rc::Rc;

#[derive(Debug)]
enum Elem {
  Raw(String),
  Code(Code),
}

#[derive(Debug)]
struct Code {
  key: Option<String>,
  cflags: CFlags,
  width: Option<Width>,
  prec: Option<Width>,
  ctype: ConvType,
}

#[derive(Debug, Default, Clone, Copy)]
struct CFlags {
  alt: bool,
  zero: bool,
  left: bool,
  blank: bool,
  plus: bool,
}

#[derive(Debug, Clone, Copy)]
enum Width {
  Star,
  Num(usize),
}

#[derive(Debug, Clone, Copy)]
enum Case {
  Lower,
  Upper,
}

#[derive(Debug, Clone, Copy)]
enum ConvType {
  D,
  O,
  X(Case),
  E(Case),
  F,
  G(Case),
  C,
  S,
  Percent,
}

fn parse(fmt: &str) -> std::result::Result<Vec<Elem>, String> {
  let mut elems = Vec::<Elem>::new();
  let mut raw = String::new();
  let mut chars = fmt.chars().peekable();
  while let Some(c) = chars.next() {
    if c != '%' {
      raw.push(c);
      continue;
    }
    if !raw.is_empty() {
      elems.push(Elem::Raw(std::mem::take(&mut raw)));
    }
    let mut key = None::<String>;
    if chars.peek() == Some(&'(') {
      chars.next();
      let mut k = String::new();
      loop {
        match chars.next() {
          Some(')') => break,
          Some(c) => k.push(c),
          None => return Err("unterminated `(key)` in format code".to_owned()),
        }
      }
      key = Some(k);
    }
    let mut cflags = CFlags::default();
    loop {
      match chars.peek() {
        Some('#') => cflags.alt = true,
        Some('0') => cflags.zero = true,
        Some('-') => cflags.left = true,
        Some(' ') => cflags.blank = true,
        Some('+') => cflags.plus = true,
        _ => break,
      }
      chars.next();
    }
    let width = parse_width(&mut chars);
    let prec = if chars.peek() == Some(&'.') {
      chars.next();
      Some(parse_width(&mut chars).unwrap_or(Width::Num(0)))
    } else {
      None
    };
    // length modifiers carry no meaning here
    while matches!(chars.peek(), Some('h' | 'l' | 'L')) {
      chars.next();
    }
    let ctype = match chars.next() {
      Some('d' | 'i' | 'u') => ConvType::D,
      Some('o') => ConvType::O,
      Some('x') => ConvType::X(Case::Lower),
      Some('X') => ConvType::X(Case::Upper),
      Some('e') => ConvType::E(Case::Lower),
      Some('E') => ConvType::E(Case::Upper),
      Some('f' | 'F') => ConvType::F,
      Some('g') => ConvType::G(Case::Lower),
      Some('G') => ConvType::G(Case::Upper),
      Some('c') => ConvType::C,
      Some('s') => ConvType::S,
      Some('%') => ConvType::Percent,
      Some(c) => return Err(format!("unrecognized conversion type: `{c}`")),
      None => return Err("truncated format code".to_owned()),
    };
    elems.push(Elem::Code(Code { key, cflags, width, prec, ctype }));
  }
  if !raw.is_empty() {
    elems.push(Elem::Raw(raw));
  }
  Ok(elems)
}

fn parse_width(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Option<Width> {
  if chars.peek() == Some(&'*') {
    chars.next();
    return Some(Width::Star);
  }
  let mut n = None::<usize>;
  while let Some(d) = chars.peek().and_then(|c| c.to_digit(10)) {
    chars.next();
    n = Some(n.unwrap_or(0) * 10 + d as usize);
  }
  n.map(Width::Num)
}

impl Interp<'_> {
  /// `std.format`, also reached by `string % value`.
  pub(crate) fn format(&mut self, fmt: &str, arg: &Val) -> Result<Rc<str>> {
    let elems = parse(fmt).map_err(|msg| self.error(Kind::Format(msg)))?;
    let mut out = String::new();
    let mut idx = 0usize;
    for elem in &elems {
      match elem {
        Elem::Raw(s) => out.push_str(s),
        Elem::Code(code) => {
          if matches!(code.ctype, ConvType::Percent) {
            out.push('%');
            continue;
          }
          let width = self.resolve_width(code.width, arg, &mut idx)?;
          let prec = self.resolve_width(code.prec, arg, &mut idx)?;
          let val = self.next_value(code.key.as_deref(), arg, &mut idx)?;
          let s = self.format_one(code, width.unwrap_or(0), prec, &val)?;
          out.push_str(&space_pad(&s, width.unwrap_or(0), code.cflags.left));
        }
      }
    }
    if let Val::Array(arr) = arg {
      if idx < arr.len() {
        return Err(self.error(Kind::Format("too many values to format".to_owned())));
      }
    }
    Ok(Rc::from(out))
  }

  fn resolve_width(
    &mut self,
    width: Option<Width>,
    arg: &Val,
    idx: &mut usize,
  ) -> Result<Option<usize>> {
    match width {
      None => Ok(None),
      Some(Width::Num(n)) => Ok(Some(n)),
      Some(Width::Star) => {
        let v = self.next_value(None, arg, idx)?;
        match v {
          Val::Prim(Prim::Number(n)) => match n.to_index() {
            Some(n) => Ok(Some(n)),
            None => Err(self.error(Kind::Format("`*` width must be an integer".to_owned()))),
          },
          _ => Err(self.error(Kind::Format("`*` width must be a number".to_owned()))),
        }
      }
    }
  }

  fn next_value(&mut self, key: Option<&str>, arg: &Val, idx: &mut usize) -> Result<Val> {
    match (key, arg) {
      (Some(k), Val::Object(obj)) => self.object_index(obj, &Rc::from(k)),
      (Some(_), _) => {
        Err(self.error(Kind::Format("`(key)` requires an object of values".to_owned())))
      }
      (None, Val::Object(_)) => {
        Err(self.error(Kind::Format("object values require a `(key)` in each code".to_owned())))
      }
      (None, Val::Array(arr)) => {
        let Some(thunk) = arr.get(*idx) else {
          return Err(self.error(Kind::Format("not enough values to format".to_owned())));
        };
        *idx += 1;
        let thunk = thunk.clone();
        self.force(&thunk)
      }
      (None, single) => {
        if *idx > 0 {
          return Err(self.error(Kind::Format("not enough values to format".to_owned())));
        }
        *idx += 1;
        Ok(single.clone())
      }
    }
  }

  fn format_one(
    &mut self,
    code: &Code,
    width: usize,
    prec: Option<usize>,
    val: &Val,
  ) -> Result<String> {
    let cf = code.cflags;
    let zp = if cf.zero && !cf.left { width } else { 0 };
    let fp_prec = prec.unwrap_or(6);
    let i_prec = prec.unwrap_or(0);
    let ret = match code.ctype {
      ConvType::D => render_int(self.number_for(code, val)?, zp, i_prec, cf, 10, false, Case::Lower),
      ConvType::O => {
        render_int(self.number_for(code, val)?, zp, i_prec, cf, 8, cf.alt, Case::Lower)
      }
      ConvType::X(case) => {
        render_int(self.number_for(code, val)?, zp, i_prec, cf, 16, cf.alt, case)
      }
      ConvType::F => {
        render_float_dec(self.number_for(code, val)?, zp, cf, cf.alt, true, fp_prec)
      }
      ConvType::E(case) => {
        render_float_sci(self.number_for(code, val)?, zp, cf, cf.alt, true, case, fp_prec)
      }
      ConvType::G(case) => {
        let n = self.number_for(code, val)?;
        let prec = fp_prec.max(1);
        let exponent = if n == 0.0 {
          0i64
        } else {
          #[allow(clippy::cast_possible_truncation)]
          let e = n.abs().log10().floor() as i64;
          e
        };
        #[allow(clippy::cast_possible_wrap)]
        if exponent < -4 || exponent >= prec as i64 {
          render_float_sci(n, zp, cf, cf.alt, cf.alt, case, prec - 1)
        } else {
          let digits_before_pt = usize::try_from(exponent.max(0)).unwrap_or(0) + 1;
          render_float_dec(n, zp, cf, cf.alt, cf.alt, prec.saturating_sub(digits_before_pt))
        }
      }
      ConvType::C => match val {
        Val::Prim(Prim::Number(n)) => {
          let c = n
            .to_index()
            .and_then(|n| u32::try_from(n).ok())
            .and_then(char::from_u32)
            .ok_or_else(|| {
              self.error(Kind::Format("`%c` number is not a code point".to_owned()))
            })?;
          c.to_string()
        }
        Val::Prim(Prim::String(s)) if s.chars().count() == 1 => s.to_string(),
        _ => {
          return Err(
            self.error(Kind::Format("`%c` expects a code point or a 1-character string".to_owned())),
          )
        }
      },
      ConvType::S => self.to_display_string(val)?.to_string(),
      ConvType::Percent => unreachable!("handled by the caller"),
    };
    Ok(ret)
  }

  fn number_for(&mut self, code: &Code, val: &Val) -> Result<f64> {
    match val {
      Val::Prim(Prim::Number(n)) => Ok(n.to_f64()),
      _ => {
        let c = match code.ctype {
          ConvType::D => 'd',
          ConvType::O => 'o',
          ConvType::X(_) => 'x',
          ConvType::E(_) => 'e',
          ConvType::F => 'f',
          ConvType::G(_) => 'g',
          _ => '?',
        };
        Err(self.error(Kind::Format(format!("`%{c}` expects a number, got {}", val.type_name()))))
      }
    }
  }
}

/// Sign, then prefix, then zero padding, then digits.
fn assemble(neg: bool, cf: CFlags, prefix: &str, digits: String, zp: usize) -> String {
  let sign = if neg {
    "-"
  } else if cf.plus {
    "+"
  } else if cf.blank {
    " "
  } else {
    ""
  };
  let used = sign.len() + prefix.len() + digits.chars().count();
  let pad = zp.saturating_sub(used);
  let mut ret = String::new();
  ret.push_str(sign);
  ret.push_str(prefix);
  for _ in 0..pad {
    ret.push('0');
  }
  ret.push_str(&digits);
  ret
}

fn render_int(
  val: f64,
  zp: usize,
  min_digits: usize,
  cf: CFlags,
  radix: u128,
  prefixed: bool,
  case: Case,
) -> String {
  let neg = val < 0.0;
  #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
  let mut n = val.abs().trunc() as u128;
  let mut digits = Vec::<char>::new();
  if n == 0 {
    digits.push('0');
  }
  while n != 0 {
    digits.push(digit_to_char(n % radix, case));
    n /= radix;
  }
  while digits.len() < min_digits {
    digits.push('0');
  }
  digits.reverse();
  let prefix = if prefixed {
    match (radix, case) {
      (8, _) => "0",
      (16, Case::Lower) => "0x",
      (16, Case::Upper) => "0X",
      _ => "",
    }
  } else {
    ""
  };
  assemble(neg, cf, prefix, digits.into_iter().collect(), zp)
}

fn render_float_dec(
  val: f64,
  zp: usize,
  cf: CFlags,
  ensure_pt: bool,
  trailing: bool,
  prec: usize,
) -> String {
  let neg = val < 0.0;
  let mut body = format!("{:.*}", prec, val.abs());
  if !trailing && body.contains('.') {
    while body.ends_with('0') {
      body.pop();
    }
    if body.ends_with('.') {
      body.pop();
    }
  }
  if ensure_pt && !body.contains('.') {
    body.push('.');
  }
  assemble(neg, cf, "", body, zp)
}

fn render_float_sci(
  val: f64,
  zp: usize,
  cf: CFlags,
  ensure_pt: bool,
  trailing: bool,
  case: Case,
  prec: usize,
) -> String {
  let neg = val < 0.0;
  let formatted = format!("{:.*e}", prec, val.abs());
  let (mantissa, exp) = formatted.split_once('e').expect("`{:e}` always has an `e`");
  let mut mantissa = mantissa.to_owned();
  if !trailing && mantissa.contains('.') {
    while mantissa.ends_with('0') {
      mantissa.pop();
    }
    if mantissa.ends_with('.') {
      mantissa.pop();
    }
  }
  if ensure_pt && !mantissa.contains('.') {
    mantissa.push('.');
  }
  let exp: i32 = exp.parse().expect("exponent is an integer");
  let e = match case {
    Case::Lower => 'e',
    Case::Upper => 'E',
  };
  let exp_sign = if exp < 0 { '-' } else { '+' };
  let body = format!("{mantissa}{e}{exp_sign}{:02}", exp.abs());
  assemble(neg, cf, "", body, zp)
}

fn space_pad(s: &str, width: usize, left: bool) -> String {
  let len = s.chars().count();
  if len >= width {
    return s.to_owned();
  }
  let pad = " ".repeat(width - len);
  if left {
    format!("{s}{pad}")
  } else {
    format!("{pad}{s}")
  }
}

fn digit_to_char(n: u128, case: Case) -> char {
  match (n, case) {
    (0, _) => '0',
    (1, _) => '1',
    (2, _) => '2',
    (3, _) => '3',
    (4, _) => '4',
    (5, _) => '5',
    (6, _) => '6',
    (7, _) => '7',
    (8, _) => '8',
    (9, _) => '9',
    (10, Case::Lower) => 'a',
    (10, Case::Upper) => 'A',
    (11, Case::Lower) => 'b',
    (11, Case::Upper) => 'B',
    (12, Case::Lower) => 'c',
    (12, Case::Upper) => 'C',
    (13, Case::Lower) => 'd',
    (13, Case::Upper) => 'D',
    (14, Case::Lower) => 'e',
    (14, Case::Upper) => 'E',
    (15, Case::Lower) => 'f',
    (15, Case::Upper) => 'F',
    _ => panic!("not a digit: {n}"),
  }
}

#[cfg(test)]
mod tests {
  use super::{parse, render_float_dec, render_float_sci, render_int, CFlags, Case};

  #[test]
  fn parse_codes() {
    assert!(parse("plain").is_ok());
    assert!(parse("%05.2f and %(k)s and %%").is_ok());
    assert!(parse("%q").is_err());
    assert!(parse("%").is_err());
  }

  #[test]
  fn ints() {
    let cf = CFlags::default();
    assert_eq!(render_int(42.0, 0, 0, cf, 10, false, Case::Lower), "42");
    assert_eq!(render_int(-3.5, 0, 0, cf, 10, false, Case::Lower), "-3");
    assert_eq!(render_int(255.0, 0, 0, cf, 16, true, Case::Upper), "0XFF");
    assert_eq!(render_int(8.0, 0, 0, cf, 8, true, Case::Lower), "010");
    assert_eq!(render_int(7.0, 4, 0, cf, 10, false, Case::Lower), "0007");
  }

  #[test]
  fn floats() {
    let cf = CFlags::default();
    assert_eq!(render_float_dec(1.5, 0, cf, false, true, 2), "1.50");
    assert_eq!(render_float_dec(1.5, 0, cf, false, false, 2), "1.5");
    assert_eq!(render_float_sci(1234.0, 0, cf, false, true, Case::Lower, 2), "1.23e+03");
  }
}
