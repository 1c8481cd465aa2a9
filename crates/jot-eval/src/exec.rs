//! Executing core expressions to produce values.

use crate::cycle;
use crate::error::{Error, Kind, Loc, Result};
use crate::std_lib;
use crate::val::{
  Array, AssertsState, Env, FieldDef, FieldVal, Fn, Layer, LayerData, Object, RegularFn, Thunk,
  ThunkState, Val,
};
use crate::{File, Loader};
use jot_ast::{hir, BinOp, Id, Number, Prim, UnOp};
use rustc_hash::{FxHashMap, FxHashSet};
use std::cmp::Ordering;
use std::rc::Rc;

/// The evaluator: call-by-need, single-threaded, recursion bounded by
/// `max_stack`.
#[derive(Debug)]
pub struct Interp<'a> {
  loader: &'a mut dyn Loader,
  max_stack: usize,
  depth: usize,
  cur: Loc,
  trace: Vec<Loc>,
  import_cache: FxHashMap<Rc<str>, Val>,
  importing: cycle::Detector<Rc<str>>,
  ext_vars: FxHashMap<Rc<str>, Thunk>,
}

impl<'a> Interp<'a> {
  pub fn new(loader: &'a mut dyn Loader, max_stack: usize) -> Self {
    Self {
      loader,
      max_stack,
      depth: 0,
      cur: Loc { path: Rc::from(""), pos: jot_ast::Pos::start() },
      trace: Vec::new(),
      import_cache: FxHashMap::default(),
      importing: cycle::Detector::default(),
      ext_vars: FxHashMap::default(),
    }
  }

  pub fn set_ext_var(&mut self, name: Rc<str>, thunk: Thunk) {
    self.ext_vars.insert(name, thunk);
  }

  pub(crate) fn ext_var(&self, name: &str) -> Option<Thunk> {
    self.ext_vars.get(name).cloned()
  }

  /// The environment a file's top expression evaluates in: `std` (and the
  /// desugarer's unshadowable `$std`) bound to the std object.
  #[must_use]
  pub fn root_env(&self, file: &Rc<File>) -> Env {
    let std_obj = Val::Object(std_lib::std_obj(file));
    Env::empty().bind_thunks(vec![
      (Id::std(), Thunk::forced(std_obj.clone())),
      (Id::std_unutterable(), Thunk::forced(std_obj)),
    ])
  }

  /// Executes a whole file.
  ///
  /// # Errors
  ///
  /// If execution failed.
  pub fn exec_file(&mut self, file: &Rc<File>) -> Result<Val> {
    let env = self.root_env(file);
    self.exec(file, &env, file.top)
  }

  pub(crate) fn error(&self, kind: Kind) -> Error {
    Error { kind, at: self.cur.clone(), trace: self.trace.clone() }
  }

  pub(crate) fn cur_loc(&self) -> Loc {
    self.cur.clone()
  }

  /// Executes one expression. Checks the stack budget and keeps the current
  /// source location up to date for errors.
  pub fn exec(&mut self, file: &Rc<File>, env: &Env, expr: hir::Expr) -> Result<Val> {
    let loc = Loc { path: file.path.clone(), pos: file.arena.pos(expr) };
    let prev = std::mem::replace(&mut self.cur, loc);
    self.depth += 1;
    let ret = if self.depth > self.max_stack {
      Err(self.error(Kind::StackOverflow { limit: self.max_stack }))
    } else {
      self.exec_inner(file, env, expr)
    };
    self.depth -= 1;
    self.cur = prev;
    ret
  }

  #[allow(clippy::too_many_lines)]
  fn exec_inner(&mut self, file: &Rc<File>, env: &Env, expr: hir::Expr) -> Result<Val> {
    match &file.arena[expr] {
      hir::ExprData::Prim(p) => Ok(Val::Prim(p.clone())),
      hir::ExprData::Id(id) => match env.get(id) {
        Some(thunk) => self.force(&thunk),
        None => Err(self.error(Kind::UnboundId(id.clone()))),
      },
      hir::ExprData::SelfObj => match env.this() {
        Some((obj, _)) => Ok(Val::Object(obj)),
        None => Err(self.error(Kind::SelfOutsideObject)),
      },
      hir::ExprData::SuperIndex { idx } => {
        let Some((obj, layer)) = env.this() else {
          return Err(self.error(Kind::SuperOutsideObject));
        };
        let name = self.force_field_name(file, env, *idx)?;
        self.super_index(&obj, layer, &name)
      }
      hir::ExprData::InSuper { key } => {
        let Some((obj, layer)) = env.this() else {
          return Err(self.error(Kind::SuperOutsideObject));
        };
        let name = self.force_field_name(file, env, *key)?;
        Ok(Val::from(obj.lookup_upto(&name, layer).is_some()))
      }
      hir::ExprData::Array(elems) => {
        let thunks =
          elems.iter().map(|&e| Thunk::new(Rc::clone(file), env.clone(), e)).collect();
        Ok(Val::Array(Array::new(thunks)))
      }
      hir::ExprData::Object { binds, asserts, fields } => {
        let mut layer_fields = Vec::<(Rc<str>, FieldDef)>::new();
        let mut seen = FxHashSet::<Rc<str>>::default();
        for f in fields {
          // field names are strict, and are evaluated outside the object
          match self.exec(file, env, f.key)? {
            Val::Prim(Prim::String(name)) => {
              if !seen.insert(name.clone()) {
                return Err(self.error(Kind::DuplicateField(name)));
              }
              let def = FieldDef {
                vis: f.vis,
                plus: f.plus,
                value: FieldVal::Expr { expr: f.value, comp: None },
              };
              layer_fields.push((name, def));
            }
            // a null name skips the field
            Val::Prim(Prim::Null) => {}
            other => return Err(self.error(Kind::FieldNameNotString(other.type_name()))),
          }
        }
        let layer = Layer(Rc::new(LayerData {
          file: Rc::clone(file),
          env: env.clone(),
          binds: binds.clone(),
          asserts: asserts.clone(),
          fields: layer_fields,
        }));
        Ok(Val::Object(Object::new(vec![layer])))
      }
      hir::ExprData::ObjectComp { key, value, vars, iter } => {
        let tuples = match self.exec(file, env, *iter)? {
          Val::Array(xs) => xs,
          other => {
            return Err(self.error(Kind::Unexpected {
              want: "an array to iterate over",
              got: other.type_name(),
            }))
          }
        };
        let mut layer_fields = Vec::<(Rc<str>, FieldDef)>::new();
        let mut seen = FxHashSet::<Rc<str>>::default();
        for tuple in &tuples {
          let tuple = match self.force(tuple)? {
            Val::Array(xs) => xs,
            other => {
              return Err(self.error(Kind::Unexpected {
                want: "a comprehension tuple",
                got: other.type_name(),
              }))
            }
          };
          let comp: Vec<(Id, Thunk)> = vars
            .iter()
            .zip(&tuple)
            .map(|(var, thunk)| (var.clone(), thunk.clone()))
            .collect();
          let key_env = env.bind_thunks(comp.clone());
          match self.exec(file, &key_env, *key)? {
            Val::Prim(Prim::String(name)) => {
              if !seen.insert(name.clone()) {
                return Err(self.error(Kind::DuplicateField(name)));
              }
              let def = FieldDef {
                vis: jot_ast::Vis::Default,
                plus: false,
                value: FieldVal::Expr { expr: *value, comp: Some(Rc::new(comp)) },
              };
              layer_fields.push((name, def));
            }
            Val::Prim(Prim::Null) => {}
            other => return Err(self.error(Kind::FieldNameNotString(other.type_name()))),
          }
        }
        let layer = Layer(Rc::new(LayerData {
          file: Rc::clone(file),
          env: env.clone(),
          binds: Vec::new(),
          asserts: Vec::new(),
          fields: layer_fields,
        }));
        Ok(Val::Object(Object::new(vec![layer])))
      }
      hir::ExprData::Function { params, body } => {
        Ok(Val::Fn(Fn::Regular(Rc::new(RegularFn {
          file: Rc::clone(file),
          env: env.clone(),
          params: params.clone(),
          body: *body,
        }))))
      }
      hir::ExprData::Call { target, positional, named, tailstrict } => {
        let func = match self.exec(file, env, *target)? {
          Val::Fn(f) => f,
          other => return Err(self.error(Kind::CallNonFn(other.type_name()))),
        };
        let at = Loc { path: file.path.clone(), pos: file.arena.pos(expr) };
        let positional: Vec<Thunk> =
          positional.iter().map(|&a| Thunk::new(Rc::clone(file), env.clone(), a)).collect();
        let named: Vec<(Id, Thunk)> = named
          .iter()
          .map(|&(ref id, a)| (id.clone(), Thunk::new(Rc::clone(file), env.clone(), a)))
          .collect();
        self.call(at, &func, positional, named, *tailstrict)
      }
      hir::ExprData::Local { binds, body } => {
        let env = env.bind_rec(file, binds);
        self.exec(file, &env, *body)
      }
      hir::ExprData::If { cond, yes, no } => {
        let b = match self.exec(file, env, *cond)? {
          Val::Prim(Prim::Bool(b)) => b,
          other => {
            return Err(self.error(Kind::Unexpected {
              want: "a boolean condition",
              got: other.type_name(),
            }))
          }
        };
        self.exec(file, env, if b { *yes } else { *no })
      }
      hir::ExprData::BinOp { lhs, op, rhs } => self.bin_op(file, env, *lhs, *op, *rhs),
      hir::ExprData::UnOp { op, inner } => {
        let inner = self.exec(file, env, *inner)?;
        self.un_op(*op, &inner)
      }
      hir::ExprData::Subscript { on, idx } => {
        let on = self.exec(file, env, *on)?;
        match on {
          Val::Object(obj) => {
            let name = self.force_field_name(file, env, *idx)?;
            self.object_index(&obj, &name)
          }
          Val::Array(arr) => {
            let idx = self.index_of(file, env, *idx)?;
            match arr.get(idx) {
              Some(thunk) => self.force(&thunk.clone()),
              None => Err(self.error(Kind::ArrayIdxOutOfRange { idx, len: arr.len() })),
            }
          }
          Val::Prim(Prim::String(s)) => {
            let idx = self.index_of(file, env, *idx)?;
            match s.chars().nth(idx) {
              Some(c) => Ok(Val::from(Rc::<str>::from(c.to_string()))),
              None => Err(self.error(Kind::StringIdxOutOfRange {
                idx,
                len: s.chars().count(),
              })),
            }
          }
          other => Err(self.error(Kind::Unexpected {
            want: "an object, array, or string to index into",
            got: other.type_name(),
          })),
        }
      }
      hir::ExprData::Error(inner) => {
        let val = self.exec(file, env, *inner)?;
        let msg = self.to_display_string(&val)?;
        Err(self.error(Kind::User(msg)))
      }
      hir::ExprData::Import { kind, path } => self.import(file, *kind, path),
    }
  }

  /// Forces a thunk, memoizing the result. A thunk that is already being
  /// forced depends on itself.
  pub fn force(&mut self, thunk: &Thunk) -> Result<Val> {
    {
      let st = thunk.0.borrow();
      match &*st {
        ThunkState::Forced(v) => return Ok(v.clone()),
        ThunkState::Failed(e) => return Err(e.clone()),
        ThunkState::Forcing => return Err(self.error(Kind::InfiniteRecursion)),
        ThunkState::Unforced { .. } | ThunkState::Apply { .. } => {}
      }
    }
    let prev = thunk.0.replace(ThunkState::Forcing);
    let ret = match prev {
      ThunkState::Unforced { file, env, expr } => self.exec(&file, &env, expr),
      ThunkState::Apply { func, positional } => {
        self.call(self.cur.clone(), &func, positional, Vec::new(), false)
      }
      ThunkState::Forcing | ThunkState::Forced(_) | ThunkState::Failed(_) => {
        unreachable!("checked above")
      }
    };
    match &ret {
      Ok(v) => drop(thunk.0.replace(ThunkState::Forced(v.clone()))),
      Err(e) => drop(thunk.0.replace(ThunkState::Failed(e.clone()))),
    }
    ret
  }

  /// Calls a function. `at` is the call site, for the trace.
  pub fn call(
    &mut self,
    at: Loc,
    func: &Fn,
    positional: Vec<Thunk>,
    named: Vec<(Id, Thunk)>,
    tailstrict: bool,
  ) -> Result<Val> {
    self.trace.push(at);
    let ret = self.call_inner(func, positional, named, tailstrict);
    self.trace.pop();
    ret
  }

  fn call_inner(
    &mut self,
    func: &Fn,
    positional: Vec<Thunk>,
    named: Vec<(Id, Thunk)>,
    tailstrict: bool,
  ) -> Result<Val> {
    match func {
      Fn::Regular(f) => {
        if positional.len() + named.len() > f.params.len() {
          return Err(self.error(Kind::TooManyArgs {
            params: f.params.len(),
            got: positional.len() + named.len(),
          }));
        }
        let mut provided = FxHashMap::<Id, Thunk>::default();
        for ((id, _), arg) in f.params.iter().zip(positional) {
          provided.insert(id.clone(), arg);
        }
        for (id, arg) in named {
          if !f.params.iter().any(|(p, _)| *p == id) {
            return Err(self.error(Kind::NoSuchParam(id)));
          }
          if provided.insert(id.clone(), arg).is_some() {
            return Err(self.error(Kind::DuplicateArg(id)));
          }
        }
        // missing required parameters error at the call site, even if the
        // body would never use them
        for (id, default) in &f.params {
          if default.is_none() && !provided.contains_key(id) {
            return Err(self.error(Kind::ParamNotBound(id.clone())));
          }
        }
        if tailstrict {
          // parameter order, so that a multi-argument failure is
          // deterministic
          for (id, _) in &f.params {
            let Some(thunk) = provided.get(id) else { continue };
            let thunk = thunk.clone();
            self.force(&thunk)?;
          }
        }
        let env = f.env.bind_params(&f.file, provided, &f.params);
        self.exec(&f.file, &env, f.body)
      }
      Fn::Native(n) => {
        let args = self.bind_native_args(*n, positional, named)?;
        self.call_native(*n, &args)
      }
    }
  }

  fn bind_native_args(
    &mut self,
    n: std_lib::Native,
    positional: Vec<Thunk>,
    named: Vec<(Id, Thunk)>,
  ) -> Result<Vec<Option<Thunk>>> {
    let params = n.params();
    if positional.len() + named.len() > params.len() {
      return Err(self.error(Kind::StdArity {
        func: n.name(),
        want: params.len(),
        got: positional.len() + named.len(),
      }));
    }
    let mut args: Vec<Option<Thunk>> = vec![None; params.len()];
    for (slot, arg) in args.iter_mut().zip(positional) {
      *slot = Some(arg);
    }
    for (id, arg) in named {
      let Some(idx) = params.iter().position(|&p| p == id.as_str()) else {
        return Err(self.error(Kind::NoSuchParam(id)));
      };
      if args[idx].replace(arg).is_some() {
        return Err(self.error(Kind::DuplicateArg(id)));
      }
    }
    for (idx, slot) in args.iter().enumerate() {
      if idx < n.required() && slot.is_none() {
        return Err(self.error(Kind::ParamNotBound(Id::new(params[idx]))));
      }
    }
    Ok(args)
  }

  fn bin_op(
    &mut self,
    file: &Rc<File>,
    env: &Env,
    lhs: hir::Expr,
    op: BinOp,
    rhs: hir::Expr,
  ) -> Result<Val> {
    match op {
      // short-circuiting
      BinOp::And | BinOp::Or => {
        let l = self.bool_of(file, env, lhs, op)?;
        if (op == BinOp::And && !l) || (op == BinOp::Or && l) {
          return Ok(Val::from(l));
        }
        let r = self.bool_of(file, env, rhs, op)?;
        Ok(Val::from(r))
      }
      BinOp::Add => {
        let lhs = self.exec(file, env, lhs)?;
        let rhs = self.exec(file, env, rhs)?;
        self.add_vals(&lhs, &rhs)
      }
      BinOp::Sub => self.float_op(file, env, lhs, op, rhs, std::ops::Sub::sub),
      BinOp::Mul => self.float_op(file, env, lhs, op, rhs, std::ops::Mul::mul),
      BinOp::Div => {
        let [l, r] = self.number_pair(file, env, lhs, op, rhs)?;
        if r.to_f64() == 0.0 {
          return Err(self.error(Kind::DivideByZero));
        }
        self.finite(l.to_f64() / r.to_f64())
      }
      BinOp::Mod => {
        let l = self.exec(file, env, lhs)?;
        let r = self.exec(file, env, rhs)?;
        self.mod_vals(&l, &r)
      }
      BinOp::Shl => self.int_op(file, env, lhs, op, rhs),
      BinOp::Shr => self.int_op(file, env, lhs, op, rhs),
      BinOp::BitAnd => self.int_op(file, env, lhs, op, rhs),
      BinOp::BitXor => self.int_op(file, env, lhs, op, rhs),
      BinOp::BitOr => self.int_op(file, env, lhs, op, rhs),
      BinOp::Lt | BinOp::LtEq | BinOp::Gt | BinOp::GtEq => {
        let l = self.exec(file, env, lhs)?;
        let r = self.exec(file, env, rhs)?;
        let ord = self.cmp_val(&l, &r)?;
        let b = match op {
          BinOp::Lt => ord.is_lt(),
          BinOp::LtEq => ord.is_le(),
          BinOp::Gt => ord.is_gt(),
          _ => ord.is_ge(),
        };
        Ok(Val::from(b))
      }
      BinOp::Eq => {
        let l = self.exec(file, env, lhs)?;
        let r = self.exec(file, env, rhs)?;
        let b = self.eq_val(&l, &r)?;
        Ok(Val::from(b))
      }
    }
  }

  /// `%`: arithmetic remainder on numbers, `std.format` when the left side
  /// is a string.
  pub(crate) fn mod_vals(&mut self, lhs: &Val, rhs: &Val) -> Result<Val> {
    match (lhs, rhs) {
      (Val::Prim(Prim::Number(l)), Val::Prim(Prim::Number(r))) => {
        if r.to_f64() == 0.0 {
          return Err(self.error(Kind::DivideByZero));
        }
        self.finite(l.to_f64() % r.to_f64())
      }
      (Val::Prim(Prim::String(fmt)), _) => {
        let ret = self.format(fmt, rhs)?;
        Ok(Val::from(ret))
      }
      _ => Err(self.error(Kind::IncompatibleTypes {
        op: "%",
        lhs: lhs.type_name(),
        rhs: rhs.type_name(),
      })),
    }
  }

  pub(crate) fn add_vals(&mut self, lhs: &Val, rhs: &Val) -> Result<Val> {
    match (lhs, rhs) {
      (Val::Prim(Prim::String(l)), _) => {
        let r = self.to_display_string(rhs)?;
        Ok(Val::from(Rc::<str>::from(format!("{l}{r}"))))
      }
      (_, Val::Prim(Prim::String(r))) => {
        let l = self.to_display_string(lhs)?;
        Ok(Val::from(Rc::<str>::from(format!("{l}{r}"))))
      }
      (Val::Prim(Prim::Number(l)), Val::Prim(Prim::Number(r))) => {
        self.finite(l.to_f64() + r.to_f64())
      }
      (Val::Array(l), Val::Array(r)) => Ok(Val::Array(l.concat(r))),
      (Val::Object(l), Val::Object(r)) => Ok(Val::Object(Object::merge(l, r))),
      _ => Err(self.error(Kind::IncompatibleTypes {
        op: "+",
        lhs: lhs.type_name(),
        rhs: rhs.type_name(),
      })),
    }
  }

  fn un_op(&mut self, op: UnOp, inner: &Val) -> Result<Val> {
    match (op, inner) {
      (UnOp::Neg, Val::Prim(Prim::Number(n))) => Ok(Val::from(-*n)),
      (UnOp::Pos, Val::Prim(Prim::Number(n))) => Ok(Val::from(*n)),
      (UnOp::LogicalNot, Val::Prim(Prim::Bool(b))) => Ok(Val::from(!b)),
      (UnOp::BitNot, Val::Prim(Prim::Number(n))) => {
        let Some(n) = n.to_i64() else { return Err(self.error(Kind::NotAnInteger)) };
        #[allow(clippy::cast_precision_loss)]
        self.finite(!n as f64)
      }
      _ => Err(self.error(Kind::UnaryIncompatible {
        op: op.as_str(),
        got: inner.type_name(),
      })),
    }
  }

  fn bool_of(&mut self, file: &Rc<File>, env: &Env, e: hir::Expr, op: BinOp) -> Result<bool> {
    let v = self.exec(file, env, e)?;
    match v {
      Val::Prim(Prim::Bool(b)) => Ok(b),
      _ => Err(self.error(Kind::IncompatibleTypes {
        op: op.as_str(),
        lhs: v.type_name(),
        rhs: "boolean",
      })),
    }
  }

  fn number_pair(
    &mut self,
    file: &Rc<File>,
    env: &Env,
    lhs: hir::Expr,
    op: BinOp,
    rhs: hir::Expr,
  ) -> Result<[Number; 2]> {
    let l = self.exec(file, env, lhs)?;
    let r = self.exec(file, env, rhs)?;
    match (&l, &r) {
      (Val::Prim(Prim::Number(l)), Val::Prim(Prim::Number(r))) => Ok([*l, *r]),
      _ => Err(self.error(Kind::IncompatibleTypes {
        op: op.as_str(),
        lhs: l.type_name(),
        rhs: r.type_name(),
      })),
    }
  }

  fn float_op<F>(
    &mut self,
    file: &Rc<File>,
    env: &Env,
    lhs: hir::Expr,
    op: BinOp,
    rhs: hir::Expr,
    f: F,
  ) -> Result<Val>
  where
    F: FnOnce(f64, f64) -> f64,
  {
    let [l, r] = self.number_pair(file, env, lhs, op, rhs)?;
    self.finite(f(l.to_f64(), r.to_f64()))
  }

  /// The bitwise operators work on numbers converted to 64-bit signed
  /// integers; fractional or out-of-range inputs error.
  fn int_op(
    &mut self,
    file: &Rc<File>,
    env: &Env,
    lhs: hir::Expr,
    op: BinOp,
    rhs: hir::Expr,
  ) -> Result<Val> {
    let [l, r] = self.number_pair(file, env, lhs, op, rhs)?;
    let Some(l) = l.to_i64() else { return Err(self.error(Kind::NotAnInteger)) };
    let Some(r) = r.to_i64() else { return Err(self.error(Kind::NotAnInteger)) };
    let n = match op {
      BinOp::Shl | BinOp::Shr => {
        if r < 0 {
          return Err(self.error(Kind::NegativeShift));
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let shift = (r % 64) as u32;
        if op == BinOp::Shl {
          l.wrapping_shl(shift)
        } else {
          l.wrapping_shr(shift)
        }
      }
      BinOp::BitAnd => l & r,
      BinOp::BitXor => l ^ r,
      BinOp::BitOr => l | r,
      _ => unreachable!("int_op is only for bitwise ops"),
    };
    #[allow(clippy::cast_precision_loss)]
    self.finite(n as f64)
  }

  pub(crate) fn finite(&self, n: f64) -> Result<Val> {
    match Number::new(n) {
      Ok(n) => Ok(Val::from(n)),
      Err(inf) => Err(self.error(Kind::NotFinite(inf))),
    }
  }

  /// Structural equality. Hidden fields are ignored; comparing functions is
  /// an error; values of different types are unequal.
  pub(crate) fn eq_val(&mut self, lhs: &Val, rhs: &Val) -> Result<bool> {
    match (lhs, rhs) {
      (Val::Fn(_), _) | (_, Val::Fn(_)) => Err(self.error(Kind::CmpFn)),
      (Val::Prim(l), Val::Prim(r)) => Ok(l == r),
      (Val::Array(l), Val::Array(r)) => {
        if l.len() != r.len() {
          return Ok(false);
        }
        for (l, r) in l.iter().zip(r.iter()) {
          let (l, r) = (l.clone(), r.clone());
          let l = self.force(&l)?;
          let r = self.force(&r)?;
          if !self.eq_val(&l, &r)? {
            return Ok(false);
          }
        }
        Ok(true)
      }
      (Val::Object(l), Val::Object(r)) => {
        let mut l_names = l.visible_field_names();
        let mut r_names = r.visible_field_names();
        l_names.sort_unstable();
        r_names.sort_unstable();
        if l_names != r_names {
          return Ok(false);
        }
        for name in &l_names {
          let lv = self.object_index(l, name)?;
          let rv = self.object_index(r, name)?;
          if !self.eq_val(&lv, &rv)? {
            return Ok(false);
          }
        }
        Ok(true)
      }
      _ => Ok(false),
    }
  }

  /// Ordering, defined on numbers, strings (by code point), and arrays
  /// (element-wise).
  pub(crate) fn cmp_val(&mut self, lhs: &Val, rhs: &Val) -> Result<Ordering> {
    match (lhs, rhs) {
      (Val::Prim(Prim::Number(l)), Val::Prim(Prim::Number(r))) => Ok(l.cmp(r)),
      (Val::Prim(Prim::String(l)), Val::Prim(Prim::String(r))) => Ok(l.cmp(r)),
      (Val::Array(l), Val::Array(r)) => {
        let mut l_iter = l.iter();
        let mut r_iter = r.iter();
        loop {
          match (l_iter.next(), r_iter.next()) {
            (None, None) => return Ok(Ordering::Equal),
            (None, Some(_)) => return Ok(Ordering::Less),
            (Some(_), None) => return Ok(Ordering::Greater),
            (Some(l), Some(r)) => {
              let (l, r) = (l.clone(), r.clone());
              let l = self.force(&l)?;
              let r = self.force(&r)?;
              match self.cmp_val(&l, &r)? {
                Ordering::Equal => {}
                ord => return Ok(ord),
              }
            }
          }
        }
      }
      _ => Err(self.error(Kind::CmpIncompatible {
        lhs: lhs.type_name(),
        rhs: rhs.type_name(),
      })),
    }
  }

  fn force_field_name(&mut self, file: &Rc<File>, env: &Env, idx: hir::Expr) -> Result<Rc<str>> {
    let v = self.exec(file, env, idx)?;
    match v {
      Val::Prim(Prim::String(s)) => Ok(s),
      _ => Err(self.error(Kind::Unexpected { want: "a string field name", got: v.type_name() })),
    }
  }

  fn index_of(&mut self, file: &Rc<File>, env: &Env, idx: hir::Expr) -> Result<usize> {
    let n = match self.exec(file, env, idx)? {
      Val::Prim(Prim::Number(n)) => n,
      other => {
        return Err(self.error(Kind::Unexpected { want: "a number index", got: other.type_name() }))
      }
    };
    n.to_index().ok_or_else(|| self.error(Kind::IdxNotInteger))
  }

  /// `obj[name]`: asserts first, then the topmost definition.
  pub(crate) fn object_index(&mut self, obj: &Object, name: &Rc<str>) -> Result<Val> {
    self.check_asserts(obj)?;
    let Some((layer, def)) = obj.lookup(name) else {
      return Err(self.error(Kind::NoSuchField(name.clone())));
    };
    self.field_value(obj, layer, name, &def)
  }

  /// `super[name]` from a member of the given layer.
  fn super_index(&mut self, obj: &Object, upto: usize, name: &Rc<str>) -> Result<Val> {
    self.check_asserts(obj)?;
    let Some((layer, def)) = obj.lookup_upto(name, upto) else {
      return Err(self.error(Kind::NoSuchField(name.clone())));
    };
    self.field_value(obj, layer, name, &def)
  }

  /// Forces one field definition, memoized per (object, defining layer).
  pub(crate) fn field_value(
    &mut self,
    obj: &Object,
    layer: usize,
    name: &Rc<str>,
    def: &FieldDef,
  ) -> Result<Val> {
    if let Some(thunk) = obj.cached(layer, name) {
      return self.force(&thunk);
    }
    let thunk = match &def.value {
      FieldVal::Ready(thunk) => thunk.clone(),
      FieldVal::Expr { expr, comp } => {
        let layer_data = obj.layers()[layer].clone();
        let env = self.layer_env(obj, layer, &layer_data);
        let env = match comp {
          Some(binds) => env.bind_thunks((**binds).clone()),
          None => env,
        };
        Thunk::new(Rc::clone(&layer_data.0.file), env, *expr)
      }
    };
    obj.cache_put(layer, name.clone(), thunk.clone());
    self.force(&thunk)
  }

  /// The environment of a layer's members in this object: the layer's
  /// captured environment, `self` bound to the combined object, and the
  /// object locals. Cached per (object, layer).
  fn layer_env(&mut self, obj: &Object, layer_idx: usize, layer: &Layer) -> Env {
    if let Some(env) = obj.cached_locals(layer_idx) {
      return env;
    }
    let env = layer.0.env.enter_object(obj, layer_idx);
    let env = env.bind_rec(&layer.0.file, &layer.0.binds);
    obj.cache_locals(layer_idx, env.clone());
    env
  }

  /// Runs the asserts of every layer, once per object. While they run,
  /// field access does not re-trigger them, so asserts may read `self`.
  pub(crate) fn check_asserts(&mut self, obj: &Object) -> Result<()> {
    match obj.asserts_state() {
      AssertsState::Checked | AssertsState::Checking => return Ok(()),
      AssertsState::NotChecked => {}
    }
    if obj.layers().iter().all(|layer| layer.0.asserts.is_empty()) {
      obj.set_asserts_state(AssertsState::Checked);
      return Ok(());
    }
    obj.set_asserts_state(AssertsState::Checking);
    let layers: Vec<Layer> = obj.layers().to_vec();
    for (idx, layer) in layers.iter().enumerate() {
      let env = self.layer_env(obj, idx, layer);
      for &assert in &layer.0.asserts {
        if let Err(e) = self.exec(&layer.0.file, &env, assert) {
          obj.set_asserts_state(AssertsState::NotChecked);
          return Err(e);
        }
      }
    }
    obj.set_asserts_state(AssertsState::Checked);
    Ok(())
  }

  /// A string for the value: strings are themselves, everything else is its
  /// manifested JSON text.
  pub fn to_display_string(&mut self, val: &Val) -> Result<Rc<str>> {
    if let Val::Prim(Prim::String(s)) = val {
      return Ok(s.clone());
    }
    let json = self.manifest(val)?;
    Ok(Rc::from(json.to_string()))
  }

  fn import(
    &mut self,
    importer: &Rc<File>,
    kind: jot_ast::ImportKind,
    path: &Rc<str>,
  ) -> Result<Val> {
    match kind {
      jot_ast::ImportKind::Code => {
        let file = match self.loader.load_code(importer, path) {
          Ok(file) => file,
          Err(msg) => return Err(self.error(Kind::Import { path: path.clone(), msg })),
        };
        if let Some(v) = self.import_cache.get(&file.path) {
          return Ok(v.clone());
        }
        if let Err(chain) = self.importing.push(file.path.clone()) {
          return Err(self.error(Kind::ImportCycle { chain }));
        }
        self.trace.push(self.cur.clone());
        let ret = self.exec_file(&file);
        self.trace.pop();
        self.importing.pop();
        let v = ret?;
        self.import_cache.insert(file.path.clone(), v.clone());
        Ok(v)
      }
      jot_ast::ImportKind::String => match self.loader.load_str(importer, path) {
        Ok(s) => Ok(Val::from(s)),
        Err(msg) => Err(self.error(Kind::Import { path: path.clone(), msg })),
      },
      jot_ast::ImportKind::Binary => match self.loader.load_bin(importer, path) {
        Ok(bytes) => {
          let thunks = bytes.iter().map(|&b| Thunk::forced(Number::from(b))).collect();
          Ok(Val::Array(Array::new(thunks)))
        }
        Err(msg) => Err(self.error(Kind::Import { path: path.clone(), msg })),
      },
    }
  }
}
