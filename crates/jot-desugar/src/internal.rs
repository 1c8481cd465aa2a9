//! The internal impl.

use crate::error::Kind;
use crate::st::St;
use jot_ast::raw::{self, CompSpec, FieldName, Member, RawBinOp, RawVis};
use jot_ast::{hir, BinOp, Id, Pos, Prim, UnOp, Vis};
use rustc_hash::FxHashSet;
use std::rc::Rc;

pub(crate) fn root(st: &mut St, e: &raw::Expr) -> hir::Expr {
  expr(st, e, false)
}

#[allow(clippy::too_many_lines)]
fn expr(st: &mut St, e: &raw::Expr, in_obj: bool) -> hir::Expr {
  let pos = e.pos;
  let data = match &e.kind {
    raw::ExprKind::Null => hir::ExprData::Prim(Prim::Null),
    raw::ExprKind::True => hir::ExprData::Prim(Prim::Bool(true)),
    raw::ExprKind::False => hir::ExprData::Prim(Prim::Bool(false)),
    raw::ExprKind::Number(n) => hir::ExprData::Prim(Prim::Number(*n)),
    raw::ExprKind::String(s) => hir::ExprData::Prim(Prim::String(s.clone())),
    raw::ExprKind::Id(id) => hir::ExprData::Id(id.clone()),
    raw::ExprKind::SelfKw => {
      if !in_obj {
        st.err(pos, Kind::SelfOutsideObject);
      }
      hir::ExprData::SelfObj
    }
    raw::ExprKind::Dollar => {
      if !in_obj {
        st.err(pos, Kind::DollarOutsideObject);
      }
      hir::ExprData::Id(Id::dollar())
    }
    raw::ExprKind::SuperIndex(idx) => {
      if !in_obj {
        st.err(pos, Kind::SuperOutsideObject);
      }
      let idx = expr(st, idx, in_obj);
      hir::ExprData::SuperIndex { idx }
    }
    raw::ExprKind::InSuper(key) => {
      if !in_obj {
        st.err(pos, Kind::SuperOutsideObject);
      }
      let key = expr(st, key, in_obj);
      hir::ExprData::InSuper { key }
    }
    raw::ExprKind::Array(es) => {
      hir::ExprData::Array(es.iter().map(|e| expr(st, e, in_obj)).collect())
    }
    raw::ExprKind::ArrayComp { elem, specs } => {
      let elem = expr(st, elem, in_obj);
      let innermost = st.expr(hir::ExprData::Array(vec![elem]), pos);
      return comp_chain(st, specs, innermost, in_obj);
    }
    raw::ExprKind::Object { body, comp: None } => return object(st, body, pos, in_obj),
    raw::ExprKind::Object { body, comp: Some(specs) } => {
      return object_comp(st, body, specs, pos, in_obj)
    }
    raw::ExprKind::ObjectApply { target, obj } => {
      let lhs = expr(st, target, in_obj);
      let rhs = expr(st, obj, in_obj);
      hir::ExprData::BinOp { lhs, op: BinOp::Add, rhs }
    }
    raw::ExprKind::Local { binds: raw_binds, body } => {
      let binds = binds(st, raw_binds, in_obj);
      let body = expr(st, body, in_obj);
      hir::ExprData::Local { binds, body }
    }
    raw::ExprKind::If { cond, then, els } => {
      let cond = expr(st, cond, in_obj);
      let yes = expr(st, then, in_obj);
      let no = match els {
        Some(e) => expr(st, e, in_obj),
        None => st.expr(hir::ExprData::Prim(Prim::Null), pos),
      };
      hir::ExprData::If { cond, yes, no }
    }
    raw::ExprKind::Function { params, body } => return function(st, params, body, pos, in_obj),
    raw::ExprKind::Call { target, args, tailstrict } => {
      let target = expr(st, target, in_obj);
      let mut positional = Vec::<hir::Expr>::new();
      let mut named = Vec::<(Id, hir::Expr)>::new();
      let mut names = FxHashSet::<Id>::default();
      for arg in args {
        let value = expr(st, &arg.value, in_obj);
        match &arg.name {
          None => {
            if !named.is_empty() {
              st.err(arg.pos, Kind::PositionalAfterNamed);
            }
            positional.push(value);
          }
          Some(name) => {
            if !names.insert(name.clone()) {
              st.err(arg.pos, Kind::DuplicateNamedArg(name.clone()));
            }
            named.push((name.clone(), value));
          }
        }
      }
      hir::ExprData::Call { target, positional, named, tailstrict: *tailstrict }
    }
    raw::ExprKind::Unary { op, inner } => {
      let inner = expr(st, inner, in_obj);
      hir::ExprData::UnOp { op: *op, inner }
    }
    raw::ExprKind::Binary { lhs, op, rhs } => return binary(st, lhs, *op, rhs, pos, in_obj),
    raw::ExprKind::Index { target, idx } => {
      let on = expr(st, target, in_obj);
      let idx = expr(st, idx, in_obj);
      hir::ExprData::Subscript { on, idx }
    }
    raw::ExprKind::Slice { target, start, end, step } => {
      let target = expr(st, target, in_obj);
      let start = slice_part(st, start.as_deref(), pos, in_obj);
      let end = slice_part(st, end.as_deref(), pos, in_obj);
      let step = slice_part(st, step.as_deref(), pos, in_obj);
      return st.std_call("slice", vec![target, start, end, step], pos);
    }
    raw::ExprKind::Error(inner) => {
      let inner = expr(st, inner, in_obj);
      hir::ExprData::Error(inner)
    }
    raw::ExprKind::Assert { assert, rest } => {
      let rest = expr(st, rest, in_obj);
      return lower_assert(st, assert, rest, in_obj);
    }
    raw::ExprKind::Import { kind, path } => {
      hir::ExprData::Import { kind: *kind, path: path.clone() }
    }
  };
  st.expr(data, pos)
}

/// An absent slice part becomes `null`.
fn slice_part(st: &mut St, part: Option<&raw::Expr>, pos: Pos, in_obj: bool) -> hir::Expr {
  match part {
    Some(e) => expr(st, e, in_obj),
    None => st.expr(hir::ExprData::Prim(Prim::Null), pos),
  }
}

/// `assert cond [: msg]` becomes `if cond then yes else error msg`.
fn lower_assert(st: &mut St, assert: &raw::Assert, yes: hir::Expr, in_obj: bool) -> hir::Expr {
  let cond = expr(st, &assert.cond, in_obj);
  let msg = match &assert.msg {
    Some(m) => expr(st, m, in_obj),
    None => st.str("Assertion failed", assert.pos),
  };
  let no = st.expr(hir::ExprData::Error(msg), assert.pos);
  st.expr(hir::ExprData::If { cond, yes, no }, assert.pos)
}

fn binary(
  st: &mut St,
  lhs: &raw::Expr,
  op: RawBinOp,
  rhs: &raw::Expr,
  pos: Pos,
  in_obj: bool,
) -> hir::Expr {
  let lhs = expr(st, lhs, in_obj);
  let rhs = expr(st, rhs, in_obj);
  let op = match op {
    RawBinOp::In => {
      // e in o  ~~>  std.objectHasEx(o, e, true)
      let hidden = st.expr(hir::ExprData::Prim(Prim::Bool(true)), pos);
      return st.std_call("objectHasEx", vec![rhs, lhs, hidden], pos);
    }
    RawBinOp::NotEq => {
      let eq = st.expr(hir::ExprData::BinOp { lhs, op: BinOp::Eq, rhs }, pos);
      return st.expr(hir::ExprData::UnOp { op: UnOp::LogicalNot, inner: eq }, pos);
    }
    RawBinOp::Mul => BinOp::Mul,
    RawBinOp::Div => BinOp::Div,
    RawBinOp::Mod => BinOp::Mod,
    RawBinOp::Add => BinOp::Add,
    RawBinOp::Sub => BinOp::Sub,
    RawBinOp::Shl => BinOp::Shl,
    RawBinOp::Shr => BinOp::Shr,
    RawBinOp::Lt => BinOp::Lt,
    RawBinOp::LtEq => BinOp::LtEq,
    RawBinOp::Gt => BinOp::Gt,
    RawBinOp::GtEq => BinOp::GtEq,
    RawBinOp::Eq => BinOp::Eq,
    RawBinOp::BitAnd => BinOp::BitAnd,
    RawBinOp::BitXor => BinOp::BitXor,
    RawBinOp::BitOr => BinOp::BitOr,
    RawBinOp::And => BinOp::And,
    RawBinOp::Or => BinOp::Or,
  };
  st.expr(hir::ExprData::BinOp { lhs, op, rhs }, pos)
}

fn function(
  st: &mut St,
  params: &[raw::Param],
  body: &raw::Expr,
  pos: Pos,
  in_obj: bool,
) -> hir::Expr {
  let mut names = FxHashSet::<Id>::default();
  let mut ps = Vec::<(Id, Option<hir::Expr>)>::new();
  for param in params {
    if !names.insert(param.name.clone()) {
      st.err(param.pos, Kind::DuplicateParam(param.name.clone()));
    }
    let default = param.default.as_ref().map(|d| expr(st, d, in_obj));
    ps.push((param.name.clone(), default));
  }
  let body = expr(st, body, in_obj);
  st.expr(hir::ExprData::Function { params: ps, body }, pos)
}

/// `local` binds, with the `f(x) = e` sugar and a duplicate check.
fn binds(st: &mut St, raw_binds: &[raw::Bind], in_obj: bool) -> Vec<(Id, hir::Expr)> {
  let mut names = FxHashSet::<Id>::default();
  let mut ret = Vec::<(Id, hir::Expr)>::new();
  for bind in raw_binds {
    if !names.insert(bind.name.clone()) {
      st.err(bind.pos, Kind::DuplicateBind(bind.name.clone()));
    }
    let value = match &bind.params {
      Some(params) => function(st, params, &bind.value, bind.pos, in_obj),
      None => expr(st, &bind.value, in_obj),
    };
    ret.push((bind.name.clone(), value));
  }
  ret
}

fn object(st: &mut St, body: &raw::ObjectBody, pos: Pos, in_obj: bool) -> hir::Expr {
  let mut obj_binds = Vec::<(Id, hir::Expr)>::new();
  let mut bind_names = FxHashSet::<Id>::default();
  let mut asserts = Vec::<hir::Expr>::new();
  let mut fields = Vec::<hir::ObjField>::new();
  let mut field_names = FxHashSet::<Rc<str>>::default();
  // the outermost object is what `$` refers to
  if !in_obj {
    let slf = st.expr(hir::ExprData::SelfObj, pos);
    obj_binds.push((Id::dollar(), slf));
  }
  for member in &body.members {
    match member {
      Member::Local(bind) => {
        if !bind_names.insert(bind.name.clone()) {
          st.err(bind.pos, Kind::DuplicateBind(bind.name.clone()));
        }
        let value = match &bind.params {
          Some(params) => function(st, params, &bind.value, bind.pos, true),
          None => expr(st, &bind.value, true),
        };
        obj_binds.push((bind.name.clone(), value));
      }
      Member::Assert(assert) => {
        let yes = st.expr(hir::ExprData::Prim(Prim::Bool(true)), assert.pos);
        asserts.push(lower_assert(st, assert, yes, true));
      }
      Member::Field(f) => {
        if let Some(name) = literal_field_name(&f.name) {
          if !field_names.insert(name.clone()) {
            st.err(f.pos, Kind::DuplicateField(name));
          }
        }
        fields.push(field(st, f, in_obj));
      }
    }
  }
  st.expr(hir::ExprData::Object { binds: obj_binds, asserts, fields }, pos)
}

fn literal_field_name(name: &FieldName) -> Option<Rc<str>> {
  match name {
    FieldName::Id(id) => Some(Rc::from(id.as_str())),
    FieldName::String(s) => Some(s.clone()),
    FieldName::Computed(_) => None,
  }
}

fn field(st: &mut St, f: &raw::Field, in_obj: bool) -> hir::ObjField {
  // the name is evaluated in the enclosing scope, not the object's
  let key = field_key(st, &f.name, f.pos, in_obj);
  let vis = match f.vis {
    RawVis::Colon => Vis::Default,
    RawVis::ColonColon => Vis::Hidden,
    RawVis::ColonColonColon => Vis::Visible,
  };
  let mut value = match &f.params {
    Some(params) => function(st, params, &f.value, f.pos, true),
    None => expr(st, &f.value, true),
  };
  // f+: e with no super in e extends the prior layer's value; a body that
  // uses super is taken as extending it manually
  if f.plus && !mentions_super(&f.value) {
    let v = Id::new("$v");
    let key_in = field_key(st, &f.name, f.pos, in_obj);
    let key_sup = field_key(st, &f.name, f.pos, in_obj);
    let cond = st.expr(hir::ExprData::InSuper { key: key_in }, f.pos);
    let sup = st.expr(hir::ExprData::SuperIndex { idx: key_sup }, f.pos);
    let vref = st.expr(hir::ExprData::Id(v.clone()), f.pos);
    let add = st.expr(hir::ExprData::BinOp { lhs: sup, op: BinOp::Add, rhs: vref }, f.pos);
    let vref = st.expr(hir::ExprData::Id(v.clone()), f.pos);
    let iff = st.expr(hir::ExprData::If { cond, yes: add, no: vref }, f.pos);
    value = st.expr(hir::ExprData::Local { binds: vec![(v, value)], body: iff }, f.pos);
  }
  hir::ObjField { key, plus: f.plus, vis, value }
}

fn field_key(st: &mut St, name: &FieldName, pos: Pos, in_obj: bool) -> hir::Expr {
  match name {
    FieldName::Id(id) => st.str(id.as_str(), pos),
    FieldName::String(s) => st.str(s, pos),
    FieldName::Computed(e) => expr(st, e, in_obj),
  }
}

fn object_comp(
  st: &mut St,
  body: &raw::ObjectBody,
  specs: &[CompSpec],
  pos: Pos,
  in_obj: bool,
) -> hir::Expr {
  let mut locals = Vec::<&raw::Bind>::new();
  let mut the_field = None::<&raw::Field>;
  for member in &body.members {
    match member {
      Member::Local(bind) => locals.push(bind),
      Member::Assert(assert) => st.err(assert.pos, Kind::CompAssert),
      Member::Field(f) => {
        if the_field.is_some() {
          st.err(f.pos, Kind::CompFieldCount);
        }
        the_field = Some(f);
      }
    }
  }
  let Some(f) = the_field else {
    st.err(pos, Kind::CompFieldCount);
    return st.expr(hir::ExprData::Prim(Prim::Null), pos);
  };
  if !matches!(f.name, FieldName::Computed(_)) {
    st.err(f.pos, Kind::CompFieldNotComputed);
  }
  if f.params.is_some() {
    st.err(f.pos, Kind::CompFieldParams);
  }
  if f.plus {
    st.err(f.pos, Kind::CompFieldPlus);
  }
  if f.vis != RawVis::Colon {
    st.err(f.pos, Kind::CompFieldHidden);
  }
  let vars: Vec<Id> = specs
    .iter()
    .filter_map(|spec| match spec {
      CompSpec::For { var, .. } => Some(var.clone()),
      CompSpec::If { .. } => None,
    })
    .collect();
  // an array with one tuple of the comprehension variables, wrapped by the
  // spec chain into the array of all tuples
  let ids: Vec<_> = vars.iter().map(|v| st.expr(hir::ExprData::Id(v.clone()), pos)).collect();
  let tuple = st.expr(hir::ExprData::Array(ids), pos);
  let innermost = st.expr(hir::ExprData::Array(vec![tuple]), pos);
  let iter = comp_chain(st, specs, innermost, in_obj);
  let key = field_key(st, &f.name, f.pos, in_obj);
  // object locals and `$` wrap the field value
  let mut value_binds = Vec::<(Id, hir::Expr)>::new();
  if !in_obj {
    let slf = st.expr(hir::ExprData::SelfObj, f.pos);
    value_binds.push((Id::dollar(), slf));
  }
  let mut bind_names = FxHashSet::<Id>::default();
  for bind in locals {
    if !bind_names.insert(bind.name.clone()) {
      st.err(bind.pos, Kind::DuplicateBind(bind.name.clone()));
    }
    let value = match &bind.params {
      Some(params) => function(st, params, &bind.value, bind.pos, true),
      None => expr(st, &bind.value, true),
    };
    value_binds.push((bind.name.clone(), value));
  }
  let mut value = expr(st, &f.value, true);
  if !value_binds.is_empty() {
    value = st.expr(hir::ExprData::Local { binds: value_binds, body: value }, f.pos);
  }
  st.expr(hir::ExprData::ObjectComp { key, value, vars, iter }, pos)
}

/// Folds a `for`/`if` spec chain around `innermost`, producing nested
/// `std.flatMap` calls. Later specs end up inside the functions of earlier
/// ones, which is what lets them refer to earlier variables.
fn comp_chain(st: &mut St, specs: &[CompSpec], innermost: hir::Expr, in_obj: bool) -> hir::Expr {
  let mut acc = innermost;
  for spec in specs.iter().rev() {
    match spec {
      CompSpec::For { pos, var, iter } => {
        let func = st.expr(hir::ExprData::Function { params: vec![(var.clone(), None)], body: acc }, *pos);
        let arr = expr(st, iter, in_obj);
        acc = st.std_call("flatMap", vec![func, arr], *pos);
      }
      CompSpec::If { pos, cond } => {
        let cond = expr(st, cond, in_obj);
        let empty = st.expr(hir::ExprData::Array(Vec::new()), *pos);
        acc = st.expr(hir::ExprData::If { cond, yes: acc, no: empty }, *pos);
      }
    }
  }
  acc
}

/// Whether the expression mentions `super` in its own object context.
/// Stops at nested object literals, whose field bodies rebind `super`, but
/// looks into their computed field names and comprehension specs, which are
/// evaluated in the enclosing scope.
fn mentions_super(e: &raw::Expr) -> bool {
  match &e.kind {
    raw::ExprKind::SuperIndex(_) | raw::ExprKind::InSuper(_) => true,
    raw::ExprKind::Null
    | raw::ExprKind::True
    | raw::ExprKind::False
    | raw::ExprKind::Number(_)
    | raw::ExprKind::String(_)
    | raw::ExprKind::Id(_)
    | raw::ExprKind::SelfKw
    | raw::ExprKind::Dollar
    | raw::ExprKind::Import { .. } => false,
    raw::ExprKind::Array(es) => es.iter().any(mentions_super),
    raw::ExprKind::ArrayComp { elem, specs } => {
      mentions_super(elem) || specs_mention_super(specs)
    }
    raw::ExprKind::Object { body, comp } => {
      let keys = body.members.iter().any(|member| match member {
        Member::Field(f) => match &f.name {
          FieldName::Computed(k) => mentions_super(k),
          FieldName::Id(_) | FieldName::String(_) => false,
        },
        Member::Local(_) | Member::Assert(_) => false,
      });
      keys || comp.as_deref().is_some_and(specs_mention_super)
    }
    raw::ExprKind::ObjectApply { target, obj } => {
      mentions_super(target) || mentions_super(obj)
    }
    raw::ExprKind::Local { binds, body } => {
      binds.iter().any(bind_mentions_super) || mentions_super(body)
    }
    raw::ExprKind::If { cond, then, els } => {
      mentions_super(cond)
        || mentions_super(then)
        || els.as_deref().is_some_and(mentions_super)
    }
    raw::ExprKind::Function { params, body } => {
      params.iter().any(|p| p.default.as_ref().is_some_and(mentions_super))
        || mentions_super(body)
    }
    raw::ExprKind::Call { target, args, .. } => {
      mentions_super(target) || args.iter().any(|a| mentions_super(&a.value))
    }
    raw::ExprKind::Unary { inner, .. } => mentions_super(inner),
    raw::ExprKind::Binary { lhs, rhs, .. } => mentions_super(lhs) || mentions_super(rhs),
    raw::ExprKind::Index { target, idx } => mentions_super(target) || mentions_super(idx),
    raw::ExprKind::Slice { target, start, end, step } => {
      mentions_super(target)
        || start.as_deref().is_some_and(mentions_super)
        || end.as_deref().is_some_and(mentions_super)
        || step.as_deref().is_some_and(mentions_super)
    }
    raw::ExprKind::Error(inner) => mentions_super(inner),
    raw::ExprKind::Assert { assert, rest } => {
      mentions_super(&assert.cond)
        || assert.msg.as_deref().is_some_and(mentions_super)
        || mentions_super(rest)
    }
  }
}

fn specs_mention_super(specs: &[CompSpec]) -> bool {
  specs.iter().any(|spec| match spec {
    CompSpec::For { iter, .. } => mentions_super(iter),
    CompSpec::If { cond, .. } => mentions_super(cond),
  })
}

fn bind_mentions_super(bind: &raw::Bind) -> bool {
  let params = bind.params.as_deref().unwrap_or_default();
  params.iter().any(|p| p.default.as_ref().is_some_and(mentions_super))
    || mentions_super(&bind.value)
}
