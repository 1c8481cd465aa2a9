//! Jsonnet values: lazy arrays, layered objects, closures, and the thunks
//! that tie them together.

use always::always;
use crate::error::Error;
use crate::std_lib::Native;
use crate::File;
use jot_ast::{hir, Id, Number, Prim, Vis};
use rustc_hash::{FxHashMap, FxHashSet};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// A Jsonnet value.
///
/// Arrays and objects are lazy: they hold thunks, not values. Evaluating an
/// array or object literal is cheap; the work happens when elements or
/// fields are forced.
#[derive(Debug, Clone)]
pub enum Val {
  Prim(Prim),
  Object(Object),
  Array(Array),
  Fn(Fn),
}

impl Val {
  /// The `std.type` name of this value.
  #[must_use]
  pub fn type_name(&self) -> &'static str {
    match self {
      Val::Prim(p) => p.type_name(),
      Val::Object(_) => "object",
      Val::Array(_) => "array",
      Val::Fn(_) => "function",
    }
  }
}

impl From<bool> for Val {
  fn from(b: bool) -> Self {
    Val::Prim(Prim::Bool(b))
  }
}

impl From<Number> for Val {
  fn from(n: Number) -> Self {
    Val::Prim(Prim::Number(n))
  }
}

impl From<Rc<str>> for Val {
  fn from(s: Rc<str>) -> Self {
    Val::Prim(Prim::String(s))
  }
}

impl From<Array> for Val {
  fn from(xs: Array) -> Self {
    Val::Array(xs)
  }
}

impl From<Object> for Val {
  fn from(obj: Object) -> Self {
    Val::Object(obj)
  }
}

/// A deferred computation with single-shot memoization.
///
/// unforced → forcing → forced or failed. Observing `forcing` again while
/// forcing means the computation depends on itself.
#[derive(Debug, Clone)]
pub struct Thunk(pub(crate) Rc<RefCell<ThunkState>>);

#[derive(Debug)]
pub(crate) enum ThunkState {
  Unforced { file: Rc<File>, env: Env, expr: hir::Expr },
  /// A pending function application, used by natives like `std.map` to
  /// keep their results lazy.
  Apply { func: Fn, positional: Vec<Thunk> },
  Forcing,
  Forced(Val),
  Failed(Error),
}

impl Thunk {
  #[must_use]
  pub fn new(file: Rc<File>, env: Env, expr: hir::Expr) -> Self {
    Self(Rc::new(RefCell::new(ThunkState::Unforced { file, env, expr })))
  }

  /// A thunk that is already a value.
  #[must_use]
  pub fn forced<V: Into<Val>>(val: V) -> Self {
    Self(Rc::new(RefCell::new(ThunkState::Forced(val.into()))))
  }

  #[must_use]
  pub(crate) fn apply(func: Fn, positional: Vec<Thunk>) -> Self {
    Self(Rc::new(RefCell::new(ThunkState::Apply { func, positional })))
  }
}

/// An environment: an immutable chain of frames. Extension makes a new
/// frame; closures keep a pointer into the chain.
#[derive(Debug, Clone, Default)]
pub struct Env(Option<Rc<Frame>>);

#[derive(Debug)]
enum Frame {
  /// Name bindings. The map is only mutated while the frame is built, so
  /// that mutually recursive binds can close over their own frame.
  Binds { parent: Env, binds: RefCell<FxHashMap<Id, Thunk>> },
  /// The distinguished `self`/`super` slots: the object, and the layer the
  /// currently evaluated member lives in.
  Object { parent: Env, this: Object, layer: usize },
}

impl Env {
  #[must_use]
  pub fn empty() -> Self {
    Self(None)
  }

  /// Binds already-evaluated thunks, e.g. call arguments.
  #[must_use]
  pub fn bind_thunks(&self, binds: Vec<(Id, Thunk)>) -> Self {
    if binds.is_empty() {
      return self.clone();
    }
    let map: FxHashMap<Id, Thunk> = binds.into_iter().collect();
    Self(Some(Rc::new(Frame::Binds { parent: self.clone(), binds: RefCell::new(map) })))
  }

  /// Binds expressions that may refer to each other and to themselves, as
  /// `local` does. The thunks close over the extended environment.
  #[must_use]
  pub fn bind_rec(&self, file: &Rc<File>, binds: &[(Id, hir::Expr)]) -> Self {
    if binds.is_empty() {
      return self.clone();
    }
    let frame =
      Rc::new(Frame::Binds { parent: self.clone(), binds: RefCell::new(FxHashMap::default()) });
    let env = Self(Some(Rc::clone(&frame)));
    let Frame::Binds { binds: map, .. } = &*frame else { unreachable!("just made Binds") };
    let mut map = map.borrow_mut();
    for &(ref id, expr) in binds {
      map.insert(id.clone(), Thunk::new(Rc::clone(file), env.clone(), expr));
    }
    drop(map);
    env
  }

  /// Binds function parameters: provided arguments plus defaults, where the
  /// defaults close over the extended environment and so may refer to other
  /// parameters.
  #[must_use]
  pub fn bind_params(
    &self,
    file: &Rc<File>,
    provided: FxHashMap<Id, Thunk>,
    params: &[(Id, Option<hir::Expr>)],
  ) -> Self {
    let frame =
      Rc::new(Frame::Binds { parent: self.clone(), binds: RefCell::new(FxHashMap::default()) });
    let env = Self(Some(Rc::clone(&frame)));
    let Frame::Binds { binds: map, .. } = &*frame else { unreachable!("just made Binds") };
    let mut map = map.borrow_mut();
    for &(ref id, default) in params {
      let thunk = match provided.get(id) {
        Some(t) => t.clone(),
        None => {
          let Some(default) = default else { continue };
          Thunk::new(Rc::clone(file), env.clone(), default)
        }
      };
      map.insert(id.clone(), thunk);
    }
    drop(map);
    env
  }

  /// Enters an object member: binds `self` and `super`.
  #[must_use]
  pub fn enter_object(&self, this: &Object, layer: usize) -> Self {
    Self(Some(Rc::new(Frame::Object { parent: self.clone(), this: this.clone(), layer })))
  }

  #[must_use]
  pub fn get(&self, id: &Id) -> Option<Thunk> {
    let mut cur = &self.0;
    while let Some(frame) = cur {
      match &**frame {
        Frame::Binds { parent, binds } => {
          if let Some(t) = binds.borrow().get(id) {
            return Some(t.clone());
          }
          cur = &parent.0;
        }
        Frame::Object { parent, .. } => cur = &parent.0,
      }
    }
    None
  }

  /// What `self` refers to here: the nearest object frame.
  #[must_use]
  pub fn this(&self) -> Option<(Object, usize)> {
    let mut cur = &self.0;
    while let Some(frame) = cur {
      match &**frame {
        Frame::Binds { parent, .. } => cur = &parent.0,
        Frame::Object { this, layer, .. } => return Some((this.clone(), *layer)),
      }
    }
    None
  }
}

/// A lazy object: a chain of layers from `+`, leftmost first.
///
/// Forced field values are memoized per combined object, keyed by the
/// defining layer and the field name, so `self.f` and `super.f` share work
/// when they resolve to the same definition.
#[derive(Debug, Clone)]
pub struct Object(Rc<ObjData>);

#[derive(Debug)]
pub(crate) struct ObjData {
  layers: Vec<Layer>,
  cache: RefCell<FxHashMap<(usize, Rc<str>), Thunk>>,
  locals: RefCell<FxHashMap<usize, Env>>,
  asserts: Cell<AssertsState>,
}

/// Guards against object asserts that read fields of `self`: while the
/// asserts run, field access does not re-run them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AssertsState {
  NotChecked,
  Checking,
  Checked,
}

impl Object {
  #[must_use]
  pub(crate) fn new(layers: Vec<Layer>) -> Self {
    always!(!layers.is_empty(), "an object should have at least one layer");
    Self(Rc::new(ObjData {
      layers,
      cache: RefCell::new(FxHashMap::default()),
      locals: RefCell::new(FxHashMap::default()),
      asserts: Cell::new(AssertsState::NotChecked),
    }))
  }

  /// `lhs + rhs`: layer concatenation. Memoization starts fresh because
  /// `self` now means the combined object.
  #[must_use]
  pub fn merge(lhs: &Object, rhs: &Object) -> Self {
    let mut layers = lhs.0.layers.clone();
    layers.extend(rhs.0.layers.iter().cloned());
    Self::new(layers)
  }

  pub(crate) fn layers(&self) -> &[Layer] {
    &self.0.layers
  }

  /// The topmost definition of a field, with its defining layer index.
  pub(crate) fn lookup(&self, name: &str) -> Option<(usize, FieldDef)> {
    self.lookup_upto(name, self.0.layers.len())
  }

  /// Like [`lookup`], but only below the given layer. This is `super`
  /// lookup when `upto` is the layer of the currently evaluated member.
  pub(crate) fn lookup_upto(&self, name: &str, upto: usize) -> Option<(usize, FieldDef)> {
    let layers = &self.0.layers[..upto];
    layers
      .iter()
      .enumerate()
      .rev()
      .find_map(|(idx, layer)| Some((idx, layer.get(name)?.clone())))
  }

  /// Field names in manifestation order: the order in which they are first
  /// introduced, leftmost layer first.
  #[must_use]
  pub fn field_names(&self) -> Vec<Rc<str>> {
    let mut seen = FxHashSet::<Rc<str>>::default();
    let mut ret = Vec::<Rc<str>>::new();
    for layer in &self.0.layers {
      for (name, _) in &layer.0.fields {
        if seen.insert(name.clone()) {
          ret.push(name.clone());
        }
      }
    }
    ret
  }

  /// The effective visibility of a field across the layer chain.
  #[must_use]
  pub fn visibility(&self, name: &str) -> Option<Vis> {
    let mut cur = None::<Vis>;
    for layer in &self.0.layers {
      let Some(def) = layer.get(name) else { continue };
      cur = Some(match def.vis {
        Vis::Hidden => Vis::Hidden,
        Vis::Visible => Vis::Visible,
        // a plain `:` shows the field, except that an additive override
        // of a hidden field keeps it hidden
        Vis::Default => {
          if def.plus && cur == Some(Vis::Hidden) {
            Vis::Hidden
          } else {
            Vis::Visible
          }
        }
      });
    }
    cur
  }

  #[must_use]
  pub fn has_field(&self, name: &str, include_hidden: bool) -> bool {
    match self.visibility(name) {
      None => false,
      Some(Vis::Hidden) => include_hidden,
      Some(Vis::Default | Vis::Visible) => true,
    }
  }

  /// Field names in manifestation order, hidden ones skipped.
  #[must_use]
  pub fn visible_field_names(&self) -> Vec<Rc<str>> {
    let mut ret = self.field_names();
    ret.retain(|name| self.visibility(name) != Some(Vis::Hidden));
    ret
  }

  pub(crate) fn cached(&self, layer: usize, name: &Rc<str>) -> Option<Thunk> {
    self.0.cache.borrow().get(&(layer, name.clone())).cloned()
  }

  pub(crate) fn cache_put(&self, layer: usize, name: Rc<str>, thunk: Thunk) {
    self.0.cache.borrow_mut().insert((layer, name), thunk);
  }

  pub(crate) fn cached_locals(&self, layer: usize) -> Option<Env> {
    self.0.locals.borrow().get(&layer).cloned()
  }

  pub(crate) fn cache_locals(&self, layer: usize, env: Env) {
    self.0.locals.borrow_mut().insert(layer, env);
  }

  pub(crate) fn asserts_state(&self) -> AssertsState {
    self.0.asserts.get()
  }

  pub(crate) fn set_asserts_state(&self, state: AssertsState) {
    self.0.asserts.set(state);
  }
}

/// One layer of an object: the fields and asserts of a single object
/// literal, with the environment it was evaluated in.
#[derive(Debug, Clone)]
pub(crate) struct Layer(pub(crate) Rc<LayerData>);

impl Layer {
  pub(crate) fn get(&self, name: &str) -> Option<&FieldDef> {
    self.0.fields.iter().find_map(|(n, def)| (n.as_ref() == name).then_some(def))
  }
}

#[derive(Debug)]
pub(crate) struct LayerData {
  pub(crate) file: Rc<File>,
  pub(crate) env: Env,
  /// Object locals, mutually recursive, able to see `self`.
  pub(crate) binds: Vec<(Id, hir::Expr)>,
  /// Each lowered to an expression that errors unless it holds.
  pub(crate) asserts: Vec<hir::Expr>,
  /// Ordered; names are unique within one layer.
  pub(crate) fields: Vec<(Rc<str>, FieldDef)>,
}

#[derive(Debug, Clone)]
pub(crate) struct FieldDef {
  pub(crate) vis: Vis,
  pub(crate) plus: bool,
  pub(crate) value: FieldVal,
}

#[derive(Debug, Clone)]
pub(crate) enum FieldVal {
  /// A field from source, with the extra per-field bindings of an object
  /// comprehension.
  Expr { expr: hir::Expr, comp: Option<Rc<Vec<(Id, Thunk)>>> },
  /// A ready value, used for the `std` object's fields.
  Ready(Thunk),
}

/// A lazy array of thunks.
#[derive(Debug, Clone, Default)]
pub struct Array(Rc<Vec<Thunk>>);

impl Array {
  #[must_use]
  pub fn new(elems: Vec<Thunk>) -> Self {
    Self(Rc::new(elems))
  }

  #[must_use]
  pub fn len(&self) -> usize {
    self.0.len()
  }

  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  #[must_use]
  pub fn get(&self, idx: usize) -> Option<&Thunk> {
    self.0.get(idx)
  }

  pub fn iter(&self) -> std::slice::Iter<'_, Thunk> {
    self.0.iter()
  }

  /// `lhs + rhs`. The thunks are shared, so memoized work is kept.
  #[must_use]
  pub fn concat(&self, other: &Array) -> Self {
    let mut elems = (*self.0).clone();
    elems.extend(other.0.iter().cloned());
    Self::new(elems)
  }
}

impl<'a> IntoIterator for &'a Array {
  type Item = &'a Thunk;
  type IntoIter = std::slice::Iter<'a, Thunk>;

  fn into_iter(self) -> Self::IntoIter {
    self.iter()
  }
}

/// A function value.
#[derive(Debug, Clone)]
pub enum Fn {
  /// A function written in Jsonnet, with its captured environment.
  Regular(Rc<RegularFn>),
  /// A native standard-library function.
  Native(Native),
}

#[derive(Debug)]
pub struct RegularFn {
  pub file: Rc<File>,
  pub env: Env,
  pub params: Vec<(Id, Option<hir::Expr>)>,
  pub body: hir::Expr,
}
