//! The front end as an import loader.

use crate::resolve::{Contents, ImportResolver};
use crate::Origin;
use jot_eval::{File, Loader};
use rustc_hash::FxHashMap;
use std::path::PathBuf;
use std::rc::Rc;

/// Runs the resolver and the front end on imported files, caching by
/// canonical path.
#[derive(Debug)]
pub(crate) struct FrontLoader<'a> {
  resolver: &'a mut dyn ImportResolver,
  code: FxHashMap<PathBuf, Rc<File>>,
  text: FxHashMap<PathBuf, Rc<str>>,
  bin: FxHashMap<PathBuf, Rc<[u8]>>,
}

impl<'a> FrontLoader<'a> {
  pub(crate) fn new(resolver: &'a mut dyn ImportResolver) -> Self {
    Self {
      resolver,
      code: FxHashMap::default(),
      text: FxHashMap::default(),
      bin: FxHashMap::default(),
    }
  }

  fn resolve(&mut self, importer: &File, path: &str) -> Result<(PathBuf, Contents), String> {
    match self.resolver.resolve(&importer.dir, path) {
      Some(hit) => Ok(hit),
      None => Err("no such file".to_owned()),
    }
  }
}

impl Loader for FrontLoader<'_> {
  fn load_code(&mut self, importer: &File, path: &str) -> Result<Rc<File>, String> {
    let (canonical, contents) = self.resolve(importer, path)?;
    if let Some(file) = self.code.get(&canonical) {
      return Ok(Rc::clone(file));
    }
    let Contents::Text(text) = contents else {
      return Err("imported code is not UTF-8 text".to_owned());
    };
    let origin = Origin::for_import(&canonical);
    let file = crate::compile(&text, &origin).map_err(|d| d.to_string())?;
    self.code.insert(canonical, Rc::clone(&file));
    Ok(file)
  }

  fn load_str(&mut self, importer: &File, path: &str) -> Result<Rc<str>, String> {
    let (canonical, contents) = self.resolve(importer, path)?;
    if let Some(text) = self.text.get(&canonical) {
      return Ok(Rc::clone(text));
    }
    let Contents::Text(text) = contents else {
      return Err("imported string is not UTF-8 text".to_owned());
    };
    let text: Rc<str> = Rc::from(text);
    self.text.insert(canonical, Rc::clone(&text));
    Ok(text)
  }

  fn load_bin(&mut self, importer: &File, path: &str) -> Result<Rc<[u8]>, String> {
    let (canonical, contents) = self.resolve(importer, path)?;
    if let Some(bytes) = self.bin.get(&canonical) {
      return Ok(Rc::clone(bytes));
    }
    let bytes: Rc<[u8]> = match contents {
      Contents::Text(text) => Rc::from(text.into_bytes()),
      Contents::Bytes(bytes) => Rc::from(bytes),
    };
    self.bin.insert(canonical, Rc::clone(&bytes));
    Ok(bytes)
  }
}
