//! Resolving import paths to contents.

use rustc_hash::FxHashMap;
use std::path::{Path, PathBuf};

/// What an import resolved to.
#[derive(Debug)]
pub enum Contents {
  Text(String),
  Bytes(Vec<u8>),
}

/// Maps an import path, relative to the importing file's directory, to a
/// canonical path and the contents. Returning `None` means not found.
///
/// The canonical path is the cache key: imports that resolve to the same
/// canonical path produce the same value within one evaluation.
pub trait ImportResolver: std::fmt::Debug {
  fn resolve(&mut self, importer_dir: &Path, path: &str) -> Option<(PathBuf, Contents)>;
}

/// The filesystem resolver: the importer's directory first, then each
/// search path in order.
#[derive(Debug, Default)]
pub struct FsResolver {
  pub search_paths: Vec<PathBuf>,
}

impl FsResolver {
  #[must_use]
  pub fn new(search_paths: Vec<PathBuf>) -> Self {
    Self { search_paths }
  }
}

impl ImportResolver for FsResolver {
  fn resolve(&mut self, importer_dir: &Path, path: &str) -> Option<(PathBuf, Contents)> {
    let candidates =
      std::iter::once(importer_dir).chain(self.search_paths.iter().map(PathBuf::as_path));
    for dir in candidates {
      let candidate = dir.join(path);
      let Ok(bytes) = std::fs::read(&candidate) else { continue };
      let canonical = candidate.canonicalize().unwrap_or(candidate);
      log::debug!("resolved import `{path}` to {}", canonical.display());
      let contents = match String::from_utf8(bytes) {
        Ok(text) => Contents::Text(text),
        Err(e) => Contents::Bytes(e.into_bytes()),
      };
      return Some((canonical, contents));
    }
    None
  }
}

/// An in-memory resolver, for tests and embedders without a filesystem.
#[derive(Debug, Default)]
pub struct MemResolver {
  files: FxHashMap<PathBuf, String>,
}

impl MemResolver {
  #[must_use]
  pub fn new<I, P, S>(files: I) -> Self
  where
    I: IntoIterator<Item = (P, S)>,
    P: Into<PathBuf>,
    S: Into<String>,
  {
    let files = files.into_iter().map(|(p, s)| (p.into(), s.into())).collect();
    Self { files }
  }

  pub fn add(&mut self, path: impl Into<PathBuf>, contents: impl Into<String>) {
    self.files.insert(path.into(), contents.into());
  }
}

impl ImportResolver for MemResolver {
  fn resolve(&mut self, importer_dir: &Path, path: &str) -> Option<(PathBuf, Contents)> {
    let joined = importer_dir.join(path);
    let (canonical, text) = match self.files.get_key_value(&joined) {
      Some((p, text)) => (p.clone(), text.clone()),
      None => {
        let (p, text) = self.files.get_key_value(Path::new(path))?;
        (p.clone(), text.clone())
      }
    };
    Some((canonical, Contents::Text(text)))
  }
}
