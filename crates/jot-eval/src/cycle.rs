//! Detecting import cycles.

/// The stack of in-progress items. Pushing an item that is already on the
/// stack is a cycle; an item may be pushed again once it has been popped.
#[derive(Debug)]
pub(crate) struct Detector<T> {
  active: Vec<T>,
}

impl<T> Default for Detector<T> {
  fn default() -> Self {
    Self { active: Vec::new() }
  }
}

impl<T: Clone + Eq> Detector<T> {
  /// Marks an item as in progress.
  ///
  /// # Errors
  ///
  /// If the item is already in progress: the whole chain, from the item's
  /// earlier occurrence through its repeat.
  pub(crate) fn push(&mut self, item: T) -> Result<(), Vec<T>> {
    if let Some(idx) = self.active.iter().position(|x| *x == item) {
      let mut chain = self.active[idx..].to_vec();
      chain.push(item);
      return Err(chain);
    }
    self.active.push(item);
    Ok(())
  }

  /// Marks the most recently pushed item as done.
  pub(crate) fn pop(&mut self) {
    self.active.pop();
  }
}

#[cfg(test)]
mod tests {
  use super::Detector;

  #[test]
  fn reports_the_whole_chain() {
    let mut d = Detector::<&str>::default();
    d.push("a").expect("a is new");
    d.push("b").expect("b is new");
    let chain = d.push("a").expect_err("a is in progress");
    assert_eq!(chain, ["a", "b", "a"]);
  }

  #[test]
  fn popped_items_may_repeat() {
    let mut d = Detector::<&str>::default();
    d.push("a").expect("a is new");
    d.pop();
    d.push("a").expect("a finished already");
  }
}
