use std::{ops::Deref, sync::Arc};

use crate::{Container, Key, Value};

/// An immutable container, cheap to clone and safe to share across threads.
///
/// Only the read-only [`Container`] interface is exposed. [`Frozen::thaw`] yields a mutable
/// copy.
#[derive(PartialEq, Eq, Hash, Debug)]
pub struct Frozen<C>(Arc<C>);

impl<C> Frozen<C> {
  /// Freeze a container.
  pub fn new(container: C) -> Self {
    Self(Arc::new(container))
  }
}

impl<C: Clone> Frozen<C> {
  /// A mutable copy of the container.
  #[must_use]
  pub fn thaw(&self) -> C {
    C::clone(&self.0)
  }
}

impl<C> Clone for Frozen<C> {
  fn clone(&self) -> Self {
    Self(self.0.clone())
  }
}

impl<C> Deref for Frozen<C> {
  type Target = C;
  fn deref(&self) -> &C {
    &self.0
  }
}

impl<K: Copy + Into<Key>, C: Container<K>> Container<K> for Frozen<C> {
  #[inline(always)]
  fn opt(&self, key: K) -> Option<&Value> {
    self.0.opt(key)
  }

  #[inline(always)]
  fn len(&self) -> usize {
    self.0.len()
  }
}

#[test]
fn shared_across_threads() {
  use crate::{Array, ContainerMut, Object};

  let mut object = Object::new();
  object.put("list", [1, 2, 3].into_iter().collect::<Array>());
  object.put("name", "frozen");
  let frozen = object.freeze();

  let handles = (0 .. 4)
    .map(|_| {
      let frozen = frozen.clone();
      std::thread::spawn(move || {
        assert_eq!(frozen.get_string("name").unwrap(), "frozen");
        frozen.get_array("list").unwrap().get_int(2).unwrap()
      })
    })
    .collect::<Vec<_>>();
  for handle in handles {
    assert_eq!(handle.join().unwrap(), 3);
  }

  let mut thawed = frozen.thaw();
  thawed.remove("name");
  assert_eq!(thawed.len(), 1);
  assert_eq!(frozen.len(), 2);
}
