use std::{
  fmt,
  hash::{DefaultHasher, Hash, Hasher},
  sync::OnceLock,
};

use indexmap::{IndexMap, map};

use crate::{Container, ContainerMut, Frozen, Value};

/// A string-keyed mapping of values, iterated in insertion order.
///
/// Replacing the value of an existing key keeps its position. Equality ignores the order.
#[derive(Clone, Default)]
pub struct Object {
  entries: IndexMap<String, Value>,
  // Cleared by every mutation
  hash: OnceLock<u64>,
}

impl Object {
  /// Create an empty object.
  #[must_use]
  pub fn new() -> Self {
    Self::default()
  }

  /// Create an empty object with space for `capacity` entries.
  #[must_use]
  pub fn with_capacity(capacity: usize) -> Self {
    Self { entries: IndexMap::with_capacity(capacity), hash: OnceLock::new() }
  }

  /// Set the value for `key`, returning the value it replaced.
  pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
    self.hash.take();
    self.entries.insert(key.into(), value.into())
  }

  /// A mutable reference to the value for `key`.
  pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
    self.hash.take();
    self.entries.get_mut(key)
  }

  /// If an entry is present for `key`.
  #[must_use]
  pub fn contains_key(&self, key: &str) -> bool {
    self.entries.contains_key(key)
  }

  /// Iterate over the keys, in order.
  pub fn keys(&self) -> map::Keys<'_, String, Value> {
    self.entries.keys()
  }

  /// Iterate over the values, in order.
  pub fn values(&self) -> map::Values<'_, String, Value> {
    self.entries.values()
  }

  /// Iterate over the entries, in order.
  pub fn iter(&self) -> map::Iter<'_, String, Value> {
    self.entries.iter()
  }

  /// Make this object immutable, allowing it to be cheaply shared.
  #[must_use]
  pub fn freeze(self) -> Frozen<Object> {
    Frozen::new(self)
  }

  /// The entries, as an `IndexMap`.
  #[must_use]
  pub fn into_map(self) -> IndexMap<String, Value> {
    self.entries
  }

  fn cached_hash(&self) -> u64 {
    *self.hash.get_or_init(|| {
      // Summed so the hash is independent of the order
      let mut hash = self.entries.len() as u64;
      for entry in &self.entries {
        let mut hasher = DefaultHasher::new();
        entry.hash(&mut hasher);
        hash = hash.wrapping_add(hasher.finish());
      }
      hash
    })
  }
}

impl<'k> Container<&'k str> for Object {
  #[inline(always)]
  fn opt(&self, key: &'k str) -> Option<&Value> {
    self.entries.get(key)
  }

  #[inline(always)]
  fn len(&self) -> usize {
    self.entries.len()
  }
}

impl<'k> ContainerMut<&'k str> for Object {
  fn put(&mut self, key: &'k str, value: impl Into<Value>) {
    self.hash.take();
    match self.entries.get_mut(key) {
      Some(existing) => *existing = value.into(),
      None => {
        self.entries.insert(key.to_owned(), value.into());
      }
    }
  }

  /// Remove the entry for `key`, preserving the order of the remaining entries.
  fn remove(&mut self, key: &'k str) -> Option<Value> {
    self.hash.take();
    self.entries.shift_remove(key)
  }

  fn clear(&mut self) {
    self.hash.take();
    self.entries.clear();
  }
}

impl PartialEq for Object {
  fn eq(&self, other: &Self) -> bool {
    self.entries == other.entries
  }
}
impl Eq for Object {}

impl Hash for Object {
  fn hash<H: Hasher>(&self, state: &mut H) {
    state.write_u64(self.cached_hash());
  }
}

impl fmt::Debug for Object {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_map().entries(&self.entries).finish()
  }
}

impl From<IndexMap<String, Value>> for Object {
  fn from(entries: IndexMap<String, Value>) -> Self {
    Self { entries, hash: OnceLock::new() }
  }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Object {
  fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
    Self::from(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect::<IndexMap<_, _>>())
  }
}

impl<K: Into<String>, V: Into<Value>> Extend<(K, V)> for Object {
  fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
    self.hash.take();
    self.entries.extend(iter.into_iter().map(|(k, v)| (k.into(), v.into())));
  }
}

impl IntoIterator for Object {
  type Item = (String, Value);
  type IntoIter = map::IntoIter<String, Value>;
  fn into_iter(self) -> Self::IntoIter {
    self.entries.into_iter()
  }
}

impl<'a> IntoIterator for &'a Object {
  type Item = (&'a String, &'a Value);
  type IntoIter = map::Iter<'a, String, Value>;
  fn into_iter(self) -> Self::IntoIter {
    self.entries.iter()
  }
}
