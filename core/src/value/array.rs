use std::{
  fmt,
  hash::{DefaultHasher, Hash, Hasher},
  slice,
  sync::OnceLock,
  vec,
};

use crate::{Container, ContainerMut, Frozen, Value};

/// An ordered sequence of values.
///
/// There are never holes: writing past the end pads the array with `null`.
#[derive(Clone, Default)]
pub struct Array {
  items: Vec<Value>,
  // Cleared by every mutation
  hash: OnceLock<u64>,
}

impl Array {
  /// Create an empty array.
  #[must_use]
  pub fn new() -> Self {
    Self::default()
  }

  /// Create an empty array with space for `capacity` values.
  #[must_use]
  pub fn with_capacity(capacity: usize) -> Self {
    Self { items: Vec::with_capacity(capacity), hash: OnceLock::new() }
  }

  /// The values, in order.
  #[must_use]
  pub fn as_slice(&self) -> &[Value] {
    &self.items
  }

  /// Iterate over the values.
  pub fn iter(&self) -> slice::Iter<'_, Value> {
    self.items.iter()
  }

  /// A mutable reference to the value at `index`.
  pub fn get_mut(&mut self, index: usize) -> Option<&mut Value> {
    self.hash.take();
    self.items.get_mut(index)
  }

  /// Append a value.
  pub fn push(&mut self, value: impl Into<Value>) {
    self.hash.take();
    self.items.push(value.into());
  }

  /// Insert a value at `index`, shifting the values after it to the right.
  ///
  /// If `index` is past the end, the array is padded with `null` up to `index` first.
  pub fn add(&mut self, index: usize, value: impl Into<Value>) {
    self.pad(index);
    self.items.insert(index, value.into());
  }

  /// Make this array immutable, allowing it to be cheaply shared.
  #[must_use]
  pub fn freeze(self) -> Frozen<Array> {
    Frozen::new(self)
  }

  /// The values, as a `Vec`.
  #[must_use]
  pub fn into_vec(self) -> Vec<Value> {
    self.items
  }

  fn pad(&mut self, len: usize) {
    self.hash.take();
    if self.items.len() < len {
      self.items.resize(len, Value::Null);
    }
  }

  fn cached_hash(&self) -> u64 {
    *self.hash.get_or_init(|| {
      let mut hasher = DefaultHasher::new();
      self.items.hash(&mut hasher);
      hasher.finish()
    })
  }
}

impl Container<usize> for Array {
  #[inline(always)]
  fn opt(&self, index: usize) -> Option<&Value> {
    self.items.get(index)
  }

  #[inline(always)]
  fn len(&self) -> usize {
    self.items.len()
  }
}

impl ContainerMut<usize> for Array {
  /// Replace the value at `index`.
  ///
  /// If `index` is past the end, the array is padded with `null` up to `index` first.
  fn put(&mut self, index: usize, value: impl Into<Value>) {
    self.pad(index);
    if index < self.items.len() {
      self.items[index] = value.into();
    } else {
      self.items.push(value.into());
    }
  }

  /// Remove the value at `index`, shifting the values after it to the left.
  fn remove(&mut self, index: usize) -> Option<Value> {
    self.hash.take();
    (index < self.items.len()).then(|| self.items.remove(index))
  }

  fn clear(&mut self) {
    self.hash.take();
    self.items.clear();
  }
}

impl PartialEq for Array {
  fn eq(&self, other: &Self) -> bool {
    self.items == other.items
  }
}
impl Eq for Array {}

impl Hash for Array {
  fn hash<H: Hasher>(&self, state: &mut H) {
    state.write_u64(self.cached_hash());
  }
}

impl fmt::Debug for Array {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_list().entries(&self.items).finish()
  }
}

impl From<Vec<Value>> for Array {
  fn from(items: Vec<Value>) -> Self {
    Self { items, hash: OnceLock::new() }
  }
}

impl<V: Into<Value>> FromIterator<V> for Array {
  fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
    Self::from(iter.into_iter().map(Into::into).collect::<Vec<_>>())
  }
}

impl<V: Into<Value>> Extend<V> for Array {
  fn extend<I: IntoIterator<Item = V>>(&mut self, iter: I) {
    self.hash.take();
    self.items.extend(iter.into_iter().map(Into::into));
  }
}

impl IntoIterator for Array {
  type Item = Value;
  type IntoIter = vec::IntoIter<Value>;
  fn into_iter(self) -> Self::IntoIter {
    self.items.into_iter()
  }
}

impl<'a> IntoIterator for &'a Array {
  type Item = &'a Value;
  type IntoIter = slice::Iter<'a, Value>;
  fn into_iter(self) -> Self::IntoIter {
    self.items.iter()
  }
}
