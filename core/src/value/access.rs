use std::borrow::Cow;

use crate::{Array, JsonError, Key, Object, Value};

/// Read access to a container, by index or by key.
///
/// The `get_*` accessors fail with an [`AccessError`](crate::AccessError) when the entry is
/// absent or of the wrong type, and with a [`ConversionError`](crate::ConversionError) when a
/// string can't be coerced. The `opt_*` accessors return `None`, or the supplied default,
/// instead.
///
/// Numeric accessors accept numbers and numeric-looking strings, truncating fractional values
/// towards zero when an integer is requested. Boolean accessors accept booleans and the strings
/// `"true"` and `"false"`, case-insensitively.
pub trait Container<K: Copy + Into<Key>> {
  /// The entry for `key`, if present.
  fn opt(&self, key: K) -> Option<&Value>;

  /// The amount of entries.
  fn len(&self) -> usize;

  /// If there are no entries.
  fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// If an entry is present for `key`.
  fn has(&self, key: K) -> bool {
    self.opt(key).is_some()
  }

  /// If the entry for `key` is absent or `null`.
  fn is_null(&self, key: K) -> bool {
    self.opt(key).is_none_or(Value::is_null)
  }

  /// The entry for `key`.
  fn get(&self, key: K) -> Result<&Value, JsonError> {
    self.opt(key).ok_or_else(|| JsonError::missing(key))
  }

  /// The entry for `key`, as a boolean.
  fn get_bool(&self, key: K) -> Result<bool, JsonError> {
    self.get(key)?.to_bool().map_err(|e| e.at(key))
  }
  /// The entry for `key`, as a boolean, if it is one.
  fn opt_bool(&self, key: K) -> Option<bool> {
    self.opt(key)?.to_bool().ok()
  }
  /// The entry for `key`, as a boolean, or `default`.
  fn opt_bool_or(&self, key: K, default: bool) -> bool {
    self.opt_bool(key).unwrap_or(default)
  }

  /// The entry for `key`, as an `i32`.
  fn get_int(&self, key: K) -> Result<i32, JsonError> {
    self.get(key)?.to_i32().map_err(|e| e.at(key))
  }
  /// The entry for `key`, as an `i32`, if it is one.
  fn opt_int(&self, key: K) -> Option<i32> {
    self.opt(key)?.to_i32().ok()
  }
  /// The entry for `key`, as an `i32`, or `default`.
  fn opt_int_or(&self, key: K, default: i32) -> i32 {
    self.opt_int(key).unwrap_or(default)
  }

  /// The entry for `key`, as an `i64`.
  fn get_long(&self, key: K) -> Result<i64, JsonError> {
    self.get(key)?.to_i64().map_err(|e| e.at(key))
  }
  /// The entry for `key`, as an `i64`, if it is one.
  fn opt_long(&self, key: K) -> Option<i64> {
    self.opt(key)?.to_i64().ok()
  }
  /// The entry for `key`, as an `i64`, or `default`.
  fn opt_long_or(&self, key: K, default: i64) -> i64 {
    self.opt_long(key).unwrap_or(default)
  }

  /// The entry for `key`, as an `f64`.
  fn get_double(&self, key: K) -> Result<f64, JsonError> {
    self.get(key)?.to_f64().map_err(|e| e.at(key))
  }
  /// The entry for `key`, as an `f64`, if it is one.
  fn opt_double(&self, key: K) -> Option<f64> {
    self.opt(key)?.to_f64().ok()
  }
  /// The entry for `key`, as an `f64`, or `default`.
  fn opt_double_or(&self, key: K, default: f64) -> f64 {
    self.opt_double(key).unwrap_or(default)
  }

  /// The entry for `key`, as a string.
  ///
  /// Spilled strings are read back into memory.
  fn get_string(&self, key: K) -> Result<Cow<'_, str>, JsonError> {
    self.get(key)?.to_str().map_err(|e| e.at(key))
  }
  /// The entry for `key`, as a string, if it is one.
  fn opt_string(&self, key: K) -> Option<Cow<'_, str>> {
    self.opt(key)?.to_str().ok()
  }
  /// The entry for `key`, as a string, or `default`.
  fn opt_string_or<'a>(&'a self, key: K, default: &'a str) -> Cow<'a, str> {
    self.opt_string(key).unwrap_or(Cow::Borrowed(default))
  }

  /// The entry for `key`, as an array.
  fn get_array(&self, key: K) -> Result<&Array, JsonError> {
    let value = self.get(key)?;
    value.as_array().ok_or_else(|| JsonError::wrong_type("array", value.kind()).at(key))
  }
  /// The entry for `key`, as an array, if it is one.
  fn opt_array(&self, key: K) -> Option<&Array> {
    self.opt(key)?.as_array()
  }

  /// The entry for `key`, as an object.
  fn get_object(&self, key: K) -> Result<&Object, JsonError> {
    let value = self.get(key)?;
    value.as_object().ok_or_else(|| JsonError::wrong_type("object", value.kind()).at(key))
  }
  /// The entry for `key`, as an object, if it is one.
  fn opt_object(&self, key: K) -> Option<&Object> {
    self.opt(key)?.as_object()
  }
}

/// Write access to a container.
///
/// Containers take no locks. Mutating a container while another thread reads it isn't possible
/// through safe references; share a [`Frozen`](crate::Frozen) container across threads instead.
pub trait ContainerMut<K: Copy + Into<Key>>: Container<K> {
  /// Set the entry for `key`, replacing any existing entry.
  fn put(&mut self, key: K, value: impl Into<Value>);

  /// Remove the entry for `key`, returning it.
  fn remove(&mut self, key: K) -> Option<Value>;

  /// Remove every entry.
  fn clear(&mut self);
}
