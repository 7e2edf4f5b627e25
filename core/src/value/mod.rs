use std::{borrow::Cow, fmt, io, mem};

use bigdecimal::BigDecimal;
use num_bigint::BigInt;

use crate::{JsonError, Number, SpilledString};

mod string;
pub use string::{JsonString, JsonStringLike};
pub(crate) use string::CHUNK_SIZE;
mod binary;
pub use binary::Binary;
mod access;
pub use access::{Container, ContainerMut};
mod array;
pub use array::Array;
mod object;
pub use object::Object;
mod frozen;
pub use frozen::Frozen;

/// The type of a value.
///
/// <https://datatracker.ietf.org/doc/html/rfc8259#section-3> defines all possible values, with
/// `Binary` additionally representing blobs (serialized as base64 strings).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Type {
  /// The `null` unit value.
  Null,
  /// A boolean.
  Bool,
  /// A number.
  Number,
  /// A string.
  String,
  /// A blob of bytes.
  Binary,
  /// An array.
  Array,
  /// An object.
  Object,
}

impl fmt::Display for Type {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Type::Null => "null",
      Type::Bool => "boolean",
      Type::Number => "number",
      Type::String => "string",
      Type::Binary => "binary",
      Type::Array => "array",
      Type::Object => "object",
    })
  }
}

/// A JSON value.
///
/// `Null` is distinct from an absent entry, and only equal to itself.
#[derive(Clone, Default, PartialEq, Eq, Hash, Debug)]
pub enum Value {
  /// `null`.
  #[default]
  Null,
  /// `true` or `false`.
  Bool(bool),
  /// A number.
  Number(Number),
  /// A string, potentially spilled to a file.
  String(JsonString),
  /// A blob of bytes.
  Binary(Binary),
  /// An ordered sequence of values.
  Array(Array),
  /// A string-keyed mapping of values.
  Object(Object),
}

impl Value {
  /// The type of this value.
  #[must_use]
  pub fn kind(&self) -> Type {
    match self {
      Value::Null => Type::Null,
      Value::Bool(_) => Type::Bool,
      Value::Number(_) => Type::Number,
      Value::String(_) => Type::String,
      Value::Binary(_) => Type::Binary,
      Value::Array(_) => Type::Array,
      Value::Object(_) => Type::Object,
    }
  }

  /// If this value is `null`.
  #[must_use]
  pub fn is_null(&self) -> bool {
    matches!(self, Value::Null)
  }
  /// If this value is a boolean.
  #[must_use]
  pub fn is_bool(&self) -> bool {
    matches!(self, Value::Bool(_))
  }
  /// If this value is a number.
  #[must_use]
  pub fn is_number(&self) -> bool {
    matches!(self, Value::Number(_))
  }
  /// If this value is a string.
  #[must_use]
  pub fn is_string(&self) -> bool {
    matches!(self, Value::String(_))
  }
  /// If this value is a blob.
  #[must_use]
  pub fn is_binary(&self) -> bool {
    matches!(self, Value::Binary(_))
  }
  /// If this value is an array.
  #[must_use]
  pub fn is_array(&self) -> bool {
    matches!(self, Value::Array(_))
  }
  /// If this value is an object.
  #[must_use]
  pub fn is_object(&self) -> bool {
    matches!(self, Value::Object(_))
  }

  /// This value as a boolean, if it is one.
  #[must_use]
  pub fn as_bool(&self) -> Option<bool> {
    match self {
      Value::Bool(bool) => Some(*bool),
      _ => None,
    }
  }

  /// This value as a number, if it is one.
  #[must_use]
  pub fn as_number(&self) -> Option<&Number> {
    match self {
      Value::Number(number) => Some(number),
      _ => None,
    }
  }

  /// This value as a string leaf, if it is one.
  #[must_use]
  pub fn as_json_string(&self) -> Option<&JsonString> {
    match self {
      Value::String(string) => Some(string),
      _ => None,
    }
  }

  /// This value as a `&str`, if it's a string held in memory.
  #[must_use]
  pub fn as_str(&self) -> Option<&str> {
    self.as_json_string().and_then(JsonString::as_inline)
  }

  /// This value as a blob, if it is one.
  #[must_use]
  pub fn as_binary(&self) -> Option<&Binary> {
    match self {
      Value::Binary(binary) => Some(binary),
      _ => None,
    }
  }

  /// This value as an array, if it is one.
  #[must_use]
  pub fn as_array(&self) -> Option<&Array> {
    match self {
      Value::Array(array) => Some(array),
      _ => None,
    }
  }

  /// This value as a mutable array, if it is one.
  pub fn as_array_mut(&mut self) -> Option<&mut Array> {
    match self {
      Value::Array(array) => Some(array),
      _ => None,
    }
  }

  /// This value as an object, if it is one.
  #[must_use]
  pub fn as_object(&self) -> Option<&Object> {
    match self {
      Value::Object(object) => Some(object),
      _ => None,
    }
  }

  /// This value as a mutable object, if it is one.
  pub fn as_object_mut(&mut self) -> Option<&mut Object> {
    match self {
      Value::Object(object) => Some(object),
      _ => None,
    }
  }

  /// Make this value immutable, allowing it to be cheaply shared.
  #[must_use]
  pub fn freeze(self) -> Frozen<Value> {
    Frozen::new(self)
  }

  /// Take this value, leaving `null` in its place.
  pub fn take(&mut self) -> Value {
    mem::take(self)
  }

  /// Coerce this value to a boolean.
  ///
  /// Accepts booleans and the strings `"true"` and `"false"`, case-insensitively.
  pub fn to_bool(&self) -> Result<bool, JsonError> {
    match self {
      Value::Bool(bool) => Ok(*bool),
      Value::String(string) => {
        let string = string.to_str()?;
        if string.eq_ignore_ascii_case("true") {
          Ok(true)
        } else if string.eq_ignore_ascii_case("false") {
          Ok(false)
        } else {
          Err(JsonError::conversion(string, "boolean"))
        }
      }
      _ => Err(JsonError::wrong_type("boolean", self.kind())),
    }
  }

  /// Coerce this value to a number.
  ///
  /// Accepts numbers and strings which are numbers under the lenient grammar.
  pub fn to_number(&self) -> Result<Cow<'_, Number>, JsonError> {
    match self {
      Value::Number(number) => Ok(Cow::Borrowed(number)),
      Value::String(string) => Ok(Cow::Owned(string.to_str()?.parse()?)),
      _ => Err(JsonError::wrong_type("number", self.kind())),
    }
  }

  /// Coerce this value to an `i32`, truncating any fractional part.
  pub fn to_i32(&self) -> Result<i32, JsonError> {
    let number = self.to_number()?;
    number.to_i32_truncating().ok_or_else(|| JsonError::conversion(&number, "i32"))
  }

  /// Coerce this value to an `i64`, truncating any fractional part.
  pub fn to_i64(&self) -> Result<i64, JsonError> {
    let number = self.to_number()?;
    number.to_i64_truncating().ok_or_else(|| JsonError::conversion(&number, "i64"))
  }

  /// Coerce this value to the nearest `f64`.
  pub fn to_f64(&self) -> Result<f64, JsonError> {
    Ok(self.to_number()?.as_f64())
  }

  /// This value's string contents, reading them back if spilled.
  pub fn to_str(&self) -> Result<Cow<'_, str>, JsonError> {
    match self {
      Value::String(string) => Ok(string.to_str()?),
      _ => Err(JsonError::wrong_type("string", self.kind())),
    }
  }

  /// Delete the files backing any spilled strings within this value.
  ///
  /// Dropping a value also deletes them, yet without reporting failures to. Files shared with
  /// other handles are left for the last handle. Every file is attempted, with the first failure
  /// returned.
  pub fn dispose(self) -> io::Result<()> {
    let mut res = Ok(());
    let mut stack = vec![self];
    while let Some(value) = stack.pop() {
      match value {
        Value::String(JsonString::Spilled(spilled)) => {
          let disposed = spilled.dispose();
          if res.is_ok() {
            res = disposed;
          }
        }
        Value::Array(array) => stack.extend(array),
        Value::Object(object) => stack.extend(object.into_iter().map(|(_, value)| value)),
        _ => {}
      }
    }
    res
  }
}

impl From<bool> for Value {
  fn from(value: bool) -> Self {
    Value::Bool(value)
  }
}

macro_rules! from_number {
  ($($number: ty),*) => {
    $(
      impl From<$number> for Value {
        fn from(value: $number) -> Self {
          Value::Number(Number::from(value))
        }
      }
    )*
  };
}
from_number!(
  i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, BigInt, BigDecimal
);

impl From<Number> for Value {
  fn from(value: Number) -> Self {
    Value::Number(value)
  }
}

impl From<String> for Value {
  fn from(value: String) -> Self {
    Value::String(JsonString::Inline(value))
  }
}

impl From<&str> for Value {
  fn from(value: &str) -> Self {
    Value::String(JsonString::Inline(value.to_owned()))
  }
}

impl From<JsonString> for Value {
  fn from(value: JsonString) -> Self {
    Value::String(value)
  }
}

impl From<SpilledString> for Value {
  fn from(value: SpilledString) -> Self {
    Value::String(JsonString::Spilled(value))
  }
}

impl From<Binary> for Value {
  fn from(value: Binary) -> Self {
    Value::Binary(value)
  }
}

impl From<Array> for Value {
  fn from(value: Array) -> Self {
    Value::Array(value)
  }
}

impl From<Object> for Value {
  fn from(value: Object) -> Self {
    Value::Object(value)
  }
}

#[test]
fn null_is_distinct() {
  assert_eq!(Value::Null, Value::Null);
  assert_ne!(Value::Null, Value::from(0));
  assert_ne!(Value::Null, Value::from(""));
  assert_ne!(Value::Null, Value::from(false));
  assert_ne!(Value::Null, Value::from(Array::new()));
}

#[test]
fn narrowing() {
  let mut value = Value::from([1, 2].into_iter().collect::<Array>());
  assert!(value.is_array());
  assert!(!value.is_object());
  assert!(value.as_object().is_none());
  value.as_array_mut().unwrap().push(3);
  assert_eq!(value.as_array().unwrap().len(), 3);
  assert_eq!(value.kind(), Type::Array);
  assert_eq!(value.take().kind(), Type::Array);
  assert!(value.is_null());
}

#[test]
fn dispose_releases_spilled_strings() {
  use crate::TempFileProvider;

  let provider = TempFileProvider::new();
  let first = SpilledString::spill(&provider, "first").unwrap();
  let second = SpilledString::spill(&provider, "second").unwrap();
  let paths = [first.path().to_owned(), second.path().to_owned()];

  let mut object = Object::new();
  object.put("first", first);
  object.put("nested", [Value::from(second)].into_iter().collect::<Array>());
  let value = Value::from(object);
  assert!(paths.iter().all(|path| path.exists()));
  value.dispose().unwrap();
  assert!(paths.iter().all(|path| !path.exists()));
}
