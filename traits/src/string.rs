use std::{borrow::Cow, fmt};

use crate::{FromJson, JsonError, JsonString, ToJson, Value, conversion};

impl ToJson for str {
  fn to_json(&self) -> Value {
    Value::from(self)
  }
}
impl ToJson for String {
  fn to_json(&self) -> Value {
    Value::from(self.as_str())
  }
}
impl ToJson for Cow<'_, str> {
  fn to_json(&self) -> Value {
    Value::from(self.as_ref())
  }
}
impl ToJson for JsonString {
  fn to_json(&self) -> Value {
    Value::String(self.clone())
  }
}

impl FromJson for String {
  /// Spilled strings are read into memory.
  fn from_json(value: &Value) -> Result<Self, JsonError> {
    Ok(value.to_str()?.into_owned())
  }
}
impl FromJson for JsonString {
  /// Spilled strings remain spilled.
  fn from_json(value: &Value) -> Result<Self, JsonError> {
    value.as_json_string().cloned().ok_or_else(|| crate::wrong_type("string", value))
  }
}

impl ToJson for char {
  fn to_json(&self) -> Value {
    Value::from(String::from(*self))
  }
}
impl FromJson for char {
  fn from_json(value: &Value) -> Result<Self, JsonError> {
    let string = value.to_str()?;
    let mut chars = string.chars();
    match (chars.next(), chars.next()) {
      (Some(char), None) => Ok(char),
      _ => Err(conversion(&string, "char")),
    }
  }
}

/// A wrapper converting a value to a JSON string via its `Display` implementation.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Displayed<T: fmt::Display>(pub T);

impl<T: fmt::Display> ToJson for Displayed<T> {
  fn to_json(&self) -> Value {
    Value::from(self.0.to_string())
  }
}

#[test]
fn strings() {
  assert_eq!("abc".to_json(), Value::from("abc"));
  assert_eq!(Cow::Borrowed("abc").to_json(), String::from("abc").to_json());
  assert_eq!(String::from_json(&Value::from("é")).unwrap(), "é");
  assert!(matches!(String::from_json(&Value::from(1)), Err(JsonError::Access(_))));

  assert_eq!(char::from_json(&'😀'.to_json()).unwrap(), '😀');
  assert!(matches!(char::from_json(&Value::from("ab")), Err(JsonError::Conversion(_))));
  assert!(char::from_json(&Value::from("")).is_err());

  assert_eq!(Displayed(std::net::Ipv4Addr::LOCALHOST).to_json(), Value::from("127.0.0.1"));
}
