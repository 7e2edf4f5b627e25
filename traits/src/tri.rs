use crate::{Container, FromJson, JsonError, Object, ToJson, Value};

/// A three-state variable comparable to a flattened `Option<Option<T>>`.
///
/// When reading an object, this preserves the distinction between present and present as `null`,
/// when `Option` will read both cases into the singular `None`.
///
/// When converting an object, `json-tree-derive` will always wrap the field with `Tri::from`.
/// This allows `json-tree-derive` to omit fields which shouldn't be written. `Tri` does not itself
/// implement `ToJson` as the caller _must_ first decide whether or not to write it at all by its
/// pattern.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Debug)]
pub enum Tri<T> {
  /// A value present.
  Some(T),
  /// A value present as `null`.
  ///
  /// `Option as FromJson` would consider this as `None` but here it's comparable to `Some(None)`.
  Null,
  /// A value not present.
  ///
  /// `Option as FromJson` would ambiguously also consider this as `None`, hence the need for this
  /// `enum` in the first place.
  #[default]
  None,
}

impl<T: FromJson> Tri<T> {
  /// Read the field `key` from an object.
  ///
  /// Errors converting a present value are attributed to `key`.
  pub fn lookup(object: &Object, key: &str) -> Result<Self, JsonError> {
    match object.opt(key) {
      None => Ok(Tri::None),
      Some(value) => Self::from_json(value).map_err(|e| e.at(key)),
    }
  }
}

impl<T> Tri<T> {
  /// If a value was present, even if `null`.
  #[must_use]
  pub fn is_present(&self) -> bool {
    !matches!(self, Tri::None)
  }

  /// Collapse this to an `Option`, losing the distinction between `null` and absent.
  pub fn into_option(self) -> Option<T> {
    match self {
      Tri::Some(value) => Some(value),
      Tri::Null | Tri::None => None,
    }
  }
}

impl<T: FromJson> FromJson for Tri<T> {
  fn from_json(value: &Value) -> Result<Self, JsonError> {
    if value.is_null() {
      return Ok(Tri::Null);
    }
    T::from_json(value).map(Tri::Some)
  }
}

impl<'value, T> From<&'value Tri<T>> for Tri<&'value T> {
  fn from(value: &'value Tri<T>) -> Self {
    match value {
      Tri::Some(value) => Tri::Some(value),
      Tri::Null => Tri::Null,
      Tri::None => Tri::None,
    }
  }
}

impl<'value, T: ToJson> From<&'value T> for Tri<&'value T> {
  /// Wrap a value convertible to JSON with `Tri::Some`.
  fn from(value: &'value T) -> Self {
    Self::Some(value)
  }
}

#[test]
fn tri() {
  let object = crate::parse_object(r#"{"present": 1, "null": null, "wrong": []}"#).unwrap();
  assert_eq!(Tri::<u8>::lookup(&object, "present").unwrap(), Tri::Some(1));
  assert_eq!(Tri::<u8>::lookup(&object, "null").unwrap(), Tri::Null);
  assert_eq!(Tri::<u8>::lookup(&object, "absent").unwrap(), Tri::None);
  assert!(matches!(
    Tri::<u8>::lookup(&object, "wrong"),
    Err(JsonError::Access(crate::AccessError { key: crate::Key::Field(key), .. })) if key == "wrong"
  ));

  assert!(Tri::<u8>::Null.is_present());
  assert!(!Tri::<u8>::None.is_present());
  assert_eq!(Tri::Some(3).into_option(), Some(3));
  assert_eq!(Tri::<u8>::Null.into_option(), None);

  let tri = Tri::Some(5u8);
  assert_eq!(Tri::from(&tri), Tri::Some(&5));
  assert_eq!(Tri::from(&5u8), Tri::Some(&5));
}
