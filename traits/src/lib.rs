#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]
#![deny(missing_docs)]

pub use json_tree::*;

mod primitives;
mod float;
pub use float::JsonF64;
mod string;
pub use string::Displayed;
mod sequences;
mod maps;
mod option;
mod boxed;
mod tree;
mod tri;
pub use tri::Tri;
mod native;
pub use native::{Native, to_native};
mod coercer;
pub use coercer::{Coercer, Loose};

/// An item which can be converted to a [`Value`].
///
/// This conversion never fails. Types without a JSON representation should be wrapped with
/// [`Displayed`] or coerced with a [`Coercer`].
pub trait ToJson {
  /// Convert this item to a `Value`.
  fn to_json(&self) -> Value;
}

/// An item which can be converted from a [`Value`].
///
/// Conversions follow the same leniencies as the typed getters of [`Container`]: numbers may be
/// read from numeric strings, with fractional parts truncated when an integer is requested, and
/// booleans from the strings `"true"` and `"false"`.
pub trait FromJson: Sized {
  /// Convert a `Value` to this item.
  fn from_json(value: &Value) -> Result<Self, JsonError>;

  /// Parse this item from JSON.
  ///
  /// This method SHOULD NOT be overriden.
  fn from_json_str(json: impl AsRef<[u8]>) -> Result<Self, JsonError> {
    Self::from_json(&parse(json)?)
  }
}

pub(crate) fn wrong_type(expected: &'static str, value: &Value) -> JsonError {
  JsonError::Access(AccessError {
    key: Key::Root,
    kind: AccessErrorKind::WrongType { expected, found: value.kind() },
  })
}

pub(crate) fn conversion(value: impl core::fmt::Display, target: &'static str) -> JsonError {
  JsonError::Conversion(ConversionError { value: value.to_string(), target })
}
