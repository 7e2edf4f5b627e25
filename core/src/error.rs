//! The single error family surfaced by this crate.

use std::{fmt, io};

use thiserror::Error;

use crate::Type;

/// A location within the input.
///
/// Lines and columns are 1-indexed. Columns count bytes, not characters.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Position {
  /// The line.
  pub line: usize,
  /// The column within the line.
  pub column: usize,
  /// The byte offset from the start of the input.
  pub offset: usize,
}

impl Default for Position {
  fn default() -> Self {
    Self { line: 1, column: 1, offset: 0 }
  }
}

impl fmt::Display for Position {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "line {}, column {}", self.line, self.column)
  }
}

/// The reason a parse failed.
#[derive(Clone, PartialEq, Eq, Debug, Error)]
pub enum ParseErrorKind {
  /// A character which can't begin or continue the current token.
  #[error("unexpected character {0:?}")]
  UnexpectedCharacter(char),
  /// The input ended before the root value was complete.
  #[error("unexpected end of input")]
  UnexpectedEof,
  /// An escape sequence not defined by RFC 8259, in strict mode.
  #[error("invalid escape sequence `\\{0}`")]
  InvalidEscape(char),
  /// A `\u` escape without four hex digits, or an unpaired surrogate in strict mode.
  #[error("invalid unicode escape")]
  InvalidUnicodeEscape,
  /// The input wasn't valid UTF-8.
  #[error("invalid UTF-8")]
  InvalidUtf8,
  /// A raw control character inside a string, in strict mode.
  #[error("unescaped control character {0:?} in string")]
  ControlCharacter(char),
  /// A malformed number.
  #[error("invalid number `{0}`")]
  InvalidNumber(String),
  /// A bare word which isn't a literal, in strict mode.
  #[error("invalid literal `{0}`")]
  InvalidLiteral(String),
  /// A separator immediately before a closing bracket, in strict mode.
  #[error("trailing separator")]
  TrailingSeparator,
  /// A key wasn't followed by `:`.
  #[error("expected `:` after key")]
  ExpectedColon,
  /// Nesting exceeded the configured limit.
  #[error("nesting exceeded the maximum depth of {0}")]
  DepthExceeded(usize),
  /// The root wasn't of the requested shape.
  #[error("expected the root to be an {expected}")]
  UnexpectedRoot {
    /// The requested shape.
    expected: Type,
  },
  /// A field name was yielded while building an array.
  #[error("field name inside an array")]
  FieldNameInArray,
  /// A value was yielded for an object without a field name.
  #[error("value inside an object without a field name")]
  MissingFieldName,
  /// A container was closed by the other kind of bracket.
  #[error("mismatched closing bracket")]
  MismatchedClose,
  /// Input continued after a value which must be the entire input.
  #[error("trailing content after the value")]
  TrailingContent,
}

/// A malformed document, with where it went wrong.
#[derive(Clone, PartialEq, Eq, Debug, Error)]
#[error("{kind} at {position} (near `{snippet}`)")]
pub struct ParseError {
  /// What went wrong.
  pub kind: ParseErrorKind,
  /// Where it went wrong.
  pub position: Position,
  /// The input immediately following `position`.
  pub snippet: String,
}

impl ParseError {
  /// If this is a single-character lexical glitch, which the parser may skip past.
  #[must_use]
  pub fn is_lexical(&self) -> bool {
    matches!(self.kind, ParseErrorKind::UnexpectedCharacter(_))
  }
}

/// The key a typed accessor was called with.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Key {
  /// The value itself, not within a container.
  Root,
  /// An index within an array.
  Index(usize),
  /// A field within an object.
  Field(String),
}

impl fmt::Display for Key {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Key::Root => write!(f, "value"),
      Key::Index(i) => write!(f, "index {i}"),
      Key::Field(field) => write!(f, "field {field:?}"),
    }
  }
}

impl From<usize> for Key {
  fn from(index: usize) -> Self {
    Key::Index(index)
  }
}

impl From<&str> for Key {
  fn from(field: &str) -> Self {
    Key::Field(field.to_owned())
  }
}

/// Why a typed accessor failed.
#[derive(Clone, PartialEq, Eq, Debug, Error)]
pub enum AccessErrorKind {
  /// Nothing was present.
  #[error("is absent")]
  Missing,
  /// A value was present, of the wrong type.
  #[error("holds {found}, expected {expected}")]
  WrongType {
    /// The type requested.
    expected: &'static str,
    /// The type present.
    found: Type,
  },
}

/// A typed accessor was called against an absent key or a value of the wrong type.
#[derive(Clone, PartialEq, Eq, Debug, Error)]
#[error("{key} {kind}")]
pub struct AccessError {
  /// The key accessed.
  pub key: Key,
  /// Why the access failed.
  pub kind: AccessErrorKind,
}

/// A value couldn't be coerced to the requested type.
#[derive(Clone, PartialEq, Eq, Debug, Error)]
#[error("cannot convert `{value}` to {target}")]
pub struct ConversionError {
  /// A rendering of the value which failed to convert.
  pub value: String,
  /// The type requested.
  pub target: &'static str,
}

/// An error from this crate.
#[derive(Debug, Error)]
pub enum JsonError {
  /// The input was malformed.
  #[error(transparent)]
  Parse(#[from] ParseError),
  /// A typed accessor failed.
  #[error(transparent)]
  Access(#[from] AccessError),
  /// A coercion failed.
  #[error(transparent)]
  Conversion(#[from] ConversionError),
  /// The underlying transport failed.
  #[error("I/O error: {0}")]
  Io(#[from] io::Error),
}

impl JsonError {
  pub(crate) fn missing(key: impl Into<Key>) -> Self {
    JsonError::Access(AccessError { key: key.into(), kind: AccessErrorKind::Missing })
  }

  pub(crate) fn wrong_type(expected: &'static str, found: Type) -> Self {
    JsonError::Access(AccessError {
      key: Key::Root,
      kind: AccessErrorKind::WrongType { expected, found },
    })
  }

  pub(crate) fn conversion(value: impl fmt::Display, target: &'static str) -> Self {
    JsonError::Conversion(ConversionError { value: value.to_string(), target })
  }

  /// A copy of this error. I/O errors keep their kind and message, but lose their source.
  pub(crate) fn duplicate(&self) -> Self {
    match self {
      JsonError::Parse(error) => JsonError::Parse(error.clone()),
      JsonError::Access(error) => JsonError::Access(error.clone()),
      JsonError::Conversion(error) => JsonError::Conversion(error.clone()),
      JsonError::Io(error) => JsonError::Io(io::Error::new(error.kind(), error.to_string())),
    }
  }

  /// Attribute an access error raised on a bare value to the key it was fetched by.
  ///
  /// Errors already attributed to a key keep their innermost key. Other errors are returned
  /// as-is.
  #[must_use]
  pub fn at(self, key: impl Into<Key>) -> Self {
    match self {
      JsonError::Access(AccessError { key: Key::Root, kind }) => {
        JsonError::Access(AccessError { key: key.into(), kind })
      }
      other => other,
    }
  }
}

impl From<JsonError> for io::Error {
  fn from(error: JsonError) -> io::Error {
    match error {
      JsonError::Io(error) => error,
      other => io::Error::other(other),
    }
  }
}

#[test]
fn rekey_access_errors() {
  let error = JsonError::wrong_type("number", Type::Bool).at(3usize);
  let JsonError::Access(AccessError { key, .. }) = &error else { panic!("not an access error") };
  assert_eq!(key, &Key::Index(3));
  assert_eq!(error.to_string(), "index 3 holds boolean, expected number");

  // Keys already attributed are kept
  let error = error.at("field");
  let JsonError::Access(AccessError { key, .. }) = error else { panic!("not an access error") };
  assert_eq!(key, Key::Index(3));

  let error = JsonError::conversion("abc", "i32").at(1usize);
  assert!(matches!(error, JsonError::Conversion(_)));
}

#[test]
fn io_round_trip() {
  let error = io::Error::from(JsonError::missing("a"));
  assert_eq!(error.kind(), io::ErrorKind::Other);
  let inner = error.get_ref().and_then(|e| e.downcast_ref::<JsonError>());
  assert!(matches!(inner, Some(JsonError::Access(_))));

  let error = io::Error::from(JsonError::Io(io::Error::from(io::ErrorKind::BrokenPipe)));
  assert_eq!(error.kind(), io::ErrorKind::BrokenPipe);
}

#[test]
fn duplicates_keep_their_kind() {
  let error = JsonError::Io(io::Error::new(io::ErrorKind::NotFound, "gone"));
  let JsonError::Io(copy) = error.duplicate() else { panic!("not an I/O error") };
  assert_eq!(copy.kind(), io::ErrorKind::NotFound);
  assert_eq!(copy.to_string(), "gone");

  let error = JsonError::conversion("abc", "i32");
  assert_eq!(error.duplicate().to_string(), error.to_string());
}
