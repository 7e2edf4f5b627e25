//! Building trees from tokens.

use std::io::Read;

use tracing::trace;

use crate::{
  Array, JsonError, Object, ParseErrorKind, ParserConfig, Token, Tokenizer, Type, Value,
  io::{ReaderSource, SliceSource, Source},
};

/// A container under construction.
enum Frame {
  Array(Array),
  /// An object, with the key its next value will be inserted under.
  Object(Object, Option<String>),
}

/// A parser, building trees from a [`Tokenizer`].
///
/// Unless strict, unexpected characters are skipped, with parsing continuing from the next
/// character. Every other error is fatal.
#[derive(Debug)]
pub struct Parser<S> {
  tokenizer: Tokenizer<S>,
  strict: bool,
}

impl<'a> Parser<SliceSource<'a>> {
  /// Create a parser over bytes in memory.
  pub fn from_slice(bytes: &'a [u8], config: &ParserConfig) -> Self {
    Self::new(SliceSource::new(bytes), config)
  }
}

impl<R: Read> Parser<ReaderSource<R>> {
  /// Create a parser over a reader.
  pub fn from_reader(reader: R, config: &ParserConfig) -> Self {
    Self::new(ReaderSource::new(reader), config)
  }
}

impl<S: Source> Parser<S> {
  /// Create a parser over a source.
  pub fn new(source: S, config: &ParserConfig) -> Self {
    Self { tokenizer: Tokenizer::new(source, config), strict: config.strict }
  }

  /// The tokenizer, positioned after the last token read.
  pub fn into_tokenizer(self) -> Tokenizer<S> {
    self.tokenizer
  }

  fn error(&mut self, kind: ParseErrorKind) -> JsonError {
    let position = self.tokenizer.position();
    self.tokenizer.error_at(kind, position)
  }

  fn next_token(&mut self) -> Result<Token, JsonError> {
    loop {
      match self.tokenizer.next_token() {
        Ok(Some(token)) => return Ok(token),
        Ok(None) => Err(self.error(ParseErrorKind::UnexpectedEof))?,
        Err(JsonError::Parse(error)) if error.is_lexical() && (!self.strict) => {
          trace!(%error, "skipping unexpected character");
        }
        Err(e) => Err(e)?,
      }
    }
  }

  /// Require the root to open with `open`.
  fn expect_root(&mut self, open: u8, expected: Type) -> Result<(), JsonError> {
    self.tokenizer.skip_whitespace()?;
    if self.tokenizer.peek()? != Some(open) {
      Err(self.error(ParseErrorKind::UnexpectedRoot { expected }))?;
    }
    Ok(())
  }

  /// Parse a value of any type.
  pub fn parse_value(&mut self) -> Result<Value, JsonError> {
    let mut stack = vec![];
    loop {
      let value = match self.next_token()? {
        Token::StartArray => {
          stack.push(Frame::Array(Array::new()));
          continue;
        }
        Token::StartObject => {
          stack.push(Frame::Object(Object::new(), None));
          continue;
        }
        Token::FieldName(key) => {
          match stack.last_mut() {
            Some(Frame::Object(_, pending)) => *pending = Some(key),
            _ => Err(self.error(ParseErrorKind::FieldNameInArray))?,
          }
          continue;
        }
        Token::EndArray => match stack.pop() {
          Some(Frame::Array(array)) => Value::Array(array),
          _ => Err(self.error(ParseErrorKind::MismatchedClose))?,
        },
        Token::EndObject => match stack.pop() {
          Some(Frame::Object(object, None)) => Value::Object(object),
          _ => Err(self.error(ParseErrorKind::MismatchedClose))?,
        },
        Token::String(string) => Value::String(string),
        Token::Number(number) => Value::Number(number),
        Token::Bool(bool) => Value::Bool(bool),
        Token::Null => Value::Null,
      };

      match stack.last_mut() {
        None => return Ok(value),
        Some(Frame::Array(array)) => array.push(value),
        Some(Frame::Object(object, pending)) => match pending.take() {
          Some(key) => {
            object.insert(key, value);
          }
          None => Err(self.error(ParseErrorKind::MissingFieldName))?,
        },
      }
    }
  }

  /// Require the input to end, allowing only whitespace (and comments, if lenient).
  pub fn finish(&mut self) -> Result<(), JsonError> {
    self.tokenizer.skip_whitespace()?;
    if self.tokenizer.peek()?.is_some() {
      Err(self.error(ParseErrorKind::TrailingContent))?;
    }
    Ok(())
  }

  /// Parse an object, failing if the root is of any other type.
  pub fn parse_object(&mut self) -> Result<Object, JsonError> {
    self.expect_root(b'{', Type::Object)?;
    match self.parse_value()? {
      Value::Object(object) => Ok(object),
      _ => Err(self.error(ParseErrorKind::UnexpectedRoot { expected: Type::Object })),
    }
  }

  /// Parse an array, failing if the root is of any other type.
  pub fn parse_array(&mut self) -> Result<Array, JsonError> {
    self.expect_root(b'[', Type::Array)?;
    match self.parse_value()? {
      Value::Array(array) => Ok(array),
      _ => Err(self.error(ParseErrorKind::UnexpectedRoot { expected: Type::Array })),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{Container, Number};

  fn parse(json: &str) -> Result<Value, JsonError> {
    Parser::from_slice(json.as_bytes(), &ParserConfig::default()).parse_value()
  }

  fn kind(error: JsonError) -> ParseErrorKind {
    match error {
      JsonError::Parse(error) => error.kind,
      other => panic!("not a parse error: {other:?}"),
    }
  }

  #[test]
  fn nested() {
    let value = parse(r#"{"a": [1, {"b": null}, []], "c": {"d": "e"}}"#).unwrap();
    let object = value.as_object().unwrap();
    let a = object.get_array("a").unwrap();
    assert_eq!(a.len(), 3);
    assert_eq!(a.get(0).unwrap(), &Value::Number(Number::Int(1)));
    assert!(a.get_object(1).unwrap().is_null("b"));
    assert!(a.get_array(2).unwrap().is_empty());
    assert_eq!(object.get_object("c").unwrap().get_string("d").unwrap(), "e");
  }

  #[test]
  fn duplicate_keys_keep_the_last_value() {
    let value = parse(r#"{"a": 1, "b": 2, "a": 3}"#).unwrap();
    let object = value.as_object().unwrap();
    assert_eq!(object.keys().collect::<Vec<_>>(), ["a", "b"]);
    assert_eq!(object.get_int("a").unwrap(), 3);
  }

  #[test]
  fn skips_unexpected_characters() {
    let value = parse("[1 @, 2,: 3]").unwrap();
    assert_eq!(value, Value::from([1, 2, 3].into_iter().collect::<Array>()));

    // Strict parsing has no leniency
    let error = Parser::from_slice(b"[1 @, 2]", &ParserConfig::default().strict())
      .parse_value()
      .unwrap_err();
    assert_eq!(kind(error), ParseErrorKind::UnexpectedCharacter('@'));
  }

  #[test]
  fn fatal_errors() {
    assert_eq!(kind(parse("").unwrap_err()), ParseErrorKind::UnexpectedEof);
    assert_eq!(kind(parse("[1, 2").unwrap_err()), ParseErrorKind::UnexpectedEof);
    assert_eq!(kind(parse(r#"{"a" 1}"#).unwrap_err()), ParseErrorKind::ExpectedColon);
    assert_eq!(kind(parse("[1}").unwrap_err()), ParseErrorKind::UnexpectedEof);
  }

  #[test]
  fn unexpected_root() {
    let mut parser = Parser::from_slice(b"  [1]", &ParserConfig::default());
    let JsonError::Parse(error) = parser.parse_object().unwrap_err() else { panic!() };
    assert_eq!(error.kind, ParseErrorKind::UnexpectedRoot { expected: Type::Object });
    assert_eq!(error.position.column, 3);
    assert_eq!(error.snippet, "[1]");

    let mut parser = Parser::from_slice(b"{}", &ParserConfig::default());
    assert_eq!(
      kind(parser.parse_array().unwrap_err()),
      ParseErrorKind::UnexpectedRoot { expected: Type::Array }
    );

    let array = Parser::from_slice(b"[true]", &ParserConfig::default()).parse_array().unwrap();
    assert!(array.get_bool(0).unwrap());
  }

  #[test]
  fn reads_incrementally() {
    let json = format!("[{}]", vec!["\"entry\""; 10_000].join(","));
    let array = Parser::from_reader(json.as_bytes(), &ParserConfig::default())
      .parse_array()
      .unwrap();
    assert_eq!(array.len(), 10_000);
    assert!(array.iter().all(|value| value.as_str() == Some("entry")));
  }
}
