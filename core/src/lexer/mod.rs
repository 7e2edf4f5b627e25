//! A pull tokenizer, yielding one token at a time.

use std::sync::Arc;

use crate::{
  JsonError, JsonString, Number, ParseError, ParseErrorKind, ParserConfig, Position,
  SpillProvider,
  io::{MAX_PEEK, Source},
  number::NumberError,
  stack::{Stack, State},
};

mod hex;
mod unicode;
mod string;

/// The length of the snippet of input attached to errors.
const SNIPPET_LEN: usize = 32;

/// A token within a JSON document.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Token {
  /// `{`.
  StartObject,
  /// `}`.
  EndObject,
  /// `[`.
  StartArray,
  /// `]`.
  EndArray,
  /// The key of a field, including its `:`.
  FieldName(String),
  /// A string value.
  String(JsonString),
  /// A number.
  Number(Number),
  /// `true` or `false`.
  Bool(bool),
  /// `null`.
  Null,
}

/// Characters which end a bare word.
#[inline(always)]
fn is_delimiter(byte: u8) -> bool {
  matches!(byte, b' ' | b'\t' | b'\n' | b'\r') ||
    matches!(byte, b',' | b':' | b'[' | b']' | b'{' | b'}' | b'"' | b'\'' | b';' | b'#')
}

/// A tokenizer over a [`Source`].
///
/// This reads exactly the root value and any whitespace preceding it, never further, with the
/// exception of the lookahead used to attach snippets to errors. An error of kind
/// [`ParseErrorKind::UnexpectedCharacter`] consumes the offending character and leaves the
/// tokenizer able to continue. After any other error, the tokenizer's state is unspecified.
#[derive(Debug)]
pub struct Tokenizer<S> {
  source: S,
  position: Position,
  stack: Stack,
  strict: bool,
  spill: Option<Arc<dyn SpillProvider>>,
  spill_threshold: usize,
  done: bool,
}

impl<S: Source> Tokenizer<S> {
  /// Create a tokenizer over `source`.
  pub fn new(source: S, config: &ParserConfig) -> Self {
    Self {
      source,
      position: Position::default(),
      stack: Stack::new(config.max_depth),
      strict: config.strict,
      spill: config.spill.clone(),
      spill_threshold: config.spill_threshold,
      done: false,
    }
  }

  /// The position of the next byte to be read.
  #[must_use]
  pub fn position(&self) -> Position {
    self.position
  }

  /// The source, positioned immediately after the last token read.
  pub fn into_source(self) -> S {
    self.source
  }

  #[inline(always)]
  pub(crate) fn peek(&mut self) -> Result<Option<u8>, JsonError> {
    Ok(self.source.peek(0)?)
  }

  #[inline(always)]
  fn read_byte(&mut self) -> Result<Option<u8>, JsonError> {
    let byte = self.source.read_byte()?;
    if let Some(byte) = byte {
      self.position.offset += 1;
      if byte == b'\n' {
        self.position.line += 1;
        self.position.column = 1;
      } else {
        self.position.column += 1;
      }
    }
    Ok(byte)
  }

  /// An error at `position`, with a snippet of the input which follows.
  pub(crate) fn error_at(&mut self, kind: ParseErrorKind, position: Position) -> JsonError {
    let mut snippet = Vec::with_capacity(SNIPPET_LEN);
    // The snippet is best-effort, omitting anything which fails to be peeked
    for i in 0 .. SNIPPET_LEN.min(MAX_PEEK) {
      match self.source.peek(i) {
        Ok(Some(byte)) => snippet.push(byte),
        Ok(None) | Err(_) => break,
      }
    }
    let snippet = String::from_utf8_lossy(&snippet).into_owned();
    JsonError::Parse(ParseError { kind, position, snippet })
  }

  /// Consume the next character, returning an error for it being unexpected.
  fn unexpected_character(&mut self) -> JsonError {
    let position = self.position;
    let char = match self.read_byte() {
      Ok(Some(byte)) if byte.is_ascii() => char::from(byte),
      Ok(Some(byte)) => match self.read_non_ascii(byte) {
        Ok(char) => char,
        Err(e) => return e,
      },
      Ok(None) => return self.error_at(ParseErrorKind::UnexpectedEof, position),
      Err(e) => return e,
    };
    self.error_at(ParseErrorKind::UnexpectedCharacter(char), position)
  }

  /// Advance past whitespace, and comments if lenient.
  pub(crate) fn skip_whitespace(&mut self) -> Result<(), JsonError> {
    loop {
      match self.peek()? {
        // https://datatracker.ietf.org/doc/html/rfc8259#section-2 defines whitespace as follows
        Some(b'\x20' | b'\x09' | b'\x0A' | b'\x0D') => {
          self.read_byte()?;
        }
        Some(b'#') if !self.strict => self.skip_line()?,
        Some(b'/') if !self.strict => match self.source.peek(1)? {
          Some(b'/') => self.skip_line()?,
          Some(b'*') => self.skip_block_comment()?,
          _ => return Ok(()),
        },
        _ => return Ok(()),
      }
    }
  }

  fn skip_line(&mut self) -> Result<(), JsonError> {
    while let Some(byte) = self.read_byte()? {
      if byte == b'\n' {
        break;
      }
    }
    Ok(())
  }

  fn skip_block_comment(&mut self) -> Result<(), JsonError> {
    let position = self.position;
    // `/*`
    self.read_byte()?;
    self.read_byte()?;
    loop {
      match self.read_byte()? {
        Some(b'*') if self.peek()? == Some(b'/') => {
          self.read_byte()?;
          return Ok(());
        }
        Some(_) => {}
        None => Err(self.error_at(ParseErrorKind::UnexpectedEof, position))?,
      }
    }
  }

  /// Read the next token.
  ///
  /// Returns `None` once the root value has been completely read.
  pub fn next_token(&mut self) -> Result<Option<Token>, JsonError> {
    if self.done {
      return Ok(None);
    }
    self.skip_whitespace()?;
    match self.stack.peek() {
      None | Some(State::Value) => self.value().map(Some),
      Some(State::Array { needs_separator }) => {
        if self.peek()? == Some(b']') {
          return Ok(Some(self.close(Token::EndArray)?));
        }
        if needs_separator {
          self.separator(b']')?;
          self.set_needs_separator(false);
          if self.peek()? == Some(b']') {
            return Ok(Some(self.close(Token::EndArray)?));
          }
        }
        self.value().map(Some)
      }
      Some(State::Object { needs_separator }) => {
        if self.peek()? == Some(b'}') {
          return Ok(Some(self.close(Token::EndObject)?));
        }
        if needs_separator {
          self.separator(b'}')?;
          self.set_needs_separator(false);
          if self.peek()? == Some(b'}') {
            return Ok(Some(self.close(Token::EndObject)?));
          }
        }
        self.field_name().map(Some)
      }
    }
  }

  fn set_needs_separator(&mut self, value: bool) {
    if let Some(State::Array { needs_separator } | State::Object { needs_separator }) =
      self.stack.peek_mut()
    {
      *needs_separator = value;
    }
  }

  /// Read a separator, then any whitespace after it.
  ///
  /// A separator followed by `close` is an error when strict.
  fn separator(&mut self, close: u8) -> Result<(), JsonError> {
    match self.peek()? {
      Some(b',') => {}
      Some(b';') if !self.strict => {}
      _ => Err(self.unexpected_character())?,
    }
    self.read_byte()?;
    self.skip_whitespace()?;
    if self.strict && (self.peek()? == Some(close)) {
      let position = self.position;
      Err(self.error_at(ParseErrorKind::TrailingSeparator, position))?;
    }
    Ok(())
  }

  fn close(&mut self, token: Token) -> Result<Token, JsonError> {
    self.read_byte()?;
    self.stack.pop();
    if self.stack.is_empty() {
      self.done = true;
    }
    Ok(token)
  }

  fn push(&mut self, state: State) -> Result<(), JsonError> {
    let position = self.position;
    self.stack.push(state).map_err(|max_depth| {
      self.error_at(ParseErrorKind::DepthExceeded(max_depth), position)
    })
  }

  /// Mark a value as read within the current container.
  fn value_read(&mut self) {
    match self.stack.peek() {
      Some(State::Value) => {
        self.stack.pop();
      }
      Some(State::Array { .. }) => self.set_needs_separator(true),
      Some(State::Object { .. }) | None => {}
    }
  }

  fn field_name(&mut self) -> Result<Token, JsonError> {
    let key = match self.peek()? {
      Some(b'"') => self.string(b'"', String::new())?,
      Some(b'\'') if !self.strict => self.string(b'\'', String::new())?,
      Some(byte) if (!self.strict) && (!is_delimiter(byte)) => self.word()?,
      _ => Err(self.unexpected_character())?,
    };

    self.skip_whitespace()?;
    if self.peek()? != Some(b':') {
      let position = self.position;
      Err(self.error_at(ParseErrorKind::ExpectedColon, position))?;
    }
    self.read_byte()?;

    self.set_needs_separator(true);
    self.push(State::Value)?;
    Ok(Token::FieldName(key))
  }

  fn value(&mut self) -> Result<Token, JsonError> {
    let token = match self.peek()? {
      Some(b'{') => {
        self.value_read();
        self.push(State::Object { needs_separator: false })?;
        self.read_byte()?;
        return Ok(Token::StartObject);
      }
      Some(b'[') => {
        self.value_read();
        self.push(State::Array { needs_separator: false })?;
        self.read_byte()?;
        return Ok(Token::StartArray);
      }
      Some(b'"') => Token::String(self.string_value(b'"')?),
      Some(b'\'') if !self.strict => Token::String(self.string_value(b'\'')?),
      Some(byte) if !is_delimiter(byte) => self.atom()?,
      _ => Err(self.unexpected_character())?,
    };
    self.value_read();
    if self.stack.is_empty() {
      self.done = true;
    }
    Ok(token)
  }

  /// Read a bare word.
  fn word(&mut self) -> Result<String, JsonError> {
    let position = self.position;
    let mut word = vec![];
    while let Some(byte) = self.peek()? {
      if is_delimiter(byte) {
        break;
      }
      if (byte == b'/') && (!self.strict) && matches!(self.source.peek(1)?, Some(b'/' | b'*')) {
        break;
      }
      self.read_byte()?;
      word.push(byte);
    }
    String::from_utf8(word).map_err(|_| self.error_at(ParseErrorKind::InvalidUtf8, position))
  }

  /// Read a literal, number, or (if lenient) bare string.
  fn atom(&mut self) -> Result<Token, JsonError> {
    let position = self.position;
    let word = self.word()?;

    let literal = |expected: &str| {
      if self.strict { word == expected } else { word.eq_ignore_ascii_case(expected) }
    };
    if literal("null") {
      return Ok(Token::Null);
    }
    if literal("true") {
      return Ok(Token::Bool(true));
    }
    if literal("false") {
      return Ok(Token::Bool(false));
    }

    match Number::parse(&word, self.strict) {
      Ok(number) => Ok(Token::Number(number)),
      Err(NumberError::OutOfRange) => {
        Err(self.error_at(ParseErrorKind::InvalidNumber(word), position))
      }
      Err(NumberError::NotNumeric) if !self.strict => Ok(Token::String(JsonString::Inline(word))),
      Err(NumberError::NotNumeric) => {
        let looks_numeric = word.starts_with(|c: char| (c == '-') || c.is_ascii_digit());
        let kind = if looks_numeric {
          ParseErrorKind::InvalidNumber(word)
        } else {
          ParseErrorKind::InvalidLiteral(word)
        };
        Err(self.error_at(kind, position))
      }
    }
  }
}

impl<S: Source> Iterator for Tokenizer<S> {
  type Item = Result<Token, JsonError>;
  fn next(&mut self) -> Option<Self::Item> {
    self.next_token().transpose()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::io::SliceSource;

  fn tokens_with(json: &str, config: &ParserConfig) -> Result<Vec<Token>, JsonError> {
    Tokenizer::new(SliceSource::new(json.as_bytes()), config).collect()
  }

  fn tokens(json: &str) -> Vec<Token> {
    tokens_with(json, &ParserConfig::default()).unwrap()
  }

  fn kind(error: JsonError) -> ParseErrorKind {
    match error {
      JsonError::Parse(error) => error.kind,
      other => panic!("not a parse error: {other:?}"),
    }
  }

  fn strict_error(json: &str) -> ParseErrorKind {
    kind(tokens_with(json, &ParserConfig::default().strict()).unwrap_err())
  }

  fn string(s: &str) -> Token {
    Token::String(JsonString::from(s))
  }

  #[test]
  fn structure() {
    assert_eq!(
      tokens(r#" {"a": [1, true, null], "b": {}} "#),
      [
        Token::StartObject,
        Token::FieldName("a".to_owned()),
        Token::StartArray,
        Token::Number(Number::Int(1)),
        Token::Bool(true),
        Token::Null,
        Token::EndArray,
        Token::FieldName("b".to_owned()),
        Token::StartObject,
        Token::EndObject,
        Token::EndObject,
      ]
    );
    assert_eq!(tokens("\"root\""), [string("root")]);
  }

  #[test]
  fn stops_after_root() {
    let json = b"[1] [2]";
    let mut tokenizer = Tokenizer::new(SliceSource::new(json), &ParserConfig::default());
    assert_eq!(tokenizer.next_token().unwrap(), Some(Token::StartArray));
    assert_eq!(tokenizer.next_token().unwrap(), Some(Token::Number(Number::Int(1))));
    assert_eq!(tokenizer.next_token().unwrap(), Some(Token::EndArray));
    assert_eq!(tokenizer.next_token().unwrap(), None);
    assert_eq!(tokenizer.into_source().remaining(), b" [2]");
  }

  #[test]
  fn escapes() {
    assert_eq!(
      tokens(r#""\"\\\/\b\f\n\r\té😀""#),
      [string("\"\\/\u{8}\u{c}\n\r\t\u{e9}\u{1f600}")]
    );
    // Unpaired surrogates are replaced
    assert_eq!(tokens(r#""\ud83d!""#), [string("\u{fffd}!")]);
    assert_eq!(tokens(r#""\ude00\ud83dA""#), [string("\u{fffd}\u{fffd}A")]);
    // Unknown escapes yield the escaped character
    assert_eq!(tokens(r#""\q\'""#), [string("q'")]);
    assert_eq!(tokens("\"a\u{1}\tb\""), [string("a\u{1}\tb")]);

    assert_eq!(strict_error(r#""\q""#), ParseErrorKind::InvalidEscape('q'));
    assert_eq!(strict_error(r#""\ud83d""#), ParseErrorKind::InvalidUnicodeEscape);
    assert_eq!(strict_error(r#""\u12g4""#), ParseErrorKind::InvalidUnicodeEscape);
    assert_eq!(strict_error("\"a\u{1}\""), ParseErrorKind::ControlCharacter('\u{1}'));
    assert_eq!(strict_error("\"abc"), ParseErrorKind::UnexpectedEof);
  }

  #[test]
  fn utf8() {
    assert_eq!(tokens("\"é😀\u{2028}\""), [string("é😀\u{2028}")]);
    let invalid = tokens_with_bytes(b"\"\xc0\xaf\"").unwrap_err();
    assert_eq!(kind(invalid), ParseErrorKind::InvalidUtf8);
  }

  fn tokens_with_bytes(json: &[u8]) -> Result<Vec<Token>, JsonError> {
    Tokenizer::new(SliceSource::new(json), &ParserConfig::default()).collect()
  }

  #[test]
  fn lenient() {
    assert_eq!(
      tokens("// comment\n{a: 'b'; # comment\n TRUE: Null, /* block */ n: 0x10, w: bare-word,}"),
      [
        Token::StartObject,
        Token::FieldName("a".to_owned()),
        string("b"),
        Token::FieldName("TRUE".to_owned()),
        Token::Null,
        Token::FieldName("n".to_owned()),
        Token::Number(Number::Int(16)),
        Token::FieldName("w".to_owned()),
        string("bare-word"),
        Token::EndObject,
      ]
    );
    assert_eq!(tokens("[007, NaN, .5,]").len(), 5);
  }

  #[test]
  fn glitches_are_retryable() {
    let mut tokenizer = Tokenizer::new(SliceSource::new(b"[1 @, 2]"), &ParserConfig::default());
    assert_eq!(tokenizer.next_token().unwrap(), Some(Token::StartArray));
    assert_eq!(tokenizer.next_token().unwrap(), Some(Token::Number(Number::Int(1))));
    let JsonError::Parse(error) = tokenizer.next_token().unwrap_err() else { panic!() };
    assert!(error.is_lexical());
    assert_eq!(error.kind, ParseErrorKind::UnexpectedCharacter('@'));
    assert_eq!(error.position, Position { line: 1, column: 4, offset: 3 });
    assert_eq!(error.snippet, ", 2]");
    assert_eq!(tokenizer.next_token().unwrap(), Some(Token::Number(Number::Int(2))));
    assert_eq!(tokenizer.next_token().unwrap(), Some(Token::EndArray));
    assert_eq!(tokenizer.next_token().unwrap(), None);
  }

  #[test]
  fn strict() {
    assert_eq!(strict_error("[1,]"), ParseErrorKind::TrailingSeparator);
    assert_eq!(strict_error("{\"a\":1,}"), ParseErrorKind::TrailingSeparator);
    assert_eq!(strict_error("[1;2]"), ParseErrorKind::UnexpectedCharacter(';'));
    assert_eq!(strict_error("{a:1}"), ParseErrorKind::UnexpectedCharacter('a'));
    assert_eq!(strict_error("['a']"), ParseErrorKind::UnexpectedCharacter('\''));
    assert_eq!(strict_error("[01]"), ParseErrorKind::InvalidNumber("01".to_owned()));
    assert_eq!(strict_error("[True]"), ParseErrorKind::InvalidLiteral("True".to_owned()));
    assert_eq!(strict_error("// comment\n1"), ParseErrorKind::InvalidLiteral("//".to_owned()));
    assert_eq!(strict_error("{\"a\" 1}"), ParseErrorKind::ExpectedColon);
    assert_eq!(strict_error("1e5000"), ParseErrorKind::InvalidNumber("1e5000".to_owned()));
  }

  #[test]
  fn positions() {
    let JsonError::Parse(error) =
      tokens_with("{\n  \"a\": 1,\n  \"b\" 2\n}", &ParserConfig::default()).unwrap_err()
    else {
      panic!()
    };
    assert_eq!(error.kind, ParseErrorKind::ExpectedColon);
    assert_eq!(error.position, Position { line: 3, column: 7, offset: 18 });
    assert_eq!(error.snippet, "2\n}");
    assert_eq!(error.to_string(), "expected `:` after key at line 3, column 7 (near `2\n}`)");
  }

  #[test]
  fn depth_limit() {
    let config = ParserConfig::default().with_max_depth(3);
    assert!(tokens_with("[[[]]]", &config).is_ok());
    assert_eq!(
      kind(tokens_with("[[[[]]]]", &config).unwrap_err()),
      ParseErrorKind::DepthExceeded(3)
    );
    assert_eq!(
      kind(tokens_with(r#"{"a":{"b":{"c":[]}}}"#, &config).unwrap_err()),
      ParseErrorKind::DepthExceeded(3)
    );
  }

  #[test]
  fn spills_long_values() {
    let dir = tempfile::tempdir().unwrap();
    let config = ParserConfig::default()
      .with_spill(crate::TempFileProvider::in_dir(dir.path()))
      .with_spill_threshold(5);
    let tokens = tokens_with(r#"{"long key": "long value", "k": "short"}"#, &config).unwrap();
    assert_eq!(tokens[1], Token::FieldName("long key".to_owned()));
    let Token::String(long) = &tokens[2] else { panic!() };
    assert!(long.is_spilled());
    assert_eq!(long.to_str().unwrap(), "long value");
    let Token::String(short) = &tokens[4] else { panic!() };
    assert!(!short.is_spilled());
  }
}
