//! Serializing trees as strict JSON.

use std::{
  io::{self, Write},
  slice,
};

use data_encoding::BASE64;
use indexmap::map;

use crate::{
  Binary, Container, JsonError, JsonString, Number, Value, WriterConfig, value::CHUNK_SIZE,
};

/// The amount of bytes base64-encoded at once. A multiple of three, so padding only occurs at the
/// end.
const BASE64_BLOCK: usize = 3 * 1024;

/// An array or object whose entries are being written.
enum Frame<'v> {
  Array(slice::Iter<'v, Value>),
  Object(map::Iter<'v, String, Value>),
}

/// A serializer, writing values to an [`io::Write`].
///
/// Output is buffered internally and written in blocks. Nothing written is retracted on error, so
/// a failed serialization may leave a prefix of the document in the sink.
#[derive(Debug)]
pub struct Serializer<W: Write> {
  sink: W,
  config: WriterConfig,
  buf: Vec<u8>,
}

impl<W: Write> Serializer<W> {
  /// Create a new serializer.
  pub fn new(sink: W, config: WriterConfig) -> Self {
    Self { sink, config, buf: Vec::with_capacity(CHUNK_SIZE) }
  }

  /// The sink written to.
  pub fn into_inner(self) -> W {
    self.sink
  }

  fn flush_buf(&mut self) -> io::Result<()> {
    self.sink.write_all(&self.buf)?;
    self.buf.clear();
    Ok(())
  }

  #[inline(always)]
  fn push(&mut self, bytes: &[u8]) -> io::Result<()> {
    if (self.buf.len() + bytes.len()) > CHUNK_SIZE {
      self.flush_buf()?;
      if bytes.len() >= CHUNK_SIZE {
        return self.sink.write_all(bytes);
      }
    }
    self.buf.extend_from_slice(bytes);
    Ok(())
  }

  fn newline(&mut self, depth: usize) -> io::Result<()> {
    if let Some(indent) = self.config.indent {
      self.push(b"\n")?;
      for _ in 0 .. (indent * depth) {
        self.push(b" ")?;
      }
    }
    Ok(())
  }

  /// Serialize `value`, then flush the sink.
  pub fn serialize(&mut self, value: &Value) -> Result<(), JsonError> {
    let mut stack = vec![];
    // If the next entry is the first within its container
    let mut first = self.value(value, &mut stack)?;
    loop {
      let depth = stack.len();
      let (key, value) = match stack.last_mut() {
        None => break,
        Some(Frame::Array(iter)) => match iter.next() {
          Some(value) => (None, value),
          None => {
            stack.pop();
            self.newline(depth - 1)?;
            self.push(b"]")?;
            first = false;
            continue;
          }
        },
        Some(Frame::Object(iter)) => match iter.next() {
          Some((key, value)) => (Some(key), value),
          None => {
            stack.pop();
            self.newline(depth - 1)?;
            self.push(b"}")?;
            first = false;
            continue;
          }
        },
      };

      if !first {
        self.push(b",")?;
      }
      self.newline(depth)?;
      if let Some(key) = key {
        self.string(key)?;
        let separator: &[u8] = if self.config.indent.is_some() { b": " } else { b":" };
        self.push(separator)?;
      }
      first = self.value(value, &mut stack)?;
    }
    self.flush_buf()?;
    self.sink.flush()?;
    Ok(())
  }

  /// Write a leaf, or open a container by pushing it onto the stack.
  ///
  /// Returns if a container was opened.
  fn value<'v>(
    &mut self,
    value: &'v Value,
    stack: &mut Vec<Frame<'v>>,
  ) -> Result<bool, JsonError> {
    match value {
      Value::Null => self.push(b"null")?,
      Value::Bool(true) => self.push(b"true")?,
      Value::Bool(false) => self.push(b"false")?,
      Value::Number(number) => self.number(number)?,
      Value::String(string) => self.json_string(string)?,
      Value::Binary(binary) => self.binary(binary)?,
      Value::Array(array) if array.is_empty() => self.push(b"[]")?,
      Value::Object(object) if object.is_empty() => self.push(b"{}")?,
      Value::Array(array) => {
        self.push(b"[")?;
        stack.push(Frame::Array(array.iter()));
        return Ok(true);
      }
      Value::Object(object) => {
        self.push(b"{")?;
        stack.push(Frame::Object(object.iter()));
        return Ok(true);
      }
    }
    Ok(false)
  }

  fn number(&mut self, number: &Number) -> Result<(), JsonError> {
    if !number.is_finite() {
      Err(JsonError::conversion(number, "a JSON number"))?;
    }
    self.push(number.to_string().as_bytes())?;
    Ok(())
  }

  fn binary(&mut self, binary: &Binary) -> io::Result<()> {
    self.push(b"\"")?;
    for block in binary.as_bytes().chunks(BASE64_BLOCK) {
      self.push(BASE64.encode(block).as_bytes())?;
    }
    self.push(b"\"")
  }

  fn json_string(&mut self, string: &JsonString) -> Result<(), JsonError> {
    self.push(b"\"")?;
    string.for_each_chunk(|chunk| -> Result<(), JsonError> { Ok(self.escaped(chunk)?) })?;
    self.push(b"\"")?;
    Ok(())
  }

  fn string(&mut self, string: &str) -> io::Result<()> {
    self.push(b"\"")?;
    self.escaped(string)?;
    self.push(b"\"")
  }

  /// Write `string`'s contents, escaping as necessary.
  fn escaped(&mut self, string: &str) -> io::Result<()> {
    let mut unescaped_from = 0;
    for (i, char) in string.char_indices() {
      let escape = match char {
        '"' | '\\' | '\u{0}' ..= '\u{1f}' | '\u{2028}' | '\u{2029}' => true,
        '\u{80}' .. => self.config.ascii_only,
        _ => false,
      };
      if escape {
        self.push(&string.as_bytes()[unescaped_from .. i])?;
        self.escape(char)?;
        unescaped_from = i + char.len_utf8();
      }
    }
    self.push(&string.as_bytes()[unescaped_from ..])
  }

  fn escape(&mut self, char: char) -> io::Result<()> {
    // Handle characters with aliases
    let alias = match char {
      '"' => Some(b'"'),
      '\\' => Some(b'\\'),
      '\u{8}' => Some(b'b'),
      '\u{c}' => Some(b'f'),
      '\n' => Some(b'n'),
      '\r' => Some(b'r'),
      '\t' => Some(b't'),
      _ => None,
    };
    if let Some(alias) = alias {
      return self.push(&[b'\\', alias]);
    }

    // Encode this character as UTF-16, with each element escaped
    let mut elems = [0; 2];
    for elem in char.encode_utf16(&mut elems) {
      let mut escape = *b"\\u0000";
      for n in 0 .. 4 {
        // Safe to cast as this is masked with 0b1111 (a 4-bit value)
        let nibble = ((*elem >> (12 - (n * 4))) & 0b1111) as u8;
        escape[2 + n] =
          if let Some(value) = nibble.checked_sub(10) { b'a' + value } else { b'0' + nibble };
      }
      self.push(&escape)?;
    }
    Ok(())
  }
}

impl Value {
  /// Write this value as compact JSON.
  ///
  /// With `ascii_only`, every non-ASCII character is escaped.
  pub fn write(&self, sink: &mut impl Write, ascii_only: bool) -> Result<(), JsonError> {
    self.write_with(sink, WriterConfig::compact().ascii_only(ascii_only))
  }

  /// Write this value as JSON, formatted per `config`.
  pub fn write_with(&self, sink: &mut impl Write, config: WriterConfig) -> Result<(), JsonError> {
    Serializer::new(sink, config).serialize(self)
  }

  /// This value as compact JSON.
  pub fn to_bytes(&self) -> Result<Vec<u8>, JsonError> {
    let mut bytes = vec![];
    self.write(&mut bytes, false)?;
    Ok(bytes)
  }

  /// This value as a compact JSON string.
  pub fn to_json_string(&self) -> Result<String, JsonError> {
    into_string(self.to_bytes()?)
  }

  /// This value as a JSON string, with entries on their own lines indented by `indent` spaces.
  pub fn to_pretty_string(&self, indent: usize) -> Result<String, JsonError> {
    let mut bytes = vec![];
    self.write_with(&mut bytes, WriterConfig::pretty(indent))?;
    into_string(bytes)
  }
}

fn into_string(bytes: Vec<u8>) -> Result<String, JsonError> {
  Ok(String::from_utf8(bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?)
}
