use crate::{JsonError, JsonString, ParseErrorKind, SpillingSink, StringSink, io::Source};

use super::{Tokenizer, hex::read_hex, unicode::*};

const REPLACEMENT: char = '\u{fffd}';

impl<S: Source> Tokenizer<S> {
  /// Read a string value, spilling it if a provider is configured.
  pub(super) fn string_value(&mut self, quote: u8) -> Result<JsonString, JsonError> {
    match self.spill.clone() {
      Some(provider) => self.string(quote, SpillingSink::new(self.spill_threshold, provider)),
      None => self.string(quote, String::new()).map(JsonString::Inline),
    }
  }

  /// Read a quoted string into `sink`, with the source positioned at the opening quote.
  pub(super) fn string<K: StringSink>(
    &mut self,
    quote: u8,
    mut sink: K,
  ) -> Result<K::Output, JsonError> {
    self.read_byte()?;
    loop {
      let position = self.position;
      let Some(byte) = self.read_byte()? else {
        Err(self.error_at(ParseErrorKind::UnexpectedEof, position))?
      };
      match byte {
        _ if byte == quote => return sink.finish(),
        b'\\' => {
          let char = self.escape()?;
          sink.push(char)?;
        }
        0x00 .. 0x20 => {
          if self.strict {
            Err(self.error_at(ParseErrorKind::ControlCharacter(char::from(byte)), position))?;
          }
          sink.push(char::from(byte))?;
        }
        0x20 .. 0x80 => sink.push(char::from(byte))?,
        _ => {
          let char = self.read_non_ascii(byte)?;
          sink.push(char)?;
        }
      }
    }
  }

  /// Read an escape, with the backslash already consumed.
  fn escape(&mut self) -> Result<char, JsonError> {
    let position = self.position;
    let Some(byte) = self.read_byte()? else {
      Err(self.error_at(ParseErrorKind::UnexpectedEof, position))?
    };
    Ok(match byte {
      b'"' => '"',
      b'\\' => '\\',
      b'/' => '/',
      b'b' => '\u{8}',
      b'f' => '\u{c}',
      b'n' => '\n',
      b'r' => '\r',
      b't' => '\t',
      b'u' => self.unicode_escape(position)?,
      _ => {
        let char = if byte.is_ascii() { char::from(byte) } else { self.read_non_ascii(byte)? };
        if self.strict {
          Err(self.error_at(ParseErrorKind::InvalidEscape(char), position))?;
        }
        char
      }
    })
  }

  /// Read the four hex digits of a `\u` escape, and its low surrogate if it begins a pair.
  fn unicode_escape(&mut self, position: crate::Position) -> Result<char, JsonError> {
    let mut hex = [0; 4];
    for byte in &mut hex {
      let Some(read) = self.read_byte()? else {
        Err(self.error_at(ParseErrorKind::UnexpectedEof, position))?
      };
      *byte = read;
    }
    let Some(unit) = read_hex(hex) else {
      Err(self.error_at(ParseErrorKind::InvalidUnicodeEscape, position))?
    };

    match unit {
      0xd800 ..= 0xdbff => {
        // Only consume the following escape if it completes the pair
        if let Some(low) = self.peek_low_surrogate()? {
          for _ in 0 .. 6 {
            self.read_byte()?;
          }
          let high = u32::from(unit - 0xd800);
          let low = u32::from(low - 0xdc00);
          return Ok(char::from_u32(0x1_0000 + ((high << 10) | low)).unwrap_or(REPLACEMENT));
        }
        self.unpaired_surrogate(position)
      }
      0xdc00 ..= 0xdfff => self.unpaired_surrogate(position),
      _ => Ok(char::from_u32(u32::from(unit)).unwrap_or(REPLACEMENT)),
    }
  }

  fn peek_low_surrogate(&mut self) -> Result<Option<u16>, JsonError> {
    if (self.source.peek(0)? != Some(b'\\')) || (self.source.peek(1)? != Some(b'u')) {
      return Ok(None);
    }
    let mut hex = [0; 4];
    for (i, byte) in hex.iter_mut().enumerate() {
      let Some(peeked) = self.source.peek(2 + i)? else { return Ok(None) };
      *byte = peeked;
    }
    Ok(read_hex(hex).filter(|unit| (0xdc00 ..= 0xdfff).contains(unit)))
  }

  fn unpaired_surrogate(&mut self, position: crate::Position) -> Result<char, JsonError> {
    if self.strict {
      Err(self.error_at(ParseErrorKind::InvalidUnicodeEscape, position))?;
    }
    Ok(REPLACEMENT)
  }

  /// Read the rest of a non-ASCII character, given its first byte.
  pub(super) fn read_non_ascii(&mut self, first_byte: u8) -> Result<char, JsonError> {
    // The first byte was already consumed
    let mut position = self.position;
    position.offset -= 1;
    position.column -= 1;

    let utf8_codepoint_len = non_ascii_utf8_codepoint_len(first_byte);
    let mut utf8_codepoint = [0; 4];
    let utf8_codepoint = &mut utf8_codepoint[.. utf8_codepoint_len];
    utf8_codepoint[0] = first_byte;
    for byte in &mut utf8_codepoint[1 ..] {
      let Some(read) = self.read_byte()? else {
        Err(self.error_at(ParseErrorKind::InvalidUtf8, position))?
      };
      *byte = read;
    }
    match utf8_codepoint_to_char(utf8_codepoint) {
      Some(char) => Ok(char),
      None => Err(self.error_at(ParseErrorKind::InvalidUtf8, position)),
    }
  }
}
