#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]
#![deny(missing_docs)]

use std::io::Read;

mod error;
pub use error::*;
mod number;
pub use number::Number;
mod spill;
pub use spill::*;
mod value;
pub use value::*;
mod config;
pub use config::*;

pub mod io;
mod stack;
mod lexer;
pub use lexer::{Token, Tokenizer};
mod parser;
pub use parser::Parser;
mod writer;
pub use writer::Serializer;
mod stream;
pub use stream::{JsonStream, PIPE_CAPACITY};

pub use bigdecimal::BigDecimal;
pub use num_bigint::BigInt;
pub use indexmap;

/// Parse a value, leniently.
pub fn parse(json: impl AsRef<[u8]>) -> Result<Value, JsonError> {
  parse_with(json, &ParserConfig::default())
}

/// Parse a value, per `config`.
pub fn parse_with(json: impl AsRef<[u8]>, config: &ParserConfig) -> Result<Value, JsonError> {
  Parser::from_slice(json.as_ref(), config).parse_value()
}

/// Parse a value from a reader, leniently.
///
/// The reader is read incrementally, and may be read past the end of the value.
pub fn parse_reader(reader: impl Read) -> Result<Value, JsonError> {
  parse_reader_with(reader, &ParserConfig::default())
}

/// Parse a value from a reader, per `config`.
pub fn parse_reader_with(reader: impl Read, config: &ParserConfig) -> Result<Value, JsonError> {
  Parser::from_reader(reader, config).parse_value()
}

/// Parse an object, leniently, failing if the root is of any other type.
pub fn parse_object(json: impl AsRef<[u8]>) -> Result<Object, JsonError> {
  parse_object_with(json, &ParserConfig::default())
}

/// Parse an object, per `config`, failing if the root is of any other type.
pub fn parse_object_with(
  json: impl AsRef<[u8]>,
  config: &ParserConfig,
) -> Result<Object, JsonError> {
  Parser::from_slice(json.as_ref(), config).parse_object()
}

/// Parse an array, leniently, failing if the root is of any other type.
pub fn parse_array(json: impl AsRef<[u8]>) -> Result<Array, JsonError> {
  parse_array_with(json, &ParserConfig::default())
}

/// Parse an array, per `config`, failing if the root is of any other type.
pub fn parse_array_with(json: impl AsRef<[u8]>, config: &ParserConfig) -> Result<Array, JsonError> {
  Parser::from_slice(json.as_ref(), config).parse_array()
}

/// Parse a single value, leniently, failing if anything other than whitespace or comments
/// follows it.
pub fn parse_fragment(fragment: &str) -> Result<Value, JsonError> {
  let mut parser = Parser::from_slice(fragment.as_bytes(), &ParserConfig::default());
  let value = parser.parse_value()?;
  parser.finish()?;
  Ok(value)
}
