#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]
#![deny(missing_docs)]

use std::io;

use embedded_io::{Error, ErrorKind, Read, Write};

fn io_error(error: impl Error) -> io::Error {
  match error.kind() {
    ErrorKind::Interrupted => io::Error::from(io::ErrorKind::Interrupted),
    kind => io::Error::other(format!("embedded-io error: {kind:?}")),
  }
}

/// An adapter from [`embedded_io::Read`] to [`std::io::Read`], for `json_tree::parse_reader`.
#[derive(Debug)]
pub struct ReadAdapter<R: Read> {
  reader: R,
}

impl<R: Read> From<R> for ReadAdapter<R> {
  fn from(reader: R) -> Self {
    Self { reader }
  }
}

impl<R: Read> ReadAdapter<R> {
  /// The underlying reader.
  pub fn into_inner(self) -> R {
    self.reader
  }
}

impl<R: Read> io::Read for ReadAdapter<R> {
  #[inline(always)]
  fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
    self.reader.read(buf).map_err(io_error)
  }
}

/// An adapter from [`embedded_io::Write`] to [`std::io::Write`], for `json_tree::Value::write`.
#[derive(Debug)]
pub struct WriteAdapter<W: Write> {
  writer: W,
}

impl<W: Write> From<W> for WriteAdapter<W> {
  fn from(writer: W) -> Self {
    Self { writer }
  }
}

impl<W: Write> WriteAdapter<W> {
  /// The underlying writer.
  pub fn into_inner(self) -> W {
    self.writer
  }
}

impl<W: Write> io::Write for WriteAdapter<W> {
  #[inline(always)]
  fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
    self.writer.write(buf).map_err(io_error)
  }

  fn flush(&mut self) -> io::Result<()> {
    self.writer.flush().map_err(io_error)
  }
}

#[test]
fn test_read() {
  use json_tree::Container;

  const SERIALIZATION: &[u8] = br#"{ "hello": "goodbye" }"#;

  let reader = ReadAdapter::from(SERIALIZATION);
  let value = json_tree::parse_reader(reader).unwrap();
  let object = value.as_object().unwrap();
  assert_eq!(object.len(), 1);
  assert_eq!(object.get_string("hello").unwrap(), "goodbye");
}

#[test]
fn test_write() {
  let value = json_tree::parse(r#"{ "hello": ["goodbye", 1] }"#).unwrap();

  let mut buf = [0; 64];
  let mut writer = WriteAdapter::from(&mut buf[..]);
  value.write(&mut writer, false).unwrap();
  let remaining = writer.into_inner().len();
  let written = 64 - remaining;
  assert_eq!(&buf[.. written], br#"{"hello":["goodbye",1]}"#);

  // A full sink surfaces as an error
  let mut small = [0; 4];
  assert!(value.write(&mut WriteAdapter::from(&mut small[..]), false).is_err());
}
