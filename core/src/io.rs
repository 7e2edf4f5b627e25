//! Sources of bytes to tokenize.

use std::io::{self, Read};

/// The size of the buffer `ReaderSource` refills.
const BUFFER_SIZE: usize = 8192;

/// The furthest ahead a source may be peeked.
pub(crate) const MAX_PEEK: usize = 64;

/// A source of bytes which can be peeked into.
pub trait Source {
  /// Peek at the byte `i` positions ahead, without consuming it.
  ///
  /// Returns `None` if the input ends first. `i` MUST be less than 64.
  fn peek(&mut self, i: usize) -> io::Result<Option<u8>>;

  /// Consume a byte.
  fn read_byte(&mut self) -> io::Result<Option<u8>>;
}

/// A source over bytes already in memory.
#[derive(Clone, Copy, Debug)]
pub struct SliceSource<'a> {
  bytes: &'a [u8],
}

impl<'a> SliceSource<'a> {
  /// Create a source over `bytes`.
  #[must_use]
  pub fn new(bytes: &'a [u8]) -> Self {
    Self { bytes }
  }

  /// The bytes not yet consumed.
  #[must_use]
  pub fn remaining(&self) -> &'a [u8] {
    self.bytes
  }
}

impl Source for SliceSource<'_> {
  #[inline(always)]
  fn peek(&mut self, i: usize) -> io::Result<Option<u8>> {
    Ok(self.bytes.get(i).copied())
  }

  #[inline(always)]
  fn read_byte(&mut self) -> io::Result<Option<u8>> {
    Ok(self.bytes.split_first().map(|(byte, rest)| {
      self.bytes = rest;
      *byte
    }))
  }
}

/// A source over a reader, read incrementally.
///
/// This reads ahead of what's consumed, so the underlying reader may be advanced past the end of
/// the value read from it.
#[derive(Debug)]
pub struct ReaderSource<R> {
  reader: R,
  buf: Box<[u8]>,
  start: usize,
  end: usize,
  eof: bool,
}

impl<R: Read> ReaderSource<R> {
  /// Create a source over `reader`.
  pub fn new(reader: R) -> Self {
    Self { reader, buf: vec![0; BUFFER_SIZE].into_boxed_slice(), start: 0, end: 0, eof: false }
  }

  /// Buffer at least `len` bytes, unless the reader is exhausted first.
  fn fill(&mut self, len: usize) -> io::Result<()> {
    while ((self.end - self.start) < len) && (!self.eof) {
      if self.end == self.buf.len() {
        self.buf.copy_within(self.start .. self.end, 0);
        self.end -= self.start;
        self.start = 0;
      }
      match self.reader.read(&mut self.buf[self.end ..]) {
        Ok(0) => self.eof = true,
        Ok(read) => self.end += read,
        Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
        Err(e) => Err(e)?,
      }
    }
    Ok(())
  }
}

impl<R: Read> Source for ReaderSource<R> {
  fn peek(&mut self, i: usize) -> io::Result<Option<u8>> {
    debug_assert!(i < MAX_PEEK);
    self.fill(i + 1)?;
    Ok(self.buf[self.start .. self.end].get(i).copied())
  }

  #[inline(always)]
  fn read_byte(&mut self) -> io::Result<Option<u8>> {
    self.fill(1)?;
    if self.start == self.end {
      return Ok(None);
    }
    let byte = self.buf[self.start];
    self.start += 1;
    Ok(Some(byte))
  }
}

#[test]
fn reader_source_refills() {
  // A reader which only yields a few bytes at a time
  struct Trickle<'a>(&'a [u8]);
  impl Read for Trickle<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
      let len = buf.len().min(self.0.len()).min(3);
      buf[.. len].copy_from_slice(&self.0[.. len]);
      self.0 = &self.0[len ..];
      Ok(len)
    }
  }

  let bytes = (0 .. (3 * BUFFER_SIZE)).map(|i| (i % 251) as u8).collect::<Vec<_>>();
  let mut source = ReaderSource::new(Trickle(&bytes));
  for (i, expected) in bytes.iter().enumerate() {
    assert_eq!(source.peek(0).unwrap(), Some(*expected));
    if let Some(ahead) = bytes.get(i + 10) {
      assert_eq!(source.peek(10).unwrap(), Some(*ahead));
    }
    assert_eq!(source.read_byte().unwrap(), Some(*expected));
  }
  assert_eq!(source.peek(0).unwrap(), None);
  assert_eq!(source.read_byte().unwrap(), None);
}
