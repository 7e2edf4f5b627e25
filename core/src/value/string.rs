use std::{
  borrow::Cow,
  fmt,
  hash::{Hash, Hasher},
  io::{self, Read},
  sync::Arc,
};

use tracing::warn;

use crate::SpilledString;

/// The size of the blocks spilled strings are streamed in.
pub(crate) const CHUNK_SIZE: usize = 8192;

/// A foreign object which renders itself as a JSON string.
pub trait JsonStringLike: fmt::Debug + Send + Sync {
  /// The string this object is represented by.
  fn json_string(&self) -> Cow<'_, str>;
}

/// A string leaf.
///
/// Every representation is equal to, and hashes the same as, every other representation of the
/// same contents.
#[derive(Clone, Debug)]
pub enum JsonString {
  /// A string held in memory.
  Inline(String),
  /// A string held within a temporary file.
  Spilled(SpilledString),
  /// A foreign object, rendered on demand.
  Rendered(Arc<dyn JsonStringLike>),
}

impl JsonString {
  /// If this string is held within a file.
  #[must_use]
  pub fn is_spilled(&self) -> bool {
    matches!(self, JsonString::Spilled(_))
  }

  /// The string, if it's held in memory.
  #[must_use]
  pub fn as_inline(&self) -> Option<&str> {
    match self {
      JsonString::Inline(s) => Some(s),
      _ => None,
    }
  }

  /// The length of the string, in bytes.
  #[must_use]
  pub fn len(&self) -> u64 {
    match self {
      JsonString::Inline(s) => s.len() as u64,
      JsonString::Spilled(s) => s.len(),
      JsonString::Rendered(r) => r.json_string().len() as u64,
    }
  }

  /// If the string is empty.
  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// The string's contents, reading them into memory if spilled.
  pub fn to_str(&self) -> io::Result<Cow<'_, str>> {
    Ok(match self {
      JsonString::Inline(s) => Cow::Borrowed(s),
      JsonString::Spilled(s) => Cow::Owned(s.read_to_string()?),
      JsonString::Rendered(r) => r.json_string(),
    })
  }

  /// Call `f` with successive pieces of the string.
  ///
  /// Spilled strings are streamed in blocks, without ever being entirely in memory.
  pub(crate) fn for_each_chunk<E: From<io::Error>>(
    &self,
    mut f: impl FnMut(&str) -> Result<(), E>,
  ) -> Result<(), E> {
    let spilled = match self {
      JsonString::Inline(s) => return f(s),
      JsonString::Rendered(r) => return f(&r.json_string()),
      JsonString::Spilled(spilled) => spilled,
    };

    let mut reader = spilled.reader()?;
    let mut buf = vec![0; CHUNK_SIZE];
    // The amount of bytes at the start of `buf` which are an incomplete character
    let mut carry = 0;
    loop {
      let read = reader.read(&mut buf[carry ..])?;
      if read == 0 {
        if carry != 0 {
          Err(io::Error::new(io::ErrorKind::InvalidData, "spilled string ended mid-character"))?;
        }
        return Ok(());
      }
      let filled = carry + read;
      let valid = match core::str::from_utf8(&buf[.. filled]) {
        Ok(valid) => valid.len(),
        Err(e) if e.error_len().is_none() => e.valid_up_to(),
        Err(e) => Err(io::Error::new(io::ErrorKind::InvalidData, e))?,
      };
      f(core::str::from_utf8(&buf[.. valid])
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?)?;
      buf.copy_within(valid .. filled, 0);
      carry = filled - valid;
    }
  }

  fn open(&self) -> io::Result<Box<dyn Read + '_>> {
    Ok(match self {
      JsonString::Inline(s) => Box::new(s.as_bytes()),
      JsonString::Spilled(s) => Box::new(s.reader()?),
      JsonString::Rendered(r) => Box::new(io::Cursor::new(r.json_string().into_owned())),
    })
  }

  /// Read the string's bytes in fixed-size blocks, so all representations hash identically.
  fn for_each_block(&self, mut f: impl FnMut(&[u8])) -> io::Result<()> {
    let mut reader = self.open()?;
    let mut block = vec![0; CHUNK_SIZE];
    loop {
      let filled = fill(&mut reader, &mut block)?;
      if filled == 0 {
        return Ok(());
      }
      f(&block[.. filled]);
      if filled < block.len() {
        return Ok(());
      }
    }
  }

  fn contents_eq(&self, other: &Self) -> io::Result<bool> {
    if let (Some(a), Some(b)) = (self.as_inline(), other.as_inline()) {
      return Ok(a == b);
    }
    if self.len() != other.len() {
      return Ok(false);
    }
    let (mut a, mut b) = (self.open()?, other.open()?);
    let (mut a_block, mut b_block) = (vec![0; CHUNK_SIZE], vec![0; CHUNK_SIZE]);
    loop {
      let a_filled = fill(&mut a, &mut a_block)?;
      let b_filled = fill(&mut b, &mut b_block)?;
      if a_block[.. a_filled] != b_block[.. b_filled] {
        return Ok(false);
      }
      if a_filled < CHUNK_SIZE {
        return Ok(true);
      }
    }
  }
}

/// Read until `block` is full or the reader is exhausted.
fn fill(reader: &mut impl Read, block: &mut [u8]) -> io::Result<usize> {
  let mut filled = 0;
  while filled < block.len() {
    match reader.read(&mut block[filled ..])? {
      0 => break,
      read => filled += read,
    }
  }
  Ok(filled)
}

impl PartialEq for JsonString {
  fn eq(&self, other: &Self) -> bool {
    self.contents_eq(other).unwrap_or_else(|e| {
      warn!(error = %e, "failed to read a spilled string for comparison");
      false
    })
  }
}
impl Eq for JsonString {}

impl Hash for JsonString {
  fn hash<H: Hasher>(&self, state: &mut H) {
    if let Err(e) = self.for_each_block(|block| state.write(block)) {
      warn!(error = %e, "failed to read a spilled string for hashing");
    }
    state.write_u8(0xff);
  }
}

impl From<String> for JsonString {
  fn from(s: String) -> Self {
    JsonString::Inline(s)
  }
}

impl From<&str> for JsonString {
  fn from(s: &str) -> Self {
    JsonString::Inline(s.to_owned())
  }
}

impl From<SpilledString> for JsonString {
  fn from(s: SpilledString) -> Self {
    JsonString::Spilled(s)
  }
}

#[cfg(test)]
mod tests {
  use std::hash::{BuildHasher, RandomState};

  use super::*;
  use crate::TempFileProvider;

  #[derive(Debug)]
  struct Upper(&'static str);
  impl JsonStringLike for Upper {
    fn json_string(&self) -> Cow<'_, str> {
      Cow::Owned(self.0.to_uppercase())
    }
  }

  #[test]
  fn representations_are_interchangeable() {
    let content = "Ω".repeat(CHUNK_SIZE) + "abc";
    let inline = JsonString::from(content.as_str());
    let spilled =
      JsonString::from(SpilledString::spill(&TempFileProvider::new(), &content).unwrap());
    assert!(spilled.is_spilled());
    assert_eq!(inline, spilled);
    assert_eq!(spilled.to_str().unwrap(), content);

    let state = RandomState::new();
    assert_eq!(state.hash_one(&inline), state.hash_one(&spilled));

    let mut chunks = 0;
    let mut streamed = String::new();
    spilled
      .for_each_chunk(|chunk| {
        chunks += 1;
        streamed.push_str(chunk);
        Ok::<_, io::Error>(())
      })
      .unwrap();
    assert!(chunks > 1);
    assert_eq!(streamed, content);

    let different = JsonString::from(content.replace('a', "b"));
    assert_ne!(spilled, different);
  }

  #[test]
  fn rendered() {
    let rendered = JsonString::Rendered(Arc::new(Upper("shout")));
    assert_eq!(rendered.to_str().unwrap(), "SHOUT");
    assert_eq!(rendered, JsonString::from("SHOUT"));
    assert_eq!(rendered.len(), 5);
  }
}
