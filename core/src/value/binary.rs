use std::{fmt, sync::Arc};

/// An immutable blob of bytes.
///
/// Serialized as a base64-encoded string.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Binary(Arc<[u8]>);

impl Binary {
  /// The length of the blob.
  #[must_use]
  pub fn len(&self) -> usize {
    self.0.len()
  }

  /// If the blob is empty.
  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  /// The blob's bytes.
  #[must_use]
  pub fn as_bytes(&self) -> &[u8] {
    &self.0
  }
}

impl fmt::Debug for Binary {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Binary").field("len", &self.len()).finish_non_exhaustive()
  }
}

impl From<Vec<u8>> for Binary {
  fn from(bytes: Vec<u8>) -> Self {
    Self(bytes.into())
  }
}

impl From<&[u8]> for Binary {
  fn from(bytes: &[u8]) -> Self {
    Self(bytes.into())
  }
}

impl AsRef<[u8]> for Binary {
  fn as_ref(&self) -> &[u8] {
    &self.0
  }
}
