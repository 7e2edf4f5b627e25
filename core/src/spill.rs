//! Spilling of oversized strings to temporary files.
//!
//! While a string is read, its characters are pushed into a [`StringSink`]. A [`SpillingSink`]
//! buffers in memory until a threshold is crossed, at which point it requests a file from its
//! [`SpillProvider`] and streams the remainder there. The resulting [`SpilledString`] deletes
//! its file once the last handle to it is dropped.

use std::{
  fmt,
  fs::File,
  io::{self, BufReader, BufWriter, Read, Write},
  path::{Path, PathBuf},
  sync::Arc,
};

use tempfile::{NamedTempFile, TempPath};
use tracing::{debug, warn};

use crate::{JsonError, JsonString};

/// A source of files to spill strings into.
pub trait SpillProvider: fmt::Debug + Send + Sync {
  /// Create a new, empty file.
  ///
  /// The file is deleted when the returned handle, or the `TempPath` it's converted into, is
  /// dropped.
  fn create(&self) -> io::Result<NamedTempFile>;
}

/// A provider of temporary files, within the system's temporary directory or a chosen one.
#[derive(Clone, Default, Debug)]
pub struct TempFileProvider {
  dir: Option<PathBuf>,
}

impl TempFileProvider {
  /// A provider creating files in the system's temporary directory.
  #[must_use]
  pub fn new() -> Self {
    Self::default()
  }

  /// A provider creating files in `dir`.
  #[must_use]
  pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
    Self { dir: Some(dir.into()) }
  }
}

impl SpillProvider for TempFileProvider {
  fn create(&self) -> io::Result<NamedTempFile> {
    let mut builder = tempfile::Builder::new();
    builder.prefix("json-tree-").suffix(".spill");
    match &self.dir {
      Some(dir) => builder.tempfile_in(dir),
      None => builder.tempfile(),
    }
  }
}

/// A spilled file, deleted on drop.
struct SpillFile {
  // Only `None` once closed
  path: Option<TempPath>,
  len: u64,
}

impl Drop for SpillFile {
  fn drop(&mut self) {
    if let Some(path) = self.path.take() {
      let shown = path.display().to_string();
      if let Err(e) = path.close() {
        warn!(path = %shown, error = %e, "failed to delete spill file");
      }
    }
  }
}

/// A string held within a temporary file.
///
/// Handles are cheap to clone and share the file, which is deleted when the last handle is
/// dropped. Reads open independent handles to the file, each with their own cursor.
#[derive(Clone)]
pub struct SpilledString {
  file: Arc<SpillFile>,
}

impl SpilledString {
  fn new(path: TempPath, len: u64) -> Self {
    Self { file: Arc::new(SpillFile { path: Some(path), len }) }
  }

  /// Write `content` to a new file from `provider`.
  pub fn spill(provider: &dyn SpillProvider, content: &str) -> io::Result<Self> {
    let (file, path) = provider.create()?.into_parts();
    let mut writer = BufWriter::new(file);
    writer.write_all(content.as_bytes())?;
    writer.into_inner().map_err(io::IntoInnerError::into_error)?;
    Ok(Self::new(path, content.len() as u64))
  }

  /// The length of the string, in bytes.
  #[must_use]
  pub fn len(&self) -> u64 {
    self.file.len
  }

  /// If the string is empty.
  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.file.len == 0
  }

  /// The path of the backing file.
  #[must_use]
  pub fn path(&self) -> &Path {
    // The path is only taken once the last handle is dropped or disposed of
    self.file.path.as_deref().unwrap_or(Path::new(""))
  }

  /// Open a reader for the UTF-8 encoding of the string.
  pub fn reader(&self) -> io::Result<BufReader<File>> {
    File::open(self.path()).map(BufReader::new)
  }

  /// Read the string into memory.
  pub fn read_to_string(&self) -> io::Result<String> {
    let mut res = String::with_capacity(usize::try_from(self.file.len).unwrap_or(0));
    self.reader()?.read_to_string(&mut res)?;
    Ok(res)
  }

  /// Dispose of this handle, deleting the file if this was the last handle to it.
  ///
  /// Dropping the last handle also deletes the file, without reporting failures to do so.
  pub fn dispose(self) -> io::Result<()> {
    match Arc::try_unwrap(self.file) {
      Ok(mut file) => file.path.take().map_or(Ok(()), TempPath::close),
      Err(_) => Ok(()),
    }
  }
}

impl fmt::Debug for SpilledString {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("SpilledString").field("path", &self.path()).field("len", &self.len()).finish()
  }
}

/// A destination for the characters of a string being read.
pub trait StringSink {
  /// The string produced.
  type Output;

  /// Push a character.
  fn push(&mut self, c: char) -> Result<(), JsonError>;

  /// Finish the string.
  fn finish(self) -> Result<Self::Output, JsonError>;
}

impl StringSink for String {
  type Output = String;

  #[inline(always)]
  fn push(&mut self, c: char) -> Result<(), JsonError> {
    String::push(self, c);
    Ok(())
  }

  fn finish(self) -> Result<String, JsonError> {
    Ok(self)
  }
}

/// A sink which moves to a file once its contents exceed a threshold.
#[derive(Debug)]
pub struct SpillingSink {
  buffer: String,
  threshold: usize,
  provider: Arc<dyn SpillProvider>,
  file: Option<(BufWriter<File>, TempPath)>,
  written: u64,
  // Set if the provider failed, in which case we don't retry for this string
  failed: bool,
}

impl SpillingSink {
  /// Create a sink which spills to a file from `provider` once it exceeds `threshold` bytes.
  #[must_use]
  pub fn new(threshold: usize, provider: Arc<dyn SpillProvider>) -> Self {
    Self { buffer: String::new(), threshold, provider, file: None, written: 0, failed: false }
  }

  fn spill(&mut self) -> Result<(), JsonError> {
    let (file, path) = match self.provider.create() {
      Ok(file) => file.into_parts(),
      Err(e) => {
        warn!(error = %e, "failed to create a spill file, keeping the string in memory");
        self.failed = true;
        return Ok(());
      }
    };
    debug!(
      threshold = self.threshold,
      bytes = self.buffer.len(),
      path = %path.display(),
      "spilling string to a file",
    );
    let mut writer = BufWriter::new(file);
    writer.write_all(self.buffer.as_bytes())?;
    self.written = self.buffer.len() as u64;
    self.buffer = String::new();
    self.file = Some((writer, path));
    Ok(())
  }
}

impl StringSink for SpillingSink {
  type Output = JsonString;

  fn push(&mut self, c: char) -> Result<(), JsonError> {
    if let Some((writer, _)) = &mut self.file {
      let mut utf8 = [0; 4];
      let utf8 = c.encode_utf8(&mut utf8);
      writer.write_all(utf8.as_bytes())?;
      self.written += utf8.len() as u64;
      return Ok(());
    }

    self.buffer.push(c);
    if (self.buffer.len() > self.threshold) && (!self.failed) {
      self.spill()?;
    }
    Ok(())
  }

  fn finish(self) -> Result<JsonString, JsonError> {
    match self.file {
      Some((writer, path)) => {
        writer.into_inner().map_err(io::IntoInnerError::into_error)?;
        Ok(JsonString::Spilled(SpilledString::new(path, self.written)))
      }
      None => Ok(JsonString::Inline(self.buffer)),
    }
  }
}
