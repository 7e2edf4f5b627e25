//! Reading a value's serialization incrementally, optionally produced by a worker thread.

use std::{
  io::{self, Cursor, Read, Write},
  sync::mpsc::{Receiver, SyncSender, sync_channel},
  thread::{self, JoinHandle},
};

use tracing::{debug, warn};

use crate::{Frozen, JsonError, Serializer, Value, WriterConfig, value::CHUNK_SIZE};

/// The amount of chunks a producer may have in flight before it blocks.
pub const PIPE_CAPACITY: usize = 4;

type Chunk = Result<Vec<u8>, JsonError>;

/// Sends everything written as chunks over a channel.
struct PipeWriter {
  sender: SyncSender<Chunk>,
}

impl Write for PipeWriter {
  fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
    let len = buf.len().min(CHUNK_SIZE);
    self
      .sender
      .send(Ok(buf[.. len].to_vec()))
      .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "the stream was dropped"))?;
    Ok(len)
  }

  fn flush(&mut self) -> io::Result<()> {
    Ok(())
  }
}

/// The consuming half of a stream produced by a worker thread.
#[derive(Debug)]
struct Pipe {
  // `None` once the producer is done
  receiver: Option<Receiver<Chunk>>,
  chunk: Cursor<Vec<u8>>,
  worker: Option<JoinHandle<()>>,
  // Set once the stream fails, so later reads also fail
  failure: Option<JsonError>,
}

impl Pipe {
  fn spawn(value: Frozen<Value>, config: WriterConfig) -> io::Result<Self> {
    let (sender, receiver) = sync_channel(PIPE_CAPACITY);
    let worker = thread::Builder::new().name("json-tree-stream".to_owned()).spawn(move || {
      debug!("stream producer started");
      let mut writer = PipeWriter { sender };
      let res = Serializer::new(&mut writer, config).serialize(&value);
      match res {
        Ok(()) => debug!("stream producer finished"),
        Err(JsonError::Io(e)) if e.kind() == io::ErrorKind::BrokenPipe => {
          debug!("stream consumer hung up, stopping the producer");
        }
        Err(e) => {
          warn!(error = %e, "stream producer failed");
          // If the consumer already hung up, there's no one to tell
          let _ = writer.sender.send(Err(e));
        }
      }
    })?;
    Ok(Self {
      receiver: Some(receiver),
      chunk: Cursor::new(vec![]),
      worker: Some(worker),
      failure: None,
    })
  }

  /// Join the worker, once the channel is exhausted.
  fn join(&mut self) -> io::Result<()> {
    self.receiver = None;
    if let Some(worker) = self.worker.take() {
      if worker.join().is_err() {
        let failure = JsonError::Io(io::Error::other("stream producer panicked"));
        self.failure = Some(failure.duplicate());
        Err(io::Error::other(failure))?;
      }
    }
    Ok(())
  }

  fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
    loop {
      if let Some(failure) = &self.failure {
        Err(io::Error::other(failure.duplicate()))?;
      }

      let read = self.chunk.read(buf)?;
      if (read != 0) || buf.is_empty() {
        return Ok(read);
      }

      let Some(receiver) = &self.receiver else { return Ok(0) };
      match receiver.recv() {
        Ok(Ok(chunk)) => self.chunk = Cursor::new(chunk),
        Ok(Err(e)) => {
          self.failure = Some(e.duplicate());
          self.join()?;
          // Wrapped even if it's an I/O error, so it's always downcastable
          Err(io::Error::other(e))?;
        }
        // The producer finished and dropped its sender
        Err(_) => self.join()?,
      }
    }
  }
}

impl Drop for Pipe {
  fn drop(&mut self) {
    if let Some(worker) = self.worker.take() {
      debug!("stream dropped before completion, cancelling the producer");
      // Dropping the receiver causes the producer's next send to fail
      self.receiver = None;
      if worker.join().is_err() {
        warn!("stream producer panicked");
      }
    }
  }
}

#[derive(Debug)]
enum Inner {
  Buffered(Cursor<Vec<u8>>),
  Piped(Pipe),
}

/// A value's serialization, as an [`io::Read`].
///
/// A buffered stream serializes the value entirely before it's read. A piped stream serializes a
/// snapshot of the value on a worker thread while being read, holding at most a few chunks in
/// memory. If a piped stream's producer fails, the next read returns its error (downcastable to a
/// [`JsonError`] via [`io::Error::get_ref`]), with every read after also failing. Dropping a
/// piped stream before it's exhausted stops the producer.
#[derive(Debug)]
pub struct JsonStream(Inner);

impl JsonStream {
  /// Serialize `value`, then stream the result.
  pub fn buffered(value: &Value, config: WriterConfig) -> Result<Self, JsonError> {
    let mut bytes = vec![];
    value.write_with(&mut bytes, config)?;
    Ok(Self(Inner::Buffered(Cursor::new(bytes))))
  }

  /// Stream `value` as it's serialized by a worker thread, which shares it.
  pub fn piped(value: Frozen<Value>, config: WriterConfig) -> Result<Self, JsonError> {
    Ok(Self(Inner::Piped(Pipe::spawn(value, config)?)))
  }
}

impl Read for JsonStream {
  fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
    match &mut self.0 {
      Inner::Buffered(cursor) => cursor.read(buf),
      Inner::Piped(pipe) => pipe.read(buf),
    }
  }
}

impl Value {
  /// Stream this value as compact JSON.
  ///
  /// If `asynchronous`, a snapshot of this value is serialized by a worker thread as the stream
  /// is read, with failures surfacing on read. Else, this value is serialized immediately, with
  /// failures returned here.
  ///
  /// The snapshot is a deep copy. [`Frozen::stream`] shares a frozen value instead.
  pub fn stream(&self, ascii_only: bool, asynchronous: bool) -> Result<JsonStream, JsonError> {
    let config = WriterConfig::compact().ascii_only(ascii_only);
    if asynchronous {
      JsonStream::piped(self.clone().freeze(), config)
    } else {
      JsonStream::buffered(self, config)
    }
  }
}

impl Frozen<Value> {
  /// Stream this value as compact JSON, as [`Value::stream`] does.
  ///
  /// If `asynchronous`, the worker thread shares this value rather than copying it.
  pub fn stream(&self, ascii_only: bool, asynchronous: bool) -> Result<JsonStream, JsonError> {
    let config = WriterConfig::compact().ascii_only(ascii_only);
    if asynchronous {
      JsonStream::piped(self.clone(), config)
    } else {
      JsonStream::buffered(self, config)
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::Container;
  use crate::{Array, Object, SpilledString, TempFileProvider};

  fn large() -> Value {
    (0 .. 20_000)
      .map(|i| {
        [("index", Value::from(i)), ("name", Value::from(format!("entry-é-{i}")))]
          .into_iter()
          .collect::<Object>()
      })
      .collect::<Array>()
      .into()
  }

  fn read(stream: &mut JsonStream) -> io::Result<Vec<u8>> {
    let mut bytes = vec![];
    stream.read_to_end(&mut bytes)?;
    Ok(bytes)
  }

  #[test]
  fn piped_matches_buffered() {
    let dir = tempfile::tempdir().unwrap();
    let provider = TempFileProvider::in_dir(dir.path());
    let spilled = SpilledString::spill(&provider, &"ü".repeat(50_000)).unwrap();
    let mut value = large();
    value.as_array_mut().unwrap().push(spilled);

    for ascii_only in [false, true] {
      let buffered = read(&mut value.stream(ascii_only, false).unwrap()).unwrap();
      let piped = read(&mut value.stream(ascii_only, true).unwrap()).unwrap();
      assert_eq!(buffered, piped);
    }
    assert_eq!(read(&mut value.stream(false, true).unwrap()).unwrap(), value.to_bytes().unwrap());
  }

  #[test]
  fn producer_failure_surfaces_on_read() {
    let mut value = large();
    value.as_array_mut().unwrap().push(f64::NAN);

    assert!(matches!(value.stream(false, false), Err(JsonError::Conversion(_))));

    let mut stream = value.stream(false, true).unwrap();
    let error = read(&mut stream).unwrap_err();
    let inner = error.get_ref().and_then(|e| e.downcast_ref::<JsonError>());
    assert!(matches!(inner, Some(JsonError::Conversion(_))));
    // The stream doesn't appear to end cleanly afterwards, still reporting the same failure
    for _ in 0 .. 2 {
      let error = stream.read(&mut [0; 16]).unwrap_err();
      let inner = error.get_ref().and_then(|e| e.downcast_ref::<JsonError>());
      assert!(matches!(inner, Some(JsonError::Conversion(_))));
    }
  }

  #[test]
  fn frozen_values_are_shared() {
    let frozen = large().freeze();
    let expected = frozen.to_bytes().unwrap();
    let mut streams = [frozen.stream(false, true).unwrap(), frozen.stream(false, true).unwrap()];
    // The value stays readable while the producers hold it
    assert_eq!(frozen.as_array().unwrap().len(), 20_000);
    for stream in &mut streams {
      assert_eq!(read(stream).unwrap(), expected);
    }
    assert_eq!(read(&mut frozen.stream(false, false).unwrap()).unwrap(), expected);
  }

  #[test]
  fn missing_spill_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let spilled =
      SpilledString::spill(&TempFileProvider::in_dir(dir.path()), "contents").unwrap();
    std::fs::remove_file(spilled.path()).unwrap();
    let value = Value::from([Value::from(spilled)].into_iter().collect::<Array>());

    let error = read(&mut value.stream(false, true).unwrap()).unwrap_err();
    let inner = error.get_ref().and_then(|e| e.downcast_ref::<JsonError>());
    assert!(matches!(inner, Some(JsonError::Io(_))));
  }

  #[test]
  fn dropping_cancels_the_producer() {
    let value = large();
    let mut stream = value.stream(false, true).unwrap();
    let mut start = [0; 2];
    stream.read_exact(&mut start).unwrap();
    assert_eq!(&start, b"[{");
    // This joins the producer, which only returns if it was stopped
    drop(stream);
  }
}
