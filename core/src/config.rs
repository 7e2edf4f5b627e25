//! Parser and serializer configuration.

use std::sync::Arc;

use crate::SpillProvider;

/// Configuration for parsing.
#[derive(Clone, Debug)]
pub struct ParserConfig {
  /// Only accept RFC 8259, rejecting comments, bare words, single quotes, and other leniencies.
  pub strict: bool,
  /// The maximum nesting of arrays and objects.
  pub max_depth: usize,
  /// The length, in bytes, strings may reach before being spilled.
  pub spill_threshold: usize,
  /// Where to spill strings to. Strings are kept in memory if this is `None`.
  pub spill: Option<Arc<dyn SpillProvider>>,
}

impl ParserConfig {
  /// The default maximum depth.
  pub const MAX_DEPTH: usize = 512;
  /// The default spill threshold.
  pub const SPILL_THRESHOLD: usize = 1 << 20;

  /// Only accept RFC 8259.
  #[must_use]
  pub fn strict(mut self) -> Self {
    self.strict = true;
    self
  }

  /// Set the maximum depth.
  #[must_use]
  pub fn with_max_depth(mut self, max_depth: usize) -> Self {
    self.max_depth = max_depth;
    self
  }

  /// Spill strings to files from `provider`.
  #[must_use]
  pub fn with_spill(mut self, provider: impl SpillProvider + 'static) -> Self {
    self.spill = Some(Arc::new(provider));
    self
  }

  /// Set the spill threshold.
  #[must_use]
  pub fn with_spill_threshold(mut self, threshold: usize) -> Self {
    self.spill_threshold = threshold;
    self
  }
}

impl Default for ParserConfig {
  fn default() -> Self {
    Self {
      strict: false,
      max_depth: Self::MAX_DEPTH,
      spill_threshold: Self::SPILL_THRESHOLD,
      spill: None,
    }
  }
}

/// Configuration for serializing.
#[derive(Clone, Copy, PartialEq, Eq, Default, Debug)]
pub struct WriterConfig {
  /// Escape every non-ASCII character.
  pub ascii_only: bool,
  /// Put each entry on its own line, indented by this many spaces per level.
  pub indent: Option<usize>,
}

impl WriterConfig {
  /// Compact output, without insignificant whitespace.
  #[must_use]
  pub fn compact() -> Self {
    Self::default()
  }

  /// Pretty output, indented by `indent` spaces per level.
  #[must_use]
  pub fn pretty(indent: usize) -> Self {
    Self { ascii_only: false, indent: Some(indent) }
  }

  /// Set if every non-ASCII character should be escaped.
  #[must_use]
  pub fn ascii_only(mut self, ascii_only: bool) -> Self {
    self.ascii_only = ascii_only;
    self
  }
}
