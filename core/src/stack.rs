/// An item within the stack, representing the state during tokenization.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum State {
  /// Corresponds to `{`, used for representing objects.
  ///
  /// `needs_separator` is set once a field has been read, until a separator is read.
  Object { needs_separator: bool },
  /// Corresponds to `[`, used for representing arrays.
  Array { needs_separator: bool },
  /// A value within an object is about to be read.
  Value,
}

/// The stack of states, bounded in how many arrays and objects may be nested.
#[derive(Debug)]
pub(crate) struct Stack {
  states: Vec<State>,
  containers: usize,
  max_depth: usize,
}

impl Stack {
  pub(crate) fn new(max_depth: usize) -> Self {
    Self { states: Vec::with_capacity(8), containers: 0, max_depth }
  }

  #[inline(always)]
  pub(crate) fn is_empty(&self) -> bool {
    self.states.is_empty()
  }

  #[inline(always)]
  pub(crate) fn peek(&self) -> Option<State> {
    self.states.last().copied()
  }

  #[inline(always)]
  pub(crate) fn peek_mut(&mut self) -> Option<&mut State> {
    self.states.last_mut()
  }

  #[inline(always)]
  pub(crate) fn pop(&mut self) -> Option<State> {
    let state = self.states.pop();
    if matches!(state, Some(State::Object { .. } | State::Array { .. })) {
      self.containers -= 1;
    }
    state
  }

  /// Push a state, returning the maximum depth as an error if it'd be exceeded.
  #[inline(always)]
  pub(crate) fn push(&mut self, state: State) -> Result<(), usize> {
    if matches!(state, State::Object { .. } | State::Array { .. }) {
      if self.containers == self.max_depth {
        Err(self.max_depth)?;
      }
      self.containers += 1;
    }
    self.states.push(state);
    Ok(())
  }
}

#[test]
fn depth_limit() {
  let mut stack = Stack::new(2);
  stack.push(State::Array { needs_separator: false }).unwrap();
  stack.push(State::Object { needs_separator: false }).unwrap();
  stack.push(State::Value).unwrap();
  assert_eq!(stack.push(State::Array { needs_separator: false }), Err(2));
  assert_eq!(stack.pop(), Some(State::Value));
  assert_eq!(stack.pop(), Some(State::Object { needs_separator: false }));
  stack.push(State::Array { needs_separator: true }).unwrap();
  assert_eq!(stack.peek(), Some(State::Array { needs_separator: true }));
}
