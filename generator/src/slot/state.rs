// src/slot/state.rs

use std::mem;

/// The tagged contents of a rendezvous slot.
///
/// Legal transitions are `Empty -> Value -> Empty` (repeatable) and
/// `Empty -> Done` (terminal).
pub(crate) enum SlotState<T> {
  Empty,
  Value(T),
  Done,
}

impl<T> SlotState<T> {
  #[inline]
  pub(crate) fn is_value(&self) -> bool {
    matches!(self, SlotState::Value(_))
  }

  #[inline]
  pub(crate) fn is_done(&self) -> bool {
    matches!(self, SlotState::Done)
  }

  /// Removes a pending value, leaving `Empty` behind. `Empty` and `Done`
  /// are left untouched.
  pub(crate) fn take_value(&mut self) -> Option<T> {
    if !self.is_value() {
      return None;
    }
    match mem::replace(self, SlotState::Empty) {
      SlotState::Value(value) => Some(value),
      _ => None,
    }
  }

  pub(crate) fn status(&self) -> SlotStatus {
    match self {
      SlotState::Empty => SlotStatus::Empty,
      SlotState::Value(_) => SlotStatus::Holding,
      SlotState::Done => SlotStatus::Done,
    }
  }
}

/// A point-in-time view of a slot's state, without the value it may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotStatus {
  /// Nothing pending; the producer may `put`.
  Empty,
  /// A value is waiting to be taken.
  Holding,
  /// The producer has finished. Terminal.
  Done,
}
