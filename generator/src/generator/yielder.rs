use super::Shared;
use crate::error::Result;
use crate::slot::Slot;

use std::fmt;
use std::sync::Arc;

/// The producer-side handle passed to a generator's routine.
///
/// Each call to [`yield_`](Yielder::yield_) hands one value to the consumer
/// and blocks until the consumer has taken it.
pub struct Yielder<T> {
  shared: Arc<Shared<T>>,
}

impl<T> fmt::Debug for Yielder<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Yielder")
      .field("slot", &self.shared.slot)
      .finish()
  }
}

impl<T> Yielder<T> {
  pub(super) fn new(shared: Arc<Shared<T>>) -> Self {
    Yielder { shared }
  }

  pub(super) fn slot(&self) -> &Slot<T> {
    &self.shared.slot
  }

  /// Emits `value` to the consumer, blocking until it has been consumed.
  ///
  /// # Errors
  ///
  /// - `Cancelled` once the consumer has closed or dropped its iterator.
  ///   Routines should stop producing, usually by propagating it with `?`.
  /// - `IllegalState` if called after the generator finished, or from two
  ///   threads at once.
  #[doc(alias = "yield")]
  pub fn yield_(&self, value: T) -> Result<()> {
    self.shared.slot.put(value)
  }

  /// Returns `true` once the consumer has closed or dropped its iterator.
  ///
  /// Long-running routines can poll this between expensive steps instead
  /// of waiting for the next `yield_` to fail.
  pub fn is_cancelled(&self) -> bool {
    self.shared.slot.is_cancelled()
  }
}
