use std::sync::atomic::{AtomicBool, Ordering};

/// A cooperative cancellation flag shared between a slot and the producer.
///
/// Setting the flag alone does not wake anyone; the slot sets it while
/// holding its lock and then notifies its waiters.
#[derive(Debug, Default)]
pub(crate) struct CancelToken {
  cancelled: AtomicBool,
}

impl CancelToken {
  pub(crate) fn new() -> Self {
    Self::default()
  }

  #[inline]
  pub(crate) fn is_cancelled(&self) -> bool {
    self.cancelled.load(Ordering::Acquire)
  }

  /// Returns `true` if this call performed the transition.
  pub(crate) fn cancel(&self) -> bool {
    !self.cancelled.swap(true, Ordering::AcqRel)
  }
}
