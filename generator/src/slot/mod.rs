// src/slot/mod.rs

//! A capacity-1 rendezvous cell with blocking handoff.
//!
//! A [`Slot`] moves values from exactly one producer thread to exactly one
//! consumer thread. `put` does not return until its value has been taken, so
//! the producer can never run more than one value ahead of the consumer.
//!
//! # Examples
//!
//! ```
//! use fibre_generator::slot::Slot;
//! use std::sync::Arc;
//! use std::thread;
//!
//! let slot = Arc::new(Slot::new());
//! let producer = {
//!   let slot = Arc::clone(&slot);
//!   thread::spawn(move || {
//!     for i in 0..3 {
//!       slot.put(i).unwrap();
//!     }
//!     slot.mark_done().unwrap();
//!   })
//! };
//!
//! let mut received = Vec::new();
//! while let Some(value) = slot.take().unwrap() {
//!   received.push(value);
//! }
//! producer.join().unwrap();
//! assert_eq!(received, vec![0, 1, 2]);
//! ```

mod state;


pub use self::state::SlotStatus;

use self::state::SlotState;
use crate::cancel::CancelToken;
use crate::error::{GeneratorError, ProducerFailure, Result};
use crate::telemetry;

use std::fmt;

use parking_lot::{Condvar, Mutex};

struct SlotInner<T> {
  state: SlotState<T>,
  // Set together with `Done` when the producer routine failed. Handed to the
  // consumer by the first `take` that observes `Done`.
  failure: Option<ProducerFailure>,
}

/// A blocking, single-value rendezvous between one producer and one consumer.
pub struct Slot<T> {
  inner: Mutex<SlotInner<T>>,
  changed: Condvar,
  cancel: CancelToken,
}

impl<T> fmt::Debug for Slot<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let inner = self.inner.lock();
    f.debug_struct("Slot")
      .field("status", &inner.state.status())
      .field("failed", &inner.failure.is_some())
      .field("cancelled", &self.cancel.is_cancelled())
      .finish_non_exhaustive()
  }
}

impl<T> Default for Slot<T> {
  fn default() -> Self {
    Self::new()
  }
}

impl<T> Slot<T> {
  /// Creates an empty slot.
  pub fn new() -> Self {
    Slot {
      inner: Mutex::new(SlotInner {
        state: SlotState::Empty,
        failure: None,
      }),
      changed: Condvar::new(),
      cancel: CancelToken::new(),
    }
  }

  /// Hands `value` to the consumer and blocks until it has been taken.
  ///
  /// # Errors
  ///
  /// - `IllegalState` if the slot is already done or already holds a value
  ///   (two producers racing on one slot). Checked before cancellation.
  /// - `Cancelled` if the slot was cancelled before or during the handoff.
  ///   A value still pending at cancellation is dropped.
  pub fn put(&self, value: T) -> Result<()> {
    let mut inner = self.inner.lock();
    match inner.state {
      SlotState::Done => return Err(GeneratorError::IllegalState("put on a finished slot")),
      SlotState::Value(_) => return Err(GeneratorError::IllegalState("put on an occupied slot")),
      SlotState::Empty => {}
    }
    if self.cancel.is_cancelled() {
      return Err(GeneratorError::Cancelled);
    }

    inner.state = SlotState::Value(value);
    telemetry::increment_counter("slot::put", "handoff");
    self.changed.notify_all();

    while inner.state.is_value() {
      if self.cancel.is_cancelled() {
        drop(inner.state.take_value());
        return Err(GeneratorError::Cancelled);
      }
      self.changed.wait(&mut inner);
    }
    Ok(())
  }

  /// Blocks until a value or the terminal marker is available.
  ///
  /// Returns `Ok(Some(value))` for a value, waking the producer, and
  /// `Ok(None)` once the slot is done. Repeated calls on a done slot keep
  /// returning `Ok(None)`.
  ///
  /// # Errors
  ///
  /// - `ProducerFailure` the first time a done slot is observed, if the
  ///   producer recorded a failure while finishing.
  /// - `Cancelled` if the slot is cancelled while empty.
  pub fn take(&self) -> Result<Option<T>> {
    let mut inner = self.inner.lock();
    loop {
      if let Some(value) = inner.state.take_value() {
        telemetry::increment_counter("slot::take", "handoff");
        self.changed.notify_all();
        return Ok(Some(value));
      }
      if inner.state.is_done() {
        return match inner.failure.take() {
          Some(failure) => Err(GeneratorError::ProducerFailure(failure)),
          None => Ok(None),
        };
      }
      if self.cancel.is_cancelled() {
        return Err(GeneratorError::Cancelled);
      }
      self.changed.wait(&mut inner);
    }
  }

  /// Marks the sequence as complete. Terminal.
  ///
  /// # Errors
  ///
  /// `IllegalState` if the slot is already done or still holds a value.
  pub fn mark_done(&self) -> Result<()> {
    let mut inner = self.inner.lock();
    match inner.state {
      SlotState::Done => Err(GeneratorError::IllegalState("slot is already done")),
      SlotState::Value(_) => Err(GeneratorError::IllegalState(
        "cannot finish a slot while a value is pending",
      )),
      SlotState::Empty => {
        inner.state = SlotState::Done;
        telemetry::log_event("slot::mark_done", "Done", None);
        self.changed.notify_all();
        Ok(())
      }
    }
  }

  /// Forces the terminal state regardless of the current one, recording an
  /// optional failure for the consumer. A pending value is dropped. Calling
  /// this on a slot that is already done only records the failure if none
  /// is stored yet.
  pub(crate) fn finish(&self, failure: Option<ProducerFailure>) {
    let mut inner = self.inner.lock();
    drop(inner.state.take_value());
    inner.state = SlotState::Done;
    if inner.failure.is_none() {
      inner.failure = failure;
    }
    telemetry::log_event(
      "slot::finish",
      "Done",
      inner.failure.as_ref().map(|f| f.to_string()),
    );
    self.changed.notify_all();
  }

  /// Removes a recorded failure that no consumer has observed yet.
  pub(crate) fn take_failure(&self) -> Option<ProducerFailure> {
    self.inner.lock().failure.take()
  }

  /// Cancels the slot, releasing a producer blocked in `put` and a consumer
  /// blocked in `take`. Every later `put` on a slot that is not done fails
  /// with `Cancelled`.
  pub fn cancel(&self) {
    let _inner = self.inner.lock();
    if self.cancel.cancel() {
      telemetry::log_event("slot::cancel", "Cancelled", None);
    }
    self.changed.notify_all();
  }

  /// Returns `true` once [`cancel`](Self::cancel) has been called.
  #[inline]
  pub fn is_cancelled(&self) -> bool {
    self.cancel.is_cancelled()
  }

  /// Returns `true` once the slot has reached its terminal state.
  pub fn is_done(&self) -> bool {
    self.inner.lock().state.is_done()
  }

  /// A snapshot of the slot's current state.
  pub fn status(&self) -> SlotStatus {
    self.inner.lock().state.status()
  }
}
