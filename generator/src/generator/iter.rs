use super::{Phase, Shared};
use crate::error::{GeneratorError, Result};

use std::fmt;
use std::iter::FusedIterator;
use std::mem;
use std::sync::Arc;
use std::thread::JoinHandle;

/// Consumer-side lookahead, so `has_next` can be asked repeatedly without
/// losing a value.
enum Cursor<T> {
  Empty,
  Value(T),
  Done,
}

/// The consuming end of a [`Generator`](super::Generator).
///
/// Besides the explicit `has_next`/`next_value` protocol, `Iter` implements
/// [`Iterator`] with `Item = Result<T, GeneratorError>`: every value arrives
/// as `Ok`, a producer failure arrives once as `Err`, and the iterator is
/// fused afterwards.
///
/// Dropping an `Iter` before the sequence ends cancels the producer, which
/// sees `Cancelled` from its current or next `yield_`. Use
/// [`close`](Iter::close) to also wait for the producer thread to exit.
pub struct Iter<T> {
  shared: Arc<Shared<T>>,
  cursor: Cursor<T>,
  producer: Option<JoinHandle<()>>,
  closed: bool,
}

impl<T> fmt::Debug for Iter<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let cursor = match self.cursor {
      Cursor::Empty => "Empty",
      Cursor::Value(_) => "Value",
      Cursor::Done => "Done",
    };
    f.debug_struct("Iter")
      .field("cursor", &cursor)
      .field("phase", &self.shared.phase())
      .field("closed", &self.closed)
      .finish_non_exhaustive()
  }
}

impl<T> Iter<T> {
  pub(super) fn new(shared: Arc<Shared<T>>, producer: JoinHandle<()>) -> Self {
    Iter {
      shared,
      cursor: Cursor::Empty,
      producer: Some(producer),
      closed: false,
    }
  }

  /// Returns `true` if another value is available, blocking until the
  /// producer emits one or finishes.
  ///
  /// Calling this repeatedly without `next_value` does not skip values.
  ///
  /// # Errors
  ///
  /// `ProducerFailure` once, if the routine panicked or returned an error.
  /// Later calls return `Ok(false)`.
  pub fn has_next(&mut self) -> Result<bool> {
    self.fill()?;
    Ok(!matches!(self.cursor, Cursor::Done))
  }

  /// Returns the next value, blocking until it is available.
  ///
  /// # Errors
  ///
  /// - `ExhaustedSequence` past the last value.
  /// - `ProducerFailure` once, if the routine failed.
  pub fn next_value(&mut self) -> Result<T> {
    self.fill()?;
    match mem::replace(&mut self.cursor, Cursor::Empty) {
      Cursor::Value(value) => Ok(value),
      other => {
        self.cursor = other;
        Err(GeneratorError::ExhaustedSequence)
      }
    }
  }

  /// Mutation during iteration is not supported; always fails.
  pub fn remove(&mut self) -> Result<()> {
    Err(GeneratorError::UnsupportedOperation("remove"))
  }

  /// Stops the sequence early and waits for the producer thread to exit.
  ///
  /// A producer blocked in `yield_` is released with `Cancelled`. Any value
  /// cached by a previous `has_next` is discarded. Closing an exhausted or
  /// already closed iterator does nothing.
  ///
  /// Note that this waits for the routine to return: a routine that ignores
  /// `Cancelled` keeps this call blocked until it ends on its own.
  ///
  /// # Errors
  ///
  /// `ProducerFailure` if the routine failed and the failure was never
  /// observed through `has_next`/`next_value`.
  pub fn close(&mut self) -> Result<()> {
    if self.closed {
      return Ok(());
    }
    self.closed = true;
    self.cursor = Cursor::Done;

    if self.producer.is_some() {
      tracing::debug!("closing generator before exhaustion");
      self.shared.slot.cancel();
    }
    self.finish();

    match self.shared.slot.take_failure() {
      Some(failure) => Err(GeneratorError::ProducerFailure(failure)),
      None => Ok(()),
    }
  }

  /// Returns `true` once the sequence is exhausted or the iterator closed.
  pub fn is_finished(&self) -> bool {
    self.closed || matches!(self.cursor, Cursor::Done)
  }

  fn fill(&mut self) -> Result<()> {
    if !matches!(self.cursor, Cursor::Empty) {
      return Ok(());
    }
    match self.shared.slot.take() {
      Ok(Some(value)) => {
        self.cursor = Cursor::Value(value);
        Ok(())
      }
      Ok(None) => {
        self.cursor = Cursor::Done;
        self.finish();
        Ok(())
      }
      Err(err) => {
        self.cursor = Cursor::Done;
        self.finish();
        Err(err)
      }
    }
  }

  /// Reaps the producer thread and records the terminal phase.
  fn finish(&mut self) {
    if let Some(handle) = self.producer.take() {
      if handle.join().is_err() {
        tracing::error!("producer thread panicked outside its routine");
      }
    }
    self.shared.set_phase(Phase::Finished);
  }
}

impl<T> Iterator for Iter<T> {
  type Item = Result<T>;

  fn next(&mut self) -> Option<Self::Item> {
    match self.has_next() {
      Ok(true) => Some(self.next_value()),
      Ok(false) => None,
      Err(err) => Some(Err(err)),
    }
  }
}

impl<T> FusedIterator for Iter<T> {}

impl<T> Drop for Iter<T> {
  fn drop(&mut self) {
    if self.producer.is_some() {
      tracing::trace!("iterator dropped before exhaustion; cancelling producer");
      self.shared.slot.cancel();
      self.shared.set_phase(Phase::Finished);
    }
  }
}
