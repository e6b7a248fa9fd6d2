// src/error.rs

use std::any::Any;
use std::io;

use thiserror::Error;

/// A boxed, thread-safe error returned by producer routines.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A specialized `Result` type for generator operations.
pub type Result<T, E = GeneratorError> = std::result::Result<T, E>;

/// The main error type for slots, generators and their iterators.
#[derive(Debug, Error)]
pub enum GeneratorError {
  /// The rendezvous protocol was violated by the caller: finishing a slot
  /// twice, yielding after completion, putting into an occupied slot, or
  /// iterating the same generator twice.
  #[error("illegal state: {0}")]
  IllegalState(&'static str),

  /// `next_value` was called after the last value was consumed.
  #[error("sequence exhausted")]
  ExhaustedSequence,

  /// The iterator does not support mutation.
  #[error("unsupported operation: {0}")]
  UnsupportedOperation(&'static str),

  /// The producer routine panicked or returned an error.
  #[error(transparent)]
  ProducerFailure(#[from] ProducerFailure),

  /// The consumer closed or dropped its iterator.
  #[error("generator cancelled by its consumer")]
  Cancelled,

  /// The producer thread could not be spawned.
  #[error("failed to spawn producer thread: {0}")]
  Spawn(#[source] io::Error),
}

impl GeneratorError {
  /// Returns `true` if this error is the cancellation signal.
  pub fn is_cancelled(&self) -> bool {
    matches!(self, GeneratorError::Cancelled)
  }

  /// Returns `true` if this error reports a protocol violation.
  pub fn is_illegal_state(&self) -> bool {
    matches!(self, GeneratorError::IllegalState(_))
  }
}

#[derive(Debug, Error)]
enum FailureCause {
  #[error("producer routine panicked: {0}")]
  Panic(String),
  #[error("producer routine failed: {0}")]
  Error(#[source] BoxError),
}

/// A failure raised inside a producer routine, re-surfaced to the consumer.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct ProducerFailure(FailureCause);

impl ProducerFailure {
  pub(crate) fn from_panic(payload: Box<dyn Any + Send>) -> Self {
    let message = if let Some(s) = payload.downcast_ref::<&'static str>() {
      (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
      s.clone()
    } else {
      "non-string panic payload".to_string()
    };
    ProducerFailure(FailureCause::Panic(message))
  }

  pub(crate) fn from_error(error: BoxError) -> Self {
    ProducerFailure(FailureCause::Error(error))
  }

  /// Returns `true` if the routine panicked rather than returning an error.
  pub fn is_panic(&self) -> bool {
    matches!(self.0, FailureCause::Panic(_))
  }

  /// The panic message, if the routine panicked.
  pub fn panic_message(&self) -> Option<&str> {
    match &self.0 {
      FailureCause::Panic(message) => Some(message),
      FailureCause::Error(_) => None,
    }
  }

  /// Consumes the failure, returning the routine's error if it returned one.
  pub fn into_error(self) -> Option<BoxError> {
    match self.0 {
      FailureCause::Panic(_) => None,
      FailureCause::Error(error) => Some(error),
    }
  }
}

/// Returns `true` if a routine error is just the cancellation signal
/// propagated back out through `?`.
pub(crate) fn is_cancellation(error: &BoxError) -> bool {
  error
    .downcast_ref::<GeneratorError>()
    .is_some_and(GeneratorError::is_cancelled)
}
