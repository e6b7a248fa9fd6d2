// src/generator/mod.rs

//! Single-shot lazy sequences driven by a producer routine on its own thread.
//!
//! A [`Generator`] wraps a routine that emits values one at a time through a
//! [`Yielder`]. The first call to [`Generator::iter`] spawns a producer
//! thread running that routine; the returned [`Iter`] pulls values across a
//! rendezvous [`Slot`](crate::slot::Slot), so at most one produced value is
//! ever waiting to be consumed.
//!
//! # Examples
//!
//! ```
//! use fibre_generator::{Generator, GeneratorError};
//!
//! let generator = Generator::new(|y| {
//!   y.yield_("a")?;
//!   y.yield_("b")?;
//!   Ok(())
//! });
//!
//! let mut iter = generator.iter().unwrap();
//! assert!(iter.has_next().unwrap());
//! assert_eq!(iter.next_value().unwrap(), "a");
//! assert!(iter.has_next().unwrap());
//! assert_eq!(iter.next_value().unwrap(), "b");
//! assert!(!iter.has_next().unwrap());
//! assert!(matches!(iter.next_value(), Err(GeneratorError::ExhaustedSequence)));
//!
//! // A generator can only be driven once.
//! assert!(matches!(generator.iter(), Err(GeneratorError::IllegalState(_))));
//! ```
//!
//! ```
//! // A failing routine surfaces its failure instead of hanging the consumer.
//! use fibre_generator::{Generator, GeneratorError};
//!
//! let generator = Generator::new(|y| {
//!   y.yield_(1)?;
//!   Err("source went away".into())
//! });
//!
//! let mut iter = generator.iter().unwrap();
//! assert_eq!(iter.next_value().unwrap(), 1);
//! assert!(matches!(iter.has_next(), Err(GeneratorError::ProducerFailure(_))));
//! assert!(!iter.has_next().unwrap());
//! ```

mod builder;
mod iter;
mod yielder;

#[cfg(test)]
mod tests;

pub use self::builder::{GeneratorBuilder, DEFAULT_THREAD_NAME};
pub use self::iter::Iter;
pub use self::yielder::Yielder;

use self::builder::GeneratorConfig;
use crate::error::{self, BoxError, GeneratorError, ProducerFailure, Result};
use crate::slot::Slot;

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::thread;

use parking_lot::Mutex;

type Routine<T> = Box<dyn FnOnce(&Yielder<T>) -> std::result::Result<(), BoxError> + Send + 'static>;

const PHASE_NOT_STARTED: u8 = 0;
const PHASE_RUNNING: u8 = 1;
const PHASE_FINISHED: u8 = 2;

/// Lifecycle of a generator's producer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
  /// No iterator has been requested yet; the routine has not started.
  NotStarted,
  /// The producer thread has been spawned and the sequence is being consumed.
  Running,
  /// The consumer observed the end of the sequence, or closed its iterator.
  Finished,
}

/// State shared between the generator, its producer thread and its iterator.
pub(crate) struct Shared<T> {
  pub(crate) slot: Slot<T>,
  phase: AtomicU8,
}

impl<T> Shared<T> {
  fn new() -> Self {
    Shared {
      slot: Slot::new(),
      phase: AtomicU8::new(PHASE_NOT_STARTED),
    }
  }

  pub(crate) fn phase(&self) -> Phase {
    match self.phase.load(Ordering::Acquire) {
      PHASE_NOT_STARTED => Phase::NotStarted,
      PHASE_RUNNING => Phase::Running,
      _ => Phase::Finished,
    }
  }

  pub(crate) fn set_phase(&self, phase: Phase) {
    let value = match phase {
      Phase::NotStarted => PHASE_NOT_STARTED,
      Phase::Running => PHASE_RUNNING,
      Phase::Finished => PHASE_FINISHED,
    };
    self.phase.store(value, Ordering::Release);
  }
}

/// A single-shot, lazily evaluated sequence produced by a routine.
pub struct Generator<T> {
  shared: Arc<Shared<T>>,
  routine: Mutex<Option<Routine<T>>>,
  config: GeneratorConfig,
}

impl<T> fmt::Debug for Generator<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Generator")
      .field("name", &self.config.name)
      .field("phase", &self.shared.phase())
      .field("slot", &self.shared.slot)
      .finish_non_exhaustive()
  }
}

impl Generator<()> {
  /// Returns a builder for configuring the producer thread.
  pub fn builder() -> GeneratorBuilder {
    GeneratorBuilder::new()
  }
}

impl<T: Send + 'static> Generator<T> {
  /// Creates a generator around `routine` with the default configuration.
  ///
  /// The routine receives a [`Yielder`] and may call
  /// [`yield_`](Yielder::yield_) any number of times. It does not run until
  /// [`iter`](Self::iter) is called.
  pub fn new<F>(routine: F) -> Self
  where
    F: FnOnce(&Yielder<T>) -> std::result::Result<(), BoxError> + Send + 'static,
  {
    Self::with_config(GeneratorConfig::default(), Box::new(routine))
  }

  pub(crate) fn with_config(config: GeneratorConfig, routine: Routine<T>) -> Self {
    Generator {
      shared: Arc::new(Shared::new()),
      routine: Mutex::new(Some(routine)),
      config,
    }
  }

  /// Starts the producer and returns the only iterator over this generator.
  ///
  /// # Errors
  ///
  /// - `IllegalState` if an iterator was already requested.
  /// - `Spawn` if the producer thread could not be started.
  pub fn iter(&self) -> Result<Iter<T>> {
    let routine = self
      .routine
      .lock()
      .take()
      .ok_or(GeneratorError::IllegalState("cannot iterate twice"))?;
    self.shared.set_phase(Phase::Running);

    let yielder = Yielder::new(Arc::clone(&self.shared));
    let mut builder = thread::Builder::new().name(self.config.name.clone());
    if let Some(size) = self.config.stack_size {
      builder = builder.stack_size(size);
    }

    match builder.spawn(move || run_producer(routine, yielder)) {
      Ok(handle) => {
        tracing::debug!(thread = %self.config.name, "spawned producer thread");
        Ok(Iter::new(Arc::clone(&self.shared), handle))
      }
      Err(err) => {
        tracing::error!(thread = %self.config.name, error = %err, "failed to spawn producer thread");
        self.shared.slot.finish(None);
        self.shared.set_phase(Phase::Finished);
        Err(GeneratorError::Spawn(err))
      }
    }
  }
}

impl<T> Generator<T> {
  /// The current lifecycle phase.
  pub fn phase(&self) -> Phase {
    self.shared.phase()
  }

  /// The name given to the producer thread.
  pub fn name(&self) -> &str {
    &self.config.name
  }
}

/// Body of the producer thread: runs the routine, then drives the slot to
/// its terminal state exactly once, whatever way the routine ended.
fn run_producer<T>(routine: Routine<T>, yielder: Yielder<T>) {
  let outcome = panic::catch_unwind(AssertUnwindSafe(|| routine(&yielder)));
  let slot = yielder.slot();

  match outcome {
    Ok(Ok(())) => {
      if let Err(err) = slot.mark_done() {
        tracing::warn!(error = %err, "routine returned with the slot in an unexpected state");
        slot.finish(Some(ProducerFailure::from_error(Box::new(err))));
      } else {
        tracing::debug!("routine completed");
      }
    }
    Ok(Err(err)) if slot.is_cancelled() && error::is_cancellation(&err) => {
      tracing::debug!("routine stopped after cancellation");
      slot.finish(None);
    }
    Ok(Err(err)) => {
      tracing::warn!(error = %err, "routine returned an error");
      slot.finish(Some(ProducerFailure::from_error(err)));
    }
    Err(payload) => {
      let failure = ProducerFailure::from_panic(payload);
      tracing::warn!(error = %failure, "routine panicked");
      slot.finish(Some(failure));
    }
  }
}
