//! Pull-style lazy sequences from push-style producer routines.
//!
//! `fibre_generator` lets a routine written as "emit one value at a time" be
//! consumed through ordinary iteration without materializing the sequence.
//! The routine runs on a dedicated producer thread and hands each value over
//! a capacity-1 rendezvous [`Slot`](slot::Slot): the producer blocks until
//! its value is taken, so memory stays O(1) however long the sequence is.
//!
//! ```
//! use fibre_generator::Generator;
//! use std::io::{BufRead, Cursor};
//!
//! let text = "first\nsecond\nthird\n";
//! let lines = Generator::new(move |y| {
//!   for line in Cursor::new(text).lines() {
//!     y.yield_(line?)?;
//!   }
//!   Ok(())
//! });
//!
//! let mut seen = Vec::new();
//! for line in lines.iter()? {
//!   seen.push(line?);
//! }
//! assert_eq!(seen, ["first", "second", "third"]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod error;
pub mod generator;
pub mod slot;
pub mod telemetry;

mod cancel;

pub use error::{BoxError, GeneratorError, ProducerFailure, Result};
pub use generator::{Generator, GeneratorBuilder, Iter, Phase, Yielder};
pub use slot::{Slot, SlotStatus};

#[allow(dead_code)]
fn assert_send_sync<T: Send + Sync>() {}

#[allow(dead_code)]
fn assert_handles_are_thread_safe() {
  assert_send_sync::<Slot<String>>();
  assert_send_sync::<Generator<String>>();
}
