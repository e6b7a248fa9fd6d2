use super::*;
use crate::error::GeneratorError;

use std::sync::mpsc;
use std::time::Duration;

const TEST_TIMEOUT: Duration = Duration::from_secs(2);

fn letters() -> Generator<&'static str> {
  Generator::new(|y| {
    y.yield_("a")?;
    y.yield_("b")?;
    Ok(())
  })
}

#[test]
fn routine_does_not_run_before_iter() {
  let (tx, rx) = mpsc::channel();
  let generator = Generator::new(move |y| {
    tx.send(()).unwrap();
    y.yield_(1)?;
    Ok(())
  });

  assert_eq!(generator.phase(), Phase::NotStarted);
  assert!(rx.recv_timeout(Duration::from_millis(30)).is_err());

  let mut iter = generator.iter().unwrap();
  assert_eq!(generator.phase(), Phase::Running);
  rx.recv_timeout(TEST_TIMEOUT).unwrap();
  assert_eq!(iter.next_value().unwrap(), 1);
}

#[test]
fn two_values_then_exhaustion() {
  let generator = letters();
  let mut iter = generator.iter().unwrap();

  assert!(iter.has_next().unwrap());
  assert_eq!(iter.next_value().unwrap(), "a");
  assert!(iter.has_next().unwrap());
  assert_eq!(iter.next_value().unwrap(), "b");
  assert!(!iter.has_next().unwrap());
  assert_eq!(generator.phase(), Phase::Finished);
}

#[test]
fn has_next_is_idempotent() {
  let generator = letters();
  let mut iter = generator.iter().unwrap();

  for _ in 0..5 {
    assert!(iter.has_next().unwrap());
  }
  assert_eq!(iter.next_value().unwrap(), "a");
  assert_eq!(iter.next_value().unwrap(), "b");

  for _ in 0..5 {
    assert!(!iter.has_next().unwrap());
  }
}

#[test]
fn next_value_without_has_next() {
  let generator = letters();
  let mut iter = generator.iter().unwrap();
  assert_eq!(iter.next_value().unwrap(), "a");
  assert_eq!(iter.next_value().unwrap(), "b");
  assert!(matches!(iter.next_value(), Err(GeneratorError::ExhaustedSequence)));
  assert!(matches!(iter.next_value(), Err(GeneratorError::ExhaustedSequence)));
  assert!(!iter.has_next().unwrap());
}

#[test]
fn empty_routine_has_no_values() {
  let generator = Generator::<u64>::new(|_| Ok(()));
  let mut iter = generator.iter().unwrap();
  assert!(!iter.has_next().unwrap());
  assert!(iter.is_finished());
  assert_eq!(generator.phase(), Phase::Finished);
}

#[test]
fn second_iter_is_illegal() {
  let generator = letters();
  let _iter = generator.iter().unwrap();
  match generator.iter() {
    Err(GeneratorError::IllegalState(message)) => assert_eq!(message, "cannot iterate twice"),
    other => panic!("expected IllegalState, got {:?}", other),
  }
}

#[test]
fn second_iter_is_illegal_after_exhaustion() {
  let generator = letters();
  assert_eq!(generator.iter().unwrap().count(), 2);
  assert!(matches!(generator.iter(), Err(GeneratorError::IllegalState(_))));
}

#[test]
fn remove_is_unsupported() {
  let generator = letters();
  let mut iter = generator.iter().unwrap();
  assert_eq!(iter.next_value().unwrap(), "a");
  assert!(matches!(
    iter.remove(),
    Err(GeneratorError::UnsupportedOperation("remove"))
  ));
  assert_eq!(iter.next_value().unwrap(), "b");
}

#[test]
fn routine_error_surfaces_after_values() {
  let generator = Generator::new(|y| {
    y.yield_("a")?;
    Err("boom".into())
  });
  let mut iter = generator.iter().unwrap();

  assert_eq!(iter.next_value().unwrap(), "a");
  match iter.has_next() {
    Err(GeneratorError::ProducerFailure(failure)) => {
      assert!(!failure.is_panic());
      assert_eq!(failure.to_string(), "producer routine failed: boom");
    }
    other => panic!("expected ProducerFailure, got {:?}", other),
  }
  assert!(!iter.has_next().unwrap());
  assert!(matches!(iter.next_value(), Err(GeneratorError::ExhaustedSequence)));
}

#[test]
fn routine_panic_surfaces_after_values() {
  let generator = Generator::new(|y| {
    y.yield_("a")?;
    panic!("routine exploded");
  });
  let mut iter = generator.iter().unwrap();

  assert_eq!(iter.next_value().unwrap(), "a");
  match iter.next_value() {
    Err(GeneratorError::ProducerFailure(failure)) => {
      assert!(failure.is_panic());
      assert_eq!(failure.panic_message(), Some("routine exploded"));
    }
    other => panic!("expected ProducerFailure, got {:?}", other),
  }
  assert!(!iter.has_next().unwrap());
}

#[test]
fn yield_after_cancellation_reports_cancelled() {
  let (tx, rx) = mpsc::channel();
  let generator = Generator::new(move |y| {
    y.yield_(1)?;
    let second = y.yield_(2);
    tx.send((second.map_err(|e| e.is_cancelled()), y.is_cancelled()))
      .unwrap();
    Ok(())
  });

  let mut iter = generator.iter().unwrap();
  assert_eq!(iter.next_value().unwrap(), 1);
  iter.close().unwrap();

  let (second, cancelled) = rx.recv_timeout(TEST_TIMEOUT).unwrap();
  assert_eq!(second, Err(true));
  assert!(cancelled);
  assert_eq!(generator.phase(), Phase::Finished);
}

#[test]
fn close_is_idempotent_and_stops_iteration() {
  let generator = Generator::new(|y| {
    for i in 0.. {
      y.yield_(i)?;
    }
    Ok(())
  });
  let mut iter = generator.iter().unwrap();
  assert_eq!(iter.next_value().unwrap(), 0);
  assert!(iter.has_next().unwrap());

  iter.close().unwrap();
  iter.close().unwrap();
  assert!(iter.is_finished());
  assert!(!iter.has_next().unwrap());
  assert!(iter.next().is_none());
}

#[test]
fn builder_names_producer_thread() {
  let generator = Generator::builder().name("reader").build(|y| {
    y.yield_(std::thread::current().name().map(str::to_owned))?;
    Ok(())
  });
  assert_eq!(generator.name(), "reader");

  let mut iter = generator.iter().unwrap();
  assert_eq!(iter.next_value().unwrap().as_deref(), Some("reader"));
}

#[test]
fn default_thread_name() {
  let generator = Generator::new(|y| {
    y.yield_(std::thread::current().name().map(str::to_owned))?;
    Ok(())
  });
  let mut iter = generator.iter().unwrap();
  assert_eq!(iter.next_value().unwrap().as_deref(), Some(DEFAULT_THREAD_NAME));
}

#[test]
fn spawn_failure_finishes_generator() {
  // No platform can reserve a 64 TiB thread stack.
  let generator = Generator::builder().stack_size(1usize << 46).build(|y| {
    y.yield_(1u8)?;
    Ok(())
  });

  match generator.iter() {
    Err(GeneratorError::Spawn(_)) => {}
    other => panic!("expected Spawn, got {:?}", other),
  }
  assert_eq!(generator.phase(), Phase::Finished);
  match generator.iter() {
    Err(GeneratorError::IllegalState(message)) => assert_eq!(message, "cannot iterate twice"),
    other => panic!("expected IllegalState, got {:?}", other),
  }
}
