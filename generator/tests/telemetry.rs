mod common;
use common::*;

use fibre_generator::{telemetry, Generator, Slot};
use serial_test::serial;
use std::sync::Arc;
use std::thread;

#[test]
#[serial]
fn telemetry_counts_one_take_per_put() {
  init_tracing();
  telemetry::clear_telemetry();

  let generator = Generator::new(|y| {
    for i in 0..ITEMS_MEDIUM {
      y.yield_(i)?;
    }
    Ok(())
  });
  let mut count = 0;
  for value in generator.iter().unwrap() {
    assert_eq!(value.unwrap(), count);
    count += 1;
    let puts = telemetry::counter_value("slot::put", "handoff");
    let takes = telemetry::counter_value("slot::take", "handoff");
    assert_eq!(takes, count);
    assert!(puts >= takes && puts - takes <= 1, "puts {} ran ahead of takes {}", puts, takes);
  }
  assert_eq!(count, ITEMS_MEDIUM);

  assert_eq!(telemetry::counter_value("slot::put", "handoff"), ITEMS_MEDIUM);
  assert_eq!(telemetry::counter_value("slot::take", "handoff"), ITEMS_MEDIUM);
}

#[test]
#[serial]
fn telemetry_records_terminal_events() {
  init_tracing();
  telemetry::clear_telemetry();

  let slot = Arc::new(Slot::new());
  let producer = {
    let slot = Arc::clone(&slot);
    thread::spawn(move || {
      slot.put(1).unwrap();
      slot.mark_done().unwrap();
    })
  };
  assert_eq!(slot.take().unwrap(), Some(1));
  assert_eq!(slot.take().unwrap(), None);
  producer.join().unwrap();
  slot.cancel();

  let events: Vec<_> = telemetry::events()
    .into_iter()
    .map(|e| (e.location, e.event_type))
    .collect();
  assert_eq!(
    events,
    vec![("slot::mark_done", "Done"), ("slot::cancel", "Cancelled")]
  );

  let report = telemetry::telemetry_report();
  assert!(report.contains("slot::put"));
  assert!(report.contains("slot::cancel"));
}

#[test]
#[serial]
fn telemetry_clear_resets_counters() {
  telemetry::clear_telemetry();
  telemetry::increment_counter("test", "ticks");
  telemetry::increment_counter("test", "ticks");
  assert_eq!(telemetry::counter_value("test", "ticks"), 2);

  telemetry::clear_telemetry();
  assert_eq!(telemetry::counter_value("test", "ticks"), 0);
  assert!(telemetry::events().is_empty());
}
