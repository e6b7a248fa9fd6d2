// examples/lines.rs
//
// Streams the lines of a file through a generator, one line in memory at a
// time. Pass a path as the first argument, or run without one to read a
// built-in sample. Set RUST_LOG=fibre_generator=debug to see producer logs.
use fibre_generator::Generator;
use std::env;
use std::error::Error;
use std::fs::File;
use std::io::{BufRead, BufReader, Cursor, Read};

const SAMPLE: &str = "id,name\n1,ada\n2,grace\n3,barbara\n# trailing comment\n";

fn line_generator<R: Read + Send + 'static>(name: &str, source: R) -> Generator<String> {
  Generator::builder().name(name).build(move |y| {
    for line in BufReader::new(source).lines() {
      y.yield_(line?)?;
    }
    Ok(())
  })
}

fn main() -> Result<(), Box<dyn Error>> {
  tracing_subscriber::fmt()
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
    .init();

  let generator = match env::args().nth(1) {
    Some(path) => line_generator("file-lines", File::open(&path)?),
    None => line_generator("sample-lines", Cursor::new(SAMPLE)),
  };

  println!("--- Lines until the first comment ---");
  let mut iter = generator.iter()?;
  let mut count = 0;
  while iter.has_next()? {
    let line = iter.next_value()?;
    if line.starts_with('#') {
      println!("[Consumer] Comment found, stopping early.");
      break;
    }
    count += 1;
    println!("[Consumer] {:>3}: {}", count, line);
  }

  // Releases the producer if we stopped before the end of the input.
  iter.close()?;
  println!("[Consumer] Read {} lines, producer phase: {:?}", count, generator.phase());
  Ok(())
}
