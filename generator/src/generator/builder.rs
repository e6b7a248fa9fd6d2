use super::{Generator, Yielder};
use crate::error::BoxError;

/// Thread name used for producers when none is configured.
pub const DEFAULT_THREAD_NAME: &str = "fibre-generator";

/// Settings for the producer thread backing a [`Generator`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct GeneratorConfig {
  pub(crate) name: String,
  pub(crate) stack_size: Option<usize>,
}

impl Default for GeneratorConfig {
  fn default() -> Self {
    GeneratorConfig {
      name: DEFAULT_THREAD_NAME.to_string(),
      stack_size: None,
    }
  }
}

/// A builder for creating [`Generator`] instances.
///
/// ```
/// use fibre_generator::Generator;
///
/// let generator = Generator::builder()
///   .name("squares")
///   .stack_size(256 * 1024)
///   .build(|y| {
///     for i in 1..=3u32 {
///       y.yield_(i * i)?;
///     }
///     Ok(())
///   });
///
/// let squares: Vec<u32> = generator.iter().unwrap().map(Result::unwrap).collect();
/// assert_eq!(squares, vec![1, 4, 9]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct GeneratorBuilder {
  config: GeneratorConfig,
}

impl GeneratorBuilder {
  /// Creates a builder with the default configuration.
  pub fn new() -> Self {
    Self::default()
  }

  /// Sets the name of the producer thread.
  pub fn name(mut self, name: impl Into<String>) -> Self {
    self.config.name = name.into();
    self
  }

  /// Sets the stack size, in bytes, of the producer thread.
  pub fn stack_size(mut self, size: usize) -> Self {
    self.config.stack_size = Some(size);
    self
  }

  /// Builds a generator around `routine`. The routine does not run until
  /// the first call to [`Generator::iter`].
  pub fn build<T, F>(self, routine: F) -> Generator<T>
  where
    T: Send + 'static,
    F: FnOnce(&Yielder<T>) -> Result<(), BoxError> + Send + 'static,
  {
    Generator::with_config(self.config, Box::new(routine))
  }
}
