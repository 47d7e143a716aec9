//! Instrumentation configuration.

use std::fmt;

/// Shape of the build pipeline the pass runs in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Pipeline {
    /// Whole program after linking; the runtime is already merged in.
    LinkTime,
    /// One translation unit before linking.
    #[default]
    CompileTime,
}

impl fmt::Display for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LinkTime => f.write_str("link-time"),
            Self::CompileTime => f.write_str("compile-time"),
        }
    }
}

/// Instrumentation configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InstrumentConfig {
    /// Pipeline shape, decides how the entry point is resolved.
    pub pipeline: Pipeline,
    /// Extra function names never instrumented, on top of the reserved prefix.
    pub exclude: Vec<String>,
}

impl InstrumentConfig {
    /// Create a configuration for the given pipeline.
    #[must_use]
    pub const fn new(pipeline: Pipeline) -> Self {
        Self {
            pipeline,
            exclude: Vec::new(),
        }
    }

    /// Add names to the exclusion list.
    #[must_use]
    pub fn with_exclude<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude.extend(names.into_iter().map(Into::into));
        self
    }
}
