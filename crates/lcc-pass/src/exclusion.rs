//! Policies deciding which functions are never instrumented.

use std::collections::HashSet;

use crate::NOINSTRUMENT_PREFIX;

/// Decides whether calls to a function must be left alone.
///
/// The `count-libcalls` pass always adds [`NoInstrumentPrefix`] on top of
/// any policy it is given.
pub trait ExclusionPolicy {
    /// Check if calls to `name` are excluded from instrumentation.
    fn is_excluded(&self, name: &str) -> bool;
}

/// Excludes every symbol carrying the reserved `__noinstrument_` prefix.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoInstrumentPrefix;

impl ExclusionPolicy for NoInstrumentPrefix {
    fn is_excluded(&self, name: &str) -> bool {
        name.starts_with(NOINSTRUMENT_PREFIX)
    }
}

/// Excludes an explicit set of names.
#[derive(Clone, Debug, Default)]
pub struct ExcludeList {
    names: HashSet<String>,
}

impl ExcludeList {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }
}

impl ExclusionPolicy for ExcludeList {
    fn is_excluded(&self, name: &str) -> bool {
        self.names.contains(name)
    }
}

/// Excludes a name if any member policy does.
#[derive(Default)]
pub struct Union {
    policies: Vec<Box<dyn ExclusionPolicy>>,
}

impl Union {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            policies: Vec::new(),
        }
    }

    /// Add a member policy.
    #[must_use]
    pub fn with(self, policy: impl ExclusionPolicy + 'static) -> Self {
        self.with_boxed(Box::new(policy))
    }

    /// Add an already boxed member policy.
    #[must_use]
    pub fn with_boxed(mut self, policy: Box<dyn ExclusionPolicy>) -> Self {
        self.policies.push(policy);
        self
    }
}

impl ExclusionPolicy for Union {
    fn is_excluded(&self, name: &str) -> bool {
        self.policies.iter().any(|p| p.is_excluded(name))
    }
}

impl<F> ExclusionPolicy for F
where
    F: Fn(&str) -> bool,
{
    fn is_excluded(&self, name: &str) -> bool {
        self(name)
    }
}

/// Default policy: the reserved prefix plus `extra` names.
#[must_use]
pub fn default_policy(extra: &[String]) -> Box<dyn ExclusionPolicy> {
    if extra.is_empty() {
        Box::new(NoInstrumentPrefix)
    } else {
        Box::new(
            Union::new()
                .with(NoInstrumentPrefix)
                .with(ExcludeList::new(extra.iter().cloned())),
        )
    }
}
