//! Checker configuration.

/// What to do with a function body after its first type error.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum ErrorPolicy {
    /// Give the offending expression `<error>` type and keep checking the
    /// body, collecting further diagnostics.
    #[default]
    Recover,
    /// Stop checking the current body. Other bodies are still checked.
    AbortFunction,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct CheckConfig {
    pub error_policy: ErrorPolicy,
    /// Check function bodies on the rayon pool.
    pub parallel: bool,
    /// Stop queueing errors after this many. Zero means unlimited.
    pub error_limit: usize,
}

impl CheckConfig {
    #[must_use]
    pub fn with_policy(mut self, policy: ErrorPolicy) -> Self {
        self.error_policy = policy;
        self
    }

    #[must_use]
    pub fn parallel(mut self) -> Self {
        self.parallel = true;
        self
    }

    #[must_use]
    pub fn with_error_limit(mut self, limit: usize) -> Self {
        self.error_limit = limit;
        self
    }
}
