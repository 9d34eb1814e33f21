//! Proof that an error diagnostic was emitted.

use std::fmt;

/// Zero-sized token obtainable only when at least one error was reported.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct ErrorGuaranteed(());

impl ErrorGuaranteed {
    /// Only the queue mints tokens directly.
    pub(crate) fn new() -> Self {
        ErrorGuaranteed(())
    }

    /// `Some` iff `count > 0`.
    pub fn from_error_count(count: usize) -> Option<Self> {
        (count > 0).then(Self::new)
    }
}

impl fmt::Display for ErrorGuaranteed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error(s) emitted")
    }
}
