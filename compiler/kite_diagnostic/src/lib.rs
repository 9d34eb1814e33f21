//! Diagnostic records for the Kite semantic core.
//!
//! Every diagnostic carries:
//! - A stable error code (`E2001`) and kebab-case slug (`type-mismatch`)
//! - A message saying what went wrong
//! - A primary span saying where
//! - Optional secondary labels, notes and suggestions
//!
//! Rendering is left to the surrounding tooling; `Display` gives a plain
//! one-record-per-paragraph form for tests and logs.
//!
//! # Error Guarantees
//!
//! [`ErrorGuaranteed`] can only be obtained from a queue that actually holds
//! an error, so a pass that returns one has provably reported something.

mod diagnostic;
mod error_code;
mod guarantee;
pub mod queue;

pub use diagnostic::{Diagnostic, Label, Severity};
pub use error_code::ErrorCode;
pub use guarantee::ErrorGuaranteed;
pub use queue::{DiagnosticConfig, DiagnosticQueue};
