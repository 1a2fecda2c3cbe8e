//! ESQL diagnostics and error handling
//!
//! Error codes, byte spans inside filter expressions, the [`EsqlError`] taxonomy
//! shared by every ESQL crate, and [`Diagnostic`] rendering for front-ends.

mod error;
mod error_code;
mod span;

pub use error::*;
pub use error_code::*;
pub use span::*;

/// Result type for ESQL operations
pub type Result<T> = std::result::Result<T, EsqlError>;
