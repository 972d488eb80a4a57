//! Errors raised by the engine.
//!
//! Every error carries the printed form of the expression that caused it, so reports can point
//! at it directly. The concrete kinds live in [`kind`].

pub mod kind;

use crate::symbolic::Expr;
use csl_error::ErrorKind;

pub use csl_error::Error;

/// Creates an [`Error`] of the given kind that points at the whole of `expr`.
pub(crate) fn on(expr: &Expr, kind: impl ErrorKind) -> Error {
    Error::on(expr.to_string(), kind)
}

/// Creates an [`Error`] of the given kind that points at a piece of text, such as a name.
pub(crate) fn on_text(text: &str, kind: impl ErrorKind) -> Error {
    Error::on(text, kind)
}
