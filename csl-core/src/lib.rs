//! The expression engine of `csl`, a symbolic algebra library for calculations with tensors.
//!
//! Expressions are built from exact and floating-point numbers ([`numeric`]), scalar constants
//! and variables, and tensor elements carrying indices. Every expression is kept in a canonical
//! form as it is built, so that equal expressions compare equal without further work. See
//! [`symbolic`] for the expression tree and everything that operates on it.
//!
//! Operations that receive arguments of the wrong shape (a scalar where a tensor is expected,
//! index structures that do not match, an unknown abbreviation, ...) return an [`error::Error`]
//! instead of panicking.

pub mod consts;
pub mod error;
pub mod numeric;
pub mod options;
pub mod primitive;
pub mod symbolic;
