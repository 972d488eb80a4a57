//! Rewrites that change the shape of an expression without changing its value.
//!
//! The smart constructors only apply cheap, local rules. The functions in this module apply the
//! global ones, which may grow or shrink the expression: distributing products over sums
//! ([`expanded`], [`distributed`]), pulling common factors out of sums ([`factored`],
//! [`collect`]), contracting Kronecker deltas ([`contract_index`]) and taking the complex
//! conjugate ([`conjugated`]).
//!
//! [`simplify`](super::simplify()) chooses among these rewrites.

mod conjugate;
mod contract;
mod expand;
mod factor;

pub use conjugate::conjugated;
pub use contract::contract_index;
pub use expand::{distributed, expanded};
pub use factor::{collect, factored};
