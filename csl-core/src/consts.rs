//! Additional constants used in the library. This module consists of static constants that
//! return [`Float`]s and [`Rational`]s with the given value.

use once_cell::sync::Lazy;
use rug::{Float, Rational};
use super::primitive::{float, rational};

pub static ONE_HALF: Lazy<Rational> = Lazy::new(|| rational(1, 2).unwrap_or_default());

/// Euler's number.
pub static E: Lazy<Float> = Lazy::new(|| float(1).exp());

pub static PI: Lazy<Float> = Lazy::new(|| float(-1).acos());

/// Floats whose magnitude is below this value are treated as zero when deciding whether a
/// numerically evaluated complex number is real.
pub static EPSILON: Lazy<Float> = Lazy::new(|| float(1e-100));
