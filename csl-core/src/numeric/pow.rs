//! Exact and floating-point powers of numbers.

use log::warn;
use rug::{ops::Pow, Integer, Rational};
use std::cmp::Ordering;
use super::Number;

/// Integer exponents larger than this are not computed exactly; the power is left symbolic.
const MAX_EXACT_EXPONENT: u32 = 1 << 16;

/// Returns the `q`-th root of a non-negative integer if it is a perfect power.
fn exact_root(n: &Integer, q: u32) -> Option<Integer> {
    let root = n.clone().root(q);
    if root.clone().pow(q) == *n {
        Some(root)
    } else {
        None
    }
}

impl Number {
    /// Computes `self ^ exp`.
    ///
    /// Returns [`None`] when the power has no exact numeric value (such as `2^(1/2)`) and should
    /// be kept as a symbolic power. Undefined powers (`0^0`, `0^-1`, `i^(-1/2)`, ...) return
    /// [`Number::Undefined`].
    pub fn pow(&self, exp: &Number) -> Option<Number> {
        if self.is_undefined() || exp.is_undefined() {
            return Some(Number::Undefined);
        }

        if exp.is_zero() {
            if self.is_zero() || matches!(self, Number::Infinity) {
                warn!("indeterminate power `{}^{}`", self, exp);
                return Some(Number::Undefined);
            }
            return Some(Number::one());
        }

        if matches!(exp, Number::Infinity) {
            warn!("power with an infinite exponent `{}^{}`", self, exp);
            return Some(Number::Undefined);
        }

        if exp.is_one() || self.is_one() {
            return Some(self.clone());
        }

        if matches!(self, Number::Infinity) {
            return Some(match exp.sign() {
                Some(Ordering::Greater) => Number::Infinity,
                Some(_) => Number::zero(),
                None => Number::Undefined,
            });
        }

        if self.is_zero() {
            return Some(match exp.sign() {
                Some(Ordering::Greater) => self.clone(),
                _ => {
                    warn!("zero raised to a non-positive power `{}^{}`", self, exp);
                    Number::Undefined
                },
            });
        }

        match exp {
            Number::Integer(n) => self.pow_integer(n),
            Number::Rational(r) => self.pow_rational(r),
            Number::Float(_) => self.pow_float(exp),
            _ => None,
        }
    }

    /// Raises a non-zero finite number to an integer power.
    fn pow_integer(&self, n: &Integer) -> Option<Number> {
        if self.is_minus_one() && self.is_integer() {
            return Some(if n.is_even() { Number::one() } else { self.clone() });
        }

        let magnitude = n.clone().abs().to_u32()?;
        if self.is_exact() && magnitude > MAX_EXACT_EXPONENT {
            return None;
        }

        let positive = match self {
            Number::Integer(b) => Number::Integer(b.clone().pow(magnitude)),
            Number::Rational(r) => {
                let (numer, denom) = r.clone().into_numer_denom();
                Number::from_rational(Rational::from((numer.pow(magnitude), denom.pow(magnitude))))
            },
            Number::Float(f) => Number::from_float(f.clone().pow(magnitude)),
            Number::Complex(..) => {
                // square and multiply
                let mut result = Number::one();
                let mut base = self.clone();
                let mut e = magnitude;
                while e > 0 {
                    if e & 1 == 1 {
                        result = result.mul(&base);
                    }
                    base = base.mul(&base);
                    e >>= 1;
                }
                result
            },
            _ => return None,
        };

        if n.cmp0() == Ordering::Less {
            Some(positive.recip())
        } else {
            Some(positive)
        }
    }

    /// Raises a non-zero finite number to a fractional power `p/q`.
    fn pow_rational(&self, exp: &Rational) -> Option<Number> {
        match self {
            Number::Complex(..) => {
                if exp.cmp0() == Ordering::Less {
                    warn!("complex number raised to a negative fractional power `{}^{}/{}`", self, exp.numer(), exp.denom());
                    Some(Number::Undefined)
                } else {
                    None
                }
            },
            Number::Float(_) => self.pow_float(&Number::Rational(exp.clone())),
            Number::Integer(_) | Number::Rational(_) => {
                let q = exp.denom().to_u32()?;
                let magnitude = self.to_rational()?.abs();
                let (numer, denom) = magnitude.into_numer_denom();
                let root = Number::from_rational(Rational::from((
                    exact_root(&numer, q)?,
                    exact_root(&denom, q)?,
                )));

                let root = if !self.is_negative() {
                    root
                } else if q % 2 == 1 {
                    root.neg()
                } else if q == 2 {
                    // (-a)^(1/2) = i * a^(1/2)
                    Number::complex(Number::zero(), root)
                } else {
                    return None;
                };

                root.pow_integer(exp.numer())
            },
            _ => None,
        }
    }

    /// Raises a number to a floating-point power. Only positive real bases have a real result.
    fn pow_float(&self, exp: &Number) -> Option<Number> {
        match self {
            Number::Complex(..) => {
                if exp.is_negative() {
                    warn!("complex number raised to a negative real power `{}^{}`", self, exp);
                    Some(Number::Undefined)
                } else {
                    None
                }
            },
            _ if self.sign() == Some(Ordering::Greater) => {
                let base = self.to_float()?;
                let exp = exp.to_float()?;
                Some(Number::from_float(base.pow(&exp)))
            },
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_float_eq::{
        afe_is_relative_eq,
        assert_float_relative_eq,
    };
    use crate::primitive::{float, rational};
    use pretty_assertions::assert_eq;
    use super::*;

    fn frac(n: i64, d: i64) -> Number {
        Number::from(rational(n, d).unwrap())
    }

    #[test]
    fn integer_powers() {
        assert_eq!(Number::from(2).pow(&Number::from(10)), Some(Number::from(1024)));
        assert_eq!(Number::from(2).pow(&Number::from(-2)), Some(frac(1, 4)));
        assert_eq!(frac(2, 3).pow(&Number::from(2)), Some(frac(4, 9)));
        assert_eq!(Number::from(-1).pow(&Number::from(7)), Some(Number::from(-1)));
    }

    #[test]
    fn imaginary_unit_cycles() {
        let i = Number::i();
        assert_eq!(i.pow(&Number::from(2)), Some(Number::from(-1)));
        assert_eq!(i.pow(&Number::from(3)), Some(i.neg()));
        assert_eq!(i.pow(&Number::from(4)), Some(Number::one()));
        assert_eq!(i.pow(&Number::from(-1)), Some(i.neg()));
    }

    #[test]
    fn exact_roots() {
        assert_eq!(Number::from(9).pow(&frac(1, 2)), Some(Number::from(3)));
        assert_eq!(frac(4, 9).pow(&frac(3, 2)), Some(frac(8, 27)));
        assert_eq!(Number::from(-8).pow(&frac(1, 3)), Some(Number::from(-2)));
        assert_eq!(Number::from(8).pow(&frac(-1, 3)), Some(frac(1, 2)));
        assert_eq!(Number::from(2).pow(&frac(1, 2)), None);
    }

    #[test]
    fn square_root_of_negative() {
        let root = Number::from(-4).pow(&frac(1, 2));
        assert_eq!(root, Some(Number::complex(Number::zero(), Number::from(2))));
    }

    #[test_log::test]
    fn undefined_powers() {
        assert_eq!(Number::zero().pow(&Number::zero()), Some(Number::Undefined));
        assert_eq!(Number::zero().pow(&Number::from(-1)), Some(Number::Undefined));
        assert_eq!(Number::zero().pow(&Number::from(3)), Some(Number::zero()));
        assert_eq!(Number::i().pow(&frac(-1, 2)), Some(Number::Undefined));
    }

    #[test]
    fn float_powers() {
        let result = Number::from(float(2)).pow(&Number::from(float(0.5))).unwrap();
        assert_float_relative_eq!(result.to_f64().unwrap(), 2f64.sqrt());
        assert_eq!(Number::from(float(-2)).pow(&Number::from(float(0.5))), None);
    }
}
