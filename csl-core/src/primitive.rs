//! Functions to construct [`Integer`]s, [`Rational`]s and [`Float`]s from various types.

use rug::{Assign, Float, Integer, Rational};

/// The number of bits of precision to use when computing floating-point values.
pub const PRECISION: u32 = 1 << 9;

/// Creates an [`Integer`] with the given value.
pub fn int<T>(n: T) -> Integer
where
    Integer: From<T>,
{
    Integer::from(n)
}

/// Creates a [`Rational`] `numer / denom`, reduced to lowest terms. Returns [`None`] if `denom`
/// is zero.
pub fn rational<N, D>(numer: N, denom: D) -> Option<Rational>
where
    Integer: From<N> + From<D>,
{
    let denom = Integer::from(denom);
    if denom == 0 {
        return None;
    }
    Some(Rational::from((Integer::from(numer), denom)))
}

/// Creates a [`Float`] with the given value.
pub fn float<T>(n: T) -> Float
where
    Float: Assign<T>,
{
    Float::with_val(PRECISION, n)
}

/// Creates a [`Float`] from a string slice. Returns [`None`] if the string is not a valid number.
pub fn float_from_str(s: &str) -> Option<Float> {
    Float::parse(s).ok().map(float)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rational_reduces() {
        let half = rational(3, 6).unwrap();
        assert_eq!(*half.numer(), 1);
        assert_eq!(*half.denom(), 2);
        assert!(rational(1, 0).is_none());
    }

    #[test]
    fn parse_float() {
        assert_eq!(float_from_str("0.25").unwrap(), float(1) / float(4));
        assert!(float_from_str("nope").is_none());
    }
}
