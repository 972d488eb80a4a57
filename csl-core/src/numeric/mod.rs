//! Exact and floating-point numbers used as the leaves of expressions.
//!
//! [`Number`] is a closed set of numeric kinds. Every value is kept normalized: a
//! [`Rational`] never has denominator 1, a [`Float`] is never `NaN` or infinite, and a complex
//! number always has a non-zero imaginary part. Results that are not defined mathematically
//! (`0 / 0`, `0^0`, ...) are not errors; they become [`Number::Undefined`], which propagates
//! through further arithmetic like `NaN` does for floats.

mod pow;

use crate::primitive::{float, int};
use log::warn;
use rug::{Float, Integer, Rational};
use std::{cmp::Ordering, fmt};

/// A numeric leaf.
#[derive(Debug, Clone)]
pub enum Number {
    /// An integer, such as `2` or `-144`.
    Integer(Integer),

    /// A fraction whose denominator is greater than 1, such as `1/2`.
    Rational(Rational),

    /// A finite floating-point number.
    Float(Float),

    /// A complex number `re + im * i`. Both parts are real numbers and `im` is never zero.
    Complex(Box<Number>, Box<Number>),

    /// The unsigned infinity, produced by dividing by zero.
    Infinity,

    /// The result of an operation that is not defined, such as `0 / 0`.
    Undefined,
}

impl Number {
    /// Returns the integer zero.
    pub fn zero() -> Self {
        Self::Integer(int(0))
    }

    /// Returns the integer one.
    pub fn one() -> Self {
        Self::Integer(int(1))
    }

    /// Returns the integer minus one.
    pub fn minus_one() -> Self {
        Self::Integer(int(-1))
    }

    /// Returns the imaginary unit.
    pub fn i() -> Self {
        Self::Complex(Box::new(Self::zero()), Box::new(Self::one()))
    }

    /// Creates a number from a fraction, collapsing it to an integer if possible.
    pub fn from_rational(r: Rational) -> Self {
        if *r.denom() == 1 {
            Self::Integer(r.into_numer_denom().0)
        } else {
            Self::Rational(r)
        }
    }

    /// Creates a number from a float, mapping non-finite values to the sentinels.
    pub fn from_float(f: Float) -> Self {
        if f.is_nan() {
            warn!("floating-point operation produced NaN");
            Self::Undefined
        } else if f.is_infinite() {
            Self::Infinity
        } else {
            Self::Float(f)
        }
    }

    /// Creates the complex number `re + im * i`. Collapses to `re` if `im` is zero. Both parts
    /// must be real numbers or sentinels.
    pub fn complex(re: Number, im: Number) -> Self {
        if re.is_undefined() || im.is_undefined() {
            return Self::Undefined;
        }
        if matches!(re, Self::Infinity) || matches!(im, Self::Infinity) {
            return Self::Infinity;
        }
        if im.is_zero() {
            return re;
        }
        Self::Complex(Box::new(re), Box::new(im))
    }

    /// Returns true if the number is zero.
    pub fn is_zero(&self) -> bool {
        match self {
            Self::Integer(n) => *n == 0,
            Self::Float(f) => f.is_zero(),
            _ => false,
        }
    }

    /// Returns true if the number is one.
    pub fn is_one(&self) -> bool {
        match self {
            Self::Integer(n) => *n == 1,
            Self::Float(f) => *f == 1,
            _ => false,
        }
    }

    /// Returns true if the number is minus one.
    pub fn is_minus_one(&self) -> bool {
        match self {
            Self::Integer(n) => *n == -1,
            Self::Float(f) => *f == -1,
            _ => false,
        }
    }

    /// Returns true if the number is [`Number::Undefined`].
    pub fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }

    /// Returns true if the number is an [`Integer`].
    pub fn is_integer(&self) -> bool {
        matches!(self, Self::Integer(_))
    }

    /// Returns true if the number is an integer, a fraction or a float.
    pub fn is_real(&self) -> bool {
        matches!(self, Self::Integer(_) | Self::Rational(_) | Self::Float(_))
    }

    /// Returns true if the number is an exact integer or fraction, possibly complex.
    pub fn is_exact(&self) -> bool {
        match self {
            Self::Integer(_) | Self::Rational(_) => true,
            Self::Complex(re, im) => re.is_exact() && im.is_exact(),
            _ => false,
        }
    }

    /// Returns the sign of a real number, or [`None`] for complex numbers and sentinels.
    pub fn sign(&self) -> Option<Ordering> {
        match self {
            Self::Integer(n) => Some(n.cmp0()),
            Self::Rational(r) => Some(r.cmp0()),
            Self::Float(f) => f.cmp0(),
            _ => None,
        }
    }

    /// Returns true if the number is a real number below zero.
    pub fn is_negative(&self) -> bool {
        self.sign() == Some(Ordering::Less)
    }

    /// If the number is an [`Integer`], returns a reference to it.
    pub fn as_integer(&self) -> Option<&Integer> {
        match self {
            Self::Integer(n) => Some(n),
            _ => None,
        }
    }

    /// Returns true if the number is an even integer.
    pub fn is_even_integer(&self) -> bool {
        self.as_integer().is_some_and(Integer::is_even)
    }

    /// Returns the real part of the number.
    pub fn re(&self) -> Number {
        match self {
            Self::Complex(re, _) => (**re).clone(),
            other => other.clone(),
        }
    }

    /// Returns the imaginary part of the number.
    pub fn im(&self) -> Number {
        match self {
            Self::Complex(_, im) => (**im).clone(),
            Self::Infinity | Self::Undefined => self.clone(),
            _ => Self::zero(),
        }
    }

    /// Converts an exact real number to a [`Rational`].
    fn to_rational(&self) -> Option<Rational> {
        match self {
            Self::Integer(n) => Some(Rational::from(n)),
            Self::Rational(r) => Some(r.clone()),
            _ => None,
        }
    }

    /// Converts a real number to a [`Float`].
    pub fn to_float(&self) -> Option<Float> {
        match self {
            Self::Integer(n) => Some(float(n)),
            Self::Rational(r) => Some(float(r)),
            Self::Float(f) => Some(f.clone()),
            _ => None,
        }
    }

    /// Returns the number with every exact part converted to a [`Float`].
    pub fn to_numerical(&self) -> Number {
        match self {
            Self::Integer(_) | Self::Rational(_) => self.to_float().map_or(Self::Undefined, Self::from_float),
            Self::Complex(re, im) => Self::complex(re.to_numerical(), im.to_numerical()),
            other => other.clone(),
        }
    }

    /// Approximates a real number by an [`f64`].
    pub fn to_f64(&self) -> Option<f64> {
        self.to_float().map(|f| f.to_f64())
    }

    /// Returns the complex conjugate.
    pub fn conj(&self) -> Number {
        match self {
            Self::Complex(re, im) => Self::complex((**re).clone(), im.neg()),
            other => other.clone(),
        }
    }

    /// Returns `-self`.
    pub fn neg(&self) -> Number {
        match self {
            Self::Integer(n) => Self::Integer(-n.clone()),
            Self::Rational(r) => Self::Rational(-r.clone()),
            Self::Float(f) => Self::Float(-f.clone()),
            Self::Complex(re, im) => Self::complex(re.neg(), im.neg()),
            Self::Infinity => Self::Infinity,
            Self::Undefined => Self::Undefined,
        }
    }

    /// Returns `self + other`.
    pub fn add(&self, other: &Number) -> Number {
        match (self, other) {
            (Self::Undefined, _) | (_, Self::Undefined) => Self::Undefined,
            (Self::Infinity, Self::Infinity) => {
                warn!("indeterminate sum of two infinities");
                Self::Undefined
            },
            (Self::Infinity, _) | (_, Self::Infinity) => Self::Infinity,
            (Self::Complex(..), _) | (_, Self::Complex(..)) => Self::complex(
                self.re().add(&other.re()),
                self.im().add(&other.im()),
            ),
            (Self::Integer(a), Self::Integer(b)) => Self::Integer(Integer::from(a + b)),
            (Self::Float(_), _) | (_, Self::Float(_)) => real_float_op(self, other, |a, b| float(a + b)),
            _ => real_exact_op(self, other, |a, b| Rational::from(a + b)),
        }
    }

    /// Returns `self - other`.
    pub fn sub(&self, other: &Number) -> Number {
        self.add(&other.neg())
    }

    /// Returns `self * other`.
    pub fn mul(&self, other: &Number) -> Number {
        match (self, other) {
            (Self::Undefined, _) | (_, Self::Undefined) => Self::Undefined,
            (Self::Infinity, n) | (n, Self::Infinity) => {
                if n.is_zero() {
                    warn!("indeterminate product of infinity and zero");
                    Self::Undefined
                } else {
                    Self::Infinity
                }
            },
            (Self::Complex(..), _) | (_, Self::Complex(..)) => {
                let (a, b) = (self.re(), self.im());
                let (c, d) = (other.re(), other.im());
                Self::complex(
                    a.mul(&c).sub(&b.mul(&d)),
                    a.mul(&d).add(&b.mul(&c)),
                )
            },
            (Self::Integer(a), Self::Integer(b)) => Self::Integer(Integer::from(a * b)),
            (Self::Float(_), _) | (_, Self::Float(_)) => real_float_op(self, other, |a, b| float(a * b)),
            _ => real_exact_op(self, other, |a, b| Rational::from(a * b)),
        }
    }

    /// Returns `1 / self`. Dividing by zero gives [`Number::Infinity`].
    pub fn recip(&self) -> Number {
        if self.is_zero() {
            warn!("division by zero");
            return Self::Infinity;
        }
        match self {
            Self::Integer(n) => Self::from_rational(Rational::from((int(1), n.clone()))),
            Self::Rational(r) => Self::from_rational(r.clone().recip()),
            Self::Float(f) => Self::from_float(float(1) / f),
            Self::Complex(re, im) => {
                let norm = re.mul(re).add(&im.mul(im));
                let inv = norm.recip();
                Self::complex(re.mul(&inv), im.neg().mul(&inv))
            },
            Self::Infinity => Self::zero(),
            Self::Undefined => Self::Undefined,
        }
    }

    /// Returns `self / other`.
    pub fn div(&self, other: &Number) -> Number {
        self.mul(&other.recip())
    }

    /// A total order over numbers: real numbers by value (ties between kinds broken by kind),
    /// then complex numbers, then [`Number::Infinity`], then [`Number::Undefined`].
    pub fn total_cmp(&self, other: &Number) -> Ordering {
        fn rank(n: &Number) -> u8 {
            match n {
                Number::Integer(_) => 0,
                Number::Rational(_) => 1,
                Number::Float(_) => 2,
                Number::Complex(..) => 3,
                Number::Infinity => 4,
                Number::Undefined => 5,
            }
        }

        match (self, other) {
            (Self::Complex(a, b), Self::Complex(c, d)) => a.total_cmp(c).then_with(|| b.total_cmp(d)),
            _ if self.is_real() && other.is_real() => {
                let by_value = match (self.to_rational(), other.to_rational()) {
                    (Some(a), Some(b)) => a.cmp(&b),
                    _ => self.to_float()
                        .zip(other.to_float())
                        .and_then(|(a, b)| a.partial_cmp(&b))
                        .unwrap_or(Ordering::Equal),
                };
                by_value.then_with(|| rank(self).cmp(&rank(other)))
            },
            _ => rank(self).cmp(&rank(other)),
        }
    }
}

/// Applies an operation on two real numbers after converting both to [`Float`]s.
fn real_float_op(a: &Number, b: &Number, op: impl FnOnce(&Float, &Float) -> Float) -> Number {
    match (a.to_float(), b.to_float()) {
        (Some(a), Some(b)) => Number::from_float(op(&a, &b)),
        _ => Number::Undefined,
    }
}

/// Applies an operation on two exact real numbers as [`Rational`]s.
fn real_exact_op(a: &Number, b: &Number, op: impl FnOnce(&Rational, &Rational) -> Rational) -> Number {
    match (a.to_rational(), b.to_rational()) {
        (Some(a), Some(b)) => Number::from_rational(op(&a, &b)),
        _ => Number::Undefined,
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        self.total_cmp(other) == Ordering::Equal
    }
}

impl Eq for Number {}

impl From<i32> for Number {
    fn from(n: i32) -> Self {
        Self::Integer(int(n))
    }
}

impl From<i64> for Number {
    fn from(n: i64) -> Self {
        Self::Integer(int(n))
    }
}

impl From<Integer> for Number {
    fn from(n: Integer) -> Self {
        Self::Integer(n)
    }
}

impl From<Rational> for Number {
    fn from(r: Rational) -> Self {
        Self::from_rational(r)
    }
}

impl From<Float> for Number {
    fn from(f: Float) -> Self {
        Self::from_float(f)
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(n) => write!(f, "{}", n),
            Self::Rational(r) => write!(f, "{}/{}", r.numer(), r.denom()),
            Self::Float(x) => write!(f, "{}", x.to_f64()),
            Self::Complex(re, im) => {
                if !re.is_zero() {
                    write!(f, "{} + ", re)?;
                }
                if im.is_one() {
                    write!(f, "i")
                } else {
                    write!(f, "{}*i", im)
                }
            },
            Self::Infinity => write!(f, "inf"),
            Self::Undefined => write!(f, "undef"),
        }
    }
}
