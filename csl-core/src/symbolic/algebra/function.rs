use crate::numeric::Number;
use rug::Float;
use std::{cmp::Ordering, fmt};
use super::{
    super::expr::{Expr, ExprKind},
    product::scaled,
};

/// A scalar function of one argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Function {
    Exp,
    Log,
    Cos,
    Sin,
    Tan,
}

impl Function {
    /// The name of the function, as printed.
    pub fn name(self) -> &'static str {
        match self {
            Self::Exp => "exp",
            Self::Log => "log",
            Self::Cos => "cos",
            Self::Sin => "sin",
            Self::Tan => "tan",
        }
    }

    /// Returns the value of the function at `x`, if it is exact.
    fn exact_value(self, x: &Number) -> Option<Number> {
        match self {
            Self::Exp | Self::Cos if x.is_zero() => Some(Number::one()),
            Self::Sin | Self::Tan if x.is_zero() => Some(Number::zero()),
            Self::Log if x.is_one() => Some(Number::zero()),
            _ => None,
        }
    }

    /// Evaluates the function at a real float. The logarithm is only evaluated for positive
    /// arguments.
    pub(crate) fn eval_float(self, x: &Float) -> Option<Number> {
        let x = x.clone();
        let value = match self {
            Self::Exp => x.exp(),
            Self::Log if x.cmp0() == Some(Ordering::Greater) => x.ln(),
            Self::Log => return None,
            Self::Cos => x.cos(),
            Self::Sin => x.sin(),
            Self::Tan => x.tan(),
        };
        Some(Number::from_float(value))
    }

    /// Returns the parity of the function: `Some(true)` if odd, `Some(false)` if even.
    fn parity(self) -> Option<bool> {
        match self {
            Self::Sin | Self::Tan => Some(true),
            Self::Cos => Some(false),
            Self::Exp | Self::Log => None,
        }
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Applies a function to an argument.
///
/// Exact special values are computed (`cos(0) = 1`, `log(1) = 0`, ...), floating-point arguments
/// are evaluated, odd and even functions absorb the sign of a negative coefficient, and
/// `exp(log(x))` gives `x`.
pub fn function(f: Function, arg: Expr) -> Expr {
    if let Some(x) = arg.as_number() {
        if x.is_undefined() {
            return Expr::undefined();
        }
        if let Some(value) = f.exact_value(x) {
            return Expr::number(value);
        }
        if let Number::Float(x) = x {
            if let Some(value) = f.eval_float(x) {
                return Expr::number(value);
            }
        }
    }

    if let (Function::Exp, ExprKind::Function(Function::Log, inner)) = (f, arg.kind()) {
        return inner.clone();
    }

    if let Some(odd) = f.parity() {
        let (coefficient, rest) = arg.split_coefficient();
        if coefficient.is_negative() {
            let positive = function(f, scaled(coefficient.neg(), rest));
            return if odd { scaled(Number::minus_one(), positive) } else { positive };
        }
    }

    Expr::new(ExprKind::Function(f, arg))
}

pub fn exp(arg: Expr) -> Expr {
    function(Function::Exp, arg)
}

/// The natural logarithm.
pub fn log(arg: Expr) -> Expr {
    function(Function::Log, arg)
}

pub fn cos(arg: Expr) -> Expr {
    function(Function::Cos, arg)
}

pub fn sin(arg: Expr) -> Expr {
    function(Function::Sin, arg)
}

pub fn tan(arg: Expr) -> Expr {
    function(Function::Tan, arg)
}

#[cfg(test)]
mod tests {
    use assert_float_eq::{
        afe_is_relative_eq,
        assert_float_relative_eq,
    };
    use crate::{primitive::float, symbolic::*};
    use pretty_assertions::assert_eq;
    use super::*;

    #[test]
    fn exact_values() {
        assert_eq!(cos(Expr::zero()), Expr::one());
        assert_eq!(sin(Expr::zero()), Expr::zero());
        assert_eq!(log(Expr::one()), Expr::zero());
        assert_eq!(exp(Expr::zero()), Expr::one());
    }

    #[test]
    fn float_arguments() {
        let value = cos(Expr::number(float(0.5)));
        assert_float_relative_eq!(value.as_number().unwrap().to_f64().unwrap(), 0.5f64.cos());
        assert_eq!(log(Expr::number(float(-1))).get_type(), ExprType::Function);
    }

    #[test]
    fn parity() {
        let x = variable("x");
        let minus_x = -x.clone();
        assert_eq!(cos(minus_x.clone()), cos(x.clone()));
        assert_eq!(sin(minus_x), -sin(x.clone()));
        assert_eq!(exp(log(x.clone())), x);
    }
}
