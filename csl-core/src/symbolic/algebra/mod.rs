//! Smart constructors that keep expressions in canonical form.
//!
//! Every composite node is built through one of the functions in this module. They flatten,
//! fold, merge and sort their operands so that structurally different inputs describing the same
//! value produce the same tree wherever the rules allow it. See [`sum`], [`prod`] and [`pow`]
//! for the rules of each node kind.
//!
//! The arithmetic operators of [`Expr`] are shorthands for these constructors:
//!
//! ```
//! use csl_core::symbolic::{variable, Expr};
//!
//! let x = variable("x");
//! let e = x.clone() * x.clone() + Expr::number(3) * x.clone() - x.clone();
//! assert_eq!(e.to_string(), "x^2 + 2 * x");
//! ```

mod calculus;
mod commutation;
mod function;
mod polynomial;
mod power;
mod product;
mod sum;

pub use calculus::{derivative, derivative_operator, integral};
pub use commutation::{commutation, is_commutable};
pub use function::{cos, exp, function, log, sin, tan, Function};
pub use polynomial::{as_polynomial, polynomial};
pub use power::{pow, sqrt};
pub use product::{prod, quotient};
pub use sum::{sum, sum_checked};

pub(crate) use commutation::commutes;
pub(crate) use polynomial::polynomial_to_sum;
pub(crate) use product::scaled;

use crate::numeric::Number;
use std::ops::{Add, Div, Mul, Neg, Sub};
use super::{expr::Expr, parent::{symbol_instance, Parent}};

/// An instance of a new real constant with the given name.
pub fn constant(name: &str) -> Expr {
    symbol_instance(&Parent::constant(name).build(), false)
}

/// An instance of a new real variable with the given name.
pub fn variable(name: &str) -> Expr {
    symbol_instance(&Parent::variable(name).build(), false)
}

impl Add for Expr {
    type Output = Expr;

    fn add(self, rhs: Expr) -> Expr {
        sum(vec![self, rhs], false)
    }
}

impl Sub for Expr {
    type Output = Expr;

    fn sub(self, rhs: Expr) -> Expr {
        sum(vec![self, -rhs], false)
    }
}

impl Mul for Expr {
    type Output = Expr;

    fn mul(self, rhs: Expr) -> Expr {
        prod(vec![self, rhs], false)
    }
}

impl Div for Expr {
    type Output = Expr;

    fn div(self, rhs: Expr) -> Expr {
        quotient(self, rhs)
    }
}

impl Neg for Expr {
    type Output = Expr;

    fn neg(self) -> Expr {
        match self.as_number() {
            Some(n) => Expr::number(n.neg()),
            None => prod(vec![Expr::number(Number::minus_one()), self], false),
        }
    }
}

/// Implements a binary operator on references by cloning the handles.
macro_rules! ref_binop {
    ($($trait:ident $method:ident),* $(,)?) => {
        $(
            impl $trait<&Expr> for &Expr {
                type Output = Expr;

                fn $method(self, rhs: &Expr) -> Expr {
                    $trait::$method(self.clone(), rhs.clone())
                }
            }
        )*
    };
}

ref_binop!(Add add, Sub sub, Mul mul, Div div);

impl Neg for &Expr {
    type Output = Expr;

    fn neg(self) -> Expr {
        -self.clone()
    }
}
