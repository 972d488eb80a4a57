//! Symbolic derivatives of the scalar functions.

use super::super::{
    algebra::{cos, exp, pow, prod, sin, sum, tan, Function},
    expr::Expr,
};

/// Computes the derivative of a function with respect to its argument. The chain rule is applied
/// by the caller.
pub(super) fn function_derivative(f: Function, arg: &Expr) -> Expr {
    match f {
        Function::Exp => exp(arg.clone()),
        Function::Log => pow(arg.clone(), Expr::minus_one()),
        Function::Cos => prod(vec![Expr::minus_one(), sin(arg.clone())], false),
        Function::Sin => cos(arg.clone()),

        // 1 + tan(x)^2
        Function::Tan => sum(vec![
            Expr::one(),
            pow(tan(arg.clone()), Expr::number(2)),
        ], false),
    }
}
