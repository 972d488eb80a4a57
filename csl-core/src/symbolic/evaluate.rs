//! Evaluation of expressions.
//!
//! [`evaluate`] replaces parts of an expression by their value, according to an [`EvalMode`].
//! Modes can be combined: `EvalMode::LITERAL | EvalMode::NUMERICAL` substitutes the values of
//! constants, then turns every exact number into a float.

use bitflags::bitflags;
use crate::{
    consts::{E, EPSILON, PI},
    numeric::Number,
};
use super::{
    abbrev::inline,
    algebra::{as_polynomial, polynomial_to_sum, prod, quotient, sum},
    derivative::derive,
    expr::{Expr, ExprKind},
    parent::ParentKind,
    replace::replace,
    rewrite::contract_index,
};

bitflags! {
    /// What [`evaluate`] replaces by its value.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct EvalMode: u8 {
        /// Exact numbers become floats, and so do the constants `pi` and `e`.
        const NUMERICAL = 1 << 0;

        /// Constants with a value are replaced by it, polynomials are written as sums,
        /// derivatives are computed and trivial integrals are integrated.
        const LITERAL = 1 << 1;

        /// Kronecker deltas are contracted, and deltas with fixed indices are evaluated.
        const INDICIAL = 1 << 2;

        /// Instances of abbreviations whose evaluation is enabled are replaced by the expression
        /// they stand for.
        const ABBREVIATION = 1 << 3;
    }
}

/// Drops the imaginary part of a complex float when it is negligible.
fn chop(n: Number) -> Number {
    match &n {
        Number::Complex(re, im) => match im.to_float() {
            Some(im) if im.clone().abs() < *EPSILON => (**re).clone(),
            _ => n,
        },
        _ => n,
    }
}

/// The value of a constant, if it has one in the given mode.
fn constant_value(expr: &Expr, mode: EvalMode) -> Option<Number> {
    let ExprKind::Symbol { parent, conjugated } = expr.kind() else {
        return None;
    };
    if mode.contains(EvalMode::LITERAL) {
        if let Some(value) = parent.value() {
            return Some(if *conjugated { value.conj() } else { value.clone() });
        }
    }
    if mode.contains(EvalMode::NUMERICAL)
        && *parent.kind() == ParentKind::Constant
        && parent.value().is_none()
    {
        return match parent.name() {
            "pi" => Some(Number::from_float(PI.clone())),
            "e" => Some(Number::from_float(E.clone())),
            _ => None,
        };
    }
    None
}

/// Integrates `operand` if it does not depend on `variable`, or is a polynomial in it with
/// constant coefficients.
fn integrate(operand: &Expr, variable: &Expr, bounds: &Option<(Expr, Expr)>) -> Option<Expr> {
    let antiderivative = if !operand.depends_on(variable) {
        prod(vec![operand.clone(), variable.clone()], false)
    } else {
        let poly = as_polynomial(operand, variable)?;
        let ExprKind::Polynomial { coefficients, .. } = poly.kind() else {
            return None;
        };
        if coefficients.iter().any(|c| c.depends_on(variable)) {
            return None;
        }
        let shifted = std::iter::once(Expr::zero())
            .chain(coefficients.iter().enumerate().map(|(k, c)| {
                quotient(c.clone(), Expr::number(k as i64 + 1))
            }))
            .collect::<Vec<_>>();
        polynomial_to_sum(variable, &shifted)
    };

    match bounds {
        None => Some(antiderivative),
        Some((lower, upper)) => {
            let upper = replace(&antiderivative, variable, upper).ok()?;
            let lower = replace(&antiderivative, variable, lower).ok()?;
            Some(sum(vec![upper, prod(vec![Expr::minus_one(), lower], false)], false))
        },
    }
}

/// Evaluates a node whose children are already evaluated.
fn evaluate_node(expr: Expr, mode: EvalMode) -> Expr {
    if let Some(value) = constant_value(&expr, mode) {
        let value = if mode.contains(EvalMode::NUMERICAL) { value.to_numerical() } else { value };
        return Expr::number(chop(value));
    }

    match expr.kind() {
        ExprKind::Number(n) if mode.contains(EvalMode::NUMERICAL) => {
            Expr::number(chop(n.to_numerical()))
        },
        ExprKind::Tensor { .. } | ExprKind::Prod(_) if mode.contains(EvalMode::INDICIAL) => {
            contract_index(&expr)
        },
        ExprKind::Polynomial { variable, coefficients } if mode.contains(EvalMode::LITERAL) => {
            evaluate(&polynomial_to_sum(variable, coefficients), mode)
        },
        ExprKind::Derivative { operand: Some(operand), variable, order } if mode.contains(EvalMode::LITERAL) => {
            let mut result = operand.clone();
            for _ in 0..*order {
                match derive(&result, variable) {
                    Ok(derived) => result = derived,
                    Err(_) => return expr,
                }
            }
            evaluate(&result, mode)
        },
        ExprKind::Integral { operand, variable, bounds } if mode.contains(EvalMode::LITERAL) => {
            match integrate(operand, variable, bounds) {
                Some(result) => evaluate(&result, mode),
                None => expr,
            }
        },
        _ => expr,
    }
}

/// Evaluates `expr` in the given mode, bottom-up.
///
/// ```
/// use csl_core::symbolic::{evaluate, prod, variable, EvalMode, Expr, Parent};
///
/// let g = Parent::constant("g").value(10).build().instance().unwrap();
/// let x = variable("x");
/// let e = prod(vec![g, x.clone()], false);
/// assert_eq!(evaluate(&e, EvalMode::LITERAL), prod(vec![Expr::number(10), x], false));
/// ```
pub fn evaluate(expr: &Expr, mode: EvalMode) -> Expr {
    if mode.contains(EvalMode::ABBREVIATION) && expr.parent().is_some_and(|parent| parent.is_evaluated()) {
        return evaluate(&inline(expr), mode);
    }
    evaluate_node(expr.map_children(|child| evaluate(child, mode)), mode)
}
