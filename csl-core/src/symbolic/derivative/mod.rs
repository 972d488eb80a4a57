//! Symbolic differentiation.
//!
//! [`derive`] computes the derivative of an expression with respect to a variable, using the
//! sum, product, power and chain rules. The inert node built by
//! [`derivative`](super::derivative) is computed the same way when an expression is evaluated
//! literally.

mod function;

use crate::error::{kind::{TypeMismatch, UnsupportedDerivative}, on, Error};
use function::function_derivative;
use super::{
    abbrev::inline,
    algebra::{derivative, integral, log, polynomial, polynomial_to_sum, pow, prod, sum},
    expr::{Expr, ExprKind, ExprType},
    parent::ParentKind,
    replace::replace,
};

/// Describes the kind of a node for error messages.
pub(crate) fn describe(expr: &Expr) -> &'static str {
    match expr.get_type() {
        ExprType::Number => "a number",
        ExprType::Symbol => match expr.parent().map(|parent| parent.kind()) {
            Some(ParentKind::Variable) => "a variable",
            _ => "a constant",
        },
        ExprType::Tensor => "a tensor element",
        ExprType::Function => "a function",
        ExprType::Pow => "a power",
        ExprType::Prod => "a product",
        ExprType::Sum => "a sum",
        ExprType::Polynomial => "a polynomial",
        ExprType::Derivative => "a derivative",
        ExprType::Integral => "an integral",
    }
}

fn is_variable(expr: &Expr) -> bool {
    matches!(
        expr.kind(),
        ExprKind::Symbol { parent, .. } if *parent.kind() == ParentKind::Variable
    )
}

/// `(f + g)' = f' + g'`
fn sum_rule(terms: &[Expr], var: &Expr) -> Result<Expr, Error> {
    let derived = terms
        .iter()
        .map(|term| derive(term, var))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(sum(derived, false))
}

/// `(f * g * h)' = f' * g * h + f * g' * h + f * g * h'`
///
/// Factors keep their position, so the rule holds for factors that do not commute.
fn product_rule(factors: &[Expr], var: &Expr) -> Result<Expr, Error> {
    let mut terms = Vec::with_capacity(factors.len());
    for k in 0..factors.len() {
        if !factors[k].depends_on(var) {
            continue;
        }
        let mut term = factors.to_vec();
        term[k] = derive(&factors[k], var)?;
        terms.push(prod(term, false));
    }
    Ok(sum(terms, false))
}

/// `(f^g)' = f^g * (g' * log(f) + g * f' / f)`, with the usual shortcuts when either side is
/// constant.
fn power_rule(base: &Expr, exponent: &Expr, var: &Expr) -> Result<Expr, Error> {
    let power = pow(base.clone(), exponent.clone());
    if !exponent.depends_on(var) {
        let lowered = sum(vec![exponent.clone(), Expr::minus_one()], false);
        return Ok(prod(vec![
            exponent.clone(),
            pow(base.clone(), lowered),
            derive(base, var)?,
        ], false));
    }
    if !base.depends_on(var) {
        return Ok(prod(vec![power, log(base.clone()), derive(exponent, var)?], false));
    }

    let inner = sum(vec![
        prod(vec![derive(exponent, var)?, log(base.clone())], false),
        prod(vec![exponent.clone(), derive(base, var)?, pow(base.clone(), Expr::minus_one())], false),
    ], false);
    Ok(prod(vec![power, inner], false))
}

/// `d/dx int(f(t), t, a(x), b(x)) = f(b) * b' - f(a) * a' + int(df/dx, t, a, b)`
fn leibniz_rule(
    operand: &Expr,
    variable: &Expr,
    bounds: &Option<(Expr, Expr)>,
    var: &Expr,
) -> Result<Expr, Error> {
    let inner = if variable == var {
        Expr::zero()
    } else {
        integral(derive(operand, var)?, variable.clone(), bounds.clone())
    };

    let Some((lower, upper)) = bounds else {
        return Ok(if variable == var { operand.clone() } else { inner });
    };
    Ok(sum(vec![
        inner,
        prod(vec![replace(operand, variable, upper)?, derive(upper, var)?], false),
        prod(vec![Expr::minus_one(), replace(operand, variable, lower)?, derive(lower, var)?], false),
    ], false))
}

/// Computes the derivative of `expr` with respect to the variable `var`.
///
/// Abbreviations that depend on `var` are inlined first. Returns an error if `var` is not a
/// variable, or if `expr` contains a pending derivative operator.
///
/// ```
/// use csl_core::symbolic::{derive, pow, variable, Expr};
///
/// let x = variable("x");
/// let cube = pow(x.clone(), Expr::number(3));
/// assert_eq!(derive(&cube, &x).unwrap().to_string(), "3 * x^2");
/// ```
pub fn derive(expr: &Expr, var: &Expr) -> Result<Expr, Error> {
    if !is_variable(var) {
        return Err(on(var, TypeMismatch { expected: "a variable", found: describe(var) }));
    }
    if !expr.depends_on(var) {
        if expr.post_order_iter().any(Expr::is_operator) {
            return Err(on(expr, UnsupportedDerivative { what: "a pending derivative operator" }));
        }
        return Ok(Expr::zero());
    }

    match expr.kind() {
        ExprKind::Number(_) => Ok(Expr::zero()),
        ExprKind::Symbol { .. } | ExprKind::Tensor { .. } if expr.is_abbreviation() => {
            derive(&inline(expr), var)
        },
        ExprKind::Symbol { conjugated, .. } => {
            // z and conj(z) are independent
            Ok(if *conjugated { Expr::zero() } else { Expr::one() })
        },
        ExprKind::Tensor { .. } => Ok(Expr::zero()),
        ExprKind::Function(f, arg) => {
            Ok(prod(vec![function_derivative(*f, arg), derive(arg, var)?], false))
        },
        ExprKind::Sum(terms) => sum_rule(terms, var),
        ExprKind::Prod(factors) => {
            if factors.iter().any(Expr::is_operator) {
                return Err(on(expr, UnsupportedDerivative { what: "a pending derivative operator" }));
            }
            product_rule(factors, var)
        },
        ExprKind::Pow(base, exponent) => power_rule(base, exponent, var),
        ExprKind::Polynomial { variable, coefficients } => {
            if variable == var && !coefficients.iter().any(|c| c.depends_on(var)) {
                let derived = coefficients
                    .iter()
                    .enumerate()
                    .skip(1)
                    .map(|(k, c)| prod(vec![Expr::number(k as i64), c.clone()], false))
                    .collect();
                Ok(polynomial(derived, variable.clone()))
            } else {
                derive(&polynomial_to_sum(variable, coefficients), var)
            }
        },
        ExprKind::Derivative { operand: Some(operand), variable, order } => {
            if variable == var {
                Ok(derivative(operand.clone(), var.clone(), order + 1))
            } else {
                Ok(derivative(derive(operand, var)?, variable.clone(), *order))
            }
        },
        ExprKind::Derivative { operand: None, .. } => {
            Err(on(expr, UnsupportedDerivative { what: "a pending derivative operator" }))
        },
        ExprKind::Integral { operand, variable, bounds } => leibniz_rule(operand, variable, bounds, var),
    }
}

#[cfg(test)]
mod tests {
    use crate::{error::kind::{TypeMismatch, UnsupportedDerivative}, symbolic::*};
    use pretty_assertions::assert_eq;

    #[test]
    fn power_rule() {
        let x = variable("x");
        let cube = pow(x.clone(), Expr::number(3));
        let expected = prod(vec![Expr::number(3), pow(x.clone(), Expr::number(2))], false);
        assert_eq!(derive(&cube, &x).unwrap(), expected);
        assert_eq!(derive(&constant("c"), &x).unwrap(), Expr::zero());
        assert_eq!(derive(&x, &x).unwrap(), Expr::one());
    }

    #[test]
    fn chain_rule() {
        let x = variable("x");
        let two_x = prod(vec![Expr::number(2), x.clone()], false);
        let e = sin(two_x.clone());
        assert_eq!(
            derive(&e, &x).unwrap(),
            prod(vec![Expr::number(2), cos(two_x)], false),
        );
        assert_eq!(derive(&exp(x.clone()), &x).unwrap(), exp(x.clone()));
        assert_eq!(derive(&log(x.clone()), &x).unwrap(), pow(x, Expr::minus_one()));
    }

    #[test]
    fn product_rule_keeps_order() {
        let x = variable("x");
        let a = Parent::variable("A").commutable(false).build().instance().unwrap();
        let b = Parent::constant("B").commutable(false).build().instance().unwrap();
        let e = prod(vec![b.clone(), a.clone(), x.clone()], false);

        // only the variable is differentiated, the walls stay in place
        let expected = prod(vec![b.clone(), a.clone()], false);
        assert_eq!(derive(&e, &x).unwrap(), expected);

        let e = prod(vec![a.clone(), b.clone()], false);
        assert_eq!(derive(&e, &a).unwrap(), b);
    }

    #[test]
    fn exponential_of_constant_base() {
        let x = variable("x");
        let two = Expr::number(2);
        let e = pow(two.clone(), x.clone());
        assert_eq!(derive(&e, &x).unwrap(), prod(vec![e.clone(), log(two)], false));
    }

    #[test]
    fn nested_derivatives_and_integrals() {
        let x = variable("x");
        let y = variable("y");
        let f = prod(vec![cos(x.clone()), y.clone()], false);
        let dy = derivative(f.clone(), y.clone(), 1);
        assert_eq!(
            derive(&dy, &y).unwrap(),
            derivative(f.clone(), y.clone(), 2),
        );

        // d/dx int(f(t), t, 0, x) = f(x)
        let t = variable("t");
        let e = integral(cos(t.clone()), t.clone(), Some((Expr::zero(), x.clone())));
        assert_eq!(derive(&e, &x).unwrap(), cos(x.clone()));

        let e = integral(cos(x.clone()), x.clone(), None);
        assert_eq!(derive(&e, &x).unwrap(), cos(x));
    }

    #[test]
    fn polynomials() {
        let x = variable("x");
        let p = polynomial(vec![Expr::number(1), Expr::number(2), Expr::number(3)], x.clone());
        assert_eq!(
            derive(&p, &x).unwrap(),
            polynomial(vec![Expr::number(2), Expr::number(6)], x),
        );
    }

    #[test]
    fn errors() {
        let x = variable("x");
        let c = constant("c");
        assert!(derive(&x, &c).unwrap_err().is::<TypeMismatch>());

        let pending = prod(vec![derivative_operator(x.clone(), 1), c.clone()], false);
        assert!(derive(&pending, &x).unwrap_err().is::<UnsupportedDerivative>());
    }
}
