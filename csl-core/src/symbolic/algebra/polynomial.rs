use crate::numeric::Number;
use super::{
    super::expr::{Expr, ExprKind},
    pow, prod,
    product::scaled,
    sum,
};

/// Builds the polynomial `c0 + c1 * v + c2 * v^2 + ...` in `variable`.
///
/// Trailing zero coefficients are dropped, so a polynomial of degree zero collapses to its
/// constant coefficient.
pub fn polynomial(mut coefficients: Vec<Expr>, variable: Expr) -> Expr {
    while coefficients.last().is_some_and(Expr::is_zero) {
        coefficients.pop();
    }
    match coefficients.len() {
        0 => Expr::zero(),
        1 => coefficients.remove(0),
        _ => Expr::new(ExprKind::Polynomial { variable, coefficients }),
    }
}

/// Returns the coefficient and degree of a term of a polynomial in `variable`, if the term is
/// `c * variable^n` for a non-negative integer `n` and `c` independent of `variable`.
fn monomial(term: &Expr, variable: &Expr) -> Option<(Expr, usize)> {
    if !term.depends_on(variable) {
        return Some((term.clone(), 0));
    }

    let degree_of = |factor: &Expr| -> Option<usize> {
        if factor == variable {
            return Some(1);
        }
        match factor.kind() {
            ExprKind::Pow(base, exponent) if base == variable => {
                exponent.as_number()?.as_integer()?.to_usize()
            },
            _ => None,
        }
    };

    match term.kind() {
        ExprKind::Prod(factors) => {
            let mut degree = None;
            let mut rest = Vec::with_capacity(factors.len());
            for factor in factors {
                if factor.depends_on(variable) {
                    if degree.is_some() {
                        return None;
                    }
                    degree = Some(degree_of(factor)?);
                } else {
                    rest.push(factor.clone());
                }
            }
            Some((prod(rest, false), degree?))
        },
        _ => Some((Expr::one(), degree_of(term)?)),
    }
}

/// Converts an expression to a polynomial in `variable`. Returns [`None`] if the expression is
/// not polynomial in `variable`.
pub fn as_polynomial(expr: &Expr, variable: &Expr) -> Option<Expr> {
    let terms = match expr.kind() {
        ExprKind::Sum(terms) => terms.iter().collect::<Vec<_>>(),
        _ => vec![expr],
    };

    let mut coefficients: Vec<Vec<Expr>> = Vec::new();
    for term in terms {
        if let ExprKind::Polynomial { variable: v, coefficients: c } = term.kind() {
            if v != variable {
                return None;
            }
            for (degree, coefficient) in c.iter().enumerate() {
                push_coefficient(&mut coefficients, degree, coefficient.clone());
            }
            continue;
        }
        let (coefficient, degree) = monomial(term, variable)?;
        push_coefficient(&mut coefficients, degree, coefficient);
    }

    let coefficients = coefficients.into_iter().map(|terms| sum(terms, false)).collect();
    Some(polynomial(coefficients, variable.clone()))
}

fn push_coefficient(coefficients: &mut Vec<Vec<Expr>>, degree: usize, coefficient: Expr) {
    if coefficients.len() <= degree {
        coefficients.resize_with(degree + 1, Vec::new);
    }
    coefficients[degree].push(coefficient);
}

/// Returns the coefficients of `coefficient * polynomial`.
pub(crate) fn scaled_coefficients(coefficient: &Number, coefficients: &[Expr]) -> Vec<Expr> {
    coefficients
        .iter()
        .map(|c| prod(vec![Expr::number(coefficient.clone()), c.clone()], false))
        .collect()
}

/// Adds two polynomials in the same variable, coefficient by coefficient.
pub(crate) fn add_polynomials(variable: &Expr, a: &[Expr], b: &[Expr]) -> Expr {
    let coefficients = (0..a.len().max(b.len()))
        .map(|i| {
            let terms = a.get(i).into_iter().chain(b.get(i)).cloned().collect();
            sum(terms, false)
        })
        .collect();
    polynomial(coefficients, variable.clone())
}

/// Multiplies two polynomials in the same variable.
pub(crate) fn multiply_polynomials(variable: &Expr, a: &[Expr], b: &[Expr]) -> Expr {
    let mut coefficients = vec![Vec::new(); a.len() + b.len() - 1];
    for (i, x) in a.iter().enumerate() {
        for (j, y) in b.iter().enumerate() {
            coefficients[i + j].push(prod(vec![x.clone(), y.clone()], false));
        }
    }
    let coefficients = coefficients.into_iter().map(|terms| sum(terms, false)).collect();
    polynomial(coefficients, variable.clone())
}

/// Writes a polynomial as the sum of its monomials.
pub(crate) fn polynomial_to_sum(variable: &Expr, coefficients: &[Expr]) -> Expr {
    let terms = coefficients
        .iter()
        .enumerate()
        .map(|(degree, c)| {
            let power = pow(variable.clone(), Expr::number(degree as i64));
            match c.as_number() {
                Some(n) => scaled(n.clone(), power),
                None => prod(vec![c.clone(), power], false),
            }
        })
        .collect();
    sum(terms, false)
}

#[cfg(test)]
mod tests {
    use crate::symbolic::*;
    use pretty_assertions::assert_eq;
    use super::*;

    fn poly(coefficients: &[i64], variable: &Expr) -> Expr {
        let coefficients = coefficients.iter().map(|&c| Expr::number(c)).collect();
        polynomial(coefficients, variable.clone())
    }

    #[test]
    fn trailing_zeros_collapse() {
        let x = variable("x");
        assert_eq!(poly(&[3, 0, 0], &x), Expr::number(3));
        assert_eq!(poly(&[], &x), Expr::zero());
        assert_eq!(poly(&[1, 2], &x).to_string(), "poly(x, [1, 2])");
    }

    #[test]
    fn conversion() {
        let x = variable("x");
        let y = variable("y");
        let e = sum(vec![
            Expr::one(),
            prod(vec![Expr::number(2), y.clone(), x.clone()], false),
            pow(x.clone(), Expr::number(3)),
        ], false);
        let p = as_polynomial(&e, &x).unwrap();
        let expected = polynomial(vec![
            Expr::one(),
            prod(vec![Expr::number(2), y.clone()], false),
            Expr::zero(),
            Expr::one(),
        ], x.clone());
        assert_eq!(p, expected);
        assert!(as_polynomial(&cos(x.clone()), &x).is_none());
    }

    #[test]
    fn polynomial_arithmetic() {
        let x = variable("x");
        // (1 + x) + (2 + 3x) = 3 + 4x
        assert_eq!(sum(vec![poly(&[1, 1], &x), poly(&[2, 3], &x)], false), poly(&[3, 4], &x));
        // (1 + x) * (1 - x) = 1 - x^2
        assert_eq!(prod(vec![poly(&[1, 1], &x), poly(&[1, -1], &x)], false), poly(&[1, 0, -1], &x));
    }

    #[test]
    fn back_to_sum() {
        let x = variable("x");
        let e = polynomial_to_sum(&x, &[Expr::number(2), Expr::zero(), Expr::number(3)]);
        assert_eq!(e.to_string(), "2 + 3 * x^2");
    }
}
