use super::super::{
    algebra::{polynomial_to_sum, prod, sum},
    dummy::rename_dummies,
    expr::{Expr, ExprKind},
};

/// Returns the terms of a factor, or the factor itself if it is not a sum. The dummies of each
/// term are renamed, since distributing moves terms of different sums into the same product.
fn terms_of(factor: &Expr) -> Vec<Expr> {
    match factor.kind() {
        ExprKind::Sum(terms) if factor.is_indexed() => terms.iter().map(rename_dummies).collect(),
        ExprKind::Sum(terms) => terms.clone(),
        _ => vec![factor.clone()],
    }
}

/// `a * (b + c) * (d + e) = a*b*d + a*b*e + a*c*d + a*c*e`, keeping the order of the factors.
fn distribute_all(factors: &[Expr]) -> Expr {
    let mut products: Vec<Vec<Expr>> = vec![Vec::new()];
    for factor in factors {
        let terms = terms_of(factor);
        products = products
            .into_iter()
            .flat_map(|partial| {
                terms.iter().map(move |term| {
                    let mut next = partial.clone();
                    next.push(term.clone());
                    next
                })
            })
            .collect();
    }
    sum(products.into_iter().map(|factors| prod(factors, false)).collect(), false)
}

/// `(a + b)^n` with a positive integer `n`, multiplied out.
fn expand_power(base: &Expr, exponent: &Expr) -> Option<Expr> {
    if !base.is_sum() || base.is_indexed() {
        return None;
    }
    let n = exponent.as_number()?.as_integer()?.to_u32().filter(|n| *n > 1)?;

    let mut result = base.clone();
    for _ in 1..n {
        result = match result.kind() {
            ExprKind::Sum(_) => distribute_all(&[result.clone(), base.clone()]),
            _ => prod(vec![result.clone(), base.clone()], false),
        };
    }
    Some(result)
}

/// Fully expands `expr`: products are distributed over sums, positive integer powers of sums are
/// multiplied out and polynomials are written as sums, at every level of the tree.
///
/// ```
/// use csl_core::symbolic::{expanded, pow, prod, sum, variable, Expr};
///
/// let x = variable("x");
/// let e = pow(sum(vec![x.clone(), Expr::one()], false), Expr::number(2));
/// let expected = sum(vec![
///     Expr::one(),
///     prod(vec![Expr::number(2), x.clone()], false),
///     pow(x, Expr::number(2)),
/// ], false);
/// assert_eq!(expanded(&e), expected);
/// ```
pub fn expanded(expr: &Expr) -> Expr {
    let expr = expr.map_children(expanded);
    match expr.kind() {
        ExprKind::Prod(factors) if factors.iter().any(Expr::is_sum) => {
            // products of terms may merge back into powers of sums
            expanded_once(&distribute_all(factors))
        },
        ExprKind::Pow(base, exponent) => expand_power(base, exponent).unwrap_or(expr),
        ExprKind::Polynomial { variable, coefficients } => {
            expanded(&polynomial_to_sum(variable, coefficients))
        },
        _ => expr,
    }
}

/// Expands the terms of a sum that are still products of sums after distribution.
fn expanded_once(expr: &Expr) -> Expr {
    match expr.kind() {
        ExprKind::Sum(terms) => sum(terms.iter().map(|term| match term.kind() {
            ExprKind::Pow(base, exponent) => expand_power(base, exponent).unwrap_or_else(|| term.clone()),
            _ => term.clone(),
        }).collect(), false),
        _ => expr.clone(),
    }
}

/// Distributes a product over the first sum among its factors, one level deep. Returns `expr`
/// unchanged if it is not such a product.
pub fn distributed(expr: &Expr) -> Expr {
    let ExprKind::Prod(factors) = expr.kind() else {
        return expr.clone();
    };
    let Some(k) = factors.iter().position(Expr::is_sum) else {
        return expr.clone();
    };

    let terms = terms_of(&factors[k])
        .into_iter()
        .map(|term| {
            let mut product = factors.to_vec();
            product[k] = term;
            prod(product, false)
        })
        .collect();
    sum(terms, false)
}
