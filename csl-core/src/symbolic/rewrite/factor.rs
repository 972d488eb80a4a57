use crate::{numeric::Number, primitive::int};
use std::cmp::Ordering;
use super::super::{
    algebra::{is_commutable, pow, prod, sum},
    expr::{Expr, ExprKind},
};

/// Returns the factors of a term without its coefficient.
fn factors_of(expr: &Expr) -> Vec<Expr> {
    match expr.kind() {
        ExprKind::Prod(factors) => factors.clone(),
        _ if expr.is_one() => Vec::new(),
        _ => vec![expr.clone()],
    }
}

/// Returns the greatest common divisor of the coefficients if they are all integers.
fn integer_gcd(coefficients: &[Number]) -> Option<Number> {
    let mut gcd = int(0);
    for coefficient in coefficients {
        gcd = gcd.gcd(coefficient.as_integer()?);
    }
    (gcd > 1).then(|| Number::from(gcd))
}

/// Finds the bases that appear with a positive numeric exponent in every term, with the smallest
/// such exponent.
fn common_powers(terms: &[Vec<Expr>]) -> Vec<(Expr, Number)> {
    let Some((first, others)) = terms.split_first() else {
        return Vec::new();
    };
    first
        .iter()
        .map(Expr::split_power)
        .filter(|(base, exponent)| is_commutable(base) && !base.is_indexed() && !exponent.is_negative())
        .filter_map(|(base, exponent)| {
            let mut smallest = exponent;
            for factors in others {
                let found = factors
                    .iter()
                    .map(Expr::split_power)
                    .find(|(other, _)| *other == base)?;
                if found.1.is_negative() {
                    return None;
                }
                if found.1.total_cmp(&smallest) == Ordering::Less {
                    smallest = found.1;
                }
            }
            Some((base, smallest))
        })
        .collect()
}

/// Pulls the common numeric and symbolic factors out of the terms of a sum.
fn factor_terms(terms: &[Expr]) -> Option<Expr> {
    let (coefficients, factors): (Vec<_>, Vec<_>) = terms
        .iter()
        .map(|term| {
            let (coefficient, rest) = term.split_coefficient();
            (coefficient, factors_of(&rest))
        })
        .unzip();
    if !factors.iter().flatten().all(is_commutable) {
        return None;
    }

    let gcd = integer_gcd(&coefficients);
    let common = common_powers(&factors);
    if gcd.is_none() && common.is_empty() {
        return None;
    }
    let gcd = gcd.unwrap_or_else(Number::one);

    let remaining = coefficients
        .iter()
        .zip(&factors)
        .map(|(coefficient, factors)| {
            let mut rest = vec![Expr::number(coefficient.div(&gcd))];
            for factor in factors {
                let (base, exponent) = factor.split_power();
                match common.iter().find(|(common, _)| *common == base) {
                    Some((_, smallest)) => rest.push(pow(base, Expr::number(exponent.sub(smallest)))),
                    None => rest.push(factor.clone()),
                }
            }
            prod(rest, false)
        })
        .collect();

    let mut result = vec![Expr::number(gcd)];
    result.extend(common.into_iter().map(|(base, exponent)| pow(base, Expr::number(exponent))));
    result.push(sum(remaining, false));
    Some(prod(result, false))
}

/// Factors every sum of `expr`: the greatest common divisor of integer coefficients, and the
/// powers common to every term, are pulled out.
///
/// ```
/// use csl_core::symbolic::{factored, pow, prod, sum, variable, Expr};
///
/// let x = variable("x");
/// let y = variable("y");
/// let e = sum(vec![
///     prod(vec![Expr::number(2), x.clone(), y.clone()], false),
///     prod(vec![Expr::number(4), pow(x.clone(), Expr::number(2))], false),
/// ], false);
/// let inner = sum(vec![y, prod(vec![Expr::number(2), x.clone()], false)], false);
/// assert_eq!(factored(&e), prod(vec![Expr::number(2), x, inner], false));
/// ```
pub fn factored(expr: &Expr) -> Expr {
    let expr = expr.map_children(factored);
    match expr.kind() {
        ExprKind::Sum(terms) => factor_terms(terms).unwrap_or(expr),
        _ => expr,
    }
}

/// Removes one power of `factor` from `term`, if it can be moved to the front of the term.
fn without_factor(term: &Expr, factor: &Expr) -> Option<Expr> {
    if term == factor {
        return Some(Expr::one());
    }
    let factors = match term.kind() {
        ExprKind::Prod(factors) => factors.as_slice(),
        _ => std::slice::from_ref(term),
    };
    let k = factors.iter().position(|f| {
        let (base, exponent) = f.split_power();
        base == *factor && !exponent.is_negative() && !exponent.is_zero()
    })?;
    if k > 0 && !is_commutable(factor) {
        return None;
    }

    let mut rest = factors.to_vec();
    let (base, exponent) = rest[k].split_power();
    rest[k] = pow(base, Expr::number(exponent.sub(&Number::one())));
    Some(prod(rest, false))
}

/// Groups the terms of every sum of `expr` by the given factors: `a*x + b*x + c` collected by `x`
/// is `c + x*(a + b)`. A term is grouped under the first factor it contains.
pub fn collect(expr: &Expr, factors: &[Expr]) -> Expr {
    let expr = expr.map_children(|child| collect(child, factors));
    let ExprKind::Sum(terms) = expr.kind() else {
        return expr;
    };

    let mut groups = vec![Vec::new(); factors.len()];
    let mut rest = Vec::new();
    for term in terms {
        let found = factors
            .iter()
            .enumerate()
            .find_map(|(k, factor)| without_factor(term, factor).map(|r| (k, r)));
        match found {
            Some((k, remaining)) => groups[k].push(remaining),
            None => rest.push(term.clone()),
        }
    }
    if groups.iter().all(|group| group.len() < 2) {
        return expr.clone();
    }

    for (factor, group) in factors.iter().zip(groups) {
        if !group.is_empty() {
            rest.push(prod(vec![factor.clone(), sum(group, false)], false));
        }
    }
    sum(rest, false)
}
