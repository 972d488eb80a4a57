use crate::{
    error::{kind::FreeIndexMismatch, on, Error},
    numeric::Number,
    options,
};
use super::{
    super::{
        compare::compare,
        dummy::hard_comparison,
        expr::{Expr, ExprKind},
        index::{format_indices, same_free_labels},
    },
    function::Function,
    polynomial::{add_polynomials, scaled_coefficients},
    prod,
    product::scaled,
};

/// Adds terms together.
///
/// Unless `explicit` is set, the result is canonical: nested sums are flattened, numbers are
/// folded into a single leading term, like terms are merged by adding their coefficients (terms
/// carrying indices are compared up to a renaming of their dummy indices), terms whose
/// coefficient vanishes are dropped, polynomials in the same variable are added, and the terms
/// are sorted in comparator order.
///
/// With `explicit` set, the terms are taken as given and only an empty or single-term list is
/// collapsed.
///
/// ```
/// use csl_core::symbolic::{sum, variable, Expr};
///
/// let x = variable("x");
/// let e = sum(vec![x.clone(), Expr::number(2), x.clone()], false);
/// assert_eq!(e.to_string(), "2 + 2 * x");
/// ```
pub fn sum(children: Vec<Expr>, explicit: bool) -> Expr {
    if explicit {
        return collapse(children);
    }

    let mut head = Number::zero();
    let mut terms = Vec::with_capacity(children.len());
    for child in children {
        flatten(child, &mut head, &mut terms);
    }
    if head.is_undefined() || matches!(head, Number::Infinity) {
        return Expr::number(head);
    }

    let mut terms = if options::get().freeze_merge {
        terms
    } else {
        let (merged, changed) = pythagorean_identity(merge_like_terms(terms));
        let merged = merged
            .into_iter()
            .filter(|(coefficient, _)| !coefficient.is_zero())
            .map(|(coefficient, rest)| scaled(coefficient, rest));
        if changed {
            // the identity may produce constants and new like terms
            let children = std::iter::once(Expr::number(head)).chain(merged).collect();
            return sum(children, false);
        }
        merged.collect()
    };

    // stable
    terms.sort_by(compare);
    if !head.is_zero() {
        terms.insert(0, Expr::number(head));
    }
    collapse(terms)
}

/// Adds terms together, checking that every term carries the same free indices.
pub fn sum_checked(children: Vec<Expr>) -> Result<Expr, Error> {
    let mut structures = children
        .iter()
        .filter(|child| !child.is_zero())
        .map(|child| (child, child.free_indices()));
    if let Some((_, expected)) = structures.next() {
        for (child, found) in structures {
            if !same_free_labels(&expected, &found) {
                return Err(on(child, FreeIndexMismatch {
                    expected: format_indices(&expected),
                    found: format_indices(&found),
                }));
            }
        }
    }
    Ok(sum(children, false))
}

fn flatten(child: Expr, head: &mut Number, terms: &mut Vec<Expr>) {
    match child.kind() {
        ExprKind::Number(n) => *head = head.add(n),
        ExprKind::Sum(inner) => {
            for term in inner {
                flatten(term.clone(), head, terms);
            }
        },
        _ => terms.push(child),
    }
}

/// Returns true if two coefficient-free terms are equal, up to a renaming of their dummy
/// indices.
fn same_term(a: &Expr, b: &Expr) -> bool {
    if a.is_indexed() && b.is_indexed() {
        hard_comparison(a, b)
    } else {
        a == b
    }
}

/// Groups terms by their coefficient-free part, adding up coefficients.
fn merge_like_terms(terms: Vec<Expr>) -> Vec<(Number, Expr)> {
    let mut merged: Vec<(Number, Expr)> = Vec::with_capacity(terms.len());
    for term in terms {
        let (coefficient, rest) = term.split_coefficient();

        if let ExprKind::Polynomial { variable, coefficients } = rest.kind() {
            let existing = merged.iter_mut().find(|(_, other)| {
                matches!(other.kind(), ExprKind::Polynomial { variable: v, .. } if v == variable)
            });
            if let Some((c, other)) = existing {
                if let ExprKind::Polynomial { coefficients: others, .. } = other.kind() {
                    let total = add_polynomials(
                        variable,
                        &scaled_coefficients(c, others),
                        &scaled_coefficients(&coefficient, coefficients),
                    );
                    let (new_coefficient, new_rest) = total.split_coefficient();
                    *c = new_coefficient;
                    *other = new_rest;
                }
                continue;
            }
        }

        match merged.iter_mut().find(|(_, other)| same_term(other, &rest)) {
            Some((c, _)) => *c = c.add(&coefficient),
            None => merged.push((coefficient, rest)),
        }
    }
    merged
}

/// If `term` is `f(x)^2` for the given function, returns `x`.
fn square_of(term: &Expr, f: Function) -> Option<&Expr> {
    match term.kind() {
        ExprKind::Pow(base, exponent) if exponent.as_number().is_some_and(|n| *n == Number::from(2)) => {
            match base.kind() {
                ExprKind::Function(g, arg) if *g == f => Some(arg),
                _ => None,
            }
        },
        _ => None,
    }
}

/// Splits a term into the argument of a factor `f(x)^2` and the product of the other factors.
fn split_square(term: &Expr, f: Function) -> Option<(&Expr, Expr)> {
    match term.kind() {
        ExprKind::Prod(factors) => {
            let k = factors.iter().position(|factor| square_of(factor, f).is_some())?;
            let rest = factors
                .iter()
                .enumerate()
                .filter(|&(i, _)| i != k)
                .map(|(_, factor)| factor.clone())
                .collect();
            Some((square_of(&factors[k], f)?, prod(rest, false)))
        },
        _ => square_of(term, f).map(|arg| (arg, Expr::one())),
    }
}

/// Replaces each pair `c * a * cos(x)^2 + c * a * sin(x)^2` by `c * a`. Returns the new terms
/// and whether any pair was found.
fn pythagorean_identity(mut terms: Vec<(Number, Expr)>) -> (Vec<(Number, Expr)>, bool) {
    let mut changed = false;
    let mut i = 0;
    while i < terms.len() {
        let pair = split_square(&terms[i].1, Function::Cos).and_then(|(arg, rest)| {
            let j = terms.iter().position(|(c, term)| {
                *c == terms[i].0 && split_square(term, Function::Sin)
                    .is_some_and(|(other_arg, other_rest)| other_arg == arg && other_rest == rest)
            })?;
            Some((j, rest))
        });
        match pair {
            Some((j, rest)) => {
                let coefficient = terms[i].0.clone();
                terms.remove(i.max(j));
                terms.remove(i.min(j));
                terms.push((coefficient, rest));
                changed = true;
            },
            None => i += 1,
        }
    }
    (terms, changed)
}

fn collapse(mut terms: Vec<Expr>) -> Expr {
    match terms.len() {
        0 => Expr::zero(),
        1 => terms.remove(0),
        _ => Expr::new(ExprKind::Sum(terms)),
    }
}
