//! Self-checks on expression trees.
//!
//! Expressions built through the smart constructors are canonical by construction. The
//! functions here verify that claim after the fact, and are used by the test suite on randomly
//! built expressions.

use log::debug;
use std::{cmp::Ordering, mem::size_of};
use super::{
    algebra::is_commutable,
    compare::compare,
    expr::{Expr, ExprKind, Node},
    index::Index,
    parent::check_spaces,
};

/// Checks the node itself, without recursing. Returns a description of the first broken
/// invariant.
fn check_node(expr: &Expr) -> Result<(), &'static str> {
    match expr.kind() {
        ExprKind::Sum(terms) => {
            if terms.len() < 2 {
                return Err("sum with fewer than two terms");
            }
            if terms.iter().any(Expr::is_sum) {
                return Err("nested sum");
            }
            if terms.iter().skip(1).any(Expr::is_numeric) || terms[0].is_zero() {
                return Err("numeric term out of place");
            }
            if terms.windows(2).any(|w| compare(&w[0], &w[1]) == Ordering::Greater) {
                return Err("unsorted sum");
            }
        },
        ExprKind::Prod(factors) => {
            if factors.len() < 2 {
                return Err("product with fewer than two factors");
            }
            if factors.iter().any(Expr::is_product) {
                return Err("nested product");
            }
            if factors.iter().skip(1).any(Expr::is_numeric) || factors[0].is_one() || factors[0].is_zero() {
                return Err("numeric factor out of place");
            }
            if factors.iter().all(is_commutable)
                && factors.windows(2).any(|w| compare(&w[0], &w[1]) == Ordering::Greater)
            {
                return Err("unsorted product");
            }
        },
        ExprKind::Pow(base, exponent) => {
            if exponent.is_zero() || exponent.is_one() {
                return Err("trivial exponent");
            }
            if base.is_one() {
                return Err("power of one");
            }
        },
        ExprKind::Tensor { parent, indices, .. } => {
            if indices.len() != parent.spaces().len() {
                return Err("wrong number of indices");
            }
            if check_spaces(parent, indices).is_err() {
                return Err("index in the wrong space");
            }
        },
        ExprKind::Polynomial { coefficients, .. } => {
            if coefficients.len() < 2 {
                return Err("polynomial of degree zero");
            }
            if coefficients.last().is_some_and(Expr::is_zero) {
                return Err("vanishing leading coefficient");
            }
        },
        _ => {},
    }
    Ok(())
}

/// Returns true if every node of `expr` satisfies the canonical-form invariants:
///
/// - sums and products are flat, have at least two children, and carry their numeric part as
///   their first child only (never `0` for a sum, nor `0` or `1` for a product);
/// - the terms of a sum are sorted, and so are the factors of a product that commute;
/// - powers have neither a `0` nor a `1` exponent, nor a base of `1`;
/// - tensor elements have one index per slot, each in the space of its slot;
/// - polynomials have at least two coefficients and a non-zero leading one.
pub fn check_validity(expr: &Expr) -> bool {
    expr.post_order_iter().all(|node| match check_node(node) {
        Ok(()) => true,
        Err(reason) => {
            debug!("invalid node `{}`: {}", node, reason);
            false
        },
    })
}

/// Returns an approximation of the number of bytes used by `expr`. Shared subtrees are counted
/// once per occurrence, and parents are not counted.
pub fn memory_size_of(expr: &Expr) -> usize {
    // the node and the strong and weak counts of its `Rc`
    let mut size = size_of::<Node>() + 2 * size_of::<usize>();
    size += match expr.kind() {
        ExprKind::Tensor { indices, .. } => indices.capacity() * size_of::<Index>(),
        ExprKind::Sum(children) | ExprKind::Prod(children) => children.capacity() * size_of::<Expr>(),
        ExprKind::Polynomial { coefficients, .. } => coefficients.capacity() * size_of::<Expr>(),
        _ => 0,
    };
    size + expr.children().into_iter().map(memory_size_of).sum::<usize>()
}

#[cfg(test)]
mod tests {
    use crate::symbolic::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn canonical_expressions_are_valid() {
        let x = variable("x");
        let y = variable("y");
        let minko = Space::new("Minko", 4, true);
        let t = Parent::tensor("T", vec![minko.clone(), minko.clone()]).build();
        let (mu, nu) = (minko.index("mu"), minko.index("nu"));

        let e = sum(vec![
            Expr::number(3),
            prod(vec![y.clone(), Expr::number(2), x.clone()], false),
            pow(sum(vec![x.clone(), Expr::one()], false), Expr::number(2)),
            cos(x.clone()),
            polynomial(vec![Expr::one(), y.clone()], x.clone()),
        ], false);
        assert!(check_validity(&e));
        assert!(check_validity(&t.at(vec![mu, nu]).unwrap()));
    }

    #[test_log::test]
    fn explicit_constructions_can_be_invalid() {
        let x = variable("x");
        let y = variable("y");

        let unsorted = sum(vec![y.clone(), x.clone()], true);
        assert!(!check_validity(&unsorted));

        let nested = prod(vec![x.clone(), prod(vec![x.clone(), y.clone()], true)], true);
        assert!(!check_validity(&nested));

        let misplaced = sum(vec![x.clone(), Expr::number(2)], true);
        assert!(!check_validity(&misplaced));

        // the invalid node may be deep in the tree
        assert!(!check_validity(&cos(unsorted)));
        assert_eq!(check_validity(&sum(vec![y, x], false)), true);
    }

    #[test]
    fn memory_grows_with_the_tree() {
        let x = variable("x");
        let small = cos(x.clone());
        let large = sum(vec![cos(x.clone()), sin(x.clone()), exp(x.clone())], false);
        assert!(memory_size_of(&x) > 0);
        assert!(memory_size_of(&small) > memory_size_of(&x));
        assert!(memory_size_of(&large) > 3 * memory_size_of(&x));
    }
}
