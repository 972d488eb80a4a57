//! The total order over expressions.
//!
//! [`compare`] is the single source of truth for ordering the children of sums and products,
//! picking the slot of a new factor, and deciding whether a rewritten expression is simpler than
//! the original. Nodes are first ordered by kind:
//!
//! `Number < Symbol < Tensor < Function < Pow < Prod < Sum < Polynomial < Derivative < Integral`
//!
//! then by kind-specific rules: numbers by value, symbols by name, tensors by name and indices,
//! and composite nodes by arity, then child by child.
//!
//! Inside a [`dummy_scope`], indexed expressions that are equal up to a renaming of their dummy
//! indices compare equal (see [`hard_ordering`](super::dummy::hard_ordering)).

use crate::options::{self, OptionsGuard};
use std::cmp::Ordering;
use super::{
    dummy::hard_ordering,
    expr::{Expr, ExprKind},
};

/// Compares two expressions.
pub fn compare(a: &Expr, b: &Expr) -> Ordering {
    if a.ptr_eq(b) {
        return Ordering::Equal;
    }
    if options::get().dummy_comparison && (a.is_indexed() || b.is_indexed()) {
        return hard_ordering(a, b);
    }
    structural_compare(a, b)
}

/// Compares two expressions structurally: dummy indices are compared by name like any other
/// index.
pub fn structural_compare(a: &Expr, b: &Expr) -> Ordering {
    if a.ptr_eq(b) {
        return Ordering::Equal;
    }

    a.get_type().cmp(&b.get_type()).then_with(|| match (a.kind(), b.kind()) {
        (ExprKind::Number(a), ExprKind::Number(b)) => a.total_cmp(b),
        (
            ExprKind::Symbol { parent: pa, conjugated: ca },
            ExprKind::Symbol { parent: pb, conjugated: cb },
        ) => pa.cmp_declaration(pb).then(ca.cmp(cb)),
        (
            ExprKind::Tensor { parent: pa, indices: ia, conjugated: ca },
            ExprKind::Tensor { parent: pb, indices: ib, conjugated: cb },
        ) => pa.cmp_declaration(pb)
            .then(ca.cmp(cb))
            .then(ia.len().cmp(&ib.len()))
            .then_with(|| ia.cmp(ib)),
        (ExprKind::Function(fa, xa), ExprKind::Function(fb, xb)) => {
            fa.cmp(fb).then_with(|| structural_compare(xa, xb))
        },
        (ExprKind::Sum(xa), ExprKind::Sum(xb)) | (ExprKind::Prod(xa), ExprKind::Prod(xb)) => {
            compare_lists(xa, xb)
        },
        (ExprKind::Pow(ba, ea), ExprKind::Pow(bb, eb)) => {
            structural_compare(ba, bb).then_with(|| structural_compare(ea, eb))
        },
        (
            ExprKind::Polynomial { variable: va, coefficients: ca },
            ExprKind::Polynomial { variable: vb, coefficients: cb },
        ) => structural_compare(va, vb).then_with(|| compare_lists(ca, cb)),
        (
            ExprKind::Derivative { operand: oa, variable: va, order: na },
            ExprKind::Derivative { operand: ob, variable: vb, order: nb },
        ) => structural_compare(va, vb)
            .then(na.cmp(nb))
            .then_with(|| match (oa, ob) {
                (Some(oa), Some(ob)) => structural_compare(oa, ob),
                (oa, ob) => oa.is_some().cmp(&ob.is_some()),
            }),
        (
            ExprKind::Integral { operand: oa, variable: va, bounds: ba },
            ExprKind::Integral { operand: ob, variable: vb, bounds: bb },
        ) => structural_compare(va, vb)
            .then_with(|| structural_compare(oa, ob))
            .then_with(|| match (ba, bb) {
                (Some((la, ua)), Some((lb, ub))) => {
                    structural_compare(la, lb).then_with(|| structural_compare(ua, ub))
                },
                (ba, bb) => ba.is_some().cmp(&bb.is_some()),
            }),
        _ => Ordering::Equal,
    })
}

/// Compares lists by length, then element by element.
fn compare_lists(a: &[Expr], b: &[Expr]) -> Ordering {
    a.len().cmp(&b.len()).then_with(|| {
        a.iter()
            .zip(b)
            .map(|(a, b)| structural_compare(a, b))
            .find(|ord| ord.is_ne())
            .unwrap_or(Ordering::Equal)
    })
}

/// Enters dummy-insensitive comparison until the returned guard is dropped. Nesting scopes is
/// allowed; each guard restores the mode that was active when it was created.
#[must_use = "the comparison mode is restored as soon as the guard is dropped"]
pub fn dummy_scope() -> OptionsGuard {
    options::scoped(|o| o.dummy_comparison = true)
}

/// Returns true if [`compare`] behaves as a strict weak order on the given triple: every
/// expression is equal to itself, swapping the arguments reverses the result, and both the
/// order and the equality are transitive.
pub fn test_simplification_rule(a: &Expr, b: &Expr, c: &Expr) -> bool {
    let items = [a, b, c];
    for x in items {
        if compare(x, x) != Ordering::Equal {
            return false;
        }
        for y in items {
            let xy = compare(x, y);
            if xy != compare(y, x).reverse() {
                return false;
            }
            for z in items {
                let yz = compare(y, z);
                let xz = compare(x, z);
                if xy == yz && xy != xz {
                    return false;
                }
            }
        }
    }
    true
}

/// Returns true if `candidate` is strictly simpler than `original`.
pub fn is_simpler(candidate: &Expr, original: &Expr) -> bool {
    compare(candidate, original) == Ordering::Less
}

/// Applies `rewrite` to `expr` and keeps the result only if it is simpler.
pub fn tried(expr: &Expr, rewrite: impl FnOnce(&Expr) -> Expr) -> Expr {
    let candidate = rewrite(expr);
    if is_simpler(&candidate, expr) {
        candidate
    } else {
        expr.clone()
    }
}

impl PartialEq for Expr {
    fn eq(&self, other: &Self) -> bool {
        compare(self, other) == Ordering::Equal
    }
}

impl Eq for Expr {}

impl PartialOrd for Expr {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Expr {
    fn cmp(&self, other: &Self) -> Ordering {
        compare(self, other)
    }
}
