//! Module to simplify expressions.
//!
//! This module provides the [`simplify`] function, which attempts to bring an expression to a
//! simpler form. It does this by repeatedly applying the rewrites of [`rules`] to the expression
//! and its children in multiple passes, until no more rules apply.
//!
//! "Simpler" is decided by the comparator alone: a rewrite is kept only if it orders strictly
//! before the expression it replaces (see [`is_simpler`](super::compare::is_simpler)). Numbers
//! are simpler than symbols, symbols than functions, powers than products and products than
//! sums, and among sums the one with fewer terms wins.

pub mod rules;
pub mod step;

use step::Step;
use super::{expr::Expr, step_collector::StepCollector};

/// Upper bound on the passes over a single node. Every accepted rewrite is strictly simpler, so
/// this only guards against pathological orderings.
const MAX_PASSES: usize = 32;

/// Base implementation of the simplification algorithm.
fn inner_simplify_with(expr: &Expr, step_collector: &mut dyn StepCollector<Step>) -> (Expr, bool) {
    let mut expr = expr.clone();
    let mut changed_at_least_once = false;

    for _ in 0..MAX_PASSES {
        let mut changed_in_this_pass = false;

        // try to simplify this expression using all rules
        if let Some(new_expr) = rules::all(&expr, step_collector) {
            expr = new_expr;
            changed_in_this_pass = true;
        }

        // then begin recursing into the expression's children
        let mut children_changed = false;
        let rebuilt = expr.map_children(|child| {
            let (child, changed) = inner_simplify_with(child, step_collector);
            children_changed |= changed;
            child
        });
        if children_changed {
            expr = rebuilt;
            changed_in_this_pass = true;
        }

        changed_at_least_once |= changed_in_this_pass;
        if !changed_in_this_pass {
            break;
        }
    }

    (expr, changed_at_least_once)
}

/// Simplifies the given expression.
///
/// ```
/// use csl_core::symbolic::{pow, prod, simplify, sum, variable, Expr};
///
/// let x = variable("x");
/// let e = sum(vec![
///     pow(sum(vec![x.clone(), Expr::one()], false), Expr::number(2)),
///     prod(vec![Expr::number(-2), x.clone()], false),
///     prod(vec![Expr::minus_one(), pow(x, Expr::number(2))], false),
/// ], false);
/// assert_eq!(simplify(&e), Expr::one());
/// ```
pub fn simplify(expr: &Expr) -> Expr {
    inner_simplify_with(expr, &mut ()).0
}

/// Simplifies the given expression, reporting every applied rewrite to `step_collector`.
pub fn simplify_with(expr: &Expr, step_collector: &mut dyn StepCollector<Step>) -> Expr {
    inner_simplify_with(expr, step_collector).0
}

/// Simplifies the given expression. The steps taken by the simplifier are also collected and
/// returned, in the order they were applied.
pub fn simplify_with_steps(expr: &Expr) -> (Expr, Vec<Step>) {
    let mut steps = Vec::new();
    let expr = inner_simplify_with(expr, &mut steps).0;
    (expr, steps)
}
