//! Implementation of the simplification rules.
//!
//! Each rule takes the expression to simplify and returns `Some(expr)` with the rewritten
//! expression if the rule applies, or `None` if it does not. A rewrite only applies when the
//! comparator orders the result strictly before the original, which keeps the simplifier from
//! cycling between equivalent forms.

use log::trace;
use super::{
    super::{
        compare::is_simpler,
        expr::{Expr, ExprKind},
        rewrite::{collect, contract_index, expanded, factored},
        step_collector::StepCollector,
    },
    step::Step,
};

/// Returns `candidate` if it is simpler than `expr`, reporting the step.
fn accept(
    expr: &Expr,
    candidate: Expr,
    step: Step,
    step_collector: &mut dyn StepCollector<Step>,
) -> Option<Expr> {
    if !is_simpler(&candidate, expr) {
        return None;
    }
    trace!("{:?}: `{}` -> `{}`", step, expr, candidate);
    step_collector.push(step);
    Some(candidate)
}

/// `delta(mu, nu) * p(-mu) = p(nu)`
pub fn contract_indices(expr: &Expr, step_collector: &mut dyn StepCollector<Step>) -> Option<Expr> {
    if !expr.is_indexed() {
        return None;
    }
    accept(expr, contract_index(expr), Step::ContractIndices, step_collector)
}

/// `(x + 1)^2 - x^2 - 2*x = 1`
pub fn expand(expr: &Expr, step_collector: &mut dyn StepCollector<Step>) -> Option<Expr> {
    accept(expr, expanded(expr), Step::Expand, step_collector)
}

/// `2*x*y + 4*x^2 = 2*x*(y + 2*x)`
pub fn factor(expr: &Expr, step_collector: &mut dyn StepCollector<Step>) -> Option<Expr> {
    if !expr.is_sum() {
        return None;
    }
    accept(expr, factored(expr), Step::Factor, step_collector)
}

/// `a*x + b*x + c = c + x*(a + b)`, trying every symbol of the sum in turn.
pub fn collect_terms(expr: &Expr, step_collector: &mut dyn StepCollector<Step>) -> Option<Expr> {
    let ExprKind::Sum(terms) = expr.kind() else {
        return None;
    };

    let mut symbols: Vec<&Expr> = Vec::new();
    for term in terms {
        for node in term.post_order_iter() {
            if matches!(node.kind(), ExprKind::Symbol { .. }) && !symbols.contains(&node) {
                symbols.push(node);
            }
        }
    }

    symbols.into_iter().find_map(|symbol| {
        let candidate = collect(expr, std::slice::from_ref(symbol));
        accept(expr, candidate, Step::Collect, step_collector)
    })
}

/// Applies all rules.
pub fn all(expr: &Expr, step_collector: &mut dyn StepCollector<Step>) -> Option<Expr> {
    contract_indices(expr, step_collector)
        .or_else(|| expand(expr, step_collector))
        .or_else(|| factor(expr, step_collector))
        .or_else(|| collect_terms(expr, step_collector))
}
