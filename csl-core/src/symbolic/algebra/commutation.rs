use crate::options;
use super::{
    super::expr::{Expr, ExprKind},
    prod, sum,
};

/// Returns true if every parent in the expression is commutable and it contains no pending
/// operator, so that it commutes with anything.
pub fn is_commutable(expr: &Expr) -> bool {
    expr.post_order_iter().all(|e| {
        !e.is_operator() && e.parent().map_or(true, |parent| parent.is_commutable())
    })
}

/// Returns the variable a pending derivative operator differentiates against.
fn operator_variable(expr: &Expr) -> Option<&Expr> {
    match expr.kind() {
        ExprKind::Derivative { operand: None, variable, .. } => Some(variable),
        _ => None,
    }
}

/// Returns true if `a * b == b * a` is known to hold.
pub(crate) fn commutes(a: &Expr, b: &Expr) -> bool {
    if a.is_numeric() || b.is_numeric() || !options::get().check_commutations {
        return true;
    }

    match (operator_variable(a), operator_variable(b)) {
        (Some(_), Some(_)) => return true,
        (Some(var), None) => return !b.depends_on(var),
        (None, Some(var)) => return !a.depends_on(var),
        (None, None) => {},
    }

    is_commutable(a) || is_commutable(b) || a == b
}

/// Returns the commutator `a * b - b * a`. The result is zero whenever the two expressions are
/// known to commute.
pub fn commutation(a: &Expr, b: &Expr) -> Expr {
    if commutes(a, b) {
        return Expr::zero();
    }
    sum(vec![
        prod(vec![a.clone(), b.clone()], false),
        prod(vec![Expr::minus_one(), b.clone(), a.clone()], false),
    ], false)
}

#[cfg(test)]
mod tests {
    use crate::symbolic::*;
    use pretty_assertions::assert_eq;
    use super::*;

    #[test]
    fn commutable_symbols() {
        let x = variable("x");
        let y = variable("y");
        assert!(commutation(&x, &y).is_zero());
    }

    #[test]
    fn non_commutable_symbols() {
        let a = Parent::constant("A").commutable(false).build().instance().unwrap();
        let b = Parent::constant("B").commutable(false).build().instance().unwrap();
        let commutator = commutation(&a, &b);
        assert!(!commutator.is_zero());
        assert_eq!(commutator.to_string(), "A * B + (-1) * B * A");
        assert!(commutation(&a, &a).is_zero());

        let _guard = options::scoped(|o| o.check_commutations = false);
        assert!(commutation(&a, &b).is_zero());
    }

    #[test]
    fn operators_and_independent_factors() {
        let x = variable("x");
        let y = variable("y");
        let dx = derivative_operator(x.clone(), 1);
        assert!(commutation(&dx, &y).is_zero());
        assert!(!commutation(&dx, &x).is_zero());
        assert!(commutation(&dx, &derivative_operator(y, 1)).is_zero());
    }
}
