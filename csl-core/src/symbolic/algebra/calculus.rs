use super::super::expr::{Expr, ExprKind};

/// The derivative of `operand` of the given order with respect to `variable`, as an inert node.
/// Use [`derive`](crate::symbolic::derive) to compute it.
///
/// The derivative of an expression that does not depend on `variable` is zero, and nested
/// derivatives with respect to the same variable are merged into one of higher order.
pub fn derivative(operand: Expr, variable: Expr, order: u32) -> Expr {
    if order == 0 {
        return operand;
    }
    if operand.is_undefined() {
        return operand;
    }
    if !operand.depends_on(&variable) {
        return Expr::zero();
    }

    if let ExprKind::Derivative { operand: Some(inner), variable: v, order: n } = operand.kind() {
        if *v == variable {
            return derivative(inner.clone(), variable, n + order);
        }
    }

    Expr::new(ExprKind::Derivative { operand: Some(operand), variable, order })
}

/// A pending derivative operator. In a product, it acts on the factors to its right.
pub fn derivative_operator(variable: Expr, order: u32) -> Expr {
    if order == 0 {
        return Expr::one();
    }
    Expr::new(ExprKind::Derivative { operand: None, variable, order })
}

/// The integral of `operand` over `variable`, between `bounds` if given.
pub fn integral(operand: Expr, variable: Expr, bounds: Option<(Expr, Expr)>) -> Expr {
    if operand.is_zero() {
        return Expr::zero();
    }
    if bounds.as_ref().is_some_and(|(lower, upper)| lower == upper) {
        return Expr::zero();
    }
    Expr::new(ExprKind::Integral { operand, variable, bounds })
}

#[cfg(test)]
mod tests {
    use crate::symbolic::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn independent_operand() {
        let x = variable("x");
        let y = variable("y");
        assert_eq!(derivative(y.clone(), x.clone(), 1), Expr::zero());
        assert_eq!(derivative(y.clone(), x.clone(), 0), y);
    }

    #[test]
    fn nested_orders_merge() {
        let x = variable("x");
        let f = cos(x.clone());
        let twice = derivative(derivative(f.clone(), x.clone(), 1), x.clone(), 1);
        assert_eq!(twice, derivative(f, x, 2));
    }

    #[test]
    fn empty_integrals() {
        let x = variable("x");
        let a = constant("a");
        assert_eq!(integral(Expr::zero(), x.clone(), None), Expr::zero());
        assert_eq!(integral(x.clone(), x.clone(), Some((a.clone(), a))), Expr::zero());
        assert_eq!(integral(x.clone(), x.clone(), None).to_string(), "int(x, x)");
    }
}
