use super::super::{
    algebra::{function, pow},
    expr::{Expr, ExprKind},
    parent::{symbol_instance, tensor_instance},
};

/// Returns the complex conjugate of `expr`.
///
/// Conjugation is pushed down to the leaves: numbers are conjugated, real symbols are left
/// alone, imaginary symbols change sign and complex symbols toggle their conjugation flag. The
/// order of factors is kept.
pub fn conjugated(expr: &Expr) -> Expr {
    match expr.kind() {
        ExprKind::Number(n) => Expr::number(n.conj()),
        ExprKind::Symbol { parent, conjugated } => symbol_instance(parent, !conjugated),
        ExprKind::Tensor { parent, indices, conjugated } => {
            tensor_instance(parent, indices.clone(), !conjugated)
        },
        ExprKind::Function(f, arg) => function(*f, conjugated(arg)),
        ExprKind::Pow(base, exponent) => pow(conjugated(base), conjugated(exponent)),
        _ => expr.map_children(conjugated),
    }
}

#[cfg(test)]
mod tests {
    use crate::symbolic::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn leaves() {
        let x = variable("x");
        let z = Parent::variable("z").complex(ComplexProperty::Complex).build().instance().unwrap();
        let w = Parent::constant("w").complex(ComplexProperty::Imaginary).build().instance().unwrap();

        assert_eq!(conjugated(&x), x);
        assert!(conjugated(&z).is_conjugated());
        assert_eq!(conjugated(&conjugated(&z)), z);
        assert_eq!(conjugated(&w), -w.clone());
        assert_eq!(conjugated(&Expr::i()), -Expr::i());
    }

    #[test]
    fn composites() {
        let x = variable("x");
        let z = Parent::variable("z").complex(ComplexProperty::Complex).build().instance().unwrap();
        let e = sum(vec![
            prod(vec![Expr::i(), x.clone()], false),
            exp(z.clone()),
        ], false);
        let expected = sum(vec![
            prod(vec![-Expr::i(), x], false),
            exp(conjugated(&z)),
        ], false);
        assert_eq!(conjugated(&e), expected);
        assert_eq!(conjugated(&conjugated(&e)), e);
    }
}
