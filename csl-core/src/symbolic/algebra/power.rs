use crate::{consts::ONE_HALF, numeric::Number};
use super::{
    super::expr::{Expr, ExprKind},
    commutation::is_commutable,
    prod,
};

/// Raises `base` to `exponent`.
///
/// Numeric powers are computed exactly when possible (see [`Number::pow`]). For symbolic
/// operands:
///
/// - `x^0 = 1`, `x^1 = x` and `1^x = 1`;
/// - `(a^b)^c = a^(b*c)`, unless `b` is an even integer and `c` is not an integer, since
///   `(x^2)^(1/2)` is not `x` for negative `x`;
/// - `(a*b)^n = a^n * b^n` for integer `n`, when all factors commute.
///
/// Powers of indexed bases are kept as they are.
pub fn pow(base: Expr, exponent: Expr) -> Expr {
    if base.is_undefined() || exponent.is_undefined() {
        return Expr::undefined();
    }

    if let (Some(b), Some(e)) = (base.as_number(), exponent.as_number()) {
        return match b.pow(e) {
            Some(n) => Expr::number(n),
            None => Expr::new(ExprKind::Pow(base, exponent)),
        };
    }

    if let Some(e) = exponent.as_number() {
        if e.is_zero() {
            return Expr::one();
        }
        if e.is_one() {
            return base;
        }
    }

    if base.is_one() {
        return base;
    }
    if base.is_indexed() {
        return Expr::new(ExprKind::Pow(base, exponent));
    }

    let integer_exponent = exponent.as_number().is_some_and(Number::is_integer);
    match base.kind() {
        ExprKind::Pow(inner_base, inner_exponent) => {
            let even_inner = inner_exponent.as_number().is_some_and(Number::is_even_integer);
            if integer_exponent || !even_inner {
                let exponent = prod(vec![inner_exponent.clone(), exponent], false);
                return pow(inner_base.clone(), exponent);
            }
        },
        ExprKind::Prod(factors) if integer_exponent && factors.iter().all(is_commutable) => {
            let factors = factors
                .iter()
                .map(|factor| pow(factor.clone(), exponent.clone()))
                .collect();
            return prod(factors, false);
        },
        _ => {},
    }

    Expr::new(ExprKind::Pow(base, exponent))
}

/// The square root.
pub fn sqrt(base: Expr) -> Expr {
    pow(base, Expr::number(ONE_HALF.clone()))
}

#[cfg(test)]
mod tests {
    use crate::symbolic::*;
    use pretty_assertions::assert_eq;
    use super::*;

    #[test]
    fn special_cases() {
        let x = variable("x");
        assert_eq!(pow(x.clone(), Expr::zero()), Expr::one());
        assert_eq!(pow(x.clone(), Expr::one()), x);
        assert_eq!(pow(Expr::one(), x.clone()), Expr::one());
        assert!(pow(Expr::zero(), Expr::zero()).is_undefined());
        assert!(pow(Expr::zero(), Expr::minus_one()).is_undefined());
        assert_eq!(pow(Expr::zero(), Expr::number(3)), Expr::zero());
    }

    #[test]
    fn nested_powers() {
        let x = variable("x");
        let squared = pow(x.clone(), Expr::number(2));
        assert_eq!(pow(squared.clone(), Expr::number(3)), pow(x.clone(), Expr::number(6)));

        // (x^2)^(1/2) is |x|, not x
        let root = sqrt(squared.clone());
        assert_eq!(root.get_type(), ExprType::Pow);
        assert_eq!(root.get_argument(0), Some(&squared));
    }

    #[test]
    fn numeric_roots() {
        assert_eq!(sqrt(Expr::number(16)), Expr::number(4));
        assert_eq!(sqrt(Expr::number(-1)), Expr::i());
        assert_eq!(sqrt(Expr::number(2)).to_string(), "2^(1/2)");
    }

    #[test]
    fn distributes_over_products() {
        let x = variable("x");
        let y = variable("y");
        let xy = prod(vec![Expr::number(2), x.clone(), y.clone()], false);
        assert_eq!(
            pow(xy.clone(), Expr::number(2)),
            prod(vec![Expr::number(4), pow(x.clone(), Expr::number(2)), pow(y.clone(), Expr::number(2))], false),
        );
        assert_eq!(pow(xy, y.clone()).get_type(), ExprType::Pow);
    }

    #[test]
    fn indexed_bases_are_opaque() {
        let minko = Space::new("Minko", 4, true);
        let a = Parent::tensor("A", vec![minko.clone()]).build();
        let mu = minko.index("mu");
        let a_mu = a.at(vec![mu]).unwrap();
        let squared = pow(a_mu.clone(), Expr::number(2));
        assert_eq!(squared.get_type(), ExprType::Pow);
        assert_eq!(squared.get_argument(0), Some(&a_mu));
    }
}
