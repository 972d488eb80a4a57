use std::fmt::{self, Display, Formatter};
use super::{Expr, ExprKind};
use crate::{numeric::Number, symbolic::index::format_indices};

/// Binding strength of a node when printed, higher binds tighter.
fn precedence(expr: &Expr) -> u8 {
    match expr.kind() {
        ExprKind::Sum(_) => 1,
        ExprKind::Prod(_) => 2,
        ExprKind::Pow(..) => 3,
        ExprKind::Number(n) => match n {
            Number::Complex(re, _) if !re.is_zero() => 1,
            Number::Complex(..) => 2,
            Number::Rational(_) => 2,
            _ if n.is_negative() => 2,
            _ => 4,
        },
        _ => 4,
    }
}

/// Writes `expr`, wrapped in parentheses if it binds less tightly than `min`.
fn write_operand(f: &mut Formatter<'_>, expr: &Expr, min: u8) -> fmt::Result {
    if precedence(expr) < min {
        write!(f, "({})", expr)
    } else {
        write!(f, "{}", expr)
    }
}

/// Writes the items separated by `sep`, each wrapped as needed.
fn write_list(f: &mut Formatter<'_>, items: &[Expr], sep: &str, min: u8) -> fmt::Result {
    let mut iter = items.iter();
    if let Some(first) = iter.next() {
        write_operand(f, first, min)?;
        for item in iter {
            write!(f, "{}", sep)?;
            write_operand(f, item, min)?;
        }
    }
    Ok(())
}

impl Display for Expr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.kind() {
            ExprKind::Number(n) => write!(f, "{}", n),
            ExprKind::Symbol { parent, conjugated } => {
                if *conjugated {
                    write!(f, "conj({})", parent.name())
                } else {
                    write!(f, "{}", parent.name())
                }
            },
            ExprKind::Tensor { parent, indices, conjugated } => {
                if *conjugated {
                    write!(f, "conj({}({}))", parent.name(), format_indices(indices))
                } else {
                    write!(f, "{}({})", parent.name(), format_indices(indices))
                }
            },
            ExprKind::Function(func, arg) => write!(f, "{}({})", func, arg),
            ExprKind::Sum(terms) => write_list(f, terms, " + ", 1),
            ExprKind::Prod(factors) => write_list(f, factors, " * ", 3),
            ExprKind::Pow(base, exponent) => {
                write_operand(f, base, 4)?;
                write!(f, "^")?;
                write_operand(f, exponent, 4)
            },
            ExprKind::Polynomial { variable, coefficients } => {
                write!(f, "poly({}, [", variable)?;
                write_list(f, coefficients, ", ", 0)?;
                write!(f, "])")
            },
            ExprKind::Derivative { operand, variable, order } => {
                if *order == 1 {
                    write!(f, "d/d{}", variable)?;
                } else {
                    write!(f, "d^{}/d{}^{}", order, variable, order)?;
                }
                match operand {
                    Some(operand) => write!(f, "({})", operand),
                    None => Ok(()),
                }
            },
            ExprKind::Integral { operand, variable, bounds } => match bounds {
                Some((lower, upper)) => write!(f, "int({}, {}, {}, {})", operand, variable, lower, upper),
                None => write!(f, "int({}, {})", operand, variable),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{primitive::rational, symbolic::*};
    use pretty_assertions::assert_eq;

    #[test]
    fn infix_forms() {
        let x = variable("x");
        let y = variable("y");
        assert_eq!(sum(vec![Expr::number(5), prod(vec![Expr::number(2), x.clone()], false)], false).to_string(), "5 + 2 * x");
        assert_eq!(pow(sum(vec![x.clone(), y.clone()], false), Expr::number(2)).to_string(), "(x + y)^2");
        assert_eq!(pow(x.clone(), Expr::number(rational(1, 2).unwrap())).to_string(), "x^(1/2)");
        assert_eq!(prod(vec![Expr::number(-1), x.clone()], false).to_string(), "(-1) * x");
        assert_eq!(derivative_operator(x.clone(), 2).to_string(), "d^2/dx^2");
        assert_eq!(cos(x).to_string(), "cos(x)");
    }

    #[test]
    fn tensors() {
        let minko = Space::new("Minko", 4, true);
        let t = Parent::tensor("T", vec![minko.clone(), minko.clone()]).build();
        let e = t.at(vec![minko.index("mu"), minko.index("nu").flipped()]).unwrap();
        assert_eq!(e.to_string(), "T(mu, -nu)");
    }
}
