use crate::numeric::Number;
use log::warn;
use std::cmp::Ordering;
use super::{
    super::{compare::compare, expr::{Expr, ExprKind}},
    calculus::derivative,
    commutation::commutes,
    polynomial::multiply_polynomials,
    pow,
};

/// Multiplies factors together.
///
/// Unless `explicit` is set, the result is canonical: nested products are flattened, numbers
/// are folded into a single leading coefficient (zero absorbs everything, zero times infinity
/// is undefined), powers of the same base are merged, polynomials in the same variable are
/// multiplied, and each factor is placed in comparator order among the factors it commutes
/// with. A pending derivative operator is applied to the product of the factors on its right.
///
/// With `explicit` set, the factors are taken as given and only an empty or single-factor list
/// is collapsed.
pub fn prod(children: Vec<Expr>, explicit: bool) -> Expr {
    if explicit {
        return collapse(children);
    }

    let mut product = Product::default();
    for child in children {
        product.push(child);
    }
    product.finish()
}

/// A product under construction.
struct Product {
    coefficient: Number,
    factors: Vec<Expr>,
}

impl Default for Product {
    fn default() -> Self {
        Self { coefficient: Number::one(), factors: Vec::new() }
    }
}

impl Product {
    /// Multiplies the product by a factor, flattening nested products.
    fn push(&mut self, factor: Expr) {
        match factor.kind() {
            ExprKind::Number(n) => self.coefficient = self.coefficient.mul(n),
            ExprKind::Prod(inner) => {
                for factor in inner {
                    self.push(factor.clone());
                }
            },
            _ => self.insert(factor),
        }
    }

    /// Inserts a non-numeric factor, scanning from the right up to the first factor it does not
    /// commute with.
    fn insert(&mut self, factor: Expr) {
        let mut slot = self.factors.len();
        for i in (0..self.factors.len()).rev() {
            let other = &self.factors[i];
            if let Some(merged) = merge(other, &factor) {
                self.factors.remove(i);
                self.push(merged);
                return;
            }
            if !commutes(other, &factor) {
                break;
            }
            if compare(&factor, other) == Ordering::Less {
                slot = i;
            }
        }
        self.factors.insert(slot, factor);
    }

    fn finish(self) -> Expr {
        let Self { coefficient, mut factors } = self;
        if coefficient.is_undefined() {
            return Expr::undefined();
        }
        if coefficient.is_zero() {
            return Expr::zero();
        }

        // apply the rightmost operator that has an operand
        let pending = (0..factors.len().saturating_sub(1))
            .rev()
            .find(|&k| factors[k].is_operator());
        if let Some(k) = pending {
            let operand = collapse(factors.split_off(k + 1));
            let operator = factors.pop();
            if let Some(ExprKind::Derivative { variable, order, .. }) = operator.as_deref() {
                factors.push(derivative(operand, variable.clone(), *order));
            }
            factors.insert(0, Expr::number(coefficient));
            return prod(factors, false);
        }

        if !coefficient.is_one() {
            factors.insert(0, Expr::number(coefficient));
        }
        collapse(factors)
    }
}

/// Merges two factors into one, if they are powers of the same base or polynomials in the same
/// variable.
fn merge(a: &Expr, b: &Expr) -> Option<Expr> {
    if let (
        ExprKind::Polynomial { variable: va, coefficients: ca },
        ExprKind::Polynomial { variable: vb, coefficients: cb },
    ) = (a.kind(), b.kind()) {
        return (va == vb).then(|| multiply_polynomials(va, ca, cb));
    }

    // a repeated index is a contraction, not a square
    if a.is_indexed() || b.is_indexed() || a.is_operator() || b.is_operator() {
        return None;
    }

    let (base_a, exp_a) = a.split_power();
    let (base_b, exp_b) = b.split_power();
    if base_a == base_b {
        Some(pow(base_a, Expr::number(exp_a.add(&exp_b))))
    } else {
        None
    }
}

/// Collapses a list of canonical factors into a node: no factor gives `1`, one factor gives the
/// factor itself.
fn collapse(mut factors: Vec<Expr>) -> Expr {
    match factors.len() {
        0 => Expr::one(),
        1 => factors.remove(0),
        _ => Expr::new(ExprKind::Prod(factors)),
    }
}

/// Returns `coefficient * expr`, where `expr` is canonical and carries no coefficient of its
/// own.
pub(crate) fn scaled(coefficient: Number, expr: Expr) -> Expr {
    if coefficient.is_undefined() || expr.is_undefined() {
        return Expr::undefined();
    }
    if coefficient.is_one() {
        return expr;
    }
    if coefficient.is_zero() {
        return Expr::zero();
    }
    match expr.kind() {
        ExprKind::Number(n) => Expr::number(coefficient.mul(n)),
        ExprKind::Prod(factors) if !factors[0].is_numeric() => {
            let factors = std::iter::once(Expr::number(coefficient))
                .chain(factors.iter().cloned())
                .collect();
            Expr::new(ExprKind::Prod(factors))
        },
        ExprKind::Prod(_) => prod(vec![Expr::number(coefficient), expr], false),
        _ => Expr::new(ExprKind::Prod(vec![Expr::number(coefficient), expr])),
    }
}

/// Divides `a` by `b`. Dividing by zero gives infinity, or undefined for `0 / 0`.
pub fn quotient(a: Expr, b: Expr) -> Expr {
    if b.is_zero() {
        warn!("division of `{}` by zero", a);
        return if a.is_zero() { Expr::undefined() } else { Expr::infinity() };
    }
    match b.as_number() {
        Some(n) => prod(vec![a, Expr::number(n.recip())], false),
        None => prod(vec![a, pow(b, Expr::minus_one())], false),
    }
}
