use super::super::{
    algebra::prod,
    expr::{Expr, ExprKind},
    index::Index,
    replace::reattach_indices,
};

/// If `expr` is a Kronecker delta, returns its two indices.
fn delta_indices(expr: &Expr) -> Option<(&Index, &Index)> {
    match expr.kind() {
        ExprKind::Tensor { parent, indices, .. } if parent.is_delta() && indices.len() == 2 => {
            Some((&indices[0], &indices[1]))
        },
        _ => None,
    }
}

/// Evaluates a delta whose indices are both fixed.
fn fixed_delta(expr: &Expr) -> Option<Expr> {
    let (a, b) = delta_indices(expr)?;
    let (a, b) = (a.value()?, b.value()?);
    Some(if a == b { Expr::one() } else { Expr::zero() })
}

/// Contracts one delta of the product with another factor. Returns [`None`] if no delta is
/// contracted with anything.
fn contract_once(factors: &[Expr]) -> Option<Expr> {
    for (k, factor) in factors.iter().enumerate() {
        let Some((a, b)) = delta_indices(factor) else {
            continue;
        };

        // delta(a, b) * T(-a) = T(b), and the same with a and b exchanged
        for (from, to) in [(a, b), (b, a)] {
            if from.is_fixed() {
                continue;
            }
            let target = factors.iter().enumerate().position(|(l, other)| {
                l != k && other.free_indices().iter().any(|index| index.same_label(from))
            });
            if let Some(l) = target {
                let mut rest = factors.to_vec();
                rest[l] = reattach_indices(&factors[l], &[from.flipped()], &[to.clone()]);
                rest.remove(k);
                return Some(prod(rest, false));
            }
        }
    }
    None
}

/// Contracts the Kronecker deltas of `expr` with the other factors of their products, and
/// evaluates deltas whose indices are all fixed.
///
/// ```
/// use csl_core::symbolic::{contract_index, prod, Parent, Space};
///
/// let minko = Space::new("Minko", 4, true);
/// let delta = Parent::delta(&minko);
/// let p = Parent::tensor("p", vec![minko.clone()]).build();
/// let (mu, nu) = (minko.index("mu"), minko.index("nu"));
///
/// let e = prod(vec![delta.at(vec![mu.clone(), nu.clone()]).unwrap(), p.at(vec![mu.flipped()]).unwrap()], false);
/// assert_eq!(contract_index(&e), p.at(vec![nu]).unwrap());
/// ```
pub fn contract_index(expr: &Expr) -> Expr {
    if !expr.is_indexed() {
        return expr.clone();
    }
    if let Some(value) = fixed_delta(expr) {
        return value;
    }

    let mut expr = expr.map_children(contract_index);
    while let ExprKind::Prod(factors) = expr.kind() {
        match contract_once(factors) {
            Some(contracted) => expr = contracted,
            None => break,
        }
    }
    expr
}

#[cfg(test)]
mod tests {
    use crate::symbolic::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn contraction_renames_the_other_factor() {
        let minko = Space::new("Minko", 4, true);
        let delta = Parent::delta(&minko);
        let t = Parent::tensor("T", vec![minko.clone(), minko.clone()]).build();
        let (mu, nu, rho) = (minko.index("mu"), minko.index("nu"), minko.index("rho"));

        // delta(mu, -nu) * T(nu, rho) = T(mu, rho)
        let e = prod(vec![
            delta.at(vec![mu.clone(), nu.flipped()]).unwrap(),
            t.at(vec![nu.clone(), rho.clone()]).unwrap(),
        ], false);
        assert_eq!(contract_index(&e), t.at(vec![mu.clone(), rho.clone()]).unwrap());
    }

    #[test]
    fn chains_and_traces() {
        let minko = Space::new("Minko", 4, true);
        let delta = Parent::delta(&minko);
        let (mu, nu) = (minko.index("mu"), minko.index("nu"));

        // delta(mu, nu) * delta(-nu, -mu) = delta(mu, -mu) = 4
        let e = prod(vec![
            delta.at(vec![mu.clone(), nu.clone()]).unwrap(),
            delta.at(vec![nu.flipped(), mu.flipped()]).unwrap(),
        ], false);
        assert_eq!(contract_index(&e), Expr::number(4));
    }

    #[test]
    fn fixed_deltas() {
        let color = Space::new("Color", 3, false);
        let delta = Parent::delta(&color);
        let x = variable("x");
        let e = sum(vec![
            delta.at(vec![color.fixed(1), color.fixed(1)]).unwrap(),
            prod(vec![x.clone(), delta.at(vec![color.fixed(0), color.fixed(2)]).unwrap()], false),
        ], false);
        assert_eq!(contract_index(&e), Expr::one());
    }

    #[test]
    fn free_deltas_stay() {
        let minko = Space::new("Minko", 4, true);
        let delta = Parent::delta(&minko);
        let (mu, nu) = (minko.index("mu"), minko.index("nu"));
        let e = delta.at(vec![mu, nu]).unwrap();
        assert_eq!(contract_index(&e), e);
    }
}
