//! Substitution of symbols, tensors, parents and indices.
//!
//! Every function here rebuilds the expression through the smart constructors, so the result is
//! canonical. Abbreviations are looked through: if the expression an abbreviation stands for
//! mentions the replaced object, the abbreviation is unwrapped, rewritten, and wrapped again
//! under a new abbreviation of the same bucket.

use crate::error::{
    kind::{FreeIndexMismatch, IndexArityMismatch, IndexSpaceMismatch, SizeMismatch, TypeMismatch},
    on,
    Error,
};
use std::{collections::HashMap, rc::Rc};
use super::{
    abbrev::rewrapped,
    dummy::{relabel, rename_dummies},
    expr::{Expr, ExprKind},
    index::{format_indices, same_free_labels, Index, Label},
    parent::{check_spaces, reindexed, symbol_instance, tensor_instance, Parent},
    rewrite::conjugated,
};

/// Rebuilds `expr` bottom-up, replacing every node for which `rule` returns a value, and
/// rewriting abbreviations through their definition. Returns [`None`] if nothing was replaced,
/// so untouched subtrees are shared with `expr`.
///
/// Each node is visited once, and the body of each abbreviation once per call.
fn substitute(
    expr: &Expr,
    rule: &dyn Fn(&Expr) -> Result<Option<Expr>, Error>,
    bodies: &mut HashMap<u64, Option<Expr>>,
) -> Result<Option<Expr>, Error> {
    if let Some(replaced) = rule(expr)? {
        return Ok(Some(replaced));
    }
    if let Some(parent) = expr.parent().filter(|parent| parent.is_abbreviation()) {
        let body = match bodies.get(&parent.id()) {
            Some(body) => body.clone(),
            None => {
                let body = match parent.encapsulated() {
                    Some(body) => substitute(&body, rule, bodies)?,
                    None => None,
                };
                bodies.insert(parent.id(), body.clone());
                body
            },
        };
        return Ok(body.map(|body| rewrapped(expr, body)));
    }

    let children = expr.children();
    let mut changed = false;
    let mut rebuilt = Vec::with_capacity(children.len());
    for child in children {
        match substitute(child, rule, bodies)? {
            Some(child) => {
                changed = true;
                rebuilt.push(child);
            },
            None => rebuilt.push(child.clone()),
        }
    }
    Ok(changed.then(|| expr.with_children(rebuilt)))
}

/// Applies [`substitute`] to `expr`, returning `expr` itself when nothing was replaced.
fn substituted(expr: &Expr, rule: &dyn Fn(&Expr) -> Result<Option<Expr>, Error>) -> Result<Expr, Error> {
    Ok(substitute(expr, rule, &mut HashMap::new())?.unwrap_or_else(|| expr.clone()))
}

/// Returns true if the indices of `occurrence` agree with the fixed indices of `pattern`.
fn matches_pattern(pattern: &[Index], occurrence: &[Index]) -> bool {
    pattern.len() == occurrence.len()
        && pattern
            .iter()
            .zip(occurrence)
            .all(|(p, o)| !p.is_fixed() || p.value() == o.value())
}

/// Re-attaches indices to an expression: every occurrence of the label of `old[k]` becomes
/// `new[k]`, or its flipped version if the occurrence has the opposite sign of `old[k]`. The
/// pairs are applied simultaneously.
pub(crate) fn reattach_indices(expr: &Expr, old: &[Index], new: &[Index]) -> Expr {
    if !expr.is_indexed() || old.is_empty() {
        return expr.clone();
    }
    match expr.kind() {
        ExprKind::Tensor { indices, .. } => {
            let indices = indices
                .iter()
                .map(|index| {
                    let target = old
                        .iter()
                        .zip(new)
                        .find(|(from, _)| !index.is_fixed() && from.same_label(index));
                    match target {
                        Some((from, to)) if from.is_lowered() == index.is_lowered() => to.clone(),
                        Some((_, to)) => to.flipped(),
                        None => index.clone(),
                    }
                })
                .collect();
            reindexed(expr, indices)
        },
        _ => expr.map_children(|child| reattach_indices(child, old, new)),
    }
}

/// Returns the labels of every index contracted somewhere inside `expr`.
fn inner_dummies(expr: &Expr) -> Vec<Label> {
    let free = expr.free_indices();
    let mut labels = expr
        .post_order_iter()
        .filter_map(|e| match e.kind() {
            ExprKind::Tensor { indices, .. } => Some(indices.clone()),
            _ => None,
        })
        .flatten()
        .filter(|index| !index.is_fixed() && !free.iter().any(|f| f.same_label(index)))
        .map(|index| index.label())
        .collect::<Vec<_>>();
    labels.dedup();
    labels
}

fn check_space(from: &Index, to: &Index) -> Result<(), IndexSpaceMismatch> {
    if from.space().name == to.space().name {
        Ok(())
    } else {
        Err(IndexSpaceMismatch {
            index: to.name().to_string(),
            expected: from.space().name.clone(),
            found: to.space().name.clone(),
        })
    }
}

/// Replaces every occurrence of `from` in `expr` by `to`.
///
/// - If `from` is a symbol, every instance of its parent is replaced. Replacing `conj(z)` by
///   `w` replaces `z` by `conj(w)`.
/// - If `from` is a tensor element, every element of its parent whose fixed indices agree with
///   those of `from` is replaced, with the indices of the occurrence attached to `to`. `to` must
///   carry the same free indices as `from`.
/// - Otherwise, every sub-expression equal to `from` is replaced.
///
/// ```
/// use csl_core::symbolic::{cos, replace, variable};
///
/// let x = variable("x");
/// let y = variable("y");
/// assert_eq!(replace(&cos(x.clone()), &x, &y).unwrap(), cos(y));
/// ```
pub fn replace(expr: &Expr, from: &Expr, to: &Expr) -> Result<Expr, Error> {
    match from.kind() {
        ExprKind::Number(_) => Err(on(from, TypeMismatch {
            expected: "a symbol, tensor element or composite expression",
            found: "a number",
        })),
        ExprKind::Symbol { parent, conjugated: conj } => {
            let to = if *conj { conjugated(to) } else { to.clone() };
            replace_parent_by(expr, parent, &to)
        },
        ExprKind::Tensor { parent, indices: pattern, conjugated: conj } => {
            let (free_from, free_to) = (from.free_indices(), to.free_indices());
            if !same_free_labels(&free_from, &free_to) {
                return Err(on(to, FreeIndexMismatch {
                    expected: format_indices(&free_from),
                    found: format_indices(&free_to),
                }));
            }
            let to = if *conj { conjugated(to) } else { to.clone() };
            let rule = |e: &Expr| -> Result<Option<Expr>, Error> {
                let ExprKind::Tensor { parent: other, indices, conjugated: conj } = e.kind() else {
                    return Ok(None);
                };
                if !other.same_as(parent) || !matches_pattern(pattern, indices) {
                    return Ok(None);
                }
                let value = reattach_indices(&rename_dummies(&to), pattern, indices);
                Ok(Some(if *conj { conjugated(&value) } else { value }))
            };
            substituted(expr, &rule)
        },
        _ => {
            let rule = |e: &Expr| Ok((e == from).then(|| to.clone()));
            substituted(expr, &rule)
        },
    }
}

/// Replaces each `from[k]` by `to[k]`, simultaneously.
///
/// Returns an error if the lists have different lengths.
pub fn replace_all(expr: &Expr, from: &[Expr], to: &[Expr]) -> Result<Expr, Error> {
    if from.len() != to.len() {
        return Err(on(expr, SizeMismatch { from: from.len(), to: to.len() }));
    }

    // go through placeholders, so a replacement is never replaced again
    let placeholders = from
        .iter()
        .enumerate()
        .map(|(k, target)| {
            let name = format!("__replace_{}", k);
            let free = target.free_indices();
            if free.is_empty() {
                symbol_instance(&Parent::constant(name).build(), false)
            } else {
                let spaces = free.iter().map(|index| Rc::clone(index.space())).collect();
                tensor_instance(&Parent::tensor(name, spaces).build(), free, false)
            }
        })
        .collect::<Vec<_>>();

    let mut result = expr.clone();
    for (target, placeholder) in from.iter().zip(&placeholders) {
        result = replace(&result, target, placeholder)?;
    }
    for (placeholder, value) in placeholders.iter().zip(to) {
        result = replace(&result, placeholder, value)?;
    }
    Ok(result)
}

/// Replaces every instance of the parent `from` by the same instance of `to`, keeping indices
/// and conjugation.
///
/// Returns an error if the parents do not take the same indices.
pub fn replace_parent(expr: &Expr, from: &Rc<Parent>, to: &Rc<Parent>) -> Result<Expr, Error> {
    if from.is_tensor() != to.is_tensor() {
        let found = if to.is_tensor() { "a tensor" } else { "a scalar parent" };
        let expected = if from.is_tensor() { "a tensor" } else { "a scalar parent" };
        return Err(on(expr, TypeMismatch { expected, found }));
    }
    if from.spaces().len() != to.spaces().len() {
        return Err(on(expr, IndexArityMismatch { expected: from.spaces().len(), given: to.spaces().len() }));
    }

    let rule = |e: &Expr| -> Result<Option<Expr>, Error> {
        match e.kind() {
            ExprKind::Symbol { parent, conjugated } if parent.same_as(from) => {
                Ok(Some(symbol_instance(to, *conjugated)))
            },
            ExprKind::Tensor { parent, indices, conjugated } if parent.same_as(from) => {
                check_spaces(to, indices).map_err(|kind| on(e, kind))?;
                Ok(Some(tensor_instance(to, indices.clone(), *conjugated)))
            },
            _ => Ok(None),
        }
    };
    substituted(expr, &rule)
}

/// Replaces every instance of the parent `from` by the expression `to`. For a tensor parent,
/// `to` must carry one free index per slot; they are replaced by the indices of each instance
/// (see [`apply_indices`]). Conjugated instances are replaced by the conjugate of `to`.
pub fn replace_parent_by(expr: &Expr, from: &Rc<Parent>, to: &Expr) -> Result<Expr, Error> {
    let rule = |e: &Expr| -> Result<Option<Expr>, Error> {
        let value = match e.kind() {
            ExprKind::Symbol { parent, .. } if parent.same_as(from) => {
                let free = to.free_indices();
                if !free.is_empty() {
                    return Err(on(to, IndexArityMismatch { expected: 0, given: free.len() }));
                }
                to.clone()
            },
            ExprKind::Tensor { parent, indices, .. } if parent.same_as(from) => {
                apply_indices(&rename_dummies(to), indices)?
            },
            _ => return Ok(None),
        };
        Ok(Some(if e.is_conjugated() { conjugated(&value) } else { value }))
    };
    substituted(expr, &rule)
}

/// Renames the index `from` to `to`. Occurrences with the opposite sign of `from` get the
/// opposite sign of `to`. Dummies of `expr` that would clash with `to` are renamed first.
pub fn replace_index(expr: &Expr, from: &Index, to: &Index) -> Result<Expr, Error> {
    replace_indices(expr, std::slice::from_ref(from), std::slice::from_ref(to))
}

/// Renames each index `from[k]` to `to[k]`, simultaneously.
///
/// Returns an error if the lists have different lengths, or if an index is replaced by an index
/// of another space.
pub fn replace_indices(expr: &Expr, from: &[Index], to: &[Index]) -> Result<Expr, Error> {
    if from.len() != to.len() {
        return Err(on(expr, SizeMismatch { from: from.len(), to: to.len() }));
    }
    for (a, b) in from.iter().zip(to) {
        check_space(a, b).map_err(|kind| on(expr, kind))?;
    }
    if from.is_empty() || !expr.is_indexed() {
        return Ok(expr.clone());
    }

    let dummies = inner_dummies(expr);
    let expr = if to.iter().any(|index| dummies.contains(&index.label())) {
        rename_dummies(expr)
    } else {
        expr.clone()
    };

    let overlapping = to.iter().any(|index| from.iter().any(|other| other.same_label(index)));
    if !overlapping {
        return Ok(reattach_indices(&expr, from, to));
    }

    // rename through fresh labels so no index is renamed twice
    let fresh = from.iter().map(Index::renamed).collect::<Vec<_>>();
    let expr = reattach_indices(&expr, from, &fresh);
    Ok(reattach_indices(&expr, &fresh, to))
}

/// Exchanges the labels of the indices `i` and `j` everywhere in `expr`. Each occurrence keeps
/// its own sign.
pub fn swapped(expr: &Expr, i: &Index, j: &Index) -> Result<Expr, Error> {
    check_space(i, j).map_err(|kind| on(expr, kind))?;
    Ok(relabel(expr, &[(i.label(), j.clone()), (j.label(), i.clone())]))
}

/// Replaces the free indices of `expr`, in the order of [`Expr::free_indices`], by `indices`.
///
/// Returns an error if the number of indices does not match.
pub fn apply_indices(expr: &Expr, indices: &[Index]) -> Result<Expr, Error> {
    let free = expr.free_indices();
    if free.len() != indices.len() {
        return Err(on(expr, IndexArityMismatch { expected: free.len(), given: indices.len() }));
    }
    replace_indices(expr, &free, indices)
}

#[cfg(test)]
mod tests {
    use crate::error::kind::{FreeIndexMismatch, IndexArityMismatch, IndexSpaceMismatch, SizeMismatch};
    use crate::symbolic::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn symbols() {
        let x = variable("x");
        let y = variable("y");
        let e = sum(vec![pow(x.clone(), Expr::number(2)), cos(x.clone())], false);
        let replaced = replace(&e, &x, &Expr::zero()).unwrap();
        assert_eq!(replaced, Expr::one());

        let replaced = replace(&e, &x, &y).unwrap();
        assert_eq!(replaced, sum(vec![pow(y.clone(), Expr::number(2)), cos(y)], false));
    }

    #[test]
    fn composite_targets() {
        let x = variable("x");
        let y = variable("y");
        let e = prod(vec![cos(x.clone()), sin(x.clone())], false);
        assert_eq!(replace(&e, &cos(x.clone()), &y).unwrap(), prod(vec![y, sin(x)], false));
    }

    #[test]
    fn simultaneous_replacement() {
        let x = variable("x");
        let y = variable("y");
        let e = prod(vec![x.clone(), pow(y.clone(), Expr::number(2))], false);
        let swapped = replace_all(&e, &[x.clone(), y.clone()], &[y.clone(), x.clone()]).unwrap();
        assert_eq!(swapped, prod(vec![y.clone(), pow(x.clone(), Expr::number(2))], false));

        let err = replace_all(&e, &[x.clone()], &[]).unwrap_err();
        assert!(err.is::<SizeMismatch>());
    }

    #[test]
    fn tensors_take_the_indices_of_each_occurrence() {
        let minko = Space::new("Minko", 4, true);
        let a = Parent::tensor("A", vec![minko.clone()]).build();
        let b = Parent::tensor("B", vec![minko.clone()]).build();
        let (mu, nu) = (minko.index("mu"), minko.index("nu"));

        // A(nu) * A(-nu) with A(mu) -> 2 * B(mu)
        let e = prod(vec![a.at(vec![nu.clone()]).unwrap(), a.at(vec![nu.flipped()]).unwrap()], false);
        let to = prod(vec![Expr::number(2), b.at(vec![mu.clone()]).unwrap()], false);
        let replaced = replace(&e, &a.at(vec![mu.clone()]).unwrap(), &to).unwrap();
        let expected = prod(vec![
            Expr::number(4),
            b.at(vec![nu.clone()]).unwrap(),
            b.at(vec![nu.flipped()]).unwrap(),
        ], false);
        assert_eq!(replaced, expected);

        let err = replace(&e, &a.at(vec![mu.clone()]).unwrap(), &b.at(vec![nu]).unwrap()).unwrap_err();
        assert!(err.is::<FreeIndexMismatch>());
    }

    #[test]
    fn fixed_patterns() {
        let color = Space::new("Color", 3, false);
        let t = Parent::tensor("T", vec![color.clone()]).build();
        let (zero, one) = (t.at(vec![color.fixed(0)]).unwrap(), t.at(vec![color.fixed(1)]).unwrap());
        let e = sum(vec![zero.clone(), one.clone()], false);
        let replaced = replace(&e, &zero, &Expr::number(5)).unwrap();
        assert_eq!(replaced, sum(vec![Expr::number(5), one], false));
    }

    #[test]
    fn parents() {
        let minko = Space::new("Minko", 4, true);
        let a = Parent::tensor("A", vec![minko.clone()]).build();
        let b = Parent::tensor("B", vec![minko.clone()]).build();
        let mu = minko.index("mu");
        let e = cos(prod(vec![a.at(vec![mu.clone()]).unwrap(), a.at(vec![mu.flipped()]).unwrap()], false));
        let expected = cos(prod(vec![b.at(vec![mu.clone()]).unwrap(), b.at(vec![mu.flipped()]).unwrap()], false));
        assert_eq!(replace_parent(&e, &a, &b).unwrap(), expected);

        let c = Parent::constant("c").build();
        assert!(replace_parent(&e, &a, &c).is_err());
    }

    #[test]
    fn parent_by_expression() {
        let minko = Space::new("Minko", 4, true);
        let a = Parent::tensor("A", vec![minko.clone()]).build();
        let p = Parent::tensor("p", vec![minko.clone()]).build();
        let q = Parent::tensor("q", vec![minko.clone()]).build();
        let (mu, nu) = (minko.index("mu"), minko.index("nu"));

        // A(mu) = p(mu) + q(mu), applied to A(nu)
        let to = sum(vec![p.at(vec![mu.clone()]).unwrap(), q.at(vec![mu.clone()]).unwrap()], false);
        let replaced = replace_parent_by(&a.at(vec![nu.flipped()]).unwrap(), &a, &to).unwrap();
        let expected = sum(vec![p.at(vec![nu.flipped()]).unwrap(), q.at(vec![nu.flipped()]).unwrap()], false);
        assert_eq!(replaced, expected);

        let scalar = constant("s");
        let err = replace_parent_by(&a.at(vec![nu]).unwrap(), &a, &scalar).unwrap_err();
        assert!(err.is::<IndexArityMismatch>());
    }

    #[test]
    fn index_renaming() {
        let minko = Space::new("Minko", 4, true);
        let color = Space::new("Color", 3, false);
        let t = Parent::tensor("T", vec![minko.clone(), minko.clone()]).build();
        let (mu, nu) = (minko.index("mu"), minko.index("nu"));

        let e = t.at(vec![mu.clone(), nu.flipped()]).unwrap();
        let renamed = replace_index(&e, &nu, &mu).unwrap();
        // T(mu, -mu) is now a trace
        assert!(renamed.free_indices().is_empty());

        let exchanged = replace_indices(&e, &[mu.clone(), nu.clone()], &[nu.clone(), mu.clone()]).unwrap();
        assert_eq!(exchanged, t.at(vec![nu.clone(), mu.flipped()]).unwrap());
        assert_eq!(swapped(&e, &mu, &nu).unwrap(), exchanged);

        let err = replace_index(&e, &mu, &color.index("a")).unwrap_err();
        assert!(err.is::<IndexSpaceMismatch>());
    }

    #[test]
    fn renaming_avoids_existing_dummies() {
        let minko = Space::new("Minko", 4, true);
        let a = Parent::tensor("A", vec![minko.clone()]).build();
        let b = Parent::tensor("B", vec![minko.clone(), minko.clone()]).build();
        let (mu, nu) = (minko.index("mu"), minko.index("nu"));

        // B(mu, nu) * A(-nu): renaming mu to nu must not create a triple nu
        let e = prod(vec![b.at(vec![mu.clone(), nu.clone()]).unwrap(), a.at(vec![nu.flipped()]).unwrap()], false);
        let renamed = replace_index(&e, &mu, &nu).unwrap();
        assert_eq!(renamed.free_indices(), vec![nu.clone()]);
        let expected = prod(vec![b.at(vec![nu.clone(), mu.clone()]).unwrap(), a.at(vec![mu.flipped()]).unwrap()], false);
        assert!(hard_comparison(&renamed, &expected));
    }

    #[test]
    fn applying_indices() {
        let minko = Space::new("Minko", 4, true);
        let t = Parent::tensor("T", vec![minko.clone(), minko.clone()]).build();
        let (mu, nu, rho, sigma) = (minko.index("mu"), minko.index("nu"), minko.index("rho"), minko.index("sigma"));
        let e = t.at(vec![mu.clone(), nu.clone()]).unwrap();
        let applied = apply_indices(&e, &[rho.clone(), sigma.clone()]).unwrap();
        assert_eq!(applied, t.at(vec![rho.clone(), sigma]).unwrap());
        assert!(apply_indices(&e, &[rho]).unwrap_err().is::<IndexArityMismatch>());
    }

    #[test]
    fn abbreviations_are_rewritten() {
        let session = Session::new();
        let x = variable("x");
        let y = variable("y");
        let body = sum(vec![cos(x.clone()), sin(x.clone())], false);
        let ab = session.make_abbreviation("E", &body, false);
        let e = prod(vec![y.clone(), ab.clone()], false);

        let replaced = replace(&e, &x, &y).unwrap();
        assert!(!replaced.depends_on(&x));

        let new = replaced.post_order_iter().find(|e| e.is_abbreviation()).cloned().unwrap();
        assert_eq!(new.to_string(), "E_0001");
        assert_eq!(inline(&new), sum(vec![cos(y.clone()), sin(y)], false));
        assert_eq!(session.abbreviations("E").len(), 2);

        // the original is untouched
        assert_eq!(inline(&ab), body);
    }

    #[test]
    fn rewritten_abbreviations_reuse_existing_definitions() {
        let session = Session::new();
        let x = variable("x");
        let y = variable("y");
        let of_x = session.make_abbreviation("E", &sum(vec![cos(x.clone()), sin(x.clone())], false), false);
        let of_y = session.make_abbreviation("E", &sum(vec![cos(y.clone()), sin(y.clone())], false), false);

        let replaced = replace(&of_x, &x, &y).unwrap();
        assert!(std::rc::Rc::ptr_eq(replaced.parent().unwrap(), of_y.parent().unwrap()));
        assert_eq!(session.abbreviations("E").len(), 2);
    }

    #[test]
    fn untouched_subtrees_are_shared() {
        let x = variable("x");
        let y = variable("y");
        let e = sum(vec![cos(x.clone()), sin(y.clone())], false);

        let same = replace(&e, &variable("w"), &x).unwrap();
        assert!(same.ptr_eq(&e));

        let sine = e.children().into_iter().find(|child| child.depends_on(&y)).cloned().unwrap();
        let replaced = replace(&e, &x, &variable("z")).unwrap();
        assert!(replaced.children().into_iter().any(|child| child.ptr_eq(&sine)));
    }
}
