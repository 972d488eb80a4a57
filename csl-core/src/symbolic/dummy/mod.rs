//! Comparison of indexed expressions up to a renaming of their dummy indices.
//!
//! `A(mu) * B(-mu)` and `A(nu) * B(-nu)` are the same expression: the contracted index is a
//! bound variable, and its name does not matter. The functions in this module decide that kind
//! of equality in three steps of increasing cost:
//!
//! 1. [`compare_with_dummy`] walks both trees in lockstep and tries to build a bijection between
//!    the dummy labels of each side. Free labels must match exactly.
//! 2. If that fails, [`hard_comparison`] renames the dummies of one side, lists the tensors of
//!    both sides in contraction order, and tries every pairing of tensors that share a
//!    declaration, relabeling one side from each pairing before comparing again.
//! 3. The number of pairings is bounded by
//!    [`permutation_limit`](crate::options::Options::permutation_limit); the search gives up with
//!    a warning past it.
//!
//! [`hard_ordering`] extends this equality to an order, by comparing a representative of each
//! side that does not depend on the names of its dummies.

mod permutation;

pub use permutation::{next_permutation, MultiPermutation};

use crate::options;
use log::{trace, warn};
use std::{cmp::Ordering, collections::HashMap};
use super::{
    compare::structural_compare,
    expr::{Expr, ExprKind, ExprType},
    index::{dummy_labels, same_free_labels, Index, Label},
    parent::reindexed,
};

/// Returns true if `a` and `b` have the same shape and their indices can be matched by a
/// bijection between dummy labels. Free labels must appear on both sides.
///
/// Factors are matched in order. Use [`hard_comparison`] to also consider other pairings of the
/// tensors of a product.
pub fn compare_with_dummy(a: &Expr, b: &Expr) -> bool {
    let (free_a, free_b) = (a.free_indices(), b.free_indices());
    if !same_free_labels(&free_a, &free_b) {
        return false;
    }

    let mut map = LabelMap::default();
    for index in &free_a {
        map.bind(index.label(), index.label());
    }
    match_nodes(a, b, &mut map)
}

/// A partial bijection between the labels of two expressions.
#[derive(Debug, Clone, Default)]
struct LabelMap {
    forward: HashMap<Label, Label>,
    backward: HashMap<Label, Label>,
}

impl LabelMap {
    /// Binds `a` to `b`, returning false if either is already bound to something else.
    fn bind(&mut self, a: Label, b: Label) -> bool {
        match (self.forward.get(&a), self.backward.contains_key(&b)) {
            (Some(bound), _) => *bound == b,
            (None, true) => false,
            (None, false) => {
                self.forward.insert(a.clone(), b.clone());
                self.backward.insert(b, a);
                true
            },
        }
    }
}

fn match_indices(a: &Index, b: &Index, map: &mut LabelMap) -> bool {
    if a.space().name != b.space().name || a.is_lowered() != b.is_lowered() {
        return false;
    }
    match (a.value(), b.value()) {
        (Some(x), Some(y)) => x == y,
        (None, None) => map.bind(a.label(), b.label()),
        _ => false,
    }
}

fn match_nodes(a: &Expr, b: &Expr, map: &mut LabelMap) -> bool {
    if !a.is_indexed() || !b.is_indexed() {
        return !a.is_indexed() && !b.is_indexed() && structural_compare(a, b).is_eq();
    }
    if !same_shape(a, b) {
        return false;
    }

    match (a.kind(), b.kind()) {
        (ExprKind::Tensor { indices: ia, .. }, ExprKind::Tensor { indices: ib, .. }) => {
            ia.iter().zip(ib).all(|(x, y)| match_indices(x, y, map))
        },
        (ExprKind::Sum(ta), ExprKind::Sum(tb)) => {
            // each term is its own scope for dummies; only its free labels bind outside of it
            let mut used = vec![false; tb.len()];
            for term in ta {
                let mut found = None;
                for (j, other) in tb.iter().enumerate() {
                    if used[j] {
                        continue;
                    }
                    let mut local = map.clone();
                    if match_nodes(term, other, &mut local) {
                        found = Some((j, local));
                        break;
                    }
                }
                let Some((j, local)) = found else {
                    return false;
                };
                used[j] = true;
                for index in term.free_indices() {
                    let label = index.label();
                    if let Some(bound) = local.forward.get(&label) {
                        if !map.bind(label, bound.clone()) {
                            return false;
                        }
                    }
                }
            }
            true
        },
        _ => a.children()
            .into_iter()
            .zip(b.children())
            .all(|(x, y)| match_nodes(x, y, map)),
    }
}

/// Returns true if both nodes have the same kind, arity and node-level attributes, ignoring their
/// children and indices.
fn same_shape(a: &Expr, b: &Expr) -> bool {
    if a.get_type() != b.get_type() || a.size() != b.size() {
        return false;
    }
    match (a.kind(), b.kind()) {
        (
            ExprKind::Tensor { parent: pa, indices: ia, conjugated: ca },
            ExprKind::Tensor { parent: pb, indices: ib, conjugated: cb },
        ) => pa.same_as(pb) && ca == cb && ia.len() == ib.len(),
        (ExprKind::Function(fa, _), ExprKind::Function(fb, _)) => fa == fb,
        (
            ExprKind::Derivative { operand: oa, order: na, .. },
            ExprKind::Derivative { operand: ob, order: nb, .. },
        ) => na == nb && oa.is_some() == ob.is_some(),
        (ExprKind::Integral { bounds: ba, .. }, ExprKind::Integral { bounds: bb, .. }) => {
            ba.is_some() == bb.is_some()
        },
        (ExprKind::Number(_), _) | (ExprKind::Symbol { .. }, _) => structural_compare(a, b).is_eq(),
        _ => true,
    }
}

/// Replaces every non-fixed index whose label appears in `mapping` by the associated label,
/// keeping the sign of each occurrence. Nodes are rebuilt through the smart constructors.
pub(crate) fn relabel(expr: &Expr, mapping: &[(Label, Index)]) -> Expr {
    if !expr.is_indexed() || mapping.is_empty() {
        return expr.clone();
    }
    match expr.kind() {
        ExprKind::Tensor { indices, .. } => {
            let indices = indices
                .iter()
                .map(|index| {
                    let target = (!index.is_fixed())
                        .then(|| mapping.iter().find(|(label, _)| *label == index.label()))
                        .flatten();
                    match target {
                        Some((_, target)) => index.relabeled(target),
                        None => index.clone(),
                    }
                })
                .collect();
            reindexed(expr, indices)
        },
        _ => expr.map_children(|child| relabel(child, mapping)),
    }
}

/// Returns the first occurrence of each label contracted at this node: within a tensor, or
/// between the factors of a product. Dummies of the terms of a sum belong to the terms.
fn own_dummies(expr: &Expr) -> Vec<Index> {
    if !matches!(expr.get_type(), ExprType::Tensor | ExprType::Prod) {
        return Vec::new();
    }
    let structure = expr.get_index_structure();
    dummy_labels(&structure)
        .into_iter()
        .filter_map(|label| structure.iter().find(|index| index.label() == label).cloned())
        .collect()
}

/// Renames dummies throughout the tree, scope by scope, with `fresh` choosing the new label of
/// each one.
fn rename_with(expr: &Expr, fresh: &mut impl FnMut(&Index) -> Index) -> Expr {
    if !expr.is_indexed() {
        return expr.clone();
    }
    let mapping = own_dummies(expr)
        .into_iter()
        .map(|index| (index.label(), fresh(&index)))
        .collect::<Vec<_>>();
    let renamed = relabel(expr, &mapping);
    renamed.map_children(|child| rename_with(child, fresh))
}

/// Gives every dummy index of the expression a fresh id, so that none of its dummies can clash
/// with labels of another expression.
pub fn rename_dummies(expr: &Expr) -> Expr {
    rename_with(expr, &mut Index::renamed)
}

/// Returns the representative of the class of `expr` under renaming of its dummies: the
/// structurally smallest expression obtained by giving the dummies of each scope the labels
/// `_1, ..., _k` in some order. Dummies of nested scopes are numbered after those of the
/// enclosing scope, starting at `base`.
///
/// Expressions equal up to a renaming of dummies have the same representative. The search
/// tries every order of the dummies of a scope, up to
/// [`permutation_limit`](crate::options::Options::permutation_limit) orders.
fn canonical_form(expr: &Expr, base: u64) -> Expr {
    if !expr.is_indexed() {
        return expr.clone();
    }
    let own = own_dummies(expr);
    let next_base = base + own.len() as u64;
    if own.is_empty() {
        return expr.map_children(|child| canonical_form(child, next_base));
    }

    let limit = options::get().permutation_limit.max(1);
    let mut permutation = MultiPermutation::new([own.len()]);
    let mut best: Option<Expr> = None;
    for tried in 1.. {
        let mapping = own
            .iter()
            .zip(permutation.group(0))
            .map(|(index, &k)| (index.label(), index.canonical(base + k as u64 + 1)))
            .collect::<Vec<_>>();
        let candidate = relabel(expr, &mapping).map_children(|child| canonical_form(child, next_base));
        if best.as_ref().map_or(true, |best| structural_compare(&candidate, best).is_lt()) {
            best = Some(candidate);
        }

        if !permutation.advance() {
            break;
        }
        if tried == limit {
            warn!("ordering `{}` by its first {} dummy orders only", expr, limit);
            break;
        }
    }
    best.unwrap_or_else(|| expr.clone())
}

/// The representative of `expr` used to order it, computed with structural comparison so the
/// smart constructors do not call back into dummy ordering.
fn representative(expr: &Expr) -> Expr {
    let _structural = options::scoped(|o| o.dummy_comparison = false);
    canonical_form(expr, 0)
}

/// Collects the tensors of an expression that can be exchanged by a renaming of dummies. Sums
/// are kept whole, since the dummies of their terms are local to each term.
fn collect_items(expr: &Expr, items: &mut Vec<Expr>) {
    if !expr.is_indexed() {
        return;
    }
    match expr.kind() {
        ExprKind::Tensor { .. } | ExprKind::Sum(_) => items.push(expr.clone()),
        _ => {
            for child in expr.children() {
                collect_items(child, items);
            }
        },
    }
}

/// Items can only be paired with items of the same key.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ItemKey {
    Tensor { name: String, conjugated: bool },
    Sum,
}

fn item_key(item: &Expr) -> ItemKey {
    match item.kind() {
        ExprKind::Tensor { parent, conjugated, .. } => ItemKey::Tensor {
            name: parent.name().to_string(),
            conjugated: *conjugated,
        },
        _ => ItemKey::Sum,
    }
}

fn item_indices(item: &Expr) -> Vec<Index> {
    match item.kind() {
        ExprKind::Tensor { indices, .. } => indices.clone(),
        _ => item.free_indices(),
    }
}

/// Orders items without looking at index labels.
fn shape_key(item: &Expr) -> (ExprType, String, bool, Vec<(String, bool, Option<u32>)>) {
    let (name, conjugated) = match item_key(item) {
        ItemKey::Tensor { name, conjugated } => (name, conjugated),
        ItemKey::Sum => (String::new(), false),
    };
    let slots = item_indices(item)
        .iter()
        .map(|index| (index.space().name.clone(), index.is_lowered(), index.value()))
        .collect();
    (item.get_type(), name, conjugated, slots)
}

/// Sorts items so that each one shares a contracted label with an item placed before it, when
/// possible. Otherwise, the largest remaining item by shape comes next.
fn contraction_order(mut remaining: Vec<Expr>) -> Vec<Expr> {
    let mut placed = Vec::with_capacity(remaining.len());
    let mut labels: Vec<Label> = Vec::new();
    while !remaining.is_empty() {
        let connected = (0..remaining.len())
            .filter(|&k| {
                item_indices(&remaining[k])
                    .iter()
                    .any(|index| !index.is_fixed() && labels.contains(&index.label()))
            })
            .collect::<Vec<_>>();
        let pool = if connected.is_empty() {
            (0..remaining.len()).collect()
        } else {
            connected
        };

        // earliest on ties
        let best = pool.into_iter().max_by(|&x, &y| {
            shape_key(&remaining[x]).cmp(&shape_key(&remaining[y])).then(y.cmp(&x))
        });
        let Some(best) = best else {
            break;
        };

        let item = remaining.remove(best);
        labels.extend(item_indices(&item).iter().filter(|i| !i.is_fixed()).map(Index::label));
        placed.push(item);
    }
    placed
}

/// Groups item positions by key, in order of first appearance.
fn groups(items: &[Expr]) -> Vec<(ItemKey, Vec<usize>)> {
    let mut groups: Vec<(ItemKey, Vec<usize>)> = Vec::new();
    for (k, item) in items.iter().enumerate() {
        let key = item_key(item);
        match groups.iter_mut().find(|(other, _)| *other == key) {
            Some((_, positions)) => positions.push(k),
            None => groups.push((key, vec![k])),
        }
    }
    groups
}

/// The state of a search for a pairing between the items of two expressions.
struct Search {
    items_a: Vec<Expr>,
    items_b: Vec<Expr>,

    /// For each group, the positions of its items in `a` and in `b`.
    pairs: Vec<(Vec<usize>, Vec<usize>)>,

    /// Labels free in both expressions, which must be paired with themselves.
    free: Vec<Label>,
}

impl Search {
    /// Lists and groups the items of both sides. Returns [`None`] if the sides do not have the
    /// same number of items of each key.
    fn new(a: &Expr, b: &Expr) -> Option<Self> {
        let mut items_a = Vec::new();
        let mut items_b = Vec::new();
        collect_items(a, &mut items_a);
        collect_items(b, &mut items_b);
        if items_a.len() != items_b.len() {
            return None;
        }
        let items_a = contraction_order(items_a);
        let items_b = contraction_order(items_b);

        let mut groups_b = groups(&items_b);
        let mut pairs = Vec::new();
        for (key, positions_a) in groups(&items_a) {
            let k = groups_b.iter().position(|(other, positions)| {
                *other == key && positions.len() == positions_a.len()
            })?;
            let (_, positions_b) = groups_b.swap_remove(k);
            pairs.push((positions_a, positions_b));
        }

        let free = a.free_indices().iter().map(Index::label).collect();
        Some(Self { items_a, items_b, pairs, free })
    }

    fn sizes(&self) -> impl Iterator<Item = usize> + '_ {
        self.pairs.iter().map(|(positions, _)| positions.len())
    }

    /// Builds the relabeling of `b` described by the current permutation, and applies it.
    /// Returns [`None`] if the pairing of indices is inconsistent.
    fn mapped(&self, b: &Expr, permutation: &MultiPermutation) -> Option<Expr> {
        let mut mapping: Vec<(Label, Index)> = Vec::new();
        for (g, (positions_a, positions_b)) in self.pairs.iter().enumerate() {
            for (i, &k) in permutation.group(g).iter().enumerate() {
                let from = &self.items_b[positions_b[k]];
                let to = &self.items_a[positions_a[i]];
                if !self.pair_indices(&mut mapping, from, to) {
                    return None;
                }
            }
        }
        Some(relabel(b, &mapping))
    }

    /// Extends `mapping` with the labels of the indices of `from`, sent to the labels at the same
    /// positions in `to`.
    fn pair_indices(&self, mapping: &mut Vec<(Label, Index)>, from: &Expr, to: &Expr) -> bool {
        let (from, to) = (item_indices(from), item_indices(to));
        if from.len() != to.len() {
            return false;
        }
        for (x, y) in from.iter().zip(&to) {
            if x.is_fixed() || y.is_fixed() {
                if x.value() != y.value() {
                    return false;
                }
                continue;
            }
            if x.space().name != y.space().name {
                return false;
            }

            let label = x.label();
            if self.free.contains(&label) {
                if !x.same_label(y) {
                    return false;
                }
                continue;
            }
            match mapping.iter().find(|(other, _)| *other == label) {
                Some((_, target)) => {
                    if !target.same_label(y) {
                        return false;
                    }
                },
                None => {
                    if mapping.iter().any(|(_, target)| target.same_label(y)) {
                        return false;
                    }
                    mapping.push((label, y.clone()));
                },
            }
        }
        true
    }
}

/// Renames the dummies of `b` onto those of `a`, pairing the tensors of both sides in
/// contraction order. Returns [`None`] if the sides do not have the same tensors, or if that
/// pairing is inconsistent.
pub fn match_b_on_a(a: &Expr, b: &Expr) -> Option<Expr> {
    let b = rename_dummies(b);
    let search = Search::new(a, &b)?;
    search.mapped(&b, &MultiPermutation::new(search.sizes()))
}

/// Returns true if the expressions are equal up to a renaming of their dummy indices, trying
/// every pairing of the tensors of products if needed.
pub fn hard_comparison(a: &Expr, b: &Expr) -> bool {
    if a.ptr_eq(b) {
        return true;
    }
    if !a.is_indexed() || !b.is_indexed() {
        return !a.is_indexed() && !b.is_indexed() && structural_compare(a, b).is_eq();
    }
    if !same_shape(a, b) || !same_free_labels(&a.free_indices(), &b.free_indices()) {
        return false;
    }
    if compare_with_dummy(a, b) {
        return true;
    }

    match (a.kind(), b.kind()) {
        (ExprKind::Sum(ta), ExprKind::Sum(tb)) => {
            let mut used = vec![false; tb.len()];
            ta.iter().all(|term| {
                let found = (0..tb.len()).find(|&j| !used[j] && hard_comparison(term, &tb[j]));
                found.map(|j| used[j] = true).is_some()
            })
        },
        (ExprKind::Prod(_), ExprKind::Prod(_)) | (ExprKind::Tensor { .. }, ExprKind::Tensor { .. }) => {
            permutation_search(a, b)
        },
        _ => a.children()
            .into_iter()
            .zip(b.children())
            .all(|(x, y)| hard_comparison(x, y)),
    }
}

fn permutation_search(a: &Expr, b: &Expr) -> bool {
    let b = rename_dummies(b);
    let Some(search) = Search::new(a, &b) else {
        return false;
    };

    let limit = options::get().permutation_limit;
    let mut permutation = MultiPermutation::new(search.sizes());
    trace!("pairing the tensors of `{}` and `{}` ({} candidates)", a, b, permutation.len());
    let mut tried = 0;
    loop {
        if tried == limit {
            warn!("gave up comparing `{}` and `{}` after {} pairings", a, b, limit);
            return false;
        }
        tried += 1;

        if let Some(mapped) = search.mapped(&b, &permutation) {
            if compare_with_dummy(a, &mapped) {
                trace!("pairing {} matched", tried);
                return true;
            }
        }
        if !permutation.advance() {
            return false;
        }
    }
}

fn count_items(expr: &Expr) -> usize {
    let mut items = Vec::new();
    collect_items(expr, &mut items);
    items.len()
}

/// Orders expressions so that expressions equal up to dummy renaming compare equal: by kind,
/// then by number of tensors, then structurally after bringing each side to the representative
/// of its class, the smallest expression reachable by renaming its dummies to canonical labels.
/// Each side is reduced to its key on its own, so the order is a strict weak order. Expressions
/// without indices are their own representative.
pub fn hard_ordering(a: &Expr, b: &Expr) -> Ordering {
    if !a.is_indexed() && !b.is_indexed() {
        return structural_compare(a, b);
    }
    a.get_type()
        .cmp(&b.get_type())
        .then_with(|| count_items(a).cmp(&count_items(b)))
        .then_with(|| structural_compare(&representative(a), &representative(b)))
}

#[cfg(test)]
mod tests {
    use crate::symbolic::*;
    use pretty_assertions::assert_eq;
    use std::rc::Rc;
    use super::*;

    struct Fixture {
        minko: Rc<Space>,
        a: Rc<Parent>,
        b: Rc<Parent>,
        x: Rc<Parent>,
    }

    fn fixture() -> Fixture {
        let minko = Space::new("Minko", 4, true);
        Fixture {
            a: Parent::tensor("A", vec![minko.clone()]).build(),
            b: Parent::tensor("B", vec![minko.clone()]).build(),
            x: Parent::tensor("X", vec![minko.clone(), minko.clone()]).build(),
            minko,
        }
    }

    #[test]
    fn renamed_contraction() {
        let f = fixture();
        let (mu, nu) = (f.minko.index("mu"), f.minko.index("nu"));
        let left = prod(vec![f.a.at(vec![mu.clone()]).unwrap(), f.b.at(vec![mu.flipped()]).unwrap()], false);
        let right = prod(vec![f.a.at(vec![nu.clone()]).unwrap(), f.b.at(vec![nu.flipped()]).unwrap()], false);
        assert_ne!(structural_compare(&left, &right), Ordering::Equal);
        assert!(compare_with_dummy(&left, &right));
        assert!(hard_comparison(&left, &right));
        assert_eq!(hard_ordering(&left, &right), Ordering::Equal);
    }

    #[test]
    fn free_indices_must_match() {
        let f = fixture();
        let (mu, nu) = (f.minko.index("mu"), f.minko.index("nu"));
        let a_mu = f.a.at(vec![mu.clone()]).unwrap();
        let a_nu = f.a.at(vec![nu.clone()]).unwrap();
        assert!(!compare_with_dummy(&a_mu, &a_nu));
        assert!(!hard_comparison(&a_mu, &a_nu));

        // the free index sits in a different slot
        let rho = f.minko.index("rho");
        let left = prod(vec![
            f.x.at(vec![mu.clone(), rho.clone()]).unwrap(),
            f.a.at(vec![rho.flipped()]).unwrap(),
        ], false);
        let right = prod(vec![
            f.x.at(vec![rho.clone(), mu.clone()]).unwrap(),
            f.a.at(vec![rho.flipped()]).unwrap(),
        ], false);
        assert!(!hard_comparison(&left, &right));
    }

    #[test]
    fn exchanged_factors() {
        let f = fixture();
        let (mu, nu, rho, sigma) = (
            f.minko.index("mu"),
            f.minko.index("nu"),
            f.minko.index("rho"),
            f.minko.index("sigma"),
        );
        // A(mu) A(nu) X(-mu, -nu) against A(rho) A(sigma) X(-sigma, -rho)
        let left = prod(vec![
            f.a.at(vec![mu.clone()]).unwrap(),
            f.a.at(vec![nu.clone()]).unwrap(),
            f.x.at(vec![mu.flipped(), nu.flipped()]).unwrap(),
        ], false);
        let right = prod(vec![
            f.a.at(vec![rho.clone()]).unwrap(),
            f.a.at(vec![sigma.clone()]).unwrap(),
            f.x.at(vec![sigma.flipped(), rho.flipped()]).unwrap(),
        ], false);
        assert!(hard_comparison(&left, &right));
        assert!(hard_comparison(&right, &left));
        assert_eq!(hard_ordering(&left, &right), Ordering::Equal);
    }

    #[test]
    fn ordering_agrees_on_renamed_contractions() {
        let f = fixture();
        let (mu, nu, rho, sigma) = (
            f.minko.index("mu"),
            f.minko.index("nu"),
            f.minko.index("rho"),
            f.minko.index("sigma"),
        );
        let a = prod(vec![
            f.a.at(vec![mu.clone()]).unwrap(),
            f.a.at(vec![nu.clone()]).unwrap(),
            f.x.at(vec![mu.flipped(), nu.flipped()]).unwrap(),
        ], false);
        let b = prod(vec![
            f.a.at(vec![rho.clone()]).unwrap(),
            f.a.at(vec![sigma.clone()]).unwrap(),
            f.x.at(vec![sigma.flipped(), rho.flipped()]).unwrap(),
        ], false);
        let c = prod(vec![
            f.a.at(vec![rho.clone()]).unwrap(),
            f.a.at(vec![sigma.clone()]).unwrap(),
            f.x.at(vec![sigma.flipped(), rho.clone()]).unwrap(),
        ], false);

        let _scope = dummy_scope();
        assert_eq!(compare(&a, &b), Ordering::Equal);
        assert_eq!(compare(&a, &c), compare(&b, &c));
        assert_ne!(compare(&a, &c), Ordering::Equal);
        assert!(test_simplification_rule(&a, &b, &c));
        assert!(test_simplification_rule(&c, &a, &b));
    }

    #[test_log::test]
    fn permutation_limit_gives_up() {
        let f = fixture();
        let (mu, nu, rho, sigma) = (
            f.minko.index("mu"),
            f.minko.index("nu"),
            f.minko.index("rho"),
            f.minko.index("sigma"),
        );
        let left = prod(vec![
            f.a.at(vec![mu.clone()]).unwrap(),
            f.a.at(vec![nu.clone()]).unwrap(),
            f.x.at(vec![mu.flipped(), nu.flipped()]).unwrap(),
        ], false);
        let right = prod(vec![
            f.a.at(vec![rho.clone()]).unwrap(),
            f.a.at(vec![sigma.clone()]).unwrap(),
            f.x.at(vec![sigma.flipped(), rho.flipped()]).unwrap(),
        ], false);
        let _guard = options::scoped(|o| o.permutation_limit = 0);
        assert!(!permutation_search(&left, &right));
    }

    #[test]
    fn sums_are_local_scopes() {
        let f = fixture();
        let (mu, nu, rho) = (f.minko.index("mu"), f.minko.index("nu"), f.minko.index("rho"));
        let term = |i: &Index| prod(vec![
            f.x.at(vec![rho.clone(), i.clone()]).unwrap(),
            f.a.at(vec![i.flipped()]).unwrap(),
        ], false);
        let left = sum(vec![term(&mu), f.b.at(vec![rho.clone()]).unwrap()], false);
        let right = sum(vec![f.b.at(vec![rho.clone()]).unwrap(), term(&nu)], false);
        assert!(hard_comparison(&left, &right));
    }

    #[test]
    fn renaming_keeps_shape() {
        let f = fixture();
        let mu = f.minko.index("mu");
        let e = prod(vec![f.a.at(vec![mu.clone()]).unwrap(), f.b.at(vec![mu.flipped()]).unwrap()], false);
        let renamed = rename_dummies(&e);
        assert_ne!(structural_compare(&e, &renamed), Ordering::Equal);
        assert!(compare_with_dummy(&e, &renamed));
        assert!(renamed.free_indices().is_empty());

        let matched = match_b_on_a(&e, &renamed).unwrap();
        assert_eq!(structural_compare(&e, &matched), Ordering::Equal);
    }

    #[test]
    fn non_indexed_fall_back_to_structure() {
        let x = variable("x");
        assert!(hard_comparison(&x, &x.clone()));
        assert!(!hard_comparison(&x, &variable("y")));
        assert_eq!(hard_ordering(&x, &variable("y")), Ordering::Less);
    }
}
