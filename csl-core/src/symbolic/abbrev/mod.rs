//! The abbreviation cache.
//!
//! An abbreviation is a parent that stands for a whole sub-expression. Large expressions are
//! made readable, and cheaper to manipulate, by replacing repeated or uninteresting pieces with
//! instances of abbreviations. The wrapped expression is kept on the parent and substituted back
//! on demand (see [`inline`] and [`EvalMode::ABBREVIATION`](super::EvalMode::ABBREVIATION)).
//!
//! Abbreviations are created through a [`Session`], which owns the registry. The registry groups
//! abbreviations into buckets by base name, and guarantees that each bucket holds at most one
//! abbreviation per distinct sub-expression (up to a renaming of dummy indices), as long as
//! [`avoid_duplicates`](crate::options::Options::avoid_duplicates) is set.
//!
//! ```
//! use csl_core::symbolic::{cos, sum, variable, Session};
//! use std::rc::Rc;
//!
//! let session = Session::new();
//! let x = variable("x");
//! let e = sum(vec![x.clone(), cos(x.clone())], false);
//!
//! let first = session.make_abbreviation("Ab", &e, false);
//! let second = session.make_abbreviation("Ab", &e, false);
//! assert_eq!(first.to_string(), "Ab");
//! assert!(Rc::ptr_eq(first.parent().unwrap(), second.parent().unwrap()));
//! ```
//!
//! The registry only holds weak references: an abbreviation lives as long as some expression
//! refers to it, and removes itself from its bucket when the last instance is dropped.

mod lock;

pub use lock::{lock, unlock};

pub use super::index::free_structure as get_free_structure;

use crate::{
    error::{kind::AbbreviationNotFound, on_text, Error},
    options,
};
use levenshtein::levenshtein;
use log::debug;
use std::{
    cell::{Cell, RefCell},
    cmp::Ordering,
    collections::{HashMap, HashSet},
    rc::{Rc, Weak},
};
use super::{
    algebra::{is_commutable, prod, sum},
    compare::compare,
    dummy::{hard_comparison, rename_dummies},
    expr::{Expr, ExprKind, ExprType},
    index::Index,
    parent::{symbol_instance, tensor_instance, ComplexProperty, Parent, ParentKind},
    replace::reattach_indices,
    rewrite::conjugated,
};

/// The name of the default bucket. Sums and products abbreviated in it are split by category
/// first.
pub const DEFAULT_NAME: &str = "Ab";

/// The abbreviation data attached to a [`Parent`].
#[derive(Debug)]
pub struct Abbreviation {
    base_name: String,
    encapsulated: RefCell<Expr>,
    free: Vec<Index>,
    evaluation: Cell<bool>,
    registry: Weak<RefCell<Registry>>,
}

impl Abbreviation {
    /// The name of the bucket the abbreviation belongs to.
    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    /// The free indices of the wrapped expression, in the order instances carry them.
    pub fn free(&self) -> &[Index] {
        &self.free
    }

    /// Removes dead entries from the bucket of this abbreviation. Called when the parent is
    /// dropped. If the registry is busy, dead entries are left for the next lookup to skip.
    pub(crate) fn unregister(&self) {
        if let Some(registry) = self.registry.upgrade() {
            if let Ok(mut registry) = registry.try_borrow_mut() {
                registry.purge(&self.base_name);
            }
        }
    }
}

impl Parent {
    /// Returns true if the parent is an abbreviation.
    pub fn is_abbreviation(&self) -> bool {
        self.abbreviation.is_some()
    }

    /// If the parent is an abbreviation, returns the expression it stands for.
    pub fn encapsulated(&self) -> Option<Expr> {
        self.abbreviation.as_ref().map(|a| a.encapsulated.borrow().clone())
    }

    /// Replaces the expression an abbreviation stands for. Does nothing on other parents.
    pub fn set_encapsulated(&self, expr: Expr) {
        if let Some(abbreviation) = &self.abbreviation {
            *abbreviation.encapsulated.borrow_mut() = expr;
            if let Some(registry) = abbreviation.registry.upgrade() {
                if let Ok(mut registry) = registry.try_borrow_mut() {
                    registry.sort(&abbreviation.base_name);
                }
            }
        }
    }

    /// Returns true if evaluation inlines instances of this abbreviation.
    pub fn is_evaluated(&self) -> bool {
        self.abbreviation.as_ref().is_some_and(|a| a.evaluation.get())
    }

    pub fn enable_evaluation(&self) {
        if let Some(abbreviation) = &self.abbreviation {
            abbreviation.evaluation.set(true);
        }
    }

    pub fn disable_evaluation(&self) {
        if let Some(abbreviation) = &self.abbreviation {
            abbreviation.evaluation.set(false);
        }
    }

    pub fn toggle_evaluation(&self) {
        if let Some(abbreviation) = &self.abbreviation {
            abbreviation.evaluation.set(!abbreviation.evaluation.get());
        }
    }
}

/// The abbreviations of one base name.
#[derive(Debug, Default)]
struct Bucket {
    /// Sorted by comparator order of the wrapped expressions.
    entries: Vec<Weak<Parent>>,
}

impl Bucket {
    fn alive(&self) -> impl Iterator<Item = Rc<Parent>> + '_ {
        self.entries.iter().filter_map(Weak::upgrade)
    }
}

#[derive(Debug, Default)]
pub(crate) struct Registry {
    buckets: HashMap<String, Bucket>,

    /// The number of abbreviations ever created under each base name, used to generate names.
    /// Outlives the buckets, so that a name is never handed out twice.
    created: HashMap<String, usize>,
}

impl Registry {
    /// Drops dead entries of a bucket, and the bucket itself once it is empty.
    fn purge(&mut self, name: &str) {
        if let Some(bucket) = self.buckets.get_mut(name) {
            bucket.entries.retain(|entry| entry.strong_count() > 0);
            if bucket.entries.is_empty() {
                self.buckets.remove(name);
            }
        }
    }

    /// Looks up the abbreviation of the bucket `name` that stands for `expr`.
    fn find_expr(&self, name: &str, expr: &Expr) -> Option<Rc<Parent>> {
        let bucket = self.buckets.get(name)?;
        let alive = bucket.alive().collect::<Vec<_>>();

        if !expr.is_indexed() && options::get().use_dichotomy {
            let k = alive
                .binary_search_by(|parent| match parent.encapsulated() {
                    Some(other) => compare(&other, expr),
                    None => Ordering::Less,
                })
                .ok()?;
            return Some(Rc::clone(&alive[k]));
        }

        alive.into_iter().find(|parent| {
            parent.encapsulated().is_some_and(|other| hard_comparison(&other, expr))
        })
    }

    fn sort(&mut self, name: &str) {
        self.purge(name);
        if let Some(bucket) = self.buckets.get_mut(name) {
            bucket.entries.sort_by(|a, b| match (a.upgrade(), b.upgrade()) {
                (Some(a), Some(b)) => compare_encapsulated(&a, &b),
                _ => Ordering::Equal,
            });
        }
    }
}

fn compare_encapsulated(a: &Parent, b: &Parent) -> Ordering {
    match (a.encapsulated(), b.encapsulated()) {
        (Some(a), Some(b)) => compare(&a, &b),
        _ => Ordering::Equal,
    }
}

/// Owns the abbreviation registry and the table of active locks.
///
/// Dropping the session drops the registries. Abbreviations that are still referenced by
/// expressions stay valid, but can no longer be found by name.
#[derive(Debug, Default)]
pub struct Session {
    registry: Rc<RefCell<Registry>>,
    locks: RefCell<HashMap<u32, String>>,
}

impl Session {
    /// Creates a session with empty registries.
    pub fn new() -> Self {
        Self::default()
    }

    /// Abbreviates `expr` in the bucket `name`, and returns an instance of the abbreviation.
    ///
    /// Leaves are returned unchanged. If an abbreviation of an equal expression (up to a renaming
    /// of dummy indices) already exists in the bucket, an instance of it is returned instead of a
    /// new abbreviation. In the default bucket, sums and products are first split by category
    /// when `split` is set, and each category is abbreviated on its own.
    pub fn make_abbreviation(&self, name: &str, expr: &Expr, split: bool) -> Expr {
        if expr.size() == 0 {
            return expr.clone();
        }
        if split && name == DEFAULT_NAME {
            if let Some(split) = self.split_by_category(name, expr) {
                return split;
            }
        }

        if options::get().avoid_duplicates {
            if let Some(existing) = self.find_expr_opt(name, expr) {
                return instance_of(&existing);
            }
        }
        self.create(name, expr)
    }

    /// Abbreviates each category of the terms of a sum, or the factors of a commuting product,
    /// then abbreviates the combination. Returns [`None`] if the expression cannot be split.
    fn split_by_category(&self, name: &str, expr: &Expr) -> Option<Expr> {
        let (children, rebuild): (_, fn(Vec<Expr>, bool) -> Expr) = match expr.kind() {
            ExprKind::Sum(terms) => (terms, sum),
            ExprKind::Prod(factors) if factors.iter().all(is_commutable) => (factors, prod),
            _ => return None,
        };

        let mut categories: Vec<(Category, Vec<Expr>)> = Vec::new();
        for child in children {
            let category = Category::of(child);
            match categories.iter_mut().find(|(other, _)| *other == category) {
                Some((_, members)) => members.push(child.clone()),
                None => categories.push((category, vec![child.clone()])),
            }
        }
        if categories.len() < 2 {
            return None;
        }

        let pieces = categories
            .into_iter()
            .map(|(_, members)| match members.len() {
                1 => members.into_iter().next().unwrap_or_else(Expr::zero),
                _ => self.make_abbreviation(name, &rebuild(members, false), false),
            })
            .collect();
        Some(self.make_abbreviation(name, &rebuild(pieces, false), false))
    }

    fn create(&self, name: &str, expr: &Expr) -> Expr {
        create_in(&self.registry, name, expr)
    }

    /// Looks up an abbreviation by its generated name.
    pub fn find(&self, name: &str) -> Result<Rc<Parent>, Error> {
        self.find_opt(name).ok_or_else(|| {
            let registry = self.registry.borrow();
            let mut suggestions = registry
                .buckets
                .values()
                .flat_map(Bucket::alive)
                .map(|parent| parent.name().to_string())
                .filter(|other| levenshtein(other, name) < 2)
                .collect::<Vec<_>>();
            suggestions.sort();
            on_text(name, AbbreviationNotFound { name: name.to_string(), suggestions })
        })
    }

    /// Looks up an abbreviation by its generated name, returning [`None`] if there is none.
    pub fn find_opt(&self, name: &str) -> Option<Rc<Parent>> {
        let registry = self.registry.borrow();
        let found = registry
            .buckets
            .values()
            .flat_map(Bucket::alive)
            .find(|parent| parent.name() == name);
        found
    }

    /// Looks up the abbreviation of the bucket `name` that stands for `expr`, up to a renaming
    /// of dummy indices.
    pub fn find_expr_opt(&self, name: &str, expr: &Expr) -> Option<Rc<Parent>> {
        self.registry.borrow().find_expr(name, expr)
    }

    /// Enables evaluation of every abbreviation of the bucket `name`.
    pub fn enable_evaluation(&self, name: &str) {
        self.abbreviations(name).iter().for_each(|parent| parent.enable_evaluation());
    }

    /// Disables evaluation of every abbreviation of the bucket `name`.
    pub fn disable_evaluation(&self, name: &str) {
        self.abbreviations(name).iter().for_each(|parent| parent.disable_evaluation());
    }

    /// Toggles evaluation of every abbreviation of the bucket `name`.
    pub fn toggle_evaluation(&self, name: &str) {
        self.abbreviations(name).iter().for_each(|parent| parent.toggle_evaluation());
    }

    /// Forgets every abbreviation of the bucket `name`. Existing instances stay valid.
    pub fn remove_abbreviations(&self, name: &str) {
        if self.registry.borrow_mut().buckets.remove(name).is_some() {
            debug!("removed abbreviation bucket `{}`", name);
        }
    }

    /// Returns the live abbreviations of the bucket `name`, in comparator order.
    pub fn abbreviations(&self, name: &str) -> Vec<Rc<Parent>> {
        let registry = self.registry.borrow();
        registry
            .buckets
            .get(name)
            .map(|bucket| bucket.alive().collect())
            .unwrap_or_default()
    }

    /// Returns the names of the buckets that hold live abbreviations.
    pub fn bucket_names(&self) -> Vec<String> {
        let registry = self.registry.borrow();
        let mut names = registry
            .buckets
            .iter()
            .filter(|(_, bucket)| bucket.alive().next().is_some())
            .map(|(name, _)| name.clone())
            .collect::<Vec<_>>();
        names.sort();
        names
    }

    /// Records the bucket of a lock.
    fn register_lock(&self, id: u32) -> String {
        let name = format!("Lock_{}", id);
        self.locks.borrow_mut().insert(id, name.clone());
        name
    }

    /// Removes a lock from the table, returning its bucket.
    fn take_lock(&self, id: u32) -> Option<String> {
        self.locks.borrow_mut().remove(&id)
    }
}

/// Creates a new abbreviation of `expr` in the bucket `name`.
fn create_in(shared: &Rc<RefCell<Registry>>, name: &str, expr: &Expr) -> Expr {
    let mut registry = shared.borrow_mut();
    let created = registry.created.entry(name.to_string()).or_default();
    let final_name = match *created {
        0 => name.to_string(),
        n => format!("{}_{:04}", name, n),
    };
    *created += 1;

    let free = expr.free_indices();
    let builder = if !free.is_empty() {
        Parent::tensor(final_name, free.iter().map(|index| Rc::clone(index.space())).collect())
    } else if depends_on_variable(expr) {
        Parent::variable(final_name)
    } else {
        Parent::constant(final_name)
    };
    let parent = builder
        .complex(complex_property_of(expr))
        .commutable(is_commutable(expr))
        .abbreviation(Abbreviation {
            base_name: name.to_string(),
            encapsulated: RefCell::new(expr.clone()),
            free,
            evaluation: Cell::new(false),
            registry: Rc::downgrade(shared),
        })
        .build();

    let bucket = registry.buckets.entry(name.to_string()).or_default();
    bucket.entries.retain(|entry| entry.strong_count() > 0);
    let slot = bucket
        .entries
        .iter()
        .filter_map(Weak::upgrade)
        .take_while(|other| compare_encapsulated(other, &parent) != Ordering::Greater)
        .count();
    bucket.entries.insert(slot, Rc::downgrade(&parent));
    debug!("abbreviated `{}` as `{}`", expr, parent.name());

    instance_of(&parent)
}

/// The categories sums and products are split into before being abbreviated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Category {
    Abbreviation,
    Function,
    Compound,
    Indexed,
    Numeric,
    Other,
}

impl Category {
    fn of(expr: &Expr) -> Self {
        if expr.is_abbreviation() {
            return Self::Abbreviation;
        }
        match expr.get_type() {
            ExprType::Number => Self::Numeric,
            ExprType::Function => Self::Function,
            ExprType::Tensor => Self::Indexed,
            ExprType::Symbol => Self::Other,
            _ => Self::Compound,
        }
    }
}

fn depends_on_variable(expr: &Expr) -> bool {
    expr.post_order_iter()
        .any(|e| e.parent().is_some_and(|parent| *parent.kind() == ParentKind::Variable))
}

fn complex_property_of(expr: &Expr) -> ComplexProperty {
    let real = expr.post_order_iter().all(|e| match e.kind() {
        ExprKind::Number(n) => n.is_real(),
        ExprKind::Symbol { parent, .. } | ExprKind::Tensor { parent, .. } => {
            parent.complex_property() == ComplexProperty::Real
        },
        _ => true,
    });
    if real {
        ComplexProperty::Real
    } else {
        ComplexProperty::Complex
    }
}

/// An instance of an abbreviation, carrying its free indices.
fn instance_of(parent: &Rc<Parent>) -> Expr {
    match &parent.abbreviation {
        Some(abbreviation) if !abbreviation.free.is_empty() => {
            tensor_instance(parent, abbreviation.free.clone(), false)
        },
        _ => symbol_instance(parent, false),
    }
}

/// Returns the expression an abbreviation instance stands for, with the indices of the
/// instance attached and fresh dummies. Other expressions are returned unchanged.
pub fn inline(instance: &Expr) -> Expr {
    let Some(abbreviation) = instance.parent().and_then(|parent| parent.abbreviation.as_ref()) else {
        return instance.clone();
    };
    let body = rename_dummies(&abbreviation.encapsulated.borrow().clone());
    let body = match instance.kind() {
        ExprKind::Tensor { indices, .. } => reattach_indices(&body, &abbreviation.free, indices),
        _ => body,
    };
    if instance.is_conjugated() {
        conjugated(&body)
    } else {
        body
    }
}

/// Builds an instance of a new abbreviation standing for `body`, in the same bucket as the
/// abbreviation of `instance`, carrying the indices and conjugation of `instance`. `body` is
/// written with the indices of the old definition. If the registry is gone, `body` is inlined
/// instead.
pub(crate) fn rewrapped(instance: &Expr, body: Expr) -> Expr {
    let Some(abbreviation) = instance.parent().and_then(|parent| parent.abbreviation.as_ref()) else {
        return body;
    };
    let wrapped = match abbreviation.registry.upgrade() {
        Some(shared) if body.size() > 0 => {
            let existing = if options::get().avoid_duplicates {
                shared.borrow().find_expr(&abbreviation.base_name, &body)
            } else {
                None
            };
            match existing {
                Some(parent) => instance_of(&parent),
                None => create_in(&shared, &abbreviation.base_name, &body),
            }
        },
        _ => rename_dummies(&body),
    };
    let wrapped = match instance.kind() {
        ExprKind::Tensor { indices, .. } => reattach_indices(&wrapped, &abbreviation.free, indices),
        _ => wrapped,
    };
    if instance.is_conjugated() {
        conjugated(&wrapped)
    } else {
        wrapped
    }
}

/// Returns the distinct abbreviations used in `expr`, including the ones nested inside other
/// abbreviations.
pub fn abbreviations_in(expr: &Expr) -> Vec<Rc<Parent>> {
    fn collect(expr: &Expr, seen: &mut HashSet<u64>, found: &mut Vec<Rc<Parent>>) {
        for e in expr.post_order_iter() {
            let Some(parent) = e.parent().filter(|parent| parent.is_abbreviation()) else {
                continue;
            };
            if seen.insert(parent.id()) {
                found.push(Rc::clone(parent));
                if let Some(body) = parent.encapsulated() {
                    collect(&body, seen, found);
                }
            }
        }
    }

    let mut found = Vec::new();
    collect(expr, &mut HashSet::new(), &mut found);
    found
}

/// Enables evaluation of every abbreviation used in `expr`.
pub fn enable_evaluation_in(expr: &Expr) {
    abbreviations_in(expr).iter().for_each(|parent| parent.enable_evaluation());
}

/// Disables evaluation of every abbreviation used in `expr`.
pub fn disable_evaluation_in(expr: &Expr) {
    abbreviations_in(expr).iter().for_each(|parent| parent.disable_evaluation());
}

/// Toggles evaluation of every abbreviation used in `expr`.
pub fn toggle_evaluation_in(expr: &Expr) {
    abbreviations_in(expr).iter().for_each(|parent| parent.toggle_evaluation());
}
