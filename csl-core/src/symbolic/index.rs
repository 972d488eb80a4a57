//! Vector spaces and the indices that range over them.
//!
//! An [`Index`] is identified for contraction purposes by its *label*: its name, its id and its
//! space. Two occurrences of the same label inside one product (or one tensor) are contracted,
//! that is, the label is a *dummy* of that node. The sign of an index (raised or lowered, in a
//! signed space) does not take part in the label, so `T(mu) * T(-mu)` is a contraction.
//!
//! Dummy and free status is never stored on the index itself; it is derived from the structure
//! the index appears in. See [`free_structure`] and [`dummy_labels`].

use std::{
    cmp::Ordering,
    fmt,
    rc::Rc,
    sync::atomic::{AtomicU64, Ordering as AtomicOrdering},
};

/// Source of fresh index ids. Id `0` is reserved for indices created by name.
static NEXT_INDEX_ID: AtomicU64 = AtomicU64::new(1);

/// A vector space that indices range over.
#[derive(Debug, PartialEq, Eq)]
pub struct Space {
    /// The name of the space, such as `Minko`.
    pub name: String,

    /// The dimension of the space.
    pub dim: u32,

    /// Whether indices of the space can be raised and lowered.
    pub signed: bool,
}

impl Space {
    /// Creates a new space.
    pub fn new(name: impl Into<String>, dim: u32, signed: bool) -> Rc<Self> {
        Rc::new(Self { name: name.into(), dim, signed })
    }

    /// Creates a raised index with the given name in this space.
    pub fn index(self: &Rc<Self>, name: &str) -> Index {
        Index {
            name: Rc::from(name),
            space: Rc::clone(self),
            id: 0,
            lowered: false,
            value: None,
        }
    }

    /// Creates a fixed index, pointing at the `value`-th component of this space.
    pub fn fixed(self: &Rc<Self>, value: u32) -> Index {
        Index {
            name: Rc::from(value.to_string()),
            space: Rc::clone(self),
            id: 0,
            lowered: false,
            value: Some(value),
        }
    }
}

/// The part of an index that identifies it for contractions.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Label {
    name: Rc<str>,
    id: u64,
    space: String,
}

/// A symbolic tensor index.
#[derive(Debug, Clone)]
pub struct Index {
    name: Rc<str>,
    space: Rc<Space>,
    id: u64,
    lowered: bool,
    value: Option<u32>,
}

impl Index {
    /// The name of the index.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The space the index ranges over.
    pub fn space(&self) -> &Rc<Space> {
        &self.space
    }

    /// The id disambiguating renamed copies of the same name.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Returns true if the index is lowered.
    pub fn is_lowered(&self) -> bool {
        self.lowered
    }

    /// If the index is fixed, returns the component it points at.
    pub fn value(&self) -> Option<u32> {
        self.value
    }

    /// Returns true if the index is fixed.
    pub fn is_fixed(&self) -> bool {
        self.value.is_some()
    }

    /// Returns the contraction label of the index.
    pub fn label(&self) -> Label {
        Label {
            name: Rc::clone(&self.name),
            id: self.id,
            space: self.space.name.clone(),
        }
    }

    /// Returns true if both indices have the same label, ignoring their sign. Fixed indices never
    /// share a label with anything.
    pub fn same_label(&self, other: &Index) -> bool {
        !self.is_fixed()
            && !other.is_fixed()
            && self.id == other.id
            && self.name == other.name
            && self.space.name == other.space.name
    }

    /// Returns the index with its sign flipped. Indices of unsigned spaces are returned as is.
    pub fn flipped(&self) -> Index {
        let mut flipped = self.clone();
        if self.space.signed {
            flipped.lowered = !self.lowered;
        }
        flipped
    }

    /// Returns the lowered version of this index.
    pub fn lowered(&self) -> Index {
        if self.lowered {
            self.clone()
        } else {
            self.flipped()
        }
    }

    /// Returns a copy of the index with the same name and a fresh id, used to rename dummies.
    pub fn renamed(&self) -> Index {
        Index {
            id: NEXT_INDEX_ID.fetch_add(1, AtomicOrdering::Relaxed),
            ..self.clone()
        }
    }

    /// Returns a copy of the index named `_` with the given id. Used to give dummies names that
    /// depend only on their position.
    pub(crate) fn canonical(&self, id: u64) -> Index {
        Index {
            name: Rc::from("_"),
            id,
            ..self.clone()
        }
    }

    /// Returns this occurrence relabeled with the label of `target`, keeping its own sign.
    pub fn relabeled(&self, target: &Index) -> Index {
        Index {
            name: Rc::clone(&target.name),
            space: Rc::clone(&target.space),
            id: target.id,
            lowered: self.lowered,
            value: target.value,
        }
    }
}

/// Indices are equal if they have the same label, sign and value.
impl PartialEq for Index {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Index {}

impl PartialOrd for Index {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Fixed indices come first, then indices ordered by space, name, id and sign.
impl Ord for Index {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.value, other.value) {
            (Some(a), Some(b)) => self.space.name.cmp(&other.space.name).then(a.cmp(&b)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self.space.name.cmp(&other.space.name)
                .then_with(|| self.name.cmp(&other.name))
                .then(self.id.cmp(&other.id))
                .then(self.lowered.cmp(&other.lowered)),
        }
    }
}

impl fmt::Display for Index {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.lowered {
            write!(f, "-")?;
        }
        write!(f, "{}", self.name)?;
        if self.id != 0 {
            write!(f, "'")?;
        }
        Ok(())
    }
}

/// Returns the labels that appear twice in the given structure, in order of first appearance.
pub fn dummy_labels(indices: &[Index]) -> Vec<Label> {
    let mut dummies = Vec::new();
    for (i, index) in indices.iter().enumerate() {
        if indices[i + 1..].iter().any(|other| index.same_label(other)) {
            dummies.push(index.label());
        }
    }
    dummies
}

/// Returns the free subset of an index structure: fixed indices are dropped, and so is every
/// index whose label appears again in the same structure (it is contracted within it).
pub fn free_structure(indices: &[Index]) -> Vec<Index> {
    indices
        .iter()
        .filter(|index| {
            !index.is_fixed()
                && indices.iter().filter(|other| index.same_label(other)).count() == 1
        })
        .cloned()
        .collect()
}

/// Returns true if both structures contain the same free labels, in any order.
pub fn same_free_labels(a: &[Index], b: &[Index]) -> bool {
    let mut a = a.iter().map(Index::label).collect::<Vec<_>>();
    let mut b = b.iter().map(Index::label).collect::<Vec<_>>();
    let key = |l: &Label| (l.space.clone(), Rc::clone(&l.name), l.id);
    a.sort_by_key(key);
    b.sort_by_key(key);
    a == b
}

/// Formats a list of indices separated by commas.
pub fn format_indices(indices: &[Index]) -> String {
    indices.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use super::*;

    #[test]
    fn free_structure_drops_contracted_and_fixed() {
        let minko = Space::new("Minko", 4, true);
        let (mu, nu) = (minko.index("mu"), minko.index("nu"));
        let structure = vec![mu.clone(), nu.clone(), mu.flipped(), minko.fixed(2)];
        assert_eq!(free_structure(&structure), vec![nu]);
        assert_eq!(dummy_labels(&structure), vec![mu.label()]);
    }

    #[test]
    fn renamed_index_is_distinct() {
        let minko = Space::new("Minko", 4, true);
        let mu = minko.index("mu");
        let renamed = mu.renamed();
        assert_eq!(renamed.name(), "mu");
        assert!(!mu.same_label(&renamed));
        assert!(mu.same_label(&mu.flipped()));
        assert_ne!(mu, mu.flipped());
    }

    #[test]
    fn fixed_indices_never_contract() {
        let color = Space::new("Color", 3, false);
        let one = color.fixed(1);
        assert!(!one.same_label(&one));
        assert!(free_structure(&[one.clone(), one]).is_empty());
    }

    #[test]
    fn free_labels_ignore_order() {
        let minko = Space::new("Minko", 4, true);
        let (mu, nu) = (minko.index("mu"), minko.index("nu"));
        assert!(same_free_labels(&[mu.clone(), nu.clone()], &[nu.clone(), mu.clone()]));
        assert!(!same_free_labels(&[mu.clone()], &[nu]));
    }
}
