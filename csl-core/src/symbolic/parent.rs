//! Declarations behind symbols and tensors.
//!
//! A [`Parent`] owns the name and algebraic properties of a constant, variable or tensor. Every
//! instance of it in an expression shares it through an [`Rc`]. Parents are compared by name and
//! kind, so two separately declared variables called `x` are the same variable. Abbreviations are
//! the exception: each one is its own object, whatever its name.

use crate::{
    error::{kind::{IndexArityMismatch, IndexSpaceMismatch, TypeMismatch}, on, on_text, Error},
    numeric::Number,
};
use std::{
    cmp::Ordering,
    fmt,
    rc::Rc,
    sync::atomic::{AtomicU64, Ordering as AtomicOrdering},
};
use super::{
    abbrev::Abbreviation,
    algebra::prod,
    expr::{Expr, ExprKind},
    index::{Index, Space},
};

static NEXT_PARENT_ID: AtomicU64 = AtomicU64::new(0);

/// What a parent declares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParentKind {
    /// A symbol that does not vary, such as a coupling constant.
    Constant,

    /// A symbol that can be differentiated against.
    Variable,

    /// A tensor with one slot per space.
    Tensor(Vec<Rc<Space>>),
}

impl ParentKind {
    fn rank(&self) -> u8 {
        match self {
            Self::Constant => 0,
            Self::Variable => 1,
            Self::Tensor(_) => 2,
        }
    }
}

/// Whether the values of a parent are real, purely imaginary or complex.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComplexProperty {
    Real,
    Imaginary,
    Complex,
}

/// Symmetry of a tensor under exchange of its indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symmetry {
    None,
    Symmetric,
    Antisymmetric,
}

/// The declaration of a constant, variable or tensor.
pub struct Parent {
    id: u64,
    name: String,
    kind: ParentKind,
    complex: ComplexProperty,
    commutable: bool,
    symmetry: Symmetry,
    delta: bool,
    value: Option<Number>,
    pub(crate) abbreviation: Option<Abbreviation>,
}

/// Builds a [`Parent`].
#[must_use]
pub struct ParentBuilder {
    name: String,
    kind: ParentKind,
    complex: ComplexProperty,
    commutable: bool,
    symmetry: Symmetry,
    delta: bool,
    value: Option<Number>,
    abbreviation: Option<Abbreviation>,
}

impl ParentBuilder {
    fn new(name: String, kind: ParentKind) -> Self {
        Self {
            name,
            kind,
            complex: ComplexProperty::Real,
            commutable: true,
            symmetry: Symmetry::None,
            delta: false,
            value: None,
            abbreviation: None,
        }
    }

    pub fn complex(mut self, complex: ComplexProperty) -> Self {
        self.complex = complex;
        self
    }

    /// Declares instances of the parent as not commuting with other non-commuting instances.
    pub fn commutable(mut self, commutable: bool) -> Self {
        self.commutable = commutable;
        self
    }

    pub fn symmetry(mut self, symmetry: Symmetry) -> Self {
        self.symmetry = symmetry;
        self
    }

    /// Gives the parent a literal value, substituted by literal evaluation.
    pub fn value(mut self, value: impl Into<Number>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub(crate) fn abbreviation(mut self, abbreviation: Abbreviation) -> Self {
        self.abbreviation = Some(abbreviation);
        self
    }

    pub fn build(self) -> Rc<Parent> {
        Rc::new(Parent {
            id: NEXT_PARENT_ID.fetch_add(1, AtomicOrdering::Relaxed),
            name: self.name,
            kind: self.kind,
            complex: self.complex,
            commutable: self.commutable,
            symmetry: self.symmetry,
            delta: self.delta,
            value: self.value,
            abbreviation: self.abbreviation,
        })
    }
}

impl Parent {
    /// Starts the declaration of a constant.
    pub fn constant(name: impl Into<String>) -> ParentBuilder {
        ParentBuilder::new(name.into(), ParentKind::Constant)
    }

    /// Starts the declaration of a variable.
    pub fn variable(name: impl Into<String>) -> ParentBuilder {
        ParentBuilder::new(name.into(), ParentKind::Variable)
    }

    /// Starts the declaration of a tensor with one slot per given space.
    pub fn tensor(name: impl Into<String>, spaces: Vec<Rc<Space>>) -> ParentBuilder {
        ParentBuilder::new(name.into(), ParentKind::Tensor(spaces))
    }

    /// The Kronecker delta of a space.
    pub fn delta(space: &Rc<Space>) -> Rc<Parent> {
        let mut builder = Self::tensor("delta", vec![Rc::clone(space), Rc::clone(space)])
            .symmetry(Symmetry::Symmetric);
        builder.delta = true;
        builder.build()
    }

    /// A unique id, distinct for every declaration.
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &ParentKind {
        &self.kind
    }

    pub fn complex_property(&self) -> ComplexProperty {
        self.complex
    }

    pub fn is_commutable(&self) -> bool {
        self.commutable
    }

    pub fn symmetry(&self) -> Symmetry {
        self.symmetry
    }

    /// Returns true if the parent is a Kronecker delta.
    pub fn is_delta(&self) -> bool {
        self.delta
    }

    pub fn value(&self) -> Option<&Number> {
        self.value.as_ref()
    }

    pub fn is_tensor(&self) -> bool {
        matches!(self.kind, ParentKind::Tensor(_))
    }

    /// The spaces of the slots of a tensor, empty for scalars.
    pub fn spaces(&self) -> &[Rc<Space>] {
        match &self.kind {
            ParentKind::Tensor(spaces) => spaces,
            _ => &[],
        }
    }

    /// Returns true if both parents declare the same object: same name and same kind, and the
    /// same declaration for abbreviations.
    pub fn same_as(&self, other: &Parent) -> bool {
        self.cmp_declaration(other) == Ordering::Equal
    }

    /// Orders parents by name, then kind. Abbreviations come after other parents of the same
    /// name and kind, and are ordered by id among themselves, so that two abbreviations are
    /// never confused even when they share a name.
    pub fn cmp_declaration(&self, other: &Parent) -> Ordering {
        self.name
            .cmp(&other.name)
            .then(self.kind.rank().cmp(&other.kind.rank()))
            .then_with(|| match (self.is_abbreviation(), other.is_abbreviation()) {
                (true, true) => self.id.cmp(&other.id),
                (a, b) => a.cmp(&b),
            })
    }

    /// Returns an instance of a constant or variable.
    pub fn instance(self: &Rc<Self>) -> Result<Expr, Error> {
        if self.is_tensor() {
            return Err(on_text(&self.name, TypeMismatch { expected: "a scalar parent", found: "a tensor" }));
        }
        Ok(symbol_instance(self, false))
    }

    /// Returns the element of a tensor at the given indices.
    pub fn at(self: &Rc<Self>, indices: Vec<Index>) -> Result<Expr, Error> {
        let spaces = self.spaces();
        if !self.is_tensor() {
            return Err(on_text(&self.name, TypeMismatch { expected: "a tensor", found: "a scalar parent" }));
        }
        if spaces.len() != indices.len() {
            return Err(on_text(&self.name, IndexArityMismatch { expected: spaces.len(), given: indices.len() }));
        }
        check_spaces(self, &indices).map_err(|kind| on_text(&self.name, kind))?;
        Ok(tensor_instance(self, indices, false))
    }
}

/// Checks that every index lives in the space of its slot.
pub(crate) fn check_spaces(parent: &Parent, indices: &[Index]) -> Result<(), IndexSpaceMismatch> {
    for (space, index) in parent.spaces().iter().zip(indices) {
        if space.name != index.space().name {
            return Err(IndexSpaceMismatch {
                index: index.name().to_string(),
                expected: space.name.clone(),
                found: index.space().name.clone(),
            });
        }
    }
    Ok(())
}

/// Builds an instance of a scalar parent. Conjugating a real symbol does nothing, and the
/// conjugate of an imaginary symbol is its opposite.
pub(crate) fn symbol_instance(parent: &Rc<Parent>, conjugated: bool) -> Expr {
    let node = Expr::new(ExprKind::Symbol {
        parent: Rc::clone(parent),
        conjugated: conjugated && parent.complex == ComplexProperty::Complex,
    });
    if conjugated && parent.complex == ComplexProperty::Imaginary {
        prod(vec![Expr::minus_one(), node], false)
    } else {
        node
    }
}

/// Builds a tensor element, putting the indices of symmetric tensors in order. A Kronecker delta
/// contracted with itself gives the dimension of its space, and an antisymmetric tensor with a
/// repeated index vanishes.
pub(crate) fn tensor_instance(parent: &Rc<Parent>, mut indices: Vec<Index>, conjugated: bool) -> Expr {
    if parent.delta && indices.len() == 2 && indices[0].same_label(&indices[1]) {
        return Expr::number(i64::from(indices[0].space().dim));
    }

    let mut negate = false;
    match parent.symmetry {
        Symmetry::None => {},
        Symmetry::Symmetric => indices.sort(),
        Symmetry::Antisymmetric => {
            for (i, index) in indices.iter().enumerate() {
                let repeated = indices[i + 1..].iter().any(|other| {
                    index.same_label(other) || (index.is_fixed() && index.value() == other.value())
                });
                if repeated {
                    return Expr::zero();
                }
            }

            // insertion sort, counting swaps for the sign
            for i in 1..indices.len() {
                let mut j = i;
                while j > 0 && indices[j - 1] > indices[j] {
                    indices.swap(j - 1, j);
                    negate = !negate;
                    j -= 1;
                }
            }
        },
    }

    let node = Expr::new(ExprKind::Tensor {
        parent: Rc::clone(parent),
        indices,
        conjugated: conjugated && parent.complex == ComplexProperty::Complex,
    });
    let negate = negate ^ (conjugated && parent.complex == ComplexProperty::Imaginary);
    if negate {
        prod(vec![Expr::minus_one(), node], false)
    } else {
        node
    }
}

/// Rebuilds an instance of the same parent with new indices, keeping its conjugation.
pub(crate) fn reindexed(instance: &Expr, indices: Vec<Index>) -> Expr {
    match instance.kind() {
        ExprKind::Tensor { parent, conjugated, .. } => tensor_instance(parent, indices, *conjugated),
        _ => instance.clone(),
    }
}

/// Returns the error raised when an expression is used where a tensor element is required.
pub(crate) fn not_a_tensor(expr: &Expr) -> Error {
    on(expr, TypeMismatch { expected: "a tensor element", found: "a non-indexed expression" })
}

impl fmt::Debug for Parent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parent")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("abbreviation", &self.abbreviation.is_some())
            .finish()
    }
}

impl Drop for Parent {
    fn drop(&mut self) {
        if let Some(abbreviation) = &self.abbreviation {
            abbreviation.unregister();
        }
    }
}
