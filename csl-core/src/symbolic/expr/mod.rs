//! The expression tree.
//!
//! An [`Expr`] is a cheap, reference-counted handle to an immutable node. Nodes are only ever
//! built through the smart constructors of [`algebra`](super::algebra) (and the leaf
//! constructors in this module), which put every node in canonical form as it is created:
//!
//! - a [`ExprKind::Sum`] never directly contains another sum, and a [`ExprKind::Prod`] never
//!   directly contains another product;
//! - the numeric part of a sum or product is folded into a single leading child;
//! - the remaining children are kept in comparator order (products only reorder factors that
//!   commute);
//! - sums and products with zero or one child collapse to `0`, `1` or the child itself.
//!
//! Since nodes are shared, "changing" an expression always means building a new one. Helpers
//! such as [`Expr::map_children`] rebuild a node from new children through the same smart
//! constructors, so the result is canonical again.
//!
//! ```
//! use csl_core::symbolic::{constant, sum, variable, Expr};
//!
//! let x = variable("x");
//! let e = sum(vec![Expr::number(2), x.clone(), constant("c"), Expr::number(3), x], false);
//! assert_eq!(e.to_string(), "5 + c + 2 * x");
//! ```

mod fmt;
mod iter;

use crate::numeric::Number;
use iter::ExprIter;
use std::{ops::Deref, rc::Rc};
use super::{
    algebra::{
        derivative, derivative_operator, function, integral, polynomial, polynomial_to_sum, pow, prod, sum,
        Function,
    },
    index::{free_structure, Index},
    parent::Parent,
};

/// The kind of a node, in comparator rank order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ExprType {
    Number,
    Symbol,
    Tensor,
    Function,
    Pow,
    Prod,
    Sum,
    Polynomial,
    Derivative,
    Integral,
}

/// A coarser classification of nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimaryType {
    /// Numbers.
    Numerical,

    /// Constants and variables.
    Literal,

    /// Tensor elements.
    Indicial,

    /// Functions of one argument.
    ScalarFunction,

    /// Sums, products and powers.
    MultiFunction,

    /// Polynomials in one variable.
    Polynomial,

    /// Derivatives and integrals.
    Operator,
}

/// The contents of a node.
#[derive(Debug)]
pub enum ExprKind {
    /// A number.
    Number(Number),

    /// An instance of a constant or variable.
    Symbol {
        parent: Rc<Parent>,
        conjugated: bool,
    },

    /// An element of a tensor, such as `T(mu, nu)`.
    Tensor {
        parent: Rc<Parent>,
        indices: Vec<Index>,
        conjugated: bool,
    },

    /// A scalar function applied to an argument.
    Function(Function, Expr),

    /// Terms added together.
    Sum(Vec<Expr>),

    /// Factors multiplied together, in order.
    Prod(Vec<Expr>),

    /// A base raised to an exponent.
    Pow(Expr, Expr),

    /// A polynomial `c0 + c1 * v + c2 * v^2 + ...` in one variable.
    Polynomial {
        variable: Expr,
        coefficients: Vec<Expr>,
    },

    /// The derivative of `operand` with respect to `variable`. Without an operand, this is a
    /// pending derivative operator acting on the factors to its right.
    Derivative {
        operand: Option<Expr>,
        variable: Expr,
        order: u32,
    },

    /// The integral of `operand` over `variable`, between the given bounds if any.
    Integral {
        operand: Expr,
        variable: Expr,
        bounds: Option<(Expr, Expr)>,
    },
}

impl ExprKind {
    /// Returns the kind of the node.
    pub fn expr_type(&self) -> ExprType {
        match self {
            Self::Number(_) => ExprType::Number,
            Self::Symbol { .. } => ExprType::Symbol,
            Self::Tensor { .. } => ExprType::Tensor,
            Self::Function(..) => ExprType::Function,
            Self::Sum(_) => ExprType::Sum,
            Self::Prod(_) => ExprType::Prod,
            Self::Pow(..) => ExprType::Pow,
            Self::Polynomial { .. } => ExprType::Polynomial,
            Self::Derivative { .. } => ExprType::Derivative,
            Self::Integral { .. } => ExprType::Integral,
        }
    }
}

/// A node together with metadata computed once when the node is built.
#[derive(Debug)]
pub struct Node {
    kind: ExprKind,
    indexed: bool,
}

/// A handle to an immutable expression node. Cloning is cheap and shares the node.
///
/// For more information about this type, see the [module-level documentation](self).
#[derive(Debug, Clone)]
pub struct Expr(Rc<Node>);

impl Deref for Expr {
    type Target = ExprKind;

    fn deref(&self) -> &ExprKind {
        &self.0.kind
    }
}

impl Expr {
    /// Wraps a node kind without any canonicalization. The caller guarantees the node is
    /// canonical.
    pub(crate) fn new(kind: ExprKind) -> Self {
        let indexed = match &kind {
            ExprKind::Number(_) | ExprKind::Symbol { .. } => false,
            ExprKind::Tensor { indices, .. } => !indices.is_empty(),
            _ => kind_children(&kind).iter().any(|child| child.is_indexed()),
        };
        Self(Rc::new(Node { kind, indexed }))
    }

    /// Creates a numeric leaf.
    pub fn number(n: impl Into<Number>) -> Self {
        Self::new(ExprKind::Number(n.into()))
    }

    pub fn zero() -> Self {
        Self::number(Number::zero())
    }

    pub fn one() -> Self {
        Self::number(Number::one())
    }

    pub fn minus_one() -> Self {
        Self::number(Number::minus_one())
    }

    /// The imaginary unit.
    pub fn i() -> Self {
        Self::number(Number::i())
    }

    pub fn infinity() -> Self {
        Self::number(Number::Infinity)
    }

    pub fn undefined() -> Self {
        Self::number(Number::Undefined)
    }

    /// Returns the contents of the node.
    pub fn kind(&self) -> &ExprKind {
        &self.0.kind
    }

    /// Returns true if both handles point to the same node.
    pub fn ptr_eq(&self, other: &Expr) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Returns the kind of the node.
    pub fn get_type(&self) -> ExprType {
        self.kind().expr_type()
    }

    /// Returns the coarse classification of the node.
    pub fn get_primary_type(&self) -> PrimaryType {
        match self.get_type() {
            ExprType::Number => PrimaryType::Numerical,
            ExprType::Symbol => PrimaryType::Literal,
            ExprType::Tensor => PrimaryType::Indicial,
            ExprType::Function => PrimaryType::ScalarFunction,
            ExprType::Sum | ExprType::Prod | ExprType::Pow => PrimaryType::MultiFunction,
            ExprType::Polynomial => PrimaryType::Polynomial,
            ExprType::Derivative | ExprType::Integral => PrimaryType::Operator,
        }
    }

    /// If the expression is a number, returns a reference to it.
    pub fn as_number(&self) -> Option<&Number> {
        match self.kind() {
            ExprKind::Number(n) => Some(n),
            _ => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self.kind(), ExprKind::Number(_))
    }

    pub fn is_zero(&self) -> bool {
        self.as_number().is_some_and(Number::is_zero)
    }

    pub fn is_one(&self) -> bool {
        self.as_number().is_some_and(Number::is_one)
    }

    pub fn is_undefined(&self) -> bool {
        self.as_number().is_some_and(Number::is_undefined)
    }

    pub fn is_sum(&self) -> bool {
        matches!(self.kind(), ExprKind::Sum(_))
    }

    pub fn is_product(&self) -> bool {
        matches!(self.kind(), ExprKind::Prod(_))
    }

    pub fn is_power(&self) -> bool {
        matches!(self.kind(), ExprKind::Pow(..))
    }

    /// Returns true if the node or any of its children carries indices.
    pub fn is_indexed(&self) -> bool {
        self.0.indexed
    }

    /// Returns true if the node is a pending derivative operator.
    pub fn is_operator(&self) -> bool {
        matches!(self.kind(), ExprKind::Derivative { operand: None, .. })
    }

    /// If the node is an instance of a parent, returns the parent.
    pub fn parent(&self) -> Option<&Rc<Parent>> {
        match self.kind() {
            ExprKind::Symbol { parent, .. } | ExprKind::Tensor { parent, .. } => Some(parent),
            _ => None,
        }
    }

    /// Returns true if the node is a conjugated symbol or tensor.
    pub fn is_conjugated(&self) -> bool {
        matches!(
            self.kind(),
            ExprKind::Symbol { conjugated: true, .. } | ExprKind::Tensor { conjugated: true, .. }
        )
    }

    /// Returns true if the node is an instance of an abbreviation.
    pub fn is_abbreviation(&self) -> bool {
        self.parent().is_some_and(|parent| parent.is_abbreviation())
    }

    /// Returns the children of the node, in order.
    pub fn children(&self) -> Vec<&Expr> {
        kind_children(self.kind())
    }

    /// Returns the number of children of the node. Leaves have size zero.
    pub fn size(&self) -> usize {
        self.children().len()
    }

    /// Returns the `i`-th child of the node.
    pub fn get_argument(&self, i: usize) -> Option<&Expr> {
        self.children().get(i).copied()
    }

    /// Rebuilds a node of the same shape from new children, through the smart constructors.
    /// `children` must have the same length as [`Expr::children`].
    pub fn with_children(&self, mut children: Vec<Expr>) -> Expr {
        match self.kind() {
            ExprKind::Number(_) | ExprKind::Symbol { .. } | ExprKind::Tensor { .. } => self.clone(),
            ExprKind::Function(f, _) => function(*f, children.remove(0)),
            ExprKind::Sum(_) => sum(children, false),
            ExprKind::Prod(_) => prod(children, false),
            ExprKind::Pow(..) => {
                let exponent = children.remove(1);
                pow(children.remove(0), exponent)
            },
            ExprKind::Polynomial { .. } => {
                let variable = children.remove(0);
                if variable.get_type() == ExprType::Symbol {
                    polynomial(children, variable)
                } else {
                    // the variable was substituted by a value
                    polynomial_to_sum(&variable, &children)
                }
            },
            ExprKind::Derivative { operand, order, .. } => {
                if operand.is_some() {
                    let variable = children.remove(1);
                    derivative(children.remove(0), variable, *order)
                } else {
                    derivative_operator(children.remove(0), *order)
                }
            },
            ExprKind::Integral { bounds, .. } => {
                let bounds = bounds.as_ref().map(|_| {
                    let upper = children.remove(3);
                    (children.remove(2), upper)
                });
                let variable = children.remove(1);
                integral(children.remove(0), variable, bounds)
            },
        }
    }

    /// Rebuilds the node after applying `f` to each child.
    pub fn map_children(&self, mut f: impl FnMut(&Expr) -> Expr) -> Expr {
        let children = self.children();
        if children.is_empty() {
            return self.clone();
        }
        let mapped = children.into_iter().map(&mut f).collect();
        self.with_children(mapped)
    }

    /// Rebuilds the node after applying the fallible `f` to each child.
    pub fn try_map_children<E>(&self, mut f: impl FnMut(&Expr) -> Result<Expr, E>) -> Result<Expr, E> {
        let children = self.children();
        if children.is_empty() {
            return Ok(self.clone());
        }
        let mapped = children.into_iter().map(&mut f).collect::<Result<Vec<_>, E>>()?;
        Ok(self.with_children(mapped))
    }

    /// Returns the index structure of the node.
    ///
    /// - a tensor element carries its own indices;
    /// - a product carries the indices of all of its factors, concatenated;
    /// - a sum carries the free indices of its first indexed term;
    /// - any other node carries the free indices of its children.
    pub fn get_index_structure(&self) -> Vec<Index> {
        if !self.is_indexed() {
            return Vec::new();
        }
        match self.kind() {
            ExprKind::Tensor { indices, .. } => indices.clone(),
            ExprKind::Prod(factors) => factors.iter().flat_map(Expr::get_index_structure).collect(),
            ExprKind::Sum(terms) => terms
                .iter()
                .find(|term| term.is_indexed())
                .map(Expr::free_indices)
                .unwrap_or_default(),
            _ => self.children().into_iter().flat_map(Expr::free_indices).collect(),
        }
    }

    /// Returns the free indices of the node.
    pub fn free_indices(&self) -> Vec<Index> {
        free_structure(&self.get_index_structure())
    }

    /// Returns true if `self` is an occurrence of `var`: an instance of the same parent when
    /// `var` is a symbol or tensor, or a structurally equal node otherwise.
    fn is_occurrence_of(&self, var: &Expr) -> bool {
        match (self.parent(), var.parent()) {
            (Some(a), Some(b)) => a.same_as(b),
            (None, Some(_)) => false,
            _ => self == var,
        }
    }

    /// Returns true if the expression depends on `var`, looking through abbreviations.
    pub fn depends_on(&self, var: &Expr) -> bool {
        self.post_order_iter().any(|e| {
            e.is_occurrence_of(var)
                || e.parent()
                    .and_then(|parent| parent.encapsulated())
                    .is_some_and(|body| body.depends_on(var))
        })
    }

    /// Returns an iterator that traverses the tree of expressions in left-to-right post-order
    /// (i.e. depth-first).
    pub fn post_order_iter(&self) -> ExprIter {
        ExprIter::new(self)
    }

    /// Splits a term into its numeric coefficient and the rest: `3 * x * y` gives `(3, x * y)`.
    pub fn split_coefficient(&self) -> (Number, Expr) {
        match self.kind() {
            ExprKind::Number(n) => (n.clone(), Expr::one()),
            ExprKind::Prod(factors) => match factors[0].as_number() {
                Some(n) => (n.clone(), prod(factors[1..].to_vec(), true)),
                None => (Number::one(), self.clone()),
            },
            _ => (Number::one(), self.clone()),
        }
    }

    /// Splits a factor into its base and numeric exponent: `x^3` gives `(x, 3)`.
    pub fn split_power(&self) -> (Expr, Number) {
        match self.kind() {
            ExprKind::Pow(base, exponent) => match exponent.as_number() {
                Some(n) => (base.clone(), n.clone()),
                None => (self.clone(), Number::one()),
            },
            _ => (self.clone(), Number::one()),
        }
    }
}

/// Returns the children stored in a node kind.
fn kind_children(kind: &ExprKind) -> Vec<&Expr> {
    match kind {
        ExprKind::Number(_) | ExprKind::Symbol { .. } | ExprKind::Tensor { .. } => Vec::new(),
        ExprKind::Function(_, arg) => vec![arg],
        ExprKind::Sum(children) | ExprKind::Prod(children) => children.iter().collect(),
        ExprKind::Pow(base, exponent) => vec![base, exponent],
        ExprKind::Polynomial { variable, coefficients } => {
            std::iter::once(variable).chain(coefficients).collect()
        },
        ExprKind::Derivative { operand, variable, .. } => {
            operand.iter().chain(std::iter::once(variable)).collect()
        },
        ExprKind::Integral { operand, variable, bounds } => {
            let mut children = vec![operand, variable];
            if let Some((lower, upper)) = bounds {
                children.push(lower);
                children.push(upper);
            }
            children
        },
    }
}

#[cfg(test)]
mod tests {
    use crate::symbolic::{constant, cos, pow, prod, sum, variable, Space, Parent};
    use pretty_assertions::assert_eq;
    use super::*;

    #[test]
    fn queries() {
        let x = variable("x");
        let e = sum(vec![x.clone(), cos(x.clone())], false);
        assert!(e.is_sum());
        assert_eq!(e.size(), 2);
        assert_eq!(e.get_primary_type(), PrimaryType::MultiFunction);
        assert_eq!(e.get_argument(0).map(Expr::get_type), Some(ExprType::Symbol));
        assert!(e.get_argument(2).is_none());
        assert!(e.depends_on(&x));
        assert!(!e.depends_on(&constant("c")));
    }

    #[test]
    fn index_structure_of_product() {
        let minko = Space::new("Minko", 4, true);
        let t = Parent::tensor("T", vec![minko.clone(), minko.clone()]).build();
        let (mu, nu, rho) = (minko.index("mu"), minko.index("nu"), minko.index("rho"));
        let e = prod(vec![
            t.at(vec![mu.clone(), nu.clone()]).unwrap(),
            t.at(vec![nu.clone(), rho.clone()]).unwrap(),
        ], false);
        assert!(e.is_indexed());
        assert_eq!(e.get_index_structure().len(), 4);
        let mut free = e.free_indices();
        free.sort();
        assert_eq!(free, vec![mu, rho]);
    }

    #[test]
    fn map_children_recanonicalizes() {
        let x = variable("x");
        let y = variable("y");
        let e = sum(vec![x.clone(), y.clone()], false);
        let mapped = e.map_children(|child| if child == &y { x.clone() } else { child.clone() });
        assert_eq!(mapped, prod(vec![Expr::number(2), x.clone()], false));
        let squared = pow(x.clone(), Expr::number(2));
        assert_eq!(squared.split_power(), (x, Number::from(2)));
    }

    #[test]
    fn post_order() {
        let x = variable("x");
        let y = variable("y");
        let e = prod(vec![x.clone(), sum(vec![x.clone(), y.clone()], false)], false);
        let visited = e.post_order_iter().map(ToString::to_string).collect::<Vec<_>>();
        assert_eq!(visited, vec!["x", "x", "y", "x + y", "x * (x + y)"]);
    }
}
