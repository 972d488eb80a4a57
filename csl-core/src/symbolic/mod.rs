//! Symbolic manipulation of expressions.
//!
//! # Expression representation
//!
//! Expressions are trees of immutable, reference-counted [`Expr`] nodes. Nodes are only built
//! through smart constructors ([`sum`], [`prod`], [`pow`], [`function`], [`polynomial`], ...)
//! that put every node in **canonical form** as it is created: sums and products are flattened,
//! their numeric part is folded into a single leading child, like terms and like factors are
//! merged, and the children are sorted by the total order defined in [`mod@compare`].
//!
//! Canonical form means that two expressions that are equal up to the rules the constructors
//! know about are built as the same tree. For example, `x + 2 + x` and `2 + 2*x` are both
//! represented as a sum with the two children `2` and `2*x`:
//!
//! ```
//! use csl_core::symbolic::{prod, sum, variable, Expr};
//!
//! let x = variable("x");
//! let a = sum(vec![x.clone(), Expr::number(2), x.clone()], false);
//! let b = sum(vec![Expr::number(2), prod(vec![Expr::number(2), x], false)], false);
//! assert_eq!(a, b);
//! ```
//!
//! # Tensors and indices
//!
//! Besides scalar constants and variables, expressions can contain tensor elements such as
//! `T(mu, nu)`. An index that appears twice in a product, once raised and once lowered, is a
//! dummy index and is summed over. Dummy indices can be renamed freely, so `A(mu) B(-mu)` and
//! `A(nu) B(-nu)` are the same expression: every comparison that matters (merging like terms,
//! [`compare_with_dummy`], [`hard_comparison`]) looks through such renamings.
//!
//! # Abbreviations
//!
//! Large subexpressions can be replaced by a named stand-in with [`Session::make_abbreviation`],
//! and brought back with [`inline`]. A [`Session`] owns the registry of abbreviations.
//!
//! # Simplification
//!
//! The constructors already perform the cheap simplifications. Rewrites that may or may not
//! help, like expanding or factoring, are applied by [`simplify()`], which keeps a rewrite only
//! if the comparator orders it before the original expression.
//!
//! For more information, see the [`mod@simplify`] module.

pub mod abbrev;
pub mod algebra;
pub mod compare;
pub mod derivative;
pub mod diagnostics;
pub mod dummy;
pub mod evaluate;
pub mod expr;
pub mod index;
pub mod parent;
pub mod replace;
pub mod rewrite;
pub mod simplify;
pub mod step_collector;

#[cfg(test)]
mod tests;

pub use abbrev::{
    abbreviations_in,
    disable_evaluation_in,
    enable_evaluation_in,
    get_free_structure,
    inline,
    lock,
    toggle_evaluation_in,
    unlock,
    Abbreviation,
    Session,
    DEFAULT_NAME,
};
pub use algebra::{
    as_polynomial,
    commutation,
    constant,
    cos,
    derivative,
    derivative_operator,
    exp,
    function,
    integral,
    is_commutable,
    log,
    polynomial,
    pow,
    prod,
    quotient,
    sin,
    sqrt,
    sum,
    sum_checked,
    tan,
    variable,
    Function,
};
pub use compare::{compare, dummy_scope, is_simpler, structural_compare, test_simplification_rule, tried};
pub use derivative::derive;
pub use diagnostics::{check_validity, memory_size_of};
pub use dummy::{
    compare_with_dummy,
    hard_comparison,
    hard_ordering,
    match_b_on_a,
    next_permutation,
    rename_dummies,
    MultiPermutation,
};
pub use evaluate::{evaluate, EvalMode};
pub use expr::{Expr, ExprKind, ExprType, PrimaryType};
pub use index::{dummy_labels, format_indices, free_structure, same_free_labels, Index, Label, Space};
pub use parent::{ComplexProperty, Parent, ParentBuilder, ParentKind, Symmetry};
pub use replace::{
    apply_indices,
    replace,
    replace_all,
    replace_index,
    replace_indices,
    replace_parent,
    replace_parent_by,
    swapped,
};
pub use rewrite::{collect, conjugated, contract_index, distributed, expanded, factored};
pub use simplify::{simplify, simplify_with, simplify_with_steps, step::Step};
pub use step_collector::StepCollector;
