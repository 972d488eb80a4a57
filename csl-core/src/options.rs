//! Per-thread engine options.
//!
//! The canonicalization algebra consults a handful of switches that callers flip for the
//! duration of an operation (for example, comparing expressions up to dummy renaming while
//! merging the terms of a sum). Options are read with [`get`] and changed only through
//! [`scoped`], which returns a guard that restores the previous options when dropped, including
//! while unwinding from a panic.
//!
//! ```
//! use csl_core::options;
//!
//! assert!(!options::get().freeze_merge);
//! {
//!     let _guard = options::scoped(|o| o.freeze_merge = true);
//!     assert!(options::get().freeze_merge);
//! }
//! assert!(!options::get().freeze_merge);
//! ```

use std::{cell::Cell, marker::PhantomData};

/// Switches read by the canonicalization algebra, the comparator and the abbreviation cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    /// Compare indexed expressions up to a consistent renaming of their dummy indices.
    pub dummy_comparison: bool,

    /// Reuse an existing abbreviation when an equal expression is abbreviated again.
    pub avoid_duplicates: bool,

    /// Search abbreviation buckets by binary search when the target carries no indices.
    pub use_dichotomy: bool,

    /// Keep like terms of sums separate instead of merging their coefficients.
    pub freeze_merge: bool,

    /// Respect non-commuting factors when ordering products. When disabled, every pair of
    /// factors is assumed to commute.
    pub check_commutations: bool,

    /// The maximum number of factor pairings tried when comparing expressions up to dummy
    /// renaming.
    pub permutation_limit: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            dummy_comparison: false,
            avoid_duplicates: true,
            use_dichotomy: true,
            freeze_merge: false,
            check_commutations: true,
            permutation_limit: 100_000,
        }
    }
}

thread_local! {
    static OPTIONS: Cell<Options> = Cell::new(Options::default());
}

/// Returns the options active on this thread.
pub fn get() -> Options {
    OPTIONS.with(Cell::get)
}

/// Applies `change` to the options of this thread until the returned guard is dropped.
///
/// The guard only restores the options that `change` modified, so guards changing different
/// options can be dropped in any order. Guards changing the same option restore it correctly
/// only when dropped in reverse order of creation.
#[must_use = "the options are restored as soon as the guard is dropped"]
pub fn scoped(change: impl FnOnce(&mut Options)) -> OptionsGuard {
    let previous = get();
    let mut next = previous;
    change(&mut next);
    OPTIONS.with(|options| options.set(next));
    OptionsGuard { previous, next, _not_send: PhantomData }
}

/// Restores the options it changed to the values they had when it was created.
#[derive(Debug)]
pub struct OptionsGuard {
    previous: Options,
    next: Options,

    // the guard restores a thread-local, so it must be dropped on the thread that created it
    _not_send: PhantomData<*const ()>,
}

/// Copies into `current` the fields of `previous` that differ from `next`.
macro_rules! restore_changed {
    ($current:ident, $previous:expr, $next:expr, $($field:ident),* $(,)?) => {
        $(
            if $previous.$field != $next.$field {
                $current.$field = $previous.$field;
            }
        )*
    };
}

impl Drop for OptionsGuard {
    fn drop(&mut self) {
        let mut current = get();
        restore_changed!(
            current,
            self.previous,
            self.next,
            dummy_comparison,
            avoid_duplicates,
            use_dichotomy,
            freeze_merge,
            check_commutations,
            permutation_limit,
        );
        OPTIONS.with(|options| options.set(current));
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use super::*;

    #[test]
    fn nested_guards_restore_in_order() {
        let outer = scoped(|o| o.dummy_comparison = true);
        {
            let _inner = scoped(|o| {
                o.dummy_comparison = true;
                o.permutation_limit = 3;
            });
            assert_eq!(get().permutation_limit, 3);
            assert!(get().dummy_comparison);
        }
        assert!(get().dummy_comparison);
        assert_eq!(get().permutation_limit, 100_000);
        drop(outer);
        assert_eq!(get(), Options::default());
    }

    #[test]
    fn guards_dropped_out_of_order_keep_each_other() {
        let comparison = scoped(|o| o.dummy_comparison = true);
        let limit = scoped(|o| o.permutation_limit = 7);
        drop(comparison);
        assert!(!get().dummy_comparison);
        assert_eq!(get().permutation_limit, 7);
        drop(limit);
        assert_eq!(get(), Options::default());
    }

    #[test]
    fn restored_on_panic() {
        let result = std::panic::catch_unwind(|| {
            let _guard = scoped(|o| o.check_commutations = false);
            panic!("inside scope");
        });
        assert!(result.is_err());
        assert!(get().check_commutations);
    }
}
