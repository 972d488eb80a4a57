//! Properties that involve several modules, checked on hand-written and randomly built
//! expressions.

use crate::{numeric::Number, primitive::rational};
use pretty_assertions::assert_eq;
use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};
use std::{cmp::Ordering, rc::Rc};
use super::*;

/// Builds random non-indexed expressions from a small set of leaves.
struct Generator {
    rng: StdRng,
    leaves: Vec<Expr>,
}

impl Generator {
    fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            leaves: vec![variable("x"), variable("y"), constant("a"), constant("b")],
        }
    }

    fn leaf(&mut self) -> Expr {
        match self.rng.gen_range(0..6) {
            0 => Expr::number(self.rng.gen_range(-3i64..=3)),
            1 => match rational(self.rng.gen_range(1i64..=3), 2) {
                Some(r) => Expr::number(r),
                None => Expr::one(),
            },
            _ => {
                let k = self.rng.gen_range(0..self.leaves.len());
                self.leaves[k].clone()
            },
        }
    }

    fn children(&mut self, depth: u32) -> Vec<Expr> {
        let n = self.rng.gen_range(2..=3);
        (0..n).map(|_| self.expr(depth - 1)).collect()
    }

    fn expr(&mut self, depth: u32) -> Expr {
        if depth == 0 {
            return self.leaf();
        }
        match self.rng.gen_range(0..7) {
            0 | 1 => {
                let children = self.children(depth);
                sum(children, false)
            },
            2 | 3 => {
                let children = self.children(depth);
                prod(children, false)
            },
            4 => {
                let exponent = Expr::number(self.rng.gen_range(-2i64..=3));
                pow(self.expr(depth - 1), exponent)
            },
            5 => cos(self.expr(depth - 1)),
            _ => self.leaf(),
        }
    }
}

#[test]
fn ordering_is_a_strict_weak_order() {
    let mut generator = Generator::new(0x5eed);
    for _ in 0..300 {
        let a = generator.expr(3);
        let b = generator.expr(3);
        let c = generator.expr(3);
        assert!(test_simplification_rule(&a, &b, &c), "{}, {}, {}", a, b, c);
        assert!(!is_simpler(&a, &a));

        let ab = compare(&a, &b);
        assert_eq!(ab, compare(&b, &a).reverse());
    }
}

/// Builds random products of tensors whose indices are contracted in pairs, with dummy names
/// drawn at random.
struct IndexedGenerator {
    rng: StdRng,
    minko: Rc<Space>,
    vector: Rc<Parent>,
    matrix: Rc<Parent>,
}

impl IndexedGenerator {
    fn new(seed: u64) -> Self {
        let minko = Space::new("Minko", 4, true);
        Self {
            rng: StdRng::seed_from_u64(seed),
            vector: Parent::tensor("A", vec![minko.clone()]).build(),
            matrix: Parent::tensor("X", vec![minko.clone(), minko.clone()]).build(),
            minko,
        }
    }

    fn expr(&mut self) -> Expr {
        let parents = (0..self.rng.gen_range(2..=3))
            .map(|_| if self.rng.gen_bool(0.5) { self.vector.clone() } else { self.matrix.clone() })
            .collect::<Vec<_>>();
        let slots = parents.iter().map(|parent| parent.spaces().len()).sum::<usize>();

        let mut names = vec!["mu", "nu", "rho", "sigma", "alpha", "beta"];
        names.shuffle(&mut self.rng);
        let mut positions = (0..slots).collect::<Vec<_>>();
        positions.shuffle(&mut self.rng);

        // consecutive positions are contracted, and an odd one out carries a free index
        let mut indices = vec![self.minko.index("lambda"); slots];
        for (pair, name) in positions.chunks(2).zip(&names) {
            if let [first, second] = pair {
                let index = self.minko.index(name);
                let (up, down) = if self.rng.gen_bool(0.5) { (*first, *second) } else { (*second, *first) };
                indices[down] = index.flipped();
                indices[up] = index;
            }
        }

        let mut indices = indices.into_iter();
        let mut factors = parents
            .iter()
            .map(|parent| {
                let own = indices.by_ref().take(parent.spaces().len()).collect();
                parent.at(own).unwrap()
            })
            .collect::<Vec<_>>();
        match self.rng.gen_range(0..3) {
            0 => factors.push(Expr::number(self.rng.gen_range(2i64..=3))),
            1 => factors.push(variable("x")),
            _ => {},
        }
        prod(factors, false)
    }
}

#[test]
fn dummy_ordering_is_a_strict_weak_order() {
    let mut generator = IndexedGenerator::new(0xd0d0);
    let _scope = dummy_scope();
    for _ in 0..100 {
        let a = generator.expr();
        let b = generator.expr();
        let renamed = rename_dummies(&a);
        assert_eq!(compare(&a, &renamed), Ordering::Equal, "{} and {}", a, renamed);
        assert!(test_simplification_rule(&a, &b, &renamed), "{}, {}, {}", a, b, renamed);

        let c = generator.expr();
        assert!(test_simplification_rule(&a, &b, &c), "{}, {}, {}", a, b, c);
        assert!(test_simplification_rule(&a, &variable("x"), &c));
    }
}

#[test]
fn recanonicalization_is_a_no_op() {
    let mut generator = Generator::new(42);
    for _ in 0..300 {
        let e = generator.expr(3);
        let children = e.children().into_iter().cloned().collect::<Vec<_>>();
        match e.kind() {
            ExprKind::Sum(_) => {
                assert_eq!(structural_compare(&sum(children, false), &e), Ordering::Equal, "{}", e);
            },
            ExprKind::Prod(_) => {
                assert_eq!(structural_compare(&prod(children, false), &e), Ordering::Equal, "{}", e);
            },
            _ => {},
        }
    }
}

#[test]
fn random_expressions_are_canonical() {
    let mut generator = Generator::new(7);
    for _ in 0..300 {
        let e = generator.expr(4);
        assert!(check_validity(&e), "{}", e);
    }
}

#[test_log::test]
fn lock_round_trip() {
    let mut generator = Generator::new(1234);
    let x = variable("x");
    for id in 0..100 {
        let session = Session::new();
        let e = generator.expr(3);
        let locked = lock(&session, &e, id, |node| node.depends_on(&x));
        let unlocked = unlock(&session, &locked, id).unwrap();
        assert_eq!(unlocked, e, "locked as {}", locked);
    }
}

#[test]
fn numeric_folding() {
    let x = variable("x");
    let n = |k: i64| Expr::number(k);

    assert_eq!(sum(vec![n(2), n(3), x.clone()], false), sum(vec![n(5), x.clone()], false));
    assert_eq!(
        sum(vec![x.clone(), n(2), x.clone()], false),
        sum(vec![n(2), prod(vec![n(2), x.clone()], false)], false),
    );
    assert_eq!(prod(vec![n(2), x.clone(), n(3)], false), prod(vec![n(6), x.clone()], false));
}

#[test]
fn identities() {
    let x = variable("x");

    assert_eq!(sum(vec![Expr::zero(), x.clone()], false), x);
    assert_eq!(prod(vec![Expr::one(), x.clone()], false), x);
    assert_eq!(prod(vec![Expr::zero(), x.clone()], false), Expr::zero());
    assert_eq!(sum(vec![], false), Expr::zero());
    assert_eq!(prod(vec![], false), Expr::one());
}

#[test]
fn power_special_cases() {
    let x = variable("x");

    assert_eq!(pow(x.clone(), Expr::zero()), Expr::one());
    assert!(pow(Expr::zero(), Expr::zero()).is_undefined());
    assert_eq!(pow(x.clone(), Expr::one()), x);
    assert_eq!(pow(pow(x.clone(), Expr::number(2)), Expr::number(3)), pow(x, Expr::number(6)));
}

#[test]
fn contraction_pairing_ignores_order_and_names() {
    let minko = Space::new("Minko", 4, true);
    let t = Parent::tensor("T", vec![minko.clone(), minko.clone()]).build();
    let (mu, nu) = (minko.index("mu"), minko.index("nu"));
    let (alpha, beta) = (minko.index("alpha"), minko.index("beta"));

    // T(mu, nu) T(-nu, -mu) against T(-beta, -alpha) T(alpha, beta)
    let a = prod(vec![
        t.at(vec![mu.clone(), nu.clone()]).unwrap(),
        t.at(vec![nu.flipped(), mu.flipped()]).unwrap(),
    ], false);
    let b = prod(vec![
        t.at(vec![beta.flipped(), alpha.flipped()]).unwrap(),
        t.at(vec![alpha.clone(), beta.clone()]).unwrap(),
    ], false);
    assert!(hard_comparison(&a, &b));

    let _scope = dummy_scope();
    assert_eq!(compare(&a, &b), Ordering::Equal);
}

#[test]
fn abbreviations_are_shared_up_to_dummies() {
    let session = Session::new();
    let minko = Space::new("Minko", 4, true);
    let p = Parent::tensor("p", vec![minko.clone()]).build();
    let q = Parent::tensor("q", vec![minko.clone()]).build();
    let (mu, nu) = (minko.index("mu"), minko.index("nu"));
    let m = constant("m");

    let dot = |i: &Index| prod(vec![p.at(vec![i.clone()]).unwrap(), q.at(vec![i.flipped()]).unwrap()], false);
    let first = session.make_abbreviation("Ab", &sum(vec![dot(&mu), m.clone()], false), false);
    let second = session.make_abbreviation("Ab", &sum(vec![dot(&nu), m], false), false);

    let (Some(first), Some(second)) = (first.parent(), second.parent()) else {
        panic!("expected abbreviations, found `{}` and `{}`", first, second);
    };
    assert!(Rc::ptr_eq(first, second));
    assert_eq!(session.abbreviations("Ab").len(), 1);
}

#[test]
fn renaming_an_index_avoids_capture() {
    let minko = Space::new("Minko", 4, true);
    let a = Parent::tensor("A", vec![minko.clone()]).build();
    let b = Parent::tensor("B", vec![minko.clone()]).build();
    let c = Parent::tensor("C", vec![minko.clone()]).build();
    let (mu, nu, rho) = (minko.index("mu"), minko.index("nu"), minko.index("rho"));

    // A(mu) B(nu) C(-nu) with mu renamed to nu is A(nu) B(rho) C(-rho)
    let e = prod(vec![
        a.at(vec![mu.clone()]).unwrap(),
        b.at(vec![nu.clone()]).unwrap(),
        c.at(vec![nu.flipped()]).unwrap(),
    ], false);
    let renamed = replace_index(&e, &mu, &nu).unwrap();
    let expected = prod(vec![
        a.at(vec![nu.clone()]).unwrap(),
        b.at(vec![rho.clone()]).unwrap(),
        c.at(vec![rho.flipped()]).unwrap(),
    ], false);
    assert_eq!(renamed.free_indices(), vec![nu]);
    assert!(hard_comparison(&renamed, &expected));
}

#[test]
fn like_terms_merge() {
    let e = sum(vec![Expr::number(2), variable("x"), Expr::number(3), variable("x")], false);
    let ExprKind::Sum(terms) = e.kind() else {
        panic!("expected a sum, found `{}`", e);
    };
    assert_eq!(terms.len(), 2);
    assert_eq!(terms[0].as_number(), Some(&Number::from(5)));
    assert_eq!(terms[1], prod(vec![Expr::number(2), variable("x")], false));
    assert_eq!(e.to_string(), "5 + 2 * x");
}

#[test]
fn inverse_cancels() {
    let x = variable("x");
    let e = prod(vec![pow(x.clone(), Expr::minus_one()), x], false);
    assert_eq!(e, Expr::one());
}
