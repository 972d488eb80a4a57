use crate::error::{kind::UnknownLock, on, Error};
use log::debug;
use super::{
    super::{
        algebra::{derivative, integral, is_commutable, prod, sum},
        evaluate::{evaluate, EvalMode},
        expr::{Expr, ExprKind},
    },
    Session,
};

/// Hides the uninteresting parts of `expr` behind abbreviations, until [`unlock`] is called with
/// the same `id`.
///
/// Every maximal sub-expression in which `predicate` holds nowhere is replaced by an
/// abbreviation. The lockable terms of a sum (or factors of a commuting product) are gathered
/// into a single abbreviation. Inside a derivative or an integral, anything that depends on the
/// variable stays visible, since the operator still acts on it.
pub fn lock(session: &Session, expr: &Expr, id: u32, predicate: impl Fn(&Expr) -> bool) -> Expr {
    let bucket = session.register_lock(id);
    let locked = lock_rec(session, &bucket, expr, &predicate);
    debug!("locked `{}` as `{}` (lock {})", expr, locked, id);
    locked
}

fn lockable(expr: &Expr, predicate: &dyn Fn(&Expr) -> bool) -> bool {
    !expr.post_order_iter().any(predicate)
}

fn lock_rec(session: &Session, bucket: &str, expr: &Expr, predicate: &dyn Fn(&Expr) -> bool) -> Expr {
    if lockable(expr, predicate) {
        return session.make_abbreviation(bucket, expr, false);
    }

    match expr.kind() {
        ExprKind::Sum(children) => lock_partition(session, bucket, children, predicate, sum),
        ExprKind::Prod(children) if children.iter().all(is_commutable) => {
            lock_partition(session, bucket, children, predicate, prod)
        },
        ExprKind::Derivative { operand: Some(operand), variable, order } => {
            let predicate = |e: &Expr| predicate(e) || e.depends_on(variable);
            let operand = lock_rec(session, bucket, operand, &predicate);
            derivative(operand, variable.clone(), *order)
        },
        ExprKind::Integral { operand, variable, bounds } => {
            let inner = |e: &Expr| predicate(e) || e.depends_on(variable);
            let operand = lock_rec(session, bucket, operand, &inner);
            let bounds = bounds.as_ref().map(|(lower, upper)| (
                lock_rec(session, bucket, lower, predicate),
                lock_rec(session, bucket, upper, predicate),
            ));
            integral(operand, variable.clone(), bounds)
        },
        _ => expr.map_children(|child| lock_rec(session, bucket, child, predicate)),
    }
}

/// Gathers the lockable children into one abbreviation, and locks the others recursively.
fn lock_partition(
    session: &Session,
    bucket: &str,
    children: &[Expr],
    predicate: &dyn Fn(&Expr) -> bool,
    rebuild: fn(Vec<Expr>, bool) -> Expr,
) -> Expr {
    let (locked, visible): (Vec<_>, Vec<_>) = children
        .iter()
        .cloned()
        .partition(|child| lockable(child, predicate));

    let mut children = Vec::with_capacity(visible.len() + 1);
    if !locked.is_empty() {
        children.push(session.make_abbreviation(bucket, &rebuild(locked, false), false));
    }
    children.extend(visible.iter().map(|child| lock_rec(session, bucket, child, predicate)));
    rebuild(children, false)
}

/// Restores the parts of `expr` hidden by [`lock`] with the same `id`, and forgets them.
///
/// Returns an error if no lock with this id is active.
pub fn unlock(session: &Session, expr: &Expr, id: u32) -> Result<Expr, Error> {
    let bucket = session.take_lock(id).ok_or_else(|| on(expr, UnknownLock { id }))?;

    session.enable_evaluation(&bucket);
    let unlocked = evaluate(expr, EvalMode::ABBREVIATION);
    session.disable_evaluation(&bucket);
    session.remove_abbreviations(&bucket);

    debug!("unlocked lock {}: `{}`", id, unlocked);
    Ok(unlocked)
}

#[cfg(test)]
mod tests {
    use crate::{error::kind::UnknownLock, symbolic::*};
    use pretty_assertions::assert_eq;

    fn mentions(var: &Expr) -> impl Fn(&Expr) -> bool + '_ {
        move |e| e == var
    }

    #[test_log::test]
    fn hides_what_the_predicate_ignores() {
        let session = Session::new();
        let x = variable("x");
        let (a, b, c) = (constant("a"), constant("b"), constant("c"));
        let e = sum(vec![
            prod(vec![a.clone(), x.clone()], false),
            b.clone(),
            cos(c.clone()),
        ], false);

        let locked = lock(&session, &e, 1, mentions(&x));
        // b + cos(c) is gathered into one abbreviation, a * x stays visible
        assert_eq!(locked.size(), 2);
        assert_eq!(session.abbreviations("Lock_1").len(), 1);
        assert!(locked.depends_on(&x));

        let unlocked = unlock(&session, &locked, 1).unwrap();
        assert_eq!(unlocked, e);
        assert!(session.abbreviations("Lock_1").is_empty());
    }

    #[test]
    fn operators_keep_their_variable_visible() {
        let session = Session::new();
        let x = variable("x");
        let y = variable("y");
        let c = constant("c");
        let e = derivative(
            prod(vec![cos(x.clone()), sin(y.clone()), cos(c.clone())], false),
            x.clone(),
            1,
        );

        // only cos(c) can be hidden: cos(x) is still differentiated
        let locked = lock(&session, &e, 2, mentions(&y));
        assert!(!locked.is_zero());
        assert!(locked.to_string().contains("cos(x)"));
        assert!(!locked.to_string().contains("cos(c)"));
        assert_eq!(session.abbreviations("Lock_2").len(), 1);
        assert_eq!(unlock(&session, &locked, 2).unwrap(), e);
    }

    #[test]
    fn unknown_lock() {
        let session = Session::new();
        let x = variable("x");
        let err = unlock(&session, &x, 7).unwrap_err();
        assert!(err.is::<UnknownLock>());
    }
}
