use ariadne::Fmt;
use csl_attrs::ErrorKind;
use csl_error::{ErrorKind, EXPR};

/// An operation received a node of the wrong kind.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = format!("expected {}, found {}", self.expected, self.found),
    labels = [format!("this is {}", self.found)],
)]
pub struct TypeMismatch {
    /// Description of what the operation accepts.
    pub expected: &'static str,

    /// Description of what it was given.
    pub found: &'static str,
}

/// Replacement lists of different lengths were given.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = "cannot replace: the lists of targets and replacements have different lengths",
    labels = ["in this expression"],
    help = format!("{} target(s) were given for {} replacement(s)", self.from, self.to),
)]
pub struct SizeMismatch {
    /// The number of targets.
    pub from: usize,

    /// The number of replacements.
    pub to: usize,
}

/// An index structure has the wrong number of indices.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = "wrong number of indices",
    labels = ["this expression"],
    help = format!("expected {} free index(es), found {}", self.expected, self.given),
)]
pub struct IndexArityMismatch {
    /// The number of indices that were expected.
    pub expected: usize,

    /// The number of indices that were given.
    pub given: usize,
}

/// An index was placed on a slot of another vector space.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = format!("index `{}` lives in space `{}`", self.index, self.found),
    labels = ["this expression"],
    help = format!("this slot expects an index of space `{}`", (&self.expected).fg(EXPR)),
)]
pub struct IndexSpaceMismatch {
    /// The name of the offending index.
    pub index: String,

    /// The space of the slot.
    pub expected: String,

    /// The space of the index.
    pub found: String,
}

/// The terms of a sum do not carry the same free indices.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = "the terms of this sum do not have the same free indices",
    labels = ["this sum"],
    help = format!("expected free indices ({}), found ({})", self.expected, self.found),
)]
pub struct FreeIndexMismatch {
    /// The free indices of the first indexed term.
    pub expected: String,

    /// The free indices of the offending term.
    pub found: String,
}

/// No abbreviation with the given name exists.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = format!("the abbreviation `{}` does not exist", self.name),
    labels = ["this name"],
    help = if self.suggestions.is_empty() {
        "abbreviations are named after their bucket, such as `Ab` or `Ab_0001`".to_string()
    } else if self.suggestions.len() == 1 {
        format!("did you mean `{}`?", (&*self.suggestions[0]).fg(EXPR))
    } else {
        format!(
            "did you mean one of these abbreviations? {}",
            self.suggestions
                .iter()
                .map(|s| format!("`{}`", s.fg(EXPR)))
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
)]
pub struct AbbreviationNotFound {
    /// The name that was looked up.
    pub name: String,

    /// Existing abbreviations with a similar name.
    pub suggestions: Vec<String>,
}

/// `unlock` was called with an id that has no active lock.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = format!("there is no active lock with id {}", self.id),
    labels = ["while unlocking this expression"],
)]
pub struct UnknownLock {
    /// The id that was given.
    pub id: u32,
}

/// The derivative of the expression cannot be computed symbolically.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = "cannot differentiate this expression",
    labels = ["this expression"],
    help = format!("{} has no symbolic derivative", self.what),
)]
pub struct UnsupportedDerivative {
    /// Description of the node that could not be differentiated.
    pub what: &'static str,
}
