//! Contains the common [`ErrorKind`] trait used by all errors raised by the symbolic engine.
//!
//! Errors in `csl` are contract violations (wrong node kind, mismatched index structures,
//! missing abbreviations, ...). There is no source file to point into, so the "source" of an
//! [`Error`] is the printed form of the expression that caused it. Reports built from an
//! [`Error`] highlight that text.

// lets `#[derive(ErrorKind)]` refer to `csl_error::EXPR` from inside this crate
extern crate self as csl_error;

use ariadne::{Color, Report, Source};
use std::{any::Any, fmt::{self, Debug, Display}, ops::Range};

/// The color to use to highlight expressions.
pub const EXPR: Color = Color::RGB(52, 235, 152);

/// Represents any kind of error that can occur during some operation.
pub trait ErrorKind: Debug + Any {
    /// Builds the report for this error.
    fn build_report<'a>(
        &self,
        src_id: &'a str,
        spans: &[Range<usize>],
    ) -> Report<(&'a str, Range<usize>)>;

    /// The one-line message of this error, without any labels.
    fn message(&self) -> String;

    /// Returns `self` as [`Any`], so callers can inspect the concrete kind.
    fn as_any(&self) -> &dyn Any;
}

/// An error raised on some expression, carrying the printed expression and the regions of it
/// to highlight.
#[derive(Debug)]
pub struct Error {
    /// The printed form of the offending expression.
    pub source: String,

    /// The regions of `source` that this error points at.
    pub spans: Vec<Range<usize>>,

    /// The kind of error that occurred.
    pub kind: Box<dyn ErrorKind>,
}

impl Error {
    /// Creates a new error with the given source text, spans and kind.
    pub fn new(source: impl Into<String>, spans: Vec<Range<usize>>, kind: impl ErrorKind) -> Self {
        Self { source: source.into(), spans, kind: Box::new(kind) }
    }

    /// Creates a new error whose single span covers the whole source text.
    pub fn on(source: impl Into<String>, kind: impl ErrorKind) -> Self {
        let source = source.into();
        let span = 0..source.len();
        Self::new(source, vec![span], kind)
    }

    /// Returns true if the error is of the given kind.
    pub fn is<K: ErrorKind>(&self) -> bool {
        self.kind.as_any().is::<K>()
    }

    /// Returns the kind of the error if it is of the given type.
    pub fn downcast_ref<K: ErrorKind>(&self) -> Option<&K> {
        self.kind.as_any().downcast_ref::<K>()
    }

    /// Build a report from this error kind.
    pub fn build_report<'a>(&self, src_id: &'a str) -> Report<(&'a str, Range<usize>)> {
        self.kind.build_report(src_id, &self.spans)
    }

    /// Prints the report to standard error.
    pub fn report_to_stderr(&self, src_id: &str) -> std::io::Result<()> {
        self.build_report(src_id).eprint((src_id, Source::from(&self.source)))
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (in `{}`)", self.kind.message(), self.source)
    }
}

impl std::error::Error for Error {}
