//! Error types with rich diagnostics using miette
//!
//! Only `ReadError` and `OptionsError` abort a translation. Everything the
//! classifier or generator trips over degrades into an inline comment, so
//! `ExprError` is carried around as a value and rendered into the output.

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

// ============================================================================
// Document Errors
// ============================================================================

/// Errors that occur while reading the construction document
#[derive(Error, Diagnostic, Debug)]
pub enum ReadError {
    #[error("malformed construction XML at byte {position}: {message}")]
    #[diagnostic(code(geotikz::read::malformed_xml))]
    Xml { message: String, position: usize },

    #[error("no <construction> node found")]
    #[diagnostic(
        code(geotikz::read::missing_construction),
        help("export the construction as geogebra.xml, or unpack the .ggb archive first")
    )]
    MissingConstruction,
}

// ============================================================================
// Options Errors
// ============================================================================

/// Errors from validating the options record at the translation entry point
#[derive(Error, Diagnostic, Debug, PartialEq)]
pub enum OptionsError {
    #[error("{field} must be a finite number, got {value}")]
    #[diagnostic(code(geotikz::options::not_finite))]
    NotFinite { field: &'static str, value: f64 },

    #[error("empty viewport on the {axis} axis: min {min} is not below max {max}")]
    #[diagnostic(code(geotikz::options::empty_viewport))]
    EmptyViewport { axis: &'static str, min: f64, max: f64 },

    #[error("{field} must not be negative, got {value}")]
    #[diagnostic(code(geotikz::options::negative))]
    Negative { field: &'static str, value: f64 },

    #[error("{field} must be positive, got {value}")]
    #[diagnostic(code(geotikz::options::not_positive))]
    NotPositive { field: &'static str, value: f64 },

    #[error("{field} must lie in [0, 1], got {value}")]
    #[diagnostic(code(geotikz::options::out_of_unit_range))]
    OutOfUnitRange { field: &'static str, value: f64 },
}

// ============================================================================
// Expression Errors
// ============================================================================

/// Errors from parsing or rewriting an expression string
#[derive(Error, Diagnostic, Debug)]
pub enum ExprError {
    #[error("cannot parse expression: {message}")]
    #[diagnostic(code(geotikz::expr::syntax))]
    Syntax {
        message: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("here")]
        span: SourceSpan,
    },

    #[error("unsupported function `{name}`")]
    #[diagnostic(
        code(geotikz::expr::unsupported_function),
        help("only elementary functions have a pgfmath counterpart")
    )]
    UnsupportedFunction { name: String },

    #[error("unknown identifier `{name}`")]
    #[diagnostic(code(geotikz::expr::unknown_identifier))]
    UnknownIdentifier { name: String },

    #[error("expression is not a polynomial of degree two in x and y")]
    #[diagnostic(code(geotikz::expr::not_quadratic))]
    NotQuadratic,

    #[error("malformed expression: {what}")]
    #[diagnostic(code(geotikz::expr::malformed))]
    Malformed { what: &'static str },

    #[error("function references nest deeper than {depth} levels")]
    #[diagnostic(code(geotikz::expr::too_deep))]
    TooDeep { depth: usize },
}

// ============================================================================
// Public entry point errors
// ============================================================================

/// Errors that abort a translation
#[derive(Error, Diagnostic, Debug)]
pub enum TranslateError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Read(#[from] ReadError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Options(#[from] OptionsError),
}
