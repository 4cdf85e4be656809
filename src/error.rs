//! Rich diagnostic error types for the mismatch pipeline.
//!
//! Each stage defines its own error type with miette `#[diagnostic]` derives,
//! giving an error code and help text so a failed run says which file, column
//! or row count was at fault and what to do about it. Line-level parse
//! problems are never errors: the parsers skip what they do not recognize.

use miette::Diagnostic;
use thiserror::Error;

/// Top-level error type for the pipeline.
#[derive(Debug, Error, Diagnostic)]
pub enum MismatchError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Capture(#[from] CaptureError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Table(#[from] TableError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Eval(#[from] EvalError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] crate::config::ConfigError),

    #[error("I/O error on {path}: {source}")]
    #[diagnostic(
        code(ospf::io),
        help("Check that the path exists and that you have read/write permission.")
    )]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid topology document {path}: {message}")]
    #[diagnostic(
        code(ospf::json),
        help(
            "The per-topology JSON document could not be read. Regenerate it with \
             `ospf-mismatch build` for that topology."
        )
    )]
    Json { path: String, message: String },
}

pub type MismatchResult<T> = std::result::Result<T, MismatchError>;

// ---------------------------------------------------------------------------
// Capture errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum CaptureError {
    #[error("capture for {router} missing: `{command}` ({path})")]
    #[diagnostic(
        code(ospf::capture::missing),
        help(
            "Every router needs all six command captures. Re-run the collector for \
             this router, or drop it from the `routers` list in the config."
        )
    )]
    Missing {
        router: String,
        command: String,
        path: String,
    },

    #[error("failed to read capture {path}")]
    #[diagnostic(
        code(ospf::capture::read),
        help("The capture file exists but could not be read as UTF-8 text.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub type CaptureResult<T> = std::result::Result<T, CaptureError>;

// ---------------------------------------------------------------------------
// Table errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum TableError {
    #[error("required column \"{column}\" missing from {source_name}")]
    #[diagnostic(
        code(ospf::table::missing_column),
        help(
            "The table was not produced by this tool or was produced by an earlier \
             stage. Regenerate it; row alignment cannot be established without \
             this column."
        )
    )]
    MissingColumn { column: String, source_name: String },

    #[error("{source_name} line {line}: column \"{column}\" has invalid value \"{value}\"")]
    #[diagnostic(
        code(ospf::table::invalid_value),
        help("Expected a number, `true`/`false`, or `none` for an absent value.")
    )]
    InvalidValue {
        source_name: String,
        line: usize,
        column: String,
        value: String,
    },

    #[error("{source_name} line {line}: expected {expected} fields, found {found}")]
    #[diagnostic(
        code(ospf::table::ragged_row),
        help("Every row must have as many fields as the header.")
    )]
    RaggedRow {
        source_name: String,
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("{source_name} has no header line")]
    #[diagnostic(code(ospf::table::empty), help("The file is empty."))]
    Empty { source_name: String },
}

pub type TableResult<T> = std::result::Result<T, TableError>;

// ---------------------------------------------------------------------------
// Evaluation errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum EvalError {
    #[error(
        "row count differs after filtering to topologies {min}..={max}: \
         ground truth has {truth}, predictions have {predicted}"
    )]
    #[diagnostic(
        code(ospf::eval::shape),
        help(
            "Both tables must come from the same cleaned datasets. Rebuild the \
             ground-truth table and the labeled datasets from the same captures."
        )
    )]
    Shape {
        min: u32,
        max: u32,
        truth: usize,
        predicted: usize,
    },

    #[error(
        "row {row} is misaligned on {column}: ground truth has \"{truth}\", \
         predictions have \"{predicted}\""
    )]
    #[diagnostic(
        code(ospf::eval::alignment),
        help(
            "After sorting by (topology, router_a, router_b) both tables must list \
             the same links in the same order. A link present in only one table \
             usually means one side was cleaned differently."
        )
    )]
    Alignment {
        row: usize,
        column: &'static str,
        truth: String,
        predicted: String,
    },
}

pub type EvalResult<T> = std::result::Result<T, EvalError>;
