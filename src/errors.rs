use std::fmt;
use std::io;

/// Errors surfaced at the core boundary (spec.md, section 7).
///
/// `InvalidInput` and `InternalFailure` are fatal to the call that produced
/// them; `NoTablesFound` is not an error at all, it is folded into a
/// `FileReport` with an empty `tables` vector by the extractor.
#[derive(Debug)]
pub enum TableError {
    /// The grid was empty, or the rule catalogue is missing a rule id the
    /// engine requires.
    InvalidInput(String),
    /// Wraps an unexpected failure encountered mid-scan of one file. Carries
    /// the row the scan had reached when it failed, so callers can at least
    /// report where things went wrong.
    InternalFailure { row: usize, message: String },
    Io(io::Error),
    Json(serde_json::Error),
    Toml(String),
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TableError::InvalidInput(msg) => write!(f, "invalid input: {msg}"),
            TableError::InternalFailure { row, message } => {
                write!(f, "internal failure at row {row}: {message}")
            }
            TableError::Io(err) => err.fmt(f),
            TableError::Json(err) => err.fmt(f),
            TableError::Toml(msg) => write!(f, "invalid parameters file: {msg}"),
        }
    }
}

impl std::error::Error for TableError {}

impl From<io::Error> for TableError {
    fn from(err: io::Error) -> TableError {
        TableError::Io(err)
    }
}

impl From<serde_json::Error> for TableError {
    fn from(err: serde_json::Error) -> TableError {
        TableError::Json(err)
    }
}

pub type TableResult<T> = Result<T, TableError>;
