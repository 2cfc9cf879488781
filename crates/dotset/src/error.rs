//! Error types for the dotset crate.

use thiserror::Error;

/// Errors that can occur when compiling a path expression.
///
/// Navigation never fails: a missing key, index or attribute is reported as
/// absence (`None` or an empty result), not as an error.
#[derive(Debug, Error)]
pub enum DotsetError {
    /// The path expression has unbalanced or misplaced condition syntax.
    #[error("malformed path '{path}' at byte {position}: {reason}")]
    MalformedPath {
        path: String,
        position: usize,
        reason: &'static str,
    },

    /// A `/.../` operand in a condition is not a valid regular expression.
    #[error("invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: PatternError,
    },
}

/// Why a `/body/flags` operand was rejected.
#[derive(Debug, Error)]
pub enum PatternError {
    #[error(transparent)]
    Syntax(#[from] regex::Error),

    #[error("unknown flag '{0}'")]
    UnknownFlag(char),
}

impl DotsetError {
    pub(crate) fn malformed(path: &str, position: usize, reason: &'static str) -> Self {
        DotsetError::MalformedPath {
            path: path.to_string(),
            position,
            reason,
        }
    }
}

/// Result type for dotset operations.
pub type Result<T> = std::result::Result<T, DotsetError>;
