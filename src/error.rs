// =============================================================================
// Profiling Errors
// =============================================================================
//
// Only configuration problems are errors. Thin or degenerate data never is:
// metric functions degrade to `None` values, zero counts, or empty tables.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProfileError {
    /// A column the request depends on is not in the dataset.
    #[error("missing column `{column}`: {hint}")]
    MissingColumn { column: String, hint: String },

    /// Precomputed horizon columns have one-second granularity.
    #[error("horizon {millis}ms is not a whole number of seconds")]
    FractionalHorizon { millis: u128 },

    /// A horizon string that could not be parsed (e.g. "5 parsecs").
    #[error("invalid horizon `{0}`")]
    InvalidHorizon(String),

    /// A column whose length disagrees with the rest of the dataset.
    #[error("column `{column}` has {actual} rows, dataset has {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },
}

impl ProfileError {
    pub fn missing(column: impl Into<String>, hint: impl Into<String>) -> Self {
        Self::MissingColumn {
            column: column.into(),
            hint: hint.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ProfileError>;
