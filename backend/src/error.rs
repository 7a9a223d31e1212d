//! Error types for the petmap pipeline.
//!
//! One enum per stage, converted upwards with `From` so `?` works across
//! stage boundaries:
//!
//! - [`LoadError`] - reading and validating the trade statistics file
//! - [`SelectionError`] - reporting countries requested by the user
//! - [`AggregateError`] - per-partner sums
//! - [`RenderError`] - figure and page generation
//! - [`PipelineError`] - top-level orchestration
//! - [`ServerError`] - HTTP layer
//! - [`ConfigError`] - environment configuration

use std::path::PathBuf;

use thiserror::Error;

// =============================================================================
// Load Errors
// =============================================================================

/// Errors while loading the dataset. All of them are fatal: there is no
/// partial dataset to fall back to.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Failed to read the source file.
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The workbook could not be opened or decoded.
    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::Error),

    /// The CSV reader rejected the content.
    #[error("Invalid CSV format: {0}")]
    Csv(#[from] csv::Error),

    /// The expected sheet is not in the workbook.
    #[error("Sheet '{sheet}' not found (available: {})", available.join(", "))]
    MissingSheet {
        sheet: String,
        available: Vec<String>,
    },

    /// A required column is absent from the header row.
    #[error("Missing column: {0}")]
    MissingColumn(String),

    /// The sheet or file has no header row.
    #[error("Source is empty: {}", .0.display())]
    EmptySource(PathBuf),

    /// A numeric cell holds a number too large for an exact decimal.
    #[error("Value out of range in column '{column}', data row {row}: {value}")]
    NumberOutOfRange {
        column: &'static str,
        row: usize,
        value: String,
    },
}

// =============================================================================
// Selection Errors
// =============================================================================

/// Errors in a user-provided selection of reporting countries.
#[derive(Debug, Error)]
pub enum SelectionError {
    /// The country never appears as a reporter in the dataset.
    #[error("Unknown reporting country: {0}")]
    UnknownCountry(String),
}

// =============================================================================
// Aggregate Errors
// =============================================================================

/// Errors while summing the trade flows of one partner.
#[derive(Debug, Error)]
pub enum AggregateError {
    /// A running sum left the exact decimal range.
    #[error("Quantity or value overflow for {country} / {partner}")]
    Overflow { country: String, partner: String },
}

// =============================================================================
// Render Errors
// =============================================================================

/// Errors while producing the map figure or page.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Figure serialization failed.
    #[error("Figure serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level error returned by [`crate::transform::pipeline`].
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    #[error("Selection error: {0}")]
    Selection(#[from] SelectionError),

    #[error("Aggregation error: {0}")]
    Aggregate(#[from] AggregateError),
}

// =============================================================================
// Server Errors
// =============================================================================

/// HTTP server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Pipeline error.
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Invalid request.
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Server internal error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<LoadError> for ServerError {
    fn from(err: LoadError) -> Self {
        ServerError::Pipeline(err.into())
    }
}

// =============================================================================
// Config Errors
// =============================================================================

/// Errors in environment configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: '{value}'")]
    InvalidValue { key: String, value: String },
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for load operations.
pub type LoadResult<T> = Result<T, LoadError>;

/// Result type for aggregation.
pub type AggregateResult<T> = Result<T, AggregateError>;

/// Result type for render operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;
