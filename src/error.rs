//src/error.rs

use thiserror::Error;

use crate::types::Classifier;

/// Everything that can stop a classifier pipeline or the whole run.
#[derive(Error, Debug)]
pub enum FilterError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A report row whose indentation has no parent at the level above it.
    #[error("Malformed Kraken-style report at line {line}: {reason}")]
    MalformedReport { line: usize, reason: String },

    /// A results table missing a required column or holding a bad value.
    #[error("Malformed classification results at line {line}: {reason}")]
    MalformedResults { line: usize, reason: String },

    #[error("Results for {0} were already added")]
    DuplicateClassifier(Classifier),

    #[error("No classifier results available; at least one classifier is required")]
    NoClassifierResults,

    #[error("Read extraction failed: {0}")]
    ExtractionFailed(String),

    #[error("You must have \"{0}\" installed to run this program!")]
    MissingTool(String),
}
