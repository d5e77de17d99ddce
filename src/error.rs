//! Error types for evaluation callbacks.

use thiserror::Error;

/// Evaluation errors
///
/// Two kinds exist: configuration errors, raised once at callback
/// construction, and type/shape errors, raised while an epoch-end pass
/// is running. Neither is retried internally; epoch-end failures abort
/// that epoch's evaluation and propagate to the caller.
#[derive(Debug, Error)]
pub enum Error {
    /// An unbatched dataset was supplied without a positive batch size
    #[error("a positive batch size is required for an unbatched dataset")]
    MissingBatchSize,

    /// An explicitly named label column does not exist in the dataset inputs
    #[error("label column not found in dataset inputs: {0}")]
    UnknownLabelColumn(String),

    /// No heuristic could determine where labels come from
    #[error(
        "could not determine a label source: pass label columns explicitly, \
         or supply a dataset that yields (inputs, labels) pairs"
    )]
    NoLabelSource,

    /// A named field was absent from a batch at evaluation time
    #[error("field not found in batch: {0}")]
    MissingField(String),

    /// A pair-structured dataset yielded a batch without labels
    #[error("dataset yields (inputs, labels) pairs but a batch carried no labels")]
    MissingLabels,

    /// Aggregation was attempted over an empty list of batches
    #[error("cannot aggregate an empty batch list")]
    EmptyAggregate,

    /// Batches did not share a single value kind (named / ordered / single)
    #[error("mismatched value kinds across batches: expected {expected}, found {found}")]
    MixedKinds {
        expected: &'static str,
        found: &'static str,
    },

    /// Arrays disagreed on rank, trailing dimensions, or sequence length
    #[error("incompatible array shapes: {0}")]
    ShapeMismatch(String),

    /// Generation mode was requested from a model without a generate pass
    #[error("generation mode requested but the model does not support generation")]
    GenerationUnsupported,

    /// The metric function did not return a name-to-number mapping
    #[error("metric function must return a name-to-number mapping, got {0}")]
    MetricResult(String),

    /// Array concatenation failed inside ndarray
    #[error("array concatenation failed: {0}")]
    Concat(#[from] ndarray::ShapeError),
}

impl Error {
    /// Whether this error is a construction-time configuration error
    /// (as opposed to a type/shape error raised during an epoch-end pass).
    #[must_use]
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Error::MissingBatchSize | Error::UnknownLabelColumn(_) | Error::NoLabelSource
        )
    }
}

/// Result type for evaluation operations
pub type Result<T> = std::result::Result<T, Error>;
