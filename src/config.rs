//! Evaluation configuration

use serde::{Deserialize, Serialize};

use crate::pad::PAD_VALUE;

/// Configuration for a [`MetricEvalCallback`](crate::MetricEvalCallback).
///
/// Resolved once at construction; the callback's behavior is fixed for
/// its lifetime.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EvalConfig {
    /// Batch size used to group an unbatched dataset. Required when
    /// the dataset is not pre-batched, ignored otherwise.
    pub batch_size: Option<usize>,
    /// Explicit list of input fields to treat as labels
    pub label_cols: Option<Vec<String>>,
    /// Explicit allow-list of output fields to keep as predictions
    pub output_cols: Option<Vec<String>>,
    /// Use the model's generation pass instead of direct inference
    pub use_generate: bool,
    /// Padding sentinel for ragged arrays
    pub pad_value: f32,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            batch_size: None,
            label_cols: None,
            output_cols: None,
            use_generate: false,
            pad_value: PAD_VALUE,
        }
    }
}

impl EvalConfig {
    /// Create a default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the batch size for unbatched datasets
    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = Some(batch_size);
        self
    }

    /// Name the input fields to treat as labels
    #[must_use]
    pub fn with_label_cols<I, S>(mut self, cols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.label_cols = Some(cols.into_iter().map(Into::into).collect());
        self
    }

    /// Name the output fields to keep as predictions
    #[must_use]
    pub fn with_output_cols<I, S>(mut self, cols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.output_cols = Some(cols.into_iter().map(Into::into).collect());
        self
    }

    /// Switch to generation mode
    #[must_use]
    pub fn with_generate(mut self) -> Self {
        self.use_generate = true;
        self
    }

    /// Override the padding sentinel
    #[must_use]
    pub fn with_pad_value(mut self, pad_value: f32) -> Self {
        self.pad_value = pad_value;
        self
    }
}
