//! Epoch-end metric evaluation for training loops
//!
//! This crate provides the evaluation side of a training loop:
//! - A callback system with train/epoch/step hooks and a mutable epoch
//!   log record (`callback`)
//! - An epoch-end evaluation callback that drives a model over a
//!   held-out dataset, aggregates per-batch predictions and labels, and
//!   merges caller-computed metrics into the log record
//!   (`MetricEvalCallback`)
//! - Batch concatenation with sentinel padding for variable-length
//!   sequences (`pad`)
//! - Shape-kind-aware aggregation of mapping / sequence / single-array
//!   outputs (`aggregate`)
//! - Label-source resolution with a fixed, inspectable priority
//!   (`labels`)
//! - Sentinel-aware metric building blocks (`metrics`)
//!
//! # Example
//!
//! ```no_run
//! use evaluar::{
//!     metrics, EvalBatch, EvalConfig, EvalModel, MetricEvalCallback, Record, Values, VecDataset,
//! };
//! use ndarray::arr1;
//!
//! struct Classifier;
//!
//! impl EvalModel for Classifier {
//!     fn predict(&self, inputs: &Record) -> Values {
//!         // real models run a forward pass here
//!         Values::Single(inputs.get("input_ids").cloned().unwrap())
//!     }
//! }
//!
//! let batches = vec![
//!     EvalBatch::new(Record::new().with_field("input_ids", arr1(&[0.0_f32, 1.0]).into_dyn()))
//!         .with_labels(Values::Single(arr1(&[0.0_f32, 1.0]).into_dyn())),
//! ];
//!
//! let callback = MetricEvalCallback::new(
//!     Box::new(Classifier),
//!     Box::new(VecDataset::from_batches(batches)),
//!     metrics::accuracy_metric(-100.0),
//!     EvalConfig::default(),
//! )
//! .unwrap();
//!
//! let scores = callback.evaluate().unwrap();
//! println!("accuracy: {:.4}", scores["accuracy"]);
//! ```

pub mod aggregate;
pub mod batch;
pub mod callback;
pub mod config;
pub mod dataset;
pub mod error;
pub mod labels;
pub mod metrics;
pub mod model;
pub mod pad;

pub use aggregate::Values;
pub use batch::{EvalBatch, Record};
pub use callback::{
    CallbackAction, CallbackContext, CallbackManager, EarlyStopping, MetricEvalCallback, MetricFn,
    ProgressCallback, TrainerCallback,
};
pub use config::EvalConfig;
pub use dataset::{rebatch, EvalDataset, VecDataset};
pub use error::{Error, Result};
pub use labels::{LabelRule, LabelSpec, LABELS_FIELD, SPAN_FIELDS};
pub use metrics::{accuracy, accuracy_metric, exact_match};
pub use model::{generation_input_field, EvalModel, ATTENTION_MASK_FIELD, DEFAULT_INPUT_FIELD};
pub use pad::{concat_pad, PAD_VALUE};
