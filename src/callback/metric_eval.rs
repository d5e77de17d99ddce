//! Epoch-end metric evaluation callback
//!
//! Once per epoch-end event, drives the evaluation dataset through the
//! model's prediction (or generation) pass, aggregates the per-batch
//! predictions and labels into epoch-level arrays, invokes the
//! caller-supplied metric function once on the full arrays, and merges
//! the returned scores into the epoch's log record.

use std::collections::BTreeMap;

use serde_json::Value as Json;

use super::traits::{CallbackAction, CallbackContext, TrainerCallback};
use crate::aggregate::Values;
use crate::batch::EvalBatch;
use crate::config::EvalConfig;
use crate::dataset::{rebatch, EvalDataset};
use crate::error::{Error, Result};
use crate::labels::{LabelRule, LabelSpec};
use crate::model::{generation_input_field, EvalModel, ATTENTION_MASK_FIELD};

/// Output field always dropped from mapping predictions.
const LOSS_FIELD: &str = "loss";

/// Metric function contract: epoch-level predictions and labels in, a
/// name-to-number mapping (as a JSON object) out. Any other return
/// shape is rejected as a type error.
pub type MetricFn = dyn Fn(&Values, &Values) -> Json + Send;

/// Callback that computes metrics over a held-out dataset at each
/// epoch end.
///
/// Construction binds the callback to a fixed model, dataset, metric
/// function, and label configuration; label-source resolution happens
/// once here and never again. Each epoch-end pass runs to completion
/// or fails the epoch; no state is kept between epochs.
///
/// # Example
///
/// ```
/// use evaluar::{
///     EvalBatch, EvalConfig, EvalModel, MetricEvalCallback, Record, Values, VecDataset,
/// };
/// use ndarray::arr1;
///
/// struct Doubler;
///
/// impl EvalModel for Doubler {
///     fn predict(&self, inputs: &Record) -> Values {
///         let x = inputs.get("x").cloned().unwrap();
///         Values::Single(x * 2.0)
///     }
/// }
///
/// let batch = EvalBatch::new(Record::new().with_field("x", arr1(&[1.0_f32, 2.0]).into_dyn()))
///     .with_labels(Values::Single(arr1(&[2.0_f32, 4.0]).into_dyn()));
/// let dataset = VecDataset::from_batches(vec![batch]);
///
/// let callback = MetricEvalCallback::new(
///     Box::new(Doubler),
///     Box::new(dataset),
///     |preds, labels| {
///         let hit = preds.as_single() == labels.as_single();
///         serde_json::json!({ "exact": if hit { 1.0 } else { 0.0 } })
///     },
///     EvalConfig::default(),
/// )
/// .unwrap();
///
/// let scores = callback.evaluate().unwrap();
/// assert_eq!(scores["exact"], 1.0);
/// ```
pub struct MetricEvalCallback {
    model: Box<dyn EvalModel + Send>,
    dataset: Box<dyn EvalDataset + Send>,
    metric_fn: Box<MetricFn>,
    config: EvalConfig,
    label_spec: LabelSpec,
}

impl std::fmt::Debug for MetricEvalCallback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricEvalCallback")
            .field("config", &self.config)
            .field("label_spec", &self.label_spec)
            .finish_non_exhaustive()
    }
}

impl MetricEvalCallback {
    /// Create the callback, resolving configuration up front.
    ///
    /// Fails with a configuration error when the dataset is unbatched
    /// and no positive batch size was given, when an explicitly named
    /// label column is absent from the dataset's input fields, or when
    /// no label source can be determined.
    pub fn new<F>(
        model: Box<dyn EvalModel + Send>,
        dataset: Box<dyn EvalDataset + Send>,
        metric_fn: F,
        config: EvalConfig,
    ) -> Result<Self>
    where
        F: Fn(&Values, &Values) -> Json + Send + 'static,
    {
        if !dataset.is_batched() && config.batch_size.unwrap_or(0) == 0 {
            return Err(Error::MissingBatchSize);
        }
        let label_spec = LabelSpec::resolve(dataset.as_ref(), config.label_cols.as_deref())?;
        Ok(Self {
            model,
            dataset,
            metric_fn: Box::new(metric_fn),
            config,
            label_spec,
        })
    }

    /// Which label-source rule fired during construction.
    #[must_use]
    pub fn label_rule(&self) -> LabelRule {
        self.label_spec.rule()
    }

    /// The configuration the callback was built with.
    #[must_use]
    pub fn config(&self) -> &EvalConfig {
        &self.config
    }

    /// Run one full evaluation pass and return the metric scores.
    ///
    /// Batches are pulled sequentially; predictions and labels are
    /// collected per batch, aggregated once at the end, and handed to
    /// the metric function as a single pair of epoch-level arrays.
    pub fn evaluate(&self) -> Result<BTreeMap<String, f64>> {
        let pad = self.config.pad_value;

        let batches: Vec<EvalBatch> = if self.dataset.is_batched() {
            self.dataset.batches().collect()
        } else {
            let batch_size = self.config.batch_size.ok_or(Error::MissingBatchSize)?;
            rebatch(self.dataset.batches().collect(), batch_size, pad)?
        };

        // Fields dropped from mapping outputs when no explicit
        // allow-list was configured.
        let mut ignored = self.model.ignore_fields();
        ignored.push(LOSS_FIELD.to_string());

        let generation_field = generation_input_field(self.model.as_ref());

        let mut pred_batches = Vec::with_capacity(batches.len());
        let mut label_batches = Vec::with_capacity(batches.len());
        for batch in &batches {
            let predictions = if self.config.use_generate {
                let input_ids = batch
                    .inputs
                    .get(&generation_field)
                    .ok_or_else(|| Error::MissingField(generation_field.clone()))?;
                let attention_mask = batch.inputs.get(ATTENTION_MASK_FIELD);
                let generated = self
                    .model
                    .generate(input_ids, attention_mask)
                    .ok_or(Error::GenerationUnsupported)?;
                Values::Single(generated)
            } else {
                match self.model.predict(&batch.inputs) {
                    Values::Named(map) => Values::Named(self.filter_outputs(map, &ignored)?),
                    other => other,
                }
            };
            pred_batches.push(predictions);
            label_batches.push(self.label_spec.extract(batch)?);
        }

        let predictions = Values::concat(&pred_batches, pad)?;
        let labels = Values::concat(&label_batches, pad)?;

        metric_scores((self.metric_fn)(&predictions, &labels))
    }

    fn filter_outputs(
        &self,
        outputs: BTreeMap<String, ndarray::ArrayD<f32>>,
        ignored: &[String],
    ) -> Result<BTreeMap<String, ndarray::ArrayD<f32>>> {
        match &self.config.output_cols {
            Some(cols) => cols
                .iter()
                .map(|col| {
                    outputs
                        .get(col)
                        .cloned()
                        .map(|arr| (col.clone(), arr))
                        .ok_or_else(|| Error::MissingField(col.clone()))
                })
                .collect(),
            None => Ok(outputs
                .into_iter()
                .filter(|(name, _)| !ignored.contains(name))
                .collect()),
        }
    }
}

impl TrainerCallback for MetricEvalCallback {
    fn on_epoch_end(&mut self, ctx: &mut CallbackContext) -> Result<CallbackAction> {
        // evaluate() validates the metric result in full before this
        // merge, so a failing pass leaves the log record untouched.
        let scores = self.evaluate()?;
        ctx.logs.extend(scores);
        Ok(CallbackAction::Continue)
    }

    fn name(&self) -> &'static str {
        "MetricEvalCallback"
    }
}

/// Validate a metric function result into a name-to-number mapping.
fn metric_scores(value: Json) -> Result<BTreeMap<String, f64>> {
    let Json::Object(map) = value else {
        return Err(Error::MetricResult(json_kind(&value).to_string()));
    };
    map.into_iter()
        .map(|(name, value)| {
            value
                .as_f64()
                .map(|number| (name.clone(), number))
                .ok_or_else(|| {
                    Error::MetricResult(format!("{} value for \"{name}\"", json_kind(&value)))
                })
        })
        .collect()
}

fn json_kind(value: &Json) -> &'static str {
    match value {
        Json::Null => "null",
        Json::Bool(_) => "boolean",
        Json::Number(_) => "a bare number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}
