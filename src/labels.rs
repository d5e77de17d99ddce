//! Label-source resolution
//!
//! Where do labels come from? Resolved exactly once, when the
//! evaluation callback is constructed, by a fixed priority: an
//! explicit column list beats pair-structured elements, which beat a
//! literal `"labels"` field, which beats the
//! `"start_positions"`/`"end_positions"` span pair. The rule that
//! fired is recorded so callers and tests can assert on it instead of
//! parsing warning output.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::aggregate::Values;
use crate::batch::EvalBatch;
use crate::dataset::EvalDataset;
use crate::error::{Error, Result};

/// Input field treated as labels when nothing else is specified.
pub const LABELS_FIELD: &str = "labels";

/// Two-field label set used by span-extraction models.
pub const SPAN_FIELDS: [&str; 2] = ["start_positions", "end_positions"];

/// Which resolution rule decided the label source.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LabelRule {
    /// Caller named the label columns explicitly
    ExplicitColumns,
    /// Dataset yields (inputs, labels) pairs
    PairElement,
    /// Fell back to the literal `"labels"` input field
    LabelsField,
    /// Fell back to the `"start_positions"`/`"end_positions"` pair
    SpanFields,
}

/// Resolved label configuration, fixed for the callback's lifetime.
#[derive(Clone, Debug, PartialEq)]
pub struct LabelSpec {
    rule: LabelRule,
    columns: Vec<String>,
}

impl LabelSpec {
    /// Resolve the label source for a dataset.
    ///
    /// `label_cols`, when given, must name existing input fields.
    /// Without it the dataset's shape decides; a dataset with no pair
    /// structure and none of the recognized fields fails construction.
    pub fn resolve(dataset: &dyn EvalDataset, label_cols: Option<&[String]>) -> Result<Self> {
        if let Some(cols) = label_cols {
            let known = dataset.input_fields();
            for col in cols {
                if !known.contains(col) {
                    return Err(Error::UnknownLabelColumn(col.clone()));
                }
            }
            return Ok(Self {
                rule: LabelRule::ExplicitColumns,
                columns: cols.to_vec(),
            });
        }

        if dataset.yields_pairs() {
            return Ok(Self {
                rule: LabelRule::PairElement,
                columns: Vec::new(),
            });
        }

        let fields = dataset.input_fields();
        if fields.iter().any(|f| f == LABELS_FIELD) {
            eprintln!(
                "MetricEvalCallback: no label columns given, defaulting to the \"{LABELS_FIELD}\" field"
            );
            return Ok(Self {
                rule: LabelRule::LabelsField,
                columns: vec![LABELS_FIELD.to_string()],
            });
        }

        if SPAN_FIELDS.iter().all(|f| fields.iter().any(|k| k == f)) {
            eprintln!(
                "MetricEvalCallback: no label columns given, defaulting to \"{}\"/\"{}\"",
                SPAN_FIELDS[0], SPAN_FIELDS[1]
            );
            return Ok(Self {
                rule: LabelRule::SpanFields,
                columns: SPAN_FIELDS.iter().map(|f| (*f).to_string()).collect(),
            });
        }

        Err(Error::NoLabelSource)
    }

    /// The rule that fired during resolution.
    #[must_use]
    pub fn rule(&self) -> LabelRule {
        self.rule
    }

    /// Resolved label columns. Empty for pair-based labels.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Pull this batch's labels according to the fixed rule: either the
    /// named fields out of the inputs, or the pair's embedded label
    /// structure.
    pub fn extract(&self, batch: &EvalBatch) -> Result<Values> {
        match self.rule {
            LabelRule::PairElement => batch.labels.clone().ok_or(Error::MissingLabels),
            _ => {
                let mut map = BTreeMap::new();
                for col in &self.columns {
                    let arr = batch
                        .inputs
                        .get(col)
                        .ok_or_else(|| Error::MissingField(col.clone()))?;
                    map.insert(col.clone(), arr.clone());
                }
                Ok(Values::Named(map))
            }
        }
    }
}
