//! Evaluation batch data structures

use std::collections::BTreeMap;

use ndarray::ArrayD;

use crate::aggregate::Values;
use crate::error::{Error, Result};
use crate::pad::concat_pad;

/// A structured record mapping named fields to arrays.
///
/// One record holds the input side of a batch: every field carries the
/// batch's samples along axis 0.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Record {
    fields: BTreeMap<String, ArrayD<f32>>,
}

impl Record {
    /// Create an empty record
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style field insertion
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, values: ArrayD<f32>) -> Self {
        self.insert(name, values);
        self
    }

    /// Insert a field, replacing any previous value
    pub fn insert(&mut self, name: impl Into<String>, values: ArrayD<f32>) {
        self.fields.insert(name.into(), values);
    }

    /// Look up a field by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ArrayD<f32>> {
        self.fields.get(name)
    }

    /// Whether a field exists
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Names of all fields, in sorted order
    #[must_use]
    pub fn field_names(&self) -> Vec<String> {
        self.fields.keys().cloned().collect()
    }

    /// Iterate over (name, array) pairs
    pub fn iter(&self) -> impl Iterator<Item = (&String, &ArrayD<f32>)> {
        self.fields.iter()
    }

    /// Number of fields
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the record has no fields
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Number of samples along axis 0 of the first field
    #[must_use]
    pub fn num_samples(&self) -> usize {
        self.fields
            .values()
            .next()
            .map_or(0, |a| a.shape().first().copied().unwrap_or(0))
    }
}

/// One unit yielded by dataset iteration: a record of inputs, plus a
/// separate label structure when the dataset yields (inputs, labels)
/// pairs.
#[derive(Clone, Debug, PartialEq)]
pub struct EvalBatch {
    /// Input fields
    pub inputs: Record,
    /// Labels carried alongside the inputs, if the element is a pair
    pub labels: Option<Values>,
}

impl EvalBatch {
    /// Create a batch without an embedded label structure
    #[must_use]
    pub fn new(inputs: Record) -> Self {
        Self {
            inputs,
            labels: None,
        }
    }

    /// Builder-style label attachment
    #[must_use]
    pub fn with_labels(mut self, labels: Values) -> Self {
        self.labels = Some(labels);
        self
    }

    /// Merge several elements into one batch.
    ///
    /// Fields are concatenated per name across all elements (the field
    /// set is taken from the first element), and embedded labels are
    /// aggregated the same way. Used to group an unbatched element
    /// stream into fixed-size batches.
    pub fn merge(elements: &[EvalBatch], pad: f32) -> Result<EvalBatch> {
        let first = elements.first().ok_or(Error::EmptyAggregate)?;

        let mut inputs = Record::new();
        for name in first.inputs.field_names() {
            let mut per_element = Vec::with_capacity(elements.len());
            for element in elements {
                let arr = element
                    .inputs
                    .get(&name)
                    .ok_or_else(|| Error::MissingField(name.clone()))?;
                per_element.push(arr.clone());
            }
            inputs.insert(name, concat_pad(&per_element, &pad)?);
        }

        let labels = if first.labels.is_some() {
            let per_element = elements
                .iter()
                .map(|e| e.labels.clone().ok_or(Error::MissingLabels))
                .collect::<Result<Vec<_>>>()?;
            Some(Values::concat(&per_element, pad)?)
        } else {
            None
        };

        Ok(EvalBatch { inputs, labels })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pad::PAD_VALUE;
    use ndarray::{arr1, arr2};

    #[test]
    fn test_record_fields() {
        let record = Record::new()
            .with_field("input_ids", arr2(&[[1.0_f32, 2.0]]).into_dyn())
            .with_field("attention_mask", arr2(&[[1.0_f32, 1.0]]).into_dyn());

        assert_eq!(record.len(), 2);
        assert!(record.contains("input_ids"));
        assert!(!record.contains("labels"));
        assert_eq!(record.num_samples(), 1);
        assert_eq!(
            record.field_names(),
            vec!["attention_mask".to_string(), "input_ids".to_string()]
        );
    }

    #[test]
    fn test_empty_record() {
        let record = Record::new();
        assert!(record.is_empty());
        assert_eq!(record.num_samples(), 0);
        assert_eq!(record.get("x"), None);
    }

    #[test]
    fn test_batch_with_labels() {
        let batch = EvalBatch::new(Record::new().with_field("x", arr1(&[1.0_f32]).into_dyn()))
            .with_labels(Values::Single(arr1(&[0.0_f32]).into_dyn()));

        assert!(batch.labels.is_some());
        assert_eq!(batch.inputs.num_samples(), 1);
    }

    #[test]
    fn test_merge_concatenates_fields() {
        let element = |v: f32, label: f32| {
            EvalBatch::new(Record::new().with_field("x", arr1(&[v]).into_dyn()))
                .with_labels(Values::Single(arr1(&[label]).into_dyn()))
        };

        let merged = EvalBatch::merge(&[element(1.0, 0.0), element(2.0, 1.0)], PAD_VALUE).unwrap();
        assert_eq!(
            merged.inputs.get("x"),
            Some(&arr1(&[1.0, 2.0]).into_dyn())
        );
        assert_eq!(
            merged.labels,
            Some(Values::Single(arr1(&[0.0, 1.0]).into_dyn()))
        );
    }

    #[test]
    fn test_merge_pads_ragged_fields() {
        let a = EvalBatch::new(Record::new().with_field("ids", arr2(&[[1.0_f32, 2.0]]).into_dyn()));
        let b = EvalBatch::new(
            Record::new().with_field("ids", arr2(&[[3.0_f32, 4.0, 5.0]]).into_dyn()),
        );

        let merged = EvalBatch::merge(&[a, b], PAD_VALUE).unwrap();
        let ids = merged.inputs.get("ids").unwrap();
        assert_eq!(ids.shape(), &[2, 3]);
        assert_eq!(ids[[0, 2]], PAD_VALUE);
        assert!(merged.labels.is_none());
    }

    #[test]
    fn test_merge_missing_field_fails() {
        let a = EvalBatch::new(Record::new().with_field("x", arr1(&[1.0_f32]).into_dyn()));
        let b = EvalBatch::new(Record::new().with_field("y", arr1(&[2.0_f32]).into_dyn()));

        assert!(matches!(
            EvalBatch::merge(&[a, b], PAD_VALUE),
            Err(Error::MissingField(_))
        ));
    }

    #[test]
    fn test_merge_mixed_label_presence_fails() {
        let a = EvalBatch::new(Record::new().with_field("x", arr1(&[1.0_f32]).into_dyn()))
            .with_labels(Values::Single(arr1(&[0.0_f32]).into_dyn()));
        let b = EvalBatch::new(Record::new().with_field("x", arr1(&[2.0_f32]).into_dyn()));

        assert!(matches!(
            EvalBatch::merge(&[a, b], PAD_VALUE),
            Err(Error::MissingLabels)
        ));
    }

    #[test]
    fn test_merge_empty_fails() {
        assert!(matches!(
            EvalBatch::merge(&[], PAD_VALUE),
            Err(Error::EmptyAggregate)
        ));
    }
}
