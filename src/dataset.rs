//! Dataset collaborator interface
//!
//! The aggregator pulls batches from any source implementing
//! [`EvalDataset`]. The trait also exposes the static shape metadata
//! the label-source heuristics need: whether elements come pre-batched,
//! whether they are (inputs, labels) pairs, and which named input
//! fields exist.

use crate::batch::EvalBatch;
use crate::error::{Error, Result};

/// An evaluation data source.
pub trait EvalDataset {
    /// Iterate elements in a fixed order, one blocking pull at a time.
    fn batches(&self) -> Box<dyn Iterator<Item = EvalBatch> + '_>;

    /// Whether elements are already grouped into batches. When false,
    /// the aggregator groups them itself and requires a batch size.
    fn is_batched(&self) -> bool;

    /// Whether each element carries a separate label structure.
    fn yields_pairs(&self) -> bool;

    /// Named input fields every element exposes.
    fn input_fields(&self) -> Vec<String>;
}

/// In-memory dataset over a vector of elements.
#[derive(Clone, Debug, Default)]
pub struct VecDataset {
    elements: Vec<EvalBatch>,
    batched: bool,
}

impl VecDataset {
    /// Wrap a pre-batched element list.
    #[must_use]
    pub fn from_batches(batches: Vec<EvalBatch>) -> Self {
        Self {
            elements: batches,
            batched: true,
        }
    }

    /// Wrap a raw (unbatched) element list. The aggregator will group
    /// elements into batches and requires a batch size in its config.
    #[must_use]
    pub fn from_elements(elements: Vec<EvalBatch>) -> Self {
        Self {
            elements,
            batched: false,
        }
    }

    /// Number of elements
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Whether the dataset is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

impl EvalDataset for VecDataset {
    fn batches(&self) -> Box<dyn Iterator<Item = EvalBatch> + '_> {
        Box::new(self.elements.iter().cloned())
    }

    fn is_batched(&self) -> bool {
        self.batched
    }

    fn yields_pairs(&self) -> bool {
        self.elements.first().is_some_and(|e| e.labels.is_some())
    }

    fn input_fields(&self) -> Vec<String> {
        self.elements
            .first()
            .map(|e| e.inputs.field_names())
            .unwrap_or_default()
    }
}

/// Group an unbatched element stream into batches of `batch_size`.
///
/// The final batch is smaller when the element count is not a multiple
/// of the batch size. Ragged per-element fields are padded while
/// merging.
pub fn rebatch(elements: Vec<EvalBatch>, batch_size: usize, pad: f32) -> Result<Vec<EvalBatch>> {
    if batch_size == 0 {
        return Err(Error::MissingBatchSize);
    }
    elements
        .chunks(batch_size)
        .map(|chunk| EvalBatch::merge(chunk, pad))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::Values;
    use crate::batch::Record;
    use crate::pad::PAD_VALUE;
    use ndarray::arr1;

    fn element(v: f32) -> EvalBatch {
        EvalBatch::new(Record::new().with_field("x", arr1(&[v]).into_dyn()))
            .with_labels(Values::Single(arr1(&[v * 2.0]).into_dyn()))
    }

    #[test]
    fn test_vec_dataset_metadata() {
        let ds = VecDataset::from_batches(vec![element(1.0), element(2.0)]);
        assert!(ds.is_batched());
        assert!(ds.yields_pairs());
        assert_eq!(ds.input_fields(), vec!["x".to_string()]);
        assert_eq!(ds.len(), 2);
    }

    #[test]
    fn test_unbatched_dataset() {
        let ds = VecDataset::from_elements(vec![element(1.0)]);
        assert!(!ds.is_batched());
    }

    #[test]
    fn test_empty_dataset() {
        let ds = VecDataset::default();
        assert!(ds.is_empty());
        assert!(!ds.yields_pairs());
        assert!(ds.input_fields().is_empty());
        assert_eq!(ds.batches().count(), 0);
    }

    #[test]
    fn test_rebatch_groups_elements() {
        let batches = rebatch(
            vec![element(1.0), element(2.0), element(3.0)],
            2,
            PAD_VALUE,
        )
        .unwrap();

        assert_eq!(batches.len(), 2);
        assert_eq!(
            batches[0].inputs.get("x"),
            Some(&arr1(&[1.0, 2.0]).into_dyn())
        );
        // The trailing batch keeps the remainder
        assert_eq!(batches[1].inputs.num_samples(), 1);
        assert_eq!(
            batches[0].labels,
            Some(Values::Single(arr1(&[2.0, 4.0]).into_dyn()))
        );
    }

    #[test]
    fn test_rebatch_zero_size_fails() {
        let err = rebatch(vec![element(1.0)], 0, PAD_VALUE).unwrap_err();
        assert!(err.is_config());
    }
}
