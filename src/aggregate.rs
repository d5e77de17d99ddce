//! Epoch-level aggregation of per-batch values
//!
//! Model outputs and label structures come in three shapes: a mapping
//! of named fields to arrays, an ordered sequence of arrays, or a
//! single array. `Values` makes the shape kind explicit as a tagged
//! variant, and `Values::concat` folds a uniform list of per-batch
//! values into one epoch-level value, padding ragged arrays as needed.

use std::collections::BTreeMap;

use ndarray::ArrayD;

use crate::error::{Error, Result};
use crate::pad::concat_pad;

/// One batch's predictions or labels, tagged by shape kind.
#[derive(Clone, Debug, PartialEq)]
pub enum Values {
    /// Mapping from field name to array
    Named(BTreeMap<String, ArrayD<f32>>),
    /// Ordered sequence of arrays
    Ordered(Vec<ArrayD<f32>>),
    /// A single array
    Single(ArrayD<f32>),
}

impl Values {
    /// Build a named value set from (name, array) pairs.
    pub fn named<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = (S, ArrayD<f32>)>,
        S: Into<String>,
    {
        Values::Named(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Shape-kind name, used in error messages.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Values::Named(_) => "named",
            Values::Ordered(_) => "ordered",
            Values::Single(_) => "single",
        }
    }

    /// Number of samples along axis 0 of the first contained array.
    #[must_use]
    pub fn num_samples(&self) -> usize {
        let first = match self {
            Values::Named(map) => map.values().next(),
            Values::Ordered(seq) => seq.first(),
            Values::Single(arr) => Some(arr),
        };
        first.map_or(0, |a| a.shape().first().copied().unwrap_or(0))
    }

    /// The contained array, if this is a `Single` value set.
    #[must_use]
    pub fn as_single(&self) -> Option<&ArrayD<f32>> {
        match self {
            Values::Single(arr) => Some(arr),
            _ => None,
        }
    }

    /// The contained mapping, if this is a `Named` value set.
    #[must_use]
    pub fn as_named(&self) -> Option<&BTreeMap<String, ArrayD<f32>>> {
        match self {
            Values::Named(map) => Some(map),
            _ => None,
        }
    }

    /// Concatenate a uniform list of per-batch values into one
    /// epoch-level value.
    ///
    /// The shape kind of the first batch decides the dispatch; every
    /// other batch must match it. Named mappings concatenate per key
    /// (keys taken from the first batch, each field padded
    /// independently), ordered sequences concatenate per position, and
    /// single arrays concatenate directly. A mapping or sequence that
    /// reduces to exactly one array collapses to `Single`, so
    /// single-output models hand the metric function a plain array.
    pub fn concat(batches: &[Values], pad: f32) -> Result<Values> {
        let first = batches.first().ok_or(Error::EmptyAggregate)?;
        match first {
            Values::Named(head) => {
                let mut out = BTreeMap::new();
                for key in head.keys() {
                    let mut per_batch = Vec::with_capacity(batches.len());
                    for batch in batches {
                        let Values::Named(map) = batch else {
                            return Err(Error::MixedKinds {
                                expected: "named",
                                found: batch.kind(),
                            });
                        };
                        let arr = map
                            .get(key)
                            .ok_or_else(|| Error::MissingField(key.clone()))?;
                        per_batch.push(arr.clone());
                    }
                    out.insert(key.clone(), concat_pad(&per_batch, &pad)?);
                }
                if out.len() == 1 {
                    if let Some((_, arr)) = out.pop_first() {
                        return Ok(Values::Single(arr));
                    }
                }
                Ok(Values::Named(out))
            }
            Values::Ordered(head) => {
                let positions = head.len();
                let mut columns: Vec<Vec<ArrayD<f32>>> =
                    (0..positions).map(|_| Vec::with_capacity(batches.len())).collect();
                for batch in batches {
                    let Values::Ordered(seq) = batch else {
                        return Err(Error::MixedKinds {
                            expected: "ordered",
                            found: batch.kind(),
                        });
                    };
                    if seq.len() != positions {
                        return Err(Error::ShapeMismatch(format!(
                            "sequence of {} arrays does not match {}",
                            seq.len(),
                            positions
                        )));
                    }
                    for (column, arr) in columns.iter_mut().zip(seq) {
                        column.push(arr.clone());
                    }
                }
                let mut parts = columns
                    .iter()
                    .map(|column| concat_pad(column, &pad))
                    .collect::<Result<Vec<_>>>()?;
                if parts.len() == 1 {
                    Ok(Values::Single(parts.remove(0)))
                } else {
                    Ok(Values::Ordered(parts))
                }
            }
            Values::Single(_) => {
                let mut per_batch = Vec::with_capacity(batches.len());
                for batch in batches {
                    let Values::Single(arr) = batch else {
                        return Err(Error::MixedKinds {
                            expected: "single",
                            found: batch.kind(),
                        });
                    };
                    per_batch.push(arr.clone());
                }
                Ok(Values::Single(concat_pad(&per_batch, &pad)?))
            }
        }
    }
}
