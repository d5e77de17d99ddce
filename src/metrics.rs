//! Metric building blocks over aggregated arrays
//!
//! Ready-made pieces for the metric-function contract of
//! [`MetricEvalCallback`](crate::MetricEvalCallback). All functions are
//! sentinel-aware: label positions holding the padding value are
//! excluded from the score.

use ndarray::ArrayD;
use serde_json::Value as Json;

use crate::aggregate::Values;

/// Fraction of non-padding label positions where prediction and label
/// agree.
///
/// Arrays are compared elementwise in logical order; positions whose
/// label equals `pad` are skipped. Returns 0.0 when no position counts.
#[must_use]
pub fn accuracy(predictions: &ArrayD<f32>, labels: &ArrayD<f32>, pad: f32) -> f64 {
    let mut total = 0_usize;
    let mut correct = 0_usize;
    for (p, l) in predictions.iter().zip(labels.iter()) {
        if *l == pad {
            continue;
        }
        total += 1;
        if p == l {
            correct += 1;
        }
    }
    if total == 0 {
        0.0
    } else {
        correct as f64 / total as f64
    }
}

/// Fraction of samples whose prediction matches the label at every
/// non-padding position.
///
/// Samples are rows along axis 0. A prediction row padded wider than
/// its label row still matches as long as every non-padding label
/// position agrees.
#[must_use]
pub fn exact_match(predictions: &ArrayD<f32>, labels: &ArrayD<f32>, pad: f32) -> f64 {
    if predictions.ndim() == 0 || labels.ndim() == 0 {
        return 0.0;
    }
    let mut total = 0_usize;
    let mut matched = 0_usize;
    for (pred_row, label_row) in predictions.outer_iter().zip(labels.outer_iter()) {
        total += 1;
        let mut preds = pred_row.iter();
        let mut hit = true;
        for label in label_row.iter() {
            let pred = preds.next();
            if *label == pad {
                continue;
            }
            match pred {
                Some(p) if p == label => {}
                _ => {
                    hit = false;
                    break;
                }
            }
        }
        if hit {
            matched += 1;
        }
    }
    if total == 0 {
        0.0
    } else {
        matched as f64 / total as f64
    }
}

/// Wrap [`accuracy`] into the metric-function contract.
///
/// The returned closure expects both sides to have aggregated to a
/// single array; anything else yields a JSON null, which the callback
/// rejects as a type error.
pub fn accuracy_metric(pad: f32) -> impl Fn(&Values, &Values) -> Json + Send {
    move |predictions, labels| match (predictions.as_single(), labels.as_single()) {
        (Some(p), Some(l)) => serde_json::json!({ "accuracy": accuracy(p, l, pad) }),
        _ => Json::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pad::PAD_VALUE;
    use approx::assert_relative_eq;
    use ndarray::{arr1, arr2};

    #[test]
    fn test_accuracy_counts_matches() {
        let preds = arr1(&[0.0_f32, 1.0, 1.0, 1.0]).into_dyn();
        let labels = arr1(&[0.0_f32, 1.0, 1.0, 0.0]).into_dyn();
        assert_relative_eq!(accuracy(&preds, &labels, PAD_VALUE), 0.75);
    }

    #[test]
    fn test_accuracy_skips_padding_positions() {
        let preds = arr1(&[1.0_f32, 2.0, 3.0]).into_dyn();
        let labels = arr1(&[1.0_f32, PAD_VALUE, 0.0]).into_dyn();
        // One hit, one miss, one padding position skipped
        assert_relative_eq!(accuracy(&preds, &labels, PAD_VALUE), 0.5);
    }

    #[test]
    fn test_accuracy_all_padding_is_zero() {
        let preds = arr1(&[1.0_f32]).into_dyn();
        let labels = arr1(&[PAD_VALUE]).into_dyn();
        assert_relative_eq!(accuracy(&preds, &labels, PAD_VALUE), 0.0);
    }

    #[test]
    fn test_exact_match_rows() {
        let preds = arr2(&[[1.0_f32, 2.0], [3.0, 4.0]]).into_dyn();
        let labels = arr2(&[[1.0_f32, 2.0], [3.0, 5.0]]).into_dyn();
        assert_relative_eq!(exact_match(&preds, &labels, PAD_VALUE), 0.5);
    }

    #[test]
    fn test_exact_match_ignores_padded_tail() {
        // Prediction padded to width 4, label only cares about width 2
        let preds = arr2(&[[1.0_f32, 2.0, PAD_VALUE, PAD_VALUE]]).into_dyn();
        let labels = arr2(&[[1.0_f32, 2.0]]).into_dyn();
        assert_relative_eq!(exact_match(&preds, &labels, PAD_VALUE), 1.0);
    }

    #[test]
    fn test_exact_match_fails_when_prediction_short() {
        let preds = arr2(&[[1.0_f32]]).into_dyn();
        let labels = arr2(&[[1.0_f32, 2.0]]).into_dyn();
        assert_relative_eq!(exact_match(&preds, &labels, PAD_VALUE), 0.0);
    }

    #[test]
    fn test_accuracy_metric_contract() {
        let metric = accuracy_metric(PAD_VALUE);
        let preds = Values::Single(arr1(&[1.0_f32, 0.0]).into_dyn());
        let labels = Values::Single(arr1(&[1.0_f32, 1.0]).into_dyn());

        let result = metric(&preds, &labels);
        assert_eq!(result["accuracy"], 0.5);
    }

    #[test]
    fn test_accuracy_metric_rejects_named_values() {
        let metric = accuracy_metric(PAD_VALUE);
        let named = Values::named([("a", arr1(&[1.0_f32]).into_dyn())]);
        let labels = Values::Single(arr1(&[1.0_f32]).into_dyn());
        assert_eq!(metric(&named, &labels), Json::Null);
    }
}
