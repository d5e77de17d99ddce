//! Batch concatenation with padding
//!
//! Joins per-batch arrays into one epoch-level array along the sample
//! axis. Equal-width arrays are concatenated directly; ragged arrays
//! (generation output whose sequence length varies per batch) are
//! padded to the widest batch with a sentinel value first, so that
//! downstream metric code always sees one rectangular array.

use ndarray::{concatenate, ArrayD, Axis, SliceInfoElem};

use crate::error::{Error, Result};

/// Default padding sentinel for label/prediction arrays.
///
/// The sentinel must not collide with any valid value in the data;
/// that is the caller's responsibility.
pub const PAD_VALUE: f32 = -100.0;

/// Concatenate arrays along the sample axis, padding axis 1 when widths differ.
///
/// All arrays must share rank, and every axis beyond the second must
/// agree across arrays. Works for any element type for which a padding
/// sentinel can be supplied.
///
/// # Example
///
/// ```
/// use evaluar::pad::concat_pad;
/// use ndarray::arr2;
///
/// let a = arr2(&[[1.0_f32, 2.0, 3.0]]).into_dyn();
/// let b = arr2(&[[4.0_f32, 5.0, 6.0, 7.0, 8.0]]).into_dyn();
///
/// let out = concat_pad(&[a, b], &-100.0).unwrap();
/// assert_eq!(out.shape(), &[2, 5]);
/// assert_eq!(out[[0, 3]], -100.0);
/// ```
pub fn concat_pad<T: Clone>(chunks: &[ArrayD<T>], pad: &T) -> Result<ArrayD<T>> {
    let first = chunks.first().ok_or(Error::EmptyAggregate)?;
    let rank = first.ndim();
    if rank == 0 {
        return Err(Error::ShapeMismatch(
            "rank-0 arrays have no sample axis".to_string(),
        ));
    }
    for chunk in &chunks[1..] {
        if chunk.ndim() != rank {
            return Err(Error::ShapeMismatch(format!(
                "rank {} does not match rank {}",
                chunk.ndim(),
                rank
            )));
        }
        if rank >= 2 && chunk.shape()[2..] != first.shape()[2..] {
            return Err(Error::ShapeMismatch(format!(
                "trailing dimensions {:?} do not match {:?}",
                &chunk.shape()[2..],
                &first.shape()[2..]
            )));
        }
    }

    // Fast path: 1-D arrays, or a shared axis-1 width, need no padding.
    let width = first.shape().get(1).copied();
    if rank == 1 || chunks.iter().all(|c| c.shape().get(1).copied() == width) {
        let views: Vec<_> = chunks.iter().map(|c| c.view()).collect();
        return Ok(concatenate(Axis(0), &views)?);
    }

    let max_width = chunks.iter().map(|c| c.shape()[1]).max().unwrap_or(0);
    let total: usize = chunks.iter().map(|c| c.shape()[0]).sum();
    let mut shape = first.shape().to_vec();
    shape[0] = total;
    shape[1] = max_width;

    // Left-aligned copy into a sentinel-filled output: rows 0..len,
    // columns 0..original width, remaining region stays at the sentinel.
    let mut out = ArrayD::from_elem(shape, pad.clone());
    let mut row = 0;
    for chunk in chunks {
        let rows = chunk.shape()[0];
        let cols = chunk.shape()[1];
        let mut slice: Vec<SliceInfoElem> = vec![SliceInfoElem::from(..); rank];
        slice[0] = SliceInfoElem::from(row..row + rows);
        slice[1] = SliceInfoElem::from(0..cols);
        out.slice_mut(slice.as_slice()).assign(chunk);
        row += rows;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr1, arr2, arr3};

    #[test]
    fn test_concat_one_dimensional() {
        let a = arr1(&[0.0_f32, 1.0]).into_dyn();
        let b = arr1(&[1.0_f32, 1.0]).into_dyn();

        let out = concat_pad(&[a, b], &PAD_VALUE).unwrap();
        assert_eq!(out, arr1(&[0.0, 1.0, 1.0, 1.0]).into_dyn());
    }

    #[test]
    fn test_concat_equal_widths_no_padding() {
        let a = arr2(&[[1.0_f32, 2.0], [3.0, 4.0]]).into_dyn();
        let b = arr2(&[[5.0_f32, 6.0]]).into_dyn();

        let out = concat_pad(&[a, b], &PAD_VALUE).unwrap();
        assert_eq!(out.shape(), &[3, 2]);
        assert!(out.iter().all(|&v| v != PAD_VALUE));
    }

    #[test]
    fn test_concat_ragged_pads_to_max_width() {
        // (2, 3) then (1, 5) -> (3, 5) with two sentinels on each short row
        let a = arr2(&[[1.0_f32, 2.0, 3.0], [4.0, 5.0, 6.0]]).into_dyn();
        let b = arr2(&[[7.0_f32, 8.0, 9.0, 10.0, 11.0]]).into_dyn();

        let out = concat_pad(&[a, b], &PAD_VALUE).unwrap();
        assert_eq!(out.shape(), &[3, 5]);
        assert_eq!(out[[0, 0]], 1.0);
        assert_eq!(out[[0, 2]], 3.0);
        assert_eq!(out[[0, 3]], PAD_VALUE);
        assert_eq!(out[[0, 4]], PAD_VALUE);
        assert_eq!(out[[1, 3]], PAD_VALUE);
        assert_eq!(out[[2, 4]], 11.0);
    }

    #[test]
    fn test_concat_preserves_trailing_axes() {
        let a = arr3(&[[[1.0_f32, 2.0], [3.0, 4.0]]]).into_dyn(); // (1, 2, 2)
        let b = arr3(&[[[5.0_f32, 6.0], [7.0, 8.0], [9.0, 10.0]]]).into_dyn(); // (1, 3, 2)

        let out = concat_pad(&[a, b], &PAD_VALUE).unwrap();
        assert_eq!(out.shape(), &[2, 3, 2]);
        assert_eq!(out[[0, 0, 1]], 2.0);
        assert_eq!(out[[0, 2, 0]], PAD_VALUE);
        assert_eq!(out[[1, 2, 1]], 10.0);
    }

    #[test]
    fn test_concat_integer_elements() {
        let a = arr2(&[[1_i64, 2]]).into_dyn();
        let b = arr2(&[[3_i64, 4, 5]]).into_dyn();

        let out = concat_pad(&[a, b], &-100).unwrap();
        assert_eq!(out.shape(), &[2, 3]);
        assert_eq!(out[[0, 2]], -100);
        assert_eq!(out[[1, 2]], 5);
    }

    #[test]
    fn test_concat_string_elements() {
        let a = arr2(&[["a".to_string(), "b".to_string()]]).into_dyn();
        let b = arr2(&[["c".to_string()]]).into_dyn();

        let out = concat_pad(&[a, b], &String::new()).unwrap();
        assert_eq!(out.shape(), &[2, 2]);
        assert_eq!(out[[0, 1]], "b");
        assert_eq!(out[[1, 1]], "");
    }

    #[test]
    fn test_concat_empty_list_fails() {
        let chunks: Vec<ArrayD<f32>> = vec![];
        assert!(matches!(
            concat_pad(&chunks, &PAD_VALUE),
            Err(Error::EmptyAggregate)
        ));
    }

    #[test]
    fn test_concat_rank_mismatch_fails() {
        let a = arr1(&[1.0_f32]).into_dyn();
        let b = arr2(&[[1.0_f32]]).into_dyn();
        assert!(matches!(
            concat_pad(&[a, b], &PAD_VALUE),
            Err(Error::ShapeMismatch(_))
        ));
    }

    #[test]
    fn test_concat_trailing_dim_mismatch_fails() {
        let a = arr3(&[[[1.0_f32, 2.0]]]).into_dyn(); // (1, 1, 2)
        let b = arr3(&[[[1.0_f32, 2.0, 3.0]]]).into_dyn(); // (1, 1, 3)
        assert!(matches!(
            concat_pad(&[a, b], &PAD_VALUE),
            Err(Error::ShapeMismatch(_))
        ));
    }

    #[test]
    fn test_concat_rank_zero_fails() {
        let a = ndarray::arr0(1.0_f32).into_dyn();
        assert!(matches!(
            concat_pad(&[a], &PAD_VALUE),
            Err(Error::ShapeMismatch(_))
        ));
    }

    #[test]
    fn test_concat_single_chunk_identity() {
        let a = arr2(&[[1.0_f32, 2.0], [3.0, 4.0]]).into_dyn();
        let out = concat_pad(std::slice::from_ref(&a), &PAD_VALUE).unwrap();
        assert_eq!(out, a);
    }
}
